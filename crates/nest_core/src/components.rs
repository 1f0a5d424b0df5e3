//! Shared handle and value types.
//!
//! Handles are plain indices into the registries a [`World`](crate::simulation::World)
//! owns. Holding a handle never keeps the referenced entity alive.

use serde::{Deserialize, Serialize};

/// Handle to a unit instance in a [`UnitArena`](crate::units::UnitArena).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UnitId(pub u32);

/// Handle to a nest structure in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NestId(pub u32);

/// Handle to an AI controller in a world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ControllerId(pub u32);

impl UnitId {
    /// Index into the owning registry.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl NestId {
    /// Index into the owning registry.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

impl ControllerId {
    /// Index into the owning registry.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0 as usize
    }
}

/// RGBA faction tint applied to every visual part of a spawned unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Color {
    /// Red channel.
    pub r: u8,
    /// Green channel.
    pub g: u8,
    /// Blue channel.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Color {
    /// Opaque color from RGB channels.
    #[must_use]
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b, a: 255 }
    }

    /// Opaque red.
    pub const RED: Self = Self::rgb(220, 40, 40);
    /// Opaque blue.
    pub const BLUE: Self = Self::rgb(40, 80, 220);
}
