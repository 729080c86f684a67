//! Held-input set, enablement flags and tuning for the follow controls.

use std::collections::HashSet;

/// A continuous input that stays active while its key is held.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FollowInput {
    MoveUp,
    MoveDown,
    MoveForward,
    MoveBackward,
    MoveLeft,
    MoveRight,
    RotUp,
    RotDown,
    RotLeft,
    RotRight,
    RollLeft,
    RollRight,
    ZoomIn,
    ZoomOut,
    Sprint,
}

/// The inputs currently held down.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HeldInputs(HashSet<FollowInput>);

impl HeldInputs {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `input` as held. Holding an input twice is a no-op.
    pub fn press(&mut self, input: FollowInput) {
        self.0.insert(input);
    }

    pub fn release(&mut self, input: FollowInput) {
        self.0.remove(&input);
    }

    pub fn contains(&self, input: FollowInput) -> bool {
        self.0.contains(&input)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = FollowInput> + '_ {
        self.0.iter().copied()
    }
}

/// Which groups of controls respond to input.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FollowEnabled {
    pub rotate: bool,
    pub zoom: bool,
    pub movement: bool,
    pub keys: bool,
}

impl FollowEnabled {
    pub const NONE: Self = Self {
        rotate: false,
        zoom: false,
        movement: false,
        keys: false,
    };

    pub const ALL: Self = Self {
        rotate: true,
        zoom: true,
        movement: true,
        keys: true,
    };

    /// True when every group is disabled.
    pub fn is_none(self) -> bool {
        self == Self::NONE
    }
}

impl Default for FollowEnabled {
    fn default() -> Self {
        Self::ALL
    }
}

/// Tuning for a follow controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FollowSettings {
    /// Lower zoom bound in degrees.
    pub min_fov: f32,
    /// Upper zoom bound in degrees.
    pub max_fov: f32,
    /// Translation speed in world units per second.
    pub move_speed: f32,
    /// Mouse-look sensitivity in degrees per pixel.
    pub mouse_sensitivity: f32,
    /// Held-key rotation speed in radians per second.
    pub key_rotation_speed: f32,
    /// Held-key zoom speed in degrees per second.
    pub key_zoom_speed: f32,
}

impl Default for FollowSettings {
    fn default() -> Self {
        Self {
            min_fov: 10.0,
            max_fov: 100.0,
            move_speed: 1.0e6,
            mouse_sensitivity: 0.1,
            key_rotation_speed: 30.0_f32.to_radians(),
            key_zoom_speed: 5.0,
        }
    }
}
