//! Camera controls and the player.
//!
//! [`FollowControl`] turns window input into rotation, movement and zoom of
//! a shared camera, with hooks that let [`Player`] redirect movement into
//! velocity changes on its physics body.

pub mod follow;
pub mod inputs;
pub mod player;

pub use follow::{FollowControl, MoveHook, RotateHook, SPRINT_MULTIPLIER};
pub use inputs::{FollowEnabled, FollowInput, FollowSettings, HeldInputs};
pub use player::{PLAYER_MASS, Player, PlayerBlock};
