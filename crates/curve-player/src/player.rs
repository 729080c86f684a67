//! The player: a physics body steered through the follow controls.
//!
//! Movement commands become velocity changes on the body instead of camera
//! translations, and the camera is glued to the body every frame.

use curve_math::ScaleFactor;
use curve_physics::{Block, BodyHandle};
use curve_render::SharedCamera;
use glam::DVec3;

use crate::follow::FollowControl;
use crate::inputs::FollowEnabled;

/// Mass of the player's body in kilograms.
pub const PLAYER_MASS: f64 = 1.0e3;

/// The block carried by the player's body.
#[derive(Debug, Clone, Copy, Default)]
pub struct PlayerBlock;

impl Block for PlayerBlock {
    fn mass(&self) -> f64 {
        PLAYER_MASS
    }
}

#[derive(Debug)]
pub struct Player {
    control: FollowControl,
    body: BodyHandle,
    scale: ScaleFactor,
}

impl Player {
    /// Take over `body`: attach a [`PlayerBlock`] and redirect the
    /// controller's movement into velocity changes on the body.
    pub fn new(control: FollowControl, body: BodyHandle, scale: ScaleFactor) -> Self {
        body.add_block(PlayerBlock);

        let target = body.clone();
        control.set_on_move(move |camera, distance, direction| {
            let dir = (camera.world_rotation() * direction).normalize() * distance;
            target.add_velocity(dir.as_dvec3());
            true
        });
        control.set_enabled(FollowEnabled::ALL);

        Self {
            control,
            body,
            scale,
        }
    }

    /// Per-frame update: tick the controls, then move the camera to the
    /// body's render-space position.
    pub fn frame(&self, dt: f32) {
        self.control.tick(dt);
        let position = self.scale.to_render(self.body.position());
        self.control.camera().borrow_mut().position = position;
    }

    /// The body's position in world units. Used as the camera position for
    /// distance calculations.
    pub fn world_position(&self) -> DVec3 {
        self.body.position()
    }

    pub fn velocity(&self) -> DVec3 {
        self.body.velocity()
    }

    pub fn control(&self) -> &FollowControl {
        &self.control
    }

    pub fn camera(&self) -> SharedCamera {
        self.control.camera()
    }

    pub fn body(&self) -> &BodyHandle {
        &self.body
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inputs::FollowSettings;
    use curve_input::{InputBus, InputEvent, KeyCode, Modifiers, MouseButton, RecordingCursor};
    use curve_physics::{BodyDesc, BodyKind, PhysicsEngine};
    use curve_render::Camera;
    use glam::{Quat, Vec3};
    use std::cell::RefCell;
    use std::rc::Rc;

    fn player(engine: &PhysicsEngine, bus: &InputBus, settings: FollowSettings) -> Player {
        let camera = Camera::default().into_shared();
        let cursor = Rc::new(RefCell::new(RecordingCursor::with_size(800, 600)));
        let control = FollowControl::new(camera, bus, cursor, settings);
        let body = engine.spawn(
            BodyDesc::new(BodyKind::Living, DVec3::new(-1.0e11, 2.0e7, 0.0)),
            |_| {},
        );
        Player::new(control, body, ScaleFactor::new(1.0e7))
    }

    #[test]
    fn test_player_block_mass() {
        let engine = PhysicsEngine::new();
        let bus = InputBus::new();
        let player = player(&engine, &bus, FollowSettings::default());
        assert_eq!(player.body().mass(), PLAYER_MASS);
    }

    #[test]
    fn test_move_redirected_into_velocity() {
        let engine = PhysicsEngine::new();
        let bus = InputBus::new();
        let player = player(&engine, &bus, FollowSettings::default());
        player.camera().borrow_mut().rotation =
            Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);

        player.control().move_by(250.0, Vec3::NEG_Z);

        let velocity = player.velocity();
        assert!((velocity - DVec3::new(-250.0, 0.0, 0.0)).length() < 1e-3);
        assert_eq!(player.camera().borrow().position, Vec3::ZERO);
    }

    #[test]
    fn test_held_key_accelerates_body_not_camera() {
        let engine = PhysicsEngine::new();
        let bus = InputBus::new();
        let settings = FollowSettings {
            move_speed: 100.0,
            ..FollowSettings::default()
        };
        let player = player(&engine, &bus, settings);
        bus.dispatch(InputEvent::MouseDown {
            button: MouseButton::Left,
        });
        bus.dispatch(InputEvent::KeyDown {
            key: KeyCode::Space,
            modifiers: Modifiers::NONE,
        });

        player.frame(0.5);
        assert!((player.velocity() - DVec3::new(0.0, 50.0, 0.0)).length() < 1e-6);
    }

    #[test]
    fn test_frame_glues_camera_to_body() {
        let engine = PhysicsEngine::new();
        let bus = InputBus::new();
        let player = player(&engine, &bus, FollowSettings::default());
        player.body().set_velocity(DVec3::new(1.0e7, 0.0, 0.0));
        engine.step(1.0);

        player.frame(0.016);
        let camera = player.camera();
        let position = camera.borrow().position;
        assert!((position - Vec3::new(-9999.0, 2.0, 0.0)).length() < 1e-2);
        assert_eq!(player.world_position(), DVec3::new(-1.0e11 + 1.0e7, 2.0e7, 0.0));
    }
}
