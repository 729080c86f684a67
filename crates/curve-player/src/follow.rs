//! Follow-camera controls.
//!
//! The controller is Idle (cursor free) until the left mouse button is
//! pressed, then Focused (cursor captured, mouse look active) until Escape
//! or loss of window focus. Held keys are recorded as [`FollowInput`]s and
//! turned into rotation, movement and zoom once per [`tick`].
//!
//! [`tick`]: FollowControl::tick

use std::cell::RefCell;
use std::f32::consts::PI;
use std::rc::Rc;

use curve_input::{
    InputBus, InputEvent, KeyCode, Modifiers, MouseButton, SharedCursor, Subscription,
};
use curve_render::{Camera, SharedCamera};
use glam::{DVec2, Quat, Vec3};
use tracing::{debug, trace};

use crate::inputs::{FollowEnabled, FollowInput, FollowSettings, HeldInputs};

/// Sprint multiplies movement speed by this factor.
pub const SPRINT_MULTIPLIER: f32 = 1000.0;

/// Replaces the default movement. Receives the camera, the distance and the
/// local-space direction; returns `true` when it handled the move.
pub type MoveHook = Box<dyn FnMut(&Camera, f32, Vec3) -> bool>;

/// Replaces the default rotation. Receives the camera and pitch, yaw and
/// roll in radians; returns `true` when it handled the rotation.
pub type RotateHook = Box<dyn FnMut(&Camera, f32, f32, f32) -> bool>;

struct FollowState {
    camera: SharedCamera,
    cursor: SharedCursor,
    settings: FollowSettings,
    enabled: FollowEnabled,
    held: HeldInputs,
    focused: bool,
    lost_focus: bool,
    last_cursor: DVec2,
    on_move: Option<MoveHook>,
    on_rotate: Option<RotateHook>,
}

impl FollowState {
    fn tick(&mut self, dt: f32) {
        if self.lost_focus {
            self.pause();
            self.lost_focus = false;
        }

        if self.enabled.rotate {
            let speed = self.settings.key_rotation_speed * dt;
            let steps = [
                (FollowInput::RotUp, (speed, 0.0, 0.0)),
                (FollowInput::RotDown, (-speed, 0.0, 0.0)),
                (FollowInput::RotLeft, (0.0, speed, 0.0)),
                (FollowInput::RotRight, (0.0, -speed, 0.0)),
                (FollowInput::RollLeft, (0.0, 0.0, speed * 2.0)),
                (FollowInput::RollRight, (0.0, 0.0, -speed * 2.0)),
            ];
            for (input, (pitch, yaw, roll)) in steps {
                if self.held.contains(input) {
                    self.rotate(pitch, yaw, roll);
                }
            }
        }

        if self.enabled.movement {
            let mut speed = self.settings.move_speed * dt;
            if self.held.contains(FollowInput::Sprint) {
                speed *= SPRINT_MULTIPLIER;
            }
            let mut dir = Vec3::ZERO;
            for (input, axis) in [
                (FollowInput::MoveForward, Vec3::NEG_Z),
                (FollowInput::MoveBackward, Vec3::Z),
                (FollowInput::MoveLeft, Vec3::NEG_X),
                (FollowInput::MoveRight, Vec3::X),
                (FollowInput::MoveUp, Vec3::Y),
                (FollowInput::MoveDown, Vec3::NEG_Y),
            ] {
                if self.held.contains(input) {
                    dir += axis;
                }
            }
            if dir.length_squared() > 0.0 {
                self.move_by(speed, dir.normalize());
            }
        }

        if self.enabled.zoom {
            let speed = self.settings.key_zoom_speed * dt;
            if self.held.contains(FollowInput::ZoomIn) {
                self.zoom(speed);
            }
            if self.held.contains(FollowInput::ZoomOut) {
                self.zoom(-speed);
            }
        }
    }

    fn focus(&mut self) {
        if self.focused {
            return;
        }
        self.focused = true;
        self.held.clear();
        let mut cursor = self.cursor.borrow_mut();
        cursor.set_cursor_captured(true);
        cursor.set_cursor_position(DVec2::ZERO);
        self.last_cursor = DVec2::ZERO;
        debug!("follow camera focused");
    }

    fn pause(&mut self) {
        if !self.focused {
            return;
        }
        self.focused = false;
        self.held.clear();
        let mut cursor = self.cursor.borrow_mut();
        cursor.set_cursor_captured(false);
        if !self.lost_focus {
            let size = cursor.window_size();
            cursor.set_cursor_position(DVec2::new(
                f64::from(size.x / 2),
                f64::from(size.y / 2),
            ));
        }
        debug!(lost_focus = self.lost_focus, "follow camera paused");
    }

    fn rotate(&mut self, pitch: f32, yaw: f32, roll: f32) {
        if let Some(hook) = self.on_rotate.as_mut()
            && hook(&self.camera.borrow(), pitch, yaw, roll)
        {
            return;
        }
        let mut camera = self.camera.borrow_mut();
        let mut rotation = camera.rotation;
        if pitch != 0.0 {
            rotation *= Quat::from_axis_angle(Vec3::X, pitch);
        }
        if yaw != 0.0 {
            rotation *= Quat::from_axis_angle(Vec3::Y, yaw);
        }
        if roll != 0.0 {
            rotation *= Quat::from_axis_angle(Vec3::Z, roll);
        }
        camera.rotation = rotation.normalize();
    }

    fn zoom(&mut self, delta: f32) {
        let mut camera = self.camera.borrow_mut();
        let mut fov = camera.fov() - delta;
        if fov < self.settings.min_fov {
            fov = self.settings.min_fov;
        } else if fov > self.settings.max_fov {
            fov = self.settings.max_fov;
        }
        camera.set_fov(fov);
    }

    fn move_by(&mut self, distance: f32, direction: Vec3) {
        if direction.length_squared() == 0.0 || !direction.is_finite() {
            return;
        }
        if let Some(hook) = self.on_move.as_mut()
            && hook(&self.camera.borrow(), distance, direction)
        {
            return;
        }
        let mut camera = self.camera.borrow_mut();
        let offset = (camera.world_rotation() * direction).normalize() * distance;
        camera.position += offset;
    }

    fn handle(&mut self, event: &InputEvent) {
        match *event {
            InputEvent::MouseDown { button } => {
                if !self.enabled.is_none() && button == MouseButton::Left {
                    self.focus();
                }
            }
            InputEvent::FocusChanged(focused) => {
                if !focused && self.focused {
                    self.lost_focus = true;
                }
            }
            InputEvent::CursorMoved { x, y } => {
                if !self.enabled.rotate || !self.focused {
                    return;
                }
                let position = DVec2::new(x, y);
                let delta = (position - self.last_cursor).as_vec2();
                self.last_cursor = position;
                let sensitivity = PI / 180.0 * self.settings.mouse_sensitivity;
                self.rotate(-delta.y * sensitivity, -delta.x * sensitivity, 0.0);
            }
            InputEvent::Scroll { y_offset, .. } => {
                if self.enabled.zoom {
                    self.zoom(y_offset as f32);
                }
            }
            InputEvent::KeyDown { key, modifiers } => {
                if self.enabled.keys && self.focused {
                    self.key_down(key, modifiers);
                }
            }
            InputEvent::KeyUp { key, .. } => {
                if self.enabled.keys && self.focused {
                    self.key_up(key);
                }
            }
        }
    }

    fn key_down(&mut self, key: KeyCode, modifiers: Modifiers) {
        let alt = modifiers.contains(Modifiers::ALT);
        let input = match key {
            KeyCode::Escape => {
                self.pause();
                return;
            }
            KeyCode::ShiftLeft => FollowInput::Sprint,
            KeyCode::ArrowUp if alt => FollowInput::ZoomIn,
            KeyCode::ArrowUp => FollowInput::RotUp,
            KeyCode::ArrowDown if alt => FollowInput::ZoomOut,
            KeyCode::ArrowDown => FollowInput::RotDown,
            KeyCode::ArrowLeft => FollowInput::RotLeft,
            KeyCode::ArrowRight => FollowInput::RotRight,
            KeyCode::KeyQ => FollowInput::RollLeft,
            KeyCode::KeyE => FollowInput::RollRight,
            KeyCode::KeyW => FollowInput::MoveForward,
            KeyCode::KeyS => FollowInput::MoveBackward,
            KeyCode::KeyA => FollowInput::MoveLeft,
            KeyCode::KeyD => FollowInput::MoveRight,
            KeyCode::Space => FollowInput::MoveUp,
            KeyCode::KeyC => FollowInput::MoveDown,
            _ => return,
        };
        self.held.press(input);
    }

    fn key_up(&mut self, key: KeyCode) {
        let released: &[FollowInput] = match key {
            KeyCode::ShiftLeft => &[FollowInput::Sprint],
            KeyCode::ArrowUp => &[FollowInput::RotUp, FollowInput::ZoomIn],
            KeyCode::ArrowDown => &[FollowInput::RotDown, FollowInput::ZoomOut],
            KeyCode::ArrowLeft => &[FollowInput::RotLeft],
            KeyCode::ArrowRight => &[FollowInput::RotRight],
            KeyCode::KeyQ => &[FollowInput::RollLeft],
            KeyCode::KeyE => &[FollowInput::RollRight],
            KeyCode::KeyW => &[FollowInput::MoveForward],
            KeyCode::KeyS => &[FollowInput::MoveBackward],
            KeyCode::KeyA => &[FollowInput::MoveLeft],
            KeyCode::KeyD => &[FollowInput::MoveRight],
            KeyCode::Space => &[FollowInput::MoveUp],
            KeyCode::KeyC => &[FollowInput::MoveDown],
            _ => &[],
        };
        for &input in released {
            self.held.release(input);
        }
    }
}

/// Input-driven camera controller.
///
/// Subscribes to the [`InputBus`] on construction; the subscription is
/// released when the controller is dropped. Hooks must not call back into
/// the controller.
pub struct FollowControl {
    state: Rc<RefCell<FollowState>>,
    _subscription: Subscription,
}

impl FollowControl {
    pub fn new(
        camera: SharedCamera,
        bus: &InputBus,
        cursor: SharedCursor,
        settings: FollowSettings,
    ) -> Self {
        let state = Rc::new(RefCell::new(FollowState {
            camera,
            cursor,
            settings,
            enabled: FollowEnabled::ALL,
            held: HeldInputs::new(),
            focused: false,
            lost_focus: false,
            last_cursor: DVec2::ZERO,
            on_move: None,
            on_rotate: None,
        }));

        let listener = Rc::clone(&state);
        let subscription = bus.subscribe(move |event| match listener.try_borrow_mut() {
            Ok(mut state) => state.handle(event),
            Err(_) => trace!(?event, "follow control busy, dropping event"),
        });

        Self {
            state,
            _subscription: subscription,
        }
    }

    /// Apply held inputs for a frame of `dt` seconds.
    pub fn tick(&self, dt: f32) {
        self.state.borrow_mut().tick(dt);
    }

    /// Capture the cursor and start look mode.
    pub fn focus(&self) {
        self.state.borrow_mut().focus();
    }

    /// Release the cursor and clear held inputs.
    pub fn pause(&self) {
        self.state.borrow_mut().pause();
    }

    /// Rotate by pitch, yaw and roll in radians about the camera's local
    /// axes, applied in that order.
    pub fn rotate(&self, pitch: f32, yaw: f32, roll: f32) {
        self.state.borrow_mut().rotate(pitch, yaw, roll);
    }

    /// Narrow the field of view by `delta` degrees, within the settings' bounds.
    pub fn zoom(&self, delta: f32) {
        self.state.borrow_mut().zoom(delta);
    }

    /// Move `distance` along the local-space `direction`.
    pub fn move_by(&self, distance: f32, direction: Vec3) {
        self.state.borrow_mut().move_by(distance, direction);
    }

    pub fn camera(&self) -> SharedCamera {
        Rc::clone(&self.state.borrow().camera)
    }

    pub fn enabled(&self) -> FollowEnabled {
        self.state.borrow().enabled
    }

    pub fn set_enabled(&self, enabled: FollowEnabled) {
        self.state.borrow_mut().enabled = enabled;
    }

    pub fn settings(&self) -> FollowSettings {
        self.state.borrow().settings
    }

    pub fn set_settings(&self, settings: FollowSettings) {
        self.state.borrow_mut().settings = settings;
    }

    pub fn set_on_move(&self, hook: impl FnMut(&Camera, f32, Vec3) -> bool + 'static) {
        self.state.borrow_mut().on_move = Some(Box::new(hook));
    }

    pub fn set_on_rotate(&self, hook: impl FnMut(&Camera, f32, f32, f32) -> bool + 'static) {
        self.state.borrow_mut().on_rotate = Some(Box::new(hook));
    }

    pub fn clear_hooks(&self) {
        let mut state = self.state.borrow_mut();
        state.on_move = None;
        state.on_rotate = None;
    }

    pub fn is_focused(&self) -> bool {
        self.state.borrow().focused
    }

    /// Whether a focus loss is waiting for the next tick.
    pub fn is_pause_pending(&self) -> bool {
        self.state.borrow().lost_focus
    }

    pub fn held_inputs(&self) -> HeldInputs {
        self.state.borrow().held.clone()
    }

    pub fn is_held(&self, input: FollowInput) -> bool {
        self.state.borrow().held.contains(input)
    }
}

impl std::fmt::Debug for FollowControl {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("FollowControl")
            .field("enabled", &state.enabled)
            .field("focused", &state.focused)
            .field("held", &state.held)
            .finish()
    }
}
