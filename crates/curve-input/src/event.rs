//! Window input events, reduced to what the camera controls consume.
//!
//! Events are built from winit's pieces (physical key, element state,
//! scroll delta) so they can be constructed in tests without a window.

use winit::event::{ElementState, MouseButton, MouseScrollDelta};
use winit::keyboard::{KeyCode, ModifiersState, PhysicalKey};

/// Pixels of trackpad scroll treated as one wheel line.
pub const PIXELS_PER_LINE: f64 = 40.0;

// ── Modifiers ───────────────────────────────────────────────────────

/// Modifier key bitflags. Combines via bitwise OR.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers(pub u8);

impl Modifiers {
    /// No modifiers.
    pub const NONE: Self = Self(0);
    /// Shift key.
    pub const SHIFT: Self = Self(1 << 0);
    /// Control key.
    pub const CTRL: Self = Self(1 << 1);
    /// Alt key.
    pub const ALT: Self = Self(1 << 2);
    /// Super/Meta/Win key.
    pub const SUPER: Self = Self(1 << 3);

    /// Returns true if `self` contains all bits in `other`.
    #[must_use]
    pub fn contains(self, other: Self) -> bool {
        self.0 & other.0 == other.0
    }

    /// Returns true if no modifier bits are set.
    #[must_use]
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl std::ops::BitOr for Modifiers {
    type Output = Self;
    fn bitor(self, rhs: Self) -> Self {
        Self(self.0 | rhs.0)
    }
}

impl std::ops::BitOrAssign for Modifiers {
    fn bitor_assign(&mut self, rhs: Self) {
        self.0 |= rhs.0;
    }
}

impl From<ModifiersState> for Modifiers {
    fn from(state: ModifiersState) -> Self {
        let mut mods = Self::NONE;
        if state.shift_key() {
            mods |= Self::SHIFT;
        }
        if state.control_key() {
            mods |= Self::CTRL;
        }
        if state.alt_key() {
            mods |= Self::ALT;
        }
        if state.super_key() {
            mods |= Self::SUPER;
        }
        mods
    }
}

// ── InputEvent ──────────────────────────────────────────────────────

/// A single input event delivered through the [`InputBus`](crate::InputBus).
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputEvent {
    /// A mouse button went down.
    MouseDown { button: MouseButton },
    /// The cursor moved to a window position in physical pixels.
    CursorMoved { x: f64, y: f64 },
    /// Scroll wheel motion in lines, positive away from the user.
    Scroll { x_offset: f64, y_offset: f64 },
    /// A key went down. Auto-repeat is delivered as repeated key-downs.
    KeyDown { key: KeyCode, modifiers: Modifiers },
    /// A key was released.
    KeyUp { key: KeyCode, modifiers: Modifiers },
    /// The window gained (`true`) or lost (`false`) focus.
    FocusChanged(bool),
}

impl InputEvent {
    /// Build a key event from a physical key and its element state.
    ///
    /// Returns `None` for keys winit could not identify.
    pub fn from_key(key: PhysicalKey, state: ElementState, modifiers: Modifiers) -> Option<Self> {
        let PhysicalKey::Code(key) = key else {
            return None;
        };
        Some(match state {
            ElementState::Pressed => Self::KeyDown { key, modifiers },
            ElementState::Released => Self::KeyUp { key, modifiers },
        })
    }

    /// Build a scroll event, normalizing pixel deltas to lines.
    pub fn from_scroll(delta: MouseScrollDelta) -> Self {
        match delta {
            MouseScrollDelta::LineDelta(x, y) => Self::Scroll {
                x_offset: f64::from(x),
                y_offset: f64::from(y),
            },
            MouseScrollDelta::PixelDelta(pos) => Self::Scroll {
                x_offset: pos.x / PIXELS_PER_LINE,
                y_offset: pos.y / PIXELS_PER_LINE,
            },
        }
    }

    /// Whether every coordinate carried by the event is finite.
    pub fn is_well_formed(&self) -> bool {
        match *self {
            Self::CursorMoved { x, y } => x.is_finite() && y.is_finite(),
            Self::Scroll { x_offset, y_offset } => x_offset.is_finite() && y_offset.is_finite(),
            _ => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use winit::dpi::PhysicalPosition;

    #[test]
    fn test_modifiers_from_state() {
        let mods = Modifiers::from(ModifiersState::ALT | ModifiersState::SHIFT);
        assert!(mods.contains(Modifiers::ALT));
        assert!(mods.contains(Modifiers::SHIFT));
        assert!(!mods.contains(Modifiers::CTRL));
        assert!(Modifiers::from(ModifiersState::empty()).is_empty());
    }

    #[test]
    fn test_key_event_from_pressed() {
        let event = InputEvent::from_key(
            PhysicalKey::Code(KeyCode::KeyW),
            ElementState::Pressed,
            Modifiers::NONE,
        );
        assert_eq!(
            event,
            Some(InputEvent::KeyDown {
                key: KeyCode::KeyW,
                modifiers: Modifiers::NONE
            })
        );
    }

    #[test]
    fn test_key_event_from_released() {
        let event = InputEvent::from_key(
            PhysicalKey::Code(KeyCode::ArrowUp),
            ElementState::Released,
            Modifiers::ALT,
        );
        assert!(matches!(
            event,
            Some(InputEvent::KeyUp {
                key: KeyCode::ArrowUp,
                ..
            })
        ));
    }

    #[test]
    fn test_unidentified_key_dropped() {
        let key = PhysicalKey::Unidentified(winit::keyboard::NativeKeyCode::Unidentified);
        assert!(InputEvent::from_key(key, ElementState::Pressed, Modifiers::NONE).is_none());
    }

    #[test]
    fn test_pixel_scroll_normalized() {
        let event = InputEvent::from_scroll(MouseScrollDelta::PixelDelta(PhysicalPosition::new(
            0.0, 80.0,
        )));
        assert_eq!(
            event,
            InputEvent::Scroll {
                x_offset: 0.0,
                y_offset: 2.0
            }
        );
    }

    #[test]
    fn test_non_finite_cursor_is_malformed() {
        assert!(
            !InputEvent::CursorMoved {
                x: f64::NAN,
                y: 1.0
            }
            .is_well_formed()
        );
        assert!(InputEvent::CursorMoved { x: 3.0, y: 4.0 }.is_well_formed());
        assert!(InputEvent::FocusChanged(false).is_well_formed());
    }
}
