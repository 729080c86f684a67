//! Cursor control exposed by the windowing layer.

use glam::{DVec2, UVec2};
use std::cell::RefCell;
use std::rc::Rc;

/// Cursor control shared between the window and the camera controls.
pub type SharedCursor = Rc<RefCell<dyn CursorControl>>;

/// Whether the cursor is captured (look mode) or free.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CursorMode {
    /// Hidden and grabbed, motion drives the camera.
    Captured,
    /// Visible, normal cursor.
    #[default]
    Free,
}

/// Operations the controller needs from the window.
pub trait CursorControl {
    /// Capture or release the cursor.
    fn set_cursor_mode(&mut self, mode: CursorMode);

    /// Warp the cursor to a window position in physical pixels.
    fn set_cursor_position(&mut self, position: DVec2);

    /// Current inner window size in physical pixels.
    fn window_size(&self) -> UVec2;

    /// Convenience for `set_cursor_mode(Captured | Free)`.
    fn set_cursor_captured(&mut self, captured: bool) {
        self.set_cursor_mode(if captured {
            CursorMode::Captured
        } else {
            CursorMode::Free
        });
    }
}

/// A [`CursorControl`] that records calls instead of touching a window.
///
/// Used by headless runs and tests.
#[derive(Debug, Clone, Default)]
pub struct RecordingCursor {
    /// Current mode.
    pub mode: CursorMode,
    /// Last position the cursor was warped to.
    pub position: Option<DVec2>,
    /// Reported window size.
    pub size: UVec2,
    /// Number of warps performed.
    pub warps: usize,
}

impl RecordingCursor {
    /// A recorder reporting the given window size.
    #[must_use]
    pub fn with_size(width: u32, height: u32) -> Self {
        Self {
            size: UVec2::new(width, height),
            ..Self::default()
        }
    }
}

impl CursorControl for RecordingCursor {
    fn set_cursor_mode(&mut self, mode: CursorMode) {
        self.mode = mode;
    }

    fn set_cursor_position(&mut self, position: DVec2) {
        self.position = Some(position);
        self.warps += 1;
    }

    fn window_size(&self) -> UVec2 {
        self.size
    }
}
