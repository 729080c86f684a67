//! Input plumbing between the window and the camera controls: the event
//! model, an injected event bus with scoped subscriptions, and the cursor
//! operations the window must provide.

pub mod bus;
pub mod cursor;
pub mod event;

pub use bus::{InputBus, Subscription};
pub use cursor::{CursorControl, CursorMode, RecordingCursor, SharedCursor};
pub use event::{InputEvent, Modifiers, PIXELS_PER_LINE};

pub use winit::event::MouseButton;
pub use winit::keyboard::KeyCode;
