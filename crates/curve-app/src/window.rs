//! Window creation and event handling via winit.
//!
//! [`CurveApp`] implements winit's [`ApplicationHandler`]: it opens the
//! window, translates window and device events into [`InputEvent`]s on the
//! input bus, and drives [`Runner::frame`] on every redraw.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use curve_config::Config;
use curve_input::{CursorControl, CursorMode, InputBus, InputEvent, Modifiers, SharedCursor};
use curve_render::HeadlessRenderer;
use glam::{DVec2, UVec2};
use tracing::{debug, error, info, instrument, warn};
use winit::application::ApplicationHandler;
use winit::dpi::PhysicalPosition;
use winit::event::{DeviceEvent, DeviceId, ElementState, WindowEvent};
use winit::event_loop::{ActiveEventLoop, EventLoop};
use winit::window::{CursorGrabMode, Window, WindowAttributes, WindowId};

use crate::error::AppError;
use crate::reload::ConfigWatcher;
use crate::runner::Runner;

/// Returns [`WindowAttributes`] based on the given configuration.
pub fn window_attributes_from_config(config: &Config) -> WindowAttributes {
    WindowAttributes::default()
        .with_title(config.window.title.clone())
        .with_inner_size(winit::dpi::LogicalSize::new(
            f64::from(config.window.width),
            f64::from(config.window.height),
        ))
}

/// Cursor position synthesized from raw mouse motion.
///
/// A locked cursor stops producing `CursorMoved` events on most platforms,
/// so look mode integrates device deltas instead.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct VirtualCursor {
    position: DVec2,
}

impl VirtualCursor {
    pub fn position(&self) -> DVec2 {
        self.position
    }

    /// Move by a raw motion delta and return the new position.
    pub fn apply_motion(&mut self, (dx, dy): (f64, f64)) -> DVec2 {
        if dx.is_finite() && dy.is_finite() {
            self.position += DVec2::new(dx, dy);
        }
        self.position
    }

    pub fn reset(&mut self, position: DVec2) {
        self.position = position;
    }
}

/// [`CursorControl`] backed by a real window.
pub struct WinitCursor {
    window: Arc<Window>,
    mode: CursorMode,
    virtual_cursor: VirtualCursor,
}

impl WinitCursor {
    pub fn new(window: Arc<Window>) -> Self {
        Self {
            window,
            mode: CursorMode::Free,
            virtual_cursor: VirtualCursor::default(),
        }
    }

    pub fn mode(&self) -> CursorMode {
        self.mode
    }

    pub fn is_captured(&self) -> bool {
        self.mode == CursorMode::Captured
    }

    /// Feed raw motion into the virtual cursor.
    pub fn apply_motion(&mut self, delta: (f64, f64)) -> DVec2 {
        self.virtual_cursor.apply_motion(delta)
    }
}

impl CursorControl for WinitCursor {
    fn set_cursor_mode(&mut self, mode: CursorMode) {
        match mode {
            CursorMode::Captured => {
                // Locked is unsupported on some platforms (e.g. Windows); fall back to Confined.
                if self.window.set_cursor_grab(CursorGrabMode::Locked).is_err()
                    && let Err(e) = self.window.set_cursor_grab(CursorGrabMode::Confined)
                {
                    warn!("cursor grab failed: {e}");
                }
                self.window.set_cursor_visible(false);
            }
            CursorMode::Free => {
                if let Err(e) = self.window.set_cursor_grab(CursorGrabMode::None) {
                    warn!("cursor release failed: {e}");
                }
                self.window.set_cursor_visible(true);
            }
        }
        self.mode = mode;
    }

    fn set_cursor_position(&mut self, position: DVec2) {
        self.virtual_cursor.reset(position);
        if self.mode == CursorMode::Free
            && let Err(e) = self
                .window
                .set_cursor_position(PhysicalPosition::new(position.x, position.y))
        {
            debug!("cursor warp unsupported: {e}");
        }
    }

    fn window_size(&self) -> UVec2 {
        let size = self.window.inner_size();
        UVec2::new(size.width, size.height)
    }
}

/// Application state: the window, the input bus and the frame runner.
pub struct CurveApp {
    config: Config,
    bus: InputBus,
    modifiers: Modifiers,
    window: Option<Arc<Window>>,
    cursor: Option<Rc<RefCell<WinitCursor>>>,
    runner: Option<Runner<HeadlessRenderer>>,
    watcher: Option<ConfigWatcher>,
    last_frame: Instant,
    error: Option<AppError>,
}

impl CurveApp {
    pub fn new(config: Config) -> Self {
        Self {
            config,
            bus: InputBus::new(),
            modifiers: Modifiers::NONE,
            window: None,
            cursor: None,
            runner: None,
            watcher: None,
            last_frame: Instant::now(),
            error: None,
        }
    }

    /// Pick up edits to the config file while running.
    pub fn with_watcher(mut self, watcher: ConfigWatcher) -> Self {
        self.watcher = Some(watcher);
        self
    }

    /// The first fatal error hit while the event loop was running.
    pub fn take_error(&mut self) -> Option<AppError> {
        self.error.take()
    }

    fn fail(&mut self, event_loop: &ActiveEventLoop, err: AppError) {
        error!("{err}");
        self.error.get_or_insert(err);
        event_loop.exit();
    }

    fn is_captured(&self) -> bool {
        self.cursor
            .as_ref()
            .is_some_and(|cursor| cursor.borrow().is_captured())
    }

    fn redraw(&mut self) {
        let now = Instant::now();
        let frame_delta = now.duration_since(self.last_frame).as_secs_f32();
        self.last_frame = now;

        if let Some(runner) = self.runner.as_mut() {
            if let Some(watcher) = self.watcher.as_mut()
                && let Some(config) = watcher.poll(now)
            {
                runner.apply_live_settings(&config);
            }
            runner.frame(frame_delta);
        }
        if let Some(window) = &self.window {
            window.request_redraw();
        }
    }
}

impl ApplicationHandler for CurveApp {
    fn resumed(&mut self, event_loop: &ActiveEventLoop) {
        if self.window.is_some() {
            return;
        }

        let window = match event_loop.create_window(window_attributes_from_config(&self.config)) {
            Ok(window) => Arc::new(window),
            Err(e) => {
                self.fail(event_loop, e.into());
                return;
            }
        };

        let cursor = Rc::new(RefCell::new(WinitCursor::new(Arc::clone(&window))));
        let shared: SharedCursor = cursor.clone();
        let mut runner = Runner::new(&self.config, &self.bus, shared, HeadlessRenderer::new());
        let size = window.inner_size();
        runner.resize(size.width, size.height);
        runner.populate_solar_system();
        if let Err(e) = runner.start_simulation() {
            self.fail(event_loop, e.into());
            return;
        }

        info!(
            width = size.width,
            height = size.height,
            scale = window.scale_factor(),
            "window created"
        );

        window.request_redraw();
        self.last_frame = Instant::now();
        self.window = Some(window);
        self.cursor = Some(cursor);
        self.runner = Some(runner);
    }

    fn window_event(
        &mut self,
        event_loop: &ActiveEventLoop,
        _window_id: WindowId,
        event: WindowEvent,
    ) {
        match event {
            WindowEvent::CloseRequested => {
                info!("Close requested, shutting down");
                event_loop.exit();
            }
            WindowEvent::Resized(size) => {
                if let Some(runner) = self.runner.as_mut() {
                    runner.resize(size.width, size.height);
                }
            }
            WindowEvent::Focused(focused) => {
                self.bus.dispatch(InputEvent::FocusChanged(focused));
            }
            WindowEvent::ModifiersChanged(modifiers) => {
                self.modifiers = modifiers.state().into();
            }
            WindowEvent::KeyboardInput { event, .. } => {
                if let Some(input) =
                    InputEvent::from_key(event.physical_key, event.state, self.modifiers)
                {
                    self.bus.dispatch(input);
                }
            }
            WindowEvent::MouseInput {
                state: ElementState::Pressed,
                button,
                ..
            } => {
                self.bus.dispatch(InputEvent::MouseDown { button });
            }
            WindowEvent::CursorMoved { position, .. } => {
                // While captured, motion arrives through device events.
                if !self.is_captured() {
                    self.bus.dispatch(InputEvent::CursorMoved {
                        x: position.x,
                        y: position.y,
                    });
                }
            }
            WindowEvent::MouseWheel { delta, .. } => {
                self.bus.dispatch(InputEvent::from_scroll(delta));
            }
            WindowEvent::RedrawRequested => self.redraw(),
            _ => {}
        }
    }

    fn device_event(
        &mut self,
        _event_loop: &ActiveEventLoop,
        _device_id: DeviceId,
        event: DeviceEvent,
    ) {
        let DeviceEvent::MouseMotion { delta } = event else {
            return;
        };
        let Some(cursor) = &self.cursor else {
            return;
        };
        let position = {
            let mut cursor = cursor.borrow_mut();
            if !cursor.is_captured() {
                return;
            }
            cursor.apply_motion(delta)
        };
        self.bus.dispatch(InputEvent::CursorMoved {
            x: position.x,
            y: position.y,
        });
    }

    fn exiting(&mut self, _event_loop: &ActiveEventLoop) {
        if let Some(runner) = self.runner.take() {
            info!(frames = runner.frames(), "stopping simulation");
        }
    }
}

/// Open the window and run until it is closed, applying edits picked up by
/// `watcher` along the way.
///
/// Blocks the calling thread.
#[instrument(skip_all)]
pub fn run(config: Config, watcher: Option<ConfigWatcher>) -> Result<(), AppError> {
    let event_loop = EventLoop::new()?;
    let mut app = CurveApp::new(config);
    if let Some(watcher) = watcher {
        app = app.with_watcher(watcher);
    }
    event_loop.run_app(&mut app)?;
    app.take_error().map_or(Ok(()), Err)
}
