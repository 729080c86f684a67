//! Frame orchestration: the physics engine ticks on its own thread while
//! every rendered frame drives the player, refreshes the celestial bodies
//! and hands the result to the renderer.

use std::time::Duration;

use curve_config::Config;
use curve_input::{InputBus, SharedCursor};
use curve_lod::{CelestialBody, CelestialOptions, HysteresisBand, TessellationPolicy};
use curve_math::ScaleFactor;
use curve_physics::{
    BodyDesc, BodyHandle, BodyId, BodyKind, MassBlock, PhysicsEngine, SimulationLoop,
};
use curve_player::{FollowControl, FollowSettings, Player};
use curve_render::{Camera, Material, Mesh, Renderer};
use glam::DVec3;
use tracing::{debug, info, instrument};

/// Speed of light in meters per second.
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

const SUN_RADIUS: f64 = 6.9634e8;
const SUN_MASS: f64 = 3.955e30;
const EARTH_RADIUS: f64 = 6.371e6;
const EARTH_MASS: f64 = 5.972e24;
const MOON_RADIUS: f64 = 1.7374e6;
const MOON_MASS: f64 = 7.347_673_09e22;

const SUN_COLOR: Material = Material::new(1.0, 0.5, 0.2);
const EARTH_COLOR: Material = Material::new(0.0, 0.0, 1.0);
const MOON_COLOR: Material = Material::new(0.6, 0.6, 0.6);

/// Far clipping plane in render units: two light-hours.
pub fn far_plane(scale: ScaleFactor) -> f32 {
    scale.to_render_distance(2.0 * 3600.0 * SPEED_OF_LIGHT) as f32
}

/// Controller tuning from the `camera` section. Rotation speed is stored
/// in degrees per second on disk.
pub fn follow_settings(config: &Config) -> FollowSettings {
    FollowSettings {
        min_fov: config.camera.min_fov,
        max_fov: config.camera.max_fov,
        move_speed: config.camera.move_speed,
        mouse_sensitivity: config.camera.mouse_sensitivity,
        key_rotation_speed: config.camera.key_rotation_speed.to_radians(),
        key_zoom_speed: config.camera.key_zoom_speed,
    }
}

/// Handles to the bodies of the startup scene.
#[derive(Debug, Clone)]
pub struct SolarSystem {
    pub sun: BodyHandle,
    pub earth: BodyHandle,
    pub moon: BodyHandle,
}

/// Owns the scene and runs one rendered frame at a time.
pub struct Runner<R: Renderer> {
    tick_interval: Duration,
    engine: PhysicsEngine,
    simulation: Option<SimulationLoop>,
    player: Player,
    bodies: Vec<CelestialBody>,
    options: CelestialOptions,
    renderer: R,
    frames: u64,
}

impl<R: Renderer> Runner<R> {
    /// Build the camera, controller and player from `config`.
    ///
    /// The player's body is spawned at the origin; nothing else exists
    /// until [`populate_solar_system`](Self::populate_solar_system) or
    /// [`spawn_celestial`](Self::spawn_celestial) is called. The simulation
    /// is not running until [`start_simulation`](Self::start_simulation).
    pub fn new(config: &Config, bus: &InputBus, cursor: SharedCursor, renderer: R) -> Self {
        let scale = ScaleFactor::new(config.simulation.position_scale);
        let mut camera = Camera::perspective(
            config.camera.fov,
            1.0,
            config.camera.near,
            far_plane(scale),
        );
        camera.set_aspect_ratio(config.window.width as f32, config.window.height as f32);

        let control =
            FollowControl::new(camera.into_shared(), bus, cursor, follow_settings(config));

        let engine = PhysicsEngine::new();
        let body = engine.spawn(BodyDesc::new(BodyKind::Living, DVec3::ZERO), |_| {});
        let player = Player::new(control, body, scale);

        let options = CelestialOptions {
            policy: TessellationPolicy::from_projection(
                config.lod.projection_near,
                config.lod.projection_fov,
                config.lod.default_segments,
                config.lod.max_segments,
            ),
            band: HysteresisBand::new(config.lod.hysteresis_closer, config.lod.hysteresis_farther),
            scale,
        };

        Self {
            tick_interval: Duration::from_millis(config.simulation.tick_interval_ms),
            engine,
            simulation: None,
            player,
            bodies: Vec::new(),
            options,
            renderer,
            frames: 0,
        }
    }

    /// Register a body with the physics engine. Once placed, it receives a
    /// [`MassBlock`] and a [`CelestialBody`] adapter seen from the player.
    pub fn spawn_celestial(
        &mut self,
        desc: BodyDesc,
        mass: f64,
        radius: f64,
        material: Material,
    ) -> BodyHandle {
        let camera_position = self.player.world_position();
        let options = self.options.clone();
        let bodies = &mut self.bodies;
        self.engine.spawn(desc, |body| {
            body.add_block(MassBlock::new(mass, radius));
            bodies.push(CelestialBody::attach(body.clone(), material, camera_position, options));
        })
    }

    /// Remove a body from the physics engine together with its adapter.
    /// Returns false if the body did not exist.
    pub fn remove_celestial(&mut self, id: BodyId) -> bool {
        let removed = self.engine.remove(id);
        self.bodies.retain(|body| body.body_id() != id);
        if removed {
            info!(body = %id, "celestial body removed");
        }
        removed
    }

    /// Sun, earth and moon, with the player placed just above earth.
    #[instrument(skip(self))]
    pub fn populate_solar_system(&mut self) -> SolarSystem {
        let sun = self.spawn_celestial(
            BodyDesc::new(BodyKind::Natural, DVec3::ZERO).with_velocity(DVec3::new(0.0, 1.0, 0.0)),
            SUN_MASS,
            SUN_RADIUS,
            SUN_COLOR,
        );
        let earth = self.spawn_celestial(
            BodyDesc::new(BodyKind::Natural, DVec3::new(-1.496e11, 0.0, 0.0))
                .with_parent(sun.id())
                .with_velocity(DVec3::new(0.0, 0.0, 2.972_22e4)),
            EARTH_MASS,
            EARTH_RADIUS,
            EARTH_COLOR,
        );

        self.player.body().attach_to(
            &earth,
            DVec3::new(-EARTH_RADIUS, EARTH_RADIUS + 1.0e7, 0.0),
            DVec3::ZERO,
        );

        let moon = self.spawn_celestial(
            BodyDesc::new(BodyKind::Natural, DVec3::new(-3.0e8, 1.0e7, 0.0))
                .with_parent(earth.id())
                .with_velocity(DVec3::new(0.0, 0.0, -1.022e3)),
            MOON_MASS,
            MOON_RADIUS,
            MOON_COLOR,
        );

        info!(
            sun = %sun.id(),
            earth = %earth.id(),
            moon = %moon.id(),
            player = %self.player.body().id(),
            "solar system populated"
        );
        SolarSystem { sun, earth, moon }
    }

    /// Start the background simulation. Calling it twice is a no-op.
    pub fn start_simulation(&mut self) -> std::io::Result<()> {
        if self.simulation.is_none() {
            let simulation = SimulationLoop::start(self.engine.clone(), self.tick_interval)?;
            info!(interval = ?self.tick_interval, "simulation started");
            self.simulation = Some(simulation);
        }
        Ok(())
    }

    /// One rendered frame: controls first, then every body's render state,
    /// then the draw.
    ///
    /// Adapters whose body was removed from the engine behind the runner's
    /// back are dropped here.
    pub fn frame(&mut self, frame_delta: f32) {
        self.player.frame(frame_delta);

        self.bodies.retain(|body| {
            let alive = body.is_alive();
            if !alive {
                debug!(body = %body.body_id(), "dropping adapter of removed body");
            }
            alive
        });

        let camera_position = self.player.world_position();
        for body in &mut self.bodies {
            body.refresh(camera_position, frame_delta);
        }

        let camera = self.player.camera();
        let camera = camera.borrow();
        let meshes: Vec<&Mesh> = self.bodies.iter().map(CelestialBody::mesh).collect();
        self.renderer.render(&camera, &meshes);

        self.frames += 1;
        if self.frames % 600 == 0 {
            debug!(frames = self.frames, bodies = self.bodies.len(), "frame");
        }
    }

    /// Apply the settings that can change while running: the controller
    /// tuning. Scale, window and LOD settings take effect on restart.
    pub fn apply_live_settings(&mut self, config: &Config) {
        let settings = follow_settings(config);
        if settings != self.player.control().settings() {
            self.player.control().set_settings(settings);
            info!(?settings, "camera controls updated");
        }
    }

    /// Follow a window resize.
    pub fn resize(&mut self, width: u32, height: u32) {
        self.player
            .camera()
            .borrow_mut()
            .set_aspect_ratio(width as f32, height as f32);
    }

    pub fn frames(&self) -> u64 {
        self.frames
    }

    pub fn engine(&self) -> &PhysicsEngine {
        &self.engine
    }

    pub fn player(&self) -> &Player {
        &self.player
    }

    pub fn bodies(&self) -> &[CelestialBody] {
        &self.bodies
    }

    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    pub fn is_simulating(&self) -> bool {
        self.simulation.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use curve_input::{InputEvent, KeyCode, Modifiers, MouseButton, RecordingCursor};
    use curve_render::HeadlessRenderer;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn runner(bus: &InputBus) -> (Runner<HeadlessRenderer>, Rc<RefCell<RecordingCursor>>) {
        let cursor = Rc::new(RefCell::new(RecordingCursor::with_size(800, 600)));
        let runner = Runner::new(&Config::default(), bus, cursor.clone(), HeadlessRenderer::new());
        (runner, cursor)
    }

    #[test]
    fn test_far_plane_is_two_light_hours() {
        let scale = ScaleFactor::default();
        let expected = 2.0 * 3600.0 * SPEED_OF_LIGHT / 8_388_608.0;
        assert!((far_plane(scale) as f64 - expected).abs() / expected < 1e-6);
    }

    #[test]
    fn test_camera_built_from_config() {
        let bus = InputBus::new();
        let (runner, _) = runner(&bus);
        let camera = runner.player().camera();
        let camera = camera.borrow();
        assert_eq!(camera.fov(), 60.0);
        assert_eq!(camera.near, 0.01);
        assert_eq!(camera.far, far_plane(ScaleFactor::default()));
        assert!((camera.aspect_ratio - 800.0 / 600.0).abs() < 1e-6);
    }

    #[test]
    fn test_player_spawned_as_living_body() {
        let bus = InputBus::new();
        let (runner, _) = runner(&bus);
        assert_eq!(runner.engine().body_count(), 1);
        assert_eq!(runner.player().body().kind(), BodyKind::Living);
        assert_eq!(runner.player().world_position(), DVec3::ZERO);
        assert!(runner.bodies().is_empty());
    }

    #[test]
    fn test_spawn_celestial_attaches_one_adapter() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        let body = runner.spawn_celestial(
            BodyDesc::new(BodyKind::Natural, DVec3::new(1.0e11, 0.0, 0.0)),
            SUN_MASS,
            SUN_RADIUS,
            SUN_COLOR,
        );
        assert_eq!(runner.bodies().len(), 1);
        let adapter = &runner.bodies()[0];
        assert_eq!(adapter.body_id(), body.id());
        assert_eq!(adapter.mass(), SUN_MASS);
        assert_eq!(adapter.radius(), SUN_RADIUS);
        assert_eq!(body.mass(), SUN_MASS);
        assert_eq!(adapter.mesh().material(), &SUN_COLOR);
    }

    #[test]
    fn test_populate_solar_system_layout() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        let system = runner.populate_solar_system();

        assert_eq!(runner.engine().body_count(), 4);
        assert_eq!(runner.bodies().len(), 3);

        assert_eq!(system.sun.position(), DVec3::ZERO);
        assert_eq!(system.earth.position(), DVec3::new(-1.496e11, 0.0, 0.0));
        assert_eq!(system.earth.parent(), Some(system.sun.id()));
        assert_eq!(system.earth.velocity(), DVec3::new(0.0, 1.0, 2.972_22e4));

        let moon_offset = system.moon.position() - system.earth.position();
        assert!((moon_offset - DVec3::new(-3.0e8, 1.0e7, 0.0)).length() < 1e-3);
        assert_eq!(system.moon.parent(), Some(system.earth.id()));

        let player = runner.player();
        assert_eq!(player.body().parent(), Some(system.earth.id()));
        let player_offset = player.world_position() - system.earth.position();
        let expected = DVec3::new(-EARTH_RADIUS, EARTH_RADIUS + 1.0e7, 0.0);
        assert!((player_offset - expected).length() < 1e-3);
        assert_eq!(player.velocity(), system.earth.velocity());
    }

    #[test]
    fn test_frame_renders_every_body() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        runner.populate_solar_system();

        runner.frame(0.016);

        let stats = runner.renderer().stats();
        assert_eq!(stats.frames, 1);
        assert_eq!(stats.meshes, 3);
        assert_eq!(stats.uploads, 3);
        assert_eq!(runner.frames(), 1);
        assert!(runner.renderer().last_view_projection().is_some());
    }

    #[test]
    fn test_frame_follows_physics_positions() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        runner.populate_solar_system();
        runner.engine().step(60.0);

        runner.frame(0.016);

        let scale = ScaleFactor::default();
        for adapter in runner.bodies() {
            let body = runner.engine().handle(adapter.body_id()).expect("body alive");
            assert_eq!(adapter.mesh().position, scale.to_render(body.position()));
        }
        let camera = runner.player().camera();
        assert_eq!(
            camera.borrow().position,
            scale.to_render(runner.player().world_position())
        );
    }

    #[test]
    fn test_held_key_changes_player_velocity() {
        let bus = InputBus::new();
        let (mut runner, cursor) = runner(&bus);
        runner.populate_solar_system();
        let before = runner.player().velocity();

        bus.dispatch(InputEvent::MouseDown {
            button: MouseButton::Left,
        });
        assert_eq!(cursor.borrow().warps, 1);
        bus.dispatch(InputEvent::KeyDown {
            key: KeyCode::Space,
            modifiers: Modifiers::NONE,
        });
        runner.frame(0.5);

        let delta = runner.player().velocity() - before;
        assert!((delta - DVec3::new(0.0, 5.0e5, 0.0)).length() < 1.0);
    }

    #[test]
    fn test_frame_drops_adapter_of_removed_body() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        let system = runner.populate_solar_system();
        runner.frame(0.016);

        assert!(runner.engine().remove(system.moon.id()));
        runner.frame(0.016);

        assert_eq!(runner.bodies().len(), 2);
        assert!(runner.bodies().iter().all(|b| b.body_id() != system.moon.id()));
        assert_eq!(runner.renderer().stats().meshes, 2);
    }

    #[test]
    fn test_remove_celestial() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        let system = runner.populate_solar_system();

        assert!(runner.remove_celestial(system.earth.id()));
        assert!(!system.earth.is_alive());
        assert_eq!(runner.bodies().len(), 2);
        assert!(!runner.remove_celestial(system.earth.id()));

        runner.frame(0.016);
        assert_eq!(runner.renderer().stats().meshes, 2);
    }

    #[test]
    fn test_live_settings_reach_controller() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        let mut config = Config::default();
        config.camera.move_speed = 42.0;
        config.camera.key_rotation_speed = 90.0;

        runner.apply_live_settings(&config);

        let settings = runner.player().control().settings();
        assert_eq!(settings.move_speed, 42.0);
        assert!((settings.key_rotation_speed - std::f32::consts::FRAC_PI_2).abs() < 1e-6);
    }

    #[test]
    fn test_resize_updates_aspect() {
        let bus = InputBus::new();
        let (mut runner, _) = runner(&bus);
        runner.resize(1920, 1080);
        let camera = runner.player().camera();
        assert!((camera.borrow().aspect_ratio - 1920.0 / 1080.0).abs() < 1e-6);
    }

    #[test]
    fn test_simulation_advances_bodies() {
        let bus = InputBus::new();
        let config = Config {
            simulation: curve_config::SimulationConfig {
                tick_interval_ms: 1,
                ..Default::default()
            },
            ..Default::default()
        };
        let cursor = Rc::new(RefCell::new(RecordingCursor::with_size(800, 600)));
        let mut runner = Runner::new(&config, &bus, cursor, HeadlessRenderer::new());
        let system = runner.populate_solar_system();
        let start = system.earth.position();

        runner.start_simulation().expect("simulation thread");
        runner.start_simulation().expect("second start is a no-op");
        assert!(runner.is_simulating());
        std::thread::sleep(Duration::from_millis(50));

        assert_ne!(system.earth.position(), start);
    }
}
