//! Double-precision physics for Curve: bodies made of mass-carrying blocks,
//! mutual Newtonian gravity, and a background thread that steps the world
//! on a fixed cadence independent of the render rate.

pub mod body;
pub mod engine;
pub mod simulation;

pub use body::{Block, BodyDesc, BodyId, BodyKind, MassBlock};
pub use engine::{BodyHandle, GRAVITATIONAL_CONSTANT, PhysicsEngine};
pub use simulation::SimulationLoop;
