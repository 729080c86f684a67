//! Level of detail for body meshes.
//!
//! Each [`CelestialBody`] maps one physics body onto a render mesh. The
//! mesh's segment count follows the body's apparent angular size through a
//! [`TessellationPolicy`], and a [`HysteresisBand`] keeps small camera
//! movements from rebuilding geometry every frame.

mod celestial;
mod policy;

pub use celestial::{CelestialBody, CelestialOptions};
pub use policy::{HysteresisBand, TessellationPolicy};
