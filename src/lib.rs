//! tuna: auto-tuning particle containers for short-range pairwise
//! interactions.
//!
//! Given a fixed simulation box, a cutoff radius and a user-supplied
//! pairwise kernel (the [`Functor`]), the engine transparently selects and
//! executes the best-performing combination of spatial container,
//! traversal schedule, data layout and Newton's-third-law optimization by
//! timing candidate configurations and reevaluating periodically.
//!
//! ```
//! use tuna::{IterBehavior, LennardJones, Particle, Tuna, TunaConfig};
//!
//! let mut tuna = Tuna::new(TunaConfig {
//!     box_min: [0.0; 3],
//!     box_max: [4.0; 3],
//!     cutoff: 1.0,
//!     ..Default::default()
//! })
//! .unwrap();
//!
//! tuna.add_particle(Particle::new(0, [1.0, 1.0, 1.0], [0.0; 3])).unwrap();
//! tuna.add_particle(Particle::new(1, [1.8, 1.0, 1.0], [0.0; 3])).unwrap();
//!
//! let lj = LennardJones::new(1.0, 1.0, 1.0);
//! tuna.iterate_pairwise(&lj).unwrap();
//!
//! for p in tuna.iter(IterBehavior::OwnedOnly) {
//!     println!("{}: {:?}", p.id, p.force);
//! }
//! ```

pub mod cells;
pub mod containers;
pub mod error;
pub mod facade;
pub mod functors;
pub mod iter;
pub mod layout;
pub mod logic;
pub mod options;
pub mod particle;
pub mod soa;
pub mod traversals;
pub mod tuning;

pub mod real {
    #[cfg(all(feature = "f32", not(feature = "f64")))]
    pub type Real = f32;

    #[cfg(any(feature = "f64", not(feature = "f32")))]
    pub type Real = f64;
}

pub use crate::error::{CoreError, HaloUpdateReason, Result};
pub use crate::facade::{Tuna, TunaConfig};
pub use crate::functors::{Functor, LennardJones};
pub use crate::iter::IterBehavior;
pub use crate::options::{
    AcquisitionOpt, ContainerOpt, DataLayoutOpt, Newton3Opt, TraversalOpt, TuningStrategyOpt,
};
pub use crate::particle::{Attr, Particle};
pub use crate::real::Real;

// -- end of file --
