//! Error taxonomy of the engine. Every fallible public operation surfaces
//! one of these variants; there is no local recovery.

use crate::options::{ContainerOpt, TraversalOpt};
use crate::real::Real;
use std::error::Error;
use std::fmt;

/// Reason a halo particle update was rejected.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HaloUpdateReason {
    /// The supplied position lies deeper inside the box than `skin/2`.
    TooFarInside,
    /// No matching particle within `skin/2`, but the position is within
    /// `cutoff + skin/2` of the box. The skin is too small or the rebuild
    /// frequency too low.
    TooFarOutside,
}

#[derive(Clone, Debug, PartialEq)]
pub enum CoreError {
    /// `add_particle` outside `[boxMin, boxMax)`, or `add_halo_particle`
    /// inside it.
    OutOfBoundsInsert { pos: [Real; 3], halo: bool },
    /// Mutation attempted while neighbor lists are valid.
    NeighborListStillValid,
    /// Halo update would violate the skin invariant.
    HaloUpdateFailed { reason: HaloUpdateReason },
    /// Box side length below `cutoff + skin`.
    BoxTooSmall { dim: usize, length: Real, required: Real },
    /// Container received a traversal it does not support.
    TraversalTypeMismatch {
        container: ContainerOpt,
        traversal: TraversalOpt,
    },
    /// No candidate configuration is applicable.
    InvalidConfiguration,
    /// Functor post-processing called out of order.
    PostprocessingOrder(&'static str),
    /// Option setter called after the first `iterate_pairwise`.
    SetterAfterInit,
}

impl fmt::Display for CoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CoreError::OutOfBoundsInsert { pos, halo: false } => write!(
                f,
                "trying to add a particle that is not inside the bounding box: {:?}",
                pos
            ),
            CoreError::OutOfBoundsInsert { pos, halo: true } => write!(
                f,
                "trying to add a halo particle that is inside the bounding box: {:?}",
                pos
            ),
            CoreError::NeighborListStillValid => write!(
                f,
                "adding or removing particles is not allowed while neighbor lists are valid; \
                 call invalidate_lists() first"
            ),
            CoreError::HaloUpdateFailed { reason: HaloUpdateReason::TooFarInside } => write!(
                f,
                "halo particle to update is too far inside the domain (more than skin/2)"
            ),
            CoreError::HaloUpdateFailed { reason: HaloUpdateReason::TooFarOutside } => write!(
                f,
                "unable to update halo particle that is close to the domain (within cutoff + skin/2); \
                 rebuild frequency too low or skin too small"
            ),
            CoreError::BoxTooSmall { dim, length, required } => write!(
                f,
                "box side {} is too small: {} < cutoff + skin = {}",
                dim, length, required
            ),
            CoreError::TraversalTypeMismatch { container, traversal } => write!(
                f,
                "container {} does not support traversal {}",
                container, traversal
            ),
            CoreError::InvalidConfiguration => {
                write!(f, "no applicable configuration in the search space")
            }
            CoreError::PostprocessingOrder(what) => write!(f, "postprocessing order: {}", what),
            CoreError::SetterAfterInit => write!(
                f,
                "allowed options can only be changed before the first iterate_pairwise"
            ),
        }
    }
}

impl Error for CoreError {}

pub type Result<T> = std::result::Result<T, CoreError>;

// -- end of file --
