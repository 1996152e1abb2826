//! Spatial containers over particle cells.

use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::options::ContainerOpt;
use crate::particle::Particle;
use crate::real::Real;
use crate::traversals::{self, TraversalSpec};

pub mod direct_sum;
pub mod linked_cells;
pub mod verlet_clusters;
pub mod verlet_lists;

pub use direct_sum::DirectSum;
pub use linked_cells::LinkedCells;
pub use verlet_clusters::VerletClusterLists;
pub use verlet_lists::VerletLists;

/// Inclusive-exclusive box membership test, `[lo, hi)` per axis.
pub fn in_box(pos: [Real; 3], lo: [Real; 3], hi: [Real; 3]) -> bool {
    (0..3).all(|k| pos[k] >= lo[k] && pos[k] < hi[k])
}

/// Geometry every container shares.
#[derive(Clone, Copy, Debug)]
pub struct Domain {
    pub box_min: [Real; 3],
    pub box_max: [Real; 3],
    pub cutoff: Real,
    pub skin: Real,
}

impl Domain {
    pub fn interaction_length(&self) -> Real {
        self.cutoff + self.skin
    }

    pub fn contains(&self, pos: [Real; 3]) -> bool {
        in_box(pos, self.box_min, self.box_max)
    }

    /// Lower corner of the halo region.
    pub fn halo_min(&self) -> [Real; 3] {
        let l = self.interaction_length();
        [self.box_min[0] - l, self.box_min[1] - l, self.box_min[2] - l]
    }

    /// Upper corner of the halo region.
    pub fn halo_max(&self) -> [Real; 3] {
        let l = self.interaction_length();
        [self.box_max[0] + l, self.box_max[1] + l, self.box_max[2] + l]
    }
}

/// The selected spatial container. Dispatch is a plain `match` over the
/// variants.
pub enum Container {
    DirectSum(DirectSum),
    LinkedCells(LinkedCells),
    VerletLists(VerletLists),
    VerletClusterLists(VerletClusterLists),
}

impl Container {
    pub fn new(
        kind: ContainerOpt,
        domain: Domain,
        cell_size_factor: Real,
        cluster_size: usize,
    ) -> Self {
        match kind {
            ContainerOpt::DirectSum => Container::DirectSum(DirectSum::new(domain)),
            ContainerOpt::LinkedCells => {
                Container::LinkedCells(LinkedCells::new(domain, cell_size_factor))
            }
            ContainerOpt::VerletLists => {
                Container::VerletLists(VerletLists::new(domain, cell_size_factor))
            }
            ContainerOpt::VerletClusterLists => {
                Container::VerletClusterLists(VerletClusterLists::new(domain, cluster_size))
            }
        }
    }

    pub fn kind(&self) -> ContainerOpt {
        match self {
            Container::DirectSum(_) => ContainerOpt::DirectSum,
            Container::LinkedCells(_) => ContainerOpt::LinkedCells,
            Container::VerletLists(_) => ContainerOpt::VerletLists,
            Container::VerletClusterLists(_) => ContainerOpt::VerletClusterLists,
        }
    }

    pub fn domain(&self) -> &Domain {
        match self {
            Container::DirectSum(c) => c.domain(),
            Container::LinkedCells(c) => c.domain(),
            Container::VerletLists(c) => c.domain(),
            Container::VerletClusterLists(c) => c.domain(),
        }
    }

    pub fn add_particle(&mut self, p: Particle) -> Result<()> {
        match self {
            Container::DirectSum(c) => c.add_particle(p),
            Container::LinkedCells(c) => c.add_particle(p),
            Container::VerletLists(c) => c.add_particle(p),
            Container::VerletClusterLists(c) => c.add_particle(p),
        }
    }

    pub fn add_halo_particle(&mut self, p: Particle) -> Result<()> {
        match self {
            Container::DirectSum(c) => c.add_halo_particle(p),
            Container::LinkedCells(c) => c.add_halo_particle(p),
            Container::VerletLists(c) => c.add_halo_particle(p),
            Container::VerletClusterLists(c) => c.add_halo_particle(p),
        }
    }

    /// Overwrites the stored copy of a halo particle with the same id
    /// within `skin/2` of the given position. Returns false when no such
    /// particle exists.
    pub fn update_halo_particle(&mut self, p: &Particle) -> bool {
        match self {
            Container::DirectSum(c) => c.update_halo_particle(p),
            Container::LinkedCells(c) => c.update_halo_particle(p),
            Container::VerletLists(c) => c.update_halo_particle(p),
            Container::VerletClusterLists(c) => c.update_halo_particle(p),
        }
    }

    pub fn delete_halo_particles(&mut self) {
        match self {
            Container::DirectSum(c) => c.delete_halo_particles(),
            Container::LinkedCells(c) => c.delete_halo_particles(),
            Container::VerletLists(c) => c.delete_halo_particles(),
            Container::VerletClusterLists(c) => c.delete_halo_particles(),
        }
    }

    pub fn delete_all_particles(&mut self) {
        match self {
            Container::DirectSum(c) => c.delete_all_particles(),
            Container::LinkedCells(c) => c.delete_all_particles(),
            Container::VerletLists(c) => c.delete_all_particles(),
            Container::VerletClusterLists(c) => c.delete_all_particles(),
        }
    }

    /// Re-bins particles that crossed cell bounds and returns the ones
    /// that left the box.
    pub fn update_container(&mut self) -> Vec<Particle> {
        match self {
            Container::DirectSum(c) => c.update_container(),
            Container::LinkedCells(c) => c.update_container(),
            Container::VerletLists(c) => c.update_container(),
            Container::VerletClusterLists(c) => c.update_container(),
        }
    }

    pub fn is_update_needed(&self) -> bool {
        match self {
            Container::DirectSum(c) => c.is_update_needed(),
            Container::LinkedCells(c) => c.is_update_needed(),
            Container::VerletLists(c) => c.is_update_needed(),
            Container::VerletClusterLists(c) => c.is_update_needed(),
        }
    }

    /// Marks derived data (neighbor lists) stale.
    pub fn invalidate_lists(&mut self) {
        match self {
            Container::DirectSum(_) | Container::LinkedCells(_) => {}
            Container::VerletLists(c) => c.invalidate_lists(),
            Container::VerletClusterLists(c) => c.invalidate_lists(),
        }
    }

    /// Number of particles, dummies excluded.
    pub fn num_particles(&self) -> usize {
        self.iter(IterBehavior::HaloAndOwned).count()
    }

    pub fn iter(&self, behavior: IterBehavior) -> ParticleIter<'_> {
        match self {
            Container::DirectSum(c) => c.iter(behavior),
            Container::LinkedCells(c) => c.iter(behavior),
            Container::VerletLists(c) => c.iter(behavior),
            Container::VerletClusterLists(c) => c.iter(behavior),
        }
    }

    /// Mutable particle access for user updates (positions, velocities).
    /// Positions may drift up to `skin/2` before lists must be rebuilt.
    pub fn iter_mut(&mut self, behavior: IterBehavior) -> ParticleIterMut<'_> {
        match self {
            Container::DirectSum(c) => c.iter_mut(behavior),
            Container::LinkedCells(c) => c.iter_mut(behavior),
            Container::VerletLists(c) => c.iter_mut(behavior),
            Container::VerletClusterLists(c) => c.iter_mut(behavior),
        }
    }

    /// Lazy iterator over a region. May yield a superset of the box;
    /// callers filter by position.
    pub fn region_iter(&self, lo: [Real; 3], hi: [Real; 3], behavior: IterBehavior) -> ParticleIter<'_> {
        match self {
            Container::DirectSum(c) => c.region_iter(lo, hi, behavior),
            Container::LinkedCells(c) => c.region_iter(lo, hi, behavior),
            Container::VerletLists(c) => c.region_iter(lo, hi, behavior),
            Container::VerletClusterLists(c) => c.region_iter(lo, hi, behavior),
        }
    }

    /// Runs one pairwise traversal under the given signature.
    pub fn iterate_pairwise<F: Functor>(&mut self, functor: &F, spec: TraversalSpec) -> Result<()> {
        if !traversals::container_supports(self.kind(), spec.traversal) {
            return Err(CoreError::TraversalTypeMismatch {
                container: self.kind(),
                traversal: spec.traversal,
            });
        }
        functor.init_traversal();
        match self {
            Container::DirectSum(c) => c.traverse(functor, spec),
            Container::LinkedCells(c) => c.traverse(functor, spec)?,
            Container::VerletLists(c) => c.traverse(functor, spec),
            Container::VerletClusterLists(c) => c.traverse(functor, spec),
        }
        functor.end_traversal(spec.newton3)
    }
}

// -- end of file --
