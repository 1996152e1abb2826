//! Gatekeeper between the public entry points and the auto-tuner: keeps
//! the container and its neighbor lists in one coherent validity state.

use crate::containers::in_box;
use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::particle::Particle;
use crate::real::Real;
use crate::error::HaloUpdateReason;
use crate::tuning::AutoTuner;
use tracing::debug;

pub struct LogicHandler {
    tuner: AutoTuner,
    rebuild_frequency: usize,
    steps_since_rebuild: usize,
    container_valid: bool,
}

impl LogicHandler {
    pub fn new(tuner: AutoTuner, rebuild_frequency: usize) -> Result<Self> {
        let domain = *tuner.container_ref().domain();
        let required = domain.cutoff + domain.skin;
        for dim in 0..3 {
            let length = domain.box_max[dim] - domain.box_min[dim];
            if length < required {
                return Err(CoreError::BoxTooSmall {
                    dim,
                    length,
                    required,
                });
            }
        }
        Ok(LogicHandler {
            tuner,
            rebuild_frequency: rebuild_frequency.max(1),
            steps_since_rebuild: usize::MAX,
            container_valid: false,
        })
    }

    pub fn tuner(&self) -> &AutoTuner {
        &self.tuner
    }

    pub fn tuner_mut(&mut self) -> &mut AutoTuner {
        &mut self.tuner
    }

    /// Neighbor lists are valid iff the flag survived since the last
    /// rebuild, the rebuild interval has not elapsed, and the tuner will
    /// not switch configurations on the next call.
    pub fn is_container_valid(&self) -> bool {
        self.container_valid
            && self.steps_since_rebuild < self.rebuild_frequency
            && !self.tuner.will_rebuild()
    }

    pub fn add_particle(&mut self, p: Particle) -> Result<()> {
        if self.is_container_valid() {
            return Err(CoreError::NeighborListStillValid);
        }
        self.container_valid = false;
        self.tuner.container().add_particle(p)
    }

    pub fn add_halo_particle(&mut self, p: Particle) -> Result<()> {
        if self.is_container_valid() {
            return Err(CoreError::NeighborListStillValid);
        }
        self.container_valid = false;
        self.tuner.container().add_halo_particle(p)
    }

    /// Inserts the halo particle while lists are invalid, or refreshes the
    /// stored copy in place while they are valid.
    pub fn add_or_update_halo_particle(&mut self, p: Particle) -> Result<()> {
        if !self.is_container_valid() {
            self.container_valid = false;
            return self.tuner.container().add_halo_particle(p);
        }

        let domain = *self.tuner.container_ref().domain();
        let half_skin = domain.skin / 2.0;
        let inner_min = add_scalar(domain.box_min, half_skin);
        let inner_max = add_scalar(domain.box_max, -half_skin);
        if in_box(p.pos, inner_min, inner_max) {
            return Err(CoreError::HaloUpdateFailed {
                reason: HaloUpdateReason::TooFarInside,
            });
        }

        if self.tuner.container().update_halo_particle(&p) {
            return Ok(());
        }

        // no match: only an error if the particle is close enough to the
        // box that its pair contributions would matter
        let reach = domain.cutoff + half_skin;
        let outer_min = add_scalar(domain.box_min, -reach);
        let outer_max = add_scalar(domain.box_max, reach);
        if in_box(p.pos, outer_min, outer_max) {
            debug!(id = p.id, "halo update failed within the dangerous zone");
            return Err(CoreError::HaloUpdateFailed {
                reason: HaloUpdateReason::TooFarOutside,
            });
        }
        Ok(())
    }

    /// Flushes particles that left the box. A no-op while lists are valid.
    pub fn update_container(&mut self) -> Vec<Particle> {
        if self.is_container_valid() {
            debug!("skipping container update");
            return Vec::new();
        }
        debug!("initiating container update");
        self.container_valid = false;
        self.tuner.container().update_container()
    }

    pub fn delete_halo_particles(&mut self) {
        self.container_valid = false;
        self.tuner.container().delete_halo_particles();
    }

    pub fn delete_all_particles(&mut self) {
        self.container_valid = false;
        self.tuner.container().delete_all_particles();
    }

    pub fn invalidate_lists(&mut self) {
        self.container_valid = false;
        self.tuner.container().invalidate_lists();
    }

    pub fn iterate_pairwise<F: Functor>(&mut self, functor: &F) -> Result<()> {
        let do_rebuild = !self.is_container_valid();
        self.tuner.iterate_pairwise(functor, do_rebuild)?;
        if do_rebuild {
            self.container_valid = true;
            self.steps_since_rebuild = 0;
        }
        self.steps_since_rebuild = self.steps_since_rebuild.saturating_add(1);
        Ok(())
    }

    pub fn iter(&self, behavior: IterBehavior) -> ParticleIter<'_> {
        self.tuner.container_ref().iter(behavior)
    }

    pub fn iter_mut(&mut self, behavior: IterBehavior) -> ParticleIterMut<'_> {
        self.tuner.container().iter_mut(behavior)
    }

    pub fn region_iter(&self, lo: [Real; 3], hi: [Real; 3], behavior: IterBehavior) -> ParticleIter<'_> {
        self.tuner.container_ref().region_iter(lo, hi, behavior)
    }

    pub fn num_particles(&self) -> usize {
        self.tuner.container_ref().num_particles()
    }
}

fn add_scalar(v: [Real; 3], s: Real) -> [Real; 3] {
    [v[0] + s, v[1] + s, v[2] + s]
}


// -- end of file --
