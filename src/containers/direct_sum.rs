//! Direct-sum container: one cell for the domain, one for the halo.

use super::{in_box, Domain};
use crate::cells::FullCell;
use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::options::DataLayoutOpt;
use crate::particle::Particle;
use crate::real::Real;
use crate::traversals::{direct_sum, TraversalSpec};

pub struct DirectSum {
    domain: Domain,
    owned: FullCell,
    halo: FullCell,
}

impl DirectSum {
    pub fn new(domain: Domain) -> Self {
        DirectSum {
            domain,
            owned: FullCell::new(),
            halo: FullCell::new(),
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn add_particle(&mut self, mut p: Particle) -> Result<()> {
        if !self.domain.contains(p.pos) {
            return Err(CoreError::OutOfBoundsInsert {
                pos: p.pos,
                halo: false,
            });
        }
        p.owned = true;
        self.owned.add(p);
        Ok(())
    }

    pub fn add_halo_particle(&mut self, mut p: Particle) -> Result<()> {
        if self.domain.contains(p.pos) {
            return Err(CoreError::OutOfBoundsInsert {
                pos: p.pos,
                halo: true,
            });
        }
        p.owned = false;
        self.halo.add(p);
        Ok(())
    }

    pub fn update_halo_particle(&mut self, p: &Particle) -> bool {
        let r = self.domain.skin / 2.0;
        for q in self.halo.iter_mut() {
            if q.id == p.id
                && in_box(
                    q.pos,
                    [p.pos[0] - r, p.pos[1] - r, p.pos[2] - r],
                    [p.pos[0] + r, p.pos[1] + r, p.pos[2] + r],
                )
            {
                *q = p.clone();
                q.owned = false;
                return true;
            }
        }
        false
    }

    pub fn delete_halo_particles(&mut self) {
        self.halo.clear();
    }

    pub fn delete_all_particles(&mut self) {
        self.owned.clear();
        self.halo.clear();
    }

    pub fn update_container(&mut self) -> Vec<Particle> {
        self.delete_halo_particles();
        let (min, max) = (self.domain.box_min, self.domain.box_max);
        self.owned.drain_matching(|p| !in_box(p.pos, min, max))
    }

    pub fn is_update_needed(&self) -> bool {
        let (min, max) = (self.domain.box_min, self.domain.box_max);
        self.owned.iter().any(|p| !in_box(p.pos, min, max))
    }

    pub fn iter(&self, behavior: IterBehavior) -> ParticleIter<'_> {
        Box::new(
            self.owned
                .iter()
                .chain(self.halo.iter())
                .filter(move |p| behavior.accepts(p)),
        )
    }

    pub fn iter_mut(&mut self, behavior: IterBehavior) -> ParticleIterMut<'_> {
        Box::new(
            self.owned
                .iter_mut()
                .chain(self.halo.iter_mut())
                .filter(move |p| behavior.accepts(p)),
        )
    }

    pub fn region_iter(&self, lo: [Real; 3], hi: [Real; 3], behavior: IterBehavior) -> ParticleIter<'_> {
        Box::new(
            self.owned
                .iter()
                .chain(self.halo.iter())
                .filter(move |p| behavior.accepts(p) && in_box(p.pos, lo, hi)),
        )
    }

    pub fn traverse<F: Functor>(&mut self, functor: &F, spec: TraversalSpec) {
        if spec.layout == DataLayoutOpt::Soa {
            self.owned.to_soa();
            self.halo.to_soa();
        }
        direct_sum::traverse(&mut self.owned, &mut self.halo, functor, spec.layout, spec.newton3);
        if spec.layout == DataLayoutOpt::Soa {
            let computed = functor.computed_attrs();
            self.owned.write_back(computed);
            self.halo.write_back(computed);
        }
    }
}


// -- end of file --
