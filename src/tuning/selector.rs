//! Owns the live container and rebuilds it when the tuner switches to a
//! different container kind or cell-size factor.

use crate::containers::{Container, Domain};
use crate::options::ContainerOpt;
use crate::iter::IterBehavior;
use crate::real::Real;
use tracing::{debug, trace};

pub struct ContainerSelector {
    domain: Domain,
    cluster_size: usize,
    current: Container,
    key: (ContainerOpt, Real),
}

impl ContainerSelector {
    pub fn new(
        domain: Domain,
        cluster_size: usize,
        kind: ContainerOpt,
        cell_size_factor: Real,
    ) -> Self {
        ContainerSelector {
            current: Container::new(kind, domain, cell_size_factor, cluster_size),
            key: (kind, cell_size_factor),
            domain,
            cluster_size,
        }
    }

    pub fn container(&mut self) -> &mut Container {
        &mut self.current
    }

    pub fn container_ref(&self) -> &Container {
        &self.current
    }

    /// Switches to the requested container, pulling every particle (owned
    /// and halo) out of the old one. A no-op when the key is unchanged.
    pub fn select(&mut self, kind: ContainerOpt, cell_size_factor: Real) {
        if self.key == (kind, cell_size_factor) {
            return;
        }
        debug!(container = %kind, csf = cell_size_factor, "switching container");
        let mut fresh = Container::new(kind, self.domain, cell_size_factor, self.cluster_size);
        let particles: Vec<_> = self
            .current
            .iter(IterBehavior::HaloAndOwned)
            .cloned()
            .collect();
        for p in particles {
            let result = if p.owned {
                fresh.add_particle(p)
            } else {
                fresh.add_halo_particle(p)
            };
            if result.is_err() {
                // a halo copy that drifted into the box; the boundary
                // manager resupplies halos after the next exchange
                trace!("dropping stale halo copy during container switch");
            }
        }
        fresh.invalidate_lists();
        self.current = fresh;
        self.key = (kind, cell_size_factor);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Particle;

    fn domain() -> Domain {
        Domain {
            box_min: [0.0; 3],
            box_max: [3.0; 3],
            cutoff: 1.0,
            skin: 0.2,
        }
    }

    #[test]
    fn switching_containers_preserves_particles() {
        let mut sel =
            ContainerSelector::new(domain(), 32, ContainerOpt::DirectSum, 1.0);
        for i in 0..10 {
            let x = 0.25 * (i as Real) + 0.1;
            sel.container()
                .add_particle(Particle::new(i as u64, [x, 1.0, 1.0], [0.0; 3]))
                .unwrap();
        }
        sel.container()
            .add_halo_particle(Particle::new(100, [-0.5, 1.0, 1.0], [0.0; 3]))
            .unwrap();

        sel.select(ContainerOpt::LinkedCells, 1.0);
        assert_eq!(sel.container_ref().kind(), ContainerOpt::LinkedCells);
        assert_eq!(
            sel.container_ref().iter(IterBehavior::OwnedOnly).count(),
            10
        );
        assert_eq!(
            sel.container_ref().iter(IterBehavior::HaloOnly).count(),
            1
        );

        sel.select(ContainerOpt::VerletClusterLists, 1.0);
        assert_eq!(
            sel.container_ref()
                .iter(IterBehavior::HaloAndOwned)
                .count(),
            11
        );
    }

    #[test]
    fn same_key_is_a_no_op() {
        let mut sel =
            ContainerSelector::new(domain(), 32, ContainerOpt::LinkedCells, 1.0);
        sel.container()
            .add_particle(Particle::new(0, [1.0; 3], [0.0; 3]))
            .unwrap();
        sel.select(ContainerOpt::LinkedCells, 1.0);
        assert_eq!(
            sel.container_ref()
                .iter(IterBehavior::HaloAndOwned)
                .count(),
            1
        );
    }
}

// -- end of file --
