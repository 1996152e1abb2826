//! Verlet-lists container: a linked-cells substrate plus per-particle
//! neighbor lists over `cutoff + skin`.

use super::{Domain, LinkedCells};
use crate::error::Result;
use crate::functors::{Functor, NeighborLists};
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::layout;
use crate::options::DataLayoutOpt;
use crate::particle::Particle;
use crate::real::Real;
use crate::traversals::verlet::{self, Slot};
use crate::traversals::TraversalSpec;
use tracing::debug;

pub struct VerletLists {
    lc: LinkedCells,
    slots: Vec<Slot>,
    lists: NeighborLists,
    lists_newton3: bool,
    lists_valid: bool,
}

impl VerletLists {
    pub fn new(domain: Domain, cell_size_factor: Real) -> Self {
        VerletLists {
            lc: LinkedCells::new(domain, cell_size_factor),
            slots: Vec::new(),
            lists: Vec::new(),
            lists_newton3: false,
            lists_valid: false,
        }
    }

    pub fn domain(&self) -> &Domain {
        self.lc.domain()
    }

    pub fn add_particle(&mut self, p: Particle) -> Result<()> {
        self.lists_valid = false;
        self.lc.add_particle(p)
    }

    pub fn add_halo_particle(&mut self, p: Particle) -> Result<()> {
        self.lists_valid = false;
        self.lc.add_halo_particle(p)
    }

    /// In-place halo refresh; drifts below `skin/2` keep the lists usable.
    pub fn update_halo_particle(&mut self, p: &Particle) -> bool {
        self.lc.update_halo_particle(p)
    }

    pub fn delete_halo_particles(&mut self) {
        self.lists_valid = false;
        self.lc.delete_halo_particles();
    }

    pub fn delete_all_particles(&mut self) {
        self.lists_valid = false;
        self.lc.delete_all_particles();
    }

    pub fn update_container(&mut self) -> Vec<Particle> {
        self.lists_valid = false;
        self.lc.update_container()
    }

    pub fn is_update_needed(&self) -> bool {
        self.lc.is_update_needed()
    }

    pub fn invalidate_lists(&mut self) {
        self.lists_valid = false;
    }

    pub fn iter(&self, behavior: IterBehavior) -> ParticleIter<'_> {
        self.lc.iter(behavior)
    }

    pub fn iter_mut(&mut self, behavior: IterBehavior) -> ParticleIterMut<'_> {
        self.lc.iter_mut(behavior)
    }

    pub fn region_iter(&self, lo: [Real; 3], hi: [Real; 3], behavior: IterBehavior) -> ParticleIter<'_> {
        self.lc.region_iter(lo, hi, behavior)
    }

    /// Builds neighbor lists over `cutoff + skin`: half lists when the
    /// traversal applies Newton3, full lists otherwise.
    fn rebuild_lists(&mut self, newton3: bool) {
        let dims = self.lc.dims;
        let mut cell_offset = vec![0usize; self.lc.cells.len()];
        let mut n = 0;
        for (ci, cell) in self.lc.cells.iter().enumerate() {
            cell_offset[ci] = n;
            n += cell.len();
        }

        self.slots.clear();
        for (ci, cell) in self.lc.cells.iter().enumerate() {
            for pi in 0..cell.len() {
                self.slots.push((ci as u32, pi as u32));
            }
        }

        let r2 = {
            let r = self.lc.domain().interaction_length();
            r * r
        };
        self.lists = vec![Vec::new(); n];

        for (i, &(ci, pi)) in self.slots.iter().enumerate() {
            let pos = self.lc.cells[ci as usize].get(pi as usize).pos;
            let cz = ci as usize / (dims[0] * dims[1]);
            let cy = (ci as usize / dims[0]) % dims[1];
            let cx = ci as usize % dims[0];
            for dz in -1isize..=1 {
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        let nx = cx as isize + dx;
                        let ny = cy as isize + dy;
                        let nz = cz as isize + dz;
                        if nx < 0
                            || ny < 0
                            || nz < 0
                            || nx >= dims[0] as isize
                            || ny >= dims[1] as isize
                            || nz >= dims[2] as isize
                        {
                            continue;
                        }
                        let nc = nx as usize + dims[0] * (ny as usize + dims[1] * nz as usize);
                        let other = &self.lc.cells[nc];
                        for (pj, q) in other.iter().enumerate() {
                            let j = cell_offset[nc] + pj;
                            if j == i || (newton3 && j < i) {
                                continue;
                            }
                            let dr = [
                                pos[0] - q.pos[0],
                                pos[1] - q.pos[1],
                                pos[2] - q.pos[2],
                            ];
                            let d2 = dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2];
                            if d2 <= r2 {
                                self.lists[i].push(j as u32);
                            }
                        }
                    }
                }
            }
        }

        self.lists_newton3 = newton3;
        self.lists_valid = true;
        debug!(
            particles = n,
            newton3, "rebuilt verlet neighbor lists"
        );
    }

    pub fn traverse<F: Functor>(&mut self, functor: &F, spec: TraversalSpec) {
        if !self.lists_valid || self.lists_newton3 != spec.newton3 {
            self.rebuild_lists(spec.newton3);
        }
        match spec.layout {
            DataLayoutOpt::Soa => {
                layout::load(&mut self.lc.cells, functor, spec.layout);
                verlet::traverse_soa(
                    &mut self.lc.cells,
                    &self.slots,
                    &self.lists,
                    functor,
                    spec.newton3,
                );
                layout::store(&mut self.lc.cells, functor, spec.layout);
            }
            _ => verlet::traverse_aos(
                &mut self.lc.cells,
                &self.slots,
                &self.lists,
                functor,
                spec.newton3,
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::{Rng, SeedableRng};

    fn domain() -> Domain {
        Domain {
            box_min: [0.0; 3],
            box_max: [3.0; 3],
            cutoff: 1.0,
            skin: 0.2,
        }
    }

    fn filled(n: u64, seed: u64) -> VerletLists {
        let mut rng = StdRng::seed_from_u64(seed);
        let mut vl = VerletLists::new(domain(), 1.0);
        for id in 0..n {
            let pos = [
                rng.gen_range(0.0..3.0),
                rng.gen_range(0.0..3.0),
                rng.gen_range(0.0..3.0),
            ];
            vl.add_particle(Particle::new(id, pos, [0.0; 3])).unwrap();
        }
        vl
    }

    #[test]
    fn full_lists_match_brute_force() {
        let mut vl = filled(60, 7);
        vl.rebuild_lists(false);
        let ps: Vec<Particle> = vl.iter(IterBehavior::HaloAndOwned).cloned().collect();
        let r2 = vl.domain().interaction_length().powi(2);
        let mut expected = 0usize;
        for i in 0..ps.len() {
            for j in 0..ps.len() {
                if i == j {
                    continue;
                }
                let d2: Real = (0..3)
                    .map(|k| (ps[i].pos[k] - ps[j].pos[k]).powi(2))
                    .sum();
                if d2 <= r2 {
                    expected += 1;
                }
            }
        }
        let listed: usize = vl.lists.iter().map(|l| l.len()).sum();
        assert_eq!(listed, expected);
    }

    #[test]
    fn half_lists_hold_each_pair_once() {
        let mut vl = filled(60, 11);
        vl.rebuild_lists(true);
        let half: usize = vl.lists.iter().map(|l| l.len()).sum();
        vl.rebuild_lists(false);
        let full: usize = vl.lists.iter().map(|l| l.len()).sum();
        assert_eq!(full, 2 * half);
    }

    #[test]
    fn mutation_invalidates_lists() {
        let mut vl = filled(10, 3);
        vl.rebuild_lists(true);
        assert!(vl.lists_valid);
        vl.add_particle(Particle::new(99, [1.5; 3], [0.0; 3])).unwrap();
        assert!(!vl.lists_valid);
    }
}

// -- end of file --
