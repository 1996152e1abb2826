//! Linked-cells container: a 3D grid of cells with one halo layer on every
//! side. The cell side length is at least `interactionLength ·
//! cellSizeFactor`, so the colored stencils only ever need the directly
//! adjacent layer.

use super::{in_box, Domain};
use crate::cells::FullCell;
use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::layout;
use crate::options::TraversalOpt;
use crate::particle::Particle;
use crate::real::Real;
use crate::traversals::{colored, sliced, TraversalSpec};

pub struct LinkedCells {
    domain: Domain,
    cell_size_factor: Real,
    pub(crate) cells: Vec<FullCell>,
    /// Cells per dimension including the halo layers.
    pub(crate) dims: [usize; 3],
    pub(crate) cell_length: [Real; 3],
}

impl LinkedCells {
    pub fn new(domain: Domain, cell_size_factor: Real) -> Self {
        let target = domain.interaction_length() * cell_size_factor;
        let mut dims = [0usize; 3];
        let mut cell_length = [0.0; 3];
        for d in 0..3 {
            let side = domain.box_max[d] - domain.box_min[d];
            let interior = ((side / target).floor() as usize).max(1);
            dims[d] = interior + 2;
            cell_length[d] = side / interior as Real;
        }
        let n = dims[0] * dims[1] * dims[2];
        LinkedCells {
            domain,
            cell_size_factor,
            cells: (0..n).map(|_| FullCell::new()).collect(),
            dims,
            cell_length,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    pub fn cell_size_factor(&self) -> Real {
        self.cell_size_factor
    }

    fn coords_of(&self, pos: [Real; 3]) -> [usize; 3] {
        let mut c = [0usize; 3];
        for d in 0..3 {
            let rel = pos[d] - self.domain.box_min[d];
            let i = (rel / self.cell_length[d]).floor() as isize + 1;
            c[d] = i.clamp(0, self.dims[d] as isize - 1) as usize;
        }
        c
    }

    pub(crate) fn index_of(&self, pos: [Real; 3]) -> usize {
        let c = self.coords_of(pos);
        c[0] + self.dims[0] * (c[1] + self.dims[1] * c[2])
    }

    pub fn add_particle(&mut self, mut p: Particle) -> Result<()> {
        if !self.domain.contains(p.pos) {
            return Err(CoreError::OutOfBoundsInsert {
                pos: p.pos,
                halo: false,
            });
        }
        p.owned = true;
        let i = self.index_of(p.pos);
        self.cells[i].add(p);
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
        let i = self.index_of(p.pos);
        self.cells[i].add(p);
        Ok(())
    }

    pub fn update_halo_particle(&mut self, p: &Particle) -> bool {
        let r = self.domain.skin / 2.0;
        let lo = [p.pos[0] - r, p.pos[1] - r, p.pos[2] - r];
        let hi = [p.pos[0] + r, p.pos[1] + r, p.pos[2] + r];
        let (clo, chi) = (self.coords_of(lo), self.coords_of(hi));
        for z in clo[2]..=chi[2] {
            for y in clo[1]..=chi[1] {
                for x in clo[0]..=chi[0] {
                    let ci = x + self.dims[0] * (y + self.dims[1] * z);
                    for q in self.cells[ci].iter_mut() {
                        if !q.owned && q.id == p.id && in_box(q.pos, lo, hi) {
                            *q = p.clone();
                            q.owned = false;
                            return true;
                        }
                    }
                }
            }
        }
        false
    }

    pub fn delete_halo_particles(&mut self) {
        for cell in &mut self.cells {
            cell.drain_matching(|p| !p.owned);
        }
    }

    pub fn delete_all_particles(&mut self) {
        for cell in &mut self.cells {
            cell.clear();
        }
    }

    pub fn update_container(&mut self) -> Vec<Particle> {
        self.delete_halo_particles();
        let mut moved = Vec::new();
        for ci in 0..self.cells.len() {
            let misplaced = {
                let domain = self.domain;
                let dims = self.dims;
                let cell_length = self.cell_length;
                self.cells[ci].drain_matching(|p| {
                    let mut c = [0usize; 3];
                    for d in 0..3 {
                        let rel = p.pos[d] - domain.box_min[d];
                        let i = (rel / cell_length[d]).floor() as isize + 1;
                        c[d] = i.clamp(0, dims[d] as isize - 1) as usize;
                    }
                    c[0] + dims[0] * (c[1] + dims[1] * c[2]) != ci
                })
            };
            moved.extend(misplaced);
        }

        let mut leaving = Vec::new();
        for p in moved {
            if self.domain.contains(p.pos) {
                let i = self.index_of(p.pos);
                self.cells[i].add(p);
            } else {
                leaving.push(p);
            }
        }
        leaving
    }

    pub fn is_update_needed(&self) -> bool {
        for (ci, cell) in self.cells.iter().enumerate() {
            for p in cell.iter() {
                if self.index_of(p.pos) != ci {
                    return true;
                }
            }
        }
        false
    }

    pub fn iter(&self, behavior: IterBehavior) -> ParticleIter<'_> {
        Box::new(
            self.cells
                .iter()
                .flat_map(|c| c.iter())
                .filter(move |p| behavior.accepts(p)),
        )
    }

    pub fn iter_mut(&mut self, behavior: IterBehavior) -> ParticleIterMut<'_> {
        Box::new(
            self.cells
                .iter_mut()
                .flat_map(|c| c.iter_mut())
                .filter(move |p| behavior.accepts(p)),
        )
    }

    pub fn region_iter(&self, lo: [Real; 3], hi: [Real; 3], behavior: IterBehavior) -> ParticleIter<'_> {
        let (clo, chi) = (self.coords_of(lo), self.coords_of(hi));
        let dims = self.dims;
        let mut indices = Vec::new();
        for z in clo[2]..=chi[2] {
            for y in clo[1]..=chi[1] {
                for x in clo[0]..=chi[0] {
                    indices.push(x + dims[0] * (y + dims[1] * z));
                }
            }
        }
        Box::new(
            indices
                .into_iter()
                .flat_map(move |ci| self.cells[ci].iter())
                .filter(move |p| behavior.accepts(p)),
        )
    }

    pub fn traverse<F: Functor>(&mut self, functor: &F, spec: TraversalSpec) -> Result<()> {
        layout::load(&mut self.cells, functor, spec.layout);
        match spec.traversal {
            TraversalOpt::C08 => {
                colored::traverse_c08(&mut self.cells, self.dims, functor, spec.layout, spec.newton3)
            }
            TraversalOpt::C18 => {
                colored::traverse_c18(&mut self.cells, self.dims, functor, spec.layout, spec.newton3)
            }
            TraversalOpt::C01 => colored::traverse_c01(&mut self.cells, self.dims, functor),
            TraversalOpt::Sliced => sliced::traverse_sliced(
                &mut self.cells,
                self.dims,
                self.cell_length,
                self.domain.cutoff,
                functor,
                spec.layout,
                spec.newton3,
            ),
            other => {
                return Err(CoreError::TraversalTypeMismatch {
                    container: crate::options::ContainerOpt::LinkedCells,
                    traversal: other,
                })
            }
        }
        layout::store(&mut self.cells, functor, spec.layout);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn domain() -> Domain {
        Domain {
            box_min: [0.0; 3],
            box_max: [3.0; 3],
            cutoff: 1.0,
            skin: 0.0,
        }
    }

    #[test]
    fn grid_dimensions_honor_cutoff() {
        let lc = LinkedCells::new(domain(), 1.0);
        assert_eq!(lc.dims, [5, 5, 5]);
        for d in 0..3 {
            assert!(lc.cell_length[d] >= lc.domain.cutoff);
        }
    }

    #[test]
    fn binning_by_truncation() {
        let lc = LinkedCells::new(domain(), 1.0);
        assert_eq!(lc.coords_of([0.0, 0.0, 0.0]), [1, 1, 1]);
        assert_eq!(lc.coords_of([2.5, 0.5, 1.5]), [3, 1, 2]);
        // halo positions clamp into the boundary layer
        assert_eq!(lc.coords_of([-0.3, 1.0, 1.0]), [0, 2, 2]);
        assert_eq!(lc.coords_of([3.4, 1.0, 1.0]), [4, 2, 2]);
    }

    #[test]
    fn update_container_rebins_and_returns_leavers() {
        let mut lc = LinkedCells::new(domain(), 1.0);
        lc.add_particle(Particle::new(0, [0.5, 0.5, 0.5], [0.0; 3])).unwrap();
        lc.add_particle(Particle::new(1, [2.5, 2.5, 2.5], [0.0; 3])).unwrap();

        // drift particle 0 into a different cell, particle 1 out of the box
        let i0 = lc.index_of([0.5, 0.5, 0.5]);
        for p in lc.cells[i0].iter_mut() {
            if p.id == 0 {
                p.pos = [1.5, 0.5, 0.5];
            }
        }
        let i1 = lc.index_of([2.5, 2.5, 2.5]);
        for p in lc.cells[i1].iter_mut() {
            if p.id == 1 {
                p.pos = [3.5, 2.5, 2.5];
            }
        }

        assert!(lc.is_update_needed());
        let leavers = lc.update_container();
        assert_eq!(leavers.len(), 1);
        assert_eq!(leavers[0].id, 1);
        assert!(!lc.is_update_needed());
        let home = lc.index_of([1.5, 0.5, 0.5]);
        assert!(lc.cells[home].iter().any(|p| p.id == 0));
    }

    #[test]
    fn region_iter_yields_superset() {
        let mut lc = LinkedCells::new(domain(), 1.0);
        for i in 0..20 {
            let x = 0.15 * (i as Real) + 0.05;
            lc.add_particle(Particle::new(i, [x, 1.0, 1.0], [0.0; 3])).unwrap();
        }
        let lo = [0.5, 0.5, 0.5];
        let hi = [1.5, 1.5, 1.5];
        let seen: Vec<u64> = lc
            .region_iter(lo, hi, IterBehavior::OwnedOnly)
            .map(|p| p.id)
            .collect();
        // every particle actually inside the region is present
        for p in lc.iter(IterBehavior::OwnedOnly) {
            if in_box(p.pos, lo, hi) {
                assert!(seen.contains(&p.id));
            }
        }
    }
}

// -- end of file --
