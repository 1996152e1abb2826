//! The functor contract: the seam between the engine and the pairwise
//! kernel it drives.
//!
//! A functor must implement [`Functor::aos`]; the SoA entry points have
//! provided implementations that fall back to the AoS kernel row by row, so
//! only performance-sensitive functors need to override them.

use crate::particle::{Attr, Particle};
use crate::real::Real;
use crate::soa::SoaBuffer;
use crate::CoreError;

pub mod lj;

pub use lj::LennardJones;

/// Per-particle neighbor lists expressed as flat row indices.
pub type NeighborLists = Vec<Vec<u32>>;

/// View of a flattened SoA buffer handed to the Verlet-list kernel.
///
/// Position columns span every row; force columns cover only the rows
/// `[first, first + force len)` this call is responsible for. With
/// Newton3 the caller passes a full-width view (`first == 0`) so the
/// kernel may also write the `j` side.
pub struct VerletView<'a> {
    pub pos_x: &'a [Real],
    pub pos_y: &'a [Real],
    pub pos_z: &'a [Real],
    pub owned: &'a [bool],
    pub type_id: &'a [u64],
    pub force_x: &'a mut [Real],
    pub force_y: &'a mut [Real],
    pub force_z: &'a mut [Real],
    pub first: usize,
}

impl VerletView<'_> {
    /// Number of rows this view owns forces for.
    pub fn rows(&self) -> usize {
        self.force_x.len()
    }

    /// Materializes the row at local index `i` (force-owning range).
    pub fn particle(&self, i: usize) -> Particle {
        let g = self.first + i;
        Particle {
            pos: [self.pos_x[g], self.pos_y[g], self.pos_z[g]],
            force: [self.force_x[i], self.force_y[i], self.force_z[i]],
            owned: self.owned[g],
            type_id: self.type_id[g],
            ..Default::default()
        }
    }

    /// Materializes a neighbor row by global index, with zeroed force.
    pub fn neighbor(&self, g: usize) -> Particle {
        Particle {
            pos: [self.pos_x[g], self.pos_y[g], self.pos_z[g]],
            owned: self.owned[g],
            type_id: self.type_id[g],
            ..Default::default()
        }
    }

    pub fn store_force(&mut self, i: usize, f: [Real; 3]) {
        self.force_x[i] = f[0];
        self.force_y[i] = f[1];
        self.force_z[i] = f[2];
    }
}

/// Pairwise interaction kernel.
///
/// The contract for `newton3 == false` calls: only the first argument may
/// be mutated; the engine visits the pair again from the other side. With
/// `newton3 == true` each pair is visited exactly once and the kernel
/// applies the opposite force to the second argument.
pub trait Functor: Sync {
    /// Maximum interaction distance; pairs beyond it contribute nothing.
    fn cutoff(&self) -> Real;

    /// Kernel on two particles in AoS form.
    fn aos(&self, i: &mut Particle, j: &mut Particle, newton3: bool);

    /// Kernel on all intra-cell pairs of one SoA buffer.
    fn soa_single(&self, soa: &mut SoaBuffer, newton3: bool) {
        let n = soa.len();
        let mut ps: Vec<Particle> = (0..n).map(|i| soa.read(i)).collect();
        if newton3 {
            for i in 0..n {
                for j in (i + 1)..n {
                    let (lo, hi) = ps.split_at_mut(j);
                    self.aos(&mut lo[i], &mut hi[0], true);
                }
            }
        } else {
            for i in 0..n {
                for j in 0..n {
                    if i == j {
                        continue;
                    }
                    let mut pj = ps[j].clone();
                    self.aos(&mut ps[i], &mut pj, false);
                }
            }
        }
        for (i, p) in ps.iter().enumerate() {
            soa.write(i, p);
        }
    }

    /// Kernel on all cross-cell pairs of two SoA buffers. Without Newton3
    /// only `a` accumulates; the engine calls the swapped direction itself.
    fn soa_pair(&self, a: &mut SoaBuffer, b: &mut SoaBuffer, newton3: bool) {
        let na = a.len();
        let nb = b.len();
        let mut pa: Vec<Particle> = (0..na).map(|i| a.read(i)).collect();
        let mut pb: Vec<Particle> = (0..nb).map(|j| b.read(j)).collect();
        for i in 0..na {
            for j in 0..nb {
                if newton3 {
                    self.aos(&mut pa[i], &mut pb[j], true);
                } else {
                    let mut pj = pb[j].clone();
                    self.aos(&mut pa[i], &mut pj, false);
                }
            }
        }
        for (i, p) in pa.iter().enumerate() {
            a.write(i, p);
        }
        if newton3 {
            for (j, p) in pb.iter().enumerate() {
                b.write(j, p);
            }
        }
    }

    /// Kernel on neighbor-list pairs for the rows of `view`.
    fn soa_verlet(&self, view: &mut VerletView<'_>, lists: &NeighborLists, newton3: bool) {
        for li in 0..view.rows() {
            let gi = view.first + li;
            for &j in &lists[gi] {
                let gj = j as usize;
                let mut pi = view.particle(li);
                if newton3 {
                    let mut pj = view.particle(gj);
                    self.aos(&mut pi, &mut pj, true);
                    let f = pj.force;
                    view.store_force(gj, f);
                } else {
                    let mut pj = view.neighbor(gj);
                    self.aos(&mut pi, &mut pj, false);
                }
                let f = pi.force;
                view.store_force(li, f);
            }
        }
    }

    /// Resets per-traversal accumulators (energies, virial).
    fn init_traversal(&self) {}

    /// Finalizes per-traversal accumulators.
    fn end_traversal(&self, _newton3: bool) -> Result<(), CoreError> {
        Ok(())
    }

    /// Whether the auto-tuner may schedule this functor with Newton3.
    fn allows_newton3(&self) -> bool {
        true
    }

    /// Whether the auto-tuner may schedule this functor without Newton3.
    fn allows_non_newton3(&self) -> bool {
        true
    }

    /// Columns the layout converter must provide before a traversal.
    fn needed_attrs(&self) -> &'static [Attr];

    /// Columns the layout converter must write back afterwards.
    fn computed_attrs(&self) -> &'static [Attr];
}

// -- end of file --
