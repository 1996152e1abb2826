//! Traversal schedules: which cell pairs are visited, in which order, and
//! how the work is distributed over threads.

use crate::cells::FullCell;
use crate::functors::Functor;
use crate::options::{ContainerOpt, DataLayoutOpt, Newton3Opt, TraversalOpt};
use std::marker::PhantomData;

pub mod cluster;
pub mod colored;
pub mod direct_sum;
pub mod sliced;
pub mod verlet;

/// Signature of a traversal run: `(traversalId, dataLayout, useNewton3)`.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TraversalSpec {
    pub traversal: TraversalOpt,
    pub layout: DataLayoutOpt,
    pub newton3: bool,
}

/// Traversals each container accepts.
pub fn container_supports(container: ContainerOpt, traversal: TraversalOpt) -> bool {
    match container {
        ContainerOpt::DirectSum => traversal == TraversalOpt::DirectSum,
        ContainerOpt::LinkedCells => matches!(
            traversal,
            TraversalOpt::C08 | TraversalOpt::Sliced | TraversalOpt::C18 | TraversalOpt::C01
        ),
        // both Verlet containers run under the `verlet` traversal id with
        // their own schedule
        ContainerOpt::VerletLists | ContainerOpt::VerletClusterLists => {
            traversal == TraversalOpt::Verlet
        }
    }
}

/// Whether a full configuration can run in this build. GPU layouts and the
/// cell-based Verlet traversals are never applicable here.
pub fn is_applicable(
    container: ContainerOpt,
    traversal: TraversalOpt,
    layout: DataLayoutOpt,
    newton3: Newton3Opt,
) -> bool {
    if layout == DataLayoutOpt::Cuda {
        return false;
    }
    if !container_supports(container, traversal) {
        return false;
    }
    match traversal {
        // c01 writes only into the base cell, which rules out Newton3, and
        // its delta-buffer scheme is AoS-only
        TraversalOpt::C01 => layout == DataLayoutOpt::Aos && newton3 == Newton3Opt::Disabled,
        TraversalOpt::Verlet if container == ContainerOpt::VerletClusterLists => {
            layout == DataLayoutOpt::Aos
        }
        _ => true,
    }
}

/// Mutable access into a cell slice for colored traversals.
///
/// Safety contract: a coloring (or slab partition) guarantees that no two
/// threads ever touch the same cell index concurrently; under that
/// invariant handing out disjoint `&mut` cells is exactly what
/// `split_at_mut` does, just unchecked.
pub(crate) struct GridView<'a> {
    cells: *mut FullCell,
    len: usize,
    _marker: PhantomData<&'a mut [FullCell]>,
}

unsafe impl Sync for GridView<'_> {}

impl<'a> GridView<'a> {
    pub fn new(cells: &'a mut [FullCell]) -> Self {
        GridView {
            len: cells.len(),
            cells: cells.as_mut_ptr(),
            _marker: PhantomData,
        }
    }

    /// # Safety
    /// The caller must guarantee `i` is not accessed by any other thread
    /// for the lifetime of the returned reference.
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn cell_mut(&self, i: usize) -> &mut FullCell {
        debug_assert!(i < self.len);
        &mut *self.cells.add(i)
    }
}

/// Applies the functor to cells and cell pairs under a fixed signature.
///
/// For `newton3 == false` the processing is bidirectional by default: a
/// cell pair visited once yields both `(i, j)` and `(j, i)` kernel calls.
/// Traversals that visit each pair from both sides (c01) switch it off.
pub(crate) struct CellFunctor<'a, F: Functor> {
    functor: &'a F,
    layout: DataLayoutOpt,
    newton3: bool,
    bidirectional: bool,
}

impl<'a, F: Functor> CellFunctor<'a, F> {
    pub fn new(functor: &'a F, layout: DataLayoutOpt, newton3: bool, bidirectional: bool) -> Self {
        CellFunctor {
            functor,
            layout,
            newton3,
            bidirectional,
        }
    }

    /// All pairs within one cell.
    pub fn process_cell(&self, cell: &mut FullCell) {
        if cell.is_empty() {
            return;
        }
        match self.layout {
            DataLayoutOpt::Soa => self.functor.soa_single(cell.soa_mut(), self.newton3),
            _ => {
                let n = cell.len();
                if self.newton3 {
                    for i in 0..n {
                        for j in (i + 1)..n {
                            let (lo, hi) = cell.particles.split_at_mut(j);
                            self.functor.aos(&mut lo[i], &mut hi[0], true);
                        }
                    }
                } else {
                    for i in 0..n {
                        for j in 0..n {
                            if i == j {
                                continue;
                            }
                            let mut pj = cell.particles[j].clone();
                            self.functor.aos(&mut cell.particles[i], &mut pj, false);
                        }
                    }
                }
            }
        }
    }

    /// All pairs across two distinct cells.
    pub fn process_pair(&self, a: &mut FullCell, b: &mut FullCell) {
        if a.is_empty() || b.is_empty() {
            return;
        }
        match self.layout {
            DataLayoutOpt::Soa => {
                self.functor.soa_pair(a.soa_mut(), b.soa_mut(), self.newton3);
                if !self.newton3 && self.bidirectional {
                    self.functor.soa_pair(b.soa_mut(), a.soa_mut(), false);
                }
            }
            _ => {
                for i in 0..a.len() {
                    for j in 0..b.len() {
                        if self.newton3 {
                            self.functor
                                .aos(&mut a.particles[i], &mut b.particles[j], true);
                        } else {
                            let mut pj = b.particles[j].clone();
                            self.functor.aos(&mut a.particles[i], &mut pj, false);
                            if self.bidirectional {
                                let mut pi = a.particles[i].clone();
                                self.functor.aos(&mut b.particles[j], &mut pi, false);
                            }
                        }
                    }
                }
            }
        }
    }
}


// -- end of file --
