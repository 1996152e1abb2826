//! Neighbor-list traversal for the Verlet-lists container.

use crate::cells::FullCell;
use crate::functors::{Functor, NeighborLists, VerletView};
use crate::particle::{Attr, Particle};
use rayon::prelude::*;

/// A particle's home at list-build time: (cell, index within cell).
pub type Slot = (u32, u32);

/// Two disjoint particles by slot, with the borrow split accordingly.
pub(crate) fn pair_mut<'a>(
    cells: &'a mut [FullCell],
    a: Slot,
    b: Slot,
) -> (&'a mut Particle, &'a mut Particle) {
    let (ca, ia) = (a.0 as usize, a.1 as usize);
    let (cb, ib) = (b.0 as usize, b.1 as usize);
    if ca == cb {
        assert_ne!(ia, ib);
        let cell = &mut cells[ca];
        if ia < ib {
            let (lo, hi) = cell.particles.split_at_mut(ib);
            (&mut lo[ia], &mut hi[0])
        } else {
            let (lo, hi) = cell.particles.split_at_mut(ia);
            (&mut hi[0], &mut lo[ib])
        }
    } else if ca < cb {
        let (lo, hi) = cells.split_at_mut(cb);
        (&mut lo[ca].particles[ia], &mut hi[0].particles[ib])
    } else {
        let (lo, hi) = cells.split_at_mut(ca);
        (&mut hi[0].particles[ib], &mut lo[cb].particles[ia])
    }
}

/// AoS flavor: walk every slot's list and hand each pair to the functor.
/// With Newton3 the lists are half lists; without, full lists, and only
/// the owning side accumulates per call.
pub fn traverse_aos<F: Functor>(
    cells: &mut [FullCell],
    slots: &[Slot],
    lists: &NeighborLists,
    functor: &F,
    newton3: bool,
) {
    for (i, list) in lists.iter().enumerate() {
        for &j in list {
            let (pi, pj) = pair_mut(cells, slots[i], slots[j as usize]);
            functor.aos(pi, pj, newton3);
        }
    }
}

/// SoA flavor: the cells are flattened into one buffer in slot order.
/// Without Newton3 the force columns are split into disjoint row chunks
/// that threads work independently; with Newton3 the functor gets the
/// full-width view sequentially.
pub fn traverse_soa<F: Functor>(
    cells: &mut [FullCell],
    slots: &[Slot],
    lists: &NeighborLists,
    functor: &F,
    newton3: bool,
) {
    let mut flat = crate::soa::SoaBuffer::with_capacity(slots.len());
    for cell in cells.iter() {
        flat.append(cell.soa());
    }
    let n = flat.len();
    if n == 0 {
        return;
    }
    debug_assert_eq!(n, slots.len());

    {
        let (pos, force) = flat.pos_force_split();
        if newton3 {
            let mut view = VerletView {
                pos_x: pos.x,
                pos_y: pos.y,
                pos_z: pos.z,
                owned: pos.owned,
                type_id: pos.type_id,
                force_x: force.x,
                force_y: force.y,
                force_z: force.z,
                first: 0,
            };
            functor.soa_verlet(&mut view, lists, true);
        } else {
            let chunk = (n + rayon::current_num_threads() - 1) / rayon::current_num_threads();
            let chunk = chunk.max(1);
            force
                .x
                .par_chunks_mut(chunk)
                .zip(force.y.par_chunks_mut(chunk))
                .zip(force.z.par_chunks_mut(chunk))
                .enumerate()
                .for_each(|(ci, ((fx, fy), fz))| {
                    let mut view = VerletView {
                        pos_x: pos.x,
                        pos_y: pos.y,
                        pos_z: pos.z,
                        owned: pos.owned,
                        type_id: pos.type_id,
                        force_x: fx,
                        force_y: fy,
                        force_z: fz,
                        first: ci * chunk,
                    };
                    functor.soa_verlet(&mut view, lists, false);
                });
        }
    }

    // scatter the accumulated forces back into the per-cell buffers
    let mut offset = 0;
    for cell in cells.iter_mut() {
        let len = cell.soa().len();
        for attr in [Attr::ForceX, Attr::ForceY, Attr::ForceZ] {
            cell.soa_mut()
                .col_mut(attr)
                .copy_from_slice(&flat.col(attr)[offset..offset + len]);
        }
        offset += len;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pair_mut_splits_same_and_different_cells() {
        let mut cells = vec![FullCell::new(), FullCell::new()];
        cells[0].add(Particle::new(0, [0.0; 3], [0.0; 3]));
        cells[0].add(Particle::new(1, [1.0; 3], [0.0; 3]));
        cells[1].add(Particle::new(2, [2.0; 3], [0.0; 3]));

        let (a, b) = pair_mut(&mut cells, (0, 0), (0, 1));
        assert_eq!((a.id, b.id), (0, 1));
        let (a, b) = pair_mut(&mut cells, (0, 1), (0, 0));
        assert_eq!((a.id, b.id), (1, 0));
        let (a, b) = pair_mut(&mut cells, (1, 0), (0, 1));
        assert_eq!((a.id, b.id), (2, 1));
    }
}

// -- end of file --
