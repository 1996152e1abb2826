//! Colored cell sweeps over the linked-cells grid: c08, c18 and c01.

use super::{CellFunctor, GridView};
use crate::cells::FullCell;
use crate::functors::Functor;
use crate::options::DataLayoutOpt;
use crate::real::Real;
use rayon::prelude::*;

/// The 13 cell pairs of the c08 base step, as offsets into the 2x2x2 block
/// anchored at the base cell. Together with the base cell's
/// self-interaction every pair of adjacent cells is covered exactly once,
/// one direction class per entry.
const C08_PAIRS: [([usize; 3], [usize; 3]); 13] = [
    ([0, 0, 0], [1, 0, 0]),
    ([0, 0, 0], [0, 1, 0]),
    ([0, 0, 0], [0, 0, 1]),
    ([0, 0, 0], [1, 1, 0]),
    ([0, 0, 0], [1, 0, 1]),
    ([0, 0, 0], [0, 1, 1]),
    ([0, 0, 0], [1, 1, 1]),
    ([1, 0, 0], [0, 1, 0]),
    ([1, 0, 0], [0, 0, 1]),
    ([0, 1, 0], [0, 0, 1]),
    ([1, 0, 0], [0, 1, 1]),
    ([0, 1, 0], [1, 0, 1]),
    ([0, 0, 1], [1, 1, 0]),
];

/// Forward offsets of the c18 base step: one representative per direction
/// class, chosen from the half space `z > 0 ∨ (z = 0 ∧ y > 0) ∨ (z = y = 0
/// ∧ x > 0)`.
const C18_OFFSETS: [[isize; 3]; 13] = [
    [1, 0, 0],
    [-1, 1, 0],
    [0, 1, 0],
    [1, 1, 0],
    [-1, -1, 1],
    [0, -1, 1],
    [1, -1, 1],
    [-1, 0, 1],
    [0, 0, 1],
    [1, 0, 1],
    [-1, 1, 1],
    [0, 1, 1],
    [1, 1, 1],
];

fn index(dims: [usize; 3], c: [usize; 3]) -> usize {
    c[0] + dims[0] * (c[1] + dims[1] * c[2])
}

/// The c08 base step for one base cell.
///
/// Safety: the caller's coloring must make the 2x2x2 block of `base`
/// exclusive to this thread.
pub(crate) unsafe fn c08_base_step<F: Functor>(
    view: &GridView<'_>,
    dims: [usize; 3],
    base: [usize; 3],
    cf: &CellFunctor<'_, F>,
) {
    cf.process_cell(view.cell_mut(index(dims, base)));
    for &(oa, ob) in C08_PAIRS.iter() {
        let a = [base[0] + oa[0], base[1] + oa[1], base[2] + oa[2]];
        let b = [base[0] + ob[0], base[1] + ob[1], base[2] + ob[2]];
        cf.process_pair(
            view.cell_mut(index(dims, a)),
            view.cell_mut(index(dims, b)),
        );
    }
}

/// Eight-color sweep with stride (2,2,2). Within one color no two base
/// cells share any cell of their 2x2x2 stencil blocks.
pub fn traverse_c08<F: Functor>(
    cells: &mut [FullCell],
    dims: [usize; 3],
    functor: &F,
    layout: DataLayoutOpt,
    newton3: bool,
) {
    let cf = CellFunctor::new(functor, layout, newton3, true);
    let view = GridView::new(cells);
    for color in 0..8usize {
        let start = [color & 1, (color >> 1) & 1, (color >> 2) & 1];
        let bases = base_cells(dims, start, [2, 2, 2], [1, 1, 1]);
        bases.par_iter().for_each(|&base| unsafe {
            c08_base_step(&view, dims, base, &cf);
        });
    }
}

/// 18-color sweep with stride (3,3,2): base cell + 13 forward neighbors.
pub fn traverse_c18<F: Functor>(
    cells: &mut [FullCell],
    dims: [usize; 3],
    functor: &F,
    layout: DataLayoutOpt,
    newton3: bool,
) {
    let cf = CellFunctor::new(functor, layout, newton3, true);
    let view = GridView::new(cells);
    for color in 0..18usize {
        let start = [color % 3, (color / 3) % 3, color / 9];
        let bases = base_cells(dims, start, [3, 3, 2], [0, 0, 0]);
        bases.par_iter().for_each(|&base| unsafe {
            cf.process_cell(view.cell_mut(index(dims, base)));
            for off in C18_OFFSETS.iter() {
                let n = [
                    base[0] as isize + off[0],
                    base[1] as isize + off[1],
                    base[2] as isize + off[2],
                ];
                if n.iter().zip(dims.iter()).any(|(&c, &d)| c < 0 || c >= d as isize) {
                    continue;
                }
                let n = [n[0] as usize, n[1] as usize, n[2] as usize];
                cf.process_pair(
                    view.cell_mut(index(dims, base)),
                    view.cell_mut(index(dims, n)),
                );
            }
        });
    }
}

/// Single-color sweep: every interior cell interacts with itself and all 26
/// neighbors, without Newton3. Force contributions are collected into
/// per-cell delta buffers so neighbor cells are only ever read, then
/// applied in a second pass.
pub fn traverse_c01<F: Functor>(cells: &mut [FullCell], dims: [usize; 3], functor: &F) {
    let interior = base_cells(dims, [1, 1, 1], [1, 1, 1], [1, 1, 1]);

    let shared: &[FullCell] = cells;
    let deltas: Vec<(usize, Vec<[Real; 3]>)> = interior
        .par_iter()
        .map(|&base| {
            let ci = index(dims, base);
            let cell = &shared[ci];
            let mut probes: Vec<_> = cell
                .iter()
                .map(|p| {
                    let mut q = p.clone();
                    q.force = [0.0; 3];
                    q
                })
                .collect();

            // intra-cell pairs, both directions
            for i in 0..probes.len() {
                for j in 0..probes.len() {
                    if i == j {
                        continue;
                    }
                    let mut pj = probes[j].clone();
                    functor.aos(&mut probes[i], &mut pj, false);
                }
            }

            for dz in -1isize..=1 {
                for dy in -1isize..=1 {
                    for dx in -1isize..=1 {
                        if dx == 0 && dy == 0 && dz == 0 {
                            continue;
                        }
                        let n = [
                            (base[0] as isize + dx) as usize,
                            (base[1] as isize + dy) as usize,
                            (base[2] as isize + dz) as usize,
                        ];
                        let other = &shared[index(dims, n)];
                        for pi in probes.iter_mut() {
                            for pj in other.iter() {
                                let mut pj = pj.clone();
                                functor.aos(pi, &mut pj, false);
                            }
                        }
                    }
                }
            }

            (ci, probes.into_iter().map(|p| p.force).collect())
        })
        .collect();

    for (ci, forces) in deltas {
        for (p, f) in cells[ci].iter_mut().zip(forces) {
            p.add_force(f);
        }
    }
}

/// Enumerates base cells starting at `start` with the given stride,
/// keeping `margin` cells of headroom at the upper end of each axis.
fn base_cells(
    dims: [usize; 3],
    start: [usize; 3],
    stride: [usize; 3],
    margin: [usize; 3],
) -> Vec<[usize; 3]> {
    let mut bases = Vec::new();
    let mut z = start[2];
    while z + margin[2] < dims[2] {
        let mut y = start[1];
        while y + margin[1] < dims[1] {
            let mut x = start[0];
            while x + margin[0] < dims[0] {
                bases.push([x, y, z]);
                x += stride[0];
            }
            y += stride[1];
        }
        z += stride[2];
    }
    bases
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn c08_pairs_cover_all_direction_classes_once() {
        let mut dirs = HashSet::new();
        for &(a, b) in C08_PAIRS.iter() {
            let d = [
                b[0] as isize - a[0] as isize,
                b[1] as isize - a[1] as isize,
                b[2] as isize - a[2] as isize,
            ];
            assert!(d.iter().all(|&c| c.abs() <= 1));
            assert_ne!(d, [0, 0, 0]);
            // a direction and its negation are the same class
            let canon = std::cmp::max(d, [-d[0], -d[1], -d[2]]);
            assert!(dirs.insert(canon), "duplicate direction {:?}", d);
        }
        assert_eq!(dirs.len(), 13);
    }

    #[test]
    fn c18_offsets_are_forward_and_complete() {
        let mut dirs = HashSet::new();
        for off in C18_OFFSETS.iter() {
            let [x, y, z] = *off;
            assert!(z > 0 || (z == 0 && y > 0) || (z == 0 && y == 0 && x > 0));
            assert!(dirs.insert(*off));
        }
        assert_eq!(dirs.len(), 13);
    }

    #[test]
    fn c08_visits_every_adjacent_cell_pair_exactly_once() {
        let dims = [5usize, 4, 4];
        let mut visited: Vec<(usize, usize)> = Vec::new();
        for base in base_cells(dims, [0, 0, 0], [1, 1, 1], [1, 1, 1]) {
            for &(oa, ob) in C08_PAIRS.iter() {
                let a = index(dims, [base[0] + oa[0], base[1] + oa[1], base[2] + oa[2]]);
                let b = index(dims, [base[0] + ob[0], base[1] + ob[1], base[2] + ob[2]]);
                visited.push((a.min(b), a.max(b)));
            }
        }
        let unique: HashSet<_> = visited.iter().cloned().collect();
        assert_eq!(unique.len(), visited.len(), "a cell pair was visited twice");

        // every adjacent pair in the grid appears
        for z in 0..dims[2] {
            for y in 0..dims[1] {
                for x in 0..dims[0] {
                    for dz in -1isize..=1 {
                        for dy in -1isize..=1 {
                            for dx in -1isize..=1 {
                                if (dx, dy, dz) == (0, 0, 0) {
                                    continue;
                                }
                                let n = [x as isize + dx, y as isize + dy, z as isize + dz];
                                if n.iter().zip(dims.iter()).any(|(&c, &d)| c < 0 || c >= d as isize)
                                {
                                    continue;
                                }
                                let a = index(dims, [x, y, z]);
                                let b = index(dims, [n[0] as usize, n[1] as usize, n[2] as usize]);
                                assert!(
                                    unique.contains(&(a.min(b), a.max(b))),
                                    "pair {:?} {:?} never visited",
                                    [x, y, z],
                                    n
                                );
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn c08_color_blocks_are_disjoint() {
        let dims = [6usize, 6, 6];
        for color in 0..8usize {
            let start = [color & 1, (color >> 1) & 1, (color >> 2) & 1];
            let mut owner = std::collections::HashMap::new();
            for base in base_cells(dims, start, [2, 2, 2], [1, 1, 1]) {
                for dz in 0..2 {
                    for dy in 0..2 {
                        for dx in 0..2 {
                            let c = index(dims, [base[0] + dx, base[1] + dy, base[2] + dz]);
                            if let Some(prev) = owner.insert(c, base) {
                                panic!(
                                    "cell {} of color {} shared by bases {:?} and {:?}",
                                    c, color, prev, base
                                );
                            }
                        }
                    }
                }
            }
        }
    }
}

// -- end of file --
