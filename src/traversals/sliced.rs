//! Sliced traversal: the longest grid axis is cut into one slab per
//! thread. Slab boundaries are protected by `overlap` lock slots each; a
//! thread locks its predecessor's trailing slots before working the shared
//! layers and releases them layer by layer as its front passes, so the
//! worst-case wait is bounded by the overlap.

use super::colored::c08_base_step;
use super::{CellFunctor, GridView};
use crate::cells::FullCell;
use crate::functors::Functor;
use crate::options::DataLayoutOpt;
use crate::real::Real;
use rayon::prelude::*;
use std::sync::{Mutex, MutexGuard};

pub fn traverse_sliced<F: Functor>(
    cells: &mut [FullCell],
    dims: [usize; 3],
    cell_length: [Real; 3],
    cutoff: Real,
    functor: &F,
    layout: DataLayoutOpt,
    newton3: bool,
) {
    let mut overlap = [0usize; 3];
    for d in 0..3 {
        overlap[d] = (cutoff / cell_length[d]).ceil() as usize;
    }

    // axes ordered by cell count: longest is sliced
    let mut axes = [0usize, 1, 2];
    axes.sort_by_key(|&d| std::cmp::Reverse(dims[d]));
    let d_long = axes[0];
    let overlap_long = overlap[d_long];

    let mut num_slices = rayon::current_num_threads();
    let mut min_thickness = dims[d_long] / num_slices.max(1);
    if min_thickness < overlap_long + 1 {
        min_thickness = overlap_long + 1;
        num_slices = dims[d_long] / min_thickness;
    }

    if num_slices < 2 {
        // domain too small to slice; run the base steps sequentially
        let cf = CellFunctor::new(functor, layout, newton3, true);
        let view = GridView::new(cells);
        for z in 0..dims[2] - 1 {
            for y in 0..dims[1] - 1 {
                for x in 0..dims[0] - 1 {
                    unsafe { c08_base_step(&view, dims, [x, y, z], &cf) };
                }
            }
        }
        return;
    }

    let mut thickness = vec![min_thickness; num_slices];
    let rest = dims[d_long] - min_thickness * num_slices;
    for t in thickness.iter_mut().take(rest) {
        *t += 1;
    }
    // base cells only reach dims - 1 along every axis
    *thickness.last_mut().unwrap() -= overlap_long;

    let locks: Vec<Mutex<()>> = (0..num_slices * overlap_long)
        .map(|_| Mutex::new(()))
        .collect();

    let cf = CellFunctor::new(functor, layout, newton3, true);
    let view = GridView::new(cells);
    let starts: Vec<usize> = thickness
        .iter()
        .scan(0, |acc, &t| {
            let s = *acc;
            *acc += t;
            Some(s)
        })
        .collect();

    (0..num_slices).into_par_iter().for_each(|slice| {
        let mut held: Vec<Option<MutexGuard<'_, ()>>> = (0..locks.len()).map(|_| None).collect();
        let start = starts[slice];
        let last_layer = start + thickness[slice];

        if slice > 0 {
            for i in 1..=overlap_long {
                let li = slice * overlap_long - i;
                held[li] = Some(locks[li].lock().unwrap());
            }
        }

        for layer in start..last_layer {
            if slice != num_slices - 1 && layer >= last_layer - overlap_long {
                let li = slice * overlap_long + overlap_long - (last_layer - layer);
                held[li] = Some(locks[li].lock().unwrap());
            }

            let d_mid = axes[1];
            let d_short = axes[2];
            for mid in 0..dims[d_mid] - 1 {
                for short in 0..dims[d_short] - 1 {
                    let mut base = [0usize; 3];
                    base[d_long] = layer;
                    base[d_mid] = mid;
                    base[d_short] = short;
                    unsafe { c08_base_step(&view, dims, base, &cf) };
                }
            }

            if slice > 0 && layer < start + overlap_long {
                let li = slice * overlap_long - (overlap_long - (layer - start));
                held[li] = None;
            } else if slice != num_slices - 1 && layer == last_layer - 1 {
                for li in slice * overlap_long..(slice + 1) * overlap_long {
                    held[li] = None;
                }
            }
        }
    });
}


// -- end of file --
