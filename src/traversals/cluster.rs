//! Cluster-pair traversal for the Verlet-cluster-lists container.
//!
//! Clusters are contiguous runs of `cluster_size` particles inside a grid
//! column cell. The neighbor graph is a full adjacency: every cluster
//! lists all partners it interacts with. With Newton3 each undirected edge
//! is processed once (from its lexicographically smaller endpoint); without
//! it every directed edge is processed and only the owning side
//! accumulates, which keeps the parallel sweep free of cross-cell writes.

use super::GridView;
use crate::cells::FullCell;
use crate::functors::Functor;
use crate::particle::Particle;
use rayon::prelude::*;

/// Neighbor entries per cell, per cluster: (other cell, other cluster).
pub type ClusterNeighbors = Vec<Vec<Vec<(u32, u32)>>>;

pub fn traverse<F: Functor>(
    cells: &mut [FullCell],
    cluster_size: usize,
    neighbors: &ClusterNeighbors,
    functor: &F,
    newton3: bool,
) {
    if newton3 {
        traverse_newton3(cells, cluster_size, neighbors, functor);
    } else {
        traverse_parallel(cells, cluster_size, neighbors, functor);
    }
}

fn cluster_range(k: usize, cluster_size: usize) -> std::ops::Range<usize> {
    k * cluster_size..(k + 1) * cluster_size
}

fn traverse_newton3<F: Functor>(
    cells: &mut [FullCell],
    cluster_size: usize,
    neighbors: &ClusterNeighbors,
    functor: &F,
) {
    for ci in 0..cells.len() {
        let n_clusters = cells[ci].len() / cluster_size;
        for k in 0..n_clusters {
            // intra-cluster pairs
            let range = cluster_range(k, cluster_size);
            for i in range.clone() {
                for j in (i + 1)..range.end {
                    let (lo, hi) = cells[ci].particles.split_at_mut(j);
                    functor.aos(&mut lo[i], &mut hi[0], true);
                }
            }
            // each undirected edge from its smaller endpoint
            for &(cj, kj) in &neighbors[ci][k] {
                let (cj, kj) = (cj as usize, kj as usize);
                if (cj, kj) <= (ci, k) {
                    continue;
                }
                cluster_pair_newton3(cells, cluster_size, (ci, k), (cj, kj), functor);
            }
        }
    }
}

fn cluster_pair_newton3<F: Functor>(
    cells: &mut [FullCell],
    cluster_size: usize,
    a: (usize, usize),
    b: (usize, usize),
    functor: &F,
) {
    let ra = cluster_range(a.1, cluster_size);
    let rb = cluster_range(b.1, cluster_size);
    for i in ra {
        for j in rb.clone() {
            let (pi, pj) = super::verlet::pair_mut(
                cells,
                (a.0 as u32, i as u32),
                (b.0 as u32, j as u32),
            );
            functor.aos(pi, pj, true);
        }
    }
}

fn traverse_parallel<F: Functor>(
    cells: &mut [FullCell],
    cluster_size: usize,
    neighbors: &ClusterNeighbors,
    functor: &F,
) {
    // read-only snapshot for the neighbor side; threads write only their
    // own cell
    let snapshot: Vec<Vec<Particle>> = cells.iter().map(|c| c.particles.clone()).collect();
    let view = GridView::new(cells);

    (0..snapshot.len()).into_par_iter().for_each(|ci| {
        let cell = unsafe { view.cell_mut(ci) };
        let n_clusters = cell.len() / cluster_size;
        for k in 0..n_clusters {
            let range = cluster_range(k, cluster_size);
            // intra-cluster, both directions
            for i in range.clone() {
                for j in range.clone() {
                    if i == j {
                        continue;
                    }
                    let mut pj = snapshot[ci][j].clone();
                    functor.aos(&mut cell.particles[i], &mut pj, false);
                }
            }
            for &(cj, kj) in &neighbors[ci][k] {
                let (cj, kj) = (cj as usize, kj as usize);
                let rb = cluster_range(kj, cluster_size);
                for i in range.clone() {
                    for j in rb.clone() {
                        let mut pj = snapshot[cj][j].clone();
                        functor.aos(&mut cell.particles[i], &mut pj, false);
                    }
                }
            }
        }
    });
}

// -- end of file --
