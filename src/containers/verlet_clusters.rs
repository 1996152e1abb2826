//! Verlet-cluster-lists container.
//!
//! Particles are grouped into fixed-size clusters inside the columns of a
//! 2D xy-grid whose side length follows the particle density. Each cluster
//! carries an axis-aligned bounding box; neighbor bookkeeping is
//! cluster-to-cluster. Partially filled columns are padded with dummy
//! particles placed far outside the halo region.

use super::{in_box, Domain};
use crate::cells::FullCell;
use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::particle::Particle;
use crate::real::Real;
use crate::traversals::cluster::{self, ClusterNeighbors};
use crate::traversals::TraversalSpec;
use tracing::debug;

pub struct VerletClusterLists {
    domain: Domain,
    cluster_size: usize,
    cells: Vec<FullCell>,
    /// Per cell, the index where dummy padding starts.
    dummy_starts: Vec<usize>,
    /// Per cell, per cluster: [min x, min y, min z, max x, max y, max z].
    bounding_boxes: Vec<Vec<[Real; 6]>>,
    neighbors: ClusterNeighbors,
    cells_per_dim: [usize; 2],
    grid_side_reciprocal: Real,
    box_min_halo: [Real; 3],
    box_max_halo: [Real; 3],
    valid: bool,
}

impl VerletClusterLists {
    pub fn new(domain: Domain, cluster_size: usize) -> Self {
        VerletClusterLists {
            box_min_halo: domain.halo_min(),
            box_max_halo: domain.halo_max(),
            domain,
            cluster_size: cluster_size.max(1),
            cells: vec![FullCell::new()],
            dummy_starts: vec![0],
            bounding_boxes: Vec::new(),
            neighbors: Vec::new(),
            cells_per_dim: [1, 1],
            grid_side_reciprocal: 1.0,
            valid: false,
        }
    }

    pub fn domain(&self) -> &Domain {
        &self.domain
    }

    /// Position guaranteed to be far outside every spatial query.
    fn dummy_pos(&self, cell: usize, j: usize) -> [Real; 3] {
        let off = 8.0 * self.domain.interaction_length();
        [
            self.box_max_halo[0] + off + cell as Real,
            self.box_max_halo[1] + off + j as Real,
            self.box_max_halo[2] + off,
        ]
    }

    pub fn add_particle(&mut self, mut p: Particle) -> Result<()> {
        if !self.domain.contains(p.pos) {
            return Err(CoreError::OutOfBoundsInsert {
                pos: p.pos,
                halo: false,
            });
        }
        p.owned = true;
        self.insert_unsorted(p);
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
        self.insert_unsorted(p);
        Ok(())
    }

    /// Lists will be rebuilt anyway, so new particles just go into the
    /// first cell after stripping its dummy padding.
    fn insert_unsorted(&mut self, p: Particle) {
        self.valid = false;
        let ds = self.dummy_starts[0];
        self.cells[0].truncate(ds);
        self.cells[0].add(p);
        self.dummy_starts[0] = ds + 1;
    }

    pub fn update_halo_particle(&mut self, p: &Particle) -> bool {
        let r = self.domain.skin / 2.0;
        let lo = [p.pos[0] - r, p.pos[1] - r, p.pos[2] - r];
        let hi = [p.pos[0] + r, p.pos[1] + r, p.pos[2] + r];
        for cell in &mut self.cells {
            for q in cell.iter_mut() {
                if !q.owned && !q.is_dummy() && q.id == p.id && in_box(q.pos, lo, hi) {
                    *q = p.clone();
                    q.owned = false;
                    return true;
                }
            }
        }
        false
    }

    pub fn delete_halo_particles(&mut self) {
        self.valid = false;
        for (ci, cell) in self.cells.iter_mut().enumerate() {
            cell.truncate(self.dummy_starts[ci]);
            cell.drain_matching(|p| !p.owned);
            self.dummy_starts[ci] = cell.len();
        }
    }

    pub fn delete_all_particles(&mut self) {
        self.valid = false;
        for cell in &mut self.cells {
            cell.clear();
        }
        for ds in &mut self.dummy_starts {
            *ds = 0;
        }
    }

    pub fn update_container(&mut self) -> Vec<Particle> {
        self.delete_halo_particles();
        let (min, max) = (self.domain.box_min, self.domain.box_max);
        let mut leaving = Vec::new();
        for (ci, cell) in self.cells.iter_mut().enumerate() {
            cell.truncate(self.dummy_starts[ci]);
            leaving.extend(cell.drain_matching(|p| !in_box(p.pos, min, max)));
            self.dummy_starts[ci] = cell.len();
        }
        leaving
    }

    /// True when any real particle drifted out of its cluster's bounding
    /// box plus skin.
    pub fn is_update_needed(&self) -> bool {
        if !self.valid {
            return true;
        }
        let skin = self.domain.skin;
        for (ci, cell) in self.cells.iter().enumerate() {
            for (pi, p) in cell.iter().enumerate() {
                if pi >= self.dummy_starts[ci] {
                    break;
                }
                let bb = &self.bounding_boxes[ci][pi / self.cluster_size];
                for k in 0..3 {
                    if p.pos[k] < bb[k] - skin || p.pos[k] > bb[3 + k] + skin {
                        return true;
                    }
                }
            }
        }
        false
    }

    pub fn invalidate_lists(&mut self) {
        self.valid = false;
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
        if !self.valid {
            // no usable spatial index; scan everything
            return Box::new(
                self.cells
                    .iter()
                    .flat_map(|c| c.iter())
                    .filter(move |p| behavior.accepts(p) && in_box(p.pos, lo, hi)),
            );
        }

        let skin = self.domain.skin;
        let candidates = self.columns_intersecting(
            [lo[0] - skin, lo[1] - skin],
            [hi[0] + skin, hi[1] + skin],
        );
        Box::new(
            candidates
                .into_iter()
                .flat_map(move |ci| self.cells[ci].iter())
                .filter(move |p| {
                    behavior.accepts(p) && p.pos[2] >= lo[2] && p.pos[2] < hi[2]
                }),
        )
    }

    fn columns_intersecting(&self, lo: [Real; 2], hi: [Real; 2]) -> Vec<usize> {
        let mut out = Vec::new();
        let clamp = |v: Real, d: usize| -> usize {
            let i = ((v - self.box_min_halo[d]) * self.grid_side_reciprocal).floor() as isize;
            i.clamp(0, self.cells_per_dim[d] as isize - 1) as usize
        };
        let (x0, x1) = (clamp(lo[0], 0), clamp(hi[0], 0));
        let (y0, y1) = (clamp(lo[1], 1), clamp(hi[1], 1));
        for y in y0..=y1 {
            for x in x0..=x1 {
                out.push(x + self.cells_per_dim[0] * y);
            }
        }
        out
    }

    /// Recomputes grid, clusters, bounding boxes and the cluster neighbor
    /// graph. Every particle is kept; leavers are collected by
    /// `update_container`, not here.
    fn rebuild(&mut self) {
        // strip dummy padding, collect everything
        let mut particles = Vec::new();
        for (ci, cell) in self.cells.iter_mut().enumerate() {
            cell.truncate(self.dummy_starts[ci]);
            particles.append(&mut cell.particles);
            cell.clear();
        }
        particles.retain(|p| !p.is_dummy());

        let mut volume = 1.0;
        let mut box_size = [0.0; 3];
        for d in 0..3 {
            box_size[d] = self.box_max_halo[d] - self.box_min_halo[d];
            volume *= box_size[d];
        }
        let density = (particles.len().max(1)) as Real / volume;
        let grid_side = (self.cluster_size as Real / density).cbrt();
        self.grid_side_reciprocal = 1.0 / grid_side;

        let mut size_grid = 1;
        for d in 0..2 {
            self.cells_per_dim[d] =
                ((box_size[d] * self.grid_side_reciprocal).ceil() as usize).max(1);
            size_grid *= self.cells_per_dim[d];
        }

        self.cells = (0..size_grid).map(|_| FullCell::new()).collect();
        self.dummy_starts = vec![0; size_grid];
        self.bounding_boxes = vec![Vec::new(); size_grid];

        for p in particles {
            let mut c = [0usize; 2];
            for d in 0..2 {
                let i = ((p.pos[d] - self.box_min_halo[d]) * self.grid_side_reciprocal).floor()
                    as isize;
                c[d] = i.clamp(0, self.cells_per_dim[d] as isize - 1) as usize;
            }
            self.cells[c[0] + self.cells_per_dim[0] * c[1]].add(p);
        }

        // sort columns by z and pad to full clusters
        for ci in 0..size_grid {
            self.cells[ci].sort_by_dim(2);
            let n = self.cells[ci].len();
            self.dummy_starts[ci] = n;
            let missing = (self.cluster_size - n % self.cluster_size) % self.cluster_size;
            for j in 0..missing {
                let pos = self.dummy_pos(ci, j);
                self.cells[ci].add(Particle::dummy(pos));
            }

            let n_clusters = self.cells[ci].len() / self.cluster_size;
            let mut boxes = Vec::with_capacity(n_clusters);
            for k in 0..n_clusters {
                let mut bb = [
                    Real::INFINITY,
                    Real::INFINITY,
                    Real::INFINITY,
                    Real::NEG_INFINITY,
                    Real::NEG_INFINITY,
                    Real::NEG_INFINITY,
                ];
                let from = k * self.cluster_size;
                let to = ((k + 1) * self.cluster_size).min(self.dummy_starts[ci]);
                for pi in from..to {
                    let p = self.cells[ci].get(pi);
                    for d in 0..3 {
                        bb[d] = bb[d].min(p.pos[d]);
                        bb[3 + d] = bb[3 + d].max(p.pos[d]);
                    }
                }
                boxes.push(bb);
            }
            self.bounding_boxes[ci] = boxes;
        }

        self.rebuild_neighbor_graph();
        self.valid = true;
        debug!(
            columns = size_grid,
            clusters = self.bounding_boxes.iter().map(|b| b.len()).sum::<usize>(),
            "rebuilt cluster container"
        );
    }

    /// Full cluster adjacency: an edge in both directions for every pair
    /// of bounding boxes within `interactionLength` in the L∞ sense.
    fn rebuild_neighbor_graph(&mut self) {
        let reach = self.domain.interaction_length();
        let grid_reach = (reach * self.grid_side_reciprocal).ceil() as isize;
        let [nx, ny] = self.cells_per_dim;

        self.neighbors = self
            .bounding_boxes
            .iter()
            .map(|b| vec![Vec::new(); b.len()])
            .collect();

        for cy in 0..ny {
            for cx in 0..nx {
                let ci = cx + nx * cy;
                for dy in -grid_reach..=grid_reach {
                    for dx in -grid_reach..=grid_reach {
                        let ox = cx as isize + dx;
                        let oy = cy as isize + dy;
                        if ox < 0 || oy < 0 || ox >= nx as isize || oy >= ny as isize {
                            continue;
                        }
                        let cj = ox as usize + nx * oy as usize;
                        for k in 0..self.bounding_boxes[ci].len() {
                            for l in 0..self.bounding_boxes[cj].len() {
                                if ci == cj && k == l {
                                    continue;
                                }
                                if bb_within(
                                    &self.bounding_boxes[ci][k],
                                    &self.bounding_boxes[cj][l],
                                    reach,
                                ) {
                                    self.neighbors[ci][k].push((cj as u32, l as u32));
                                }
                            }
                        }
                    }
                }
            }
        }
    }

    pub fn traverse<F: Functor>(&mut self, functor: &F, spec: TraversalSpec) {
        if !self.valid {
            self.rebuild();
        }
        cluster::traverse(
            &mut self.cells,
            self.cluster_size,
            &self.neighbors,
            functor,
            spec.newton3,
        );
    }
}

/// L∞ distance between two axis-aligned boxes is within `reach`.
fn bb_within(a: &[Real; 6], b: &[Real; 6], reach: Real) -> bool {
    for d in 0..3 {
        let gap = (a[d] - b[3 + d]).max(b[d] - a[3 + d]).max(0.0);
        if gap > reach {
            return false;
        }
    }
    true
}


// -- end of file --
