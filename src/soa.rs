//! Structure-of-arrays particle storage.
//!
//! One aligned-growth `Vec` per attribute of the particle layout. All
//! columns always have the same length; `view_start` hides a prefix so a
//! buffer can be handed out as a cheap "rows since offset" view. Velocity
//! is not part of the layout (kernels neither read nor write it), so it
//! only lives on the AoS side.

use crate::particle::{Attr, Particle};
use crate::real::Real;

#[derive(Clone, Debug, Default, PartialEq)]
pub struct SoaBuffer {
    id: Vec<u64>,
    pos_x: Vec<Real>,
    pos_y: Vec<Real>,
    pos_z: Vec<Real>,
    force_x: Vec<Real>,
    force_y: Vec<Real>,
    force_z: Vec<Real>,
    owned: Vec<bool>,
    type_id: Vec<u64>,
    view_start: usize,
}

impl SoaBuffer {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn with_capacity(n: usize) -> Self {
        SoaBuffer {
            id: Vec::with_capacity(n),
            pos_x: Vec::with_capacity(n),
            pos_y: Vec::with_capacity(n),
            pos_z: Vec::with_capacity(n),
            force_x: Vec::with_capacity(n),
            force_y: Vec::with_capacity(n),
            force_z: Vec::with_capacity(n),
            owned: Vec::with_capacity(n),
            type_id: Vec::with_capacity(n),
            view_start: 0,
        }
    }

    /// Number of visible rows (`total rows − view_start`).
    pub fn len(&self) -> usize {
        self.id.len() - self.view_start
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total number of rows, ignoring the view offset.
    pub fn raw_len(&self) -> usize {
        self.id.len()
    }

    /// Appends one row holding every attribute of `p`.
    pub fn push(&mut self, p: &Particle) {
        self.id.push(p.id);
        self.pos_x.push(p.pos[0]);
        self.pos_y.push(p.pos[1]);
        self.pos_z.push(p.pos[2]);
        self.force_x.push(p.force[0]);
        self.force_y.push(p.force[1]);
        self.force_z.push(p.force[2]);
        self.owned.push(p.owned);
        self.type_id.push(p.type_id);
    }

    /// Materializes row `i` (relative to the view) as a particle.
    /// The velocity of the result is zero; it is not stored here.
    pub fn read(&self, i: usize) -> Particle {
        let i = i + self.view_start;
        Particle {
            id: self.id[i],
            pos: [self.pos_x[i], self.pos_y[i], self.pos_z[i]],
            vel: [0.0; 3],
            force: [self.force_x[i], self.force_y[i], self.force_z[i]],
            owned: self.owned[i],
            type_id: self.type_id[i],
        }
    }

    /// Writes every stored attribute of `p` to row `i` (relative to the
    /// view).
    pub fn write(&mut self, i: usize, p: &Particle) {
        let i = i + self.view_start;
        self.id[i] = p.id;
        self.pos_x[i] = p.pos[0];
        self.pos_y[i] = p.pos[1];
        self.pos_z[i] = p.pos[2];
        self.force_x[i] = p.force[0];
        self.force_y[i] = p.force[1];
        self.force_z[i] = p.force[2];
        self.owned[i] = p.owned;
        self.type_id[i] = p.type_id;
    }

    /// Reads the listed `Real` attributes of row `i` in order.
    pub fn read_multiple<const N: usize>(&self, i: usize, attrs: [Attr; N]) -> [Real; N] {
        let mut out = [0.0; N];
        for (v, &a) in out.iter_mut().zip(attrs.iter()) {
            *v = self.col(a)[i];
        }
        out
    }

    /// Writes the listed `Real` attributes of row `i` in order.
    pub fn write_multiple<const N: usize>(&mut self, i: usize, attrs: [Attr; N], values: [Real; N]) {
        for (&v, &a) in values.iter().zip(attrs.iter()) {
            self.col_mut(a)[i] = v;
        }
    }

    /// The visible slice of a `Real` attribute column.
    ///
    /// Panics when `attr` is not a `Real` column (`Id`, `Owned`, `TypeId`).
    pub fn col(&self, attr: Attr) -> &[Real] {
        let col = match attr {
            Attr::PosX => &self.pos_x,
            Attr::PosY => &self.pos_y,
            Attr::PosZ => &self.pos_z,
            Attr::ForceX => &self.force_x,
            Attr::ForceY => &self.force_y,
            Attr::ForceZ => &self.force_z,
            other => panic!("attribute {:?} is not a Real column", other),
        };
        &col[self.view_start..]
    }

    pub fn col_mut(&mut self, attr: Attr) -> &mut [Real] {
        let start = self.view_start;
        let col = match attr {
            Attr::PosX => &mut self.pos_x,
            Attr::PosY => &mut self.pos_y,
            Attr::PosZ => &mut self.pos_z,
            Attr::ForceX => &mut self.force_x,
            Attr::ForceY => &mut self.force_y,
            Attr::ForceZ => &mut self.force_z,
            other => panic!("attribute {:?} is not a Real column", other),
        };
        &mut col[start..]
    }

    pub fn id_col(&self) -> &[u64] {
        &self.id[self.view_start..]
    }

    pub fn owned_col(&self) -> &[bool] {
        &self.owned[self.view_start..]
    }

    pub fn type_id_col(&self) -> &[u64] {
        &self.type_id[self.view_start..]
    }

    /// Appends the visible rows of `other`.
    pub fn append(&mut self, other: &SoaBuffer) {
        let s = other.view_start;
        self.id.extend_from_slice(&other.id[s..]);
        self.pos_x.extend_from_slice(&other.pos_x[s..]);
        self.pos_y.extend_from_slice(&other.pos_y[s..]);
        self.pos_z.extend_from_slice(&other.pos_z[s..]);
        self.force_x.extend_from_slice(&other.force_x[s..]);
        self.force_y.extend_from_slice(&other.force_y[s..]);
        self.force_z.extend_from_slice(&other.force_z[s..]);
        self.owned.extend_from_slice(&other.owned[s..]);
        self.type_id.extend_from_slice(&other.type_id[s..]);
    }

    pub fn clear(&mut self) {
        self.id.clear();
        self.pos_x.clear();
        self.pos_y.clear();
        self.pos_z.clear();
        self.force_x.clear();
        self.force_y.clear();
        self.force_z.clear();
        self.owned.clear();
        self.type_id.clear();
        self.view_start = 0;
    }

    /// Swaps two rows. Indices are absolute, ignoring the view offset.
    pub fn swap(&mut self, a: usize, b: usize) {
        self.id.swap(a, b);
        self.pos_x.swap(a, b);
        self.pos_y.swap(a, b);
        self.pos_z.swap(a, b);
        self.force_x.swap(a, b);
        self.force_y.swap(a, b);
        self.force_z.swap(a, b);
        self.owned.swap(a, b);
        self.type_id.swap(a, b);
    }

    /// Drops the last row.
    pub fn pop_back(&mut self) {
        self.id.pop();
        self.pos_x.pop();
        self.pos_y.pop();
        self.pos_z.pop();
        self.force_x.pop();
        self.force_y.pop();
        self.force_z.pop();
        self.owned.pop();
        self.type_id.pop();
    }

    /// Hides the first `start` rows from all view-relative accessors.
    pub fn set_view_start(&mut self, start: usize) {
        self.view_start = start;
    }

    /// Splits the visible rows into a read-only position view and a
    /// mutable force view. This is the access pattern of every SoA kernel:
    /// positions are read, forces are accumulated.
    pub fn pos_force_split(&mut self) -> (PosView<'_>, ForceViewMut<'_>) {
        let s = self.view_start;
        (
            PosView {
                x: &self.pos_x[s..],
                y: &self.pos_y[s..],
                z: &self.pos_z[s..],
                owned: &self.owned[s..],
                type_id: &self.type_id[s..],
            },
            ForceViewMut {
                x: &mut self.force_x[s..],
                y: &mut self.force_y[s..],
                z: &mut self.force_z[s..],
            },
        )
    }
}

/// Read-only columns a pairwise kernel needs.
pub struct PosView<'a> {
    pub x: &'a [Real],
    pub y: &'a [Real],
    pub z: &'a [Real],
    pub owned: &'a [bool],
    pub type_id: &'a [u64],
}

impl PosView<'_> {
    pub fn len(&self) -> usize {
        self.x.len()
    }
}

/// Mutable force columns a pairwise kernel accumulates into.
pub struct ForceViewMut<'a> {
    pub x: &'a mut [Real],
    pub y: &'a mut [Real],
    pub z: &'a mut [Real],
}

impl ForceViewMut<'_> {
    pub fn len(&self) -> usize {
        self.x.len()
    }

    pub fn add(&mut self, i: usize, f: [Real; 3]) {
        self.x[i] += f[0];
        self.y[i] += f[1];
        self.z[i] += f[2];
    }

    pub fn sub(&mut self, i: usize, f: [Real; 3]) {
        self.x[i] -= f[0];
        self.y[i] -= f[1];
        self.z[i] -= f[2];
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::particle::Attr;

    fn sample(id: u64, x: Real) -> Particle {
        let mut p = Particle::new(id, [x, x + 0.25, x + 0.5], [0.0; 3]);
        p.force = [x * 2.0, -x, 0.125];
        p.type_id = id % 3;
        p
    }

    #[test]
    fn round_trip_is_exact() {
        let mut soa = SoaBuffer::new();
        let ps: Vec<_> = (0..7).map(|i| sample(i, i as Real * 0.3)).collect();
        for p in &ps {
            soa.push(p);
        }
        for (i, p) in ps.iter().enumerate() {
            let q = soa.read(i);
            assert_eq!(q.id, p.id);
            assert_eq!(q.pos, p.pos);
            assert_eq!(q.force, p.force);
            assert_eq!(q.owned, p.owned);
            assert_eq!(q.type_id, p.type_id);
        }
    }

    #[test]
    fn read_write_multiple() {
        let mut soa = SoaBuffer::new();
        soa.push(&sample(0, 1.0));
        soa.write_multiple(0, [Attr::ForceX, Attr::ForceY, Attr::ForceZ], [1.0, 2.0, 3.0]);
        let f = soa.read_multiple(0, [Attr::ForceX, Attr::ForceY, Attr::ForceZ]);
        assert_eq!(f, [1.0, 2.0, 3.0]);
    }

    #[test]
    fn swap_and_pop_back() {
        let mut soa = SoaBuffer::new();
        soa.push(&sample(0, 0.0));
        soa.push(&sample(1, 1.0));
        soa.push(&sample(2, 2.0));
        soa.swap(0, 2);
        assert_eq!(soa.read(0).id, 2);
        soa.pop_back();
        assert_eq!(soa.len(), 2);
        assert_eq!(soa.read(1).id, 1);
    }

    #[test]
    fn view_start_slices_all_columns() {
        let mut soa = SoaBuffer::new();
        for i in 0..5 {
            soa.push(&sample(i, i as Real));
        }
        soa.set_view_start(2);
        assert_eq!(soa.len(), 3);
        assert_eq!(soa.read(0).id, 2);
        assert_eq!(soa.col(Attr::PosX).len(), 3);
        assert_eq!(soa.id_col()[0], 2);
    }

    #[test]
    fn append_copies_visible_rows() {
        let mut a = SoaBuffer::new();
        a.push(&sample(0, 0.0));
        let mut b = SoaBuffer::new();
        for i in 1..4 {
            b.push(&sample(i, i as Real));
        }
        b.set_view_start(1);
        a.append(&b);
        assert_eq!(a.len(), 3);
        assert_eq!(a.read(1).id, 2);
        assert_eq!(a.read(2).id, 3);
    }
}

// -- end of file --
