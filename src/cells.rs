//! Particle cells: the storage unit containers are built from.

use crate::particle::{Attr, Particle};
use crate::soa::SoaBuffer;
use std::ops::{Deref, DerefMut};

/// Which representation of a `FullCell` is currently authoritative.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CellLayout {
    Aos,
    Soa,
}

impl Default for CellLayout {
    fn default() -> Self {
        CellLayout::Aos
    }
}

/// Cell holding particles both as an AoS vector and a parallel SoA buffer.
///
/// Outside of a traversal the AoS side is authoritative. A SoA-native
/// traversal converts with [`FullCell::to_soa`] up front and writes results
/// back afterwards; velocity only exists on the AoS side and survives the
/// round trip untouched.
#[derive(Clone, Debug, Default)]
pub struct FullCell {
    pub(crate) particles: Vec<Particle>,
    pub(crate) soa: SoaBuffer,
    layout: CellLayout,
}

impl FullCell {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    pub fn add(&mut self, p: Particle) {
        self.particles.push(p);
    }

    pub fn get(&self, i: usize) -> &Particle {
        &self.particles[i]
    }

    pub fn get_mut(&mut self, i: usize) -> &mut Particle {
        &mut self.particles[i]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Particle> {
        self.particles.iter()
    }

    pub fn iter_mut(&mut self) -> std::slice::IterMut<'_, Particle> {
        self.particles.iter_mut()
    }

    pub fn clear(&mut self) {
        self.particles.clear();
        self.soa.clear();
    }

    /// Truncates the cell to `n` particles.
    pub fn truncate(&mut self, n: usize) {
        self.particles.truncate(n);
    }

    /// Removes the particle at `i` by swapping in the last one.
    pub fn delete_by_index(&mut self, i: usize) {
        self.particles.swap_remove(i);
    }

    /// Removes every particle matching `pred`, swap-with-last style, and
    /// returns the removed ones.
    pub fn drain_matching<F: FnMut(&Particle) -> bool>(&mut self, mut pred: F) -> Vec<Particle> {
        let mut removed = Vec::new();
        let mut i = 0;
        while i < self.particles.len() {
            if pred(&self.particles[i]) {
                removed.push(self.particles.swap_remove(i));
            } else {
                i += 1;
            }
        }
        removed
    }

    pub fn sort_by_dim(&mut self, d: usize) {
        self.particles
            .sort_by(|a, b| a.pos[d].partial_cmp(&b.pos[d]).unwrap());
    }

    pub fn is_soa(&self) -> bool {
        self.layout == CellLayout::Soa
    }

    pub fn soa(&self) -> &SoaBuffer {
        &self.soa
    }

    pub fn soa_mut(&mut self) -> &mut SoaBuffer {
        &mut self.soa
    }

    /// Loads the SoA buffer from the AoS side.
    pub fn to_soa(&mut self) {
        self.soa.clear();
        for p in &self.particles {
            self.soa.push(p);
        }
        self.layout = CellLayout::Soa;
    }

    /// Writes every stored attribute back from the SoA buffer, keeping the
    /// AoS-only attributes (velocity) intact.
    pub fn from_soa(&mut self) {
        for i in 0..self.particles.len() {
            let row = self.soa.read(i);
            let p = &mut self.particles[i];
            p.id = row.id;
            p.pos = row.pos;
            p.force = row.force;
            p.owned = row.owned;
            p.type_id = row.type_id;
        }
        self.layout = CellLayout::Aos;
    }

    /// Writes only the listed attributes back from the SoA buffer.
    pub fn write_back(&mut self, attrs: &[Attr]) {
        for (i, p) in self.particles.iter_mut().enumerate() {
            for &attr in attrs {
                match attr {
                    Attr::Id => p.id = self.soa.id_col()[i],
                    Attr::PosX => p.pos[0] = self.soa.col(Attr::PosX)[i],
                    Attr::PosY => p.pos[1] = self.soa.col(Attr::PosY)[i],
                    Attr::PosZ => p.pos[2] = self.soa.col(Attr::PosZ)[i],
                    Attr::ForceX => p.force[0] = self.soa.col(Attr::ForceX)[i],
                    Attr::ForceY => p.force[1] = self.soa.col(Attr::ForceY)[i],
                    Attr::ForceZ => p.force[2] = self.soa.col(Attr::ForceZ)[i],
                    Attr::Owned => p.owned = self.soa.owned_col()[i],
                    Attr::TypeId => p.type_id = self.soa.type_id_col()[i],
                }
            }
        }
        self.layout = CellLayout::Aos;
    }
}

/// Reduced-memory cell: particles live only in the SoA buffer.
///
/// Mutable access goes through a scoped [`ParticleProxy`] that materializes
/// the row as a particle and writes it back when dropped. Velocity is not
/// part of the stored layout.
#[derive(Clone, Debug, Default)]
pub struct ReducedCell {
    soa: SoaBuffer,
}

impl ReducedCell {
    pub fn new() -> Self {
        Default::default()
    }

    pub fn len(&self) -> usize {
        self.soa.len()
    }

    pub fn is_empty(&self) -> bool {
        self.soa.is_empty()
    }

    pub fn add(&mut self, p: &Particle) {
        self.soa.push(p);
    }

    pub fn read(&self, i: usize) -> Particle {
        self.soa.read(i)
    }

    /// Scoped mutable access to the particle at `i`.
    pub fn proxy(&mut self, i: usize) -> ParticleProxy<'_> {
        let particle = self.soa.read(i);
        ParticleProxy {
            cell: self,
            index: i,
            particle,
        }
    }

    pub fn delete_by_index(&mut self, i: usize) {
        let last = self.soa.raw_len() - 1;
        if i < last {
            self.soa.swap(i, last);
        }
        self.soa.pop_back();
    }

    pub fn clear(&mut self) {
        self.soa.clear();
    }

    pub fn soa(&self) -> &SoaBuffer {
        &self.soa
    }
}

/// Write-back guard for a `ReducedCell` row.
pub struct ParticleProxy<'a> {
    cell: &'a mut ReducedCell,
    index: usize,
    particle: Particle,
}

impl Deref for ParticleProxy<'_> {
    type Target = Particle;

    fn deref(&self) -> &Particle {
        &self.particle
    }
}

impl DerefMut for ParticleProxy<'_> {
    fn deref_mut(&mut self) -> &mut Particle {
        &mut self.particle
    }
}

impl Drop for ParticleProxy<'_> {
    fn drop(&mut self) {
        self.cell.soa.write(self.index, &self.particle);
    }
}


// -- end of file --
