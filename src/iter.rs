//! Behavior-filtered particle iteration.

use crate::particle::Particle;

/// Which particles an iterator yields. Dummies are always skipped.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IterBehavior {
    OwnedOnly,
    HaloOnly,
    HaloAndOwned,
}

impl IterBehavior {
    pub fn accepts(self, p: &Particle) -> bool {
        if p.is_dummy() {
            return false;
        }
        match self {
            IterBehavior::OwnedOnly => p.owned,
            IterBehavior::HaloOnly => !p.owned,
            IterBehavior::HaloAndOwned => true,
        }
    }
}

/// Polymorphic lazy particle iterator handed out by the containers.
pub type ParticleIter<'a> = Box<dyn Iterator<Item = &'a Particle> + 'a>;

/// Mutable flavor; used to update positions and velocities between
/// traversals.
pub type ParticleIterMut<'a> = Box<dyn Iterator<Item = &'a mut Particle> + 'a>;


// -- end of file --
