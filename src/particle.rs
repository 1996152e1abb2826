use crate::real::Real;
use serde::{Deserialize, Serialize};

/// Id used for dummy particles. Spatial queries never return them.
pub const DUMMY_ID: u64 = u64::MAX;

/// Attribute ids of the particle layout, used to address SoA columns.
///
/// Column types: `Id`/`TypeId` are `u64`, `Owned` is `bool`, the rest are
/// `Real`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Attr {
    Id,
    PosX,
    PosY,
    PosZ,
    ForceX,
    ForceY,
    ForceZ,
    Owned,
    TypeId,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Particle {
    /// Stable id, unique per particle over the lifetime of the simulation.
    pub id: u64,

    /// Position
    pub pos: [Real; 3],

    /// Velocity
    pub vel: [Real; 3],

    /// Accumulated force
    pub force: [Real; 3],

    /// True iff the particle lives inside `[box_min, box_max)` of this
    /// instance; false for halo copies.
    pub owned: bool,

    /// Species id for multi-type kernels.
    pub type_id: u64,
}

impl Particle {
    pub fn new(id: u64, pos: [Real; 3], vel: [Real; 3]) -> Self {
        Particle {
            id,
            pos,
            vel,
            owned: true,
            ..Default::default()
        }
    }

    /// A padding particle. Carries `DUMMY_ID` and must be placed outside
    /// the halo region so that spatial queries never see it.
    pub fn dummy(pos: [Real; 3]) -> Self {
        Particle {
            id: DUMMY_ID,
            pos,
            owned: false,
            ..Default::default()
        }
    }

    pub fn is_dummy(&self) -> bool {
        self.id == DUMMY_ID
    }

    pub fn add_force(&mut self, f: [Real; 3]) {
        for k in 0..3 {
            self.force[k] += f[k];
        }
    }

    pub fn sub_force(&mut self, f: [Real; 3]) {
        for k in 0..3 {
            self.force[k] -= f[k];
        }
    }
}


// -- end of file --
