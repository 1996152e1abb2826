//! Truncated (optionally shifted) Lennard-Jones 12-6 kernel.

use super::{Functor, NeighborLists, VerletView};
use crate::particle::{Attr, Particle};
use crate::real::Real;
use crate::soa::SoaBuffer;
use crate::CoreError;
use std::sync::Mutex;

const NEEDED: [Attr; 4] = [Attr::PosX, Attr::PosY, Attr::PosZ, Attr::Owned];
const COMPUTED: [Attr; 3] = [Attr::ForceX, Attr::ForceY, Attr::ForceZ];

#[derive(Debug, Default)]
struct Globals {
    upot: Real,
    virial: [Real; 3],
    post_processed: bool,
}

/// Lennard-Jones functor.
///
/// Carries the cutoff radius for the engine and optionally accumulates the
/// global potential energy and virial. Global accumulation follows the
/// duplicated-calculation convention: halo contributions are computed on
/// every participating domain, so Newton3 pairs count half per owned
/// participant and non-Newton3 sums are halved during post-processing.
pub struct LennardJones {
    cutoff: Real,
    cutoff_sq: Real,
    epsilon24: Real,
    sigma_sq: Real,
    shift6: Real,
    compute_globals: bool,
    globals: Mutex<Globals>,
}

impl LennardJones {
    pub fn new(cutoff: Real, epsilon: Real, sigma: Real) -> Self {
        LennardJones {
            cutoff,
            cutoff_sq: cutoff * cutoff,
            epsilon24: 24.0 * epsilon,
            sigma_sq: sigma * sigma,
            shift6: 0.0,
            compute_globals: false,
            globals: Mutex::new(Default::default()),
        }
    }

    /// Shifts the potential so it is zero at the cutoff.
    pub fn with_shift(cutoff: Real, epsilon: Real, sigma: Real) -> Self {
        let mut f = Self::new(cutoff, epsilon, sigma);
        let lj6 = (f.sigma_sq / f.cutoff_sq).powi(3);
        let lj12 = lj6 * lj6;
        f.shift6 = -f.epsilon24 * (lj12 - lj6);
        f
    }

    /// Enables accumulation of global potential energy and virial.
    pub fn with_globals(cutoff: Real, epsilon: Real, sigma: Real) -> Self {
        let mut f = Self::new(cutoff, epsilon, sigma);
        f.compute_globals = true;
        f
    }

    /// Global potential energy. Only available after `end_traversal`.
    pub fn upot(&self) -> Result<Real, CoreError> {
        let g = self.globals.lock().unwrap();
        if !g.post_processed {
            return Err(CoreError::PostprocessingOrder(
                "upot requested before end_traversal",
            ));
        }
        Ok(g.upot)
    }

    /// Sum of the virial components. Only available after `end_traversal`.
    pub fn virial(&self) -> Result<Real, CoreError> {
        let g = self.globals.lock().unwrap();
        if !g.post_processed {
            return Err(CoreError::PostprocessingOrder(
                "virial requested before end_traversal",
            ));
        }
        Ok(g.virial[0] + g.virial[1] + g.virial[2])
    }

    /// Force factor and `upot` contribution for a squared distance inside
    /// the cutoff.
    fn kernel(&self, dr2: Real) -> (Real, Real) {
        let invdr2 = 1.0 / dr2;
        let lj6 = {
            let x = self.sigma_sq * invdr2;
            x * x * x
        };
        let lj12 = lj6 * lj6;
        let lj12m6 = lj12 - lj6;
        let fac = self.epsilon24 * (lj12 + lj12m6) * invdr2;
        let upot = self.epsilon24 * lj12m6 + self.shift6;
        (fac, upot)
    }

    fn accumulate_globals(
        &self,
        acc: &mut Globals,
        dr: [Real; 3],
        f: [Real; 3],
        upot: Real,
        i_owned: bool,
        j_owned: bool,
        newton3: bool,
    ) {
        let virial = [dr[0] * f[0], dr[1] * f[1], dr[2] * f[2]];
        let (upot, virial) = if newton3 {
            (upot * 0.5, [virial[0] * 0.5, virial[1] * 0.5, virial[2] * 0.5])
        } else {
            (upot, virial)
        };
        if i_owned {
            acc.upot += upot;
            for k in 0..3 {
                acc.virial[k] += virial[k];
            }
        }
        if newton3 && j_owned {
            acc.upot += upot;
            for k in 0..3 {
                acc.virial[k] += virial[k];
            }
        }
    }

    fn flush_globals(&self, acc: Globals) {
        if acc.upot == 0.0 && acc.virial == [0.0; 3] {
            return;
        }
        let mut g = self.globals.lock().unwrap();
        g.upot += acc.upot;
        for k in 0..3 {
            g.virial[k] += acc.virial[k];
        }
    }
}

impl Functor for LennardJones {
    fn cutoff(&self) -> Real {
        self.cutoff
    }

    fn aos(&self, i: &mut Particle, j: &mut Particle, newton3: bool) {
        let dr = [
            i.pos[0] - j.pos[0],
            i.pos[1] - j.pos[1],
            i.pos[2] - j.pos[2],
        ];
        let dr2 = dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2];
        if dr2 > self.cutoff_sq {
            return;
        }
        let (fac, upot) = self.kernel(dr2);
        let f = [dr[0] * fac, dr[1] * fac, dr[2] * fac];
        i.add_force(f);
        if newton3 {
            j.sub_force(f);
        }
        if self.compute_globals {
            let mut acc = Globals::default();
            self.accumulate_globals(&mut acc, dr, f, upot, i.owned, j.owned, newton3);
            self.flush_globals(acc);
        }
    }

    fn soa_single(&self, soa: &mut SoaBuffer, newton3: bool) {
        let (pos, mut force) = soa.pos_force_split();
        let n = pos.len();
        let mut acc = Globals::default();
        for i in 0..n {
            let js = if newton3 { (i + 1)..n } else { 0..n };
            for j in js {
                if i == j {
                    continue;
                }
                let dr = [
                    pos.x[i] - pos.x[j],
                    pos.y[i] - pos.y[j],
                    pos.z[i] - pos.z[j],
                ];
                let dr2 = dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2];
                if dr2 > self.cutoff_sq {
                    continue;
                }
                let (fac, upot) = self.kernel(dr2);
                let f = [dr[0] * fac, dr[1] * fac, dr[2] * fac];
                force.add(i, f);
                if newton3 {
                    force.sub(j, f);
                }
                if self.compute_globals {
                    self.accumulate_globals(
                        &mut acc,
                        dr,
                        f,
                        upot,
                        pos.owned[i],
                        pos.owned[j],
                        newton3,
                    );
                }
            }
        }
        if self.compute_globals {
            self.flush_globals(acc);
        }
    }

    fn soa_pair(&self, a: &mut SoaBuffer, b: &mut SoaBuffer, newton3: bool) {
        let (pos_a, mut force_a) = a.pos_force_split();
        let (pos_b, mut force_b) = b.pos_force_split();
        let mut acc = Globals::default();
        for i in 0..pos_a.len() {
            for j in 0..pos_b.len() {
                let dr = [
                    pos_a.x[i] - pos_b.x[j],
                    pos_a.y[i] - pos_b.y[j],
                    pos_a.z[i] - pos_b.z[j],
                ];
                let dr2 = dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2];
                if dr2 > self.cutoff_sq {
                    continue;
                }
                let (fac, upot) = self.kernel(dr2);
                let f = [dr[0] * fac, dr[1] * fac, dr[2] * fac];
                force_a.add(i, f);
                if newton3 {
                    force_b.sub(j, f);
                }
                if self.compute_globals {
                    self.accumulate_globals(
                        &mut acc,
                        dr,
                        f,
                        upot,
                        pos_a.owned[i],
                        pos_b.owned[j],
                        newton3,
                    );
                }
            }
        }
        if self.compute_globals {
            self.flush_globals(acc);
        }
    }

    fn soa_verlet(&self, view: &mut VerletView<'_>, lists: &NeighborLists, newton3: bool) {
        let mut acc = Globals::default();
        for li in 0..view.rows() {
            let gi = view.first + li;
            let (xi, yi, zi) = (view.pos_x[gi], view.pos_y[gi], view.pos_z[gi]);
            let mut fi = [0.0; 3];
            for &j in &lists[gi] {
                let gj = j as usize;
                let dr = [xi - view.pos_x[gj], yi - view.pos_y[gj], zi - view.pos_z[gj]];
                let dr2 = dr[0] * dr[0] + dr[1] * dr[1] + dr[2] * dr[2];
                if dr2 > self.cutoff_sq {
                    continue;
                }
                let (fac, upot) = self.kernel(dr2);
                let f = [dr[0] * fac, dr[1] * fac, dr[2] * fac];
                for k in 0..3 {
                    fi[k] += f[k];
                }
                if newton3 {
                    // full-width view; gj is a valid force row
                    view.force_x[gj] -= f[0];
                    view.force_y[gj] -= f[1];
                    view.force_z[gj] -= f[2];
                }
                if self.compute_globals {
                    self.accumulate_globals(
                        &mut acc,
                        dr,
                        f,
                        upot,
                        view.owned[gi],
                        view.owned[gj],
                        newton3,
                    );
                }
            }
            view.force_x[li] += fi[0];
            view.force_y[li] += fi[1];
            view.force_z[li] += fi[2];
        }
        if self.compute_globals {
            self.flush_globals(acc);
        }
    }

    fn init_traversal(&self) {
        let mut g = self.globals.lock().unwrap();
        *g = Globals::default();
    }

    fn end_traversal(&self, newton3: bool) -> Result<(), CoreError> {
        let mut g = self.globals.lock().unwrap();
        if g.post_processed {
            return Err(CoreError::PostprocessingOrder(
                "end_traversal called twice",
            ));
        }
        if !newton3 {
            // without Newton3 every pair was visited from both sides
            g.upot *= 0.5;
            for k in 0..3 {
                g.virial[k] *= 0.5;
            }
        }
        g.upot /= 6.0;
        g.post_processed = true;
        Ok(())
    }

    fn needed_attrs(&self) -> &'static [Attr] {
        &NEEDED
    }

    fn computed_attrs(&self) -> &'static [Attr] {
        &COMPUTED
    }
}


// -- end of file --
