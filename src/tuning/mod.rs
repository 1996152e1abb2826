//! Configuration space and tuning strategies.

use crate::options::{ContainerOpt, DataLayoutOpt, Newton3Opt, TraversalOpt};
use crate::real::Real;
use crate::traversals;
use std::cmp::Ordering;
use std::fmt;
use std::time::Duration;

pub mod bayesian;
pub mod full_search;
pub mod random_search;
pub mod selector;
pub mod tuner;

pub use bayesian::BayesianSearch;
pub use full_search::FullSearch;
pub use random_search::RandomSearch;
pub use selector::ContainerSelector;
pub use tuner::AutoTuner;

/// One point of the tuning search space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Configuration {
    pub container: ContainerOpt,
    pub traversal: TraversalOpt,
    pub data_layout: DataLayoutOpt,
    pub newton3: Newton3Opt,
    pub cell_size_factor: Real,
}

impl Eq for Configuration {}

impl Ord for Configuration {
    fn cmp(&self, other: &Self) -> Ordering {
        (self.container, self.traversal, self.data_layout, self.newton3)
            .cmp(&(other.container, other.traversal, other.data_layout, other.newton3))
            .then(self.cell_size_factor.total_cmp(&other.cell_size_factor))
    }
}

impl PartialOrd for Configuration {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{{{}, {}, {}, newton3 {}, csf {}}}",
            self.container, self.traversal, self.data_layout, self.newton3, self.cell_size_factor
        )
    }
}

/// Whether the cell-size factor changes anything for this container.
fn uses_grid(container: ContainerOpt) -> bool {
    matches!(
        container,
        ContainerOpt::LinkedCells | ContainerOpt::VerletLists
    )
}

/// Enumerates the applicable cross product of the allowed option sets,
/// ordered and deduplicated.
pub fn enumerate_space(
    containers: &[ContainerOpt],
    traversals_allowed: &[TraversalOpt],
    layouts: &[DataLayoutOpt],
    newton3: &[Newton3Opt],
    cell_size_factors: &[Real],
) -> Vec<Configuration> {
    let mut out = Vec::new();
    for &c in containers {
        let one = [1.0];
        let csfs: &[Real] = if uses_grid(c) { cell_size_factors } else { &one };
        for &t in traversals_allowed {
            for &l in layouts {
                for &n in newton3 {
                    if !traversals::is_applicable(c, t, l, n) {
                        continue;
                    }
                    for &f in csfs {
                        out.push(Configuration {
                            container: c,
                            traversal: t,
                            data_layout: l,
                            newton3: n,
                            cell_size_factor: f,
                        });
                    }
                }
            }
        }
    }
    out.sort();
    out.dedup();
    out
}

/// Shape every tuning strategy shares: a current candidate, timing
/// evidence per candidate, and a best-so-far once evidence exists.
pub trait TuningStrategy: Send {
    /// Restarts the search over the same space.
    fn reset(&mut self);

    /// The candidate to measure next.
    fn current(&self) -> Configuration;

    /// Feeds the median measured time of a candidate back.
    fn report(&mut self, cfg: Configuration, time: Duration);

    /// Advances to the next candidate; `None` means the search converged.
    fn next(&mut self) -> Option<Configuration>;

    /// Best configuration seen so far.
    fn best_so_far(&self) -> Configuration;
}


// -- end of file --
