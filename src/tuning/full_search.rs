//! Exhaustive tuning strategy: measure every configuration, pick the
//! fastest median.

use super::{Configuration, TuningStrategy};
use std::time::Duration;

pub struct FullSearch {
    space: Vec<Configuration>,
    idx: usize,
    evidence: Vec<(Configuration, Duration)>,
}

impl FullSearch {
    /// `space` must be non-empty; the caller surfaces
    /// `InvalidConfiguration` before constructing a strategy.
    pub fn new(space: Vec<Configuration>) -> Self {
        assert!(!space.is_empty());
        FullSearch {
            space,
            idx: 0,
            evidence: Vec::new(),
        }
    }
}

impl TuningStrategy for FullSearch {
    fn reset(&mut self) {
        self.idx = 0;
        self.evidence.clear();
    }

    fn current(&self) -> Configuration {
        self.space[self.idx]
    }

    fn report(&mut self, cfg: Configuration, time: Duration) {
        self.evidence.push((cfg, time));
    }

    fn next(&mut self) -> Option<Configuration> {
        if self.idx + 1 < self.space.len() {
            self.idx += 1;
            Some(self.space[self.idx])
        } else {
            None
        }
    }

    fn best_so_far(&self) -> Configuration {
        self.evidence
            .iter()
            .min_by_key(|(_, t)| *t)
            .map(|(c, _)| *c)
            .unwrap_or(self.space[0])
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{ContainerOpt, DataLayoutOpt, Newton3Opt, TraversalOpt};

    fn cfg(t: TraversalOpt) -> Configuration {
        Configuration {
            container: ContainerOpt::LinkedCells,
            traversal: t,
            data_layout: DataLayoutOpt::Aos,
            newton3: Newton3Opt::Enabled,
            cell_size_factor: 1.0,
        }
    }

    #[test]
    fn walks_the_space_and_returns_minimum() {
        let space = vec![cfg(TraversalOpt::C08), cfg(TraversalOpt::Sliced), cfg(TraversalOpt::C18)];
        let mut fs = FullSearch::new(space.clone());
        let times: [u64; 3] = [30, 10, 20];
        for t in times.iter() {
            let c = fs.current();
            fs.report(c, Duration::from_micros(*t));
            fs.next();
        }
        assert_eq!(fs.best_so_far(), space[1]);

        fs.reset();
        assert_eq!(fs.current(), space[0]);
    }

    #[test]
    fn next_signals_convergence() {
        let mut fs = FullSearch::new(vec![cfg(TraversalOpt::C08), cfg(TraversalOpt::C18)]);
        assert!(fs.next().is_some());
        assert!(fs.next().is_none());
    }
}

// -- end of file --
