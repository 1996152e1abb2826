//! Random-subset tuning strategy: measure a bounded number of uniformly
//! drawn configurations.

use super::{Configuration, TuningStrategy};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::time::Duration;

pub struct RandomSearch {
    space: Vec<Configuration>,
    order: Vec<usize>,
    idx: usize,
    max_evidence: usize,
    evidence: Vec<(Configuration, Duration)>,
    rng: StdRng,
}

impl RandomSearch {
    pub fn new(space: Vec<Configuration>, max_evidence: usize, seed: u64) -> Self {
        assert!(!space.is_empty());
        let mut s = RandomSearch {
            order: (0..space.len()).collect(),
            max_evidence: max_evidence.clamp(1, space.len()),
            space,
            idx: 0,
            evidence: Vec::new(),
            rng: StdRng::seed_from_u64(seed),
        };
        s.order.shuffle(&mut s.rng);
        s
    }
}

impl TuningStrategy for RandomSearch {
    fn reset(&mut self) {
        self.order.shuffle(&mut self.rng);
        self.idx = 0;
        self.evidence.clear();
    }

    fn current(&self) -> Configuration {
        self.space[self.order[self.idx]]
    }

    fn report(&mut self, cfg: Configuration, time: Duration) {
        self.evidence.push((cfg, time));
    }

    fn next(&mut self) -> Option<Configuration> {
        if self.idx + 1 < self.max_evidence {
            self.idx += 1;
            Some(self.current())
        } else {
            None
        }
    }

    fn best_so_far(&self) -> Configuration {
        self.evidence
            .iter()
            .min_by_key(|(_, t)| *t)
            .map(|(c, _)| *c)
            .unwrap_or(self.space[self.order[0]])
    }
}


// -- end of file --
