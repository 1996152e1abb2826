//! The auto-tuner: a two-state machine that samples wall-clock timings of
//! candidate configurations and settles on the fastest.

use super::{Configuration, ContainerSelector, TuningStrategy};
use crate::containers::Container;
use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::options::Newton3Opt;
use crate::traversals::TraversalSpec;
use std::time::{Duration, Instant};
use tracing::debug;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TunerState {
    Tuning,
    Stable,
}

pub struct AutoTuner {
    selector: ContainerSelector,
    strategy: Box<dyn TuningStrategy>,
    num_samples: usize,
    tuning_interval: usize,
    samples: Vec<Duration>,
    iterations_since_tune: usize,
    state: TunerState,
    current: Configuration,
}

impl AutoTuner {
    pub fn new(
        selector: ContainerSelector,
        strategy: Box<dyn TuningStrategy>,
        num_samples: usize,
        tuning_interval: usize,
    ) -> Self {
        let current = strategy.current();
        AutoTuner {
            selector,
            strategy,
            num_samples: num_samples.max(1),
            tuning_interval: tuning_interval.max(1),
            samples: Vec::new(),
            iterations_since_tune: 0,
            state: TunerState::Tuning,
            current,
        }
    }

    pub fn state(&self) -> TunerState {
        self.state
    }

    pub fn current_config(&self) -> Configuration {
        self.current
    }

    pub fn container(&mut self) -> &mut Container {
        self.selector.container()
    }

    pub fn container_ref(&self) -> &Container {
        self.selector.container_ref()
    }

    /// True when the next `iterate_pairwise` will change the configuration
    /// and therefore rebuild container state.
    pub fn will_rebuild(&self) -> bool {
        match self.state {
            TunerState::Tuning => self.samples.len() + 1 >= self.num_samples,
            TunerState::Stable => self.iterations_since_tune + 1 >= self.tuning_interval,
        }
    }

    fn compatible<F: Functor>(cfg: &Configuration, functor: &F) -> bool {
        match cfg.newton3 {
            Newton3Opt::Enabled => functor.allows_newton3(),
            Newton3Opt::Disabled => functor.allows_non_newton3(),
        }
    }

    /// Runs one pairwise iteration under the currently selected
    /// configuration, collecting a timing sample while tuning.
    pub fn iterate_pairwise<F: Functor>(&mut self, functor: &F, force_rebuild: bool) -> Result<()> {
        if self.state == TunerState::Stable && self.iterations_since_tune >= self.tuning_interval {
            debug!("tuning interval elapsed, restarting search");
            self.strategy.reset();
            self.samples.clear();
            self.state = TunerState::Tuning;
            self.current = self.strategy.current();
        }

        // skip candidates the functor cannot run; the space is finite, so
        // the strategy eventually converges even if everything is skipped
        if self.state == TunerState::Tuning {
            while !Self::compatible(&self.current, functor) {
                self.strategy.report(self.current, Duration::MAX);
                match self.strategy.next() {
                    Some(c) => self.current = c,
                    None => {
                        self.enter_stable();
                        break;
                    }
                }
            }
        }
        if !Self::compatible(&self.current, functor) {
            return Err(CoreError::InvalidConfiguration);
        }

        let cfg = self.current;
        self.selector.select(cfg.container, cfg.cell_size_factor);
        let container = self.selector.container();
        if force_rebuild {
            container.invalidate_lists();
        }

        let spec = TraversalSpec {
            traversal: cfg.traversal,
            layout: cfg.data_layout,
            newton3: cfg.newton3.enabled(),
        };
        let start = Instant::now();
        container.iterate_pairwise(functor, spec)?;
        let elapsed = start.elapsed();

        match self.state {
            TunerState::Tuning => {
                self.samples.push(elapsed);
                if self.samples.len() >= self.num_samples {
                    let med = median(&mut self.samples);
                    self.strategy.report(cfg, med);
                    debug!(config = %cfg, time_us = med.as_micros() as u64, "sampled configuration");
                    self.samples.clear();
                    match self.strategy.next() {
                        Some(c) => self.current = c,
                        None => self.enter_stable(),
                    }
                }
            }
            TunerState::Stable => {
                self.iterations_since_tune += 1;
            }
        }
        Ok(())
    }

    fn enter_stable(&mut self) {
        self.current = self.strategy.best_so_far();
        self.state = TunerState::Stable;
        self.iterations_since_tune = 0;
        self.samples.clear();
        debug!(config = %self.current, "tuning converged");
    }
}

fn median(samples: &mut [Duration]) -> Duration {
    samples.sort();
    samples[samples.len() / 2]
}


// -- end of file --
