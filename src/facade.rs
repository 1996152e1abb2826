//! The user-visible entry points: configuration, particle management and
//! the pairwise iteration that drives everything else.

use crate::error::{CoreError, Result};
use crate::functors::Functor;
use crate::iter::{IterBehavior, ParticleIter, ParticleIterMut};
use crate::containers::Domain;
use crate::options::{
    AcquisitionOpt, ContainerOpt, DataLayoutOpt, Newton3Opt, TraversalOpt, TuningStrategyOpt,
};
use crate::particle::Particle;
use crate::real::Real;
use crate::tuning::{
    enumerate_space, AutoTuner, BayesianSearch, ContainerSelector, FullSearch, RandomSearch,
    TuningStrategy,
};
use crate::logic::LogicHandler;
use serde::{Deserialize, Serialize};

/// Everything the engine needs to know at initialization. All option sets
/// are closed enumerations; narrowing them shrinks the tuning space.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct TunaConfig {
    pub box_min: [Real; 3],
    pub box_max: [Real; 3],
    pub cutoff: Real,
    pub verlet_skin: Real,
    /// Pairwise traversals between neighbor-list rebuilds.
    pub rebuild_frequency: usize,
    /// Stable iterations before the tuner reevaluates its selection.
    pub tuning_interval: usize,
    /// Timing samples per candidate configuration.
    pub num_samples: usize,
    pub allowed_containers: Vec<ContainerOpt>,
    pub allowed_traversals: Vec<TraversalOpt>,
    pub allowed_data_layouts: Vec<DataLayoutOpt>,
    pub allowed_newton3: Vec<Newton3Opt>,
    pub cell_size_factors: Vec<Real>,
    pub cluster_size: usize,
    pub tuning_strategy: TuningStrategyOpt,
    pub acquisition: AcquisitionOpt,
    /// Candidates the random and Bayesian strategies may measure per
    /// tuning phase.
    pub max_evidence: usize,
    pub tuning_seed: u64,
}

impl Default for TunaConfig {
    fn default() -> Self {
        TunaConfig {
            box_min: [0.0; 3],
            box_max: [10.0; 3],
            cutoff: 1.0,
            verlet_skin: 0.2,
            rebuild_frequency: 20,
            tuning_interval: 100,
            num_samples: 3,
            allowed_containers: ContainerOpt::all().to_vec(),
            allowed_traversals: TraversalOpt::all().to_vec(),
            allowed_data_layouts: DataLayoutOpt::all().to_vec(),
            allowed_newton3: Newton3Opt::all().to_vec(),
            cell_size_factors: vec![1.0],
            cluster_size: 32,
            tuning_strategy: TuningStrategyOpt::FullSearch,
            acquisition: AcquisitionOpt::UpperConfidenceBound,
            max_evidence: 10,
            tuning_seed: 0,
        }
    }
}

/// Auto-tuning particle container. The main point of interaction: add
/// particles, call [`Tuna::iterate_pairwise`] once per timestep, and move
/// leavers between domains with [`Tuna::update_container`].
pub struct Tuna {
    logic: LogicHandler,
    config: TunaConfig,
    iterated: bool,
}

impl Tuna {
    pub fn new(config: TunaConfig) -> Result<Self> {
        let logic = Self::build_logic(&config)?;
        Ok(Tuna {
            logic,
            config,
            iterated: false,
        })
    }

    fn build_logic(config: &TunaConfig) -> Result<LogicHandler> {
        if config
            .cell_size_factors
            .iter()
            .any(|&f| !(f >= 1.0) || !f.is_finite())
        {
            // the colored stencils assume a cell side of at least one
            // cutoff, so factors below one are not enumerable here
            return Err(CoreError::InvalidConfiguration);
        }
        let space = enumerate_space(
            &config.allowed_containers,
            &config.allowed_traversals,
            &config.allowed_data_layouts,
            &config.allowed_newton3,
            &config.cell_size_factors,
        );
        if space.is_empty() {
            return Err(CoreError::InvalidConfiguration);
        }

        let strategy: Box<dyn TuningStrategy> = match config.tuning_strategy {
            TuningStrategyOpt::FullSearch => Box::new(FullSearch::new(space.clone())),
            TuningStrategyOpt::RandomSearch => Box::new(RandomSearch::new(
                space.clone(),
                config.max_evidence,
                config.tuning_seed,
            )),
            TuningStrategyOpt::BayesianSearch => Box::new(BayesianSearch::new(
                space.clone(),
                config.acquisition,
                config.max_evidence,
                config.tuning_seed,
            )),
        };

        let domain = Domain {
            box_min: config.box_min,
            box_max: config.box_max,
            cutoff: config.cutoff,
            skin: config.verlet_skin,
        };
        let first = strategy.current();
        let selector = ContainerSelector::new(
            domain,
            config.cluster_size,
            first.container,
            first.cell_size_factor,
        );
        let tuner = AutoTuner::new(selector, strategy, config.num_samples, config.tuning_interval);
        LogicHandler::new(tuner, config.rebuild_frequency)
    }

    /// Rebuilds the tuning machinery around changed allowed sets, carrying
    /// all particles over.
    fn reconfigure(&mut self) -> Result<()> {
        let particles: Vec<Particle> = self
            .logic
            .iter(IterBehavior::HaloAndOwned)
            .cloned()
            .collect();
        let mut logic = Self::build_logic(&self.config)?;
        for p in particles {
            if p.owned {
                logic.add_particle(p)?;
            } else {
                logic.add_halo_particle(p)?;
            }
        }
        self.logic = logic;
        Ok(())
    }

    fn setter_window(&self) -> Result<()> {
        if self.iterated {
            Err(CoreError::SetterAfterInit)
        } else {
            Ok(())
        }
    }

    pub fn set_allowed_containers(&mut self, v: Vec<ContainerOpt>) -> Result<()> {
        self.setter_window()?;
        self.config.allowed_containers = v;
        self.reconfigure()
    }

    pub fn set_allowed_traversals(&mut self, v: Vec<TraversalOpt>) -> Result<()> {
        self.setter_window()?;
        self.config.allowed_traversals = v;
        self.reconfigure()
    }

    pub fn set_allowed_data_layouts(&mut self, v: Vec<DataLayoutOpt>) -> Result<()> {
        self.setter_window()?;
        self.config.allowed_data_layouts = v;
        self.reconfigure()
    }

    pub fn set_allowed_newton3(&mut self, v: Vec<Newton3Opt>) -> Result<()> {
        self.setter_window()?;
        self.config.allowed_newton3 = v;
        self.reconfigure()
    }

    pub fn set_tuning_strategy(&mut self, strategy: TuningStrategyOpt) -> Result<()> {
        self.setter_window()?;
        self.config.tuning_strategy = strategy;
        self.reconfigure()
    }

    pub fn set_tuning_interval(&mut self, interval: usize) -> Result<()> {
        self.setter_window()?;
        self.config.tuning_interval = interval;
        self.reconfigure()
    }

    /// Adds an owned particle. Requires `pos ∈ [box_min, box_max)` and
    /// invalid neighbor lists.
    pub fn add_particle(&mut self, p: Particle) -> Result<()> {
        self.logic.add_particle(p)
    }

    /// Adds a halo copy owned by a neighboring domain.
    pub fn add_halo_particle(&mut self, p: Particle) -> Result<()> {
        self.logic.add_halo_particle(p)
    }

    /// Adds the halo copy, or refreshes it in place while neighbor lists
    /// are valid.
    pub fn add_or_update_halo_particle(&mut self, p: Particle) -> Result<()> {
        self.logic.add_or_update_halo_particle(p)
    }

    /// Re-bins drifted particles and returns the ones that left the box.
    /// Invalidates neighbor lists.
    pub fn update_container(&mut self) -> Vec<Particle> {
        self.logic.update_container()
    }

    pub fn delete_halo_particles(&mut self) {
        self.logic.delete_halo_particles();
    }

    pub fn delete_all_particles(&mut self) {
        self.logic.delete_all_particles();
    }

    /// Marks neighbor lists stale so particles may be added or removed.
    pub fn invalidate_lists(&mut self) {
        self.logic.invalidate_lists();
    }

    /// One pairwise interaction sweep under the configuration the tuner
    /// currently favors.
    pub fn iterate_pairwise<F: Functor>(&mut self, functor: &F) -> Result<()> {
        self.iterated = true;
        self.logic.iterate_pairwise(functor)
    }

    pub fn iter(&self, behavior: IterBehavior) -> ParticleIter<'_> {
        self.logic.iter(behavior)
    }

    /// Mutable particle access between traversals, e.g. for the time
    /// integrator. Positions may drift up to `skin/2` before the lists go
    /// stale.
    pub fn iter_mut(&mut self, behavior: IterBehavior) -> ParticleIterMut<'_> {
        self.logic.iter_mut(behavior)
    }

    pub fn region_iter(&self, lo: [Real; 3], hi: [Real; 3], behavior: IterBehavior) -> ParticleIter<'_> {
        self.logic.region_iter(lo, hi, behavior)
    }

    pub fn num_particles(&self) -> usize {
        self.logic.num_particles()
    }

    /// The configuration currently selected by the tuner.
    pub fn current_configuration(&self) -> crate::tuning::Configuration {
        self.logic.tuner().current_config()
    }

    /// True while the tuner is measuring candidates.
    pub fn is_tuning(&self) -> bool {
        self.logic.tuner().state() == crate::tuning::tuner::TunerState::Tuning
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::functors::LennardJones;

    fn config() -> TunaConfig {
        TunaConfig {
            box_min: [0.0; 3],
            box_max: [4.0; 3],
            cutoff: 1.0,
            verlet_skin: 0.2,
            num_samples: 1,
            allowed_containers: vec![ContainerOpt::LinkedCells],
            allowed_traversals: vec![TraversalOpt::C08],
            allowed_data_layouts: vec![DataLayoutOpt::Aos],
            allowed_newton3: vec![Newton3Opt::Enabled],
            ..Default::default()
        }
    }

    #[test]
    fn empty_search_space_is_rejected() {
        let mut cfg = config();
        cfg.allowed_traversals = vec![TraversalOpt::Verlet];
        assert!(matches!(
            Tuna::new(cfg),
            Err(CoreError::InvalidConfiguration)
        ));
    }

    #[test]
    fn sub_unit_cell_size_factors_are_rejected() {
        let mut cfg = config();
        cfg.cell_size_factors = vec![0.5];
        assert!(matches!(
            Tuna::new(cfg),
            Err(CoreError::InvalidConfiguration)
        ));
    }

    #[test]
    fn setters_close_after_first_iteration() {
        let mut tuna = Tuna::new(config()).unwrap();
        tuna.add_particle(Particle::new(0, [1.0; 3], [0.0; 3])).unwrap();
        tuna.add_particle(Particle::new(1, [1.5, 1.0, 1.0], [0.0; 3])).unwrap();
        tuna.set_allowed_traversals(vec![TraversalOpt::C08, TraversalOpt::Sliced])
            .unwrap();
        assert_eq!(tuna.num_particles(), 2);

        let lj = LennardJones::new(1.0, 1.0, 1.0);
        tuna.iterate_pairwise(&lj).unwrap();
        assert!(matches!(
            tuna.set_allowed_traversals(vec![TraversalOpt::C08]),
            Err(CoreError::SetterAfterInit)
        ));
    }

    #[test]
    fn forces_accumulate_across_containers() {
        for container in ContainerOpt::all() {
            let mut cfg = config();
            cfg.allowed_containers = vec![*container];
            cfg.allowed_traversals = TraversalOpt::all().to_vec();
            let mut tuna = Tuna::new(cfg).unwrap();
            tuna.add_particle(Particle::new(0, [1.0, 1.0, 1.0], [0.0; 3]))
                .unwrap();
            tuna.add_particle(Particle::new(1, [1.8, 1.0, 1.0], [0.0; 3]))
                .unwrap();
            let lj = LennardJones::new(1.0, 1.0, 1.0);
            tuna.iterate_pairwise(&lj).unwrap();
            let total: Real = tuna
                .iter(IterBehavior::OwnedOnly)
                .map(|p| p.force[0].abs())
                .sum();
            assert!(total > 0.0, "no forces under {}", container);
        }
    }
}

// -- end of file --
