//! Closed option enumerations the auto-tuner picks from.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Possible choices for the particle container.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ContainerOpt {
    DirectSum,
    LinkedCells,
    VerletLists,
    VerletClusterLists,
}

impl ContainerOpt {
    pub fn all() -> &'static [ContainerOpt] {
        &[
            ContainerOpt::DirectSum,
            ContainerOpt::LinkedCells,
            ContainerOpt::VerletLists,
            ContainerOpt::VerletClusterLists,
        ]
    }
}

impl fmt::Display for ContainerOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ContainerOpt::DirectSum => "directSum",
            ContainerOpt::LinkedCells => "linkedCells",
            ContainerOpt::VerletLists => "verletLists",
            ContainerOpt::VerletClusterLists => "verletClusterLists",
        };
        f.write_str(name)
    }
}

/// Possible choices for the cell pair traversal.
///
/// The `*Verlet` variants need a cell-based Verlet container that this build
/// does not provide and `C01Cuda` needs a device; the applicability filter
/// rejects them at tuner initialization.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TraversalOpt {
    C08,
    Sliced,
    C18,
    C01,
    DirectSum,
    SlicedVerlet,
    C18Verlet,
    C01Verlet,
    Verlet,
    C01Cuda,
}

impl TraversalOpt {
    pub fn all() -> &'static [TraversalOpt] {
        &[
            TraversalOpt::C08,
            TraversalOpt::Sliced,
            TraversalOpt::C18,
            TraversalOpt::C01,
            TraversalOpt::DirectSum,
            TraversalOpt::SlicedVerlet,
            TraversalOpt::C18Verlet,
            TraversalOpt::C01Verlet,
            TraversalOpt::Verlet,
            TraversalOpt::C01Cuda,
        ]
    }
}

impl fmt::Display for TraversalOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TraversalOpt::C08 => "c08",
            TraversalOpt::Sliced => "sliced",
            TraversalOpt::C18 => "c18",
            TraversalOpt::C01 => "c01",
            TraversalOpt::DirectSum => "directSum",
            TraversalOpt::SlicedVerlet => "slicedVerlet",
            TraversalOpt::C18Verlet => "c18Verlet",
            TraversalOpt::C01Verlet => "c01Verlet",
            TraversalOpt::Verlet => "verlet",
            TraversalOpt::C01Cuda => "c01Cuda",
        };
        f.write_str(name)
    }
}

/// Possible choices for the particle data layout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum DataLayoutOpt {
    Aos,
    Soa,
    Cuda,
}

impl DataLayoutOpt {
    pub fn all() -> &'static [DataLayoutOpt] {
        &[DataLayoutOpt::Aos, DataLayoutOpt::Soa, DataLayoutOpt::Cuda]
    }
}

impl fmt::Display for DataLayoutOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DataLayoutOpt::Aos => "aos",
            DataLayoutOpt::Soa => "soa",
            DataLayoutOpt::Cuda => "cuda",
        };
        f.write_str(name)
    }
}

/// Whether a traversal exploits Newton's third law.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Newton3Opt {
    Enabled,
    Disabled,
}

impl Newton3Opt {
    pub fn all() -> &'static [Newton3Opt] {
        &[Newton3Opt::Enabled, Newton3Opt::Disabled]
    }

    pub fn enabled(self) -> bool {
        self == Newton3Opt::Enabled
    }
}

impl fmt::Display for Newton3Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Newton3Opt::Enabled => "enabled",
            Newton3Opt::Disabled => "disabled",
        };
        f.write_str(name)
    }
}

/// Possible choices for the tuning strategy.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TuningStrategyOpt {
    FullSearch,
    RandomSearch,
    BayesianSearch,
}

impl fmt::Display for TuningStrategyOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TuningStrategyOpt::FullSearch => "fullSearch",
            TuningStrategyOpt::RandomSearch => "randomSearch",
            TuningStrategyOpt::BayesianSearch => "bayesianSearch",
        };
        f.write_str(name)
    }
}

/// Acquisition functions for the Bayesian search.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AcquisitionOpt {
    UpperConfidenceBound,
    LowerConfidenceBound,
    Mean,
    /// Maximizes posterior variance. Pure exploration; experimental.
    Variance,
    ProbabilityOfDecrease,
    ExpectedDecrease,
}

impl fmt::Display for AcquisitionOpt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            AcquisitionOpt::UpperConfidenceBound => "upper-confidence-bound",
            AcquisitionOpt::LowerConfidenceBound => "lower-confidence-bound",
            AcquisitionOpt::Mean => "mean",
            AcquisitionOpt::Variance => "variance",
            AcquisitionOpt::ProbabilityOfDecrease => "probability-of-decrease",
            AcquisitionOpt::ExpectedDecrease => "expected-decrease",
        };
        f.write_str(name)
    }
}


// -- end of file --
