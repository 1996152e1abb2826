//! Conversion between the AoS and SoA sides of the cells around a
//! traversal. Each cell converts independently, so the sweep is parallel.

use crate::cells::FullCell;
use crate::functors::Functor;
use crate::options::DataLayoutOpt;
use rayon::prelude::*;

/// Loads the layout a traversal requires. A no-op for AoS-native
/// traversals. The full attribute set is loaded, a superset of whatever
/// the functor declares as needed.
pub fn load<F: Functor>(cells: &mut [FullCell], _functor: &F, layout: DataLayoutOpt) {
    if layout == DataLayoutOpt::Soa {
        cells.par_iter_mut().for_each(|cell| cell.to_soa());
    }
}

/// Stores results back after a traversal, writing only the columns the
/// functor computed.
pub fn store<F: Functor>(cells: &mut [FullCell], functor: &F, layout: DataLayoutOpt) {
    if layout == DataLayoutOpt::Soa {
        let computed = functor.computed_attrs();
        cells
            .par_iter_mut()
            .for_each(|cell| cell.write_back(computed));
    }
}


// -- end of file --
