//! O(N²) traversal for the direct-sum container: all intra-domain pairs,
//! then all domain-halo pairs.

use super::CellFunctor;
use crate::cells::FullCell;
use crate::functors::Functor;
use crate::options::DataLayoutOpt;

pub fn traverse<F: Functor>(
    owned: &mut FullCell,
    halo: &mut FullCell,
    functor: &F,
    layout: DataLayoutOpt,
    newton3: bool,
) {
    let cf = CellFunctor::new(functor, layout, newton3, true);
    cf.process_cell(owned);
    cf.process_pair(owned, halo);
}


// -- end of file --
