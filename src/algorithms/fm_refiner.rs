// Single-level Fiduccia-Mattheyses refinement of an existing assignment.

use crate::algorithms::constr_mgr::LegalCheck;
use crate::algorithms::part_mgr::FmPartMgr;
use crate::algorithms::{validate_input, Error};
use crate::hypergraph::Hypergraph;

fn fm_refiner(
    partition: &mut [usize],
    hgr: &Hypergraph,
    num_parts: usize,
    balance_tol: f64,
    special_handle_2pin_nets: bool,
    max_net_degree: usize,
) -> LegalCheck {
    let mut part_mgr = FmPartMgr::with_config(
        hgr,
        num_parts,
        balance_tol,
        special_handle_2pin_nets,
        max_net_degree,
    );
    let legalcheck = part_mgr.legalize(partition);
    if legalcheck == LegalCheck::AllSatisfied {
        part_mgr.optimize(partition);
    }
    legalcheck
}

/// FM refiner
///
/// Legalizes the given assignment and, once it is balanced, improves it with
/// FM passes on the hypergraph as is, without any coarsening.
#[derive(Debug, Clone, Copy)]
pub struct FmRefiner {
    /// Number of partitions
    pub num_parts: usize,

    /// Every part must weigh at least `balance_tol * (total weight) / num_parts`,
    /// rounded.
    pub balance_tol: f64,

    pub special_handle_2pin_nets: bool,

    /// Nets with more pins than this are ignored.
    pub max_net_degree: usize,
}

impl Default for FmRefiner {
    fn default() -> Self {
        FmRefiner {
            num_parts: 2,
            balance_tol: 0.4,
            special_handle_2pin_nets: true,
            max_net_degree: 256,
        }
    }
}

impl<'a> crate::Partition<&'a Hypergraph> for FmRefiner {
    type Metadata = LegalCheck;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        hgr: &'a Hypergraph,
    ) -> Result<Self::Metadata, Self::Error> {
        validate_input(part_ids, hgr.number_of_modules(), self.num_parts)?;
        let metadata = fm_refiner(
            part_ids,
            hgr,
            self.num_parts,
            self.balance_tol,
            self.special_handle_2pin_nets,
            self.max_net_degree,
        );
        Ok(metadata)
    }
}
