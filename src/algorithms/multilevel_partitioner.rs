use tracing::debug;

use crate::algorithms::constr_mgr::LegalCheck;
use crate::algorithms::matching::contract_subgraph;
use crate::algorithms::part_mgr::FmPartMgr;
use crate::algorithms::{validate_input, Error};
use crate::hypergraph::Hypergraph;
use crate::Partition;

/// Multilevel Partitioner
///
/// Multilevel Fiduccia-Mattheyses partitioning of a hypergraph. Every level
/// legalizes the assignment it is given, contracts the hypergraph by a
/// minimum maximal matching of its nets, solves the coarse hypergraph
/// recursively, projects the result back and refines it with FM passes.
///
/// # Example
///
/// ```rust
/// use fmpart::algorithms::{LegalCheck, MultiLevelPartitioner};
/// use fmpart::gen_hypergraph::gen_random_hypergraph;
/// use fmpart::Partition;
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
///
///     let hgr = gen_random_hypergraph(200, 150, 5, 3, 7);
///     let mut partition = vec![0; hgr.number_of_modules()];
///
///     let legalcheck = MultiLevelPartitioner {..Default::default()}.partition(&mut partition, &hgr)?;
///
///     assert_eq!(legalcheck, LegalCheck::AllSatisfied);
///     let cut_cost = hgr.cut_cost(&partition);
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone, Copy)]
pub struct MultiLevelPartitioner {
    /// Number of partitions
    pub num_parts: usize,

    /// A numerical factor ranging between 0.0 and 1.0. Every part must weigh at
    /// least `balance_tol * (total weight) / num_parts`, rounded.
    pub balance_tol: f64,

    /// Hypergraphs with fewer modules than this are not contracted any further.
    pub limit_size: usize,

    /// Use the unrolled gain updates for nets with two or three pins.
    pub special_handle_2pin_nets: bool,

    /// Nets with more pins than this are ignored by the gain computation.
    pub max_net_degree: usize,

    /// Cost of the assignment produced by the last run.
    pub totalcost: i32,
}

impl Default for MultiLevelPartitioner {
    fn default() -> Self {
        MultiLevelPartitioner {
            num_parts: 2,
            balance_tol: 0.4,
            limit_size: 7,
            special_handle_2pin_nets: true,
            max_net_degree: 256,
            totalcost: 0,
        }
    }
}

impl MultiLevelPartitioner {
    pub fn set_limit_size(&mut self, limit_size: usize) {
        self.limit_size = limit_size;
    }

    /// Partition `hgr` starting from the assignment in `part`.
    ///
    /// Returns the balance status of the top level. When that status is not
    /// `AllSatisfied` the assignment is left as legalization could make it and
    /// no refinement takes place.
    pub fn run_partition(&mut self, hgr: &Hypergraph, part: &mut [usize]) -> LegalCheck {
        self.run_level(hgr, part, 0)
    }

    fn run_level(&mut self, hgr: &Hypergraph, part: &mut [usize], level: usize) -> LegalCheck {
        let mut part_mgr = FmPartMgr::with_config(
            hgr,
            self.num_parts,
            self.balance_tol,
            self.special_handle_2pin_nets,
            self.max_net_degree,
        );
        let legalcheck = part_mgr.legalize(part);
        if legalcheck != LegalCheck::AllSatisfied {
            debug!(level, ?legalcheck, "could not legalize, skipping refinement");
            self.totalcost = part_mgr.totalcost;
            return legalcheck;
        }

        if hgr.number_of_modules() >= self.limit_size {
            let contraction = contract_subgraph(hgr);
            let coarse = &contraction.hgr;
            if coarse.number_of_modules() < hgr.number_of_modules() {
                debug!(
                    level,
                    modules = hgr.number_of_modules(),
                    coarse_modules = coarse.number_of_modules(),
                    "descending"
                );
                let mut coarse_part = vec![0; coarse.number_of_modules()];
                contraction.projection_up(part, &mut coarse_part);
                let coarse_check = self.run_level(coarse, &mut coarse_part, level + 1);
                if coarse_check == LegalCheck::AllSatisfied {
                    contraction.projection_down(&coarse_part, part);
                }
            }
        }

        part_mgr.optimize(part);
        self.totalcost = part_mgr.totalcost;
        debug!(level, totalcost = self.totalcost, "level refined");
        legalcheck
    }
}

impl<'a> Partition<&'a Hypergraph> for MultiLevelPartitioner {
    type Metadata = LegalCheck;
    type Error = Error;

    fn partition(
        &mut self,
        part_ids: &mut [usize],
        hgr: &'a Hypergraph,
    ) -> Result<Self::Metadata, Self::Error> {
        validate_input(part_ids, hgr.number_of_modules(), self.num_parts)?;
        Ok(self.run_partition(hgr, part_ids))
    }
}
