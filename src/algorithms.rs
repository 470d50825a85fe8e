use thiserror::Error;

mod bpqueue;
mod constr_mgr;
mod dllist;
mod fm_refiner;
mod gain_calc;
mod gain_mgr;
mod matching;
mod multilevel_partitioner;
mod part_mgr;
mod robin;

pub use constr_mgr::{BalanceConstraint, ConstrMgr, LegalCheck};
pub use fm_refiner::FmRefiner;
pub use gain_mgr::{GainMgr, GainTracker};
pub use matching::{contract_subgraph, min_maximal_matching, Contraction, Matching};
pub use multilevel_partitioner::MultiLevelPartitioner;
pub use part_mgr::{FmPartMgr, PartMgr};

/// Common errors thrown by algorithms.
#[derive(Clone, Copy, Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Input sets don't have matching lengths.
    #[error("input sets don't have the same length (expected {expected} items, got {actual})")]
    InputLenMismatch { expected: usize, actual: usize },

    /// The initial assignment names a part that does not exist.
    #[error("part {part} is out of range for {num_parts} parts")]
    PartOutOfRange { part: usize, num_parts: usize },

    /// Partitioning needs at least two parts.
    #[error("expected at least two parts, got {0}")]
    TooFewParts(usize),
}

/// Moving one module from the part it is in to another part.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub vertex: usize,
    pub from_part: usize,
    pub to_part: usize,
}

/// Check an initial assignment against the hypergraph and the part count.
pub(crate) fn validate_input(
    part_ids: &[usize],
    num_modules: usize,
    num_parts: usize,
) -> Result<(), Error> {
    if num_parts < 2 {
        return Err(Error::TooFewParts(num_parts));
    }
    if part_ids.len() != num_modules {
        return Err(Error::InputLenMismatch {
            expected: num_modules,
            actual: part_ids.len(),
        });
    }
    if let Some(&part) = part_ids.iter().find(|&&part| part >= num_parts) {
        return Err(Error::PartOutOfRange { part, num_parts });
    }
    Ok(())
}
