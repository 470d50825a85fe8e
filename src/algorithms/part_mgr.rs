// Fiduccia-Mattheyses refinement driver.
//
// # Reference
//
// Fiduccia, C. M., and Mattheyses, R. M. "A linear-time heuristic for
// improving network partitions." 19th Design Automation Conference (1982):
// 175-181.

use tracing::{debug, trace};

use super::constr_mgr::{BalanceConstraint, ConstrMgr, LegalCheck};
use super::gain_mgr::{GainMgr, GainTracker};
use super::Move;
use crate::hypergraph::Hypergraph;

/// Legalizes an assignment, then improves it pass after pass.
///
/// `totalcost` always holds the cost of the assignment last handed to or
/// produced by the manager.
#[derive(Debug, Clone)]
pub struct PartMgr<G, C> {
    gain_mgr: G,
    validator: C,
    snapshot: Vec<usize>,
    pub totalcost: i32,
}

/// The manager over the bucket-based gain tracker and the lower-bound
/// balance constraint.
pub type FmPartMgr<'a> = PartMgr<GainMgr<'a>, ConstrMgr<'a>>;

impl<'a> FmPartMgr<'a> {
    pub fn with_config(
        hgr: &'a Hypergraph,
        num_parts: usize,
        balance_tol: f64,
        special_handle_2pin_nets: bool,
        max_net_degree: usize,
    ) -> Self {
        let gain_mgr = GainMgr::new(hgr, num_parts, special_handle_2pin_nets, max_net_degree);
        let validator = ConstrMgr::new(hgr, balance_tol, num_parts);
        PartMgr::new(gain_mgr, validator)
    }
}

impl<G, C> PartMgr<G, C>
where
    G: GainTracker,
    C: BalanceConstraint,
{
    pub fn new(gain_mgr: G, validator: C) -> Self {
        Self {
            gain_mgr,
            validator,
            snapshot: Vec::new(),
            totalcost: 0,
        }
    }

    /// Rebuild both managers from `part` and return its cost.
    pub fn init(&mut self, part: &[usize]) -> i32 {
        self.totalcost = self.gain_mgr.init(part);
        self.validator.init(part);
        self.totalcost
    }

    /// Move modules into the parts that lack weight until every part reaches
    /// the lower bound, or no candidate is left.
    pub fn legalize(&mut self, part: &mut [usize]) -> LegalCheck {
        self.totalcost = self.gain_mgr.init(part);
        let mut legalcheck = self.validator.init(part);
        if legalcheck == LegalCheck::AllSatisfied {
            return legalcheck;
        }

        while legalcheck != LegalCheck::AllSatisfied {
            let to_part = self.validator.select_togo();
            if self.gain_mgr.is_empty_togo(to_part) {
                debug!(to_part, "no module left to move, giving up on balance");
                break;
            }
            let (vertex, gainmax) = self.gain_mgr.select_togo(to_part);
            let mv = Move {
                vertex,
                from_part: part[vertex],
                to_part,
            };
            legalcheck = self.validator.check_legal(&mv);
            if legalcheck == LegalCheck::NotSatisfied {
                continue;
            }
            self.gain_mgr.lock_all(mv.from_part, vertex);
            self.gain_mgr.update_move(part, &mv);
            self.validator.update_move(&mv);
            part[vertex] = to_part;
            self.totalcost -= gainmax;
        }
        debug!(?legalcheck, totalcost = self.totalcost, "legalized");
        legalcheck
    }

    /// Run passes until one ends without lowering the cost.
    pub fn optimize(&mut self, part: &mut [usize]) {
        let mut pass = 0;
        loop {
            self.init(part);
            let totalcost_before = self.totalcost;
            self.optimize_1pass(part);
            assert!(self.totalcost <= totalcost_before, "a pass increased the cost");
            trace!(pass, totalcost_before, totalcost = self.totalcost, "pass done");
            pass += 1;
            if self.totalcost == totalcost_before {
                break;
            }
        }
        debug!(passes = pass, totalcost = self.totalcost, "optimized");
    }

    // One FM pass: move every unlocked module once, then fall back to the
    // best prefix of the move sequence.
    fn optimize_1pass(&mut self, part: &mut [usize]) {
        let mut totalgain = 0;
        let mut besttotalgain = 0;
        let mut deferred_snapshot = false;

        while !self.gain_mgr.is_empty() {
            let (mv, gainmax) = self.gain_mgr.select(part);
            if !self.validator.check_constraints(&mv) {
                continue;
            }
            if gainmax < 0 {
                // the running gain turns down here
                if !deferred_snapshot || totalgain > besttotalgain {
                    self.snapshot.clear();
                    self.snapshot.extend_from_slice(part);
                    besttotalgain = totalgain;
                }
                deferred_snapshot = true;
            } else if totalgain + gainmax >= besttotalgain {
                besttotalgain = totalgain + gainmax;
                deferred_snapshot = false;
            }

            self.gain_mgr.lock_all(mv.from_part, mv.vertex);
            self.gain_mgr.update_move(part, &mv);
            self.validator.update_move(&mv);
            part[mv.vertex] = mv.to_part;
            totalgain += gainmax;
            self.totalcost -= gainmax;
        }

        if deferred_snapshot {
            part.copy_from_slice(&self.snapshot);
            self.totalcost += totalgain - besttotalgain;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::gen_hypergraph::{create_dwarf, create_test_netlist, gen_random_hypergraph, gen_random_partition};

    #[test]
    fn test_test_netlist_reaches_local_minimum() {
        // Arrange
        let hgr = create_test_netlist();
        let mut part = vec![0, 1, 0];
        let mut part_mgr = FmPartMgr::with_config(&hgr, 2, 0.4, true, 256);

        // Act
        let legalcheck = part_mgr.legalize(&mut part);
        part_mgr.optimize(&mut part);

        // Assert
        assert_eq!(legalcheck, LegalCheck::AllSatisfied);
        assert_eq!(part_mgr.totalcost, 1);
        assert_eq!(part_mgr.totalcost, hgr.cut_cost(&part));
        let mut constr = ConstrMgr::new(&hgr, 0.4, 2);
        assert_eq!(constr.init(&part), LegalCheck::AllSatisfied);
    }

    #[test]
    fn test_legalize_fills_empty_part() {
        // Arrange
        let hgr = create_test_netlist();
        let mut part = vec![0, 0, 0];
        let mut part_mgr = FmPartMgr::with_config(&hgr, 2, 0.4, true, 256);

        // Act
        let legalcheck = part_mgr.legalize(&mut part);

        // Assert
        assert_eq!(legalcheck, LegalCheck::AllSatisfied);
        assert!(part.contains(&1));
        assert_eq!(part_mgr.totalcost, hgr.cut_cost(&part));
    }

    #[test]
    fn test_legalize_gives_up_when_nothing_can_move() {
        // Arrange
        let hgr = Hypergraph::new(2, &[vec![0, 1]])
            .with_module_weights(vec![5, 5])
            .with_fixed_modules([0, 1]);
        let mut part = vec![0, 0];
        let mut part_mgr = FmPartMgr::with_config(&hgr, 2, 0.4, true, 256);

        // Act
        let legalcheck = part_mgr.legalize(&mut part);

        // Assert
        assert_eq!(legalcheck, LegalCheck::NotSatisfied);
        assert_eq!(part, [0, 0]);
    }

    #[test]
    fn test_dwarf_keeps_fixed_modules() {
        // Arrange
        let hgr = create_dwarf();
        let mut part = vec![0, 0, 0, 0, 0, 1, 1];
        let mut part_mgr = FmPartMgr::with_config(&hgr, 2, 0.45, true, 256);

        // Act
        let legalcheck = part_mgr.legalize(&mut part);
        let legalized_cost = part_mgr.totalcost;
        part_mgr.optimize(&mut part);

        // Assert
        assert_eq!(legalcheck, LegalCheck::AllSatisfied);
        assert_eq!(&part[4..], [0, 1, 1]);
        assert!(part_mgr.totalcost <= legalized_cost);
        assert_eq!(part_mgr.totalcost, hgr.cut_cost(&part));
    }

    #[test]
    fn test_zero_weight_module_keeps_its_part() {
        // Arrange
        let hgr = Hypergraph::new(4, &[vec![0, 1], vec![2, 3]]).with_module_weights(vec![2, 0, 2, 2]);
        let mut part = vec![0, 1, 1, 0];
        let mut part_mgr = FmPartMgr::with_config(&hgr, 2, 0.4, true, 256);

        // Act
        part_mgr.legalize(&mut part);
        part_mgr.optimize(&mut part);

        // Assert
        assert_eq!(part[1], 1);
        assert_eq!(part_mgr.totalcost, hgr.cut_cost(&part));
    }

    #[test]
    fn test_init_is_idempotent() {
        // Arrange
        let hgr = gen_random_hypergraph(40, 50, 6, 3, 21);
        let part = gen_random_partition(40, 3, 22);
        let mut part_mgr = FmPartMgr::with_config(&hgr, 3, 0.4, true, 256);

        // Act
        let first = part_mgr.init(&part);
        let second = part_mgr.init(&part);

        // Assert
        assert_eq!(first, second);
        assert_eq!(first, hgr.cut_cost(&part));
    }

    #[test]
    fn test_optimize_never_increases_cost() {
        for (num_parts, seed) in [(2, 1), (2, 2), (3, 3), (4, 4)] {
            // Arrange
            let hgr = gen_random_hypergraph(60, 80, 6, 4, seed);
            let mut part = gen_random_partition(60, num_parts, seed + 100);
            let mut part_mgr = FmPartMgr::with_config(&hgr, num_parts, 0.4, seed % 2 == 0, 256);
            part_mgr.legalize(&mut part);
            let before = part_mgr.totalcost;

            // Act
            part_mgr.optimize(&mut part);

            // Assert
            assert!(part_mgr.totalcost <= before, "{num_parts} parts, seed {seed}");
            assert_eq!(part_mgr.totalcost, hgr.cut_cost(&part), "{num_parts} parts, seed {seed}");
        }
    }
}
