use super::Move;
use crate::hypergraph::Hypergraph;

/// Balance status of an assignment, ordered from worst to best.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LegalCheck {
    NotSatisfied,
    GetBetter,
    AllSatisfied,
}

/// Decides which moves keep (or bring) an assignment within balance.
pub trait BalanceConstraint {
    /// Recompute the part weights of `part` and report its status.
    fn init(&mut self, part: &[usize]) -> LegalCheck;

    /// Status after `mv`, used while legalizing. A move that is not rejected
    /// clears the illegal flags of both parts it touches.
    fn check_legal(&mut self, mv: &Move) -> LegalCheck;

    /// Whether `mv` keeps its source part at or above the lower bound.
    fn check_constraints(&self, mv: &Move) -> bool;

    fn update_move(&mut self, mv: &Move);

    /// The part that most needs weight.
    fn select_togo(&self) -> usize;
}

/// Lower-bound balance over any number of parts.
///
/// Every part must carry at least `round(total_weight * balance_tol / K)`.
#[derive(Debug, Clone)]
pub struct ConstrMgr<'a> {
    hgr: &'a Hypergraph,
    diff: Vec<i64>,
    lowerbound: i64,
    illegal: Vec<bool>,
}

impl<'a> ConstrMgr<'a> {
    pub fn new(hgr: &'a Hypergraph, balance_tol: f64, num_parts: usize) -> Self {
        assert!(num_parts >= 2, "expected at least two parts");
        let total_weight = hgr.total_module_weight() as f64;
        let lowerbound = (total_weight * balance_tol / num_parts as f64).round() as i64;
        Self {
            hgr,
            diff: vec![0; num_parts],
            lowerbound,
            illegal: vec![true; num_parts],
        }
    }

    pub fn lowerbound(&self) -> i64 {
        self.lowerbound
    }

    /// Current weight of every part.
    pub fn diff(&self) -> &[i64] {
        &self.diff
    }

    fn weight(&self, v: usize) -> i64 {
        i64::from(self.hgr.get_module_weight(v))
    }
}

impl BalanceConstraint for ConstrMgr<'_> {
    fn init(&mut self, part: &[usize]) -> LegalCheck {
        self.diff.fill(0);
        for v in self.hgr.modules() {
            self.diff[part[v]] += self.weight(v);
        }
        for (illegal, &diff) in self.illegal.iter_mut().zip(&self.diff) {
            *illegal = diff < self.lowerbound;
        }
        if self.illegal.contains(&true) {
            LegalCheck::NotSatisfied
        } else {
            LegalCheck::AllSatisfied
        }
    }

    fn check_legal(&mut self, mv: &Move) -> LegalCheck {
        let weight = self.weight(mv.vertex);
        if self.diff[mv.from_part] - weight < self.lowerbound {
            return LegalCheck::NotSatisfied;
        }
        if self.diff[mv.to_part] + weight < self.lowerbound {
            return LegalCheck::GetBetter;
        }
        self.illegal[mv.from_part] = false;
        self.illegal[mv.to_part] = false;
        if self.illegal.contains(&true) {
            LegalCheck::GetBetter
        } else {
            LegalCheck::AllSatisfied
        }
    }

    fn check_constraints(&self, mv: &Move) -> bool {
        self.diff[mv.from_part] - self.weight(mv.vertex) >= self.lowerbound
    }

    fn update_move(&mut self, mv: &Move) {
        let weight = self.weight(mv.vertex);
        self.diff[mv.to_part] += weight;
        self.diff[mv.from_part] -= weight;
    }

    fn select_togo(&self) -> usize {
        // min_by_key keeps the first minimum
        (0..self.diff.len())
            .min_by_key(|&k| self.diff[k])
            .unwrap_or(0)
    }
}
