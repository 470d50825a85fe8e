use std::cmp::Reverse;

use super::bpqueue::BPQueue;
use super::gain_calc::{GainCalc, NetArity};
use super::robin::Robin;
use super::Move;
use crate::hypergraph::Hypergraph;

/// Keeps the candidate moves of a pass ordered by gain.
pub trait GainTracker {
    /// Rebuild every gain from `part` and return the cost of `part`.
    fn init(&mut self, part: &[usize]) -> i32;

    /// No candidate move is left towards any part.
    fn is_empty(&self) -> bool;

    fn is_empty_togo(&self, to_part: usize) -> bool;

    /// Take the move with the largest gain out of the candidates.
    fn select(&mut self, part: &[usize]) -> (Move, i32);

    /// Take the best module to move into `to_part`.
    fn select_togo(&mut self, to_part: usize) -> (usize, i32);

    /// Propagate the gain changes caused by `mv`. `part` is the assignment
    /// before the move is applied.
    fn update_move(&mut self, part: &[usize], mv: &Move);

    /// Withdraw the move of `v` into `which_part`.
    fn lock(&mut self, which_part: usize, v: usize);

    /// Withdraw every move of `v`.
    fn lock_all(&mut self, from_part: usize, v: usize);
}

/// Gain buckets for any number of parts, one `BPQueue` per target part.
#[derive(Debug, Clone)]
pub struct GainMgr<'a> {
    hgr: &'a Hypergraph,
    num_parts: usize,
    robin: Robin,
    gain_calc: GainCalc<'a>,
    gain_bucket: Vec<BPQueue>,
}

impl<'a> GainMgr<'a> {
    pub fn new(
        hgr: &'a Hypergraph,
        num_parts: usize,
        special_handle_2pin_nets: bool,
        max_net_degree: usize,
    ) -> Self {
        assert!(num_parts >= 2, "expected at least two parts");
        let gain_calc = GainCalc::new(hgr, num_parts, special_handle_2pin_nets, max_net_degree);

        // A gain never exceeds the total weight of the tracked nets of a module.
        let pmax = hgr
            .modules()
            .map(|v| {
                hgr.neighbors(v)
                    .iter()
                    .filter(|&&net| gain_calc.net_arity(net).is_some())
                    .map(|&net| hgr.get_net_weight(net) as i32)
                    .sum::<i32>()
            })
            .max()
            .unwrap_or(0);

        let num_modules = hgr.number_of_modules();
        Self {
            hgr,
            num_parts,
            robin: Robin::new(num_parts),
            gain_calc,
            gain_bucket: (0..num_parts)
                .map(|_| BPQueue::new(num_modules, -pmax, pmax))
                .collect(),
        }
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }
}

impl GainTracker for GainMgr<'_> {
    fn init(&mut self, part: &[usize]) -> i32 {
        let total_cost = self.gain_calc.init(part);
        for bucket in &mut self.gain_bucket {
            bucket.clear();
        }
        for v in self.hgr.modules() {
            for target in self.robin.exclude(part[v]) {
                let gain = self.gain_calc.gain(target, v);
                self.gain_bucket[target].append(v, gain);
            }
        }
        // fixed and zero-weight modules never move
        let hgr = self.hgr;
        let frozen = hgr
            .modules()
            .filter(|&v| hgr.module_fixed.contains(&v) || hgr.get_module_weight(v) == 0);
        for v in frozen {
            for bucket in &mut self.gain_bucket {
                bucket.lock(v);
            }
        }
        total_cost
    }

    fn is_empty(&self) -> bool {
        self.gain_bucket.iter().all(BPQueue::is_empty)
    }

    fn is_empty_togo(&self, to_part: usize) -> bool {
        self.gain_bucket[to_part].is_empty()
    }

    fn select(&mut self, part: &[usize]) -> (Move, i32) {
        let to_part = (0..self.num_parts)
            .filter(|&k| !self.gain_bucket[k].is_empty())
            .min_by_key(|&k| (Reverse(self.gain_bucket[k].get_max()), k))
            .unwrap_or_else(|| panic!("select on empty gain buckets"));
        let gain = self.gain_bucket[to_part].get_max();
        let vertex = self.gain_bucket[to_part].popleft();
        self.gain_bucket[to_part].hold(vertex);
        let mv = Move {
            vertex,
            from_part: part[vertex],
            to_part,
        };
        (mv, gain)
    }

    fn select_togo(&mut self, to_part: usize) -> (usize, i32) {
        let bucket = &mut self.gain_bucket[to_part];
        let gain = bucket.get_max();
        let vertex = bucket.popleft();
        bucket.hold(vertex);
        (vertex, gain)
    }

    fn update_move(&mut self, part: &[usize], mv: &Move) {
        let hgr = self.hgr;
        for &net in hgr.neighbors(mv.vertex) {
            match self.gain_calc.net_arity(net) {
                None => {}
                Some(NetArity::TwoPin) => {
                    let (w, delta) = self.gain_calc.update_move_2pin_net(part, net, mv);
                    for target in self.robin.exclude(part[w]) {
                        self.gain_bucket[target].modify_key(w, delta[target]);
                    }
                }
                Some(arity) => {
                    self.gain_calc.init_idx_vec(mv.vertex, net);
                    let (pins, deltas) = match arity {
                        NetArity::ThreePin => self.gain_calc.update_move_3pin_net(part, net, mv),
                        _ => self.gain_calc.update_move_general_net(part, net, mv),
                    };
                    for (&w, delta) in pins.iter().zip(deltas) {
                        for target in self.robin.exclude(part[w]) {
                            self.gain_bucket[target].modify_key(w, delta[target]);
                        }
                    }
                }
            }
        }
    }

    fn lock(&mut self, which_part: usize, v: usize) {
        self.gain_bucket[which_part].lock(v);
    }

    fn lock_all(&mut self, from_part: usize, v: usize) {
        // The record towards the current part is never listed, lock it as well
        // so no later update can revive it.
        self.gain_bucket[from_part].lock(v);
        for target in self.robin.exclude(from_part) {
            self.gain_bucket[target].lock(v);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::algorithms::dllist::Custody;
    use crate::gen_hypergraph::{create_dwarf, create_test_netlist, gen_random_hypergraph, gen_random_partition};

    // Every unlocked record sits in exactly one bucket: the one of a part the
    // module is not in.
    fn check_bucket_exclusivity(mgr: &GainMgr, part: &[usize]) {
        for v in mgr.hgr.modules() {
            for (k, bucket) in mgr.gain_bucket.iter().enumerate() {
                match bucket.custody(v) {
                    Custody::Locked => {}
                    Custody::Free => assert_eq!(k, part[v], "module {v} has no record towards {k}"),
                    Custody::Listed(_) => assert_ne!(k, part[v], "module {v} listed towards its own part"),
                }
            }
        }
    }

    #[test]
    fn test_init_lists_every_move() {
        // Arrange
        let hgr = create_test_netlist();
        let part = [0, 1, 0];
        let mut mgr = GainMgr::new(&hgr, 2, true, 256);

        // Act
        let cost = mgr.init(&part);

        // Assert
        assert_eq!(cost, 2);
        assert!(!mgr.is_empty());
        assert!(!mgr.is_empty_togo(0));
        assert!(!mgr.is_empty_togo(1));
        check_bucket_exclusivity(&mgr, &part);
    }

    #[test]
    fn test_select_takes_best_move() {
        // Arrange
        let hgr = create_test_netlist();
        let part = [0, 1, 0];
        let mut mgr = GainMgr::new(&hgr, 2, true, 256);
        mgr.init(&part);

        // Act
        let (mv, gain) = mgr.select(&part);

        // Assert
        assert_eq!(mv, Move { vertex: 1, from_part: 1, to_part: 0 });
        assert_eq!(gain, 2);
    }

    #[test]
    fn test_select_ties_go_to_lowest_part() {
        // Arrange
        let hgr = Hypergraph::new(3, &[vec![0, 1], vec![0, 2]]);
        let part = [0, 1, 2];
        let mut mgr = GainMgr::new(&hgr, 3, true, 256);
        mgr.init(&part);

        // Act
        let (mv, gain) = mgr.select(&part);

        // Assert
        assert_eq!(gain, 1);
        assert_eq!(mv.to_part, 0);
    }

    #[test]
    fn test_fixed_modules_are_never_selected() {
        // Arrange
        let hgr = create_dwarf();
        let part = [0, 0, 0, 1, 1, 1, 1];
        let mut mgr = GainMgr::new(&hgr, 2, true, 256);
        mgr.init(&part);

        // Act
        let mut selected = Vec::new();
        while !mgr.is_empty() {
            let (mv, _) = mgr.select(&part);
            mgr.lock_all(mv.from_part, mv.vertex);
            selected.push(mv.vertex);
        }

        // Assert
        selected.sort_unstable();
        assert_eq!(selected, [0, 1, 2, 3]);
    }

    #[test]
    fn test_zero_weight_modules_are_locked_at_init() {
        // Arrange
        let hgr = Hypergraph::new(3, &[vec![0, 1], vec![1, 2]]).with_module_weights(vec![2, 0, 3]);
        let part = [0, 1, 0];
        let mut mgr = GainMgr::new(&hgr, 2, true, 256);

        // Act
        mgr.init(&part);

        // Assert
        for bucket in &mgr.gain_bucket {
            assert!(bucket.is_locked(1));
        }
        assert!(!mgr.gain_bucket[1].is_locked(0));
        check_bucket_exclusivity(&mgr, &part);
    }

    #[test]
    fn test_update_keeps_buckets_in_sync_with_gains() {
        // Arrange
        let hgr = gen_random_hypergraph(30, 40, 5, 3, 11);
        let mut part = gen_random_partition(30, 3, 12);
        let mut mgr = GainMgr::new(&hgr, 3, true, 256);
        mgr.init(&part);

        // Act
        for _ in 0..5 {
            let (mv, _) = mgr.select(&part);
            mgr.lock_all(mv.from_part, mv.vertex);
            mgr.update_move(&part, &mv);
            part[mv.vertex] = mv.to_part;
        }

        // Assert
        let mut fresh = GainCalc::new(&hgr, 3, true, 256);
        fresh.init(&part);
        for v in hgr.modules() {
            for target in (0..3).filter(|&t| t != part[v]) {
                if !mgr.gain_bucket[target].is_locked(v) {
                    assert_eq!(mgr.gain_bucket[target].get_key(v), fresh.gain(target, v));
                }
            }
        }
        check_bucket_exclusivity(&mgr, &part);
    }

    #[test]
    fn test_lock_all_survives_updates() {
        // Arrange
        let hgr = create_test_netlist();
        let mut part = [0, 1, 0];
        let mut mgr = GainMgr::new(&hgr, 2, true, 256);
        mgr.init(&part);
        let (mv, _) = mgr.select(&part);

        // Act
        mgr.lock_all(mv.from_part, mv.vertex);
        mgr.update_move(&part, &mv);
        part[mv.vertex] = mv.to_part;

        // Assert
        for bucket in &mgr.gain_bucket {
            assert!(bucket.is_locked(mv.vertex));
        }
        check_bucket_exclusivity(&mgr, &part);
    }
}
