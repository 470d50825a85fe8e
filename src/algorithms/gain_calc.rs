// Gain computation for FM moves over any number of parts.
//
// The cost of a net is its weight times the number of parts it reaches beyond
// the first. Moving pin `x` out of part `p` into part `t` changes that cost by
//
//     weight * ([pins in p == 1] - [pins in t == 0])
//
// so only parts holding zero or exactly one pin of a net ever matter. The
// incremental updates below re-derive this per net from the pin counts before
// and after a move, with unrolled versions for 2-pin and 3-pin nets.

use super::robin::Robin;
use super::Move;
use crate::hypergraph::Hypergraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum NetArity {
    TwoPin,
    ThreePin,
    General,
}

#[derive(Debug, Clone)]
pub(crate) struct GainCalc<'a> {
    hgr: &'a Hypergraph,
    num_parts: usize,
    robin: Robin,
    special_handle_2pin_nets: bool,
    max_net_degree: usize,
    total_cost: i32,
    /// Gain of every module towards every part, indexed `[target][module]`.
    gains: Vec<Vec<i32>>,
    idx_vec: Vec<usize>,
    delta_gain_w: Vec<i32>,
    delta_gain: Vec<Vec<i32>>,
    num: Vec<usize>,
}

impl<'a> GainCalc<'a> {
    pub(crate) fn new(
        hgr: &'a Hypergraph,
        num_parts: usize,
        special_handle_2pin_nets: bool,
        max_net_degree: usize,
    ) -> Self {
        Self {
            hgr,
            num_parts,
            robin: Robin::new(num_parts),
            special_handle_2pin_nets,
            max_net_degree,
            total_cost: 0,
            gains: vec![vec![0; hgr.number_of_modules()]; num_parts],
            idx_vec: Vec::new(),
            delta_gain_w: vec![0; num_parts],
            delta_gain: Vec::new(),
            num: vec![0; num_parts],
        }
    }

    /// How a net is handled, or `None` when it cannot change the cost.
    pub(crate) fn net_arity(&self, net: usize) -> Option<NetArity> {
        let degree = self.hgr.degree(net);
        if degree < 2 || degree > self.max_net_degree {
            return None;
        }
        Some(match degree {
            2 if self.special_handle_2pin_nets => NetArity::TwoPin,
            3 if self.special_handle_2pin_nets => NetArity::ThreePin,
            _ => NetArity::General,
        })
    }

    pub(crate) fn gain(&self, target: usize, v: usize) -> i32 {
        self.gains[target][v]
    }

    /// Recompute every gain and the total cost from scratch.
    pub(crate) fn init(&mut self, part: &[usize]) -> i32 {
        self.total_cost = 0;
        for row in &mut self.gains {
            row.fill(0);
        }
        for net in self.hgr.nets() {
            match self.net_arity(net) {
                None => {}
                Some(NetArity::TwoPin) => self.init_gain_2pin_net(net, part),
                Some(NetArity::ThreePin) => self.init_gain_3pin_net(net, part),
                Some(NetArity::General) => self.init_gain_general_net(net, part),
            }
        }
        self.total_cost
    }

    fn modify_gain(&mut self, v: usize, part_v: usize, delta: i32) {
        for target in self.robin.exclude(part_v) {
            self.gains[target][v] += delta;
        }
    }

    fn init_gain_2pin_net(&mut self, net: usize, part: &[usize]) {
        let hgr = self.hgr;
        let (w, v) = match hgr.neighbors(net) {
            &[w, v] => (w, v),
            pins => unreachable!("2-pin net with {} pins", pins.len()),
        };
        let weight = hgr.get_net_weight(net) as i32;
        if part[w] != part[v] {
            self.total_cost += weight;
            self.gains[part[v]][w] += weight;
            self.gains[part[w]][v] += weight;
        } else {
            self.modify_gain(w, part[w], -weight);
            self.modify_gain(v, part[v], -weight);
        }
    }

    fn init_gain_3pin_net(&mut self, net: usize, part: &[usize]) {
        let hgr = self.hgr;
        let (w, v, u) = match hgr.neighbors(net) {
            &[w, v, u] => (w, v, u),
            pins => unreachable!("3-pin net with {} pins", pins.len()),
        };
        let weight = hgr.get_net_weight(net) as i32;

        let (lone, pair) = if part[u] == part[v] {
            if part[w] == part[v] {
                for x in [w, v, u] {
                    self.modify_gain(x, part[x], -weight);
                }
                return;
            }
            (w, [u, v])
        } else if part[w] == part[v] {
            (u, [w, v])
        } else if part[w] == part[u] {
            (v, [w, u])
        } else {
            // three distinct parts
            self.total_cost += 2 * weight;
            for x in [w, v, u] {
                for y in [w, v, u] {
                    if x != y {
                        self.gains[part[y]][x] += weight;
                    }
                }
            }
            return;
        };

        self.total_cost += weight;
        let (part_pair, part_lone) = (part[pair[0]], part[lone]);
        self.gains[part_pair][lone] += weight;
        for x in pair {
            self.modify_gain(x, part_pair, -weight);
            self.gains[part_lone][x] += weight;
        }
    }

    fn init_gain_general_net(&mut self, net: usize, part: &[usize]) {
        let hgr = self.hgr;
        let pins = hgr.neighbors(net);
        let weight = hgr.get_net_weight(net) as i32;

        self.num.fill(0);
        for &w in pins {
            self.num[part[w]] += 1;
        }
        let reached = self.num.iter().filter(|&&count| count > 0).count() as i32;
        self.total_cost += (reached - 1) * weight;

        for k in 0..self.num_parts {
            match self.num[k] {
                0 => {
                    for &w in pins {
                        self.gains[k][w] -= weight;
                    }
                }
                1 => {
                    if let Some(&w) = pins.iter().find(|&&w| part[w] == k) {
                        self.modify_gain(w, k, weight);
                    }
                }
                _ => {}
            }
        }
    }

    /// Collect the pins of `net` other than `v`.
    pub(crate) fn init_idx_vec(&mut self, v: usize, net: usize) {
        self.idx_vec.clear();
        self.idx_vec
            .extend(self.hgr.neighbors(net).iter().copied().filter(|&w| w != v));
    }

    fn reset_delta_gain(&mut self, rows: usize) {
        while self.delta_gain.len() < rows {
            self.delta_gain.push(vec![0; self.num_parts]);
        }
        for row in &mut self.delta_gain[..rows] {
            row.fill(0);
        }
    }

    /// Gain changes of the other pin of a 2-pin net, per target part.
    /// `part` is the assignment before the move.
    pub(crate) fn update_move_2pin_net(
        &mut self,
        part: &[usize],
        net: usize,
        mv: &Move,
    ) -> (usize, &[i32]) {
        let hgr = self.hgr;
        let w = match hgr.neighbors(net) {
            &[a, b] => {
                if a == mv.vertex {
                    b
                } else {
                    a
                }
            }
            pins => unreachable!("2-pin net with {} pins", pins.len()),
        };
        let weight = hgr.get_net_weight(net) as i32;
        let (from, to) = (mv.from_part, mv.to_part);

        let delta = &mut self.delta_gain_w;
        if part[w] == from {
            delta.fill(weight);
            delta[to] += weight;
        } else if part[w] == to {
            delta.fill(-weight);
            delta[from] -= weight;
        } else {
            delta.fill(0);
            delta[from] = -weight;
            delta[to] = weight;
        }
        (w, &self.delta_gain_w)
    }

    /// Gain changes of the two pins in `idx_vec` for a 3-pin net, returned
    /// alongside those pins.
    pub(crate) fn update_move_3pin_net(
        &mut self,
        part: &[usize],
        net: usize,
        mv: &Move,
    ) -> (&[usize], &[Vec<i32>]) {
        debug_assert_eq!(self.idx_vec.len(), 2);
        let weight = self.hgr.get_net_weight(net) as i32;
        let (from, to) = (mv.from_part, mv.to_part);
        let (a, b) = (self.idx_vec[0], self.idx_vec[1]);
        self.reset_delta_gain(2);

        for (row, (x, y)) in self.delta_gain.iter_mut().zip([(a, b), (b, a)]) {
            let (part_x, part_y) = (part[x], part[y]);
            if part_x == from {
                if part_y != from {
                    row.fill(weight);
                }
                if part_y != to {
                    row[to] += weight;
                }
            } else if part_x == to {
                if part_y != to {
                    row.fill(-weight);
                }
                if part_y != from {
                    row[from] -= weight;
                }
            } else {
                if part_y != from {
                    row[from] -= weight;
                }
                if part_y != to {
                    row[to] += weight;
                }
            }
        }
        (&self.idx_vec, &self.delta_gain[..2])
    }

    /// Gain changes of the pins in `idx_vec` for a net of any degree.
    pub(crate) fn update_move_general_net(
        &mut self,
        part: &[usize],
        net: usize,
        mv: &Move,
    ) -> (&[usize], &[Vec<i32>]) {
        let rows = self.idx_vec.len();
        self.reset_delta_gain(rows);
        self.num.fill(0);
        for &w in &self.idx_vec {
            self.num[part[w]] += 1;
        }

        let mut weight = self.hgr.get_net_weight(net) as i32;
        for l in [mv.from_part, mv.to_part] {
            match self.num[l] {
                0 => {
                    for row in &mut self.delta_gain[..rows] {
                        row[l] -= weight;
                    }
                }
                1 => {
                    if let Some(idx) = self.idx_vec.iter().position(|&w| part[w] == l) {
                        for delta in &mut self.delta_gain[idx] {
                            *delta += weight;
                        }
                    }
                }
                _ => {}
            }
            weight = -weight;
        }
        (&self.idx_vec, &self.delta_gain[..rows])
    }
}
