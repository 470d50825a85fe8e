// Coarsening by minimum maximal matching of nets.
//
// A set of pairwise disjoint nets is chosen with a primal-dual heuristic; every
// chosen net collapses into one coarse module.

use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

use crate::hypergraph::Hypergraph;

/// Result of `min_maximal_matching`.
#[derive(Debug, Clone, Default)]
pub struct Matching {
    /// Node ids of the matched nets. No two of them share a pin.
    pub matchset: FxHashSet<usize>,
    pub primal_cost: i64,
    pub dual_cost: i64,
}

/// Greedily grow a maximal set of pin-disjoint nets of small total weight.
///
/// `weight` is indexed by net position (`net - number_of_modules()`). Nets in
/// `matchset` are kept without being charged; modules in `dep` count as
/// already covered, so no net touching them is matched. The returned dual cost
/// is a lower bound on the weight of any maximal matching and never exceeds
/// the primal cost.
pub fn min_maximal_matching(
    hgr: &Hypergraph,
    weight: &[i64],
    mut matchset: FxHashSet<usize>,
    mut dep: FxHashSet<usize>,
) -> Matching {
    assert_eq!(weight.len(), hgr.number_of_nets());
    let offset = hgr.number_of_modules();
    let mut gap = weight.to_vec();
    let mut stamp = vec![usize::MAX; hgr.number_of_nets()];
    let mut primal_cost = 0;
    let mut dual_cost = 0;

    let covered = |dep: &FxHashSet<usize>, net: usize| {
        hgr.neighbors(net).iter().any(|v| dep.contains(v))
    };

    for net in hgr.nets() {
        if covered(&dep, net) {
            continue;
        }
        if matchset.contains(&net) {
            dep.extend(hgr.neighbors(net));
            continue;
        }

        let mut min_val = gap[net - offset];
        let mut min_net = net;
        for &v in hgr.neighbors(net) {
            for &net2 in hgr.neighbors(v) {
                if covered(&dep, net2) {
                    continue;
                }
                if min_val > gap[net2 - offset] {
                    min_val = gap[net2 - offset];
                    min_net = net2;
                }
            }
        }

        dep.extend(hgr.neighbors(min_net));
        matchset.insert(min_net);
        primal_cost += weight[min_net - offset];
        dual_cost += min_val;

        for &v in hgr.neighbors(net) {
            for &net2 in hgr.neighbors(v) {
                if stamp[net2 - offset] != net {
                    stamp[net2 - offset] = net;
                    gap[net2 - offset] -= min_val;
                }
            }
        }
    }

    Matching {
        matchset,
        primal_cost,
        dual_cost,
    }
}

/// A coarse hypergraph and the maps between its modules and the fine ones.
#[derive(Debug, Clone)]
pub struct Contraction {
    pub hgr: Hypergraph,
    /// Coarse module of every fine module.
    pub module_up_map: Vec<usize>,
    /// A fine module inside every coarse module.
    pub module_down_map: Vec<usize>,
}

impl Contraction {
    /// Carry a fine assignment up: every coarse module takes the part of its
    /// representative.
    pub fn projection_up(&self, fine_part: &[usize], coarse_part: &mut [usize]) {
        debug_assert_eq!(coarse_part.len(), self.module_down_map.len());
        for (coarse, &fine) in coarse_part.iter_mut().zip(&self.module_down_map) {
            *coarse = fine_part[fine];
        }
    }

    /// Carry a coarse assignment down to every fine module.
    pub fn projection_down(&self, coarse_part: &[usize], fine_part: &mut [usize]) {
        debug_assert_eq!(fine_part.len(), self.module_up_map.len());
        for (fine, &coarse) in fine_part.iter_mut().zip(&self.module_up_map) {
            *fine = coarse_part[coarse];
        }
    }
}

/// Collapse the nets of a minimum maximal matching into single modules.
///
/// Fixed modules are never clustered. Unclustered modules come first in the
/// coarse numbering, followed by one module per matched net. Coarse nets left
/// with one pin are dropped and coarse nets with identical pins are merged,
/// adding up their weights.
pub fn contract_subgraph(hgr: &Hypergraph) -> Contraction {
    let num_modules = hgr.number_of_modules();
    let cluster_weight: Vec<i64> = hgr
        .nets()
        .map(|net| {
            hgr.neighbors(net)
                .iter()
                .map(|&v| i64::from(hgr.get_module_weight(v)))
                .sum()
        })
        .collect();
    let matching = min_maximal_matching(
        hgr,
        &cluster_weight,
        FxHashSet::default(),
        hgr.module_fixed.clone(),
    );
    // a matched net with fewer than two pins merges nothing
    let clusters: Vec<usize> = hgr
        .nets()
        .filter(|&net| matching.matchset.contains(&net) && hgr.degree(net) >= 2)
        .collect();

    let mut clustered = vec![false; num_modules];
    for &net in &clusters {
        for &v in hgr.neighbors(net) {
            clustered[v] = true;
        }
    }

    let mut module_up_map = vec![0; num_modules];
    let mut module_down_map = Vec::with_capacity(num_modules);
    for v in hgr.modules().filter(|&v| !clustered[v]) {
        module_up_map[v] = module_down_map.len();
        module_down_map.push(v);
    }
    for &net in &clusters {
        let pins = hgr.neighbors(net);
        for &v in pins {
            module_up_map[v] = module_down_map.len();
        }
        module_down_map.push(pins[0]);
    }

    let num_coarse = module_down_map.len();
    let mut module_weights = vec![0u32; num_coarse];
    for v in hgr.modules() {
        module_weights[module_up_map[v]] += hgr.get_module_weight(v);
    }

    let mut net_index: FxHashMap<Vec<usize>, usize> = FxHashMap::default();
    let mut nets: Vec<Vec<usize>> = Vec::new();
    let mut net_weights: Vec<u32> = Vec::new();
    for net in hgr.nets() {
        let mut pins: Vec<usize> = hgr
            .neighbors(net)
            .iter()
            .map(|&v| module_up_map[v])
            .collect();
        pins.sort_unstable();
        pins.dedup();
        if pins.len() < 2 {
            continue;
        }
        let weight = hgr.get_net_weight(net);
        match net_index.get(&pins) {
            Some(&index) => net_weights[index] += weight,
            None => {
                net_index.insert(pins.clone(), nets.len());
                nets.push(pins);
                net_weights.push(weight);
            }
        }
    }

    trace!(
        fine_modules = num_modules,
        coarse_modules = num_coarse,
        coarse_nets = nets.len(),
        "contracted"
    );

    let fixed: Vec<usize> = hgr.module_fixed.iter().map(|&v| module_up_map[v]).collect();
    let coarse = Hypergraph::new(num_coarse, &nets)
        .with_module_weights(module_weights)
        .with_net_weights(net_weights)
        .with_fixed_modules(fixed);

    Contraction {
        hgr: coarse,
        module_up_map,
        module_down_map,
    }
}
