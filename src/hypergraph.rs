use std::ops::Range;

use rayon::iter::{IntoParallelIterator, ParallelIterator as _};
use rustc_hash::FxHashSet;
use sprs::{CsMat, TriMat};

/// A netlist stored as a bipartite graph of modules and nets.
///
/// Modules occupy the node ids `0..number_of_modules()` and nets occupy
/// `number_of_modules()..number_of_nodes()`. The neighbors of a net are its
/// pins and the neighbors of a module are the nets it belongs to.
#[derive(Debug, Clone)]
pub struct Hypergraph {
    /// Symmetric node adjacency in CSR format (from sprs).
    pub graph_csr: CsMat<u8>,
    num_modules: usize,
    num_nets: usize,
    module_weight: Option<Vec<u32>>,
    net_weight: Option<Vec<u32>>,
    /// Modules that must never change part.
    pub module_fixed: FxHashSet<usize>,
}

impl Hypergraph {
    /// Build a hypergraph from the pin list of every net.
    ///
    /// Repeated pins inside one net are collapsed.
    pub fn new(num_modules: usize, nets: &[Vec<usize>]) -> Self {
        let num_nets = nets.len();
        let num_nodes = num_modules + num_nets;
        let num_pins: usize = nets.iter().map(Vec::len).sum();
        let mut triplets = TriMat::with_capacity((num_nodes, num_nodes), 2 * num_pins);

        for (index, pins) in nets.iter().enumerate() {
            let net = num_modules + index;
            let mut pins = pins.clone();
            pins.sort_unstable();
            pins.dedup();
            for v in pins {
                assert!(v < num_modules, "pin {v} is not a module");
                triplets.add_triplet(v, net, 1u8);
                triplets.add_triplet(net, v, 1u8);
            }
        }

        Self {
            graph_csr: triplets.to_csr(),
            num_modules,
            num_nets,
            module_weight: None,
            net_weight: None,
            module_fixed: FxHashSet::default(),
        }
    }

    pub fn with_module_weights(mut self, weights: Vec<u32>) -> Self {
        assert_eq!(weights.len(), self.num_modules);
        self.module_weight = Some(weights);
        self
    }

    pub fn with_net_weights(mut self, weights: Vec<u32>) -> Self {
        assert_eq!(weights.len(), self.num_nets);
        self.net_weight = Some(weights);
        self
    }

    pub fn with_fixed_modules(mut self, fixed: impl IntoIterator<Item = usize>) -> Self {
        self.module_fixed.extend(fixed);
        self
    }

    pub fn number_of_modules(&self) -> usize {
        self.num_modules
    }

    pub fn number_of_nets(&self) -> usize {
        self.num_nets
    }

    pub fn number_of_nodes(&self) -> usize {
        self.num_modules + self.num_nets
    }

    /// Node ids of all modules, in order.
    pub fn modules(&self) -> Range<usize> {
        0..self.num_modules
    }

    /// Node ids of all nets, in order.
    pub fn nets(&self) -> Range<usize> {
        self.num_modules..self.number_of_nodes()
    }

    pub fn is_net(&self, node: usize) -> bool {
        node >= self.num_modules
    }

    /// The neighbors of a node, sorted by id.
    pub fn neighbors(&self, node: usize) -> &[usize] {
        let range = self.graph_csr.indptr().outer_inds_sz(node);
        &self.graph_csr.indices()[range]
    }

    pub fn degree(&self, node: usize) -> usize {
        self.graph_csr.indptr().outer_inds_sz(node).len()
    }

    /// Largest number of nets on one module.
    pub fn max_degree(&self) -> usize {
        self.modules().map(|v| self.degree(v)).max().unwrap_or(0)
    }

    /// Largest number of pins on one net.
    pub fn max_net_degree(&self) -> usize {
        self.nets().map(|net| self.degree(net)).max().unwrap_or(0)
    }

    pub fn get_module_weight(&self, v: usize) -> u32 {
        self.module_weight.as_ref().map_or(1, |weights| weights[v])
    }

    /// Weight of a net, addressed by its node id.
    pub fn get_net_weight(&self, net: usize) -> u32 {
        debug_assert!(self.is_net(net));
        self.net_weight
            .as_ref()
            .map_or(1, |weights| weights[net - self.num_modules])
    }

    pub fn total_module_weight(&self) -> u64 {
        self.modules().map(|v| u64::from(self.get_module_weight(v))).sum()
    }

    /// The connectivity cost of a partition.
    ///
    /// Every net contributes its weight once for each part it reaches beyond
    /// the first. For a bipartition this is the weight of the cut nets.
    ///
    /// # Example
    ///
    /// ```text,ignore
    ///   part 0 | part 1
    ///   a0 ----n0---- a1      n0 reaches 2 parts: cost 1
    ///   a0 --n1-- a2          n1 stays in part 0: cost 0
    /// ```
    pub fn cut_cost(&self, partition: &[usize]) -> i32 {
        debug_assert_eq!(self.num_modules, partition.len());

        self.nets()
            .into_par_iter()
            .map(|net| {
                let mut parts: Vec<usize> =
                    self.neighbors(net).iter().map(|&v| partition[v]).collect();
                parts.sort_unstable();
                parts.dedup();
                match parts.len() {
                    0 => 0,
                    lambda => (lambda as i32 - 1) * self.get_net_weight(net) as i32,
                }
            })
            .sum()
    }
}
