use rand::rngs::SmallRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use crate::hypergraph::Hypergraph;

/// Three modules `a1, a2, a3` with weights `{3, 4, 2}` on the nets
/// `n1 = {a1, a2}`, `n2 = {a1, a2, a3}` and `n3 = {a1}`.
pub fn create_test_netlist() -> Hypergraph {
    Hypergraph::new(3, &[vec![0, 1], vec![0, 1, 2], vec![0]]).with_module_weights(vec![3, 4, 2])
}

/// Seven modules `a0..a3, p1..p3` on six nets. The pads `p1..p3` (modules 4,
/// 5 and 6) weigh nothing and are fixed.
pub fn create_dwarf() -> Hypergraph {
    let nets = vec![
        vec![4, 0, 1],
        vec![0, 2],
        vec![0, 1, 3],
        vec![2, 3, 5],
        vec![1, 2],
        vec![3, 6],
    ];
    Hypergraph::new(7, &nets)
        .with_module_weights(vec![1, 3, 4, 2, 0, 0, 0])
        .with_fixed_modules([4, 5, 6])
}

/// Generate a hypergraph whose nets have between 2 and `max_net_size` distinct
/// pins. Module and net weights are drawn from `1..=max_weight`.
pub fn gen_random_hypergraph(
    num_modules: usize,
    num_nets: usize,
    max_net_size: usize,
    max_weight: u32,
    seed: u64,
) -> Hypergraph {
    if num_modules < 2 || max_net_size < 2 {
        panic!("Random nets need at least two modules and two pins.");
    }
    if max_weight == 0 {
        panic!("Max weight must be positive.");
    }
    let mut rng = SmallRng::seed_from_u64(seed);
    let max_net_size = max_net_size.min(num_modules);

    let nets: Vec<Vec<usize>> = (0..num_nets)
        .map(|_| {
            let size = rng.gen_range(2..=max_net_size);
            sample(&mut rng, num_modules, size).into_vec()
        })
        .collect();
    let module_weights = (0..num_modules)
        .map(|_| rng.gen_range(1..=max_weight))
        .collect();
    let net_weights = (0..num_nets).map(|_| rng.gen_range(1..=max_weight)).collect();

    Hypergraph::new(num_modules, &nets)
        .with_module_weights(module_weights)
        .with_net_weights(net_weights)
}

/// Generate an assignment of `num_modules` modules to parts `0..num_parts`.
pub fn gen_random_partition(num_modules: usize, num_parts: usize, seed: u64) -> Vec<usize> {
    let mut rng = SmallRng::seed_from_u64(seed);
    (0..num_modules).map(|_| rng.gen_range(0..num_parts)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_gen_random_hypergraph() {
        // Arrange and Act
        let hgr = gen_random_hypergraph(30, 20, 5, 3, 7);

        // Assert
        assert_eq!(hgr.number_of_modules(), 30);
        assert_eq!(hgr.number_of_nets(), 20);
        for net in hgr.nets() {
            assert!((2..=5).contains(&hgr.degree(net)));
            assert!((1..=3).contains(&hgr.get_net_weight(net)));
        }
    }

    #[test]
    fn test_gen_random_partition_is_seeded() {
        // Arrange and Act
        let first = gen_random_partition(50, 3, 11);
        let second = gen_random_partition(50, 3, 11);

        // Assert
        assert_eq!(first, second);
        assert!(first.iter().all(|&part| part < 3));
    }

    #[test]
    fn test_create_dwarf() {
        // Arrange and Act
        let hgr = create_dwarf();

        // Assert
        assert_eq!(hgr.number_of_nodes(), 13);
        assert_eq!(hgr.total_module_weight(), 10);
        assert!(hgr.module_fixed.contains(&5));
    }
}
