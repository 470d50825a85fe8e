// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe
use num_traits::ToPrimitive;

use crate::hypergraph::Hypergraph;

/// Total module weight of each part of an assignment. Modules assigned to a
/// part outside `0..num_parts` are not counted.
pub fn compute_parts_load(
    partition: &[usize],
    num_parts: usize,
    weights: impl IntoIterator<Item = u64>,
) -> Vec<u64> {
    let mut loads = vec![0; num_parts];
    for (&part, weight) in partition.iter().zip(weights) {
        if let Some(load) = loads.get_mut(part) {
            *load += weight;
        }
    }
    loads
}

/// Largest relative excess of a part over the average part load.
pub fn compute_imbalance_from_part_loads(part_loads: &[u64]) -> f64 {
    let total_weight: u64 = part_loads.iter().sum();
    let ideal_part_weight =
        total_weight.to_f64().unwrap_or(0.0) / part_loads.len().to_f64().unwrap_or(1.0);
    if ideal_part_weight == 0.0 {
        return 0.0;
    }

    part_loads
        .iter()
        .map(|&load| (load.to_f64().unwrap_or(0.0) - ideal_part_weight) / ideal_part_weight)
        .fold(0.0f64, f64::max)
}

/// Imbalance of an assignment of the modules of `hgr`.
pub fn imbalance(num_parts: usize, partition: &[usize], hgr: &Hypergraph) -> f64 {
    if num_parts == 0 {
        return 0.0;
    }
    let weights = hgr.modules().map(|v| u64::from(hgr.get_module_weight(v)));
    let part_loads = compute_parts_load(partition, num_parts, weights);
    compute_imbalance_from_part_loads(&part_loads)
}

#[cfg(test)]
mod tests {
    use approx::assert_ulps_eq;
    use itertools::assert_equal;

    use crate::gen_hypergraph::create_test_netlist;
    use crate::imbalance::{compute_imbalance_from_part_loads, compute_parts_load, imbalance};

    #[test]
    fn test_compute_parts_load() {
        // Arrange
        let partition = [0, 0, 1, 1, 5];
        let weights = [4, 7, 5, 2, 9];

        // Act
        let loads = compute_parts_load(&partition, 2, weights);

        // Assert
        assert_equal(loads, [11, 7]);
    }

    #[test]
    fn test_imbalance_of_test_netlist() {
        // Arrange
        let hgr = create_test_netlist();
        let partition = [0, 1, 0];

        // Act
        let imb = imbalance(2, &partition, &hgr);

        // Assert
        assert_ulps_eq!(imb, 1.0 / 9.0);
    }

    #[test]
    fn test_imbalance_of_empty_loads() {
        assert_ulps_eq!(compute_imbalance_from_part_loads(&[0, 0, 0]), 0.0);
    }
}
