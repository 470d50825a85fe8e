// This file has code from https://github.com/LIHPC-Computational-Geometry/coupe
pub mod hypergraph;
pub mod gen_hypergraph;
pub mod imbalance;
pub mod io;
pub mod algorithms;

// The `Partition` trait allows for partitioning data.
// Partitioning algorithms implement this trait.
// The generic argument `M` defines the input of the algorithms (here a
// hypergraph).
// The input partition must be of the correct size. The partitioners of this
// crate read it as the starting assignment and refine it in place.
pub trait Partition<M> {
    // Diagnostic data returned for a specific run of the algorithm.
    type Metadata;

    // Error details, should the algorithm fail to run.
    type Error;

    // Partition the given data and output the part ID of each element in
    // `part_ids`.
    //
    // Part IDs are contiguous and start from zero. A part that no element is
    // assigned to is empty.
    fn partition(&mut self, part_ids: &mut [usize], data: M)
                 -> Result<Self::Metadata, Self::Error>;
}
