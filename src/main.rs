use std::path::PathBuf;
use std::time::Instant;

use clap::Parser;
use fmpart::algorithms::{Error, LegalCheck, MultiLevelPartitioner};
use fmpart::gen_hypergraph::gen_random_partition;
use fmpart::imbalance::imbalance;
use fmpart::io::{read_netd_as_hypergraph, write_partition_data_to_file};
use fmpart::Partition;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// Path of the netD (.net) file
    netd_filepath: PathBuf,

    /// Number of Partitions
    num_parts: usize,

    /// Balance tolerance: every part keeps at least this fraction of the
    /// average part weight
    balance_tol: f64,

    /// Filename where the partition mapping can be stored
    partition_file: PathBuf,

    /// Path of the area (.are) file with the module weights
    #[arg(short, long)]
    are_filepath: Option<PathBuf>,

    /// Hypergraphs with fewer modules are not contracted further
    #[arg(short, long, default_value_t = 7)]
    limit_size: usize,

    /// Nets with more pins are ignored by the gain computation
    #[arg(short, long, default_value_t = 256)]
    max_net_degree: usize,

    /// Route 2-pin and 3-pin nets through the general gain update
    #[arg(long)]
    no_special_nets: bool,

    /// Seed of the random initial assignment
    #[arg(short, long, default_value_t = 5)]
    seed: u64,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let args = Args::parse();
    let hgr = read_netd_as_hypergraph(&args.netd_filepath, args.are_filepath.as_deref())?;
    info!(
        modules = hgr.number_of_modules(),
        nets = hgr.number_of_nets(),
        "netlist loaded"
    );

    if args.num_parts < 2 {
        return Err(Error::TooFewParts(args.num_parts).into());
    }
    let mut partition = gen_random_partition(hgr.number_of_modules(), args.num_parts, args.seed);
    let start = Instant::now();
    let mut partitioner = MultiLevelPartitioner {
        num_parts: args.num_parts,
        balance_tol: args.balance_tol,
        limit_size: args.limit_size,
        special_handle_2pin_nets: !args.no_special_nets,
        max_net_degree: args.max_net_degree,
        ..Default::default()
    };
    let legalcheck = partitioner.partition(&mut partition, &hgr)?;
    let elapsed_time = start.elapsed();
    if legalcheck != LegalCheck::AllSatisfied {
        warn!(?legalcheck, "balance constraint could not be met");
    }

    let cut_cost = hgr.cut_cost(&partition);
    let imbalance_of_partition = imbalance(args.num_parts, &partition, &hgr);
    write_partition_data_to_file(&partition, &args.partition_file)?;
    println!("Cut cost {:?}", cut_cost);
    println!("Imbalance {:?}", imbalance_of_partition);
    println!("Execution time {:?}", elapsed_time);
    Ok(())
}
