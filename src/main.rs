use std::time::Instant;

use anyhow::{ensure, Context, Result};
use clap::{Parser, ValueEnum};

use nbody_direct::{
    create_and_initialize, flops_per_step, interactions_per_step, step, step_par, ForceKernel,
    RateStats,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KernelArg {
    /// True square root in the inverse-cube factor.
    Exact,
    /// Fast approximate inverse square root (magic constant + one Newton step).
    Fast,
}

impl From<KernelArg> for ForceKernel {
    fn from(arg: KernelArg) -> Self {
        match arg {
            KernelArg::Exact => ForceKernel::Exact,
            KernelArg::Fast => ForceKernel::Fast,
        }
    }
}

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Number of particles to simulate.
    #[arg(short, long, default_value_t = 16384)]
    number: u64,

    /// Number of steps to run the simulation.
    #[arg(short, long, default_value_t = 10)]
    steps: u64,

    /// Steps excluded from the averaged throughput (still timed and printed).
    #[arg(short, long, default_value_t = 3)]
    warmup: u64,

    /// Time step.
    #[arg(short, long, default_value_t = 0.01)]
    dt: f32,

    /// RNG seed for the initial distribution.
    #[arg(long, default_value_t = 0)]
    seed: u64,

    /// Inverse-cube strategy.
    #[arg(short, long, value_enum, default_value_t = KernelArg::Fast)]
    kernel: KernelArg,

    /// Run the force pass on a rayon thread pool.
    #[arg(short, long, default_value_t = false)]
    parallel: bool,

    /// Worker threads for --parallel. Defaults to the physical CPU count.
    #[arg(short, long)]
    threads: Option<usize>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    ensure!(args.steps >= 1, "step count must be at least 1");
    ensure!(args.warmup < args.steps, "warmup must leave at least one measured step");
    ensure!(args.dt > 0.0, "time step must be positive");

    let kernel = ForceKernel::from(args.kernel);

    if args.parallel {
        let threads = args.threads.unwrap_or_else(num_cpus::get_physical);
        rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .build_global()
            .context("failed to build rayon thread pool")?;
        log::info!("parallel force pass on {threads} threads");
    }

    log::info!(
        "n = {}, steps = {} (warmup {}), dt = {}, kernel = {:?}, seed = {}",
        args.number, args.steps, args.warmup, args.dt, kernel, args.seed
    );

    let mut store =
        create_and_initialize(args.number, args.seed).context("particle store setup failed")?;

    let bytes = store.memory_footprint();
    println!();
    println!(
        "Total memory size: {} B, {} KiB, {} MiB",
        bytes,
        bytes >> 10,
        bytes >> 20
    );
    println!();
    println!("{:>5} {:>10} {:>12} {:>8}", "Step", "Time, s", "Interact/s", "GFLOP/s");

    let interactions = interactions_per_step(args.number) as f64;
    let gflops = flops_per_step(args.number, kernel) * 1e-9;
    let mut rate = RateStats::new();

    for s in 0..args.steps {
        let start = Instant::now();
        if args.parallel {
            step_par(&mut store, args.dt, kernel);
        } else {
            step(&mut store, args.dt, kernel);
        }
        let elapsed = start.elapsed().as_secs_f64();

        if s >= args.warmup {
            rate.push(gflops / elapsed);
        }

        println!(
            "{:>5} {:>10.3e} {:>12.3e} {:>8.1} {}",
            s,
            elapsed,
            interactions / elapsed,
            gflops / elapsed,
            if s < args.warmup { "*" } else { "" }
        );
    }

    println!("-----------------------------------------------------");
    println!(
        "Average performance: {:>10.1} +- {:.1} GFLOP/s",
        rate.mean(),
        rate.std_dev()
    );
    println!("-----------------------------------------------------");

    Ok(())
}
