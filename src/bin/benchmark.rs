use std::time::Instant;

use nbody_direct::{
    create_and_initialize, flops_per_step, step, step_par, ForceKernel, ParticleStore,
};

const SEED: u64 = 12345;
const DT: f32 = 0.01;
const STEPS: u64 = 5;

fn time_steps(n: u64, label: &str, kernel: ForceKernel, parallel: bool) {
    let mut store = create_and_initialize(n, SEED).unwrap();

    let advance: fn(&mut ParticleStore, f32, ForceKernel) = if parallel { step_par } else { step };

    // One untimed step so allocator and cache effects settle.
    advance(&mut store, DT, kernel);

    let start = Instant::now();
    for _ in 0..STEPS {
        advance(&mut store, DT, kernel);
    }
    let per_step = start.elapsed().as_secs_f64() / STEPS as f64;
    let gflops = flops_per_step(n, kernel) * 1e-9 / per_step;

    println!(
        "{:>14} | {:>14} | {:>13.6} | {:>8.1}",
        n, label, per_step, gflops
    );
}

fn main() {
    println!("N-Body Direct Kernel Benchmark");
    println!("------------------------------");
    println!("Running {} steps per configuration with dt={}", STEPS, DT);
    println!();
    println!(
        "{:>14} | {:>14} | {:>13} | {:>8}",
        "Particle Count", "Kernel", "Step Time (s)", "GFLOP/s"
    );
    println!("---------------|----------------|---------------|---------");

    for n in [1024u64, 2048, 4096, 8192] {
        time_steps(n, "Exact", ForceKernel::Exact, false);
        time_steps(n, "Fast", ForceKernel::Fast, false);
        time_steps(n, "Fast parallel", ForceKernel::Fast, true);
        println!("---------------|----------------|---------------|---------");
    }
}
