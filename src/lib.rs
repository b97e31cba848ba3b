pub mod kernel;
pub mod particle_store;
pub mod stats;

pub use kernel::{
    fast_inv_sqrt, flops_per_step, interactions_per_step, net_force, step, step_par, ForceKernel,
    SOFTENING,
};
pub use particle_store::{create_and_initialize, ParticleStore, StoreError};
pub use stats::RateStats;
