//! Direct all-pairs gravity kernel and semi-implicit Euler step.
//!
//! One step is two passes over the store: accumulate the softened
//! inverse-cube force and kick every velocity, then drift every position
//! with the fresh velocities. Velocities for all particles are updated
//! before any position moves, so every force read in a step sees the
//! pre-step positions.

use rayon::prelude::*;

use crate::particle_store::ParticleStore;

/// Softening added to every squared pair distance. Keeps the i == j term
/// and near-coincident particles from producing a division by zero.
pub const SOFTENING: f32 = 1e-20;

const MAGIC: u32 = 0x5f3759df;

/// Fast approximate 1/sqrt(x): magic-constant initial guess refined by one
/// Newton-Raphson iteration. Maximum relative error is about 1.75e-3;
/// that accuracy trade is the point of the `Fast` kernel, not a bug.
#[inline]
pub fn fast_inv_sqrt(x: f32) -> f32 {
    let half = 0.5 * x;
    let y = f32::from_bits(MAGIC.wrapping_sub(x.to_bits() >> 1));
    y * (1.5 - half * y * y)
}

/// Inverse-cube-distance strategy used by the force accumulation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ForceKernel {
    /// `1 / sqrt(r2^3)` with a true square root.
    Exact,
    /// `fast_inv_sqrt(r2)^3`; trades roughly 0.5% relative error on the
    /// cubed factor for a cheaper pair evaluation.
    Fast,
}

impl ForceKernel {
    #[inline]
    fn inv_cube(self, r2: f32) -> f32 {
        match self {
            // Root first, then cube: cubing the squared distance first
            // underflows f32 at the softening floor (1e-60 flushes to
            // zero) and would turn the self-term into 0 * inf.
            ForceKernel::Exact => {
                let r = r2.sqrt();
                1.0 / (r * r * r)
            }
            ForceKernel::Fast => {
                let y = fast_inv_sqrt(r2);
                y * y * y
            }
        }
    }

    /// Flop count charged per pair interaction when reporting throughput.
    /// Fixed nominal counts per strategy so reported numbers stay
    /// comparable across runs and implementations.
    pub fn flops_per_interaction(self) -> u64 {
        match self {
            ForceKernel::Exact => 24,
            ForceKernel::Fast => 25,
        }
    }
}

/// Net softened gravitational force on particle `i` from every particle in
/// the store. The j == i term survives in the loop: its displacement is
/// zero, so it contributes nothing once softened.
#[inline]
pub fn net_force(store: &ParticleStore, i: usize, kernel: ForceKernel) -> [f32; 3] {
    let xi = store.pos_x[i];
    let yi = store.pos_y[i];
    let zi = store.pos_z[i];

    let mut fx = 0.0f32;
    let mut fy = 0.0f32;
    let mut fz = 0.0f32;

    for j in 0..store.count {
        let dx = store.pos_x[j] - xi;
        let dy = store.pos_y[j] - yi;
        let dz = store.pos_z[j] - zi;

        let r2 = dx * dx + dy * dy + dz * dz + SOFTENING;
        let inv_r3 = kernel.inv_cube(r2);

        fx += dx * inv_r3;
        fy += dy * inv_r3;
        fz += dz * inv_r3;
    }

    [fx, fy, fz]
}

/// Advance the whole store by one step of size `dt`.
pub fn step(store: &mut ParticleStore, dt: f32, kernel: ForceKernel) {
    // Kick: accumulate forces from the pre-step positions and update every
    // velocity. Positions stay untouched until this pass finishes.
    for i in 0..store.count {
        let [fx, fy, fz] = net_force(store, i, kernel);
        store.vel_x[i] += dt * fx;
        store.vel_y[i] += dt * fy;
        store.vel_z[i] += dt * fz;
    }

    // Drift: positions from the freshly kicked velocities.
    for i in 0..store.count {
        store.pos_x[i] += dt * store.vel_x[i];
        store.pos_y[i] += dt * store.vel_y[i];
        store.pos_z[i] += dt * store.vel_z[i];
    }
}

/// Parallel variant of [`step`]. The force pass fans out over particles
/// with each task reading only the shared pre-step positions and owning one
/// slot of the force buffer, so no synchronization is needed beyond the
/// pass boundary. The per-particle accumulation order is unchanged, so the
/// result is bit-identical to [`step`].
pub fn step_par(store: &mut ParticleStore, dt: f32, kernel: ForceKernel) {
    let mut forces = vec![[0.0f32; 3]; store.count];

    {
        let shared: &ParticleStore = store;
        forces
            .par_iter_mut()
            .enumerate()
            .for_each(|(i, f)| *f = net_force(shared, i, kernel));
    }

    for i in 0..store.count {
        store.vel_x[i] += dt * forces[i][0];
        store.vel_y[i] += dt * forces[i][1];
        store.vel_z[i] += dt * forces[i][2];
    }

    for i in 0..store.count {
        store.pos_x[i] += dt * store.vel_x[i];
        store.pos_y[i] += dt * store.vel_y[i];
        store.pos_z[i] += dt * store.vel_z[i];
    }
}

/// Ordered pair interactions evaluated per step, as reported by the driver.
pub fn interactions_per_step(n: u64) -> u64 {
    n * n.saturating_sub(1)
}

/// Fixed flop estimate for one step at the given kernel: the per-pair cost
/// over N(N-1) interactions plus the position pass.
pub fn flops_per_step(n: u64, kernel: ForceKernel) -> f64 {
    let pairs = interactions_per_step(n) as f64;
    kernel.flops_per_interaction() as f64 * pairs + 3.0 * n as f64
}
