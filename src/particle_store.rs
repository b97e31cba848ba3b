use std::collections::TryReserveError;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid particle count: {0}")]
    InvalidArgument(u64),
    #[error("failed to allocate particle storage")]
    Allocation(#[from] TryReserveError),
}

/// Structure-of-arrays particle storage.
///
/// Six parallel `Vec<f32>` sequences, all of length `count`. Index `i`
/// across all six refers to the same particle. The store is sized once at
/// construction and never grows or shrinks.
pub struct ParticleStore {
    pub pos_x: Vec<f32>,
    pub pos_y: Vec<f32>,
    pub pos_z: Vec<f32>,
    pub vel_x: Vec<f32>,
    pub vel_y: Vec<f32>,
    pub vel_z: Vec<f32>,
    pub count: usize,
}

impl ParticleStore {
    /// Allocate a zeroed store for `n` particles.
    ///
    /// Fails with `InvalidArgument` for n == 0 or a count whose byte size
    /// is not representable, and with `Allocation` when the allocator
    /// refuses. Sequences already allocated when a later one fails are
    /// dropped on the error path, so no partial store ever escapes.
    pub fn new(n: u64) -> Result<Self, StoreError> {
        let count: usize = n
            .try_into()
            .ok()
            .filter(|&c| c > 0 && (c as u128) * 4 <= isize::MAX as u128)
            .ok_or(StoreError::InvalidArgument(n))?;

        let mut store = ParticleStore {
            pos_x: Vec::new(),
            pos_y: Vec::new(),
            pos_z: Vec::new(),
            vel_x: Vec::new(),
            vel_y: Vec::new(),
            vel_z: Vec::new(),
            count,
        };

        for seq in [
            &mut store.pos_x,
            &mut store.pos_y,
            &mut store.pos_z,
            &mut store.vel_x,
            &mut store.vel_y,
            &mut store.vel_z,
        ] {
            seq.try_reserve_exact(count)?;
            seq.resize(count, 0.0);
        }

        Ok(store)
    }

    pub fn len(&self) -> usize {
        self.count
    }

    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Bytes held by the six sequences.
    pub fn memory_footprint(&self) -> u64 {
        6 * self.count as u64 * std::mem::size_of::<f32>() as u64
    }

    /// Fill the store with the benchmark's initial distribution.
    ///
    /// One sign is drawn per call (not per particle) by comparing two u64
    /// draws; it flips x/z positions and the y velocity. Every component is
    /// a uniform f32 in [0, 1) before the sign, so all values land in
    /// (-1, 1). Deterministic for a given seed.
    pub fn randomize(&mut self, rng: &fastrand::Rng) {
        let r1 = rng.u64(..);
        let r2 = rng.u64(..);
        let sign: f32 = if r1 > r2 { 1.0 } else { -1.0 };

        for i in 0..self.count {
            self.pos_x[i] = sign * rng.f32();
            self.pos_y[i] = rng.f32();
            self.pos_z[i] = sign * rng.f32();

            self.vel_x[i] = rng.f32();
            self.vel_y[i] = sign * rng.f32();
            self.vel_z[i] = rng.f32();
        }
    }
}

/// Allocate a store for `n` particles and fill it from `seed`.
pub fn create_and_initialize(n: u64, seed: u64) -> Result<ParticleStore, StoreError> {
    let mut store = ParticleStore::new(n)?;
    let rng = fastrand::Rng::with_seed(seed);
    store.randomize(&rng);
    Ok(store)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_count_is_invalid() {
        assert!(matches!(
            ParticleStore::new(0),
            Err(StoreError::InvalidArgument(0))
        ));
    }

    #[test]
    fn sequences_share_length() {
        let store = ParticleStore::new(77).unwrap();
        assert_eq!(store.len(), 77);
        for seq in [
            &store.pos_x,
            &store.pos_y,
            &store.pos_z,
            &store.vel_x,
            &store.vel_y,
            &store.vel_z,
        ] {
            assert_eq!(seq.len(), 77);
        }
    }

    #[test]
    fn randomize_bounds_and_sign_structure() {
        let mut store = ParticleStore::new(512).unwrap();
        let rng = fastrand::Rng::with_seed(7);
        store.randomize(&rng);

        // Unsigned components are uniform in [0, 1); signed ones share a
        // single per-construction sign.
        let sign = store.pos_x.iter().find(|v| **v != 0.0).unwrap().signum();
        for i in 0..store.len() {
            assert!((0.0..1.0).contains(&store.pos_y[i]));
            assert!((0.0..1.0).contains(&store.vel_x[i]));
            assert!((0.0..1.0).contains(&store.vel_z[i]));
            assert!(store.pos_x[i].abs() < 1.0);
            assert!(store.pos_z[i].abs() < 1.0);
            assert!(store.vel_y[i].abs() < 1.0);
            if store.pos_x[i] != 0.0 {
                assert_eq!(store.pos_x[i].signum(), sign);
            }
            if store.vel_y[i] != 0.0 {
                assert_eq!(store.vel_y[i].signum(), sign);
            }
        }
    }

    #[test]
    fn seeded_init_is_deterministic() {
        let a = create_and_initialize(256, 42).unwrap();
        let b = create_and_initialize(256, 42).unwrap();
        assert_eq!(a.pos_x, b.pos_x);
        assert_eq!(a.pos_y, b.pos_y);
        assert_eq!(a.pos_z, b.pos_z);
        assert_eq!(a.vel_x, b.vel_x);
        assert_eq!(a.vel_y, b.vel_y);
        assert_eq!(a.vel_z, b.vel_z);
    }

    #[test]
    fn footprint_counts_all_six_sequences() {
        let store = ParticleStore::new(1000).unwrap();
        assert_eq!(store.memory_footprint(), 6 * 1000 * 4);
    }
}
