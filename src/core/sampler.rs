use std::f64::consts::PI;

use super::types::DistributionRange;

/// Source of uniform and standard-normal deviates. Injectable so tests can
/// script exact draws while production runs stay seed-driven.
pub trait RandomSource {
    /// Uniform in (0, 1), never exactly zero.
    fn next_f64(&mut self) -> f64;

    fn standard_normal(&mut self) -> f64 {
        let u = self.next_f64().max(1e-12);
        let v = self.next_f64();
        (-2.0 * u.ln()).sqrt() * (2.0 * PI * v).cos()
    }
}

fn splitmix64(mut x: u64) -> u64 {
    x = x.wrapping_add(0x9E3779B97F4A7C15);
    let mut z = x;
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58476D1CE4E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D049BB133111EB);
    z ^ (z >> 31)
}

/// Seeded xorshift64* generator with cached Box-Muller pairs.
pub struct Rng {
    state: u64,
    cached_normal: Option<f64>,
}

impl Rng {
    pub fn new(seed: u64) -> Self {
        let mixed = splitmix64(seed);
        let state = if mixed == 0 { 0xA5A5_A5A5_A5A5_A5A5 } else { mixed };
        Self {
            state,
            cached_normal: None,
        }
    }

    fn next_u64(&mut self) -> u64 {
        let mut x = self.state;
        x ^= x >> 12;
        x ^= x << 25;
        x ^= x >> 27;
        self.state = x;
        x.wrapping_mul(0x2545F4914F6CDD1D)
    }
}

impl RandomSource for Rng {
    fn next_f64(&mut self) -> f64 {
        const DENOM: f64 = (1_u64 << 53) as f64;
        let v = self.next_u64() >> 11;
        ((v as f64) + 0.5) / DENOM
    }

    fn standard_normal(&mut self) -> f64 {
        if let Some(z) = self.cached_normal.take() {
            return z;
        }

        let u1 = self.next_f64().max(1e-12);
        let u2 = self.next_f64();
        let r = (-2.0 * u1.ln()).sqrt();
        let theta = 2.0 * PI * u2;

        let z0 = r * theta.cos();
        let z1 = r * theta.sin();
        self.cached_normal = Some(z1);
        z0
    }
}

/// Draws `mean + z * std_dev` and clamps it to `[min, max]`. The realized
/// distribution is a truncated normal; callers must not assume unbounded
/// tails.
pub fn sample_bounded<R: RandomSource + ?Sized>(range: &DistributionRange, rng: &mut R) -> f64 {
    let z = rng.standard_normal();
    (range.mean + z * range.std_dev).clamp(range.min, range.max)
}
