//! Sine-hash value noise and its fractal sum.
//!
//! The hash is `frac(sin(x*127.1 + z*311.7 + seed*74.7) * 43758.5453)` evaluated in
//! `f64`, so a given `(x, z, seed)` always produces the same lattice value.

use noise::NoiseFn;

const HASH_X: f64 = 127.1;
const HASH_Z: f64 = 311.7;
const HASH_SEED: f64 = 74.7;
const HASH_SCALE: f64 = 43758.5453;

/// Seed stride between fbm octaves so each layer samples a decorrelated lattice.
pub const OCTAVE_SEED_STRIDE: f64 = 13.0;

/// Cubic Hermite ease `t*t*(3-2t)`. Callers clamp `t` to `[0, 1]` first.
#[inline]
pub fn smoothstep(t: f64) -> f64 {
    t * t * (3.0 - 2.0 * t)
}

#[inline]
pub fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}

/// Deterministic pseudo-random value in `[0, 1)` for a lattice point.
#[inline]
pub fn hash2d(x: f64, z: f64, seed: f64) -> f64 {
    let s = (x * HASH_X + z * HASH_Z + seed * HASH_SEED).sin() * HASH_SCALE;
    s - s.floor()
}

/// Bilinear blend of the four surrounding lattice hashes with smoothstep weights.
pub fn value_noise_2d(x: f64, z: f64, seed: f64) -> f64 {
    let x0 = x.floor();
    let z0 = z.floor();
    let x1 = x0 + 1.0;
    let z1 = z0 + 1.0;

    let sx = smoothstep(x - x0);
    let sz = smoothstep(z - z0);

    let n00 = hash2d(x0, z0, seed);
    let n10 = hash2d(x1, z0, seed);
    let n01 = hash2d(x0, z1, seed);
    let n11 = hash2d(x1, z1, seed);

    let ix0 = lerp(n00, n10, sx);
    let ix1 = lerp(n01, n11, sx);
    lerp(ix0, ix1, sz)
}

/// Fractal sum of `octaves` value-noise layers, normalised by the summed
/// amplitudes so the result stays in `[0, 1)` for any octave count or gain.
/// Zero octaves yields `0.0`.
pub fn fbm_noise(x: f64, z: f64, seed: f64, octaves: u32, lacunarity: f64, gain: f64) -> f64 {
    let mut amplitude = 1.0;
    let mut frequency = 1.0;
    let mut sum = 0.0;
    let mut normalization = 0.0;

    for i in 0..octaves {
        let layer_seed = seed + f64::from(i) * OCTAVE_SEED_STRIDE;
        sum += value_noise_2d(x * frequency, z * frequency, layer_seed) * amplitude;
        normalization += amplitude;
        amplitude *= gain;
        frequency *= lacunarity;
    }

    if normalization.abs() <= f64::EPSILON {
        0.0
    } else {
        sum / normalization
    }
}

/// Single-layer value noise as a `noise` crate source.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ValueNoise {
    pub seed: f64,
}

impl ValueNoise {
    pub fn new(seed: f64) -> Self {
        Self { seed }
    }
}

impl NoiseFn<f64, 2> for ValueNoise {
    fn get(&self, point: [f64; 2]) -> f64 {
        value_noise_2d(point[0], point[1], self.seed)
    }
}

/// Octave layout for one fractal layer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Fbm {
    pub seed: f64,
    pub octaves: u32,
    pub lacunarity: f64,
    pub gain: f64,
}

impl Fbm {
    pub const fn new(seed: f64, octaves: u32, lacunarity: f64, gain: f64) -> Self {
        Self {
            seed,
            octaves,
            lacunarity,
            gain,
        }
    }

    /// Same layout reseeded relative to a base seed.
    pub fn offset_seed(self, base: f64) -> Self {
        Self {
            seed: base + self.seed,
            ..self
        }
    }

    pub fn sample(&self, x: f64, z: f64) -> f64 {
        fbm_noise(x, z, self.seed, self.octaves, self.lacunarity, self.gain)
    }
}

impl NoiseFn<f64, 2> for Fbm {
    fn get(&self, point: [f64; 2]) -> f64 {
        self.sample(point[0], point[1])
    }
}
