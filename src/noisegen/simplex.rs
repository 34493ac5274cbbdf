use noise::{NoiseFn, OpenSimplex};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::raster::Raster;

use super::params::{SimplexParams, SEED_MAX};

/// Generate a simplex-style noise field.
///
/// Same fractal-sum structure as the gradient generator, but on a smoother
/// kernel, and with the accumulated sum divided by the theoretical maximum
/// amplitude (sum of `persistence^k`), so the result approaches [-1, 1].
///
/// An unseeded call draws a fresh seed from entropy; after that the flow is
/// identical to the seeded path, so only seeded calls are reproducible.
pub fn generate_simplex_noise(
    width: usize,
    height: usize,
    params: &SimplexParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let p = params.sanitized();
    if width == 0 || height == 0 {
        return Raster::new_with(width, height, 0.0);
    }
    let seed = seed.unwrap_or_else(|| rand::thread_rng().gen_range(0..=SEED_MAX));

    let mut rng = ChaCha8Rng::seed_from_u64(seed as u64);
    let kernel = OpenSimplex::new(seed);
    let offset_x = rng.gen_range(0..100_000) as f64;
    let offset_y = rng.gen_range(0..100_000) as f64;

    // Theoretical maximum of the accumulated amplitude.
    let mut max_value = 0.0;
    let mut amplitude = 1.0;
    for _ in 0..p.octaves {
        max_value += amplitude;
        amplitude *= p.persistence;
    }

    let mut field = Raster::new_with(width, height, 0.0f64);
    field
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let sx = x as f64 + offset_x;
                let sy = y as f64 + offset_y;

                let mut total = 0.0;
                let mut amplitude = 1.0;
                let mut frequency = p.scale;
                for _ in 0..p.octaves {
                    total += amplitude * kernel.get([sx * frequency, sy * frequency]);
                    amplitude *= p.persistence;
                    frequency *= p.lacunarity;
                }

                *out = total / max_value;
            }
        });

    field
}

/// Simplex-style heightmap, optionally min-max normalized to [0, 1].
pub fn generate_simplex_heightmap(
    width: usize,
    height: usize,
    params: &SimplexParams,
    seed: Option<u32>,
    normalize: bool,
) -> Raster<f64> {
    let field = generate_simplex_noise(width, height, params, seed);
    if normalize {
        field.normalized()
    } else {
        field
    }
}

/// Ridged variant: `(1 - |n|)^2` over the base field. Absolute-value folding
/// turns zero crossings into sharp ridges; squaring deepens the valleys.
pub fn generate_simplex_ridged(
    width: usize,
    height: usize,
    params: &SimplexParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let mut field = generate_simplex_noise(width, height, params, seed);
    for v in field.as_mut_slice() {
        let ridged = 1.0 - v.abs();
        *v = ridged * ridged;
    }
    field
}

/// Turbulence variant: one field domain-warps a second, seed-offset field.
/// Each sample is displaced by the local noise magnitude and re-read from
/// the warped position, producing chaotic, fault-like patterns.
pub fn generate_simplex_turbulence(
    width: usize,
    height: usize,
    params: &SimplexParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let noise_x = generate_simplex_noise(width, height, params, seed);
    let noise_y = generate_simplex_noise(width, height, params, seed.map(|s| s + 1000));

    let mut turbulent = Raster::new_with(width, height, 0.0f64);
    for y in 0..height {
        for x in 0..width {
            let dx = (noise_x.get(x, y) * 10.0) as i64;
            let dy = (noise_y.get(x, y) * 10.0) as i64;

            let sample_x = (x as i64 + dx).clamp(0, width as i64 - 1) as usize;
            let sample_y = (y as i64 + dy).clamp(0, height as i64 - 1) as usize;

            turbulent.set(x, y, *noise_x.get(sample_x, sample_y));
        }
    }

    turbulent
}

/// Continental-shelf variant: tighter parameter bounds for broad, smooth
/// transitions between crust types. Normalized to [0, 1].
pub fn generate_simplex_continental_shelf(
    width: usize,
    height: usize,
    params: &SimplexParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = SimplexParams {
        scale: params.scale.clamp(0.005, 0.03),
        octaves: params.octaves.clamp(2, 5),
        persistence: params.persistence.clamp(0.2, 0.5),
        lacunarity: params.lacunarity,
    };
    generate_simplex_heightmap(width, height, &tuned, seed, true)
}
