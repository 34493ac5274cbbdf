use noise::{NoiseFn, Perlin};
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::raster::Raster;

use super::params::{PerlinParams, PERLIN_OCTAVES_RANGE};

/// Generate a gradient-noise field.
///
/// Sums `octaves` layers of 2D gradient noise, walking frequency by
/// `lacunarity` and amplitude by `persistence` per layer. Samples are taken
/// at `(x + offset) * scale` where the offsets derive from the seed alone,
/// so a seeded call is bit-reproducible. The raw sum is returned without
/// re-normalization; values stay in roughly [-1, 1].
pub fn generate_perlin_noise(
    width: usize,
    height: usize,
    params: &PerlinParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let p = params.sanitized();
    if width == 0 || height == 0 {
        return Raster::new_with(width, height, 0.0);
    }

    // Seeded runs shift the sample window by a seed-derived offset; unseeded
    // runs sample the base lattice at origin.
    let (kernel, offset_x, offset_y) = match seed {
        Some(s) => {
            let mut rng = ChaCha8Rng::seed_from_u64(s as u64);
            let ox = rng.gen_range(0..100_000) as f64;
            let oy = rng.gen_range(0..100_000) as f64;
            (Perlin::new(s), ox, oy)
        }
        None => (Perlin::new(0), 0.0, 0.0),
    };

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

                *out = total;
            }
        });

    field
}

/// Gradient-noise heightmap, optionally min-max normalized to [0, 1].
pub fn generate_perlin_heightmap(
    width: usize,
    height: usize,
    params: &PerlinParams,
    seed: Option<u32>,
    normalize: bool,
) -> Raster<f64> {
    let field = generate_perlin_noise(width, height, params, seed);
    if normalize {
        field.normalized()
    } else {
        field
    }
}

/// Gradient noise tuned for continental landmass patterns: broad features,
/// more layering, stronger persistence.
pub fn generate_perlin_continental(
    width: usize,
    height: usize,
    params: &PerlinParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = PerlinParams {
        scale: params.scale.clamp(0.001, 0.05),
        octaves: params
            .octaves
            .clamp(2, PERLIN_OCTAVES_RANGE.1),
        persistence: params.persistence.clamp(0.3, 0.8),
        lacunarity: params.lacunarity,
    };
    generate_perlin_heightmap(width, height, &tuned, seed, true)
}

/// Gradient noise tuned for oceanic floor patterns: finer detail, fewer
/// octaves, low persistence for a smoother bed.
pub fn generate_perlin_oceanic(
    width: usize,
    height: usize,
    params: &PerlinParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = PerlinParams {
        scale: params.scale.clamp(0.02, 0.1),
        octaves: params.octaves.clamp(PERLIN_OCTAVES_RANGE.0, 4),
        persistence: params.persistence.clamp(0.1, 0.5),
        lacunarity: params.lacunarity,
    };
    generate_perlin_heightmap(width, height, &tuned, seed, true)
}
