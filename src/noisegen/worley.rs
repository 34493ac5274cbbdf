use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use rayon::prelude::*;

use crate::raster::Raster;

use super::params::{CellType, DistanceFunction, WorleyParams};

/// Generate a cellular (Worley-style) distance field.
///
/// A virtual grid of cell size `1 / frequency` is laid over the output,
/// padded by one cell on each side so border pixels see off-screen points.
/// Every cell holds exactly one uniformly jittered point, drawn in a fixed
/// row-major order from the seeded rng. Each output pixel reports the
/// first- or second-nearest point distance (or their difference) under the
/// selected metric.
///
/// Output is non-negative and unbounded above; normalization is the
/// caller's concern.
pub fn generate_worley_noise(
    width: usize,
    height: usize,
    params: &WorleyParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let p = params.sanitized();
    if width == 0 || height == 0 {
        return Raster::new_with(width, height, 0.0);
    }

    let mut rng = match seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s as u64),
        None => ChaCha8Rng::from_entropy(),
    };

    let cell_size = ((1.0 / p.frequency) as usize).max(1);
    let points = scatter_points(width, height, cell_size, &mut rng);

    let mut field = Raster::new_with(width, height, 0.0f64);
    field
        .as_mut_slice()
        .par_chunks_mut(width)
        .enumerate()
        .for_each(|(y, row)| {
            for (x, out) in row.iter_mut().enumerate() {
                let (f1, f2) = nearest_two(x as f64, y as f64, &points, p.distance_function);
                *out = match p.cell_type {
                    CellType::F1 => f1,
                    CellType::F2 => f2.unwrap_or(f1),
                    CellType::F1MinusF2 => f2.map(|f2| f2 - f1).unwrap_or(0.0),
                };
            }
        });

    field
}

/// One jittered point per virtual cell, covering the output plus one pad
/// cell on every side.
fn scatter_points(
    width: usize,
    height: usize,
    cell_size: usize,
    rng: &mut ChaCha8Rng,
) -> Vec<(f64, f64)> {
    let cells_x = (width / cell_size) as i64 + 1;
    let cells_y = (height / cell_size) as i64 + 1;

    let mut points = Vec::with_capacity(((cells_x + 2) * (cells_y + 2)) as usize);
    for gy in -1..=cells_y {
        for gx in -1..=cells_x {
            let px = (gx * cell_size as i64) as f64 + rng.gen_range(0.0..cell_size as f64);
            let py = (gy * cell_size as i64) as f64 + rng.gen_range(0.0..cell_size as f64);
            points.push((px, py));
        }
    }

    points
}

/// Distances to the nearest and second-nearest points. The second distance
/// is `None` when only one candidate point exists.
fn nearest_two(
    x: f64,
    y: f64,
    points: &[(f64, f64)],
    metric: DistanceFunction,
) -> (f64, Option<f64>) {
    let mut best = f64::INFINITY;
    let mut second = f64::INFINITY;

    for &(px, py) in points {
        let d = metric.distance(x - px, y - py);
        if d < best {
            second = best;
            best = d;
        } else if d < second {
            second = d;
        }
    }

    let second = if second.is_finite() { Some(second) } else { None };
    (best, second)
}

/// Cellular heightmap, optionally min-max normalized to [0, 1].
pub fn generate_worley_heightmap(
    width: usize,
    height: usize,
    params: &WorleyParams,
    seed: Option<u32>,
    normalize: bool,
) -> Raster<f64> {
    let field = generate_worley_noise(width, height, params, seed);
    if normalize {
        field.normalized()
    } else {
        field
    }
}

/// Normalized F1 field: distinct basin per cell point, the classic input
/// for plate segmentation.
pub fn generate_worley_plates(
    width: usize,
    height: usize,
    params: &WorleyParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = WorleyParams {
        cell_type: CellType::F1,
        ..*params
    };
    generate_worley_heightmap(width, height, &tuned, seed, true)
}

/// Boundary-highlighting field: inverted normalized F1-F2, so cell borders
/// carry the high values.
pub fn generate_worley_plate_boundaries(
    width: usize,
    height: usize,
    params: &WorleyParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = WorleyParams {
        cell_type: CellType::F1MinusF2,
        ..*params
    };
    let mut field = generate_worley_heightmap(width, height, &tuned, seed, true);
    for v in field.as_mut_slice() {
        *v = 1.0 - *v;
    }
    field
}

/// Volcanic-activity field: normalized F2 squared to sharpen the peaks.
pub fn generate_worley_volcanic(
    width: usize,
    height: usize,
    params: &WorleyParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = WorleyParams {
        cell_type: CellType::F2,
        ..*params
    };
    let mut field = generate_worley_heightmap(width, height, &tuned, seed, true);
    for v in field.as_mut_slice() {
        *v = *v * *v;
    }
    field
}

/// Fracture-zone field: normalized F1-F2 under whatever metric the caller
/// picked (chebyshev gives the most crystalline look).
pub fn generate_worley_fracture_zones(
    width: usize,
    height: usize,
    params: &WorleyParams,
    seed: Option<u32>,
) -> Raster<f64> {
    let tuned = WorleyParams {
        cell_type: CellType::F1MinusF2,
        ..*params
    };
    generate_worley_heightmap(width, height, &tuned, seed, true)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn seeded_generation_is_deterministic() {
        let params = WorleyParams::default();
        let a = generate_worley_noise(48, 48, &params, Some(12345));
        let b = generate_worley_noise(48, 48, &params, Some(12345));
        assert_eq!(a, b);
    }

    #[test]
    fn different_seeds_differ() {
        let params = WorleyParams::default();
        let a = generate_worley_noise(48, 48, &params, Some(1));
        let b = generate_worley_noise(48, 48, &params, Some(2));
        assert!(a.iter().zip(b.iter()).any(|((_, _, va), (_, _, vb))| va != vb));
    }

    #[test]
    fn f1_is_non_negative() {
        let params = WorleyParams::default();
        let field = generate_worley_noise(64, 64, &params, Some(7));
        assert!(field.iter().all(|(_, _, &v)| v >= 0.0));
    }

    #[test]
    fn f1f2_difference_is_non_negative() {
        let params = WorleyParams {
            cell_type: CellType::F1MinusF2,
            ..WorleyParams::default()
        };
        let field = generate_worley_noise(64, 64, &params, Some(7));
        assert!(field.iter().all(|(_, _, &v)| v >= 0.0));
    }

    #[test]
    fn cell_modes_are_consistent_for_one_seed() {
        // Same seed, same point set: F1-F2 must equal F2 - F1 everywhere,
        // and F2 must dominate F1.
        let base = WorleyParams {
            frequency: 0.1,
            distance_function: DistanceFunction::Euclidean,
            cell_type: CellType::F1,
        };
        let f1 = generate_worley_noise(32, 32, &base, Some(7));
        let f2 = generate_worley_noise(
            32,
            32,
            &WorleyParams {
                cell_type: CellType::F2,
                ..base
            },
            Some(7),
        );
        let diff = generate_worley_noise(
            32,
            32,
            &WorleyParams {
                cell_type: CellType::F1MinusF2,
                ..base
            },
            Some(7),
        );

        for ((x, y, &d), ((_, _, &a), (_, _, &b))) in diff.iter().zip(f1.iter().zip(f2.iter())) {
            assert!(b >= a, "F2 < F1 at ({x}, {y})");
            assert!((d - (b - a)).abs() < 1e-9, "F1-F2 mismatch at ({x}, {y})");
        }
    }

    #[test]
    fn output_shape_is_exact_despite_padding() {
        let field = generate_worley_noise(53, 29, &WorleyParams::default(), Some(3));
        assert_eq!(field.width, 53);
        assert_eq!(field.height, 29);
    }

    #[test]
    fn metric_changes_the_field() {
        let a = generate_worley_noise(32, 32, &WorleyParams::default(), Some(5));
        let b = generate_worley_noise(
            32,
            32,
            &WorleyParams {
                distance_function: DistanceFunction::Manhattan,
                ..WorleyParams::default()
            },
            Some(5),
        );
        assert!(a.iter().zip(b.iter()).any(|((_, _, va), (_, _, vb))| va != vb));
    }

    #[test]
    fn boundary_preset_is_unit_range() {
        let field =
            generate_worley_plate_boundaries(32, 32, &WorleyParams::default(), Some(11));
        assert!(field.iter().all(|(_, _, &v)| (0.0..=1.0).contains(&v)));
    }
}
