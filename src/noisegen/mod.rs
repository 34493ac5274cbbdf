//! Coherent-noise field synthesis.
//!
//! Three generators share one contract: `(width, height, params, seed)` to
//! a scalar field, with parameters clamped to documented bounds before use
//! and bit-identical output for identical seeded inputs.

pub mod params;
pub mod perlin;
pub mod simplex;
pub mod worley;

pub use params::{
    CellType, DistanceFunction, NoiseParams, PerlinParams, SimplexParams, WorleyParams,
};
pub use perlin::{
    generate_perlin_continental, generate_perlin_heightmap, generate_perlin_noise,
    generate_perlin_oceanic,
};
pub use simplex::{
    generate_simplex_continental_shelf, generate_simplex_heightmap, generate_simplex_noise,
    generate_simplex_ridged, generate_simplex_turbulence,
};
pub use worley::{
    generate_worley_fracture_zones, generate_worley_heightmap, generate_worley_noise,
    generate_worley_plate_boundaries, generate_worley_plates, generate_worley_volcanic,
};

use crate::raster::Raster;

/// Generate a raw noise field for the given algorithm variant.
pub fn generate(
    width: usize,
    height: usize,
    params: &NoiseParams,
    seed: Option<u32>,
) -> Raster<f64> {
    match params {
        NoiseParams::Perlin(p) => perlin::generate_perlin_noise(width, height, p, seed),
        NoiseParams::Simplex(p) => simplex::generate_simplex_noise(width, height, p, seed),
        NoiseParams::Worley(p) => worley::generate_worley_noise(width, height, p, seed),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dispatch_matches_direct_calls() {
        let p = PerlinParams::default();
        let via_dispatch = generate(24, 24, &NoiseParams::Perlin(p), Some(42));
        let direct = generate_perlin_noise(24, 24, &p, Some(42));
        assert_eq!(via_dispatch, direct);
    }

    #[test]
    fn all_algorithms_honor_shape() {
        for params in [
            NoiseParams::Perlin(PerlinParams::default()),
            NoiseParams::Simplex(SimplexParams::default()),
            NoiseParams::Worley(WorleyParams::default()),
        ] {
            let field = generate(31, 17, &params, Some(1));
            assert_eq!(field.width, 31, "{}", params.algorithm_name());
            assert_eq!(field.height, 17, "{}", params.algorithm_name());
        }
    }
}
