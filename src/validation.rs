//! Strict request validation.
//!
//! This is the ingress gate: a violated bound rejects the request with an
//! itemized error list and nothing is generated. It is deliberately
//! separate from the sanitize path, which clamps silently inside the
//! generators.

use crate::error::GenerationError;
use crate::noisegen::params::{
    NoiseParams, PerlinParams, SimplexParams, WorleyParams, MAX_RESOLUTION,
    PERLIN_LACUNARITY_RANGE, PERLIN_OCTAVES_RANGE, PERLIN_PERSISTENCE_RANGE, PERLIN_SCALE_RANGE,
    SEED_MAX, SIMPLEX_LACUNARITY_RANGE, SIMPLEX_OCTAVES_RANGE, SIMPLEX_PERSISTENCE_RANGE,
    SIMPLEX_SCALE_RANGE, WORLEY_FREQUENCY_RANGE,
};
use crate::plates::PlateRequest;

/// Grid dimension bounds for plate generation.
pub const GRID_DIMENSION_RANGE: (usize, usize) = (20, 500);
/// Growth sensitivity bounds.
pub const SENSITIVITY_RANGE: (f64, f64) = (0.05, 0.40);
/// Plate count bounds.
pub const MIN_PLATES_FLOOR: usize = 2;
pub const MAX_PLATES_CEILING: usize = 30;

/// Validate a noise generation request. Collects every violation.
pub fn validate_noise_request(
    params: &NoiseParams,
    width: usize,
    height: usize,
    seed: Option<u32>,
) -> Result<(), GenerationError> {
    let mut errors = Vec::new();

    if width == 0 || height == 0 {
        errors.push(format!("invalid dimensions: {width}x{height}"));
    }
    if width > MAX_RESOLUTION || height > MAX_RESOLUTION {
        errors.push(format!(
            "resolution {width}x{height} exceeds maximum {MAX_RESOLUTION}x{MAX_RESOLUTION}"
        ));
    }

    match params {
        NoiseParams::Perlin(p) => errors.extend(validate_perlin_params(p)),
        NoiseParams::Simplex(p) => errors.extend(validate_simplex_params(p)),
        NoiseParams::Worley(p) => errors.extend(validate_worley_params(p)),
    }

    if let Some(seed) = seed {
        if seed > SEED_MAX {
            errors.push(format!("seed {seed} outside valid range [0, {SEED_MAX}]"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(GenerationError::Validation(errors))
    }
}

/// Violations of the gradient-noise parameter bounds.
pub fn validate_perlin_params(p: &PerlinParams) -> Vec<String> {
    let mut errors = Vec::new();

    if !(PERLIN_SCALE_RANGE.0..=PERLIN_SCALE_RANGE.1).contains(&p.scale) {
        errors.push(format!(
            "perlin scale {} outside valid range [{}, {}]",
            p.scale, PERLIN_SCALE_RANGE.0, PERLIN_SCALE_RANGE.1
        ));
    }
    if !(PERLIN_OCTAVES_RANGE.0..=PERLIN_OCTAVES_RANGE.1).contains(&p.octaves) {
        errors.push(format!(
            "perlin octaves {} outside valid range [{}, {}]",
            p.octaves, PERLIN_OCTAVES_RANGE.0, PERLIN_OCTAVES_RANGE.1
        ));
    }
    if !(PERLIN_PERSISTENCE_RANGE.0..=PERLIN_PERSISTENCE_RANGE.1).contains(&p.persistence) {
        errors.push(format!(
            "perlin persistence {} outside valid range [{}, {}]",
            p.persistence, PERLIN_PERSISTENCE_RANGE.0, PERLIN_PERSISTENCE_RANGE.1
        ));
    }
    if !(PERLIN_LACUNARITY_RANGE.0..=PERLIN_LACUNARITY_RANGE.1).contains(&p.lacunarity) {
        errors.push(format!(
            "perlin lacunarity {} outside valid range [{}, {}]",
            p.lacunarity, PERLIN_LACUNARITY_RANGE.0, PERLIN_LACUNARITY_RANGE.1
        ));
    }

    errors
}

/// Violations of the simplex-style parameter bounds.
pub fn validate_simplex_params(p: &SimplexParams) -> Vec<String> {
    let mut errors = Vec::new();

    if !(SIMPLEX_SCALE_RANGE.0..=SIMPLEX_SCALE_RANGE.1).contains(&p.scale) {
        errors.push(format!(
            "simplex scale {} outside valid range [{}, {}]",
            p.scale, SIMPLEX_SCALE_RANGE.0, SIMPLEX_SCALE_RANGE.1
        ));
    }
    if !(SIMPLEX_OCTAVES_RANGE.0..=SIMPLEX_OCTAVES_RANGE.1).contains(&p.octaves) {
        errors.push(format!(
            "simplex octaves {} outside valid range [{}, {}]",
            p.octaves, SIMPLEX_OCTAVES_RANGE.0, SIMPLEX_OCTAVES_RANGE.1
        ));
    }
    if !(SIMPLEX_PERSISTENCE_RANGE.0..=SIMPLEX_PERSISTENCE_RANGE.1).contains(&p.persistence) {
        errors.push(format!(
            "simplex persistence {} outside valid range [{}, {}]",
            p.persistence, SIMPLEX_PERSISTENCE_RANGE.0, SIMPLEX_PERSISTENCE_RANGE.1
        ));
    }
    if !(SIMPLEX_LACUNARITY_RANGE.0..=SIMPLEX_LACUNARITY_RANGE.1).contains(&p.lacunarity) {
        errors.push(format!(
            "simplex lacunarity {} outside valid range [{}, {}]",
            p.lacunarity, SIMPLEX_LACUNARITY_RANGE.0, SIMPLEX_LACUNARITY_RANGE.1
        ));
    }

    errors
}

/// Violations of the cellular parameter bounds. Distance function and cell
/// type are typed enums here, so only the frequency can go wrong.
pub fn validate_worley_params(p: &WorleyParams) -> Vec<String> {
    let mut errors = Vec::new();

    if !(WORLEY_FREQUENCY_RANGE.0..=WORLEY_FREQUENCY_RANGE.1).contains(&p.frequency) {
        errors.push(format!(
            "worley frequency {} outside valid range [{}, {}]",
            p.frequency, WORLEY_FREQUENCY_RANGE.0, WORLEY_FREQUENCY_RANGE.1
        ));
    }

    errors
}

/// Validate a plate generation request. Collects every violation.
pub fn validate_plate_request(request: &PlateRequest) -> Result<(), GenerationError> {
    let mut errors = Vec::new();

    let (dim_min, dim_max) = GRID_DIMENSION_RANGE;
    if request.grid_width < dim_min || request.grid_width > dim_max {
        errors.push(format!(
            "grid width {} outside valid range [{dim_min}, {dim_max}]",
            request.grid_width
        ));
    }
    if request.grid_height < dim_min || request.grid_height > dim_max {
        errors.push(format!(
            "grid height {} outside valid range [{dim_min}, {dim_max}]",
            request.grid_height
        ));
    }

    // Each plate needs roughly a hundred cells of room.
    let min_grid_size = ((request.min_plates * 100) as f64).sqrt() as usize;
    if request.grid_width < min_grid_size || request.grid_height < min_grid_size {
        errors.push(format!(
            "grid too small for {} plates, minimum size {min_grid_size}x{min_grid_size}",
            request.min_plates
        ));
    }

    if request.sensitivity < SENSITIVITY_RANGE.0 || request.sensitivity > SENSITIVITY_RANGE.1 {
        errors.push(format!(
            "sensitivity {} outside valid range [{}, {}]",
            request.sensitivity, SENSITIVITY_RANGE.0, SENSITIVITY_RANGE.1
        ));
    }

    if request.min_plates < MIN_PLATES_FLOOR {
        errors.push(format!(
            "minimum plates must be at least {MIN_PLATES_FLOOR}"
        ));
    }
    if request.max_plates > MAX_PLATES_CEILING {
        errors.push(format!(
            "maximum plates cannot exceed {MAX_PLATES_CEILING}"
        ));
    }
    if request.min_plates > request.max_plates {
        errors.push("minimum plates cannot exceed maximum plates".to_string());
    }

    if let Some(seed) = request.seed {
        if seed > SEED_MAX {
            errors.push(format!("seed {seed} outside valid range [0, {SEED_MAX}]"));
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(GenerationError::Validation(errors))
    }
}
