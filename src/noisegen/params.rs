use serde::{Deserialize, Serialize};

/// Documented parameter bounds for the gradient (Perlin-style) generator.
pub const PERLIN_SCALE_RANGE: (f64, f64) = (0.001, 0.1);
pub const PERLIN_OCTAVES_RANGE: (u32, u32) = (1, 6);
pub const PERLIN_PERSISTENCE_RANGE: (f64, f64) = (0.1, 0.8);
pub const PERLIN_LACUNARITY_RANGE: (f64, f64) = (1.5, 3.0);

/// Documented parameter bounds for the simplex-style generator.
pub const SIMPLEX_SCALE_RANGE: (f64, f64) = (0.005, 0.05);
pub const SIMPLEX_OCTAVES_RANGE: (u32, u32) = (2, 8);
pub const SIMPLEX_PERSISTENCE_RANGE: (f64, f64) = (0.2, 0.7);
pub const SIMPLEX_LACUNARITY_RANGE: (f64, f64) = (2.0, 4.0);

/// Documented parameter bounds for the cellular (Worley-style) generator.
pub const WORLEY_FREQUENCY_RANGE: (f64, f64) = (0.05, 0.5);

/// Seeds are non-negative and bounded so they survive every transport layer.
pub const SEED_MAX: u32 = 999_999;

/// Largest supported field resolution per axis.
pub const MAX_RESOLUTION: usize = 4096;

fn clamp_f64(value: f64, range: (f64, f64)) -> f64 {
    value.clamp(range.0, range.1)
}

fn clamp_u32(value: u32, range: (u32, u32)) -> u32 {
    value.clamp(range.0, range.1)
}

/// Distance metric for the cellular generator.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DistanceFunction {
    #[default]
    Euclidean,
    Manhattan,
    Chebyshev,
}

impl DistanceFunction {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "euclidean" => Some(Self::Euclidean),
            "manhattan" => Some(Self::Manhattan),
            "chebyshev" => Some(Self::Chebyshev),
            _ => None,
        }
    }

    /// Lenient parse for the sanitize path: unknown names coerce to the
    /// documented default.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Distance between two points under this metric.
    pub fn distance(&self, dx: f64, dy: f64) -> f64 {
        match self {
            Self::Euclidean => (dx * dx + dy * dy).sqrt(),
            Self::Manhattan => dx.abs() + dy.abs(),
            Self::Chebyshev => dx.abs().max(dy.abs()),
        }
    }
}

impl std::fmt::Display for DistanceFunction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Euclidean => write!(f, "euclidean"),
            Self::Manhattan => write!(f, "manhattan"),
            Self::Chebyshev => write!(f, "chebyshev"),
        }
    }
}

/// Which nearest-point distance a cellular field reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CellType {
    #[default]
    #[serde(rename = "F1")]
    F1,
    #[serde(rename = "F2")]
    F2,
    #[serde(rename = "F1-F2")]
    F1MinusF2,
}

impl CellType {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_uppercase().as_str() {
            "F1" => Some(Self::F1),
            "F2" => Some(Self::F2),
            "F1-F2" => Some(Self::F1MinusF2),
            _ => None,
        }
    }

    /// Lenient parse for the sanitize path.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }
}

impl std::fmt::Display for CellType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::F1 => write!(f, "F1"),
            Self::F2 => write!(f, "F2"),
            Self::F1MinusF2 => write!(f, "F1-F2"),
        }
    }
}

/// Gradient-noise parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PerlinParams {
    /// Detail level; lower values produce broader features.
    pub scale: f64,
    /// Number of fractal layers.
    pub octaves: u32,
    /// Per-octave amplitude falloff.
    pub persistence: f64,
    /// Per-octave frequency multiplier.
    pub lacunarity: f64,
}

impl Default for PerlinParams {
    fn default() -> Self {
        Self {
            scale: 0.05,
            octaves: 4,
            persistence: 0.5,
            lacunarity: 2.0,
        }
    }
}

impl PerlinParams {
    /// Clamp every field into its documented closed interval. Never fails;
    /// this is the generator-side guard, distinct from strict validation.
    pub fn sanitized(&self) -> Self {
        Self {
            scale: clamp_f64(self.scale, PERLIN_SCALE_RANGE),
            octaves: clamp_u32(self.octaves, PERLIN_OCTAVES_RANGE),
            persistence: clamp_f64(self.persistence, PERLIN_PERSISTENCE_RANGE),
            lacunarity: clamp_f64(self.lacunarity, PERLIN_LACUNARITY_RANGE),
        }
    }
}

/// Simplex-style noise parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimplexParams {
    pub scale: f64,
    pub octaves: u32,
    pub persistence: f64,
    pub lacunarity: f64,
}

impl Default for SimplexParams {
    fn default() -> Self {
        Self {
            scale: 0.02,
            octaves: 5,
            persistence: 0.4,
            lacunarity: 3.0,
        }
    }
}

impl SimplexParams {
    pub fn sanitized(&self) -> Self {
        Self {
            scale: clamp_f64(self.scale, SIMPLEX_SCALE_RANGE),
            octaves: clamp_u32(self.octaves, SIMPLEX_OCTAVES_RANGE),
            persistence: clamp_f64(self.persistence, SIMPLEX_PERSISTENCE_RANGE),
            lacunarity: clamp_f64(self.lacunarity, SIMPLEX_LACUNARITY_RANGE),
        }
    }
}

/// Cellular (Worley-style) noise parameters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorleyParams {
    /// Virtual cell frequency; cell size is `1 / frequency`.
    pub frequency: f64,
    pub distance_function: DistanceFunction,
    pub cell_type: CellType,
}

impl Default for WorleyParams {
    fn default() -> Self {
        Self {
            frequency: 0.1,
            distance_function: DistanceFunction::Euclidean,
            cell_type: CellType::F1,
        }
    }
}

impl WorleyParams {
    pub fn sanitized(&self) -> Self {
        Self {
            frequency: clamp_f64(self.frequency, WORLEY_FREQUENCY_RANGE),
            distance_function: self.distance_function,
            cell_type: self.cell_type,
        }
    }
}

/// Parameters for one noise generation request, tagged by algorithm.
///
/// Serializes as `{"algorithm": "...", "parameters": {...}}`, the shape the
/// request contract exchanges.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "algorithm", content = "parameters", rename_all = "lowercase")]
pub enum NoiseParams {
    Perlin(PerlinParams),
    Simplex(SimplexParams),
    Worley(WorleyParams),
}

impl NoiseParams {
    pub fn algorithm_name(&self) -> &'static str {
        match self {
            Self::Perlin(_) => "perlin",
            Self::Simplex(_) => "simplex",
            Self::Worley(_) => "worley",
        }
    }

    pub fn sanitized(&self) -> Self {
        match self {
            Self::Perlin(p) => Self::Perlin(p.sanitized()),
            Self::Simplex(p) => Self::Simplex(p.sanitized()),
            Self::Worley(p) => Self::Worley(p.sanitized()),
        }
    }
}

/// Clamp an arbitrary integer into the valid seed range. Negative values
/// coerce to the unset sentinel, matching the sanitize contract.
pub fn sanitize_seed(seed: Option<i64>) -> Option<u32> {
    seed.and_then(|s| {
        if s < 0 {
            None
        } else {
            Some((s.min(SEED_MAX as i64)) as u32)
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_clamps_out_of_range_perlin() {
        let wild = PerlinParams {
            scale: 2.0,
            octaves: 50,
            persistence: 0.0,
            lacunarity: 10.0,
        };
        let p = wild.sanitized();
        assert_eq!(p.scale, 0.1);
        assert_eq!(p.octaves, 6);
        assert_eq!(p.persistence, 0.1);
        assert_eq!(p.lacunarity, 3.0);
    }

    #[test]
    fn sanitize_is_identity_for_valid_params() {
        let p = SimplexParams::default();
        assert_eq!(p.sanitized(), p);
    }

    #[test]
    fn lenient_enum_parse_coerces_to_default() {
        assert_eq!(
            DistanceFunction::parse_lenient("hyperbolic"),
            DistanceFunction::Euclidean
        );
        assert_eq!(CellType::parse_lenient("F9"), CellType::F1);
        assert_eq!(CellType::parse_lenient("f1-f2"), CellType::F1MinusF2);
    }

    #[test]
    fn seed_sanitization() {
        assert_eq!(sanitize_seed(None), None);
        assert_eq!(sanitize_seed(Some(-5)), None);
        assert_eq!(sanitize_seed(Some(42)), Some(42));
        assert_eq!(sanitize_seed(Some(5_000_000)), Some(SEED_MAX));
    }

    #[test]
    fn noise_params_tagged_serialization() {
        let params = NoiseParams::Worley(WorleyParams::default());
        let json = serde_json::to_string(&params).unwrap();
        assert!(json.contains("\"algorithm\":\"worley\""));
        assert!(json.contains("\"cell_type\":\"F1\""));

        let back: NoiseParams = serde_json::from_str(&json).unwrap();
        assert_eq!(back, params);
    }

    #[test]
    fn distance_metrics() {
        assert!((DistanceFunction::Euclidean.distance(3.0, 4.0) - 5.0).abs() < 1e-12);
        assert_eq!(DistanceFunction::Manhattan.distance(3.0, -4.0), 7.0);
        assert_eq!(DistanceFunction::Chebyshev.distance(3.0, -4.0), 4.0);
    }
}
