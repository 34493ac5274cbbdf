use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

/// Boundary character of the grown plates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Complexity {
    /// Geometric shapes with smooth borders.
    Low,
    /// Natural shapes with moderate irregularity.
    #[default]
    Medium,
    /// Highly irregular, fractal-looking borders.
    High,
}

impl Complexity {
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(Self::Low),
            "medium" => Some(Self::Medium),
            "high" => Some(Self::High),
            _ => None,
        }
    }

    /// Lenient parse for the sanitize path: unknown names coerce to the
    /// documented default.
    pub fn parse_lenient(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Uniform-random jitter scale added to growth priorities.
    pub fn jitter_scale(&self) -> f64 {
        match self {
            Self::Low => 0.0,
            Self::Medium => 0.1,
            Self::High => 0.3,
        }
    }

    /// Majority-vote smoothing passes run after growth.
    pub fn smoothing_passes(&self) -> usize {
        match self {
            Self::Low => 3,
            Self::Medium => 1,
            Self::High => 0,
        }
    }
}

impl std::fmt::Display for Complexity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Low => write!(f, "low"),
            Self::Medium => write!(f, "medium"),
            Self::High => write!(f, "high"),
        }
    }
}

/// Geological color palette for plate rendering. Thirty entries; the
/// coloring pass cycles with a counter if a plate's neighbors ever exhaust
/// it.
pub const PLATE_COLORS: [&str; 30] = [
    "#8B7355", // Saddle brown
    "#6B8E5A", // Olive green
    "#7A8B99", // Blue gray
    "#9B7A8B", // Dusty rose
    "#8B8B6B", // Dark beige
    "#6B7A8B", // Slate blue
    "#8B7A6B", // Light brown
    "#7A8B7A", // Sage green
    "#99887A", // Warm gray
    "#7A7A8B", // Cool gray
    "#8B997A", // Khaki
    "#7A8B8B", // Teal gray
    "#8B7A7A", // Rosy brown
    "#7A997A", // Moss green
    "#997A8B", // Mauve
    "#8B8B7A", // Sand
    "#7A8B6B", // Olive gray
    "#8B7A99", // Lavender gray
    "#6B7A7A", // Dark sage
    "#997A7A", // Dusty pink
    "#7A996B", // Yellow green
    "#8B6B7A", // Plum gray
    "#7A7A99", // Periwinkle gray
    "#996B7A", // Rose gray
    "#7A8B7A", // Mint gray
    "#8B7A8B", // Taupe
    "#7A7A7A", // Medium gray
    "#8B8B8B", // Light gray
    "#6B6B6B", // Dark gray
    "#999999", // Silver
];

/// One tectonic plate, as a read-only view over the final grid state.
#[derive(Clone, Debug)]
pub struct TectonicPlate {
    /// Positive, unique within one generation.
    pub id: i32,
    /// Member coordinates in row-major scan order.
    pub hexagons: Vec<(usize, usize)>,
    /// Cached `hexagons.len()`.
    pub size: usize,
    /// Other plate ids sharing a hex adjacency.
    pub neighbors: BTreeSet<i32>,
    /// Palette color; adjacent plates differ whenever the palette suffices.
    pub color: String,
}

impl TectonicPlate {
    /// Arithmetic mean of the member coordinates, rounded to 2 decimals.
    pub fn center(&self) -> (f64, f64) {
        if self.hexagons.is_empty() {
            return (0.0, 0.0);
        }
        let n = self.hexagons.len() as f64;
        let cx = self.hexagons.iter().map(|&(x, _)| x as f64).sum::<f64>() / n;
        let cy = self.hexagons.iter().map(|&(_, y)| y as f64).sum::<f64>() / n;
        ((cx * 100.0).round() / 100.0, (cy * 100.0).round() / 100.0)
    }
}

/// A plate-generation request, as the transport layer hands it over.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PlateRequest {
    /// Base64-encoded single-channel raster, optionally with a data-URL
    /// prefix.
    pub noise_data: String,
    pub grid_width: usize,
    pub grid_height: usize,
    /// Growth sensitivity; lower values hug the field, higher values grow
    /// fewer, larger plates.
    pub sensitivity: f64,
    pub min_plates: usize,
    pub max_plates: usize,
    pub complexity: Complexity,
    pub wrap_edges: bool,
    pub seed: Option<u32>,
}

impl Default for PlateRequest {
    fn default() -> Self {
        Self {
            noise_data: String::new(),
            grid_width: 100,
            grid_height: 100,
            sensitivity: 0.15,
            min_plates: 4,
            max_plates: 20,
            complexity: Complexity::Medium,
            wrap_edges: false,
            seed: None,
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GridSize {
    pub width: usize,
    pub height: usize,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlateMetadata {
    pub grid_size: GridSize,
    pub total_hexagons: usize,
    pub plate_count: usize,
    pub wrap_edges: bool,
}

/// Per-plate summary in the serialized model.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlateSummary {
    pub id: i32,
    pub size: usize,
    pub neighbors: Vec<i32>,
    pub color: String,
    pub center: (f64, f64),
}

/// The full serializable result of one plate generation.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PlateModel {
    pub metadata: PlateMetadata,
    pub plates: Vec<PlateSummary>,
    /// Row-major label array; every entry names a plate in `plates`.
    pub grid: Vec<Vec<i32>>,
    /// Plate id (stringified) to palette color.
    pub colors: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn complexity_parsing() {
        assert_eq!(Complexity::from_str("LOW"), Some(Complexity::Low));
        assert_eq!(Complexity::from_str("weird"), None);
        assert_eq!(Complexity::parse_lenient("weird"), Complexity::Medium);
    }

    #[test]
    fn complexity_knobs() {
        assert_eq!(Complexity::Low.smoothing_passes(), 3);
        assert_eq!(Complexity::Medium.smoothing_passes(), 1);
        assert_eq!(Complexity::High.smoothing_passes(), 0);
        assert_eq!(Complexity::Low.jitter_scale(), 0.0);
        assert!(Complexity::High.jitter_scale() > Complexity::Medium.jitter_scale());
    }

    #[test]
    fn plate_center_is_mean_of_members() {
        let plate = TectonicPlate {
            id: 1,
            hexagons: vec![(0, 0), (2, 0), (0, 2), (2, 2)],
            size: 4,
            neighbors: BTreeSet::new(),
            color: PLATE_COLORS[0].to_string(),
        };
        assert_eq!(plate.center(), (1.0, 1.0));

        let empty = TectonicPlate {
            id: 2,
            hexagons: vec![],
            size: 0,
            neighbors: BTreeSet::new(),
            color: PLATE_COLORS[1].to_string(),
        };
        assert_eq!(empty.center(), (0.0, 0.0));
    }

    #[test]
    fn request_defaults_deserialize() {
        let req: PlateRequest = serde_json::from_str(r#"{"noise_data": "abc"}"#).unwrap();
        assert_eq!(req.grid_width, 100);
        assert_eq!(req.sensitivity, 0.15);
        assert_eq!(req.complexity, Complexity::Medium);
        assert!(!req.wrap_edges);
    }
}
