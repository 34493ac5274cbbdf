pub mod generator;
pub mod types;

pub use generator::{assign_plate_colors, generate_plates};
pub use types::{
    Complexity, GridSize, PlateMetadata, PlateModel, PlateRequest, PlateSummary, TectonicPlate,
    PLATE_COLORS,
};
