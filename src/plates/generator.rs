use std::collections::{BTreeMap, BTreeSet};

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use tracing::{debug, info};

use crate::codec;
use crate::error::GenerationError;
use crate::hexgrid::HexGrid;
use crate::validation::validate_plate_request;
use crate::watershed;

use super::types::{
    GridSize, PlateMetadata, PlateModel, PlateRequest, PlateSummary, TectonicPlate, PLATE_COLORS,
};

/// Generate tectonic plates from an encoded noise field.
///
/// Validates the request, decodes the field and resamples it onto the hex
/// grid, runs watershed segmentation with automatic sensitivity retry until
/// the plate count lands in `[min_plates, max_plates]`, then derives the
/// read-only plate model with a proper coloring.
///
/// Each call owns its grid and rng; concurrent requests share nothing.
pub fn generate_plates(request: &PlateRequest) -> Result<PlateModel, GenerationError> {
    validate_plate_request(request)?;

    let mut rng = match request.seed {
        Some(s) => ChaCha8Rng::seed_from_u64(s as u64),
        None => ChaCha8Rng::from_entropy(),
    };

    let field = codec::decode_field(&request.noise_data)?;
    let field = field.resize_bilinear(request.grid_width, request.grid_height);

    let mut grid = HexGrid::new(request.grid_width, request.grid_height, request.wrap_edges);

    // Aim for the middle of the requested range first.
    let target_plates = (request.min_plates + request.max_plates) / 2;
    watershed::segment(
        &mut grid,
        &field,
        request.sensitivity,
        target_plates,
        request.complexity,
        &mut rng,
    );

    let count = grid.plate_count();
    if count < request.min_plates {
        debug!(count, min = request.min_plates, "too few plates, rerunning at lower sensitivity");
        watershed::segment(
            &mut grid,
            &field,
            request.sensitivity * 0.7,
            request.min_plates,
            request.complexity,
            &mut rng,
        );
    } else if count > request.max_plates {
        debug!(count, max = request.max_plates, "too many plates, rerunning at higher sensitivity");
        watershed::segment(
            &mut grid,
            &field,
            request.sensitivity * 1.5,
            request.max_plates,
            request.complexity,
            &mut rng,
        );

        if grid.plate_count() > request.max_plates {
            let min_size = request.grid_width * request.grid_height / request.max_plates / 2;
            watershed::merge_small_plates(&mut grid, min_size);
        }
    }

    let plates = build_plates(&grid)?;
    info!(plate_count = plates.len(), "plate generation complete");

    Ok(build_model(&grid, &plates))
}

/// Derive the plate objects from the final grid state.
fn build_plates(grid: &HexGrid) -> Result<Vec<TectonicPlate>, GenerationError> {
    let hexagons = grid.plate_hexagons();
    let sizes = grid.plate_sizes();
    let neighbors = grid.plate_neighbors();
    let colors = assign_plate_colors(&neighbors);

    let mut plates = Vec::new();
    for (&plate_id, hexes) in &hexagons {
        if plate_id <= 0 {
            continue;
        }

        let color = colors.get(&plate_id).cloned().ok_or_else(|| {
            GenerationError::Internal(format!("plate {plate_id} has no color assignment"))
        })?;

        plates.push(TectonicPlate {
            id: plate_id,
            hexagons: hexes.clone(),
            size: sizes.get(&plate_id).copied().unwrap_or(hexes.len()),
            neighbors: neighbors
                .get(&plate_id)
                .map(|set| set.iter().copied().filter(|&n| n > 0).collect())
                .unwrap_or_default(),
            color,
        });
    }

    Ok(plates)
}

/// Deterministic greedy proper coloring.
///
/// Plates are colored most-constrained first (descending neighbor count,
/// ascending id on ties); each takes the first palette color no colored
/// neighbor uses. Should a plate's neighbors exhaust all thirty colors,
/// colors come from a cycling counter and an adjacent collision becomes
/// possible. That degraded mode only triggers when local neighbor-color
/// pressure exceeds the palette size.
pub fn assign_plate_colors(
    neighbors: &BTreeMap<i32, BTreeSet<i32>>,
) -> BTreeMap<i32, String> {
    let mut order: Vec<i32> = neighbors.keys().copied().filter(|&id| id > 0).collect();
    order.sort_by_key(|id| std::cmp::Reverse(neighbors[id].len()));

    let mut colors: BTreeMap<i32, String> = BTreeMap::new();
    let mut overflow = 0usize;

    for plate_id in order {
        let used: BTreeSet<&str> = neighbors[&plate_id]
            .iter()
            .filter_map(|n| colors.get(n))
            .map(|s| s.as_str())
            .collect();

        let assigned = match PLATE_COLORS.iter().find(|&&c| !used.contains(c)) {
            Some(&c) => c.to_string(),
            None => {
                let c = PLATE_COLORS[overflow % PLATE_COLORS.len()].to_string();
                overflow += 1;
                c
            }
        };

        colors.insert(plate_id, assigned);
    }

    colors
}

fn build_model(grid: &HexGrid, plates: &[TectonicPlate]) -> PlateModel {
    PlateModel {
        metadata: PlateMetadata {
            grid_size: GridSize {
                width: grid.width,
                height: grid.height,
            },
            total_hexagons: grid.width * grid.height,
            plate_count: plates.len(),
            wrap_edges: grid.wrap_edges,
        },
        plates: plates
            .iter()
            .map(|p| PlateSummary {
                id: p.id,
                size: p.size,
                neighbors: p.neighbors.iter().copied().collect(),
                color: p.color.clone(),
                center: p.center(),
            })
            .collect(),
        grid: grid.labels().to_rows(),
        colors: plates
            .iter()
            .map(|p| (p.id.to_string(), p.color.clone()))
            .collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::noisegen::{generate_worley_plates, WorleyParams};
    use crate::plates::Complexity;

    fn encoded_test_field(seed: u32) -> String {
        let params = WorleyParams {
            frequency: 0.1,
            ..WorleyParams::default()
        };
        let field = generate_worley_plates(64, 64, &params, Some(seed));
        codec::encode_field(&field).unwrap()
    }

    fn test_request(seed: u32) -> PlateRequest {
        PlateRequest {
            noise_data: encoded_test_field(seed),
            grid_width: 40,
            grid_height: 40,
            sensitivity: 0.15,
            min_plates: 4,
            max_plates: 20,
            complexity: Complexity::Medium,
            wrap_edges: false,
            seed: Some(seed),
        }
    }

    #[test]
    fn generates_plate_count_within_requested_range() {
        let model = generate_plates(&test_request(42)).unwrap();
        assert!(model.metadata.plate_count >= 4);
        assert!(model.metadata.plate_count <= 20);
        assert_eq!(model.metadata.plate_count, model.plates.len());
    }

    #[test]
    fn model_grid_is_fully_labeled_and_consistent() {
        let model = generate_plates(&test_request(42)).unwrap();

        assert_eq!(model.grid.len(), 40);
        assert!(model.grid.iter().all(|row| row.len() == 40));
        assert_eq!(model.metadata.total_hexagons, 1600);

        let known: BTreeSet<i32> = model.plates.iter().map(|p| p.id).collect();
        for row in &model.grid {
            for &label in row {
                assert!(label > 0);
                assert!(known.contains(&label), "grid label {label} has no plate");
            }
        }

        let total: usize = model.plates.iter().map(|p| p.size).sum();
        assert_eq!(total, 1600);
    }

    #[test]
    fn generation_is_deterministic_for_fixed_seed() {
        let request = test_request(7);
        let a = serde_json::to_string(&generate_plates(&request).unwrap()).unwrap();
        let b = serde_json::to_string(&generate_plates(&request).unwrap()).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn adjacent_plates_never_share_a_color() {
        let model = generate_plates(&test_request(13)).unwrap();

        let colors: BTreeMap<i32, &str> = model
            .plates
            .iter()
            .map(|p| (p.id, p.color.as_str()))
            .collect();

        for plate in &model.plates {
            for neighbor in &plate.neighbors {
                assert_ne!(
                    colors[&plate.id], colors[neighbor],
                    "plates {} and {} share a color",
                    plate.id, neighbor
                );
            }
        }
    }

    #[test]
    fn neighbor_relation_is_symmetric_in_model() {
        let model = generate_plates(&test_request(5)).unwrap();
        let by_id: BTreeMap<i32, &PlateSummary> =
            model.plates.iter().map(|p| (p.id, p)).collect();

        for plate in &model.plates {
            for neighbor in &plate.neighbors {
                assert!(by_id[neighbor].neighbors.contains(&plate.id));
            }
        }
    }

    #[test]
    fn colors_map_matches_plate_colors() {
        let model = generate_plates(&test_request(21)).unwrap();
        for plate in &model.plates {
            assert_eq!(model.colors[&plate.id.to_string()], plate.color);
        }
    }

    #[test]
    fn invalid_request_is_rejected_with_itemized_errors() {
        let request = PlateRequest {
            noise_data: encoded_test_field(1),
            grid_width: 10,
            grid_height: 600,
            sensitivity: 0.9,
            min_plates: 25,
            max_plates: 5,
            ..PlateRequest::default()
        };

        let err = generate_plates(&request).unwrap_err();
        assert_eq!(err.kind(), "validation");
        // Width, height, sensitivity, and plate ordering all violated.
        assert!(err.violations().len() >= 4);
    }

    #[test]
    fn malformed_payload_is_an_internal_error() {
        let request = PlateRequest {
            noise_data: "not base64 at all!!!".to_string(),
            grid_width: 40,
            grid_height: 40,
            ..PlateRequest::default()
        };

        let err = generate_plates(&request).unwrap_err();
        assert_eq!(err.kind(), "internal");
    }

    #[test]
    fn wrapped_grids_segment_successfully() {
        let mut request = test_request(3);
        request.wrap_edges = true;
        let model = generate_plates(&request).unwrap();
        assert!(model.metadata.wrap_edges);
        assert!(model.metadata.plate_count >= 4);
    }

    #[test]
    fn coloring_handles_a_triangle_graph() {
        let mut neighbors: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
        neighbors.insert(1, [2, 3].into_iter().collect());
        neighbors.insert(2, [1, 3].into_iter().collect());
        neighbors.insert(3, [1, 2].into_iter().collect());

        let colors = assign_plate_colors(&neighbors);
        assert_eq!(colors.len(), 3);
        assert_ne!(colors[&1], colors[&2]);
        assert_ne!(colors[&1], colors[&3]);
        assert_ne!(colors[&2], colors[&3]);
    }

    #[test]
    fn coloring_ignores_unassigned_label() {
        let mut neighbors: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();
        neighbors.insert(-1, [1].into_iter().collect());
        neighbors.insert(1, [-1].into_iter().collect());

        let colors = assign_plate_colors(&neighbors);
        assert!(colors.contains_key(&1));
        assert!(!colors.contains_key(&-1));
    }
}
