use std::collections::{BTreeMap, BTreeSet};

use crate::raster::Raster;

/// Label value for cells no region has claimed yet.
pub const UNASSIGNED: i32 = -1;

/// Flat-topped hexagonal grid in offset coordinates.
///
/// Owns the plate label array and the noise values segmentation reads.
/// With `wrap_edges` the grid is a torus: every cell has exactly six
/// neighbors, each coordinate wrapped independently. Without it, border
/// cells simply have fewer neighbors.
pub struct HexGrid {
    pub width: usize,
    pub height: usize,
    pub wrap_edges: bool,
    labels: Raster<i32>,
    noise: Raster<f64>,
}

// Neighbor offsets mirror between even and odd rows: left, right,
// top-left, top-right, bottom-left, bottom-right.
const EVEN_ROW_OFFSETS: [(i64, i64); 6] =
    [(-1, 0), (1, 0), (0, -1), (1, -1), (0, 1), (1, 1)];
const ODD_ROW_OFFSETS: [(i64, i64); 6] =
    [(-1, 0), (1, 0), (-1, -1), (0, -1), (-1, 1), (0, 1)];

impl HexGrid {
    pub fn new(width: usize, height: usize, wrap_edges: bool) -> Self {
        Self {
            width,
            height,
            wrap_edges,
            labels: Raster::new_with(width, height, UNASSIGNED),
            noise: Raster::new_with(width, height, 0.0),
        }
    }

    pub fn label(&self, x: usize, y: usize) -> i32 {
        *self.labels.get(x, y)
    }

    pub fn set_label(&mut self, x: usize, y: usize, label: i32) {
        self.labels.set(x, y, label);
    }

    pub fn fill_labels(&mut self, label: i32) {
        self.labels.fill(label);
    }

    pub fn labels(&self) -> &Raster<i32> {
        &self.labels
    }

    pub fn noise_value(&self, x: usize, y: usize) -> f64 {
        *self.noise.get(x, y)
    }

    /// Replace the stored noise values. The field must match the grid shape.
    pub fn set_noise_field(&mut self, field: &Raster<f64>) {
        assert_eq!(
            (field.width, field.height),
            (self.width, self.height),
            "noise field shape must match grid"
        );
        self.noise = field.clone();
    }

    /// All neighbors of a hexagon, up to six.
    ///
    /// Offsets depend on row parity. When wrapping, all six coordinates are
    /// returned, each wrapped modulo the grid dimensions; otherwise
    /// out-of-bounds candidates are dropped.
    pub fn neighbors(&self, x: usize, y: usize) -> Vec<(usize, usize)> {
        let offsets = if y % 2 == 0 {
            &EVEN_ROW_OFFSETS
        } else {
            &ODD_ROW_OFFSETS
        };

        let mut result = Vec::with_capacity(6);
        for &(dx, dy) in offsets {
            let nx = x as i64 + dx;
            let ny = y as i64 + dy;

            if self.wrap_edges {
                result.push((
                    nx.rem_euclid(self.width as i64) as usize,
                    ny.rem_euclid(self.height as i64) as usize,
                ));
            } else if nx >= 0 && nx < self.width as i64 && ny >= 0 && ny < self.height as i64 {
                result.push((nx as usize, ny as usize));
            }
        }

        result
    }

    /// Stack-based flood fill from a seed cell.
    ///
    /// Grows through neighbors whose noise value differs from the seed's by
    /// at most `threshold`, assigning `plate_id` to every visited cell.
    /// Returns the visited cells in visit order. Utility only; the main
    /// segmentation path grows by priority instead.
    pub fn flood_fill(
        &mut self,
        start_x: usize,
        start_y: usize,
        plate_id: i32,
        threshold: f64,
    ) -> Vec<(usize, usize)> {
        let base_value = self.noise_value(start_x, start_y);
        let mut visited = vec![false; self.width * self.height];
        let mut filled = Vec::new();
        let mut stack = vec![(start_x, start_y)];

        while let Some((x, y)) = stack.pop() {
            let idx = y * self.width + x;
            if visited[idx] {
                continue;
            }
            visited[idx] = true;

            self.set_label(x, y, plate_id);
            filled.push((x, y));

            for (nx, ny) in self.neighbors(x, y) {
                if !visited[ny * self.width + nx]
                    && (self.noise_value(nx, ny) - base_value).abs() <= threshold
                {
                    stack.push((nx, ny));
                }
            }
        }

        filled
    }

    /// Merge away small isolated same-label components.
    ///
    /// Scans the current label array for maximal connected components; any
    /// component under `min_size` is reassigned wholesale to the
    /// different-labeled neighbor that touches it most often. Ties resolve
    /// to the lowest such label, which keeps the pass deterministic for a
    /// fixed grid state.
    pub fn eliminate_exclaves(&mut self, min_size: usize) {
        let mut visited = vec![false; self.width * self.height];
        let mut components: Vec<(i32, Vec<(usize, usize)>)> = Vec::new();

        for y in 0..self.height {
            for x in 0..self.width {
                if visited[y * self.width + x] {
                    continue;
                }

                let plate_id = self.label(x, y);
                let mut component = Vec::new();
                let mut stack = vec![(x, y)];

                while let Some((cx, cy)) = stack.pop() {
                    let idx = cy * self.width + cx;
                    if visited[idx] || self.label(cx, cy) != plate_id {
                        continue;
                    }
                    visited[idx] = true;
                    component.push((cx, cy));

                    for (nx, ny) in self.neighbors(cx, cy) {
                        if !visited[ny * self.width + nx] {
                            stack.push((nx, ny));
                        }
                    }
                }

                components.push((plate_id, component));
            }
        }

        for (plate_id, component) in components {
            if component.len() >= min_size {
                continue;
            }

            let mut neighbor_counts: BTreeMap<i32, usize> = BTreeMap::new();
            for &(x, y) in &component {
                for (nx, ny) in self.neighbors(x, y) {
                    let neighbor_id = self.label(nx, ny);
                    if neighbor_id != plate_id {
                        *neighbor_counts.entry(neighbor_id).or_insert(0) += 1;
                    }
                }
            }

            let mut best: Option<(i32, usize)> = None;
            for (&id, &count) in &neighbor_counts {
                if best.map_or(true, |(_, best_count)| count > best_count) {
                    best = Some((id, count));
                }
            }

            if let Some((new_plate_id, _)) = best {
                for (x, y) in component {
                    self.set_label(x, y, new_plate_id);
                }
            }
        }
    }

    /// For every label, the set of distinct other labels adjacent to it.
    pub fn plate_neighbors(&self) -> BTreeMap<i32, BTreeSet<i32>> {
        let mut neighbors: BTreeMap<i32, BTreeSet<i32>> = BTreeMap::new();

        for y in 0..self.height {
            for x in 0..self.width {
                let plate_id = self.label(x, y);
                let entry = neighbors.entry(plate_id).or_default();

                for (nx, ny) in self.neighbors(x, y) {
                    let neighbor_id = self.label(nx, ny);
                    if neighbor_id != plate_id {
                        entry.insert(neighbor_id);
                    }
                }
            }
        }

        neighbors
    }

    /// Cell count per label, from one full grid scan.
    pub fn plate_sizes(&self) -> BTreeMap<i32, usize> {
        let mut sizes = BTreeMap::new();
        for (_, _, &id) in self.labels.iter() {
            *sizes.entry(id).or_insert(0) += 1;
        }
        sizes
    }

    /// Member coordinates per label, in row-major scan order.
    pub fn plate_hexagons(&self) -> BTreeMap<i32, Vec<(usize, usize)>> {
        let mut hexagons: BTreeMap<i32, Vec<(usize, usize)>> = BTreeMap::new();
        for (x, y, &id) in self.labels.iter() {
            hexagons.entry(id).or_default().push((x, y));
        }
        hexagons
    }

    /// Number of distinct positive labels on the grid.
    pub fn plate_count(&self) -> usize {
        self.plate_sizes().keys().filter(|&&id| id > 0).count()
    }
}

/// Pixel center of a flat-topped hexagon. Odd rows shift right by half a
/// hex.
pub fn hex_to_pixel(x: usize, y: usize, hex_size: f64) -> (f64, f64) {
    let offset = if y % 2 == 1 { hex_size * 0.5 } else { 0.0 };
    let px = hex_size * 1.5 * x as f64 + offset;
    let py = hex_size * 3.0f64.sqrt() * y as f64;
    (px, py)
}

/// Inverse of `hex_to_pixel`: the hexagon whose center is closest to a
/// pixel position under the same layout.
pub fn pixel_to_hex(px: f64, py: f64, hex_size: f64) -> (i64, i64) {
    let y = (py / (hex_size * 3.0f64.sqrt())).round() as i64;
    let offset = if y.rem_euclid(2) == 1 { hex_size * 0.5 } else { 0.0 };
    let x = ((px - offset) / (hex_size * 1.5)).round() as i64;
    (x, y)
}

/// The six corner vertices of a hexagon, for rendering and hit testing.
pub fn hex_vertices(x: usize, y: usize, hex_size: f64) -> [(f64, f64); 6] {
    let (cx, cy) = hex_to_pixel(x, y, hex_size);
    let mut vertices = [(0.0, 0.0); 6];
    for (i, v) in vertices.iter_mut().enumerate() {
        let angle = std::f64::consts::PI / 3.0 * i as f64;
        *v = (cx + hex_size * angle.cos(), cy + hex_size * angle.sin());
    }
    vertices
}
