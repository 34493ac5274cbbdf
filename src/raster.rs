/// A row-major 2D grid of values.
///
/// Backs both scalar noise fields (`Raster<f64>`) and plate label arrays
/// (`Raster<i32>`). Coordinates are not wrapped here; toroidal topology is
/// a hex-grid concern and handled there.
#[derive(Clone, Debug, PartialEq)]
pub struct Raster<T> {
    pub width: usize,
    pub height: usize,
    data: Vec<T>,
}

impl<T: Clone + Default> Raster<T> {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            data: vec![T::default(); width * height],
        }
    }
}

impl<T: Clone> Raster<T> {
    pub fn new_with(width: usize, height: usize, value: T) -> Self {
        Self {
            width,
            height,
            data: vec![value; width * height],
        }
    }

    #[inline]
    fn index(&self, x: usize, y: usize) -> usize {
        debug_assert!(x < self.width && y < self.height);
        y * self.width + x
    }

    pub fn get(&self, x: usize, y: usize) -> &T {
        &self.data[self.index(x, y)]
    }

    pub fn get_mut(&mut self, x: usize, y: usize) -> &mut T {
        let idx = self.index(x, y);
        &mut self.data[idx]
    }

    pub fn set(&mut self, x: usize, y: usize, value: T) {
        let idx = self.index(x, y);
        self.data[idx] = value;
    }

    /// Fill the entire raster with a value.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }

    pub fn as_slice(&self) -> &[T] {
        &self.data
    }

    pub fn as_mut_slice(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Iterate over all cells with their coordinates.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &T)> {
        self.data.iter().enumerate().map(move |(idx, val)| {
            let x = idx % self.width;
            let y = idx / self.width;
            (x, y, val)
        })
    }

    /// Extract one row per outer vec, for serialization as a nested array.
    pub fn to_rows(&self) -> Vec<Vec<T>> {
        self.data.chunks(self.width).map(|row| row.to_vec()).collect()
    }
}

impl Raster<f64> {
    /// Minimum and maximum value over the whole raster.
    pub fn min_max(&self) -> (f64, f64) {
        let mut min_v = f64::MAX;
        let mut max_v = f64::MIN;
        for &v in &self.data {
            if v < min_v {
                min_v = v;
            }
            if v > max_v {
                max_v = v;
            }
        }
        (min_v, max_v)
    }

    /// Min-max scale into [0, 1]. A constant raster maps to all zeros.
    pub fn normalized(&self) -> Raster<f64> {
        let (min_v, max_v) = self.min_max();
        let range = max_v - min_v;
        let mut out = self.clone();
        if range > 0.0 {
            for v in &mut out.data {
                *v = (*v - min_v) / range;
            }
        } else {
            out.fill(0.0);
        }
        out
    }

    /// Sample at fractional coordinates using bilinear interpolation.
    /// Coordinates are clamped to the raster bounds.
    pub fn sample_bilinear(&self, x: f64, y: f64) -> f64 {
        let x = x.clamp(0.0, (self.width - 1) as f64);
        let y = y.clamp(0.0, (self.height - 1) as f64);

        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);

        let fx = x - x0 as f64;
        let fy = y - y0 as f64;

        let v00 = *self.get(x0, y0);
        let v10 = *self.get(x1, y0);
        let v01 = *self.get(x0, y1);
        let v11 = *self.get(x1, y1);

        let v0 = v00 * (1.0 - fx) + v10 * fx;
        let v1 = v01 * (1.0 - fx) + v11 * fx;
        v0 * (1.0 - fy) + v1 * fy
    }

    /// Resample to new dimensions with bilinear interpolation.
    pub fn resize_bilinear(&self, width: usize, height: usize) -> Raster<f64> {
        if width == self.width && height == self.height {
            return self.clone();
        }

        let mut out = Raster::new_with(width, height, 0.0f64);
        let sx = if width > 1 {
            (self.width - 1) as f64 / (width - 1) as f64
        } else {
            0.0
        };
        let sy = if height > 1 {
            (self.height - 1) as f64 / (height - 1) as f64
        } else {
            0.0
        };

        for y in 0..height {
            for x in 0..width {
                let value = self.sample_bilinear(x as f64 * sx, y as f64 * sy);
                out.set(x, y, value);
            }
        }

        out
    }

    /// Separable Gaussian blur with edge clamping.
    /// Kernel radius is four standard deviations, matching the common
    /// image-filter truncation.
    pub fn gaussian_blur(&self, sigma: f64) -> Raster<f64> {
        if sigma <= 0.0 {
            return self.clone();
        }

        let radius = (sigma * 4.0).ceil() as i64;
        let mut kernel = Vec::with_capacity((2 * radius + 1) as usize);
        let mut sum = 0.0;
        for i in -radius..=radius {
            let w = (-(i * i) as f64 / (2.0 * sigma * sigma)).exp();
            kernel.push(w);
            sum += w;
        }
        for w in &mut kernel {
            *w /= sum;
        }

        let w = self.width as i64;
        let h = self.height as i64;

        // Horizontal pass
        let mut horizontal = Raster::new_with(self.width, self.height, 0.0f64);
        for y in 0..self.height {
            for x in 0..w {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sx = (x + k as i64 - radius).clamp(0, w - 1) as usize;
                    acc += weight * self.get(sx, y);
                }
                horizontal.set(x as usize, y, acc);
            }
        }

        // Vertical pass
        let mut out = Raster::new_with(self.width, self.height, 0.0f64);
        for y in 0..h {
            for x in 0..self.width {
                let mut acc = 0.0;
                for (k, weight) in kernel.iter().enumerate() {
                    let sy = (y + k as i64 - radius).clamp(0, h - 1) as usize;
                    acc += weight * horizontal.get(x, sy as usize);
                }
                out.set(x, y as usize, acc);
            }
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_set_roundtrip() {
        let mut r = Raster::new_with(4, 3, 0.0f64);
        r.set(3, 2, 7.5);
        assert_eq!(*r.get(3, 2), 7.5);
        assert_eq!(*r.get(0, 0), 0.0);
        assert_eq!(r.as_slice().len(), 12);
    }

    #[test]
    fn normalized_spans_unit_interval() {
        let mut r = Raster::new_with(2, 2, 0.0f64);
        r.set(0, 0, -4.0);
        r.set(1, 0, 0.0);
        r.set(0, 1, 2.0);
        r.set(1, 1, 4.0);

        let n = r.normalized();
        let (min_v, max_v) = n.min_max();
        assert_eq!(min_v, 0.0);
        assert_eq!(max_v, 1.0);
        assert!((n.get(1, 0) - 0.5).abs() < 1e-12);
    }

    #[test]
    fn normalized_constant_is_zero() {
        let r = Raster::new_with(3, 3, 42.0f64);
        let n = r.normalized();
        assert!(n.iter().all(|(_, _, &v)| v == 0.0));
    }

    #[test]
    fn resize_matches_requested_dimensions() {
        let r = Raster::new_with(10, 7, 1.25f64);
        let resized = r.resize_bilinear(23, 31);
        assert_eq!(resized.width, 23);
        assert_eq!(resized.height, 31);
        // Constant fields stay constant under interpolation.
        assert!(resized.iter().all(|(_, _, &v)| (v - 1.25).abs() < 1e-12));
    }

    #[test]
    fn resize_preserves_gradient_endpoints() {
        let mut r = Raster::new_with(5, 1, 0.0f64);
        for x in 0..5 {
            r.set(x, 0, x as f64);
        }
        let resized = r.resize_bilinear(9, 1);
        assert!((resized.get(0, 0) - 0.0).abs() < 1e-12);
        assert!((resized.get(8, 0) - 4.0).abs() < 1e-12);
    }

    #[test]
    fn gaussian_blur_preserves_constants() {
        let r = Raster::new_with(8, 8, 3.0f64);
        let blurred = r.gaussian_blur(2.0);
        assert!(blurred.iter().all(|(_, _, &v)| (v - 3.0).abs() < 1e-9));
    }

    #[test]
    fn gaussian_blur_smooths_peaks() {
        let mut r = Raster::new_with(9, 9, 0.0f64);
        r.set(4, 4, 1.0);
        let blurred = r.gaussian_blur(1.0);
        assert!(*blurred.get(4, 4) < 1.0);
        assert!(*blurred.get(4, 4) > *blurred.get(0, 0));
    }
}
