use std::f64::consts::PI;

/// Default camera: downtown Ottawa, city-level zoom.
pub const DEFAULT_LAT: f64 = 45.4211;
pub const DEFAULT_LON: f64 = -75.6903;
pub const DEFAULT_ZOOM: f64 = 10.0;

const MIN_ZOOM: f64 = 0.0;
const MAX_ZOOM: f64 = 20.0;
const TILE_SIZE: f64 = 256.0;

/// Camera state: what portion of the map is visible.
/// Width/height are in braille pixels (2x4 per character cell).
#[derive(Clone)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Web Mercator zoom level (world width = 256 * 2^zoom pixels)
    pub zoom: f64,
    /// Map rotation in degrees, clockwise from north
    pub bearing: f64,
    /// Canvas pixel width
    pub width: usize,
    /// Canvas pixel height
    pub height: usize,
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat,
            zoom,
            bearing: 0.0,
            width,
            height,
        }
    }

    /// Create the default city view over Ottawa.
    pub fn city(width: usize, height: usize) -> Self {
        Self::new(DEFAULT_LON, DEFAULT_LAT, DEFAULT_ZOOM, width, height)
    }

    /// World width in pixels at the current zoom.
    fn world_px(&self) -> f64 {
        TILE_SIZE * 2f64.powf(self.zoom)
    }

    /// Recenter the camera, keeping zoom and bearing.
    pub fn center_on(&mut self, lon: f64, lat: f64) {
        self.center_lon = lon;
        self.center_lat = lat.clamp(-85.0, 85.0);
    }

    /// Pan the viewport by a screen-space pixel delta.
    /// The delta is rotated by bearing so dragging follows the screen, not north.
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let theta = self.bearing.to_radians();
        let (sin, cos) = theta.sin_cos();
        let mx = dx as f64 * cos - dy as f64 * sin;
        let my = dx as f64 * sin + dy as f64 * cos;

        let scale = self.world_px();
        let mut x = (self.center_lon + 180.0) / 360.0 + mx / scale;
        let y = mercator_y(self.center_lat) + my / scale;

        // Wrap longitude across the antimeridian
        x = x.rem_euclid(1.0);
        self.center_lon = x * 360.0 - 180.0;
        self.center_lat = inv_mercator_y(y.clamp(0.0, 1.0)).clamp(-85.0, 85.0);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + 0.5).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - 0.5).max(MIN_ZOOM);
    }

    /// Zoom in keeping the geography under the given pixel fixed.
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, 0.5);
    }

    /// Zoom out keeping the geography under the given pixel fixed.
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -0.5);
    }

    fn zoom_at(&mut self, px: i32, py: i32, delta: f64) {
        let (lon, lat) = self.unproject(px, py);

        self.zoom = (self.zoom + delta).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pan so the anchor point lands back under the cursor
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Rotate the bearing by the given degrees.
    pub fn rotate(&mut self, degrees: f64) {
        self.bearing = (self.bearing + degrees).rem_euclid(360.0);
    }

    /// Project (lon, lat) to canvas pixel coordinates.
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let scale = self.world_px();

        let mut dx = ((lon + 180.0) / 360.0 - (self.center_lon + 180.0) / 360.0) * scale;
        let mut dy = (mercator_y(lat) - mercator_y(self.center_lat)) * scale;

        if self.bearing != 0.0 {
            let theta = -self.bearing.to_radians();
            let (sin, cos) = theta.sin_cos();
            let rx = dx * cos - dy * sin;
            let ry = dx * sin + dy * cos;
            dx = rx;
            dy = ry;
        }

        (
            (dx + self.width as f64 / 2.0).round() as i32,
            (dy + self.height as f64 / 2.0).round() as i32,
        )
    }

    /// Inverse of `project`: canvas pixel coordinates back to (lon, lat).
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let scale = self.world_px();

        let mut dx = px as f64 - self.width as f64 / 2.0;
        let mut dy = py as f64 - self.height as f64 / 2.0;

        if self.bearing != 0.0 {
            let theta = self.bearing.to_radians();
            let (sin, cos) = theta.sin_cos();
            let rx = dx * cos - dy * sin;
            let ry = dx * sin + dy * cos;
            dx = rx;
            dy = ry;
        }

        let x = (self.center_lon + 180.0) / 360.0 + dx / scale;
        let y = mercator_y(self.center_lat) + dy / scale;

        let lon = x * 360.0 - 180.0;
        let lat = inv_mercator_y(y);
        (lon, lat)
    }

    /// Check if a projected point is visible (with a small margin).
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Rough bounding-box check for a projected line segment.
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}

/// Normalized Web Mercator y in [0, 1].
fn mercator_y(lat: f64) -> f64 {
    let lat_rad = lat.to_radians();
    (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0
}

fn inv_mercator_y(y: f64) -> f64 {
    (PI * (1.0 - 2.0 * y)).sinh().atan().to_degrees()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_project_center() {
        let vp = Viewport::new(0.0, 0.0, 2.0, 100, 100);
        let (x, y) = vp.project(0.0, 0.0);
        assert_eq!(x, 50);
        assert_eq!(y, 50);
    }

    #[test]
    fn test_default_camera_is_ottawa() {
        let vp = Viewport::city(200, 100);
        assert!((vp.center_lat - 45.4211).abs() < 1e-9);
        assert!((vp.center_lon + 75.6903).abs() < 1e-9);
        assert_eq!(vp.zoom, 10.0);
        assert_eq!(vp.bearing, 0.0);
    }

    #[test]
    fn test_pan_moves_center() {
        let mut vp = Viewport::new(0.0, 0.0, 2.0, 100, 100);
        vp.pan(10, 0);
        assert!(vp.center_lon > 0.0);
    }

    #[test]
    fn test_project_unproject_roundtrip() {
        let vp = Viewport::city(200, 100);
        let (px, py) = vp.project(-75.7, 45.4);
        let (lon, lat) = vp.unproject(px, py);
        // Rounding to integer pixels costs a small fraction of a degree
        assert!((lon + 75.7).abs() < 1e-2);
        assert!((lat - 45.4).abs() < 1e-2);
    }

    #[test]
    fn test_roundtrip_with_bearing() {
        let mut vp = Viewport::city(200, 100);
        vp.rotate(37.0);
        let (px, py) = vp.project(-75.69, 45.42);
        let (lon, lat) = vp.unproject(px, py);
        assert!((lon + 75.69).abs() < 1e-2);
        assert!((lat - 45.42).abs() < 1e-2);
    }

    #[test]
    fn test_anchored_zoom_keeps_point() {
        let mut vp = Viewport::city(200, 100);
        let (lon, lat) = vp.unproject(30, 20);
        vp.zoom_in_at(30, 20);
        let (px, py) = vp.project(lon, lat);
        assert!((px - 30).abs() <= 1);
        assert!((py - 20).abs() <= 1);
    }

    #[test]
    fn test_zoom_clamped() {
        let mut vp = Viewport::city(100, 100);
        for _ in 0..100 {
            vp.zoom_in();
        }
        assert_eq!(vp.zoom, 20.0);
        for _ in 0..100 {
            vp.zoom_out();
        }
        assert_eq!(vp.zoom, 0.0);
    }
}
