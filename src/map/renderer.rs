use crate::braille::BrailleCanvas;
use crate::data::ParkFeature;
use crate::map::geometry::{draw_circle, draw_line, draw_marker, draw_thick_line};
use crate::map::projection::Viewport;

/// A geographic polyline (sequence of lon/lat coordinates).
pub type LineString = Vec<(f64, f64)>;

/// Display settings for map layers.
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_basemap: bool,
    pub show_parks: bool,
    pub show_labels: bool,
    pub show_route: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_basemap: true,
            show_parks: true,
            show_labels: true,
            show_route: true,
        }
    }
}

/// Dynamic overlay state rendered on top of the basemap.
pub struct Scene<'a> {
    pub parks: &'a [ParkFeature],
    /// Index into `parks` of the currently selected park, if any
    pub selected: Option<usize>,
    /// User-placed pin (lon, lat)
    pub pin: Option<(f64, f64)>,
    /// Route geometry as ordered (lon, lat) pairs
    pub route: Option<&'a [(f64, f64)]>,
}

/// Rendered output: one canvas per color layer plus character overlays,
/// composited back-to-front by the UI.
pub struct MapLayers {
    pub basemap: BrailleCanvas,
    pub route: BrailleCanvas,
    pub markers: BrailleCanvas,
    /// Character-cell positions of text labels (col, row, text)
    pub labels: Vec<(u16, u16, String)>,
    /// Character-cell position of the user pin glyph
    pub pin: Option<(u16, u16)>,
}

/// Renders basemap linework, park markers, the user pin and the route overlay.
pub struct MapRenderer {
    basemap: Vec<LineString>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new() -> Self {
        Self {
            basemap: Vec::new(),
            settings: DisplaySettings::default(),
        }
    }

    pub fn add_basemap_line(&mut self, line: LineString) {
        self.basemap.push(line);
    }

    pub fn has_basemap(&self) -> bool {
        !self.basemap.is_empty()
    }

    pub fn toggle_basemap(&mut self) {
        self.settings.show_basemap = !self.settings.show_basemap;
    }

    pub fn toggle_parks(&mut self) {
        self.settings.show_parks = !self.settings.show_parks;
    }

    pub fn toggle_labels(&mut self) {
        self.settings.show_labels = !self.settings.show_labels;
    }

    pub fn toggle_route(&mut self) {
        self.settings.show_route = !self.settings.show_route;
    }

    /// Render the scene for the given viewport into per-layer canvases.
    pub fn render(&self, viewport: &Viewport, scene: &Scene) -> MapLayers {
        let char_w = viewport.width / 2;
        let char_h = viewport.height / 4;

        let mut basemap = BrailleCanvas::new(char_w, char_h);
        let mut route = BrailleCanvas::new(char_w, char_h);
        let mut markers = BrailleCanvas::new(char_w, char_h);
        let mut labels = Vec::new();

        if self.settings.show_basemap {
            for line in &self.basemap {
                draw_linestring(&mut basemap, line, viewport, false);
            }
        }

        // Route under markers: fixed width, no per-segment styling
        if self.settings.show_route {
            if let Some(path) = scene.route {
                draw_projected_path(&mut route, path, viewport);
            }
        }

        if self.settings.show_parks {
            for (idx, park) in scene.parks.iter().enumerate() {
                let (px, py) = viewport.project(park.lon, park.lat);
                if !viewport.is_visible(px, py) {
                    continue;
                }

                let radius = if scene.selected == Some(idx) { 3 } else { 2 };
                draw_circle(&mut markers, px, py, radius);

                if self.settings.show_labels && px >= 0 && py >= 0 {
                    let char_x = (px / 2) as u16;
                    let char_y = (py / 4) as u16;
                    if let Some(label_x) = char_x.checked_add(2) {
                        labels.push((label_x, char_y, park.name.clone()));
                    }
                }
            }
        }

        let mut pin_cell = None;
        if let Some((lon, lat)) = scene.pin {
            let (px, py) = viewport.project(lon, lat);
            if viewport.is_visible(px, py) {
                draw_marker(&mut markers, px, py, 2);
                if px >= 0 && py >= 0 {
                    pin_cell = Some(((px / 2) as u16, (py / 4) as u16));
                }
            }
        }

        MapLayers {
            basemap,
            route,
            markers,
            labels,
            pin: pin_cell,
        }
    }

    /// Hit-test a canvas pixel against park markers.
    /// Returns the nearest park within one character cell of the point.
    pub fn park_at(
        &self,
        parks: &[ParkFeature],
        viewport: &Viewport,
        px: i32,
        py: i32,
    ) -> Option<usize> {
        // One cell is 2x4 braille pixels; accept a touch radius around it
        const HIT_RADIUS: i32 = 4;

        let mut best: Option<(usize, i32)> = None;
        for (idx, park) in parks.iter().enumerate() {
            let (mx, my) = viewport.project(park.lon, park.lat);
            let d = (mx - px).abs().max((my - py).abs());
            if d <= HIT_RADIUS && best.map_or(true, |(_, bd)| d < bd) {
                best = Some((idx, d));
            }
        }
        best.map(|(idx, _)| idx)
    }
}

impl Default for MapRenderer {
    fn default() -> Self {
        Self::new()
    }
}

/// Draw a geographic polyline with viewport culling.
fn draw_linestring(canvas: &mut BrailleCanvas, line: &[(f64, f64)], viewport: &Viewport, thick: bool) {
    if line.len() < 2 {
        return;
    }

    let mut prev: Option<(i32, i32)> = None;
    for &(lon, lat) in line {
        let (px, py) = viewport.project(lon, lat);

        if let Some((prev_x, prev_y)) = prev {
            // Skip segments that wrap the whole viewport (antimeridian artifacts)
            let dist = ((px - prev_x).abs() + (py - prev_y).abs()) as usize;
            if dist < viewport.width && viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                if thick {
                    draw_thick_line(canvas, prev_x, prev_y, px, py);
                } else {
                    draw_line(canvas, prev_x, prev_y, px, py);
                }
            }
        }

        prev = Some((px, py));
    }
}

fn draw_projected_path(canvas: &mut BrailleCanvas, path: &[(f64, f64)], viewport: &Viewport) {
    draw_linestring(canvas, path, viewport, true);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn park(id: &str, lon: f64, lat: f64) -> ParkFeature {
        ParkFeature {
            id: id.to_string(),
            lon,
            lat,
            name: id.to_string(),
            description: String::new(),
        }
    }

    #[test]
    fn test_route_rendered_as_single_layer() {
        let renderer = MapRenderer::new();
        let vp = Viewport::city(200, 100);
        let route = vec![
            (-75.6903, 45.4211),
            (-75.70, 45.43),
            (-75.72, 45.44),
        ];
        let scene = Scene {
            parks: &[],
            selected: None,
            pin: None,
            route: Some(&route),
        };
        let layers = renderer.render(&vp, &scene);
        assert!(!layers.route.is_empty());
        assert!(layers.markers.is_empty());
    }

    #[test]
    fn test_no_route_layer_when_absent() {
        let renderer = MapRenderer::new();
        let vp = Viewport::city(200, 100);
        let scene = Scene {
            parks: &[],
            selected: None,
            pin: None,
            route: None,
        };
        let layers = renderer.render(&vp, &scene);
        assert!(layers.route.is_empty());
    }

    #[test]
    fn test_visible_park_gets_marker_and_label() {
        let renderer = MapRenderer::new();
        let vp = Viewport::city(200, 100);
        let parks = [park("p1", -75.6903, 45.4211)];
        let scene = Scene {
            parks: &parks,
            selected: None,
            pin: None,
            route: None,
        };
        let layers = renderer.render(&vp, &scene);
        assert!(!layers.markers.is_empty());
        assert_eq!(layers.labels.len(), 1);
        assert_eq!(layers.labels[0].2, "p1");
    }

    #[test]
    fn test_offscreen_park_culled() {
        let renderer = MapRenderer::new();
        let vp = Viewport::city(200, 100);
        let parks = [park("tokyo", 139.7, 35.7)];
        let scene = Scene {
            parks: &parks,
            selected: None,
            pin: None,
            route: None,
        };
        let layers = renderer.render(&vp, &scene);
        assert!(layers.markers.is_empty());
        assert!(layers.labels.is_empty());
    }

    #[test]
    fn test_pin_reported_in_char_cells() {
        let renderer = MapRenderer::new();
        let vp = Viewport::city(200, 100);
        let scene = Scene {
            parks: &[],
            selected: None,
            pin: Some((-75.6903, 45.4211)),
            route: None,
        };
        let layers = renderer.render(&vp, &scene);
        // Pin at viewport center: pixel (100, 50) -> cell (50, 12)
        assert_eq!(layers.pin, Some((50, 12)));
    }

    #[test]
    fn test_park_hit_test() {
        let renderer = MapRenderer::new();
        let vp = Viewport::city(200, 100);
        let parks = [park("a", -75.6903, 45.4211), park("b", 139.7, 35.7)];

        let (px, py) = vp.project(-75.6903, 45.4211);
        assert_eq!(renderer.park_at(&parks, &vp, px, py), Some(0));
        assert_eq!(renderer.park_at(&parks, &vp, px + 2, py + 2), Some(0));
        assert_eq!(renderer.park_at(&parks, &vp, px + 40, py), None);
    }
}
