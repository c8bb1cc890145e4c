use crate::data::ParkFeature;
use crate::map::{MapRenderer, Scene, Viewport};

/// Outbound work the event loop hands to the network service.
#[derive(Clone, Debug, PartialEq)]
pub enum Command {
    /// One-shot device location request, issued once at startup
    Locate,
    /// Forward-geocode a search query
    Search { query: String, seq: u64 },
    /// Geocode both endpoints, then fetch a driving route
    FetchRoute { start: String, end: String, seq: u64 },
}

/// Completions delivered back to the event loop by network tasks.
#[derive(Clone, Debug)]
pub enum NetEvent {
    Located { lon: f64, lat: f64 },
    SearchResolved { seq: u64, lon: f64, lat: f64 },
    RouteResolved { seq: u64, geometry: Vec<(f64, f64)> },
}

/// Which surface receives keyboard input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Focus {
    Map,
    Search,
    RouteStart,
    RouteEnd,
}

/// Application state. Single writer: every mutation goes through the
/// event loop, so there is no concurrent access to any of this.
pub struct App {
    pub viewport: Viewport,
    pub renderer: MapRenderer,
    pub parks: Vec<ParkFeature>,
    /// User-placed pin; replaced by clicks and search results, never cleared
    pub pin: Option<(f64, f64)>,
    /// Index of the park shown in the popup
    pub selected: Option<usize>,
    /// Last successfully fetched route geometry
    pub route: Option<Vec<(f64, f64)>>,
    pub focus: Focus,
    pub search_input: String,
    pub start_input: String,
    pub end_input: String,
    pub should_quit: bool,
    /// Last mouse position while a drag is in progress
    last_mouse: Option<(u16, u16)>,
    /// True once a drag actually moved, suppressing the click on release
    drag_moved: bool,
    route_seq: u64,
    search_seq: u64,
}

impl App {
    pub fn new(parks: Vec<ParkFeature>, renderer: MapRenderer, width: usize, height: usize) -> Self {
        Self {
            viewport: Viewport::city(width, height),
            renderer,
            parks,
            pin: None,
            selected: None,
            route: None,
            focus: Focus::Map,
            search_input: String::new(),
            start_input: String::new(),
            end_input: String::new(),
            should_quit: false,
            last_mouse: None,
            drag_moved: false,
            route_seq: 0,
            search_seq: 0,
        }
    }

    /// Issued once after startup; the answer (if any) recenters the camera.
    pub fn startup_command(&self) -> Command {
        Command::Locate
    }

    /// Keep the camera in sync with the rendered canvas size.
    pub fn set_canvas_size(&mut self, width: usize, height: usize) {
        self.viewport.width = width;
        self.viewport.height = height;
    }

    pub fn scene(&self) -> Scene<'_> {
        Scene {
            parks: &self.parks,
            selected: self.selected,
            pin: self.pin,
            route: self.route.as_deref(),
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    // --- map gestures -----------------------------------------------------

    pub fn pan(&mut self, dx: i32, dy: i32) {
        self.viewport.pan(dx, dy);
    }

    pub fn zoom_in(&mut self) {
        self.viewport.zoom_in();
    }

    pub fn zoom_out(&mut self) {
        self.viewport.zoom_out();
    }

    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.viewport.zoom_in_at(px, py);
    }

    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.viewport.zoom_out_at(px, py);
    }

    pub fn rotate(&mut self, degrees: f64) {
        self.viewport.rotate(degrees);
    }

    pub fn begin_drag(&mut self, col: u16, row: u16) {
        self.last_mouse = Some((col, row));
        self.drag_moved = false;
    }

    pub fn handle_drag(&mut self, col: u16, row: u16) {
        if let Some((last_col, last_row)) = self.last_mouse {
            let dx = (last_col as i32 - col as i32) * 2;
            let dy = (last_row as i32 - row as i32) * 4;
            if dx != 0 || dy != 0 {
                self.drag_moved = true;
                self.pan(dx, dy);
            }
        }
        self.last_mouse = Some((col, row));
    }

    /// End a press. Returns true if it should be treated as a click
    /// (no drag movement happened in between).
    pub fn end_drag(&mut self) -> bool {
        self.last_mouse = None;
        !std::mem::replace(&mut self.drag_moved, false)
    }

    /// A click on the map canvas, in braille pixel coordinates.
    /// A hit on a park marker selects it and leaves the pin alone;
    /// anywhere else replaces the pin with the clicked location.
    pub fn handle_click(&mut self, px: i32, py: i32) {
        if let Some(idx) = self.renderer.park_at(&self.parks, &self.viewport, px, py) {
            self.select_park(idx);
        } else {
            self.pin = Some(self.viewport.unproject(px, py));
        }
    }

    /// Idempotent: selecting the shown park again changes nothing;
    /// selecting another park replaces it.
    pub fn select_park(&mut self, idx: usize) {
        if idx < self.parks.len() {
            self.selected = Some(idx);
        }
    }

    /// Escape: leave text entry if active, otherwise dismiss the popup.
    pub fn press_escape(&mut self) {
        if self.focus != Focus::Map {
            self.focus = Focus::Map;
        } else {
            self.selected = None;
        }
    }

    // --- text entry -------------------------------------------------------

    pub fn focus_search(&mut self) {
        self.focus = Focus::Search;
    }

    pub fn focus_route(&mut self) {
        self.focus = Focus::RouteStart;
    }

    pub fn next_field(&mut self) {
        self.focus = match self.focus {
            Focus::Map => Focus::Map,
            Focus::Search => Focus::RouteStart,
            Focus::RouteStart => Focus::RouteEnd,
            Focus::RouteEnd => Focus::Search,
        };
    }

    fn focused_input(&mut self) -> Option<&mut String> {
        match self.focus {
            Focus::Map => None,
            Focus::Search => Some(&mut self.search_input),
            Focus::RouteStart => Some(&mut self.start_input),
            Focus::RouteEnd => Some(&mut self.end_input),
        }
    }

    pub fn push_char(&mut self, c: char) {
        if let Some(input) = self.focused_input() {
            input.push(c);
        }
    }

    pub fn pop_char(&mut self) {
        if let Some(input) = self.focused_input() {
            input.pop();
        }
    }

    /// Enter in a text field: produce the command for the focused surface.
    pub fn submit(&mut self) -> Option<Command> {
        match self.focus {
            Focus::Map => None,
            Focus::Search => self.submit_search(),
            Focus::RouteStart | Focus::RouteEnd => self.submit_route(),
        }
    }

    fn submit_search(&mut self) -> Option<Command> {
        let query = self.search_input.trim().to_string();
        if query.is_empty() {
            return None;
        }
        self.search_seq += 1;
        Some(Command::Search {
            query,
            seq: self.search_seq,
        })
    }

    /// Route fetch precondition: both endpoints non-empty, else no-op with
    /// zero network calls and no state change.
    fn submit_route(&mut self) -> Option<Command> {
        let start = self.start_input.trim().to_string();
        let end = self.end_input.trim().to_string();
        if start.is_empty() || end.is_empty() {
            return None;
        }
        self.route_seq += 1;
        Some(Command::FetchRoute {
            start,
            end,
            seq: self.route_seq,
        })
    }

    // --- network completions ----------------------------------------------

    /// The single state-update path for network results. Results carrying a
    /// superseded sequence number are dropped, so overlapping fetches can
    /// never interleave.
    pub fn apply(&mut self, event: NetEvent) {
        match event {
            NetEvent::Located { lon, lat } => {
                self.viewport.center_on(lon, lat);
            }
            NetEvent::SearchResolved { seq, lon, lat } => {
                if seq != self.search_seq {
                    tracing::debug!(seq, latest = self.search_seq, "dropping stale search result");
                    return;
                }
                self.viewport.center_on(lon, lat);
                self.pin = Some((lon, lat));
            }
            NetEvent::RouteResolved { seq, geometry } => {
                if seq != self.route_seq {
                    tracing::debug!(seq, latest = self.route_seq, "dropping stale route result");
                    return;
                }
                self.route = Some(geometry);
            }
        }
    }

    // --- status line ------------------------------------------------------

    pub fn zoom_level(&self) -> String {
        format!("z{:.1}", self.viewport.zoom)
    }

    pub fn bearing_level(&self) -> String {
        format!("{:.0}°", self.viewport.bearing)
    }

    pub fn center_coords(&self) -> String {
        format!(
            "{:.4}°{}, {:.4}°{}",
            self.viewport.center_lat.abs(),
            if self.viewport.center_lat >= 0.0 { "N" } else { "S" },
            self.viewport.center_lon.abs(),
            if self.viewport.center_lon >= 0.0 { "E" } else { "W" }
        )
    }
}
