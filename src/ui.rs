use crate::app::{App, Focus};
use crate::braille::BrailleCanvas;
use crate::map::MapLayers;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget, Wrap},
    Frame,
};

/// Vertical layout: text inputs, map, status bar.
fn split(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Search + route inputs
            Constraint::Min(3),    // Map
            Constraint::Length(1), // Status bar
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// The drawable interior of the map block, used by both rendering and
/// mouse-event translation so clicks line up with pixels.
pub fn map_inner_area(total: Rect) -> Rect {
    let (_, map, _) = split(total);
    Rect {
        x: map.x + 1,
        y: map.y + 1,
        width: map.width.saturating_sub(2),
        height: map.height.saturating_sub(2),
    }
}

pub fn render(frame: &mut Frame, app: &App) {
    let (inputs, map, status) = split(frame.area());

    render_inputs(frame, app, inputs);
    render_map(frame, app, map);
    render_status_bar(frame, app, status);

    if let Some(idx) = app.selected {
        render_park_popup(frame, app, idx, map);
    }
}

fn render_inputs(frame: &mut Frame, app: &App, area: Rect) {
    let chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(34),
            Constraint::Percentage(33),
            Constraint::Percentage(33),
        ])
        .split(area);

    render_input(frame, chunks[0], " Search ", &app.search_input, app.focus == Focus::Search);
    render_input(frame, chunks[1], " From ", &app.start_input, app.focus == Focus::RouteStart);
    render_input(frame, chunks[2], " To ", &app.end_input, app.focus == Focus::RouteEnd);
}

fn render_input(frame: &mut Frame, area: Rect, title: &str, value: &str, focused: bool) {
    let border_style = if focused {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style)
        .title(Span::styled(
            title,
            if focused {
                Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)
            } else {
                Style::default().fg(Color::Gray)
            },
        ));

    // Keep the tail visible when the text is longer than the field
    let inner_width = area.width.saturating_sub(2) as usize;
    let shown: String = value
        .chars()
        .rev()
        .take(inner_width.saturating_sub(1))
        .collect::<Vec<_>>()
        .into_iter()
        .rev()
        .collect();
    let cursor = if focused { "▏" } else { "" };

    let paragraph = Paragraph::new(format!("{shown}{cursor}")).block(block);
    frame.render_widget(paragraph, area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Skatepark Map ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let mut viewport = app.viewport.clone();
    // Braille gives 2x4 resolution per character
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = app.renderer.render(&viewport, &app.scene());

    let map_widget = MapWidget {
        layers,
        inner_width: inner.width,
        inner_height: inner.height,
    };
    frame.render_widget(map_widget, inner);
}

/// Composites the braille layers back-to-front with fixed per-layer colors,
/// then overlays labels and the pin glyph.
struct MapWidget {
    layers: MapLayers,
    inner_width: u16,
    inner_height: u16,
}

impl MapWidget {
    fn render_layer(canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        for (cx, cy, ch) in canvas.cells() {
            if cx >= area.width || cy >= area.height {
                continue;
            }
            buf[(area.x + cx, area.y + cy)].set_char(ch).set_fg(color);
        }
    }
}

impl Widget for MapWidget {
    fn render(self, area: Rect, buf: &mut Buffer) {
        Self::render_layer(&self.layers.basemap, Color::Cyan, area, buf);
        // Route overlay: one line layer, fixed color and width
        Self::render_layer(&self.layers.route, Color::Magenta, area, buf);
        Self::render_layer(&self.layers.markers, Color::Green, area, buf);

        let label_style = Style::default().fg(Color::White);
        for (lx, ly, text) in &self.layers.labels {
            if *ly >= self.inner_height || *lx >= self.inner_width {
                continue;
            }

            let max_len = (self.inner_width.saturating_sub(*lx)) as usize;
            let display_text: String = text.chars().take(max_len.min(24)).collect();

            let y = area.y + *ly;
            for (i, ch) in display_text.chars().enumerate() {
                let px = area.x + *lx + i as u16;
                if px < area.x + area.width {
                    buf[(px, y)].set_char(ch).set_style(label_style);
                }
            }
        }

        if let Some((cx, cy)) = self.layers.pin {
            if cx < self.inner_width && cy < self.inner_height {
                buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

/// Info popup for the selected park, anchored to the bottom-left of the map.
fn render_park_popup(frame: &mut Frame, app: &App, idx: usize, map_area: Rect) {
    let Some(park) = app.parks.get(idx) else {
        return;
    };

    let width = map_area.width.saturating_sub(4).min(44);
    let height = 6u16;
    if map_area.width < width + 2 || map_area.height < height + 2 {
        return;
    }

    let popup = Rect {
        x: map_area.x + 2,
        y: map_area.y + map_area.height - height - 1,
        width,
        height,
    };

    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Green))
        .title(Span::styled(
            format!(" {} ", park.name),
            Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
        ));

    let body = vec![
        Line::from(park.description.clone()),
        Line::from(Span::styled(
            format!("{:.4}, {:.4}", park.lat, park.lon),
            Style::default().fg(Color::DarkGray),
        )),
        Line::from(Span::styled(
            "Esc to close",
            Style::default().fg(Color::DarkGray),
        )),
    ];

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(body).wrap(Wrap { trim: true }).block(block),
        popup,
    );
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let settings = &app.renderer.settings;
    let route_state = match &app.route {
        Some(geometry) => format!("route:{} pts ", geometry.len()),
        None => "route:- ".to_string(),
    };

    let status = Line::from(vec![
        Span::styled(" ", Style::default()),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" ", Style::default()),
        Span::styled(app.bearing_level(), Style::default().fg(Color::Magenta)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        Span::styled(route_state, Style::default().fg(Color::Magenta)),
        Span::styled(
            if settings.show_basemap { "[B]ase " } else { "[b]ase " },
            Style::default().fg(if settings.show_basemap { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_parks { "[P]arks " } else { "[p]arks " },
            Style::default().fg(if settings.show_parks { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_labels { "[L]abels " } else { "[l]abels " },
            Style::default().fg(if settings.show_labels { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            if settings.show_route { "[O]verlay " } else { "[o]verlay " },
            Style::default().fg(if settings.show_route { Color::Green } else { Color::DarkGray }),
        ),
        Span::styled(
            "| /:search t:route hjkl:pan +/-:zoom [ ]:rotate q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}
