use std::fs::File;
use std::path::Path;
use std::sync::mpsc;
use std::sync::Mutex;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use ratatui::layout::Rect;
use ratatui::DefaultTerminal;
use tracing_subscriber::EnvFilter;

use skatemap::app::{App, Focus, NetEvent};
use skatemap::config::Config;
use skatemap::map::MapRenderer;
use skatemap::net::NetService;
use skatemap::{data, ui};

fn main() -> Result<()> {
    // ratatui owns the terminal, so logs go to a file
    let log_file = File::create("skatemap.log")?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("skatemap=info")),
        )
        .with_writer(Mutex::new(log_file))
        .with_ansi(false)
        .init();

    let config = Config::from_env();

    let mut terminal = ratatui::init();
    if let Err(e) = terminal.clear() {
        ratatui::restore();
        return Err(e.into());
    }

    let _ = execute!(std::io::stdout(), EnableMouseCapture);

    let result = run(&mut terminal, &config);

    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, config: &Config) -> Result<()> {
    let parks = data::load_parks()?;
    tracing::info!(parks = parks.len(), "park dataset loaded");

    let mut renderer = MapRenderer::new();
    let data_dir = Path::new("data");
    if data_dir.exists() {
        let _ = data::load_basemap(&mut renderer, data_dir);
    }
    if !renderer.has_basemap() {
        data::generate_simple_world(&mut renderer);
    }

    let service = NetService::new(config)?;
    let (tx, rx) = mpsc::channel::<NetEvent>();

    let size = terminal.size()?;
    let mut app = App::new(parks, renderer, size.width as usize * 2, size.height as usize * 4);

    // One-shot device location; a miss keeps the default Ottawa camera
    service.dispatch(app.startup_command(), tx.clone());

    loop {
        // Keep the camera synced to the map pane before drawing, so click
        // unprojection matches what is on screen
        let size = terminal.size()?;
        let inner = ui::map_inner_area(Rect::new(0, 0, size.width, size.height));
        app.set_canvas_size(inner.width as usize * 2, inner.height as usize * 4);

        terminal.draw(|frame| ui::render(frame, &app))?;

        // ~60fps event cadence
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    handle_key(&mut app, &service, &tx, key.code);
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse, inner);
                }
                Event::Resize(width, height) => {
                    let inner = ui::map_inner_area(Rect::new(0, 0, width, height));
                    app.set_canvas_size(inner.width as usize * 2, inner.height as usize * 4);
                }
                _ => {}
            }
        }

        // Apply network completions through the single state-update path
        while let Ok(event) = rx.try_recv() {
            app.apply(event);
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, service: &NetService, tx: &mpsc::Sender<NetEvent>, code: KeyCode) {
    if app.focus == Focus::Map {
        match code {
            KeyCode::Char('q') => app.quit(),
            KeyCode::Esc => app.press_escape(),

            // Pan with hjkl or arrow keys
            KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
            KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
            KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
            KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

            // Zoom and rotate
            KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
            KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),
            KeyCode::Char('[') => app.rotate(-15.0),
            KeyCode::Char(']') => app.rotate(15.0),

            // Text entry
            KeyCode::Char('/') => app.focus_search(),
            KeyCode::Char('t') => app.focus_route(),

            // Layer toggles
            KeyCode::Char('b') | KeyCode::Char('B') => app.renderer.toggle_basemap(),
            KeyCode::Char('p') | KeyCode::Char('P') => app.renderer.toggle_parks(),
            KeyCode::Char('L') => app.renderer.toggle_labels(),
            KeyCode::Char('o') | KeyCode::Char('O') => app.renderer.toggle_route(),

            _ => {}
        }
    } else {
        match code {
            KeyCode::Esc => app.press_escape(),
            KeyCode::Tab => app.next_field(),
            KeyCode::Backspace => app.pop_char(),
            KeyCode::Enter => {
                if let Some(command) = app.submit() {
                    service.dispatch(command, tx.clone());
                }
            }
            KeyCode::Char(c) => app.push_char(c),
            _ => {}
        }
    }
}

/// Translate mouse events into map gestures; everything is relative to the
/// map pane's interior so pixels line up with the braille canvas.
fn handle_mouse(app: &mut App, mouse: MouseEvent, inner: Rect) {
    let in_map = mouse.column >= inner.x
        && mouse.column < inner.x + inner.width
        && mouse.row >= inner.y
        && mouse.row < inner.y + inner.height;

    let px = (mouse.column.saturating_sub(inner.x) as i32) * 2;
    let py = (mouse.row.saturating_sub(inner.y) as i32) * 4;

    match mouse.kind {
        MouseEventKind::ScrollUp if in_map => app.zoom_in_at(px, py),
        MouseEventKind::ScrollDown if in_map => app.zoom_out_at(px, py),
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        MouseEventKind::Down(MouseButton::Left) if in_map => {
            app.begin_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            // A press that never moved is a click: select a marker or pin
            if app.end_drag() && in_map {
                app.handle_click(px, py);
            }
        }
        _ => {}
    }
}
