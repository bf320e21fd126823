pub mod app;
pub mod list;
pub mod terminal;
pub mod widgets;
pub mod worker;

use std::io;
use std::sync::mpsc::{self, Receiver};
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{self, Event, KeyEventKind};
use ratatui::backend::{Backend, CrosstermBackend};
use ratatui::layout::{Constraint, Layout};
use ratatui::widgets::Paragraph;
use ratatui::{Frame, Terminal};

use crate::browser::ThemeBrowser;
use crate::cli::Settings;
use crate::signals;

pub use app::{App, AppEvent, Exit};
use terminal::TerminalGuard;
use widgets::ThemeListWidget;
use worker::Worker;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Run the picker full screen until the user quits or confirms a theme.
///
/// Every request handed to the worker has completed by the time this
/// returns, so the caller may restore the config right away.
pub fn run(settings: &Settings) -> Result<Exit> {
    let (tx, rx) = mpsc::channel();
    let mut worker = Worker::spawn(
        ThemeBrowser::new(&settings.themes_dir),
        settings.config_file.clone(),
        tx,
    )?;
    let mut app = App::new(settings);

    let guard = TerminalGuard::enter()?;
    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;

    let result = run_app(
        &mut terminal,
        &mut app,
        &worker,
        &rx,
        signals::take_interrupt,
    );

    drop(guard);
    worker.shutdown();
    result
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    worker: &Worker,
    events: &Receiver<AppEvent>,
    interrupted: impl Fn() -> bool,
) -> Result<Exit> {
    let size = terminal.size()?;
    app.handle(AppEvent::Resize {
        width: size.width,
        height: size.height,
    });

    loop {
        for request in app.take_requests() {
            worker.submit(request);
        }
        if interrupted() {
            app.interrupt();
        }
        if let Some(exit) = app.exit() {
            return Ok(exit);
        }

        terminal.draw(|frame| draw(frame, app))?;

        if event::poll(POLL_INTERVAL)? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    app.handle(AppEvent::Key(key))
                }
                Event::Resize(width, height) => app.handle(AppEvent::Resize { width, height }),
                _ => {}
            }
        }
        while let Ok(event) = events.try_recv() {
            app.handle(event);
        }
    }
}

/// Flatten an error chain to a single line.
///
/// Parser errors carry a source excerpt with a caret under the offending
/// column; only their message lines are kept.
pub fn error_line(err: &anyhow::Error) -> String {
    err.chain()
        .flat_map(|cause| {
            cause
                .to_string()
                .lines()
                .map(str::trim)
                .filter(|line| is_message_line(line))
                .map(str::to_owned)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>()
        .join(": ")
}

fn is_message_line(line: &str) -> bool {
    if line.is_empty() || line.starts_with('|') {
        return false;
    }
    // excerpt rows look like `12 | key = value`
    !line
        .split_once(" |")
        .is_some_and(|(number, _)| number.chars().all(|c| c.is_ascii_digit()))
}

/// Draw the whole screen: placeholder, latched error, or list and preview.
pub fn draw(frame: &mut Frame, app: &App) {
    let area = frame.area();
    if !app.is_ready() {
        frame.render_widget(Paragraph::new("Initializing..."), area);
        return;
    }
    if let Some(err) = app.error() {
        frame.render_widget(Paragraph::new(format!("Error: {err}")), area);
        return;
    }

    let [list_area, preview_area] = Layout::horizontal([
        Constraint::Length(area.width / 2),
        Constraint::Length(widgets::preview_width(area.width)),
    ])
    .areas(area);

    frame.render_widget(ThemeListWidget::new(app.list(), app.applied()), list_area);
    frame.render_widget(
        Paragraph::new(app.preview().clone()).scroll((app.preview_scroll(), 0)),
        preview_area,
    );
}
