use std::fs;
use std::mem;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use crossterm::event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use ratatui::text::Text;

use crate::browser::ThemeEntry;
use crate::cli::Settings;

use super::list::{FilterState, ThemeList};
use super::widgets;
use super::worker::Request;

/// Everything the controller reacts to, in arrival order.
#[derive(Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Resize {
        width: u16,
        height: u16,
    },
    FilesLoaded {
        seq: u64,
        dir: PathBuf,
        result: Result<Vec<ThemeEntry>>,
    },
    ThemeApplied {
        path: PathBuf,
        result: Result<()>,
    },
}

/// How the session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exit {
    /// Quit or interrupt: put the original config back.
    Restore,
    /// A theme was confirmed: leave it applied.
    Keep,
}

/// Last highlighted entry, so repeated events on the same row are no-ops.
#[derive(Debug, Clone, Default)]
pub struct SelectionState {
    evaluated: bool,
    last: Option<(usize, PathBuf)>,
}

impl SelectionState {
    /// Record `current` and report whether it differs from the previous
    /// evaluation. The first evaluation always counts as a change.
    pub fn changed(&mut self, current: Option<(usize, &Path)>) -> bool {
        let current = current.map(|(index, path)| (index, path.to_path_buf()));
        if self.evaluated && self.last == current {
            return false;
        }
        self.evaluated = true;
        self.last = current;
        true
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// The selection controller: owns the UI state and turns events into
/// requests for the worker.
pub struct App {
    list: ThemeList,
    selection: SelectionState,
    current_dir: PathBuf,
    list_seq: u64,
    loaded_once: bool,
    size: Option<(u16, u16)>,
    preview_source: Option<String>,
    preview: Text<'static>,
    preview_scroll: u16,
    applied: Option<String>,
    error: Option<String>,
    requests: Vec<Request>,
    exit: Option<Exit>,
}

impl App {
    /// Create the controller and queue the listing of the theme root.
    pub fn new(settings: &Settings) -> Self {
        let root = settings.themes_dir.clone();
        let mut app = Self {
            list: ThemeList::new(),
            selection: SelectionState::default(),
            current_dir: root.clone(),
            list_seq: 0,
            loaded_once: false,
            size: None,
            preview_source: None,
            preview: Text::default(),
            preview_scroll: 0,
            applied: None,
            error: None,
            requests: Vec::new(),
            exit: None,
        };
        app.request_listing(root);
        app
    }

    pub fn handle(&mut self, event: AppEvent) {
        if self.exit.is_some() {
            return;
        }
        match event {
            AppEvent::Key(key) => self.handle_key(key),
            AppEvent::Resize { width, height } => self.resize(width, height),
            AppEvent::FilesLoaded { seq, dir, result } => self.files_loaded(seq, dir, result),
            AppEvent::ThemeApplied { path, result } => match result {
                Ok(()) => {
                    self.applied = path
                        .file_name()
                        .map(|name| name.to_string_lossy().into_owned());
                }
                Err(err) => self.fail(err),
            },
        }
    }

    /// Requests queued since the last call.
    pub fn take_requests(&mut self) -> Vec<Request> {
        mem::take(&mut self.requests)
    }

    pub fn exit(&self) -> Option<Exit> {
        self.exit
    }

    pub fn is_ready(&self) -> bool {
        self.size.is_some()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn list(&self) -> &ThemeList {
        &self.list
    }

    pub fn current_dir(&self) -> &Path {
        &self.current_dir
    }

    pub fn preview(&self) -> &Text<'static> {
        &self.preview
    }

    pub fn preview_scroll(&self) -> u16 {
        self.preview_scroll
    }

    /// The process was asked to terminate: end the session like a quit.
    pub fn interrupt(&mut self) {
        if self.exit.is_none() {
            tracing::info!("interrupted");
            self.quit();
        }
    }

    /// File name of the theme the config currently imports.
    pub fn applied(&self) -> Option<&str> {
        self.applied.as_deref()
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let ctrl = key.modifiers.contains(KeyModifiers::CONTROL);
        if ctrl && key.code == KeyCode::Char('c') {
            self.quit();
            return;
        }
        // a latched error leaves only the way out
        if self.error.is_some() {
            if key.code == KeyCode::Char('q') {
                self.quit();
            }
            return;
        }

        if self.list.is_editing_filter() {
            match key.code {
                KeyCode::Esc => self.list.clear_filter(),
                KeyCode::Enter => self.list.accept_filter(),
                KeyCode::Backspace => self.list.pop_filter_char(),
                KeyCode::Char(c) if !ctrl => self.list.push_filter_char(c),
                _ => return,
            }
            self.evaluate_selection();
            return;
        }

        if ctrl {
            match key.code {
                KeyCode::Char('d') => self.scroll_preview_down(),
                KeyCode::Char('u') => self.scroll_preview_up(),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('q') => self.quit(),
            KeyCode::Enter => self.confirm(),
            KeyCode::Up | KeyCode::Char('k') => self.list.move_up(),
            KeyCode::Down | KeyCode::Char('j') => self.list.move_down(),
            KeyCode::Right | KeyCode::PageDown | KeyCode::Char('l') => self.list.next_page(),
            KeyCode::Left | KeyCode::PageUp | KeyCode::Char('h') => self.list.prev_page(),
            KeyCode::Home | KeyCode::Char('g') => self.list.go_to_start(),
            KeyCode::End | KeyCode::Char('G') => self.list.go_to_end(),
            KeyCode::Char('/') => {
                self.list.start_filter();
                return;
            }
            KeyCode::Esc if self.list.filter_state() == FilterState::Applied => {
                self.list.clear_filter()
            }
            _ => return,
        }
        if self.exit.is_none() {
            self.evaluate_selection();
        }
    }

    fn resize(&mut self, width: u16, height: u16) {
        if self.size.is_none() {
            tracing::debug!(width, height, "first size known, view ready");
        }
        self.size = Some((width, height));
        self.list.set_per_page(widgets::list_page_size(height));
        self.render_preview();
    }

    fn files_loaded(&mut self, seq: u64, dir: PathBuf, result: Result<Vec<ThemeEntry>>) {
        if seq != self.list_seq {
            tracing::debug!(
                seq,
                latest = self.list_seq,
                dir = %dir.display(),
                "discarding stale listing"
            );
            return;
        }
        let entries = match result {
            Ok(entries) => entries,
            Err(err) => return self.fail(err),
        };
        tracing::debug!(dir = %dir.display(), count = entries.len(), "listing loaded");
        self.current_dir = dir;
        self.list.set_entries(entries);
        if !self.loaded_once {
            self.loaded_once = true;
            self.selection.reset();
        }
        self.evaluate_selection();
    }

    /// Preview and apply the highlighted theme if the highlight moved.
    fn evaluate_selection(&mut self) {
        let current = self.list.selected().map(|entry| entry.path.clone());
        let index = self.list.index();
        if !self.selection.changed(current.as_deref().map(|path| (index, path))) {
            return;
        }
        if let Some(entry) = self.list.selected().filter(|e| e.is_theme()).cloned() {
            self.select_theme(&entry);
        }
    }

    /// Enter: descend into a directory, or keep a theme and finish.
    fn confirm(&mut self) {
        let Some(entry) = self.list.selected().cloned() else {
            return;
        };
        if entry.is_directory {
            self.request_listing(entry.path);
        } else if entry.is_theme() && self.select_theme(&entry) {
            tracing::info!(theme = %entry.path.display(), "theme confirmed");
            self.exit = Some(Exit::Keep);
        }
    }

    fn select_theme(&mut self, entry: &ThemeEntry) -> bool {
        let content = match fs::read_to_string(&entry.path)
            .with_context(|| format!("failed to read theme {}", entry.path.display()))
        {
            Ok(content) => content,
            Err(err) => {
                self.fail(err);
                return false;
            }
        };
        self.preview_source = Some(content);
        self.preview_scroll = 0;
        self.render_preview();
        self.requests.push(Request::Apply {
            path: entry.path.clone(),
        });
        true
    }

    fn render_preview(&mut self) {
        if let (Some(source), Some((width, _))) = (&self.preview_source, self.size) {
            self.preview = widgets::render_preview(source, widgets::preview_width(width));
        }
    }

    fn request_listing(&mut self, dir: PathBuf) {
        self.list_seq += 1;
        tracing::debug!(seq = self.list_seq, dir = %dir.display(), "listing requested");
        self.requests.push(Request::ListDir {
            seq: self.list_seq,
            dir,
        });
    }

    fn scroll_preview_down(&mut self) {
        let step = self.half_page();
        let max = u16::try_from(self.preview.height())
            .unwrap_or(u16::MAX)
            .saturating_sub(1);
        self.preview_scroll = self.preview_scroll.saturating_add(step).min(max);
    }

    fn scroll_preview_up(&mut self) {
        self.preview_scroll = self.preview_scroll.saturating_sub(self.half_page());
    }

    fn half_page(&self) -> u16 {
        self.size.map_or(1, |(_, height)| (height / 2).max(1))
    }

    fn quit(&mut self) {
        tracing::info!("quit requested, config will be restored");
        self.exit = Some(Exit::Restore);
    }

    fn fail(&mut self, err: anyhow::Error) {
        tracing::error!("{err:#}");
        self.error = Some(super::error_line(&err));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::browser::ThemeBrowser;
    use crate::tui::worker::perform;
    use tempfile::TempDir;

    const THEME: &str = "[colors.primary]\nbackground = \"#000000\"\nforeground = \"#ffffff\"\n";

    struct Fixture {
        _tmp: TempDir,
        themes: PathBuf,
        config: PathBuf,
        app: App,
        browser: ThemeBrowser,
    }

    impl Fixture {
        fn new(files: &[&str]) -> Self {
            let tmp = TempDir::new().unwrap();
            let themes = tmp.path().join("themes");
            fs::create_dir(&themes).unwrap();
            for file in files {
                let path = themes.join(file);
                if file.ends_with('/') {
                    fs::create_dir_all(&path).unwrap();
                } else {
                    fs::create_dir_all(path.parent().unwrap()).unwrap();
                    fs::write(&path, THEME).unwrap();
                }
            }
            let config = tmp.path().join("alacritty.toml");
            fs::write(&config, "[general]\nlive_config_reload = false\n").unwrap();
            let settings = Settings::new(&themes, &config);
            Self {
                app: App::new(&settings),
                browser: ThemeBrowser::new(&themes),
                _tmp: tmp,
                themes,
                config,
            }
        }

        /// Run queued requests synchronously until none are left.
        fn pump(&mut self) -> Vec<Request> {
            let mut seen = Vec::new();
            loop {
                let requests = self.app.take_requests();
                if requests.is_empty() {
                    return seen;
                }
                for request in requests {
                    seen.push(request.clone());
                    let event = perform(&self.browser, &self.config, request);
                    self.app.handle(event);
                }
            }
        }

        fn key(&mut self, code: KeyCode) {
            self.app.handle(AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE)));
        }

        fn config(&self) -> String {
            fs::read_to_string(&self.config).unwrap()
        }
    }

    fn applies(requests: &[Request]) -> Vec<PathBuf> {
        requests
            .iter()
            .filter_map(|r| match r {
                Request::Apply { path } => Some(path.clone()),
                Request::ListDir { .. } => None,
            })
            .collect()
    }

    #[test]
    fn selection_state_debounces_same_row() {
        let mut state = SelectionState::default();
        let a = Path::new("/a.toml");
        assert!(state.changed(Some((0, a))));
        assert!(!state.changed(Some((0, a))));
        assert!(state.changed(Some((1, Path::new("/b.toml")))));
        state.reset();
        assert!(state.changed(Some((1, Path::new("/b.toml")))));
    }

    #[test]
    fn selection_state_first_empty_evaluation_counts() {
        let mut state = SelectionState::default();
        assert!(state.changed(None));
        assert!(!state.changed(None));
    }

    #[test]
    fn not_ready_until_first_resize() {
        let mut fx = Fixture::new(&["a.toml"]);
        assert!(!fx.app.is_ready());
        fx.app.handle(AppEvent::Resize {
            width: 120,
            height: 40,
        });
        assert!(fx.app.is_ready());
        assert_eq!(fx.app.list().per_page(), widgets::list_page_size(40));
    }

    #[test]
    fn first_load_previews_and_applies_first_theme() {
        let mut fx = Fixture::new(&["a.toml", "b.toml"]);
        fx.app.handle(AppEvent::Resize {
            width: 120,
            height: 40,
        });
        let requests = fx.pump();

        assert_eq!(applies(&requests), [fx.themes.join("a.toml")]);
        assert!(fx.config().contains("a.toml"));
        assert!(fx.config().contains("live_config_reload = true"));
        assert!(fx.app.preview().height() > 0);
        assert_eq!(fx.app.applied(), Some("a.toml"));
    }

    #[test]
    fn moving_applies_new_theme_once() {
        let mut fx = Fixture::new(&["a.toml", "b.toml"]);
        fx.pump();

        fx.key(KeyCode::Down);
        assert_eq!(applies(&fx.pump()), [fx.themes.join("b.toml")]);

        // already at the bottom: no-op
        fx.key(KeyCode::Char('j'));
        assert!(fx.pump().is_empty());

        fx.key(KeyCode::Char('k'));
        assert_eq!(applies(&fx.pump()), [fx.themes.join("a.toml")]);
        assert!(fx.config().contains("a.toml"));
        assert!(!fx.config().contains("b.toml"));
    }

    #[test]
    fn enter_descends_and_parent_returns() {
        let mut fx = Fixture::new(&["dark/", "dark/night.toml"]);
        fx.pump();
        assert_eq!(fx.app.list().selected().unwrap().name, "dark");

        fx.key(KeyCode::Enter);
        let requests = fx.pump();
        assert_eq!(fx.app.current_dir(), fx.themes.join("dark"));
        let names: Vec<&str> = fx.app.list().visible().map(|e| e.name.as_str()).collect();
        assert_eq!(names, ["..", "night.toml"]);
        assert!(applies(&requests).is_empty(), "'..' is highlighted, nothing to apply");
        assert!(fx.app.exit().is_none());

        fx.key(KeyCode::Enter);
        fx.pump();
        assert_eq!(fx.app.current_dir(), fx.themes);
    }

    #[test]
    fn enter_on_theme_applies_and_keeps() {
        let mut fx = Fixture::new(&["a.toml", "b.toml"]);
        fx.pump();
        fx.key(KeyCode::Down);
        fx.pump();

        fx.key(KeyCode::Enter);
        assert_eq!(fx.app.exit(), Some(Exit::Keep));
        assert_eq!(applies(&fx.pump()), [fx.themes.join("b.toml")]);
    }

    #[test]
    fn quit_keys_request_restore() {
        let mut fx = Fixture::new(&["a.toml"]);
        fx.pump();
        fx.key(KeyCode::Char('q'));
        assert_eq!(fx.app.exit(), Some(Exit::Restore));

        let mut fx = Fixture::new(&["a.toml"]);
        fx.app.handle(AppEvent::Key(KeyEvent::new(
            KeyCode::Char('c'),
            KeyModifiers::CONTROL,
        )));
        assert_eq!(fx.app.exit(), Some(Exit::Restore));
    }

    #[test]
    fn stale_listing_is_discarded() {
        let mut fx = Fixture::new(&["a.toml", "sub/", "sub/x.toml"]);
        let first = fx.app.take_requests();
        fx.app.request_listing(fx.themes.join("sub"));
        let second = fx.app.take_requests();

        // the newer listing lands first, then the older one arrives late
        for request in second.into_iter().chain(first) {
            let event = perform(&fx.browser, &fx.config, request);
            fx.app.handle(event);
        }
        assert_eq!(fx.app.current_dir(), fx.themes.join("sub"));
        assert_eq!(fx.app.list().visible().next().unwrap().name, "..");
    }

    #[test]
    fn listing_error_is_latched_and_only_quit_works() {
        let mut fx = Fixture::new(&[]);
        fs::remove_dir(&fx.themes).unwrap();
        fx.pump();
        let err = fx.app.error().unwrap();
        assert!(err.contains("failed to read directory"), "got: {err}");

        fx.key(KeyCode::Down);
        fx.key(KeyCode::Enter);
        assert!(fx.app.exit().is_none());
        fx.key(KeyCode::Char('q'));
        assert_eq!(fx.app.exit(), Some(Exit::Restore));
    }

    #[test]
    fn patch_error_is_latched() {
        let mut fx = Fixture::new(&["a.toml"]);
        fs::write(&fx.config, "[general").unwrap();
        fx.pump();
        let err = fx.app.error().unwrap();
        assert!(err.contains("failed to parse config file"), "got: {err}");
        assert!(err.contains("TOML parse error"), "got: {err}");
        assert!(!err.contains('\n'), "error view must be one line: {err:?}");
    }

    #[test]
    fn interrupt_ends_session_with_restore() {
        let mut fx = Fixture::new(&["a.toml"]);
        fx.pump();
        fx.app.interrupt();
        assert_eq!(fx.app.exit(), Some(Exit::Restore));

        // an interrupt also gets through a latched error
        let mut fx = Fixture::new(&[]);
        fs::remove_dir(&fx.themes).unwrap();
        fx.pump();
        assert!(fx.app.error().is_some());
        fx.app.interrupt();
        assert_eq!(fx.app.exit(), Some(Exit::Restore));
    }

    #[test]
    fn interrupt_does_not_override_keep() {
        let mut fx = Fixture::new(&["a.toml"]);
        fx.pump();
        fx.key(KeyCode::Enter);
        fx.app.interrupt();
        assert_eq!(fx.app.exit(), Some(Exit::Keep));
    }

    #[test]
    fn empty_directory_applies_nothing() {
        let mut fx = Fixture::new(&[]);
        let requests = fx.pump();
        assert!(fx.app.list().is_empty());
        assert!(applies(&requests).is_empty());
        assert!(fx.app.error().is_none());
        assert!(!fx.config().contains("import"));
    }

    #[test]
    fn filter_keys_are_text_while_editing() {
        let mut fx = Fixture::new(&["alpha.toml", "quiet.toml"]);
        fx.pump();

        fx.key(KeyCode::Char('/'));
        fx.key(KeyCode::Char('q'));
        assert!(fx.app.exit().is_none(), "'q' is filter text here");
        assert_eq!(applies(&fx.pump()), [fx.themes.join("quiet.toml")]);

        fx.key(KeyCode::Enter);
        assert!(fx.app.exit().is_none(), "enter only accepts the filter");
        assert_eq!(fx.app.list().filter_state(), FilterState::Applied);

        fx.key(KeyCode::Esc);
        assert_eq!(fx.app.list().len(), 2);
        assert_eq!(applies(&fx.pump()), [fx.themes.join("alpha.toml")]);
    }

    #[test]
    fn preview_scrolls_within_bounds() {
        let mut fx = Fixture::new(&["a.toml"]);
        fx.app.handle(AppEvent::Resize {
            width: 80,
            height: 10,
        });
        fx.pump();
        let ctrl = |c| AppEvent::Key(KeyEvent::new(KeyCode::Char(c), KeyModifiers::CONTROL));

        for _ in 0..20 {
            fx.app.handle(ctrl('d'));
        }
        let max = fx.app.preview().height() as u16 - 1;
        assert_eq!(fx.app.preview_scroll(), max);

        fx.app.handle(ctrl('u'));
        assert_eq!(fx.app.preview_scroll(), max - 5);
    }
}
