use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, Sender};
use std::thread::{self, JoinHandle};

use anyhow::{Context, Result};

use crate::browser::ThemeBrowser;
use crate::live_config;

use super::app::AppEvent;

/// Slow work the UI thread hands off.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    /// List `dir`; `seq` identifies the request so stale results can be dropped.
    ListDir { seq: u64, dir: PathBuf },
    /// Patch the live config to import `path`.
    Apply { path: PathBuf },
}

/// Run one request to completion and describe the outcome as an event.
pub fn perform(browser: &ThemeBrowser, config_file: &Path, request: Request) -> AppEvent {
    match request {
        Request::ListDir { seq, dir } => {
            let result = browser.list(&dir);
            AppEvent::FilesLoaded { seq, dir, result }
        }
        Request::Apply { path } => {
            let result = live_config::apply_theme(config_file, &path);
            AppEvent::ThemeApplied { path, result }
        }
    }
}

/// A single background thread that runs requests in submission order.
///
/// Patches therefore never interleave on disk, and [`Worker::shutdown`]
/// returns only once every submitted request has been carried out.
pub struct Worker {
    requests: Option<Sender<Request>>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    pub fn spawn(
        browser: ThemeBrowser,
        config_file: PathBuf,
        events: Sender<AppEvent>,
    ) -> Result<Self> {
        let (tx, rx) = mpsc::channel::<Request>();
        let handle = thread::Builder::new()
            .name("alacritheme-worker".to_string())
            .spawn(move || run(rx, &browser, &config_file, &events))
            .context("failed to start background worker")?;
        Ok(Self {
            requests: Some(tx),
            handle: Some(handle),
        })
    }

    pub fn submit(&self, request: Request) {
        let sent = self
            .requests
            .as_ref()
            .is_some_and(|tx| tx.send(request).is_ok());
        if !sent {
            tracing::warn!("worker is gone, request dropped");
        }
    }

    /// Finish all pending requests and stop the thread.
    pub fn shutdown(&mut self) {
        drop(self.requests.take());
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("worker thread panicked");
            }
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.shutdown();
    }
}

fn run(
    rx: Receiver<Request>,
    browser: &ThemeBrowser,
    config_file: &Path,
    events: &Sender<AppEvent>,
) {
    for request in rx {
        tracing::debug!(?request, "worker picked up request");
        // the UI may already be gone; the work itself still had to happen
        let _ = events.send(perform(browser, config_file, request));
    }
}
