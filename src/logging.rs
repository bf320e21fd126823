use std::env;
use std::fs::OpenOptions;
use std::path::PathBuf;
use std::sync::OnceLock;

/// Names the file diagnostics are appended to. Unset means no logging.
pub const LOG_ENV: &str = "ALACRITHEME_LOG";

static TRACING_INIT: OnceLock<()> = OnceLock::new();

pub fn log_path() -> Option<PathBuf> {
    env::var_os(LOG_ENV)
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
}

/// Install a file-backed subscriber. The terminal belongs to the UI, so
/// nothing is ever logged to stdout or stderr.
pub fn init() {
    let Some(path) = log_path() else {
        return;
    };

    let _ = TRACING_INIT.get_or_init(|| {
        let file = match OpenOptions::new().create(true).append(true).open(&path) {
            Ok(file) => file,
            Err(_) => return,
        };
        let subscriber = tracing_subscriber::fmt()
            .with_writer(file)
            .with_ansi(false)
            .with_target(false)
            .with_max_level(tracing::Level::DEBUG)
            .finish();
        let _ = tracing::subscriber::set_global_default(subscriber);
    });
}
