//! The live Alacritty config: backup, theme patching and restore.
//!
//! Alacritty watches its config when `live_config_reload` is on, so writing
//! an `import` of the selected theme is enough to apply it.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use toml_edit::{Array, DocumentMut, Item, TableLike};

const GENERAL: &str = "general";
const LIVE_CONFIG_RELOAD: &str = "live_config_reload";
const IMPORT: &str = "import";

/// Create `path` as an empty file if it does not exist yet.
pub fn ensure_exists(path: &Path) -> Result<()> {
    if path.exists() {
        return Ok(());
    }
    fs::File::create(path)
        .with_context(|| format!("failed to create config file {}", path.display()))?;
    tracing::info!(path = %path.display(), "created empty config file");
    Ok(())
}

/// The config file's bytes as they were before any patch.
///
/// Only [`ConfigBackup::capture`] produces one, so a restore can never run
/// without a backup to restore from.
#[derive(Debug, Clone)]
pub struct ConfigBackup {
    path: PathBuf,
    original: Vec<u8>,
}

impl ConfigBackup {
    pub fn capture(path: &Path) -> Result<Self> {
        let original = fs::read(path)
            .with_context(|| format!("failed to back up config file {}", path.display()))?;
        tracing::debug!(path = %path.display(), bytes = original.len(), "captured config backup");
        Ok(Self {
            path: path.to_path_buf(),
            original,
        })
    }

    /// Write the captured bytes back verbatim.
    pub fn restore(&self) -> Result<()> {
        write_atomic(&self.path, &self.original)
            .with_context(|| format!("failed to restore config file {}", self.path.display()))?;
        tracing::info!(path = %self.path.display(), "restored config from backup");
        Ok(())
    }
}

/// Point the config at `theme`: enable live reload and import only that file.
///
/// The config is re-read from disk every time so external edits are kept.
/// Everything except the two written keys is left as it was, comments
/// included.
pub fn apply_theme(config_file: &Path, theme: &Path) -> Result<()> {
    let content = fs::read_to_string(config_file)
        .with_context(|| format!("failed to read config file {}", config_file.display()))?;
    let patched = patch(&content, theme)
        .with_context(|| format!("failed to parse config file {}", config_file.display()))?;
    write_atomic(config_file, patched.as_bytes())
        .with_context(|| format!("failed to write config file {}", config_file.display()))?;
    tracing::info!(theme = %theme.display(), "applied theme");
    Ok(())
}

/// Patch config `content` in memory. An empty document is valid input.
pub fn patch(content: &str, theme: &Path) -> Result<String> {
    let mut doc = content.parse::<DocumentMut>()?;

    let theme = theme.to_string_lossy().into_owned();

    match doc.get_mut(GENERAL).and_then(Item::as_table_like_mut) {
        Some(general) => set_theme_keys(general, theme),
        None => set_theme_keys(doc.as_table_mut(), theme),
    }

    Ok(doc.to_string())
}

fn set_theme_keys(table: &mut dyn TableLike, theme: String) {
    let mut import = Array::new();
    import.push(theme);
    table.insert(LIVE_CONFIG_RELOAD, toml_edit::value(true));
    table.insert(IMPORT, toml_edit::value(import));
}

/// Replace `path`'s content without ever leaving it half written.
///
/// Symlinks are resolved first so a linked dotfile keeps its link, and the
/// original permissions carry over to the new file.
fn write_atomic(path: &Path, content: &[u8]) -> Result<()> {
    let target = fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf());
    let dir = match target.parent() {
        Some(dir) if !dir.as_os_str().is_empty() => dir,
        _ => Path::new("."),
    };

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(content)?;
    tmp.as_file().sync_all()?;
    if let Ok(meta) = fs::metadata(&target) {
        fs::set_permissions(tmp.path(), meta.permissions())?;
    }
    tmp.persist(&target)?;
    Ok(())
}
