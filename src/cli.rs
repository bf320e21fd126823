use std::env;
use std::ffi::OsString;
use std::path::PathBuf;

use anyhow::{bail, Result};
use clap::Parser;

const THEMES_DIR: &str = "THEMES_DIR";
const CONFIG_FILE: &str = "CONFIG_FILE";

const ENVIRONMENT_HELP: &str = "\
Environment:
  THEMES_DIR       Root directory of the theme files to browse
  CONFIG_FILE      Alacritty config file to patch (created empty if missing)
  ALACRITHEME_LOG  Optional file to write diagnostics to";

/// Browse Alacritty color themes and preview them live.
///
/// The live config is rewritten on every selection and restored on quit.
/// Press Enter on a theme to keep it.
#[derive(Parser, Debug)]
#[command(name = "alacritheme", version, about, after_help = ENVIRONMENT_HELP)]
pub struct Cli {}

/// Where the themes live and which config file to patch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub themes_dir: PathBuf,
    pub config_file: PathBuf,
}

impl Settings {
    pub fn new(themes_dir: impl Into<PathBuf>, config_file: impl Into<PathBuf>) -> Self {
        Self {
            themes_dir: themes_dir.into(),
            config_file: config_file.into(),
        }
    }

    /// Read both paths from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var_os(key))
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<OsString>) -> Result<Self> {
        let require = |key: &str| -> Result<PathBuf> {
            match lookup(key) {
                Some(value) if !value.is_empty() => Ok(PathBuf::from(value)),
                _ => bail!("{key} is not set"),
            }
        };
        Ok(Self::new(require(THEMES_DIR)?, require(CONFIG_FILE)?))
    }
}
