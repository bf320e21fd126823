use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::theme::THEME_EXTENSION;

/// One row of the theme list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ThemeEntry {
    pub name: String,
    pub path: PathBuf,
    pub is_directory: bool,
}

impl ThemeEntry {
    pub fn is_theme(&self) -> bool {
        !self.is_directory && has_theme_extension(&self.path)
    }
}

fn has_theme_extension(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == THEME_EXTENSION)
}

/// Lists theme files under a fixed root directory.
///
/// The root is the boundary of navigation: listing it yields no `..`
/// entry, and `..` from a direct child leads back to it.
#[derive(Debug, Clone)]
pub struct ThemeBrowser {
    root: PathBuf,
}

impl ThemeBrowser {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn is_root(&self, dir: &Path) -> bool {
        dir == self.root
    }

    /// Read `dir` and return its navigable entries.
    ///
    /// Directories come first, then theme files, each group sorted by name.
    /// Files without the theme extension are skipped.
    pub fn list(&self, dir: &Path) -> Result<Vec<ThemeEntry>> {
        let read = fs::read_dir(dir)
            .with_context(|| format!("failed to read directory {}", dir.display()))?;

        let mut entries = Vec::new();
        for entry in read {
            let entry =
                entry.with_context(|| format!("failed to read directory {}", dir.display()))?;
            let path = entry.path();
            // follow symlinks so linked theme collections can be browsed
            let is_directory = path.is_dir();
            if !is_directory && !has_theme_extension(&path) {
                continue;
            }
            entries.push(ThemeEntry {
                name: entry.file_name().to_string_lossy().into_owned(),
                path,
                is_directory,
            });
        }

        entries.sort_by(|a, b| {
            b.is_directory
                .cmp(&a.is_directory)
                .then_with(|| a.name.to_lowercase().cmp(&b.name.to_lowercase()))
        });

        if !self.is_root(dir) {
            let parent = dir
                .parent()
                .map(Path::to_path_buf)
                .unwrap_or_else(|| self.root.clone());
            entries.insert(
                0,
                ThemeEntry {
                    name: "..".to_string(),
                    path: parent,
                    is_directory: true,
                },
            );
        }

        Ok(entries)
    }
}
