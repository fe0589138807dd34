//! Catalog sources.
//!
//! A source enumerates the raw show → season → episode structure; the
//! [`Catalog`](crate::catalog::Catalog) does the pruning and indexing.

use crate::catalog::{season_number, SeasonEntry, ShowEntry};
use crate::error::{AppError, Result};
use crate::types::EpisodeRef;
use log::{debug, warn};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// File extensions treated as playable episodes when scanning directories.
pub const VIDEO_EXTENSIONS: &[&str] = &["mp4", "mkv", "webm", "mov", "avi", "m4v"];

/// Something that can enumerate the library.
pub trait CatalogSource: Send + Sync {
    fn enumerate(&self) -> Result<Vec<ShowEntry>>;
}

/// Scans `<root>/<Show>/<Season>/<episode>`.
#[derive(Debug, Clone)]
pub struct DirectorySource {
    root: PathBuf,
}

impl DirectorySource {
    pub fn new<P: Into<PathBuf>>(root: P) -> Self {
        Self { root: root.into() }
    }

    fn subdirs(dir: &Path) -> Result<Vec<(String, PathBuf)>> {
        let mut dirs = Vec::new();
        for entry in fs::read_dir(dir)? {
            let entry = entry?;
            let path = entry.path();
            if path.is_dir() {
                dirs.push((entry.file_name().to_string_lossy().into_owned(), path));
            }
        }
        dirs.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(dirs)
    }

    fn episodes(dir: &Path) -> Result<Vec<EpisodeRef>> {
        let mut files: Vec<PathBuf> = Vec::new();
        for entry in fs::read_dir(dir)? {
            let path = entry?.path();
            if path.is_file() && is_video(&path) {
                files.push(path);
            }
        }
        files.sort();
        Ok(files.into_iter().map(EpisodeRef::from_path).collect())
    }
}

impl CatalogSource for DirectorySource {
    fn enumerate(&self) -> Result<Vec<ShowEntry>> {
        if !self.root.is_dir() {
            return Err(AppError::NotFound(format!(
                "library directory '{}'",
                self.root.display()
            )));
        }

        let mut shows = Vec::new();
        for (show_name, show_dir) in Self::subdirs(&self.root)? {
            let mut seasons = Vec::new();
            for (season_name, season_dir) in Self::subdirs(&show_dir)? {
                match Self::episodes(&season_dir) {
                    Ok(episodes) => seasons.push(SeasonEntry {
                        name: season_name,
                        episodes,
                    }),
                    Err(e) => warn!("Skipping {}: {}", season_dir.display(), e),
                }
            }
            seasons.sort_by(|a, b| {
                season_number(&a.name)
                    .cmp(&season_number(&b.name))
                    .then_with(|| a.name.cmp(&b.name))
            });
            debug!("Scanned {} ({} seasons)", show_name, seasons.len());
            shows.push(ShowEntry {
                name: show_name,
                seasons,
            });
        }

        Ok(shows)
    }
}

fn is_video(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| VIDEO_EXTENSIONS.contains(&e.to_lowercase().as_str()))
        .unwrap_or(false)
}

#[derive(Debug, Deserialize)]
struct LibraryTable {
    #[serde(default)]
    shows: Vec<TableShow>,
}

#[derive(Debug, Deserialize)]
struct TableShow {
    name: String,
    #[serde(default)]
    seasons: Vec<TableSeason>,
}

#[derive(Debug, Deserialize)]
struct TableSeason {
    name: String,
    #[serde(default)]
    episodes: Vec<String>,
}

/// A static library table read from a TOML file.
///
/// ```toml
/// [[shows]]
/// name = "Show 1"
///
/// [[shows.seasons]]
/// name = "Season 1"
/// episodes = ["/media/A king.mp4", "/media/claynut.mp4"]
/// ```
#[derive(Debug, Clone)]
pub struct TableSource {
    path: PathBuf,
}

impl TableSource {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    /// Parse a table from TOML text, preserving listed order.
    pub fn parse(content: &str) -> Result<Vec<ShowEntry>> {
        let table: LibraryTable = toml::from_str(content)?;
        Ok(table
            .shows
            .into_iter()
            .map(|show| ShowEntry {
                name: show.name,
                seasons: show
                    .seasons
                    .into_iter()
                    .map(|season| SeasonEntry {
                        name: season.name,
                        episodes: season.episodes.iter().map(EpisodeRef::from_path).collect(),
                    })
                    .collect(),
            })
            .collect())
    }
}

impl CatalogSource for TableSource {
    fn enumerate(&self) -> Result<Vec<ShowEntry>> {
        let content = fs::read_to_string(&self.path)?;
        Self::parse(&content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, b"").unwrap();
    }

    #[test]
    fn test_directory_scan_orders_and_filters() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        touch(&root.join("Show 1/Season 10/z.mp4"));
        touch(&root.join("Show 1/Season 2/b.mkv"));
        touch(&root.join("Show 1/Season 2/a.mp4"));
        touch(&root.join("Show 1/Season 2/notes.txt"));
        touch(&root.join("Show 2/Season 1/x.webm"));

        let shows = DirectorySource::new(root).enumerate().unwrap();
        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].name, "Show 1");

        let seasons: Vec<&str> = shows[0].seasons.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(seasons, vec!["Season 2", "Season 10"]);

        let titles: Vec<&str> = shows[0].seasons[0]
            .episodes
            .iter()
            .map(|e| e.title.as_str())
            .collect();
        assert_eq!(titles, vec!["a", "b"]);
    }

    #[test]
    fn test_directory_scan_missing_root() {
        let result = DirectorySource::new("/definitely/not/here").enumerate();
        assert!(matches!(result, Err(AppError::NotFound(_))));
    }

    #[test]
    fn test_table_parse_preserves_order() {
        let shows = TableSource::parse(
            r#"
            [[shows]]
            name = "Show 1"

            [[shows.seasons]]
            name = "Season 1"
            episodes = ["C:/Users/admin/Desktop/A king.mp4", "/m/claynut.mp4"]

            [[shows]]
            name = "Show 2"
            "#,
        )
        .unwrap();

        assert_eq!(shows.len(), 2);
        assert_eq!(shows[0].seasons[0].episodes[0].title, "A king");
        assert_eq!(shows[0].seasons[0].episodes[1].title, "claynut");
        assert!(shows[1].seasons.is_empty());
    }

    #[test]
    fn test_table_parse_error() {
        assert!(TableSource::parse("[[shows]]\nname = ").is_err());
    }

    #[test]
    fn test_is_video() {
        assert!(is_video(Path::new("/a/b.MP4")));
        assert!(!is_video(Path::new("/a/b.srt")));
        assert!(!is_video(Path::new("/a/b")));
    }
}
