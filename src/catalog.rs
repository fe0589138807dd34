//! Catalog index over shows, seasons and episodes.
//!
//! A [`Catalog`] is immutable once built. Refreshing builds a brand new one
//! and swaps it in, so readers never see a half-populated index.

use crate::error::{AppError, Result};
use crate::types::{EpisodeRef, Position};
use regex::Regex;
use std::sync::LazyLock;

static SEASON_DIGITS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d+").expect("valid season number pattern"));

/// A season and its episodes, in discovery order.
#[derive(Clone, Debug, PartialEq)]
pub struct SeasonEntry {
    pub name: String,
    pub episodes: Vec<EpisodeRef>,
}

impl SeasonEntry {
    /// Ordinal extracted from the season name ("Season 2" -> 2), 1 when absent.
    pub fn number(&self) -> u32 {
        season_number(&self.name)
    }
}

/// A show and its seasons, in discovery order.
#[derive(Clone, Debug, PartialEq)]
pub struct ShowEntry {
    pub name: String,
    pub seasons: Vec<SeasonEntry>,
}

impl ShowEntry {
    /// Show name with whitespace removed, as typed in `$show` and `$jump`.
    pub fn command_name(&self) -> String {
        self.name.split_whitespace().collect()
    }
}

/// Counts reported after a rebuild.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct CatalogShape {
    pub shows: usize,
    pub seasons: usize,
    pub episodes: usize,
}

/// Extract the season ordinal from a season name.
///
/// # Examples
///
/// ```
/// use season_streamer::catalog::season_number;
///
/// assert_eq!(season_number("Season 12"), 12);
/// assert_eq!(season_number("Specials"), 1);
/// ```
pub fn season_number(name: &str) -> u32 {
    SEASON_DIGITS
        .find(name)
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(1)
}

/// Lookup key for show and season names: whitespace removed, lowercased.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| !c.is_whitespace())
        .flat_map(char::to_lowercase)
        .collect()
}

/// The hierarchical show → season → episode index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Catalog {
    shows: Vec<ShowEntry>,
}

impl Catalog {
    /// Build a catalog from an enumeration, pruning empty seasons and shows.
    ///
    /// Fails with [`AppError::CatalogEmpty`] when nothing playable remains.
    pub fn build(entries: Vec<ShowEntry>) -> Result<Self> {
        let shows: Vec<ShowEntry> = entries
            .into_iter()
            .filter_map(|mut show| {
                show.seasons.retain(|season| !season.episodes.is_empty());
                (!show.seasons.is_empty()).then_some(show)
            })
            .collect();

        if shows.is_empty() {
            return Err(AppError::CatalogEmpty);
        }

        Ok(Self { shows })
    }

    pub fn shape(&self) -> CatalogShape {
        CatalogShape {
            shows: self.shows.len(),
            seasons: self.shows.iter().map(|s| s.seasons.len()).sum(),
            episodes: self
                .shows
                .iter()
                .flat_map(|s| &s.seasons)
                .map(|season| season.episodes.len())
                .sum(),
        }
    }

    pub fn list_shows(&self) -> &[ShowEntry] {
        &self.shows
    }

    pub fn list_seasons(&self, show: &str) -> Option<&[SeasonEntry]> {
        self.resolve_show(show).map(|s| s.seasons.as_slice())
    }

    pub fn list_episodes(&self, show: &str, season: &str) -> Option<&[EpisodeRef]> {
        let show = self.resolve_show(show)?;
        let key = normalize_name(season);
        show.seasons
            .iter()
            .find(|s| normalize_name(&s.name) == key)
            .map(|s| s.episodes.as_slice())
    }

    /// Find a show by name, ignoring case and whitespace.
    pub fn resolve_show(&self, name: &str) -> Option<&ShowEntry> {
        let key = normalize_name(name);
        self.shows.iter().find(|s| normalize_name(&s.name) == key)
    }

    /// Find a season of `show` by its ordinal.
    ///
    /// Only numbers are accepted; season titles never match.
    pub fn resolve_season(&self, show: &str, number: &str) -> Option<&SeasonEntry> {
        let wanted: u32 = number.trim().parse().ok()?;
        self.resolve_show(show)?
            .seasons
            .iter()
            .find(|s| s.number() == wanted)
    }

    /// Find an episode by 1-based ordinal or by exact title (case-insensitive).
    ///
    /// An ordinal within range wins over a title that happens to be numeric.
    pub fn resolve_episode(&self, show: &str, season: &str, input: &str) -> Option<usize> {
        let episodes = self.list_episodes(show, season)?;
        let input = input.trim();

        if let Ok(n) = input.parse::<usize>()
            && (1..=episodes.len()).contains(&n)
        {
            return Some(n - 1);
        }

        find_title(episodes, input)
    }

    /// Position of the first episode of the first season of the first show.
    pub fn first_position(&self) -> Option<Position> {
        let show = self.shows.first()?;
        let season = show.seasons.first()?;
        Some(Position::new(&show.name, &season.name, 0))
    }

    /// Map a position from an older catalog onto this one.
    ///
    /// Returns `None` when the position is still valid as-is. When its show
    /// or season disappeared, falls back to the first show and season; when
    /// only the episode index fell out of range, resets it to 0.
    pub fn reconcile(&self, pos: &Position) -> Option<Position> {
        match self.list_episodes(&pos.show, &pos.season) {
            Some(episodes) if pos.episode < episodes.len() => None,
            Some(_) => {
                let show = self.resolve_show(&pos.show)?;
                let key = normalize_name(&pos.season);
                let season = show.seasons.iter().find(|s| normalize_name(&s.name) == key)?;
                Some(Position::new(&show.name, &season.name, 0))
            }
            None => self.first_position(),
        }
    }
}

/// Case-insensitive exact title match.
pub fn find_title(episodes: &[EpisodeRef], title: &str) -> Option<usize> {
    let wanted = title.trim().to_lowercase();
    episodes
        .iter()
        .position(|ep| ep.title.trim().to_lowercase() == wanted)
}
