//! Command interpreter: raw chat text to validated intents.
//!
//! Parsing and validation happen together here. Navigation intents carry
//! the fully resolved target [`Position`], so the executor never has to look
//! anything up again.

use crate::catalog::{find_title, Catalog};
use crate::error::AppError;
use crate::types::Position;
use std::fmt;

/// Prefix every command starts with.
pub const PREFIX: char = '$';

/// A validated command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Intent {
    Help,
    ListLibrary { detailed: bool },
    Refresh,
    /// First season, first episode of the named show.
    SwitchShow(Position),
    /// First episode of a season of the current show.
    SwitchSeason(Position),
    ListCurrentEpisodes,
    Stop,
    /// An episode of the current season.
    SkipTo(Position),
    Jump(Position),
    Start,
    /// Not a command we know; ignored without a reply.
    Unrecognized,
}

/// Why a command was refused. `Display` renders the reply.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    ShowNotFound {
        input: String,
        available: Vec<String>,
    },
    SeasonNotFound {
        input: String,
        show: String,
        available: Vec<u32>,
    },
    EpisodeNotFound {
        input: String,
        show: String,
        season: String,
    },
    EpisodeOutOfRange {
        input: String,
        len: usize,
    },
    MissingArgument {
        usage: &'static str,
    },
    MalformedJump {
        tokens: usize,
    },
}

impl Rejection {
    /// Lookup misses, as opposed to malformed input.
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Rejection::ShowNotFound { .. }
                | Rejection::SeasonNotFound { .. }
                | Rejection::EpisodeNotFound { .. }
        )
    }
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Rejection::ShowNotFound { input, available } => write!(
                f,
                "❌ **Show not found!** \"{}\"\nAvailable shows: {}",
                input,
                available.join(", ")
            ),
            Rejection::SeasonNotFound {
                input,
                show,
                available,
            } => {
                let seasons: Vec<String> = available.iter().map(u32::to_string).collect();
                write!(
                    f,
                    "❌ **Season not found!** Season \"{}\" in {}\nAvailable seasons: {}",
                    input,
                    show,
                    seasons.join(", ")
                )
            }
            Rejection::EpisodeNotFound {
                input,
                show,
                season,
            } => write!(
                f,
                "❌ **Episode not found!** \"{}\" in {} → {}\nUse `$playlist` or `$library detailed` to see available episodes.",
                input, show, season
            ),
            Rejection::EpisodeOutOfRange { input, len } => write!(
                f,
                "❌ Invalid episode number \"{}\"! Please use a number between 1 and {}",
                input, len
            ),
            Rejection::MissingArgument { usage } => write!(f, "❌ **Missing argument!** Usage: `{}`", usage),
            Rejection::MalformedJump { .. } => write!(
                f,
                "❌ **Invalid jump format!**\nUsage:\n\
                 `$jump [episode title]` - Jump to episode in current season\n\
                 `$jump [show] [season]` - Jump to first episode of show/season\n\
                 `$jump [show] [season] [episode]` - Jump to specific show/season/episode\n\
                 `$jump [show] [season] [number]` - Jump by episode number"
            ),
        }
    }
}

impl From<Rejection> for AppError {
    fn from(rejection: Rejection) -> Self {
        if rejection.is_not_found() {
            AppError::NotFound(rejection.to_string())
        } else {
            AppError::InvalidArgument(rejection.to_string())
        }
    }
}

/// Turn one line of chat into an intent, validated against the catalog and
/// the current position.
pub fn interpret(
    text: &str,
    catalog: &Catalog,
    current: &Position,
) -> Result<Intent, Rejection> {
    let text = text.trim();
    let Some(body) = text.strip_prefix(PREFIX) else {
        return Ok(Intent::Unrecognized);
    };

    let (word, rest) = match body.split_once(char::is_whitespace) {
        Some((word, rest)) => (word, rest.trim()),
        None => (body, ""),
    };

    match (word.to_lowercase().as_str(), rest) {
        ("help", "") => Ok(Intent::Help),
        ("library", "") => Ok(Intent::ListLibrary { detailed: false }),
        ("library", arg) if arg.eq_ignore_ascii_case("detailed") => {
            Ok(Intent::ListLibrary { detailed: true })
        }
        ("refresh", "") => Ok(Intent::Refresh),
        ("playlist", "") => Ok(Intent::ListCurrentEpisodes),
        ("stop", "") => Ok(Intent::Stop),
        ("start", "") => Ok(Intent::Start),
        ("show", "") => Err(Rejection::MissingArgument { usage: "$show [name]" }),
        ("show", name) => switch_show(catalog, name),
        ("season", "") => Err(Rejection::MissingArgument { usage: "$season [number]" }),
        ("season", number) => switch_season(catalog, current, number),
        ("skip", "") => Err(Rejection::MissingArgument { usage: "$skip [number]" }),
        ("skip", n) => skip_to(catalog, current, n),
        ("jump", "") => Err(Rejection::MalformedJump { tokens: 0 }),
        ("jump", args) => {
            let tokens: Vec<&str> = args.split_whitespace().collect();
            jump(catalog, current, &tokens)
        }
        _ => Ok(Intent::Unrecognized),
    }
}

fn show_not_found(catalog: &Catalog, input: &str) -> Rejection {
    Rejection::ShowNotFound {
        input: input.to_string(),
        available: catalog.list_shows().iter().map(|s| s.command_name()).collect(),
    }
}

/// Resolve `{show, season}` to the first episode of that season.
fn show_season(catalog: &Catalog, show: &str, season: &str) -> Result<Position, Rejection> {
    let found = catalog
        .resolve_show(show)
        .ok_or_else(|| show_not_found(catalog, show))?;
    let found_season = catalog
        .resolve_season(&found.name, season)
        .ok_or_else(|| Rejection::SeasonNotFound {
            input: season.to_string(),
            show: found.name.clone(),
            available: found.seasons.iter().map(|s| s.number()).collect(),
        })?;
    Ok(Position::new(&found.name, &found_season.name, 0))
}

fn switch_show(catalog: &Catalog, name: &str) -> Result<Intent, Rejection> {
    let show = catalog
        .resolve_show(name)
        .ok_or_else(|| show_not_found(catalog, name))?;
    // Build guarantees every show keeps at least one season
    let season = show
        .seasons
        .first()
        .ok_or_else(|| show_not_found(catalog, name))?;
    Ok(Intent::SwitchShow(Position::new(&show.name, &season.name, 0)))
}

fn switch_season(catalog: &Catalog, current: &Position, number: &str) -> Result<Intent, Rejection> {
    show_season(catalog, &current.show, number).map(Intent::SwitchSeason)
}

fn skip_to(catalog: &Catalog, current: &Position, input: &str) -> Result<Intent, Rejection> {
    let len = catalog
        .list_episodes(&current.show, &current.season)
        .map(<[_]>::len)
        .unwrap_or(0);

    match input.parse::<usize>() {
        Ok(n) if (1..=len).contains(&n) => Ok(Intent::SkipTo(Position::new(
            &current.show,
            &current.season,
            n - 1,
        ))),
        _ => Err(Rejection::EpisodeOutOfRange {
            input: input.to_string(),
            len,
        }),
    }
}

fn jump(catalog: &Catalog, current: &Position, tokens: &[&str]) -> Result<Intent, Rejection> {
    match tokens {
        [title] => {
            let episodes = catalog
                .list_episodes(&current.show, &current.season)
                .unwrap_or(&[]);
            let index = find_title(episodes, title).ok_or_else(|| Rejection::EpisodeNotFound {
                input: title.to_string(),
                show: current.show.clone(),
                season: current.season.clone(),
            })?;
            Ok(Intent::Jump(Position::new(&current.show, &current.season, index)))
        }
        [show, season] => show_season(catalog, show, season).map(Intent::Jump),
        [show, season, episode] => {
            let mut target = show_season(catalog, show, season)?;
            match catalog.resolve_episode(&target.show, &target.season, episode) {
                Some(index) => {
                    target.episode = index;
                    Ok(Intent::Jump(target))
                }
                None if episode.parse::<usize>().is_ok() => Err(Rejection::EpisodeOutOfRange {
                    input: episode.to_string(),
                    len: catalog
                        .list_episodes(&target.show, &target.season)
                        .map(<[_]>::len)
                        .unwrap_or(0),
                }),
                None => Err(Rejection::EpisodeNotFound {
                    input: episode.to_string(),
                    show: target.show,
                    season: target.season,
                }),
            }
        }
        _ => Err(Rejection::MalformedJump {
            tokens: tokens.len(),
        }),
    }
}
