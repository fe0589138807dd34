//! Text rendering for replies and announcements.

use crate::catalog::Catalog;
use crate::types::{Mode, Position};
use std::fmt::Write;

pub const GREETING: &str = "🤖 **Bot Started!** Use `$help` to see list of commands.";
pub const REMINDER: &str = "💡 **Tip:** Use `$help` to see all available commands!";

fn episode_title<'a>(catalog: &'a Catalog, pos: &Position) -> &'a str {
    catalog
        .list_episodes(&pos.show, &pos.season)
        .and_then(|eps| eps.get(pos.episode))
        .map(|ep| ep.title.as_str())
        .unwrap_or("?")
}

fn season_len(catalog: &Catalog, pos: &Position) -> usize {
    catalog
        .list_episodes(&pos.show, &pos.season)
        .map(<[_]>::len)
        .unwrap_or(0)
}

/// The `$help` text, including the current context.
pub fn help(catalog: &Catalog, pos: &Position, mode: Mode) -> String {
    let status = match mode {
        Mode::Stopped => "⏹️ Stopped",
        Mode::Playing | Mode::Jumping => "▶️ Playing",
    };

    format!(
        "🤖 **Video Streaming Bot Commands**\n\n\
         **📚 Library Navigation:**\n\
         `$library` - Show all shows and seasons with quick jump commands\n\
         `$library detailed` - Show every episode with individual jump commands\n\
         `$refresh` - Rescan the library\n\
         `$show [name]` - Switch to a different show (no spaces, e.g. Show1)\n\
         `$season [number]` - Switch to a different season (number only, e.g. 1)\n\
         `$playlist` - Show current season episodes\n\n\
         **▶️ Playback Controls:**\n\
         `$start` - Start/resume video playback\n\
         `$stop` - Stop video playback completely\n\
         `$skip [number]` - Jump to specific episode (e.g. `$skip 3`)\n\
         `$jump [title]` - Jump to episode by name in current season\n\
         `$jump [show] [season]` - Jump to first episode (e.g. `$jump Show1 2`)\n\
         `$jump [show] [season] [episode]` - Jump to specific episode by name or number\n\n\
         **🎬 Current Context:**\n\
         **Show:** {}\n\
         **Season:** {}\n\
         **Episode:** {}/{}\n\
         **Status:** {}\n\n\
         **💡 Tip:** All commands support case-insensitive matching for shows and seasons.",
        pos.show,
        pos.season,
        pos.episode + 1,
        season_len(catalog, pos),
        status
    )
}

/// The `$library` or `$library detailed` listing.
pub fn library(catalog: &Catalog, pos: &Position, detailed: bool) -> String {
    let mut out = if detailed {
        String::from("📚 **Detailed Library with Episode Commands:**\n\n")
    } else {
        String::from("📚 **Video Library with Commands:**\n\n")
    };

    for show in catalog.list_shows() {
        let is_current_show = show.name == pos.show;
        let marker = if is_current_show { "▶️ " } else { "   " };
        let cmd_name = show.command_name();
        let _ = writeln!(out, "{}**{}**", marker, show.name);

        if !detailed && let Some(first) = show.seasons.first() {
            let _ = writeln!(
                out,
                "     🎯 `$jump {} {}` - Start from beginning",
                cmd_name,
                first.number()
            );
        }

        for season in &show.seasons {
            let marker = if is_current_show && season.name == pos.season {
                "  ▶️ "
            } else {
                "     "
            };

            if detailed {
                let _ = writeln!(out, "{}**{}**", marker, season.name);
                for (i, ep) in season.episodes.iter().enumerate() {
                    let _ = writeln!(out, "       {}. {}", i + 1, ep.title);
                    let _ = writeln!(
                        out,
                        "          🎯 `$jump {} {} {}`",
                        cmd_name,
                        season.number(),
                        i + 1
                    );
                }
                out.push('\n');
            } else {
                let _ = writeln!(
                    out,
                    "{}{} ({} episodes)",
                    marker,
                    season.name,
                    season.episodes.len()
                );
                let _ = writeln!(
                    out,
                    "       🎯 `$jump {} {}` - Start {}",
                    cmd_name,
                    season.number(),
                    season.name
                );
            }
        }
        out.push('\n');
    }

    if detailed {
        let _ = write!(
            out,
            "**Current:** {} → {}, Episode {}\n💡 **Copy any `$jump` command above to jump directly to that episode!**",
            pos.show,
            pos.season,
            pos.episode + 1
        );
    } else {
        let _ = write!(
            out,
            "**Current:** {} → {}\n💡 **Copy any command above and paste it to jump directly!**",
            pos.show, pos.season
        );
    }
    out
}

/// The `$playlist` listing for the current season.
pub fn playlist(catalog: &Catalog, pos: &Position) -> String {
    let mut out = format!("🎬 **{} → {}:**\n\n", pos.show, pos.season);
    for (i, ep) in catalog
        .list_episodes(&pos.show, &pos.season)
        .unwrap_or(&[])
        .iter()
        .enumerate()
    {
        let marker = if i == pos.episode { "▶️ " } else { "   " };
        let _ = writeln!(out, "{}{}. {}", marker, i + 1, ep.title);
    }
    out.push_str("\n🔢 Use `$skip [number]` to jump to an episode");
    out.push_str("\n📚 Use `$library` to see all shows and seasons");
    out
}

/// Announcement sent when a job starts.
pub fn now_playing(catalog: &Catalog, pos: &Position) -> String {
    format!(
        "📺 **{} → {}**\n🎥 **Episode {}/{}:** {}",
        pos.show,
        pos.season,
        pos.episode + 1,
        season_len(catalog, pos),
        episode_title(catalog, pos)
    )
}

pub fn season_complete(pos: &Position) -> String {
    format!(
        "🎉 **Season Complete!** {} → {}\n🔄 **Looping back to Episode 1**",
        pos.show, pos.season
    )
}

/// Acknowledgement for a navigation command.
pub fn jumped(catalog: &Catalog, pos: &Position, resumed: bool) -> String {
    let head = if resumed {
        "▶️ **Resuming playback at:**"
    } else {
        "🎯 **Jumped to:**"
    };
    format!(
        "{} {} → {}\n🎥 **Episode {}:** {}",
        head,
        pos.show,
        pos.season,
        pos.episode + 1,
        episode_title(catalog, pos)
    )
}

pub fn starting(catalog: &Catalog, pos: &Position) -> String {
    format!(
        "▶️ **Starting playback!**\n📺 **{} → {}**\n🎥 **Episode {}:** {}",
        pos.show,
        pos.season,
        pos.episode + 1,
        episode_title(catalog, pos)
    )
}

pub fn stopped(pos: &Position) -> String {
    format!(
        "⏹️ **Video playback stopped!**\n📺 **Current:** {} → {}\n▶️ Use `$start` to resume.",
        pos.show, pos.season
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SeasonEntry, ShowEntry};
    use crate::types::EpisodeRef;

    fn catalog() -> Catalog {
        let season = |name: &str, titles: &[&str]| SeasonEntry {
            name: name.to_string(),
            episodes: titles
                .iter()
                .map(|t| EpisodeRef::from_path(format!("/m/{}.mp4", t)))
                .collect(),
        };
        Catalog::build(vec![
            ShowEntry {
                name: "Show 1".to_string(),
                seasons: vec![season("Season 1", &["A king", "claynut"]), season("Season 2", &["x"])],
            },
            ShowEntry {
                name: "Show 2".to_string(),
                seasons: vec![season("Season 1", &["y"])],
            },
        ])
        .unwrap()
    }

    #[test]
    fn test_help_shows_context() {
        let text = help(&catalog(), &Position::new("Show 1", "Season 1", 1), Mode::Stopped);
        assert!(text.contains("**Episode:** 2/2"));
        assert!(text.contains("⏹️ Stopped"));
    }

    #[test]
    fn test_library_marks_current_and_offers_jumps() {
        let text = library(&catalog(), &Position::new("Show 1", "Season 2", 0), false);
        assert!(text.contains("▶️ **Show 1**"));
        assert!(text.contains("  ▶️ Season 2 (1 episodes)"));
        assert!(text.contains("`$jump Show2 1`"));
    }

    #[test]
    fn test_library_detailed_lists_episodes() {
        let text = library(&catalog(), &Position::new("Show 1", "Season 1", 0), true);
        assert!(text.contains("2. claynut"));
        assert!(text.contains("`$jump Show1 1 2`"));
        assert!(text.contains("Episode 1"));
    }

    #[test]
    fn test_playlist_marks_current_episode() {
        let text = playlist(&catalog(), &Position::new("Show 1", "Season 1", 1));
        assert!(text.contains("   1. A king"));
        assert!(text.contains("▶️ 2. claynut"));
    }

    #[test]
    fn test_now_playing() {
        let text = now_playing(&catalog(), &Position::new("Show 1", "Season 1", 0));
        assert!(text.contains("Episode 1/2:** A king"));
    }
}
