//! Command executor: applies validated intents to the sequencer.

use crate::catalog::Catalog;
use crate::command::{interpret, Intent};
use crate::error::AppError;
use crate::render;
use crate::sequencer::Sequencer;
use crate::types::Mode;
use log::{info, warn};

/// Interpret one line of chat and apply it, queuing the reply.
pub fn execute(seq: &mut Sequencer, text: &str) {
    let state = &seq.state;
    match interpret(text, &state.catalog, &state.position) {
        Ok(intent) => apply(seq, intent),
        Err(rejection) => {
            info!("Rejected {:?}: {}", text.trim(), AppError::from(rejection.clone()));
            seq.outbox.send(rejection.to_string());
        }
    }
}

/// Apply an already validated intent.
pub fn apply(seq: &mut Sequencer, intent: Intent) {
    match intent {
        Intent::Unrecognized => {}
        Intent::Help => {
            let state = &seq.state;
            seq.outbox
                .send(render::help(&state.catalog, &state.position, state.mode));
        }
        Intent::ListLibrary { detailed } => {
            let state = &seq.state;
            seq.outbox
                .send(render::library(&state.catalog, &state.position, detailed));
        }
        Intent::ListCurrentEpisodes => {
            let state = &seq.state;
            seq.outbox
                .send(render::playlist(&state.catalog, &state.position));
        }
        Intent::Refresh => refresh(seq),
        Intent::Stop => {
            if seq.stop() {
                seq.outbox.send(render::stopped(seq.position()));
            } else {
                seq.outbox.send("⏹️ Playback is already stopped.");
            }
        }
        Intent::Start => {
            if seq.start() {
                let state = &seq.state;
                seq.outbox
                    .send(render::starting(&state.catalog, &state.position));
            } else {
                seq.outbox.send("▶️ Video is already playing!");
            }
        }
        Intent::SwitchShow(target) => {
            // Always restarts, even when the show is already active
            let reply = format!(
                "📺 **Switched to Show:** {}\n🎬 **Season:** {}",
                target.show, target.season
            );
            seq.navigate(target);
            seq.outbox.send(reply);
        }
        Intent::SwitchSeason(target) => {
            let reply = format!(
                "🎬 **Switched to Season:** {} in {}",
                target.season, target.show
            );
            seq.navigate(target);
            seq.outbox.send(reply);
        }
        Intent::SkipTo(target) | Intent::Jump(target) => {
            if &target == seq.position() {
                seq.outbox.send("▶️ Already playing this episode!");
                return;
            }

            let mode = seq.mode();

            seq.navigate(target);
            let state = &seq.state;
            seq.outbox.send(render::jumped(
                &state.catalog,
                &state.position,
                mode == Mode::Stopped,
            ));
        }
    }
}

/// Rebuild the catalog from its source and swap it in.
///
/// An empty or unreadable library leaves the current catalog untouched.
fn refresh(seq: &mut Sequencer) {
    let built = seq.source.enumerate().and_then(Catalog::build);
    let catalog = match built {
        Ok(catalog) => catalog,
        Err(AppError::CatalogEmpty) => {
            warn!("Refresh found no playable episodes, keeping previous catalog");
            seq.outbox
                .send("❌ **Refresh rejected:** no playable episodes found. Keeping the current library.");
            return;
        }
        Err(e) => {
            warn!("Refresh failed: {}", e);
            seq.outbox.send(format!("❌ **Refresh failed:** {}", e));
            return;
        }
    };

    let shape = catalog.shape();
    info!(
        "Catalog refreshed: {} shows, {} seasons, {} episodes",
        shape.shows, shape.seasons, shape.episodes
    );

    let mut reply = format!(
        "🔄 **Library refreshed:** {} shows, {} seasons, {} episodes",
        shape.shows, shape.seasons, shape.episodes
    );

    if let Some(reset) = seq.replace_catalog(catalog) {
        reply.push_str(&format!(
            "\n⚠️ Current episode is gone, moving to {} → {}",
            reset.show, reset.season
        ));
        if seq.mode() == Mode::Stopped {
            seq.state.position = reset;
        } else {
            seq.navigate(reset);
        }
    }

    seq.outbox.send(reply);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{SeasonEntry, ShowEntry};
    use crate::error::Result;
    use crate::job::PlaybackLauncher;
    use crate::library::CatalogSource;
    use crate::outbox::Outbox;
    use crate::sequencer::Timing;
    use crate::types::{EpisodeRef, Position, QualityConfig};
    use async_trait::async_trait;
    use std::sync::{Arc, Mutex};
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    struct Hold;

    #[async_trait]
    impl PlaybackLauncher for Hold {
        async fn play(
            &self,
            _episode: &EpisodeRef,
            _quality: &QualityConfig,
            cancel: CancellationToken,
        ) -> Result<()> {
            cancel.cancelled().await;
            Ok(())
        }
    }

    #[derive(Default)]
    struct Swappable(Mutex<Vec<ShowEntry>>);

    impl CatalogSource for Swappable {
        fn enumerate(&self) -> Result<Vec<ShowEntry>> {
            Ok(self.0.lock().unwrap().clone())
        }
    }

    fn season(name: &str, titles: &[&str]) -> SeasonEntry {
        SeasonEntry {
            name: name.to_string(),
            episodes: titles
                .iter()
                .map(|t| EpisodeRef::from_path(format!("/m/{}.mp4", t)))
                .collect(),
        }
    }

    fn show1() -> ShowEntry {
        ShowEntry {
            name: "Show 1".to_string(),
            seasons: vec![
                season("Season 1", &["A king", "burgers_on_my_mind", "claynut"]),
                season("Season 2", &["changing_your_name", "Italian food"]),
            ],
        }
    }

    fn show2() -> ShowEntry {
        ShowEntry {
            name: "Show 2".to_string(),
            seasons: vec![season("Season 1", &["me_and_grandma", "OddClappas", "third"])],
        }
    }

    fn setup() -> (Sequencer, Arc<Swappable>, mpsc::UnboundedReceiver<String>) {
        let source = Arc::new(Swappable(Mutex::new(vec![show1(), show2()])));
        let (outbox, rx) = Outbox::new();
        let seq = Sequencer::new(
            Catalog::build(vec![show1(), show2()]).unwrap(),
            source.clone(),
            Arc::new(Hold),
            QualityConfig::default(),
            Timing::default(),
            outbox,
        )
        .unwrap();
        (seq, source, rx)
    }

    fn last_reply(rx: &mut mpsc::UnboundedReceiver<String>) -> String {
        let mut last = String::new();
        while let Ok(msg) = rx.try_recv() {
            last = msg;
        }
        last
    }

    #[tokio::test(start_paused = true)]
    async fn test_skip_to_current_episode_is_noop() {
        let (mut seq, _source, mut rx) = setup();
        seq.start();
        execute(&mut seq, "$skip 1");

        assert!(last_reply(&mut rx).contains("Already playing"));
        assert_eq!(seq.mode(), Mode::Playing);
        assert_eq!(seq.active_seq(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_stop_then_skip_resumes() {
        let (mut seq, _source, mut rx) = setup();
        seq.start();
        execute(&mut seq, "$stop");
        assert_eq!(seq.mode(), Mode::Stopped);
        seq.step().await; // cancelled job settles

        execute(&mut seq, "$skip 3");
        assert!(last_reply(&mut rx).contains("Resuming"));
        assert_eq!(seq.mode(), Mode::Jumping);

        seq.step().await; // jump settle delay
        assert_eq!(seq.mode(), Mode::Playing);
        assert_eq!(seq.active_seq(), Some(2));
        assert_eq!(seq.position().episode, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_navigate_to_current_while_stopped_is_noop() {
        let (mut seq, _source, mut rx) = setup();

        execute(&mut seq, "$skip 1");
        assert!(last_reply(&mut rx).contains("Already playing"));
        assert_eq!(seq.mode(), Mode::Stopped);

        execute(&mut seq, "$jump Show1 1 1");
        assert!(last_reply(&mut rx).contains("Already playing"));
        assert_eq!(seq.mode(), Mode::Stopped);
        assert_eq!(seq.active_seq(), None);
        assert_eq!(seq.episodes_started(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_switch_show_same_show_resets() {
        let (mut seq, _source, _rx) = setup();
        seq.start();
        execute(&mut seq, "$jump Show1 2 2");
        seq.step().await; // settle
        seq.step().await; // wake
        assert_eq!(seq.position(), &Position::new("Show 1", "Season 2", 1));

        execute(&mut seq, "$show Show1");
        assert_eq!(seq.position(), &Position::new("Show 1", "Season 1", 0));
        assert_eq!(seq.mode(), Mode::Jumping);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rejection_changes_nothing() {
        let (mut seq, _source, mut rx) = setup();
        execute(&mut seq, "$jump Nowhere 1");
        assert!(last_reply(&mut rx).contains("Show not found"));
        assert_eq!(seq.mode(), Mode::Stopped);
        assert_eq!(seq.position(), &Position::new("Show 1", "Season 1", 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_start_twice() {
        let (mut seq, _source, mut rx) = setup();
        execute(&mut seq, "$start");
        assert!(last_reply(&mut rx).contains("Starting playback"));
        execute(&mut seq, "$start");
        assert!(last_reply(&mut rx).contains("already playing"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_removing_current_show_resets_position() {
        let (mut seq, source, mut rx) = setup();
        execute(&mut seq, "$jump Show2 1 2");
        seq.step().await; // wake, job starts on Show 2
        assert_eq!(seq.mode(), Mode::Playing);

        *source.0.lock().unwrap() = vec![show1()];
        execute(&mut seq, "$refresh");

        let reply = last_reply(&mut rx);
        assert!(reply.contains("1 shows"));
        assert_eq!(seq.position(), &Position::new("Show 1", "Season 1", 0));
        assert_eq!(seq.mode(), Mode::Jumping);
        assert!(seq.state().catalog.resolve_show("Show2").is_none());
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_while_stopped_only_moves_cursor() {
        let (mut seq, source, _rx) = setup();
        execute(&mut seq, "$jump Show2 1 2");
        execute(&mut seq, "$stop");

        *source.0.lock().unwrap() = vec![show1()];
        execute(&mut seq, "$refresh");
        assert_eq!(seq.mode(), Mode::Stopped);
        assert_eq!(seq.position(), &Position::new("Show 1", "Season 1", 0));
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_empty_keeps_catalog() {
        let (mut seq, source, mut rx) = setup();
        source.0.lock().unwrap().clear();
        execute(&mut seq, "$refresh");

        assert!(last_reply(&mut rx).contains("Refresh rejected"));
        assert_eq!(seq.state().catalog.shape().shows, 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_keeps_valid_position() {
        let (mut seq, source, mut rx) = setup();
        execute(&mut seq, "$jump Show2 1 2");
        seq.step().await; // wake, job starts on Show 2
        assert_eq!(seq.active_seq(), Some(1));

        source.0.lock().unwrap()[0].seasons.pop();
        execute(&mut seq, "$refresh");

        let reply = last_reply(&mut rx);
        assert!(reply.contains("2 shows, 2 seasons"));
        assert!(!reply.contains("Current episode is gone"));
        assert_eq!(seq.position(), &Position::new("Show 2", "Season 1", 1));
        assert_eq!(seq.mode(), Mode::Playing);
        assert_eq!(seq.active_seq(), Some(1));
        assert!(seq.state().catalog.resolve_season("Show 1", "2").is_none());
    }

    struct Unreadable;

    impl CatalogSource for Unreadable {
        fn enumerate(&self) -> Result<Vec<ShowEntry>> {
            Err(AppError::NotFound("/srv/media".to_string()))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_refresh_source_error_keeps_catalog() {
        let (outbox, mut rx) = Outbox::new();
        let mut seq = Sequencer::new(
            Catalog::build(vec![show1(), show2()]).unwrap(),
            Arc::new(Unreadable),
            Arc::new(Hold),
            QualityConfig::default(),
            Timing::default(),
            outbox,
        )
        .unwrap();
        seq.start();

        execute(&mut seq, "$refresh");

        assert!(last_reply(&mut rx).contains("Refresh failed"));
        assert_eq!(seq.state().catalog.shape().shows, 2);
        assert_eq!(seq.position(), &Position::new("Show 1", "Season 1", 0));
        assert_eq!(seq.mode(), Mode::Playing);
        assert_eq!(seq.active_seq(), Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_informational_commands_reply() {
        let (mut seq, _source, mut rx) = setup();
        execute(&mut seq, "$playlist");
        assert!(last_reply(&mut rx).contains("1. A king"));
        execute(&mut seq, "$library");
        assert!(last_reply(&mut rx).contains("`$jump Show2 1`"));
        execute(&mut seq, "$help");
        assert!(last_reply(&mut rx).contains("**Status:** ⏹️ Stopped"));
        execute(&mut seq, "just chatting");
        assert!(rx.try_recv().is_err());
    }
}
