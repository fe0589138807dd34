//! Unattended, continuous playback of a show → season → episode library.
//!
//! season-streamer pushes episodes one after another into a single output
//! sink (an RTMP ingest, by default through ffmpeg) and takes chat-style
//! `$` commands that redirect, stop or resume playback at any time.
//!
//! # Features
//!
//! - Library from a directory tree or a static TOML table
//! - Auto-advance with season looping
//! - `$show`, `$season`, `$skip` and `$jump` navigation that safely cancels
//!   the running encoder
//! - Replies to stdout or a chat webhook
//!
//! # Usage
//!
//! ```bash
//! # Stream a directory of shows
//! cargo run -- --library-dir /srv/media --output rtmp://live.example/app/key
//!
//! # Then type commands on stdin
//! $library
//! $jump Show1 2
//! ```

pub mod catalog;
pub mod command;
pub mod config;
pub mod encoder;
pub mod error;
pub mod executor;
pub mod job;
pub mod library;
pub mod outbox;
pub mod render;
pub mod sequencer;
pub mod types;
