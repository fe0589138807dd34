//! Encoder collaborator backed by an `ffmpeg` child process.
//!
//! Each job spawns one encoder that reads the episode in real time and
//! pushes it to the configured output URL.

use crate::error::{AppError, Result};
use crate::job::PlaybackLauncher;
use crate::types::{EpisodeRef, QualityConfig};
use async_trait::async_trait;
use log::{debug, info, warn};
use std::process::Stdio;
use tokio::process::Command;
use tokio_util::sync::CancellationToken;

/// Spawns the encoder binary for every episode.
#[derive(Debug, Clone)]
pub struct FfmpegLauncher {
    /// Encoder executable, usually `ffmpeg`
    pub program: String,
    /// Destination, e.g. an RTMP ingest URL
    pub output_url: String,
    /// Container format for the destination (`flv` for RTMP)
    pub output_format: String,
    /// Extra arguments inserted before the input
    pub extra_args: Vec<String>,
}

/// Map a codec family name onto an ffmpeg encoder.
///
/// # Examples
///
/// ```
/// use season_streamer::encoder::video_encoder;
///
/// assert_eq!(video_encoder("h264"), "libx264");
/// assert_eq!(video_encoder("VP9"), "libvpx-vp9");
/// ```
pub fn video_encoder(codec: &str) -> &'static str {
    match codec.to_uppercase().as_str() {
        "H265" | "HEVC" => "libx265",
        "VP8" => "libvpx",
        "VP9" => "libvpx-vp9",
        "AV1" => "libsvtav1",
        _ => "libx264",
    }
}

impl FfmpegLauncher {
    /// Build the full argument list for one episode.
    pub fn build_args(&self, episode: &EpisodeRef, quality: &QualityConfig) -> Vec<String> {
        let encoder = video_encoder(&quality.video_codec);
        let mut args: Vec<String> = self.extra_args.clone();

        args.extend([
            "-re".to_string(),
            "-i".to_string(),
            episode.source.to_string_lossy().into_owned(),
            "-vf".to_string(),
            format!("scale=-2:{}", quality.height),
            "-r".to_string(),
            quality.frame_rate.to_string(),
            "-c:v".to_string(),
            encoder.to_string(),
        ]);

        if matches!(encoder, "libx264" | "libx265") {
            args.push("-preset".to_string());
            args.push(quality.preset.clone());
        }

        args.extend([
            "-b:v".to_string(),
            format!("{}k", quality.bitrate_kbps),
            "-maxrate".to_string(),
            format!("{}k", quality.max_bitrate_kbps),
            "-bufsize".to_string(),
            format!("{}k", quality.max_bitrate_kbps * 2),
            "-c:a".to_string(),
            "aac".to_string(),
            "-f".to_string(),
            self.output_format.clone(),
            self.output_url.clone(),
        ]);

        args
    }
}

#[async_trait]
impl PlaybackLauncher for FfmpegLauncher {
    async fn play(
        &self,
        episode: &EpisodeRef,
        quality: &QualityConfig,
        cancel: CancellationToken,
    ) -> Result<()> {
        let args = self.build_args(episode, quality);
        debug!("{} {}", self.program, args.join(" "));

        let mut child = Command::new(&self.program)
            .args(&args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::inherit())
            .kill_on_drop(true)
            .spawn()
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    AppError::Collaborator(format!("{} not found in PATH", self.program))
                } else {
                    AppError::Collaborator(format!("Failed to start {}: {}", self.program, e))
                }
            })?;

        tokio::select! {
            status = child.wait() => {
                let status = status?;
                if status.success() {
                    info!("Encoder finished {}", episode.title);
                    Ok(())
                } else {
                    Err(AppError::Collaborator(format!(
                        "{} exited with status: {}",
                        self.program,
                        status.code().unwrap_or(-1)
                    )))
                }
            }
            _ = cancel.cancelled() => {
                if let Err(e) = child.kill().await {
                    warn!("Failed to kill encoder for {}: {}", episode.title, e);
                }
                debug!("Encoder for {} terminated", episode.title);
                Ok(())
            }
        }
    }
}
