//! Stream supervisor — keeps the external transcoding process alive.
//!
//! A single long-lived `ffmpeg` process loops a fixed source asset into a
//! segmented live stream. The supervisor restarts it whenever it exits
//! unexpectedly and guarantees it is terminated on demand, with no restart
//! racing the shutdown.

use std::path::PathBuf;
use std::process::Stdio;
use std::sync::{Mutex, MutexGuard, PoisonError};

use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::TranscoderConfig;

/// Name of the stream manifest written into the media directory.
const MANIFEST: &str = "index.m3u8";

/// Detected version of the external transcoding tool.
///
/// Probed once at supervisor construction and read-only thereafter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TranscoderVersion {
    pub major: u32,
    pub minor: u32,
}

impl TranscoderVersion {
    /// Parse the first line of `ffmpeg -version` output,
    /// e.g. `ffmpeg version 4.1.3-0ubuntu1 Copyright ...`.
    fn parse(output: &str) -> Option<Self> {
        let line = output.lines().next()?;
        let rest = line.strip_prefix("ffmpeg version ")?;
        let token = rest
            .split_whitespace()
            .next()?
            .trim_start_matches(|c: char| !c.is_ascii_digit());
        let mut parts = token.split(|c: char| !c.is_ascii_digit());
        let major = parts.next()?.parse().ok()?;
        let minor = parts.next().and_then(|p| p.parse().ok()).unwrap_or(0);
        Some(Self { major, minor })
    }

    fn at_least(self, major: u32, minor: u32) -> bool {
        self.major > major || (self.major == major && self.minor >= minor)
    }
}

#[derive(Default)]
struct Inner {
    task: Option<JoinHandle<()>>,
    stop_tx: Option<watch::Sender<bool>>,
    shutting_down: bool,
}

/// Supervises the single transcoder process producing the simulated camera
/// stream.
pub struct StreamSupervisor {
    version: Option<TranscoderVersion>,
    config: TranscoderConfig,
    inner: Mutex<Inner>,
}

impl StreamSupervisor {
    /// Probe the external tool once and build the supervisor.
    ///
    /// When the probe fails (binary missing, version unparseable) the
    /// supervisor stays permanently disabled and every
    /// [`start`](Self::start) call is a no-op.
    pub async fn probe(config: TranscoderConfig) -> Self {
        let version = match Command::new("ffmpeg").arg("-version").output().await {
            Ok(out) if out.status.success() => {
                let stdout = String::from_utf8_lossy(&out.stdout);
                match TranscoderVersion::parse(&stdout) {
                    Some(version) => {
                        tracing::info!(
                            major = version.major,
                            minor = version.minor,
                            "transcoder available"
                        );
                        Some(version)
                    }
                    None => {
                        tracing::warn!("could not parse transcoder version, streaming disabled");
                        None
                    }
                }
            }
            Ok(out) => {
                tracing::warn!(status = %out.status, "transcoder probe failed, streaming disabled");
                None
            }
            Err(err) => {
                tracing::warn!(error = %err, "transcoder not found, streaming disabled");
                None
            }
        };
        Self::with_version(version, config)
    }

    /// Build a supervisor with an already-known capability.
    pub(crate) fn with_version(
        version: Option<TranscoderVersion>,
        config: TranscoderConfig,
    ) -> Self {
        Self {
            version,
            config,
            inner: Mutex::new(Inner::default()),
        }
    }

    /// Whether the supervise loop is currently active.
    #[must_use]
    pub fn is_running(&self) -> bool {
        self.lock().task.is_some()
    }

    /// Launch the transcoder and keep it alive until [`stop`](Self::stop).
    ///
    /// No-op when a process is already supervised, when the external tool
    /// is unavailable, or when the supervisor is shutting down.
    pub fn start(&self) {
        let Some(version) = self.version else {
            return;
        };
        let mut inner = self.lock();
        if inner.task.is_some() || inner.shutting_down {
            return;
        }
        let (stop_tx, stop_rx) = watch::channel(false);
        let plan = LaunchPlan {
            media_dir: self.config.media_dir.clone(),
            args: transcode_args(version, &self.config),
            debug: self.config.debug,
        };
        inner.stop_tx = Some(stop_tx);
        inner.task = Some(tokio::spawn(supervise(plan, stop_rx)));
    }

    /// Terminate the transcoder and suppress the automatic restart.
    ///
    /// The stop signal is observed by the supervise loop before the process
    /// is killed, so the exit never triggers a restart. No-op when nothing
    /// is running.
    pub async fn stop(&self) {
        let (task, stop_tx) = {
            let mut inner = self.lock();
            (inner.task.take(), inner.stop_tx.take())
        };
        if let Some(stop_tx) = stop_tx {
            let _ = stop_tx.send(true);
        }
        if let Some(task) = task {
            let _ = task.await;
        }
    }

    /// Stop and permanently gate further [`start`](Self::start) calls.
    pub async fn shutdown(&self) {
        self.lock().shutting_down = true;
        self.stop().await;
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

struct LaunchPlan {
    media_dir: PathBuf,
    args: Vec<String>,
    debug: bool,
}

/// Build the transcoder command line.
///
/// The source is looped indefinitely at native speed into a segmented
/// stream; newer tool versions get the richer playlist and segment flags.
fn transcode_args(version: TranscoderVersion, config: &TranscoderConfig) -> Vec<String> {
    let mut args: Vec<String> = [
        "-hide_banner",
        "-stream_loop",
        "-1",
        "-re",
        "-i",
    ]
    .iter()
    .map(ToString::to_string)
    .collect();
    args.push(config.source.display().to_string());
    args.extend(["-c:v", "copy", "-f", "hls", "-hls_list_size", "3"].iter().map(ToString::to_string));
    if version.at_least(4, 0) {
        args.extend(
            ["-hls_flags", "delete_segments", "-hls_playlist_type", "event"]
                .iter()
                .map(ToString::to_string),
        );
    }
    if version.at_least(4, 1) {
        args.extend(
            ["-hls_time", "2", "-hls_segment_type", "mpegts"]
                .iter()
                .map(ToString::to_string),
        );
    }
    args.push(config.media_dir.join(MANIFEST).display().to_string());
    args
}

/// Run the transcoder until stopped, restarting it on every unexpected
/// exit. Spawn failures are treated like exits and retried.
async fn supervise(plan: LaunchPlan, mut stop_rx: watch::Receiver<bool>) {
    if let Err(err) = tokio::fs::create_dir_all(&plan.media_dir).await {
        tracing::warn!(error = %err, dir = %plan.media_dir.display(), "could not create media directory");
    }
    loop {
        if *stop_rx.borrow() {
            break;
        }
        let mut command = Command::new("ffmpeg");
        command
            .args(&plan.args)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(if plan.debug {
                Stdio::piped()
            } else {
                Stdio::null()
            });
        let mut child = match command.spawn() {
            Ok(child) => child,
            Err(err) => {
                tracing::warn!(error = %err, "failed to spawn transcoder, retrying");
                continue;
            }
        };
        if plan.debug {
            if let Some(stderr) = child.stderr.take() {
                tokio::spawn(forward_stderr(stderr));
            }
        }
        tokio::select! {
            status = child.wait() => {
                match status {
                    Ok(status) => {
                        tracing::warn!(%status, "transcoder exited unexpectedly, restarting");
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "lost track of transcoder, restarting");
                    }
                }
            }
            _ = stop_rx.changed() => {
                // Past this point the exit is no longer observed, so the
                // kill below cannot trigger a restart.
                let _ = child.start_kill();
                let _ = child.wait().await;
                break;
            }
        }
    }
}

async fn forward_stderr(stderr: tokio::process::ChildStderr) {
    let mut lines = BufReader::new(stderr).lines();
    while let Ok(Some(line)) = lines.next_line().await {
        tracing::debug!(target: "transcoder", "{line}");
    }
}
