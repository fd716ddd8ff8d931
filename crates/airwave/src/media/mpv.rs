//! External-player media handle
//!
//! Drives one `mpv` process per stream through its JSON IPC socket. A
//! worker thread connects to the socket, watches player events, and turns
//! them into tagged `MediaEvent`s. Killing the process is how a stream is
//! torn down.

use std::io::{BufRead, BufReader, Write};
use std::os::unix::net::UnixStream;
use std::path::{Path, PathBuf};
use std::process::{Child, Command, Stdio};
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use crossbeam_channel::Sender;
use serde_json::{json, Value};
use tracing::{debug, info, warn};

use crate::config::media::{DEFAULT_PLAYER, IPC_CONNECT_TIMEOUT_MS, IPC_POLL_INTERVAL_MS};
use crate::error::{AirwaveError, Result};

use super::types::{MediaEvent, MediaEventKind, MediaHandle, RequestToken};

/// Observer id for the `paused-for-cache` property
const CACHE_OBSERVER_ID: u64 = 1;

type SharedWriter = Arc<Mutex<Option<UnixStream>>>;

/// One running player process
struct PlayerProcess {
    child: Arc<Mutex<Child>>,
    writer: SharedWriter,
    cancelled: Arc<AtomicBool>,
    socket_path: PathBuf,
    token: RequestToken,
}

/// Media handle backed by an external `mpv` binary
pub struct MpvHandle {
    player: String,
    extra_args: Vec<String>,
    socket_dir: PathBuf,
    events: Sender<MediaEvent>,
    /// Volume in percent, shared with the IPC worker of the running stream
    volume: Arc<AtomicU32>,
    process: Option<PlayerProcess>,
}

impl MpvHandle {
    /// Create a handle using the default `mpv` binary
    pub fn new(events: Sender<MediaEvent>) -> Self {
        Self::with_player(DEFAULT_PLAYER, events)
    }

    /// Create a handle for a specific player binary (path or name on `PATH`)
    pub fn with_player(player: impl Into<String>, events: Sender<MediaEvent>) -> Self {
        Self {
            player: player.into(),
            extra_args: Vec::new(),
            socket_dir: std::env::temp_dir(),
            events,
            volume: Arc::new(AtomicU32::new(100)),
            process: None,
        }
    }

    /// Extra command-line arguments passed to every player process
    pub fn with_args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.extra_args = args.into_iter().map(Into::into).collect();
        self
    }

    /// Token of the stream currently owned by this handle
    pub fn current_token(&self) -> Option<RequestToken> {
        self.process.as_ref().map(|p| p.token)
    }

    fn socket_path(&self, token: RequestToken) -> PathBuf {
        self.socket_dir
            .join(format!("airwave-mpv-{}-{}.sock", std::process::id(), token.0))
    }

    fn volume_percent(&self) -> u32 {
        self.volume.load(Ordering::SeqCst)
    }

    fn send_command(&self, command: Value) -> Result<()> {
        let process = self
            .process
            .as_ref()
            .ok_or_else(|| AirwaveError::Media("no stream loaded".to_string()))?;

        let mut guard = process.writer.lock().unwrap_or_else(|e| e.into_inner());
        let stream = guard
            .as_mut()
            .ok_or_else(|| AirwaveError::Media("player is not ready yet".to_string()))?;

        write_command(stream, command)
    }
}

fn write_command(stream: &mut UnixStream, command: Value) -> Result<()> {
    let mut line = serde_json::to_vec(&json!({ "command": command }))?;
    line.push(b'\n');
    stream.write_all(&line)?;
    Ok(())
}

impl MediaHandle for MpvHandle {
    fn load(&mut self, url: &str, token: RequestToken) -> Result<()> {
        self.stop();

        let socket_path = self.socket_path(token);
        let _ = std::fs::remove_file(&socket_path);

        let child = Command::new(&self.player)
            .arg("--no-video")
            .arg("--no-terminal")
            .arg("--idle=no")
            .arg(format!("--volume={}", self.volume_percent()))
            .arg(format!("--input-ipc-server={}", socket_path.display()))
            .args(&self.extra_args)
            .arg("--")
            .arg(url)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .spawn()
            .map_err(|e| AirwaveError::Media(format!("cannot start '{}': {e}", self.player)))?;

        info!(%token, url, pid = child.id(), "player started");

        let process = PlayerProcess {
            child: Arc::new(Mutex::new(child)),
            writer: Arc::new(Mutex::new(None)),
            cancelled: Arc::new(AtomicBool::new(false)),
            socket_path,
            token,
        };

        let worker = IpcWorker {
            socket_path: process.socket_path.clone(),
            child: Arc::clone(&process.child),
            writer: Arc::clone(&process.writer),
            cancelled: Arc::clone(&process.cancelled),
            volume: Arc::clone(&self.volume),
            token,
            events: self.events.clone(),
        };
        std::thread::Builder::new()
            .name("mpv-ipc".into())
            .spawn(move || worker.run())?;

        self.process = Some(process);
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.send_command(json!(["set_property", "pause", true]))
    }

    fn resume(&mut self) -> Result<()> {
        self.send_command(json!(["set_property", "pause", false]))
    }

    fn stop(&mut self) {
        let Some(process) = self.process.take() else {
            return;
        };
        process.cancelled.store(true, Ordering::SeqCst);

        let mut child = process.child.lock().unwrap_or_else(|e| e.into_inner());
        if let Err(e) = child.kill() {
            debug!(token = %process.token, error = %e, "player already gone");
        }
        let _ = child.wait();
        drop(child);

        let _ = std::fs::remove_file(&process.socket_path);
        debug!(token = %process.token, "player stopped");
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        let percent = (volume.clamp(0.0, 1.0) * 100.0).round() as u32;
        self.volume.store(percent, Ordering::SeqCst);
        let Some(process) = &self.process else {
            return Ok(());
        };

        // Stored before taking the lock, so a worker still connecting picks it up
        let mut guard = process.writer.lock().unwrap_or_else(|e| e.into_inner());
        match guard.as_mut() {
            Some(stream) => write_command(stream, json!(["set_property", "volume", percent])),
            None => {
                debug!(token = %process.token, percent, "volume deferred until player connects");
                Ok(())
            }
        }
    }
}

impl Drop for MpvHandle {
    fn drop(&mut self) {
        self.stop();
    }
}

/// Tracks what a stream has reported so far, to map raw player events
#[derive(Debug, Default)]
struct StreamProgress {
    started: bool,
    buffering: bool,
    finished: bool,
}

impl StreamProgress {
    /// Map one IPC line to a media event, if it means anything to the session
    fn interpret(&mut self, line: &str) -> Option<MediaEventKind> {
        let msg: Value = serde_json::from_str(line).ok()?;
        match msg.get("event")?.as_str()? {
            "playback-restart" => {
                if !self.started {
                    self.started = true;
                    Some(MediaEventKind::Playing)
                } else if self.buffering {
                    self.buffering = false;
                    Some(MediaEventKind::Resumed)
                } else {
                    None
                }
            }
            "property-change" if msg.get("name")?.as_str()? == "paused-for-cache" => {
                let stalled = msg.get("data").and_then(Value::as_bool).unwrap_or(false);
                if !self.started || stalled == self.buffering {
                    return None;
                }
                self.buffering = stalled;
                Some(if stalled {
                    MediaEventKind::Buffering
                } else {
                    MediaEventKind::Resumed
                })
            }
            "end-file" => {
                self.finished = true;
                match msg.get("reason").and_then(Value::as_str) {
                    Some("error") => {
                        let detail = msg
                            .get("file_error")
                            .and_then(Value::as_str)
                            .unwrap_or("stream error");
                        Some(MediaEventKind::Failed(detail.to_string()))
                    }
                    Some("eof") if self.started => Some(MediaEventKind::Ended),
                    Some("eof") => Some(MediaEventKind::Failed("stream closed".to_string())),
                    _ => None,
                }
            }
            _ => None,
        }
    }

    /// Event to report when the socket closes without an `end-file`
    fn on_disconnect(&self) -> Option<MediaEventKind> {
        if self.finished {
            None
        } else if self.started {
            Some(MediaEventKind::Ended)
        } else {
            Some(MediaEventKind::Failed(
                "player exited before playback started".to_string(),
            ))
        }
    }
}

/// Connects to the player's socket and forwards its events
struct IpcWorker {
    socket_path: PathBuf,
    child: Arc<Mutex<Child>>,
    writer: SharedWriter,
    cancelled: Arc<AtomicBool>,
    volume: Arc<AtomicU32>,
    token: RequestToken,
    events: Sender<MediaEvent>,
}

impl IpcWorker {
    fn run(self) {
        let stream = match self.connect() {
            Ok(stream) => stream,
            Err(reason) => {
                self.emit(MediaEventKind::Failed(reason));
                return;
            }
        };

        let reader = match stream.try_clone() {
            Ok(reader) => reader,
            Err(e) => {
                self.emit(MediaEventKind::Failed(format!("player socket error: {e}")));
                return;
            }
        };

        {
            let mut writer = self.writer.lock().unwrap_or_else(|e| e.into_inner());
            let mut stream = stream;
            let observe = json!({
                "command": ["observe_property", CACHE_OBSERVER_ID, "paused-for-cache"]
            });
            if let Err(e) = writeln!(stream, "{observe}") {
                warn!(token = %self.token, error = %e, "cannot observe cache state");
            }
            // Volume may have changed since the player was spawned
            let percent = self.volume.load(Ordering::SeqCst);
            if let Err(e) = write_command(&mut stream, json!(["set_property", "volume", percent])) {
                warn!(token = %self.token, error = %e, "cannot apply volume");
            }
            *writer = Some(stream);
        }

        let mut progress = StreamProgress::default();
        for line in BufReader::new(reader).lines() {
            let Ok(line) = line else { break };
            if let Some(kind) = progress.interpret(&line) {
                self.emit(kind);
            }
        }

        if let Some(kind) = progress.on_disconnect() {
            self.emit(kind);
        }
        debug!(token = %self.token, "player socket closed");
    }

    fn connect(&self) -> std::result::Result<UnixStream, String> {
        let deadline = Instant::now() + Duration::from_millis(IPC_CONNECT_TIMEOUT_MS);
        loop {
            if self.cancelled.load(Ordering::SeqCst) {
                return Err("cancelled".to_string());
            }
            if let Some(status) = self.exited() {
                return Err(format!("player exited ({status})"));
            }
            if socket_ready(&self.socket_path) {
                if let Ok(stream) = UnixStream::connect(&self.socket_path) {
                    return Ok(stream);
                }
            }
            if Instant::now() >= deadline {
                return Err("player did not open its control socket".to_string());
            }
            std::thread::sleep(Duration::from_millis(IPC_POLL_INTERVAL_MS));
        }
    }

    fn exited(&self) -> Option<std::process::ExitStatus> {
        let mut child = self.child.lock().unwrap_or_else(|e| e.into_inner());
        child.try_wait().ok().flatten()
    }

    fn emit(&self, kind: MediaEventKind) {
        if self.cancelled.load(Ordering::SeqCst) {
            return;
        }
        debug!(token = %self.token, ?kind, "media event");
        let _ = self.events.send(MediaEvent::new(self.token, kind));
    }
}

fn socket_ready(path: &Path) -> bool {
    path.exists()
}
