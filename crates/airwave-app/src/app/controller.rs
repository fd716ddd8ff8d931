//! Application controller
//!
//! Owns the session store and processes commands from the frontend and
//! events from the media handle on a single thread.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use crossbeam_channel::{select, Receiver};
use tracing::{debug, info, warn};

use airwave::library::{KeyValueStore, Station};
use airwave::media::{MediaEvent, MediaHandle};
use airwave::session::{SessionState, SessionStore};

use crate::directory::StationDirectory;

use super::state::AppCommand;

/// One item taken off the controller's channels
enum Input {
    Command(AppCommand),
    Event(MediaEvent),
    CommandsClosed,
    EventsClosed,
}

pub struct AppController<M, S> {
    store: SessionStore<M, S>,
    commands: Receiver<AppCommand>,
    events: Receiver<MediaEvent>,
    /// Directory notified when a station is selected
    directory: Option<Arc<dyn StationDirectory>>,
}

impl<M: MediaHandle, S: KeyValueStore> AppController<M, S> {
    pub fn new(
        store: SessionStore<M, S>,
        commands: Receiver<AppCommand>,
        events: Receiver<MediaEvent>,
    ) -> Self {
        Self {
            store,
            commands,
            events,
            directory: None,
        }
    }

    /// Report station clicks to `directory` on selection
    pub fn with_directory(mut self, directory: Arc<dyn StationDirectory>) -> Self {
        self.directory = Some(directory);
        self
    }

    /// Subscribe to state snapshots; call before `run`
    pub fn subscribe(&mut self) -> Receiver<SessionState> {
        self.store.subscribe()
    }

    pub fn store(&self) -> &SessionStore<M, S> {
        &self.store
    }

    /// Run the controller loop (blocking, call from a dedicated thread).
    ///
    /// Returns the final session state after `Shutdown` or once every
    /// command sender is gone.
    pub fn run(mut self) -> SessionState {
        info!("controller started");
        loop {
            let input = select! {
                recv(self.commands) -> msg => msg.map_or(Input::CommandsClosed, Input::Command),
                recv(self.events) -> msg => msg.map_or(Input::EventsClosed, Input::Event),
            };
            match input {
                Input::Command(cmd) => {
                    if self.handle_command(cmd) {
                        break;
                    }
                }
                Input::Event(event) => self.store.handle_media_event(event),
                Input::CommandsClosed => {
                    debug!("command channel closed");
                    break;
                }
                Input::EventsClosed => {
                    debug!("media event channel closed");
                    self.events = crossbeam_channel::never();
                }
            }
        }

        self.store.stop();
        info!("controller stopped");
        self.store.snapshot()
    }

    /// Handle a single command. Returns true if the loop should exit.
    fn handle_command(&mut self, cmd: AppCommand) -> bool {
        match cmd {
            AppCommand::Shutdown => return true,
            AppCommand::Select(station) => {
                self.report_click(&station);
                self.store.select_station(station);
            }
            AppCommand::TogglePlayback => self.store.toggle_playback(),
            AppCommand::SetVolume(volume) => self.store.set_volume(volume),
            AppCommand::Stop => self.store.stop(),
            AppCommand::ToggleFavorite(station) => self.store.toggle_favorite(&station),
            AppCommand::ClearRecent => self.store.clear_recent(),
        }
        false
    }

    /// Tell the directory about the selection without blocking the loop
    fn report_click(&self, station: &Station) {
        let Some(directory) = self.directory.as_ref().map(Arc::clone) else {
            return;
        };
        let id = station.id.clone();
        let spawned = thread::Builder::new()
            .name("click-report".into())
            .spawn(move || {
                if let Err(e) = directory.report_click(&id) {
                    debug!(station = %id, error = %e, "click not reported");
                }
            });
        if let Err(e) = spawned {
            warn!(error = %e, "failed to spawn click reporter");
        }
    }
}

impl<M, S> AppController<M, S>
where
    M: MediaHandle + Send + 'static,
    S: KeyValueStore + Send + 'static,
{
    /// Run the loop on its own named thread
    pub fn spawn(self) -> std::io::Result<JoinHandle<SessionState>> {
        thread::Builder::new()
            .name("airwave-controller".into())
            .spawn(move || self.run())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use std::time::Duration;

    use airwave::error::Result as EngineResult;
    use airwave::library::MemoryStore;
    use airwave::media::{MediaEventKind, RequestToken};
    use airwave::session::PlaybackStatus;
    use crossbeam_channel::{unbounded, Sender};

    use crate::directory::Category;

    #[derive(Clone, Default)]
    struct FakeMedia {
        loads: Arc<Mutex<Vec<String>>>,
    }

    impl MediaHandle for FakeMedia {
        fn load(&mut self, url: &str, _token: RequestToken) -> EngineResult<()> {
            self.loads.lock().unwrap().push(url.to_string());
            Ok(())
        }
        fn pause(&mut self) -> EngineResult<()> {
            Ok(())
        }
        fn resume(&mut self) -> EngineResult<()> {
            Ok(())
        }
        fn stop(&mut self) {}
        fn set_volume(&mut self, _volume: f32) -> EngineResult<()> {
            Ok(())
        }
    }

    /// Directory that only counts clicks
    #[derive(Default)]
    struct ClickCounter {
        clicks: AtomicUsize,
    }

    impl StationDirectory for ClickCounter {
        fn name(&self) -> &'static str {
            "clicks"
        }
        fn search(&self, _: &str, _: usize) -> crate::error::Result<Vec<Station>> {
            Ok(Vec::new())
        }
        fn by_tag(&self, _: &str, _: usize) -> crate::error::Result<Vec<Station>> {
            Ok(Vec::new())
        }
        fn by_country(&self, _: &str, _: usize) -> crate::error::Result<Vec<Station>> {
            Ok(Vec::new())
        }
        fn by_language(&self, _: &str, _: usize) -> crate::error::Result<Vec<Station>> {
            Ok(Vec::new())
        }
        fn top_voted(&self, _: usize) -> crate::error::Result<Vec<Station>> {
            Ok(Vec::new())
        }
        fn top_clicked(&self, _: usize) -> crate::error::Result<Vec<Station>> {
            Ok(Vec::new())
        }
        fn tags(&self, _: usize) -> crate::error::Result<Vec<Category>> {
            Ok(Vec::new())
        }
        fn countries(&self, _: usize) -> crate::error::Result<Vec<Category>> {
            Ok(Vec::new())
        }
        fn languages(&self, _: usize) -> crate::error::Result<Vec<Category>> {
            Ok(Vec::new())
        }
        fn get_station(&self, _: &str) -> crate::error::Result<Option<Station>> {
            Ok(None)
        }
        fn report_click(&self, _: &str) -> crate::error::Result<()> {
            self.clicks.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
    }

    struct Harness {
        commands: Sender<AppCommand>,
        events: Sender<MediaEvent>,
        updates: Receiver<SessionState>,
        handle: JoinHandle<SessionState>,
        media: FakeMedia,
    }

    fn start(directory: Option<Arc<dyn StationDirectory>>) -> Harness {
        let media = FakeMedia::default();
        let (cmd_tx, cmd_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let store = SessionStore::new(media.clone(), MemoryStore::new());
        let mut controller = AppController::new(store, cmd_rx, event_rx);
        if let Some(directory) = directory {
            controller = controller.with_directory(directory);
        }
        let updates = controller.subscribe();
        let handle = controller.spawn().unwrap();
        Harness {
            commands: cmd_tx,
            events: event_tx,
            updates,
            handle,
            media,
        }
    }

    /// Wait for the next published snapshot
    fn next_state(updates: &Receiver<SessionState>) -> SessionState {
        updates.recv_timeout(Duration::from_secs(5)).unwrap()
    }

    fn station(id: &str) -> Station {
        Station::new(id, format!("Station {id}"), format!("http://{id}.fm/live"))
    }

    #[test]
    fn test_select_then_playing_event() {
        let h = start(None);

        h.commands.send(AppCommand::Select(station("a"))).unwrap();
        let state = next_state(&h.updates);
        assert_eq!(state.status, PlaybackStatus::Loading);
        assert_eq!(state.current_id(), Some("a"));

        h.events
            .send(MediaEvent::new(RequestToken(1), MediaEventKind::Playing))
            .unwrap();
        let state = next_state(&h.updates);
        assert_eq!(state.status, PlaybackStatus::Playing);
        assert_eq!(state.recent.first().map(|s| s.id.as_str()), Some("a"));

        h.commands.send(AppCommand::Shutdown).unwrap();
        let last = h.handle.join().unwrap();
        assert_eq!(last.status, PlaybackStatus::Idle);
        assert!(last.current_station.is_none());
        assert_eq!(last.recent.len(), 1);
        assert_eq!(h.media.loads.lock().unwrap().as_slice(), ["http://a.fm/live"]);
    }

    #[test]
    fn test_stale_event_after_reselect_is_ignored() {
        let h = start(None);

        h.commands.send(AppCommand::Select(station("c"))).unwrap();
        next_state(&h.updates);
        h.commands.send(AppCommand::Select(station("d"))).unwrap();
        next_state(&h.updates);

        h.events
            .send(MediaEvent::new(RequestToken(1), MediaEventKind::Failed("gone".into())))
            .unwrap();
        h.commands.send(AppCommand::SetVolume(0.2)).unwrap();

        // Only the volume change publishes
        let state = next_state(&h.updates);
        assert_eq!(state.volume, 0.2);
        assert_eq!(state.status, PlaybackStatus::Loading);
        assert_eq!(state.current_id(), Some("d"));
        assert!(state.last_error.is_none());

        h.commands.send(AppCommand::Shutdown).unwrap();
        h.handle.join().unwrap();
    }

    #[test]
    fn test_toggle_favorite_twice_leaves_none() {
        let h = start(None);
        let s = station("fav");

        h.commands.send(AppCommand::ToggleFavorite(s.clone())).unwrap();
        assert!(next_state(&h.updates).is_favorite("fav"));
        h.commands.send(AppCommand::ToggleFavorite(s)).unwrap();
        assert!(!next_state(&h.updates).is_favorite("fav"));

        h.commands.send(AppCommand::Shutdown).unwrap();
        let last = h.handle.join().unwrap();
        assert!(last.favorites.is_empty());
    }

    #[test]
    fn test_clear_recent_is_persisted() {
        use airwave::library::Persistence;
        use std::sync::atomic::AtomicU32;

        use crate::data::FileStore;

        static DIR_COUNTER: AtomicU32 = AtomicU32::new(0);
        let dir = std::env::temp_dir().join(format!(
            "airwave_controller_test_{}_{}",
            std::process::id(),
            DIR_COUNTER.fetch_add(1, Ordering::SeqCst)
        ));

        let (cmd_tx, cmd_rx) = unbounded();
        let (event_tx, event_rx) = unbounded();
        let store = SessionStore::new(FakeMedia::default(), FileStore::new(&dir));
        let mut controller = AppController::new(store, cmd_rx, event_rx);
        let updates = controller.subscribe();
        let handle = controller.spawn().unwrap();

        cmd_tx.send(AppCommand::Select(station("a"))).unwrap();
        next_state(&updates);
        event_tx
            .send(MediaEvent::new(RequestToken(1), MediaEventKind::Playing))
            .unwrap();
        assert_eq!(next_state(&updates).recent.len(), 1);
        assert_eq!(Persistence::new(FileStore::new(&dir)).load_recent().len(), 1);

        cmd_tx.send(AppCommand::ClearRecent).unwrap();
        assert!(next_state(&updates).recent.is_empty());

        cmd_tx.send(AppCommand::Shutdown).unwrap();
        let last = handle.join().unwrap();
        assert!(last.recent.is_empty());
        assert!(Persistence::new(FileStore::new(&dir)).load_recent().is_empty());

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn test_volume_is_clamped() {
        let h = start(None);
        h.commands.send(AppCommand::SetVolume(3.0)).unwrap();
        assert_eq!(next_state(&h.updates).volume, 1.0);
        h.commands.send(AppCommand::Shutdown).unwrap();
        h.handle.join().unwrap();
    }

    #[test]
    fn test_dropping_senders_ends_loop() {
        let h = start(None);
        drop(h.events);
        drop(h.commands);
        let last = h.handle.join().unwrap();
        assert_eq!(last.status, PlaybackStatus::Idle);
    }

    #[test]
    fn test_select_reports_click() {
        let counter = Arc::new(ClickCounter::default());
        let h = start(Some(counter.clone() as Arc<dyn StationDirectory>));

        h.commands.send(AppCommand::Select(station("x"))).unwrap();
        next_state(&h.updates);
        h.commands.send(AppCommand::Shutdown).unwrap();
        h.handle.join().unwrap();

        // Reporter runs on its own thread
        for _ in 0..100 {
            if counter.clicks.load(Ordering::SeqCst) == 1 {
                break;
            }
            thread::sleep(Duration::from_millis(10));
        }
        assert_eq!(counter.clicks.load(Ordering::SeqCst), 1);
    }
}
