//! Session store
//!
//! Single owner of the session state. Intents are plain `&mut self`
//! methods, processed one at a time by whoever owns the store (the app
//! controller thread). Library changes are written through to storage;
//! state changes are broadcast to subscribers.

use crossbeam_channel::Receiver;
use tracing::{debug, info, warn};

use crate::error::AirwaveError;
use crate::library::{KeyValueStore, Persistence, Station};
use crate::media::{MediaEvent, MediaHandle, RequestToken};

use super::bus::ChangeBus;
use super::driver::{EventOutcome, PlaybackDriver};
use super::state::{SessionError, SessionErrorKind, SessionState};

pub struct SessionStore<M, S> {
    state: SessionState,
    driver: PlaybackDriver<M>,
    persistence: Persistence<S>,
    bus: ChangeBus,
}

impl<M: MediaHandle, S: KeyValueStore> SessionStore<M, S> {
    /// Create the session, seeding favorites and history from `storage`
    pub fn new(media: M, storage: S) -> Self {
        let persistence = Persistence::new(storage);
        let state = SessionState {
            favorites: persistence.load_favorites(),
            recent: persistence.load_recent(),
            ..SessionState::default()
        };
        info!(
            favorites = state.favorites.len(),
            recent = state.recent.len(),
            "session restored"
        );

        let mut store = Self {
            state,
            driver: PlaybackDriver::new(media),
            persistence,
            bus: ChangeBus::new(),
        };
        let volume = store.state.volume;
        store.driver.set_volume(&mut store.state, volume);
        store
    }

    /// Start with a specific volume instead of the default
    pub fn with_volume(mut self, volume: f32) -> Self {
        self.driver.set_volume(&mut self.state, volume);
        self
    }

    pub fn state(&self) -> &SessionState {
        &self.state
    }

    pub fn snapshot(&self) -> SessionState {
        self.state.clone()
    }

    /// Receive a snapshot after every state change
    pub fn subscribe(&mut self) -> Receiver<SessionState> {
        self.bus.subscribe()
    }

    pub fn media(&self) -> &M {
        self.driver.media()
    }

    pub fn storage(&self) -> &S {
        self.persistence.store()
    }

    /// Token of the most recent playback request
    pub fn current_token(&self) -> RequestToken {
        self.driver.current_token()
    }

    /// Preempt whatever is playing and start loading `station`.
    ///
    /// The station only counts as played (and enters the recent list) once
    /// the media reports it is audible.
    pub fn select_station(&mut self, station: Station) {
        self.driver.start(&mut self.state, station);
        self.publish();
    }

    /// Pause when playing; resume when paused or errored
    pub fn toggle_playback(&mut self) {
        if self.driver.toggle(&mut self.state) {
            self.publish();
        }
    }

    pub fn set_volume(&mut self, volume: f32) {
        if self.driver.set_volume(&mut self.state, volume) {
            self.publish();
        }
    }

    pub fn stop(&mut self) {
        self.driver.stop(&mut self.state);
        self.publish();
    }

    pub fn toggle_favorite(&mut self, station: &Station) {
        let added = self.state.favorites.toggle(station);
        debug!(station = %station.name, added, "favorite toggled");
        let result = self.persistence.save_favorites(&self.state.favorites);
        self.record_storage_result(result);
        self.publish();
    }

    pub fn is_favorite(&self, id: &str) -> bool {
        self.state.is_favorite(id)
    }

    pub fn clear_recent(&mut self) {
        if self.state.recent.is_empty() {
            return;
        }
        self.state.recent.clear();
        let result = self.persistence.save_recent(&self.state.recent);
        self.record_storage_result(result);
        self.publish();
    }

    /// Apply an event reported by the media handle
    pub fn handle_media_event(&mut self, event: MediaEvent) {
        match self.driver.apply(&mut self.state, &event) {
            EventOutcome::Stale | EventOutcome::Unchanged => {}
            EventOutcome::Changed => self.publish(),
            EventOutcome::Started(station) => {
                info!(station = %station.name, "now playing");
                self.state.recent.push_front(&station);
                let result = self.persistence.save_recent(&self.state.recent);
                self.record_storage_result(result);
                self.publish();
            }
        }
    }

    fn record_storage_result(&mut self, result: crate::error::Result<()>) {
        if let Err(e) = result {
            warn!(error = %e, "library not saved, keeping in-memory copy");
            let message = match e {
                AirwaveError::Storage(msg) => msg,
                other => other.to_string(),
            };
            self.state.last_error = Some(SessionError::new(
                SessionErrorKind::StorageUnavailable,
                message,
            ));
        }
    }

    fn publish(&mut self) {
        debug_assert_eq!(
            self.state.current_station.is_none(),
            self.state.status == super::state::PlaybackStatus::Idle
        );
        self.bus.publish(&self.state);
    }
}
