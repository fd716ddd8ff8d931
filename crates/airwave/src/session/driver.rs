//! Playback driver
//!
//! Owns the media handle and the request token. Every playback intent goes
//! through here, and so does every media event; events from superseded
//! requests are dropped by comparing tokens.

use tracing::{debug, info, warn};

use crate::library::Station;
use crate::media::{MediaEvent, MediaEventKind, MediaHandle, RequestToken};

use super::state::{clamp_volume, PlaybackStatus, SessionError, SessionErrorKind, SessionState};

/// What applying a media event did to the session
#[derive(Debug, Clone, PartialEq)]
pub enum EventOutcome {
    /// The event belonged to a superseded or stopped request
    Stale,
    /// Current request, but nothing changed
    Unchanged,
    /// State changed
    Changed,
    /// The current station became audible for the first time
    Started(Station),
}

pub struct PlaybackDriver<M> {
    media: M,
    /// Token of the latest request; bumped on every start and stop
    token: RequestToken,
    /// Whether the current request has reported `Playing` yet
    started: bool,
}

impl<M: MediaHandle> PlaybackDriver<M> {
    pub fn new(media: M) -> Self {
        Self {
            media,
            token: RequestToken::default(),
            started: false,
        }
    }

    pub fn media(&self) -> &M {
        &self.media
    }

    pub fn current_token(&self) -> RequestToken {
        self.token
    }

    /// Replace whatever is playing with `station` and start loading it
    pub fn start(&mut self, state: &mut SessionState, station: Station) {
        self.media.stop();
        self.token = self.token.next();
        self.started = false;

        let url = station.stream_url().to_string();
        info!(token = %self.token, station = %station.name, url = %url, "loading station");

        state.current_station = Some(station);
        state.status = PlaybackStatus::Loading;
        state.last_error = None;
        state.buffering = false;

        if let Err(e) = self.media.load(&url, self.token) {
            warn!(token = %self.token, error = %e, "stream rejected");
            state.status = PlaybackStatus::Errored;
            state.last_error = Some(SessionError::stream_unavailable(e.to_string()));
        }
    }

    /// Pause or resume the current stream. Returns true if state changed.
    pub fn toggle(&mut self, state: &mut SessionState) -> bool {
        if state.current_station.is_none() {
            return false;
        }

        match state.status {
            PlaybackStatus::Playing => match self.media.pause() {
                Ok(()) => {
                    state.status = PlaybackStatus::Paused;
                    true
                }
                Err(e) => {
                    warn!(token = %self.token, error = %e, "pause failed");
                    false
                }
            },
            PlaybackStatus::Errored => {
                // The failed stream is gone; retry it under a fresh token
                let Some(station) = state.current_station.clone() else {
                    return false;
                };
                info!(token = %self.token, station = %station.name, "retrying stream");
                self.start(state, station);
                if state.status == PlaybackStatus::Errored {
                    state.last_error = Some(SessionError::new(
                        SessionErrorKind::ResumeFailed,
                        "resume failed",
                    ));
                }
                true
            }
            PlaybackStatus::Paused => match self.media.resume() {
                Ok(()) => {
                    state.status = PlaybackStatus::Playing;
                    state.last_error = None;
                    state.buffering = false;
                    true
                }
                Err(e) => {
                    warn!(token = %self.token, error = %e, "resume failed");
                    state.status = PlaybackStatus::Errored;
                    state.last_error = Some(SessionError::new(
                        SessionErrorKind::ResumeFailed,
                        "resume failed",
                    ));
                    true
                }
            },
            PlaybackStatus::Loading | PlaybackStatus::Idle => false,
        }
    }

    /// Tear down the stream and go idle
    pub fn stop(&mut self, state: &mut SessionState) {
        self.media.stop();
        self.token = self.token.next();
        self.started = false;

        state.current_station = None;
        state.status = PlaybackStatus::Idle;
        state.last_error = None;
        state.buffering = false;
    }

    /// Clamp, store, and apply a volume. Returns true if the stored value changed.
    pub fn set_volume(&mut self, state: &mut SessionState, volume: f32) -> bool {
        let volume = clamp_volume(volume);
        if let Err(e) = self.media.set_volume(volume) {
            warn!(volume, error = %e, "volume change not applied");
        }
        let changed = state.volume != volume;
        state.volume = volume;
        changed
    }

    /// Reflect a media event into the session
    pub fn apply(&mut self, state: &mut SessionState, event: &MediaEvent) -> EventOutcome {
        if event.token != self.token || state.status == PlaybackStatus::Idle {
            debug!(event = %event.token, current = %self.token, "discarding stale media event");
            return EventOutcome::Stale;
        }

        match &event.kind {
            MediaEventKind::Playing => {
                if !self.started {
                    self.started = true;
                    state.status = PlaybackStatus::Playing;
                    state.last_error = None;
                    state.buffering = false;
                    match &state.current_station {
                        Some(station) => EventOutcome::Started(station.clone()),
                        None => EventOutcome::Changed,
                    }
                } else if state.buffering {
                    state.status = PlaybackStatus::Playing;
                    state.buffering = false;
                    EventOutcome::Changed
                } else {
                    EventOutcome::Unchanged
                }
            }
            MediaEventKind::Buffering => {
                if state.status != PlaybackStatus::Playing {
                    return EventOutcome::Unchanged;
                }
                state.status = PlaybackStatus::Loading;
                state.buffering = true;
                EventOutcome::Changed
            }
            MediaEventKind::Resumed => {
                if !(state.status == PlaybackStatus::Loading && state.buffering) {
                    return EventOutcome::Unchanged;
                }
                state.status = PlaybackStatus::Playing;
                state.buffering = false;
                EventOutcome::Changed
            }
            MediaEventKind::Ended => {
                if state.status == PlaybackStatus::Errored {
                    return EventOutcome::Unchanged;
                }
                info!(token = %self.token, "stream ended");
                state.status = PlaybackStatus::Errored;
                state.last_error = Some(SessionError::stream_unavailable("stream ended"));
                state.buffering = false;
                EventOutcome::Changed
            }
            MediaEventKind::Failed(reason) => {
                warn!(token = %self.token, reason = %reason, "stream failed");
                state.status = PlaybackStatus::Errored;
                state.last_error = Some(SessionError::stream_unavailable(reason.clone()));
                state.buffering = false;
                EventOutcome::Changed
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::testing::{MediaCall, RecordingMedia};

    fn station(id: &str) -> Station {
        Station::new(id, format!("Station {id}"), format!("http://{id}.fm/live"))
    }

    fn started_driver(id: &str) -> (PlaybackDriver<RecordingMedia>, SessionState) {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        driver.start(&mut state, station(id));
        let token = driver.current_token();
        driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Playing));
        (driver, state)
    }

    #[test]
    fn test_start_loads_stream_url_under_new_token() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        let s = station("a").with_resolved_url("http://resolved.a/live");

        driver.start(&mut state, s);
        assert_eq!(state.status, PlaybackStatus::Loading);
        assert_eq!(state.current_id(), Some("a"));
        assert_eq!(driver.current_token(), RequestToken(1));
        assert_eq!(
            driver.media().calls().last(),
            Some(&MediaCall::Load("http://resolved.a/live".to_string(), RequestToken(1)))
        );
    }

    #[test]
    fn test_rejected_load_is_errored() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new().rejecting_loads());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        assert_eq!(state.status, PlaybackStatus::Errored);
        assert_eq!(
            state.last_error.as_ref().map(|e| e.kind),
            Some(SessionErrorKind::StreamUnavailable)
        );
        assert!(state.current_station.is_some());
    }

    #[test]
    fn test_first_playing_event_reports_start() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        let event = MediaEvent::new(driver.current_token(), MediaEventKind::Playing);

        assert_eq!(driver.apply(&mut state, &event), EventOutcome::Started(station("a")));
        assert_eq!(state.status, PlaybackStatus::Playing);
        assert_eq!(driver.apply(&mut state, &event), EventOutcome::Unchanged);
    }

    #[test]
    fn test_stale_token_is_discarded() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        driver.start(&mut state, station("c"));
        let old = driver.current_token();
        driver.start(&mut state, station("d"));

        let failure = MediaEvent::new(old, MediaEventKind::Failed("boom".into()));
        assert_eq!(driver.apply(&mut state, &failure), EventOutcome::Stale);
        assert_eq!(state.status, PlaybackStatus::Loading);
        assert_eq!(state.current_id(), Some("d"));
        assert!(state.last_error.is_none());
    }

    #[test]
    fn test_events_after_stop_are_discarded() {
        let (mut driver, mut state) = started_driver("a");
        let token = driver.current_token();
        driver.stop(&mut state);

        let ended = MediaEvent::new(token, MediaEventKind::Ended);
        assert_eq!(driver.apply(&mut state, &ended), EventOutcome::Stale);
        assert_eq!(state.status, PlaybackStatus::Idle);
        assert!(state.current_station.is_none());
    }

    #[test]
    fn test_buffering_round_trip_keeps_station() {
        let (mut driver, mut state) = started_driver("a");
        let token = driver.current_token();

        driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Buffering));
        assert_eq!(state.status, PlaybackStatus::Loading);
        assert!(state.buffering);
        assert_eq!(state.current_id(), Some("a"));

        let outcome = driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Resumed));
        assert_eq!(outcome, EventOutcome::Changed);
        assert_eq!(state.status, PlaybackStatus::Playing);
        assert!(!state.buffering);
    }

    #[test]
    fn test_resumed_without_stall_is_ignored() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        let token = driver.current_token();
        let outcome = driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Resumed));
        assert_eq!(outcome, EventOutcome::Unchanged);
        assert_eq!(state.status, PlaybackStatus::Loading);
    }

    #[test]
    fn test_buffering_while_paused_is_ignored() {
        let (mut driver, mut state) = started_driver("a");
        driver.toggle(&mut state);
        let token = driver.current_token();
        let outcome = driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Buffering));
        assert_eq!(outcome, EventOutcome::Unchanged);
        assert_eq!(state.status, PlaybackStatus::Paused);
    }

    #[test]
    fn test_ended_stream_is_errored() {
        let (mut driver, mut state) = started_driver("a");
        let token = driver.current_token();
        driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Ended));
        assert_eq!(state.status, PlaybackStatus::Errored);
        assert_eq!(state.last_error.as_ref().unwrap().message, "stream ended");
    }

    #[test]
    fn test_toggle_pause_and_resume() {
        let (mut driver, mut state) = started_driver("a");
        assert!(driver.toggle(&mut state));
        assert_eq!(state.status, PlaybackStatus::Paused);
        assert!(driver.toggle(&mut state));
        assert_eq!(state.status, PlaybackStatus::Playing);

        let calls = driver.media().calls();
        assert!(calls.contains(&MediaCall::Pause));
        assert!(calls.contains(&MediaCall::Resume));
    }

    #[test]
    fn test_toggle_while_loading_is_noop() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        assert!(!driver.toggle(&mut state));
        assert_eq!(state.status, PlaybackStatus::Loading);
    }

    #[test]
    fn test_failed_resume_sets_resume_error() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new().failing_resume());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        let token = driver.current_token();
        driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Playing));
        driver.toggle(&mut state);
        driver.toggle(&mut state);

        assert_eq!(state.status, PlaybackStatus::Errored);
        let err = state.last_error.unwrap();
        assert_eq!(err.kind, SessionErrorKind::ResumeFailed);
        assert_eq!(err.message, "resume failed");
    }

    #[test]
    fn test_toggle_after_stream_ended_reloads_station() {
        let (mut driver, mut state) = started_driver("a");
        let ended_token = driver.current_token();
        driver.apply(&mut state, &MediaEvent::new(ended_token, MediaEventKind::Ended));
        assert_eq!(state.status, PlaybackStatus::Errored);

        assert!(driver.toggle(&mut state));
        assert_eq!(state.status, PlaybackStatus::Loading);
        assert!(state.last_error.is_none());
        assert_eq!(state.current_id(), Some("a"));
        assert_eq!(driver.current_token(), ended_token.next());
        assert_eq!(
            driver.media().calls().last(),
            Some(&MediaCall::Load("http://a.fm/live".to_string(), ended_token.next()))
        );
        assert!(!driver.media().calls().contains(&MediaCall::Resume));

        // The retried stream can come back
        let token = driver.current_token();
        let outcome = driver.apply(&mut state, &MediaEvent::new(token, MediaEventKind::Playing));
        assert!(matches!(outcome, EventOutcome::Started(_)));
        assert_eq!(state.status, PlaybackStatus::Playing);
    }

    #[test]
    fn test_toggle_after_failure_ignores_old_stream_events() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        let failed = driver.current_token();
        driver.apply(&mut state, &MediaEvent::new(failed, MediaEventKind::Failed("404".into())));

        driver.toggle(&mut state);
        let outcome = driver.apply(&mut state, &MediaEvent::new(failed, MediaEventKind::Playing));
        assert!(matches!(outcome, EventOutcome::Stale));
        assert_eq!(state.status, PlaybackStatus::Loading);
    }

    #[test]
    fn test_retry_rejected_again_is_resume_error() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new().rejecting_loads());
        let mut state = SessionState::default();
        driver.start(&mut state, station("a"));
        assert_eq!(state.status, PlaybackStatus::Errored);

        assert!(driver.toggle(&mut state));
        assert_eq!(state.status, PlaybackStatus::Errored);
        assert_eq!(
            state.last_error.as_ref().map(|e| e.kind),
            Some(SessionErrorKind::ResumeFailed)
        );
    }

    #[test]
    fn test_set_volume_forwards_clamped_value() {
        let mut driver = PlaybackDriver::new(RecordingMedia::new());
        let mut state = SessionState::default();
        assert!(driver.set_volume(&mut state, 7.5));
        assert_eq!(state.volume, 1.0);
        assert!(!driver.set_volume(&mut state, 1.0));
        assert_eq!(driver.media().calls().last(), Some(&MediaCall::Volume(1.0)));
    }
}
