//! Media handle abstraction
//!
//! The session never touches audio directly. It drives a `MediaHandle`,
//! and the handle reports back through tagged `MediaEvent`s.

use std::fmt;

use crate::error::Result;

/// Identifies one playback request. Events carrying an older token than the
/// driver's current one belong to a superseded request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct RequestToken(pub u64);

impl RequestToken {
    /// The token that follows this one
    pub fn next(self) -> Self {
        RequestToken(self.0 + 1)
    }
}

impl fmt::Display for RequestToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// What happened to a stream
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// The stream is ready and audible
    Playing,
    /// Playback stalled waiting for data
    Buffering,
    /// Playback continued after a stall
    Resumed,
    /// The stream closed on its own
    Ended,
    /// The stream could not be loaded or played
    Failed(String),
}

/// A lifecycle event for the request identified by `token`
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub token: RequestToken,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(token: RequestToken, kind: MediaEventKind) -> Self {
        Self { token, kind }
    }
}

/// A single streaming audio output
///
/// `load` only starts the attempt; its outcome arrives later as a
/// `MediaEvent` tagged with the same token. Loading a new URL replaces
/// whatever was playing.
pub trait MediaHandle {
    /// Start streaming `url`. An error means the attempt was rejected outright.
    fn load(&mut self, url: &str, token: RequestToken) -> Result<()>;

    fn pause(&mut self) -> Result<()>;

    fn resume(&mut self) -> Result<()>;

    /// Stop and release the current stream, if any
    fn stop(&mut self);

    /// Apply a volume in [0, 1]
    fn set_volume(&mut self, volume: f32) -> Result<()>;
}

impl<M: MediaHandle + ?Sized> MediaHandle for Box<M> {
    fn load(&mut self, url: &str, token: RequestToken) -> Result<()> {
        (**self).load(url, token)
    }

    fn pause(&mut self) -> Result<()> {
        (**self).pause()
    }

    fn resume(&mut self) -> Result<()> {
        (**self).resume()
    }

    fn stop(&mut self) {
        (**self).stop()
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        (**self).set_volume(volume)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_token_ordering() {
        let first = RequestToken::default();
        let second = first.next();
        assert!(second > first);
        assert_eq!(second, RequestToken(1));
        assert_eq!(second.to_string(), "#1");
    }

    #[test]
    fn test_event_construction() {
        let event = MediaEvent::new(RequestToken(3), MediaEventKind::Failed("404".into()));
        assert_eq!(event.token, RequestToken(3));
        assert_eq!(event.kind, MediaEventKind::Failed("404".to_string()));
    }
}
