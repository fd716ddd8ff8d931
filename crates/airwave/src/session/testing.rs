//! Recording media double for session tests

use std::cell::RefCell;
use std::rc::Rc;

use crate::error::{AirwaveError, Result};
use crate::media::{MediaHandle, RequestToken};

#[derive(Debug, Clone, PartialEq)]
pub enum MediaCall {
    Load(String, RequestToken),
    Pause,
    Resume,
    Stop,
    Volume(f32),
}

/// Records every call; can be told to reject loads or resumes
#[derive(Clone, Default)]
pub struct RecordingMedia {
    calls: Rc<RefCell<Vec<MediaCall>>>,
    reject_loads: bool,
    fail_resume: bool,
}

impl RecordingMedia {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn rejecting_loads(mut self) -> Self {
        self.reject_loads = true;
        self
    }

    pub fn failing_resume(mut self) -> Self {
        self.fail_resume = true;
        self
    }

    pub fn calls(&self) -> Vec<MediaCall> {
        self.calls.borrow().clone()
    }

    fn record(&self, call: MediaCall) {
        self.calls.borrow_mut().push(call);
    }
}

impl MediaHandle for RecordingMedia {
    fn load(&mut self, url: &str, token: RequestToken) -> Result<()> {
        self.record(MediaCall::Load(url.to_string(), token));
        if self.reject_loads {
            return Err(AirwaveError::Media("connection refused".to_string()));
        }
        Ok(())
    }

    fn pause(&mut self) -> Result<()> {
        self.record(MediaCall::Pause);
        Ok(())
    }

    fn resume(&mut self) -> Result<()> {
        self.record(MediaCall::Resume);
        if self.fail_resume {
            return Err(AirwaveError::Media("player gone".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) {
        self.record(MediaCall::Stop);
    }

    fn set_volume(&mut self, volume: f32) -> Result<()> {
        self.record(MediaCall::Volume(volume));
        Ok(())
    }
}
