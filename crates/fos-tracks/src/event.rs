//! Track Events
//!
//! Notifications published to the surrounding player.

use std::cell::RefCell;
use std::sync::mpsc::Sender;

use serde::Serialize;
use serde_json::Value;

use crate::track::TrackInfo;

/// Track event
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum TrackEvent {
    /// Selectable tracks after a discovery pass
    SubtitlesTracks { tracks: Vec<TrackInfo> },
    /// Selection changed; `current_track` is 1-based, 0 = off
    SubtitlesTrackChanged { current_track: usize, tracks: Vec<TrackInfo> },
    /// Timed metadata
    Meta { metadata_time: f64, metadata: Value },
    /// Timed metadata that could not be decoded
    MetaError { metadata_time: f64, message: String },
}

impl TrackEvent {
    /// Event name as seen by player listeners
    pub fn name(&self) -> &'static str {
        match self {
            Self::SubtitlesTracks { .. } => "subtitlesTracks",
            Self::SubtitlesTrackChanged { .. } => "subtitlesTrackChanged",
            Self::Meta { .. } => "meta",
            Self::MetaError { .. } => "metaError",
        }
    }
}

/// Publish mechanism supplied by the host
pub trait EventSink {
    fn emit(&self, event: TrackEvent);
}

impl EventSink for Sender<TrackEvent> {
    fn emit(&self, event: TrackEvent) {
        if let Err(err) = self.send(event) {
            tracing::debug!("Track event receiver gone, dropping {}", err.0.name());
        }
    }
}

/// In-memory sink that records every event
#[derive(Debug, Default)]
pub struct EventLog {
    events: RefCell<Vec<TrackEvent>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn events(&self) -> Vec<TrackEvent> {
        self.events.borrow().clone()
    }

    /// Drain recorded events
    pub fn take(&self) -> Vec<TrackEvent> {
        self.events.take()
    }
}

impl EventSink for EventLog {
    fn emit(&self, event: TrackEvent) {
        self.events.borrow_mut().push(event);
    }
}
