//! fOS Text Tracks
//!
//! Text track management for fOS media elements.
//!
//! Features:
//! - Discovery of native subtitle, caption and metadata tracks
//! - Sideloaded tracks merged without duplicate `<track>` elements
//! - Single subtitle selection (1-based, 0 = off)
//! - Timed metadata events from metadata track cues
//!
//! # Example
//! ```rust,ignore
//! use fos_tracks::{TextTrackSession, TracksConfig, MediaElement, EventLog};
//!
//! let log = Rc::new(EventLog::new());
//! let mut session = TextTrackSession::new(TracksConfig::default(), log.clone(), Rc::new(parse_id3));
//! session.discover(&mut video);
//! session.select(1);
//! ```

pub mod config;
pub mod cue;
pub mod element;
pub mod event;
pub mod listener;
pub mod registry;
pub mod selection;
pub mod session;
pub mod sideload;
pub mod track;

pub use config::{CueTextPolicy, Platform, TracksConfig};
pub use cue::{Cue, CueTranslator, Id3Decoder};
pub use element::{MediaElement, MediaSurface, TrackElement};
pub use event::{EventLog, EventSink, TrackEvent};
pub use listener::{ListenerId, ListenerMode, ListenerTarget, ADD_TRACK, CHANGE};
pub use registry::TrackRegistry;
pub use selection::SelectionController;
pub use session::{TextTrackSession, TRACK_CHANGE_LISTENER};
pub use sideload::{SideloadDescriptor, SideloadMerger};
pub use track::{SharedTrack, TextTrack, TextTrackKind, TextTrackList, TextTrackMode, TrackInfo, TrackSource};

/// Text track error
#[derive(Debug, thiserror::Error)]
pub enum TrackError {
    #[error("Invalid track kind: {0}")]
    InvalidKind(String),

    #[error("Invalid track mode: {0}")]
    InvalidMode(String),

    #[error("Invalid cue text at {time}s: {source}")]
    CueText {
        time: f64,
        source: serde_json::Error,
    },
}
