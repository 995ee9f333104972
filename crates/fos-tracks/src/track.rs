//! Text Tracks
//!
//! TextTrack, its kind and mode, and the native TextTrackList.

use std::cell::RefCell;
use std::fmt;
use std::rc::Rc;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::cue::{Cue, CueTranslator};
use crate::listener::{EventBinding, ListenerMode, ListenerTarget};
use crate::TrackError;

/// Text track kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTrackKind {
    Subtitles,
    #[default]
    Captions,
    Descriptions,
    Chapters,
    Metadata,
}

impl TextTrackKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Subtitles => "subtitles",
            Self::Captions => "captions",
            Self::Descriptions => "descriptions",
            Self::Chapters => "chapters",
            Self::Metadata => "metadata",
        }
    }

    /// Only subtitles and captions are offered for selection.
    pub fn is_selectable(&self) -> bool {
        matches!(self, Self::Subtitles | Self::Captions)
    }
}

impl FromStr for TextTrackKind {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let kind = s.trim();
        [
            Self::Subtitles,
            Self::Captions,
            Self::Descriptions,
            Self::Chapters,
            Self::Metadata,
        ]
        .into_iter()
        .find(|k| k.as_str().eq_ignore_ascii_case(kind))
        .ok_or_else(|| TrackError::InvalidKind(s.to_string()))
    }
}

impl fmt::Display for TextTrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Text track mode
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextTrackMode {
    #[default]
    Disabled,
    Hidden,
    Showing,
}

impl TextTrackMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Disabled => "disabled",
            Self::Hidden => "hidden",
            Self::Showing => "showing",
        }
    }
}

impl FromStr for TextTrackMode {
    type Err = TrackError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "disabled" => Ok(Self::Disabled),
            "hidden" => Ok(Self::Hidden),
            "showing" => Ok(Self::Showing),
            _ => Err(TrackError::InvalidMode(s.to_string())),
        }
    }
}

/// Where a track came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum TrackSource {
    /// Exposed by the media element itself (in-band or `<track>` child)
    #[default]
    Native,
    /// Supplied by the application as a file reference
    File(String),
}

/// Text track
#[derive(Debug, Clone, Default)]
pub struct TextTrack {
    pub id: String,
    pub kind: TextTrackKind,
    pub label: String,
    pub language: String,
    pub mode: TextTrackMode,
    pub source: TrackSource,
    cues: Vec<Cue>,
    active_cues: Vec<usize>,
    cue_handler: Option<CueTranslator>,
}

/// Track handle shared between the media element and the registry
pub type SharedTrack = Rc<RefCell<TextTrack>>;

impl TextTrack {
    pub fn new(kind: TextTrackKind, label: &str, language: &str) -> Self {
        Self {
            kind,
            label: label.to_string(),
            language: language.to_string(),
            ..Default::default()
        }
    }

    /// Track backed by an application supplied file
    pub fn from_file(file: &str, kind: TextTrackKind, label: &str, language: &str) -> Self {
        Self {
            source: TrackSource::File(file.to_string()),
            ..Self::new(kind, label, language)
        }
    }

    pub fn with_id(mut self, id: &str) -> Self {
        self.id = id.to_string();
        self
    }

    pub fn into_shared(self) -> SharedTrack {
        Rc::new(RefCell::new(self))
    }

    pub fn file(&self) -> Option<&str> {
        match &self.source {
            TrackSource::File(file) => Some(file),
            TrackSource::Native => None,
        }
    }

    pub fn is_sideloaded(&self) -> bool {
        matches!(self.source, TrackSource::File(_))
    }

    /// Install the cuechange callback
    pub fn set_cue_handler(&mut self, handler: CueTranslator) {
        self.cue_handler = Some(handler);
    }

    pub fn has_cue_handler(&self) -> bool {
        self.cue_handler.is_some()
    }

    /// Add a cue, keeping the list ordered by start time
    pub fn add_cue(&mut self, cue: Cue) {
        let at = self.cues.partition_point(|c| c.start_time <= cue.start_time);
        self.cues.insert(at, cue);
        self.active_cues.clear();
    }

    /// Currently active cues, ascending by start time
    pub fn active_cues(&self) -> Vec<Cue> {
        self.active_cues.iter().map(|&i| self.cues[i].clone()).collect()
    }

    /// Recompute active cues for `current_time`, firing cuechange when the set changes.
    pub fn update_active(&mut self, current_time: f64) {
        let active: Vec<usize> = self
            .cues
            .iter()
            .enumerate()
            .filter(|(_, c)| c.start_time <= current_time && c.end_time > current_time)
            .map(|(i, _)| i)
            .collect();

        if active != self.active_cues {
            self.active_cues = active;
            if self.mode != TextTrackMode::Disabled {
                self.dispatch_cue_change(&self.active_cues());
            }
        }
    }

    /// Deliver a cuechange notification to the installed handler, if any.
    pub fn dispatch_cue_change(&self, active_cues: &[Cue]) {
        if let Some(handler) = &self.cue_handler {
            handler.handle(active_cues);
        }
    }

    /// Plain snapshot for event payloads
    pub fn info(&self) -> TrackInfo {
        TrackInfo {
            id: self.id.clone(),
            kind: self.kind,
            label: self.label.clone(),
            language: self.language.clone(),
            mode: self.mode,
            file: self.file().map(str::to_string),
        }
    }
}

/// Serializable view of a track
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrackInfo {
    pub id: String,
    pub kind: TextTrackKind,
    pub label: String,
    pub language: String,
    pub mode: TextTrackMode,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Snapshot a sequence of shared tracks
pub fn snapshot(tracks: &[SharedTrack]) -> Vec<TrackInfo> {
    tracks.iter().map(|t| t.borrow().info()).collect()
}

/// Track list
#[derive(Debug, Default)]
pub struct TextTrackList {
    tracks: Vec<SharedTrack>,
    binding: EventBinding,
}

impl TextTrackList {
    pub fn new(mode: ListenerMode) -> Self {
        Self {
            tracks: Vec::new(),
            binding: EventBinding::new(mode),
        }
    }

    pub fn length(&self) -> usize {
        self.tracks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SharedTrack> {
        self.tracks.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &SharedTrack> {
        self.tracks.iter()
    }

    pub fn index_of(&self, track: &SharedTrack) -> Option<usize> {
        self.tracks.iter().position(|t| Rc::ptr_eq(t, track))
    }

    pub fn add_track(&mut self, track: TextTrack) -> SharedTrack {
        let shared = track.into_shared();
        self.tracks.push(Rc::clone(&shared));
        shared
    }

    pub fn remove_track(&mut self, track: &SharedTrack) {
        self.tracks.retain(|t| !Rc::ptr_eq(t, track));
    }
}

impl ListenerTarget for TextTrackList {
    fn binding(&self) -> &EventBinding {
        &self.binding
    }

    fn binding_mut(&mut self) -> &mut EventBinding {
        &mut self.binding
    }
}
