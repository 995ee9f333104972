//! Track Registry
//!
//! Canonical list of selectable tracks plus the `(index, kind)` cache used to
//! recognise tracks registered by an earlier discovery pass.

use std::collections::HashMap;
use std::rc::Rc;

use crate::cue::CueTranslator;
use crate::event::{EventSink, TrackEvent};
use crate::track::{snapshot, SharedTrack, TextTrackKind, TextTrackList, TextTrackMode, TrackInfo};

/// Tracks and cache share one lifetime
#[derive(Debug, Default)]
struct Registered {
    tracks: Vec<SharedTrack>,
    cache: HashMap<(usize, TextTrackKind), SharedTrack>,
}

/// Track registry
pub struct TrackRegistry {
    state: Option<Registered>,
    sink: Rc<dyn EventSink>,
}

impl TrackRegistry {
    pub fn new(sink: Rc<dyn EventSink>) -> Self {
        Self { state: None, sink }
    }

    /// Start from an empty list and cache
    pub fn initialize(&mut self) {
        self.state = Some(Registered::default());
    }

    /// Drop all tracks and the cache
    pub fn clear(&mut self) {
        self.state = None;
    }

    pub fn is_initialized(&self) -> bool {
        self.state.is_some()
    }

    /// Selectable tracks; empty before initialization
    pub fn tracks(&self) -> &[SharedTrack] {
        self.state.as_ref().map_or(&[], |s| s.tracks.as_slice())
    }

    pub fn len(&self) -> usize {
        self.tracks().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tracks().is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&SharedTrack> {
        self.tracks().get(index)
    }

    pub fn is_cached(&self, index: usize, kind: TextTrackKind) -> bool {
        self.state
            .as_ref()
            .is_some_and(|s| s.cache.contains_key(&(index, kind)))
    }

    pub fn snapshot(&self) -> Vec<TrackInfo> {
        snapshot(self.tracks())
    }

    /// Scan a native track list, registering tracks not seen before.
    ///
    /// Emits `subtitlesTracks` when the selectable list is non-empty, even if
    /// this pass added nothing. Returns the number of newly registered tracks.
    pub fn discover(&mut self, list: &TextTrackList, translator: &CueTranslator) -> usize {
        let mut added = 0;
        for (index, track) in list.iter().enumerate() {
            if self.register_native(index, track, translator) {
                added += 1;
            }
        }

        tracing::debug!(
            "Discovered {} new text tracks ({} native, {} selectable)",
            added,
            list.length(),
            self.len()
        );

        if !self.is_empty() {
            self.sink.emit(TrackEvent::SubtitlesTracks { tracks: self.snapshot() });
        }
        added
    }

    /// Register a native track found at `index`.
    ///
    /// Metadata tracks get the cue translator and are forced to showing so
    /// they keep receiving cues. Subtitles and captions become selectable.
    /// Returns false for cached tracks and kinds that are neither.
    pub fn register_native(&mut self, index: usize, track: &SharedTrack, translator: &CueTranslator) -> bool {
        let state = self.state.get_or_insert_with(Registered::default);
        let kind = track.borrow().kind;
        if state.cache.contains_key(&(index, kind)) {
            return false;
        }

        // same handle seen at another position: only its key moves
        let moved = state
            .cache
            .iter()
            .find(|(_, t)| Rc::ptr_eq(t, track))
            .map(|(key, _)| *key);
        if let Some(old) = moved {
            state.cache.remove(&old);
            state.cache.insert((index, kind), Rc::clone(track));
            return false;
        }

        match kind {
            TextTrackKind::Metadata => {
                let mut metadata = track.borrow_mut();
                metadata.set_cue_handler(translator.clone());
                metadata.mode = TextTrackMode::Showing;
            }
            TextTrackKind::Subtitles | TextTrackKind::Captions => {
                state.tracks.push(Rc::clone(track));
            }
            _ => return false,
        }
        state.cache.insert((index, kind), Rc::clone(track));
        true
    }

    /// Append a track rendered outside the native pipeline
    pub fn push_external(&mut self, track: SharedTrack) {
        self.state
            .get_or_insert_with(Registered::default)
            .tracks
            .push(track);
    }

    /// Forget every sideloaded track. Returns how many were removed from the list.
    pub fn remove_sideloaded(&mut self) -> usize {
        let Some(state) = self.state.as_mut() else {
            return 0;
        };
        let before = state.tracks.len();
        state.tracks.retain(|t| !t.borrow().is_sideloaded());
        state.cache.retain(|_, t| !t.borrow().is_sideloaded());
        before - state.tracks.len()
    }

    /// Re-key cached tracks by their current position in `list`.
    ///
    /// Native tracks the list no longer exposes are dropped. Tracks rendered
    /// outside the native pipeline are kept.
    pub fn reindex(&mut self, list: Option<&TextTrackList>) {
        let Some(state) = self.state.as_mut() else {
            return;
        };

        let cached: Vec<SharedTrack> = state.cache.drain().map(|(_, t)| t).collect();
        for track in cached {
            if let Some(index) = list.and_then(|l| l.index_of(&track)) {
                let kind = track.borrow().kind;
                state.cache.insert((index, kind), track);
            }
        }

        state.tracks.retain(|t| {
            state.cache.values().any(|c| Rc::ptr_eq(c, t))
                || (t.borrow().is_sideloaded() && list.is_none_or(|l| l.index_of(t).is_none()))
        });
    }
}
