//! Text Track Session
//!
//! Ties the registry, sideload merger, selection controller and cue
//! translator to one playback session.

use std::rc::Rc;

use crate::config::TracksConfig;
use crate::cue::{CueTranslator, Id3Decoder};
use crate::element::MediaSurface;
use crate::event::EventSink;
use crate::listener::{self, ListenerId, ListenerTarget, CHANGE};
use crate::registry::TrackRegistry;
use crate::selection::SelectionController;
use crate::sideload::{SideloadDescriptor, SideloadMerger};
use crate::track::{SharedTrack, TextTrackMode};

/// Listener id the session binds its change handler under
pub const TRACK_CHANGE_LISTENER: ListenerId = 1;

/// Text track session
pub struct TextTrackSession {
    config: TracksConfig,
    translator: CueTranslator,
    registry: TrackRegistry,
    selection: SelectionController,
    sideload: SideloadMerger,
}

impl TextTrackSession {
    pub fn new(config: TracksConfig, sink: Rc<dyn EventSink>, decoder: Rc<dyn Id3Decoder>) -> Self {
        let translator = CueTranslator::new(Rc::clone(&sink), decoder, config.cue_text_policy);
        Self {
            config,
            translator,
            registry: TrackRegistry::new(Rc::clone(&sink)),
            selection: SelectionController::new(sink),
            sideload: SideloadMerger::new(),
        }
    }

    pub fn config(&self) -> &TracksConfig {
        &self.config
    }

    /// Start a fresh, empty track list
    pub fn initialize(&mut self) {
        self.registry.initialize();
    }

    /// Selectable tracks (subtitles, captions and sideloaded non-VTT files)
    pub fn tracks(&self) -> &[SharedTrack] {
        self.registry.tracks()
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    /// Track elements materialized by the last sideload
    pub fn native_track_count(&self) -> usize {
        self.sideload.native_count()
    }

    /// Scan the media element's text tracks.
    ///
    /// Safe to call on every loadeddata; tracks seen before are skipped.
    pub fn discover(&mut self, media: &mut impl MediaSurface) {
        self.selection.reset();
        let Some(list) = media.text_tracks() else {
            tracing::debug!("Media element exposes no text tracks");
            return;
        };

        if !self.registry.is_initialized() {
            self.registry.initialize();
        }
        self.registry.discover(list, &self.translator);

        if let Some(list) = media.text_tracks_mut() {
            listener::attach(list, CHANGE, TRACK_CHANGE_LISTENER);
        }
    }

    /// Merge application supplied tracks. Repeating an unchanged list (e.g.
    /// when resuming after an ad break) does nothing.
    pub fn sideload(&mut self, media: &mut impl MediaSurface, descriptors: &[SideloadDescriptor]) {
        self.sideload.merge(
            &self.config,
            descriptors,
            &mut self.registry,
            &self.selection,
            &self.translator,
            media,
        );
    }

    /// Select by 1-based index, 0 = off
    pub fn select(&mut self, index: usize) {
        if !self.registry.is_initialized() {
            tracing::debug!("Ignoring subtitles track {} before tracks are set up", index);
            return;
        }
        self.selection.select(self.registry.tracks(), index);
    }

    /// 0-based index of the selected track, `None` when off
    pub fn current(&self) -> Option<usize> {
        self.selection.current()
    }

    /// Hide the selected track without changing the selection
    pub fn disable_current(&self) {
        self.selection.disable_current(self.registry.tracks());
    }

    /// End of the playback session. Safe from any state.
    pub fn clear(&mut self) {
        self.registry.clear();
        self.selection.reset();
        self.sideload.reset();
    }

    pub fn attach_listener(&self, target: &mut dyn ListenerTarget, event_type: &str) {
        listener::attach(target, event_type, TRACK_CHANGE_LISTENER);
    }

    pub fn detach_listener(&self, target: Option<&mut dyn ListenerTarget>, event_type: &str) {
        listener::detach(target, event_type, TRACK_CHANGE_LISTENER);
    }

    /// Deliver a track list event fired by the media element.
    ///
    /// Runs the change handler only while it is bound for `event_type`.
    /// Returns whether it ran.
    pub fn dispatch_list_event(&mut self, media: &mut impl MediaSurface, event_type: &str) -> bool {
        let bound = media
            .text_tracks()
            .is_some_and(|list| list.binding().is_bound(event_type, TRACK_CHANGE_LISTENER));
        if bound {
            self.handle_track_change(media);
        }
        bound
    }

    /// Tracks appeared after load, or a mode was changed outside `select`.
    pub fn handle_track_change(&mut self, media: &mut impl MediaSurface) {
        if !self.registry.is_initialized() {
            self.discover(media);
            return;
        }

        let showing = self
            .registry
            .tracks()
            .iter()
            .position(|t| t.borrow().mode == TextTrackMode::Showing);
        self.selection
            .select(self.registry.tracks(), showing.map_or(0, |i| i + 1));
    }
}
