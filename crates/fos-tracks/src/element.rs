//! Media Element
//!
//! The media element surface text tracks are discovered on and materialized
//! against, plus an in-memory implementation of it.

use std::rc::Rc;

use crate::listener::ListenerMode;
use crate::track::{SharedTrack, TextTrack, TextTrackKind, TextTrackList, TextTrackMode};

/// Element-level operations the track session needs from a media element
pub trait MediaSurface {
    /// Native text track list, if the platform exposes one
    fn text_tracks(&self) -> Option<&TextTrackList>;

    fn text_tracks_mut(&mut self) -> Option<&mut TextTrackList>;

    /// Append a `<track>` child; returns the text track it exposes.
    fn append_track(&mut self, element: TrackElement) -> SharedTrack;

    /// Remove every child element
    fn remove_tracks(&mut self);

    /// `crossorigin` attribute
    fn cross_origin(&self) -> Option<&str>;

    fn set_cross_origin(&mut self, value: &str);
}

/// `<track>` element
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackElement {
    pub src: String,
    pub kind: TextTrackKind,
    pub srclang: String,
    pub label: String,
    pub mode: TextTrackMode,
    pub id: String,
}

impl TrackElement {
    /// Text track exposed by this element
    pub fn to_track(&self) -> TextTrack {
        let mut track = TextTrack::from_file(&self.src, self.kind, &self.label, &self.srclang)
            .with_id(&self.id);
        track.mode = self.mode;
        track
    }
}

/// In-memory media element
#[derive(Debug)]
pub struct MediaElement {
    pub src: String,
    cross_origin: Option<String>,
    text_tracks: Option<TextTrackList>,
    children: Vec<(TrackElement, SharedTrack)>,
}

impl MediaElement {
    pub fn new(listener_mode: ListenerMode) -> Self {
        Self {
            src: String::new(),
            cross_origin: None,
            text_tracks: Some(TextTrackList::new(listener_mode)),
            children: Vec::new(),
        }
    }

    /// Element on a platform without a text track API
    pub fn without_text_tracks() -> Self {
        Self {
            src: String::new(),
            cross_origin: None,
            text_tracks: None,
            children: Vec::new(),
        }
    }

    /// Expose an in-band track, as a demuxer would
    pub fn add_native_track(&mut self, track: TextTrack) -> Option<SharedTrack> {
        self.text_tracks.as_mut().map(|list| list.add_track(track))
    }

    pub fn track_elements(&self) -> impl Iterator<Item = &TrackElement> {
        self.children.iter().map(|(element, _)| element)
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }
}

impl Default for MediaElement {
    fn default() -> Self {
        Self::new(ListenerMode::default())
    }
}

impl MediaSurface for MediaElement {
    fn text_tracks(&self) -> Option<&TextTrackList> {
        self.text_tracks.as_ref()
    }

    fn text_tracks_mut(&mut self) -> Option<&mut TextTrackList> {
        self.text_tracks.as_mut()
    }

    fn append_track(&mut self, element: TrackElement) -> SharedTrack {
        let track = match self.text_tracks.as_mut() {
            Some(list) => list.add_track(element.to_track()),
            None => element.to_track().into_shared(),
        };
        self.children.push((element, Rc::clone(&track)));
        track
    }

    fn remove_tracks(&mut self) {
        for (_, track) in self.children.drain(..) {
            if let Some(list) = self.text_tracks.as_mut() {
                list.remove_track(&track);
            }
        }
    }

    fn cross_origin(&self) -> Option<&str> {
        self.cross_origin.as_deref()
    }

    fn set_cross_origin(&mut self, value: &str) {
        self.cross_origin = Some(value.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn element(src: &str) -> TrackElement {
        TrackElement {
            src: src.to_string(),
            kind: TextTrackKind::Subtitles,
            srclang: "en".to_string(),
            label: "English".to_string(),
            mode: TextTrackMode::Disabled,
            id: String::new(),
        }
    }

    #[test]
    fn test_append_exposes_text_track() {
        let mut video = MediaElement::default();
        video.add_native_track(TextTrack::new(TextTrackKind::Metadata, "", ""));

        let track = video.append_track(element("en.vtt"));
        assert_eq!(video.child_count(), 1);
        assert_eq!(video.text_tracks().unwrap().length(), 2);
        assert_eq!(track.borrow().file(), Some("en.vtt"));
    }

    #[test]
    fn test_remove_tracks_keeps_in_band() {
        let mut video = MediaElement::default();
        video.add_native_track(TextTrack::new(TextTrackKind::Metadata, "", ""));
        video.append_track(element("en.vtt"));
        video.append_track(element("fr.vtt"));

        video.remove_tracks();
        assert_eq!(video.child_count(), 0);
        assert_eq!(video.text_tracks().unwrap().length(), 1);
    }

    #[test]
    fn test_without_text_tracks() {
        let mut video = MediaElement::without_text_tracks();
        assert!(video.text_tracks().is_none());
        assert!(video.add_native_track(TextTrack::default()).is_none());

        video.append_track(element("en.vtt"));
        assert_eq!(video.track_elements().count(), 1);
    }

    #[test]
    fn test_cross_origin_attribute() {
        let mut video = MediaElement::default();
        assert_eq!(video.cross_origin(), None);
        video.set_cross_origin("anonymous");
        assert_eq!(video.cross_origin(), Some("anonymous"));
    }
}
