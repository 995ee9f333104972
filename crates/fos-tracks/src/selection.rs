//! Selection Controller
//!
//! Owns the current subtitle/caption selection. Externally the selection is
//! 1-based with 0 meaning off; internally it is a 0-based position or `None`.

use std::rc::Rc;

use crate::event::{EventSink, TrackEvent};
use crate::track::{snapshot, SharedTrack, TextTrackMode};

/// Selection controller
pub struct SelectionController {
    current: Option<usize>,
    sink: Rc<dyn EventSink>,
}

impl SelectionController {
    pub fn new(sink: Rc<dyn EventSink>) -> Self {
        Self { current: None, sink }
    }

    /// 0-based position of the selected track, `None` when off
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    /// 1-based selection, 0 when off
    pub fn external_index(&self) -> usize {
        self.current.map_or(0, |i| i + 1)
    }

    /// Forget the selection without touching track modes
    pub fn reset(&mut self) {
        self.current = None;
    }

    /// Select the track at 1-based `index` (0 = off) among `tracks`.
    ///
    /// Repeating the current selection does nothing. Otherwise every track is
    /// disabled, the target (if it exists) is shown and `subtitlesTrackChanged`
    /// is emitted. Returns whether the selection changed.
    pub fn select(&mut self, tracks: &[SharedTrack], index: usize) -> bool {
        let requested = index.checked_sub(1);
        if requested == self.current {
            return false;
        }

        for track in tracks {
            track.borrow_mut().mode = TextTrackMode::Disabled;
        }

        self.current = requested;
        if let Some(track) = requested.and_then(|i| tracks.get(i)) {
            track.borrow_mut().mode = TextTrackMode::Showing;
        }

        tracing::debug!("Subtitles track changed to {} of {}", index, tracks.len());
        self.sink.emit(TrackEvent::SubtitlesTrackChanged {
            current_track: self.external_index(),
            tracks: snapshot(tracks),
        });
        true
    }

    /// Stop showing the selected track but keep it selected
    pub fn disable_current(&self, tracks: &[SharedTrack]) {
        if let Some(track) = self.current.and_then(|i| tracks.get(i)) {
            track.borrow_mut().mode = TextTrackMode::Disabled;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::EventLog;
    use crate::track::{TextTrack, TextTrackKind};

    fn tracks(n: usize) -> Vec<SharedTrack> {
        (0..n)
            .map(|i| TextTrack::new(TextTrackKind::Subtitles, &format!("track {i}"), "en").into_shared())
            .collect()
    }

    fn showing(tracks: &[SharedTrack]) -> Vec<usize> {
        tracks
            .iter()
            .enumerate()
            .filter(|(_, t)| t.borrow().mode == TextTrackMode::Showing)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_select_shows_one() {
        let log = Rc::new(EventLog::new());
        let mut selection = SelectionController::new(log.clone());
        let tracks = tracks(3);

        assert!(selection.select(&tracks, 2));
        assert_eq!(selection.current(), Some(1));
        assert_eq!(showing(&tracks), vec![1]);

        assert!(selection.select(&tracks, 3));
        assert_eq!(showing(&tracks), vec![2]);

        match &log.take()[..] {
            [_, TrackEvent::SubtitlesTrackChanged { current_track, tracks }] => {
                assert_eq!(*current_track, 3);
                assert_eq!(tracks[2].mode, TextTrackMode::Showing);
            }
            other => panic!("unexpected events: {other:?}"),
        }
    }

    #[test]
    fn test_repeat_select_is_noop() {
        let log = Rc::new(EventLog::new());
        let mut selection = SelectionController::new(log.clone());
        let tracks = tracks(2);

        selection.select(&tracks, 1);
        tracks[1].borrow_mut().mode = TextTrackMode::Hidden;
        assert!(!selection.select(&tracks, 1));
        assert_eq!(tracks[1].borrow().mode, TextTrackMode::Hidden);
        assert_eq!(log.len(), 1);
    }

    #[test]
    fn test_select_off() {
        let log = Rc::new(EventLog::new());
        let mut selection = SelectionController::new(log.clone());
        let tracks = tracks(2);

        // already off
        assert!(!selection.select(&tracks, 0));

        selection.select(&tracks, 1);
        assert!(selection.select(&tracks, 0));
        assert_eq!(selection.current(), None);
        assert_eq!(selection.external_index(), 0);
        assert!(showing(&tracks).is_empty());
    }

    #[test]
    fn test_select_past_end() {
        let log = Rc::new(EventLog::new());
        let mut selection = SelectionController::new(log.clone());
        let tracks = tracks(1);

        selection.select(&tracks, 1);
        assert!(selection.select(&tracks, 5));
        assert_eq!(selection.current(), Some(4));
        assert!(showing(&tracks).is_empty());
    }

    #[test]
    fn test_disable_current_keeps_index() {
        let log = Rc::new(EventLog::new());
        let mut selection = SelectionController::new(log);
        let tracks = tracks(2);

        selection.disable_current(&tracks);
        selection.select(&tracks, 2);
        selection.disable_current(&tracks);
        assert_eq!(selection.current(), Some(1));
        assert!(showing(&tracks).is_empty());
    }
}
