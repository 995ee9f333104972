//! Cues and Metadata Translation
//!
//! Turns cuechange notifications on metadata tracks into `meta` events.

use std::fmt;
use std::rc::Rc;

use serde_json::Value;

use crate::config::CueTextPolicy;
use crate::event::{EventSink, TrackEvent};
use crate::TrackError;

/// Text track cue
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Cue {
    pub start_time: f64,
    pub end_time: f64,
    /// Textual payload (JSON document on metadata tracks)
    pub text: Option<String>,
    /// Raw payload (ID3 frames on metadata tracks)
    pub data: Option<Vec<u8>>,
}

impl Cue {
    pub fn text(start_time: f64, end_time: f64, text: &str) -> Self {
        Self {
            start_time,
            end_time,
            text: Some(text.to_string()),
            ..Default::default()
        }
    }

    pub fn data(start_time: f64, end_time: f64, data: Vec<u8>) -> Self {
        Self {
            start_time,
            end_time,
            data: Some(data),
            ..Default::default()
        }
    }
}

/// ID3 decoder collaborator
///
/// Receives every data-bearing cue that shares the most recent start time
/// and returns one decoded metadata document for the whole batch.
pub trait Id3Decoder {
    fn decode(&self, cues: &[&Cue]) -> Value;
}

impl<F> Id3Decoder for F
where
    F: Fn(&[&Cue]) -> Value,
{
    fn decode(&self, cues: &[&Cue]) -> Value {
        self(cues)
    }
}

/// Cuechange handler installed on metadata tracks
#[derive(Clone)]
pub struct CueTranslator {
    sink: Rc<dyn EventSink>,
    decoder: Rc<dyn Id3Decoder>,
    policy: CueTextPolicy,
}

impl fmt::Debug for CueTranslator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CueTranslator")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl CueTranslator {
    pub fn new(sink: Rc<dyn EventSink>, decoder: Rc<dyn Id3Decoder>, policy: CueTextPolicy) -> Self {
        Self { sink, decoder, policy }
    }

    /// Handle one cuechange notification.
    ///
    /// Active cues arrive sorted by start time, so the last one carries the
    /// reference instant. Anything that started earlier is stale and ignored.
    pub fn handle(&self, active_cues: &[Cue]) {
        let Some(latest) = active_cues.last() else {
            return;
        };
        let metadata_time = latest.start_time;

        let mut data_cues = Vec::new();
        for cue in active_cues {
            if cue.start_time < metadata_time {
                tracing::trace!("Skipping stale cue at {}s", cue.start_time);
                continue;
            }
            if cue.data.is_some() {
                data_cues.push(cue);
            } else if let Some(text) = cue.text.as_deref().filter(|t| !t.is_empty()) {
                match parse_cue_text(text, metadata_time) {
                    Ok(metadata) => self.sink.emit(TrackEvent::Meta { metadata_time, metadata }),
                    Err(err) => self.reject(err, metadata_time),
                }
            }
        }

        if !data_cues.is_empty() {
            tracing::trace!("Decoding {} ID3 cues at {}s", data_cues.len(), metadata_time);
            let metadata = self.decoder.decode(&data_cues);
            self.sink.emit(TrackEvent::Meta { metadata_time, metadata });
        }
    }

    fn reject(&self, err: TrackError, metadata_time: f64) {
        tracing::warn!("Dropping metadata cue: {}", err);
        if self.policy == CueTextPolicy::Report {
            self.sink.emit(TrackEvent::MetaError {
                metadata_time,
                message: err.to_string(),
            });
        }
    }
}

fn parse_cue_text(text: &str, time: f64) -> Result<Value, TrackError> {
    serde_json::from_str(text).map_err(|source| TrackError::CueText { time, source })
}
