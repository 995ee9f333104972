//! Sideloaded Tracks
//!
//! Merges application supplied track descriptors into the registry. WebVTT
//! files are materialized as `<track>` children of the media element; other
//! formats go straight into the selectable list for an external renderer.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::config::TracksConfig;
use crate::cue::CueTranslator;
use crate::element::{MediaSurface, TrackElement};
use crate::registry::TrackRegistry;
use crate::selection::SelectionController;
use crate::track::{TextTrack, TextTrackKind, TextTrackMode};

static WEB_SUBTITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.(?:web)?vtt(?:\?.*)?$").expect("valid subtitle pattern"));

/// Application supplied track
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SideloadDescriptor {
    pub file: String,
    #[serde(default = "default_kind")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub defaulttrack: bool,
}

fn default_kind() -> String {
    TextTrackKind::Captions.as_str().to_string()
}

impl SideloadDescriptor {
    pub fn new(file: &str, kind: &str) -> Self {
        Self {
            file: file.to_string(),
            kind: kind.to_string(),
            language: None,
            label: None,
            default: false,
            defaulttrack: false,
        }
    }

    pub fn with_language(mut self, language: &str) -> Self {
        self.language = Some(language.to_string());
        self
    }

    pub fn with_label(mut self, label: &str) -> Self {
        self.label = Some(label.to_string());
        self
    }

    pub fn as_default(mut self) -> Self {
        self.default = true;
        self
    }

    pub fn is_default(&self) -> bool {
        self.default || self.defaulttrack
    }

    fn track_id(&self) -> &'static str {
        if self.is_default() { "default" } else { "" }
    }

    fn element(&self, kind: TextTrackKind) -> TrackElement {
        TrackElement {
            src: self.file.clone(),
            kind,
            srclang: self.language.clone().unwrap_or_default(),
            label: self.label.clone().unwrap_or_default(),
            mode: TextTrackMode::Disabled,
            id: self.track_id().to_string(),
        }
    }

    fn track(&self, kind: TextTrackKind) -> TextTrack {
        TextTrack::from_file(
            &self.file,
            kind,
            self.label.as_deref().unwrap_or_default(),
            self.language.as_deref().unwrap_or_default(),
        )
        .with_id(self.track_id())
    }
}

/// `.vtt` / `.webvtt`, any case, optional query string
pub fn is_web_subtitle(file: &str) -> bool {
    WEB_SUBTITLE.is_match(file)
}

/// Whether loading `file` from `page` crosses origins.
///
/// Relative files resolve against the page. Without a page location only
/// absolute URLs with a host are treated as cross-origin.
pub fn is_cross_origin(file: &str, page: Option<&Url>) -> bool {
    match page {
        Some(page) => page
            .join(file)
            .is_ok_and(|url| url.origin() != page.origin()),
        None => Url::parse(file).is_ok_and(|url| url.origin().is_tuple()),
    }
}

/// Sideload merger
#[derive(Debug, Default)]
pub struct SideloadMerger {
    native_count: usize,
}

impl SideloadMerger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Track elements materialized by the last merge
    pub fn native_count(&self) -> usize {
        self.native_count
    }

    pub fn reset(&mut self) {
        self.native_count = 0;
    }

    /// Same number of descriptors as selectable tracks, and the element still
    /// exposes exactly the tracks materialized last time.
    pub fn already_sideloaded(
        &self,
        descriptors: &[SideloadDescriptor],
        registry: &TrackRegistry,
        media: &impl MediaSurface,
    ) -> bool {
        registry.is_initialized()
            && descriptors.len() == registry.len()
            && media.text_tracks().map_or(0, |list| list.length()) == self.native_count
    }

    /// Merge `descriptors`, re-materializing only when something changed.
    ///
    /// Returns whether the media element was rebuilt.
    pub fn merge(
        &mut self,
        config: &TracksConfig,
        descriptors: &[SideloadDescriptor],
        registry: &mut TrackRegistry,
        selection: &SelectionController,
        translator: &CueTranslator,
        media: &mut impl MediaSurface,
    ) -> bool {
        if !config.sideload_enabled() || descriptors.is_empty() {
            tracing::debug!(
                "Skipping sideload of {} tracks (restricted: {}, platform: {:?})",
                descriptors.len(),
                config.restricted_embed,
                config.platform
            );
            return false;
        }

        if self.already_sideloaded(descriptors, registry, &*media) {
            tracing::debug!("Sideloaded tracks already in place");
            return false;
        }

        selection.disable_current(registry.tracks());
        media.remove_tracks();
        if registry.is_initialized() {
            registry.remove_sideloaded();
            registry.reindex(media.text_tracks());
        } else {
            registry.initialize();
        }
        self.materialize(config, descriptors, registry, translator, media);
        true
    }

    fn materialize(
        &mut self,
        config: &TracksConfig,
        descriptors: &[SideloadDescriptor],
        registry: &mut TrackRegistry,
        translator: &CueTranslator,
        media: &mut impl MediaSurface,
    ) {
        self.native_count = 0;
        let mut cross_origin_set = false;

        for descriptor in descriptors {
            let kind = match descriptor.kind.parse::<TextTrackKind>() {
                Ok(kind) => kind,
                Err(err) => {
                    tracing::warn!("Skipping sideloaded track {}: {}", descriptor.file, err);
                    continue;
                }
            };

            if !is_web_subtitle(&descriptor.file) {
                registry.push_external(descriptor.track(kind).into_shared());
                continue;
            }

            if media.text_tracks().is_none() {
                tracing::warn!(
                    "No native text tracks, leaving {} to the captions renderer",
                    descriptor.file
                );
                registry.push_external(descriptor.track(kind).into_shared());
                continue;
            }

            if !cross_origin_set
                && media.cross_origin().is_none()
                && is_cross_origin(&descriptor.file, config.page_url.as_ref())
            {
                media.set_cross_origin("anonymous");
                cross_origin_set = true;
            }

            let track = media.append_track(descriptor.element(kind));
            self.native_count += 1;

            let index = media.text_tracks().and_then(|list| list.index_of(&track));
            if let Some(index) = index {
                registry.register_native(index, &track, translator);
            }
        }

        tracing::debug!(
            "Materialized {} of {} sideloaded tracks",
            self.native_count,
            descriptors.len()
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_web_subtitle_extensions() {
        assert!(is_web_subtitle("captions/en.vtt"));
        assert!(is_web_subtitle("captions/en.WebVTT"));
        assert!(is_web_subtitle("https://cdn.example.com/en.VTT?token=abc&x=1"));
        assert!(!is_web_subtitle("captions/en.srt"));
        assert!(!is_web_subtitle("captions/en.ttml"));
        assert!(!is_web_subtitle("captions/en.vtt.bak"));
        assert!(!is_web_subtitle("captions/vtt"));
    }

    #[test]
    fn test_cross_origin_with_page() {
        let page = Url::parse("https://player.example.com/watch/1").unwrap();
        assert!(!is_cross_origin("en.vtt", Some(&page)));
        assert!(!is_cross_origin("/tracks/en.vtt", Some(&page)));
        assert!(!is_cross_origin("https://player.example.com/en.vtt", Some(&page)));
        assert!(is_cross_origin("https://cdn.example.com/en.vtt", Some(&page)));
        assert!(is_cross_origin("http://player.example.com/en.vtt", Some(&page)));
        assert!(is_cross_origin("//cdn.example.com/en.vtt", Some(&page)));
    }

    #[test]
    fn test_cross_origin_without_page() {
        assert!(!is_cross_origin("tracks/en.vtt", None));
        assert!(is_cross_origin("https://cdn.example.com/en.vtt", None));
    }

    #[test]
    fn test_descriptor_json() {
        let descriptors: Vec<SideloadDescriptor> = serde_json::from_str(
            r#"[
                {"file": "en.vtt", "kind": "subtitles", "language": "en", "label": "English", "default": true},
                {"file": "fr.srt", "defaulttrack": true},
                {"file": "de.vtt", "kind": "captions"}
            ]"#,
        )
        .unwrap();

        assert_eq!(descriptors[0].track_id(), "default");
        assert_eq!(descriptors[1].kind, "captions");
        assert!(descriptors[1].is_default());
        assert!(!descriptors[2].is_default());
        assert_eq!(descriptors[2].language, None);
    }

    #[test]
    fn test_element_fields() {
        let element = SideloadDescriptor::new("en.vtt", "subtitles")
            .with_label("English")
            .as_default()
            .element(TextTrackKind::Subtitles);

        assert_eq!(element.src, "en.vtt");
        assert_eq!(element.srclang, "");
        assert_eq!(element.label, "English");
        assert_eq!(element.mode, TextTrackMode::Disabled);
        assert_eq!(element.id, "default");
    }
}
