//! Track Configuration

use serde::{Deserialize, Serialize};
use url::Url;

/// Host platform, as far as text track rendering is concerned
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Chrome,
    Safari,
    Ios,
    Firefox,
    Edge,
    Android,
    #[default]
    Other,
}

impl Platform {
    /// Detect the platform from a user agent string
    pub fn from_user_agent(user_agent: &str) -> Self {
        let ua = user_agent.to_ascii_lowercase();
        if ["iphone", "ipad", "ipod"].iter().any(|d| ua.contains(d)) {
            Self::Ios
        } else if ua.contains("edge/") || ua.contains("edg/") {
            Self::Edge
        } else if ua.contains("firefox/") {
            Self::Firefox
        } else if ua.contains("chrome/") || ua.contains("crios/") {
            Self::Chrome
        } else if ua.contains("android") {
            Self::Android
        } else if ua.contains("safari/") {
            Self::Safari
        } else {
            Self::Other
        }
    }

    /// Whether `<track>` elements are rendered by the platform itself
    pub fn renders_natively(&self) -> bool {
        matches!(self, Self::Chrome | Self::Safari | Self::Ios)
    }
}

/// What to do with metadata cue text that is not valid JSON
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CueTextPolicy {
    /// Log and skip the cue
    #[default]
    Drop,
    /// Log and emit a `metaError` event
    Report,
}

/// Track session configuration
#[derive(Debug, Clone, Default)]
pub struct TracksConfig {
    /// Restricted embedding (SDK) mode; sideloading is disabled
    pub restricted_embed: bool,

    /// Platform the player runs on
    pub platform: Platform,

    /// Location of the embedding page, for cross-origin checks
    pub page_url: Option<Url>,

    /// Handling of malformed metadata cue text
    pub cue_text_policy: CueTextPolicy,
}

impl TracksConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_platform(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }

    pub fn with_user_agent(self, user_agent: &str) -> Self {
        self.with_platform(Platform::from_user_agent(user_agent))
    }

    pub fn with_restricted_embed(mut self, restricted: bool) -> Self {
        self.restricted_embed = restricted;
        self
    }

    pub fn with_page_url(mut self, page_url: Url) -> Self {
        self.page_url = Some(page_url);
        self
    }

    pub fn with_cue_text_policy(mut self, policy: CueTextPolicy) -> Self {
        self.cue_text_policy = policy;
        self
    }

    /// Sideloaded tracks are only merged when not embedded and rendered natively
    pub fn sideload_enabled(&self) -> bool {
        !self.restricted_embed && self.platform.renders_natively()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_platform_detection() {
        let chrome = "Mozilla/5.0 (X11; Linux x86_64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36";
        let safari = "Mozilla/5.0 (Macintosh; Intel Mac OS X 14_1) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/17.1 Safari/605.1.15";
        let iphone = "Mozilla/5.0 (iPhone; CPU iPhone OS 17_1 like Mac OS X) AppleWebKit/605.1.15 (KHTML, like Gecko) CriOS/120.0 Mobile/15E148 Safari/604.1";
        let edge = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36 Edg/120.0";
        let firefox = "Mozilla/5.0 (X11; Linux x86_64; rv:121.0) Gecko/20100101 Firefox/121.0";
        let android = "Mozilla/5.0 (Linux; U; Android 4.0.3) AppleWebKit/534.30 (KHTML, like Gecko) Version/4.0 Mobile Safari/534.30";

        assert_eq!(Platform::from_user_agent(chrome), Platform::Chrome);
        assert_eq!(Platform::from_user_agent(safari), Platform::Safari);
        assert_eq!(Platform::from_user_agent(iphone), Platform::Ios);
        assert_eq!(Platform::from_user_agent(edge), Platform::Edge);
        assert_eq!(Platform::from_user_agent(firefox), Platform::Firefox);
        assert_eq!(Platform::from_user_agent(android), Platform::Android);
        assert_eq!(Platform::from_user_agent("curl/8.0"), Platform::Other);
    }

    #[test]
    fn test_sideload_enabled() {
        assert!(!TracksConfig::default().sideload_enabled());
        assert!(TracksConfig::new().with_platform(Platform::Safari).sideload_enabled());
        assert!(!TracksConfig::new().with_platform(Platform::Firefox).sideload_enabled());
        assert!(
            !TracksConfig::new()
                .with_platform(Platform::Chrome)
                .with_restricted_embed(true)
                .sideload_enabled()
        );
    }
}
