//! Host browser capability flags.

/// Name and version string reported by the host browser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrowserInfo {
    pub name: String,
    pub version: String,
}

impl BrowserInfo {
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
        }
    }

    /// Leading integer of the version string (`"62.0b3"` -> 62).
    pub fn major_version(&self) -> Option<u32> {
        let digits: String = self
            .version
            .trim_start()
            .chars()
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }

    fn is_firefox_at_least(&self, major: u32) -> bool {
        self.name == "Firefox" && self.major_version().is_some_and(|v| v >= major)
    }
}

/// Firefox release that accepts a window id for icons and badges.
pub const WINDOW_ID_MIN_FIREFOX: u32 = 62;
/// Firefox release that can reset a single tab's icon or badge.
pub const TAB_RESET_MIN_FIREFOX: u32 = 59;

/// What the host lets the presenter address.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Capabilities {
    /// Icons and badges can be set per window.
    pub supports_window_id: bool,
    /// A single tab's icon or badge can be reset to the global value.
    pub supports_tab_reset: bool,
}

impl Capabilities {
    /// Flags for `info`; an unknown host supports neither.
    pub fn detect(info: Option<&BrowserInfo>) -> Self {
        let Some(info) = info else {
            log::info!("No browser info available, assuming minimal capabilities");
            return Self::default();
        };
        let capabilities = Self {
            supports_window_id: info.is_firefox_at_least(WINDOW_ID_MIN_FIREFOX),
            supports_tab_reset: info.is_firefox_at_least(TAB_RESET_MIN_FIREFOX),
        };
        log::info!(
            "{} {}: window ids {}, tab reset {}",
            info.name,
            info.version,
            capabilities.supports_window_id,
            capabilities.supports_tab_reset
        );
        capabilities
    }
}
