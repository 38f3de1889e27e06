//! Capture configuration: URL match set, shape conventions, scroll pacing.
//!
//! The engine does not decide which endpoints carry data or which keys wrap
//! record collections; those are supplied here, with defaults matching the
//! dashboard-style endpoints the engine was built against.

use std::time::Duration;

use regex::{Regex, RegexSet, RegexSetBuilder};

use crate::core::PagetapError;

/// Path fragments that mark a response as worth capturing.
/// Matched case-insensitively anywhere in the request URL.
pub const DEFAULT_URL_PATTERNS: &[&str] = &[
    r"/responses\b",
    r"/logs\b",
    r"/requests\b",
    r"/dashboard-api/",
    r"/v1/responses\b",
    r"/v1/dashboard\b",
    r"/dashboard\b",
    r"/dashboard/chat/completions\b",
    r"/chat/completions\b",
];

/// Conventional wrapper keys under which APIs nest their record arrays,
/// tried in order.
pub const DEFAULT_WRAPPER_KEYS: &[&str] = &["data", "items", "responses", "logs", "completions"];

/// The conventional identifier field on a record.
pub const DEFAULT_ID_FIELD: &str = "id";

/// Sub-objects that may carry the identifier when the record itself doesn't.
pub const DEFAULT_ID_CONTAINERS: &[&str] = &["response", "request", "data"];

/// How long the scroll driver waits after each scroll for the host page to
/// react and issue new requests.
pub const DEFAULT_PACING: Duration = Duration::from_millis(800);

/// Consecutive no-growth iterations before the scroll driver gives up.
pub const DEFAULT_STAGNANT_LIMIT: u32 = 6;

/// Hard ceiling on scroll iterations.
pub const DEFAULT_MAX_ITERATIONS: u32 = 9999;

/// Broadcast channel capacity for the control/report bus.
pub const DEFAULT_BUS_CAPACITY: usize = 1024;

/* ---------------- URL matcher ---------------- */

/// A compiled, case-insensitive set of URL patterns.
#[derive(Debug, Clone)]
pub struct UrlMatcher {
    set: RegexSet,
}

impl UrlMatcher {
    /// Compile a pattern set.
    ///
    /// # Errors
    ///
    /// Returns [`PagetapError::Pattern`] naming the first pattern that fails
    /// to compile.
    pub fn new<I, S>(patterns: I) -> Result<Self, PagetapError>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let patterns: Vec<String> = patterns.into_iter().map(Into::into).collect();
        let set = RegexSetBuilder::new(&patterns)
            .case_insensitive(true)
            .build()
            .map_err(|source| {
                let pattern = patterns
                    .iter()
                    .find(|p| Regex::new(p).is_err())
                    .cloned()
                    .unwrap_or_default();
                PagetapError::Pattern { pattern, source }
            })?;
        Ok(Self { set })
    }

    /// Whether any pattern matches the given URL. Empty URLs never match.
    #[must_use]
    pub fn matches(&self, url: &str) -> bool {
        !url.is_empty() && self.set.is_match(url)
    }
}

/* ---------------- Config + builder ---------------- */

/// Everything the capture engine needs to know about the host it observes.
#[derive(Debug, Clone)]
pub struct CaptureConfig {
    matcher: UrlMatcher,
    wrapper_keys: Vec<String>,
    id_field: String,
    id_containers: Vec<String>,
    pacing: Duration,
    stagnant_limit: u32,
    max_iterations: u32,
    bus_capacity: usize,
}

impl Default for CaptureConfig {
    fn default() -> Self {
        Self::builder().build().expect("default config")
    }
}

impl CaptureConfig {
    /// Create a new builder.
    #[must_use]
    pub fn builder() -> CaptureConfigBuilder {
        CaptureConfigBuilder::default()
    }

    pub fn matcher(&self) -> &UrlMatcher {
        &self.matcher
    }
    pub fn wrapper_keys(&self) -> &[String] {
        &self.wrapper_keys
    }
    pub fn id_field(&self) -> &str {
        &self.id_field
    }
    pub fn id_containers(&self) -> &[String] {
        &self.id_containers
    }
    pub fn pacing(&self) -> Duration {
        self.pacing
    }
    pub fn stagnant_limit(&self) -> u32 {
        self.stagnant_limit
    }
    pub fn max_iterations(&self) -> u32 {
        self.max_iterations
    }
    pub fn bus_capacity(&self) -> usize {
        self.bus_capacity
    }
}

/// Builder for [`CaptureConfig`]. Unset fields fall back to the documented
/// defaults.
#[derive(Debug, Default)]
pub struct CaptureConfigBuilder {
    url_patterns: Option<Vec<String>>,
    wrapper_keys: Option<Vec<String>>,
    id_field: Option<String>,
    id_containers: Option<Vec<String>>,
    pacing: Option<Duration>,
    stagnant_limit: Option<u32>,
    max_iterations: Option<u32>,
    bus_capacity: Option<usize>,
}

impl CaptureConfigBuilder {
    /// Replace the URL match set.
    #[must_use]
    pub fn url_patterns<I, S>(mut self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.url_patterns = Some(patterns.into_iter().map(Into::into).collect());
        self
    }

    /// Replace the wrapper key list (checked in order).
    #[must_use]
    pub fn wrapper_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.wrapper_keys = Some(keys.into_iter().map(Into::into).collect());
        self
    }

    /// Override the identifier field name.
    #[must_use]
    pub fn id_field(mut self, field: impl Into<String>) -> Self {
        self.id_field = Some(field.into());
        self
    }

    /// Replace the sub-object names searched for a nested identifier.
    #[must_use]
    pub fn id_containers<I, S>(mut self, containers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.id_containers = Some(containers.into_iter().map(Into::into).collect());
        self
    }

    /// Scroll pacing interval.
    #[must_use]
    pub fn pacing(mut self, dur: Duration) -> Self {
        self.pacing = Some(dur);
        self
    }

    /// Consecutive stagnant iterations before the driver stops.
    #[must_use]
    pub fn stagnant_limit(mut self, n: u32) -> Self {
        self.stagnant_limit = Some(n);
        self
    }

    /// Hard ceiling on scroll iterations.
    #[must_use]
    pub fn max_iterations(mut self, n: u32) -> Self {
        self.max_iterations = Some(n);
        self
    }

    /// Control/report bus capacity.
    #[must_use]
    pub fn bus_capacity(mut self, n: usize) -> Self {
        self.bus_capacity = Some(n);
        self
    }

    /// Compile the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if a URL pattern fails to compile or a limit is zero.
    pub fn build(self) -> Result<CaptureConfig, PagetapError> {
        let matcher = match self.url_patterns {
            Some(patterns) => UrlMatcher::new(patterns)?,
            None => UrlMatcher::new(DEFAULT_URL_PATTERNS.iter().copied())?,
        };
        let stagnant_limit = self.stagnant_limit.unwrap_or(DEFAULT_STAGNANT_LIMIT);
        if stagnant_limit == 0 {
            return Err(PagetapError::Config(
                "stagnant limit must be at least 1".into(),
            ));
        }
        let bus_capacity = self.bus_capacity.unwrap_or(DEFAULT_BUS_CAPACITY);
        if bus_capacity == 0 {
            return Err(PagetapError::Config("bus capacity must be nonzero".into()));
        }
        Ok(CaptureConfig {
            matcher,
            wrapper_keys: self
                .wrapper_keys
                .unwrap_or_else(|| DEFAULT_WRAPPER_KEYS.iter().map(ToString::to_string).collect()),
            id_field: self.id_field.unwrap_or_else(|| DEFAULT_ID_FIELD.into()),
            id_containers: self
                .id_containers
                .unwrap_or_else(|| DEFAULT_ID_CONTAINERS.iter().map(ToString::to_string).collect()),
            pacing: self.pacing.unwrap_or(DEFAULT_PACING),
            stagnant_limit,
            max_iterations: self.max_iterations.unwrap_or(DEFAULT_MAX_ITERATIONS),
            bus_capacity,
        })
    }
}
