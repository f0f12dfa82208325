//! Blocking HTTP access for remote themes and icons.
//!
//! The engine only talks to the network through the [`HttpClient`] trait, so
//! tests and embedders can substitute their own transport. [`UreqHttpClient`]
//! is the default implementation: a `ureq` agent with a global timeout,
//! guarded by a [`UrlPolicy`] allow-list.

use std::fmt;

use log::{debug, trace};
use regex::Regex;
use ureq::Agent;
use url::Url;

use crate::{LiveryError, ThemeError, config::HttpConfig};

/// The body of a successful `GET` together with its declared content type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteContent {
    /// Value of the `Content-Type` header, empty if the server sent none.
    pub content_type: String,
    pub bytes: Vec<u8>,
}

impl RemoteContent {
    pub fn new(content_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            content_type: content_type.into(),
            bytes: bytes.into(),
        }
    }
}

/// Fetches remote resources.
pub trait HttpClient: Send + Sync {
    /// Performs a `GET` request.
    ///
    /// # Errors
    ///
    /// Returns [`ThemeError::NotAllowed`] if policy forbids the URL and
    /// [`ThemeError::UnreachableResource`] for transport or status failures.
    fn get(&self, url: &str) -> Result<RemoteContent, ThemeError>;
}

/// Allow-list of URL patterns.
///
/// Each pattern must match the whole URL. An empty policy denies every URL,
/// so remote access is opt-in (`".*"` allows everything).
#[derive(Debug, Clone, Default)]
pub struct UrlPolicy {
    patterns: Vec<Regex>,
}

impl UrlPolicy {
    /// Compiles the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`LiveryError::Config`] if a pattern is not a valid regular
    /// expression.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, LiveryError> {
        let patterns = patterns
            .iter()
            .map(|pattern| {
                let pattern = pattern.as_ref();
                Regex::new(&format!("^(?:{pattern})$")).map_err(|err| {
                    LiveryError::Config(format!("invalid URL pattern `{pattern}`: {err}"))
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_allowed(&self, url: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(url))
    }

    /// Returns an error unless `url` is allowed.
    pub fn check(&self, url: &str) -> Result<(), ThemeError> {
        if self.is_allowed(url) {
            Ok(())
        } else {
            Err(ThemeError::NotAllowed {
                url: url.to_string(),
            })
        }
    }
}

/// [`HttpClient`] backed by a `ureq` agent.
pub struct UreqHttpClient {
    agent: Agent,
    policy: UrlPolicy,
}

impl fmt::Debug for UreqHttpClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UreqHttpClient")
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

impl UreqHttpClient {
    /// Creates a client from the HTTP configuration section.
    ///
    /// The agent itself never follows redirects; [`get`](HttpClient::get)
    /// follows them so that every hop is checked against the allow-list.
    ///
    /// # Errors
    ///
    /// Returns [`LiveryError::Config`] if an allow-list pattern is invalid.
    pub fn new(config: &HttpConfig) -> Result<Self, LiveryError> {
        let agent_config = Agent::config_builder()
            .timeout_global(Some(config.timeout()))
            .max_redirects(0)
            .build();

        Ok(Self {
            agent: Agent::new_with_config(agent_config),
            policy: UrlPolicy::new(config.allow())?,
        })
    }
}

impl HttpClient for UreqHttpClient {
    fn get(&self, url: &str) -> Result<RemoteContent, ThemeError> {
        let mut location = url.to_string();

        for _ in 0..=MAX_REDIRECTS {
            self.policy.check(&location)?;

            debug!(url = location; "Fetching remote resource");
            let mut response = self
                .agent
                .get(&location)
                .call()
                .map_err(|err| ThemeError::unreachable(&location, err))?;

            if response.status().is_redirection() {
                let next = redirect_target(&location, response.headers().get("location"))?;
                debug!(from = location, to = next; "Following redirect");
                location = next;
                continue;
            }

            let content_type = response
                .headers()
                .get("content-type")
                .and_then(|value| value.to_str().ok())
                .unwrap_or_default()
                .to_string();

            let bytes = response
                .body_mut()
                .read_to_vec()
                .map_err(|err| ThemeError::unreachable(&location, err))?;

            trace!(url = location, content_type, len = bytes.len(); "Fetched remote resource");
            return Ok(RemoteContent {
                content_type,
                bytes,
            });
        }

        Err(ThemeError::unreachable(url, "too many redirects"))
    }
}

/// Redirects followed by [`UreqHttpClient`] before giving up.
const MAX_REDIRECTS: usize = 10;

/// Resolves a `Location` header against the URL that returned it.
fn redirect_target(
    current: &str,
    header: Option<&ureq::http::HeaderValue>,
) -> Result<String, ThemeError> {
    let location = header
        .and_then(|value| value.to_str().ok())
        .ok_or_else(|| ThemeError::unreachable(current, "redirect without a Location header"))?;

    Url::parse(current)
        .and_then(|base| base.join(location))
        .map(String::from)
        .map_err(|err| ThemeError::unreachable(current, err))
}
