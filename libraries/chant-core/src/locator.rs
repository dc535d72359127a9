//! Storage locator parsing
//!
//! A track's audio lives in object storage and is referenced by an opaque
//! locator string such as `s3://chants/office/kyrie.mp3`. The player never
//! fetches that locator directly: it splits it into a container (`chants`) and
//! an object key (`office/kyrie.mp3`) and asks the catalog API for a signed,
//! time-limited URL.
//!
//! Parsing is pure and cheap, so it can run every time the selection changes.

use std::fmt;

use thiserror::Error;

/// Scheme accepted by [`LocatorResolver::default`]
pub const DEFAULT_SCHEME: &str = "s3";

const SCHEME_SEPARATOR: &str = "://";

/// Reasons a locator string is rejected
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LocatorError {
    /// Locator string is empty or whitespace
    #[error("Invalid locator: locator is empty")]
    Empty,

    /// Locator does not start with a recognized `<scheme>://` prefix
    #[error("Invalid locator {locator:?}: missing recognized scheme prefix")]
    MissingScheme { locator: String },

    /// Nothing between the scheme and the first `/`
    #[error("Invalid locator {locator:?}: empty container")]
    EmptyContainer { locator: String },

    /// Nothing after the container
    #[error("Invalid locator {locator:?}: empty object key")]
    EmptyKey { locator: String },
}

/// Parsed storage locator: container plus object key
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    container: String,
    key: String,
}

impl Locator {
    /// Parse a locator using the default `s3://` scheme
    pub fn parse(locator: &str) -> Result<Self, LocatorError> {
        LocatorResolver::default().resolve(locator)
    }

    /// Build a locator from already validated parts
    pub fn new(container: impl Into<String>, key: impl Into<String>) -> Self {
        Self {
            container: container.into(),
            key: key.into(),
        }
    }

    /// Storage container (bucket)
    pub fn container(&self) -> &str {
        &self.container
    }

    /// Object key inside the container
    pub fn key(&self) -> &str {
        &self.key
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.container, self.key)
    }
}

/// Locator parser configured with the set of accepted schemes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LocatorResolver {
    schemes: Vec<String>,
}

impl LocatorResolver {
    /// Create a resolver accepting the given schemes (without `://`)
    pub fn new<I, S>(schemes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            schemes: schemes.into_iter().map(Into::into).collect(),
        }
    }

    /// Accepted schemes
    pub fn schemes(&self) -> &[String] {
        &self.schemes
    }

    /// Translate a locator string into container and key
    ///
    /// The key is everything after the first `/` following the container,
    /// so nested keys like `office/lauds/kyrie.mp3` are kept intact.
    pub fn resolve(&self, locator: &str) -> Result<Locator, LocatorError> {
        if locator.trim().is_empty() {
            return Err(LocatorError::Empty);
        }

        let path = self
            .strip_scheme(locator)
            .ok_or_else(|| LocatorError::MissingScheme {
                locator: locator.to_string(),
            })?;

        let (container, key) = path.split_once('/').unwrap_or((path, ""));

        if container.trim().is_empty() {
            return Err(LocatorError::EmptyContainer {
                locator: locator.to_string(),
            });
        }
        if key.trim().is_empty() {
            return Err(LocatorError::EmptyKey {
                locator: locator.to_string(),
            });
        }

        Ok(Locator::new(container, key))
    }

    /// Whether the locator parses under this resolver
    pub fn is_valid(&self, locator: &str) -> bool {
        self.resolve(locator).is_ok()
    }

    fn strip_scheme<'a>(&self, locator: &'a str) -> Option<&'a str> {
        self.schemes.iter().find_map(|scheme| {
            locator
                .strip_prefix(scheme.as_str())
                .and_then(|rest| rest.strip_prefix(SCHEME_SEPARATOR))
        })
    }
}

impl Default for LocatorResolver {
    fn default() -> Self {
        Self::new([DEFAULT_SCHEME])
    }
}
