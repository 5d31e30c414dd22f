//! Watched-workload identifiers and the immutable watch set.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{ConfigError, ConfigResult};

/// Identifier of a watched workload object, `{namespace}/{name}`.
///
/// Equality is by value; the pair is stable for the process lifetime.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct WatchRef {
    pub namespace: String,
    pub name: String,
}

impl WatchRef {
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for WatchRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.namespace, self.name)
    }
}

impl FromStr for WatchRef {
    type Err = ConfigError;

    /// Parse `namespace/name`. Exactly one slash, both parts non-empty.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.matches('/').count() != 1 {
            return Err(ConfigError::InvalidWatchRef(s.to_string()));
        }
        let (namespace, name) = s.split_once('/').unwrap_or_default();
        if namespace.is_empty() || name.is_empty() {
            return Err(ConfigError::InvalidWatchRef(s.to_string()));
        }
        Ok(WatchRef::new(namespace, name))
    }
}

/// The fixed set of workload objects snoozd watches.
///
/// Built once at startup from the comma-separated specifier and never
/// mutated afterwards.
#[derive(Debug, Clone)]
pub struct WatchSet {
    refs: BTreeSet<WatchRef>,
}

impl WatchSet {
    /// Parse a comma-separated list of `namespace/name` pairs.
    ///
    /// Malformed entries are logged and skipped; an empty result is a
    /// fatal startup error.
    pub fn parse(spec: &str) -> ConfigResult<Self> {
        let mut refs = BTreeSet::new();
        for entry in spec.split(',') {
            let entry = entry.trim();
            if entry.is_empty() {
                continue;
            }
            match entry.parse::<WatchRef>() {
                Ok(watch) => {
                    refs.insert(watch);
                }
                Err(e) => {
                    warn!(entry = %entry, error = %e, "skipping invalid watch entry");
                }
            }
        }
        if refs.is_empty() {
            return Err(ConfigError::EmptyWatchSet);
        }
        Ok(Self { refs })
    }

    /// Build a watch set from parsed refs. Errors if empty.
    pub fn from_refs(refs: impl IntoIterator<Item = WatchRef>) -> ConfigResult<Self> {
        let refs: BTreeSet<WatchRef> = refs.into_iter().collect();
        if refs.is_empty() {
            return Err(ConfigError::EmptyWatchSet);
        }
        Ok(Self { refs })
    }

    pub fn contains(&self, watch: &WatchRef) -> bool {
        self.refs.contains(watch)
    }

    pub fn iter(&self) -> impl Iterator<Item = &WatchRef> {
        self.refs.iter()
    }

    pub fn len(&self) -> usize {
        self.refs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.refs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn watch_ref_parses_namespace_and_name() {
        let watch: WatchRef = "default/api".parse().unwrap();
        assert_eq!(watch.namespace, "default");
        assert_eq!(watch.name, "api");
        assert_eq!(watch.to_string(), "default/api");
    }

    #[test]
    fn watch_ref_rejects_malformed() {
        assert!("no-slash".parse::<WatchRef>().is_err());
        assert!("a/b/c".parse::<WatchRef>().is_err());
        assert!("/name".parse::<WatchRef>().is_err());
        assert!("ns/".parse::<WatchRef>().is_err());
    }

    #[test]
    fn watch_set_parses_comma_separated() {
        let set = WatchSet::parse("default/api, prod/worker").unwrap();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&WatchRef::new("default", "api")));
        assert!(set.contains(&WatchRef::new("prod", "worker")));
    }

    #[test]
    fn watch_set_skips_invalid_entries() {
        let set = WatchSet::parse("bad-entry,default/api").unwrap();
        assert_eq!(set.len(), 1);
        assert!(set.contains(&WatchRef::new("default", "api")));
    }

    #[test]
    fn watch_set_deduplicates() {
        let set = WatchSet::parse("default/api,default/api").unwrap();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn empty_watch_set_is_an_error() {
        assert!(matches!(WatchSet::parse(""), Err(ConfigError::EmptyWatchSet)));
        assert!(matches!(
            WatchSet::parse("only,bad,entries"),
            Err(ConfigError::EmptyWatchSet)
        ));
    }
}
