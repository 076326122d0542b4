//! Topic value object.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Opaque identifier grouping connections for broadcast delivery.
///
/// No catalogue of valid topics exists. Subscribing to a topic nobody
/// publishes on is valid and simply never receives anything.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Topic(String);

impl Topic {
    /// Canonical topic for issue updates of a repository: `repo-{name}-{owner}`.
    pub fn for_repository(name: &str, owner: &str) -> Self {
        Self(format!("repo-{}-{}", name, owner))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for Topic {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for Topic {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}
