//! Documentation warnings
//!
//! Problems found in documentation content never abort a build. They are
//! recorded as [`Warning`]s and reported once, de-duplicated and sorted,
//! at the end of the run.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// Category of a documentation warning
///
/// The declaration order is the report order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum WarningKind {
    /// A tag that needs content had none
    EmptyTag,
    /// A tag was expected but not found
    MissingTag,
    /// A tag that should appear once appeared several times; the first one is used
    MultipleTags,
    /// A `@param` tag without a parameter name
    ParamTagWithoutContent,
    /// A reference tag carried more than one reference
    TooMuchContentForTag,
    /// A declared type could not be resolved to a concrete type
    UnresolvedBinding,
    /// Missing, undocumented, cyclic or conflicting redirection target
    RedirectionProblem,
    /// Anything else
    Other,
}

impl WarningKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::EmptyTag => "EmptyTag",
            Self::MissingTag => "MissingTag",
            Self::MultipleTags => "MultipleTags",
            Self::ParamTagWithoutContent => "ParamTagWithoutContent",
            Self::TooMuchContentForTag => "TooMuchContentForTag",
            Self::UnresolvedBinding => "UnresolvedBinding",
            Self::RedirectionProblem => "RedirectionProblem",
            Self::Other => "Other",
        }
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single documentation warning
///
/// Ordering is by kind, then location, then message.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Warning {
    pub kind: WarningKind,
    /// Where the problem was found, usually `Type#signature`
    pub location: String,
    pub message: String,
}

impl Warning {
    pub fn new(kind: WarningKind, location: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            location: location.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} - {}: {}", self.kind, self.location, self.message)
    }
}

/// De-duplicating, ordered warning sink
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Warnings {
    items: BTreeSet<Warning>,
}

impl Warnings {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a warning. Returns false if an identical warning was already recorded.
    pub fn push(&mut self, warning: Warning) -> bool {
        self.items.insert(warning)
    }

    pub fn add(
        &mut self,
        kind: WarningKind,
        location: impl Into<String>,
        message: impl Into<String>,
    ) -> bool {
        self.push(Warning::new(kind, location, message))
    }

    pub fn append(&mut self, other: &mut Warnings) {
        self.items.append(&mut other.items);
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Warning> {
        self.items.iter()
    }

    pub fn count(&self, kind: WarningKind) -> usize {
        self.items.iter().filter(|w| w.kind == kind).count()
    }

    pub fn clear(&mut self) {
        self.items.clear();
    }

    pub fn into_vec(self) -> Vec<Warning> {
        self.items.into_iter().collect()
    }

    /// Render the report, one `KIND - location: message` line per warning
    pub fn report(&self) -> String {
        let mut out = String::new();
        for warning in &self.items {
            out.push_str(&warning.to_string());
            out.push('\n');
        }
        out
    }
}

impl Extend<Warning> for Warnings {
    fn extend<T: IntoIterator<Item = Warning>>(&mut self, iter: T) {
        self.items.extend(iter);
    }
}

impl FromIterator<Warning> for Warnings {
    fn from_iter<T: IntoIterator<Item = Warning>>(iter: T) -> Self {
        Self {
            items: iter.into_iter().collect(),
        }
    }
}

impl<'a> IntoIterator for &'a Warnings {
    type Item = &'a Warning;
    type IntoIter = std::collections::btree_set::Iter<'a, Warning>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}
