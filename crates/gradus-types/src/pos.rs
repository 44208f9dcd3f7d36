//! Source positions and identifiers
//!
//! These values are produced by the parser layer and only carried here as
//! annotations. Nothing in the type core inspects them beyond equality.

use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// A span of source text within one file
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Pos {
    /// File the span belongs to (empty for synthesized positions)
    pub file: String,
    /// Start byte offset
    pub start: usize,
    /// End byte offset (exclusive)
    pub end: usize,
    /// 1-based line of `start`
    pub line: u32,
    /// 1-based column of `start`
    pub column: u32,
}

impl Pos {
    /// Create a new position
    pub fn new(file: impl Into<String>, start: usize, end: usize, line: u32, column: u32) -> Self {
        Self {
            file: file.into(),
            start,
            end,
            line,
            column,
        }
    }

    /// The placeholder position for values with no source location
    pub fn none() -> Self {
        Self {
            file: String::new(),
            start: 0,
            end: 0,
            line: 0,
            column: 0,
        }
    }

    /// Whether this is the placeholder position
    pub fn is_none(&self) -> bool {
        self.file.is_empty() && self.line == 0 && self.start == self.end
    }

    /// Length in bytes; zero for an inverted span
    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    /// Whether the span covers no text
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Smallest span covering both positions.
    ///
    /// Spans from different files do not merge; `self` is returned unchanged.
    pub fn merge(&self, other: &Pos) -> Pos {
        if self.file != other.file {
            return self.clone();
        }
        let (first, _) = if self.start <= other.start {
            (self, other)
        } else {
            (other, self)
        };
        Pos {
            file: self.file.clone(),
            start: self.start.min(other.start),
            end: self.end.max(other.end),
            line: first.line,
            column: first.column,
        }
    }
}

impl Default for Pos {
    fn default() -> Self {
        Self::none()
    }
}

impl fmt::Display for Pos {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_none() {
            return write!(f, "[no position]");
        }
        write!(f, "{}:{}:{}", self.file, self.line, self.column)
    }
}

/// A symbol name together with the position it was written at
///
/// Identifiers compare, hash and order by name alone; the position only
/// annotates where the name was written.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Id {
    /// Where the name appeared
    pub pos: Pos,
    /// The name itself
    pub name: String,
}

impl Id {
    /// Create an identifier written at `pos`
    pub fn new(pos: Pos, name: impl Into<String>) -> Self {
        Self {
            pos,
            name: name.into(),
        }
    }

    /// An identifier with no source position
    pub fn unpositioned(name: impl Into<String>) -> Self {
        Self::new(Pos::none(), name)
    }

    /// The name, without its position
    pub fn name(&self) -> &str {
        &self.name
    }
}

impl PartialEq for Id {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Id {}

impl Hash for Id {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.name.hash(state);
    }
}

impl PartialOrd for Id {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Id {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.cmp(&other.name)
    }
}

impl fmt::Display for Id {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name)
    }
}

/// Opaque unique handle for inference variables and anonymous functions
///
/// Handles are minted by the inference engine; the core only stores them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Ident(pub(crate) u32);

impl Ident {
    /// Wrap a raw handle
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// The raw handle
    pub const fn as_u32(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Ident {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}
