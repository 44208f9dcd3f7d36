//! Type system errors

use crate::pos::Pos;
use thiserror::Error;

/// Errors produced while building or expanding types
#[derive(Debug, Clone, Error, PartialEq)]
pub enum TypeError {
    /// An array type with a value type but no key type
    #[error("Invalid array type: a value type requires a key type")]
    InvalidArrayShape,

    /// A type constant projection with no constant names
    #[error("Type constant access on {root} names no constants")]
    EmptyAccessChain {
        /// Root of the projection
        root: String,
    },

    /// A shape with the same field written twice
    #[error("Duplicate shape field: {field}")]
    DuplicateShapeField {
        /// Field that was repeated
        field: String,
    },

    /// Typedef expansion reached a typedef already being expanded
    #[error("Cyclic typedef expansion of {name} at {pos}")]
    CyclicTypedef {
        /// Typedef that closed the cycle
        name: String,
        /// Position where it was reached again
        pos: Pos,
        /// The expansion trace, ending with the repeated typedef
        cycle: Vec<(Pos, String)>,
    },

    /// Ancestors to re-check on concretion that are not ancestors at all
    #[error("Class {class} checks {missing:?} when concrete but does not inherit them")]
    IncoherentAncestors {
        /// Class being validated
        class: String,
        /// Names absent from the ancestor map
        missing: Vec<String>,
    },
}

impl TypeError {
    /// Names along a cycle, in expansion order
    pub fn cycle_names(&self) -> Option<Vec<&str>> {
        match self {
            TypeError::CyclicTypedef { cycle, .. } => {
                Some(cycle.iter().map(|(_, name)| name.as_str()).collect())
            }
            _ => None,
        }
    }
}
