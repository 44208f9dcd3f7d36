//! Provenance traces attached to every type
//!
//! A `Reason` records why a type has its current form so diagnostics can
//! point back at the source. The type core carries reasons around but never
//! branches on them, and they take no part in type equality.

use crate::pos::Pos;

/// Why a type has the shape it has
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Reason {
    /// No provenance recorded
    #[default]
    None,
    /// Witnessed by an expression at this position
    Witness(Pos),
    /// Written as a type hint at this position
    Hint(Pos),
    /// Produced by substituting the named generic: (use site, generic, declaration)
    Instantiate(Box<Reason>, String, Box<Reason>),
    /// Produced by unfolding the named typedef at this position
    ExpandTypedef(Pos, String),
}

impl Reason {
    /// Witnessed by an expression at `pos`
    pub fn witness(pos: Pos) -> Self {
        Reason::Witness(pos)
    }

    /// Written as a hint at `pos`
    pub fn hint(pos: Pos) -> Self {
        Reason::Hint(pos)
    }

    /// Produced by substituting `generic`
    pub fn instantiate(use_site: Reason, generic: impl Into<String>, decl: Reason) -> Self {
        Reason::Instantiate(Box::new(use_site), generic.into(), Box::new(decl))
    }

    /// Best source position for this reason
    pub fn pos(&self) -> Pos {
        match self {
            Reason::None => Pos::none(),
            Reason::Witness(p) | Reason::Hint(p) | Reason::ExpandTypedef(p, _) => p.clone(),
            // The use site is what diagnostics want to underline.
            Reason::Instantiate(use_site, _, _) => use_site.pos(),
        }
    }

    /// Whether no provenance is recorded
    pub fn is_none(&self) -> bool {
        matches!(self, Reason::None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instantiate_pos_is_use_site() {
        let use_site = Reason::witness(Pos::new("a.php", 3, 5, 1, 4));
        let decl = Reason::hint(Pos::new("b.php", 0, 1, 9, 1));
        let r = Reason::instantiate(use_site, "T", decl);
        assert_eq!(r.pos().file, "a.php");
    }

    #[test]
    fn test_none_has_no_pos() {
        assert!(Reason::None.pos().is_none());
        assert!(Reason::default().is_none());
    }
}
