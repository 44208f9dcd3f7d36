//! Typedef declarations

use crate::fun::Tparam;
use crate::pos::Pos;
use crate::ty::{Decl, Ty};

/// Whether a typedef's body is visible to users
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypedefVisibility {
    /// `type`: unfolds to its body everywhere
    Transparent,
    /// `newtype`: abstract, known only through its constraint, outside the
    /// file it is declared in. Inside that file it unfolds like an alias.
    Opaque,
}

/// A declared `type` or `newtype`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypedefType {
    /// Declaration site
    pub pos: Pos,
    /// Whether the body is visible
    pub visibility: TypedefVisibility,
    /// Type parameters
    pub tparams: Vec<Tparam<Decl>>,
    /// `as` constraint of a newtype
    pub constraint: Option<Ty<Decl>>,
    /// The aliased type
    pub ty: Ty<Decl>,
}

impl TypedefType {
    /// A `type` alias
    pub fn transparent(pos: Pos, ty: Ty<Decl>) -> Self {
        Self {
            pos,
            visibility: TypedefVisibility::Transparent,
            tparams: Vec::new(),
            constraint: None,
            ty,
        }
    }

    /// A `newtype` with an optional `as` constraint
    pub fn opaque(pos: Pos, ty: Ty<Decl>, constraint: Option<Ty<Decl>>) -> Self {
        Self {
            pos,
            visibility: TypedefVisibility::Opaque,
            tparams: Vec::new(),
            constraint,
            ty,
        }
    }

    /// Same typedef with type parameters
    pub fn with_tparams(mut self, tparams: Vec<Tparam<Decl>>) -> Self {
        self.tparams = tparams;
        self
    }

    /// Whether this is a `newtype`
    pub fn is_opaque(&self) -> bool {
        self.visibility == TypedefVisibility::Opaque
    }
}
