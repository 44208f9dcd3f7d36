//! Gradus Type Model
//!
//! Type representation and expansion environment for a gradual type checker.
//! Declared types (`Ty<Decl>`) come from annotations; local types
//! (`Ty<Locl>`) are what inference works with. The phase parameter keeps
//! phase-specific shapes out of the wrong phase at compile time.

#![warn(missing_docs)]

pub mod class;
pub mod error;
pub mod expand;
pub mod fun;
pub mod localize;
pub mod pos;
pub mod reason;
pub mod session;
pub mod ty;
pub mod typedef;
pub mod unresolved;

pub use class::{ClassElt, ClassKind, ClassType, MemberKind, MemberLookup, MemberMap, Visibility};
pub use error::TypeError;
pub use expand::{make_substs, Ety, ExpandEnv, Substs};
pub use fun::{FunArity, FunParam, FunType, Tparam, Variance};
pub use localize::{DeclProvider, Localizer};
pub use pos::{Id, Ident, Pos};
pub use reason::Reason;
pub use session::{InferenceMode, MethodCall, TypingSession};
pub use ty::{
    AbstractType, ArrayKind, ConstraintKind, Decl, DeclKind, DeclTy, Locl, LoclKind, LoclTy, Phase,
    Prim, ShapeFieldName, ShapeMap, TaccessType, Ty, TyKind, Unresolved,
};
pub use typedef::{TypedefType, TypedefVisibility};
pub use unresolved::{UnresolvedArena, UnresolvedId};
