//! Core type definitions for the Gradus type system
//!
//! Types exist in two phases. Declared types (`Ty<Decl>`) are what the
//! programmer wrote; local types (`Ty<Locl>`) are what inference works with.
//! Most shapes are shared by both phases. The few that belong to only one
//! phase sit behind the phase's associated type, which is uninhabited in the
//! other phase, so building e.g. a type variable in a declared type does not
//! type-check.

use crate::error::TypeError;
use crate::fun::{FunArity, FunType};
use crate::pos::{Id, Ident};
use crate::reason::Reason;
use std::collections::BTreeMap;
use std::convert::Infallible;
use std::fmt;
use std::hash::Hash;

mod sealed {
    pub trait Sealed {}

    impl Sealed for super::Decl {}
    impl Sealed for super::Locl {}
}

/// A type phase. Implemented only by [`Decl`] and [`Locl`].
///
/// Phase-specific shapes build only in their own phase:
///
/// ```
/// use gradus_types::{Decl, DeclKind, Ident, Locl, LoclKind, Reason, Ty, TyKind};
///
/// let _this: Ty<Decl> = Ty::this(Reason::None);
/// let _var: Ty<Locl> = Ty::var(Reason::None, Ident::new(1));
/// let _decl: TyKind<Decl> = TyKind::Decl(DeclKind::This);
/// let _locl: TyKind<Locl> = TyKind::Locl(LoclKind::Object);
/// ```
///
/// A declared type cannot hold an inference variable:
///
/// ```compile_fail
/// use gradus_types::{Decl, Ident, Reason, Ty};
///
/// let _var = Ty::<Decl>::var(Reason::None, Ident::new(1));
/// ```
///
/// A local type cannot hold a declared-only shape:
///
/// ```compile_fail
/// use gradus_types::{DeclKind, Locl, TyKind};
///
/// let _this: TyKind<Locl> = TyKind::Decl(DeclKind::This);
/// ```
///
/// ```compile_fail
/// use gradus_types::{Locl, Reason, Ty};
///
/// let _this = Ty::<Locl>::this(Reason::None);
/// ```
pub trait Phase: sealed::Sealed + Copy + fmt::Debug + PartialEq + Eq + Hash + 'static {
    /// Payload of declared-only shapes; uninhabited for the local phase
    type DeclOnly: Clone + fmt::Debug + PartialEq + Eq + 'static;
    /// Payload of local-only shapes; uninhabited for the declared phase
    type LoclOnly: Clone + fmt::Debug + PartialEq + Eq + 'static;
    /// Phase name, for logs
    const NAME: &'static str;

    /// View a declared-only payload as the [`DeclKind`] it must be
    fn decl_kind(payload: &Self::DeclOnly) -> &DeclKind;

    /// View a local-only payload as the [`LoclKind`] it must be
    fn locl_kind(payload: &Self::LoclOnly) -> &LoclKind;
}

/// Marker for types as written in source
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Decl {}

/// Marker for types as refined during inference
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Locl {}

impl Phase for Decl {
    type DeclOnly = DeclKind;
    type LoclOnly = Infallible;
    const NAME: &'static str = "decl";

    fn decl_kind(payload: &DeclKind) -> &DeclKind {
        payload
    }

    fn locl_kind(payload: &Infallible) -> &LoclKind {
        match *payload {}
    }
}

impl Phase for Locl {
    type DeclOnly = Infallible;
    type LoclOnly = LoclKind;
    const NAME: &'static str = "locl";

    fn decl_kind(payload: &Infallible) -> &DeclKind {
        match *payload {}
    }

    fn locl_kind(payload: &LoclKind) -> &LoclKind {
        payload
    }
}

/// Shorthand for declared types
pub type DeclTy = Ty<Decl>;

/// Shorthand for local types
pub type LoclTy = Ty<Locl>;

/// Primitive types, as tagged by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Prim {
    /// `void`
    Void,
    /// `int`
    Int,
    /// `bool`
    Bool,
    /// `float`
    Float,
    /// `string`
    String,
    /// `resource`
    Resource,
    /// `num` (int or float)
    Num,
    /// `arraykey` (int or string)
    Arraykey,
    /// `noreturn`
    Noreturn,
}

impl fmt::Display for Prim {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Prim::Void => "void",
            Prim::Int => "int",
            Prim::Bool => "bool",
            Prim::Float => "float",
            Prim::String => "string",
            Prim::Resource => "resource",
            Prim::Num => "num",
            Prim::Arraykey => "arraykey",
            Prim::Noreturn => "noreturn",
        };
        write!(f, "{}", name)
    }
}

/// Direction of a generic's bound
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    /// `T as U`: `T` is a subtype of `U`
    As,
    /// `T super U`: `U` is a subtype of `T`
    Super,
}

/// A type: its provenance plus its shape
///
/// Equality compares shapes only. Two types that differ only in their
/// reasons are equal.
#[derive(Debug, Clone)]
pub struct Ty<P: Phase> {
    /// Why the type has this shape
    pub reason: Reason,
    /// The shape
    pub kind: Box<TyKind<P>>,
}

impl<P: Phase> PartialEq for Ty<P> {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind
    }
}

impl<P: Phase> Eq for Ty<P> {}

/// Type shapes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TyKind<P: Phase> {
    /// Unchecked: both sub- and supertype of everything
    Any,

    /// Top type; must be narrowed before use
    Mixed,

    /// PHP-style array
    Array(ArrayKind<P>),

    /// Named type parameter with an optional bound
    Generic(String, Option<(ConstraintKind, Ty<P>)>),

    /// Nullable wrapper: `?T`
    Optional(Ty<P>),

    /// Primitive type
    Prim(Prim),

    /// Function type
    Fun(FunType<P>),

    /// Fixed-length tuple
    Tuple(Vec<Ty<P>>),

    /// Type constant projection: `T::A::B`
    Access(TaccessType<P>),

    /// Shape with named fields
    Shape(ShapeMap<P>),

    /// Declared-only shapes
    Decl(P::DeclOnly),

    /// Local-only shapes
    Locl(P::LoclOnly),
}

/// Shapes that only exist in declared types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeclKind {
    /// Late static bound `this`
    This,
    /// A class, interface or typedef named in source, not yet resolved
    Apply(Id, Vec<Ty<Decl>>),
}

/// Shapes that only exist in local types
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoclKind {
    /// Inference variable
    Var(Ident),
    /// Opaque newtype, seen from outside its definition
    Abstract(AbstractType),
    /// Anonymous function whose body typing is stored out of band under the handle
    Anon(FunArity<Locl>, Ident),
    /// Candidate types awaiting a common supertype
    Unresolved(Unresolved),
    /// Some object, class unknown
    Object,
    /// A resolved class or interface
    Class(Id, Vec<Ty<Locl>>),
}

/// Array shapes
///
/// The surface form is a pair of optional types; a lone first component is
/// the value type of a keyless array. A value type without a key type does not
/// exist, so it has no variant here.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ArrayKind<P: Phase> {
    /// `array`, element types unknown
    Any,
    /// `array<T>`, keyless with values of `T`
    Vec(Ty<P>),
    /// `array<K, V>`
    Map(Ty<P>, Ty<P>),
}

impl<P: Phase> ArrayKind<P> {
    /// Build from the surface `(key, value)` pair, rejecting `(None, Some(_))`
    pub fn from_parts(key: Option<Ty<P>>, value: Option<Ty<P>>) -> Result<Self, TypeError> {
        match (key, value) {
            (None, None) => Ok(ArrayKind::Any),
            (Some(ty), None) => Ok(ArrayKind::Vec(ty)),
            (Some(k), Some(v)) => Ok(ArrayKind::Map(k, v)),
            (None, Some(_)) => Err(TypeError::InvalidArrayShape),
        }
    }

    /// Back to the surface pair
    pub fn parts(&self) -> (Option<&Ty<P>>, Option<&Ty<P>>) {
        match self {
            ArrayKind::Any => (None, None),
            ArrayKind::Vec(ty) => (Some(ty), None),
            ArrayKind::Map(k, v) => (Some(k), Some(v)),
        }
    }

    /// Rebuild over mapped element types
    pub fn try_map<Q: Phase, E>(
        &self,
        mut f: impl FnMut(&Ty<P>) -> Result<Ty<Q>, E>,
    ) -> Result<ArrayKind<Q>, E> {
        Ok(match self {
            ArrayKind::Any => ArrayKind::Any,
            ArrayKind::Vec(ty) => ArrayKind::Vec(f(ty)?),
            ArrayKind::Map(k, v) => ArrayKind::Map(f(k)?, f(v)?),
        })
    }
}

/// Type constant projection: a root and a non-empty chain of constant names
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaccessType<P: Phase> {
    root: Ty<P>,
    ids: Vec<Id>,
}

impl<P: Phase> TaccessType<P> {
    /// A projection of `ids` from `root`; the chain must be non-empty
    pub fn new(root: Ty<P>, ids: Vec<Id>) -> Result<Self, TypeError> {
        if ids.is_empty() {
            return Err(TypeError::EmptyAccessChain {
                root: format!("{:?}", root.kind),
            });
        }
        Ok(Self { root, ids })
    }

    /// The projected type
    pub fn root(&self) -> &Ty<P> {
        &self.root
    }

    /// Constant names, outermost first
    pub fn ids(&self) -> &[Id] {
        &self.ids
    }

    /// Rebuild over a new root, keeping the chain
    pub fn try_map_root<Q: Phase, E>(
        &self,
        f: impl FnOnce(&Ty<P>) -> Result<Ty<Q>, E>,
    ) -> Result<TaccessType<Q>, E> {
        Ok(TaccessType {
            root: f(&self.root)?,
            ids: self.ids.clone(),
        })
    }
}

/// Key of a shape field
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ShapeFieldName {
    /// String literal key
    Lit(String),
    /// Class constant key: `C::NAME`
    ClassConst(String, String),
}

impl ShapeFieldName {
    /// A string literal key
    pub fn lit(name: impl Into<String>) -> Self {
        ShapeFieldName::Lit(name.into())
    }
}

impl fmt::Display for ShapeFieldName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeFieldName::Lit(s) => write!(f, "'{}'", s),
            ShapeFieldName::ClassConst(class, name) => write!(f, "{}::{}", class, name),
        }
    }
}

/// Fields of a shape, unique by key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeMap<P: Phase> {
    fields: BTreeMap<ShapeFieldName, Ty<P>>,
}

impl<P: Phase> ShapeMap<P> {
    /// Build from a field list; a repeated key is an error
    pub fn new(fields: impl IntoIterator<Item = (ShapeFieldName, Ty<P>)>) -> Result<Self, TypeError> {
        let mut map = BTreeMap::new();
        for (name, ty) in fields {
            if map.contains_key(&name) {
                return Err(TypeError::DuplicateShapeField {
                    field: name.to_string(),
                });
            }
            map.insert(name, ty);
        }
        Ok(Self { fields: map })
    }

    /// Field type under `name`
    pub fn get(&self, name: &ShapeFieldName) -> Option<&Ty<P>> {
        self.fields.get(name)
    }

    /// Fields in key order
    pub fn iter(&self) -> impl Iterator<Item = (&ShapeFieldName, &Ty<P>)> {
        self.fields.iter()
    }

    /// Number of fields
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Whether the shape has no fields
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Rebuild over mapped field types
    pub fn try_map<Q: Phase, E>(
        &self,
        mut f: impl FnMut(&Ty<P>) -> Result<Ty<Q>, E>,
    ) -> Result<ShapeMap<Q>, E> {
        let mut fields = BTreeMap::new();
        for (name, ty) in &self.fields {
            fields.insert(name.clone(), f(ty)?);
        }
        Ok(ShapeMap { fields })
    }
}

/// An opaque newtype seen from outside its defining file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AbstractType {
    /// Newtype name
    pub name: Id,
    /// Its type arguments
    pub args: Vec<Ty<Locl>>,
    /// Type it is known to be a subtype of, if declared
    pub constraint: Option<Ty<Locl>>,
}

/// Finalized candidate list of an unresolved type
///
/// The list is a set of candidates kept in first-seen order. Structural
/// duplicates are dropped on construction; a duplicate would not change the
/// meaning, only the order in which inference visits candidates.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Unresolved {
    candidates: Vec<Ty<Locl>>,
}

impl Unresolved {
    /// Deduplicated candidates, first occurrence kept
    pub fn new(candidates: impl IntoIterator<Item = Ty<Locl>>) -> Self {
        let mut list = Vec::new();
        for ty in candidates {
            push_candidate(&mut list, ty);
        }
        Self { candidates: list }
    }

    /// A copy with one more candidate; unchanged if it is already present
    pub fn with(&self, ty: Ty<Locl>) -> Self {
        let mut candidates = self.candidates.clone();
        push_candidate(&mut candidates, ty);
        Self { candidates }
    }

    /// Candidates in the order they were added
    pub fn candidates(&self) -> &[Ty<Locl>] {
        &self.candidates
    }

    /// The collapsed choice, when exactly one candidate remains
    pub fn as_single(&self) -> Option<&Ty<Locl>> {
        match self.candidates.as_slice() {
            [only] => Some(only),
            _ => None,
        }
    }

    /// Number of candidates
    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    /// Whether there are no candidates
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }
}

/// Append unless structurally present. Returns whether it was appended.
pub(crate) fn push_candidate(list: &mut Vec<Ty<Locl>>, ty: Ty<Locl>) -> bool {
    if list.contains(&ty) {
        return false;
    }
    list.push(ty);
    true
}

impl<P: Phase> Ty<P> {
    /// Build a type from its parts
    pub fn new(reason: Reason, kind: TyKind<P>) -> Self {
        Ty {
            reason,
            kind: Box::new(kind),
        }
    }

    /// `Any`
    pub fn any(reason: Reason) -> Self {
        Self::new(reason, TyKind::Any)
    }

    /// `mixed`
    pub fn mixed(reason: Reason) -> Self {
        Self::new(reason, TyKind::Mixed)
    }

    /// A primitive
    pub fn prim(reason: Reason, prim: Prim) -> Self {
        Self::new(reason, TyKind::Prim(prim))
    }

    /// `?inner`
    pub fn optional(reason: Reason, inner: Ty<P>) -> Self {
        Self::new(reason, TyKind::Optional(inner))
    }

    /// A tuple
    pub fn tuple(reason: Reason, elems: Vec<Ty<P>>) -> Self {
        Self::new(reason, TyKind::Tuple(elems))
    }

    /// A type parameter, optionally bounded
    pub fn generic(
        reason: Reason,
        name: impl Into<String>,
        bound: Option<(ConstraintKind, Ty<P>)>,
    ) -> Self {
        Self::new(reason, TyKind::Generic(name.into(), bound))
    }

    /// Array from the surface `(key, value)` pair. `(None, Some(_))` is rejected.
    pub fn array(reason: Reason, key: Option<Ty<P>>, value: Option<Ty<P>>) -> Result<Self, TypeError> {
        Ok(Self::new(reason, TyKind::Array(ArrayKind::from_parts(key, value)?)))
    }

    /// A function type
    pub fn fun(reason: Reason, ft: FunType<P>) -> Self {
        Self::new(reason, TyKind::Fun(ft))
    }

    /// `root::A::B`; the chain must be non-empty
    pub fn access(reason: Reason, root: Ty<P>, ids: Vec<Id>) -> Result<Self, TypeError> {
        Ok(Self::new(reason, TyKind::Access(TaccessType::new(root, ids)?)))
    }

    /// A shape; duplicate fields are rejected
    pub fn shape(
        reason: Reason,
        fields: impl IntoIterator<Item = (ShapeFieldName, Ty<P>)>,
    ) -> Result<Self, TypeError> {
        Ok(Self::new(reason, TyKind::Shape(ShapeMap::new(fields)?)))
    }

    /// Provenance
    pub fn reason(&self) -> &Reason {
        &self.reason
    }

    /// Shape
    pub fn kind(&self) -> &TyKind<P> {
        &self.kind
    }

    /// Shape, dropping the reason
    pub fn into_kind(self) -> TyKind<P> {
        *self.kind
    }

    /// Same shape, different provenance
    pub fn with_reason(self, reason: Reason) -> Self {
        Ty { reason, ..self }
    }

    /// Whether this is `Any`
    pub fn is_any(&self) -> bool {
        matches!(*self.kind, TyKind::Any)
    }

    /// Whether this is `mixed`
    pub fn is_mixed(&self) -> bool {
        matches!(*self.kind, TyKind::Mixed)
    }

    /// Whether this is `?T`
    pub fn is_option(&self) -> bool {
        matches!(*self.kind, TyKind::Optional(_))
    }

    /// The primitive, if it is one
    pub fn as_prim(&self) -> Option<Prim> {
        match &*self.kind {
            TyKind::Prim(p) => Some(*p),
            _ => None,
        }
    }

    /// The function type, if it is one
    pub fn as_fun(&self) -> Option<&FunType<P>> {
        match &*self.kind {
            TyKind::Fun(ft) => Some(ft),
            _ => None,
        }
    }

    /// The shape fields, if it is a shape
    pub fn as_shape(&self) -> Option<&ShapeMap<P>> {
        match &*self.kind {
            TyKind::Shape(m) => Some(m),
            _ => None,
        }
    }

    /// Structural equality with the phase tag erased
    ///
    /// Shared shapes compare by content whatever their phases. Phase-restricted
    /// shapes can only be equal to the same shape in the same phase.
    pub fn eq_erased<Q: Phase>(&self, other: &Ty<Q>) -> bool {
        self.kind.eq_erased(&other.kind)
    }
}

impl<P: Phase> TyKind<P> {
    /// Structural equality with the phase tag erased
    pub fn eq_erased<Q: Phase>(&self, other: &TyKind<Q>) -> bool {
        match (self, other) {
            (TyKind::Any, TyKind::Any) | (TyKind::Mixed, TyKind::Mixed) => true,
            (TyKind::Prim(a), TyKind::Prim(b)) => a == b,
            (TyKind::Optional(a), TyKind::Optional(b)) => a.eq_erased(b),
            (TyKind::Tuple(a), TyKind::Tuple(b)) => all_eq_erased(a, b),
            (TyKind::Generic(n1, b1), TyKind::Generic(n2, b2)) => {
                n1 == n2 && bound_eq_erased(b1.as_ref(), b2.as_ref())
            }
            (TyKind::Array(a), TyKind::Array(b)) => match (a, b) {
                (ArrayKind::Any, ArrayKind::Any) => true,
                (ArrayKind::Vec(a), ArrayKind::Vec(b)) => a.eq_erased(b),
                (ArrayKind::Map(k1, v1), ArrayKind::Map(k2, v2)) => {
                    k1.eq_erased(k2) && v1.eq_erased(v2)
                }
                _ => false,
            },
            (TyKind::Fun(a), TyKind::Fun(b)) => a.eq_erased(b),
            (TyKind::Access(a), TyKind::Access(b)) => {
                a.ids == b.ids && a.root.eq_erased(&b.root)
            }
            (TyKind::Shape(a), TyKind::Shape(b)) => {
                a.len() == b.len()
                    && a.iter()
                        .zip(b.iter())
                        .all(|((n1, t1), (n2, t2))| n1 == n2 && t1.eq_erased(t2))
            }
            (TyKind::Decl(a), TyKind::Decl(b)) => P::decl_kind(a) == Q::decl_kind(b),
            (TyKind::Locl(a), TyKind::Locl(b)) => P::locl_kind(a) == Q::locl_kind(b),
            _ => false,
        }
    }

    /// Direct children of a shared shape. Phase-restricted shapes report none.
    pub fn shared_children(&self) -> Vec<&Ty<P>> {
        match self {
            TyKind::Any | TyKind::Mixed | TyKind::Prim(_) => vec![],
            TyKind::Decl(_) | TyKind::Locl(_) => vec![],
            TyKind::Array(a) => match a {
                ArrayKind::Any => vec![],
                ArrayKind::Vec(ty) => vec![ty],
                ArrayKind::Map(k, v) => vec![k, v],
            },
            TyKind::Generic(_, bound) => bound.iter().map(|(_, ty)| ty).collect(),
            TyKind::Optional(ty) => vec![ty],
            TyKind::Tuple(elems) => elems.iter().collect(),
            TyKind::Fun(ft) => ft.children(),
            TyKind::Access(ta) => vec![ta.root()],
            TyKind::Shape(m) => m.iter().map(|(_, ty)| ty).collect(),
        }
    }
}

pub(crate) fn all_eq_erased<P: Phase, Q: Phase>(a: &[Ty<P>], b: &[Ty<Q>]) -> bool {
    a.len() == b.len() && a.iter().zip(b).all(|(x, y)| x.eq_erased(y))
}

pub(crate) fn bound_eq_erased<P: Phase, Q: Phase>(
    a: Option<&(ConstraintKind, Ty<P>)>,
    b: Option<&(ConstraintKind, Ty<Q>)>,
) -> bool {
    match (a, b) {
        (None, None) => true,
        (Some((k1, t1)), Some((k2, t2))) => k1 == k2 && t1.eq_erased(t2),
        _ => false,
    }
}

impl Ty<Decl> {
    /// Late static bound `this`
    pub fn this(reason: Reason) -> Self {
        Self::new(reason, TyKind::Decl(DeclKind::This))
    }

    /// A name written in source, unresolved
    pub fn apply(reason: Reason, name: Id, args: Vec<Ty<Decl>>) -> Self {
        Self::new(reason, TyKind::Decl(DeclKind::Apply(name, args)))
    }

    /// Whether this is `this`
    pub fn is_this(&self) -> bool {
        matches!(*self.kind, TyKind::Decl(DeclKind::This))
    }
}

impl Ty<Locl> {
    /// An inference variable
    pub fn var(reason: Reason, var: Ident) -> Self {
        Self::new(reason, TyKind::Locl(LoclKind::Var(var)))
    }

    /// An opaque newtype
    pub fn abstract_type(reason: Reason, abs: AbstractType) -> Self {
        Self::new(reason, TyKind::Locl(LoclKind::Abstract(abs)))
    }

    /// An anonymous function
    pub fn anon(reason: Reason, arity: FunArity<Locl>, handle: Ident) -> Self {
        Self::new(reason, TyKind::Locl(LoclKind::Anon(arity, handle)))
    }

    /// Candidates awaiting a common supertype
    pub fn unresolved(reason: Reason, candidates: impl IntoIterator<Item = Ty<Locl>>) -> Self {
        Self::new(reason, TyKind::Locl(LoclKind::Unresolved(Unresolved::new(candidates))))
    }

    /// Some object
    pub fn object(reason: Reason) -> Self {
        Self::new(reason, TyKind::Locl(LoclKind::Object))
    }

    /// A resolved class
    pub fn class(reason: Reason, name: Id, args: Vec<Ty<Locl>>) -> Self {
        Self::new(reason, TyKind::Locl(LoclKind::Class(name, args)))
    }

    /// The inference variable, if it is one
    pub fn as_var(&self) -> Option<Ident> {
        match &*self.kind {
            TyKind::Locl(LoclKind::Var(v)) => Some(*v),
            _ => None,
        }
    }

    /// The candidate list, if there is one
    pub fn as_unresolved(&self) -> Option<&Unresolved> {
        match &*self.kind {
            TyKind::Locl(LoclKind::Unresolved(u)) => Some(u),
            _ => None,
        }
    }

    /// Whether any node satisfies `pred`, searching depth-first
    pub fn any_node(&self, pred: &mut impl FnMut(&Ty<Locl>) -> bool) -> bool {
        if pred(self) {
            return true;
        }
        match &*self.kind {
            TyKind::Decl(never) => match *never {},
            TyKind::Locl(l) => l.children().into_iter().any(|ty| ty.any_node(pred)),
            shared => shared
                .shared_children()
                .into_iter()
                .any(|ty| ty.any_node(pred)),
        }
    }

    /// Occurs check: does the variable appear anywhere in this type
    pub fn occurs(&self, var: Ident) -> bool {
        self.any_node(&mut |ty| ty.as_var() == Some(var))
    }

    /// Whether some unresolved candidate list still appears in this type
    pub fn has_unresolved(&self) -> bool {
        self.any_node(&mut |ty| ty.as_unresolved().is_some())
    }
}

impl LoclKind {
    /// Direct children
    pub fn children(&self) -> Vec<&Ty<Locl>> {
        match self {
            LoclKind::Var(_) | LoclKind::Object => vec![],
            LoclKind::Abstract(abs) => abs.args.iter().chain(abs.constraint.iter()).collect(),
            LoclKind::Anon(arity, _) => arity.variadic_param().map(|p| &p.ty).into_iter().collect(),
            LoclKind::Unresolved(u) => u.candidates().iter().collect(),
            LoclKind::Class(_, args) => args.iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pos::Pos;

    fn int<P: Phase>() -> Ty<P> {
        Ty::prim(Reason::None, Prim::Int)
    }

    fn string<P: Phase>() -> Ty<P> {
        Ty::prim(Reason::None, Prim::String)
    }

    #[test]
    fn test_prim_display() {
        assert_eq!(format!("{}", Prim::Int), "int");
        assert_eq!(format!("{}", Prim::Arraykey), "arraykey");
        assert_eq!(format!("{}", Prim::Noreturn), "noreturn");
    }

    #[test]
    fn test_equality_ignores_reason() {
        let a: Ty<Locl> = Ty::prim(Reason::witness(Pos::new("a.php", 0, 1, 1, 1)), Prim::Int);
        let b: Ty<Locl> = Ty::prim(Reason::hint(Pos::new("b.php", 5, 9, 2, 2)), Prim::Int);
        assert_eq!(a, b);
        assert_ne!(a, string());
    }

    #[test]
    fn test_array_shapes() {
        let bare = Ty::<Decl>::array(Reason::None, None, None).unwrap();
        assert!(matches!(bare.kind(), TyKind::Array(ArrayKind::Any)));

        let vec = Ty::<Decl>::array(Reason::None, Some(int()), None).unwrap();
        assert!(matches!(vec.kind(), TyKind::Array(ArrayKind::Vec(_))));

        let map = Ty::<Decl>::array(Reason::None, Some(string()), Some(int())).unwrap();
        match map.kind() {
            TyKind::Array(a) => {
                let (k, v) = a.parts();
                assert_eq!(k, Some(&string()));
                assert_eq!(v, Some(&int()));
            }
            other => panic!("expected array, got {:?}", other),
        }
    }

    #[test]
    fn test_array_value_without_key_rejected() {
        let result = Ty::<Locl>::array(Reason::None, None, Some(int()));
        assert_eq!(result.unwrap_err(), TypeError::InvalidArrayShape);
    }

    #[test]
    fn test_access_requires_names() {
        let root: Ty<Decl> = Ty::this(Reason::None);
        let err = Ty::access(Reason::None, root.clone(), vec![]).unwrap_err();
        assert!(matches!(err, TypeError::EmptyAccessChain { .. }));

        let ok = Ty::access(
            Reason::None,
            root,
            vec![Id::unpositioned("TypeA"), Id::unpositioned("TypeB")],
        )
        .unwrap();
        match ok.kind() {
            TyKind::Access(ta) => {
                let names: Vec<&str> = ta.ids().iter().map(Id::name).collect();
                assert_eq!(names, vec!["TypeA", "TypeB"]);
                assert!(ta.root().is_this());
            }
            other => panic!("expected access, got {:?}", other),
        }
    }

    #[test]
    fn test_shape_duplicate_field_rejected() {
        let err = Ty::<Decl>::shape(
            Reason::None,
            vec![
                (ShapeFieldName::lit("a"), int()),
                (ShapeFieldName::lit("a"), string()),
            ],
        )
        .unwrap_err();
        assert_eq!(
            err,
            TypeError::DuplicateShapeField {
                field: "'a'".to_string()
            }
        );
    }

    #[test]
    fn test_shape_class_const_key() {
        let key = ShapeFieldName::ClassConst("C".into(), "KEY".into());
        let shape = Ty::<Locl>::shape(Reason::None, vec![(key.clone(), int())]).unwrap();
        assert_eq!(shape.as_shape().unwrap().get(&key), Some(&int()));
        assert_eq!(key.to_string(), "C::KEY");
    }

    #[test]
    fn test_eq_erased_shared_shapes() {
        let d: Ty<Decl> = Ty::optional(Reason::None, Ty::tuple(Reason::None, vec![int(), string()]));
        let l: Ty<Locl> = Ty::optional(Reason::None, Ty::tuple(Reason::None, vec![int(), string()]));
        assert!(d.eq_erased(&l));
        assert!(l.eq_erased(&d));

        let other: Ty<Locl> = Ty::optional(Reason::None, int());
        assert!(!d.eq_erased(&other));
    }

    #[test]
    fn test_eq_erased_restricted_shapes() {
        let this_a: Ty<Decl> = Ty::this(Reason::None);
        let this_b: Ty<Decl> = Ty::this(Reason::None);
        let obj: Ty<Locl> = Ty::object(Reason::None);
        assert!(this_a.eq_erased(&this_b));
        assert!(!this_a.eq_erased(&obj));
        assert!(obj.eq_erased(&Ty::<Locl>::object(Reason::None)));
    }

    #[test]
    fn test_eq_erased_restricted_payloads() {
        let apply = |name: &str| -> Ty<Decl> { Ty::apply(Reason::None, Id::unpositioned(name), vec![int()]) };
        assert!(apply("C").eq_erased(&apply("C")));
        assert!(!apply("C").eq_erased(&apply("D")));
        assert!(!apply("C").eq_erased(&Ty::<Decl>::this(Reason::None)));

        let var = |n: u32| -> Ty<Locl> { Ty::var(Reason::None, Ident::new(n)) };
        assert!(var(1).eq_erased(&var(1)));
        assert!(!var(1).eq_erased(&var(2)));

        // A declared-only shape never matches a local-only one.
        let class: Ty<Locl> = Ty::class(Reason::None, Id::unpositioned("C"), vec![int()]);
        assert!(!apply("C").eq_erased(&class));
        assert!(!class.eq_erased(&apply("C")));
    }

    #[test]
    fn test_unresolved_dedups_in_order() {
        let u = Unresolved::new(vec![int(), string(), int()]);
        assert_eq!(u.candidates(), &[int::<Locl>(), string::<Locl>()]);
        assert!(u.as_single().is_none());

        let single = Unresolved::new(vec![int()]);
        assert_eq!(single.as_single(), Some(&int()));
        assert_eq!(single.with(int()), single);
    }

    #[test]
    fn test_occurs_check() {
        let v = Ident::new(7);
        let nested: Ty<Locl> = Ty::class(
            Reason::None,
            Id::unpositioned("Box"),
            vec![Ty::optional(Reason::None, Ty::var(Reason::None, v))],
        );
        assert!(nested.occurs(v));
        assert!(!nested.occurs(Ident::new(8)));
        assert!(!nested.has_unresolved());

        let with_candidates = Ty::tuple(
            Reason::None,
            vec![Ty::unresolved(Reason::None, vec![int(), Ty::var(Reason::None, v)])],
        );
        assert!(with_candidates.has_unresolved());
        assert!(with_candidates.occurs(v));
    }
}
