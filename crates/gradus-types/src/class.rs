//! Class and member metadata
//!
//! A [`ClassType`] is assembled by the class builder in two passes: one that
//! collects the class's own members, and one that folds in what it inherits
//! and decides `members_fully_known`. This module only defines the shapes and
//! the rules the builder relies on.

use crate::error::TypeError;
use crate::fun::Tparam;
use crate::pos::{Id, Pos};
use crate::ty::{Decl, Ty};
use rustc_hash::{FxHashMap, FxHashSet};
use tracing::trace;

/// Member visibility
///
/// The restricted variants carry the class that *defines* the member, so
/// access checks can compare against the accessing class.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Visibility {
    /// Visible everywhere
    Public,
    /// Visible only inside the owning class
    Private(String),
    /// Visible to the owning class and its descendants
    Protected(String),
}

impl Visibility {
    /// Defining class for restricted members
    pub fn owner(&self) -> Option<&str> {
        match self {
            Visibility::Public => None,
            Visibility::Private(owner) | Visibility::Protected(owner) => Some(owner),
        }
    }

    /// Whether the member is visible everywhere
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A constant, property or method of a class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassElt {
    /// Cannot be overridden
    pub is_final: bool,
    /// XHP attribute rather than a plain property
    pub is_xhp_attr: bool,
    /// Marked as overriding an inherited member
    pub is_override: bool,
    /// Generated mechanically rather than written by the user
    pub synthesized: bool,
    /// Access restriction
    pub visibility: Visibility,
    /// Declared type of the element
    pub ty: Ty<Decl>,
    /// Class the element was declared in
    pub origin: String,
}

impl ClassElt {
    /// An authored, public, non-final element
    pub fn new(ty: Ty<Decl>, origin: impl Into<String>) -> Self {
        Self {
            is_final: false,
            is_xhp_attr: false,
            is_override: false,
            synthesized: false,
            visibility: Visibility::Public,
            ty,
            origin: origin.into(),
        }
    }

    /// Same element with a different visibility
    pub fn with_visibility(mut self, visibility: Visibility) -> Self {
        self.visibility = visibility;
        self
    }

    /// Mark as generated rather than written
    pub fn synthesized(mut self) -> Self {
        self.synthesized = true;
        self
    }
}

/// Members of one kind, unique by name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemberMap {
    elts: FxHashMap<String, ClassElt>,
}

impl MemberMap {
    /// An empty map
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an element under `name`, resolving a clash with an existing one.
    ///
    /// Authored elements shadow synthesized ones whatever the order they
    /// arrive in. Between two elements of the same provenance the later one
    /// wins. Returns whether `elt` was stored.
    pub fn insert_elt(&mut self, name: impl Into<String>, elt: ClassElt) -> bool {
        let name = name.into();
        if let Some(existing) = self.elts.get(&name) {
            if !existing.synthesized && elt.synthesized {
                trace!(member = %name, origin = %elt.origin, "synthesized member shadowed by authored one");
                return false;
            }
        }
        self.elts.insert(name, elt);
        true
    }

    /// Element declared under `name`
    pub fn get(&self, name: &str) -> Option<&ClassElt> {
        self.elts.get(name)
    }

    /// Whether `name` is declared
    pub fn contains(&self, name: &str) -> bool {
        self.elts.contains_key(name)
    }

    /// Number of elements
    pub fn len(&self) -> usize {
        self.elts.len()
    }

    /// Whether the map is empty
    pub fn is_empty(&self) -> bool {
        self.elts.is_empty()
    }

    /// Elements in unspecified order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &ClassElt)> {
        self.elts.iter().map(|(name, elt)| (name.as_str(), elt))
    }
}

impl FromIterator<(String, ClassElt)> for MemberMap {
    fn from_iter<I: IntoIterator<Item = (String, ClassElt)>>(iter: I) -> Self {
        let mut map = MemberMap::new();
        for (name, elt) in iter {
            map.insert_elt(name, elt);
        }
        map
    }
}

/// A type constant declared in a class or interface
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeconstType {
    /// Constant name
    pub name: Id,
    /// `as` constraint, if any
    pub constraint: Option<Ty<Decl>>,
    /// Assigned type; `None` for abstract type constants
    pub ty: Option<Ty<Decl>>,
    /// Class the constant was declared in
    pub origin: String,
}

impl TypeconstType {
    /// Whether no concrete type is assigned
    pub fn is_abstract(&self) -> bool {
        self.ty.is_none()
    }
}

/// Backing type of an enum class
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumType {
    /// Underlying type of the enum's values
    pub base: Ty<Decl>,
    /// `as` constraint on the enum
    pub constraint: Option<Ty<Decl>>,
}

/// Class kind, as tagged by the parser
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ClassKind {
    /// `abstract class`
    Abstract,
    /// Concrete class
    Normal,
    /// `interface`
    Interface,
    /// `trait`
    Trait,
    /// `enum`
    Enum,
}

/// A user attribute on a class, passed through untouched
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserAttribute {
    /// Attribute name
    pub name: Id,
    /// Literal arguments as written
    pub args: Vec<String>,
}

/// Which member map to search
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind {
    /// Class constant
    Const,
    /// Instance property
    Prop,
    /// Static property
    StaticProp,
    /// Instance method
    Method,
    /// Static method
    StaticMethod,
}

/// Outcome of a member lookup
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberLookup<'a> {
    /// The member exists
    Found(&'a ClassElt),
    /// Members are fully known and this one is absent
    NotFound,
    /// Absent, but some ancestor could not be resolved so it may still exist
    Unknown,
}

impl<'a> MemberLookup<'a> {
    /// The element, if it was found
    pub fn found(self) -> Option<&'a ClassElt> {
        match self {
            MemberLookup::Found(elt) => Some(elt),
            _ => None,
        }
    }
}

/// Everything the checker knows about a class, interface, trait or enum
#[derive(Debug, Clone)]
pub struct ClassType {
    /// Has properties that the constructor must initialize
    pub need_init: bool,
    /// False when some ancestor is unresolved; member absence is then inconclusive
    pub members_fully_known: bool,
    /// Cannot be instantiated
    pub is_abstract: bool,
    /// Cannot be extended
    pub is_final: bool,
    /// Properties whose initialization may be deferred
    pub deferred_init_members: FxHashSet<String>,
    /// Class, interface, trait or enum
    pub kind: ClassKind,
    /// Fully qualified name
    pub name: String,
    /// Declaration site
    pub pos: Pos,
    /// Declared type parameters
    pub tparams: Vec<Tparam<Decl>>,
    /// Class constants
    pub consts: MemberMap,
    /// Type constants by name
    pub typeconsts: FxHashMap<String, TypeconstType>,
    /// Instance properties
    pub props: MemberMap,
    /// Static properties
    pub sprops: MemberMap,
    /// Instance methods
    pub methods: MemberMap,
    /// Static methods
    pub smethods: MemberMap,
    /// Constructor, and whether its arguments are checked strictly
    pub construct: (Option<ClassElt>, bool),
    /// Classes, interfaces and traits used, with their instantiation
    pub ancestors: FxHashMap<String, Ty<Decl>>,
    /// Ancestors to re-check once the class becomes concrete
    pub ancestors_checked_when_concrete: FxHashMap<String, Ty<Decl>>,
    /// `require extends` / `require implements` targets
    pub req_ancestors: FxHashMap<String, Ty<Decl>>,
    /// Classes the requirement set itself extends
    pub req_ancestors_extends: FxHashSet<String>,
    /// Flattened extends-closure
    pub extends: FxHashSet<String>,
    /// Attributes on the declaration
    pub user_attributes: Vec<UserAttribute>,
    /// Base type and constraint when the class is an enum
    pub enum_type: Option<EnumType>,
}

impl ClassType {
    /// An empty class of the given kind with all members known
    pub fn new(kind: ClassKind, name: impl Into<String>, pos: Pos) -> Self {
        Self {
            need_init: false,
            members_fully_known: true,
            is_abstract: matches!(kind, ClassKind::Abstract | ClassKind::Interface | ClassKind::Trait),
            is_final: false,
            deferred_init_members: FxHashSet::default(),
            kind,
            name: name.into(),
            pos,
            tparams: Vec::new(),
            consts: MemberMap::new(),
            typeconsts: FxHashMap::default(),
            props: MemberMap::new(),
            sprops: MemberMap::new(),
            methods: MemberMap::new(),
            smethods: MemberMap::new(),
            construct: (None, false),
            ancestors: FxHashMap::default(),
            ancestors_checked_when_concrete: FxHashMap::default(),
            req_ancestors: FxHashMap::default(),
            req_ancestors_extends: FxHashSet::default(),
            extends: FxHashSet::default(),
            user_attributes: Vec::new(),
            enum_type: None,
        }
    }

    /// Member table of the given kind
    pub fn members(&self, kind: MemberKind) -> &MemberMap {
        match kind {
            MemberKind::Const => &self.consts,
            MemberKind::Prop => &self.props,
            MemberKind::StaticProp => &self.sprops,
            MemberKind::Method => &self.methods,
            MemberKind::StaticMethod => &self.smethods,
        }
    }

    /// Mutable member table of the given kind
    pub fn members_mut(&mut self, kind: MemberKind) -> &mut MemberMap {
        match kind {
            MemberKind::Const => &mut self.consts,
            MemberKind::Prop => &mut self.props,
            MemberKind::StaticProp => &mut self.sprops,
            MemberKind::Method => &mut self.methods,
            MemberKind::StaticMethod => &mut self.smethods,
        }
    }

    /// Look a member up, distinguishing "absent" from "can't tell"
    pub fn lookup(&self, kind: MemberKind, name: &str) -> MemberLookup<'_> {
        match self.members(kind).get(name) {
            Some(elt) => MemberLookup::Found(elt),
            None if self.members_fully_known => MemberLookup::NotFound,
            None => MemberLookup::Unknown,
        }
    }

    /// Type constant declared or inherited under `name`
    pub fn get_typeconst(&self, name: &str) -> Option<&TypeconstType> {
        self.typeconsts.get(name)
    }

    /// Whether `name` is an ancestor
    pub fn has_ancestor(&self, name: &str) -> bool {
        self.ancestors.contains_key(name)
    }

    /// Whether `name` is a required ancestor
    pub fn requires_ancestor(&self, name: &str) -> bool {
        self.req_ancestors.contains_key(name)
    }

    /// Interfaces and traits
    pub fn is_interface_like(&self) -> bool {
        matches!(self.kind, ClassKind::Interface | ClassKind::Trait)
    }

    /// Check the cross-field invariants the builder must uphold
    pub fn validate(&self) -> Result<(), TypeError> {
        let mut missing: Vec<String> = self
            .ancestors_checked_when_concrete
            .keys()
            .filter(|name| !self.ancestors.contains_key(*name))
            .cloned()
            .collect();
        if missing.is_empty() {
            return Ok(());
        }
        missing.sort();
        Err(TypeError::IncoherentAncestors {
            class: self.name.clone(),
            missing,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reason::Reason;
    use crate::ty::Prim;

    fn elt(prim: Prim, origin: &str) -> ClassElt {
        ClassElt::new(Ty::prim(Reason::None, prim), origin)
    }

    #[test]
    fn test_authored_shadows_synthesized_either_order() {
        let mut map = MemberMap::new();
        assert!(map.insert_elt("foo", elt(Prim::Int, "Gen").synthesized()));
        assert!(map.insert_elt("foo", elt(Prim::String, "User")));
        assert_eq!(map.get("foo").unwrap().origin, "User");

        let mut map = MemberMap::new();
        assert!(map.insert_elt("foo", elt(Prim::String, "User")));
        assert!(!map.insert_elt("foo", elt(Prim::Int, "Gen").synthesized()));
        let kept = map.get("foo").unwrap();
        assert_eq!(kept.origin, "User");
        assert!(!kept.synthesized);
    }

    #[test]
    fn test_later_authored_wins() {
        let map: MemberMap = vec![
            ("bar".to_string(), elt(Prim::Int, "Parent")),
            ("bar".to_string(), elt(Prim::Bool, "Child")),
        ]
        .into_iter()
        .collect();
        assert_eq!(map.len(), 1);
        assert_eq!(map.get("bar").unwrap().origin, "Child");
    }

    #[test]
    fn test_prop_and_method_may_share_a_name() {
        let mut class = ClassType::new(ClassKind::Normal, "C", Pos::none());
        class.props.insert_elt("x", elt(Prim::Int, "C"));
        class.methods.insert_elt("x", elt(Prim::Void, "C"));
        assert!(class.lookup(MemberKind::Prop, "x").found().is_some());
        assert!(class.lookup(MemberKind::Method, "x").found().is_some());
    }

    #[test]
    fn test_lookup_unknown_when_members_incomplete() {
        let mut class = ClassType::new(ClassKind::Normal, "C", Pos::none());
        assert_eq!(class.lookup(MemberKind::Method, "missing"), MemberLookup::NotFound);

        class.members_fully_known = false;
        assert_eq!(class.lookup(MemberKind::Method, "missing"), MemberLookup::Unknown);

        class.methods.insert_elt("present", elt(Prim::Void, "C"));
        assert!(matches!(
            class.lookup(MemberKind::Method, "present"),
            MemberLookup::Found(_)
        ));
    }

    #[test]
    fn test_visibility_carries_defining_class() {
        let private = Visibility::Private("Base".into());
        assert_eq!(private.owner(), Some("Base"));
        assert_eq!(Visibility::Public.owner(), None);
        assert!(!Visibility::Protected("Base".into()).is_public());
    }

    #[test]
    fn test_validate_checked_when_concrete_subset() {
        let mut class = ClassType::new(ClassKind::Abstract, "A", Pos::none());
        let iface = Ty::apply(Reason::None, Id::unpositioned("I"), vec![]);
        class.ancestors.insert("I".into(), iface.clone());
        class.ancestors_checked_when_concrete.insert("I".into(), iface.clone());
        assert!(class.validate().is_ok());

        class.ancestors_checked_when_concrete.insert("J".into(), iface);
        assert_eq!(
            class.validate(),
            Err(TypeError::IncoherentAncestors {
                class: "A".into(),
                missing: vec!["J".into()],
            })
        );
    }

    #[test]
    fn test_new_class_defaults() {
        let iface = ClassType::new(ClassKind::Interface, "I", Pos::none());
        assert!(iface.is_abstract);
        assert!(iface.is_interface_like());
        assert!(iface.members_fully_known);
        assert!(iface.construct.0.is_none());
    }
}
