//! Expansion environment
//!
//! An [`ExpandEnv`] travels with every resolution of a declared type into a
//! local one. It carries the generic substitution, the type `this` stands for,
//! and the trace of typedefs being unfolded so a cycle is reported instead of
//! recursing forever. Resolution never mutates an environment in place;
//! entering a typedef yields a new one.

use crate::error::TypeError;
use crate::fun::Tparam;
use crate::pos::Pos;
use crate::reason::Reason;
use crate::ty::{Decl, Locl, Ty};
use rustc_hash::FxHashMap;
use tracing::{debug, trace};

/// Generic name to local instantiation
pub type Substs = FxHashMap<String, Ty<Locl>>;

/// State threaded through declared → local resolution
#[derive(Debug, Clone, PartialEq)]
pub struct ExpandEnv {
    /// Typedefs being unfolded, outermost first
    pub type_expansions: Vec<(Pos, String)>,
    /// Instantiation of the generics in scope
    pub substs: Substs,
    /// What `this` resolves to
    pub this_ty: Ty<Locl>,
}

impl ExpandEnv {
    /// Fresh environment for a top-level expansion request
    pub fn new(this_ty: Ty<Locl>) -> Self {
        Self {
            type_expansions: Vec::new(),
            substs: Substs::default(),
            this_ty,
        }
    }

    /// Replace the substitution
    pub fn with_substs(mut self, substs: Substs) -> Self {
        self.substs = substs;
        self
    }

    /// Replace the type `this` resolves to
    pub fn with_this(mut self, this_ty: Ty<Locl>) -> Self {
        self.this_ty = this_ty;
        self
    }

    /// Instantiation of generic `name`, if bound
    pub fn subst(&self, name: &str) -> Option<&Ty<Locl>> {
        self.substs.get(name)
    }

    /// Typedefs being unfolded, outermost first
    pub fn expansion_trace(&self) -> &[(Pos, String)] {
        &self.type_expansions
    }

    /// Whether `name` is already being unfolded
    pub fn is_expanding(&self, name: &str) -> bool {
        self.type_expansions.iter().any(|(_, n)| n == name)
    }

    /// Environment for unfolding typedef `name`, reached at `pos`.
    ///
    /// Membership is by name: every unfolding reaches the typedef from a
    /// different position, so a repeated name is a cycle.
    pub fn enter_typedef(&self, pos: Pos, name: &str) -> Result<ExpandEnv, TypeError> {
        if self.is_expanding(name) {
            let mut cycle = self.type_expansions.clone();
            cycle.push((pos.clone(), name.to_string()));
            debug!(typedef = name, depth = cycle.len(), "cyclic typedef expansion");
            return Err(TypeError::CyclicTypedef {
                name: name.to_string(),
                pos,
                cycle,
            });
        }
        trace!(typedef = name, depth = self.type_expansions.len() + 1, "entering typedef");
        let mut next = self.clone();
        next.type_expansions.push((pos, name.to_string()));
        Ok(next)
    }
}

/// Pair type parameters with arguments.
///
/// Missing arguments become `Any`, so an unannotated use stays unchecked
/// rather than failing. Surplus arguments are ignored.
pub fn make_substs(tparams: &[Tparam<Decl>], args: Vec<Ty<Locl>>) -> Substs {
    let mut args = args.into_iter();
    tparams
        .iter()
        .map(|tp| {
            let ty = args
                .next()
                .unwrap_or_else(|| Ty::any(Reason::hint(tp.name.pos.clone())));
            (tp.name.name.clone(), ty)
        })
        .collect()
}

/// A local type together with the environment that produced it
#[derive(Debug, Clone, PartialEq)]
pub struct Ety {
    /// Environment the type was produced in
    pub env: ExpandEnv,
    /// The local type
    pub ty: Ty<Locl>,
}

impl Ety {
    /// Pair a type with its environment
    pub fn new(env: ExpandEnv, ty: Ty<Locl>) -> Self {
        Self { env, ty }
    }

    /// Drop the environment
    pub fn into_ty(self) -> Ty<Locl> {
        self.ty
    }
}
