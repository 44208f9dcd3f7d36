//! Function signatures: arity, parameters, type parameters

use crate::pos::{Id, Pos};
use crate::ty::{bound_eq_erased, ConstraintKind, Phase, Ty};

/// Variance of a type parameter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Variance {
    /// `+T`
    Covariant,
    /// `-T`
    Contravariant,
    /// `T`
    Invariant,
}

/// A declared type parameter: `<+T as Bound>`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Tparam<P: Phase> {
    /// Declared variance
    pub variance: Variance,
    /// Parameter name
    pub name: Id,
    /// Optional `as` or `super` bound
    pub bound: Option<(ConstraintKind, Ty<P>)>,
}

impl<P: Phase> Tparam<P> {
    /// An unbounded type parameter
    pub fn new(variance: Variance, name: Id) -> Self {
        Self {
            variance,
            name,
            bound: None,
        }
    }

    /// Same parameter with a bound
    pub fn with_bound(mut self, kind: ConstraintKind, ty: Ty<P>) -> Self {
        self.bound = Some((kind, ty));
        self
    }
}

/// One parameter of a function type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FunParam<P: Phase> {
    /// Parameter name, when written
    pub name: Option<String>,
    /// Parameter type
    pub ty: Ty<P>,
}

impl<P: Phase> FunParam<P> {
    /// A parameter with an optional name
    pub fn new(name: Option<String>, ty: Ty<P>) -> Self {
        Self { name, ty }
    }

    /// A named parameter
    pub fn named(name: impl Into<String>, ty: Ty<P>) -> Self {
        Self::new(Some(name.into()), ty)
    }
}

/// How many arguments a function takes
///
/// The parameter list may be shorter than the arity suggests for the
/// variadic forms. Callers ask the arity, not the parameter list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FunArity<P: Phase> {
    /// Fixed count: `min` required, up to `max` with defaults
    Standard(usize, usize),
    /// Typed variadic tail after `min` required parameters
    Variadic(usize, FunParam<P>),
    /// Unchecked variadic tail (`...`) after `min` required parameters
    Ellipsis(usize),
}

impl<P: Phase> FunArity<P> {
    /// Minimum number of arguments
    pub fn arity_min(&self) -> usize {
        match self {
            FunArity::Standard(min, _) | FunArity::Variadic(min, _) | FunArity::Ellipsis(min) => *min,
        }
    }

    /// Maximum number of arguments; unbounded for variadic forms
    pub fn arity_max(&self) -> Option<usize> {
        match self {
            FunArity::Standard(_, max) => Some(*max),
            FunArity::Variadic(..) | FunArity::Ellipsis(_) => None,
        }
    }

    /// Whether a call with `count` arguments fits
    pub fn accepts(&self, count: usize) -> bool {
        count >= self.arity_min() && self.arity_max().is_none_or(|max| count <= max)
    }

    /// The typed variadic tail, if any
    pub fn variadic_param(&self) -> Option<&FunParam<P>> {
        match self {
            FunArity::Variadic(_, param) => Some(param),
            _ => None,
        }
    }

    /// Rebuild over mapped parameter types
    pub fn try_map<Q: Phase, E>(
        &self,
        f: impl FnOnce(&Ty<P>) -> Result<Ty<Q>, E>,
    ) -> Result<FunArity<Q>, E> {
        Ok(match self {
            FunArity::Standard(min, max) => FunArity::Standard(*min, *max),
            FunArity::Variadic(min, param) => FunArity::Variadic(
                *min,
                FunParam {
                    name: param.name.clone(),
                    ty: f(&param.ty)?,
                },
            ),
            FunArity::Ellipsis(min) => FunArity::Ellipsis(*min),
        })
    }

    pub(crate) fn eq_erased<Q: Phase>(&self, other: &FunArity<Q>) -> bool {
        match (self, other) {
            (FunArity::Standard(a1, b1), FunArity::Standard(a2, b2)) => a1 == a2 && b1 == b2,
            (FunArity::Variadic(m1, p1), FunArity::Variadic(m2, p2)) => {
                m1 == m2 && p1.name == p2.name && p1.ty.eq_erased(&p2.ty)
            }
            (FunArity::Ellipsis(m1), FunArity::Ellipsis(m2)) => m1 == m2,
            _ => false,
        }
    }
}

/// A function type
///
/// Equality ignores `pos`.
#[derive(Debug, Clone)]
pub struct FunType<P: Phase> {
    /// Declaration site
    pub pos: Pos,
    /// Deprecation message, if the function is deprecated
    pub deprecated: Option<String>,
    /// Declared abstract, no body
    pub is_abstract: bool,
    /// Accepted argument counts
    pub arity: FunArity<P>,
    /// Type parameters
    pub tparams: Vec<Tparam<P>>,
    /// Parameters in declaration order
    pub params: Vec<FunParam<P>>,
    /// Return type
    pub ret: Ty<P>,
}

impl<P: Phase> PartialEq for FunType<P> {
    fn eq(&self, other: &Self) -> bool {
        self.deprecated == other.deprecated
            && self.is_abstract == other.is_abstract
            && self.arity == other.arity
            && self.tparams == other.tparams
            && self.params == other.params
            && self.ret == other.ret
    }
}

impl<P: Phase> Eq for FunType<P> {}

impl<P: Phase> FunType<P> {
    /// A concrete, non-generic function taking exactly `params`
    pub fn new(pos: Pos, params: Vec<FunParam<P>>, ret: Ty<P>) -> Self {
        let count = params.len();
        Self {
            pos,
            deprecated: None,
            is_abstract: false,
            arity: FunArity::Standard(count, count),
            tparams: Vec::new(),
            params,
            ret,
        }
    }

    /// Same function with a different arity
    pub fn with_arity(mut self, arity: FunArity<P>) -> Self {
        self.arity = arity;
        self
    }

    /// Same function with type parameters
    pub fn with_tparams(mut self, tparams: Vec<Tparam<P>>) -> Self {
        self.tparams = tparams;
        self
    }

    /// Minimum number of arguments
    pub fn arity_min(&self) -> usize {
        self.arity.arity_min()
    }

    /// Types reachable one level down: bounds, parameters, variadic tail, return
    pub fn children(&self) -> Vec<&Ty<P>> {
        let mut out: Vec<&Ty<P>> = self
            .tparams
            .iter()
            .filter_map(|tp| tp.bound.as_ref().map(|(_, ty)| ty))
            .collect();
        out.extend(self.params.iter().map(|p| &p.ty));
        if let Some(param) = self.arity.variadic_param() {
            out.push(&param.ty);
        }
        out.push(&self.ret);
        out
    }

    pub(crate) fn eq_erased<Q: Phase>(&self, other: &FunType<Q>) -> bool {
        let tparams_eq = self.tparams.len() == other.tparams.len()
            && self.tparams.iter().zip(&other.tparams).all(|(a, b)| {
                a.variance == b.variance
                    && a.name == b.name
                    && bound_eq_erased(a.bound.as_ref(), b.bound.as_ref())
            });
        let params_eq = self.params.len() == other.params.len()
            && self
                .params
                .iter()
                .zip(&other.params)
                .all(|(a, b)| a.name == b.name && a.ty.eq_erased(&b.ty));
        self.deprecated == other.deprecated
            && self.is_abstract == other.is_abstract
            && self.arity.eq_erased(&other.arity)
            && tparams_eq
            && params_eq
            && self.ret.eq_erased(&other.ret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reason::Reason;
    use crate::ty::{Decl, Locl, Prim};

    fn int<P: Phase>() -> Ty<P> {
        Ty::prim(Reason::None, Prim::Int)
    }

    #[test]
    fn test_arity_min() {
        assert_eq!(FunArity::<Decl>::Standard(2, 5).arity_min(), 2);
        assert_eq!(
            FunArity::<Decl>::Variadic(1, FunParam::named("rest", int())).arity_min(),
            1
        );
        assert_eq!(FunArity::<Locl>::Ellipsis(0).arity_min(), 0);
    }

    #[test]
    fn test_arity_accepts() {
        let standard = FunArity::<Locl>::Standard(1, 3);
        assert!(!standard.accepts(0));
        assert!(standard.accepts(1));
        assert!(standard.accepts(3));
        assert!(!standard.accepts(4));

        let ellipsis = FunArity::<Locl>::Ellipsis(2);
        assert!(!ellipsis.accepts(1));
        assert!(ellipsis.accepts(40));
        assert_eq!(ellipsis.arity_max(), None);
    }

    #[test]
    fn test_variadic_arity_disagrees_with_params() {
        // One required parameter written, plus a typed tail.
        let ft: FunType<Decl> = FunType::new(Pos::none(), vec![FunParam::named("x", int())], int())
            .with_arity(FunArity::Variadic(1, FunParam::named("rest", int())));
        assert_eq!(ft.params.len(), 1);
        assert_eq!(ft.arity_min(), 1);
        assert!(ft.arity.accepts(5));
        assert_eq!(ft.children().len(), 3);
    }

    #[test]
    fn test_equality_ignores_pos() {
        let a: FunType<Locl> = FunType::new(Pos::new("a.php", 0, 1, 1, 1), vec![], int());
        let b: FunType<Locl> = FunType::new(Pos::new("b.php", 7, 9, 3, 1), vec![], int());
        assert_eq!(a, b);
    }

    #[test]
    fn test_eq_erased_across_phases() {
        let d: FunType<Decl> = FunType::new(Pos::none(), vec![FunParam::named("x", int())], int());
        let l: FunType<Locl> = FunType::new(Pos::none(), vec![FunParam::named("x", int())], int());
        assert!(d.eq_erased(&l));

        let renamed: FunType<Locl> =
            FunType::new(Pos::none(), vec![FunParam::named("y", int())], int());
        assert!(!d.eq_erased(&renamed));
    }
}
