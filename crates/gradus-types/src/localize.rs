//! Resolution of declared types into local types
//!
//! Every declared shape has a local counterpart: shared shapes map one to
//! one, `this` becomes the environment's `this` type, and a named
//! application becomes either an unfolded typedef, an abstract newtype, or a
//! class reference.

use crate::class::ClassType;
use crate::error::TypeError;
use crate::expand::{make_substs, Ety, ExpandEnv};
use crate::fun::{FunParam, FunType, Tparam};
use crate::pos::{Id, Pos};
use crate::reason::Reason;
use crate::ty::{AbstractType, Decl, DeclKind, Locl, Ty, TyKind};
use crate::typedef::{TypedefType, TypedefVisibility};
use tracing::{debug, trace};

/// Source of declarations the resolver consults
pub trait DeclProvider {
    /// Typedef declared under `name`
    fn typedef(&self, name: &str) -> Option<&TypedefType>;

    /// Class, interface, trait or enum declared under `name`
    fn class(&self, name: &str) -> Option<&ClassType>;
}

/// Resolves declared types against a [`DeclProvider`]
pub struct Localizer<'a> {
    provider: &'a dyn DeclProvider,
    /// File being checked; newtypes defined there unfold like aliases
    file: Option<String>,
}

impl<'a> Localizer<'a> {
    /// Resolve against `provider`, outside any newtype's defining file
    pub fn new(provider: &'a dyn DeclProvider) -> Self {
        Self { provider, file: None }
    }

    /// Resolve as code in `file` sees types
    pub fn in_file(mut self, file: impl Into<String>) -> Self {
        self.file = Some(file.into());
        self
    }

    /// Whether a newtype declared at `pos` is transparent here
    fn sees_through(&self, pos: &Pos) -> bool {
        !pos.file.is_empty() && self.file.as_deref() == Some(pos.file.as_str())
    }

    /// Resolve `ty`, returning the environment it was finally produced in.
    ///
    /// For a typedef the returned environment's trace includes the typedefs
    /// unfolded to reach the result.
    pub fn localize(&self, env: ExpandEnv, ty: &Ty<Decl>) -> Result<Ety, TypeError> {
        let (env, ty) = self.expand(&env, ty)?;
        Ok(Ety::new(env, ty))
    }

    /// Resolve `ty`, discarding the environment
    pub fn localize_ty(&self, env: &ExpandEnv, ty: &Ty<Decl>) -> Result<Ty<Locl>, TypeError> {
        self.expand(env, ty).map(|(_, ty)| ty)
    }

    /// Resolve every type in a function signature
    pub fn localize_fun(&self, env: &ExpandEnv, ft: &FunType<Decl>) -> Result<FunType<Locl>, TypeError> {
        let tparams = ft
            .tparams
            .iter()
            .map(|tp| self.localize_tparam(env, tp))
            .collect::<Result<Vec<_>, _>>()?;
        let params = ft
            .params
            .iter()
            .map(|p| -> Result<_, TypeError> {
                Ok(FunParam::new(p.name.clone(), self.localize_ty(env, &p.ty)?))
            })
            .collect::<Result<Vec<_>, _>>()?;
        Ok(FunType {
            pos: ft.pos.clone(),
            deprecated: ft.deprecated.clone(),
            is_abstract: ft.is_abstract,
            arity: ft.arity.try_map(|ty| self.localize_ty(env, ty))?,
            tparams,
            params,
            ret: self.localize_ty(env, &ft.ret)?,
        })
    }

    fn localize_tparam(&self, env: &ExpandEnv, tp: &Tparam<Decl>) -> Result<Tparam<Locl>, TypeError> {
        let bound = match &tp.bound {
            Some((kind, ty)) => Some((*kind, self.localize_ty(env, ty)?)),
            None => None,
        };
        Ok(Tparam {
            variance: tp.variance,
            name: tp.name.clone(),
            bound,
        })
    }

    fn expand(&self, env: &ExpandEnv, ty: &Ty<Decl>) -> Result<(ExpandEnv, Ty<Locl>), TypeError> {
        let r = ty.reason.clone();
        let kind = match &*ty.kind {
            TyKind::Any => TyKind::Any,
            TyKind::Mixed => TyKind::Mixed,
            TyKind::Prim(p) => TyKind::Prim(*p),
            TyKind::Array(a) => TyKind::Array(a.try_map(|t| self.localize_ty(env, t))?),
            TyKind::Generic(name, bound) => {
                if let Some(sub) = env.subst(name) {
                    let reason = Reason::instantiate(r, name.clone(), sub.reason.clone());
                    return Ok((env.clone(), sub.clone().with_reason(reason)));
                }
                let bound = match bound {
                    Some((k, b)) => Some((*k, self.localize_ty(env, b)?)),
                    None => None,
                };
                TyKind::Generic(name.clone(), bound)
            }
            TyKind::Optional(inner) => TyKind::Optional(self.localize_ty(env, inner)?),
            TyKind::Fun(ft) => TyKind::Fun(self.localize_fun(env, ft)?),
            TyKind::Tuple(elems) => TyKind::Tuple(self.localize_all(env, elems)?),
            TyKind::Access(ta) => TyKind::Access(ta.try_map_root(|root| self.localize_ty(env, root))?),
            TyKind::Shape(fields) => TyKind::Shape(fields.try_map(|t| self.localize_ty(env, t))?),
            TyKind::Decl(DeclKind::This) => {
                return Ok((env.clone(), env.this_ty.clone().with_reason(r)));
            }
            TyKind::Decl(DeclKind::Apply(id, args)) => {
                let args = self.localize_all(env, args)?;
                return match self.provider.typedef(&id.name) {
                    Some(td) => self.expand_typedef(env, r, id, td, args),
                    None => Ok((env.clone(), self.class_ref(r, id, args))),
                };
            }
            TyKind::Locl(never) => match *never {},
        };
        Ok((env.clone(), Ty::new(r, kind)))
    }

    fn localize_all(&self, env: &ExpandEnv, tys: &[Ty<Decl>]) -> Result<Vec<Ty<Locl>>, TypeError> {
        tys.iter().map(|t| self.localize_ty(env, t)).collect()
    }

    fn expand_typedef(
        &self,
        env: &ExpandEnv,
        r: Reason,
        id: &Id,
        td: &TypedefType,
        args: Vec<Ty<Locl>>,
    ) -> Result<(ExpandEnv, Ty<Locl>), TypeError> {
        let inner = env.enter_typedef(id.pos.clone(), &id.name)?;
        // A typedef body only sees its own parameters.
        let body_env = inner.clone().with_substs(make_substs(&td.tparams, args.clone()));
        let transparent = match td.visibility {
            TypedefVisibility::Transparent => true,
            TypedefVisibility::Opaque => self.sees_through(&td.pos),
        };
        if transparent {
            debug!(typedef = %id.name, depth = inner.type_expansions.len(), "unfolding typedef");
            let (out_env, ty) = self.expand(&body_env, &td.ty)?;
            let reason = Reason::ExpandTypedef(r.pos(), id.name.clone());
            return Ok((out_env, ty.with_reason(reason)));
        }
        let constraint = match &td.constraint {
            Some(c) => Some(self.localize_ty(&body_env, c)?),
            None => None,
        };
        trace!(newtype = %id.name, "opaque typedef kept abstract");
        let abs = AbstractType {
            name: id.clone(),
            args,
            constraint,
        };
        Ok((inner, Ty::abstract_type(r, abs)))
    }

    // Unwritten type arguments of a known generic class are unchecked.
    fn class_ref(&self, r: Reason, id: &Id, mut args: Vec<Ty<Locl>>) -> Ty<Locl> {
        match self.provider.class(&id.name) {
            Some(class) if args.len() < class.tparams.len() => {
                trace!(class = %id.name, written = args.len(), declared = class.tparams.len(), "padding type arguments");
                args.resize_with(class.tparams.len(), || Ty::any(r.clone()));
            }
            Some(_) => {}
            None => trace!(class = %id.name, "reference to undeclared class"),
        }
        Ty::class(r, id.clone(), args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::ClassKind;
    use crate::fun::Variance;
    use crate::ty::{LoclKind, Prim};
    use rustc_hash::FxHashMap;

    #[derive(Default)]
    struct Decls {
        typedefs: FxHashMap<String, TypedefType>,
        classes: FxHashMap<String, ClassType>,
    }

    impl DeclProvider for Decls {
        fn typedef(&self, name: &str) -> Option<&TypedefType> {
            self.typedefs.get(name)
        }

        fn class(&self, name: &str) -> Option<&ClassType> {
            self.classes.get(name)
        }
    }

    fn apply(name: &str, args: Vec<Ty<Decl>>) -> Ty<Decl> {
        Ty::apply(Reason::None, Id::unpositioned(name), args)
    }

    fn env() -> ExpandEnv {
        ExpandEnv::new(Ty::class(Reason::None, Id::unpositioned("Self"), vec![]))
    }

    #[test]
    fn test_this_resolves_to_env_this() {
        let decls = Decls::default();
        let loc = Localizer::new(&decls);
        let ty = loc.localize_ty(&env(), &Ty::this(Reason::None)).unwrap();
        assert_eq!(ty, Ty::class(Reason::None, Id::unpositioned("Self"), vec![]));
    }

    #[test]
    fn test_generic_substituted() {
        let decls = Decls::default();
        let loc = Localizer::new(&decls);
        let mut substs = FxHashMap::default();
        substs.insert("T".to_string(), Ty::prim(Reason::None, Prim::Int));
        let env = env().with_substs(substs);

        let decl: Ty<Decl> = Ty::optional(Reason::None, Ty::generic(Reason::None, "T", None));
        let ty = loc.localize_ty(&env, &decl).unwrap();
        assert_eq!(ty, Ty::optional(Reason::None, Ty::prim(Reason::None, Prim::Int)));

        let free: Ty<Decl> = Ty::generic(Reason::None, "U", None);
        assert!(matches!(loc.localize_ty(&env, &free).unwrap().kind(), TyKind::Generic(n, None) if n == "U"));
    }

    #[test]
    fn test_apply_becomes_class_padded_with_any() {
        let mut decls = Decls::default();
        let mut class = ClassType::new(ClassKind::Normal, "Box", Pos::none());
        class.tparams = vec![Tparam::new(Variance::Covariant, Id::unpositioned("T"))];
        decls.classes.insert("Box".into(), class);
        let loc = Localizer::new(&decls);

        let ty = loc.localize_ty(&env(), &apply("Box", vec![])).unwrap();
        match ty.kind() {
            TyKind::Locl(LoclKind::Class(id, args)) => {
                assert_eq!(id.name, "Box");
                assert_eq!(args.len(), 1);
                assert!(args[0].is_any());
            }
            other => panic!("expected class, got {:?}", other),
        }
    }

    #[test]
    fn test_transparent_typedef_unfolds_with_params() {
        let mut decls = Decls::default();
        let body: Ty<Decl> = Ty::tuple(
            Reason::None,
            vec![Ty::generic(Reason::None, "T", None), Ty::prim(Reason::None, Prim::Int)],
        );
        decls.typedefs.insert(
            "Pair".into(),
            TypedefType::transparent(Pos::none(), body)
                .with_tparams(vec![Tparam::new(Variance::Invariant, Id::unpositioned("T"))]),
        );
        let loc = Localizer::new(&decls);

        let ety = loc
            .localize(env(), &apply("Pair", vec![Ty::prim(Reason::None, Prim::String)]))
            .unwrap();
        let expected: Ty<Locl> = Ty::tuple(
            Reason::None,
            vec![Ty::prim(Reason::None, Prim::String), Ty::prim(Reason::None, Prim::Int)],
        );
        assert_eq!(ety.ty, expected);
        assert_eq!(ety.env.expansion_trace().len(), 1);
        assert!(matches!(ety.ty.reason(), Reason::ExpandTypedef(_, name) if name == "Pair"));
    }

    #[test]
    fn test_opaque_typedef_stays_abstract() {
        let mut decls = Decls::default();
        decls.typedefs.insert(
            "UserId".into(),
            TypedefType::opaque(
                Pos::none(),
                Ty::prim(Reason::None, Prim::Int),
                Some(Ty::prim(Reason::None, Prim::Arraykey)),
            ),
        );
        let loc = Localizer::new(&decls);

        let ty = loc.localize_ty(&env(), &apply("UserId", vec![])).unwrap();
        match ty.kind() {
            TyKind::Locl(LoclKind::Abstract(abs)) => {
                assert_eq!(abs.name.name, "UserId");
                assert!(abs.args.is_empty());
                assert_eq!(abs.constraint, Some(Ty::prim(Reason::None, Prim::Arraykey)));
            }
            other => panic!("expected abstract, got {:?}", other),
        }
    }

    #[test]
    fn test_newtype_transparent_in_defining_file() {
        let mut decls = Decls::default();
        decls.typedefs.insert(
            "UserId".into(),
            TypedefType::opaque(
                Pos::new("ids.php", 0, 30, 1, 1),
                Ty::prim(Reason::None, Prim::Int),
                None,
            ),
        );

        let inside = Localizer::new(&decls).in_file("ids.php");
        let ty = inside.localize_ty(&env(), &apply("UserId", vec![])).unwrap();
        assert_eq!(ty, Ty::prim(Reason::None, Prim::Int));
        assert!(matches!(ty.reason(), Reason::ExpandTypedef(_, name) if name == "UserId"));

        let elsewhere = Localizer::new(&decls).in_file("main.php");
        let ty = elsewhere.localize_ty(&env(), &apply("UserId", vec![])).unwrap();
        assert!(matches!(ty.kind(), TyKind::Locl(LoclKind::Abstract(_))));
    }

    #[test]
    fn test_unpositioned_newtype_never_transparent() {
        let mut decls = Decls::default();
        decls.typedefs.insert(
            "Token".into(),
            TypedefType::opaque(Pos::none(), Ty::prim(Reason::None, Prim::String), None),
        );
        let loc = Localizer::new(&decls).in_file("");
        let ty = loc.localize_ty(&env(), &apply("Token", vec![])).unwrap();
        assert!(matches!(ty.kind(), TyKind::Locl(LoclKind::Abstract(_))));
    }

    #[test]
    fn test_sibling_uses_are_not_a_cycle() {
        let mut decls = Decls::default();
        decls.typedefs.insert(
            "A".into(),
            TypedefType::transparent(Pos::none(), Ty::prim(Reason::None, Prim::Int)),
        );
        let loc = Localizer::new(&decls);

        let decl = Ty::tuple(Reason::None, vec![apply("A", vec![]), apply("A", vec![])]);
        assert!(loc.localize_ty(&env(), &decl).is_ok());
    }

    #[test]
    fn test_fun_localized_with_variadic_tail() {
        use crate::fun::FunArity;

        let decls = Decls::default();
        let loc = Localizer::new(&decls);
        let ft: FunType<Decl> = FunType::new(Pos::none(), vec![], Ty::this(Reason::None))
            .with_arity(FunArity::Variadic(0, FunParam::named("rest", Ty::this(Reason::None))));

        let local = loc.localize_fun(&env(), &ft).unwrap();
        let self_ty: Ty<Locl> = Ty::class(Reason::None, Id::unpositioned("Self"), vec![]);
        assert_eq!(local.ret, self_ty);
        assert_eq!(local.arity.variadic_param().unwrap().ty, self_ty);
        assert_eq!(local.arity_min(), 0);
    }
}
