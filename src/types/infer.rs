//! Bottom-up type inference over core expressions.
//!
//! Every node produces a [`Typing`]: its mono type plus what it needs from
//! the outside, namely the types of its free locals, its poly constraints
//! and its unhandled effects. Parents never unify child results directly;
//! they hand them to [`combine`] together with the equations the node adds,
//! and `combine` solves everything in one go.
//!
//! Rules take an optional expected type pushed down from the parent, which
//! lets literals, records and calls check against annotations instead of
//! only synthesising a type.

use std::collections::{BTreeSet, HashMap, HashSet};

use log::debug;

use super::decl::{QSymbol, RowLabel};
use super::env::{Instantiator, MonoEnv};
use super::error::TypeError;
use super::subst::Mapping;
use super::ty::{MonoType, PolyConstraint, RowVar, Type, TypeVar};
use super::unify::{TypeEq, unify_eqs};
use crate::core::*;

/// The result of inferring one node.
#[derive(Debug, Clone)]
pub struct Typing {
    pub mono_type: MonoType,
    pub mono_env: MonoEnv,
    pub poly_constraints: HashSet<PolyConstraint>,
    pub effects: BTreeSet<QSymbol>,
}

impl Typing {
    pub fn new(mono_type: MonoType) -> Self {
        Typing {
            mono_type,
            mono_env: MonoEnv::new(),
            poly_constraints: HashSet::new(),
            effects: BTreeSet::new(),
        }
    }

    pub fn into_type(self) -> Type {
        Type::new(self.mono_type, self.poly_constraints, self.effects)
    }

    /// Drops locals bound by the node that produced this typing; they are
    /// not free above it.
    pub fn without_locals<'a>(mut self, locals: impl IntoIterator<Item = &'a LocalVar>) -> Self {
        for local in locals {
            self.mono_env.remove(local);
        }
        self
    }
}

/// Merges child typings under a new return type.
///
/// Every use of a local, in any child env or in `extra_lvs`, is equated to
/// one fresh variable per local; those equations and `extra_eqs` are solved
/// together and the solution is applied to the return type, the reconciled
/// env and the children's poly constraints. Effects are unioned as they are.
pub(crate) fn combine(
    return_type: MonoType,
    typings: &[&Typing],
    extra_eqs: Vec<TypeEq>,
    extra_lvs: Vec<(LocalVar, MonoType)>,
) -> Result<Typing, TypeError> {
    let mut lv_tvs: HashMap<LocalVar, TypeVar> = HashMap::new();
    let mut eqs = extra_eqs;

    let uses = extra_lvs.into_iter().chain(
        typings
            .iter()
            .flat_map(|typing| typing.mono_env.iter())
            .map(|(lv, ty)| (lv.clone(), ty.clone())),
    );
    for (lv, ty) in uses {
        let tv = *lv_tvs.entry(lv).or_insert_with(TypeVar::fresh);
        eqs.push((MonoType::TypeVar(tv), ty));
    }

    let mapping = unify_eqs(eqs)?;

    Ok(Typing {
        mono_type: return_type.apply_mapping(&mapping),
        mono_env: lv_tvs
            .into_iter()
            .map(|(lv, tv)| (lv, MonoType::TypeVar(tv).apply_mapping(&mapping)))
            .collect(),
        poly_constraints: typings
            .iter()
            .flat_map(|typing| typing.poly_constraints.iter())
            .map(|c| c.apply_mapping(&mapping))
            .collect(),
        effects: typings
            .iter()
            .flat_map(|typing| typing.effects.iter().cloned())
            .collect(),
    })
}

/// Infers the type of a closed expression.
pub fn infer_type(expr: &CoreExpr) -> Result<Type, TypeError> {
    infer_typing(expr, None)
        .inspect_err(|err| debug!("type inference failed: {err}"))
        .map(Typing::into_type)
}

pub fn infer_typing(expr: &CoreExpr, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    match expr {
        CoreExpr::Bool(_) => infer_primitive(MonoType::Bool, expected),
        CoreExpr::Str(_) => infer_primitive(MonoType::Str, expected),
        CoreExpr::Int(_) => infer_primitive(MonoType::Int, expected),
        CoreExpr::BigInt(_) => infer_primitive(MonoType::BigInt, expected),
        CoreExpr::Float(_) => infer_primitive(MonoType::Float, expected),
        CoreExpr::BigFloat(_) => infer_primitive(MonoType::BigFloat, expected),
        CoreExpr::Symbol(_) => infer_primitive(MonoType::Symbol, expected),
        CoreExpr::QSymbol(_) => infer_primitive(MonoType::QualifiedSymbol, expected),

        CoreExpr::Vector(exprs) => infer_collection(exprs, expected, CollectionKind::Vector),
        CoreExpr::Set(exprs) => infer_collection(exprs, expected, CollectionKind::Set),
        CoreExpr::Record(record) => infer_record(record, expected),

        CoreExpr::If(if_) => infer_if(if_, expected),
        CoreExpr::Do(do_) => infer_do(do_, expected),
        CoreExpr::Let(let_) | CoreExpr::Loop(let_) => infer_bindings(let_, expected),
        CoreExpr::Recur(recur) => infer_recur(recur),

        CoreExpr::Fn(func) => infer_fn(func, expected),
        CoreExpr::Call(call) => infer_call(call, expected),
        CoreExpr::Case(case) => infer_case(case, expected),
        CoreExpr::WithFx(with_fx) => infer_with_fx(with_fx, expected),

        CoreExpr::LocalVar(local) => Ok(infer_local(local, expected)),
        CoreExpr::GlobalVar(global) => infer_global(global, expected),
    }
}

fn infer_primitive(actual: MonoType, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    match expected {
        None => Ok(Typing::new(actual)),
        Some(expected) => combine(expected.clone(), &[], vec![(expected.clone(), actual)], vec![]),
    }
}

#[derive(Debug, Clone, Copy)]
enum CollectionKind {
    Vector,
    Set,
}

fn infer_collection(
    exprs: &[CoreExpr],
    expected: Option<&MonoType>,
    kind: CollectionKind,
) -> Result<Typing, TypeError> {
    let expected_el = match (kind, expected) {
        (CollectionKind::Vector, Some(MonoType::Vector(el)))
        | (CollectionKind::Set, Some(MonoType::Set(el))) => Some(el.as_ref()),
        _ => None,
    };

    let typings = exprs
        .iter()
        .map(|expr| infer_typing(expr, expected_el))
        .collect::<Result<Vec<_>, _>>()?;

    let el_type = MonoType::fresh_var();
    let collection_type = match kind {
        CollectionKind::Vector => MonoType::vector(el_type.clone()),
        CollectionKind::Set => MonoType::set(el_type.clone()),
    };

    let mut eqs: Vec<TypeEq> = typings
        .iter()
        .map(|typing| (typing.mono_type.clone(), el_type.clone()))
        .collect();
    if let Some(expected) = expected {
        eqs.push((expected.clone(), collection_type.clone()));
    }

    combine(collection_type, &typings.iter().collect::<Vec<_>>(), eqs, vec![])
}

fn infer_record(record: &CoreRecord, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let mut instantiator = Instantiator::new();
    let mut typings = Vec::with_capacity(record.entries.len());
    let mut eqs = vec![];

    for entry in &record.entries {
        let field_type = instantiator.mono_type(entry.key.ty());
        let typing = infer_typing(&entry.expr, Some(&field_type))?;
        eqs.push((field_type, typing.mono_type.clone()));
        typings.push(typing);
    }

    let record_type = MonoType::record(
        record
            .entries
            .iter()
            .map(|entry| (entry.key.clone(), instantiator.row_key(&entry.key.row_key()))),
        RowVar::closed(),
    );

    if let Some(expected) = expected {
        if let MonoType::Record(row) = &expand_alias(expected) {
            let missing: Vec<QSymbol> = row
                .keys
                .keys()
                .filter(|key| !record.entries.iter().any(|entry| &entry.key == *key))
                .map(|key| key.sym().clone())
                .collect();
            if !missing.is_empty() {
                debug!("record literal checked against {expected} lacks keys");
                return Err(TypeError::MissingKeys { keys: missing });
            }
        }
        eqs.push((expected.clone(), record_type.clone()));
    }

    combine(record_type, &typings.iter().collect::<Vec<_>>(), eqs, vec![])
}

fn infer_if(if_: &CoreIf, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let pred = infer_typing(&if_.pred, Some(&MonoType::Bool))?;
    let then = infer_typing(&if_.then, expected)?;
    let otherwise = infer_typing(&if_.otherwise, expected)?;

    let return_type = MonoType::fresh_var();
    let eqs = vec![
        (return_type.clone(), then.mono_type.clone()),
        (return_type.clone(), otherwise.mono_type.clone()),
    ];
    combine(return_type, &[&pred, &then, &otherwise], eqs, vec![])
}

fn infer_do(do_: &CoreDo, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let mut typings = do_
        .exprs
        .iter()
        .map(|expr| infer_typing(expr, None))
        .collect::<Result<Vec<_>, _>>()?;
    let last = infer_typing(&do_.expr, expected)?;
    let return_type = last.mono_type.clone();
    typings.push(last);

    combine(return_type, &typings.iter().collect::<Vec<_>>(), vec![], vec![])
}

/// `let` and `loop`: the bindings see nothing of each other's types, the
/// body sees all of them.
fn infer_bindings(let_: &CoreLet, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let mut typings = let_
        .bindings
        .iter()
        .map(|binding| infer_typing(&binding.expr, None))
        .collect::<Result<Vec<_>, _>>()?;

    let bound: Vec<(LocalVar, MonoType)> = let_
        .bindings
        .iter()
        .zip(&typings)
        .map(|(binding, typing)| (binding.local.clone(), typing.mono_type.clone()))
        .collect();

    let body = infer_typing(&let_.body, expected)?;
    let return_type = body.mono_type.clone();
    typings.push(body);

    let typing = combine(return_type, &typings.iter().collect::<Vec<_>>(), vec![], bound)?;
    Ok(typing.without_locals(let_.bindings.iter().map(|binding| &binding.local)))
}

fn infer_recur(recur: &CoreRecur) -> Result<Typing, TypeError> {
    let typings = recur
        .args
        .iter()
        .map(|(_, expr)| infer_typing(expr, None))
        .collect::<Result<Vec<_>, _>>()?;

    let rebound = recur
        .args
        .iter()
        .zip(&typings)
        .map(|((local, _), typing)| (local.clone(), typing.mono_type.clone()))
        .collect();

    combine(
        MonoType::fresh_var(),
        &typings.iter().collect::<Vec<_>>(),
        vec![],
        rebound,
    )
}

fn infer_local(local: &LocalVar, expected: Option<&MonoType>) -> Typing {
    let ty = expected.cloned().unwrap_or_else(MonoType::fresh_var);
    let mut typing = Typing::new(ty.clone());
    typing.mono_env.insert(local.clone(), ty);
    typing
}

fn infer_global(global: &GlobalVar, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let ty = Instantiator::new().poly_type(&global.declared_type());
    let typing = Typing {
        mono_type: ty.mono_type,
        mono_env: MonoEnv::new(),
        poly_constraints: ty.poly_constraints,
        effects: ty.effects,
    };

    match expected {
        None => Ok(typing),
        Some(expected) => {
            let mono_type = typing.mono_type.clone();
            combine(
                mono_type.clone(),
                &[&typing],
                vec![(expected.clone(), mono_type)],
                vec![],
            )
        }
    }
}

fn infer_fn(func: &CoreFn, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let params: Vec<(LocalVar, MonoType)> = func
        .params
        .iter()
        .map(|param| (param.clone(), MonoType::fresh_var()))
        .collect();
    let body = infer_typing(&func.body, None)?;

    let fn_type = MonoType::func(
        params.iter().map(|(_, ty)| ty.clone()).collect(),
        body.mono_type.clone(),
    );
    let eqs = expected
        .map(|expected| vec![(expected.clone(), fn_type.clone())])
        .unwrap_or_default();

    let typing = combine(fn_type, &[&body], eqs, params)?;
    Ok(typing.without_locals(&func.params))
}

/// Unfolds aliases at the top of `ty` until something else is exposed.
fn expand_alias(ty: &MonoType) -> MonoType {
    match ty {
        MonoType::Alias(alias, params) => expand_alias(&alias.expand(params)),
        _ => ty.clone(),
    }
}

/// Views the callee's type as a function of `arity` parameters.
fn expect_fn(
    callee: &CoreExpr,
    ty: &MonoType,
    arity: usize,
) -> Result<(Vec<MonoType>, MonoType), TypeError> {
    match ty {
        MonoType::Fn(params, ret) => Ok((params.clone(), *ret.clone())),
        // not yet known: accept it and let it be constrained to a function
        // of this arity, rather than rejecting it as not a function
        MonoType::TypeVar(_) => Ok((
            (0..arity).map(|_| MonoType::fresh_var()).collect(),
            MonoType::fresh_var(),
        )),
        MonoType::Alias(alias, params) => expect_fn(callee, &alias.expand(params), arity),
        _ => {
            debug!("callee of type {ty} is not a function");
            Err(TypeError::expected_function(callee, ty.clone()))
        }
    }
}

fn infer_call(call: &CoreCall, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let callee = infer_typing(&call.func, None)?;
    let (params, ret) = expect_fn(&call.func, &callee.mono_type, call.args.len())?;

    if params.len() != call.args.len() {
        debug!(
            "arity mismatch: {} parameter(s), {} argument(s)",
            params.len(),
            call.args.len()
        );
        return Err(TypeError::ArityError {
            fn_type: MonoType::func(params, ret),
            args: call.args.clone(),
        });
    }

    // knowing the result type first lets arguments check against it
    let specialised = match expected {
        Some(expected) => unify_eqs(vec![(ret.clone(), expected.clone())])?,
        None => Mapping::empty(),
    };
    let params: Vec<MonoType> = params
        .iter()
        .map(|param| param.apply_mapping(&specialised))
        .collect();
    let ret = ret.apply_mapping(&specialised);

    let args = call
        .args
        .iter()
        .zip(&params)
        .map(|(arg, param)| infer_typing(arg, Some(param)))
        .collect::<Result<Vec<_>, _>>()?;

    let mut eqs: Vec<TypeEq> = params
        .iter()
        .cloned()
        .zip(args.iter().map(|arg| arg.mono_type.clone()))
        .collect();
    eqs.push((
        callee.mono_type.clone(),
        MonoType::func(params, ret.clone()),
    ));
    if let Some(expected) = expected {
        eqs.push((ret.clone(), expected.clone()));
    }

    let mut typings: Vec<&Typing> = args.iter().collect();
    typings.push(&callee);
    combine(ret, &typings, eqs, vec![])
}

fn infer_clause(
    clause: &CoreCaseClause,
    expected: Option<&MonoType>,
    instantiator: &mut Instantiator,
) -> Result<(Typing, Vec<(LocalVar, MonoType)>), TypeError> {
    let param_types = clause.key.param_types();
    if param_types.len() != clause.bindings.len() {
        return Err(TypeError::CaseArity {
            key: clause.key.sym().clone(),
            expected: param_types.len(),
            found: clause.bindings.len(),
        });
    }

    let body = infer_typing(&clause.body, expected)?;
    let bound = clause
        .bindings
        .iter()
        .cloned()
        .zip(param_types.iter().map(|ty| instantiator.mono_type(ty)))
        .collect();
    Ok((body, bound))
}

fn infer_case(case: &CoreCase, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let scrutinee = infer_typing(&case.expr, None)?;
    let mut instantiator = Instantiator::new();

    let mut clauses = Vec::with_capacity(case.clauses.len());
    let mut bound = vec![];
    for clause in &case.clauses {
        let (typing, locals) = infer_clause(clause, expected, &mut instantiator)?;
        clauses.push(typing);
        bound.extend(locals);
    }
    let default = case
        .default
        .as_deref()
        .map(|expr| infer_typing(expr, expected))
        .transpose()?;

    // without a default the scrutinee may only be one of the matched keys
    let variant_type = MonoType::variant(
        case.clauses
            .iter()
            .map(|clause| (clause.key.clone(), instantiator.row_key(&clause.key.row_key()))),
        RowVar::fresh(default.is_some()),
    );

    let return_type = MonoType::fresh_var();
    let mut eqs: Vec<TypeEq> = clauses
        .iter()
        .chain(&default)
        .map(|typing| (return_type.clone(), typing.mono_type.clone()))
        .collect();
    eqs.push((scrutinee.mono_type.clone(), variant_type));

    let mut typings: Vec<&Typing> = clauses.iter().chain(&default).collect();
    typings.push(&scrutinee);

    let typing = combine(return_type, &typings, eqs, bound)?;
    Ok(typing.without_locals(case.clauses.iter().flat_map(|clause| &clause.bindings)))
}

fn infer_with_fx(with_fx: &CoreWithFx, expected: Option<&MonoType>) -> Result<Typing, TypeError> {
    let mut typings = Vec::with_capacity(with_fx.fx.len() + 1);
    let mut eqs = vec![];

    for def in &with_fx.fx {
        let fx_type = Instantiator::new().mono_type(&def.effect.ty.mono_type);
        let typing = infer_typing(&def.expr, Some(&fx_type))?;
        eqs.push((fx_type, typing.mono_type.clone()));
        typings.push(typing);
    }

    let body = infer_typing(&with_fx.body, expected)?;
    let return_type = body.mono_type.clone();
    typings.push(body);

    let mut typing = combine(return_type, &typings.iter().collect::<Vec<_>>(), eqs, vec![])?;
    for def in &with_fx.fx {
        typing.effects.remove(&def.effect.sym);
    }
    Ok(typing)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::decl::{EffectVar, PolyVar, RecordKey, VariantKey};

    fn sym(name: &str) -> QSymbol {
        QSymbol::new("user", name)
    }

    fn mono(expr: &CoreExpr) -> MonoType {
        infer_type(expr).unwrap().mono_type
    }

    #[test]
    fn test_infer_literals() {
        assert_eq!(mono(&CoreExpr::Bool(true)), MonoType::Bool);
        assert_eq!(mono(&CoreExpr::Str("hi".into())), MonoType::Str);
        assert_eq!(mono(&CoreExpr::BigInt("1".into())), MonoType::BigInt);
        assert_eq!(mono(&CoreExpr::Float(1.5)), MonoType::Float);
        assert_eq!(mono(&CoreExpr::Symbol("x".into())), MonoType::Symbol);
        assert_eq!(
            mono(&CoreExpr::QSymbol(sym("x"))),
            MonoType::QualifiedSymbol
        );
    }

    #[test]
    fn test_literal_against_expected() {
        let typing = infer_typing(&CoreExpr::Int(1), Some(&MonoType::Int)).unwrap();
        assert_eq!(typing.mono_type, MonoType::Int);

        let result = infer_typing(&CoreExpr::Int(1), Some(&MonoType::Str));
        assert!(matches!(result, Err(TypeError::UnificationError { .. })));
    }

    #[test]
    fn test_empty_vector_is_polymorphic() {
        match mono(&CoreExpr::Vector(vec![])) {
            MonoType::Vector(el) => assert!(matches!(*el, MonoType::TypeVar(_))),
            other => panic!("expected a vector, got {other}"),
        }
    }

    #[test]
    fn test_heterogeneous_set_fails() {
        let result = infer_type(&CoreExpr::Set(vec![CoreExpr::Int(1), CoreExpr::Str("a".into())]));
        assert!(matches!(result, Err(TypeError::UnificationError { .. })));
    }

    #[test]
    fn test_if_predicate_must_be_bool() {
        let expr = CoreExpr::if_(CoreExpr::Int(1), CoreExpr::Int(2), CoreExpr::Int(3));
        assert!(infer_type(&expr).is_err());
    }

    #[test]
    fn test_do_returns_last() {
        let expr = CoreExpr::do_(vec![CoreExpr::Int(1)], CoreExpr::Str("done".into()));
        assert_eq!(mono(&expr), MonoType::Str);
    }

    #[test]
    fn test_local_records_requirement() {
        let x = LocalVar::new("x");
        let typing = infer_typing(&CoreExpr::local(&x), Some(&MonoType::Int)).unwrap();
        assert_eq!(typing.mono_env.get(&x), Some(&MonoType::Int));
    }

    #[test]
    fn test_combine_reconciles_locals() {
        let x = LocalVar::new("x");
        let expr = CoreExpr::Vector(vec![CoreExpr::local(&x), CoreExpr::Int(1)]);
        let typing = infer_typing(&expr, None).unwrap();
        assert_eq!(typing.mono_env.get(&x), Some(&MonoType::Int));
        assert_eq!(typing.mono_type, MonoType::vector(MonoType::Int));
    }

    #[test]
    fn test_combine_conflicting_locals_fail() {
        let x = LocalVar::new("x");
        let expr = CoreExpr::do_(
            vec![CoreExpr::if_(
                CoreExpr::local(&x),
                CoreExpr::Int(1),
                CoreExpr::Int(2),
            )],
            CoreExpr::Vector(vec![CoreExpr::local(&x), CoreExpr::Int(1)]),
        );
        assert!(infer_typing(&expr, None).is_err());
    }

    #[test]
    fn test_let_removes_bound_locals() {
        let x = LocalVar::new("x");
        let expr = CoreExpr::let_(vec![(x.clone(), CoreExpr::Int(4))], CoreExpr::local(&x));
        let typing = infer_typing(&expr, None).unwrap();
        assert_eq!(typing.mono_type, MonoType::Int);
        assert!(typing.mono_env.is_empty());
    }

    #[test]
    fn test_identity_fn() {
        let x = LocalVar::new("x");
        let typing = infer_typing(&CoreExpr::func(vec![x.clone()], CoreExpr::local(&x)), None).unwrap();
        match typing.mono_type {
            MonoType::Fn(params, ret) => assert_eq!(params, vec![*ret]),
            other => panic!("expected a function, got {other}"),
        }
        assert!(typing.mono_env.is_empty());
    }

    #[test]
    fn test_call_of_non_function() {
        let expr = CoreExpr::call(CoreExpr::Int(1), vec![]);
        assert!(matches!(
            infer_type(&expr),
            Err(TypeError::ExpectedFunction { ty: MonoType::Int, .. })
        ));
    }

    #[test]
    fn test_call_of_local_function() {
        let f = LocalVar::new("f");
        let expr = CoreExpr::call(CoreExpr::local(&f), vec![CoreExpr::Int(1)]);
        let typing = infer_typing(&expr, Some(&MonoType::Str)).unwrap();
        assert_eq!(typing.mono_type, MonoType::Str);
        assert_eq!(
            typing.mono_env.get(&f),
            Some(&MonoType::func(vec![MonoType::Int], MonoType::Str))
        );
    }

    #[test]
    fn test_record_accessor_call() {
        let count = RecordKey::new(sym("count"), vec![], MonoType::Int);
        let expr = CoreExpr::call(
            CoreExpr::global(GlobalVar::RecordKey(count.clone())),
            vec![CoreExpr::record([(count, CoreExpr::Int(42))])],
        );
        assert_eq!(mono(&expr), MonoType::Int);
    }

    #[test]
    fn test_record_field_type_checked() {
        let count = RecordKey::new(sym("count"), vec![], MonoType::Int);
        let expr = CoreExpr::record([(count, CoreExpr::Str("no".into()))]);
        assert!(infer_type(&expr).is_err());
    }

    #[test]
    fn test_parametric_record_key() {
        let a = TypeVar::fresh();
        let items = RecordKey::new(sym("items"), vec![a], MonoType::vector(MonoType::TypeVar(a)));
        let expr = CoreExpr::record([(items.clone(), CoreExpr::Vector(vec![CoreExpr::Int(1)]))]);

        match mono(&expr) {
            MonoType::Record(row) => {
                assert_eq!(row.keys.get(&items).map(|k| k.type_params.clone()), Some(vec![MonoType::Int]));
            }
            other => panic!("expected a record, got {other}"),
        }
    }

    #[test]
    fn test_record_against_aliased_record_reports_missing_keys() {
        let count = RecordKey::new(sym("count"), vec![], MonoType::Int);
        let name = RecordKey::new(sym("name"), vec![], MonoType::Str);
        let user = crate::types::decl::TypeAlias::new(
            sym("User"),
            vec![],
            MonoType::record(
                [
                    (count.clone(), Default::default()),
                    (name.clone(), Default::default()),
                ],
                RowVar::closed(),
            ),
        );
        let expr = CoreExpr::record([(count, CoreExpr::Int(42))]);

        match infer_typing(&expr, Some(&MonoType::Alias(user, vec![]))) {
            Err(TypeError::MissingKeys { keys }) => assert_eq!(keys, vec![sym("name")]),
            other => panic!("expected missing keys, got {other:?}"),
        }
    }

    #[test]
    fn test_case_arity() {
        let a = TypeVar::fresh();
        let just = VariantKey::new(sym("Just"), vec![a], vec![MonoType::TypeVar(a)]);
        let expr = CoreExpr::case(
            CoreExpr::global(GlobalVar::VariantKey(just.clone())),
            vec![(just, vec![], CoreExpr::Int(0))],
            None,
        );
        assert!(matches!(
            infer_type(&expr),
            Err(TypeError::CaseArity { expected: 1, found: 0, .. })
        ));
    }

    #[test]
    fn test_poly_var_constraint_is_specialised() {
        let a = TypeVar::fresh();
        let show = PolyVar::new(
            QSymbol::new("core", "show"),
            a,
            Type::mono(MonoType::func(vec![MonoType::TypeVar(a)], MonoType::Str)),
        );
        let expr = CoreExpr::call(CoreExpr::global(GlobalVar::Poly(show)), vec![CoreExpr::Int(1)]);

        let ty = infer_type(&expr).unwrap();
        assert_eq!(ty.mono_type, MonoType::Str);
        let constraints: Vec<_> = ty.poly_constraints.into_iter().collect();
        assert_eq!(constraints.len(), 1);
        assert_eq!(constraints[0].primary, vec![MonoType::Int]);
    }

    #[test]
    fn test_effect_reference_carries_effect() {
        let println = EffectVar::new(
            QSymbol::new("io", "println"),
            Type::mono(MonoType::func(vec![MonoType::Str], MonoType::Str)),
        );
        let expr = CoreExpr::call(
            CoreExpr::global(GlobalVar::Effect(println)),
            vec![CoreExpr::Str("hi".into())],
        );
        let ty = infer_type(&expr).unwrap();
        assert!(ty.effects.contains(&QSymbol::new("io", "println")));
    }
}
