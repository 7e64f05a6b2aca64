//! Properties of mappings produced by the unifier

use rowcheck::types::{
    Mapping, MonoType, QSymbol, RecordKey, RowKey, RowVar, TypeVar, VariantKey, unify_eqs,
};

fn var(v: TypeVar) -> MonoType {
    MonoType::TypeVar(v)
}

fn record_key(name: &str) -> RecordKey {
    RecordKey::new(QSymbol::new("user", name), vec![], MonoType::Int)
}

/// Types mentioning every variable the unifier may bind in these tests
fn samples(vars: &[TypeVar], rows: &[(RecordKey, RowVar)]) -> Vec<MonoType> {
    let mut samples: Vec<MonoType> = vars.iter().map(|v| var(*v)).collect();
    samples.extend(
        rows.iter()
            .map(|(key, row_var)| MonoType::record([(key.clone(), RowKey::default())], *row_var)),
    );
    samples
}

#[test]
fn test_solution_is_idempotent() {
    let a = TypeVar::fresh();
    let b = TypeVar::fresh();
    let c = TypeVar::fresh();
    let mapping = unify_eqs(vec![
        (var(a), MonoType::vector(var(b))),
        (var(b), MonoType::func(vec![var(c)], MonoType::Int)),
        (var(c), MonoType::Str),
    ])
    .unwrap();

    for ty in samples(&[a, b, c], &[]) {
        let once = ty.apply_mapping(&mapping);
        assert_eq!(once.apply_mapping(&mapping), once);
    }
}

#[test]
fn test_solution_satisfies_every_equation() {
    let a = TypeVar::fresh();
    let b = TypeVar::fresh();
    let eqs = vec![
        (
            MonoType::func(vec![var(a), var(b)], var(a)),
            MonoType::func(vec![MonoType::set(var(b)), MonoType::Bool], var(a)),
        ),
        (MonoType::vector(var(b)), MonoType::vector(MonoType::Bool)),
    ];
    let mapping = unify_eqs(eqs.clone()).unwrap();

    for (left, right) in eqs {
        assert_eq!(left.apply_mapping(&mapping), right.apply_mapping(&mapping));
    }
}

#[test]
fn test_composition_law_on_unifier_output() {
    let a = TypeVar::fresh();
    let b = TypeVar::fresh();
    let first = unify_eqs(vec![(var(a), MonoType::vector(var(b)))]).unwrap();
    let second = unify_eqs(vec![(var(b), MonoType::Int)]).unwrap();
    let composed = first.apply_mapping(&second);

    let ty = MonoType::func(vec![var(a)], var(b));
    assert_eq!(
        ty.apply_mapping(&first).apply_mapping(&second),
        ty.apply_mapping(&composed)
    );
}

#[test]
fn test_composition_law_with_rows() {
    let count = record_key("count");
    let name = record_key("name");
    let age = record_key("age");
    let r1 = RowVar::open();
    let r2 = RowVar::open();

    let first = unify_eqs(vec![(
        MonoType::record([(count.clone(), RowKey::default())], r1),
        MonoType::record([(name.clone(), RowKey::default())], r2),
    )])
    .unwrap();

    let extended = MonoType::record([(count.clone(), RowKey::default())], r1).apply_mapping(&first);
    let second = unify_eqs(vec![(
        extended,
        MonoType::record([(age.clone(), RowKey::default())], RowVar::closed()),
    )]);
    // the closed side lacks count and name
    assert!(second.is_err());

    let open_age = MonoType::record([(age, RowKey::default())], RowVar::open());
    let extended = MonoType::record([(count.clone(), RowKey::default())], r1).apply_mapping(&first);
    let second = unify_eqs(vec![(extended, open_age)]).unwrap();
    let composed = first.apply_mapping(&second);

    for ty in samples(&[], &[(count, r1), (name, r2)]) {
        assert_eq!(
            ty.apply_mapping(&first).apply_mapping(&second),
            ty.apply_mapping(&composed)
        );
    }
}

#[test]
fn test_unify_symmetric_up_to_row_direction() {
    let just = VariantKey::new(QSymbol::new("user", "Just"), vec![], vec![]);
    let nothing = VariantKey::new(QSymbol::new("user", "Nothing"), vec![], vec![]);
    let left = MonoType::variant([(just.clone(), RowKey::default())], RowVar::open());
    let right = MonoType::variant([(nothing.clone(), RowKey::default())], RowVar::open());

    let forward = unify_eqs(vec![(left.clone(), right.clone())]).unwrap();
    let backward = unify_eqs(vec![(right.clone(), left.clone())]).unwrap();

    let keys = |ty: MonoType| match ty {
        MonoType::Variant(row) => row.keys.into_keys().collect::<Vec<_>>(),
        other => panic!("expected a variant, got {other}"),
    };
    assert_eq!(
        keys(left.apply_mapping(&forward)),
        keys(left.apply_mapping(&backward))
    );
    assert_eq!(
        keys(right.apply_mapping(&forward)),
        keys(right.apply_mapping(&backward))
    );
}

#[test]
fn test_empty_mapping_is_identity() {
    let ty = MonoType::func(vec![MonoType::fresh_var()], MonoType::BigFloat);
    assert_eq!(ty.apply_mapping(&Mapping::empty()), ty);
}
