use std::collections::{BTreeMap, VecDeque};

use log::{debug, trace};

use super::decl::{RecordKey, RowLabel, VariantKey};
use super::error::TypeError;
use super::subst::{Mapping, RowExtension, RowMapping};
use super::ty::{MonoType, RowKey, RowType, RowVar};

/// Two types that must end up equal.
pub type TypeEq = (MonoType, MonoType);

/// The work one structural unification step leaves behind: equations still
/// to solve and the row extensions it decided on.
#[derive(Debug, Default)]
pub struct Unification {
    pub type_eqs: Vec<TypeEq>,
    pub record_eqs: RowMapping<RecordKey>,
    pub variant_eqs: RowMapping<VariantKey>,
}

impl Unification {
    fn eqs(type_eqs: Vec<TypeEq>) -> Self {
        Unification {
            type_eqs,
            ..Unification::default()
        }
    }
}

/// Unifies the outermost layer of two types that are neither equal nor a
/// bare type variable on the left.
///
/// ```text
/// [a] ~ [b]                        => a ~ b
/// (Fn a b r) ~ (Fn c d s)          => a ~ c, b ~ d, r ~ s
/// {:x ...r1} ~ {:y ...r2}          => r1 := {:y ...r3}, r2 := {:x ...r3}
/// (Pair Int) ~ t                   => {:fst Int :snd Int} ~ t
/// Int ~ Int                        => nothing left to do
/// Int ~ Str                        => UnificationError
/// ```
pub fn unify_eq(t1: &MonoType, t2: &MonoType) -> Result<Unification, TypeError> {
    match (t1, t2) {
        (MonoType::Vector(el1), MonoType::Vector(el2)) | (MonoType::Set(el1), MonoType::Set(el2)) => {
            Ok(Unification::eqs(vec![(*el1.clone(), *el2.clone())]))
        }

        (MonoType::Fn(params1, ret1), MonoType::Fn(params2, ret2)) => {
            if params1.len() != params2.len() {
                return Err(TypeError::mismatch(t1, t2));
            }
            let mut eqs: Vec<TypeEq> = params1.iter().cloned().zip(params2.iter().cloned()).collect();
            eqs.push((*ret1.clone(), *ret2.clone()));
            Ok(Unification::eqs(eqs))
        }

        (MonoType::Record(row1), MonoType::Record(row2)) => {
            let (type_eqs, record_eqs) = unify_rows(row1, row2, t1, t2)?;
            Ok(Unification {
                type_eqs,
                record_eqs,
                ..Unification::default()
            })
        }

        (MonoType::Variant(row1), MonoType::Variant(row2)) => {
            let (type_eqs, variant_eqs) = unify_rows(row1, row2, t1, t2)?;
            Ok(Unification {
                type_eqs,
                variant_eqs,
                ..Unification::default()
            })
        }

        (MonoType::Alias(alias, params), _) => {
            Ok(Unification::eqs(vec![(alias.expand(params), t2.clone())]))
        }

        (MonoType::Bool, MonoType::Bool)
        | (MonoType::Str, MonoType::Str)
        | (MonoType::Int, MonoType::Int)
        | (MonoType::BigInt, MonoType::BigInt)
        | (MonoType::Float, MonoType::Float)
        | (MonoType::BigFloat, MonoType::BigFloat)
        | (MonoType::Symbol, MonoType::Symbol)
        | (MonoType::QualifiedSymbol, MonoType::QualifiedSymbol) => Ok(Unification::default()),

        _ => Err(TypeError::mismatch(t1, t2)),
    }
}

/// Keys of `from` that `into` lacks, which `into`'s row variable has to take on.
fn missing_keys<K: RowLabel>(
    from: &RowType<K>,
    into: &RowType<K>,
    t1: &MonoType,
    t2: &MonoType,
) -> Result<BTreeMap<K, RowKey>, TypeError> {
    let extra: BTreeMap<K, RowKey> = from
        .keys
        .iter()
        .filter(|(key, _)| !into.contains(key))
        .map(|(key, row_key)| (key.clone(), row_key.clone()))
        .collect();

    if !extra.is_empty() && !into.row_var.open {
        return Err(TypeError::ExtraKeys {
            keys: extra.keys().map(|key| key.sym().clone()).collect(),
            left: t1.clone(),
            right: t2.clone(),
        });
    }
    Ok(extra)
}

fn unify_rows<K: RowLabel>(
    row1: &RowType<K>,
    row2: &RowType<K>,
    t1: &MonoType,
    t2: &MonoType,
) -> Result<(Vec<TypeEq>, RowMapping<K>), TypeError> {
    let type_eqs: Vec<TypeEq> = row1
        .keys
        .iter()
        .filter_map(|(key, row_key)| row2.keys.get(key).map(|other| (row_key, other)))
        .flat_map(|(a, b)| {
            a.type_params
                .iter()
                .cloned()
                .zip(b.type_params.iter().cloned())
        })
        .collect();

    let extra1 = missing_keys(row2, row1, t1, t2)?;
    let extra2 = missing_keys(row1, row2, t1, t2)?;

    if row1.row_var == row2.row_var {
        // one row variable cannot stand for two different key sets
        if !extra1.is_empty() || !extra2.is_empty() {
            return Err(TypeError::mismatch(t1, t2));
        }
        return Ok((type_eqs, RowMapping::new()));
    }

    let row_var = RowVar::fresh(row1.row_var.open && row2.row_var.open);
    debug!(
        "extending rows {} and {} into {row_var}",
        row1.row_var, row2.row_var
    );

    let mut rows = RowMapping::new();
    rows.insert(
        row1.row_var,
        RowExtension {
            extra_keys: extra1,
            row_var,
        },
    );
    rows.insert(
        row2.row_var,
        RowExtension {
            extra_keys: extra2,
            row_var,
        },
    );
    Ok((type_eqs, rows))
}

/// Puts a type variable on the left if there is one, otherwise an alias.
fn orient(t1: MonoType, t2: MonoType) -> TypeEq {
    let rank = |t: &MonoType| match t {
        MonoType::TypeVar(_) => 0,
        MonoType::Alias(..) => 1,
        _ => 2,
    };
    if rank(&t2) < rank(&t1) {
        (t2, t1)
    } else {
        (t1, t2)
    }
}

/// Solves a set of equations, returning the most general mapping that
/// satisfies all of them.
///
/// Works through a queue. Each step either binds a type variable or breaks
/// an equation into smaller ones plus row extensions; the step is then
/// applied to what is left in the queue and composed into the result.
pub fn unify_eqs(eqs: Vec<TypeEq>) -> Result<Mapping, TypeError> {
    let mut queue: VecDeque<TypeEq> = eqs.into();
    let mut mapping = Mapping::empty();

    while let Some((t1, t2)) = queue.pop_front() {
        let (t1, t2) = orient(t1, t2);

        if t1 == t2 {
            continue;
        }

        trace!("unifying {t1} ~ {t2}");

        let step = match &t1 {
            MonoType::TypeVar(var) => {
                if t2.occurs(*var) {
                    debug!("occurs check failed: {var} in {t2}");
                    return Err(TypeError::OccursCheck { var: *var, ty: t2 });
                }
                debug!("binding {var} := {t2}");
                Mapping::singleton(*var, t2)
            }
            _ => {
                let unification = unify_eq(&t1, &t2)?;
                queue.extend(unification.type_eqs);
                Mapping::from_rows(unification.record_eqs, unification.variant_eqs)
            }
        };

        if step.is_empty() {
            continue;
        }

        for (left, right) in queue.iter_mut() {
            *left = left.apply_mapping(&step);
            *right = right.apply_mapping(&step);
        }
        mapping = mapping.apply_mapping(&step);
    }

    Ok(mapping)
}
