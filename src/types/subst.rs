use std::collections::{BTreeMap, HashMap};

use super::decl::{RecordKey, RowLabel, VariantKey};
use super::ty::{MonoType, PolyConstraint, RowKey, RowType, RowVar, Type, TypeVar};

/// Keys a row gained and the row variable that now stands for the rest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowExtension<K> {
    pub extra_keys: BTreeMap<K, RowKey>,
    pub row_var: RowVar,
}

pub type RowMapping<K> = HashMap<RowVar, RowExtension<K>>;

/// A substitution for type variables and for both kinds of row variable.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Mapping {
    pub type_mapping: HashMap<TypeVar, MonoType>,
    pub record_mapping: RowMapping<RecordKey>,
    pub variant_mapping: RowMapping<VariantKey>,
}

impl Mapping {
    pub fn empty() -> Self {
        Mapping::default()
    }

    pub fn singleton(var: TypeVar, ty: MonoType) -> Self {
        Self::from_types([(var, ty)])
    }

    pub fn from_types(bindings: impl IntoIterator<Item = (TypeVar, MonoType)>) -> Self {
        Mapping {
            type_mapping: bindings.into_iter().collect(),
            ..Mapping::default()
        }
    }

    pub fn from_rows(
        record_mapping: RowMapping<RecordKey>,
        variant_mapping: RowMapping<VariantKey>,
    ) -> Self {
        Mapping {
            type_mapping: HashMap::new(),
            record_mapping,
            variant_mapping,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.type_mapping.is_empty()
            && self.record_mapping.is_empty()
            && self.variant_mapping.is_empty()
    }

    /// Composes `self` followed by `other`:
    /// `t.apply_mapping(self).apply_mapping(other) == t.apply_mapping(&self.apply_mapping(other))`.
    ///
    /// Variables bound by `self` keep their (rewritten) binding; `other` only
    /// contributes bindings for variables `self` leaves alone.
    pub fn apply_mapping(&self, other: &Mapping) -> Mapping {
        let mut type_mapping: HashMap<TypeVar, MonoType> = self
            .type_mapping
            .iter()
            .map(|(var, ty)| (*var, ty.apply_mapping(other)))
            .collect();
        for (var, ty) in &other.type_mapping {
            type_mapping.entry(*var).or_insert_with(|| ty.clone());
        }

        Mapping {
            type_mapping,
            record_mapping: compose_rows(&self.record_mapping, &other.record_mapping),
            variant_mapping: compose_rows(&self.variant_mapping, &other.variant_mapping),
        }
    }
}

fn compose_rows<K: RowLabel>(this: &RowMapping<K>, other: &RowMapping<K>) -> RowMapping<K> {
    let mut rows: RowMapping<K> = this
        .iter()
        .map(|(row_var, ext)| {
            let ext = match other.get(&ext.row_var) {
                Some(more) => {
                    let mut extra_keys = ext.extra_keys.clone();
                    extra_keys.extend(more.extra_keys.iter().map(|(k, v)| (k.clone(), v.clone())));
                    RowExtension {
                        extra_keys,
                        row_var: more.row_var,
                    }
                }
                None => ext.clone(),
            };
            (*row_var, ext)
        })
        .collect();
    for (row_var, ext) in other {
        rows.entry(*row_var).or_insert_with(|| ext.clone());
    }
    rows
}

impl<K: RowLabel> RowType<K> {
    /// Merges in the keys the row variable was extended with, if any, and
    /// moves the row onto the replacement variable.
    pub fn apply_row_mapping(&self, rows: &RowMapping<K>) -> RowType<K> {
        match rows.get(&self.row_var) {
            Some(ext) => {
                let mut keys = self.keys.clone();
                keys.extend(ext.extra_keys.iter().map(|(k, v)| (k.clone(), v.clone())));
                RowType::new(keys, ext.row_var)
            }
            None => self.clone(),
        }
    }
}

impl MonoType {
    pub fn apply_mapping(&self, mapping: &Mapping) -> MonoType {
        match self {
            MonoType::TypeVar(var) => mapping
                .type_mapping
                .get(var)
                .cloned()
                .unwrap_or_else(|| self.clone()),
            MonoType::Record(row) => {
                MonoType::Record(row.apply_row_mapping(&mapping.record_mapping))
                    .fmap(|t| t.apply_mapping(mapping))
            }
            MonoType::Variant(row) => {
                MonoType::Variant(row.apply_row_mapping(&mapping.variant_mapping))
                    .fmap(|t| t.apply_mapping(mapping))
            }
            _ => self.fmap(|t| t.apply_mapping(mapping)),
        }
    }
}

impl PolyConstraint {
    pub fn apply_mapping(&self, mapping: &Mapping) -> PolyConstraint {
        self.fmap(|t| t.apply_mapping(mapping))
    }
}

impl Type {
    pub fn apply_mapping(&self, mapping: &Mapping) -> Type {
        Type::new(
            self.mono_type.apply_mapping(mapping),
            self.poly_constraints
                .iter()
                .map(|c| c.apply_mapping(mapping))
                .collect(),
            self.effects.clone(),
        )
    }
}
