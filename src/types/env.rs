use std::collections::{HashMap, HashSet};

use super::ty::{MonoType, PolyConstraint, RowKey, RowType, RowVar, Type, TypeVar};
use crate::core::LocalVar;

/// The type each free local variable of an expression is required to have.
pub type MonoEnv = HashMap<LocalVar, MonoType>;

/// Renames declared type and row variables to fresh ones.
///
/// One instantiator covers one use site: every occurrence of a declared
/// variable seen through the same instantiator gets the same replacement,
/// so a polytype's mono type and its constraints stay linked.
#[derive(Debug, Default)]
pub struct Instantiator {
    type_vars: HashMap<TypeVar, TypeVar>,
    row_vars: HashMap<RowVar, RowVar>,
}

impl Instantiator {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn type_var(&mut self, var: TypeVar) -> TypeVar {
        *self.type_vars.entry(var).or_insert_with(TypeVar::fresh)
    }

    fn row_var(&mut self, var: RowVar) -> RowVar {
        *self
            .row_vars
            .entry(var)
            .or_insert_with(|| RowVar::fresh(var.open))
    }

    fn row<K: Clone + Ord>(&mut self, row: &RowType<K>) -> RowType<K> {
        RowType {
            keys: row
                .keys
                .iter()
                .map(|(key, row_key)| (key.clone(), self.row_key(row_key)))
                .collect(),
            row_var: self.row_var(row.row_var),
        }
    }

    pub fn row_key(&mut self, row_key: &RowKey) -> RowKey {
        RowKey::new(row_key.type_params.iter().map(|t| self.mono_type(t)).collect())
    }

    pub fn mono_type(&mut self, ty: &MonoType) -> MonoType {
        match ty {
            MonoType::TypeVar(var) => MonoType::TypeVar(self.type_var(*var)),
            MonoType::Record(row) => MonoType::Record(self.row(row)),
            MonoType::Variant(row) => MonoType::Variant(self.row(row)),
            _ => ty.fmap(|t| self.mono_type(t)),
        }
    }

    pub fn poly_constraints(
        &mut self,
        constraints: &HashSet<PolyConstraint>,
    ) -> HashSet<PolyConstraint> {
        constraints
            .iter()
            .map(|c| c.fmap(|t| self.mono_type(t)))
            .collect()
    }

    /// Instantiates the mono type and constraints; effects carry over as
    /// declared.
    pub fn poly_type(&mut self, ty: &Type) -> Type {
        Type::new(
            self.mono_type(&ty.mono_type),
            self.poly_constraints(&ty.poly_constraints),
            ty.effects.clone(),
        )
    }
}
