//! Declarations the resolver hands to the type checker.
//!
//! Record keys, variant keys and type aliases are identified by the place
//! they were declared, not by their name: two namespaces may both declare a
//! `:foo` key and the two keys never unify. Each declaration gets an id from
//! a process-wide counter when it is created and is shared through an `Arc`,
//! so cloning a key is cheap and comparing two keys is an integer compare.

use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering as AtomicOrdering};

use smol_str::SmolStr;

use super::subst::Mapping;
use super::ty::{MonoType, PolyConstraint, RowKey, RowVar, Type, TypeVar};

static NEXT_DECL_ID: AtomicU64 = AtomicU64::new(0);

fn next_decl_id() -> u64 {
    NEXT_DECL_ID.fetch_add(1, AtomicOrdering::Relaxed)
}

/// A namespace-qualified symbol, e.g. `user/count`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QSymbol {
    pub ns: SmolStr,
    pub name: SmolStr,
}

impl QSymbol {
    pub fn new(ns: impl Into<SmolStr>, name: impl Into<SmolStr>) -> Self {
        QSymbol {
            ns: ns.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for QSymbol {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}/{}", self.ns, self.name)
    }
}

/// A key that can label an entry of a row: record fields and variant cases.
pub trait RowLabel: Clone + Ord + Hash + fmt::Debug {
    fn sym(&self) -> &QSymbol;
    fn type_vars(&self) -> &[TypeVar];

    /// The row entry for this key with its declared type variables as
    /// parameters.
    fn row_key(&self) -> RowKey {
        RowKey::new(self.type_vars().iter().map(|v| MonoType::TypeVar(*v)).collect())
    }
}

#[derive(Debug)]
struct RecordKeyDecl {
    id: u64,
    sym: QSymbol,
    type_vars: Vec<TypeVar>,
    ty: MonoType,
}

/// A record field declaration, e.g. `(:: (:user/count) Int)` or the
/// parametric `(:: (:user/items a) [a])`.
#[derive(Debug, Clone)]
pub struct RecordKey(Arc<RecordKeyDecl>);

impl RecordKey {
    pub fn new(sym: QSymbol, type_vars: Vec<TypeVar>, ty: MonoType) -> Self {
        RecordKey(Arc::new(RecordKeyDecl {
            id: next_decl_id(),
            sym,
            type_vars,
            ty,
        }))
    }

    /// The declared type of the field's value.
    pub fn ty(&self) -> &MonoType {
        &self.0.ty
    }

    /// `(Fn {key ...} field-type)`: reading the key from any record that has it.
    pub fn accessor_type(&self) -> Type {
        let record_type = MonoType::record([(self.clone(), self.row_key())], RowVar::open());
        Type::mono(MonoType::func(vec![record_type], self.ty().clone()))
    }
}

impl RowLabel for RecordKey {
    fn sym(&self) -> &QSymbol {
        &self.0.sym
    }

    fn type_vars(&self) -> &[TypeVar] {
        &self.0.type_vars
    }
}

impl PartialEq for RecordKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for RecordKey {}

impl Hash for RecordKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for RecordKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RecordKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.0.sym, self.0.id).cmp(&(&other.0.sym, other.0.id))
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ":{}", self.0.sym)
    }
}

#[derive(Debug)]
struct VariantKeyDecl {
    id: u64,
    sym: QSymbol,
    type_vars: Vec<TypeVar>,
    param_types: Vec<MonoType>,
}

/// One case of a tagged sum, e.g. `(:: (:user/Just a) a)` or `(:: :user/Nothing)`.
#[derive(Debug, Clone)]
pub struct VariantKey(Arc<VariantKeyDecl>);

impl VariantKey {
    pub fn new(sym: QSymbol, type_vars: Vec<TypeVar>, param_types: Vec<MonoType>) -> Self {
        VariantKey(Arc::new(VariantKeyDecl {
            id: next_decl_id(),
            sym,
            type_vars,
            param_types,
        }))
    }

    pub fn param_types(&self) -> &[MonoType] {
        &self.0.param_types
    }

    /// The open variant itself for nullary keys, otherwise a function from
    /// the declared parameters to it.
    pub fn constructor_type(&self) -> Type {
        let variant_type = MonoType::variant([(self.clone(), self.row_key())], RowVar::open());
        if self.param_types().is_empty() {
            Type::mono(variant_type)
        } else {
            Type::mono(MonoType::func(self.param_types().to_vec(), variant_type))
        }
    }
}

impl RowLabel for VariantKey {
    fn sym(&self) -> &QSymbol {
        &self.0.sym
    }

    fn type_vars(&self) -> &[TypeVar] {
        &self.0.type_vars
    }
}

impl PartialEq for VariantKey {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for VariantKey {}

impl Hash for VariantKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

impl PartialOrd for VariantKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for VariantKey {
    fn cmp(&self, other: &Self) -> Ordering {
        (&self.0.sym, self.0.id).cmp(&(&other.0.sym, other.0.id))
    }
}

impl fmt::Display for VariantKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, ":{}", self.0.sym)
    }
}

#[derive(Debug)]
struct TypeAliasDecl {
    id: u64,
    sym: QSymbol,
    type_vars: Vec<TypeVar>,
    ty: MonoType,
}

/// A named type, `(:: (Pair a) {:fst a :snd a})`. Aliases are only handed
/// out once their body is resolved.
#[derive(Debug, Clone)]
pub struct TypeAlias(Arc<TypeAliasDecl>);

impl TypeAlias {
    pub fn new(sym: QSymbol, type_vars: Vec<TypeVar>, ty: MonoType) -> Self {
        TypeAlias(Arc::new(TypeAliasDecl {
            id: next_decl_id(),
            sym,
            type_vars,
            ty,
        }))
    }

    pub fn sym(&self) -> &QSymbol {
        &self.0.sym
    }

    /// The alias body with its declared type variables replaced by `params`.
    pub fn expand(&self, params: &[MonoType]) -> MonoType {
        let mapping = Mapping::from_types(
            self.0
                .type_vars
                .iter()
                .copied()
                .zip(params.iter().cloned()),
        );
        self.0.ty.apply_mapping(&mapping)
    }
}

impl PartialEq for TypeAlias {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for TypeAlias {}

impl Hash for TypeAlias {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

/// An effect declaration, e.g. `(defx io/println (Fn Str Str))`.
#[derive(Debug, Clone)]
pub struct EffectVar {
    pub sym: QSymbol,
    pub ty: Type,
}

impl EffectVar {
    pub fn new(sym: QSymbol, ty: Type) -> Self {
        EffectVar { sym, ty }
    }

    /// Referencing an effect requires the effect itself on top of whatever
    /// its declared type already carries.
    pub fn declared_type(&self) -> Type {
        let mut ty = self.ty.clone();
        ty.effects.insert(self.sym.clone());
        ty
    }
}

/// An ad-hoc polymorphic definition: one name, one implementation per
/// instantiation of `poly_type_var`.
#[derive(Debug, Clone)]
pub struct PolyVar {
    pub sym: QSymbol,
    pub poly_type_var: TypeVar,
    pub ty: Type,
}

impl PolyVar {
    pub fn new(sym: QSymbol, poly_type_var: TypeVar, ty: Type) -> Self {
        PolyVar {
            sym,
            poly_type_var,
            ty,
        }
    }

    pub fn declared_type(&self) -> Type {
        let mut ty = self.ty.clone();
        ty.poly_constraints.insert(PolyConstraint::new(
            self.sym.clone(),
            vec![MonoType::TypeVar(self.poly_type_var)],
            vec![],
        ));
        ty
    }
}
