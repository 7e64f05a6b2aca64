use std::collections::{BTreeMap, BTreeSet, HashSet};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use super::decl::{QSymbol, RecordKey, RowLabel, TypeAlias, VariantKey};

static NEXT_VAR_ID: AtomicU64 = AtomicU64::new(0);

/// Type and row variables share one counter, so an id is never reused
/// within a process, whichever thread allocated it.
fn next_var_id() -> u64 {
    NEXT_VAR_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TypeVar {
    pub id: u64,
}

impl TypeVar {
    pub fn fresh() -> Self {
        TypeVar { id: next_var_id() }
    }
}

impl fmt::Display for TypeVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "tv{}", self.id)
    }
}

/// The remainder of a record's fields or a variant's cases.
///
/// A closed row holds exactly the keys listed next to it; an open row may
/// still be extended by unification. Identity is the id alone.
#[derive(Debug, Clone, Copy)]
pub struct RowVar {
    pub id: u64,
    pub open: bool,
}

impl RowVar {
    pub fn fresh(open: bool) -> Self {
        RowVar {
            id: next_var_id(),
            open,
        }
    }

    pub fn open() -> Self {
        Self::fresh(true)
    }

    pub fn closed() -> Self {
        Self::fresh(false)
    }
}

impl PartialEq for RowVar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for RowVar {}

impl Hash for RowVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for RowVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "r{}{}", self.id, if self.open { "*" } else { "" })
    }
}

/// Type parameters bound for one appearance of a key in a row.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct RowKey {
    pub type_params: Vec<MonoType>,
}

impl RowKey {
    pub fn new(type_params: Vec<MonoType>) -> Self {
        RowKey { type_params }
    }

    pub fn fmap<F>(&self, f: &mut F) -> RowKey
    where
        F: FnMut(&MonoType) -> MonoType,
    {
        RowKey {
            type_params: self.type_params.iter().map(|t| f(t)).collect(),
        }
    }
}

/// Keys known to be present (records) or possible (variants), plus the row
/// variable standing for everything else.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RowType<K> {
    pub keys: BTreeMap<K, RowKey>,
    pub row_var: RowVar,
}

impl<K: RowLabel> RowType<K> {
    pub fn new(keys: BTreeMap<K, RowKey>, row_var: RowVar) -> Self {
        RowType { keys, row_var }
    }

    pub fn fmap<F>(&self, f: &mut F) -> RowType<K>
    where
        F: FnMut(&MonoType) -> MonoType,
    {
        RowType {
            keys: self
                .keys
                .iter()
                .map(|(key, row_key)| (key.clone(), row_key.fmap(&mut *f)))
                .collect(),
            row_var: self.row_var,
        }
    }

    pub fn contains(&self, key: &K) -> bool {
        self.keys.contains_key(key)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MonoType {
    Bool,
    Str,
    Int,
    BigInt,
    Float,
    BigFloat,
    Symbol,
    QualifiedSymbol,
    TypeVar(TypeVar),
    Vector(Box<MonoType>),
    Set(Box<MonoType>),
    Fn(Vec<MonoType>, Box<MonoType>),
    Record(RowType<RecordKey>),
    Variant(RowType<VariantKey>),
    Alias(TypeAlias, Vec<MonoType>),
}

impl MonoType {
    pub fn fresh_var() -> Self {
        MonoType::TypeVar(TypeVar::fresh())
    }

    pub fn vector(el: MonoType) -> Self {
        MonoType::Vector(Box::new(el))
    }

    pub fn set(el: MonoType) -> Self {
        MonoType::Set(Box::new(el))
    }

    pub fn func(params: Vec<MonoType>, ret: MonoType) -> Self {
        MonoType::Fn(params, Box::new(ret))
    }

    pub fn record(keys: impl IntoIterator<Item = (RecordKey, RowKey)>, row_var: RowVar) -> Self {
        MonoType::Record(RowType::new(keys.into_iter().collect(), row_var))
    }

    pub fn variant(keys: impl IntoIterator<Item = (VariantKey, RowKey)>, row_var: RowVar) -> Self {
        MonoType::Variant(RowType::new(keys.into_iter().collect(), row_var))
    }

    /// Applies `f` once to every immediate sub-type.
    pub fn fmap<F>(&self, mut f: F) -> MonoType
    where
        F: FnMut(&MonoType) -> MonoType,
    {
        match self {
            MonoType::Vector(el) => MonoType::Vector(Box::new(f(el))),
            MonoType::Set(el) => MonoType::Set(Box::new(f(el))),
            MonoType::Fn(params, ret) => {
                let params = params.iter().map(&mut f).collect();
                MonoType::Fn(params, Box::new(f(ret)))
            }
            MonoType::Record(row) => MonoType::Record(row.fmap(&mut f)),
            MonoType::Variant(row) => MonoType::Variant(row.fmap(&mut f)),
            MonoType::Alias(alias, params) => {
                MonoType::Alias(alias.clone(), params.iter().map(&mut f).collect())
            }
            MonoType::Bool
            | MonoType::Str
            | MonoType::Int
            | MonoType::BigInt
            | MonoType::Float
            | MonoType::BigFloat
            | MonoType::Symbol
            | MonoType::QualifiedSymbol
            | MonoType::TypeVar(_) => self.clone(),
        }
    }

    pub fn occurs(&self, var: TypeVar) -> bool {
        match self {
            MonoType::TypeVar(v) => *v == var,
            MonoType::Vector(el) | MonoType::Set(el) => el.occurs(var),
            MonoType::Fn(params, ret) => params.iter().any(|p| p.occurs(var)) || ret.occurs(var),
            MonoType::Record(row) => row_occurs(row, var),
            MonoType::Variant(row) => row_occurs(row, var),
            MonoType::Alias(_, params) => params.iter().any(|p| p.occurs(var)),
            _ => false,
        }
    }
}

fn row_occurs<K>(row: &RowType<K>, var: TypeVar) -> bool {
    row.keys
        .values()
        .any(|row_key| row_key.type_params.iter().any(|t| t.occurs(var)))
}

impl fmt::Display for MonoType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            MonoType::Bool => write!(f, "Bool"),
            MonoType::Str => write!(f, "Str"),
            MonoType::Int => write!(f, "Int"),
            MonoType::BigInt => write!(f, "BigInt"),
            MonoType::Float => write!(f, "Float"),
            MonoType::BigFloat => write!(f, "BigFloat"),
            MonoType::Symbol => write!(f, "Symbol"),
            MonoType::QualifiedSymbol => write!(f, "QSymbol"),
            MonoType::TypeVar(var) => write!(f, "{var}"),
            MonoType::Vector(el) => write!(f, "[{el}]"),
            MonoType::Set(el) => write!(f, "#{{{el}}}"),
            MonoType::Fn(params, ret) => {
                write!(f, "(Fn")?;
                for param in params {
                    write!(f, " {param}")?;
                }
                write!(f, " {ret})")
            }
            MonoType::Record(row) => {
                write!(f, "{{")?;
                for (i, key) in row.keys.keys().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, ":{}", key.sym())?;
                }
                if row.row_var.open {
                    write!(f, "{}...", if row.keys.is_empty() { "" } else { " " })?;
                }
                write!(f, "}}")
            }
            MonoType::Variant(row) => {
                write!(f, "(+")?;
                for (key, row_key) in &row.keys {
                    if row_key.type_params.is_empty() {
                        write!(f, " :{}", key.sym())?;
                    } else {
                        write!(f, " (:{}", key.sym())?;
                        for param in &row_key.type_params {
                            write!(f, " {param}")?;
                        }
                        write!(f, ")")?;
                    }
                }
                if row.row_var.open {
                    write!(f, " ...")?;
                }
                write!(f, ")")
            }
            MonoType::Alias(alias, params) if params.is_empty() => write!(f, "{}", alias.sym()),
            MonoType::Alias(alias, params) => {
                write!(f, "({}", alias.sym())?;
                for param in params {
                    write!(f, " {param}")?;
                }
                write!(f, ")")
            }
        }
    }
}

/// An obligation that `sym` has an implementation for the given types.
/// Resolved outside the inference engine.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PolyConstraint {
    pub sym: QSymbol,
    pub primary: Vec<MonoType>,
    pub secondary: Vec<MonoType>,
}

impl PolyConstraint {
    pub fn new(sym: QSymbol, primary: Vec<MonoType>, secondary: Vec<MonoType>) -> Self {
        PolyConstraint {
            sym,
            primary,
            secondary,
        }
    }

    pub fn fmap<F>(&self, mut f: F) -> PolyConstraint
    where
        F: FnMut(&MonoType) -> MonoType,
    {
        PolyConstraint {
            sym: self.sym.clone(),
            primary: self.primary.iter().map(&mut f).collect(),
            secondary: self.secondary.iter().map(&mut f).collect(),
        }
    }
}

impl fmt::Display for PolyConstraint {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "({}", self.sym)?;
        for t in self.primary.iter().chain(&self.secondary) {
            write!(f, " {t}")?;
        }
        write!(f, ")")
    }
}

/// The type of an expression as seen from outside: its mono type plus the
/// obligations and unhandled effects it carries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Type {
    pub mono_type: MonoType,
    pub poly_constraints: HashSet<PolyConstraint>,
    pub effects: BTreeSet<QSymbol>,
}

impl Type {
    pub fn new(
        mono_type: MonoType,
        poly_constraints: HashSet<PolyConstraint>,
        effects: BTreeSet<QSymbol>,
    ) -> Self {
        Type {
            mono_type,
            poly_constraints,
            effects,
        }
    }

    pub fn mono(mono_type: MonoType) -> Self {
        Self::new(mono_type, HashSet::new(), BTreeSet::new())
    }

    pub fn with_effects(mono_type: MonoType, effects: impl IntoIterator<Item = QSymbol>) -> Self {
        Self::new(mono_type, HashSet::new(), effects.into_iter().collect())
    }
}

impl fmt::Display for Type {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.effects.is_empty() {
            return write!(f, "{}", self.mono_type);
        }
        write!(f, "(! {} #{{", self.mono_type)?;
        for (i, effect) in self.effects.iter().enumerate() {
            if i > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{effect}")?;
        }
        write!(f, "}})")
    }
}
