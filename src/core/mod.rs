//! # Core Expressions - the Resolved Tree the Type Checker Consumes
//!
//! The analyser hands the type checker a tree in which every name has
//! already been resolved:
//!
//! - local variables carry a [`LocalVar`] identity, unique per binding site,
//!   so shadowing and same-named locals in sibling scopes never collide
//! - global variables carry their declaration ([`GlobalVar`]): a plain
//!   definition with a declared [`Type`], an effect, a record key, a variant
//!   key or an ad-hoc polymorphic definition
//!
//! ```text
//! Reader → Forms → Analyser → [CORE EXPR] → Type Checker → Evaluator
//! ```
//!
//! ## Forms
//!
//! ```text
//! true 42 "hi" 'sym 'ns/sym        literals
//! [a b] #{a b}                     vectors, sets
//! {:count 42}                      record literals
//! (if p t e)  (do a b c)           control flow
//! (let [x 4] body)                 local bindings
//! (loop [i 0] ... (recur (inc i))) loops
//! (fn [a b] body)  (f x y)         functions and calls
//! (case v (Just x) x Nothing 0)    variant matches
//! (with-fx [(defx println ...)] e) effect scopes
//! ```
//!
//! Nodes carry no source positions: errors name the offending expression
//! and the caller maps it back to source.

use std::fmt;
use std::hash::{Hash, Hasher};
use std::sync::atomic::{AtomicU64, Ordering};

use smol_str::SmolStr;

use crate::types::{EffectVar, PolyVar, QSymbol, RecordKey, RowLabel, Type, VariantKey};

static NEXT_LOCAL_ID: AtomicU64 = AtomicU64::new(0);

/// A local binding site. Equality is identity: two locals with the same
/// name bound in different places are different locals.
#[derive(Debug, Clone)]
pub struct LocalVar {
    id: u64,
    pub sym: SmolStr,
}

impl LocalVar {
    pub fn new(sym: impl Into<SmolStr>) -> Self {
        LocalVar {
            id: NEXT_LOCAL_ID.fetch_add(1, Ordering::Relaxed),
            sym: sym.into(),
        }
    }
}

impl PartialEq for LocalVar {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for LocalVar {}

impl Hash for LocalVar {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Display for LocalVar {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.sym)
    }
}

/// A top-level definition with its declared type.
#[derive(Debug, Clone)]
pub struct DefVar {
    pub sym: QSymbol,
    pub ty: Type,
}

impl DefVar {
    pub fn new(sym: QSymbol, ty: Type) -> Self {
        DefVar { sym, ty }
    }
}

/// A resolved reference to something declared outside the expression.
#[derive(Debug, Clone)]
pub enum GlobalVar {
    Def(DefVar),
    Effect(EffectVar),
    RecordKey(RecordKey),
    VariantKey(VariantKey),
    Poly(PolyVar),
}

impl GlobalVar {
    pub fn sym(&self) -> &QSymbol {
        match self {
            GlobalVar::Def(def) => &def.sym,
            GlobalVar::Effect(fx) => &fx.sym,
            GlobalVar::RecordKey(key) => key.sym(),
            GlobalVar::VariantKey(key) => key.sym(),
            GlobalVar::Poly(poly) => &poly.sym,
        }
    }

    /// The polytype a reference to this global instantiates.
    pub fn declared_type(&self) -> Type {
        match self {
            GlobalVar::Def(def) => def.ty.clone(),
            GlobalVar::Effect(fx) => fx.declared_type(),
            GlobalVar::RecordKey(key) => key.accessor_type(),
            GlobalVar::VariantKey(key) => key.constructor_type(),
            GlobalVar::Poly(poly) => poly.declared_type(),
        }
    }
}

#[derive(Debug, Clone)]
pub enum CoreExpr {
    Bool(bool),
    Str(String),
    Int(i64),
    /// Arbitrary-precision integer, kept as its decimal digits.
    BigInt(String),
    Float(f64),
    /// Arbitrary-precision decimal, kept as written.
    BigFloat(String),
    Symbol(SmolStr),
    QSymbol(QSymbol),
    Vector(Vec<CoreExpr>),
    Set(Vec<CoreExpr>),
    Record(CoreRecord),
    If(CoreIf),
    Do(CoreDo),
    Let(CoreLet),
    Loop(CoreLet),
    Recur(CoreRecur),
    Fn(CoreFn),
    Call(CoreCall),
    Case(CoreCase),
    WithFx(CoreWithFx),
    LocalVar(LocalVar),
    GlobalVar(GlobalVar),
}

#[derive(Debug, Clone)]
pub struct CoreRecordEntry {
    pub key: RecordKey,
    pub expr: CoreExpr,
}

#[derive(Debug, Clone)]
pub struct CoreRecord {
    pub entries: Vec<CoreRecordEntry>,
}

#[derive(Debug, Clone)]
pub struct CoreIf {
    pub pred: Box<CoreExpr>,
    pub then: Box<CoreExpr>,
    pub otherwise: Box<CoreExpr>,
}

/// Evaluates `exprs` for their effects, then `expr`.
#[derive(Debug, Clone)]
pub struct CoreDo {
    pub exprs: Vec<CoreExpr>,
    pub expr: Box<CoreExpr>,
}

#[derive(Debug, Clone)]
pub struct CoreBinding {
    pub local: LocalVar,
    pub expr: CoreExpr,
}

/// Shared by `let` and `loop`; the loop's bindings are the targets of any
/// `recur` in its body.
#[derive(Debug, Clone)]
pub struct CoreLet {
    pub bindings: Vec<CoreBinding>,
    pub body: Box<CoreExpr>,
}

/// `(recur ...)`, already paired with the loop locals it rebinds.
#[derive(Debug, Clone)]
pub struct CoreRecur {
    pub args: Vec<(LocalVar, CoreExpr)>,
}

#[derive(Debug, Clone)]
pub struct CoreFn {
    pub params: Vec<LocalVar>,
    pub body: Box<CoreExpr>,
}

#[derive(Debug, Clone)]
pub struct CoreCall {
    pub func: Box<CoreExpr>,
    pub args: Vec<CoreExpr>,
}

#[derive(Debug, Clone)]
pub struct CoreCaseClause {
    pub key: VariantKey,
    pub bindings: Vec<LocalVar>,
    pub body: CoreExpr,
}

#[derive(Debug, Clone)]
pub struct CoreCase {
    pub expr: Box<CoreExpr>,
    pub clauses: Vec<CoreCaseClause>,
    pub default: Option<Box<CoreExpr>>,
}

/// One locally installed effect implementation.
#[derive(Debug, Clone)]
pub struct CoreEffectDef {
    pub effect: EffectVar,
    pub expr: CoreExpr,
}

#[derive(Debug, Clone)]
pub struct CoreWithFx {
    pub fx: Vec<CoreEffectDef>,
    pub body: Box<CoreExpr>,
}

impl CoreExpr {
    pub fn local(local: &LocalVar) -> Self {
        CoreExpr::LocalVar(local.clone())
    }

    pub fn global(global: GlobalVar) -> Self {
        CoreExpr::GlobalVar(global)
    }

    pub fn record(entries: impl IntoIterator<Item = (RecordKey, CoreExpr)>) -> Self {
        CoreExpr::Record(CoreRecord {
            entries: entries
                .into_iter()
                .map(|(key, expr)| CoreRecordEntry { key, expr })
                .collect(),
        })
    }

    pub fn if_(pred: CoreExpr, then: CoreExpr, otherwise: CoreExpr) -> Self {
        CoreExpr::If(CoreIf {
            pred: Box::new(pred),
            then: Box::new(then),
            otherwise: Box::new(otherwise),
        })
    }

    pub fn do_(exprs: Vec<CoreExpr>, expr: CoreExpr) -> Self {
        CoreExpr::Do(CoreDo {
            exprs,
            expr: Box::new(expr),
        })
    }

    pub fn let_(bindings: Vec<(LocalVar, CoreExpr)>, body: CoreExpr) -> Self {
        CoreExpr::Let(Self::bindings(bindings, body))
    }

    pub fn loop_(bindings: Vec<(LocalVar, CoreExpr)>, body: CoreExpr) -> Self {
        CoreExpr::Loop(Self::bindings(bindings, body))
    }

    fn bindings(bindings: Vec<(LocalVar, CoreExpr)>, body: CoreExpr) -> CoreLet {
        CoreLet {
            bindings: bindings
                .into_iter()
                .map(|(local, expr)| CoreBinding { local, expr })
                .collect(),
            body: Box::new(body),
        }
    }

    pub fn recur(args: Vec<(LocalVar, CoreExpr)>) -> Self {
        CoreExpr::Recur(CoreRecur { args })
    }

    pub fn func(params: Vec<LocalVar>, body: CoreExpr) -> Self {
        CoreExpr::Fn(CoreFn {
            params,
            body: Box::new(body),
        })
    }

    pub fn call(func: CoreExpr, args: Vec<CoreExpr>) -> Self {
        CoreExpr::Call(CoreCall {
            func: Box::new(func),
            args,
        })
    }

    pub fn case(
        expr: CoreExpr,
        clauses: Vec<(VariantKey, Vec<LocalVar>, CoreExpr)>,
        default: Option<CoreExpr>,
    ) -> Self {
        CoreExpr::Case(CoreCase {
            expr: Box::new(expr),
            clauses: clauses
                .into_iter()
                .map(|(key, bindings, body)| CoreCaseClause {
                    key,
                    bindings,
                    body,
                })
                .collect(),
            default: default.map(Box::new),
        })
    }

    pub fn with_fx(fx: Vec<(EffectVar, CoreExpr)>, body: CoreExpr) -> Self {
        CoreExpr::WithFx(CoreWithFx {
            fx: fx
                .into_iter()
                .map(|(effect, expr)| CoreEffectDef { effect, expr })
                .collect(),
            body: Box::new(body),
        })
    }
}
