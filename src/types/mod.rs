pub mod decl;
pub mod env;
pub mod error;
pub mod infer;
pub mod subst;
pub mod ty;
pub mod unify;
pub mod validate;

pub use decl::{EffectVar, PolyVar, QSymbol, RecordKey, RowLabel, TypeAlias, VariantKey};
pub use env::{Instantiator, MonoEnv};
pub use error::TypeError;
pub use infer::{Typing, infer_type, infer_typing};
pub use subst::{Mapping, RowExtension, RowMapping};
pub use ty::{MonoType, PolyConstraint, RowKey, RowType, RowVar, Type, TypeVar};
pub use unify::{TypeEq, Unification, unify_eq, unify_eqs};
pub use validate::{ValidationError, validate_top_level};
