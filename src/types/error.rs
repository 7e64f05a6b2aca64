//! # Type Error Definitions
//!
//! Errors raised while inferring the type of a core expression:
//!
//! - two types cannot be made equal (`UnificationError`, `OccursCheck`)
//! - a row would have to gain keys it cannot take (`ExtraKeys`) or a record
//!   literal omits keys its expected type requires (`MissingKeys`)
//! - a call targets something that is not a function (`ExpectedFunction`)
//!   or passes the wrong number of arguments (`ArityError`)
//! - a case clause binds a different number of values than its variant key
//!   declares (`CaseArity`)
//!
//! Every error is terminal for the current inference run. Errors carry the
//! offending types and expressions as data; attaching source locations is
//! left to the caller.

use thiserror::Error;

use super::decl::QSymbol;
use super::ty::{MonoType, TypeVar};
use crate::core::CoreExpr;

#[derive(Debug, Clone, Error)]
pub enum TypeError {
    #[error("cannot unify {left} with {right}")]
    UnificationError { left: MonoType, right: MonoType },

    #[error("cannot construct infinite type: {var} = {ty}")]
    OccursCheck { var: TypeVar, ty: MonoType },

    #[error("expected a function, found {ty}")]
    ExpectedFunction { expr: Box<CoreExpr>, ty: MonoType },

    #[error("{fn_type} called with {} argument(s)", .args.len())]
    ArityError {
        fn_type: MonoType,
        args: Vec<CoreExpr>,
    },

    #[error("record literal is missing keys: {}", join_syms(.keys))]
    MissingKeys { keys: Vec<QSymbol> },

    #[error("cannot unify {left} with {right}: unexpected keys {}", join_syms(.keys))]
    ExtraKeys {
        keys: Vec<QSymbol>,
        left: MonoType,
        right: MonoType,
    },

    #[error("case clause for {key} binds {found} value(s), expected {expected}")]
    CaseArity {
        key: QSymbol,
        expected: usize,
        found: usize,
    },
}

impl TypeError {
    pub fn mismatch(left: &MonoType, right: &MonoType) -> Self {
        TypeError::UnificationError {
            left: left.clone(),
            right: right.clone(),
        }
    }

    pub fn expected_function(expr: &CoreExpr, ty: MonoType) -> Self {
        TypeError::ExpectedFunction {
            expr: Box::new(expr.clone()),
            ty,
        }
    }
}

fn join_syms(syms: &[QSymbol]) -> String {
    syms.iter()
        .map(|sym| format!(":{sym}"))
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mismatch_display() {
        let err = TypeError::mismatch(&MonoType::Int, &MonoType::Str);
        assert_eq!(err.to_string(), "cannot unify Int with Str");
    }

    #[test]
    fn test_occurs_check_display() {
        let var = TypeVar::fresh();
        let err = TypeError::OccursCheck {
            var,
            ty: MonoType::vector(MonoType::TypeVar(var)),
        };
        assert!(err.to_string().contains("infinite type"));
    }

    #[test]
    fn test_missing_keys_display() {
        let err = TypeError::MissingKeys {
            keys: vec![QSymbol::new("user", "name"), QSymbol::new("user", "age")],
        };
        assert_eq!(
            err.to_string(),
            "record literal is missing keys: :user/name :user/age"
        );
    }

    #[test]
    fn test_arity_display() {
        let err = TypeError::ArityError {
            fn_type: MonoType::func(vec![MonoType::Int], MonoType::Int),
            args: vec![CoreExpr::Int(1), CoreExpr::Int(2)],
        };
        assert_eq!(err.to_string(), "(Fn Int Int) called with 2 argument(s)");
    }
}
