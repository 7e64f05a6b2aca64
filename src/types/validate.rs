use smol_str::SmolStr;
use thiserror::Error;

use super::decl::QSymbol;
use super::error::TypeError;
use super::infer::infer_typing;
use super::ty::Type;
use crate::core::CoreExpr;

/// Checks on an expression about to run at the top level, beyond it
/// merely having a type.
#[derive(Debug, Clone, Error)]
pub enum ValidationError {
    #[error(transparent)]
    Type(#[from] TypeError),

    /// Effects with no enclosing `with-fx` to handle them.
    #[error("unhandled effects: {}", join(.effects))]
    UnhandledEffects { effects: Vec<QSymbol> },

    /// Locals the resolver left free.
    #[error("unbound locals: {}", .locals.join(" "))]
    UnboundLocals { locals: Vec<SmolStr> },
}

fn join(effects: &[QSymbol]) -> String {
    effects
        .iter()
        .map(QSymbol::to_string)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Infers `expr` and rejects it unless it is closed over locals and effects.
/// Poly constraints are left for the caller to resolve.
pub fn validate_top_level(expr: &CoreExpr) -> Result<Type, ValidationError> {
    let typing = infer_typing(expr, None)?;

    if !typing.mono_env.is_empty() {
        let mut locals: Vec<SmolStr> = typing.mono_env.keys().map(|lv| lv.sym.clone()).collect();
        locals.sort();
        return Err(ValidationError::UnboundLocals { locals });
    }

    if !typing.effects.is_empty() {
        return Err(ValidationError::UnhandledEffects {
            effects: typing.effects.into_iter().collect(),
        });
    }

    Ok(typing.into_type())
}
