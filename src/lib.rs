//! # Rowcheck - Type Inference for a Lisp with Open Records, Variants and Effects
//!
//! Rowcheck is the static type checker of a small Lisp-family language. It takes
//! an expression whose names have already been resolved and infers its principal
//! type, the ad-hoc polymorphism obligations it leaves open, and the effects it
//! may perform without a handler.
//!
//! ## Pipeline Position
//!
//! ```text
//! Source Code (String)
//!     ↓
//! [Reader + Analyser] → Core Expression (core::CoreExpr)       (outside this crate)
//!     ↓
//! [Type Checker] → types::Type { mono_type, poly_constraints, effects }
//!     ↓
//! [Evaluator]                                                   (outside this crate)
//! ```
//!
//! ## Key Design Decisions
//!
//! ### Constraint Collection, Then Solving
//! Each expression form produces a typing bottom-up: a candidate type plus the
//! types it demands of its free locals. A parent gathers its children's typings
//! and the equations its own rule adds and solves them all in one unification
//! pass, so the same local used in two siblings is reconciled in one place.
//!
//! ### Row Polymorphism
//! Records and variants carry a row variable besides their known keys:
//! - `{:user/count ...}` is any record with at least a `count` field
//! - `{:user/count}` is exactly that record
//! - `(+ :user/Just :user/Nothing)` is a variant that can only be one of the two
//!
//! Unifying two rows extends each side with the keys the other has. A closed
//! row refuses to grow, which is how record literals and `case` without a
//! default get checked.
//!
//! ### Effects
//! Effects are tracked as a set of symbols. Referencing an effect adds it;
//! `with-fx` installs implementations and removes the effects they handle.
//!
//! ## Module Structure
//!
//! - [`core`] - Resolved expression tree and local/global variable identities
//! - [`types`] - Type representation, unification and inference
//!
//! ## Getting Started
//!
//! 1. Build a [`core::CoreExpr`] (normally the analyser's job)
//! 2. Infer it with [`infer_type()`]
//! 3. Or use [`types::validate_top_level()`] to also reject free locals and
//!    unhandled effects

pub mod core;
pub mod types;

pub use types::infer_type;
