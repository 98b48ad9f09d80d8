//! # xrpc-validation: Structural Validation Engine
//!
//! Field validators are built by chaining rule calls on a typed builder:
//!
//! ```rust,ignore
//! use xrpc_validation::{number, string, Validator};
//!
//! let v = Validator::new()
//!     .field("skip", number().min(0).required())
//!     .field("title", string().min_length(10).required());
//! ```
//!
//! ## Semantics
//!
//! - Rules are keyed by name. Re-adding a rule replaces it in place, so
//!   repeated configuration never grows the chain.
//! - `required()` also enables `type_check()`.
//! - `email()` only takes effect when `required()` was configured first.
//! - "Required" and "TypeCheck" see the raw (possibly absent) value. Every
//!   other rule sees the extracted primitive and is skipped when the value is
//!   absent, so bounds never run on a missing optional field.
//! - The record [`Validator`] keys messages by serialization alias.

pub mod kind;
pub mod rule;
pub mod validator;

pub use kind::{FloatKind, IntKind, JsonKind, Kind, StringKind};
pub use rule::{FieldRules, Rule, RuleSet};
pub use validator::{FieldErrors, FieldValidator, Validator};

/// Rules for a string field.
pub type StringValidator = FieldRules<StringKind>;
/// Rules for an integer field.
pub type NumberValidator = FieldRules<IntKind>;
/// Rules for a floating point field.
pub type FloatValidator = FieldRules<FloatKind>;
/// Rules for a JSON document field.
pub type JsonValidator = FieldRules<JsonKind>;

/// Start a string field validator.
pub fn string() -> StringValidator {
    FieldRules::new()
}

/// Start an integer field validator.
pub fn number() -> NumberValidator {
    FieldRules::new()
}

/// Alias of [`number`].
pub fn int() -> NumberValidator {
    FieldRules::new()
}

/// Start a float field validator.
pub fn float() -> FloatValidator {
    FieldRules::new()
}

/// Start a JSON document field validator.
pub fn json() -> JsonValidator {
    FieldRules::new()
}
