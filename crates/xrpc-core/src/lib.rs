//! # xrpc-core: Foundational Types for xrpc
//!
//! Every other crate in the workspace depends on `xrpc-core`; it depends on
//! nothing internal except the derive macro it re-exports.
//!
//! ## Contents
//!
//! - [`Shape`]: compile-time description of a declared input/output type.
//!   Implemented for primitives, `Option`, sequences and maps here, and for
//!   user records through `#[derive(Shape)]`.
//! - [`TypeDescriptor`] / [`FieldDescriptor`]: the language-neutral
//!   descriptor tree produced by [`Shape::descriptor`].
//! - [`Spec`]: the service description accumulated at registration time and
//!   persisted as YAML for client generators.
//! - [`join_paths`] / [`normalize_path`]: canonical procedure paths. The
//!   path recorded in the spec is always the path bound on the router.
//!
//! ## Crate Policy
//!
//! - No HTTP types here. Transport concerns live in `xrpc-server`.
//! - Descriptors are built once per type, never per request.
//! - No `panic!()` or `.unwrap()` outside tests.

extern crate self as xrpc_core;

pub mod descriptor;
pub mod error;
pub mod path;
pub mod spec;

pub use descriptor::{FieldDescriptor, Shape, TypeDescriptor, NIL_TYPE_NAME};
pub use error::SpecError;
pub use path::{join_paths, normalize_path};
pub use spec::{ProcedureKind, Spec, SpecProcedure};
pub use xrpc_macros::Shape;
