//! # Shape Descriptors
//!
//! Structural descriptions of procedure input and output types. A
//! [`TypeDescriptor`] is produced once per type from its [`Shape`]
//! implementation and is immutable afterwards.
//!
//! ## Invariants
//!
//! - An array-shaped descriptor has an empty field list and a non-empty
//!   `array` describing the element type.
//! - A record descriptor has `array == None`.
//! - `Option<T>` and `serde_json::Value` are nillable; `Option` unwraps one
//!   level, so a field of type `Option<i64>` is described as `i64`, nillable.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet, VecDeque};
use std::sync::Arc;

use serde::{Deserialize, Serialize};

/// Type name of the sentinel descriptor for shapes with no representation.
pub const NIL_TYPE_NAME: &str = "nil";

/// Structural description of one declared type.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TypeDescriptor {
    /// Declared type name (`ListPostInput`, `i64`, `Vec<Post>`).
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub type_name: String,
    /// One entry per record member, in declaration order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDescriptor>,
    /// Whether a value of this type may be absent.
    #[serde(default)]
    pub nillable: bool,
    /// Element descriptor for sequence shapes.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub array: Option<Box<TypeDescriptor>>,
}

impl TypeDescriptor {
    /// A descriptor without fields or element type.
    pub fn scalar(type_name: impl Into<String>, nillable: bool) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            nillable,
            array: None,
        }
    }

    /// An empty record descriptor; add members with [`TypeDescriptor::field`].
    pub fn record(type_name: impl Into<String>) -> Self {
        Self::scalar(type_name, false)
    }

    /// A sequence descriptor wrapping `element`.
    pub fn array_of(type_name: impl Into<String>, element: TypeDescriptor) -> Self {
        Self {
            type_name: type_name.into(),
            fields: Vec::new(),
            nillable: false,
            array: Some(Box::new(element)),
        }
    }

    /// The sentinel for shapes with no runtime representation.
    pub fn nil() -> Self {
        Self::scalar(NIL_TYPE_NAME, true)
    }

    /// Append a member descriptor.
    pub fn field(mut self, field: FieldDescriptor) -> Self {
        self.fields.push(field);
        self
    }

    /// Mark the descriptor nillable.
    pub fn nillable(mut self) -> Self {
        self.nillable = true;
        self
    }

    /// Whether this descriptor describes a sequence.
    pub fn is_array(&self) -> bool {
        self.array.is_some()
    }

    /// Whether this descriptor may describe a record: anything that is not
    /// a sequence or the nil sentinel. A record may have no members.
    pub fn is_record(&self) -> bool {
        self.array.is_none() && !self.is_nil()
    }

    /// Whether this is the [`TypeDescriptor::nil`] sentinel.
    pub fn is_nil(&self) -> bool {
        self.type_name == NIL_TYPE_NAME && self.fields.is_empty() && self.array.is_none()
    }

    /// Look up a member by its declared name.
    pub fn find_field(&self, name: &str) -> Option<&FieldDescriptor> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// The record type a client should declare for this shape: the element
    /// for sequences, the shape itself otherwise.
    pub fn record_shape(&self) -> &TypeDescriptor {
        match &self.array {
            Some(element) => element.record_shape(),
            None => self,
        }
    }
}

/// Description of one record member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldDescriptor {
    /// Declared member name.
    pub name: String,
    /// Serialization key.
    pub alias: String,
    /// Declared (unwrapped) type name.
    #[serde(rename = "type")]
    pub ty: String,
    /// Whether the member may be absent.
    pub nillable: bool,
}

impl FieldDescriptor {
    /// Describe a member of type `T`.
    pub fn of<T: Shape + ?Sized>(name: impl Into<String>, alias: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            alias: alias.into(),
            ty: T::type_name(),
            nillable: T::nillable(),
        }
    }
}

/// Compile-time shape description of a declared type.
///
/// Records implement this through `#[derive(Shape)]`, which honors
/// `#[serde(rename)]`, `#[serde(rename_all)]` and `#[serde(skip)]` so that
/// aliases always match the wire keys.
pub trait Shape {
    /// Declared type name.
    fn type_name() -> String;

    /// Whether a value of this type may be absent.
    fn nillable() -> bool {
        false
    }

    /// Full descriptor tree.
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::scalar(Self::type_name(), Self::nillable())
    }
}

macro_rules! primitive_shape {
    ($($ty:ty => $name:literal),* $(,)?) => {
        $(
            impl Shape for $ty {
                fn type_name() -> String {
                    $name.to_string()
                }
            }
        )*
    };
}

primitive_shape! {
    String => "String",
    bool => "bool",
    char => "char",
    i8 => "i8",
    i16 => "i16",
    i32 => "i32",
    i64 => "i64",
    i128 => "i128",
    isize => "isize",
    u8 => "u8",
    u16 => "u16",
    u32 => "u32",
    u64 => "u64",
    u128 => "u128",
    usize => "usize",
    f32 => "f32",
    f64 => "f64",
}

impl Shape for () {
    fn type_name() -> String {
        NIL_TYPE_NAME.to_string()
    }

    fn nillable() -> bool {
        true
    }
}

impl Shape for serde_json::Value {
    fn type_name() -> String {
        "Value".to_string()
    }

    fn nillable() -> bool {
        true
    }
}

impl<T: Shape> Shape for Option<T> {
    fn type_name() -> String {
        T::type_name()
    }

    fn nillable() -> bool {
        true
    }

    fn descriptor() -> TypeDescriptor {
        T::descriptor().nillable()
    }
}

impl<T: Shape + ?Sized> Shape for Box<T> {
    fn type_name() -> String {
        T::type_name()
    }

    fn nillable() -> bool {
        T::nillable()
    }

    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}

impl<T: Shape + ?Sized> Shape for Arc<T> {
    fn type_name() -> String {
        T::type_name()
    }

    fn nillable() -> bool {
        T::nillable()
    }

    fn descriptor() -> TypeDescriptor {
        T::descriptor()
    }
}

macro_rules! sequence_shape {
    ($($seq:ident),* $(,)?) => {
        $(
            impl<T: Shape> Shape for $seq<T> {
                fn type_name() -> String {
                    format!("Vec<{}>", T::type_name())
                }

                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::array_of(Self::type_name(), T::descriptor())
                }
            }
        )*
    };
}

sequence_shape!(Vec, VecDeque, BTreeSet, HashSet);

impl<T: Shape> Shape for [T] {
    fn type_name() -> String {
        format!("Vec<{}>", T::type_name())
    }

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array_of(Self::type_name(), T::descriptor())
    }
}

impl<T: Shape, const N: usize> Shape for [T; N] {
    fn type_name() -> String {
        format!("Vec<{}>", T::type_name())
    }

    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::array_of(Self::type_name(), T::descriptor())
    }
}

impl<V: Shape, S> Shape for HashMap<String, V, S> {
    fn type_name() -> String {
        format!("Map<String, {}>", V::type_name())
    }
}

impl<V: Shape> Shape for BTreeMap<String, V> {
    fn type_name() -> String {
        format!("Map<String, {}>", V::type_name())
    }
}
