//! # Type References
//!
//! Descriptor type names are Rust-flavored strings (`i64`, `Vec<Post>`,
//! `Map<String, f64>`). [`TypeRef`] parses them once so each target can map
//! primitives through its own table and spell containers its own way.
//! Names missing from a table pass through unchanged; they refer to record
//! types declared elsewhere in the generated file.

use xrpc_core::{TypeDescriptor, NIL_TYPE_NAME};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TypeRef {
    Named(String),
    List(Box<TypeRef>),
    Map(Box<TypeRef>),
}

impl TypeRef {
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if let Some(inner) = strip_generic(name, "Vec") {
            return Self::List(Box::new(Self::parse(inner)));
        }
        if let Some(inner) = strip_generic(name, "Map") {
            if let Some((_, value)) = inner.split_once(',') {
                return Self::Map(Box::new(Self::parse(value)));
            }
        }
        Self::Named(name.to_string())
    }

    pub fn typescript(&self) -> String {
        match self {
            Self::Named(name) => ts_primitive(name).map_or_else(|| name.clone(), str::to_string),
            Self::List(inner) => format!("{}[]", inner.typescript()),
            Self::Map(value) => format!("Record<string, {}>", value.typescript()),
        }
    }

    pub fn go(&self) -> String {
        match self {
            Self::Named(name) => go_primitive(name).map_or_else(|| name.clone(), str::to_string),
            Self::List(inner) => format!("[]{}", inner.go()),
            Self::Map(value) => format!("map[string]{}", value.go()),
        }
    }

    /// Whether a Go value of this type is already nillable without a pointer.
    pub fn go_nillable(&self) -> bool {
        match self {
            Self::Named(_) => self.go() == "any",
            Self::List(_) | Self::Map(_) => true,
        }
    }
}

/// How a procedure input or output appears in a client.
#[derive(Debug)]
pub(crate) struct Payload<'a> {
    /// Type expression at the call site.
    pub ty: TypeRef,
    /// Record that must be declared for `ty` to resolve.
    pub record: Option<&'a TypeDescriptor>,
    /// The procedure takes or returns nothing.
    pub nil: bool,
}

impl<'a> Payload<'a> {
    pub fn of(descriptor: &'a TypeDescriptor) -> Self {
        let ty = TypeRef::parse(&descriptor.type_name);
        let shape = descriptor.record_shape();
        let declared = !shape.fields.is_empty()
            || matches!(TypeRef::parse(&shape.type_name), TypeRef::Named(ref name) if ts_primitive(name).is_none() && !name.is_empty());
        Self {
            ty,
            record: declared.then_some(shape),
            nil: descriptor.is_nil(),
        }
    }
}

fn strip_generic<'a>(name: &'a str, head: &str) -> Option<&'a str> {
    name.strip_prefix(head)?
        .strip_prefix('<')?
        .strip_suffix('>')
        .map(str::trim)
}

fn ts_primitive(name: &str) -> Option<&'static str> {
    let ts = match name {
        "String" | "char" => "string",
        "bool" => "boolean",
        "i8" | "i16" | "i32" | "i64" | "i128" | "isize" | "u8" | "u16" | "u32" | "u64"
        | "u128" | "usize" | "f32" | "f64" => "number",
        "Value" => "any",
        NIL_TYPE_NAME => "null",
        _ => return None,
    };
    Some(ts)
}

fn go_primitive(name: &str) -> Option<&'static str> {
    let go = match name {
        "String" => "string",
        "char" => "rune",
        "bool" => "bool",
        "i8" => "int8",
        "i16" => "int16",
        "i32" => "int32",
        "i64" => "int64",
        "isize" => "int",
        "u8" => "uint8",
        "u16" => "uint16",
        "u32" => "uint32",
        "u64" => "uint64",
        "usize" => "uint",
        "i128" | "u128" => "json.Number",
        "f32" => "float32",
        "f64" => "float64",
        "Value" | NIL_TYPE_NAME => "any",
        _ => return None,
    };
    Some(go)
}
