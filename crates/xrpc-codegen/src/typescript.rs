//! # TypeScript Clients
//!
//! Rendering happens in two steps: the spec is lowered to a list of
//! [`TsNode`]s (imports, interfaces, the query helper, call functions), then
//! each node writes itself through [`Emit`]. Both flavors share the lowering;
//! only the function bodies and the import differ.

use std::collections::BTreeSet;

use xrpc_core::{ProcedureKind, Spec, SpecProcedure, TypeDescriptor};

use crate::naming::pascal_case;
use crate::types::{Payload, TypeRef};

const QUERY_HELPER: &str = "toQueryString";

/// HTTP library the generated functions call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flavor {
    Fetch,
    Ky,
}

/// Mechanical conversion of a node to source text.
pub trait Emit {
    fn emit(&self, out: &mut String);
}

#[derive(Debug, Clone, PartialEq)]
pub enum TsNode {
    Import { default: String, module: String },
    Interface { name: String, fields: Vec<TsField> },
    QueryHelper,
    Function(TsFunction),
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsField {
    pub name: String,
    pub ty: String,
    pub optional: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TsFunction {
    pub name: String,
    /// Type of the single `data` parameter, if any.
    pub param: Option<String>,
    /// Resolved type of the returned promise; `None` is `void`.
    pub returns: Option<String>,
    pub body: Vec<String>,
}

impl Emit for TsNode {
    fn emit(&self, out: &mut String) {
        match self {
            Self::Import { default, module } => {
                out.push_str(&format!("import {default} from \"{module}\";\n"));
            }
            Self::Interface { name, fields } => {
                out.push_str(&format!("export interface {name} {{\n"));
                for field in fields {
                    field.emit(out);
                }
                out.push_str("}\n");
            }
            Self::QueryHelper => {
                out.push_str(&format!(
                    "function {QUERY_HELPER}(data: object): string {{\n"
                ));
                out.push_str("  const params = new URLSearchParams();\n");
                out.push_str("  for (const [key, value] of Object.entries(data)) {\n");
                out.push_str("    if (value !== null && value !== undefined) {\n");
                out.push_str("      params.append(key, String(value));\n");
                out.push_str("    }\n");
                out.push_str("  }\n");
                out.push_str("  return params.toString();\n");
                out.push_str("}\n");
            }
            Self::Function(function) => function.emit(out),
        }
    }
}

impl Emit for TsField {
    fn emit(&self, out: &mut String) {
        let optional = if self.optional { "?" } else { "" };
        out.push_str(&format!(
            "  {}{optional}: {};\n",
            property_name(&self.name),
            self.ty
        ));
    }
}

impl Emit for TsFunction {
    fn emit(&self, out: &mut String) {
        let params = self
            .param
            .as_ref()
            .map(|ty| format!("data: {ty}"))
            .unwrap_or_default();
        let returns = self.returns.as_deref().unwrap_or("void");
        out.push_str(&format!(
            "export async function {}({params}): Promise<{returns}> {{\n",
            self.name
        ));
        for line in &self.body {
            out.push_str("  ");
            out.push_str(line);
            out.push('\n');
        }
        out.push_str("}\n");
    }
}

/// Quote property names that are not plain identifiers.
fn property_name(name: &str) -> String {
    let mut chars = name.chars();
    let plain = chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_' || c == '$')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '$');
    if plain {
        name.to_string()
    } else {
        format!("{name:?}")
    }
}

/// Lower a spec to TypeScript nodes in procedure order.
pub fn lower(spec: &Spec, flavor: Flavor) -> Vec<TsNode> {
    let mut nodes = Vec::new();
    if flavor == Flavor::Ky {
        nodes.push(TsNode::Import {
            default: "ky".to_string(),
            module: "ky".to_string(),
        });
    }
    let needs_helper = spec
        .procedures
        .iter()
        .any(|p| p.kind == ProcedureKind::Query && !p.input.is_nil());
    if needs_helper {
        nodes.push(TsNode::QueryHelper);
    }

    let base = spec.server_url.trim_end_matches('/');
    let mut declared = BTreeSet::new();
    for procedure in &spec.procedures {
        let input = Payload::of(&procedure.input);
        let output = Payload::of(&procedure.output);
        for record in [input.record, output.record].into_iter().flatten() {
            if declared.insert(record.type_name.clone()) {
                nodes.push(interface(record));
            }
        }
        nodes.push(TsNode::Function(function(base, procedure, &input, &output, flavor)));
    }
    nodes
}

fn interface(record: &TypeDescriptor) -> TsNode {
    TsNode::Interface {
        name: record.type_name.clone(),
        fields: record
            .fields
            .iter()
            .map(|field| TsField {
                name: field.alias.clone(),
                ty: TypeRef::parse(&field.ty).typescript(),
                optional: field.nillable,
            })
            .collect(),
    }
}

fn function(
    base: &str,
    procedure: &SpecProcedure,
    input: &Payload<'_>,
    output: &Payload<'_>,
    flavor: Flavor,
) -> TsFunction {
    let param = (!input.nil).then(|| input.ty.typescript());
    let returns = (!output.nil).then(|| output.ty.typescript());
    let url = match procedure.kind {
        ProcedureKind::Query if !input.nil => {
            format!("`{base}{}?${{{QUERY_HELPER}(data)}}`", procedure.path)
        }
        _ => format!("\"{base}{}\"", procedure.path),
    };
    let body = match flavor {
        Flavor::Fetch => fetch_body(procedure.kind, &url, input.nil, returns.is_some()),
        Flavor::Ky => ky_body(procedure.kind, &url, input.nil, returns.as_deref()),
    };
    TsFunction {
        name: pascal_case(&procedure.path),
        param,
        returns,
        body,
    }
}

fn fetch_body(kind: ProcedureKind, url: &str, no_input: bool, has_output: bool) -> Vec<String> {
    let mut body = Vec::new();
    match kind {
        ProcedureKind::Query => body.push(format!("const response = await fetch({url});")),
        ProcedureKind::Mutation => {
            body.push(format!("const response = await fetch({url}, {{"));
            body.push("  method: \"POST\",".to_string());
            body.push("  headers: { \"Content-Type\": \"application/json\" },".to_string());
            if no_input {
                body.push("  body: \"{}\",".to_string());
            } else {
                body.push("  body: JSON.stringify(data),".to_string());
            }
            body.push("});".to_string());
        }
    }
    body.push("if (!response.ok) {".to_string());
    body.push("  throw await response.json();".to_string());
    body.push("}".to_string());
    if has_output {
        body.push("return response.json();".to_string());
    }
    body
}

fn ky_body(kind: ProcedureKind, url: &str, no_input: bool, returns: Option<&str>) -> Vec<String> {
    let call = match kind {
        ProcedureKind::Query => format!("ky.get({url})"),
        ProcedureKind::Mutation if no_input => format!("ky.post({url}, {{ json: {{}} }})"),
        ProcedureKind::Mutation => format!("ky.post({url}, {{ json: data }})"),
    };
    match returns {
        Some(ty) => vec![format!("return await {call}.json<{ty}>();")],
        None => vec![format!("await {call};")],
    }
}

/// Render a complete TypeScript module.
pub fn render(spec: &Spec, flavor: Flavor) -> String {
    let mut out = String::from("// Code generated by xrpc. DO NOT EDIT.\n");
    for node in lower(spec, flavor) {
        out.push('\n');
        node.emit(&mut out);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpc_core::FieldDescriptor;

    fn post() -> TypeDescriptor {
        TypeDescriptor::record("Post")
            .field(FieldDescriptor::of::<i64>("id", "id"))
            .field(FieldDescriptor::of::<String>("title", "title"))
    }

    fn spec() -> Spec {
        let mut spec = Spec::new("Post Service", "http://localhost:9090/");
        spec.push(SpecProcedure {
            path: "/post/list/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::record("ListPostInput")
                .field(FieldDescriptor::of::<Option<i64>>("skip", "skip"))
                .field(FieldDescriptor::of::<Option<i64>>("limit", "limit")),
            output: TypeDescriptor::array_of("Vec<Post>", post()),
        });
        spec.push(SpecProcedure {
            path: "/post/create/".to_string(),
            kind: ProcedureKind::Mutation,
            input: TypeDescriptor::record("CreatePostInput")
                .field(FieldDescriptor::of::<String>("title", "title"))
                .field(FieldDescriptor::of::<String>("author_id", "author-id")),
            output: post(),
        });
        spec.push(SpecProcedure {
            path: "/post/purge/".to_string(),
            kind: ProcedureKind::Mutation,
            input: TypeDescriptor::nil(),
            output: TypeDescriptor::nil(),
        });
        spec
    }

    #[test]
    fn records_are_declared_once_in_order() {
        let names: Vec<_> = lower(&spec(), Flavor::Fetch)
            .into_iter()
            .filter_map(|node| match node {
                TsNode::Interface { name, .. } => Some(name),
                _ => None,
            })
            .collect();
        assert_eq!(names, ["ListPostInput", "Post", "CreatePostInput"]);
    }

    #[test]
    fn fetch_flavor() {
        let source = render(&spec(), Flavor::Fetch);
        assert!(source.starts_with("// Code generated by xrpc. DO NOT EDIT.\n"));
        assert!(!source.contains("import ky"));
        assert!(source.contains("export interface ListPostInput {\n  skip?: number;\n  limit?: number;\n}\n"));
        assert!(source.contains(
            "export async function PostList(data: ListPostInput): Promise<Post[]> {\n  const response = await fetch(`http://localhost:9090/post/list/?${toQueryString(data)}`);\n"
        ));
        assert!(source.contains("  \"author-id\": string;\n"));
        assert!(source.contains("export async function PostPurge(): Promise<void> {"));
        assert_eq!(source.matches("function toQueryString").count(), 1);
    }

    #[test]
    fn ky_flavor() {
        let source = render(&spec(), Flavor::Ky);
        assert!(source.contains("\nimport ky from \"ky\";\n"));
        assert!(source.contains(
            "return await ky.post(\"http://localhost:9090/post/create/\", { json: data }).json<Post>();"
        ));
        assert!(source.contains("  await ky.post(\"http://localhost:9090/post/purge/\", { json: {} });\n"));
    }

    #[test]
    fn helper_omitted_without_query_inputs() {
        let mut spec = Spec::new("Ping", "http://localhost:9090");
        spec.push(SpecProcedure {
            path: "/ping/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::nil(),
            output: TypeDescriptor::scalar("String", false),
        });
        let source = render(&spec, Flavor::Fetch);
        assert!(!source.contains("toQueryString"));
        assert!(source.contains("fetch(\"http://localhost:9090/ping/\")"));
        assert!(source.contains("Promise<string>"));
    }
}
