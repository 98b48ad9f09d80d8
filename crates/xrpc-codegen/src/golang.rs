//! Go client on top of `github.com/go-resty/resty/v2`.
//!
//! The output is already gofmt-shaped: tab indentation, sorted imports and
//! aligned struct fields.

use std::collections::BTreeSet;

use xrpc_core::{ProcedureKind, Spec, SpecProcedure, TypeDescriptor};

use crate::naming::{pascal_case, snake_case};
use crate::types::{Payload, TypeRef};

const PRELUDE: &str = r#"func structToQueryParams(input any) (string, error) {
	data, err := json.Marshal(input)
	if err != nil {
		return "", fmt.Errorf("failed to marshal input: %w", err)
	}
	var mapData map[string]any
	err = json.Unmarshal(data, &mapData)
	if err != nil {
		return "", fmt.Errorf("failed to unmarshal JSON: %w", err)
	}
	query := url.Values{}
	for key, value := range mapData {
		if value == nil {
			continue
		}
		query.Add(key, fmt.Sprintf("%v", value))
	}
	return query.Encode(), nil
}

type MapError map[string]any

func (m MapError) Error() string {
	data, err := json.Marshal(m)
	if err != nil {
		return fmt.Sprintf("failed to marshal error map: %v", err)
	}
	return string(data)
}
"#;

/// Package name for a service: the explicit one, else the snake-cased
/// service name, else `client`.
pub fn package_name(spec: &Spec, package: Option<&str>) -> String {
    let name = match package {
        Some(package) if !package.trim().is_empty() => snake_case(package),
        _ => snake_case(&spec.name),
    };
    if name.is_empty() {
        "client".to_string()
    } else {
        name
    }
}

pub fn render(spec: &Spec, package: Option<&str>) -> String {
    let client = format!("{}Client", pascal_case(&spec.name));
    let mut out = String::from("// Code generated by xrpc. DO NOT EDIT.\n\n");
    out.push_str(&format!("package {}\n\n", package_name(spec, package)));
    out.push_str("import (\n");
    out.push_str("\t\"encoding/json\"\n");
    out.push_str("\t\"fmt\"\n");
    out.push_str("\tresty \"github.com/go-resty/resty/v2\"\n");
    out.push_str("\t\"net/url\"\n");
    out.push_str(")\n\n");
    out.push_str(&format!("type {client} struct {{\n\tclient *resty.Client\n}}\n\n"));
    out.push_str(PRELUDE);

    let mut declared = BTreeSet::new();
    for procedure in &spec.procedures {
        let input = Payload::of(&procedure.input);
        let output = Payload::of(&procedure.output);
        for record in [output.record, input.record].into_iter().flatten() {
            if declared.insert(record.type_name.clone()) {
                out.push('\n');
                out.push_str(&record_struct(record));
            }
        }
        out.push('\n');
        out.push_str(&method(&client, procedure, &input, &output));
    }

    let base = spec.server_url.trim_end_matches('/');
    out.push('\n');
    out.push_str(&format!("func New{client}() *{client} {{\n"));
    out.push_str("\tclient := resty.New()\n");
    out.push_str(&format!("\tclient.SetBaseURL({base:?})\n\n"));
    out.push_str(&format!("\treturn &{client}{{client: client}}\n}}\n"));
    out
}

fn record_struct(record: &TypeDescriptor) -> String {
    let rows: Vec<(String, String, String)> = record
        .fields
        .iter()
        .map(|field| {
            let ty = TypeRef::parse(&field.ty);
            let spelled = if field.nillable && !ty.go_nillable() {
                format!("*{}", ty.go())
            } else {
                ty.go()
            };
            (
                pascal_case(&field.name),
                spelled,
                format!("`json:\"{}\"`", field.alias),
            )
        })
        .collect();
    let name_width = rows.iter().map(|row| row.0.len()).max().unwrap_or(0);
    let type_width = rows.iter().map(|row| row.1.len()).max().unwrap_or(0);

    let mut out = format!("type {} struct {{\n", record.type_name);
    for (name, ty, tag) in rows {
        out.push_str(&format!("\t{name:name_width$} {ty:type_width$} {tag}\n"));
    }
    out.push_str("}\n");
    out
}

fn method(
    client: &str,
    procedure: &SpecProcedure,
    input: &Payload<'_>,
    output: &Payload<'_>,
) -> String {
    let name = pascal_case(&procedure.path);
    let params = if input.nil {
        String::new()
    } else {
        format!("input {}", input.ty.go())
    };
    let result = (!output.nil).then(|| output.ty.go());
    let (returns, fail) = match &result {
        Some(ty) => (format!("(*{ty}, error)"), "nil, "),
        None => ("error".to_string(), ""),
    };

    let mut out = format!("func (c *{client}) {name}({params}) {returns} {{\n");
    let mut request = String::from("c.client.R()");
    match procedure.kind {
        ProcedureKind::Query if !input.nil => {
            out.push_str("\tqueryParams, err := structToQueryParams(input)\n");
            out.push_str(&format!("\tif err != nil {{\n\t\treturn {fail}err\n\t}}\n"));
            request.push_str(".SetQueryString(queryParams)");
        }
        ProcedureKind::Mutation if !input.nil => request.push_str(".SetBody(input)"),
        _ => {}
    }
    request.push_str(".SetError(&MapError{})");
    if let Some(ty) = &result {
        request.push_str(&format!(".SetResult(new({ty}))"));
    }
    let verb = match procedure.kind {
        ProcedureKind::Query => "Get",
        ProcedureKind::Mutation => "Post",
    };
    request.push_str(&format!(".{verb}({:?})", procedure.path));

    out.push_str(&format!("\tresp, err := {request}\n"));
    out.push_str(&format!("\tif err != nil {{\n\t\treturn {fail}err\n\t}}\n\n"));
    out.push_str(&format!(
        "\tif resp.IsError() {{\n\t\treturn {fail}resp.Error().(*MapError)\n\t}}\n"
    ));
    match &result {
        Some(ty) => out.push_str(&format!("\treturn resp.Result().(*{ty}), nil\n")),
        None => out.push_str("\treturn nil\n"),
    }
    out.push_str("}\n");
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
            .field(FieldDescriptor::of::<String>("content", "content"))
    }

    fn spec() -> Spec {
        let mut spec = Spec::new("Post Service", "http://localhost:9090");
        spec.push(SpecProcedure {
            path: "/post/list/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::record("ListPostInput")
                .field(FieldDescriptor::of::<Option<i64>>("skip", "skip"))
                .field(FieldDescriptor::of::<Option<i64>>("limit", "limit")),
            output: TypeDescriptor::array_of("Vec<Post>", post()),
        });
        spec.push(SpecProcedure {
            path: "/post/get/".to_string(),
            kind: ProcedureKind::Query,
            input: TypeDescriptor::record("GetPostInput")
                .field(FieldDescriptor::of::<i64>("id", "id"))
                .field(FieldDescriptor::of::<Option<Vec<String>>>("tags", "tags")),
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
    fn package_defaults_to_service_name() {
        let spec = spec();
        assert_eq!(package_name(&spec, None), "post_service");
        assert_eq!(package_name(&spec, Some("clients")), "clients");
        assert_eq!(package_name(&spec, Some("  ")), "post_service");
        assert_eq!(package_name(&Spec::new("", ""), None), "client");
    }

    #[test]
    fn structs_are_aligned_and_tagged() {
        let source = render(&spec(), None);
        assert!(source.contains(
            "type Post struct {\n\tId      int64  `json:\"id\"`\n\tTitle   string `json:\"title\"`\n\tContent string `json:\"content\"`\n}\n"
        ));
        assert!(source.contains("\tSkip  *int64 `json:\"skip\"`\n"));
        assert!(source.contains("\tTags []string `json:\"tags\"`\n"));
        assert_eq!(source.matches("type Post struct").count(), 1);
    }

    #[test]
    fn methods_follow_procedure_kind() {
        let source = render(&spec(), Some("clients"));
        assert!(source.contains("package clients\n"));
        assert!(source.contains(
            "func (c *PostServiceClient) PostList(input ListPostInput) (*[]Post, error) {\n\tqueryParams, err := structToQueryParams(input)\n"
        ));
        assert!(source.contains(
            "\tresp, err := c.client.R().SetQueryString(queryParams).SetError(&MapError{}).SetResult(new([]Post)).Get(\"/post/list/\")\n"
        ));
        assert!(source.contains(
            "func (c *PostServiceClient) PostPurge() error {\n\tresp, err := c.client.R().SetError(&MapError{}).Post(\"/post/purge/\")\n"
        ));
        assert!(source.contains("\treturn resp.Result().(*Post), nil\n"));
        assert!(source.contains(
            "func NewPostServiceClient() *PostServiceClient {\n\tclient := resty.New()\n\tclient.SetBaseURL(\"http://localhost:9090\")\n"
        ));
    }
}
