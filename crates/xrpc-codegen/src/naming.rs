//! Identifier casing for generated code.
//!
//! Word splitting follows `heck`: separators and lower-to-upper case
//! boundaries start a new word, so paths and service names case the same way.

use std::collections::BTreeMap;

use heck::{ToSnakeCase, ToUpperCamelCase};
use xrpc_core::Spec;

/// `/post/list/` → `PostList`, `post service` → `PostService`.
pub fn pascal_case(input: &str) -> String {
    input.to_upper_camel_case()
}

/// `Post Service` → `post_service`.
pub fn snake_case(input: &str) -> String {
    input.to_snake_case()
}

/// A spec whose procedures cannot all be named in a client.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NamingError {
    #[error("procedure `{path}` has no letters or digits to name a client function")]
    Unnamed { path: String },

    #[error("procedures `{first}` and `{second}` both name the client function `{name}`")]
    Collision {
        name: String,
        first: String,
        second: String,
    },
}

/// Client function name of every procedure, in declaration order. Each name
/// is non-empty and distinct.
pub fn function_names(spec: &Spec) -> Result<Vec<String>, NamingError> {
    let mut seen: BTreeMap<String, &str> = BTreeMap::new();
    let mut names = Vec::with_capacity(spec.procedures.len());
    for procedure in &spec.procedures {
        let name = pascal_case(&procedure.path);
        if name.is_empty() {
            return Err(NamingError::Unnamed {
                path: procedure.path.clone(),
            });
        }
        if let Some(first) = seen.insert(name.clone(), &procedure.path) {
            return Err(NamingError::Collision {
                name,
                first: first.to_string(),
                second: procedure.path.clone(),
            });
        }
        names.push(name);
    }
    Ok(names)
}

#[cfg(test)]
mod tests {
    use super::*;
    use xrpc_core::{ProcedureKind, SpecProcedure, TypeDescriptor};

    fn spec(paths: &[&str]) -> Spec {
        let mut spec = Spec::new("Post Service", "http://localhost:9090");
        for path in paths {
            spec.push(SpecProcedure {
                path: path.to_string(),
                kind: ProcedureKind::Query,
                input: TypeDescriptor::nil(),
                output: TypeDescriptor::nil(),
            });
        }
        spec
    }

    #[test]
    fn pascal_from_paths_and_names() {
        assert_eq!(pascal_case("/post/list/"), "PostList");
        assert_eq!(pascal_case("/post/getById/"), "PostGetById");
        assert_eq!(pascal_case("author_id"), "AuthorId");
        assert_eq!(pascal_case("post service"), "PostService");
        assert_eq!(pascal_case("/"), "");
    }

    #[test]
    fn snake_from_service_names() {
        assert_eq!(snake_case("Post Service"), "post_service");
        assert_eq!(snake_case("PostService"), "post_service");
        assert_eq!(snake_case("billing-api v2"), "billing_api_v2");
    }

    #[test]
    fn function_names_follow_declaration_order() {
        let names = function_names(&spec(&["/post/list/", "/post/create/"])).unwrap();
        assert_eq!(names, ["PostList", "PostCreate"]);
    }

    #[test]
    fn root_path_cannot_be_named() {
        let err = function_names(&spec(&["/post/list/", "/"])).unwrap_err();
        assert_eq!(err, NamingError::Unnamed { path: "/".to_string() });
    }

    #[test]
    fn colliding_paths_are_rejected() {
        let err = function_names(&spec(&["/post/list/", "/post_list/"])).unwrap_err();
        assert_eq!(
            err,
            NamingError::Collision {
                name: "PostList".to_string(),
                first: "/post/list/".to_string(),
                second: "/post_list/".to_string(),
            }
        );
        assert!(err.to_string().contains("PostList"));
    }
}
