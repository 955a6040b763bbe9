//! End-to-end tests: decorators located in a controller file, dispatched
//! through an `Extractor` built from the testdata config.

#![cfg(feature = "tree-sitter")]

use std::path::PathBuf;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Node, Query, QueryCursor};

use routemeta::config::{self, ExtractorConfig};
use routemeta::syntax::treesitter::{self, Dialect, TsCall};
use routemeta::{
    DecoratorKind, DecoratorMetadata, Extractor, MethodAction, MethodResponse, RouteDescriptor,
    SecurityRequirement,
};

fn testdata_path() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("testdata")
}

/// Return type annotation of the method a decorator is attached to.
///
/// Depending on the grammar the decorator is either a child of the method or
/// a preceding sibling in the class body.
fn decorated_return_type(decorator: Node, source: &[u8]) -> String {
    let method = match decorator.parent() {
        Some(parent) if parent.kind() == "method_definition" => Some(parent),
        _ => {
            let mut sibling = decorator.next_named_sibling();
            while let Some(node) = sibling {
                if node.kind() != "decorator" {
                    break;
                }
                sibling = node.next_named_sibling();
            }
            sibling.filter(|n| n.kind() == "method_definition")
        }
    };

    method
        .and_then(|m| m.child_by_field_name("return_type"))
        .and_then(|n| n.utf8_text(source).ok())
        .map(|t| t.trim_start_matches(':').trim().to_string())
        .unwrap_or_default()
}

/// Extract metadata from every decorator in `file`, in document order.
fn extract_file(extractor: &Extractor, file: &str) -> Vec<DecoratorMetadata<String>> {
    let source = std::fs::read_to_string(testdata_path().join(file)).expect("should read fixture");
    let parsed = treesitter::parse(&source, Dialect::TypeScript).expect("should parse");
    assert!(!parsed.has_errors(), "fixture should parse cleanly");

    let language = parsed.dialect().language();
    let query = Query::new(&language, "(decorator) @decorator").unwrap();
    let mut cursor = QueryCursor::new();
    let mut matches = cursor.matches(&query, parsed.tree().root_node(), parsed.source());

    let mut results = Vec::new();
    while let Some(m) = matches.next() {
        for capture in m.captures {
            let Some(call) = TsCall::from_decorator(capture.node, parsed.source()) else {
                continue;
            };
            let metadata = extractor
                .extract(&call, || decorated_return_type(capture.node, parsed.source()))
                .expect("decorator should be well-formed");
            results.extend(metadata);
        }
    }
    results
}

fn action(method: &str, path: &str) -> DecoratorMetadata<String> {
    DecoratorMetadata::Action(MethodAction {
        method: method.to_string(),
        path: path.to_string(),
    })
}

fn security(name: &str) -> DecoratorMetadata<String> {
    DecoratorMetadata::Security(SecurityRequirement {
        name: name.to_string(),
    })
}

#[test]
fn test_testdata_config() {
    let config = ExtractorConfig::parse_file(testdata_path().join("routemeta.yaml"))
        .expect("should parse config");
    config::validate(&config).expect("config should be valid");

    let extractor = Extractor::from_config(&config).unwrap();
    assert_eq!(extractor.kind_of("Roles"), Some(DecoratorKind::Security));
    assert_eq!(extractor.kind_of("Route"), Some(DecoratorKind::GenericMethod));
    assert_eq!(extractor.kind_of("Get"), Some(DecoratorKind::Verb));
    assert_eq!(extractor.kind_of("Injectable"), None);
}

#[test]
fn test_users_controller() {
    let config = config::load(testdata_path()).expect("should load config");
    let extractor = Extractor::from_config(&config).unwrap();

    let results = extract_file(&extractor, "controllers/users.controller.ts");

    assert_eq!(
        results,
        vec![
            DecoratorMetadata::RoutePrefix(RouteDescriptor {
                path: "/users".to_string(),
            }),
            action("get", "/{id}"),
            security("admin, support"),
            action("post", ""),
            DecoratorMetadata::Response(MethodResponse {
                code: 201,
                schema: Some("User".to_string()),
            }),
            action("delete", "/{id}/sessions/{session}"),
            security("admin"),
            action("get", "/export"),
            DecoratorMetadata::Produce {
                media_type: "text/csv".to_string(),
            },
            action("get", "/legacy"),
            DecoratorMetadata::Response(MethodResponse {
                code: 302,
                schema: None,
            }),
        ]
    );
}

#[test]
fn test_aliases_unknown_without_config() {
    let results = extract_file(&Extractor::new(), "controllers/users.controller.ts");

    // Route and Roles are project aliases
    assert_eq!(results.len(), 9);
    assert!(!results.contains(&security("admin")));
}

#[test]
fn test_defaults_can_be_dropped() {
    let config = ExtractorConfig::from_yaml(
        r#"
include_defaults: false
decorators:
  verb: [Get]
"#,
    )
    .unwrap();
    let extractor = Extractor::from_config(&config).unwrap();
    assert_eq!(extractor.len(), 1);

    let results = extract_file(&extractor, "controllers/users.controller.ts");
    assert_eq!(
        results,
        vec![
            action("get", "/{id}"),
            action("get", "/export"),
            action("get", "/legacy"),
        ]
    );
}

#[test]
fn test_conflicting_config_is_rejected() {
    let config = ExtractorConfig::from_yaml(
        r#"
decorators:
  security: [Guard]
  produce: [Guard]
"#,
    )
    .unwrap();
    assert!(Extractor::from_config(&config).is_err());
}

#[test]
fn test_metadata_json_shape() {
    let response: DecoratorMetadata<String> = DecoratorMetadata::Response(MethodResponse {
        code: 302,
        schema: None,
    });
    assert_eq!(
        serde_json::to_value(&response).unwrap(),
        serde_json::json!({ "kind": "response", "code": 302 })
    );

    let option = action("option", "/xxx/{id}/{sub}");
    assert_eq!(
        serde_json::to_value(&option).unwrap(),
        serde_json::json!({ "kind": "action", "method": "option", "path": "/xxx/{id}/{sub}" })
    );

    let parsed: DecoratorMetadata<String> = serde_json::from_value(serde_json::json!({
        "kind": "response",
        "code": 200,
        "schema": "User"
    }))
    .unwrap();
    assert_eq!(
        parsed,
        DecoratorMetadata::Response(MethodResponse {
            code: 200,
            schema: Some("User".to_string()),
        })
    );

    let redirect: DecoratorMetadata<String> =
        serde_json::from_value(serde_json::json!({ "kind": "response", "code": 302 })).unwrap();
    assert_eq!(redirect, response);
}
