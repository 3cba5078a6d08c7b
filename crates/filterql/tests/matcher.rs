//! Integration tests for parsing filters and matching them against objects.
//!
//! Run with: cargo test --package filterql --test matcher

use filterql::{
    matches_filter, AttributeSpecifiable, Attributes, ErrorPayload, FilterMatcher, MatchError,
    Value,
};

// ============================================================================
// Test Objects
// ============================================================================

/// A typed object exposing a fixed set of attributes.
struct Server {
    name: String,
    replicas: i64,
    zones: Vec<String>,
    owner: Option<String>,
}

impl AttributeSpecifiable for Server {
    fn value_for_attribute(&self, name: &str) -> Option<Value> {
        match name {
            "name" => Some(Value::from(self.name.as_str())),
            "replicas" => Some(Value::Int(self.replicas)),
            "zones" => Some(Value::from(self.zones.clone())),
            // Declared even when unset.
            "owner" => Some(Value::from(self.owner.clone())),
            _ => None,
        }
    }
}

fn server(name: &str, replicas: i64, zones: &[&str], owner: Option<&str>) -> Server {
    Server {
        name: name.to_string(),
        replicas,
        zones: zones.iter().map(|z| z.to_string()).collect(),
        owner: owner.map(str::to_string),
    }
}

fn parse(input: &str) -> filterql::Filter {
    filterql::parse(input).unwrap()
}

// ============================================================================
// Typed Objects
// ============================================================================

#[test]
fn test_match_typed_object() {
    let web = server("web", 3, &["eu-1", "eu-2"], Some("ops"));

    assert!(matches_filter(&web, &parse(r#"name == "web""#)).unwrap());
    assert!(matches_filter(&web, &parse("replicas == 3")).unwrap());
    assert!(matches_filter(&web, &parse("replicas == 3.0")).unwrap());
    assert!(matches_filter(&web, &parse("zones == eu-2")).unwrap());
    assert!(!matches_filter(&web, &parse("zones == us-1")).unwrap());
}

#[test]
fn test_match_declared_null_attribute() {
    let db = server("db", 1, &[], None);

    assert!(matches_filter(&db, &parse("owner exists")).unwrap());
    assert!(!matches_filter(&db, &parse("owner not exists")).unwrap());
    assert!(matches_filter(&db, &parse("owner != ops")).unwrap());
    assert!(matches_filter(&db, &parse("cpu not exists")).unwrap());
}

#[test]
fn test_match_precedence() {
    let web = server("web", 3, &["eu-1"], Some("ops"));

    // (name == web and replicas == 1) or zones == eu-1
    assert!(matches_filter(&web, &parse("name == web and replicas == 1 or zones == eu-1")).unwrap());
    // (name == web or replicas == 1) and owner == dev
    assert!(!matches_filter(&web, &parse("name == web or replicas == 1 and owner == dev")).unwrap());
}

#[test]
fn test_filter_objects() {
    let servers = vec![
        server("web", 3, &["eu-1"], Some("ops")),
        server("db", 1, &["eu-1", "us-1"], None),
        server("cache", 2, &["us-1"], Some("dev")),
    ];
    let filter = parse("zones == us-1 and owner exists");
    let matched = FilterMatcher::new(&filter).filter_objects(&servers).unwrap();
    let names: Vec<&str> = matched.iter().map(|s| s.name.as_str()).collect();
    assert_eq!(names, vec!["db", "cache"]);
}

// ============================================================================
// JSON Documents
// ============================================================================

#[test]
fn test_match_json_arrays() {
    let doc = Attributes::from_json(&serde_json::json!({
        "tags": ["a", "b", "c", "d"],
        "groups": [["a"], ["b"], ["amir"]],
    }))
    .unwrap();

    assert!(matches_filter(&doc, &parse(r#"tags == ["a", "b", "c", "d"]"#)).unwrap());
    assert!(!matches_filter(&doc, &parse(r#"tags == ["d", "c", "b", "a"]"#)).unwrap());
    assert!(matches_filter(&doc, &parse(r#"groups == ["amir"]"#)).unwrap());
    assert!(!matches_filter(&doc, &parse(r#"groups == ["bob"]"#)).unwrap());
}

#[test]
fn test_match_json_nested_keys() {
    let doc = Attributes::from_json(&serde_json::json!({
        "metadata": {"labels": {"app": "web"}},
        "ready": true,
    }))
    .unwrap();

    assert!(matches_filter(&doc, &parse("metadata.labels.app == web and ready == true")).unwrap());
    assert!(matches_filter(&doc, &parse("metadata exists")).unwrap());
}

#[test]
fn test_match_json_dates_are_strings() {
    let doc = Attributes::from_json(&serde_json::json!({"created": "2018-04-26"})).unwrap();
    assert!(!matches_filter(&doc, &parse(r#"created == date("2018-04-26")"#)).unwrap());
    assert!(matches_filter(&doc, &parse(r#"created == "2018-04-26""#)).unwrap());
}

// ============================================================================
// Errors
// ============================================================================

#[test]
fn test_unsupported_comparator_error() {
    let doc = Attributes::new().with("firstName", "amir");
    let err = matches_filter(&doc, &parse(r#"firstName > """#)).unwrap_err();
    assert!(err.to_string().contains("unsupported comparator"));
    assert!(matches!(err, MatchError::UnsupportedComparator { .. }));

    let payload = ErrorPayload::from(err);
    assert_eq!(payload.code, 422);
    assert_eq!(payload.subject, "filter");
}

#[test]
fn test_unsupported_comparator_not_reached() {
    let doc = Attributes::new().with("firstName", "amir");
    // The second clause is never evaluated.
    let filter = parse(r#"firstName == bob and age > 3"#);
    assert!(!matches_filter(&doc, &filter).unwrap());
}
