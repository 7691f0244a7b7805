//! Integration tests for the full analysis-pass flow.
//!
//! Exercises the public API end to end: ingest extractor JSON, query through
//! the planner, prune re-scanned sources between passes, and run
//! configuration-driven checks over the index.

use call_indexer::{
    load_checks, CallIndex, CallQuery, CallRecord, CheckRegistry, CheckRunner, Confidence,
    ModelRegistry, ScanError, Target,
};

/// Two-record fixture in the upstream extractor's wire format:
/// `User.find` inside class `Foo`, and a bare `where` inside the `index`
/// template.
const CALLS_JSON: &str = r#"[
    {
        "method": "find",
        "target": { "name": "User" },
        "chain": ["User", "find"],
        "location": { "kind": "class", "name": "Foo" },
        "file": "app/models/foo.rb",
        "line": 3
    },
    {
        "method": "where",
        "target": "absent",
        "chain": ["where"],
        "location": { "kind": "template", "name": "index" },
        "file": "app/views/index.html.erb",
        "line": 8
    }
]"#;

fn fixture_index() -> CallIndex {
    let records: Vec<CallRecord> = serde_json::from_str(CALLS_JSON).unwrap();
    CallIndex::from_records(records)
}

// =====================================================
// Index → query → prune → re-query
// =====================================================

#[test]
fn test_queries_over_ingested_batch() {
    let index = fixture_index();

    let found = index.find_calls(&CallQuery::new().with_target("User"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].method, "find");

    let found = index.find_calls(&CallQuery::new().with_methods(["find", "where"]));
    let described: Vec<String> = found.iter().map(|c| c.describe()).collect();
    assert_eq!(described, ["User.find", "where"]);
}

#[test]
fn test_explicit_absent_target_is_its_own_shape() {
    let index = fixture_index();

    let found = index.find_calls(&CallQuery::new().with_absent_target().with_method("where"));
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].target, Target::Absent);
    assert_eq!(found[0].location.template_name(), Some("index"));
}

#[test]
fn test_template_removal_prunes_both_query_paths() {
    let mut index = fixture_index();

    index.remove_by_template(Some("index"));

    assert!(index
        .find_calls(&CallQuery::new().with_method("where"))
        .is_empty());
    assert!(index
        .find_calls(&CallQuery::new().with_absent_target().with_method("where"))
        .is_empty());

    // Unrelated records survive
    let found = index.find_calls(&CallQuery::new().with_method("find"));
    assert_eq!(found.len(), 1);

    // Removal is idempotent
    index.remove_by_template(Some("index"));
    assert_eq!(index.len(), 1);
}

// =====================================================
// Configuration-driven scan
// =====================================================

const CHECKS_YAML: &str = r#"
- name: SqlInjection
  description: User input in SQL
  warning_type: SQL Injection
  targets: ["@all_models"]
  methods: [find_by_sql]
- name: Redirect
  description: Unvalidated redirect
  warning_type: Redirect
  methods:
    redirect_to: [1]
"#;

const SCAN_CALLS_JSON: &str = r#"[
    {
        "method": "find_by_sql",
        "target": { "name": "User" },
        "chain": ["User", "find_by_sql"],
        "location": { "kind": "class", "name": "UsersController" },
        "args": [ { "user_input": "params" } ],
        "file": "app/controllers/users_controller.rb",
        "line": 12
    },
    {
        "method": "find_by_sql",
        "target": { "name": "User" },
        "chain": ["User", "find_by_sql"],
        "location": { "kind": "class", "name": "ReportsController" },
        "args": [ { "literal": "SELECT 1" } ],
        "file": "app/controllers/reports_controller.rb",
        "line": 30
    },
    {
        "method": "redirect_to",
        "target": "absent",
        "chain": ["redirect_to"],
        "location": { "kind": "class", "name": "SessionsController" },
        "args": [ { "user_input": "params" } ],
        "file": "app/controllers/sessions_controller.rb",
        "line": 21
    }
]"#;

#[test]
fn test_scan_emits_one_warning_per_matched_call() {
    let records: Vec<CallRecord> = serde_json::from_str(SCAN_CALLS_JSON).unwrap();
    let index = CallIndex::from_records(records);

    let mut registry = CheckRegistry::new();
    for check in load_checks(CHECKS_YAML).unwrap() {
        registry.register(check).unwrap();
    }
    let models = ModelRegistry::from_names(["User", "Account"]);

    let warnings = CheckRunner::new(&index, &models).run_all(&registry).unwrap();
    assert_eq!(warnings.len(), 3);

    // Registry iteration is name-ordered: Redirect first
    assert_eq!(warnings[0].check, "Redirect");
    assert_eq!(warnings[0].confidence, Confidence::High);
    assert_eq!(warnings[0].line, Some(21));

    let sql: Vec<_> = warnings.iter().filter(|w| w.check == "SqlInjection").collect();
    assert_eq!(sql.len(), 2);
    assert_eq!(sql[0].confidence, Confidence::High);
    assert_eq!(sql[1].confidence, Confidence::Weak);
    assert_eq!(sql[0].code, sql[1].code);
}

#[test]
fn test_duplicate_check_name_is_rejected() {
    let mut registry = CheckRegistry::new();
    let checks = load_checks(CHECKS_YAML).unwrap();
    for check in &checks {
        registry.register(check.clone()).unwrap();
    }

    let err = registry.register(checks[0].clone()).unwrap_err();
    assert!(matches!(err, ScanError::DuplicateCheck(name) if name == "SqlInjection"));
}

#[test]
fn test_derived_codes_ignore_configuration_field_order() {
    let forward = r#"
- name: SqlInjection
  description: User input in SQL
  warning_type: SQL Injection
  targets: [User, Account]
  methods: [find_by_sql, where]
"#;
    let shuffled = r#"
- methods: [where, find_by_sql]
  targets: [Account, User]
  warning_type: SQL Injection
  description: User input in SQL
  name: SqlInjection
"#;

    let a = &load_checks(forward).unwrap()[0];
    let b = &load_checks(shuffled).unwrap()[0];
    assert_eq!(a.warning_code().unwrap(), b.warning_code().unwrap());
}
