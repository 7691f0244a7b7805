//! Call record data model.
//!
//! Records are produced by the upstream extractor, one per method-invocation
//! site, and are immutable once handed to the index. The index shares them
//! via `Arc` and never copies or rewrites them.

use serde::{Deserialize, Serialize};

/// Kind of direct user input flagged by the upstream extractor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UserInputKind {
    /// Request parameter access
    Params,
    /// Cookie access
    Cookies,
    /// Other request data (headers, raw body)
    Request,
}

/// An argument or receiver expression, as extracted upstream.
///
/// The index treats these as opaque values; only the configured-check runner
/// inspects their shape when classifying arguments.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Expr {
    /// Bare identifier or constant reference
    Name(String),
    /// Literal value in textual form
    Literal(String),
    /// Direct user input access
    UserInput(UserInputKind),
    /// A nested call expression
    Call {
        target: Option<Box<Expr>>,
        method: String,
        #[serde(default)]
        args: Vec<Expr>,
    },
}

/// The receiver of a call.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Target {
    /// A simple named receiver (constant or class name)
    Name(String),
    /// No explicit receiver (implicit-self call)
    #[default]
    Absent,
    /// The receiver is itself a nested call or other expression
    Expression(Expr),
}

impl Target {
    /// Key under which a record with this target is stored in the target
    /// index. Records whose receiver is an opaque expression are
    /// method-indexed only.
    pub fn index_key(&self) -> Option<TargetKey> {
        match self {
            Target::Name(name) => Some(TargetKey::Name(name.clone())),
            Target::Absent => Some(TargetKey::Absent),
            Target::Expression(_) => None,
        }
    }

    /// The receiver name, when the receiver is a simple name.
    pub fn name(&self) -> Option<&str> {
        match self {
            Target::Name(name) => Some(name),
            _ => None,
        }
    }
}

/// Key type of the target index. `Absent` is a valid key: calls with no
/// explicit receiver are grouped under it.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TargetKey {
    Name(String),
    Absent,
}

impl TargetKey {
    pub fn name(name: impl Into<String>) -> Self {
        TargetKey::Name(name.into())
    }
}

/// Where a call site originated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CallLocation {
    /// Inside a rendered template
    Template { name: String },
    /// Inside a class body or instance method
    Class { name: String },
    /// Anywhere else (initializers, standalone scripts)
    Other,
}

impl CallLocation {
    pub fn template_name(&self) -> Option<&str> {
        match self {
            CallLocation::Template { name } => Some(name),
            _ => None,
        }
    }

    pub fn class_name(&self) -> Option<&str> {
        match self {
            CallLocation::Class { name } => Some(name),
            _ => None,
        }
    }
}

/// One extracted method-invocation site.
///
/// `chain` is the full dotted call path ending in `method`, e.g.
/// `[Foo, bar, baz]` for `Foo.bar.baz`; a `None` segment marks a link with
/// no simple name (an opaque sub-expression in receiver position).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CallRecord {
    pub method: String,
    #[serde(default)]
    pub target: Target,
    #[serde(default)]
    pub chain: Vec<Option<String>>,
    pub location: CallLocation,
    #[serde(default)]
    pub args: Vec<Expr>,
    /// True when this record is itself the receiver sub-expression of
    /// another indexed call.
    #[serde(default)]
    pub nested: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub line: Option<u32>,
}

impl CallRecord {
    /// Creates a record with the given method and receiver, located nowhere
    /// in particular. Builder methods fill in the rest.
    pub fn new(method: impl Into<String>, target: Target) -> Self {
        Self {
            method: method.into(),
            target,
            chain: Vec::new(),
            location: CallLocation::Other,
            args: Vec::new(),
            nested: false,
            file: None,
            line: None,
        }
    }

    pub fn with_chain(mut self, chain: Vec<Option<String>>) -> Self {
        self.chain = chain;
        self
    }

    pub fn with_location(mut self, location: CallLocation) -> Self {
        self.location = location;
        self
    }

    pub fn with_args(mut self, args: Vec<Expr>) -> Self {
        self.args = args;
        self
    }

    pub fn with_nested(mut self, nested: bool) -> Self {
        self.nested = nested;
        self
    }

    pub fn with_position(mut self, file: impl Into<String>, line: u32) -> Self {
        self.file = Some(file.into());
        self.line = Some(line);
        self
    }

    /// First link of the call chain, when it has a simple name.
    pub fn first_chain_link(&self) -> Option<&str> {
        self.chain.first().and_then(|seg| seg.as_deref())
    }

    /// Short human-readable rendering, e.g. `User.find` or `where`.
    pub fn describe(&self) -> String {
        match self.target.name() {
            Some(target) => format!("{}.{}", target, self.method),
            None => self.method.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_target_index_key() {
        assert_eq!(
            Target::Name("User".into()).index_key(),
            Some(TargetKey::name("User"))
        );
        assert_eq!(Target::Absent.index_key(), Some(TargetKey::Absent));
        assert_eq!(
            Target::Expression(Expr::Name("x".into())).index_key(),
            None
        );
    }

    #[test]
    fn test_record_from_extractor_json() {
        let json = r#"{
            "method": "find",
            "target": { "name": "User" },
            "chain": ["User", "find"],
            "location": { "kind": "class", "name": "UsersController" },
            "args": [ { "user_input": "params" } ],
            "file": "app/controllers/users_controller.rb",
            "line": 12
        }"#;

        let record: CallRecord = serde_json::from_str(json).unwrap();
        assert_eq!(record.method, "find");
        assert_eq!(record.target, Target::Name("User".into()));
        assert_eq!(record.first_chain_link(), Some("User"));
        assert_eq!(record.location.class_name(), Some("UsersController"));
        assert_eq!(record.args, vec![Expr::UserInput(UserInputKind::Params)]);
        assert!(!record.nested);
        assert_eq!(record.line, Some(12));
    }

    #[test]
    fn test_describe() {
        let named = CallRecord::new("find", Target::Name("User".into()));
        assert_eq!(named.describe(), "User.find");

        let bare = CallRecord::new("where", Target::Absent);
        assert_eq!(bare.describe(), "where");
    }
}
