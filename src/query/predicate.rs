//! Polymorphic match predicates for query filtering.
//!
//! The same predicate type filters by method name and by target name, so the
//! filtering code paths do not depend on which field is being filtered.

use std::collections::HashSet;

use regex::Regex;

use crate::index::Target;

/// A filter over a symbolic identifier: exact match, set membership, or
/// pattern match.
#[derive(Debug, Clone)]
pub enum MatchPredicate {
    Exact(String),
    AnyOf(HashSet<String>),
    Pattern(Regex),
}

impl MatchPredicate {
    pub fn exact(value: impl Into<String>) -> Self {
        MatchPredicate::Exact(value.into())
    }

    pub fn any_of<I, S>(values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        MatchPredicate::AnyOf(values.into_iter().map(Into::into).collect())
    }

    pub fn pattern(pattern: Regex) -> Self {
        MatchPredicate::Pattern(pattern)
    }

    /// Evaluates the predicate against a field value.
    pub fn matches(&self, value: &str) -> bool {
        match self {
            MatchPredicate::Exact(expected) => value == expected,
            MatchPredicate::AnyOf(set) => set.contains(value),
            MatchPredicate::Pattern(pattern) => pattern.is_match(value),
        }
    }

    /// Evaluates the predicate against a receiver. Only named receivers can
    /// match; absent and opaque-expression receivers never do.
    pub fn matches_target(&self, target: &Target) -> bool {
        target.name().is_some_and(|name| self.matches(name))
    }
}

/// The target half of a query: either a predicate over the receiver name, or
/// the explicit "no receiver" marker. Distinct from the target option not
/// being supplied at all, which is `None` at the query level.
#[derive(Debug, Clone)]
pub enum TargetFilter {
    Is(MatchPredicate),
    Absent,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::index::Expr;

    #[test]
    fn test_exact() {
        let pred = MatchPredicate::exact("find");
        assert!(pred.matches("find"));
        assert!(!pred.matches("find_by_sql"));
    }

    #[test]
    fn test_any_of() {
        let pred = MatchPredicate::any_of(["find", "where"]);
        assert!(pred.matches("find"));
        assert!(pred.matches("where"));
        assert!(!pred.matches("order"));
    }

    #[test]
    fn test_pattern() {
        let pred = MatchPredicate::pattern(Regex::new(r"^find(_by_\w+)?$").unwrap());
        assert!(pred.matches("find"));
        assert!(pred.matches("find_by_name"));
        assert!(!pred.matches("update"));
    }

    #[test]
    fn test_matches_target_named_only() {
        let pred = MatchPredicate::exact("User");
        assert!(pred.matches_target(&Target::Name("User".into())));
        assert!(!pred.matches_target(&Target::Absent));
        assert!(!pred.matches_target(&Target::Expression(Expr::Name("User".into()))));
    }
}
