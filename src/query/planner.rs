//! Query planning over the dual index.
//!
//! `find_calls` picks the cheapest index traversal for the query shape, then
//! applies the remaining filters as secondary predicates. The traversal
//! choice is a cost heuristic only; results never depend on which index was
//! walked, and multi-bucket unions are restored to global insertion order.

use std::collections::HashSet;
use std::sync::Arc;

use crate::index::call_index::IndexedCall;
use crate::index::{CallIndex, CallRecord, Target, TargetKey};
use crate::query::chain::{is_chain_query, stringify_chain};
use crate::query::predicate::{MatchPredicate, TargetFilter};

/// Options for one `find_calls` query.
///
/// `target: None` means the option was not supplied;
/// `Some(TargetFilter::Absent)` is the distinct "explicitly no receiver"
/// shape. `chained` routes to the chain-query path; `nested` opts in to
/// records that are receiver sub-expressions of other indexed calls.
#[derive(Debug, Clone, Default)]
pub struct CallQuery {
    pub target: Option<TargetFilter>,
    pub method: Option<MatchPredicate>,
    pub chained: bool,
    pub nested: bool,
}

impl CallQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(TargetFilter::Is(MatchPredicate::exact(target)));
        self
    }

    pub fn with_targets<I, S>(mut self, targets: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.target = Some(TargetFilter::Is(MatchPredicate::any_of(targets)));
        self
    }

    pub fn with_target_pattern(mut self, pattern: regex::Regex) -> Self {
        self.target = Some(TargetFilter::Is(MatchPredicate::pattern(pattern)));
        self
    }

    /// Explicit "no receiver" target, distinct from not supplying a target.
    pub fn with_absent_target(mut self) -> Self {
        self.target = Some(TargetFilter::Absent);
        self
    }

    pub fn with_method(mut self, method: impl Into<String>) -> Self {
        self.method = Some(MatchPredicate::exact(method));
        self
    }

    pub fn with_methods<I, S>(mut self, methods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.method = Some(MatchPredicate::any_of(methods));
        self
    }

    pub fn with_method_pattern(mut self, pattern: regex::Regex) -> Self {
        self.method = Some(MatchPredicate::pattern(pattern));
        self
    }

    pub fn chained(mut self) -> Self {
        self.chained = true;
        self
    }

    pub fn with_nested(mut self) -> Self {
        self.nested = true;
        self
    }
}

impl CallIndex {
    /// Finds every record matching the query options. Returns records in
    /// index insertion order; empty on no match or on an invalid option
    /// shape (diagnosed, never fatal).
    pub fn find_calls(&self, query: &CallQuery) -> Vec<Arc<CallRecord>> {
        if query.chained {
            return self.find_chain(query);
        }

        let entries = match (&query.target, &query.method) {
            (
                Some(TargetFilter::Is(target_pred @ MatchPredicate::AnyOf(targets))),
                Some(method_pred @ MatchPredicate::AnyOf(methods)),
            ) => {
                // Union whichever index has fewer buckets to walk; ties go
                // to the target index. Affects cost only, never results.
                if methods.len() < targets.len() {
                    filter_entries(self.method_entries(method_pred), |call| {
                        target_pred.matches_target(&call.target)
                    })
                } else {
                    filter_entries(self.target_entries(target_pred), |call| {
                        method_pred.matches(&call.method)
                    })
                }
            }
            (Some(TargetFilter::Is(target_pred)), method) => {
                let entries = self.target_entries(target_pred);
                match method {
                    Some(method_pred) => {
                        filter_entries(entries, |call| method_pred.matches(&call.method))
                    }
                    None => entries,
                }
            }
            (Some(TargetFilter::Absent), Some(method_pred)) => {
                filter_entries(self.method_entries(method_pred), |call| {
                    matches!(call.target, Target::Absent)
                })
            }
            (None, Some(method_pred)) => self.method_entries(method_pred),
            (Some(TargetFilter::Absent), None) | (None, None) => {
                tracing::warn!("Invalid call query shape, returning no results: {:?}", query);
                return Vec::new();
            }
        };

        let entries = if query.nested {
            entries
        } else {
            // A nested call would otherwise surface twice: once as its own
            // record and once inside the record it is the receiver of.
            filter_entries(entries, |call| !call.nested)
        };
        collect_calls(entries)
    }

    /// Chain-query path: traverse the method index, then match the query
    /// target against the records' call chains.
    fn find_chain(&self, query: &CallQuery) -> Vec<Arc<CallRecord>> {
        let Some(method_pred) = &query.method else {
            tracing::warn!("Chain query without a method, returning no results: {:?}", query);
            return Vec::new();
        };

        let entries = filter_by_chain(self.method_entries(method_pred), query.target.as_ref());
        collect_calls(entries)
    }

    /// Bucket union for a method predicate.
    fn method_entries(&self, pred: &MatchPredicate) -> Vec<IndexedCall> {
        match pred {
            MatchPredicate::Exact(method) => self.method_bucket(method).to_vec(),
            MatchPredicate::AnyOf(methods) => methods
                .iter()
                .flat_map(|method| self.method_bucket(method))
                .cloned()
                .collect(),
            MatchPredicate::Pattern(pattern) => {
                let keys: Vec<&str> = self
                    .method_keys()
                    .filter(|key| pattern.is_match(key))
                    .collect();
                keys.into_iter()
                    .flat_map(|key| self.method_bucket(key))
                    .cloned()
                    .collect()
            }
        }
    }

    /// Bucket union for a target predicate over named receivers.
    fn target_entries(&self, pred: &MatchPredicate) -> Vec<IndexedCall> {
        match pred {
            MatchPredicate::Exact(target) => {
                self.target_bucket(&TargetKey::Name(target.clone())).to_vec()
            }
            MatchPredicate::AnyOf(targets) => targets
                .iter()
                .flat_map(|target| self.target_bucket(&TargetKey::Name(target.clone())))
                .cloned()
                .collect(),
            MatchPredicate::Pattern(pattern) => {
                let keys: Vec<TargetKey> = self
                    .target_keys()
                    .filter(|key| matches!(key, TargetKey::Name(name) if pattern.is_match(name)))
                    .cloned()
                    .collect();
                keys.iter()
                    .flat_map(|key| self.target_bucket(key))
                    .cloned()
                    .collect()
            }
        }
    }
}

fn filter_entries<F>(entries: Vec<IndexedCall>, keep: F) -> Vec<IndexedCall>
where
    F: Fn(&CallRecord) -> bool,
{
    entries
        .into_iter()
        .filter(|entry| keep(&entry.call))
        .collect()
}

/// Restores global insertion order across unioned buckets.
fn collect_calls(mut entries: Vec<IndexedCall>) -> Vec<Arc<CallRecord>> {
    entries.sort_by_key(|entry| entry.seq);
    entries.into_iter().map(|entry| entry.call).collect()
}

fn filter_by_chain(entries: Vec<IndexedCall>, target: Option<&TargetFilter>) -> Vec<IndexedCall> {
    match target {
        Some(TargetFilter::Is(MatchPredicate::AnyOf(set))) => {
            let (chain_shaped, plain): (HashSet<String>, HashSet<String>) =
                set.iter().cloned().partition(|t| is_chain_query(t));
            filter_entries(entries, move |call| {
                call.first_chain_link()
                    .is_some_and(|link| plain.contains(link))
                    || chain_shaped.contains(stringify_chain(&call.chain).as_str())
            })
        }
        Some(TargetFilter::Is(MatchPredicate::Pattern(pattern))) => {
            filter_entries(entries, |call| {
                pattern.is_match(call.first_chain_link().unwrap_or(""))
            })
        }
        Some(TargetFilter::Is(MatchPredicate::Exact(target))) => {
            if is_chain_query(target) {
                filter_entries(entries, |call| stringify_chain(&call.chain) == *target)
            } else {
                filter_entries(entries, |call| {
                    call.first_chain_link() == Some(target.as_str())
                })
            }
        }
        // Residual: no usable receiver in the query. Keep records whose
        // leading chain link has no simple name.
        Some(TargetFilter::Absent) | None => filter_entries(entries, |call| {
            call.chain.first().is_some_and(|link| link.is_none())
        }),
    }
}
