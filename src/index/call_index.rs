//! Dual index over extracted call records.
//!
//! Two maps over the same record set: by declared method name and by declared
//! target. Records whose receiver is an opaque expression are method-indexed
//! only. Removal goes through a single paired entry point so the two maps can
//! never disagree about which records are live.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use serde::Serialize;

use crate::index::record::{CallLocation, CallRecord, TargetKey};

/// A record plus its ingestion sequence number. Buckets preserve insertion
/// order; the sequence number restores global insertion order when several
/// buckets are unioned by a query.
#[derive(Debug, Clone)]
pub(crate) struct IndexedCall {
    pub(crate) seq: u32,
    pub(crate) call: Arc<CallRecord>,
}

/// Index of every call site in the analyzed program, queried by the
/// vulnerability checks and pruned between analysis passes as templates and
/// classes are re-scanned.
#[derive(Debug, Default)]
pub struct CallIndex {
    by_method: HashMap<String, Vec<IndexedCall>>,
    by_target: HashMap<TargetKey, Vec<IndexedCall>>,
    next_seq: u32,
}

impl CallIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds an index from one batch of extracted records.
    pub fn from_records(records: impl IntoIterator<Item = CallRecord>) -> Self {
        let mut index = Self::new();
        index.index_calls(records);
        index
    }

    /// Ingests a batch of records, O(n) in batch size. Called once per
    /// analysis pass; re-scanned templates and classes are removed through
    /// the maintenance operations before their replacement batch arrives.
    pub fn index_calls(&mut self, records: impl IntoIterator<Item = CallRecord>) {
        for record in records {
            self.index_call(Arc::new(record));
        }
    }

    fn index_call(&mut self, call: Arc<CallRecord>) {
        let entry = IndexedCall {
            seq: self.next_seq,
            call,
        };
        self.next_seq += 1;

        if let Some(key) = entry.call.target.index_key() {
            self.by_target
                .entry(key)
                .or_default()
                .push(entry.clone());
        }
        self.by_method
            .entry(entry.call.method.clone())
            .or_default()
            .push(entry);
    }

    /// All records declaring the given method, in insertion order. Empty on
    /// an absent key.
    pub fn lookup_by_method(&self, method: &str) -> Vec<Arc<CallRecord>> {
        self.method_bucket(method)
            .iter()
            .map(|entry| Arc::clone(&entry.call))
            .collect()
    }

    /// All records with the given receiver, in insertion order.
    /// `TargetKey::Absent` is a valid key: calls with no explicit receiver.
    pub fn lookup_by_target(&self, key: &TargetKey) -> Vec<Arc<CallRecord>> {
        self.target_bucket(key)
            .iter()
            .map(|entry| Arc::clone(&entry.call))
            .collect()
    }

    pub(crate) fn method_bucket(&self, method: &str) -> &[IndexedCall] {
        self.by_method.get(method).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn target_bucket(&self, key: &TargetKey) -> &[IndexedCall] {
        self.by_target.get(key).map_or(&[], Vec::as_slice)
    }

    pub(crate) fn method_keys(&self) -> impl Iterator<Item = &str> {
        self.by_method.keys().map(String::as_str)
    }

    pub(crate) fn target_keys(&self) -> impl Iterator<Item = &TargetKey> {
        self.by_target.keys()
    }

    /// Number of live records.
    pub fn len(&self) -> usize {
        // Every record lives in exactly one method bucket.
        self.by_method.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty()
    }

    /// Bucket counts for the stats surface.
    pub fn stats(&self) -> IndexStats {
        IndexStats {
            calls: self.len(),
            method_keys: self.by_method.len(),
            target_keys: self.by_target.len(),
        }
    }

    /// Removes every record for which the predicate holds, from both maps
    /// simultaneously. The only mutation entry point besides ingestion: a
    /// record can never be present in one map and absent from the other's
    /// domain.
    pub fn remove_where<F>(&mut self, predicate: F)
    where
        F: Fn(&CallRecord) -> bool,
    {
        Self::retain_buckets(&mut self.by_method, &predicate);
        Self::retain_buckets(&mut self.by_target, &predicate);
    }

    fn retain_buckets<K, F>(buckets: &mut HashMap<K, Vec<IndexedCall>>, predicate: &F)
    where
        F: Fn(&CallRecord) -> bool,
    {
        for bucket in buckets.values_mut() {
            bucket.retain(|entry| !predicate(&entry.call));
        }
        buckets.retain(|_, bucket| !bucket.is_empty());
    }

    /// Removes every template-originated record, or only those from the
    /// named template. Idempotent; removing an unknown name is a no-op.
    pub fn remove_by_template(&mut self, template: Option<&str>) {
        let before = self.len();
        self.remove_where(|call| match (&call.location, template) {
            (CallLocation::Template { name }, Some(expected)) => name == expected,
            (CallLocation::Template { .. }, None) => true,
            _ => false,
        });
        tracing::debug!(
            "Removed {} template call(s) ({})",
            before - self.len(),
            template.unwrap_or("all templates"),
        );
    }

    /// Removes every record originating in one of the named classes.
    /// Idempotent; unknown names are no-ops.
    pub fn remove_by_class(&mut self, classes: &HashSet<String>) {
        if classes.is_empty() {
            return;
        }
        let before = self.len();
        self.remove_where(|call| {
            matches!(&call.location, CallLocation::Class { name } if classes.contains(name))
        });
        tracing::debug!(
            "Removed {} call(s) from {} re-scanned class(es)",
            before - self.len(),
            classes.len(),
        );
    }
}

/// Record and bucket counts.
#[derive(Debug, Clone, Serialize)]
pub struct IndexStats {
    pub calls: usize,
    pub method_keys: usize,
    pub target_keys: usize,
}
