//! Call-site index and query engine for a static-analysis security scanner.
//!
//! An upstream extractor turns source files into flat call records; this
//! crate indexes one batch of records per analysis pass and answers the
//! queries the vulnerability checks issue against them. Between passes the
//! orchestrator prunes re-scanned templates and classes through the
//! maintenance operations before any further queries run.

pub mod checks;
pub mod error;
pub mod index;
pub mod query;

pub use checks::{
    load_checks, CheckConfig, CheckRegistry, CheckRunner, Confidence, ModelRegistry,
    ResolvedMethods, Warning, ALL_MODELS,
};
pub use error::{Result, ScanError};
pub use index::{CallIndex, CallLocation, CallRecord, Expr, IndexStats, Target, TargetKey, UserInputKind};
pub use query::{is_chain_query, stringify_chain, CallQuery, MatchPredicate, TargetFilter};
