pub mod chain;
pub mod planner;
pub mod predicate;

pub use chain::{is_chain_query, stringify_chain, CHAIN_SEPARATOR};
pub use planner::CallQuery;
pub use predicate::{MatchPredicate, TargetFilter};
