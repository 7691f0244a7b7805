pub mod call_index;
pub mod record;

pub use call_index::{CallIndex, IndexStats};
pub use record::{CallLocation, CallRecord, Expr, Target, TargetKey, UserInputKind};
