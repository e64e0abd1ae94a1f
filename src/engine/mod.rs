//! Trace engine: the backward walk from a starting transaction toward the
//! wallets that funded it.

pub mod tracer;

pub use tracer::{BranchFailure, TraceContext, TraceOptions, TraceSummary, Tracer};
