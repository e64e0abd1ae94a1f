pub mod cache;
pub mod config;
pub mod datasource;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod gateway;
pub mod orchestration;
pub mod sink;

pub use cache::{CacheStore, JsonFileCacheStore, ResponseCache, SqliteCacheStore};
pub use config::Config;
pub use datasource::{DataSource, DataSourceError, HttpDataSource, MockDataSource};
pub use domain::{Address, Decimal, TraceRecord, Transaction, TxHash, WalletSet};
pub use engine::{TraceContext, TraceOptions, TraceSummary, Tracer};
pub use error::TraceError;
pub use gateway::{CachedGateway, Endpoints, Gateway};
pub use orchestration::{Orchestrator, RunSummary, WalletOutcome};
pub use sink::{CsvTraceSink, HeaderLabels, TraceSink, VecSink};
