//! camscout - internet-wide IP camera discovery tool
//!
//! This library provides the scan orchestration core:
//! - Candidate gathering from a search provider or an export file
//! - Concurrent connection probing with retry and false-positive rejection
//! - Adjacent- and common-port expansion around hits
//! - Aggregation and merging of confirmed cameras into persisted hosts

pub mod config;
pub mod constants;
pub mod db;
pub mod engine;
pub mod errors;
pub mod expand;
pub mod import;
pub mod merge;
pub mod model;
pub mod probe;
pub mod queue;
pub mod search;
pub mod table;

// Re-export commonly used types for convenience
pub use config::{ScanConfig, ScanMode};
pub use engine::{
    ConsoleProgress, ProgressSink, ScanEngine, ScanProgress, ScanReport, SilentProgress,
};
pub use errors::ScanError;
pub use expand::{expand, ExpandPolicy};
pub use merge::{group_by_host, merge_into_store, HostStore, MemoryHostStore, MergeOutcome};
pub use model::{Camera, CameraType, Candidate, Host, HostRef, SourceRecord};
pub use probe::{Prober, Verdict};
pub use queue::ScanQueue;
pub use search::{gather_hosts, SearchProvider, ShodanSearch};
