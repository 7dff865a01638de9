// src/models/mod.rs

//! Domain models for the outage watcher.
//!
//! This module contains all data structures used throughout the application,
//! organized by their primary purpose.

mod category;
mod config;
mod outage;
mod outcome;
mod report;

// Re-export all public types
pub use category::{OutageCategory, StrategyKind};
pub use config::{
    ColumnLayout, Config, EmergencyRules, ExtractConfig, HttpConfig, NotifyConfig, PlannedRules,
    StatusLabel, StorageConfig, WatchConfig,
};
pub use outage::OutageRecord;
pub use outcome::{CategoryOutcome, Failure, FailureKind, Outcome, RunSummary};
pub use report::{CanonicalReport, PersistedState};
