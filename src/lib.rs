// src/lib.rs

//! Outage Watch Library
//!
//! Checks a water utility's status pages for outages in one district and
//! notifies when the listing changes.

pub mod config;
pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;

#[cfg(feature = "lambda")]
pub mod lambda;
