// src/lib.rs

//! zpwatch Library
//!
//! Change-detection and diff-notification engine for a ZwiftPower roster
//! table: extract the table, fingerprint the stabilized markup, diff against
//! the previous snapshot and dispatch rendered notifications.

pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
