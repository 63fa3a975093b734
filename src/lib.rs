//! # classdump-prune
//!
//! Prunes a JaCoCo classdump to the classes of the local build. Every dumped class
//! whose `<name>.<class id>.class` path does not match a locally built class is moved
//! into a sibling exclusion directory; nothing is deleted.
//!
//! ## Architecture
//!
//! - **classpath**: classpath parsing, local roots, and byte lookup across directories and archives
//! - **fingerprint**: JaCoCo-compatible CRC-64 class ids
//! - **naming**: binary class names and classdump file names
//! - **walk**: the recursive file walk both scans share
//! - **reference**: the set of classdump names to keep
//! - **reconcile**: keeping or moving each dumped class
//! - **pipeline**: one run, stage by stage
//! - **config** / **cli**: the `prune` and `ant` entry points
//! - **report**: the run summary

pub mod classpath;
pub mod cli;
pub mod config;
pub mod error;
pub mod fingerprint;
pub mod naming;
pub mod pipeline;
pub mod reconcile;
pub mod reference;
pub mod report;
pub mod walk;

pub use error::{Error, Result};
