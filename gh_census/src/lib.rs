//! GitHub user census
//!
//! # Overview
//!
//! Library collects public profile and repository metadata for every GitHub
//! user matching a location/follower search, persists the result as two flat
//! CSV tables (`users.csv`, `repositories.csv`), and answers a fixed battery
//! of statistical queries over those tables.
//!
//! Ingestion is strictly sequential: one user search paginated until an empty
//! page, then one profile fetch and one paginated repository listing per
//! found user. Failed pages never abort the run; they are reported back as
//! warnings next to whatever was accumulated, and the caller decides whether
//! partial data is acceptable.
//!
//! The `api` feature exposes the [`api::Client`] trait a platform client must
//! implement. The `pipeline` feature (default) adds the orchestrator, the
//! table writers/readers and the query battery.

pub mod model;

#[cfg(feature = "api")]
pub mod api;

#[cfg(feature = "pipeline")]
pub mod ingest;
#[cfg(feature = "pipeline")]
pub mod stats;
#[cfg(feature = "pipeline")]
pub mod table;
