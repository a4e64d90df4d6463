//! services/api/src/lib.rs
//!
//! Library root for the `api` service, shared by the `api` and `openapi`
//! binaries and by the test suite.

pub mod adapters;
pub mod config;
pub mod error;
pub mod parse;
pub mod pipeline;
pub mod web;
