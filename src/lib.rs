//! Test Management System server library.
//!
//! Provides the hierarchy (nested-set tree store), combinatorial plan
//! materialization, rollup statistics, and subtree copy engines behind
//! the HTTP API.

pub mod api;
pub mod config;
pub mod db;
pub mod entity;
pub mod error;
pub mod middleware;
pub mod migration;
pub mod models;
pub mod services;
pub mod tree;
