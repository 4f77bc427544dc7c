//! alle library entrypoint.
//!
//! Modules:
//! - `app`: startup and shared state
//! - `config`: environment configuration
//! - `http`: Axum router and handlers
//! - `auth`: bearer tokens and the auth middleware
//! - `db`: migrations and SQLite queries
//! - `search`: regex fallback and in-memory paging
//! - `ingest`: inbound MIME parsing and storage
//! - `ai`: chat-completions client, extraction and translation
//! - `notify`: webhook and Telegram notifications
//! - `cleanup`: periodic auto-delete
//! - `models`: typed records used across layers
//! - `util`: tracing setup and HTML flattening

pub mod ai;
pub mod app;
pub mod auth;
pub mod cleanup;
pub mod config;
pub mod db;
pub mod error;
pub mod http;
pub mod ingest;
pub mod models;
pub mod notify;
pub mod search;
pub mod util;
