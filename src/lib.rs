//! Campus marketplace backend library.
//!
//! A community board service: users post help-offering or help-seeking
//! listings with deadlines, comment on them, review counterparties and
//! exchange letters. Serves a JSON API over axum backed by SQLite, with S3
//! photo storage and an HTTP mail relay.

pub mod auth;
pub mod boards;
pub mod config;
pub mod db;
pub mod email;
pub mod error;
pub mod kst;
pub mod storage;
pub mod web;
