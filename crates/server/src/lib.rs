//! Puzzle acquisition and the worksheet web service.

pub mod clients;
pub mod config;
pub mod error;
pub mod routes;
pub mod service;
pub mod sources;
