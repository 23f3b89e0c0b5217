// src/lib.rs

//! Content Monitor Library
//!
//! Tracks the publication pages and video channels of organisations and
//! turns each fetched listing into an ordered, reconciled snapshot.

pub mod config;
pub mod crawler;
pub mod error;
pub mod models;
pub mod monitor;
pub mod pipeline;
pub mod registry;
pub mod storage;
pub mod utils;

#[cfg(test)]
mod testing;
