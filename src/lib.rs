// src/lib.rs

//! Job Crawler Library
//!
//! Harvests posting links from a recruitment page, keeps them in a sealed
//! SQLite file, and publishes a checksummed snapshot of it.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod storage;
pub mod utils;
