// src/lib.rs

//! auto-news library
//!
//! Polls version feeds, the staff roster, the shop and advertisements on a
//! fixed tick and announces what changed to Discord.

pub mod error;
pub mod extractors;
pub mod models;
pub mod notify;
pub mod pipeline;
pub mod storage;
pub mod utils;
