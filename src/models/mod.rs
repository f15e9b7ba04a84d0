// src/models/mod.rs

//! Domain models for the news service.
//!
//! This module contains the data structures shared by the extractors, the
//! differ, the scheduler and the storage backends.

mod change;
mod config;
mod snapshot;

// Re-export all public types
pub use change::{ChangeEvent, Entity};
pub use config::{
    AdvertisementCheckerConfig, CheckersConfig, Config, HttpConfig, LoggingConfig,
    NotifierConfig, ShopCheckerConfig, ShopMarkers, StaffCheckerConfig, StaffMarkers,
    StorageConfig, TickerConfig, VersionCheckerConfig,
};
pub use snapshot::{
    AdvertisementSnapshot, ShopItem, ShopSnapshot, Snapshot, StaffMember, StaffSnapshot,
    VersionSnapshot,
};
