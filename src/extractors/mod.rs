//! Entity extractors.
//!
//! Each extractor turns one fetched body into exactly one [`Snapshot`]:
//! - `StaffExtractor` and `ShopExtractor` fold the markup tag-event stream
//! - `VersionExtractor` and `AdvertisementExtractor` read JSON feeds

mod advertisement;
pub mod events;
mod shop;
mod staff;
mod version;

pub use advertisement::AdvertisementExtractor;
pub use events::{TagEvent, tag_events};
pub use shop::{ShopExtractor, ShopParser};
pub use staff::{StaffExtractor, StaffParser};
pub use version::VersionExtractor;

use crate::error::Result;
use crate::models::Snapshot;

/// Turns a raw page body into a snapshot.
pub trait Extractor: Send + Sync {
    /// Page kind, used in logs and errors.
    fn page(&self) -> &'static str;

    /// Extract a snapshot from a page body.
    ///
    /// Markup extractors fail with `MalformedDocument` when a required anchor
    /// is missing. Feed extractors fail with `Payload` on an unexpected shape.
    fn extract(&self, body: &str) -> Result<Snapshot>;

    /// The degenerate snapshot used when the document is malformed.
    fn empty(&self) -> Snapshot;
}
