//! Snapshot data structures.

use serde::{Deserialize, Serialize};

/// The fully parsed state of one page at one point in time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Snapshot {
    Version(VersionSnapshot),
    Staff(StaffSnapshot),
    Shop(ShopSnapshot),
    Advertisement(AdvertisementSnapshot),
}

impl Snapshot {
    /// Short name of the snapshot kind, used in logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Snapshot::Version(_) => "version",
            Snapshot::Staff(_) => "staff",
            Snapshot::Shop(_) => "shop",
            Snapshot::Advertisement(_) => "advertisement",
        }
    }

    /// Number of entities held by the snapshot.
    pub fn len(&self) -> usize {
        match self {
            Snapshot::Version(_) => 1,
            Snapshot::Staff(staff) => staff.members.len(),
            Snapshot::Shop(shop) => shop.items.len() + shop.categories.len() + shop.banners.len(),
            Snapshot::Advertisement(ads) => ads.titles.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Latest published launcher version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VersionSnapshot {
    pub version: String,
}

/// A staff member listed on the team page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffMember {
    /// Member identifier with the markup prefix removed
    pub id: String,

    /// Display name
    pub name: String,

    /// Rank label, e.g. "Jr Mod"
    pub rank: String,
}

/// Staff roster in document order. Ids are unique.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StaffSnapshot {
    pub members: Vec<StaffMember>,
}

impl StaffSnapshot {
    /// Look up a member by id.
    pub fn get(&self, id: &str) -> Option<&StaffMember> {
        self.members.iter().find(|m| m.id == id)
    }
}

/// A purchasable shop item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopItem {
    pub id: u64,
    pub name: String,
    pub category: String,
}

/// Shop catalog, categories and banners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShopSnapshot {
    /// Items in document order. Ids are unique.
    pub items: Vec<ShopItem>,

    /// Category tabs in document order
    pub categories: Vec<String>,

    /// Banner texts in document order
    pub banners: Vec<String>,
}

/// Advertisement titles that passed the visibility and exclusion filters.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdvertisementSnapshot {
    pub titles: Vec<String>,
}
