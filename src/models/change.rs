//! Change events produced by the snapshot differ.

use serde::{Deserialize, Serialize};

use super::snapshot::{ShopItem, StaffMember};

/// One entity a change refers to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Entity {
    Version(String),
    Member(StaffMember),
    Item(ShopItem),
    Category(String),
    Banner(String),
    Advertisement(String),
}

/// One detected difference between two snapshots.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChangeEvent {
    Added(Entity),
    Removed(Entity),
    RankChanged {
        member: StaffMember,
        old_rank: String,
        new_rank: String,
        /// Old rank was the probation ("Jr ") form of the new rank
        passed_probation: bool,
    },
    /// New entries appeared in a list-shaped snapshot
    ListGrew(Vec<Entity>),
}
