//! Diff calculation for change notifications.
//!
//! Computes the difference between the previously persisted snapshot and a
//! freshly extracted one. A missing previous snapshot means the checker is
//! bootstrapping, which is always silent.

use std::collections::{HashMap, HashSet};

use crate::models::{
    AdvertisementSnapshot, ChangeEvent, Entity, ShopSnapshot, Snapshot, StaffSnapshot,
    VersionSnapshot,
};

/// Rank prefix used for members on probation.
pub const PROBATION_PREFIX: &str = "Jr ";

/// Item category that never counts as a new shop item.
pub const EXCLUDED_ITEM_CATEGORY: &str = "EMOTE";

/// Calculate the changes between two snapshots.
pub fn diff(old: Option<&Snapshot>, new: &Snapshot) -> Vec<ChangeEvent> {
    let Some(old) = old else {
        return Vec::new();
    };

    match (old, new) {
        (Snapshot::Version(old), Snapshot::Version(new)) => diff_version(old, new),
        (Snapshot::Staff(old), Snapshot::Staff(new)) => diff_staff(old, new),
        (Snapshot::Shop(old), Snapshot::Shop(new)) => diff_shop(old, new),
        (Snapshot::Advertisement(old), Snapshot::Advertisement(new)) => {
            diff_advertisements(old, new)
        }
        (old, new) => {
            log::warn!(
                "Stored {} snapshot does not match new {} snapshot; treating as first run",
                old.kind(),
                new.kind()
            );
            Vec::new()
        }
    }
}

/// A changed version string is announced as added.
pub fn diff_version(old: &VersionSnapshot, new: &VersionSnapshot) -> Vec<ChangeEvent> {
    if old.version == new.version {
        return Vec::new();
    }
    vec![ChangeEvent::Added(Entity::Version(new.version.clone()))]
}

/// Whether a rank change is the end of a probation period.
pub fn passed_probation(old_rank: &str, new_rank: &str) -> bool {
    old_rank
        .strip_prefix(PROBATION_PREFIX)
        .is_some_and(|rank| rank == new_rank)
}

/// Added and rank changes in new-roster order, then removals in old-roster order.
pub fn diff_staff(old: &StaffSnapshot, new: &StaffSnapshot) -> Vec<ChangeEvent> {
    let old_by_id: HashMap<&str, _> = old.members.iter().map(|m| (m.id.as_str(), m)).collect();
    let new_ids: HashSet<&str> = new.members.iter().map(|m| m.id.as_str()).collect();

    let mut events = Vec::new();

    for member in &new.members {
        match old_by_id.get(member.id.as_str()) {
            None => events.push(ChangeEvent::Added(Entity::Member(member.clone()))),
            Some(previous) if previous.rank != member.rank => {
                events.push(ChangeEvent::RankChanged {
                    member: member.clone(),
                    old_rank: previous.rank.clone(),
                    new_rank: member.rank.clone(),
                    passed_probation: passed_probation(&previous.rank, &member.rank),
                });
            }
            Some(_) => {}
        }
    }

    for member in &old.members {
        if !new_ids.contains(member.id.as_str()) {
            events.push(ChangeEvent::Removed(Entity::Member(member.clone())));
        }
    }

    events
}

/// New banners, new non-emote items and new categories, each only if non-empty.
pub fn diff_shop(old: &ShopSnapshot, new: &ShopSnapshot) -> Vec<ChangeEvent> {
    let mut events = Vec::new();

    let banners = new_strings(&old.banners, &new.banners);
    if !banners.is_empty() {
        events.push(ChangeEvent::ListGrew(
            banners.into_iter().map(Entity::Banner).collect(),
        ));
    }

    let old_ids: HashSet<u64> = old.items.iter().map(|item| item.id).collect();
    let items: Vec<Entity> = new
        .items
        .iter()
        .filter(|item| item.category != EXCLUDED_ITEM_CATEGORY)
        .filter(|item| !old_ids.contains(&item.id))
        .cloned()
        .map(Entity::Item)
        .collect();
    if !items.is_empty() {
        events.push(ChangeEvent::ListGrew(items));
    }

    let categories = new_strings(&old.categories, &new.categories);
    if !categories.is_empty() {
        events.push(ChangeEvent::ListGrew(
            categories.into_iter().map(Entity::Category).collect(),
        ));
    }

    events
}

/// Titles present now that were not present before.
pub fn diff_advertisements(
    old: &AdvertisementSnapshot,
    new: &AdvertisementSnapshot,
) -> Vec<ChangeEvent> {
    let titles = new_strings(&old.titles, &new.titles);
    if titles.is_empty() {
        return Vec::new();
    }
    vec![ChangeEvent::ListGrew(
        titles.into_iter().map(Entity::Advertisement).collect(),
    )]
}

/// Entries of `new` absent from `old`, in `new` order, by exact equality.
fn new_strings(old: &[String], new: &[String]) -> Vec<String> {
    let known: HashSet<&str> = old.iter().map(String::as_str).collect();
    new.iter()
        .filter(|s| !known.contains(s.as_str()))
        .cloned()
        .collect()
}
