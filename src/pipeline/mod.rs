//! Polling pipeline.
//!
//! - `checker`: fetch, extract, diff and persist one source
//! - `diff`: compare two snapshots into change events
//! - `scheduler`: tick loop and delayed announcement queue

pub mod checker;
pub mod diff;
pub mod scheduler;

use std::sync::Arc;

pub use checker::{Checker, PageChecker};
pub use diff::diff;
pub use scheduler::{DelayedAnnouncement, DelayedQueue, Scheduler, TickCounter, TickReport};

use crate::extractors::{
    AdvertisementExtractor, ShopExtractor, StaffExtractor, VersionExtractor,
};
use crate::models::CheckersConfig;
use crate::utils::http::Fetch;

/// Build a checker for every enabled source, in a fixed order.
pub fn build_checkers(config: &CheckersConfig, fetcher: Arc<dyn Fetch>) -> Vec<Box<dyn Checker>> {
    let mut checkers: Vec<Box<dyn Checker>> = Vec::new();

    let version = &config.version;
    if version.enabled {
        checkers.push(Box::new(
            PageChecker::new(
                &version.key,
                &version.url,
                VersionExtractor::new(version.json_path.clone()),
                Arc::clone(&fetcher),
            )
            .with_interval(version.interval_ticks)
            .with_delay(version.announce_delay_ticks),
        ));
    }

    let staff = &config.staff;
    if staff.enabled {
        checkers.push(Box::new(
            PageChecker::new(
                &staff.key,
                staff.resolved_url(),
                StaffExtractor::new(staff.markers.clone()),
                Arc::clone(&fetcher),
            )
            .with_interval(staff.interval_ticks)
            .with_delay(staff.announce_delay_ticks),
        ));
    }

    let shop = &config.shop;
    if shop.enabled {
        checkers.push(Box::new(
            PageChecker::new(
                &shop.key,
                &shop.url,
                ShopExtractor::new(shop.markers.clone()),
                Arc::clone(&fetcher),
            )
            .with_interval(shop.interval_ticks)
            .with_delay(shop.announce_delay_ticks),
        ));
    }

    let ads = &config.advertisement;
    if ads.enabled {
        checkers.push(Box::new(
            PageChecker::new(
                &ads.key,
                &ads.url,
                AdvertisementExtractor::new(&ads.list_key, ads.exclusions.clone()),
                Arc::clone(&fetcher),
            )
            .with_interval(ads.interval_ticks)
            .with_delay(ads.announce_delay_ticks),
        ));
    }

    checkers
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::checker::tests::ScriptedFetcher;

    #[test]
    fn test_default_config_builds_version_checker_only() {
        let checkers = build_checkers(
            &CheckersConfig::default(),
            Arc::new(ScriptedFetcher::default()),
        );

        assert_eq!(checkers.len(), 1);
        assert_eq!(checkers[0].key(), "labymod_version");
        assert_eq!(checkers[0].interval_ticks(), 5);
        assert_eq!(checkers[0].announce_delay_ticks(), 30);
    }

    #[test]
    fn test_enabled_checkers_keep_order() {
        let mut config = CheckersConfig::default();
        config.staff.enabled = true;
        config.shop.enabled = true;
        config.advertisement.enabled = true;

        let checkers = build_checkers(&config, Arc::new(ScriptedFetcher::default()));
        let keys: Vec<&str> = checkers.iter().map(|c| c.key()).collect();
        assert_eq!(
            keys,
            vec!["labymod_version", "staff_members", "shop", "advertisements"]
        );
    }
}
