// src/extractors/shop.rs

//! Shop page extractor.
//!
//! Collects three things in one pass:
//! - banner texts shown above the page header
//! - category tab labels from the tab list
//! - item records from attribute-heavy block elements

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{ShopItem, ShopMarkers, ShopSnapshot, Snapshot};
use crate::utils::{normalize_whitespace, strip_token};

use super::{Extractor, TagEvent, tag_events};

/// Root element whose start resets all accumulated state.
const ROOT_TAG: &str = "html";

/// Tag of one category entry inside the tab list.
const CATEGORY_ENTRY_TAG: &str = "li";

#[derive(Debug, Clone, PartialEq, Eq)]
enum BannerPhase {
    /// Before the header; a banner slot may be waiting for its text
    Open { awaiting_text: bool },
    /// Header seen, no more banners this document
    Closed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum CategoryPhase {
    Outside,
    InTabList {
        tag: String,
        depth: usize,
        entry: Option<String>,
    },
}

/// Streaming consumer of shop page events.
#[derive(Debug)]
pub struct ShopParser<'a> {
    markers: &'a ShopMarkers,
    banners: BannerPhase,
    categories: CategoryPhase,
    tab_list_found: bool,
    seen_items: HashSet<u64>,
    snapshot: ShopSnapshot,
}

impl<'a> ShopParser<'a> {
    pub fn new(markers: &'a ShopMarkers) -> Self {
        Self {
            markers,
            banners: BannerPhase::Open {
                awaiting_text: false,
            },
            categories: CategoryPhase::Outside,
            tab_list_found: false,
            seen_items: HashSet::new(),
            snapshot: ShopSnapshot::default(),
        }
    }

    /// Consume one event.
    pub fn feed(&mut self, event: &TagEvent) {
        match event {
            TagEvent::Start { name, .. } => {
                if name == ROOT_TAG {
                    *self = Self::new(self.markers);
                    return;
                }
                self.banner_start(name, event);
                self.category_start(name, event);
                self.item_start(name, event);
            }
            TagEvent::Text(text) => self.on_text(text),
            TagEvent::End { name } => self.category_end(name),
        }
    }

    fn banner_start(&mut self, name: &str, event: &TagEvent) {
        if let BannerPhase::Open { awaiting_text } = &mut self.banners {
            if name == self.markers.header_tag {
                self.banners = BannerPhase::Closed;
            } else if event.has_class(&self.markers.banner_class) {
                *awaiting_text = true;
            }
        }
    }

    fn category_start(&mut self, name: &str, event: &TagEvent) {
        match &mut self.categories {
            CategoryPhase::Outside => {
                if event.has_class(&self.markers.tab_list_class) {
                    self.tab_list_found = true;
                    self.categories = CategoryPhase::InTabList {
                        tag: name.to_string(),
                        depth: 1,
                        entry: None,
                    };
                }
            }
            CategoryPhase::InTabList { tag, depth, entry } => {
                if name == tag.as_str() {
                    *depth += 1;
                }
                if name == CATEGORY_ENTRY_TAG {
                    if let Some(previous) = entry.take() {
                        push_category(&mut self.snapshot.categories, &previous, &self.markers.decorator);
                    }
                    *entry = Some(String::new());
                }
            }
        }
    }

    fn item_start(&mut self, name: &str, event: &TagEvent) {
        if name != self.markers.item_tag || event.attr_count() < self.markers.min_item_attrs {
            return;
        }
        let id = event
            .attr(&self.markers.item_id_attr)
            .and_then(|id| id.trim().parse::<u64>().ok());
        let item_name = event.attr(&self.markers.item_name_attr);
        let category = event.attr(&self.markers.item_category_attr);

        if let (Some(id), Some(item_name), Some(category)) = (id, item_name, category) {
            if self.seen_items.insert(id) {
                self.snapshot.items.push(ShopItem {
                    id,
                    name: normalize_whitespace(item_name),
                    category: category.trim().to_string(),
                });
            }
        }
    }

    fn on_text(&mut self, text: &str) {
        if let BannerPhase::Open { awaiting_text } = &mut self.banners {
            if *awaiting_text && !text.trim().is_empty() {
                self.snapshot.banners.push(normalize_whitespace(text));
                *awaiting_text = false;
            }
        }
        if let CategoryPhase::InTabList {
            entry: Some(buffer),
            ..
        } = &mut self.categories
        {
            buffer.push_str(text);
            buffer.push(' ');
        }
    }

    fn category_end(&mut self, name: &str) {
        let CategoryPhase::InTabList { tag, depth, entry } = &mut self.categories else {
            return;
        };

        if name == CATEGORY_ENTRY_TAG {
            if let Some(buffer) = entry.take() {
                push_category(&mut self.snapshot.categories, &buffer, &self.markers.decorator);
            }
        }
        if name == tag.as_str() {
            *depth -= 1;
            if *depth == 0 {
                if let Some(buffer) = entry.take() {
                    push_category(&mut self.snapshot.categories, &buffer, &self.markers.decorator);
                }
                self.categories = CategoryPhase::Outside;
            }
        }
    }

    /// Finish the document.
    pub fn finish(self) -> Result<ShopSnapshot> {
        if !self.tab_list_found {
            return Err(AppError::malformed("shop", &self.markers.tab_list_class));
        }
        Ok(self.snapshot)
    }
}

fn push_category(categories: &mut Vec<String>, raw: &str, decorator: &str) {
    let label = strip_token(raw, decorator);
    if !label.is_empty() {
        categories.push(label);
    }
}

/// Extracts items, categories and banners from the shop page.
#[derive(Debug, Clone, Default)]
pub struct ShopExtractor {
    markers: ShopMarkers,
}

impl ShopExtractor {
    pub fn new(markers: ShopMarkers) -> Self {
        Self { markers }
    }
}

impl Extractor for ShopExtractor {
    fn page(&self) -> &'static str {
        "shop"
    }

    fn extract(&self, body: &str) -> Result<Snapshot> {
        let mut parser = ShopParser::new(&self.markers);
        for event in tag_events(body) {
            parser.feed(&event);
        }
        parser.finish().map(Snapshot::Shop)
    }

    fn empty(&self) -> Snapshot {
        Snapshot::Shop(ShopSnapshot::default())
    }
}
