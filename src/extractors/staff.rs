// src/extractors/staff.rs

//! Staff roster extractor.

use std::collections::HashSet;

use crate::error::{AppError, Result};
use crate::models::{Snapshot, StaffMarkers, StaffMember, StaffSnapshot};
use crate::utils::normalize_whitespace;

use super::{Extractor, TagEvent, tag_events};

/// A member link whose display name has not been read yet.
#[derive(Debug, Clone, PartialEq, Eq)]
struct PendingMember {
    id: String,
    rank: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum StaffState {
    Idle,
    /// Container marker seen, waiting for the body marker
    Prepared,
    /// Inside the roster body
    Collecting { pending: Option<PendingMember> },
}

/// Streaming consumer of staff page events.
#[derive(Debug)]
pub struct StaffParser<'a> {
    markers: &'a StaffMarkers,
    state: StaffState,
    members: Vec<StaffMember>,
    seen: HashSet<String>,
    body_found: bool,
}

impl<'a> StaffParser<'a> {
    pub fn new(markers: &'a StaffMarkers) -> Self {
        Self {
            markers,
            state: StaffState::Idle,
            members: Vec::new(),
            seen: HashSet::new(),
            body_found: false,
        }
    }

    /// Consume one event.
    pub fn feed(&mut self, event: &TagEvent) {
        match event {
            TagEvent::Start { name, .. } => self.on_start(name, event),
            TagEvent::Text(text) => self.on_text(text),
            TagEvent::End { name } => {
                if matches!(self.state, StaffState::Collecting { .. }) && *name != self.markers.link_tag
                {
                    self.state = StaffState::Idle;
                }
            }
        }
    }

    fn on_start(&mut self, name: &str, event: &TagEvent) {
        match &mut self.state {
            StaffState::Idle => {
                if event.has_class(&self.markers.container_class) {
                    self.state = StaffState::Prepared;
                }
            }
            StaffState::Prepared => {
                if event.has_class(&self.markers.body_class) {
                    self.members.clear();
                    self.seen.clear();
                    self.body_found = true;
                    self.state = StaffState::Collecting { pending: None };
                }
            }
            StaffState::Collecting { pending } => {
                if name != self.markers.link_tag {
                    return;
                }
                let id = event.attr(&self.markers.id_attr);
                let rank = event.attr(&self.markers.rank_attr);
                if let (Some(id), Some(rank)) = (id, rank) {
                    let id = id.strip_prefix(self.markers.id_prefix.as_str()).unwrap_or(id);
                    *pending = Some(PendingMember {
                        id: id.trim().to_string(),
                        rank: normalize_whitespace(rank),
                    });
                }
            }
        }
    }

    fn on_text(&mut self, text: &str) {
        let StaffState::Collecting { pending } = &mut self.state else {
            return;
        };
        if text.trim().is_empty() {
            return;
        }
        let Some(member) = pending.take() else {
            return;
        };

        let name = normalize_whitespace(text);
        if member.id.is_empty() || member.rank.is_empty() {
            return;
        }
        if self.seen.insert(member.id.clone()) {
            self.members.push(StaffMember {
                id: member.id,
                name,
                rank: member.rank,
            });
        }
    }

    /// Finish the document.
    pub fn finish(self) -> Result<StaffSnapshot> {
        if !self.body_found {
            return Err(AppError::malformed("staff", &self.markers.body_class));
        }
        Ok(StaffSnapshot {
            members: self.members,
        })
    }
}

/// Extracts the staff roster from the team page.
#[derive(Debug, Clone, Default)]
pub struct StaffExtractor {
    markers: StaffMarkers,
}

impl StaffExtractor {
    pub fn new(markers: StaffMarkers) -> Self {
        Self { markers }
    }
}

impl Extractor for StaffExtractor {
    fn page(&self) -> &'static str {
        "staff"
    }

    fn extract(&self, body: &str) -> Result<Snapshot> {
        let mut parser = StaffParser::new(&self.markers);
        for event in tag_events(body) {
            parser.feed(&event);
        }
        parser.finish().map(Snapshot::Staff)
    }

    fn empty(&self) -> Snapshot {
        Snapshot::Staff(StaffSnapshot::default())
    }
}
