//! Rendering of change events into announcements.

use crate::models::{ChangeEvent, Entity};

use super::Announcement;

/// Human-readable name of an entity.
fn label(entity: &Entity) -> String {
    match entity {
        Entity::Version(version) => version.clone(),
        Entity::Member(member) => format!("{} ({})", member.name, member.rank),
        Entity::Item(item) => item.name.clone(),
        Entity::Category(category) => category.clone(),
        Entity::Banner(banner) => banner.clone(),
        Entity::Advertisement(title) => title.clone(),
    }
}

fn bullet_list(entities: &[Entity]) -> String {
    entities
        .iter()
        .map(|e| format!("- {}", label(e)))
        .collect::<Vec<_>>()
        .join("\n")
}

fn single(event: &ChangeEvent) -> Option<Announcement> {
    let announcement = match event {
        ChangeEvent::Added(Entity::Version(version)) => Announcement::new(format!(
            "New version **{version}** published. Please check!"
        )),
        ChangeEvent::Added(Entity::Member(member)) => Announcement::new(format!(
            "**{}** joined the team as {}",
            member.name, member.rank
        )),
        ChangeEvent::Removed(Entity::Member(member)) => Announcement::new(format!(
            "**{}** ({}) left the team",
            member.name, member.rank
        )),
        ChangeEvent::Added(entity) => Announcement::new(format!("Added: {}", label(entity))),
        ChangeEvent::Removed(entity) => Announcement::new(format!("Removed: {}", label(entity))),
        ChangeEvent::RankChanged {
            member,
            new_rank,
            passed_probation: true,
            ..
        } => Announcement::new(format!(
            "**{}** passed their probation and is now {}",
            member.name, new_rank
        )),
        ChangeEvent::RankChanged {
            member,
            old_rank,
            new_rank,
            passed_probation: false,
        } => Announcement::new(format!(
            "**{}** changed rank: {} -> {}",
            member.name, old_rank, new_rank
        )),
        ChangeEvent::ListGrew(entities) => match entities.first()? {
            Entity::Banner(_) => {
                Announcement::new("New shop banner online!").with_detail(bullet_list(entities))
            }
            Entity::Advertisement(_) => {
                Announcement::new("New advertisement published!").with_detail(bullet_list(entities))
            }
            _ => Announcement::new("New entries:").with_detail(bullet_list(entities)),
        },
    };
    Some(announcement)
}

/// Render the events of one checker run.
///
/// New shop items and new shop categories from the same run are merged into
/// a single announcement listing both groups.
pub fn render(events: &[ChangeEvent]) -> Vec<Announcement> {
    let mut out = Vec::new();
    let mut items: Vec<Entity> = Vec::new();
    let mut categories: Vec<Entity> = Vec::new();

    for event in events {
        if let ChangeEvent::ListGrew(entities) = event {
            match entities.first() {
                Some(Entity::Item(_)) => {
                    items.extend(entities.iter().cloned());
                    continue;
                }
                Some(Entity::Category(_)) => {
                    categories.extend(entities.iter().cloned());
                    continue;
                }
                _ => {}
            }
        }
        out.extend(single(event));
    }

    if !items.is_empty() || !categories.is_empty() {
        let mut sections = Vec::new();
        if !items.is_empty() {
            sections.push(format!("**Items**\n{}", bullet_list(&items)));
        }
        if !categories.is_empty() {
            sections.push(format!("**Categories**\n{}", bullet_list(&categories)));
        }
        out.push(Announcement::new("The shop has been updated!").with_detail(sections.join("\n\n")));
    }

    out
}
