//! Progress resolution over sections and training events.
//!
//! Everything here is a pure function over snapshots: no I/O, no retained
//! state, safe to re-run after every mutation.

use std::collections::hash_map::Entry;
use std::collections::{HashMap, HashSet};

use crate::model::{ProgressState, Section, SectionId, TrainingEvent};

//
// ─── SECTION PROGRESS ──────────────────────────────────────────────────────────
//

/// A section annotated with a student's current progress on it.
///
/// Links in a prerequisite chain are reported in this shape.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SectionProgress {
    pub section: Section,
    pub state: ProgressState,
}

//
// ─── PROGRESS COMPUTATION ──────────────────────────────────────────────────────
//

/// Computes the current [`ProgressState`] of every section for one student.
///
/// The state for a section is the `event_type` of that student's most recent
/// event on it (maximum timestamp, ties broken by highest event id), or
/// [`ProgressState::NotStarted`] when no event exists. The result covers
/// exactly the sections in `sections`; events referencing unknown sections
/// are ignored.
///
/// Output depends only on timestamp and id values, never on the ordering of
/// `events`.
#[must_use]
pub fn compute_progress(
    sections: &[Section],
    events: &[TrainingEvent],
) -> HashMap<SectionId, ProgressState> {
    let mut latest: HashMap<SectionId, &TrainingEvent> = HashMap::new();
    for event in events {
        match latest.entry(event.section_id) {
            Entry::Occupied(mut slot) => {
                let current = *slot.get();
                if (event.timestamp, event.id) > (current.timestamp, current.id) {
                    slot.insert(event);
                }
            }
            Entry::Vacant(slot) => {
                slot.insert(event);
            }
        }
    }

    sections
        .iter()
        .map(|section| {
            let state = latest
                .get(&section.id())
                .map_or(ProgressState::NotStarted, |event| {
                    ProgressState::from(event.event_type)
                });
            (section.id(), state)
        })
        .collect()
}

//
// ─── PREREQUISITE CHAIN ────────────────────────────────────────────────────────
//

/// Resolves the ordered prerequisite chain of a section.
///
/// Walks `prerequisite` links starting at `section_id`, then returns the
/// ancestors ordered from the most distant one down to the immediate
/// prerequisite — the queried section itself is excluded. The walk stops at
/// a section with no prerequisite, at a dangling reference, or on revisiting
/// a section, so it terminates even if the stored links contain a cycle.
///
/// Sections missing from the `progress` mapping are annotated `NotStarted`.
/// Unknown `section_id` yields an empty chain.
#[must_use]
pub fn prerequisite_chain(
    section_id: SectionId,
    sections: &[Section],
    progress: &HashMap<SectionId, ProgressState>,
) -> Vec<SectionProgress> {
    let by_id: HashMap<SectionId, &Section> =
        sections.iter().map(|section| (section.id(), section)).collect();

    let mut visited: HashSet<SectionId> = HashSet::new();
    let mut ancestry: Vec<SectionProgress> = Vec::new();
    let mut current = Some(section_id);

    while let Some(id) = current {
        if !visited.insert(id) {
            break;
        }
        let Some(section) = by_id.get(&id) else {
            break;
        };
        let state = progress.get(&id).copied().unwrap_or_default();
        ancestry.push(SectionProgress {
            section: (*section).clone(),
            state,
        });
        current = section.prerequisite();
    }

    // The walk starts at the queried section; the chain contract excludes it
    // and runs root-first.
    let mut chain: Vec<SectionProgress> = ancestry.into_iter().skip(1).collect();
    chain.reverse();
    chain
}

//
// ─── HISTORY GROUPING ──────────────────────────────────────────────────────────
//

/// Groups a student's events by section, each group newest-first.
///
/// Ties on timestamp fall back to highest event id, matching
/// [`compute_progress`]: the head of each group is always the event that
/// decided the section's state.
#[must_use]
pub fn history_by_section(
    events: &[TrainingEvent],
) -> HashMap<SectionId, Vec<TrainingEvent>> {
    let mut grouped: HashMap<SectionId, Vec<TrainingEvent>> = HashMap::new();
    for event in events {
        grouped
            .entry(event.section_id)
            .or_default()
            .push(event.clone());
    }

    for group in grouped.values_mut() {
        group.sort_by(|a, b| (b.timestamp, b.id).cmp(&(a.timestamp, a.id)));
    }

    grouped
}

//
// ─── TESTS ─────────────────────────────────────────────────────────────────────
//

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{EventType, TrainingId, UserId};
    use crate::time::fixed_now;
    use chrono::Duration;

    fn section(id: u64, prerequisite: Option<u64>) -> Section {
        Section::new(
            SectionId::new(id),
            format!("Section {id}"),
            prerequisite.map(SectionId::new),
            true,
        )
        .unwrap()
    }

    fn event(id: u64, section_id: u64, event_type: EventType, days: i64) -> TrainingEvent {
        TrainingEvent {
            id: TrainingId::new(id),
            student_id: UserId::generate(),
            pi_id: UserId::generate(),
            section_id: SectionId::new(section_id),
            event_type,
            timestamp: fixed_now() + Duration::days(days),
            notes: None,
        }
    }

    #[test]
    fn progress_covers_every_section_exactly_once() {
        let sections = vec![section(1, None), section(2, Some(1)), section(3, Some(2))];
        let events = vec![event(1, 1, EventType::Completed, 0)];

        let progress = compute_progress(&sections, &events);

        assert_eq!(progress.len(), 3);
        assert_eq!(progress[&SectionId::new(1)], ProgressState::Completed);
        assert_eq!(progress[&SectionId::new(2)], ProgressState::NotStarted);
        assert_eq!(progress[&SectionId::new(3)], ProgressState::NotStarted);
    }

    #[test]
    fn most_recent_event_wins() {
        let sections = vec![section(1, None)];
        let events = vec![
            event(1, 1, EventType::Trained, 0),
            event(2, 1, EventType::Completed, 5),
            event(3, 1, EventType::Retrained, 2),
        ];

        let progress = compute_progress(&sections, &events);
        assert_eq!(progress[&SectionId::new(1)], ProgressState::Completed);
    }

    #[test]
    fn progress_is_order_invariant() {
        let sections = vec![section(1, None)];
        let mut events = vec![
            event(1, 1, EventType::Trained, 0),
            event(2, 1, EventType::Completed, 5),
            event(3, 1, EventType::Retrained, 2),
        ];

        let forward = compute_progress(&sections, &events);
        events.reverse();
        let backward = compute_progress(&sections, &events);

        assert_eq!(forward, backward);
    }

    #[test]
    fn equal_timestamps_break_toward_highest_id() {
        let sections = vec![section(1, None)];
        let events = vec![
            event(9, 1, EventType::Completed, 3),
            event(4, 1, EventType::Trained, 3),
        ];

        let progress = compute_progress(&sections, &events);
        assert_eq!(progress[&SectionId::new(1)], ProgressState::Completed);
    }

    #[test]
    fn events_for_unknown_sections_are_ignored() {
        let sections = vec![section(1, None)];
        let events = vec![event(1, 99, EventType::Completed, 0)];

        let progress = compute_progress(&sections, &events);
        assert_eq!(progress.len(), 1);
        assert_eq!(progress[&SectionId::new(1)], ProgressState::NotStarted);
    }

    #[test]
    fn empty_inputs_are_valid() {
        assert!(compute_progress(&[], &[]).is_empty());

        let sections = vec![section(1, None)];
        let progress = compute_progress(&sections, &[]);
        assert_eq!(progress[&SectionId::new(1)], ProgressState::NotStarted);
    }

    #[test]
    fn chain_runs_root_first_excluding_queried_section() {
        // 3 requires 2, 2 requires 1
        let sections = vec![section(1, None), section(2, Some(1)), section(3, Some(2))];
        let events = vec![
            event(1, 1, EventType::Completed, 0),
            event(2, 2, EventType::Trained, 1),
        ];
        let progress = compute_progress(&sections, &events);

        let chain = prerequisite_chain(SectionId::new(3), &sections, &progress);

        let ids: Vec<_> = chain.iter().map(|link| link.section.id().value()).collect();
        assert_eq!(ids, vec![1, 2]);
        assert_eq!(chain[0].state, ProgressState::Completed);
        assert_eq!(chain[1].state, ProgressState::Trained);
    }

    #[test]
    fn section_without_prerequisite_has_empty_chain() {
        let sections = vec![section(1, None)];
        let progress = compute_progress(&sections, &[]);

        assert!(prerequisite_chain(SectionId::new(1), &sections, &progress).is_empty());
    }

    #[test]
    fn unknown_section_has_empty_chain() {
        let sections = vec![section(1, None)];
        let progress = compute_progress(&sections, &[]);

        assert!(prerequisite_chain(SectionId::new(42), &sections, &progress).is_empty());
    }

    #[test]
    fn dangling_reference_terminates_chain() {
        // 2's prerequisite was deleted from the store
        let sections = vec![section(2, Some(99)), section(3, Some(2))];
        let progress = compute_progress(&sections, &[]);

        let chain = prerequisite_chain(SectionId::new(3), &sections, &progress);

        let ids: Vec<_> = chain.iter().map(|link| link.section.id().value()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn cyclic_links_terminate() {
        let a = Section::new(SectionId::new(1), "A", Some(SectionId::new(2)), true).unwrap();
        let b = Section::new(SectionId::new(2), "B", Some(SectionId::new(1)), true).unwrap();
        let sections = vec![a, b];
        let progress = compute_progress(&sections, &[]);

        let chain = prerequisite_chain(SectionId::new(1), &sections, &progress);

        // Walk visits 1 then 2, stops on revisiting 1; only 2 remains after
        // dropping the start.
        let ids: Vec<_> = chain.iter().map(|link| link.section.id().value()).collect();
        assert_eq!(ids, vec![2]);
    }

    #[test]
    fn missing_progress_entries_default_to_not_started() {
        let sections = vec![section(1, None), section(2, Some(1))];
        let empty = HashMap::new();

        let chain = prerequisite_chain(SectionId::new(2), &sections, &empty);
        assert_eq!(chain[0].state, ProgressState::NotStarted);
    }

    #[test]
    fn history_groups_sections_newest_first() {
        let events = vec![
            event(1, 1, EventType::Trained, 0),
            event(2, 1, EventType::Completed, 5),
            event(3, 2, EventType::Trained, 1),
        ];

        let history = history_by_section(&events);

        assert_eq!(history.len(), 2);
        let first = &history[&SectionId::new(1)];
        assert_eq!(first.len(), 2);
        assert_eq!(first[0].id, TrainingId::new(2));
        assert_eq!(first[1].id, TrainingId::new(1));
    }

    #[test]
    fn history_head_matches_progress_on_ties() {
        let sections = vec![section(1, None)];
        let events = vec![
            event(4, 1, EventType::Trained, 3),
            event(9, 1, EventType::Completed, 3),
        ];

        let progress = compute_progress(&sections, &events);
        let history = history_by_section(&events);

        let head = &history[&SectionId::new(1)][0];
        assert_eq!(ProgressState::from(head.event_type), progress[&SectionId::new(1)]);
    }

    #[test]
    fn laser_curriculum_resolves_end_to_end() {
        let basic = Section::new(SectionId::new(1), "Basic Safety", None, true).unwrap();
        let laser =
            Section::new(SectionId::new(2), "Laser Use", Some(SectionId::new(1)), true).unwrap();
        let advanced =
            Section::new(SectionId::new(3), "Advanced Laser", Some(SectionId::new(2)), true)
                .unwrap();
        let sections = vec![basic, laser, advanced];

        let events = vec![
            event(1, 1, EventType::Completed, 0),
            event(2, 2, EventType::Trained, 31),
        ];

        let progress = compute_progress(&sections, &events);
        assert_eq!(progress[&SectionId::new(1)], ProgressState::Completed);
        assert_eq!(progress[&SectionId::new(2)], ProgressState::Trained);
        assert_eq!(progress[&SectionId::new(3)], ProgressState::NotStarted);

        let chain = prerequisite_chain(SectionId::new(3), &sections, &progress);
        let names: Vec<_> = chain.iter().map(|link| link.section.name()).collect();
        assert_eq!(names, vec!["Basic Safety", "Laser Use"]);
    }
}
