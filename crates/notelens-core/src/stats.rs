use std::collections::{BTreeMap, BTreeSet};

use crate::model::{NoteTable, Quality};

/// Per-quality counters, always reported in `Quality::ORDERED` order.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct QualityCounts {
    pub good: u64,
    pub ok: u64,
    pub bad: u64,
}

impl QualityCounts {
    pub fn bump(&mut self, quality: Quality) {
        match quality {
            Quality::Good => self.good += 1,
            Quality::Ok => self.ok += 1,
            Quality::Bad => self.bad += 1,
        }
    }

    pub fn get(&self, quality: Quality) -> u64 {
        match quality {
            Quality::Good => self.good,
            Quality::Ok => self.ok,
            Quality::Bad => self.bad,
        }
    }

    pub fn total(&self) -> u64 {
        self.good + self.ok + self.bad
    }
}

/// Pipeline order for the stage chart. Unknown stages land in `Other`.
pub const STAGE_ORDER: [&str; 8] = [
    "Submitted",
    "Client Submission",
    "Initial Screen Scheduled",
    "Interview Scheduled",
    "Offer Extended",
    "Offer Accepted",
    "Placed",
    "Other",
];

/// Map a raw Bullhorn action stage to its consolidated pipeline stage.
pub fn consolidate_stage(stage: &str) -> &'static str {
    match stage {
        "Submitted"
        | "Account Manager Feedback"
        | "Account Manager Rejected"
        | "Candidate Availability"
        | "Candidate Feedback"
        | "Candidate Not Interested"
        | "Contacted"
        | "Conversation"
        | "Note from Recruiter"
        | "Note from Sourcer"
        | "Prospect Touch"
        | "Qualifying Call"
        | "Sales Call" => "Submitted",
        "Client Submission"
        | "Client Availability"
        | "Client Feedback"
        | "Client Interview Request"
        | "Client Rejected / Passed" => "Client Submission",
        "Initial Screen Scheduled" => "Initial Screen Scheduled",
        "Interview Scheduled" => "Interview Scheduled",
        "Offer Extended" => "Offer Extended",
        "Offer Accepted" => "Offer Accepted",
        "Placed" => "Placed",
        _ => "Other",
    }
}

/// Count notes per quality label across the whole table.
pub fn quality_distribution(table: &NoteTable) -> QualityCounts {
    let mut counts = QualityCounts::default();
    for row in table.rows() {
        counts.bump(row.quality);
    }
    counts
}

/// Count notes per (consolidated stage, quality). A note touching several
/// raw stages that consolidate to the same pipeline stage is counted once
/// for that stage. Stages with no notes are omitted; the rest follow
/// `STAGE_ORDER`.
pub fn quality_by_stage(table: &NoteTable) -> Vec<(&'static str, QualityCounts)> {
    let mut by_index: BTreeMap<usize, QualityCounts> = BTreeMap::new();
    for row in table.rows() {
        let consolidated: BTreeSet<&'static str> = row
            .action_stages
            .iter()
            .map(|stage| consolidate_stage(stage))
            .collect();
        for stage in consolidated {
            let index = STAGE_ORDER
                .iter()
                .position(|s| *s == stage)
                .unwrap_or(STAGE_ORDER.len() - 1);
            by_index.entry(index).or_default().bump(row.quality);
        }
    }
    by_index
        .into_iter()
        .map(|(index, counts)| (STAGE_ORDER[index], counts))
        .collect()
}

/// Count notes per anonymized recruiter, alphabetically.
pub fn quality_by_recruiter(table: &NoteTable) -> Vec<(String, QualityCounts)> {
    let mut by_name: BTreeMap<String, QualityCounts> = BTreeMap::new();
    for row in table.rows() {
        by_name
            .entry(anonymize_name(&row.commenter))
            .or_default()
            .bump(row.quality);
    }
    by_name.into_iter().collect()
}

/// Shorten a display name to first name plus last-name initial.
/// Single-word names pass through unchanged.
pub fn anonymize_name(name: &str) -> String {
    let parts: Vec<&str> = name.split_whitespace().collect();
    match parts.as_slice() {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, .., last] => match last.chars().next() {
            Some(initial) => format!("{first} {initial}."),
            None => (*first).to_string(),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::NoteRecord;

    fn table(rows: Vec<NoteRecord>) -> NoteTable {
        NoteTable::new(rows).expect("valid table")
    }

    fn note(quality: Quality, commenter: &str, stages: &[&str]) -> NoteRecord {
        NoteRecord {
            quality,
            commenter: commenter.to_string(),
            action_stages: stages.iter().map(|s| s.to_string()).collect(),
        }
    }

    #[test]
    fn distribution_counts_every_row() {
        let table = table(vec![
            note(Quality::Good, "Jane Doe", &[]),
            note(Quality::Good, "Sam Hill", &[]),
            note(Quality::Bad, "Jane Doe", &[]),
        ]);
        let counts = quality_distribution(&table);
        assert_eq!(counts.good, 2);
        assert_eq!(counts.ok, 0);
        assert_eq!(counts.bad, 1);
        assert_eq!(counts.total(), 3);
    }

    #[test]
    fn consolidates_known_stages() {
        assert_eq!(consolidate_stage("Qualifying Call"), "Submitted");
        assert_eq!(consolidate_stage("Client Feedback"), "Client Submission");
        assert_eq!(consolidate_stage("Placed"), "Placed");
    }

    #[test]
    fn unknown_stage_maps_to_other() {
        assert_eq!(consolidate_stage("Reference Check"), "Other");
    }

    #[test]
    fn stage_counts_dedupe_within_a_note() {
        // Both raw stages consolidate to "Submitted"; one note, one count.
        let table = table(vec![note(
            Quality::Good,
            "Jane Doe",
            &["Contacted", "Note from Recruiter"],
        )]);
        let stages = quality_by_stage(&table);
        let expected = QualityCounts {
            good: 1,
            ok: 0,
            bad: 0,
        };
        assert_eq!(stages, vec![("Submitted", expected)]);
    }

    #[test]
    fn stages_follow_pipeline_order_with_other_last() {
        let table = table(vec![
            note(Quality::Ok, "Jane Doe", &["Reference Check"]),
            note(Quality::Good, "Jane Doe", &["Placed"]),
            note(Quality::Bad, "Sam Hill", &["Submitted"]),
        ]);
        let order: Vec<&str> = quality_by_stage(&table)
            .into_iter()
            .map(|(stage, _)| stage)
            .collect();
        assert_eq!(order, vec!["Submitted", "Placed", "Other"]);
    }

    #[test]
    fn rows_without_stages_are_skipped_by_stage_chart() {
        let table = table(vec![note(Quality::Good, "Jane Doe", &[])]);
        assert!(quality_by_stage(&table).is_empty());
    }

    #[test]
    fn recruiters_are_anonymized_and_sorted() {
        let table = table(vec![
            note(Quality::Good, "Sam Hill", &[]),
            note(Quality::Bad, "Jane Doe", &[]),
            note(Quality::Ok, "Jane Doe", &[]),
        ]);
        let recruiters = quality_by_recruiter(&table);
        assert_eq!(recruiters.len(), 2);
        assert_eq!(recruiters[0].0, "Jane D.");
        assert_eq!(recruiters[0].1.bad, 1);
        assert_eq!(recruiters[0].1.ok, 1);
        assert_eq!(recruiters[1].0, "Sam H.");
    }

    #[test]
    fn anonymize_keeps_single_word_names() {
        assert_eq!(anonymize_name("Cher"), "Cher");
    }

    #[test]
    fn anonymize_uses_last_word_for_initial() {
        assert_eq!(anonymize_name("Mary Jane Watson"), "Mary W.");
    }
}
