//! Transcript-to-curriculum reconciliation.

use crate::core::bucket::requirement_key;
use crate::core::credit::parse_credit;
use crate::core::grade::classify_grade;
use crate::core::term::AcademicTerm;
use crate::domain::model::{
    MissingRequirement, PassedRequirement, ReconciliationReport, ReportSummary, RequirementSet,
    TranscriptRecord,
};
use bigdecimal::{BigDecimal, Zero};
use std::collections::hash_map::Entry;
use std::collections::HashMap;
use tracing::{debug, warn};

/// Matches passing transcript records against the requirement set.
///
/// Only passing records are considered. When several attempts match the same
/// requirement the latest (year, term) is kept; equal terms go to the record
/// that appears later in `records`. Never fails.
pub fn reconcile(set: &RequirementSet, records: &[TranscriptRecord]) -> ReconciliationReport {
    let mut earned_total = BigDecimal::zero();
    let mut latest: HashMap<String, &TranscriptRecord> = HashMap::new();
    let mut unmatched_passed = Vec::new();

    for record in records.iter().filter(|r| classify_grade(&r.grade)) {
        match parse_credit(&record.credit) {
            Some(credit) => earned_total += credit,
            None => warn!(name = %record.name, credit = %record.credit, "unparsable credit excluded from totals"),
        }

        let key = requirement_key(&record.name);
        if key.is_empty() || !set.contains_key(&key) {
            unmatched_passed.push(record.clone());
            continue;
        }

        match latest.entry(key) {
            Entry::Vacant(slot) => {
                slot.insert(record);
            }
            Entry::Occupied(mut slot) => {
                // >= 讓同學期的重複紀錄以後出現者為準
                if AcademicTerm::of(record) >= AcademicTerm::of(slot.get()) {
                    slot.insert(record);
                }
            }
        }
    }

    let mut earned_required = BigDecimal::zero();
    let mut passed_required = Vec::new();
    let mut missing_required = Vec::new();

    for requirement in set.records() {
        match latest.get(&requirement.key) {
            Some(&attempt) => {
                let credit = if requirement.credit.is_zero() {
                    parse_credit(&attempt.credit).unwrap_or_else(BigDecimal::zero)
                } else {
                    requirement.credit.clone()
                };
                debug!(key = %requirement.key, year = %attempt.year, term = %attempt.term, "requirement satisfied");
                earned_required += &credit;
                passed_required.push(PassedRequirement {
                    name: requirement.display_name.clone(),
                    credit,
                    source: attempt.clone(),
                });
            }
            None => missing_required.push(MissingRequirement {
                name: requirement.display_name.clone(),
                credit: requirement.credit.clone(),
            }),
        }
    }

    let required_target = set.required_credits_target().clone();
    let summary = ReportSummary {
        missing_required_credits: non_negative(&required_target - &earned_required),
        earned_elective_credits: non_negative(&earned_total - &earned_required),
        elective_credits_target: set.elective_credits_target().cloned(),
        graduate_credits_target: set.graduate_credits_target().cloned(),
        remaining_to_graduate: set
            .graduate_credits_target()
            .map(|target| non_negative(target - &earned_total)),
        earned_total_credits: earned_total,
        must_total_credits: required_target,
        earned_required_credits: earned_required,
    };

    ReconciliationReport {
        summary,
        passed_required,
        missing_required,
        unmatched_passed,
    }
}

fn non_negative(value: BigDecimal) -> BigDecimal {
    if value < BigDecimal::zero() {
        BigDecimal::zero()
    } else {
        value
    }
}
