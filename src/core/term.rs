use crate::core::canonical::fold_width;
use crate::domain::model::TranscriptRecord;
use std::cmp::Ordering;

/// Rank of a term within an academic year; a higher rank is later.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TermRank {
    First = 1,
    Second = 2,
    Summer = 3,
    Unrecognized = 9,
}

impl TermRank {
    pub fn parse(term: &str) -> Self {
        let normalized: String = fold_width(term)
            .to_lowercase()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect();

        match normalized.as_str() {
            "1" | "一" | "上" | "上學期" | "第一學期" | "第1學期" | "fall" | "autumn" | "first" | "1st" => {
                TermRank::First
            }
            "2" | "二" | "下" | "下學期" | "第二學期" | "第2學期" | "spring" | "second" | "2nd" => {
                TermRank::Second
            }
            "3" | "暑" | "暑期" | "暑修" | "暑假" | "夏" | "summer" | "寒" | "寒修" | "寒假" | "winter" => {
                TermRank::Summer
            }
            _ => TermRank::Unrecognized,
        }
    }
}

/// (year, term) point in time. Years that are not numerals sort before all
/// numeric years.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct AcademicTerm {
    year: Option<i64>,
    rank: TermRank,
}

impl AcademicTerm {
    pub fn new(year: &str, term: &str) -> Self {
        Self {
            year: fold_width(year).trim().parse().ok(),
            rank: TermRank::parse(term),
        }
    }

    pub fn of(record: &TranscriptRecord) -> Self {
        Self::new(&record.year, &record.term)
    }

    pub fn year(&self) -> Option<i64> {
        self.year
    }

    pub fn rank(&self) -> TermRank {
        self.rank
    }
}

pub fn compare_terms(a: (&str, &str), b: (&str, &str)) -> Ordering {
    AcademicTerm::new(a.0, a.1).cmp(&AcademicTerm::new(b.0, b.1))
}
