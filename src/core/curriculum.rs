//! Curriculum section parsing.
//!
//! Finds the bilingual "required courses" header in a despanned curriculum
//! table, then walks the rows below it, collecting course rows into a
//! [`RequirementSet`] and picking up the required / elective / graduation
//! credit targets from the summary rows.

use crate::core::bucket::requirement_key;
use crate::core::canonical::fold_width;
use crate::core::credit::{is_plain_number, parse_credit};
use crate::domain::model::{Matrix, RequirementRecord, RequirementSet};
use crate::utils::error::{AuditError, Result};
use bigdecimal::{BigDecimal, Zero};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use std::sync::LazyLock;
use tracing::{debug, warn};

/// A section header must carry both the local phrase and a translated one.
struct SectionRule {
    local: &'static [&'static str],
    translated: &'static [&'static str],
}

impl SectionRule {
    fn matches(&self, text: &str) -> bool {
        let lowered = fold_width(text).to_lowercase();
        self.local.iter().any(|k| lowered.contains(k))
            && self.translated.iter().any(|k| lowered.contains(k))
    }
}

const REQUIRED_SECTION: SectionRule = SectionRule {
    local: &["必修"],
    translated: &["department required courses", "required courses", "compulsory courses"],
};

const ELECTIVE_SECTION: SectionRule = SectionRule {
    local: &["選修"],
    translated: &["elective courses", "electives", "elective"],
};

static REQUIRED_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:必修學分數|required\s+credits?)[^\d]*(\d+)").expect("valid regex")
});
static ELECTIVE_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:選修學分數|elective\s+credits?)[^\d]*(\d+)").expect("valid regex")
});
static GRADUATE_TARGET: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(?:畢業學分數|graduation\s+credits?|credits?\s+for\s+graduation)[^\d]*(\d+)")
        .expect("valid regex")
});

static CODE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9A-Za-z]{3,}\s*-\s*").expect("valid regex"));
static CODE_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[0-9A-Za-z]{3,}\s*-\s*.*").expect("valid regex"));
static COURSE_LEXICON: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)專題|論文|研究|導論|實作|實驗|課程|書報討論|seminar|thesis|research|methodology|演算法|algorithms?|資料結構|data\s*structures?|作業系統|operating\s*systems?|計算機結構|計算機組織|computer\s*architecture|線性代數|linear\s*algebra|微積分|calculus",
    )
    .expect("valid regex")
});
static AREA_HEADER: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)領域|學群|\barea\b").expect("valid regex"));
static CREDIT_HEADING: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)學分|credits?").expect("valid regex"));

/// 表格範例列通常緊接在必修標題列之後
const SAMPLE_ROWS: usize = 4;

/// Column indices (0-based) of the course name and credit cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColumnLayout {
    pub name: usize,
    pub credit: usize,
}

/// Overrides for column detection, usually coming from configuration.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParserOptions {
    pub name_column: Option<usize>,
    pub credit_column: Option<usize>,
}

#[derive(Debug, Default)]
struct CreditTargets {
    required: Option<BigDecimal>,
    elective: Option<BigDecimal>,
    graduate: Option<BigDecimal>,
}

pub fn parse_curriculum(matrix: &Matrix) -> Result<RequirementSet> {
    parse_curriculum_with(matrix, &ParserOptions::default())
}

pub fn parse_curriculum_with(matrix: &Matrix, options: &ParserOptions) -> Result<RequirementSet> {
    let header = find_required_header(matrix).ok_or_else(|| {
        AuditError::structural("required-course section header (必修 / Required Courses) not found")
    })?;

    let detected = detect_columns(matrix, header);
    let layout = ColumnLayout {
        name: options.name_column.unwrap_or(detected.name),
        credit: options.credit_column.unwrap_or(detected.credit),
    };
    debug!(header, name_column = layout.name, credit_column = layout.credit, "required section located");

    let mut targets = CreditTargets::default();
    let mut requirements = RequirementSet::new(BigDecimal::zero());
    let mut collecting = true;

    for row in header..matrix.len() {
        let text = matrix.row_text(row);

        let mut is_target_row = false;
        if let Some(value) = capture_target(&REQUIRED_TARGET, &text) {
            targets.required = Some(value);
            is_target_row = true;
            // 必修學分數列代表必修課程列已結束，但仍往下找其他學分門檻
            collecting = false;
        }
        if let Some(value) = capture_target(&ELECTIVE_TARGET, &text) {
            targets.elective = Some(value);
            is_target_row = true;
        }
        if let Some(value) = capture_target(&GRADUATE_TARGET, &text) {
            targets.graduate = Some(value);
            is_target_row = true;
        }
        if is_target_row || !collecting {
            continue;
        }

        if row != header && ELECTIVE_SECTION.matches(&text) && !REQUIRED_SECTION.matches(&text) {
            debug!(row, "elective section reached, course collection stops");
            collecting = false;
            continue;
        }

        match course_from_row(matrix, row, layout) {
            Some(record) => {
                if let Some(previous) = requirements.insert(record) {
                    debug!(row, key = %previous.key, "duplicate requirement key, later row wins");
                }
            }
            None => debug!(row, "row skipped"),
        }
    }

    if requirements.is_empty() {
        return Err(AuditError::structural(
            "required-course section found but no course rows were recognized",
        ));
    }

    let required = match targets.required {
        Some(value) => value,
        None => {
            let derived = requirements.credit_sum();
            warn!(%derived, "required credit target missing, using sum of course credits");
            derived
        }
    };

    Ok(requirements
        .with_required_target(required)
        .with_elective_target(targets.elective)
        .with_graduate_target(targets.graduate))
}

fn find_required_header(matrix: &Matrix) -> Option<usize> {
    (0..matrix.len()).find(|&row| REQUIRED_SECTION.matches(&matrix.row_text(row)))
}

fn capture_target(pattern: &Regex, text: &str) -> Option<BigDecimal> {
    let folded = fold_width(text);
    let caps = pattern.captures(&folded)?;
    BigDecimal::from_str(caps.get(1)?.as_str()).ok()
}

fn course_from_row(matrix: &Matrix, row: usize, layout: ColumnLayout) -> Option<RequirementRecord> {
    let raw = matrix.cell(row, layout.name)?.label();
    let folded = fold_width(raw);
    let trimmed = folded.trim();
    if trimmed.is_empty() {
        return None;
    }

    // 同一格混有區段標題時，只留「代碼-課名」之後的部分
    let name = match CODE_NAME.find(trimmed) {
        Some(m) => m.as_str().trim(),
        None if REQUIRED_SECTION.matches(trimmed) || ELECTIVE_SECTION.matches(trimmed) => {
            return None
        }
        None => trimmed,
    };

    let credit_text = matrix.text(row, layout.credit).trim();
    let numeric_credit = is_plain_number(credit_text);

    if AREA_HEADER.is_match(name) && !numeric_credit {
        return None;
    }

    let credit = parse_credit(credit_text).unwrap_or_else(BigDecimal::zero);
    let positive_credit = numeric_credit && credit > BigDecimal::zero();
    let looks_like_course =
        CODE_PREFIX.is_match(name) || COURSE_LEXICON.is_match(name) || positive_credit;
    if !looks_like_course {
        return None;
    }

    let key = requirement_key(name);
    if key.is_empty() {
        return None;
    }

    Some(RequirementRecord::new(name, key, credit))
}

/// Infers where the course name and credit columns are.
///
/// The name column is the first cell that starts with a course code in the
/// rows right after the section header (default 0). The credit column is the
/// first top-row heading mentioning credits; if there is none, or it is not
/// right of the name column, the first purely numeric cell after the name
/// column in that sample row is used (default name + 1).
pub fn detect_columns(matrix: &Matrix, header_row: usize) -> ColumnLayout {
    let heading = matrix
        .row(0)
        .iter()
        .position(|cell| CREDIT_HEADING.is_match(&cell.text) && !REQUIRED_SECTION.matches(&cell.text));

    let sample = (header_row..matrix.len().min(header_row + SAMPLE_ROWS)).find_map(|row| {
        matrix
            .row(row)
            .iter()
            .position(|cell| CODE_PREFIX.is_match(fold_width(cell.label()).trim()))
            .map(|col| (row, col))
    });

    let name = sample.map(|(_, col)| col).unwrap_or(0);
    let sample_row = sample.map(|(row, _)| row).unwrap_or(header_row);

    let credit = match heading {
        Some(col) if col > name => col,
        _ => matrix
            .row(sample_row)
            .iter()
            .enumerate()
            .skip(name + 1)
            .find(|(_, cell)| is_plain_number(&cell.text))
            .map(|(col, _)| col)
            .unwrap_or(name + 1),
    };

    ColumnLayout { name, credit }
}

/// Picks the candidate table most likely to be the curriculum table.
/// Ties go to the earlier table; an empty slice yields `None`.
pub fn select_curriculum_matrix(candidates: &[Matrix]) -> Option<usize> {
    let mut best: Option<(usize, u32)> = None;
    for (index, matrix) in candidates.iter().enumerate() {
        let score = curriculum_score(matrix);
        if best.map_or(true, |(_, top)| score > top) {
            best = Some((index, score));
        }
    }
    best.map(|(index, _)| index)
}

fn curriculum_score(matrix: &Matrix) -> u32 {
    let text = matrix.full_text();
    let mut score = 0;
    if text.contains("必修學分數") {
        score += 5;
    }
    if text.contains("畢業學分數") {
        score += 5;
    }
    if (0..matrix.len()).any(|row| REQUIRED_SECTION.matches(&matrix.row_text(row))) {
        score += 6;
    }
    if (0..matrix.len()).any(|row| ELECTIVE_SECTION.matches(&matrix.row_text(row))) {
        score += 3;
    }
    score
}
