use bigdecimal::{BigDecimal, Zero};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

// ---------------------------------------------------------------------------
// 表格：原始格線與展開後的矩陣
// ---------------------------------------------------------------------------

fn default_span() -> usize {
    1
}

/// One cell of a semi-structured grid, as scraped from a markup table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GridCell {
    #[serde(default)]
    pub text: String,
    /// Label of an embedded hyperlink, if the cell has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
    #[serde(default = "default_span", alias = "rowSpan")]
    pub rowspan: usize,
    #[serde(default = "default_span", alias = "colSpan")]
    pub colspan: usize,
}

impl GridCell {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            link: None,
            rowspan: 1,
            colspan: 1,
        }
    }

    pub fn spanning(text: impl Into<String>, rowspan: usize, colspan: usize) -> Self {
        Self {
            rowspan,
            colspan,
            ..Self::new(text)
        }
    }

    pub fn with_link(mut self, label: impl Into<String>) -> Self {
        self.link = Some(label.into());
        self
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Grid {
    pub rows: Vec<Vec<GridCell>>,
}

impl Grid {
    pub fn new(rows: Vec<Vec<GridCell>>) -> Self {
        Self { rows }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Cell {
    pub text: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl Cell {
    /// 有超連結標籤時優先使用標籤文字
    pub fn label(&self) -> &str {
        match self.link.as_deref() {
            Some(link) if !link.trim().is_empty() => link,
            _ => &self.text,
        }
    }
}

impl From<&GridCell> for Cell {
    fn from(cell: &GridCell) -> Self {
        Self {
            text: cell.text.clone(),
            link: cell.link.clone(),
        }
    }
}

/// Dense matrix produced by despanning a [`Grid`]. Rows may differ in length.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Matrix {
    rows: Vec<Vec<Cell>>,
}

impl Matrix {
    pub fn new(rows: Vec<Vec<Cell>>) -> Self {
        Self { rows }
    }

    /// Plain-text rows without links, mostly for tests and fixtures.
    pub fn from_text_rows<R, S>(rows: R) -> Self
    where
        R: IntoIterator,
        R::Item: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let rows = rows
            .into_iter()
            .map(|row| {
                row.into_iter()
                    .map(|text| Cell {
                        text: text.into(),
                        link: None,
                    })
                    .collect()
            })
            .collect();
        Self { rows }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn row(&self, row: usize) -> &[Cell] {
        self.rows.get(row).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn cell(&self, row: usize, col: usize) -> Option<&Cell> {
        self.rows.get(row).and_then(|cells| cells.get(col))
    }

    pub fn text(&self, row: usize, col: usize) -> &str {
        self.cell(row, col).map(|c| c.text.as_str()).unwrap_or("")
    }

    /// 整列文字以空白串接，用於區段與總結列的判斷
    pub fn row_text(&self, row: usize) -> String {
        self.row(row)
            .iter()
            .map(|c| c.text.trim())
            .collect::<Vec<_>>()
            .join(" ")
    }

    pub fn full_text(&self) -> String {
        (0..self.rows.len())
            .map(|r| self.row_text(r))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

// ---------------------------------------------------------------------------
// 必修科目表
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RequirementRecord {
    pub display_name: String,
    pub key: String,
    pub credit: BigDecimal,
}

impl RequirementRecord {
    pub fn new(display_name: impl Into<String>, key: impl Into<String>, credit: BigDecimal) -> Self {
        Self {
            display_name: display_name.into(),
            key: key.into(),
            credit,
        }
    }
}

/// Requirement records keyed by canonical key, plus the credit targets of the
/// curriculum. A duplicate key replaces the earlier record in place, so
/// iteration follows first appearance while the content is the last one seen.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RequirementSet {
    records: Vec<RequirementRecord>,
    #[serde(skip)]
    index: HashMap<String, usize>,
    required_credits_target: BigDecimal,
    elective_credits_target: Option<BigDecimal>,
    graduate_credits_target: Option<BigDecimal>,
}

impl RequirementSet {
    pub fn new(required_credits_target: BigDecimal) -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
            required_credits_target,
            elective_credits_target: None,
            graduate_credits_target: None,
        }
    }

    pub fn with_required_target(mut self, target: BigDecimal) -> Self {
        self.required_credits_target = target;
        self
    }

    pub fn with_elective_target(mut self, target: Option<BigDecimal>) -> Self {
        self.elective_credits_target = target;
        self
    }

    pub fn with_graduate_target(mut self, target: Option<BigDecimal>) -> Self {
        self.graduate_credits_target = target;
        self
    }

    /// Inserts a record; returns the record it replaced, if any.
    pub fn insert(&mut self, record: RequirementRecord) -> Option<RequirementRecord> {
        match self.index.get(&record.key) {
            Some(&position) => Some(std::mem::replace(&mut self.records[position], record)),
            None => {
                self.index.insert(record.key.clone(), self.records.len());
                self.records.push(record);
                None
            }
        }
    }

    pub fn get(&self, key: &str) -> Option<&RequirementRecord> {
        self.index.get(key).map(|&position| &self.records[position])
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.index.contains_key(key)
    }

    pub fn records(&self) -> &[RequirementRecord] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn credit_sum(&self) -> BigDecimal {
        self.records
            .iter()
            .fold(BigDecimal::zero(), |acc, r| acc + &r.credit)
    }

    pub fn required_credits_target(&self) -> &BigDecimal {
        &self.required_credits_target
    }

    pub fn elective_credits_target(&self) -> Option<&BigDecimal> {
        self.elective_credits_target.as_ref()
    }

    pub fn graduate_credits_target(&self) -> Option<&BigDecimal> {
        self.graduate_credits_target.as_ref()
    }
}

// ---------------------------------------------------------------------------
// 歷年成績
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptRecord {
    #[serde(default)]
    pub year: String,
    #[serde(default)]
    pub term: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub credit: String,
    /// Grade or remark token, e.g. "A-", "抵免", "W".
    #[serde(default, alias = "gpa", alias = "gradeToken")]
    pub grade: String,
}

impl TranscriptRecord {
    pub fn new(
        year: impl Into<String>,
        term: impl Into<String>,
        code: impl Into<String>,
        name: impl Into<String>,
        credit: impl Into<String>,
        grade: impl Into<String>,
    ) -> Self {
        Self {
            year: year.into(),
            term: term.into(),
            code: code.into(),
            name: name.into(),
            credit: credit.into(),
            grade: grade.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// 比對結果
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub earned_total_credits: BigDecimal,
    pub must_total_credits: BigDecimal,
    pub earned_required_credits: BigDecimal,
    pub missing_required_credits: BigDecimal,
    pub elective_credits_target: Option<BigDecimal>,
    pub earned_elective_credits: BigDecimal,
    pub graduate_credits_target: Option<BigDecimal>,
    pub remaining_to_graduate: Option<BigDecimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PassedRequirement {
    pub name: String,
    pub credit: BigDecimal,
    pub source: TranscriptRecord,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingRequirement {
    pub name: String,
    pub credit: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReconciliationReport {
    pub summary: ReportSummary,
    pub passed_required: Vec<PassedRequirement>,
    pub missing_required: Vec<MissingRequirement>,
    pub unmatched_passed: Vec<TranscriptRecord>,
}

impl ReconciliationReport {
    /// 必修學分不缺且沒有未通過的必修
    pub fn all_required_passed(&self) -> bool {
        self.summary.missing_required_credits.is_zero() && self.missing_required.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Pipeline 輸入輸出
// ---------------------------------------------------------------------------

/// A curriculum document holds one table or several candidate tables.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CurriculumDocument {
    Many(Vec<Grid>),
    One(Grid),
}

impl CurriculumDocument {
    pub fn into_grids(self) -> Vec<Grid> {
        match self {
            CurriculumDocument::Many(grids) => grids,
            CurriculumDocument::One(grid) => vec![grid],
        }
    }
}

/// A transcript is either already structured or the scraped transcript table.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TranscriptDocument {
    Records(Vec<TranscriptRecord>),
    Table(Grid),
}

#[derive(Debug, Clone)]
pub struct AuditInput {
    pub curriculum: Vec<Grid>,
    pub transcript: Vec<TranscriptRecord>,
}

#[derive(Debug, Clone, Serialize)]
pub struct AuditOutput {
    pub generated_at: String,
    pub curriculum: RequirementSet,
    pub report: ReconciliationReport,
}
