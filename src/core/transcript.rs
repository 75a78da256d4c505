use crate::core::canonical::fold_width;
use crate::domain::model::{Matrix, TranscriptRecord};
use crate::utils::error::{AuditError, Result};
use std::collections::HashMap;
use tracing::debug;

/// 歷年成績表必須具備的欄位標題
pub const TRANSCRIPT_HEADINGS: [&str; 6] = ["學年度", "學期", "選課代號", "科目名稱", "學分", "GPA"];

/// Converts a scraped transcript table into transcript records.
///
/// The heading row is the first row carrying every heading in
/// [`TRANSCRIPT_HEADINGS`]; each non-empty row below it becomes one record.
pub fn transcript_from_matrix(matrix: &Matrix) -> Result<Vec<TranscriptRecord>> {
    let Some((heading_row, columns)) = find_heading_row(matrix) else {
        return Err(AuditError::TranscriptLayout {
            missing: missing_headings(matrix),
        });
    };

    let column = |heading: &str| columns.get(heading).copied();
    let field = |row: usize, heading: &str| {
        column(heading)
            .map(|col| matrix.text(row, col).trim().to_string())
            .unwrap_or_default()
    };

    let records: Vec<TranscriptRecord> = (heading_row + 1..matrix.len())
        .filter(|&row| !matrix.row(row).is_empty())
        .map(|row| {
            TranscriptRecord::new(
                field(row, "學年度"),
                field(row, "學期"),
                field(row, "選課代號"),
                field(row, "科目名稱"),
                field(row, "學分"),
                field(row, "GPA"),
            )
        })
        .collect();

    debug!(heading_row, records = records.len(), "transcript table extracted");
    Ok(records)
}

fn headings_of(matrix: &Matrix, row: usize) -> HashMap<String, usize> {
    // 同名標題以最右邊那欄為準
    matrix
        .row(row)
        .iter()
        .enumerate()
        .map(|(col, cell)| (fold_width(cell.text.trim()), col))
        .collect()
}

fn find_heading_row(matrix: &Matrix) -> Option<(usize, HashMap<String, usize>)> {
    (0..matrix.len()).find_map(|row| {
        let columns = headings_of(matrix, row);
        TRANSCRIPT_HEADINGS
            .iter()
            .all(|h| columns.contains_key(*h))
            .then_some((row, columns))
    })
}

/// Headings missing from the row that comes closest to a full heading row.
fn missing_headings(matrix: &Matrix) -> Vec<String> {
    let missing_in = |row: usize| -> Vec<String> {
        let columns = headings_of(matrix, row);
        TRANSCRIPT_HEADINGS
            .iter()
            .filter(|h| !columns.contains_key(**h))
            .map(|h| h.to_string())
            .collect()
    };

    (0..matrix.len())
        .map(missing_in)
        .min_by_key(Vec::len)
        .unwrap_or_else(|| TRANSCRIPT_HEADINGS.iter().map(|h| h.to_string()).collect())
}
