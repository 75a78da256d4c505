use crate::domain::model::{Cell, Grid, Matrix};

/// 與瀏覽器相同，colspan 上限 1000
const MAX_COLSPAN: usize = 1000;

/// Despans a grid into a dense matrix.
///
/// Rows are processed top to bottom and cells left to right. Each cell starts
/// at the first free column of its row and its text is written into every
/// slot of its rowspan x colspan block. An already occupied slot is never
/// overwritten; the write moves right to the next free slot instead, so
/// overlapping spans shift rather than clobber. Rowspans that reach past the
/// last row are clipped. Holes left by ragged rows become empty cells.
pub fn build_matrix(grid: &Grid) -> Matrix {
    let height = grid.rows.len();
    let mut slots: Vec<Vec<Option<Cell>>> = vec![Vec::new(); height];

    for (row_index, row) in grid.rows.iter().enumerate() {
        let mut col = 0;
        for cell in row {
            while is_occupied(&slots[row_index], col) {
                col += 1;
            }

            let rows_covered = cell.rowspan.max(1).min(height - row_index);
            let cols_covered = cell.colspan.clamp(1, MAX_COLSPAN);
            let value = Cell::from(cell);

            for target in &mut slots[row_index..row_index + rows_covered] {
                let mut target_col = col;
                for _ in 0..cols_covered {
                    while is_occupied(target, target_col) {
                        target_col += 1;
                    }
                    place(target, target_col, value.clone());
                    target_col += 1;
                }
            }

            col += cols_covered;
        }
    }

    Matrix::new(
        slots
            .into_iter()
            .map(|row| row.into_iter().map(Option::unwrap_or_default).collect())
            .collect(),
    )
}

fn is_occupied(row: &[Option<Cell>], col: usize) -> bool {
    matches!(row.get(col), Some(Some(_)))
}

fn place(row: &mut Vec<Option<Cell>>, col: usize, cell: Cell) {
    if row.len() <= col {
        row.resize(col + 1, None);
    }
    row[col] = Some(cell);
}
