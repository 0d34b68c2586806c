use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Rows are lettered, so a grid has at most 26 of them.
pub const MAX_ROWS: i32 = 26;

/// Keeps `rows * columns` well inside `i32`.
pub const MAX_COLUMNS: i32 = 100;

/// Fixed seat layout of a showtime. Seats are numbered 1..=rows*columns in
/// row-major order: seat 1 is `A1`, seat `columns + 1` is `B1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatGrid {
    pub rows: i32,
    pub columns: i32,
}

impl SeatGrid {
    pub fn new(rows: i32, columns: i32) -> Option<Self> {
        if (1..=MAX_ROWS).contains(&rows) && (1..=MAX_COLUMNS).contains(&columns) {
            Some(Self { rows, columns })
        } else {
            None
        }
    }

    pub fn capacity(&self) -> i32 {
        self.rows * self.columns
    }

    pub fn contains(&self, index: i32) -> bool {
        (1..=self.capacity()).contains(&index)
    }

    pub fn indices(&self) -> impl Iterator<Item = i32> {
        1..=self.capacity()
    }

    pub fn label(&self, index: i32) -> Option<String> {
        if !self.contains(index) {
            return None;
        }
        let row = (index - 1) / self.columns;
        let column = (index - 1) % self.columns + 1;
        Some(format!("{}{}", row_letter(row), column))
    }

    pub fn labels<'a>(&self, indices: impl IntoIterator<Item = &'a i32>) -> Vec<String> {
        indices
            .into_iter()
            .filter_map(|index| self.label(*index))
            .collect()
    }

    /// Seat grid grouped by row, flagging the seats in `taken`.
    pub fn layout(&self, taken: &BTreeSet<i32>) -> Vec<SeatRow> {
        (0..self.rows)
            .map(|row| {
                let first = row * self.columns + 1;
                let seats = (first..first + self.columns)
                    .map(|index| Seat {
                        index,
                        label: format!("{}{}", row_letter(row), index - first + 1),
                        taken: taken.contains(&index),
                    })
                    .collect();
                SeatRow {
                    row: row_letter(row).to_string(),
                    seats,
                }
            })
            .collect()
    }
}

fn row_letter(row: i32) -> char {
    // row < MAX_ROWS is guaranteed by SeatGrid::new
    char::from(b'A' + row as u8)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Seat {
    pub index: i32,
    pub label: String,
    pub taken: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SeatRow {
    pub row: String,
    pub seats: Vec<Seat>,
}
