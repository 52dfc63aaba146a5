//! Masonry column balancing.
//!
//! Notes are consumed in display order and each one is dropped into the
//! currently shortest column (lowest index on ties). This is a greedy online
//! heuristic, not an optimal partition, but it is deterministic and has no
//! hidden state: the whole board is recomputed from the list every time.

use crate::models::Note;

/// Fixed card chrome (padding, date line, margins).
pub const BASE_HEIGHT: u64 = 120;
/// Title characters per rendered line.
pub const TITLE_CHARS_PER_LINE: u64 = 20;
pub const TITLE_LINE_HEIGHT: u64 = 20;
/// Content characters per rendered line.
pub const CONTENT_CHARS_PER_LINE: u64 = 30;
pub const CONTENT_LINE_HEIGHT: u64 = 15;

/// Widths above this get three columns instead of two.
pub const WIDE_LAYOUT_MIN_WIDTH: f32 = 768.0;
const HORIZONTAL_PADDING: f32 = 32.0;
const COLUMN_GAP: f32 = 12.0;

/// Estimated rendered height of a note card.
///
/// Lengths are UTF-16 code units, so a non-BMP character counts twice.
pub fn estimated_height(note: &Note) -> u64 {
    estimate_for_lengths(
        note.title.encode_utf16().count(),
        note.content.encode_utf16().count(),
    )
}

/// `120 + ceil(title/20)*20 + ceil(content/30)*15`
pub fn estimate_for_lengths(title_len: usize, content_len: usize) -> u64 {
    let title_lines = to_u64(title_len).div_ceil(TITLE_CHARS_PER_LINE);
    let content_lines = to_u64(content_len).div_ceil(CONTENT_CHARS_PER_LINE);
    BASE_HEIGHT
        .saturating_add(title_lines.saturating_mul(TITLE_LINE_HEIGHT))
        .saturating_add(content_lines.saturating_mul(CONTENT_LINE_HEIGHT))
}

/// Column count for the available width: 3 on tablets, 2 otherwise.
pub fn columns_for_width(width: f32) -> usize {
    if width > WIDE_LAYOUT_MIN_WIDTH {
        3
    } else {
        2
    }
}

/// Width of one card when `width` is split into `columns` columns.
#[allow(clippy::cast_precision_loss)]
pub fn card_width(width: f32, columns: usize) -> f32 {
    let columns = columns.max(1) as f32;
    (width - HORIZONTAL_PADDING - (columns - 1.0) * COLUMN_GAP) / columns
}

/// One column of the board and its accumulated estimated height.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column<T> {
    pub items: Vec<T>,
    pub height: u64,
}

impl<T> Default for Column<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            height: 0,
        }
    }
}

/// Board produced by [`arrange`].
pub type MasonryLayout<'a> = Vec<Column<&'a Note>>;

/// Partition notes into `columns` balanced columns using [`estimated_height`].
///
/// `columns` of zero is treated as one.
pub fn arrange(notes: &[Note], columns: usize) -> MasonryLayout<'_> {
    arrange_by(notes, columns, |note| estimated_height(note))
}

/// Greedy shortest-column placement with a caller-supplied height.
pub fn arrange_by<T, F>(
    items: impl IntoIterator<Item = T>,
    columns: usize,
    mut height: F,
) -> Vec<Column<T>>
where
    F: FnMut(&T) -> u64,
{
    let mut board: Vec<Column<T>> = (0..columns.max(1)).map(|_| Column::default()).collect();

    for item in items {
        let item_height = height(&item);
        let target = shortest_column(&board);
        let column = &mut board[target];
        column.height = column.height.saturating_add(item_height);
        column.items.push(item);
    }

    board
}

/// Index of the shortest column; the first one wins ties.
fn shortest_column<T>(board: &[Column<T>]) -> usize {
    board
        .iter()
        .enumerate()
        .min_by_key(|(_, column)| column.height)
        .map_or(0, |(index, _)| index)
}

fn to_u64(value: usize) -> u64 {
    u64::try_from(value).unwrap_or(u64::MAX)
}
