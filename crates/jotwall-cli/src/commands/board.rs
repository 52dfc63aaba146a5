use chrono::{DateTime, Utc};
use jotwall_core::layout::{arrange, columns_for_width, MasonryLayout};
use jotwall_core::Note;

use crate::commands::common::{open_signed_in_hub, short_id, truncate_chars};
use crate::error::CliError;

const MIN_CARD_WIDTH: usize = 12;
const MAX_CONTENT_LINES: usize = 8;
const COLUMN_GAP: &str = "  ";

pub async fn run_board(
    columns: Option<usize>,
    width: f32,
    card_width: usize,
    global_profile: Option<&str>,
) -> Result<(), CliError> {
    let hub = open_signed_in_hub(global_profile).await?;
    let notes = hub.store().list();
    if notes.is_empty() {
        println!("No notes yet. Add one with `jotwall add`.");
        return Ok(());
    }

    let columns = columns.unwrap_or_else(|| columns_for_width(width));
    let board = arrange(&notes, columns);
    tracing::debug!(
        "Arranged {} notes into {} columns",
        notes.len(),
        board.len()
    );
    print!("{}", render_board(&board, card_width, Utc::now()));
    Ok(())
}

/// Side-by-side text rendering of a masonry board.
pub fn render_board(board: &MasonryLayout<'_>, card_width: usize, now: DateTime<Utc>) -> String {
    let inner_width = card_width.max(MIN_CARD_WIDTH);
    let outer_width = inner_width + 4;
    let rendered: Vec<Vec<String>> = board
        .iter()
        .map(|column| {
            column
                .items
                .iter()
                .flat_map(|note| render_card(note, inner_width, now))
                .collect()
        })
        .collect();

    let rows = rendered.iter().map(Vec::len).max().unwrap_or(0);
    let mut output = String::new();
    for row in 0..rows {
        let line = rendered
            .iter()
            .map(|lines| {
                let cell = lines.get(row).map_or("", String::as_str);
                format!("{cell:<outer_width$}")
            })
            .collect::<Vec<_>>()
            .join(COLUMN_GAP);
        output.push_str(line.trim_end());
        output.push('\n');
    }
    output
}

/// One boxed card: title, wrapped content, then color, age and short id.
pub fn render_card(note: &Note, inner_width: usize, now: DateTime<Utc>) -> Vec<String> {
    let border = format!("+{}+", "-".repeat(inner_width + 2));
    let boxed = |text: &str| format!("| {text:<inner_width$} |");

    let mut lines = vec![border.clone()];
    lines.push(boxed(truncate_chars(note.display_title(), inner_width).as_str()));

    let mut content = wrap_text(&note.content, inner_width);
    if content.len() > MAX_CONTENT_LINES {
        content.truncate(MAX_CONTENT_LINES);
        if let Some(last) = content.last_mut() {
            *last = truncate_chars(&format!("{last}..."), inner_width);
        }
    }
    lines.extend(content.iter().map(|line| boxed(line.as_str())));

    let footer = format!(
        "{} | {} | {}",
        note.color.name(),
        note.relative_time(now),
        short_id(&note.id)
    );
    lines.push(boxed(truncate_chars(&footer, inner_width).as_str()));
    lines.push(border);
    lines
}

/// Greedy word wrap by character count; words longer than a line are split
/// and blank lines between paragraphs are kept.
pub fn wrap_text(text: &str, width: usize) -> Vec<String> {
    let width = width.max(1);
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        if paragraph.trim().is_empty() {
            lines.push(String::new());
            continue;
        }
        let mut current = String::new();
        let mut current_len = 0;

        for word in paragraph.split_whitespace() {
            let mut word: Vec<char> = word.chars().collect();
            while word.len() > width {
                if current_len > 0 {
                    lines.push(std::mem::take(&mut current));
                    current_len = 0;
                }
                let rest = word.split_off(width);
                lines.push(word.into_iter().collect());
                word = rest;
            }
            if word.is_empty() {
                continue;
            }

            let needed = if current_len == 0 {
                word.len()
            } else {
                current_len + 1 + word.len()
            };
            if needed > width {
                lines.push(std::mem::take(&mut current));
                current_len = 0;
            }
            if current_len > 0 {
                current.push(' ');
                current_len += 1;
            }
            current.extend(word.iter());
            current_len += word.len();
        }

        if current_len > 0 {
            lines.push(current);
        }
    }

    lines
}
