use chrono::{Duration, TimeZone, Utc};
use clap::Parser;
use jotwall_core::config::ClientConfig;
use jotwall_core::layout::arrange;
use jotwall_core::{Note, NoteColor, NoteDraft, NoteId};
use pretty_assertions::assert_eq;

use crate::cli::{Cli, Commands, CompletionShell};
use crate::commands::board::{render_board, render_card, wrap_text};
use crate::commands::colors::palette_lines;
use crate::commands::common::{
    default_editor, format_note_lines, is_affirmative, normalize_content,
    normalize_note_identifier, note_preview, parse_editor_draft, render_editor_draft,
    select_note, truncate_chars,
};
use crate::commands::completions::completion_script;
use crate::commands::config::{mask_secret, merge_profile};
use crate::commands::edit::EditOverrides;
use crate::commands::list::filter_notes;
use crate::config_profiles::CliProfile;
use crate::error::CliError;

fn note(id: &str, title: &str, content: &str, color: NoteColor, minutes_ago: i64) -> Note {
    let now = Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap();
    Note {
        id: NoteId::from(id.to_string()),
        user_id: "user-1".to_string(),
        title: title.to_string(),
        content: content.to_string(),
        color,
        created_at: now - Duration::minutes(minutes_ago),
        updated_at: now - Duration::minutes(minutes_ago),
    }
}

fn fixed_now() -> chrono::DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 3, 10, 12, 0, 0).unwrap()
}

#[test]
fn normalize_content_trims_and_rejects_empty() {
    assert_eq!(normalize_content("  hello  "), Some("hello".to_string()));
    assert_eq!(normalize_content(" \n\t "), None);
    assert_eq!(
        normalize_content("line 1\nline 2\n"),
        Some("line 1\nline 2".to_string())
    );
}

#[test]
fn normalize_note_identifier_rejects_empty() {
    assert!(matches!(
        normalize_note_identifier(" \n "),
        Err(CliError::EmptyNoteId)
    ));
    assert_eq!(normalize_note_identifier("  abc123  ").unwrap(), "abc123");
}

#[test]
fn default_editor_is_defined() {
    assert!(!default_editor().is_empty());
}

#[test]
fn select_note_supports_exact_and_prefix_id() {
    let notes = vec![
        note("11111111-aaaa", "A", "", NoteColor::White, 1),
        note("11111111-bbbb", "B", "", NoteColor::White, 2),
        note("11111111", "Short", "", NoteColor::White, 3),
    ];

    assert_eq!(select_note(&notes, "11111111").unwrap().title, "Short");
    assert_eq!(select_note(&notes, "11111111-b").unwrap().title, "B");
}

#[test]
fn select_note_rejects_ambiguous_and_unknown_prefix() {
    let notes = vec![
        note("abc-1", "A", "", NoteColor::White, 1),
        note("abc-2", "B", "", NoteColor::White, 2),
    ];

    match select_note(&notes, "abc") {
        Err(CliError::AmbiguousNoteId(message)) => {
            assert!(message.contains("abc-1"));
            assert!(message.contains("abc-2"));
        }
        other => panic!("expected ambiguous id error, got {other:?}"),
    }
    assert!(matches!(
        select_note(&notes, "zzz"),
        Err(CliError::NoteNotFound(_))
    ));
}

#[test]
fn editor_draft_roundtrips_title_and_content() {
    let draft = NoteDraft::new("Groceries", "milk\neggs", NoteColor::Green);
    let rendered = render_editor_draft(&draft);
    assert_eq!(rendered, "Groceries\n\nmilk\neggs\n");
    assert_eq!(parse_editor_draft(&rendered, NoteColor::Green), draft);
}

#[test]
fn editor_draft_with_single_line_is_title_only() {
    let draft = parse_editor_draft("\n\nJust a title\n", NoteColor::Rose);
    assert_eq!(draft.title, "Just a title");
    assert_eq!(draft.content, "");
    assert_eq!(draft.color, NoteColor::Rose);
}

#[test]
fn note_preview_truncates_with_ellipsis() {
    let long = note(
        "n",
        "",
        "This is a very long sentence that should be shortened",
        NoteColor::White,
        0,
    );
    assert_eq!(note_preview(&long, 20), "This is a very lo...");
    assert_eq!(truncate_chars("short", 20), "short");
}

#[test]
fn list_lines_show_fallback_title_color_and_age() {
    let notes = vec![note("abc", "  ", "body", NoteColor::Lavender, 5)];
    let lines = format_note_lines(&notes, fixed_now());
    assert_eq!(lines.len(), 1);
    assert!(lines[0].starts_with("abc"));
    assert!(lines[0].contains("Untitled"));
    assert!(lines[0].contains(NoteColor::Lavender.name()));
    assert!(lines[0].ends_with("5m ago"));
}

#[test]
fn filter_notes_by_color_keeps_order_and_limit() {
    let notes = vec![
        note("a", "A", "", NoteColor::Rose, 1),
        note("b", "B", "", NoteColor::White, 2),
        note("c", "C", "", NoteColor::Rose, 3),
        note("d", "D", "", NoteColor::Rose, 4),
    ];

    let titles = |notes: Vec<Note>| notes.into_iter().map(|n| n.title).collect::<Vec<_>>();
    assert_eq!(
        titles(filter_notes(&notes, Some(NoteColor::Rose), 2)),
        vec!["A", "C"]
    );
    assert_eq!(titles(filter_notes(&notes, None, 10)).len(), 4);
}

#[test]
fn wrap_text_breaks_on_words_and_splits_long_words() {
    assert_eq!(
        wrap_text("the quick brown fox", 10),
        vec!["the quick", "brown fox"]
    );
    assert_eq!(wrap_text("abcdefghijkl", 5), vec!["abcde", "fghij", "kl"]);
    assert!(wrap_text("", 10).is_empty());
}

#[test]
fn wrap_text_keeps_blank_lines_between_paragraphs() {
    assert_eq!(wrap_text("one\n\ntwo", 10), vec!["one", "", "two"]);
    assert_eq!(
        wrap_text("first para\n\n\nsecond", 6),
        vec!["first", "para", "", "", "second"]
    );
}

#[test]
fn card_lines_have_uniform_width() {
    let card = render_card(
        &note("abcdef", "Title", "Some content here", NoteColor::Sky, 90),
        16,
        fixed_now(),
    );
    assert!(card.iter().all(|line| line.chars().count() == 20));
    assert!(card[1].contains("Title"));
    assert!(card[card.len() - 2].contains("1h ago"));
}

#[test]
fn board_renders_columns_side_by_side() {
    let notes = vec![
        note("a", "Left", "", NoteColor::White, 1),
        note("b", "Right", "", NoteColor::White, 2),
    ];
    let board = arrange(&notes, 2);
    let rendered = render_board(&board, 12, fixed_now());
    let title_row = rendered.lines().nth(1).unwrap();

    let left = title_row.find("Left").unwrap();
    let right = title_row.find("Right").unwrap();
    assert!(left < right);
    assert_eq!(rendered.lines().count(), 4);
}

#[test]
fn palette_lists_every_color_once() {
    let lines = palette_lines(false);
    assert_eq!(lines.len(), NoteColor::ALL.len());
    assert!(lines[0].contains("(default)"));
    assert_eq!(lines.iter().filter(|l| l.contains("(default)")).count(), 1);
}

#[test]
fn edit_overrides_replace_only_given_fields() {
    let original = note("a", "Title", "Body", NoteColor::Orange, 1);
    assert!(EditOverrides::default().is_empty());

    let draft = EditOverrides {
        title: None,
        content: Some("  New body ".to_string()),
        color: Some(NoteColor::Sky),
    }
    .apply(&original);

    assert_eq!(draft, NoteDraft::new("Title", "New body", NoteColor::Sky));
}

#[test]
fn merge_profile_prefers_explicit_then_env_then_existing() {
    let existing = CliProfile {
        supabase_url: Some("https://old.supabase.co".to_string()),
        supabase_anon_key: Some("old-key".to_string()),
    };

    let merged = merge_profile(
        ClientConfig::new(Some("https://new.supabase.co/".to_string()), None),
        ClientConfig::default(),
        &existing,
    )
    .unwrap();
    assert_eq!(merged.supabase_url.as_deref(), Some("https://new.supabase.co"));
    assert_eq!(merged.supabase_anon_key.as_deref(), Some("old-key"));

    let merged = merge_profile(
        ClientConfig::default(),
        ClientConfig::new(None, Some("env-key".to_string())),
        &existing,
    )
    .unwrap();
    assert_eq!(merged.supabase_anon_key.as_deref(), Some("env-key"));
}

#[test]
fn merge_profile_requires_complete_config() {
    let result = merge_profile(
        ClientConfig::default(),
        ClientConfig::default(),
        &CliProfile::default(),
    );
    assert!(matches!(result, Err(CliError::Config(_))));

    let result = merge_profile(
        ClientConfig::new(Some("https://x.supabase.co".to_string()), None),
        ClientConfig::default(),
        &CliProfile::default(),
    );
    assert!(matches!(result, Err(CliError::Core(_))));
}

#[test]
fn mask_secret_shows_only_the_tail() {
    assert_eq!(mask_secret("abcdefgh"), "****efgh");
    assert_eq!(mask_secret("abc"), "abc");
}

#[test]
fn affirmative_answers() {
    assert!(is_affirmative("y\n"));
    assert!(is_affirmative(" YES "));
    assert!(!is_affirmative("\n"));
    assert!(!is_affirmative("nope"));
}

#[test]
fn add_parses_color_by_name_and_hex() {
    let cli = Cli::try_parse_from(["jotwall", "add", "--color", "rose", "hello", "world"]).unwrap();
    match cli.command {
        Some(Commands::Add { color, content, .. }) => {
            assert_eq!(color, NoteColor::Rose);
            assert_eq!(content, vec!["hello", "world"]);
        }
        _ => panic!("expected add command"),
    }

    let hex = NoteColor::Sky.hex();
    let cli = Cli::try_parse_from(["jotwall", "add", "--color", hex, "x"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Add {
            color: NoteColor::Sky,
            ..
        })
    ));
}

#[test]
fn add_defaults_to_white_and_rejects_unknown_color() {
    let cli = Cli::try_parse_from(["jotwall", "add", "x"]).unwrap();
    assert!(matches!(
        cli.command,
        Some(Commands::Add {
            color: NoteColor::White,
            ..
        })
    ));
    assert!(Cli::try_parse_from(["jotwall", "add", "--color", "plaid", "x"]).is_err());
}

#[test]
fn completions_mention_binary_name() {
    let script = String::from_utf8(completion_script(CompletionShell::Bash)).unwrap();
    assert!(script.contains("jotwall"));
}
