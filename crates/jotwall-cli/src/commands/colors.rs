use std::io::{self, IsTerminal};

use jotwall_core::NoteColor;

pub fn run_colors() {
    for line in palette_lines(io::stdout().is_terminal()) {
        println!("{line}");
    }
}

/// One line per palette entry, with a truecolor swatch when `swatch` is set.
pub fn palette_lines(swatch: bool) -> Vec<String> {
    NoteColor::ALL
        .iter()
        .map(|color| {
            let marker = if *color == NoteColor::default() {
                "  (default)"
            } else {
                ""
            };
            let prefix = if swatch {
                let (r, g, b) = color.rgb();
                format!("\x1b[48;2;{r};{g};{b}m    \x1b[0m ")
            } else {
                String::new()
            };
            format!("{prefix}{:<8} {}{marker}", color.name(), color.hex())
        })
        .collect()
}
