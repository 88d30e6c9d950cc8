use anyhow::Result;
use serde::Serialize;
use themeshot_cli::OutputFormat;
use themeshot_core::Theme;

#[derive(Serialize)]
struct ThemeEntry {
    name: &'static str,
    label: &'static str,
    screenshot: String,
}

fn entries() -> Vec<ThemeEntry> {
    Theme::ALL
        .iter()
        .map(|theme| ThemeEntry {
            name: theme.as_str(),
            label: theme.label(),
            screenshot: theme.artifact_name(),
        })
        .collect()
}

pub fn execute(format: OutputFormat) -> Result<()> {
    let entries = entries();

    match format {
        OutputFormat::Pretty => print_pretty(&entries),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }

    Ok(())
}

fn print_pretty(entries: &[ThemeEntry]) {
    use console::style;

    println!("\n{}", style("Theme Presets").bold().cyan());
    println!("{}", style("=============").cyan());
    println!();

    for entry in entries {
        println!(
            "  {:<12} {:<12} {}",
            style(entry.name).green().bold(),
            entry.label,
            style(&entry.screenshot).dim()
        );
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_cover_every_theme() {
        let entries = entries();
        assert_eq!(entries.len(), Theme::ALL.len());
        assert!(
            entries
                .iter()
                .any(|e| e.name == "single-page" && e.screenshot == "single-page-theme.png")
        );
    }
}
