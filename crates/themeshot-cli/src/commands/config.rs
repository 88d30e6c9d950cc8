use super::RunArgs;
use anyhow::Result;
use themeshot_cli::OutputFormat;
use themeshot_core::{RunConfig, ThemeControl};

/// Print the effective configuration after file and flag overrides
pub fn execute(args: &RunArgs, format: OutputFormat) -> Result<()> {
    let config = args.resolve()?.redacted();

    match format {
        OutputFormat::Pretty => print_pretty(&config),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&config)?),
    }

    Ok(())
}

fn print_pretty(config: &RunConfig) {
    use console::style;

    println!("\n{}", style("Run Configuration").bold().cyan());
    println!("{}", style("=================").cyan());

    println!("\n{}", style("Target:").bold());
    println!("  Base URL:      {}", config.base_url);
    println!("  Login:         {}", config.routes.login);
    println!("  Settings:      {}", config.routes.settings);

    println!("\n{}", style("Credentials:").bold());
    println!("  Username:      {}", config.username);
    println!("  Password:      {}", config.password);
    println!(
        "  New password:  {}",
        config.new_password.as_deref().unwrap_or("(not set)")
    );

    println!("\n{}", style("Themes:").bold());
    let themes: Vec<&str> = config.themes.iter().map(|t| t.as_str()).collect();
    println!("  {}", themes.join(", "));
    match &config.theme_control {
        ThemeControl::Select { label, save_button, .. } => {
            println!("  Control:       select \"{}\" + \"{}\"", label, save_button)
        }
        ThemeControl::Buttons => println!("  Control:       buttons"),
    }

    if !config.previews.is_empty() {
        println!("\n{}", style("Previews:").bold());
        for preview in &config.previews {
            match preview.scroll_y {
                Some(y) => println!("  {:<12} {} (scroll {})", preview.name, preview.path, y),
                None => println!("  {:<12} {}", preview.name, preview.path),
            }
        }
    }

    println!("\n{}", style("Output:").bold());
    println!("  Directory:     {}", config.output_dir.display());
    println!(
        "  Capture:       {}",
        if config.full_page { "full page" } else { "viewport" }
    );
    println!();
}
