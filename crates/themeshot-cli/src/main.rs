use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use themeshot_cli::OutputFormat;

mod commands;

use commands::RunArgs;

#[derive(Parser)]
#[command(name = "themeshot")]
#[command(author, version)]
#[command(
    about = "Verify admin UI themes in a headless browser and capture screenshots",
    long_about = "themeshot logs into an admin interface, handles a forced password change, \
                  applies each appearance theme from the settings page and saves a \
                  screenshot per theme for visual review."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output format
    #[arg(short, long, global = true, value_enum, default_value = "pretty")]
    format: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Log in, apply each theme and capture screenshots
    Verify {
        #[command(flatten)]
        run: RunArgs,

        /// Path to Chrome or Chromium (auto-detected if omitted)
        #[arg(long, value_name = "PATH")]
        chrome_path: Option<PathBuf>,

        /// Reuse a named browser profile under ~/.themeshot/profiles instead of a temporary one
        #[arg(long, value_name = "NAME")]
        profile: Option<String>,

        /// Show the browser window
        #[arg(long)]
        headful: bool,
    },

    /// List the theme presets and their screenshot names
    Themes,

    /// Print the effective run configuration with passwords redacted
    Config {
        #[command(flatten)]
        run: RunArgs,
    },

    /// Generate shell completion scripts
    #[command(long_about = "Generate shell completion scripts.\n\n\
        SUPPORTED SHELLS: bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: themeshot completion --shell bash >> ~/.bashrc\n  \
        zsh:  themeshot completion --shell zsh > ~/.zfunc/_themeshot\n  \
        fish: themeshot completion --shell fish > ~/.config/fish/completions/themeshot.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(long, value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbose);

    match cli.command {
        Commands::Verify {
            run,
            chrome_path,
            profile,
            headful,
        } => commands::verify::execute(&run, chrome_path, profile, headful, cli.format),
        Commands::Themes => commands::themes::execute(cli.format),
        Commands::Config { run } => commands::config::execute(&run, cli.format),
        Commands::Completion { shell } => commands::completion::execute(shell, &mut Cli::command()),
    }
}

fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("themeshot=debug,chromiumoxide=warn")
    } else {
        EnvFilter::new("themeshot=info")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();
}
