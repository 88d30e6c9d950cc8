use super::RunArgs;
use anyhow::Result;
use std::path::PathBuf;
use std::time::Duration;
use themeshot_browser::{BrowserLauncher, ChromeFinder, ProfileDir};
use themeshot_cli::OutputFormat;
use themeshot_core::{ArtifactKind, RunReport, VerificationRunner};

pub fn execute(
    args: &RunArgs,
    chrome_path: Option<PathBuf>,
    profile: Option<String>,
    headful: bool,
    format: OutputFormat,
) -> Result<()> {
    let config = args.resolve()?;
    tracing::debug!("Effective config: {:?}", config.redacted());
    let pretty = format == OutputFormat::Pretty;

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    let report = runtime.block_on(async {
        if pretty {
            println!("🔍 Locating Chrome...");
        }
        let chrome_binary = ChromeFinder::new(chrome_path).find()?;
        if pretty {
            println!("✅ Found Chrome at: {}", chrome_binary.display());
        }

        // Held until the run finishes; a temporary profile is removed on drop.
        let profile_dir = match profile {
            Some(name) => ProfileDir::named(&name)?,
            None => ProfileDir::temporary()?,
        };
        if pretty {
            if profile_dir.is_temporary() {
                println!("📁 Using temporary profile");
            } else {
                println!("📁 Using profile: {}", profile_dir.path().display());
            }
        }

        let launcher = BrowserLauncher::new(chrome_binary, profile_dir.path().to_path_buf())
            .headless(!headful)
            .request_timeout(config.timeouts.navigation());

        if pretty {
            println!("🚀 Launching Chrome...");
        }
        let driver = launcher.launch().await?;

        if pretty {
            println!(
                "🎨 Verifying {} theme(s) against {}",
                config.themes.len(),
                config.base_url
            );
        }
        let report = VerificationRunner::new(config, driver).run().await;

        drop(profile_dir);
        Ok::<RunReport, anyhow::Error>(report)
    })?;

    runtime.shutdown_timeout(Duration::from_millis(100));

    match format {
        OutputFormat::Pretty => print_pretty(&report),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
    }

    if let Some(failure) = &report.failure {
        anyhow::bail!("Verification failed at {}: {}", failure.step, failure.message);
    }

    Ok(())
}

fn print_pretty(report: &RunReport) {
    use console::style;

    println!("\n{}", style("Theme Verification Report").bold().cyan());
    println!("{}", style("=========================").cyan());

    println!("\n{}", style("Summary:").bold());
    println!("  Base URL:     {}", report.base_url);
    let themes: Vec<&str> = report.themes.iter().map(|t| t.as_str()).collect();
    println!("  Themes:       {}", themes.join(", "));
    println!("  Duration:     {}ms", report.duration_ms());

    let captured: Vec<_> = report
        .artifacts
        .iter()
        .filter(|a| a.kind != ArtifactKind::Error)
        .collect();
    if !captured.is_empty() {
        println!("\n{}", style("Screenshots:").bold());
        for artifact in captured {
            println!(
                "  {} {} {}",
                style("✓").green(),
                artifact.path.display(),
                style(format!("({} bytes)", artifact.size)).dim()
            );
        }
    }

    match &report.failure {
        None => println!("\n{}", style("All themes verified").green().bold()),
        Some(failure) => {
            println!("\n{}", style("Failure:").bold().red());
            println!("  Kind:         {}", failure.kind);
            println!("  Step:         {}", failure.step);
            println!("  Message:      {}", failure.message);
            if let Some(path) = &report.error_artifact {
                println!("  Screenshot:   {}", path.display());
            }
        }
    }
    println!();
}
