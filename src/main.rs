use anyhow::Result;
use clap::Parser;
use mavenizer::cli::{Cli, Commands};
use mavenizer::config::{remove_file_if_exists, resolve_config, resolve_output};
use mavenizer::pipeline::{analyse, run, unresolved_report};
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.debug);

    match &cli.command {
        Commands::Analyze(args) => {
            let config = resolve_config(&cli, args)?;
            if let Some(analysis) = run(&config)? {
                print_unresolved(&unresolved_report(&analysis.result));
            }
        }
        Commands::Unresolved(args) => {
            let config = resolve_config(&cli, args)?;
            let analysis = analyse(&config)?;
            print_unresolved(&unresolved_report(&analysis.result));
        }
        Commands::Clean { output } => {
            let output = resolve_output(&cli, output.as_deref())?;
            if remove_file_if_exists(&output)? {
                info!(output = %output.display(), "Removed analysis result");
            }
        }
    }

    Ok(())
}

fn init_logging(debug: bool) {
    let filter = if debug {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

fn print_unresolved(lines: &[String]) {
    if lines.is_empty() {
        info!("No unresolved classes.");
        return;
    }
    info!("Unresolved classes:");
    for line in lines {
        println!("{line}");
    }
}
