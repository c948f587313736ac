use std::io;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use watermirror_cli::cli::{Cli, Commands, OutputFormat};
use watermirror_cli::commands::{
    HistoryArgs, WatchArgs, cmd_config, cmd_history, cmd_live, cmd_report, cmd_watch,
};
use watermirror_cli::config::Config;
use watermirror_cli::format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Completions need neither logging nor config
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "watermirror", &mut io::stdout());
        return Ok(());
    }

    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    if let Commands::Config { action } = cli.command {
        return cmd_config(action, cli.config.as_deref());
    }

    let mut config =
        Config::load_from(cli.config.as_deref()).context("Failed to load configuration")?;
    let page_size = match &cli.command {
        Commands::History { page_size, .. } => *page_size,
        _ => None,
    };
    config.apply_overrides(cli.url.as_deref(), cli.timeout, page_size);
    config.validate()?;
    tracing::debug!("Using backend {}", config.source.base_url);

    let base_opts =
        FormatOptions::new(cli.no_color || cli.output.is_some()).with_compact(cli.compact);
    let output = cli.output.as_ref();

    match cli.command {
        Commands::Live { output: out } => {
            let opts = base_opts.with_no_header(out.no_header);
            cmd_live(&config, out.resolve_format(cli.json), output, &opts).await
        }
        Commands::Report { output: out } => {
            let opts = base_opts.with_no_header(out.no_header);
            cmd_report(&config, out.resolve_format(cli.json), output, &opts).await
        }
        Commands::History {
            output: out,
            pages,
            all,
            ..
        } => {
            let opts = base_opts.with_no_header(out.no_header);
            cmd_history(
                &config,
                HistoryArgs {
                    pages: if all { None } else { Some(pages) },
                    format: out.resolve_format(cli.json),
                    output,
                    quiet: cli.quiet,
                    opts: &opts,
                },
            )
            .await
        }
        Commands::Watch {
            output: out,
            interval,
            count,
        } => {
            let opts = base_opts.with_no_header(out.no_header);
            let format = out.resolve_format(cli.json);
            if !cli.quiet && format == OutputFormat::Text {
                eprintln!(
                    "Watching {} every {}s (Ctrl-C to stop)",
                    config.source.base_url, interval
                );
            }
            cmd_watch(
                &config,
                WatchArgs {
                    interval,
                    count,
                    format,
                    output,
                    opts: &opts,
                },
            )
            .await
        }
        Commands::Config { .. } | Commands::Completions { .. } => Ok(()),
    }
}
