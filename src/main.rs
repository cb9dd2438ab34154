use clap::Parser;
use form_autofill::cli::commands::{cmd_fill, cmd_scan};
use form_autofill::cli::config::{Cli, Commands, load_config};

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref());

    // Resolve gateway settings: CLI > config file > defaults
    let endpoint = cli
        .endpoint
        .as_deref()
        .unwrap_or(&config.gateway.endpoint)
        .to_string();
    let model = cli
        .model
        .as_deref()
        .unwrap_or(&config.gateway.model)
        .to_string();

    match cli.command {
        Commands::Scan { url, snapshot, json } => {
            cmd_scan(url.as_deref(), snapshot.as_deref(), json, cli.verbose)?;
        }
        Commands::Fill {
            url,
            snapshot,
            context,
            backend,
            batch_size,
            dry_run,
            trace,
        } => {
            let backend = backend.as_deref().unwrap_or(&config.fill.backend).to_string();
            let filled = cmd_fill(
                url.as_deref(),
                snapshot.as_deref(),
                &context,
                &backend,
                batch_size,
                dry_run,
                trace.as_deref(),
                cli.verbose,
                &config,
                &endpoint,
                &model,
            )?;
            if !filled {
                std::process::exit(1);
            }
        }
    }

    Ok(())
}
