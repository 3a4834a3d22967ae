use clap::Parser;
use ragbench::cli::handle_ask_command;
use ragbench::cli::handle_config_command;
use ragbench::cli::handle_eval_command;
use ragbench::cli::handle_index_command;
use ragbench::cli::handle_search_command;
use ragbench::cli::print_error;
use ragbench::cli::Cli;
use ragbench::cli::Commands;
use ragbench::cli::EvalOptions;
use ragbench::config::AppConfig;
use ragbench::Result;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        tracing::error!("{e}");
        print_error(&e.to_string());
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => AppConfig::load_from(path)?,
        None => AppConfig::load()?,
    };

    // Initialize logging based on verbose flag
    if cli.verbose {
        ragbench::logging::init_logging_with_level("debug")?;
    } else {
        ragbench::logging::init_logging_with_config(Some(&config))?;
    }

    match cli.command {
        Commands::Index { source_dir, force } => {
            handle_index_command(&config, &source_dir, force).await
        }
        Commands::Search {
            query,
            method,
            limit,
        } => handle_search_command(&config, &query, method, limit).await,
        Commands::Ask {
            question,
            method,
            limit,
            show_context,
        } => handle_ask_command(&config, &question, method, limit, show_context).await,
        Commands::Eval {
            dataset,
            questions,
            output,
            method,
            limit,
            append,
        } => {
            handle_eval_command(
                &config,
                EvalOptions {
                    dataset,
                    questions,
                    output,
                    method,
                    limit,
                    append,
                },
            )
            .await
        }
        Commands::Config => handle_config_command(&config),
    }
}
