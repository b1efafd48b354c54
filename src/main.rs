use clap::Parser;
use dotenv::dotenv;
use kalmansignal::cli::{Cli, Commands, StateCommand};
use kalmansignal::commands;
use kalmansignal::observability::init_tracing;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from the .env file
    dotenv().ok();

    let cli = Cli::parse();
    init_tracing(&cli.verbose, cli.json_logs)?;

    match cli.command {
        Commands::Predict {
            history,
            state,
            history_csv,
        } => commands::run_predict(history, state, history_csv).await?,
        Commands::Export { history, output } => commands::run_export(history, output).await?,
        Commands::State { action } => match action {
            StateCommand::Show { state } => commands::run_state_show(state)?,
            StateCommand::Reset { state } => commands::run_state_reset(state)?,
        },
    }

    Ok(())
}
