use anyhow::Result;
use clap::Parser;
use quizbot::{app, load_config, Cli, Commands};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { token } => app::run_bot(load_config(token)?).await,
        Commands::Console => app::run_console_stdio(load_config(None)?).await,
        Commands::Seed { questions, rules } => {
            app::seed(load_config(None)?, &questions, rules.as_deref()).await
        }
        Commands::Reset { sender } => app::reset(load_config(None)?, &sender).await,
    }
}
