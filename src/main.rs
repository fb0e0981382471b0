use clap::Parser;

use wanderlist::{
    api, commands,
    config::{CliArgs, Command, Config},
    error::AppError,
    storage, telemetry,
};

#[tokio::main]
async fn main() {
    let cli = CliArgs::parse();
    let config = Config::load(&cli);
    telemetry::init_logging(&config.logging);

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!(error = %e, "Command failed");
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run(command: Command, config: &Config) -> Result<(), AppError> {
    let storage = storage::open_backend(&config.storage)?;

    match command {
        Command::Serve => api::serve(config, storage).await,
        other => {
            let stdout = std::io::stdout();
            commands::execute(other, storage.as_ref(), &mut stdout.lock())
        }
    }
}
