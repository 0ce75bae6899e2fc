use clap::Parser;
use dotenv::dotenv;
use gh_census_app::run_analyze;
use gh_census_app::run_ingest;
use gh_census_app::Args;
use gh_census_app::Command;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv().ok();
    env_logger::init();

    let args = Args::parse();
    match args.command {
        Command::Ingest => run_ingest(args).await,
        Command::Analyze => run_analyze(&args),
    }
}
