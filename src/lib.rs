mod args;

pub use args::Args;
pub use args::Command;

use gh_census::ingest::Ingestor;
use gh_census::ingest::SearchCriteria;
use gh_census::stats;
use gh_census::table;
use github_client::GithubClientBuilder;
use log::info;
use log::warn;

/// Runs the whole ingestion end to end: search, per-user fetches, both table
/// rewrites. Page-level failures do not abort the run; every warning is
/// logged before the (possibly partial) tables are written.
pub async fn run_ingest(args: Args) -> anyhow::Result<()> {
    let mut builder = GithubClientBuilder::default().with_github_url(&args.api_url);
    if let Some(token) = args.api_token {
        builder = builder.try_with_token(token)?;
    }
    let client = builder.build()?;

    let criteria = SearchCriteria::new(args.location, args.min_followers);
    let outcome = Ingestor::new(client, criteria).run().await;
    for warning in &outcome.warnings {
        warn!("{}", warning);
    }

    table::write_users(&args.users_file, &outcome.users)?;
    table::write_repositories(&args.repos_file, outcome.repositories)?;
    info!(
        "Wrote {} users to {} ({} warnings)",
        outcome.users.len(),
        args.users_file.display(),
        outcome.warnings.len()
    );
    Ok(())
}

/// Runs all queries of the battery in fixed order, one result per line.
pub fn run_analyze(args: &Args) -> anyhow::Result<()> {
    stats::run_all(&args.users_file, &args.repos_file)?;
    Ok(())
}
