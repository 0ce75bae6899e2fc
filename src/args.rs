use clap::Parser;
use clap::Subcommand;
use secrecy::SecretString;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    #[clap(subcommand)]
    pub command: Command,

    /// API OAuth access token
    #[clap(short, long, env = "GITHUB_TOKEN", global = true)]
    pub api_token: Option<SecretString>,

    /// Repository API URL
    #[clap(long, env, global = true, default_value = "https://api.github.com")]
    pub api_url: String,

    /// Users table path
    #[clap(long, env, global = true, default_value = "users.csv")]
    pub users_file: PathBuf,

    /// Repositories table path
    #[clap(long, env, global = true, default_value = "repositories.csv")]
    pub repos_file: PathBuf,

    /// Location the user search is restricted to
    #[clap(short, long, env, global = true, default_value = "Chicago")]
    pub location: String,

    /// Follower count a searched user must exceed
    #[clap(short, long, env, global = true, default_value_t = 100, parse(try_from_str=min_followers_in_range))]
    pub min_followers: u32,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Fetch users and repositories and rewrite both tables
    Ingest,
    /// Run the full query battery over the persisted tables
    Analyze,
}

fn min_followers_in_range(value: &str) -> clap::Result<u32, String> {
    number_in_range(value, 1, u32::MAX, "min_followers".to_string())
}

fn number_in_range<T>(value: &str, min: T, max: T, name: String) -> clap::Result<T, String>
where
    T: FromStr + PartialOrd + Display,
    <T as FromStr>::Err: Display,
{
    value.parse::<T>().map_err(|err| format!("{}", err)).and_then(|value| {
        if value < min || value > max {
            return Err(format!("{} is not in range {} .. {}.", name, min, max));
        }
        Ok(value)
    })
}
