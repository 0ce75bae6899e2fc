use async_trait::async_trait;
use chrono::DateTime;
use chrono::Utc;
use derive_more::Constructor;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Error: {0}")]
    Error(&'static str),
    #[error("Request error: {0}")]
    RequestError(#[from] reqwest::Error),
    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// A user search hit. Only the login matters; the profile call fills in the rest.
#[derive(Debug, Clone, PartialEq, Eq, Constructor)]
pub struct UserSummary {
    pub login: String,
}

/// Full profile payload of a single user, as the platform reports it.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct UserProfile {
    pub login: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: DateTime<Utc>,
}

/// One repository owned by a searched user.
#[derive(Debug, Clone, PartialEq, Constructor)]
pub struct OwnedRepo {
    pub owner: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub stargazers_count: u32,
    pub watchers_count: u32,
    pub language: Option<String>,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub license: Option<String>,
}

#[async_trait]
pub trait Client: Send + Sync {
    /// Returns one page of users matching `query`, empty when past the last page.
    async fn search_users(&self, query: &str, page: u32, per_page: u32) -> Result<Vec<UserSummary>>;

    /// Returns `None` when the platform reports non-success for the login.
    async fn user_profile(&self, login: &str) -> Result<Option<UserProfile>>;

    /// Returns one page of repositories owned by `login`, empty when past the last page.
    async fn user_repos(&self, login: &str, page: u32, per_page: u32) -> Result<Vec<OwnedRepo>>;
}
