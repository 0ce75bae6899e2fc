use crate::api::Client;
use crate::api::Error as ApiError;
use crate::api::UserSummary;
use crate::model::RepositoryRecord;
use crate::model::UserRecord;
use derive_more::Constructor;
use log::debug;
use log::error;
use log::info;
use thiserror::Error;

pub const MAX_PAGE_SIZE: u32 = 100;
pub const FIRST_PAGE: u32 = 1;

/// Search predicate: fixed location plus a minimal follower count.
#[derive(Debug, Clone, Constructor)]
pub struct SearchCriteria {
    pub location: String,
    pub min_followers: u32,
}

impl SearchCriteria {
    pub fn to_query(&self) -> String {
        format!("location:{} followers:>{}", self.location, self.min_followers)
    }
}

/// Something that went wrong mid-run without aborting it. The affected rows
/// are missing from the outcome; everything fetched before stays in.
#[derive(Debug, Error)]
pub enum Warning {
    #[error("{context} stopped early at page {page}: {error}")]
    PageFailed {
        context: String,
        page: u32,
        error: ApiError,
    },
    #[error("no profile found for {login}, user dropped")]
    MissingProfile { login: String },
    #[error("profile fetch for {login} failed: {error}")]
    ProfileFailed { login: String, error: ApiError },
}

/// Items accumulated by a pagination loop plus the pages it lost.
#[derive(Debug, Constructor)]
pub struct Paged<T> {
    pub items: Vec<T>,
    pub warnings: Vec<Warning>,
}

/// Everything one ingestion run produced. `warnings` is empty on a clean run;
/// otherwise the tables are partial and the caller decides whether to keep them.
#[derive(Debug)]
pub struct IngestOutcome {
    pub users: Vec<UserRecord>,
    pub repositories: Vec<RepositoryRecord>,
    pub warnings: Vec<Warning>,
}

/// Sequential orchestrator: user search, then per user one profile fetch and
/// one paginated repository listing. No call overlaps another.
#[derive(Constructor)]
pub struct Ingestor<CLIENT: Client> {
    client: CLIENT,
    criteria: SearchCriteria,
}

impl<CLIENT: Client> Ingestor<CLIENT> {
    pub async fn run(&self) -> IngestOutcome {
        let query = self.criteria.to_query();
        info!("Searching users matching '{}'", query);
        let search = self.search_pages(&query).await;
        info!("Search returned {} users", search.items.len());

        let mut users = Vec::new();
        let mut repositories = Vec::new();
        let mut warnings = search.warnings;

        for UserSummary { login } in &search.items {
            match self.client.user_profile(login).await {
                Ok(Some(profile)) => users.push(UserRecord::from(profile)),
                Ok(None) => {
                    info!("No profile for {}, skipping", login);
                    warnings.push(Warning::MissingProfile { login: login.clone() });
                }
                Err(error) => {
                    error!("Failed to fetch profile of {}: {}", login, error);
                    warnings.push(Warning::ProfileFailed {
                        login: login.clone(),
                        error,
                    });
                }
            }

            info!("Fetching repositories of {}", login);
            let mut repos = self.repo_pages(login).await;
            repositories.extend(repos.items.into_iter().map(RepositoryRecord::from));
            warnings.append(&mut repos.warnings);
        }

        IngestOutcome {
            users,
            repositories,
            warnings,
        }
    }

    async fn search_pages(&self, query: &str) -> Paged<UserSummary> {
        let mut items = Vec::new();
        let mut warnings = Vec::new();
        let mut page = FIRST_PAGE;
        loop {
            match self.client.search_users(query, page, MAX_PAGE_SIZE).await {
                Ok(batch) if batch.is_empty() => break,
                Ok(mut batch) => {
                    debug!("Search page {} returned {} users", page, batch.len());
                    items.append(&mut batch);
                    page += 1;
                }
                Err(error) => {
                    error!("Failed to search users (page {}): {}", page, error);
                    warnings.push(Warning::PageFailed {
                        context: "user search".to_string(),
                        page,
                        error,
                    });
                    break;
                }
            }
        }
        Paged::new(items, warnings)
    }

    async fn repo_pages(&self, login: &str) -> Paged<crate::api::OwnedRepo> {
        let mut items = Vec::new();
        let mut warnings = Vec::new();
        let mut page = FIRST_PAGE;
        loop {
            match self.client.user_repos(login, page, MAX_PAGE_SIZE).await {
                Ok(batch) if batch.is_empty() => break,
                Ok(mut batch) => {
                    debug!("Repository page {} of {} returned {} rows", page, login, batch.len());
                    items.append(&mut batch);
                    page += 1;
                }
                Err(error) => {
                    error!("Failed to fetch repositories of {} (page {}): {}", login, page, error);
                    warnings.push(Warning::PageFailed {
                        context: format!("repositories of {}", login),
                        page,
                        error,
                    });
                    break;
                }
            }
        }
        Paged::new(items, warnings)
    }
}
