mod builder;
mod limiter;
mod payload;

pub use builder::GithubClientBuilder;

use crate::limiter::RateLimiter;
use crate::payload::SearchUsers;
use async_trait::async_trait;
use gh_census::api::OwnedRepo;
use gh_census::api::Result;
use gh_census::api::UserProfile;
use gh_census::api::UserSummary;
use log::debug;
use reqwest::Client;

pub struct GithubClient {
    client: Client,
    github_url: String,
    limiter: RateLimiter,
}

#[async_trait]
impl gh_census::api::Client for GithubClient {
    async fn search_users(&self, query: &str, page: u32, per_page: u32) -> Result<Vec<UserSummary>> {
        self.limiter.wait_for_quota().await;
        let request_url = format!("{}/search/users", self.github_url);
        let response = self
            .client
            .get(request_url)
            .query(&[
                ("q", query.to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let response = response.json::<SearchUsers>().await?;
        Ok(response.items.into_iter().map(UserSummary::from).collect())
    }

    async fn user_profile(&self, login: &str) -> Result<Option<UserProfile>> {
        self.limiter.wait_for_quota().await;
        let request_url = format!("{}/users/{}", self.github_url, login);
        let response = self.client.get(request_url).send().await?;
        if !response.status().is_success() {
            debug!("Profile request for {} returned {}", login, response.status());
            return Ok(None);
        }
        let response = response.json::<payload::User>().await?;
        Ok(Some(response.into()))
    }

    async fn user_repos(&self, login: &str, page: u32, per_page: u32) -> Result<Vec<OwnedRepo>> {
        self.limiter.wait_for_quota().await;
        let request_url = format!("{}/users/{}/repos", self.github_url, login);
        let response = self
            .client
            .get(request_url)
            .query(&[
                ("sort", "pushed".to_string()),
                ("page", page.to_string()),
                ("per_page", per_page.to_string()),
            ])
            .send()
            .await?
            .error_for_status()?;
        let response = response.json::<Vec<payload::Repo>>().await?;
        Ok(response.into_iter().map(OwnedRepo::from).collect())
    }
}
