use chrono::DateTime;
use chrono::Utc;
use gh_census::api::OwnedRepo;
use gh_census::api::UserProfile;
use gh_census::api::UserSummary;
use serde::Deserialize;

#[derive(Deserialize, Debug)]
pub struct SearchUsers {
    pub items: Vec<SearchUser>,
}

#[derive(Deserialize, Debug)]
pub struct SearchUser {
    pub login: String,
}

impl From<SearchUser> for UserSummary {
    fn from(user: SearchUser) -> Self {
        UserSummary::new(user.login)
    }
}

#[derive(Deserialize, Debug)]
pub struct User {
    pub login: String,
    pub name: Option<String>,
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    #[serde(default)]
    pub public_repos: u32,
    #[serde(default)]
    pub followers: u32,
    #[serde(default)]
    pub following: u32,
    pub created_at: DateTime<Utc>,
}

impl From<User> for UserProfile {
    fn from(user: User) -> Self {
        UserProfile {
            login: user.login,
            name: user.name,
            company: user.company,
            location: user.location,
            email: user.email,
            hireable: user.hireable,
            bio: user.bio,
            public_repos: user.public_repos,
            followers: user.followers,
            following: user.following,
            created_at: user.created_at,
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct Repo {
    pub full_name: String,
    pub owner: RepoOwner,
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub stargazers_count: u32,
    #[serde(default)]
    pub watchers_count: u32,
    pub language: Option<String>,
    #[serde(default)]
    pub has_projects: bool,
    #[serde(default)]
    pub has_wiki: bool,
    pub license: Option<License>,
}

#[derive(Deserialize, Debug)]
pub struct RepoOwner {
    pub login: String,
}

#[derive(Deserialize, Debug)]
pub struct License {
    pub key: String,
}

impl From<Repo> for OwnedRepo {
    fn from(repo: Repo) -> Self {
        OwnedRepo {
            owner: repo.owner.login,
            full_name: repo.full_name,
            created_at: repo.created_at,
            stargazers_count: repo.stargazers_count,
            watchers_count: repo.watchers_count,
            language: repo.language,
            has_projects: repo.has_projects,
            has_wiki: repo.has_wiki,
            license: repo.license.map(|license| license.key),
        }
    }
}

#[derive(Deserialize, Debug)]
pub struct RateLimit {
    pub rate: RateWindow,
}

#[derive(Deserialize, Debug)]
pub struct RateWindow {
    pub remaining: u32,
    pub reset: i64,
}
