use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// One row of the users table. Field order is the CSV column order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserRecord {
    pub login: String,
    pub name: Option<String>,
    /// Normalized with [`normalize_company`]; empty values are dropped to `None`.
    pub company: Option<String>,
    pub location: Option<String>,
    pub email: Option<String>,
    /// Tri-state: the platform reports true, false or nothing at all.
    pub hireable: Option<bool>,
    pub bio: Option<String>,
    pub public_repos: u32,
    pub followers: u32,
    pub following: u32,
    pub created_at: DateTime<Utc>,
}

/// One row of the repositories table. `login` is the owning user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RepositoryRecord {
    pub login: String,
    pub full_name: String,
    pub created_at: DateTime<Utc>,
    pub stargazers_count: u32,
    pub watchers_count: u32,
    pub language: Option<String>,
    pub has_projects: bool,
    pub has_wiki: bool,
    pub license_name: Option<String>,
}

/// Trims whitespace, strips leading organization markers (`@`) and upper-cases.
///
/// Idempotent: `normalize_company(" @Acme ") == "ACME"` and normalizing the
/// result again is a no-op.
pub fn normalize_company(raw: &str) -> String {
    raw.trim().trim_start_matches('@').trim_start().to_uppercase()
}

#[cfg(feature = "api")]
impl From<crate::api::UserProfile> for UserRecord {
    fn from(profile: crate::api::UserProfile) -> Self {
        let company = profile
            .company
            .map(|company| normalize_company(&company))
            .filter(|company| !company.is_empty());
        UserRecord {
            login: profile.login,
            name: profile.name,
            company,
            location: profile.location,
            email: profile.email,
            hireable: profile.hireable,
            bio: profile.bio,
            public_repos: profile.public_repos,
            followers: profile.followers,
            following: profile.following,
            created_at: profile.created_at,
        }
    }
}

#[cfg(feature = "api")]
impl From<crate::api::OwnedRepo> for RepositoryRecord {
    fn from(repo: crate::api::OwnedRepo) -> Self {
        RepositoryRecord {
            login: repo.owner,
            full_name: repo.full_name,
            created_at: repo.created_at,
            stargazers_count: repo.stargazers_count,
            watchers_count: repo.watchers_count,
            language: repo.language,
            has_projects: repo.has_projects,
            has_wiki: repo.has_wiki,
            license_name: repo.license,
        }
    }
}

#[test]
fn normalize_company_strips_marker_and_upper_cases() {
    assert_eq!(normalize_company(" @Acme "), "ACME");
    assert_eq!(normalize_company("@@acme corp"), "ACME CORP");
    assert_eq!(normalize_company(""), "");
}

#[test]
fn normalize_company_is_idempotent() {
    for raw in [" @Acme ", "@@x y", " @ Spaced Out ", "plain", ""] {
        let once = normalize_company(raw);
        assert_eq!(normalize_company(&once), once, "not idempotent for {:?}", raw);
    }
}
