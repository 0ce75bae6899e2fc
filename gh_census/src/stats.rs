//! The query battery: independent one-shot analyses over the persisted
//! tables, answered in a fixed order, one line each.
//!
//! Tie-breaking is deterministic everywhere: sorts are stable (file order
//! wins) and frequency counts preserve first-seen order. Degenerate inputs
//! never panic or print NaN; they surface as named [`StatsError`] values.

use crate::model::RepositoryRecord;
use crate::model::UserRecord;
use crate::table;
use chrono::Datelike;
use chrono::Weekday;
use log::debug;
use std::collections::HashMap;
use std::collections::HashSet;
use std::path::Path;
use strum::IntoEnumIterator;
use strum_macros::Display;
use strum_macros::EnumIter;
use thiserror::Error;

// 2020-01-01T00:00:00Z, the "joined after 2020" cutoff (strictly greater).
const RECENT_JOIN_CUTOFF_UNIX: i64 = 1_577_836_800;

#[derive(Error, Debug)]
pub enum StatsError {
    #[error("insufficient data: {0}")]
    InsufficientData(&'static str),
    #[error("zero variance in {0}, correlation undefined")]
    ZeroVariance(&'static str),
    #[error(transparent)]
    Table(#[from] table::Error),
}

pub type Result<T> = std::result::Result<T, StatsError>;

/// The battery, in the order `analyze` prints it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "snake_case")]
pub enum Query {
    TopFollowers,
    EarliestRegistered,
    TopLicenses,
    MostCommonCompany,
    MostPopularLanguage,
    SecondLanguageOfRecentJoiners,
    HighestAverageStarsLanguage,
    TopLeaderStrength,
    FollowersReposCorrelation,
    ProjectsWikiCorrelation,
    HireableFollowingDifference,
    TopWeekendRepoCreators,
    HireableEmailShareDifference,
    MostCommonSurnames,
}

impl Query {
    /// Answers one query, loading its table(s) fresh from disk.
    pub fn answer(self, users_table: &Path, repos_table: &Path) -> Result<String> {
        match self {
            Query::TopFollowers => Ok(top_users_by_followers(&table::read_users(users_table)?)),
            Query::EarliestRegistered => Ok(earliest_registered_users(&table::read_users(users_table)?)),
            Query::TopLicenses => Ok(top_licenses(&table::read_repositories(repos_table)?)),
            Query::MostCommonCompany => most_common_company(&table::read_users(users_table)?),
            Query::MostPopularLanguage => most_popular_language(&table::read_repositories(repos_table)?),
            Query::SecondLanguageOfRecentJoiners => second_language_of_recent_joiners(
                &table::read_users(users_table)?,
                &table::read_repositories(repos_table)?,
            ),
            Query::HighestAverageStarsLanguage => {
                highest_average_stars_language(&table::read_repositories(repos_table)?)
            }
            Query::TopLeaderStrength => Ok(top_users_by_leader_strength(&table::read_users(users_table)?)),
            Query::FollowersReposCorrelation => {
                followers_public_repos_correlation(&table::read_users(users_table)?)
            }
            Query::ProjectsWikiCorrelation => {
                projects_wiki_correlation(&table::read_repositories(repos_table)?)
            }
            Query::HireableFollowingDifference => {
                hireable_following_difference(&table::read_users(users_table)?)
            }
            Query::TopWeekendRepoCreators => {
                Ok(top_weekend_repo_creators(&table::read_repositories(repos_table)?))
            }
            Query::HireableEmailShareDifference => {
                hireable_email_share_difference(&table::read_users(users_table)?)
            }
            Query::MostCommonSurnames => most_common_surnames(&table::read_users(users_table)?),
        }
    }
}

/// Runs the whole battery, one answer per line on standard output. The first
/// query with an unmet precondition aborts the run with its named error.
pub fn run_all(users_table: &Path, repos_table: &Path) -> Result<()> {
    for query in Query::iter() {
        let answer = query.answer(users_table, repos_table)?;
        debug!("{}: {}", query, answer);
        println!("{}", answer);
    }
    Ok(())
}

/// Top 5 logins by follower count, comma joined. Ties keep file order.
pub fn top_users_by_followers(users: &[UserRecord]) -> String {
    let mut sorted: Vec<&UserRecord> = users.iter().collect();
    sorted.sort_by(|a, b| b.followers.cmp(&a.followers));
    join_logins(sorted.into_iter().take(5))
}

/// The 5 earliest registered logins, oldest account first.
pub fn earliest_registered_users(users: &[UserRecord]) -> String {
    let mut sorted: Vec<&UserRecord> = users.iter().collect();
    sorted.sort_by(|a, b| a.created_at.cmp(&b.created_at));
    join_logins(sorted.into_iter().take(5))
}

/// The 3 most frequent license keys among rows that carry one.
pub fn top_licenses(repositories: &[RepositoryRecord]) -> String {
    let counts = frequencies(repositories.iter().filter_map(|r| r.license_name.as_deref()));
    top_by_count(counts, 3).join(",")
}

pub fn most_common_company(users: &[UserRecord]) -> Result<String> {
    let counts = frequencies(users.iter().filter_map(|u| u.company.as_deref()));
    mode(counts, "no user has a company")
}

pub fn most_popular_language(repositories: &[RepositoryRecord]) -> Result<String> {
    let counts = frequencies(repositories.iter().filter_map(|r| r.language.as_deref()));
    mode(counts, "no repository has a language")
}

/// Second most frequent language among repositories whose owners joined
/// strictly after 2020-01-01.
pub fn second_language_of_recent_joiners(
    users: &[UserRecord],
    repositories: &[RepositoryRecord],
) -> Result<String> {
    let recent_logins: HashSet<&str> = users
        .iter()
        .filter(|u| u.created_at.timestamp() > RECENT_JOIN_CUTOFF_UNIX)
        .map(|u| u.login.as_str())
        .collect();
    let counts = frequencies(
        repositories
            .iter()
            .filter(|r| recent_logins.contains(r.login.as_str()))
            .filter_map(|r| r.language.as_deref()),
    );
    top_by_count(counts, 2).into_iter().nth(1).ok_or(StatsError::InsufficientData(
        "fewer than 2 distinct languages among post-2020 joiners",
    ))
}

/// Language with the highest mean stargazer count. Ties keep the language
/// that appeared first in the table.
pub fn highest_average_stars_language(repositories: &[RepositoryRecord]) -> Result<String> {
    let mut groups: Vec<(String, u64, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for repository in repositories {
        let Some(language) = repository.language.as_deref() else {
            continue;
        };
        let i = match index.get(language) {
            Some(&i) => i,
            None => {
                index.insert(language.to_string(), groups.len());
                groups.push((language.to_string(), 0, 0));
                groups.len() - 1
            }
        };
        groups[i].1 += u64::from(repository.stargazers_count);
        groups[i].2 += 1;
    }

    groups
        .into_iter()
        .map(|(language, stars, rows)| (language, stars as f64 / rows as f64))
        .reduce(|best, current| if current.1 > best.1 { current } else { best })
        .map(|(language, _)| language)
        .ok_or(StatsError::InsufficientData("no repository has a language"))
}

/// Top 5 logins by `followers / (1 + following)`.
pub fn top_users_by_leader_strength(users: &[UserRecord]) -> String {
    let mut ranked: Vec<(&UserRecord, f64)> = users
        .iter()
        .map(|u| (u, f64::from(u.followers) / (1.0 + f64::from(u.following))))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));
    join_logins(ranked.into_iter().take(5).map(|(user, _)| user))
}

pub fn followers_public_repos_correlation(users: &[UserRecord]) -> Result<String> {
    let followers: Vec<f64> = users.iter().map(|u| f64::from(u.followers)).collect();
    let public_repos: Vec<f64> = users.iter().map(|u| f64::from(u.public_repos)).collect();
    Ok(format!("{:.3}", pearson(&followers, &public_repos, "followers vs public_repos")?))
}

pub fn projects_wiki_correlation(repositories: &[RepositoryRecord]) -> Result<String> {
    let projects: Vec<f64> = repositories.iter().map(|r| bool_as_f64(r.has_projects)).collect();
    let wikis: Vec<f64> = repositories.iter().map(|r| bool_as_f64(r.has_wiki)).collect();
    Ok(format!("{:.3}", pearson(&projects, &wikis, "has_projects vs has_wiki")?))
}

/// Mean `following` of hireable users minus mean `following` of everyone
/// else (explicitly non-hireable or unknown).
pub fn hireable_following_difference(users: &[UserRecord]) -> Result<String> {
    let hireable = mean(hireable_partition(users, true).map(|u| f64::from(u.following)))
        .ok_or(StatsError::InsufficientData("no hireable users"))?;
    let rest = mean(hireable_partition(users, false).map(|u| f64::from(u.following)))
        .ok_or(StatsError::InsufficientData("no non-hireable users"))?;
    Ok(format!("{:.3}", hireable - rest))
}

/// Top 5 logins by the number of repositories created on a Saturday or Sunday.
pub fn top_weekend_repo_creators(repositories: &[RepositoryRecord]) -> String {
    let weekend = repositories
        .iter()
        .filter(|r| matches!(r.created_at.weekday(), Weekday::Sat | Weekday::Sun));
    top_by_count(frequencies(weekend.map(|r| r.login.as_str())), 5).join(",")
}

/// Share of users with a public email, hireable minus non-hireable.
pub fn hireable_email_share_difference(users: &[UserRecord]) -> Result<String> {
    let hireable = email_share(hireable_partition(users, true))
        .ok_or(StatsError::InsufficientData("no hireable users"))?;
    let rest = email_share(hireable_partition(users, false))
        .ok_or(StatsError::InsufficientData("no non-hireable users"))?;
    Ok(format!("{:.3}", hireable - rest))
}

/// All surnames (last whitespace token of the name) tied at the maximal
/// frequency, alphabetically sorted, comma-space joined.
pub fn most_common_surnames(users: &[UserRecord]) -> Result<String> {
    let counts = frequencies(
        users
            .iter()
            .filter_map(|u| u.name.as_deref())
            .filter_map(|name| name.split_whitespace().last()),
    );
    let max = counts
        .iter()
        .map(|(_, count)| *count)
        .max()
        .ok_or(StatsError::InsufficientData("no user has a name"))?;
    let mut tied: Vec<String> = counts
        .into_iter()
        .filter(|(_, count)| *count == max)
        .map(|(surname, _)| surname)
        .collect();
    tied.sort();
    Ok(tied.join(", "))
}

/// Helpers

fn join_logins<'a>(users: impl Iterator<Item = &'a UserRecord>) -> String {
    users.map(|u| u.login.as_str()).collect::<Vec<_>>().join(",")
}

/// Occurrence counts preserving first-seen order, so later stable sorts
/// resolve ties towards the value that appeared first in the file.
fn frequencies<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(String, u64)> {
    let mut counts: Vec<(String, u64)> = Vec::new();
    let mut index: HashMap<String, usize> = HashMap::new();
    for value in values {
        match index.get(value) {
            Some(&i) => counts[i].1 += 1,
            None => {
                index.insert(value.to_string(), counts.len());
                counts.push((value.to_string(), 1));
            }
        }
    }
    counts
}

fn top_by_count(mut counts: Vec<(String, u64)>, n: usize) -> Vec<String> {
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.into_iter().take(n).map(|(value, _)| value).collect()
}

fn mode(counts: Vec<(String, u64)>, missing: &'static str) -> Result<String> {
    top_by_count(counts, 1)
        .into_iter()
        .next()
        .ok_or(StatsError::InsufficientData(missing))
}

fn mean(values: impl Iterator<Item = f64>) -> Option<f64> {
    let (sum, count) = values.fold((0.0, 0u64), |(sum, count), v| (sum + v, count + 1));
    (count > 0).then(|| sum / count as f64)
}

fn hireable_partition(users: &[UserRecord], hireable: bool) -> impl Iterator<Item = &UserRecord> {
    users.iter().filter(move |u| (u.hireable == Some(true)) == hireable)
}

fn email_share<'a>(users: impl Iterator<Item = &'a UserRecord>) -> Option<f64> {
    mean(users.map(|u| bool_as_f64(u.email.is_some())))
}

fn bool_as_f64(value: bool) -> f64 {
    if value {
        1.0
    } else {
        0.0
    }
}

fn pearson(xs: &[f64], ys: &[f64], what: &'static str) -> Result<f64> {
    if xs.len() < 2 {
        return Err(StatsError::InsufficientData(what));
    }
    let n = xs.len() as f64;
    let mean_x = xs.iter().sum::<f64>() / n;
    let mean_y = ys.iter().sum::<f64>() / n;
    let mut covariance = 0.0;
    let mut variance_x = 0.0;
    let mut variance_y = 0.0;
    for (x, y) in xs.iter().zip(ys) {
        covariance += (x - mean_x) * (y - mean_y);
        variance_x += (x - mean_x) * (x - mean_x);
        variance_y += (y - mean_y) * (y - mean_y);
    }
    if variance_x == 0.0 || variance_y == 0.0 {
        return Err(StatsError::ZeroVariance(what));
    }
    Ok(covariance / (variance_x * variance_y).sqrt())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use chrono::Utc;

    fn user(login: &str, followers: u32, following: u32) -> UserRecord {
        UserRecord {
            login: login.to_string(),
            name: None,
            company: None,
            location: Some("Chicago".to_string()),
            email: None,
            hireable: None,
            bio: None,
            public_repos: 0,
            followers,
            following,
            created_at: Utc.with_ymd_and_hms(2015, 3, 4, 0, 0, 0).unwrap(),
        }
    }

    fn repo(login: &str, language: Option<&str>, stars: u32) -> RepositoryRecord {
        RepositoryRecord {
            login: login.to_string(),
            full_name: format!("{}/repo", login),
            created_at: Utc.with_ymd_and_hms(2021, 2, 3, 0, 0, 0).unwrap(),
            stargazers_count: stars,
            watchers_count: stars,
            language: language.map(str::to_string),
            has_projects: false,
            has_wiki: false,
            license_name: None,
        }
    }

    #[test]
    fn top_followers_breaks_ties_by_file_order() {
        let users: Vec<UserRecord> = [("a", 50), ("b", 40), ("c", 40), ("d", 30), ("e", 20), ("f", 10)]
            .into_iter()
            .map(|(login, followers)| user(login, followers, 0))
            .collect();
        assert_eq!(top_users_by_followers(&users), "a,b,c,d,e");
    }

    #[test]
    fn earliest_registered_sorts_ascending() {
        let mut users = vec![user("late", 0, 0), user("early", 0, 0), user("mid", 0, 0)];
        users[0].created_at = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
        users[1].created_at = Utc.with_ymd_and_hms(2008, 1, 1, 0, 0, 0).unwrap();
        users[2].created_at = Utc.with_ymd_and_hms(2014, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(earliest_registered_users(&users), "early,mid,late");
    }

    #[test]
    fn top_licenses_ignores_missing_and_breaks_ties_first_seen() {
        let mut repos = vec![
            repo("a", None, 0),
            repo("a", None, 0),
            repo("b", None, 0),
            repo("b", None, 0),
            repo("c", None, 0),
        ];
        repos[0].license_name = Some("mit".to_string());
        repos[1].license_name = Some("apache-2.0".to_string());
        repos[2].license_name = Some("mit".to_string());
        repos[3].license_name = Some("gpl-3.0".to_string());
        // repos[4] carries no license and must not count.
        assert_eq!(top_licenses(&repos), "mit,apache-2.0,gpl-3.0");
    }

    #[test]
    fn mode_queries_error_without_data() {
        assert!(matches!(
            most_common_company(&[user("a", 0, 0)]),
            Err(StatsError::InsufficientData(_))
        ));
        assert!(matches!(
            most_popular_language(&[repo("a", None, 0)]),
            Err(StatsError::InsufficientData(_))
        ));
    }

    #[test]
    fn most_common_company_counts_only_present_values() {
        let mut users = vec![user("a", 0, 0), user("b", 0, 0), user("c", 0, 0)];
        users[0].company = Some("ACME".to_string());
        users[2].company = Some("ACME".to_string());
        assert_eq!(most_common_company(&users).unwrap(), "ACME");
    }

    #[test]
    fn second_language_ignores_pre_2020_joiners() {
        let mut users = vec![user("old", 0, 0), user("new", 0, 0)];
        users[0].created_at = Utc.with_ymd_and_hms(2019, 12, 31, 23, 59, 59).unwrap();
        users[1].created_at = Utc.with_ymd_and_hms(2020, 1, 2, 0, 0, 0).unwrap();
        let repos = vec![
            // Only "old" writes C, so C must not appear in the ranking at all.
            repo("old", Some("C"), 0),
            repo("old", Some("C"), 0),
            repo("new", Some("Rust"), 0),
            repo("new", Some("Rust"), 0),
            repo("new", Some("Python"), 0),
        ];
        assert_eq!(second_language_of_recent_joiners(&users, &repos).unwrap(), "Python");
    }

    #[test]
    fn second_language_errors_with_fewer_than_two_languages() {
        let mut users = vec![user("new", 0, 0)];
        users[0].created_at = Utc.with_ymd_and_hms(2021, 1, 1, 0, 0, 0).unwrap();
        let repos = vec![repo("new", Some("Rust"), 0)];
        assert!(matches!(
            second_language_of_recent_joiners(&users, &repos),
            Err(StatsError::InsufficientData(_))
        ));
    }

    #[test]
    fn highest_average_stars_picks_arg_max_group() {
        let repos = vec![
            repo("a", Some("Rust"), 10),
            repo("a", Some("Rust"), 20),
            repo("b", Some("C"), 100),
            repo("b", None, 100_000),
        ];
        assert_eq!(highest_average_stars_language(&repos).unwrap(), "C");
    }

    #[test]
    fn leader_strength_ranks_by_derived_ratio() {
        // a: 100/1=100, b: 90/10=9, c: 80/1=80
        let users = vec![user("a", 100, 0), user("b", 90, 9), user("c", 80, 0)];
        assert_eq!(top_users_by_leader_strength(&users), "a,c,b");
    }

    #[test]
    fn correlation_of_identical_columns_is_one() {
        let users: Vec<UserRecord> = (0..4)
            .map(|i| {
                let mut u = user(&format!("u{}", i), i * 10, 0);
                u.public_repos = i * 10;
                u
            })
            .collect();
        assert_eq!(followers_public_repos_correlation(&users).unwrap(), "1.000");
    }

    #[test]
    fn correlation_of_constant_column_is_a_named_error() {
        let users: Vec<UserRecord> = (0..4)
            .map(|i| {
                let mut u = user(&format!("u{}", i), 7, 0);
                u.public_repos = i;
                u
            })
            .collect();
        assert!(matches!(
            followers_public_repos_correlation(&users),
            Err(StatsError::ZeroVariance(_))
        ));
    }

    #[test]
    fn correlation_needs_two_rows() {
        assert!(matches!(
            followers_public_repos_correlation(&[user("only", 1, 0)]),
            Err(StatsError::InsufficientData(_))
        ));
    }

    #[test]
    fn boolean_correlation_casts_flags_to_numbers() {
        let mut repos: Vec<RepositoryRecord> = (0..4).map(|i| repo("a", None, i)).collect();
        for (i, r) in repos.iter_mut().enumerate() {
            r.has_projects = i % 2 == 0;
            r.has_wiki = i % 2 == 0;
        }
        assert_eq!(projects_wiki_correlation(&repos).unwrap(), "1.000");
    }

    #[test]
    fn hireable_following_difference_partitions_three_ways() {
        let mut users = vec![
            user("h1", 0, 10),
            user("h2", 0, 20),
            user("n1", 0, 0),
            user("n2", 0, 0),
            user("u1", 0, 0),
        ];
        users[0].hireable = Some(true);
        users[1].hireable = Some(true);
        users[2].hireable = Some(false);
        // n2 and u1 stay unknown and land in the non-hireable partition.
        assert_eq!(hireable_following_difference(&users).unwrap(), "15.000");
    }

    #[test]
    fn hireable_difference_errors_on_empty_partition() {
        assert!(matches!(
            hireable_following_difference(&[user("nobody", 0, 0)]),
            Err(StatsError::InsufficientData(_))
        ));
    }

    #[test]
    fn weekend_creators_filter_by_day_of_week() {
        // 2021-02-06 was a Saturday, 2021-02-07 a Sunday, 2021-02-08 a Monday.
        let mut repos = vec![
            repo("weekender", None, 0),
            repo("weekender", None, 0),
            repo("weekday", None, 0),
            repo("casual", None, 0),
        ];
        repos[0].created_at = Utc.with_ymd_and_hms(2021, 2, 6, 10, 0, 0).unwrap();
        repos[1].created_at = Utc.with_ymd_and_hms(2021, 2, 7, 10, 0, 0).unwrap();
        repos[2].created_at = Utc.with_ymd_and_hms(2021, 2, 8, 10, 0, 0).unwrap();
        repos[3].created_at = Utc.with_ymd_and_hms(2021, 2, 6, 23, 0, 0).unwrap();
        assert_eq!(top_weekend_repo_creators(&repos), "weekender,casual");
    }

    #[test]
    fn email_share_difference_counts_present_emails() {
        let mut users = vec![user("h1", 0, 0), user("h2", 0, 0), user("n1", 0, 0), user("n2", 0, 0)];
        users[0].hireable = Some(true);
        users[1].hireable = Some(true);
        users[0].email = Some("h1@example.com".to_string());
        users[2].email = Some("n1@example.com".to_string());
        users[3].email = Some("n2@example.com".to_string());
        // hireable share 0.5, rest share 1.0
        assert_eq!(hireable_email_share_difference(&users).unwrap(), "-0.500");
    }

    #[test]
    fn surname_mode_takes_last_token() {
        let mut users = vec![user("a", 0, 0), user("b", 0, 0), user("c", 0, 0)];
        users[0].name = Some("Ann Lee".to_string());
        users[1].name = Some("Bo Lee".to_string());
        users[2].name = Some("Cy Park".to_string());
        assert_eq!(most_common_surnames(&users).unwrap(), "Lee");
    }

    #[test]
    fn surname_ties_are_alphabetical() {
        let mut users = vec![user("a", 0, 0), user("b", 0, 0)];
        users[0].name = Some("B Y".to_string());
        users[1].name = Some("A X".to_string());
        assert_eq!(most_common_surnames(&users).unwrap(), "X, Y");
    }

    #[test]
    fn surname_mode_errors_without_names() {
        assert!(matches!(
            most_common_surnames(&[user("unnamed", 0, 0)]),
            Err(StatsError::InsufficientData(_))
        ));
    }
}
