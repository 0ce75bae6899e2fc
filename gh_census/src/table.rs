use crate::model::RepositoryRecord;
use crate::model::UserRecord;
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Per-owner cap on persisted repositories, newest kept first.
pub const MAX_REPOS_PER_OWNER: usize = 500;

#[derive(Error, Debug)]
pub enum Error {
    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

/// Rewrites the users table wholesale, one row per record, header included.
pub fn write_users(path: &Path, users: &[UserRecord]) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for user in users {
        writer.serialize(user)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_users(path: &Path) -> Result<Vec<UserRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.deserialize().collect::<csv::Result<Vec<_>>>()?)
}

/// Rewrites the repositories table wholesale after grouping and truncation.
pub fn write_repositories(path: &Path, repositories: Vec<RepositoryRecord>) -> Result<()> {
    let mut writer = csv::Writer::from_path(path)?;
    for repository in group_and_truncate(repositories) {
        writer.serialize(&repository)?;
    }
    writer.flush()?;
    Ok(())
}

pub fn read_repositories(path: &Path) -> Result<Vec<RepositoryRecord>> {
    let mut reader = csv::Reader::from_path(path)?;
    Ok(reader.deserialize().collect::<csv::Result<Vec<_>>>()?)
}

/// Groups rows by owner (owners keep first-seen order), sorts each group by
/// creation time descending and keeps at most [`MAX_REPOS_PER_OWNER`] rows.
/// The sort is stable, so equal timestamps keep their input order.
pub fn group_and_truncate(repositories: Vec<RepositoryRecord>) -> Vec<RepositoryRecord> {
    let mut owners: Vec<String> = Vec::new();
    let mut by_owner: HashMap<String, Vec<RepositoryRecord>> = HashMap::new();
    for repository in repositories {
        if !by_owner.contains_key(&repository.login) {
            owners.push(repository.login.clone());
        }
        by_owner.entry(repository.login.clone()).or_default().push(repository);
    }

    let mut rows = Vec::new();
    for owner in owners {
        let mut group = by_owner.remove(&owner).unwrap_or_default();
        group.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        group.truncate(MAX_REPOS_PER_OWNER);
        rows.extend(group);
    }
    rows
}
