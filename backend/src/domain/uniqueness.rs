//! Uniqueness enforcement modes.
//!
//! In advisory mode name and email uniqueness rest on the pre-check scans in
//! [`DirectoryGuard`](super::DirectoryGuard) alone, so racing requests can
//! both succeed. Strict mode additionally reserves each value in a
//! [`UniquenessIndex`] before the write is enqueued or applied.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;

use crate::domain::Error;
use crate::domain::directory_guard::map_store_error;
use crate::domain::ports::{ClaimOutcome, UniqueKey, UniqueKind, UniquenessIndex};

/// How name and email uniqueness is enforced.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UniquenessMode {
    /// Read-then-write pre-checks only.
    #[default]
    Advisory,
    /// Pre-checks plus atomic claims in a uniqueness index.
    Strict,
}

/// Raised when parsing an unknown mode.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown uniqueness mode `{0}`; expected `advisory` or `strict`")]
pub struct ParseUniquenessModeError(String);

impl FromStr for UniquenessMode {
    type Err = ParseUniquenessModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(Self::Advisory),
            "strict" => Ok(Self::Strict),
            _ => Err(ParseUniquenessModeError(s.to_owned())),
        }
    }
}

impl fmt::Display for UniquenessMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Advisory => "advisory",
            Self::Strict => "strict",
        })
    }
}

/// Claims handle shared by the directory services. Inert in advisory mode.
#[derive(Clone, Default)]
pub struct UniquenessClaims {
    index: Option<Arc<dyn UniquenessIndex>>,
}

impl UniquenessClaims {
    /// Claims that never touch an index.
    pub fn advisory() -> Self {
        Self { index: None }
    }

    /// Claims backed by `index`.
    pub fn strict(index: Arc<dyn UniquenessIndex>) -> Self {
        Self { index: Some(index) }
    }

    /// Active mode.
    pub fn mode(&self) -> UniquenessMode {
        if self.index.is_some() {
            UniquenessMode::Strict
        } else {
            UniquenessMode::Advisory
        }
    }

    /// Reserve `key` for `owner`; conflict when another owner holds it.
    pub async fn reserve(&self, key: &UniqueKey, owner: &str) -> Result<(), Error> {
        let Some(index) = &self.index else {
            return Ok(());
        };
        match index.claim(key, owner).await.map_err(map_store_error)? {
            ClaimOutcome::Claimed => Ok(()),
            ClaimOutcome::HeldBy(_) => Err(Error::conflict(format!(
                "{} {} is already in use",
                describe(key),
                key.value()
            ))),
        }
    }

    /// Drop `owner`'s claim on `key`. Failures are logged, not returned: a
    /// stale claim only blocks reuse of the value.
    pub async fn release(&self, key: &UniqueKey, owner: &str) {
        let Some(index) = &self.index else {
            return;
        };
        if let Err(err) = index.release(key, owner).await {
            warn!(
                error = %err,
                kind = key.kind().as_str(),
                value = key.value(),
                owner,
                "failed to release uniqueness claim"
            );
        }
    }
}

fn describe(key: &UniqueKey) -> &'static str {
    match key.kind() {
        UniqueKind::OrganizationName => "organization name",
        UniqueKind::UserEmail => "email",
    }
}
