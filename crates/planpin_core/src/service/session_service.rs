//! Session use-case service for the name-only local login.
//!
//! # Responsibility
//! - Validate and persist the current user name.
//! - Resolve the effective user for callers that need an owner either way.
//!
//! # Invariants
//! - Persisted names are trimmed and never empty.
//! - Logging in never touches task data; switching users only changes
//!   which tasks queries see.

use crate::repo::session_repo::SessionRepository;
use crate::repo::task_repo::RepoError;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Owner used when no login session exists.
pub const DEFAULT_USER: &str = "demo";

pub type SessionResult<T> = Result<T, SessionError>;

/// Failures of session use-cases.
#[derive(Debug)]
pub enum SessionError {
    /// Login name is empty after trimming.
    EmptyName,
    /// Underlying persistence error.
    Repo(RepoError),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyName => write!(f, "login name must not be empty"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::EmptyName => None,
            Self::Repo(err) => Some(err),
        }
    }
}

impl From<RepoError> for SessionError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Use-case service wrapper for the local login session.
pub struct SessionService<R: SessionRepository> {
    repo: R,
}

impl<R: SessionRepository> SessionService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Persists `name` as the current user.
    ///
    /// # Contract
    /// - Surrounding whitespace is trimmed before persisting.
    /// - A name that is empty after trimming fails with `EmptyName` and
    ///   leaves any existing session untouched.
    pub fn login(&self, name: &str) -> SessionResult<()> {
        let name = name.trim();
        if name.is_empty() {
            return Err(SessionError::EmptyName);
        }

        self.repo.save_current_user(name)?;
        Ok(())
    }

    /// Clears the persisted session. Idempotent.
    pub fn logout(&self) -> SessionResult<()> {
        self.repo.clear_current_user()?;
        Ok(())
    }

    /// The persisted user name, if a session exists.
    pub fn current_user(&self) -> SessionResult<Option<String>> {
        Ok(self.repo.load_current_user()?)
    }

    /// The user to attribute work to: the session name, or the demo
    /// fallback when nobody is logged in.
    pub fn effective_user(&self) -> SessionResult<String> {
        Ok(self
            .repo
            .load_current_user()?
            .unwrap_or_else(|| DEFAULT_USER.to_string()))
    }
}
