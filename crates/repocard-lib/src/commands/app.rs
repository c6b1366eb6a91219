use log::debug;
use std::path::Path;
use thiserror::Error;

use crate::config::{ConfigError, Settings};
use crate::domain::EnvError;
use crate::infrastructure::{HttpError, HttpTransport, ProcessEnvironment};

use super::card::{self, CardOutcome};

/// Errors that stop the tool before or instead of printing a result
#[derive(Debug, Error)]
pub enum AppError {
    /// The settings file could not be loaded.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The Github token could not be resolved.
    #[error(transparent)]
    Env(#[from] EnvError),

    /// The HTTP client could not be initialized.
    #[error(transparent)]
    Http(#[from] HttpError),
}

/// Resolve the token from the process environment and fetch the configured card.
///
/// A failed GraphQL call is not an [`AppError`]: it is returned as [`CardOutcome::Failed`]
/// so it can be printed like any other result.
///
/// # Errors
///
/// Returns [`AppError::Env`] if the token cannot be resolved.
/// Returns [`AppError::Http`] if the HTTP client cannot be created.
pub fn card(settings: &Settings, dir: &Path) -> Result<CardOutcome, AppError> {
    let token = card::resolve_token(settings, dir, ProcessEnvironment)?;
    debug!("Resolved {}", token.key());

    let transport = HttpTransport::new(settings.timeout)?;
    Ok(card::fetch(settings, token.cached_value(), &transport).into())
}
