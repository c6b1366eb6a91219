use log::{debug, warn};
use serde::Serialize;
use std::path::Path;

use crate::config::Settings;
use crate::domain::{
    CardData, EnvError, EnvKey, EnvResolver, Environment, ErrorData, GraphqlResponse,
    RepositoryCard, RequestHeader, Transport, dispatch,
};

pub const GITHUB_TOKEN_HELP: &str = "This is used as Github Authentication Token. \
It is required to access github's servers.\n\n\
You can create yours at:\n\
https://docs.github.com/en/authentication/keeping-your-account-and-data-secure/creating-a-personal-access-token\n\n\
While generating your token, no permissions or scopes are required.";

/// What a card fetch produced: the GraphQL answer, or the classified failure.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum CardOutcome {
    Fetched(GraphqlResponse<CardData>),
    Failed(ErrorData),
}

impl From<Result<GraphqlResponse<CardData>, ErrorData>> for CardOutcome {
    fn from(result: Result<GraphqlResponse<CardData>, ErrorData>) -> Self {
        match result {
            Ok(response) => Self::Fetched(response),
            Err(error) => Self::Failed(error),
        }
    }
}

/// The environment key holding the Github token.
#[must_use]
pub fn token_key(settings: &Settings) -> EnvKey {
    EnvKey::new(settings.token_key.clone(), GITHUB_TOKEN_HELP)
}

/// Resolve the Github token, loading env files relative to `dir`.
///
/// # Errors
///
/// Returns an [`EnvError`] if the token cannot be resolved.
pub fn resolve_token<E: Environment>(
    settings: &Settings,
    dir: &Path,
    env: E,
) -> Result<EnvResolver<E>, EnvError> {
    let env_file = settings.env_file_in(dir);
    let example_file = settings.example_file_in(dir);

    EnvResolver::resolve(
        env_file.as_deref(),
        example_file.as_deref(),
        token_key(settings),
        env,
    )
}

/// Fetch the repository card configured in `settings`.
///
/// GraphQL-level errors reported next to `data` are logged, not treated as failures.
///
/// # Errors
///
/// Returns the [`ErrorData`] produced by [`dispatch`].
pub fn fetch<C: Transport + ?Sized>(
    settings: &Settings,
    token: &str,
    transport: &C,
) -> Result<GraphqlResponse<CardData>, ErrorData> {
    let headers = [
        RequestHeader::json_content_type(),
        RequestHeader::authorization(token),
    ];
    let query = RepositoryCard::query(&settings.owner, &settings.name).map_err(|e| {
        debug!("Failed to build query: {e}");
        ErrorData::caller(ErrorData::INVALID_QUERY_DATA)
    })?;

    debug!("Fetching card for {}/{}", settings.owner, settings.name);
    let response: GraphqlResponse<CardData> =
        dispatch(&settings.endpoint, &query, &headers, transport)?;

    for error in &response.errors {
        warn!("Github reported: {}", error.message);
    }

    if let Some(CardData { repository: None }) = &response.data {
        warn!(
            "Repository {}/{} could not be resolved",
            settings.owner, settings.name
        );
    }

    Ok(response)
}
