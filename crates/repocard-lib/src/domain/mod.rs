pub mod env;
pub mod graphql;
pub mod repository;

pub use env::{EnvError, EnvKey, EnvResolver, EnvValue, Environment, LoadError};
pub use graphql::{
    ErrorData, ErrorOrigin, GraphqlError, GraphqlResponse, HttpRequest, HttpResponse,
    RequestHeader, Transport, TransportError, dispatch,
};
pub use repository::{CardData, Language, RepositoryCard};
