pub mod env;
pub mod http;

pub use env::ProcessEnvironment;
pub use http::{DEFAULT_TIMEOUT, HttpError, HttpTransport};
