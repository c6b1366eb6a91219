use std::env;
use std::path::Path;

use crate::domain::{Environment, LoadError};

/// The real process environment, with `.env` files loaded through `dotenvy`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnvironment;

impl Environment for ProcessEnvironment {
    fn file_exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn load_file(&self, path: &Path) -> Result<(), LoadError> {
        dotenvy::from_path(path)?;
        Ok(())
    }

    fn var(&self, key: &str) -> String {
        env::var(key).unwrap_or_default()
    }
}
