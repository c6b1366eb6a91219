use log::debug;
use std::error::Error as StdError;
use std::fmt;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error produced by an [`Environment`] when a file cannot be loaded.
pub type LoadError = Box<dyn StdError + Send + Sync>;

/// Access to the files and variables that make up the process environment.
///
/// The resolver only talks to the outside world through this trait so it can
/// be driven by an in-memory fake in tests.
pub trait Environment {
    /// Whether a file exists at `path`.
    fn file_exists(&self, path: &Path) -> bool;

    /// Load a `KEY=value` file into the environment.
    ///
    /// Variables that are already set must not be overridden.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    fn load_file(&self, path: &Path) -> Result<(), LoadError>;

    /// Read a variable, returning an empty string when it is unset.
    fn var(&self, key: &str) -> String;
}

impl<E: Environment + ?Sized> Environment for &E {
    fn file_exists(&self, path: &Path) -> bool {
        (**self).file_exists(path)
    }

    fn load_file(&self, path: &Path) -> Result<(), LoadError> {
        (**self).load_file(path)
    }

    fn var(&self, key: &str) -> String {
        (**self).var(key)
    }
}

/// Name of an environment variable together with an explanation of what it is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvKey {
    pub key: String,
    pub used_for: String,
}

impl EnvKey {
    #[must_use]
    pub fn new(key: impl Into<String>, used_for: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            used_for: used_for.into(),
        }
    }
}

impl fmt::Display for EnvKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key)
    }
}

/// A key paired with the value it resolved to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnvValue {
    pub key: EnvKey,
    pub value: String,
}

/// Errors that can occur while resolving an environment value
#[derive(Debug, Error)]
pub enum EnvError {
    #[error("example file not found")]
    ExampleFileNotFound { path: PathBuf },

    #[error("file not found")]
    FileNotFound {
        path: PathBuf,
        #[source]
        source: LoadError,
    },

    #[error("invalid key")]
    InvalidKey,

    #[error("value not found")]
    ValueNotFound {
        key: EnvKey,
        example_file: Option<PathBuf>,
    },
}

impl EnvError {
    /// Longer explanation meant for the person running the tool.
    #[must_use]
    pub fn hint(&self) -> String {
        match self {
            Self::ExampleFileNotFound { path } => format!(
                "Couldn't find \"{}\"\n\n\
                 TIP: It is not mandatory to have an example file. So you can skip this.\n\
                 But it is a good idea to always provide one for ease of use",
                path.display()
            ),
            Self::FileNotFound { path, source } => format!(
                "Couldn't load \"{}\" ({source})\n\n\
                 TIP: You don't necessarily have to pass this value, if the value\n\
                 is already present in system environment variables",
                path.display()
            ),
            Self::InvalidKey => "No environment variable name was configured".to_owned(),
            Self::ValueNotFound { key, example_file } => {
                let mut hint = format!(
                    "Couldn't read value for key \"{}\" from environment variables\n\
                     Here's something that may explain its use:\n\n{}",
                    key.key, key.used_for
                );
                if let Some(example) = example_file {
                    hint.push_str(&format!(
                        "\nUse \"{}\" file for reference",
                        example.display()
                    ));
                }
                hint
            }
        }
    }
}

/// Resolves a single environment value with optional `.env` and example file support.
///
/// Resolution order:
/// 1. the example file must exist, if one is given
/// 2. the env file is loaded into the environment, if one is given
/// 3. the key is read from the environment
///
/// The value found is cached for the lifetime of the resolver.
#[derive(Debug)]
pub struct EnvResolver<E: Environment> {
    file: Option<PathBuf>,
    example_file: Option<PathBuf>,
    value: EnvValue,
    env: E,
}

impl<E: Environment> EnvResolver<E> {
    /// Resolve `key`, loading `file` first when it is given.
    ///
    /// Empty paths are treated the same as `None`.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::ExampleFileNotFound`] if the example file is given but missing.
    /// Returns [`EnvError::FileNotFound`] if the env file is given but cannot be loaded.
    /// Returns [`EnvError::InvalidKey`] if the key name is empty.
    /// Returns [`EnvError::ValueNotFound`] if the variable is unset or empty.
    pub fn resolve(
        file: Option<&Path>,
        example_file: Option<&Path>,
        key: EnvKey,
        env: E,
    ) -> Result<Self, EnvError> {
        let file = non_empty(file);
        let example_file = non_empty(example_file);

        if let Some(example) = &example_file {
            if !env.file_exists(example) {
                return Err(EnvError::ExampleFileNotFound {
                    path: example.clone(),
                });
            }
            debug!("Found example file {}", example.display());
        }

        if let Some(path) = &file {
            env.load_file(path)
                .map_err(|source| EnvError::FileNotFound {
                    path: path.clone(),
                    source,
                })?;
            debug!("Loaded {}", path.display());
        }

        let value = read_value(&env, &key, example_file.as_deref())?;

        Ok(Self {
            file,
            example_file,
            value: EnvValue { key, value },
            env,
        })
    }

    /// The value found during resolution, or by the last successful [`Self::latest_value`].
    #[must_use]
    pub fn cached_value(&self) -> &str {
        &self.value.value
    }

    /// Read the variable again and refresh the cache.
    ///
    /// # Errors
    ///
    /// Returns [`EnvError::ValueNotFound`] if the variable is now unset or empty.
    /// The cached value is left untouched in that case.
    pub fn latest_value(&mut self) -> Result<&str, EnvError> {
        let value = read_value(&self.env, &self.value.key, self.example_file.as_deref())?;
        self.value.value = value;
        Ok(&self.value.value)
    }

    #[must_use]
    pub fn key(&self) -> &EnvKey {
        &self.value.key
    }

    #[must_use]
    pub fn resolved(&self) -> &EnvValue {
        &self.value
    }

    #[must_use]
    pub fn file_path(&self) -> Option<&Path> {
        self.file.as_deref()
    }

    #[must_use]
    pub fn example_file_path(&self) -> Option<&Path> {
        self.example_file.as_deref()
    }
}

fn read_value<E: Environment>(
    env: &E,
    key: &EnvKey,
    example_file: Option<&Path>,
) -> Result<String, EnvError> {
    if key.key.is_empty() {
        return Err(EnvError::InvalidKey);
    }

    let value = env.var(&key.key);
    if value.is_empty() {
        return Err(EnvError::ValueNotFound {
            key: key.clone(),
            example_file: example_file.map(Path::to_path_buf),
        });
    }

    Ok(value)
}

fn non_empty(path: Option<&Path>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
        .map(Path::to_path_buf)
}
