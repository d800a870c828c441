//! Loading the service account credential from environment variables.
//!
//! Variables are looked up in the process environment first and then in a
//! `.env` file, which by default sits one directory above the working
//! directory. The process environment is never modified.

use std::{
    collections::HashMap,
    path::{Path, PathBuf},
};

use crate::service_account::ServiceAccount;

pub const DEFAULT_ENV_FILE: &str = "../.env";
pub const PROJECT_ID_VAR: &str = "GCP_PROJECT_ID";
pub const CLIENT_EMAIL_VAR: &str = "GCP_CLIENT_EMAIL";
pub const PRIVATE_KEY_VAR: &str = "GCP_PRIVATE_KEY";

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("missing required configuration: {}", .0.join(", "))]
    Missing(Vec<String>),

    #[error("failed to load env file '{}'", path.display())]
    EnvFile {
        path: PathBuf,
        #[source]
        source: dotenvy::Error,
    },

    #[error("failed to read service account file '{}'", path.display())]
    ServiceAccountFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid service account JSON in '{}'", path.display())]
    ServiceAccountJson {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Reads a [`ServiceAccount`] from environment variables.
#[derive(Debug, Clone)]
pub struct EnvLoader {
    env_file: Option<PathBuf>,
    project_id_var: String,
    client_email_var: String,
    private_key_var: String,
}

impl Default for EnvLoader {
    fn default() -> Self {
        Self {
            env_file: Some(PathBuf::from(DEFAULT_ENV_FILE)),
            project_id_var: PROJECT_ID_VAR.to_string(),
            client_email_var: CLIENT_EMAIL_VAR.to_string(),
            private_key_var: PRIVATE_KEY_VAR.to_string(),
        }
    }
}

impl EnvLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read fallback variables from a different `.env` file.
    pub fn env_file(mut self, env_file: impl Into<PathBuf>) -> Self {
        self.env_file = Some(env_file.into());
        self
    }

    /// Only consult the process environment.
    pub fn without_env_file(mut self) -> Self {
        self.env_file = None;
        self
    }

    pub fn project_id_var(mut self, name: impl Into<String>) -> Self {
        self.project_id_var = name.into();
        self
    }

    pub fn client_email_var(mut self, name: impl Into<String>) -> Self {
        self.client_email_var = name.into();
        self
    }

    pub fn private_key_var(mut self, name: impl Into<String>) -> Self {
        self.private_key_var = name.into();
        self
    }

    /// Load the service account from the process environment, falling back
    /// to the `.env` file for variables the process does not define.
    ///
    /// A `.env` file that cannot be parsed is skipped with a warning when the
    /// process environment alone is complete, and is an error otherwise.
    pub fn load(&self) -> Result<ServiceAccount, ConfigError> {
        let file_vars = match self.env_file.as_deref().map(read_env_file) {
            Some(Ok(vars)) => vars,
            Some(Err(err)) => {
                return match self.load_from(|name| std::env::var(name).ok()) {
                    Ok(service_account) => {
                        tracing::warn!("Ignoring unreadable env file: {}", err);
                        Ok(service_account)
                    }
                    Err(_) => Err(err),
                };
            }
            None => HashMap::new(),
        };

        self.load_from(|name| {
            std::env::var(name)
                .ok()
                .or_else(|| file_vars.get(name).cloned())
        })
    }

    /// Load the service account using `lookup` to resolve variable names.
    ///
    /// Absent, empty, and whitespace-only values are all treated as missing,
    /// and every missing variable is named in the returned error.
    pub fn load_from(
        &self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<ServiceAccount, ConfigError> {
        let mut missing = Vec::new();
        let mut require = |name: &str| match lookup(name) {
            Some(value) if !value.trim().is_empty() => value,
            _ => {
                missing.push(name.to_string());
                String::new()
            }
        };

        let project_id = require(&self.project_id_var);
        let client_email = require(&self.client_email_var);
        let private_key = require(&self.private_key_var);

        if !missing.is_empty() {
            tracing::error!(?missing, "Missing Firebase service account configuration");
            return Err(ConfigError::Missing(missing));
        }

        Ok(ServiceAccount::new(project_id, client_email, private_key))
    }
}

fn read_env_file(path: &Path) -> Result<HashMap<String, String>, ConfigError> {
    let env_file_err = |source| ConfigError::EnvFile {
        path: path.to_path_buf(),
        source,
    };

    let iter = match dotenvy::from_path_iter(path) {
        Ok(iter) => iter,
        Err(e) if e.not_found() => {
            tracing::debug!(path = %path.display(), "No env file found, using process environment only");
            return Ok(HashMap::new());
        }
        Err(e) => return Err(env_file_err(e)),
    };

    let vars = iter
        .collect::<Result<HashMap<_, _>, _>>()
        .map_err(env_file_err)?;

    tracing::debug!(path = %path.display(), count = vars.len(), "Loaded env file");

    Ok(vars)
}
