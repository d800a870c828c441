use std::{fs::File, path::Path};

use serde::Deserialize;

use crate::config::ConfigError;

/// Service account information, either read from the environment or from the
/// service account JSON file that you can download from Firebase.
///
/// `Serialize`, `Display`, and `Debug` are intentionally not implemented to
/// avoid accidentally leaking credentials.
#[derive(Deserialize, Clone)]
pub struct ServiceAccount {
    pub project_id: String,
    pub client_email: String,
    pub private_key: String,
    #[serde(default)]
    pub private_key_id: Option<String>,
}

impl ServiceAccount {
    /// Creates a service account from its three required parts. Escaped line
    /// breaks in `private_key` are turned into real ones, see
    /// [`normalize_private_key`].
    pub fn new(
        project_id: impl Into<String>,
        client_email: impl Into<String>,
        private_key: impl AsRef<str>,
    ) -> Self {
        Self {
            project_id: project_id.into(),
            client_email: client_email.into(),
            private_key: normalize_private_key(private_key.as_ref()),
            private_key_id: None,
        }
    }

    /// Sets the ID of the private key, which is sent as `kid` in signed JWTs.
    pub fn with_private_key_id(mut self, private_key_id: impl Into<String>) -> Self {
        self.private_key_id = Some(private_key_id.into());
        self
    }

    /// Creates a new `ServiceAccount` instance from a service account JSON
    /// file. You can download such a file from Firebase.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let file_reader = File::open(path).map_err(|source| ConfigError::ServiceAccountFile {
            path: path.to_path_buf(),
            source,
        })?;
        let service_account: ServiceAccount =
            serde_json::from_reader(file_reader).map_err(|source| {
                ConfigError::ServiceAccountJson {
                    path: path.to_path_buf(),
                    source,
                }
            })?;

        Ok(Self {
            private_key: normalize_private_key(&service_account.private_key),
            ..service_account
        })
    }

    /// Checks that none of the required fields are empty. All empty fields
    /// are reported at once.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let missing: Vec<String> = [
            ("project_id", &self.project_id),
            ("client_email", &self.client_email),
            ("private_key", &self.private_key),
        ]
        .into_iter()
        .filter(|(_, value)| value.trim().is_empty())
        .map(|(name, _)| name.to_string())
        .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(ConfigError::Missing(missing))
        }
    }
}

/// Replaces every escaped line break (a backslash followed by `n`) with a real
/// line break.
///
/// Private keys exported from the cloud console are usually pasted into
/// environment variables with their line breaks escaped, and PEM parsing
/// fails unless they are restored.
pub fn normalize_private_key(private_key: &str) -> String {
    private_key.replace(r"\n", "\n")
}
