use crate::config::ConfigError;

#[derive(thiserror::Error)]
pub enum FirebaseError {
    #[error("configuration: {0}")]
    Configuration(#[from] ConfigError),

    #[error("Failed to initialise Firebase app: {0:#}")]
    Initialisation(anyhow::Error),

    #[error("The default Firebase app has already been initialised")]
    AlreadyInitialised,

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl FirebaseError {
    pub fn is_configuration(&self) -> bool {
        matches!(self, FirebaseError::Configuration(_))
    }

    pub fn is_initialisation(&self) -> bool {
        matches!(self, FirebaseError::Initialisation(_))
    }
}

impl std::fmt::Debug for FirebaseError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

// Taken from https://www.lpalmieri.com/posts/error-handling-rust/#internal-errors
fn error_chain_fmt(
    e: &impl std::error::Error,
    f: &mut std::fmt::Formatter<'_>,
) -> std::fmt::Result {
    writeln!(f, "{}\n", e)?;
    let mut current = e.source();
    while let Some(cause) = current {
        writeln!(f, "Caused by:\n\t{}", cause)?;
        current = cause.source();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn debug_output_includes_the_cause_chain() {
        let err = FirebaseError::Configuration(ConfigError::ServiceAccountFile {
            path: "missing.json".into(),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        });

        let debug = format!("{err:?}");

        assert!(debug.starts_with("configuration: "));
        assert!(debug.contains("Caused by:"));
    }

    #[test]
    fn classifies_error_kinds() {
        let config_err = FirebaseError::from(ConfigError::Missing(vec!["GCP_PROJECT_ID".into()]));
        assert!(config_err.is_configuration());
        assert!(!config_err.is_initialisation());

        let init_err = FirebaseError::Initialisation(anyhow::anyhow!("bad key"));
        assert!(init_err.is_initialisation());
        assert!(!FirebaseError::AlreadyInitialised.is_configuration());
    }
}
