use kindling::{config::ConfigError, config::EnvLoader, error::FirebaseError, get_client_with};

#[test]
fn missing_variables_fail_before_anything_is_initialised() {
    let loader = EnvLoader::new().without_env_file();

    let result = temp_env::with_vars(
        [
            ("GCP_PROJECT_ID", Some("kindling-test")),
            ("GCP_CLIENT_EMAIL", Some("")),
            ("GCP_PRIVATE_KEY", None),
        ],
        || get_client_with(&loader),
    );

    match result {
        Err(FirebaseError::Configuration(ConfigError::Missing(missing))) => {
            assert_eq!(missing, vec!["GCP_CLIENT_EMAIL", "GCP_PRIVATE_KEY"]);
        }
        other => panic!("expected a configuration error, got {other:?}"),
    }

    assert!(kindling::try_get_client().is_none());
}
