use crate::ServiceAccount;

pub(crate) fn test_service_account() -> ServiceAccount {
    ServiceAccount::new(
        "test-project",
        "sa@test-project.iam.gserviceaccount.com",
        RANDOM_RSA_KEY,
    )
}

// Don't worry, this is just a random RSA private key that has been
// generated for testing purposes.
pub(crate) const RANDOM_RSA_KEY: &str = include_str!("../tests/fixtures/random_rsa_key.pem");
