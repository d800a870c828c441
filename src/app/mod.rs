use anyhow::Context;

use crate::{credential::ServiceAccountCredential, error::FirebaseError, ServiceAccount};

mod options;

pub use options::{FirebaseAppOptions, DEFAULT_SCOPES, DEFAULT_TOKEN_URL};

/// An initialised Firebase Admin app: a service account credential together
/// with the HTTP client used to talk to Google on its behalf.
///
/// Usually there is one per process, obtained through
/// [`get_client`](crate::get_client).
pub struct FirebaseApp {
    credential: ServiceAccountCredential,
    http_client: reqwest::Client,
    options: FirebaseAppOptions,
}

impl FirebaseApp {
    /// Initialise an app bound to the given service account.
    ///
    /// Fails with [`FirebaseError::Configuration`] if any part of the service
    /// account is empty, and with [`FirebaseError::Initialisation`] if the
    /// private key cannot be used to sign assertions.
    #[tracing::instrument(name = "Initialise Firebase app", skip_all, fields(project_id = %service_account.project_id))]
    pub fn initialise(
        service_account: ServiceAccount,
        options: FirebaseAppOptions,
    ) -> Result<Self, FirebaseError> {
        service_account.validate()?;

        let http_client = reqwest::Client::builder()
            .timeout(options.http_timeout)
            .build()
            .context("Failed to create HTTP client")
            .map_err(FirebaseError::Initialisation)?;

        let credential =
            ServiceAccountCredential::new(service_account, &options, http_client.clone())
                .map_err(FirebaseError::Initialisation)?;

        // A key can be valid PEM and still be unusable for RS256.
        credential
            .create_auth_jwt()
            .map_err(FirebaseError::Initialisation)?;

        tracing::info!("Firebase app initialised");

        Ok(Self {
            credential,
            http_client,
            options,
        })
    }

    pub fn project_id(&self) -> &str {
        &self.credential.service_account().project_id
    }

    pub fn client_email(&self) -> &str {
        &self.credential.service_account().client_email
    }

    /// The HTTP client shared by everything that talks to Google through
    /// this app.
    pub fn http_client(&self) -> &reqwest::Client {
        &self.http_client
    }

    pub fn options(&self) -> &FirebaseAppOptions {
        &self.options
    }

    /// An OAuth2 bearer token for calling Google APIs as the service account.
    pub async fn access_token(&self) -> Result<String, FirebaseError> {
        let token = self.credential.get_access_token().await?;
        Ok(token)
    }

    /// Exchange the credential for an access token once, to confirm that
    /// Google accepts it. A revoked account, a key Google does not recognise,
    /// or an unreachable token endpoint all fail with
    /// [`FirebaseError::Initialisation`].
    pub async fn verify(&self) -> Result<(), FirebaseError> {
        self.credential
            .get_access_token()
            .await
            .map_err(FirebaseError::Initialisation)?;

        tracing::info!(project_id = self.project_id(), "Firebase credential verified");

        Ok(())
    }
}

impl std::fmt::Debug for FirebaseApp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FirebaseApp")
            .field("project_id", &self.project_id())
            .field("client_email", &self.client_email())
            .finish_non_exhaustive()
    }
}
