//! # Kindling
//!
//! Kindling sets up the Firebase Admin credentials for a backend process:
//!
//! - **Configuration**: the project ID, client email, and private key of a
//!   service account are read from the environment, with a `.env` file one
//!   directory up as fallback. See [`config::EnvLoader`].
//! - **Credential**: the private key's escaped line breaks are restored so it
//!   is a valid PEM block, and the key is used to sign OAuth2 assertions.
//!   See [`ServiceAccount`] and [`normalize_private_key`].
//! - **Default app**: a single process-wide [`FirebaseApp`] that every other
//!   module obtains through [`get_client`].
//!
//! ## Getting the client
//!
//! ```no_run
//! # #[tokio::main]
//! # async fn main() -> Result<(), kindling::error::FirebaseError> {
//! // Reads GCP_PROJECT_ID, GCP_CLIENT_EMAIL, and GCP_PRIVATE_KEY on first use.
//! let app = kindling::get_client()?;
//!
//! // Every later call hands out the same instance.
//! assert!(std::ptr::eq(app, kindling::get_client()?));
//!
//! // Bearer token for calling Google APIs as the service account.
//! let _token = app.access_token().await?;
//! # Ok(())
//! # }
//! ```

pub mod app;
pub mod config;
pub mod credential;
mod default_app;
pub mod error;
mod service_account;

#[cfg(test)]
mod test_helpers;

pub use app::{FirebaseApp, FirebaseAppOptions};
pub use default_app::{get_client, get_client_with, initialise_default_app, try_get_client};
pub use service_account::{normalize_private_key, ServiceAccount};
