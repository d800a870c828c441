use std::time::Duration;

use crate::credential::GOOGLE_TOKEN_AUDIENCE;

/// Google's token endpoint doubles as the assertion audience.
pub const DEFAULT_TOKEN_URL: &str = GOOGLE_TOKEN_AUDIENCE;

pub const DEFAULT_SCOPES: [&str; 5] = [
    "https://www.googleapis.com/auth/cloud-platform",
    "https://www.googleapis.com/auth/firebase.database",
    "https://www.googleapis.com/auth/firebase.messaging",
    "https://www.googleapis.com/auth/identitytoolkit",
    "https://www.googleapis.com/auth/userinfo.email",
];

#[derive(Debug, Clone)]
pub struct FirebaseAppOptions {
    pub token_url: String,
    pub scopes: Vec<String>,
    pub http_timeout: Duration,
}

impl Default for FirebaseAppOptions {
    fn default() -> Self {
        Self {
            token_url: DEFAULT_TOKEN_URL.to_string(),
            scopes: DEFAULT_SCOPES.iter().map(|s| s.to_string()).collect(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl FirebaseAppOptions {
    /// The OAuth2 endpoint that signed assertions are exchanged at.
    pub fn token_url(mut self, token_url: impl Into<String>) -> Self {
        self.token_url = token_url.into();
        self
    }

    pub fn scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn http_timeout(mut self, http_timeout: Duration) -> Self {
        self.http_timeout = http_timeout;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_google_token_endpoint() {
        let options = FirebaseAppOptions::default();

        assert_eq!(options.token_url, GOOGLE_TOKEN_AUDIENCE);
        assert_eq!(options.scopes.len(), DEFAULT_SCOPES.len());
    }
}
