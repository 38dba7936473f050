//! HTTP remote authorization check.

use async_trait::async_trait;
use std::time::Duration;
use tracing::debug;

use crate::error::{CheckError, Result};

/// Template placeholder replaced with the user identifier.
pub const USER_PLACEHOLDER: &str = ":user";
/// Template placeholder replaced with the role's external identifier.
pub const ROLE_PLACEHOLDER: &str = ":role";

/// Body an authorized check answers with.
const AUTHORIZED_BODY: &str = "Y";

/// Yes/no authorization check against a remote endpoint.
#[async_trait]
pub trait AuthCheck: Send + Sync {
    /// Whether `user` holds the role addressed by `external_id`.
    async fn check(&self, user: &str, external_id: &str) -> Result<bool>;
}

/// HTTP checker configuration
#[derive(Debug, Clone)]
pub struct HttpAuthCheckConfig {
    /// Endpoint URL template with `:user` and `:role` placeholders.
    pub endpoint_template: String,
    /// Basic-auth user name.
    pub user_name: String,
    /// Basic-auth password.
    pub user_password: String,
    /// Connect timeout
    pub connect_timeout: Duration,
    /// Request timeout
    pub request_timeout: Duration,
}

impl Default for HttpAuthCheckConfig {
    fn default() -> Self {
        Self {
            endpoint_template: String::new(),
            user_name: String::new(),
            user_password: String::new(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
        }
    }
}

/// Remote checker issuing one GET per (user, role) pair.
///
/// Any HTTP response is answered by the body comparison; only transport
/// failures surface as errors. No retries and no caching here — both are
/// the caller's policy.
#[derive(Debug)]
pub struct HttpAuthCheck {
    config: HttpAuthCheckConfig,
    client: reqwest::Client,
}

impl HttpAuthCheck {
    pub fn new(config: HttpAuthCheckConfig) -> Result<Self> {
        for placeholder in [USER_PLACEHOLDER, ROLE_PLACEHOLDER] {
            if !config.endpoint_template.contains(placeholder) {
                return Err(CheckError::Template(format!(
                    "missing {} placeholder in {:?}",
                    placeholder, config.endpoint_template
                )));
            }
        }

        let client = reqwest::Client::builder()
            .connect_timeout(config.connect_timeout)
            .timeout(config.request_timeout)
            .build()?;

        Ok(Self { config, client })
    }

    fn check_url(&self, user: &str, external_id: &str) -> String {
        self.config
            .endpoint_template
            .replace(USER_PLACEHOLDER, user)
            .replace(ROLE_PLACEHOLDER, external_id)
    }
}

#[async_trait]
impl AuthCheck for HttpAuthCheck {
    async fn check(&self, user: &str, external_id: &str) -> Result<bool> {
        let url = self.check_url(user, external_id);

        let response = self
            .client
            .get(&url)
            .basic_auth(&self.config.user_name, Some(&self.config.user_password))
            .send()
            .await?;

        let body = response.text().await?;
        let authorized = body == AUTHORIZED_BODY;
        debug!(user = %user, external_id = %external_id, authorized, "Remote role check");
        Ok(authorized)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(template: &str) -> HttpAuthCheckConfig {
        HttpAuthCheckConfig {
            endpoint_template: template.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn rejects_template_without_placeholders() {
        assert!(matches!(
            HttpAuthCheck::new(config("https://example.com/check")).unwrap_err(),
            CheckError::Template(_)
        ));
        assert!(matches!(
            HttpAuthCheck::new(config("https://example.com/check/:user")).unwrap_err(),
            CheckError::Template(_)
        ));
    }

    #[test]
    fn substitutes_both_placeholders() {
        let checker =
            HttpAuthCheck::new(config("https://example.com/check/:user/:role")).unwrap();
        assert_eq!(
            checker.check_url("alice", "route/admin"),
            "https://example.com/check/alice/route/admin"
        );
    }
}
