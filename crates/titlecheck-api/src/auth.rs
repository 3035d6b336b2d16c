//! Operator sign-in/sign-out against the user endpoints.

use serde::{Deserialize, Serialize};

use crate::client::ApiClient;
use crate::ApiError;

#[derive(Serialize)]
struct SigninRequest<'a> {
    email: &'a str,
    password: &'a str,
}

/// The service returns the bearer token in `data`.
#[derive(Deserialize)]
struct SigninResponse {
    #[serde(default)]
    data: Option<String>,
}

impl ApiClient {
    /// Exchange credentials for a bearer token and install it on the client.
    pub async fn signin(&self, email: &str, password: &str) -> Result<String, ApiError> {
        let url = format!("{}/api/v1/users/signin", self.base_url());
        let resp = self
            .http()
            .post(&url)
            .json(&SigninRequest { email, password })
            .send()
            .await?;

        match resp.status().as_u16() {
            401 => return Err(ApiError::Unauthorized),
            s if s >= 400 => return Err(ApiError::Status(s)),
            _ => {}
        }

        let body: SigninResponse = resp
            .json()
            .await
            .map_err(|e| ApiError::Decode(e.to_string()))?;
        let token = body
            .data
            .filter(|t| !t.is_empty())
            .ok_or_else(|| ApiError::Decode("signin response carried no token".into()))?;

        self.set_token(token.clone());
        tracing::info!("signed in");
        Ok(token)
    }

    /// End the server session and discard the local token.
    ///
    /// The token is cleared even if the server call fails; a dead session
    /// must never keep local auth state alive.
    pub async fn signout(&self) -> Result<(), ApiError> {
        let url = format!("{}/api/v1/users/signout", self.base_url());
        let result = async {
            let resp = self.authorized(self.http().get(&url)).send().await?;
            match resp.status().as_u16() {
                401 => Err(ApiError::Unauthorized),
                s if s >= 400 => Err(ApiError::Status(s)),
                _ => Ok(()),
            }
        }
        .await;

        self.clear_token();
        tracing::info!("signed out");
        result
    }
}
