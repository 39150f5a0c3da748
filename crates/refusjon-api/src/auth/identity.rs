//! Client for the external identity API.
//!
//! Login exchanges credentials for a token; profile and membership lookups
//! pass the token in the `x-csrf-token` header, which is how this API
//! authenticates session tokens.

use refusjon_core::{AppError, Membership, UserProfile};
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize)]
struct LoginRequest<'a> {
    user_id: &'a str,
    password: &'a str,
}

#[derive(Debug, Deserialize)]
struct LoginResponse {
    token: String,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    detail: Option<String>,
}

/// Paginated list shape used by the identity API.
#[derive(Debug, Deserialize)]
struct Paginated<T> {
    results: Vec<T>,
}

#[derive(Clone)]
pub struct IdentityClient {
    http: reqwest::Client,
    base_url: String,
}

impl IdentityClient {
    pub fn new(http: reqwest::Client, base_url: String) -> Self {
        IdentityClient {
            http,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn error_detail(response: reqwest::Response, fallback: &str) -> String {
        response
            .json::<ApiErrorBody>()
            .await
            .ok()
            .and_then(|body| body.detail)
            .unwrap_or_else(|| fallback.to_string())
    }

    /// Exchange credentials for a session token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String, AppError> {
        let response = self
            .http
            .post(format!("{}/auth/login/", self.base_url))
            .json(&LoginRequest {
                user_id: username,
                password,
            })
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Identity API unreachable: {}", e)))?;

        if !response.status().is_success() {
            let detail = Self::error_detail(response, "Innlogging feilet").await;
            return Err(AppError::Unauthorized(detail));
        }

        let body: LoginResponse = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid login response: {}", e)))?;

        Ok(body.token)
    }

    /// Fetch the profile of the token's owner.
    pub async fn me(&self, token: &str) -> Result<UserProfile, AppError> {
        let response = self
            .http
            .get(format!("{}/users/me/", self.base_url))
            .header("x-csrf-token", token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Identity API unreachable: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let detail = Self::error_detail(response, "Du er ikke logget inn").await;
            return Err(AppError::Unauthorized(detail));
        }
        if !status.is_success() {
            let detail = Self::error_detail(response, "Identity API error").await;
            return Err(AppError::Upstream(detail));
        }

        response
            .json::<UserProfile>()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid profile response: {}", e)))
    }

    /// Fetch the group memberships of the token's owner.
    pub async fn memberships(&self, token: &str) -> Result<Vec<Membership>, AppError> {
        let response = self
            .http
            .get(format!("{}/users/me/memberships/", self.base_url))
            .header("x-csrf-token", token)
            .send()
            .await
            .map_err(|e| AppError::Upstream(format!("Identity API unreachable: {}", e)))?;

        let status = response.status();
        if status.as_u16() == 401 || status.as_u16() == 403 {
            let detail = Self::error_detail(response, "Du er ikke logget inn").await;
            return Err(AppError::Unauthorized(detail));
        }
        if !status.is_success() {
            let detail = Self::error_detail(response, "Identity API error").await;
            return Err(AppError::Upstream(detail));
        }

        let page: Paginated<Membership> = response
            .json()
            .await
            .map_err(|e| AppError::Upstream(format!("Invalid memberships response: {}", e)))?;

        Ok(page.results)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(server: &mockito::Server) -> IdentityClient {
        IdentityClient::new(reqwest::Client::new(), server.url())
    }

    #[tokio::test]
    async fn login_returns_token() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login/")
            .with_status(200)
            .with_body(r#"{"token": "abc123"}"#)
            .create_async()
            .await;

        let token = client(&server).login("olanor", "hunter2").await.unwrap();
        assert_eq!(token, "abc123");
    }

    #[tokio::test]
    async fn login_failure_surfaces_detail_as_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/auth/login/")
            .with_status(401)
            .with_body(r#"{"detail": "Feil brukernavn eller passord"}"#)
            .create_async()
            .await;

        let err = client(&server).login("olanor", "wrong").await.unwrap_err();
        match err {
            AppError::Unauthorized(detail) => {
                assert_eq!(detail, "Feil brukernavn eller passord")
            }
            other => panic!("expected Unauthorized, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn me_passes_token_header() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/users/me/")
            .match_header("x-csrf-token", "abc123")
            .with_status(200)
            .with_body(
                r#"{
                    "user_id": "olanor",
                    "first_name": "Ola",
                    "last_name": "Nordmann",
                    "email": "ola@example.org",
                    "study": {"group": {"name": "Dataingeniør"}},
                    "studyyear": {"group": {"name": "2023"}}
                }"#,
            )
            .create_async()
            .await;

        let profile = client(&server).me("abc123").await.unwrap();
        assert_eq!(profile.user_id, "olanor");
        assert_eq!(profile.study.group.name, "Dataingeniør");
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn expired_token_is_unauthorized() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/")
            .with_status(401)
            .with_body(r#"{"detail": "Ugyldig token"}"#)
            .create_async()
            .await;

        let err = client(&server).me("stale").await.unwrap_err();
        assert!(matches!(err, AppError::Unauthorized(_)));
    }

    #[tokio::test]
    async fn memberships_unwraps_paginated_results() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/me/memberships/")
            .with_status(200)
            .with_body(
                r#"{"results": [
                    {"group": {"name": "Pythons"}},
                    {"group": {"name": "Drift"}}
                ]}"#,
            )
            .create_async()
            .await;

        let memberships = client(&server).memberships("abc123").await.unwrap();
        assert_eq!(memberships.len(), 2);
        assert_eq!(memberships[0].group.name, "Pythons");
    }
}
