//! HTTPS wrapper over the registry's REST contract.

use std::time::Duration;

use reqwest::{Method, StatusCode};
use serde::de::DeserializeOwned;

use crate::error::{NetworkError, RegistryError};

use super::schema::{
    PublishConfirmRequest, PublishConfirmResponse, PublishInitRequest, PublishInitResponse,
    SearchResult, SkillInfo, VersionDetail, VersionEntry,
};

const USER_AGENT_PREFIX: &str = "tank-cli";
const DEFAULT_METADATA_TIMEOUT: Duration = Duration::from_secs(30);

pub struct RegistryClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl RegistryClient {
    pub fn new(base_url: impl Into<String>, token: Option<String>) -> Self {
        let http = reqwest::Client::builder()
            .timeout(DEFAULT_METADATA_TIMEOUT)
            .build()
            .expect("reqwest client always builds with these options");
        Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        }
    }

    fn user_agent() -> String {
        format!("{USER_AGENT_PREFIX}/{}", env!("CARGO_PKG_VERSION"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&(impl serde::Serialize + ?Sized)>,
    ) -> Result<T, RegistryError> {
        let url = self.url(path);
        let mut request = self
            .http
            .request(method, &url)
            .header("User-Agent", Self::user_agent());

        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|source| {
            RegistryError::Network(NetworkError::Request {
                url: url.clone(),
                source,
            })
        })?;

        map_status(response.status(), &url)?;

        response.json::<T>().await.map_err(|source| {
            RegistryError::Network(NetworkError::Request {
                url: url.clone(),
                source,
            })
        })
    }

    pub async fn list_versions(&self, name: &str) -> Result<Vec<VersionEntry>, RegistryError> {
        self.request(Method::GET, &format!("/api/v1/skills/{}/versions", encode(name)), NO_BODY)
            .await
    }

    pub async fn get_version(&self, name: &str, version: &str) -> Result<VersionDetail, RegistryError> {
        self.request(
            Method::GET,
            &format!("/api/v1/skills/{}/{}", encode(name), encode(version)),
            NO_BODY,
        )
        .await
    }

    pub async fn search(&self, query: &str) -> Result<Vec<SearchResult>, RegistryError> {
        self.request(
            Method::GET,
            &format!("/api/v1/skills/search?q={}", encode(query)),
            NO_BODY,
        )
        .await
    }

    pub async fn info(&self, name: &str) -> Result<SkillInfo, RegistryError> {
        self.request(Method::GET, &format!("/api/v1/skills/{}", encode(name)), NO_BODY)
            .await
    }

    pub async fn publish_init(
        &self,
        manifest: &crate::manifest::SkillManifest,
    ) -> Result<PublishInitResponse, RegistryError> {
        self.request(
            Method::POST,
            "/api/v1/skills",
            Some(&PublishInitRequest { manifest }),
        )
        .await
    }

    pub async fn publish_confirm(
        &self,
        request: &PublishConfirmRequest,
    ) -> Result<PublishConfirmResponse, RegistryError> {
        self.request(Method::POST, "/api/v1/skills/confirm", Some(request))
            .await
    }

    /// Upload the packed tarball to the pre-signed URL returned by `publish_init`.
    pub async fn upload(&self, upload_url: &str, bytes: Vec<u8>) -> Result<(), RegistryError> {
        let response = self
            .http
            .put(upload_url)
            .header("User-Agent", Self::user_agent())
            .body(bytes)
            .send()
            .await
            .map_err(|source| {
                RegistryError::Network(NetworkError::Request {
                    url: upload_url.to_string(),
                    source,
                })
            })?;
        map_status(response.status(), upload_url)
    }
}

const NO_BODY: Option<&()> = None;

fn encode(segment: &str) -> String {
    segment.replace('@', "%40").replace('/', "%2F")
}

fn map_status(status: StatusCode, url: &str) -> Result<(), RegistryError> {
    match status.as_u16() {
        200..=299 => Ok(()),
        401 => Err(RegistryError::Unauthorized(url.to_string())),
        403 => Err(RegistryError::Forbidden(url.to_string())),
        404 => Err(RegistryError::NotFound(url.to_string())),
        409 => Err(RegistryError::Conflict(url.to_string())),
        500..=599 => Err(RegistryError::Server {
            status: status.as_u16(),
            body: url.to_string(),
        }),
        other => Err(RegistryError::Server {
            status: other,
            body: url.to_string(),
        }),
    }
}
