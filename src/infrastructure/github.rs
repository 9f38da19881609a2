//! # GitHub Actions Client
//!
//! Implements `WorkflowProvider` against the GitHub REST API.
//! One POST per operation, bounded by the configured timeout, never retried.

use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::domain::config::GitHubConfig;
use crate::domain::errors::WorkflowError;
use crate::domain::traits::WorkflowProvider;
use crate::domain::types::{DispatchRequest, RunId};

const ACCEPT: &str = "application/vnd.github+json";
const API_VERSION: &str = "2022-11-28";
const USER_AGENT: &str = concat!("neko-bot/", env!("CARGO_PKG_VERSION"));

/// `workflow_dispatch` request body
#[derive(Debug, Serialize)]
struct DispatchBody<'a> {
    #[serde(rename = "ref")]
    git_ref: &'a str,
    inputs: DispatchInputs<'a>,
}

#[derive(Debug, Serialize)]
struct DispatchInputs<'a> {
    chatid: &'a str,
    image: &'a str,
    bottoken: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    cloudflaretoken: Option<&'a str>,
}

pub struct GitHubClient {
    http: Client,
    config: GitHubConfig,
}

impl GitHubClient {
    pub fn new(config: GitHubConfig) -> anyhow::Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self { http, config })
    }

    fn dispatch_url(&self) -> String {
        format!(
            "{}/repos/{}/actions/workflows/{}/dispatches",
            self.config.api_url, self.config.repo, self.config.workflow
        )
    }

    fn cancel_url(&self, run_id: &RunId) -> String {
        format!(
            "{}/repos/{}/actions/runs/{}/cancel",
            self.config.api_url, self.config.repo, run_id
        )
    }

    fn post(&self, url: String) -> reqwest::RequestBuilder {
        self.http
            .post(url)
            .header(reqwest::header::ACCEPT, ACCEPT)
            .header("X-GitHub-Api-Version", API_VERSION)
            .bearer_auth(&self.config.token)
    }
}

/// Maps a response (or the lack of one) onto the two workflow error kinds.
async fn check(result: Result<reqwest::Response, reqwest::Error>) -> Result<(), WorkflowError> {
    let response = result.map_err(|e| WorkflowError::Network(e.without_url().to_string()))?;
    let status = response.status();
    if status.is_success() {
        return Ok(());
    }
    // Connection dropped mid-body.
    let body = response
        .text()
        .await
        .map_err(|e| WorkflowError::Network(e.without_url().to_string()))?;
    Err(WorkflowError::Http {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl WorkflowProvider for GitHubClient {
    async fn dispatch(&self, request: &DispatchRequest) -> Result<(), WorkflowError> {
        let body = DispatchBody {
            git_ref: &self.config.branch,
            inputs: DispatchInputs {
                chatid: &request.chat_id,
                image: &request.image,
                bottoken: &request.bot_token,
                cloudflaretoken: request.tunnel_token.as_deref(),
            },
        };

        let response = self.post(self.dispatch_url()).json(&body).send().await;
        let result = check(response).await;
        match &result {
            Ok(()) => tracing::info!(
                "Dispatched {} for chat {}",
                request.image,
                request.chat_id
            ),
            Err(e) => tracing::error!("Error triggering workflow: {}", e),
        }
        result
    }

    async fn cancel(&self, run_id: &RunId) -> Result<(), WorkflowError> {
        let response = self.post(self.cancel_url(run_id)).send().await;
        let result = check(response).await;
        match &result {
            Ok(()) => tracing::info!("Cancel accepted for run {}", run_id),
            Err(e) => tracing::error!("Error canceling workflow {}: {}", run_id, e),
        }
        result
    }
}
