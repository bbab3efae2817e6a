// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// GitHub Provider Adapter
//
// Anti-Corruption Layer for the GitHub REST API (github.com and
// GitHub Enterprise via a custom API base).

use super::{decode_content, http_client, join_paths, parse_json, send, status_error, FileContent};
use crate::domain::git::{
    should_include_file, web_base_from_api, GitError, GitProvider, FALLBACK_BRANCH,
    README_CANDIDATES,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::{debug, warn};

const PROVIDER: &str = "GitHub";

pub struct GitHubAdapter {
    client: reqwest::Client,
    api_base: String,
    web_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct RepoInfo {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct TreeResponse {
    tree: Vec<TreeEntry>,
    #[serde(default)]
    truncated: bool,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

impl GitHubAdapter {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let web_base = if api_base.contains("api.github.com") {
            "https://github.com".to_string()
        } else {
            web_base_from_api(&api_base)
        };
        if token.is_none() {
            debug!("No GitHub token provided; using unauthenticated requests");
        }
        Self {
            client: http_client(),
            api_base,
            web_base,
            token,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github+json");
        match &self.token {
            Some(token) => request.bearer_auth(token),
            None => request,
        }
    }

    async fn resolved_branch(&self, owner: &str, repo: &str) -> Result<String, GitError> {
        Ok(self
            .get_default_branch(owner, repo)
            .await?
            .unwrap_or_else(|| FALLBACK_BRANCH.to_string()))
    }
}

#[async_trait]
impl GitProvider for GitHubAdapter {
    fn platform(&self) -> &'static str {
        "github"
    }

    async fn check_repository_exists(&self, owner: &str, repo: &str) -> Result<bool, GitError> {
        let url = format!("{}/repos/{owner}/{repo}", self.api_base);
        let response = send(PROVIDER, self.get(&url)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(false),
            status if status.is_success() => Ok(true),
            _ => Err(status_error(PROVIDER, response).await),
        }
    }

    async fn get_default_branch(
        &self,
        owner: &str,
        repo: &str,
    ) -> Result<Option<String>, GitError> {
        let url = format!("{}/repos/{owner}/{repo}", self.api_base);
        let response = send(PROVIDER, self.get(&url)).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let info: RepoInfo = parse_json(PROVIDER, response).await?;
                Ok(info.default_branch)
            }
            _ => Err(status_error(PROVIDER, response).await),
        }
    }

    async fn get_file_tree(&self, owner: &str, repo: &str) -> Result<String, GitError> {
        let branch = self.resolved_branch(owner, repo).await?;
        let url = format!("{}/repos/{owner}/{repo}/git/trees/{branch}", self.api_base);
        let response = send(PROVIDER, self.get(&url).query(&[("recursive", "1")])).await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND || status == StatusCode::CONFLICT {
            return join_paths(Vec::new());
        }
        if !status.is_success() {
            return Err(status_error(PROVIDER, response).await);
        }

        let tree: TreeResponse = parse_json(PROVIDER, response).await?;
        if tree.truncated {
            warn!(owner, repo, "GitHub truncated the recursive tree listing");
        }
        let paths = tree
            .tree
            .into_iter()
            .filter(|entry| entry.kind == "blob" && should_include_file(&entry.path))
            .map(|entry| entry.path)
            .collect();
        join_paths(paths)
    }

    async fn get_readme(&self, owner: &str, repo: &str) -> Result<String, GitError> {
        if !self.check_repository_exists(owner, repo).await? {
            return Err(GitError::NotFound("Repository does not exist.".to_string()));
        }
        let branch = self.resolved_branch(owner, repo).await?;

        for filename in README_CANDIDATES {
            let url = format!("{}/repos/{owner}/{repo}/contents/{filename}", self.api_base);
            let response = send(PROVIDER, self.get(&url).query(&[("ref", branch.as_str())])).await?;
            match response.status() {
                StatusCode::NOT_FOUND => continue,
                status if status.is_success() => {
                    let file: FileContent = parse_json(PROVIDER, response).await?;
                    return decode_content(PROVIDER, file);
                }
                _ => return Err(status_error(PROVIDER, response).await),
            }
        }

        Err(GitError::NotFound(
            "No README found for the specified repository.".to_string(),
        ))
    }

    fn get_file_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String {
        format!("{}/{owner}/{repo}/blob/{branch}/{path}", self.web_base)
    }

    fn get_directory_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String {
        format!("{}/{owner}/{repo}/tree/{branch}/{path}", self.web_base)
    }
}
