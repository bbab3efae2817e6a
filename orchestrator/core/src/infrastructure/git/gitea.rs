// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Gitea Provider Adapter
//
// Anti-Corruption Layer for the Gitea v1 REST API (gitea.com or a
// self-hosted instance). Recursive tree listings are paged while the
// response reports `truncated`.

use super::{decode_content, http_client, join_paths, parse_json, send, status_error, FileContent};
use crate::domain::git::{
    should_include_file, web_base_from_api, GitError, GitProvider, FALLBACK_BRANCH,
    README_CANDIDATES,
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

const PROVIDER: &str = "Gitea";
const PAGE_SIZE: u32 = 1000;

pub struct GiteaAdapter {
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
struct TreePage {
    #[serde(default)]
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

impl GiteaAdapter {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let web_base = web_base_from_api(&api_base);
        if token.is_none() {
            debug!("No Gitea token provided; using unauthenticated requests");
        }
        Self {
            client: http_client(),
            api_base,
            web_base,
            token,
        }
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url).header("Accept", "application/json");
        match &self.token {
            Some(token) => request.header("Authorization", format!("token {token}")),
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
impl GitProvider for GiteaAdapter {
    fn platform(&self) -> &'static str {
        "gitea"
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
                Ok(info.default_branch.filter(|b| !b.is_empty()))
            }
            _ => Err(status_error(PROVIDER, response).await),
        }
    }

    async fn get_file_tree(&self, owner: &str, repo: &str) -> Result<String, GitError> {
        let branch = self.resolved_branch(owner, repo).await?;
        let url = format!("{}/repos/{owner}/{repo}/git/trees/{branch}", self.api_base);

        let mut paths = Vec::new();
        let mut page: u32 = 1;
        loop {
            let request = self.get(&url).query(&[
                ("recursive", "true".to_string()),
                ("page", page.to_string()),
                ("per_page", PAGE_SIZE.to_string()),
            ]);
            let response = send(PROVIDER, request).await?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                break;
            }
            if !status.is_success() {
                return Err(status_error(PROVIDER, response).await);
            }

            let listing: TreePage = parse_json(PROVIDER, response).await?;
            let exhausted = listing.tree.is_empty();
            paths.extend(
                listing
                    .tree
                    .into_iter()
                    .filter(|entry| entry.kind == "blob" && should_include_file(&entry.path))
                    .map(|entry| entry.path),
            );

            if !listing.truncated || exhausted {
                break;
            }
            page += 1;
        }

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
        format!("{}/{owner}/{repo}/src/branch/{branch}/{path}", self.web_base)
    }

    fn get_directory_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String {
        format!("{}/{owner}/{repo}/src/branch/{branch}/{path}", self.web_base)
    }
}
