// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// GitLab Provider Adapter
//
// Anti-Corruption Layer for the GitLab v4 REST API. Projects are addressed
// by their URL-encoded "owner/repo" path; tree listings are paginated via
// the X-Next-Page response header.

use super::{decode_content, http_client, join_paths, parse_json, send, status_error, FileContent};
use crate::domain::git::{
    should_include_file, web_base_from_api, GitError, GitProvider, FALLBACK_BRANCH,
    README_CANDIDATES,
};
use async_trait::async_trait;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use reqwest::StatusCode;
use serde::Deserialize;
use tracing::debug;

const PROVIDER: &str = "GitLab";
const PAGE_SIZE: &str = "100";

/// Everything except unreserved characters, so `/` becomes `%2F`.
const PATH_SEGMENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'~');

pub struct GitLabAdapter {
    client: reqwest::Client,
    api_base: String,
    web_base: String,
    token: Option<String>,
}

#[derive(Deserialize)]
struct ProjectInfo {
    default_branch: Option<String>,
}

#[derive(Deserialize)]
struct TreeEntry {
    path: String,
    #[serde(rename = "type")]
    kind: String,
}

fn encode(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

impl GitLabAdapter {
    pub fn new(api_base: impl Into<String>, token: Option<String>) -> Self {
        let api_base = api_base.into().trim_end_matches('/').to_string();
        let web_base = web_base_from_api(&api_base);
        if token.is_none() {
            debug!("No GitLab token provided; using unauthenticated requests");
        }
        Self {
            client: http_client(),
            api_base,
            web_base,
            token,
        }
    }

    fn project_url(&self, owner: &str, repo: &str) -> String {
        format!("{}/projects/{}", self.api_base, encode(&format!("{owner}/{repo}")))
    }

    fn get(&self, url: &str) -> reqwest::RequestBuilder {
        let request = self.client.get(url);
        match &self.token {
            Some(token) => request.header("PRIVATE-TOKEN", token),
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
impl GitProvider for GitLabAdapter {
    fn platform(&self) -> &'static str {
        "gitlab"
    }

    async fn check_repository_exists(&self, owner: &str, repo: &str) -> Result<bool, GitError> {
        let response = send(PROVIDER, self.get(&self.project_url(owner, repo))).await?;
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
        let response = send(PROVIDER, self.get(&self.project_url(owner, repo))).await?;
        match response.status() {
            StatusCode::NOT_FOUND => Ok(None),
            status if status.is_success() => {
                let info: ProjectInfo = parse_json(PROVIDER, response).await?;
                Ok(info.default_branch)
            }
            _ => Err(status_error(PROVIDER, response).await),
        }
    }

    async fn get_file_tree(&self, owner: &str, repo: &str) -> Result<String, GitError> {
        let branch = self.resolved_branch(owner, repo).await?;
        let url = format!("{}/repository/tree", self.project_url(owner, repo));

        let mut paths = Vec::new();
        let mut page = "1".to_string();
        loop {
            let request = self.get(&url).query(&[
                ("recursive", "true"),
                ("ref", branch.as_str()),
                ("per_page", PAGE_SIZE),
                ("page", page.as_str()),
            ]);
            let response = send(PROVIDER, request).await?;

            let status = response.status();
            if status == StatusCode::NOT_FOUND {
                break;
            }
            if !status.is_success() {
                return Err(status_error(PROVIDER, response).await);
            }

            let next_page = response
                .headers()
                .get("x-next-page")
                .and_then(|v| v.to_str().ok())
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string);

            let entries: Vec<TreeEntry> = parse_json(PROVIDER, response).await?;
            paths.extend(
                entries
                    .into_iter()
                    .filter(|entry| entry.kind == "blob" && should_include_file(&entry.path))
                    .map(|entry| entry.path),
            );

            match next_page {
                Some(next) => page = next,
                None => break,
            }
        }

        join_paths(paths)
    }

    async fn get_readme(&self, owner: &str, repo: &str) -> Result<String, GitError> {
        if !self.check_repository_exists(owner, repo).await? {
            return Err(GitError::NotFound("Repository does not exist.".to_string()));
        }
        let branch = self.resolved_branch(owner, repo).await?;

        for filename in README_CANDIDATES {
            let url = format!(
                "{}/repository/files/{}",
                self.project_url(owner, repo),
                encode(filename)
            );
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
        format!("{}/{owner}/{repo}/-/blob/{branch}/{path}", self.web_base)
    }

    fn get_directory_url(&self, owner: &str, repo: &str, path: &str, branch: &str) -> String {
        format!("{}/{owner}/{repo}/-/tree/{branch}/{path}", self.web_base)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};

    #[test]
    fn encodes_project_path() {
        assert_eq!(encode("group/sub-project.rs"), "group%2Fsub-project.rs");
    }

    #[test]
    fn urls_use_dash_separator() {
        let adapter = GitLabAdapter::new("https://gitlab.com/api/v4", None);
        assert_eq!(
            adapter.get_file_url("acme", "tools", "cmd/main.go", "main"),
            "https://gitlab.com/acme/tools/-/blob/main/cmd/main.go"
        );
        assert_eq!(
            adapter.get_directory_url("acme", "tools", "cmd", "main"),
            "https://gitlab.com/acme/tools/-/tree/main/cmd"
        );
    }

    #[tokio::test]
    async fn drains_paginated_tree() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/projects/acme%2Ftools")
            .match_header("private-token", "glpat-test")
            .with_status(200)
            .with_body(r#"{"default_branch":"trunk"}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/projects/acme%2Ftools/repository/tree")
            .match_query(Matcher::AllOf(vec![
                Matcher::UrlEncoded("ref".into(), "trunk".into()),
                Matcher::UrlEncoded("page".into(), "1".into()),
            ]))
            .with_status(200)
            .with_header("x-next-page", "2")
            .with_body(
                r#"[{"path":"cmd","type":"tree"},{"path":"cmd/main.go","type":"blob"}]"#,
            )
            .create_async()
            .await;
        server
            .mock("GET", "/projects/acme%2Ftools/repository/tree")
            .match_query(Matcher::UrlEncoded("page".into(), "2".into()))
            .with_status(200)
            .with_header("x-next-page", "")
            .with_body(r#"[{"path":"go.mod","type":"blob"},{"path":"logo.png","type":"blob"}]"#)
            .create_async()
            .await;

        let adapter = GitLabAdapter::new(server.url(), Some("glpat-test".into()));
        let tree = adapter.get_file_tree("acme", "tools").await.unwrap();

        assert_eq!(tree, "cmd/main.go\ngo.mod");
    }

    #[tokio::test]
    async fn reads_base64_readme() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/projects/acme%2Ftools")
            .with_status(200)
            .with_body(r#"{"default_branch":"main"}"#)
            .expect_at_least(1)
            .create_async()
            .await;
        server
            .mock("GET", "/projects/acme%2Ftools/repository/files/README.md")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(200)
            .with_body(r#"{"file_name":"README.md","content":"IyBUb29scw==","encoding":"base64"}"#)
            .create_async()
            .await;

        let adapter = GitLabAdapter::new(server.url(), None);
        assert_eq!(adapter.get_readme("acme", "tools").await.unwrap(), "# Tools");
    }

    #[tokio::test]
    async fn missing_default_branch_falls_back_to_main() {
        let mut server = Server::new_async().await;
        server
            .mock("GET", "/projects/acme%2Fempty")
            .with_status(200)
            .with_body(r#"{"default_branch":null}"#)
            .create_async()
            .await;
        server
            .mock("GET", "/projects/acme%2Fempty/repository/tree")
            .match_query(Matcher::UrlEncoded("ref".into(), "main".into()))
            .with_status(404)
            .create_async()
            .await;

        let adapter = GitLabAdapter::new(server.url(), None);
        let err = adapter.get_file_tree("acme", "empty").await.unwrap_err();
        assert!(matches!(err, GitError::NotFound(_)));
    }
}
