// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

// Git Provider Infrastructure - Anti-Corruption Layer Implementations
//
// Each adapter translates one hosting API (pagination, auth headers,
// base64 transfer encoding) into the domain GitProvider contract.

pub mod factory;
pub mod gitea;
pub mod github;
pub mod gitlab;

pub use factory::DefaultGitProviderFactory;

use crate::domain::git::GitError;
use base64::Engine;
use serde::Deserialize;

const USER_AGENT: &str = concat!("repograph/", env!("CARGO_PKG_VERSION"));

const TREE_UNAVAILABLE: &str =
    "Could not fetch repository file tree. Repository might not exist, be empty or private.";

/// Contents-API payload shared by GitHub, GitLab and Gitea.
#[derive(Deserialize)]
struct FileContent {
    content: Option<String>,
    #[serde(default)]
    encoding: Option<String>,
}

fn http_client() -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .build()
        .unwrap_or_default()
}

async fn send(
    provider: &'static str,
    request: reqwest::RequestBuilder,
) -> Result<reqwest::Response, GitError> {
    request.send().await.map_err(|e| GitError::Network {
        provider,
        message: e.to_string(),
    })
}

async fn status_error(provider: &'static str, response: reqwest::Response) -> GitError {
    let status = response.status().as_u16();
    let body = response.text().await.unwrap_or_default();
    GitError::Status {
        provider,
        status,
        body,
    }
}

async fn parse_json<T: serde::de::DeserializeOwned>(
    provider: &'static str,
    response: reqwest::Response,
) -> Result<T, GitError> {
    response.json::<T>().await.map_err(|e| GitError::Malformed {
        provider,
        message: e.to_string(),
    })
}

/// Decode a contents-API payload. Base64 bodies may contain line breaks.
fn decode_content(provider: &'static str, file: FileContent) -> Result<String, GitError> {
    let content = file.content.ok_or_else(|| GitError::Malformed {
        provider,
        message: "file payload has no content".to_string(),
    })?;

    match file.encoding.as_deref() {
        Some("base64") | None => {
            let compact: String = content.chars().filter(|c| !c.is_whitespace()).collect();
            let bytes = base64::engine::general_purpose::STANDARD
                .decode(compact)
                .map_err(|e| GitError::Malformed {
                    provider,
                    message: format!("invalid base64 content: {e}"),
                })?;
            Ok(String::from_utf8_lossy(&bytes).into_owned())
        }
        Some(_) => Ok(content),
    }
}

fn join_paths(paths: Vec<String>) -> Result<String, GitError> {
    if paths.is_empty() {
        return Err(GitError::NotFound(TREE_UNAVAILABLE.to_string()));
    }
    Ok(paths.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_wrapped_base64() {
        let file = FileContent {
            content: Some("IyBIZWxs\nbyBXb3Js\nZA==\n".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert_eq!(decode_content("GitHub", file).unwrap(), "# Hello World");
    }

    #[test]
    fn rejects_invalid_base64() {
        let file = FileContent {
            content: Some("!!not base64!!".to_string()),
            encoding: Some("base64".to_string()),
        };
        assert!(matches!(
            decode_content("Gitea", file),
            Err(GitError::Malformed { .. })
        ));
    }

    #[test]
    fn empty_tree_is_not_found() {
        assert!(matches!(join_paths(vec![]), Err(GitError::NotFound(_))));
        assert_eq!(join_paths(vec!["a".into(), "b/c".into()]).unwrap(), "a\nb/c");
    }
}
