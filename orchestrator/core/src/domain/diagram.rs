// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Diagram text helpers.
//!
//! Pure functions over model output: component-mapping extraction,
//! code-fence stripping and `click` directive rewriting.

use crate::domain::git::GitProvider;
use regex::{Captures, Regex};
use std::sync::LazyLock;

pub const MAPPING_START_TAG: &str = "<component_mapping>";
pub const MAPPING_END_TAG: &str = "</component_mapping>";

/// `click <name> "<path>"`
static CLICK_DIRECTIVE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"click ([^\s"]+)\s+"([^"]+)""#).expect("click directive pattern is valid")
});

/// Text between the component-mapping markers. Empty when either marker is
/// missing or the end marker precedes the start marker.
pub fn extract_component_mapping(response: &str) -> String {
    let Some(start) = response.find(MAPPING_START_TAG) else {
        return String::new();
    };
    let body_start = start + MAPPING_START_TAG.len();
    match response[body_start..].find(MAPPING_END_TAG) {
        Some(len) => response[body_start..body_start + len].to_string(),
        None => String::new(),
    }
}

/// Remove Markdown code-fence markers around the diagram.
pub fn strip_code_fences(diagram: &str) -> String {
    diagram.replace("```mermaid", "").replace("```", "")
}

/// A path is treated as a file when its final segment contains a dot.
/// A trailing `/` leaves an empty final segment, so it names a directory.
pub fn is_file_path(path: &str) -> bool {
    path.rsplit('/')
        .next()
        .is_some_and(|segment| segment.contains('.'))
}

/// Rewrite every `click <name> "<path>"` directive so it carries the
/// provider's browsable URL instead of the bare repository path.
/// Text without directives is returned unchanged.
pub fn process_click_events(
    diagram: &str,
    owner: &str,
    repo: &str,
    branch: &str,
    provider: &dyn GitProvider,
) -> String {
    CLICK_DIRECTIVE
        .replace_all(diagram, |caps: &Captures<'_>| {
            let name = &caps[1];
            let path = caps[2].trim_matches(|c| c == '"' || c == '\'');
            let url = if is_file_path(path) {
                provider.get_file_url(owner, repo, path, branch)
            } else {
                provider.get_directory_url(owner, repo, path, branch)
            };
            format!("click {name} \"{url}\"")
        })
        .into_owned()
}
