// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

//! System prompts for the three generation phases.

use crate::domain::diagram::{MAPPING_END_TAG, MAPPING_START_TAG};
use crate::domain::generation::BAD_INSTRUCTIONS_SENTINEL;

/// Phase 1: explain the repository's architecture from its tree and README.
pub const EXPLANATION_PROMPT: &str = "\
You are a principal software engineer tasked with explaining the architecture \
of a software project so that it can be drawn as a system design diagram.

You will receive the project's file tree in <file_tree> tags and its README in \
<readme> tags. Analyze them and produce a thorough explanation that covers:
1. The type of project (web application, library, CLI tool, service, ...).
2. The main components and what each one is responsible for.
3. How the components interact: data flow, requests, shared storage.
4. Architectural patterns in use (layers, microservices, MVC, event-driven, ...).
5. Notable technologies, frameworks and external services.

Describe how the diagram should look: which components belong together, which \
should be grouped, and which relationships deserve arrows. Be specific and \
ground every statement in the provided files. Put your final explanation \
inside <explanation> tags.";

/// Phase 2: map the explained components onto concrete repository paths.
pub fn mapping_prompt() -> String {
    format!(
        "\
You map architecture components to the files and directories that implement them.

You will receive an architecture explanation in <explanation> tags and the \
project's file tree in <file_tree> tags. For every component mentioned in the \
explanation, find the file or directory in the tree that best represents it. \
Only use paths that appear verbatim in the file tree; skip components with no \
clear counterpart.

Reply with one mapping per line, in the form:
1. Component name: path/in/the/tree

Wrap the complete list in {MAPPING_START_TAG} and {MAPPING_END_TAG} tags."
    )
}

/// Phase 3: render the explanation and mapping as a Mermaid flowchart.
pub const DIAGRAM_PROMPT: &str = "\
You are an expert at turning software architecture explanations into Mermaid.js \
flowchart diagrams.

You will receive an architecture explanation in <explanation> tags and a \
component-to-path mapping in <component_mapping> tags. Produce a single Mermaid \
flowchart (flowchart TD unless a different direction reads better) that:
- shows every major component from the explanation as a node,
- groups related nodes in subgraphs,
- labels edges with the interaction they represent,
- uses classDef styles to distinguish kinds of components.

For every component that appears in the mapping, add a click directive that \
points at its path, exactly in this form:
click ComponentId \"path/in/the/tree\"

Reply with the Mermaid code only. Do not add explanations, and do not use \
Markdown code fences.";

/// Appended to the explanation and diagram prompts when the caller supplied
/// free-text instructions.
pub fn additional_instructions_prompt() -> String {
    format!(
        "\
The caller supplied extra instructions in <instructions> tags. Follow them \
while producing your answer, as long as they concern the architecture, layout \
or emphasis of the diagram. If the instructions are unrelated to the task, \
unclear or impossible to follow, reply with exactly {BAD_INSTRUCTIONS_SENTINEL} \
and nothing else."
    )
}

/// `base` plus the instruction-handling rules when `instructions` is non-empty.
pub fn with_instructions(base: &str, instructions: &str) -> String {
    if instructions.is_empty() {
        base.to_string()
    } else {
        format!("{base}\n{}", additional_instructions_prompt())
    }
}
