// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0

use serde::{Deserialize, Serialize};

/// Progress and result events of one pipeline run, in emission order.
///
/// Serialized with a `status` tag so each event becomes one
/// `data: <JSON>` frame on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PipelineEvent {
    Started {
        message: String,
    },
    ExplanationSent {
        message: String,
    },
    Explanation {
        message: String,
    },
    ExplanationChunk {
        chunk: String,
    },
    MappingSent {
        message: String,
    },
    Mapping {
        message: String,
    },
    MappingChunk {
        chunk: String,
    },
    DiagramSent {
        message: String,
    },
    Diagram {
        message: String,
    },
    DiagramChunk {
        chunk: String,
    },
    Complete {
        diagram: String,
        explanation: String,
        mapping: String,
        ai_platform: String,
        ai_model: String,
    },
    Error {
        error: String,
    },
}

impl PipelineEvent {
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            error: message.into(),
        }
    }

    /// `complete` and `error` end the stream.
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Complete { .. } | Self::Error { .. })
    }

    pub fn status(&self) -> &'static str {
        match self {
            Self::Started { .. } => "started",
            Self::ExplanationSent { .. } => "explanation_sent",
            Self::Explanation { .. } => "explanation",
            Self::ExplanationChunk { .. } => "explanation_chunk",
            Self::MappingSent { .. } => "mapping_sent",
            Self::Mapping { .. } => "mapping",
            Self::MappingChunk { .. } => "mapping_chunk",
            Self::DiagramSent { .. } => "diagram_sent",
            Self::Diagram { .. } => "diagram",
            Self::DiagramChunk { .. } => "diagram_chunk",
            Self::Complete { .. } => "complete",
            Self::Error { .. } => "error",
        }
    }
}
