// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Repograph core
//!
//! Turns a Git repository into an architecture diagram by driving a
//! three-phase LLM conversation over its file tree and README.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Domain model, provider adapters, generation pipeline and HTTP surface

pub mod application;
pub mod domain;
pub mod infrastructure;
pub mod presentation;

pub use application::{DiagramGenerationService, GenerationSettings};
pub use domain::config::ServiceConfig;
pub use domain::events::PipelineEvent;
pub use domain::generation::{GenerationError, GenerationRequest};
