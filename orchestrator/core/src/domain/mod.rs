// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! Mod
//!
//! Provider capabilities, pipeline data model and pure diagram helpers.
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Types shared by the application, infrastructure and presentation layers

pub mod catalog;
pub mod config;
pub mod diagram;
pub mod events;
pub mod generation;
pub mod git;
pub mod llm;
pub mod repository;
