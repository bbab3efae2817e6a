// Copyright (c) 2026 Repograph Contributors
// SPDX-License-Identifier: AGPL-3.0
//! # Presentation Layer (`repograph-core`)
//!
//! HTTP surface that translates external requests into application service
//! calls. All real work is delegated to `crate::application`.
//!
//! | Module | Transport | Description |
//! |--------|-----------|-------------|
//! | [`api`] | HTTP/SSE (Axum) | Cost estimate, generation event stream, platform catalog |

pub mod api;
