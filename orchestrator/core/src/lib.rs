// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Quill Core
//!
//! Multi-provider AI content generation for the CMS.
//!
//! # Architecture
//!
//! - **Layer:** Core System
//! - **Purpose:** Capability contract, provider adapters, orchestrator and
//!   blog post pipeline

pub mod domain;
pub mod application;
pub mod infrastructure;

pub use application::{ContentOrchestrator, OrchestratorError};
pub use domain::llm::{Capability, ProviderId};
