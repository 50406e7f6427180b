// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0
//! Domain
//!
//! # Architecture
//!
//! - **Layer:** Domain Layer
//! - **Purpose:** Capability contract, content value types, provider
//!   availability and the configuration manifest

pub mod llm;
pub mod content;
pub mod availability;
pub mod config;
