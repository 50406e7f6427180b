// Copyright (c) 2026 100monkeys.ai
// SPDX-License-Identifier: AGPL-3.0

pub mod orchestrator;
pub mod pipeline;

pub use orchestrator::{ContentOrchestrator, OrchestratorError, ProviderStatus};
pub use pipeline::{
    BlogPostOptions, PipelineError, PipelineResult, PipelineStage, StageOutcome, StageReport,
};
