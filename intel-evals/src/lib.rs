//! Datasets and evaluation results for intel.
//!
//! This crate provides the value objects an evaluation works with and the
//! repositories that persist them.
//!
//! # Architecture
//!
//! - **Datasets** ([`Dataset`], [`Example`]) group labeled inputs
//! - **Overviews** ([`EvaluationOverview`], [`PartialEvaluationOverview`]) summarize runs
//! - **Results** ([`ExampleEvaluation`]) record one outcome per evaluated example
//! - **Storage** ([`EvaluationRepository`], [`AsyncEvaluationRepository`],
//!   [`DatasetRepository`]) keeps all of the above, in memory or in Turso

mod dataset;
mod domain;
pub mod storage;
mod types;

// Dataset types
pub use dataset::{Dataset, Example};

// Run and result types
pub use domain::{
    EvaluationOverview, ExampleEvaluation, ExampleResult, FailedExampleEvaluation,
    PartialEvaluationOverview,
};

// ID helpers
pub use types::new_id;

// Storage traits and backends (re-export from storage module)
pub use storage::{
    AsyncEvaluationRepository, DatasetRepository, EvaluationRepository,
    InMemoryDatasetRepository, InMemoryEvaluationRepository, TursoEvaluationRepository,
};
