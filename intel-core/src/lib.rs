//! Model abstractions for intel.
//!
//! This crate provides:
//! - A [`Client`](client::Client) capability for the hosted model API, with an
//!   HTTP implementation and a concurrency-limiting wrapper
//! - [`Model`]: a named model exposing `complete`, `explain` and `tokenize`
//! - [`ControlModel`]: instruction-tuned families and their prompt formats
//! - [`Task`] and [`Tracer`] for composing and observing model calls
//!
//! # Architecture
//!
//! ```text
//! ┌───────────────────────────────────────────────────────┐
//! │                    ControlModel                       │
//! │  ┌───────────────┐  ┌───────────────┐  ┌───────────┐  │
//! │  │   Luminous    │  │    Llama2     │  │  Llama3   │  │
//! │  └───────────────┘  └───────────────┘  └───────────┘  │
//! └───────────────────────────────────────────────────────┘
//!                           │ Model (complete / explain)
//!                           ▼
//! ┌───────────────────────────────────────────────────────┐
//! │          LimitedConcurrencyClient<HttpClient>         │
//! │        (semaphore + retry on busy, shared Arc)        │
//! └───────────────────────────────────────────────────────┘
//! ```

mod error;
mod types;

pub mod auth;
pub mod client;
pub mod control;
pub mod model;
pub mod prompt;
pub mod task;
pub mod tracer;

pub use control::{ControlModel, Llama2InstructModel, Llama3InstructModel, LuminousControlModel};
pub use error::{Error, Result};
pub use model::{CompleteInput, CompleteOutput, ExplainInput, ExplainOutput, Model};
pub use prompt::{PromptTemplate, RichPrompt};
pub use task::Task;
pub use tracer::{InMemoryTracer, LogTracer, NoOpTracer, Tracer};
pub use types::ModelInfo;
