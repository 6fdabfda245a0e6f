//! Datasets and the examples they group.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::new_id;

/// One labeled case: an input and the output it is expected to produce.
///
/// Examples are immutable once created; build a new one to change anything.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Example<I, O> {
    input: I,
    expected_output: O,
    #[serde(default = "new_id")]
    id: String,
}

impl<I, O> Example<I, O> {
    /// Create an example with a generated id.
    pub fn new(input: I, expected_output: O) -> Self {
        Self::with_id(new_id(), input, expected_output)
    }

    /// Create an example with a caller-supplied id.
    pub fn with_id(id: impl Into<String>, input: I, expected_output: O) -> Self {
        Self {
            input,
            expected_output,
            id: id.into(),
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn input(&self) -> &I {
        &self.input
    }

    pub fn expected_output(&self) -> &O {
        &self.expected_output
    }
}

impl<I: fmt::Display, O: fmt::Display> fmt::Display for Example<I, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Example ID = {}", self.id)?;
        writeln!(f, "Input = {}", self.input)?;
        writeln!(f, "Expected output = \"{}\"", self.expected_output)
    }
}

/// A named group of examples.
///
/// Membership is tracked by the dataset repository, not stored here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dataset {
    #[serde(default = "new_id")]
    pub id: String,
    pub name: String,
}

impl Dataset {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: new_id(),
            name: name.into(),
        }
    }
}

impl fmt::Display for Dataset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Dataset ID = {}", self.id)?;
        writeln!(f, "Name = {}", self.name)
    }
}
