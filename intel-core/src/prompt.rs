//! Fixed prompt templates that remember where each inserted value landed.
//!
//! A [`PromptTemplate`] is a `const` list of [`Segment`]s. Rendering it yields
//! a [`RichPrompt`]: the final text plus, for every range slot, the byte
//! ranges the inserted value occupies. Downstream tasks use those ranges to
//! map explanation scores back to the instruction or the input.

use std::collections::BTreeMap;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::client::Prompt;

/// A named value a template can refer to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Slot {
    Instruction,
    Input,
    ResponsePrefix,
}

impl Slot {
    /// Name under which the slot's ranges are recorded.
    pub fn name(self) -> &'static str {
        match self {
            Slot::Instruction => "instruction",
            Slot::Input => "input",
            Slot::ResponsePrefix => "response_prefix",
        }
    }
}

/// One piece of a template.
#[derive(Debug, Clone, Copy)]
pub enum Segment {
    /// Literal text.
    Text(&'static str),
    /// The slot's value, with its byte range recorded.
    Range(Slot),
    /// The slot's value without a recorded range; renders nothing when absent.
    Value(Slot),
    /// Nested segments rendered only when the slot has a value.
    IfPresent(Slot, &'static [Segment]),
}

/// Values substituted into an instruct template.
#[derive(Debug, Clone, Copy, Default)]
pub struct InstructValues<'a> {
    pub instruction: &'a str,
    pub input: Option<&'a str>,
    pub response_prefix: Option<&'a str>,
}

impl<'a> InstructValues<'a> {
    fn get(&self, slot: Slot) -> Option<&'a str> {
        match slot {
            Slot::Instruction => Some(self.instruction),
            Slot::Input => self.input,
            Slot::ResponsePrefix => self.response_prefix,
        }
    }
}

/// A prompt template made of a fixed sequence of segments.
#[derive(Debug, Clone, Copy)]
pub struct PromptTemplate {
    segments: &'static [Segment],
}

impl PromptTemplate {
    pub const fn new(segments: &'static [Segment]) -> Self {
        Self { segments }
    }

    /// Render the template with the given values.
    pub fn to_rich_prompt(&self, values: &InstructValues<'_>) -> RichPrompt {
        let mut prompt = RichPrompt::default();
        render(self.segments, values, &mut prompt);
        prompt
    }
}

fn render(segments: &[Segment], values: &InstructValues<'_>, prompt: &mut RichPrompt) {
    for segment in segments {
        match *segment {
            Segment::Text(text) => prompt.text.push_str(text),
            Segment::Range(slot) => {
                if let Some(value) = values.get(slot) {
                    let start = prompt.text.len();
                    prompt.text.push_str(value);
                    prompt
                        .ranges
                        .entry(slot.name().to_string())
                        .or_default()
                        .push(start..prompt.text.len());
                }
            }
            Segment::Value(slot) => {
                if let Some(value) = values.get(slot) {
                    prompt.text.push_str(value);
                }
            }
            Segment::IfPresent(slot, nested) => {
                if values.get(slot).is_some() {
                    render(nested, values, prompt);
                }
            }
        }
    }
}

/// Rendered prompt text with named byte ranges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RichPrompt {
    pub text: String,
    pub ranges: BTreeMap<String, Vec<Range<usize>>>,
}

impl RichPrompt {
    /// Byte ranges recorded for `name`; empty if none.
    pub fn ranges(&self, name: &str) -> &[Range<usize>] {
        self.ranges.get(name).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Text covered by each range recorded for `name`.
    pub fn range_texts(&self, name: &str) -> Vec<&str> {
        self.ranges(name)
            .iter()
            .filter_map(|range| self.text.get(range.clone()))
            .collect()
    }
}

impl From<RichPrompt> for Prompt {
    fn from(prompt: RichPrompt) -> Self {
        Prompt::from_text(prompt.text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const TEMPLATE: PromptTemplate = PromptTemplate::new(&[
        Segment::Text("Q: "),
        Segment::Range(Slot::Instruction),
        Segment::IfPresent(Slot::Input, &[Segment::Text(" ["), Segment::Range(Slot::Input), Segment::Text("]")]),
        Segment::Text("\nA:"),
        Segment::Value(Slot::ResponsePrefix),
    ]);

    #[test]
    fn renders_required_slots_and_records_ranges() {
        let prompt = TEMPLATE.to_rich_prompt(&InstructValues {
            instruction: "Why?",
            ..Default::default()
        });

        assert_eq!(prompt.text, "Q: Why?\nA:");
        assert_eq!(prompt.ranges("instruction"), &[3..7]);
        assert!(prompt.ranges("input").is_empty());
    }

    #[test]
    fn optional_block_renders_when_value_present() {
        let prompt = TEMPLATE.to_rich_prompt(&InstructValues {
            instruction: "Why?",
            input: Some("sky"),
            response_prefix: Some(" Because"),
        });

        assert_eq!(prompt.text, "Q: Why? [sky]\nA: Because");
        assert_eq!(prompt.range_texts("input"), vec!["sky"]);
        assert!(prompt.ranges("response_prefix").is_empty());
    }

    #[test]
    fn rich_prompt_converts_to_text_prompt() {
        let prompt = TEMPLATE.to_rich_prompt(&InstructValues {
            instruction: "Hi",
            ..Default::default()
        });

        let plain: Prompt = prompt.into();
        assert_eq!(plain.as_text(), "Q: Hi\nA:");
    }
}
