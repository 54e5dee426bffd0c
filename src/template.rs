//! Prompt templates with named slots.
//!
//! A template is a fixed format string in which `{name}` marks a slot to be
//! substituted verbatim at render time. `{{` and `}}` escape literal braces.
//! Templates are parsed once; rendering is a single pass over the parsed
//! segments.

use crate::error::{Error, Result};

/// The default chat template.
///
/// Two slots: `context` receives the accumulated transcript, `question` the
/// current user input.
pub const DEFAULT_TEMPLATE: &str = "
Answer the question below.

Here is the conversation history {context}

Question: {question}

Answer:
";

/// A parsed segment of a template.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    /// Literal text, emitted as-is.
    Literal(String),

    /// A named slot, substituted at render time.
    Slot(String),
}

/// A prompt template with named slots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    source: String,
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parses a template string.
    ///
    /// # Errors
    ///
    /// Returns a template error for an unterminated slot, an empty slot
    /// name, or an unmatched closing brace.
    pub fn new(source: impl Into<String>) -> Result<Self> {
        let source = source.into();
        let segments = parse_segments(&source)?;
        Ok(Self { source, segments })
    }

    /// The original template text.
    pub fn source(&self) -> &str {
        &self.source
    }

    /// The slot names in order of first appearance.
    pub fn slots(&self) -> Vec<&str> {
        let mut slots: Vec<&str> = Vec::new();
        for segment in &self.segments {
            if let Segment::Slot(name) = segment
                && !slots.contains(&name.as_str())
            {
                slots.push(name);
            }
        }
        slots
    }

    /// Renders the template, substituting each slot with its named value.
    ///
    /// Values are substituted verbatim. Supplying values for slots the
    /// template does not use is allowed; a slot with no supplied value is an
    /// error.
    pub fn render(&self, values: &[(&str, &str)]) -> Result<String> {
        let mut rendered = String::with_capacity(self.source.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => rendered.push_str(text),
                Segment::Slot(name) => {
                    let value = values
                        .iter()
                        .find(|(slot, _)| slot == name)
                        .map(|(_, value)| *value)
                        .ok_or_else(|| {
                            Error::template("no value supplied for slot", Some(name.clone()))
                        })?;
                    rendered.push_str(value);
                }
            }
        }
        Ok(rendered)
    }
}

impl std::str::FromStr for PromptTemplate {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        PromptTemplate::new(s)
    }
}

fn parse_segments(source: &str) -> Result<Vec<Segment>> {
    let mut segments = Vec::new();
    let mut literal = String::new();
    let mut chars = source.chars().peekable();
    while let Some(c) = chars.next() {
        match c {
            '{' => {
                if chars.peek() == Some(&'{') {
                    chars.next();
                    literal.push('{');
                    continue;
                }
                let mut name = String::new();
                loop {
                    match chars.next() {
                        Some('}') => break,
                        Some(c) => name.push(c),
                        None => {
                            return Err(Error::template("unterminated slot", None));
                        }
                    }
                }
                if name.is_empty() {
                    return Err(Error::template("empty slot name", None));
                }
                if !literal.is_empty() {
                    segments.push(Segment::Literal(std::mem::take(&mut literal)));
                }
                segments.push(Segment::Slot(name));
            }
            '}' => {
                if chars.peek() == Some(&'}') {
                    chars.next();
                    literal.push('}');
                } else {
                    return Err(Error::template("unmatched closing brace", None));
                }
            }
            c => literal.push(c),
        }
    }
    if !literal.is_empty() {
        segments.push(Segment::Literal(literal));
    }
    Ok(segments)
}
