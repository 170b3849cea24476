//! Instruction sets sent by the automation pipeline.
//!
//! An instruction set is an ordered list of `{ name, type, content }`
//! records. The `name` tag decides how `content` is read, so instructions are
//! modelled as a variant per recognized tag. Only `typography` is acted on;
//! every other tag decodes to [`Instruction::Unrecognized`] and is ignored.
//!
//! Decoding is deliberately two-level. The top-level structure (`frame`,
//! `textNodes`) must be present or the whole batch is rejected with an
//! [`InstructionError`]. Individual text nodes and logos are decoded one by
//! one so a malformed entry only costs that entry.

use crate::error::{InstructionError, ItemError};
use crate::model::{Dimensions, Placement, Rgb};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Tag of the only instruction the interpreter acts on.
pub const TYPOGRAPHY: &str = "typography";

// ─── Instruction envelope ────────────────────────────────────────────────

/// Wire shape of a single instruction.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct RawInstruction {
    #[serde(default)]
    name: String,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    encoding: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content: Option<Value>,
}

/// One tagged unit of an instruction set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawInstruction", into = "RawInstruction")]
pub enum Instruction {
    /// Text and logo placement inside one design container.
    Typography {
        encoding: Option<String>,
        content: Option<Value>,
    },
    /// Any other tag. Kept so the set round-trips, never interpreted.
    Unrecognized {
        name: String,
        encoding: Option<String>,
        content: Option<Value>,
    },
}

impl From<RawInstruction> for Instruction {
    fn from(raw: RawInstruction) -> Self {
        // JSON `null` content counts as absent.
        let content = raw.content.filter(|c| !c.is_null());
        if raw.name == TYPOGRAPHY {
            Instruction::Typography {
                encoding: raw.encoding,
                content,
            }
        } else {
            Instruction::Unrecognized {
                name: raw.name,
                encoding: raw.encoding,
                content,
            }
        }
    }
}

impl From<Instruction> for RawInstruction {
    fn from(instruction: Instruction) -> Self {
        match instruction {
            Instruction::Typography { encoding, content } => RawInstruction {
                name: TYPOGRAPHY.to_string(),
                encoding,
                content,
            },
            Instruction::Unrecognized {
                name,
                encoding,
                content,
            } => RawInstruction {
                name,
                encoding,
                content,
            },
        }
    }
}

impl Instruction {
    pub fn name(&self) -> &str {
        match self {
            Instruction::Typography { .. } => TYPOGRAPHY,
            Instruction::Unrecognized { name, .. } => name,
        }
    }
}

/// First-match-wins lookup of the typography instruction.
///
/// Later typography instructions in the same set are never consulted.
pub fn select_typography(instructions: &[Instruction]) -> Option<&Instruction> {
    instructions
        .iter()
        .find(|i| matches!(i, Instruction::Typography { .. }))
}

// ─── Typography content ──────────────────────────────────────────────────

/// Description of the design container. Every field is optional on the wire;
/// invalid sizes are handled by the renderer's resize fallback.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct FrameStyle {
    pub name: Option<String>,
    pub width: Option<f32>,
    pub height: Option<f32>,
}

impl FrameStyle {
    fn from_object(frame: &serde_json::Map<String, Value>) -> Self {
        let number = |key: &str| frame.get(key).and_then(Value::as_f64).map(|v| v as f32);
        Self {
            name: frame
                .get("name")
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            width: number("width"),
            height: number("height"),
        }
    }
}

/// Font and paint metadata of one text node.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TextStyle {
    pub font_family: Option<String>,
    pub font_size: Option<f32>,
    pub font_weight: Option<f32>,
    pub font_style: Option<String>,
    pub color: Option<Rgb>,
}

/// One text node to render inside the container.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextNodeInstruction {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub characters: String,
    #[serde(default)]
    pub style: TextStyle,
    pub placement: Placement,
}

/// One component instance (logo) to place inside the container.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct LogoInstruction {
    pub name: String,
    pub component_key: Option<String>,
    pub dimensions: Option<Dimensions>,
    pub placement: Option<Placement>,
    /// Accepted for compatibility; layout does not use it.
    pub alignment: Option<String>,
}

impl LogoInstruction {
    /// The component key, treating an empty string as missing.
    pub fn key(&self) -> Option<&str> {
        self.component_key.as_deref().filter(|k| !k.is_empty())
    }
}

/// Validated payload of the typography instruction.
#[derive(Debug, Clone, PartialEq)]
pub struct TypographyContent {
    pub frame: FrameStyle,
    pub text_nodes: Vec<Result<TextNodeInstruction, ItemError>>,
    pub logos: Vec<Result<LogoInstruction, ItemError>>,
}

impl TypographyContent {
    /// Validate the top-level structure and decode each entry independently.
    pub fn from_value(content: &Value) -> Result<Self, InstructionError> {
        let frame = content
            .get("frame")
            .and_then(Value::as_object)
            .ok_or(InstructionError::MissingFrame)?;
        let text_nodes = content
            .get("textNodes")
            .and_then(Value::as_array)
            .ok_or(InstructionError::MissingTextNodes)?;
        let logos = content
            .get("logos")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        Ok(Self {
            frame: FrameStyle::from_object(frame),
            text_nodes: decode_items("text node", text_nodes),
            logos: decode_items("logo", logos),
        })
    }

    /// Select the typography instruction from a set and validate it.
    pub fn from_instructions(instructions: &[Instruction]) -> Result<Self, InstructionError> {
        match select_typography(instructions) {
            None => Err(InstructionError::MissingTypography),
            Some(Instruction::Typography {
                content: Some(content),
                ..
            }) => Self::from_value(content),
            Some(_) => Err(InstructionError::MissingContent),
        }
    }
}

fn decode_items<T: DeserializeOwned>(
    kind: &'static str,
    values: &[Value],
) -> Vec<Result<T, ItemError>> {
    values
        .iter()
        .enumerate()
        .map(|(index, value)| {
            T::deserialize(value).map_err(|e| ItemError {
                kind,
                index,
                reason: e.to_string(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn parse(v: Value) -> Vec<Instruction> {
        serde_json::from_value(v).unwrap()
    }

    #[test]
    fn tags_decode_to_variants() {
        let set = parse(json!([
            { "name": "palette", "type": "json", "content": { "primary": "#fff" } },
            { "name": "typography", "type": "json", "content": { "frame": {} } },
        ]));
        assert_eq!(set[0].name(), "palette");
        assert!(matches!(set[0], Instruction::Unrecognized { .. }));
        assert!(matches!(set[1], Instruction::Typography { .. }));
    }

    #[test]
    fn first_typography_wins() {
        let set = parse(json!([
            { "name": "typography", "content": { "frame": { "name": "first" }, "textNodes": [] } },
            { "name": "typography", "content": { "frame": { "name": "second" }, "textNodes": [] } },
        ]));
        let content = TypographyContent::from_instructions(&set).unwrap();
        assert_eq!(content.frame.name.as_deref(), Some("first"));
    }

    #[test]
    fn structural_failures() {
        let none = parse(json!([{ "name": "colors", "content": {} }]));
        assert_eq!(
            TypographyContent::from_instructions(&none),
            Err(InstructionError::MissingTypography)
        );

        let null_content = parse(json!([{ "name": "typography", "content": null }]));
        assert_eq!(
            TypographyContent::from_instructions(&null_content),
            Err(InstructionError::MissingContent)
        );

        let no_frame = parse(json!([{ "name": "typography", "content": { "textNodes": [] } }]));
        assert_eq!(
            TypographyContent::from_instructions(&no_frame),
            Err(InstructionError::MissingFrame)
        );

        let bad_nodes = parse(json!([
            { "name": "typography", "content": { "frame": {}, "textNodes": {} } }
        ]));
        assert_eq!(
            TypographyContent::from_instructions(&bad_nodes),
            Err(InstructionError::MissingTextNodes)
        );
    }

    #[test]
    fn malformed_entries_are_isolated() {
        let content = TypographyContent::from_value(&json!({
            "frame": { "name": "Design Container", "width": 1080, "height": 1920 },
            "textNodes": [
                { "name": "ok", "characters": "Hi", "style": { "fontFamily": "Inter", "fontSize": 24 }, "placement": { "x": 1, "y": 2 } },
                { "name": "no placement", "characters": "Oops" },
            ],
            "logos": [
                { "name": "brand", "componentKey": "abc" },
                "not an object",
            ]
        }))
        .unwrap();

        assert_eq!(content.frame.width, Some(1080.0));
        assert!(content.text_nodes[0].is_ok());
        let err = content.text_nodes[1].as_ref().unwrap_err();
        assert_eq!(err.index, 1);
        assert_eq!(err.kind, "text node");
        assert_eq!(content.logos[0].as_ref().unwrap().key(), Some("abc"));
        assert!(content.logos[1].is_err());
    }

    #[test]
    fn frame_fields_are_lenient() {
        let content = TypographyContent::from_value(&json!({
            "frame": { "name": "", "width": "wide" },
            "textNodes": []
        }))
        .unwrap();
        assert_eq!(content.frame, FrameStyle::default());
        assert!(content.logos.is_empty());
    }

    #[test]
    fn empty_component_key_counts_as_missing() {
        let logo = LogoInstruction {
            component_key: Some(String::new()),
            ..Default::default()
        };
        assert_eq!(logo.key(), None);
    }
}
