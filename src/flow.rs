//! # Flow Module
//!
//! Declarative wizard definitions. A flow is an ordered list of fields plus
//! the ids of the summary and post templates. Labels, prompts and templates
//! are localization message ids, resolved at render time.
//!
//! Two flows are built in:
//!
//! - `signal`: date/time, two team names, odds, score, link and an image
//! - `redaction`: an image, blurred with the default mask, and a caption
//!
//! Custom flows can be loaded from a JSON file with [`FlowDefinition::from_json_file`].
//! Their message ids must exist in the embedded English resources, and the
//! summary and post templates may only reference the flow's field names.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;

use crate::errors::FlowError;
use crate::localization::get_localization_manager;
use crate::redaction::RedactionMask;
use crate::validation::Validator;

/// Kind of message a field expects
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldKind {
    Text,
    Image,
}

/// One piece of data collected by the wizard
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FieldDef {
    /// Key in the collected values and template argument name
    pub name: String,
    /// Message id of the short label shown in the edit chooser
    pub label: String,
    /// Message id of the question asked for this field
    pub prompt: String,
    pub kind: FieldKind,
    #[serde(default)]
    pub validator: Validator,
}

impl FieldDef {
    pub fn text(name: &str, label: &str, prompt: &str, validator: Validator) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            prompt: prompt.to_string(),
            kind: FieldKind::Text,
            validator,
        }
    }

    pub fn image(name: &str, label: &str, prompt: &str) -> Self {
        Self {
            name: name.to_string(),
            label: label.to_string(),
            prompt: prompt.to_string(),
            kind: FieldKind::Image,
            validator: Validator::FreeText,
        }
    }
}

/// Complete wizard configuration
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FlowDefinition {
    pub name: String,
    pub fields: Vec<FieldDef>,
    /// Message id of the confirmation summary template
    pub summary: String,
    /// Message id of the channel post template
    pub post: String,
    /// Blur applied to image answers before they are stored
    #[serde(default)]
    pub redaction: Option<RedactionMask>,
}

impl FlowDefinition {
    /// Structured-signal flow
    pub fn signal() -> Self {
        Self {
            name: "signal".to_string(),
            fields: vec![
                FieldDef::text(
                    "date_time",
                    "signal-date-time-label",
                    "signal-date-time-prompt",
                    Validator::DateTime,
                ),
                FieldDef::text(
                    "team_a",
                    "signal-team-a-label",
                    "signal-team-a-prompt",
                    Validator::FreeText,
                ),
                FieldDef::text(
                    "team_b",
                    "signal-team-b-label",
                    "signal-team-b-prompt",
                    Validator::FreeText,
                ),
                FieldDef::text("odds", "signal-odds-label", "signal-odds-prompt", Validator::Odds),
                FieldDef::text(
                    "score",
                    "signal-score-label",
                    "signal-score-prompt",
                    Validator::Score,
                ),
                FieldDef::text("link", "signal-link-label", "signal-link-prompt", Validator::Url),
                FieldDef::image("image", "signal-image-label", "signal-image-prompt"),
            ],
            summary: "signal-summary".to_string(),
            post: "signal-post".to_string(),
            redaction: None,
        }
    }

    /// Image-redaction flow
    pub fn redaction() -> Self {
        Self {
            name: "redaction".to_string(),
            fields: vec![
                FieldDef::image("image", "redaction-image-label", "redaction-image-prompt"),
                FieldDef::text(
                    "caption",
                    "redaction-caption-label",
                    "redaction-caption-prompt",
                    Validator::FreeText,
                ),
            ],
            summary: "redaction-summary".to_string(),
            post: "redaction-post".to_string(),
            redaction: Some(RedactionMask::default()),
        }
    }

    /// Look up a built-in flow by name
    pub fn builtin(name: &str) -> Result<Self, FlowError> {
        match name {
            "signal" => Ok(Self::signal()),
            "redaction" => Ok(Self::redaction()),
            other => Err(FlowError::UnknownFlow(other.to_string())),
        }
    }

    /// Parse and check a flow from JSON text
    pub fn from_json(json: &str) -> Result<Self, FlowError> {
        let flow: FlowDefinition = serde_json::from_str(json)?;
        flow.check()?;
        Ok(flow)
    }

    /// Load a flow definition from a JSON file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, FlowError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(&content)
    }

    /// Reject flows the engine cannot run
    pub fn check(&self) -> Result<(), FlowError> {
        if self.fields.is_empty() {
            return Err(FlowError::Empty);
        }

        let mut seen = HashSet::new();
        for field in &self.fields {
            if !seen.insert(field.name.as_str()) {
                return Err(FlowError::DuplicateField(field.name.clone()));
            }
            if field.kind == FieldKind::Image && field.validator != Validator::FreeText {
                return Err(FlowError::ImageValidator(field.name.clone()));
            }
        }

        let manager = get_localization_manager();
        let resolve = |id: &str, args: &[&str]| {
            manager
                .verify_message(id, args)
                .map_err(|reason| FlowError::UnresolvedMessage {
                    id: id.to_string(),
                    reason,
                })
        };
        for field in &self.fields {
            resolve(&field.label, &[])?;
            resolve(&field.prompt, &[])?;
        }
        let names: Vec<&str> = self.fields.iter().map(|f| f.name.as_str()).collect();
        resolve(&self.summary, &names)?;
        resolve(&self.post, &names)?;

        Ok(())
    }

    pub fn field_count(&self) -> usize {
        self.fields.len()
    }

    pub fn field(&self, index: usize) -> Option<&FieldDef> {
        self.fields.get(index)
    }

    /// First image field, whose value is attached to summaries and posts
    pub fn image_field(&self) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.kind == FieldKind::Image)
    }
}
