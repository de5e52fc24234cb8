//! Message template — turns a race record into the multi-line alert body.
//!
//! A template is an ordered list of display blocks, each showing either a
//! single field or a composite of fields, prefixed with an icon and an
//! optional label. A built-in default is used unless an external JSON file
//! (`{"format_template": [...]}`) is supplied.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PuntBotError, Result};
use crate::types::RaceRecord;

/// One display line of the alert.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemplateBlock {
    #[serde(default)]
    pub emoji: String,
    #[serde(default)]
    pub label: String,
    /// Single-field block.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field: Option<String>,
    /// Composite block — field values joined with spaces.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub format_template: Vec<TemplateBlock>,
}

impl Default for MessageTemplate {
    fn default() -> Self {
        Self {
            format_template: vec![
                TemplateBlock {
                    emoji: "🏇".into(),
                    label: String::new(),
                    field: Some("horse_name".into()),
                    fields: None,
                },
                TemplateBlock {
                    emoji: "📍".into(),
                    label: "Track".into(),
                    field: None,
                    fields: Some(vec!["track".into(), "race".into(), "number".into()]),
                },
                TemplateBlock {
                    emoji: "🕐".into(),
                    label: "Race Time".into(),
                    field: Some("race_time".into()),
                    fields: None,
                },
                TemplateBlock {
                    emoji: "💰".into(),
                    label: "Units".into(),
                    field: Some("units".into()),
                    fields: None,
                },
            ],
        }
    }
}

impl MessageTemplate {
    /// Load a template from a JSON file.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            PuntBotError::Template(format!("failed to read {}: {e}", path.display()))
        })?;
        serde_json::from_str(&content)
            .map_err(|e| PuntBotError::Template(format!("failed to parse {}: {e}", path.display())))
    }

    /// Load from a path if given, otherwise the built-in default.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(p) => Self::load(p),
            None => Ok(Self::default()),
        }
    }

    /// Render the alert body for one record, one block per line. Blocks with
    /// neither `field` nor `fields` are skipped.
    pub fn render(&self, record: &RaceRecord) -> String {
        let mut lines = Vec::with_capacity(self.format_template.len());
        for block in &self.format_template {
            let value = if let Some(field) = &block.field {
                field_value(record, field)
            } else if let Some(fields) = &block.fields {
                let parts: Vec<String> =
                    fields.iter().map(|f| field_value(record, f)).collect();
                parts.join(" ")
            } else {
                continue;
            };

            let value = if block.label.is_empty() {
                value
            } else {
                format!("{}: {value}", block.label)
            };
            lines.push(format!("{} {value}", block.emoji));
        }
        lines.join("\n")
    }
}

/// Resolve a template field name against a record, applying the display
/// formatting the alert uses: units as `2.0u`, race as `R7`, number as `#4`.
fn field_value(record: &RaceRecord, field: &str) -> String {
    match field {
        "horse_name" => record.selection_name.clone(),
        "track" => record.track.clone(),
        "race" => format!("R{}", record.race),
        "number" => format!("#{}", record.selection),
        "race_time" => record.race_time.clone(),
        "units" => format!("{:.1}u", record.units),
        other => {
            tracing::debug!("Unknown template field '{other}'");
            String::new()
        }
    }
}
