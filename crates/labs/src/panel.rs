//! Declarative panel view-model. Panels describe state and attached
//! properties; they never compute geometry.

use std::fmt;

use foundation::LonLat;
use serde::{Deserialize, Serialize};

use crate::contract::LabMeta;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ControlKind {
    Number { value: f64, min: f64, step: f64 },
    Checkbox { checked: bool },
    Select { options: Vec<String>, selected: String },
}

/// An editable control. `field` is the state patch key it writes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelControl {
    pub field: String,
    pub label: String,
    #[serde(flatten)]
    pub kind: ControlKind,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "item", rename_all = "snake_case")]
pub enum PanelItem {
    Heading {
        text: String,
    },
    Text {
        text: String,
    },
    Coordinate {
        label: String,
        value: Option<LonLat>,
    },
    Measurement {
        label: String,
        value: Option<f64>,
        unit: String,
    },
    Classification {
        label: String,
        value: Option<String>,
    },
    Control(PanelControl),
    Placeholder {
        text: String,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PanelView {
    pub lab_id: String,
    pub title: String,
    pub description: String,
    pub items: Vec<PanelItem>,
}

impl PanelView {
    pub fn new(meta: &LabMeta) -> Self {
        Self {
            lab_id: meta.id.to_string(),
            title: meta.title.to_string(),
            description: meta.description.to_string(),
            items: Vec::new(),
        }
    }

    pub fn heading(mut self, text: impl Into<String>) -> Self {
        self.items.push(PanelItem::Heading { text: text.into() });
        self
    }

    pub fn text(mut self, text: impl Into<String>) -> Self {
        self.items.push(PanelItem::Text { text: text.into() });
        self
    }

    pub fn coordinate(mut self, label: impl Into<String>, value: Option<LonLat>) -> Self {
        self.items.push(PanelItem::Coordinate {
            label: label.into(),
            value,
        });
        self
    }

    pub fn measurement(
        mut self,
        label: impl Into<String>,
        value: Option<f64>,
        unit: impl Into<String>,
    ) -> Self {
        self.items.push(PanelItem::Measurement {
            label: label.into(),
            value,
            unit: unit.into(),
        });
        self
    }

    pub fn classification(mut self, label: impl Into<String>, value: Option<&str>) -> Self {
        self.items.push(PanelItem::Classification {
            label: label.into(),
            value: value.map(str::to_string),
        });
        self
    }

    pub fn number(mut self, field: &str, label: &str, value: f64, min: f64, step: f64) -> Self {
        self.items.push(PanelItem::Control(PanelControl {
            field: field.to_string(),
            label: label.to_string(),
            kind: ControlKind::Number { value, min, step },
        }));
        self
    }

    pub fn checkbox(mut self, field: &str, label: &str, checked: bool) -> Self {
        self.items.push(PanelItem::Control(PanelControl {
            field: field.to_string(),
            label: label.to_string(),
            kind: ControlKind::Checkbox { checked },
        }));
        self
    }

    pub fn select(mut self, field: &str, label: &str, options: &[&str], selected: &str) -> Self {
        self.items.push(PanelItem::Control(PanelControl {
            field: field.to_string(),
            label: label.to_string(),
            kind: ControlKind::Select {
                options: options.iter().map(|o| o.to_string()).collect(),
                selected: selected.to_string(),
            },
        }));
        self
    }

    pub fn placeholder(mut self, text: impl Into<String>) -> Self {
        self.items.push(PanelItem::Placeholder { text: text.into() });
        self
    }

    pub fn measurement_value(&self, label: &str) -> Option<f64> {
        self.items.iter().find_map(|item| match item {
            PanelItem::Measurement { label: l, value, .. } if l == label => *value,
            _ => None,
        })
    }

    pub fn has_placeholder(&self) -> bool {
        self.items
            .iter()
            .any(|item| matches!(item, PanelItem::Placeholder { .. }))
    }
}

/// Plain-text rendering for terminals.
impl fmt::Display for PanelView {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "== {} ({}) ==", self.title, self.lab_id)?;
        writeln!(f, "{}", self.description)?;
        for item in &self.items {
            match item {
                PanelItem::Heading { text } => writeln!(f, "\n# {text}")?,
                PanelItem::Text { text } => writeln!(f, "{text}")?,
                PanelItem::Coordinate { label, value } => match value {
                    Some(p) => writeln!(f, "{label}: {p}")?,
                    None => writeln!(f, "{label}: -")?,
                },
                PanelItem::Measurement { label, value, unit } => match value {
                    Some(v) => writeln!(f, "{label}: {v:.3} {unit}")?,
                    None => writeln!(f, "{label}: -")?,
                },
                PanelItem::Classification { label, value } => {
                    writeln!(f, "{label}: {}", value.as_deref().unwrap_or("-"))?
                }
                PanelItem::Control(c) => match &c.kind {
                    ControlKind::Number { value, .. } => {
                        writeln!(f, "[{}] {} = {value}", c.field, c.label)?
                    }
                    ControlKind::Checkbox { checked } => {
                        let mark = if *checked { "x" } else { " " };
                        writeln!(f, "[{}] [{mark}] {}", c.field, c.label)?
                    }
                    ControlKind::Select { options, selected } => {
                        writeln!(f, "[{}] {} = {selected} ({})", c.field, c.label, options.join("|"))?
                    }
                },
                PanelItem::Placeholder { text } => writeln!(f, "({text})")?,
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::PanelView;
    use crate::contract::{LabMeta, Viewport};
    use serde_json::json;

    const META: LabMeta = LabMeta {
        id: "demo",
        title: "Demo",
        description: "A demo lab.",
        viewport: Viewport::at(0.0, 0.0, 4.0),
    };

    #[test]
    fn serializes_tagged_items() {
        let view = PanelView::new(&META)
            .measurement("Distance", Some(1.5), "km")
            .checkbox("flag", "Flag", true);
        let value = serde_json::to_value(&view).unwrap();
        assert_eq!(
            value["items"][0],
            json!({"item": "measurement", "label": "Distance", "value": 1.5, "unit": "km"})
        );
        assert_eq!(
            value["items"][1],
            json!({"item": "control", "field": "flag", "label": "Flag", "kind": "checkbox", "checked": true})
        );
    }

    #[test]
    fn display_marks_missing_values() {
        let view = PanelView::new(&META)
            .coordinate("Point", None)
            .placeholder("Click on the map");
        let text = view.to_string();
        assert!(text.contains("Point: -"));
        assert!(text.contains("(Click on the map)"));
        assert!(view.has_placeholder());
    }
}
