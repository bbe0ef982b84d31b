use foundation::LonLat;
use labs::StatePatch;
use serde::{Deserialize, Serialize};

/// Input to [`crate::Session::handle`], from the map, the panel or a script.
///
/// JSON form: `{"select": "distance"}`, `"deselect"`, `{"click": [lon, lat]}`,
/// `{"edit": {"radius_km": 500}}`, `"reset"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum InteractionEvent {
    Select(String),
    Deselect,
    Click(LonLat),
    Edit(StatePatch),
    Reset,
}

impl InteractionEvent {
    pub fn kind(&self) -> &'static str {
        match self {
            InteractionEvent::Select(_) => "select",
            InteractionEvent::Deselect => "deselect",
            InteractionEvent::Click(_) => "click",
            InteractionEvent::Edit(_) => "edit",
            InteractionEvent::Reset => "reset",
        }
    }
}
