use formats::FeatureCollection;
use labs::{GeometryResult, PanelView};
use serde::Serialize;

/// What one recompute produced, addressed to the map and the panel.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Publication {
    pub sequence: u64,
    pub lab_id: &'static str,
    /// `None` while the lab is waiting for input.
    pub result: Option<GeometryResult>,
    pub panel: PanelView,
}

impl Publication {
    pub fn layers(&self) -> &[FeatureCollection] {
        self.result
            .as_ref()
            .map(GeometryResult::collections)
            .unwrap_or(&[])
    }

    /// Replaces whatever the surface showed before.
    pub fn deliver(&self, surface: &mut dyn Surface) {
        surface.render_layers(self.layers());
        surface.show_panel(&self.panel);
    }
}

/// Map surface plus side panel. Each call replaces prior content.
pub trait Surface {
    fn render_layers(&mut self, layers: &[FeatureCollection]);
    fn show_panel(&mut self, panel: &PanelView);
}

/// Keeps the last delivered content in memory.
#[derive(Debug, Default, Clone)]
pub struct MemorySurface {
    pub layers: Vec<FeatureCollection>,
    pub panel: Option<PanelView>,
}

impl Surface for MemorySurface {
    fn render_layers(&mut self, layers: &[FeatureCollection]) {
        self.layers = layers.to_vec();
    }

    fn show_panel(&mut self, panel: &PanelView) {
        self.panel = Some(panel.clone());
    }
}
