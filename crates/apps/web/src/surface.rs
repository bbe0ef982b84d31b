use formats::FeatureCollection;
use labs::PanelView;
use runtime::Surface;
use serde_json::Value;

/// Keeps the last published layers and panel as JSON for the page to pull.
///
/// The page's map wrapper replaces its GeoJSON sources with `layers` after
/// every publication; an empty array clears them.
#[derive(Debug, Default)]
pub struct BrowserSurface {
    pub layers: Value,
    pub panel: Value,
}

impl Surface for BrowserSurface {
    fn render_layers(&mut self, layers: &[FeatureCollection]) {
        self.layers = Value::Array(layers.iter().map(FeatureCollection::to_geojson_value).collect());
    }

    fn show_panel(&mut self, panel: &PanelView) {
        self.panel = serde_json::to_value(panel).unwrap_or(Value::Null);
    }
}

#[cfg(test)]
mod tests {
    use super::BrowserSurface;
    use runtime::{InteractionEvent, Session};
    use foundation::LonLat;

    #[test]
    fn delivery_replaces_layers() {
        let mut session = Session::with_builtin_labs().unwrap();
        let mut surface = BrowserSurface::default();
        session.select("rewind").unwrap().deliver(&mut surface);
        assert_eq!(surface.layers, serde_json::json!([]));
        assert_eq!(surface.panel["lab_id"], "rewind");

        session
            .handle(InteractionEvent::Click(LonLat::new(0.0, 0.0)))
            .unwrap()
            .unwrap()
            .deliver(&mut surface);
        assert_eq!(surface.layers[0]["type"], "FeatureCollection");
        assert_eq!(surface.layers[0]["features"].as_array().map(Vec::len), Some(4));
    }
}
