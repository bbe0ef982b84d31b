use anyhow::{Context, Result, bail};
use formats::FeatureCollection;
use foundation::LonLat;
use labs::{PanelView, StatePatch};
use runtime::{InteractionEvent, Publication, Scenario, Session, Surface};
use serde_json::Value;
use tracing::{debug, info};

/// Parses `lon,lat` in decimal degrees.
pub fn parse_click(raw: &str) -> Result<LonLat, String> {
    let (lon, lat) = raw
        .split_once(',')
        .ok_or_else(|| format!("expected lon,lat but got `{raw}`"))?;
    let lon: f64 = lon.trim().parse().map_err(|_| format!("bad longitude `{lon}`"))?;
    let lat: f64 = lat.trim().parse().map_err(|_| format!("bad latitude `{lat}`"))?;
    LonLat::try_new(lon, lat).map_err(|e| e.to_string())
}

/// Parses `field=value`. The value is read as JSON when it parses, otherwise
/// as a bare string, so `operation=intersect` and `radius_km=250` both work.
pub fn parse_assignment(raw: &str) -> Result<(String, Value), String> {
    let (field, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected field=value but got `{raw}`"))?;
    let field = field.trim();
    if field.is_empty() {
        return Err(format!("missing field name in `{raw}`"));
    }
    let value = serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()));
    Ok((field.to_string(), value))
}

/// Event sequence for a one-shot run: select, one combined edit, then clicks.
pub fn run_events(lab: &str, sets: &[(String, Value)], clicks: &[LonLat]) -> Vec<InteractionEvent> {
    let mut events = vec![InteractionEvent::Select(lab.to_string())];
    if !sets.is_empty() {
        let patch = sets
            .iter()
            .fold(StatePatch::new(), |p, (field, value)| p.with(field, value.clone()));
        events.push(InteractionEvent::Edit(patch));
    }
    events.extend(clicks.iter().copied().map(InteractionEvent::Click));
    events
}

/// Feeds events to the session in order and delivers every publication to
/// `surface`. Stops at the first rejected event. Returns the last publication.
pub fn replay(
    session: &mut Session,
    events: &[InteractionEvent],
    surface: &mut dyn Surface,
) -> Result<Option<Publication>> {
    let mut last = None;
    for (i, event) in events.iter().enumerate() {
        let publication = session
            .handle(event.clone())
            .with_context(|| format!("event #{i} ({}) rejected", event.kind()))?;
        if let Some(p) = publication {
            debug!(sequence = p.sequence, lab = p.lab_id, "delivering publication");
            p.deliver(surface);
            last = Some(p);
        }
    }
    Ok(last)
}

/// Applies the scenario's config, if any, then replays its events.
pub fn replay_scenario(
    session: &mut Session,
    scenario: &Scenario,
    surface: &mut dyn Surface,
) -> Result<Option<Publication>> {
    let mut last = None;
    if let Some(config) = &scenario.config {
        last = session
            .apply_config(config)
            .context("scenario config rejected")?;
        if let Some(p) = &last {
            p.deliver(surface);
        }
    }
    info!(events = scenario.events.len(), "replaying scenario");
    if scenario.events.is_empty() && last.is_none() {
        bail!("scenario has no events");
    }
    Ok(replay(session, &scenario.events, surface)?.or(last))
}

/// Terminal surface: keeps the last layers as GeoJSON and the panel as text.
#[derive(Debug, Default)]
pub struct TextSurface {
    pub layers: Vec<Value>,
    pub panel: String,
}

impl Surface for TextSurface {
    fn render_layers(&mut self, layers: &[FeatureCollection]) {
        self.layers = layers.iter().map(FeatureCollection::to_geojson_value).collect();
    }

    fn show_panel(&mut self, panel: &PanelView) {
        self.panel = panel.to_string();
    }
}

impl TextSurface {
    pub fn render(&self) -> Result<String> {
        let mut out = String::new();
        for (i, layer) in self.layers.iter().enumerate() {
            out.push_str(&format!("# layer {i}\n"));
            out.push_str(&serde_json::to_string_pretty(layer)?);
            out.push('\n');
        }
        if self.layers.is_empty() {
            out.push_str("# no layers\n");
        }
        out.push_str(&self.panel);
        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::{TextSurface, parse_assignment, parse_click, replay, run_events};
    use foundation::LonLat;
    use pretty_assertions::assert_eq;
    use runtime::{InteractionEvent, Session};
    use serde_json::json;

    #[test]
    fn click_parsing() {
        assert_eq!(parse_click("139.7, 35.7").unwrap(), LonLat::new(139.7, 35.7));
        assert!(parse_click("139.7").is_err());
        assert!(parse_click("0,91").is_err());
        assert!(parse_click("x,1").is_err());
    }

    #[test]
    fn assignment_values_fall_back_to_strings() {
        assert_eq!(
            parse_assignment("radius_km=250").unwrap(),
            ("radius_km".to_string(), json!(250))
        );
        assert_eq!(
            parse_assignment("operation=intersect").unwrap(),
            ("operation".to_string(), json!("intersect"))
        );
        assert_eq!(
            parse_assignment("ignore_boundary=true").unwrap(),
            ("ignore_boundary".to_string(), json!(true))
        );
        assert!(parse_assignment("=1").is_err());
        assert!(parse_assignment("radius_km").is_err());
    }

    #[test]
    fn run_events_order() {
        let events = run_events(
            "distance",
            &[],
            &[LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0)],
        );
        assert_eq!(events.len(), 3);
        assert_eq!(events[0], InteractionEvent::Select("distance".into()));
        assert_eq!(events[2], InteractionEvent::Click(LonLat::new(1.0, 0.0)));

        let with_edit = run_events("buffer-circle", &[("radius_km".into(), json!(5))], &[]);
        assert_eq!(with_edit[1].kind(), "edit");
    }

    #[test]
    fn replay_stops_at_rejected_event() {
        let mut session = Session::with_builtin_labs().unwrap();
        let mut surface = TextSurface::default();
        let events = vec![
            InteractionEvent::Select("distance".into()),
            InteractionEvent::Select("nope".into()),
            InteractionEvent::Click(LonLat::new(0.0, 0.0)),
        ];
        let err = replay(&mut session, &events, &mut surface).unwrap_err();
        assert!(err.to_string().contains("event #1"));
        assert_eq!(session.sequence(), 1);
    }

    #[test]
    fn text_surface_renders_layers_then_panel() {
        let mut session = Session::with_builtin_labs().unwrap();
        let mut surface = TextSurface::default();
        let events = run_events(
            "distance",
            &[],
            &[LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0)],
        );
        let last = replay(&mut session, &events, &mut surface).unwrap().unwrap();
        assert_eq!(last.lab_id, "distance");
        assert_eq!(surface.layers.len(), 1);
        let text = surface.render().unwrap();
        assert!(text.starts_with("# layer 0\n"));
        assert!(text.contains("distance_haversine_km"));
        assert!(text.contains("Great-circle distance"));
    }
}
