use std::f64::consts::PI;

use foundation::LonLat;
use formats::{Feature, FeatureCollection};
use geo::Geometry;
use geometry::{BufferOptions, GeometryProvider, SimplifyOptions, Units, line_string, to_geojson};

use crate::accumulate::{Accumulate, SingleLatest};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch, field};

pub const DEFAULT_TOLERANCE: f64 = 0.5;
const LINE_POINTS: usize = 100;
const LINE_RADIUS_DEG: f64 = 5.0;
const BUFFER_DEG: f64 = 0.1;

/// Two turns around a circle of radius 5° centred on `center`.
pub fn looping_line(center: LonLat) -> Vec<LonLat> {
    (0..LINE_POINTS)
        .map(|i| {
            let angle = i as f64 / LINE_POINTS as f64 * PI * 4.0;
            center.offset(LINE_RADIUS_DEG * angle.cos(), LINE_RADIUS_DEG * angle.sin())
        })
        .collect()
}

/// Buffers a looping line and simplifies the outline with Ramer-Douglas-Peucker.
#[derive(Debug, Clone, PartialEq)]
pub struct SimplifyLab {
    pub clicks: SingleLatest,
    pub show_simplified_only: bool,
    pub tolerance: f64,
}

impl Default for SimplifyLab {
    fn default() -> Self {
        Self {
            clicks: SingleLatest::default(),
            show_simplified_only: false,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl Lab for SimplifyLab {
    const ID: &'static str = "simplify";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "Simplify",
            description: "Simplify a line with the Ramer-Douglas-Peucker algorithm.",
            viewport: Viewport::at(70.0, 33.0, 4.0),
        }
    }

    fn click(&self, at: LonLat) -> Self {
        Self {
            clicks: self.clicks.push(at),
            ..self.clone()
        }
    }

    fn patch(&self, patch: &StatePatch) -> Result<Self, LabError> {
        patch.apply(Self::ID, self, |s, name, value| {
            match name {
                "show_simplified_only" => {
                    s.show_simplified_only = field::boolean(Self::ID, name, value)?
                }
                "tolerance" => s.tolerance = field::positive_f64(Self::ID, name, value)?,
                _ => return Err(LabError::unknown(Self::ID, name)),
            }
            Ok(())
        })
    }

    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        let center = self.clicks.latest?;
        let line = Geometry::LineString(line_string(&looping_line(center)));
        let buffered = provider.buffer(
            &line,
            BUFFER_DEG,
            BufferOptions {
                units: Units::Degrees,
                ..BufferOptions::default()
            },
        );
        let Some(buffered) = buffered.map(Geometry::MultiPolygon) else {
            return Some(GeometryResult::default());
        };
        let simplified = provider.simplify(
            &buffered,
            SimplifyOptions {
                tolerance: self.tolerance,
            },
        );

        let mut collections = Vec::with_capacity(2);
        if !self.show_simplified_only {
            if let Some(g) = to_geojson(&buffered) {
                let n = g.vertex_count();
                collections.push(FeatureCollection::single(
                    Feature::new(g).with_property("vertex_count", n),
                ));
            }
        }
        if let Some(g) = to_geojson(&simplified) {
            let n = g.vertex_count();
            collections.push(FeatureCollection::single(
                Feature::new(g)
                    .with_property("vertex_count", n)
                    .with_property("tolerance", self.tolerance),
            ));
        }
        Some(GeometryResult::new(collections))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let counts: Vec<Option<f64>> = result
            .map(|r| {
                r.collections()
                    .iter()
                    .map(|fc| fc.first().and_then(|f| f.property_f64("vertex_count")))
                    .collect()
            })
            .unwrap_or_default();
        let view = PanelView::new(&Self::meta())
            .checkbox(
                "show_simplified_only",
                "Show the simplified outline only",
                self.show_simplified_only,
            )
            .number("tolerance", "Tolerance (degrees)", self.tolerance, 0.01, 0.1)
            .coordinate("Clicked point", self.clicks.latest);
        if result.is_none() {
            return view.placeholder("Click a point to draw and simplify the line.");
        }
        let view = match counts.as_slice() {
            [buffered, simplified] => view
                .measurement("Buffered vertices", *buffered, "")
                .measurement("Simplified vertices", *simplified, ""),
            [simplified] => view.measurement("Simplified vertices", *simplified, ""),
            _ => view,
        };
        view.text(
            "Ramer-Douglas-Peucker keeps a vertex only when it deviates from the simplified \
             line by more than the tolerance. Running it again on its own output changes nothing.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{SimplifyLab, looping_line};
    use crate::contract::Lab;
    use crate::patch::StatePatch;
    use foundation::LonLat;
    use geometry::GeoProvider;

    fn vertex_counts(lab: &SimplifyLab) -> Vec<u64> {
        lab.compute(&GeoProvider)
            .expect("ready")
            .collections()
            .iter()
            .map(|fc| {
                fc.first()
                    .and_then(|f| f.property("vertex_count"))
                    .and_then(|v| v.as_u64())
                    .expect("vertex_count")
            })
            .collect()
    }

    #[test]
    fn starts_over_central_asia() {
        let meta = SimplifyLab::meta();
        assert_eq!((meta.viewport.longitude, meta.viewport.latitude), (70.0, 33.0));
    }

    #[test]
    fn line_has_one_hundred_points_on_the_circle() {
        let c = LonLat::new(70.0, 33.0);
        let line = looping_line(c);
        assert_eq!(line.len(), 100);
        for p in &line {
            let r = ((p.lon - c.lon).powi(2) + (p.lat - c.lat).powi(2)).sqrt();
            assert!((r - 5.0).abs() < 1e-9);
        }
    }

    #[test]
    fn simplified_has_fewer_vertices() {
        let lab = SimplifyLab::default().click(LonLat::new(70.0, 33.0));
        let counts = vertex_counts(&lab);
        assert_eq!(counts.len(), 2);
        assert!(counts[1] < counts[0], "{counts:?}");
    }

    #[test]
    fn simplified_only_drops_the_buffer() {
        let lab = SimplifyLab::default()
            .click(LonLat::new(70.0, 33.0))
            .patch(&StatePatch::new().with("show_simplified_only", true))
            .unwrap();
        let result = lab.compute(&GeoProvider).unwrap();
        assert_eq!(result.len(), 1);
        let f = result.get(0).and_then(|fc| fc.first()).unwrap();
        assert_eq!(f.property_f64("tolerance"), Some(0.5));
    }

    #[test]
    fn larger_tolerance_keeps_fewer_vertices() {
        let base = SimplifyLab::default().click(LonLat::new(0.0, 0.0));
        let coarse = base.patch(&StatePatch::new().with("tolerance", 2.0)).unwrap();
        assert!(vertex_counts(&coarse)[1] <= vertex_counts(&base)[1]);
    }
}
