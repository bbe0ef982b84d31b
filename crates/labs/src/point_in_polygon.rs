use foundation::LonLat;
use formats::{Feature, FeatureCollection, Geometry as GeoJsonGeometry};
use geo::{Geometry, MultiPolygon};
use geometry::{GeometryProvider, polygon, to_geojson};
use serde::{Deserialize, Serialize};

use crate::accumulate::{Accumulate, FirstThenRepeat};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch, field};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Inside,
    Outside,
    Boundary,
}

impl Classification {
    /// A point on an edge is `Boundary`, or `Outside` when the boundary is
    /// ignored. It is never `Inside`.
    pub fn classify(is_inside: bool, is_on_line: bool, ignore_boundary: bool) -> Self {
        if is_on_line {
            if ignore_boundary {
                Classification::Outside
            } else {
                Classification::Boundary
            }
        } else if is_inside {
            Classification::Inside
        } else {
            Classification::Outside
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Classification::Inside => "inside",
            Classification::Outside => "outside",
            Classification::Boundary => "boundary",
        }
    }
}

/// Test polygons placed around the anchor click.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fixture {
    /// Square two degrees north.
    Simple,
    /// Notched square two degrees east.
    Concave,
    /// Square with a square hole two degrees south.
    Hole,
    /// Two disjoint squares two degrees west.
    Multi,
}

impl Fixture {
    pub const ALL: [Fixture; 4] = [Fixture::Simple, Fixture::Concave, Fixture::Hole, Fixture::Multi];

    pub fn name(self) -> &'static str {
        match self {
            Fixture::Simple => "simple",
            Fixture::Concave => "concave",
            Fixture::Hole => "hole",
            Fixture::Multi => "multi",
        }
    }

    pub fn center(self, anchor: LonLat) -> LonLat {
        match self {
            Fixture::Simple => anchor.offset(0.0, 2.0),
            Fixture::Concave => anchor.offset(2.0, 0.0),
            Fixture::Hole => anchor.offset(0.0, -2.0),
            Fixture::Multi => anchor.offset(-2.0, 0.0),
        }
    }

    pub fn geometry(self, anchor: LonLat) -> Geometry<f64> {
        let c = self.center(anchor);
        let rect = |x0: f64, y0: f64, x1: f64, y1: f64| {
            vec![
                c.offset(x0, y0),
                c.offset(x1, y0),
                c.offset(x1, y1),
                c.offset(x0, y1),
                c.offset(x0, y0),
            ]
        };
        match self {
            Fixture::Simple => Geometry::Polygon(polygon(&[rect(-0.5, -0.5, 0.5, 0.5)])),
            Fixture::Concave => Geometry::Polygon(polygon(&[vec![
                c.offset(-0.5, -0.5),
                c.offset(0.5, -0.5),
                c,
                c.offset(0.5, 0.5),
                c.offset(-0.5, 0.5),
                c.offset(-0.5, -0.5),
            ]])),
            Fixture::Hole => Geometry::Polygon(polygon(&[
                rect(-0.5, -0.5, 0.5, 0.5),
                rect(-0.2, -0.2, 0.2, 0.2),
            ])),
            Fixture::Multi => Geometry::MultiPolygon(MultiPolygon::new(vec![
                polygon(&[rect(-0.7, -0.7, -0.1, -0.1)]),
                polygon(&[rect(0.1, 0.1, 0.7, 0.7)]),
            ])),
        }
    }
}

/// Classifies the latest click against four fixtures anchored on the first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PointInPolygonLab {
    pub clicks: FirstThenRepeat,
    pub ignore_boundary: bool,
}

impl Lab for PointInPolygonLab {
    const ID: &'static str = "point-in-polygon";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "Point in Polygon",
            description: "Decide whether a point is inside, outside or on the boundary of a polygon.",
            viewport: Viewport::at(0.0, 0.0, 4.0),
        }
    }

    fn click(&self, at: LonLat) -> Self {
        Self {
            clicks: self.clicks.push(at),
            ..self.clone()
        }
    }

    fn patch(&self, patch: &StatePatch) -> Result<Self, LabError> {
        patch.apply(Self::ID, self, |s, name, value| match name {
            "ignore_boundary" => {
                s.ignore_boundary = field::boolean(Self::ID, name, value)?;
                Ok(())
            }
            _ => Err(LabError::unknown(Self::ID, name)),
        })
    }

    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        let (anchor, at) = self.clicks.both()?;
        let mut any_inside = false;
        let mut any_on_line = false;
        let mut fixtures = Vec::with_capacity(Fixture::ALL.len());

        for fixture in Fixture::ALL {
            let shape = fixture.geometry(anchor);
            let is_inside = provider.point_in_polygon(at, &shape, false);
            let is_on_line = provider.point_on_boundary(at, &shape);
            any_inside |= is_inside;
            any_on_line |= is_on_line;
            let Some(geojson) = to_geojson(&shape) else {
                continue;
            };
            let class = Classification::classify(is_inside, is_on_line, self.ignore_boundary);
            fixtures.push(
                Feature::new(geojson)
                    .with_property("type", fixture.name())
                    .with_property("is_inside", is_inside)
                    .with_property("is_on_line", is_on_line)
                    .with_property("classification", class.as_str()),
            );
        }

        let class = Classification::classify(any_inside, any_on_line, self.ignore_boundary);
        let marker = Feature::new(GeoJsonGeometry::Point(at))
            .with_property("is_inside", any_inside)
            .with_property("is_on_line", any_on_line)
            .with_property("classification", class.as_str());

        let mut features = vec![marker];
        features.extend(fixtures);
        Some(GeometryResult::single(FeatureCollection::new(features)))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let features = result
            .and_then(|r| r.get(0))
            .map(|fc| fc.features.as_slice())
            .unwrap_or_default();
        let mut view = PanelView::new(&Self::meta())
            .checkbox(
                "ignore_boundary",
                "Ignore boundary (points on an edge count as outside)",
                self.ignore_boundary,
            )
            .coordinate("Anchor", self.clicks.first)
            .coordinate("Current click", self.clicks.current);
        let Some((marker, fixtures)) = features.split_first() else {
            let hint = if self.clicks.first.is_none() {
                "Click once to place the polygons, then click to test points."
            } else {
                "Click again to test a point against the polygons."
            };
            return view.placeholder(hint);
        };
        view = view.classification("Overall", marker.property_str("classification"));
        for fixture in fixtures {
            let label = fixture.property_str("type").unwrap_or("polygon");
            view = view.classification(label, fixture.property_str("classification"));
        }
        view.text(
            "A point exactly on an edge is reported as boundary. With the boundary ignored \
             it is reported as outside, never inside.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Classification, Fixture, PointInPolygonLab};
    use crate::contract::Lab;
    use crate::patch::StatePatch;
    use foundation::LonLat;
    use geometry::GeoProvider;
    use proptest::prelude::*;

    fn classify_at(lab: &PointInPolygonLab) -> Vec<(String, String)> {
        let result = lab.compute(&GeoProvider).expect("ready");
        result
            .get(0)
            .expect("collection")
            .features
            .iter()
            .map(|f| {
                (
                    f.property_str("type").unwrap_or("point").to_string(),
                    f.property_str("classification").unwrap_or_default().to_string(),
                )
            })
            .collect()
    }

    fn anchored(at: LonLat) -> PointInPolygonLab {
        PointInPolygonLab::default()
            .click(LonLat::new(0.0, 0.0))
            .click(at)
    }

    #[test]
    fn anchor_only_is_not_ready() {
        let lab = PointInPolygonLab::default().click(LonLat::new(0.0, 0.0));
        assert!(lab.compute(&GeoProvider).is_none());
        assert!(lab.panel(None).has_placeholder());
    }

    #[test]
    fn centre_of_simple_square_is_inside() {
        let got = classify_at(&anchored(LonLat::new(0.0, 2.0)));
        assert_eq!(got[0], ("point".to_string(), "inside".to_string()));
        assert_eq!(got[1], ("simple".to_string(), "inside".to_string()));
        assert_eq!(got.len(), 5);
        assert!(got[2..].iter().all(|(_, c)| c == "outside"));
    }

    #[test]
    fn hole_and_notch_are_outside() {
        let got = classify_at(&anchored(LonLat::new(0.0, -2.0)));
        assert_eq!(got[3], ("hole".to_string(), "outside".to_string()));

        let got = classify_at(&anchored(LonLat::new(2.3, 0.0)));
        assert_eq!(got[2], ("concave".to_string(), "outside".to_string()));
    }

    #[test]
    fn either_island_counts_for_multi() {
        let got = classify_at(&anchored(LonLat::new(-1.6, 0.4)));
        assert_eq!(got[4], ("multi".to_string(), "inside".to_string()));
        let got = classify_at(&anchored(LonLat::new(-2.0, 0.0)));
        assert_eq!(got[4], ("multi".to_string(), "outside".to_string()));
    }

    #[test]
    fn edge_point_is_boundary_or_outside() {
        let edge = LonLat::new(0.5, 2.0);
        let got = classify_at(&anchored(edge));
        assert_eq!(got[0].1, "boundary");
        assert_eq!(got[1].1, "boundary");

        let ignoring = anchored(edge)
            .patch(&StatePatch::new().with("ignore_boundary", true))
            .unwrap();
        let got = classify_at(&ignoring);
        assert_eq!(got[0].1, "outside");
        assert_eq!(got[1].1, "outside");
    }

    #[test]
    fn fixtures_surround_the_anchor() {
        let a = LonLat::new(10.0, 20.0);
        assert_eq!(Fixture::Simple.center(a), LonLat::new(10.0, 22.0));
        assert_eq!(Fixture::Concave.center(a), LonLat::new(12.0, 20.0));
        assert_eq!(Fixture::Hole.center(a), LonLat::new(10.0, 18.0));
        assert_eq!(Fixture::Multi.center(a), LonLat::new(8.0, 20.0));
    }

    proptest! {
        #[test]
        fn on_line_is_never_inside(inside in any::<bool>(), ignore in any::<bool>()) {
            let class = Classification::classify(inside, true, ignore);
            prop_assert_ne!(class, Classification::Inside);
            let expected = if ignore { Classification::Outside } else { Classification::Boundary };
            prop_assert_eq!(class, expected);
        }

        #[test]
        fn anchor_survives_later_clicks(x in -170.0f64..170.0, y in -80.0f64..80.0) {
            let lab = anchored(LonLat::new(x, y)).click(LonLat::new(y, x / 2.0));
            prop_assert_eq!(lab.clicks.first, Some(LonLat::new(0.0, 0.0)));
        }
    }
}
