use foundation::LonLat;
use formats::{Feature, FeatureCollection, Geometry};
use geometry::{DistanceMethod, GeometryProvider, Units};

use crate::accumulate::{Accumulate, SlidingPair};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch};

pub const GREAT_CIRCLE_POINTS: usize = 100;

/// Straight map segment next to the great-circle route between two clicks.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GreatCircleLab {
    pub clicks: SlidingPair,
}

impl Lab for GreatCircleLab {
    const ID: &'static str = "great-circle";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "Great Circle",
            description: "Compute the great-circle route between two points.",
            viewport: Viewport::at(0.0, 0.0, 4.0),
        }
    }

    fn click(&self, at: LonLat) -> Self {
        Self {
            clicks: self.clicks.push(at),
        }
    }

    fn patch(&self, patch: &StatePatch) -> Result<Self, LabError> {
        patch.apply(Self::ID, self, |_, field, _| {
            Err(LabError::unknown(Self::ID, field))
        })
    }

    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        let (a, b) = self.clicks.pair()?;
        let straight = Feature::new(Geometry::LineString(vec![a, b]));
        let mut collections = vec![FeatureCollection::single(straight)];

        let mut parts = provider.great_circle(a, b, GREAT_CIRCLE_POINTS);
        let route = match parts.len() {
            0 => None,
            1 => parts.pop().map(Geometry::LineString),
            _ => Some(Geometry::MultiLineString(parts)),
        };
        if let Some(route) = route {
            let km = provider.distance(a, b, DistanceMethod::Haversine, Units::Kilometers);
            collections.push(FeatureCollection::single(
                Feature::new(route).with_property("distance_haversine_km", km),
            ));
        }
        Some(GeometryResult::new(collections))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let route = result
            .and_then(|r| r.get(1))
            .and_then(FeatureCollection::first);
        let view = PanelView::new(&Self::meta())
            .text("Click two points on the map.")
            .coordinate("Previous click", self.clicks.previous)
            .coordinate("Current click", self.clicks.current);
        let Some(route) = route else {
            return view.placeholder("Click two points to draw the great circle.");
        };
        view.measurement(
            "Great-circle distance",
            route.property_f64("distance_haversine_km"),
            "km",
        )
        .text(
            "The straight segment is the shortest path only on the Mercator plane. \
             The great circle is the shortest path on the sphere and bends towards the pole.",
        )
        .text("Routes crossing the antimeridian are split into two lines.")
    }
}
