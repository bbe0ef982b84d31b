use foundation::LonLat;
use formats::{Feature, FeatureCollection, Geometry};
use geometry::{DistanceMethod, GeometryProvider, Units};

use crate::accumulate::{Accumulate, SlidingPair};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch};

pub const PROP_MERCATOR_KM: &str = "distance_mercator_km";
pub const PROP_HAVERSINE_KM: &str = "distance_haversine_km";
pub const PROP_RHUMB_KM: &str = "distance_rhumb_km";

/// Distance between the last two clicks measured three ways.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DistanceLab {
    pub clicks: SlidingPair,
}

impl Lab for DistanceLab {
    const ID: &'static str = "distance";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "Distance",
            description: "Measure the distance between two points.",
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
        let km = |method| provider.distance(a, b, method, Units::Kilometers);
        let line = Feature::new(Geometry::LineString(vec![a, b]))
            .with_property(PROP_MERCATOR_KM, km(DistanceMethod::WebMercator))
            .with_property(PROP_HAVERSINE_KM, km(DistanceMethod::Haversine))
            .with_property(PROP_RHUMB_KM, km(DistanceMethod::Rhumb));
        Some(GeometryResult::single(FeatureCollection::single(line)))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let feature = result.and_then(|r| r.get(0)).and_then(FeatureCollection::first);
        let prop = |key| feature.and_then(|f| f.property_f64(key));
        let view = PanelView::new(&Self::meta())
            .text("Click two points on the map.")
            .coordinate("Previous click", self.clicks.previous)
            .coordinate("Current click", self.clicks.current);
        if feature.is_none() {
            return view.placeholder("Click two points to see the distance.");
        }
        view.heading("Web Mercator")
            .measurement("Mercator distance", prop(PROP_MERCATOR_KM), "km")
            .text(
                "Straight line on the projected plane, scaled at the mid-point latitude. \
                 Ignores the curvature of the Earth and drifts for long or north-south spans.",
            )
            .heading("Haversine")
            .measurement("Great-circle distance", prop(PROP_HAVERSINE_KM), "km")
            .text(
                "Spherical approximation of the Earth. Not an exact geodesic on the ellipsoid.",
            )
            .heading("Rhumb line")
            .measurement("Rhumb distance", prop(PROP_RHUMB_KM), "km")
            .text(
                "Path of constant bearing (loxodrome). Longer than the great circle, \
                 but easy to navigate.",
            )
    }
}
