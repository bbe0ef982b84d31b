use foundation::LonLat;
use formats::{Feature, FeatureCollection};
use geometry::{
    BufferOptions, CircleOptions, GeometryProvider, Units, multi_polygon_to_geojson, point,
    polygon_to_geojson,
};

use crate::accumulate::{Accumulate, SingleLatest};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch, field};

pub const DEFAULT_RADIUS_KM: f64 = 1000.0;
pub const DEFAULT_CIRCLE_STEPS: usize = 6;
pub const MAX_CIRCLE_STEPS: u64 = 1024;

/// Point buffer and geodesic circle of the same radius, side by side.
#[derive(Debug, Clone, PartialEq)]
pub struct BufferCircleLab {
    pub clicks: SingleLatest,
    pub radius_km: f64,
    pub circle_steps: usize,
}

impl Default for BufferCircleLab {
    fn default() -> Self {
        Self {
            clicks: SingleLatest::default(),
            radius_km: DEFAULT_RADIUS_KM,
            circle_steps: DEFAULT_CIRCLE_STEPS,
        }
    }
}

impl Lab for BufferCircleLab {
    const ID: &'static str = "buffer-circle";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "Buffer vs Circle",
            description: "Build a circular buffer around a point and compare it with a circle.",
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
        patch.apply(Self::ID, self, |s, name, value| {
            match name {
                "radius_km" => s.radius_km = field::positive_f64(Self::ID, name, value)?,
                "circle_steps" => {
                    s.circle_steps = field::integer_in(Self::ID, name, value, 3, MAX_CIRCLE_STEPS)?
                }
                _ => return Err(LabError::unknown(Self::ID, name)),
            }
            Ok(())
        })
    }

    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        let center = self.clicks.latest?;
        let mut collections = Vec::with_capacity(2);

        let buffer = provider.buffer(
            &geo::Geometry::Point(point(center)),
            self.radius_km,
            BufferOptions {
                steps: self.circle_steps,
                units: Units::Kilometers,
            },
        );
        if let Some(buffer) = buffer {
            let area = provider.area(&geo::Geometry::MultiPolygon(buffer.clone()));
            collections.push(FeatureCollection::single(
                Feature::new(multi_polygon_to_geojson(&buffer))
                    .with_property("description", "Buffer (geo)")
                    .with_property("area_m2", area),
            ));
        }

        let circle = provider.circle(
            center,
            self.radius_km,
            CircleOptions {
                steps: self.circle_steps,
                units: Units::Kilometers,
            },
        );
        if let Some(circle) = circle {
            let area = provider.area(&geo::Geometry::Polygon(circle.clone()));
            collections.push(FeatureCollection::single(
                Feature::new(polygon_to_geojson(&circle))
                    .with_property("description", "Circle (geo)")
                    .with_property("area_m2", area),
            ));
        }

        Some(GeometryResult::new(collections))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let area_of = |description: &str| {
            result?
                .collections()
                .iter()
                .filter_map(FeatureCollection::first)
                .find(|f| f.property_str("description") == Some(description))?
                .property_f64("area_m2")
        };
        let view = PanelView::new(&Self::meta())
            .number("radius_km", "Radius (km)", self.radius_km, 1.0, 100.0)
            .number(
                "circle_steps",
                "Steps",
                self.circle_steps as f64,
                3.0,
                1.0,
            )
            .coordinate("Clicked point", self.clicks.latest);
        if result.is_none() {
            return view.placeholder("Click a point to draw the buffer and the circle.");
        }
        view.heading("Areas")
            .measurement("Buffer area", area_of("Buffer (geo)").map(|m2| m2 / 1e6), "km²")
            .measurement("Circle area", area_of("Circle (geo)").map(|m2| m2 / 1e6), "km²")
            .text(format!(
                "The buffer rounds each quarter of the point with {} segments, giving {} vertices; \
                 the circle places {} vertices around the whole ring, so its area is smaller.",
                self.circle_steps,
                self.circle_steps * 4,
                self.circle_steps,
            ))
    }
}
