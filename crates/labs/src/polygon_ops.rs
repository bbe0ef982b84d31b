use foundation::LonLat;
use formats::{Feature, FeatureCollection};
use geo::{Geometry, MultiPolygon, Polygon};
use geometry::{
    BooleanOp, CircleOptions, GeometryProvider, Units, multi_polygon_to_geojson, polygon,
    polygon_to_geojson,
};

use crate::accumulate::{Accumulate, FirstThenRepeat};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch, field};

const SQUARE_SIZE: f64 = 0.3;
const SQUARE_OFFSET: f64 = 0.4;
const CIRCLE_STEPS: usize = 64;

/// Boolean operation between a square near the anchor and a circle at the
/// latest click.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PolygonOpsLab {
    pub clicks: FirstThenRepeat,
    pub operation: BooleanOp,
}

/// Square of side 0.3° centred 0.4° west and 0.4° north of `anchor`.
pub fn anchor_square(anchor: LonLat) -> Polygon<f64> {
    let c = anchor.offset(-SQUARE_OFFSET, SQUARE_OFFSET);
    let h = SQUARE_SIZE / 2.0;
    polygon(&[vec![
        c.offset(-h, -h),
        c.offset(h, -h),
        c.offset(h, h),
        c.offset(-h, h),
        c.offset(-h, -h),
    ]])
}

impl Lab for PolygonOpsLab {
    const ID: &'static str = "polygon-ops";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "Polygon Operations",
            description: "Learn about polygon union, intersection and difference.",
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
            "operation" => {
                s.operation = field::variant(Self::ID, name, value)?;
                Ok(())
            }
            _ => Err(LabError::unknown(Self::ID, name)),
        })
    }

    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        let anchor = self.clicks.first?;
        let square = anchor_square(anchor);
        let mut features =
            vec![Feature::new(polygon_to_geojson(&square)).with_property("role", "square")];

        let circle = self.clicks.current.and_then(|at| {
            provider.circle(
                at,
                SQUARE_SIZE / 2.0,
                CircleOptions {
                    steps: CIRCLE_STEPS,
                    units: Units::Degrees,
                },
            )
        });
        if let Some(circle) = circle {
            features.push(Feature::new(polygon_to_geojson(&circle)).with_property("role", "circle"));
            let result = provider.boolean_op(
                self.operation,
                &MultiPolygon::new(vec![square]),
                &MultiPolygon::new(vec![circle]),
            );
            if let Some(result) = result {
                let area = provider.area(&Geometry::MultiPolygon(result.clone()));
                features.push(
                    Feature::new(multi_polygon_to_geojson(&result))
                        .with_property("role", "result")
                        .with_property("operation", self.operation.as_str())
                        .with_property("area_m2", area),
                );
            }
        }

        Some(GeometryResult::single(FeatureCollection::new(features)))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let options: Vec<&str> = BooleanOp::ALL.iter().map(|op| op.as_str()).collect();
        let view = PanelView::new(&Self::meta())
            .select("operation", "Operation", &options, self.operation.as_str())
            .coordinate("Square anchor", self.clicks.first)
            .coordinate("Circle centre", self.clicks.current);
        let Some(fc) = result.and_then(|r| r.get(0)) else {
            return view.placeholder("Click once to place the square.");
        };
        if self.clicks.current.is_none() {
            return view.placeholder("Click again to place the circle.");
        }
        let area = fc
            .features
            .iter()
            .find(|f| f.property_str("role") == Some("result"))
            .and_then(|f| f.property_f64("area_m2"));
        let view = match area {
            Some(m2) => view.measurement("Result area", Some(m2 / 1e6), "km²"),
            None => view.text("The operation produced an empty result."),
        };
        view.text(
            "Union merges both shapes, intersect keeps their overlap and difference \
             removes the circle from the square.",
        )
    }
}
