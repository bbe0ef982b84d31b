use foundation::LonLat;
use formats::{Feature, FeatureCollection};
use geo::{Geometry, Polygon};
use geometry::{GeometryProvider, polygon, to_geojson};

use crate::accumulate::{Accumulate, SingleLatest};
use crate::contract::{GeometryResult, Lab, LabMeta, Viewport};
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch, field};

const SIZE: f64 = 0.3;
const OFFSET: f64 = 0.4;
const HOLE_SIZE: f64 = SIZE * 0.4;

/// One of the four demonstration polygons, by quadrant.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Specimen {
    pub has_hole: bool,
    pub is_broken: bool,
    pub d_lon: f64,
    pub d_lat: f64,
}

pub const SPECIMENS: [Specimen; 4] = [
    Specimen { has_hole: false, is_broken: false, d_lon: -OFFSET, d_lat: OFFSET },
    Specimen { has_hole: false, is_broken: true, d_lon: OFFSET, d_lat: OFFSET },
    Specimen { has_hole: true, is_broken: false, d_lon: -OFFSET, d_lat: -OFFSET },
    Specimen { has_hole: true, is_broken: true, d_lon: OFFSET, d_lat: -OFFSET },
];

impl Specimen {
    pub fn label(&self) -> &'static str {
        match (self.has_hole, self.is_broken) {
            (false, false) => "Simple (CCW)",
            (false, true) => "Simple (CW)",
            (true, false) => "Hole (CCW/CW)",
            (true, true) => "Hole (CW/CCW)",
        }
    }

    pub fn kind(&self) -> &'static str {
        if self.has_hole { "hole" } else { "simple" }
    }

    /// Builds the polygon around `at` with the specimen's deliberate winding.
    pub fn polygon(&self, at: LonLat) -> Polygon<f64> {
        let c = at.offset(self.d_lon, self.d_lat);
        let h = SIZE / 2.0;
        let mut outer = vec![
            c.offset(-h, -h),
            c.offset(h, -h),
            c.offset(h, h),
            c.offset(-h, h),
            c.offset(-h, -h),
        ];
        if self.is_broken {
            outer.reverse();
        }
        if !self.has_hole {
            return polygon(&[outer]);
        }
        let k = HOLE_SIZE / 2.0;
        let mut inner = vec![
            c.offset(-k, -k),
            c.offset(-k, k),
            c.offset(k, k),
            c.offset(k, -k),
            c.offset(-k, -k),
        ];
        if self.is_broken {
            inner.reverse();
        }
        polygon(&[outer, inner])
    }
}

/// Correct and incorrect ring winding side by side, optionally repaired.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RewindLab {
    pub clicks: SingleLatest,
    pub apply_rewind: bool,
}

impl Lab for RewindLab {
    const ID: &'static str = "rewind";

    fn meta() -> LabMeta {
        LabMeta {
            id: Self::ID,
            title: "CW/CCW and Rewind",
            description: "Learn about GeoJSON ring orientation and rewinding.",
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
            "apply_rewind" => {
                s.apply_rewind = field::boolean(Self::ID, name, value)?;
                Ok(())
            }
            _ => Err(LabError::unknown(Self::ID, name)),
        })
    }

    fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        let at = self.clicks.latest?;
        let features = SPECIMENS
            .iter()
            .filter_map(|specimen| {
                let mut shape = Geometry::Polygon(specimen.polygon(at));
                if self.apply_rewind {
                    shape = provider.rewind(&shape);
                }
                let Geometry::Polygon(ref p) = shape else {
                    return None;
                };
                let exterior_ccw = provider.is_ccw(p.exterior());
                let signed_area = provider.planar_signed_area(p);
                Some(
                    Feature::new(to_geojson(&shape)?)
                        .with_property("type", specimen.kind())
                        .with_property("is_broken", specimen.is_broken)
                        .with_property("label", specimen.label())
                        .with_property("exterior_ccw", exterior_ccw)
                        .with_property("signed_area", signed_area),
                )
            })
            .collect();
        Some(GeometryResult::single(FeatureCollection::new(features)))
    }

    fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        let mut view = PanelView::new(&Self::meta())
            .checkbox("apply_rewind", "Apply rewind", self.apply_rewind)
            .coordinate("Clicked point", self.clicks.latest);
        let Some(fc) = result.and_then(|r| r.get(0)) else {
            return view.placeholder("Click a point to draw four polygons around it.");
        };
        view = view
            .text("North-west: simple, valid (CCW).")
            .text("North-east: simple, broken (CW).")
            .text("South-west: hole, valid (exterior CCW, hole CW).")
            .text("South-east: hole, broken (exterior CW, hole CCW).")
            .heading("Exterior winding");
        for f in &fc.features {
            let label = f.property_str("label").unwrap_or("polygon");
            let winding = match f.property_bool("exterior_ccw") {
                Some(true) => Some("ccw"),
                Some(false) => Some("cw"),
                None => None,
            };
            view = view.classification(label, winding);
        }
        view.text(
            "Map renderers draw broken polygons anyway, but predicates such as \
             point-in-polygon and the sign of the area depend on the winding.",
        )
    }
}
