use foundation::LonLat;
use geometry::GeometryProvider;

use crate::buffer_circle::BufferCircleLab;
use crate::contract::{GeometryResult, Lab, LabMeta};
use crate::distance::DistanceLab;
use crate::great_circle::GreatCircleLab;
use crate::panel::PanelView;
use crate::patch::{LabError, StatePatch};
use crate::point_in_polygon::PointInPolygonLab;
use crate::polygon_ops::PolygonOpsLab;
use crate::rewind::RewindLab;
use crate::simplify::SimplifyLab;

/// Stored state of one lab, tagged by which lab it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub enum LabState {
    Distance(DistanceLab),
    GreatCircle(GreatCircleLab),
    BufferCircle(BufferCircleLab),
    PointInPolygon(PointInPolygonLab),
    PolygonOps(PolygonOpsLab),
    Rewind(RewindLab),
    Simplify(SimplifyLab),
}

macro_rules! dispatch {
    ($state:expr, $lab:ident => $body:expr) => {
        match $state {
            LabState::Distance($lab) => $body,
            LabState::GreatCircle($lab) => $body,
            LabState::BufferCircle($lab) => $body,
            LabState::PointInPolygon($lab) => $body,
            LabState::PolygonOps($lab) => $body,
            LabState::Rewind($lab) => $body,
            LabState::Simplify($lab) => $body,
        }
    };
}

/// Like `dispatch!`, but rewraps the body in the same variant.
macro_rules! rewrap {
    ($state:expr, $lab:ident => $body:expr) => {
        match $state {
            LabState::Distance($lab) => LabState::Distance($body),
            LabState::GreatCircle($lab) => LabState::GreatCircle($body),
            LabState::BufferCircle($lab) => LabState::BufferCircle($body),
            LabState::PointInPolygon($lab) => LabState::PointInPolygon($body),
            LabState::PolygonOps($lab) => LabState::PolygonOps($body),
            LabState::Rewind($lab) => LabState::Rewind($body),
            LabState::Simplify($lab) => LabState::Simplify($body),
        }
    };
}

fn meta_of<L: Lab>(_: &L) -> LabMeta {
    L::meta()
}

fn fresh<L: Lab>(_: &L) -> L {
    L::default()
}

/// Constructor for a lab's default state, as stored in the registry.
pub type LabFactory = fn() -> LabState;

impl LabState {
    /// The built-in labs in display order.
    pub fn catalogue() -> [(LabMeta, LabFactory); 7] {
        [
            (DistanceLab::meta(), || LabState::Distance(DistanceLab::default())),
            (GreatCircleLab::meta(), || LabState::GreatCircle(GreatCircleLab::default())),
            (BufferCircleLab::meta(), || LabState::BufferCircle(BufferCircleLab::default())),
            (PointInPolygonLab::meta(), || LabState::PointInPolygon(PointInPolygonLab::default())),
            (PolygonOpsLab::meta(), || LabState::PolygonOps(PolygonOpsLab::default())),
            (RewindLab::meta(), || LabState::Rewind(RewindLab::default())),
            (SimplifyLab::meta(), || LabState::Simplify(SimplifyLab::default())),
        ]
    }

    pub fn id(&self) -> &'static str {
        self.meta().id
    }

    pub fn meta(&self) -> LabMeta {
        dispatch!(self, lab => meta_of(lab))
    }

    pub fn click(&self, at: LonLat) -> LabState {
        rewrap!(self, lab => lab.click(at))
    }

    pub fn patch(&self, patch: &StatePatch) -> Result<LabState, LabError> {
        Ok(rewrap!(self, lab => lab.patch(patch)?))
    }

    /// Default state of the same lab, parameters included.
    pub fn reset(&self) -> LabState {
        rewrap!(self, lab => fresh(lab))
    }

    pub fn compute(&self, provider: &dyn GeometryProvider) -> Option<GeometryResult> {
        dispatch!(self, lab => lab.compute(provider))
    }

    pub fn panel(&self, result: Option<&GeometryResult>) -> PanelView {
        dispatch!(self, lab => lab.panel(result))
    }
}

macro_rules! impl_from {
    ($($variant:ident($ty:ty)),* $(,)?) => {
        $(impl From<$ty> for LabState {
            fn from(lab: $ty) -> Self {
                LabState::$variant(lab)
            }
        })*
    };
}

impl_from!(
    Distance(DistanceLab),
    GreatCircle(GreatCircleLab),
    BufferCircle(BufferCircleLab),
    PointInPolygon(PointInPolygonLab),
    PolygonOps(PolygonOpsLab),
    Rewind(RewindLab),
    Simplify(SimplifyLab),
);
