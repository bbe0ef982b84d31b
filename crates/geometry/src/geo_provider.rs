use crate::convert::{lon_lat, point};
use crate::provider::{
    BooleanOp, BufferOptions, CircleOptions, DistanceMethod, GeometryProvider, SimplifyOptions,
    Units,
};
use foundation::LonLat;
use foundation::math::{mercator_distance_m, meters_to_degrees};
use geo::coordinate_position::{CoordPos, CoordinatePosition};
use geo::orient::{Direction, Orient};
use geo::{
    Area, BooleanOps, Buffer, ChamberlainDuquetteArea, CoordsIter, Destination, Distance,
    Geometry, Haversine, InterpolatePoint, LineString, MultiPolygon, Point, Polygon, Rhumb,
    Simplify, Winding,
};

/// [`GeometryProvider`] backed by the `geo` crate.
///
/// Distances, circles and point buffers are spherical (mean Earth radius).
/// Buffers of lines and polygons are planar in degree units, which is what
/// the labs draw on a Web Mercator map.
#[derive(Debug, Default, Copy, Clone)]
pub struct GeoProvider;

impl GeoProvider {
    pub fn new() -> Self {
        Self
    }

    fn ring_around(center: Point<f64>, meters: f64, vertices: usize) -> Polygon<f64> {
        let mut coords: Vec<_> = (0..vertices)
            .map(|i| {
                let bearing = -(i as f64) * 360.0 / vertices as f64;
                Haversine.destination(center, bearing, meters).0
            })
            .collect();
        if let Some(first) = coords.first().copied() {
            coords.push(first);
        }
        Polygon::new(LineString::new(coords), vec![])
    }
}

fn valid_length(value: f64) -> bool {
    value.is_finite() && value > 0.0
}

fn non_empty(mp: MultiPolygon<f64>) -> Option<MultiPolygon<f64>> {
    let mp = MultiPolygon::new(
        mp.0.into_iter()
            .filter(|p| p.exterior().0.len() >= 4)
            .collect(),
    );
    (!mp.0.is_empty()).then_some(mp)
}

fn simplify_once(geometry: &Geometry<f64>, epsilon: f64) -> Geometry<f64> {
    match geometry {
        Geometry::LineString(g) => Geometry::LineString(g.simplify(epsilon)),
        Geometry::MultiLineString(g) => Geometry::MultiLineString(g.simplify(epsilon)),
        Geometry::Polygon(g) => Geometry::Polygon(g.simplify(epsilon)),
        Geometry::MultiPolygon(g) => Geometry::MultiPolygon(g.simplify(epsilon)),
        other => other.clone(),
    }
}

/// Splits a sampled path wherever consecutive longitudes jump across ±180°,
/// inserting the interpolated crossing point at both ends of the cut.
fn split_at_antimeridian(points: Vec<LonLat>) -> Vec<Vec<LonLat>> {
    let mut parts = Vec::new();
    let mut part: Vec<LonLat> = Vec::with_capacity(points.len());
    for p in points {
        if let Some(prev) = part.last().copied() {
            let d_lon = p.lon - prev.lon;
            if d_lon.abs() > 180.0 {
                let edge = if d_lon < 0.0 { 180.0 } else { -180.0 };
                let unwrapped = p.lon + 2.0 * edge;
                let t = (edge - prev.lon) / (unwrapped - prev.lon);
                let lat = prev.lat + t * (p.lat - prev.lat);
                part.push(LonLat::new(edge, lat));
                parts.push(std::mem::take(&mut part));
                part.push(LonLat::new(-edge, lat));
            }
        }
        part.push(p);
    }
    if !part.is_empty() {
        parts.push(part);
    }
    parts
}

impl GeometryProvider for GeoProvider {
    fn distance(&self, a: LonLat, b: LonLat, method: DistanceMethod, units: Units) -> f64 {
        let meters = match method {
            DistanceMethod::Haversine => Haversine.distance(point(a), point(b)),
            DistanceMethod::Rhumb => Rhumb.distance(point(a), point(b)),
            DistanceMethod::WebMercator => mercator_distance_m(a, b),
        };
        units.from_meters(meters)
    }

    fn great_circle(&self, a: LonLat, b: LonLat, npoints: usize) -> Vec<Vec<LonLat>> {
        if a == b {
            return vec![vec![a, b]];
        }
        let n = npoints.max(2);
        let (pa, pb) = (point(a), point(b));
        let mut sampled = Vec::with_capacity(n);
        for i in 0..n {
            let ratio = i as f64 / (n - 1) as f64;
            let p = Haversine.point_at_ratio_between(pa, pb, ratio);
            if !(p.x().is_finite() && p.y().is_finite()) {
                return Vec::new();
            }
            sampled.push(lon_lat(p.0));
        }
        split_at_antimeridian(sampled)
    }

    fn circle(&self, center: LonLat, radius: f64, opts: CircleOptions) -> Option<Polygon<f64>> {
        if !valid_length(radius) || opts.steps < 3 {
            return None;
        }
        let meters = opts.units.to_meters(radius);
        Some(Self::ring_around(point(center), meters, opts.steps))
    }

    fn buffer(
        &self,
        geometry: &Geometry<f64>,
        radius: f64,
        opts: BufferOptions,
    ) -> Option<MultiPolygon<f64>> {
        if !valid_length(radius) || opts.steps == 0 {
            return None;
        }
        let vertices = opts.steps.checked_mul(4)?;
        let meters = opts.units.to_meters(radius);
        match geometry {
            Geometry::Point(p) => Some(MultiPolygon::new(vec![Self::ring_around(
                *p, meters, vertices,
            )])),
            Geometry::MultiPoint(mp) => {
                let discs = mp
                    .iter()
                    .map(|p| MultiPolygon::new(vec![Self::ring_around(*p, meters, vertices)]));
                let merged = discs.reduce(|acc, disc| acc.union(&disc))?;
                non_empty(merged)
            }
            other => non_empty(other.buffer(meters_to_degrees(meters))),
        }
    }

    fn area(&self, geometry: &Geometry<f64>) -> f64 {
        match geometry {
            Geometry::Polygon(p) => p.chamberlain_duquette_unsigned_area(),
            Geometry::MultiPolygon(mp) => mp.chamberlain_duquette_unsigned_area(),
            _ => 0.0,
        }
    }

    fn planar_signed_area(&self, polygon: &Polygon<f64>) -> f64 {
        polygon.signed_area()
    }

    fn point_in_polygon(
        &self,
        p: LonLat,
        polygon: &Geometry<f64>,
        ignore_boundary: bool,
    ) -> bool {
        match polygon.coordinate_position(&crate::convert::coord(p)) {
            CoordPos::Inside => true,
            CoordPos::OnBoundary => !ignore_boundary,
            CoordPos::Outside => false,
        }
    }

    fn point_on_boundary(&self, p: LonLat, polygon: &Geometry<f64>) -> bool {
        polygon.coordinate_position(&crate::convert::coord(p)) == CoordPos::OnBoundary
    }

    fn boolean_op(
        &self,
        op: BooleanOp,
        a: &MultiPolygon<f64>,
        b: &MultiPolygon<f64>,
    ) -> Option<MultiPolygon<f64>> {
        let out = match op {
            BooleanOp::Union => a.union(b),
            BooleanOp::Intersect => a.intersection(b),
            BooleanOp::Difference => a.difference(b),
        };
        non_empty(out)
    }

    fn simplify(&self, geometry: &Geometry<f64>, opts: SimplifyOptions) -> Geometry<f64> {
        if !valid_length(opts.tolerance) {
            return geometry.clone();
        }
        // RDP keeps a subset of the input, so an unchanged vertex count is a fixpoint.
        let mut current = simplify_once(geometry, opts.tolerance);
        loop {
            let next = simplify_once(&current, opts.tolerance);
            if next.coords_count() == current.coords_count() {
                return current;
            }
            current = next;
        }
    }

    fn rewind(&self, geometry: &Geometry<f64>) -> Geometry<f64> {
        match geometry {
            Geometry::Polygon(p) => Geometry::Polygon(p.orient(Direction::Default)),
            Geometry::MultiPolygon(mp) => Geometry::MultiPolygon(mp.orient(Direction::Default)),
            other => other.clone(),
        }
    }

    fn is_ccw(&self, ring: &LineString<f64>) -> bool {
        ring.is_ccw()
    }
}

#[cfg(test)]
mod tests {
    use super::{GeoProvider, split_at_antimeridian};
    use crate::convert::{line_string, polygon};
    use crate::provider::{
        BooleanOp, BufferOptions, CircleOptions, DistanceMethod, GeometryProvider,
        SimplifyOptions, Units,
    };
    use foundation::LonLat;
    use geo::{CoordsIter, Geometry, MultiPolygon, Polygon};
    use proptest::prelude::*;

    fn assert_close(a: f64, b: f64, eps: f64) {
        assert!((a - b).abs() <= eps, "{a} vs {b} (eps {eps})");
    }

    fn square(cx: f64, cy: f64, half: f64) -> Polygon<f64> {
        polygon(&[vec![
            LonLat::new(cx - half, cy - half),
            LonLat::new(cx + half, cy - half),
            LonLat::new(cx + half, cy + half),
            LonLat::new(cx - half, cy + half),
        ]])
    }

    #[test]
    fn one_degree_of_meridian_is_about_111_km() {
        let g = GeoProvider;
        let (a, b) = (LonLat::new(0.0, 0.0), LonLat::new(0.0, 1.0));
        assert_close(
            g.distance(a, b, DistanceMethod::Haversine, Units::Kilometers),
            111.195,
            0.01,
        );
        assert_close(
            g.distance(a, b, DistanceMethod::Rhumb, Units::Kilometers),
            111.195,
            0.01,
        );
        assert_close(
            g.distance(a, b, DistanceMethod::WebMercator, Units::Kilometers),
            111.195,
            0.2,
        );
    }

    #[test]
    fn circle_has_requested_vertex_count_and_is_closed() {
        let ring = GeoProvider
            .circle(
                LonLat::new(10.0, 20.0),
                100.0,
                CircleOptions {
                    steps: 6,
                    units: Units::Kilometers,
                },
            )
            .expect("circle");
        let coords = &ring.exterior().0;
        assert_eq!(coords.len(), 7);
        assert_eq!(coords.first(), coords.last());
    }

    #[test]
    fn circle_rejects_degenerate_parameters() {
        let c = LonLat::new(0.0, 0.0);
        let opts = CircleOptions::default();
        assert!(GeoProvider.circle(c, 0.0, opts).is_none());
        assert!(GeoProvider.circle(c, f64::NAN, opts).is_none());
        assert!(
            GeoProvider
                .circle(c, 1.0, CircleOptions { steps: 2, ..opts })
                .is_none()
        );
    }

    #[test]
    fn point_buffer_uses_quadrant_segments() {
        let buffered = GeoProvider
            .buffer(
                &Geometry::Point(geo::Point::new(0.0, 0.0)),
                1000.0,
                BufferOptions {
                    steps: 6,
                    units: Units::Kilometers,
                },
            )
            .expect("buffer");
        assert_eq!(buffered.0.len(), 1);
        assert_eq!(buffered.0[0].exterior().0.len(), 6 * 4 + 1);
    }

    #[test]
    fn point_buffer_with_overflowing_steps_is_absent() {
        let buffered = GeoProvider.buffer(
            &Geometry::Point(geo::Point::new(0.0, 0.0)),
            1000.0,
            BufferOptions {
                steps: usize::MAX / 2,
                units: Units::Kilometers,
            },
        );
        assert!(buffered.is_none());
    }

    #[test]
    fn line_buffer_is_non_empty() {
        let line = line_string(&[LonLat::new(0.0, 0.0), LonLat::new(1.0, 0.0)]);
        let buffered = GeoProvider
            .buffer(
                &Geometry::LineString(line),
                0.1,
                BufferOptions {
                    steps: 8,
                    units: Units::Degrees,
                },
            )
            .expect("buffer");
        assert!(!buffered.0.is_empty());
        assert!(GeoProvider.area(&Geometry::MultiPolygon(buffered)) > 0.0);
    }

    #[test]
    fn one_degree_square_area_at_equator() {
        let sq = square(0.5, 0.5, 0.5);
        let area = GeoProvider.area(&Geometry::Polygon(sq));
        assert_close(area / 1.236e10, 1.0, 0.01);
    }

    #[test]
    fn boundary_points_follow_ignore_flag() {
        let sq = Geometry::Polygon(square(0.0, 0.0, 1.0));
        let edge = LonLat::new(1.0, 0.0);
        assert!(GeoProvider.point_on_boundary(edge, &sq));
        assert!(GeoProvider.point_in_polygon(edge, &sq, false));
        assert!(!GeoProvider.point_in_polygon(edge, &sq, true));

        let centre = LonLat::new(0.0, 0.0);
        assert!(GeoProvider.point_in_polygon(centre, &sq, true));
        assert!(!GeoProvider.point_on_boundary(centre, &sq));
    }

    #[test]
    fn disjoint_intersection_is_absent() {
        let a = MultiPolygon::new(vec![square(0.0, 0.0, 1.0)]);
        let b = MultiPolygon::new(vec![square(10.0, 0.0, 1.0)]);
        assert!(GeoProvider.boolean_op(BooleanOp::Intersect, &a, &b).is_none());
        let union = GeoProvider
            .boolean_op(BooleanOp::Union, &a, &b)
            .expect("union");
        assert_eq!(union.0.len(), 2);
    }

    #[test]
    fn rewind_fixes_clockwise_exterior() {
        let mut cw = square(0.0, 0.0, 1.0);
        cw.exterior_mut(|ring| ring.0.reverse());
        assert!(!GeoProvider.is_ccw(cw.exterior()));
        assert!(GeoProvider.planar_signed_area(&cw) < 0.0);

        let Geometry::Polygon(fixed) = GeoProvider.rewind(&Geometry::Polygon(cw.clone())) else {
            panic!("expected polygon");
        };
        assert!(GeoProvider.is_ccw(fixed.exterior()));
        assert_close(GeoProvider.planar_signed_area(&fixed), 4.0, 1e-9);
        assert_eq!(fixed.exterior().coords_count(), cw.exterior().coords_count());
    }

    #[test]
    fn great_circle_splits_at_antimeridian() {
        let parts = GeoProvider.great_circle(LonLat::new(170.0, 10.0), LonLat::new(-170.0, 10.0), 100);
        assert_eq!(parts.len(), 2);
        assert_close(parts[0].last().expect("end").lon, 180.0, 1e-9);
        assert_close(parts[1][0].lon, -180.0, 1e-9);

        let parts = GeoProvider.great_circle(LonLat::new(0.0, 0.0), LonLat::new(10.0, 10.0), 100);
        assert_eq!(parts.len(), 1);
        assert_eq!(parts[0].len(), 100);
    }

    #[test]
    fn split_keeps_paths_that_do_not_cross() {
        let path = vec![LonLat::new(-10.0, 0.0), LonLat::new(10.0, 0.0)];
        assert_eq!(split_at_antimeridian(path.clone()), vec![path]);
    }

    fn arb_line() -> impl Strategy<Value = Vec<LonLat>> {
        prop::collection::vec((-50.0f64..50.0, -50.0f64..50.0), 2..60)
            .prop_map(|pts| pts.into_iter().map(|(x, y)| LonLat::new(x, y)).collect())
    }

    proptest! {
        #[test]
        fn simplify_is_idempotent(line in arb_line(), tolerance in 0.01f64..5.0) {
            let g = Geometry::LineString(line_string(&line));
            let opts = SimplifyOptions { tolerance };
            let once = GeoProvider.simplify(&g, opts);
            let twice = GeoProvider.simplify(&once, opts);
            prop_assert_eq!(once, twice);
        }

        #[test]
        fn rewind_is_idempotent(cx in -100.0f64..100.0, cy in -60.0f64..60.0, flip in any::<bool>()) {
            let mut p = square(cx, cy, 0.5);
            if flip {
                p.exterior_mut(|ring| ring.0.reverse());
            }
            let once = GeoProvider.rewind(&Geometry::Polygon(p));
            let twice = GeoProvider.rewind(&once);
            prop_assert_eq!(once, twice);
        }
    }
}
