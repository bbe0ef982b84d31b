//! Conversions between `geo` types and the GeoJSON exchange model.

use formats::Geometry as GeoJsonGeometry;
use foundation::LonLat;
use geo::{Coord, Geometry, LineString, MultiPolygon, Point, Polygon};

pub fn coord(p: LonLat) -> Coord<f64> {
    Coord { x: p.lon, y: p.lat }
}

pub fn point(p: LonLat) -> Point<f64> {
    Point::new(p.lon, p.lat)
}

pub fn lon_lat(c: Coord<f64>) -> LonLat {
    LonLat::new(c.x, c.y)
}

pub fn line_string(ps: &[LonLat]) -> LineString<f64> {
    LineString::new(ps.iter().copied().map(coord).collect())
}

/// Builds a polygon from closed or open rings; `geo` closes them.
pub fn polygon(rings: &[Vec<LonLat>]) -> Polygon<f64> {
    let mut iter = rings.iter();
    let exterior = iter.next().map(|r| line_string(r)).unwrap_or_else(|| LineString::new(vec![]));
    let interiors = iter.map(|r| line_string(r)).collect();
    Polygon::new(exterior, interiors)
}

fn ring_positions(ring: &LineString<f64>) -> Vec<LonLat> {
    ring.coords().copied().map(lon_lat).collect()
}

fn polygon_rings(polygon: &Polygon<f64>) -> Vec<Vec<LonLat>> {
    std::iter::once(polygon.exterior())
        .chain(polygon.interiors())
        .map(ring_positions)
        .collect()
}

pub fn polygon_to_geojson(polygon: &Polygon<f64>) -> GeoJsonGeometry {
    GeoJsonGeometry::Polygon(polygon_rings(polygon))
}

/// Single-member multipolygons collapse to a plain `Polygon`.
pub fn multi_polygon_to_geojson(mp: &MultiPolygon<f64>) -> GeoJsonGeometry {
    match mp.0.as_slice() {
        [only] => polygon_to_geojson(only),
        polys => GeoJsonGeometry::MultiPolygon(polys.iter().map(polygon_rings).collect()),
    }
}

/// Converts to GeoJSON. Returns `None` for geometry kinds GeoJSON has no
/// direct form for (`Line`, `Rect`, `Triangle`, `GeometryCollection`).
pub fn to_geojson(geometry: &Geometry<f64>) -> Option<GeoJsonGeometry> {
    let out = match geometry {
        Geometry::Point(p) => GeoJsonGeometry::Point(lon_lat(p.0)),
        Geometry::MultiPoint(mp) => {
            GeoJsonGeometry::MultiPoint(mp.iter().map(|p| lon_lat(p.0)).collect())
        }
        Geometry::LineString(ls) => GeoJsonGeometry::LineString(ring_positions(ls)),
        Geometry::MultiLineString(mls) => {
            GeoJsonGeometry::MultiLineString(mls.iter().map(ring_positions).collect())
        }
        Geometry::Polygon(p) => polygon_to_geojson(p),
        Geometry::MultiPolygon(mp) => {
            GeoJsonGeometry::MultiPolygon(mp.iter().map(polygon_rings).collect())
        }
        _ => return None,
    };
    Some(out)
}
