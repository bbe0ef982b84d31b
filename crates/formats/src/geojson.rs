//! GeoJSON exchange model between lab compute and the map surface.
//!
//! Collections are plain values: once a lab has produced one it is never
//! mutated, only replaced by the next compute.

use foundation::LonLat;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

pub type Ring = Vec<LonLat>;

#[derive(Debug, Clone, PartialEq)]
pub enum Geometry {
    Point(LonLat),
    MultiPoint(Vec<LonLat>),
    LineString(Vec<LonLat>),
    MultiLineString(Vec<Vec<LonLat>>),
    Polygon(Vec<Ring>),
    MultiPolygon(Vec<Vec<Ring>>),
}

impl Geometry {
    pub fn type_name(&self) -> &'static str {
        match self {
            Geometry::Point(_) => "Point",
            Geometry::MultiPoint(_) => "MultiPoint",
            Geometry::LineString(_) => "LineString",
            Geometry::MultiLineString(_) => "MultiLineString",
            Geometry::Polygon(_) => "Polygon",
            Geometry::MultiPolygon(_) => "MultiPolygon",
        }
    }

    /// Total number of positions, closing positions of rings included.
    pub fn vertex_count(&self) -> usize {
        match self {
            Geometry::Point(_) => 1,
            Geometry::MultiPoint(ps) | Geometry::LineString(ps) => ps.len(),
            Geometry::MultiLineString(rings) | Geometry::Polygon(rings) => {
                rings.iter().map(Vec::len).sum()
            }
            Geometry::MultiPolygon(polys) => polys
                .iter()
                .flat_map(|rings| rings.iter())
                .map(Vec::len)
                .sum(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub id: Option<String>,
    pub properties: Map<String, Value>,
    pub geometry: Geometry,
}

impl Feature {
    pub fn new(geometry: Geometry) -> Self {
        Self {
            id: None,
            properties: Map::new(),
            geometry,
        }
    }

    pub fn with_property(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.properties.insert(key.to_string(), value.into());
        self
    }

    pub fn property(&self, key: &str) -> Option<&Value> {
        self.properties.get(key)
    }

    pub fn property_f64(&self, key: &str) -> Option<f64> {
        self.properties.get(key).and_then(Value::as_f64)
    }

    pub fn property_bool(&self, key: &str) -> Option<bool> {
        self.properties.get(key).and_then(Value::as_bool)
    }

    pub fn property_str(&self, key: &str) -> Option<&str> {
        self.properties.get(key).and_then(Value::as_str)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeatureCollection {
    pub features: Vec<Feature>,
}

impl FeatureCollection {
    pub fn new(features: Vec<Feature>) -> Self {
        Self { features }
    }

    pub fn single(feature: Feature) -> Self {
        Self::new(vec![feature])
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn first(&self) -> Option<&Feature> {
        self.features.first()
    }

    /// Emits a GeoJSON FeatureCollection.
    /// (Property ordering follows insertion order of the feature's map.)
    pub fn to_geojson_value(&self) -> Value {
        let mut root = Map::new();
        root.insert(
            "type".to_string(),
            Value::String("FeatureCollection".to_string()),
        );

        let mut features: Vec<Value> = Vec::with_capacity(self.features.len());
        for feat in &self.features {
            let mut fobj = Map::new();
            fobj.insert("type".to_string(), Value::String("Feature".to_string()));
            if let Some(id) = &feat.id {
                fobj.insert("id".to_string(), Value::String(id.clone()));
            }

            fobj.insert(
                "properties".to_string(),
                Value::Object(feat.properties.clone()),
            );

            fobj.insert(
                "geometry".to_string(),
                geometry_to_geojson_value(&feat.geometry),
            );
            features.push(Value::Object(fobj));
        }

        root.insert("features".to_string(), Value::Array(features));
        Value::Object(root)
    }

}

impl Serialize for FeatureCollection {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_geojson_value().serialize(serializer)
    }
}

fn geometry_to_geojson_value(geom: &Geometry) -> Value {
    let coordinates = match geom {
        Geometry::Point(p) => point_coords(p),
        Geometry::MultiPoint(ps) | Geometry::LineString(ps) => points_coords(ps),
        Geometry::MultiLineString(lines) | Geometry::Polygon(lines) => {
            Value::Array(lines.iter().map(|l| points_coords(l)).collect())
        }
        Geometry::MultiPolygon(polys) => Value::Array(
            polys
                .iter()
                .map(|rings| Value::Array(rings.iter().map(|r| points_coords(r)).collect()))
                .collect(),
        ),
    };

    let mut obj = Map::new();
    obj.insert(
        "type".to_string(),
        Value::String(geom.type_name().to_string()),
    );
    obj.insert("coordinates".to_string(), coordinates);
    Value::Object(obj)
}

fn point_coords(p: &LonLat) -> Value {
    Value::Array(vec![Value::from(p.lon), Value::from(p.lat)])
}

fn points_coords(ps: &[LonLat]) -> Value {
    Value::Array(ps.iter().map(point_coords).collect())
}
