use std::path::{Path, PathBuf};

use kystdata_core::{LayerId, LayerSink, Mmsi, Position, ShipInfo, SpeedBucket, layer_name};
use serde_json::{Map, Value, json};
use snafu::ResultExt;
use tracing::{info, warn};

use crate::{
    Result,
    error::error::{IoSnafu, JsonSnafu},
};

/// In-memory layers, one per vessel, standing in for the host's map project.
#[derive(Debug, Default)]
pub struct MemoryLayers {
    layers: Vec<Layer>,
}

#[derive(Debug, Clone)]
pub struct Layer {
    id: LayerId,
    name: String,
    mmsi: Mmsi,
    ship: ShipInfo,
    properties: Vec<(&'static str, String)>,
    features: Vec<Feature>,
}

/// A position point and the style bucket it is drawn with.
#[derive(Debug, Clone, PartialEq)]
pub struct Feature {
    pub position: Position,
    pub style: SpeedBucket,
}

impl MemoryLayers {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn layers(&self) -> &[Layer] {
        &self.layers
    }

    pub fn layer(&self, id: LayerId) -> Option<&Layer> {
        self.layers.get(id.0)
    }

    pub fn find(&self, mmsi: Mmsi) -> Option<&Layer> {
        self.layers.iter().find(|l| l.mmsi == mmsi)
    }

    /// Writes every layer to `<dir>/<mmsi>.geojson`.
    pub fn export_geojson(&self, dir: &Path) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(dir).context(IoSnafu { path: dir })?;

        self.layers
            .iter()
            .map(|layer| {
                let path = dir.join(format!("{}.geojson", layer.mmsi));
                let bytes = serde_json::to_vec_pretty(&layer.to_geojson()).context(JsonSnafu)?;
                std::fs::write(&path, bytes).context(IoSnafu { path: &path })?;
                info!("wrote layer '{}' to {}", layer.name, path.display());
                Ok(path)
            })
            .collect()
    }
}

impl LayerSink for MemoryLayers {
    fn ensure_layer(&mut self, mmsi: Mmsi, info: &ShipInfo) -> LayerId {
        if let Some(layer) = self.find(mmsi) {
            return layer.id;
        }

        let id = LayerId(self.layers.len());
        self.layers.push(Layer {
            id,
            name: layer_name(mmsi),
            mmsi,
            ship: info.clone(),
            properties: info.properties(),
            features: Vec::new(),
        });
        id
    }

    fn add_positions(&mut self, layer: LayerId, positions: &[Position]) {
        let Some(layer) = self.layers.get_mut(layer.0) else {
            warn!("dropping {} positions for unknown layer {layer:?}", positions.len());
            return;
        };

        layer.features.extend(positions.iter().map(|p| Feature {
            style: SpeedBucket::of(p),
            position: p.clone(),
        }));
    }
}

impl Layer {
    pub fn id(&self) -> LayerId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn mmsi(&self) -> Mmsi {
        self.mmsi
    }

    pub fn properties(&self) -> &[(&'static str, String)] {
        &self.properties
    }

    pub fn property(&self, key: &str) -> Option<&str> {
        self.properties
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn features(&self) -> &[Feature] {
        &self.features
    }

    pub fn num_features(&self, style: SpeedBucket) -> usize {
        self.features.iter().filter(|f| f.style == style).count()
    }

    pub fn to_geojson(&self) -> Value {
        let ship_name = self.ship.display_name();

        let features = self
            .features
            .iter()
            .map(|f| {
                let p = &f.position;
                let point = p.point();
                json!({
                    "type": "Feature",
                    "geometry": {
                        "type": "Point",
                        "coordinates": [point.x(), point.y()],
                    },
                    "properties": {
                        "name": ship_name,
                        "mmsi": p.mmsi.into_inner(),
                        "datetime_utc": p.timestamp.to_rfc3339(),
                        "course": p.course_over_ground,
                        "speed": p.speed_over_ground,
                        "AIS_message_number": p.ais_message_type,
                        "calc_speed": p.calculated_speed,
                        "seconds_prev_point": p.seconds_since_previous,
                        "distance_prev_point": p.distance_since_previous,
                        "style": f.style.as_ref(),
                    },
                })
            })
            .collect::<Vec<_>>();

        let mut properties = self
            .properties
            .iter()
            .map(|(k, v)| (k.to_string(), Value::String(v.clone())))
            .collect::<Map<_, _>>();
        properties.insert("mmsi".into(), json!(self.mmsi.into_inner()));

        json!({
            "type": "FeatureCollection",
            "name": self.name,
            "properties": properties,
            "features": features,
        })
    }
}
