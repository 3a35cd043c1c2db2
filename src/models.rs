use serde::{Deserialize, Serialize};

/// Ascending, de-duplicated list of `YYYY-MM-DD` dates the backend can serve.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DateSequence {
    dates: Vec<String>,
}

impl DateSequence {
    pub fn new(mut dates: Vec<String>) -> Self {
        dates.sort();
        dates.dedup();
        Self { dates }
    }

    pub fn len(&self) -> usize {
        self.dates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.dates.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.dates.get(index).map(String::as_str)
    }

    pub fn position(&self, date: &str) -> Option<usize> {
        self.dates
            .binary_search_by(|candidate| candidate.as_str().cmp(date))
            .ok()
    }

    pub fn last_index(&self) -> Option<usize> {
        self.dates.len().checked_sub(1)
    }

    pub fn first(&self) -> Option<&str> {
        self.get(0)
    }

    pub fn last(&self) -> Option<&str> {
        self.last_index().and_then(|index| self.get(index))
    }

    pub fn as_slice(&self) -> &[String] {
        &self.dates
    }
}

/// GeoJSON position, `[longitude, latitude, ...]`.
pub type Position = Vec<f64>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    Point { coordinates: Position },
    MultiPoint { coordinates: Vec<Position> },
    LineString { coordinates: Vec<Position> },
    MultiLineString { coordinates: Vec<Vec<Position>> },
    Polygon { coordinates: Vec<Vec<Position>> },
    MultiPolygon { coordinates: Vec<Vec<Vec<Position>>> },
}

impl Geometry {
    pub fn point(latitude: f64, longitude: f64) -> Self {
        Geometry::Point {
            coordinates: vec![longitude, latitude],
        }
    }

    /// `[latitude, longitude]` of a point geometry.
    pub fn as_lat_lng(&self) -> Option<[f64; 2]> {
        match self {
            Geometry::Point { coordinates } if coordinates.len() >= 2 => {
                Some([coordinates[1], coordinates[0]])
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RegionFeature {
    pub region_id: String,
    pub name: Option<String>,
    pub date: String,
    pub actual_case: bool,
    /// Raw `case_lag_future_14` value; point records use it to size markers.
    pub actual_cases: f64,
    pub predicted_binary: bool,
    pub predicted_probability: f64,
    pub predicted_percentage: f64,
    pub geometry: Geometry,
}

impl RegionFeature {
    pub fn new(region_id: impl Into<String>, date: impl Into<String>, geometry: Geometry) -> Self {
        Self {
            region_id: region_id.into(),
            name: None,
            date: date.into(),
            actual_case: false,
            actual_cases: 0.0,
            predicted_binary: false,
            predicted_probability: 0.0,
            predicted_percentage: 0.0,
            geometry,
        }
    }
}

/// Every feature the backend returned for one date.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Dataset {
    pub date: String,
    pub features: Vec<RegionFeature>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatsSummary {
    pub total: usize,
    pub actual_positive: usize,
    pub predicted_positive: usize,
    pub high_risk: usize,
    pub medium_risk: usize,
    pub low_risk: usize,
    pub mean_probability: f64,
    pub max_probability: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackStatus {
    #[default]
    Stopped,
    Playing,
}

impl PlaybackStatus {
    /// Glyph shown on the play/pause button.
    pub fn glyph(self) -> &'static str {
        match self {
            PlaybackStatus::Stopped => "▶️",
            PlaybackStatus::Playing => "⏸️",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayerKind {
    Actual,
    Predicted,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayerVisibility {
    pub actual: bool,
    pub predicted: bool,
}

impl Default for LayerVisibility {
    fn default() -> Self {
        Self {
            actual: true,
            predicted: true,
        }
    }
}

impl LayerVisibility {
    pub fn shows(&self, layer: LayerKind) -> bool {
        match layer {
            LayerKind::Actual => self.actual,
            LayerKind::Predicted => self.predicted,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SeekRequest {
    pub index: Option<usize>,
    pub date: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LayerRequest {
    pub actual: Option<bool>,
    pub predicted: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct SeekForm {
    pub index: usize,
}

/// Checkbox form: unchecked boxes are simply absent from the submission.
#[derive(Debug, Deserialize)]
pub struct LayerForm {
    pub actual: Option<String>,
    pub predicted: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ViewResponse {
    pub enabled: bool,
    pub timeline_visible: bool,
    pub catalog_error: Option<String>,
    pub date_count: usize,
    pub slider_max: usize,
    pub current_index: usize,
    pub current_date: Option<String>,
    pub date_label: String,
    pub playback: PlaybackStatus,
    pub playback_glyph: String,
    pub loading: bool,
    pub fetch_error: Option<String>,
    pub rendered_date: Option<String>,
    pub overlay_revision: u64,
    pub stats: Option<StatsSummary>,
    pub layers: LayerVisibility,
    pub shapes: Vec<crate::overlay::Shape>,
}
