use crate::models::{Dataset, Geometry, LayerKind, LayerVisibility, RegionFeature};
use serde::Serialize;
use v_htmlescape::escape;

pub const ACTUAL_OUTLINE: &str = "red";
pub const NEUTRAL_OUTLINE: &str = "#666";
pub const PREDICTED_FILL: &str = "lightblue";
pub const EMPTY_FILL: &str = "white";

const OUTLINE_OPACITY: f64 = 0.8;
const MARKER_FILL_OPACITY: f64 = 0.5;
const ACTUAL_MARKER_RADIUS_PER_CASE: f64 = 100.0;
const PREDICTED_MARKER_RADIUS: f64 = 50.0;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PathStyle {
    pub color: &'static str,
    pub weight: u8,
    pub opacity: f64,
    pub fill_color: &'static str,
    pub fill_opacity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Shape {
    Region {
        region_id: String,
        geometry: Geometry,
        style: PathStyle,
        popup: String,
    },
    Marker {
        region_id: String,
        layer: LayerKind,
        /// `[latitude, longitude]`
        center: [f64; 2],
        /// Metres.
        radius: f64,
        style: PathStyle,
        popup: String,
    },
}

impl Shape {
    pub fn region_id(&self) -> &str {
        match self {
            Shape::Region { region_id, .. } | Shape::Marker { region_id, .. } => region_id,
        }
    }

    pub fn style(&self) -> &PathStyle {
        match self {
            Shape::Region { style, .. } | Shape::Marker { style, .. } => style,
        }
    }

    pub fn popup(&self) -> &str {
        match self {
            Shape::Region { popup, .. } | Shape::Marker { popup, .. } => popup,
        }
    }
}

/// Outline encodes the observed case, fill encodes the model's prediction.
pub fn feature_style(feature: &RegionFeature) -> PathStyle {
    let (color, weight) = if feature.actual_case {
        (ACTUAL_OUTLINE, 3)
    } else {
        (NEUTRAL_OUTLINE, 1)
    };
    let (fill_color, fill_opacity) = if feature.predicted_binary {
        (PREDICTED_FILL, 0.6)
    } else {
        (EMPTY_FILL, 0.1)
    };

    PathStyle {
        color,
        weight,
        opacity: OUTLINE_OPACITY,
        fill_color,
        fill_opacity,
    }
}

fn marker_style(layer: LayerKind) -> PathStyle {
    let (color, fill_color) = match layer {
        LayerKind::Actual => ("red", "#f03"),
        LayerKind::Predicted => ("blue", "#30f"),
    };
    PathStyle {
        color,
        weight: 3,
        opacity: 1.0,
        fill_color,
        fill_opacity: MARKER_FILL_OPACITY,
    }
}

pub fn popup_content(feature: &RegionFeature) -> String {
    let name = feature.name.as_deref().unwrap_or("Unknown Area");
    let actual = u8::from(feature.actual_case);
    let predicted = u8::from(feature.predicted_binary);

    format!(
        r#"<div class="popup-content">
  <h3>{name}</h3>
  <p><strong>Region ID:</strong> {region_id}</p>
  <p><strong>Date:</strong> {date}</p>
  <hr>
  <p><strong>Actual Cases:</strong> {actual} {actual_mark}</p>
  <p><strong>Predicted Binary:</strong> {predicted} {predicted_mark}</p>
  <p><strong>Prediction Value:</strong> {probability:.4}</p>
  <p><strong>Risk Percentage:</strong> {percentage:.2}%</p>
</div>"#,
        name = escape(name),
        region_id = escape(&feature.region_id),
        date = escape(&feature.date),
        actual_mark = if feature.actual_case { "🔴" } else { "✅" },
        predicted_mark = if feature.predicted_binary { "🔵" } else { "✅" },
        probability = feature.predicted_probability,
        percentage = feature.predicted_percentage,
    )
}

/// Shapes for one dataset. Point features become markers on the two
/// toggleable layers; every other geometry becomes a styled region.
pub fn draw(dataset: &Dataset, layers: LayerVisibility) -> Vec<Shape> {
    let mut shapes = Vec::with_capacity(dataset.features.len());

    for feature in &dataset.features {
        let Some(center) = feature.geometry.as_lat_lng() else {
            shapes.push(Shape::Region {
                region_id: feature.region_id.clone(),
                geometry: feature.geometry.clone(),
                style: feature_style(feature),
                popup: popup_content(feature),
            });
            continue;
        };

        if feature.actual_case && layers.shows(LayerKind::Actual) {
            shapes.push(Shape::Marker {
                region_id: feature.region_id.clone(),
                layer: LayerKind::Actual,
                center,
                radius: feature.actual_cases * ACTUAL_MARKER_RADIUS_PER_CASE,
                style: marker_style(LayerKind::Actual),
                popup: popup_content(feature),
            });
        }
        if feature.predicted_binary && layers.shows(LayerKind::Predicted) {
            shapes.push(Shape::Marker {
                region_id: feature.region_id.clone(),
                layer: LayerKind::Predicted,
                center,
                radius: PREDICTED_MARKER_RADIUS,
                style: marker_style(LayerKind::Predicted),
                popup: popup_content(feature),
            });
        }
    }

    shapes
}

/// The map's overlay layer. Each render replaces everything it showed.
#[derive(Debug, Default)]
pub struct OverlayLayer {
    shapes: Vec<Shape>,
    rendered_date: Option<String>,
    revision: u64,
}

impl OverlayLayer {
    pub fn render(&mut self, dataset: &Dataset, layers: LayerVisibility) {
        self.clear();
        self.shapes = draw(dataset, layers);
        self.rendered_date = Some(dataset.date.clone());
        self.revision += 1;
    }

    pub fn clear(&mut self) {
        self.shapes.clear();
        self.rendered_date = None;
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    pub fn rendered_date(&self) -> Option<&str> {
        self.rendered_date.as_deref()
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }
}
