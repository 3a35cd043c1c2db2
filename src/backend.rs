use crate::config::{BackendShape, ViewerConfig};
use crate::errors::{CatalogError, FetchError};
use crate::models::{Dataset, Geometry, RegionFeature};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::Value;
use std::{collections::BTreeMap, sync::Arc};
use tracing::{debug, warn};

/// Where dates and per-date snapshots come from.
#[async_trait]
pub trait RiskBackend: Send + Sync {
    async fn fetch_dates(&self) -> Result<Vec<String>, CatalogError>;
    async fn fetch_snapshot(&self, date: &str) -> Result<Dataset, FetchError>;
}

pub fn connect(config: &ViewerConfig) -> Result<Arc<dyn RiskBackend>, reqwest::Error> {
    let client = Client::builder().timeout(config.request_timeout).build()?;
    let backend: Arc<dyn RiskBackend> = match config.backend_shape {
        BackendShape::GeoJson => Arc::new(GeoJsonBackend::new(client, &config.backend_url)),
        BackendShape::PointRecords => {
            Arc::new(PointRecordBackend::new(client, &config.backend_url))
        }
    };
    Ok(backend)
}

/// `GET /api/dates` and `GET /api/data?date=...` returning FeatureCollections.
pub struct GeoJsonBackend {
    client: Client,
    base_url: String,
}

impl GeoJsonBackend {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl RiskBackend for GeoJsonBackend {
    async fn fetch_dates(&self) -> Result<Vec<String>, CatalogError> {
        let response = self
            .client
            .get(format!("{}/api/dates", self.base_url))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(CatalogError::Status {
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    async fn fetch_snapshot(&self, date: &str) -> Result<Dataset, FetchError> {
        let http = |source| FetchError::Http {
            date: date.to_string(),
            source,
        };
        let response = self
            .client
            .get(format!("{}/api/data", self.base_url))
            .query(&[("date", date)])
            .send()
            .await
            .map_err(http)?;
        if !response.status().is_success() {
            return Err(FetchError::Status {
                date: date.to_string(),
                status: response.status().as_u16(),
            });
        }
        let bytes = response.bytes().await.map_err(http)?;
        parse_feature_collection(date, &bytes).map_err(|source| FetchError::Json {
            date: date.to_string(),
            source,
        })
    }
}

/// `GET /data` returning every flat point record for every date.
pub struct PointRecordBackend {
    client: Client,
    base_url: String,
}

impl PointRecordBackend {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    async fn fetch_records(&self) -> Result<Vec<PointRecord>, RecordsError> {
        let response = self
            .client
            .get(format!("{}/data", self.base_url))
            .send()
            .await
            .map_err(RecordsError::Http)?;
        if !response.status().is_success() {
            return Err(RecordsError::Status(response.status().as_u16()));
        }
        let bytes = response.bytes().await.map_err(RecordsError::Http)?;
        serde_json::from_slice(&bytes).map_err(RecordsError::Json)
    }
}

enum RecordsError {
    Http(reqwest::Error),
    Status(u16),
    Json(serde_json::Error),
}

#[async_trait]
impl RiskBackend for PointRecordBackend {
    async fn fetch_dates(&self) -> Result<Vec<String>, CatalogError> {
        let records = self.fetch_records().await.map_err(|err| match err {
            RecordsError::Http(source) => CatalogError::Http(source),
            RecordsError::Status(status) => CatalogError::Status { status },
            RecordsError::Json(source) => CatalogError::Json(source),
        })?;
        Ok(group_point_records(records).into_keys().collect())
    }

    async fn fetch_snapshot(&self, date: &str) -> Result<Dataset, FetchError> {
        let records = self.fetch_records().await.map_err(|err| match err {
            RecordsError::Http(source) => FetchError::Http {
                date: date.to_string(),
                source,
            },
            RecordsError::Status(status) => FetchError::Status {
                date: date.to_string(),
                status,
            },
            RecordsError::Json(source) => FetchError::Json {
                date: date.to_string(),
                source,
            },
        })?;
        let features = group_point_records(records).remove(date).unwrap_or_default();
        Ok(Dataset {
            date: date.to_string(),
            features,
        })
    }
}

#[derive(Debug, Deserialize)]
struct FeatureCollection {
    #[serde(default)]
    features: Vec<RawFeature>,
}

#[derive(Debug, Deserialize)]
struct RawFeature {
    #[serde(default)]
    geometry: Option<Value>,
    #[serde(default)]
    properties: Option<RawProperties>,
}

#[derive(Debug, Default, Deserialize)]
struct RawProperties {
    #[serde(default)]
    town: Option<String>,
    #[serde(default)]
    townvill: Option<Value>,
    #[serde(default)]
    date: Option<String>,
    #[serde(default)]
    case_lag_future_14: Option<f64>,
    #[serde(default)]
    predicted_case_lag_future_14_binary: Option<f64>,
    #[serde(default)]
    predicted_case_lag_future_14: Option<f64>,
    #[serde(default)]
    predicted_case_lag_future_14_percentage: Option<f64>,
}

/// Decodes a FeatureCollection body. Features without a region id or a
/// usable geometry are skipped.
pub fn parse_feature_collection(date: &str, bytes: &[u8]) -> Result<Dataset, serde_json::Error> {
    let collection: FeatureCollection = serde_json::from_slice(bytes)?;
    let mut features = Vec::with_capacity(collection.features.len());

    for (position, raw) in collection.features.into_iter().enumerate() {
        let props = raw.properties.unwrap_or_default();
        let Some(region_id) = props.townvill.as_ref().and_then(region_id) else {
            warn!("skipping feature {position} for {date}: missing townvill");
            continue;
        };
        let geometry = match raw.geometry.map(serde_json::from_value::<Geometry>) {
            Some(Ok(geometry)) => geometry,
            Some(Err(err)) => {
                warn!("skipping feature {region_id} for {date}: {err}");
                continue;
            }
            None => {
                warn!("skipping feature {region_id} for {date}: missing geometry");
                continue;
            }
        };

        let actual_cases = props.case_lag_future_14.unwrap_or(0.0);
        features.push(RegionFeature {
            region_id,
            name: props.town,
            date: props.date.unwrap_or_else(|| date.to_string()),
            actual_case: actual_cases > 0.0,
            actual_cases,
            predicted_binary: flag(props.predicted_case_lag_future_14_binary),
            predicted_probability: props.predicted_case_lag_future_14.unwrap_or(0.0),
            predicted_percentage: props.predicted_case_lag_future_14_percentage.unwrap_or(0.0),
            geometry,
        });
    }

    debug!("decoded {} features for {date}", features.len());
    Ok(Dataset {
        date: date.to_string(),
        features,
    })
}

#[derive(Debug, Clone, Deserialize)]
pub struct PointRecord {
    pub date: String,
    pub latitude: f64,
    pub longitude: f64,
    #[serde(default)]
    pub case_lag_future_14: Option<f64>,
    #[serde(default)]
    pub predicted_case_lag_future_14_binary: Option<f64>,
}

/// Buckets flat records by the calendar part of their ISO-8601 timestamp.
pub fn group_point_records(records: Vec<PointRecord>) -> BTreeMap<String, Vec<RegionFeature>> {
    let mut grouped: BTreeMap<String, Vec<RegionFeature>> = BTreeMap::new();
    for record in records {
        let day = record
            .date
            .split('T')
            .next()
            .unwrap_or_default()
            .trim()
            .to_string();
        if day.is_empty() {
            continue;
        }
        let actual_cases = record.case_lag_future_14.unwrap_or(0.0);
        let mut feature = RegionFeature::new(
            format!("{:.5},{:.5}", record.latitude, record.longitude),
            day.clone(),
            Geometry::point(record.latitude, record.longitude),
        );
        feature.actual_case = actual_cases > 0.0;
        feature.actual_cases = actual_cases;
        feature.predicted_binary = flag(record.predicted_case_lag_future_14_binary);
        grouped.entry(day).or_default().push(feature);
    }
    grouped
}

fn region_id(value: &Value) -> Option<String> {
    match value {
        Value::String(id) if !id.trim().is_empty() => Some(id.trim().to_string()),
        Value::Number(id) => match id.as_f64() {
            Some(float) if id.is_f64() && float.is_finite() && float.fract() == 0.0 => {
                Some(format!("{float:.0}"))
            }
            _ => Some(id.to_string()),
        },
        _ => None,
    }
}

fn flag(value: Option<f64>) -> bool {
    value.is_some_and(|value| value > 0.0)
}
