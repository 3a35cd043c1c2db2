//! In-memory backend used by the unit tests.

use crate::backend::RiskBackend;
use crate::errors::{CatalogError, FetchError};
use crate::models::{Dataset, Geometry, RegionFeature};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;
use std::time::Duration;

#[derive(Default)]
pub struct FakeBackend {
    pub dates: Vec<String>,
    pub catalog_unavailable: bool,
    pub delays: HashMap<String, Duration>,
    pub failing: HashSet<String>,
    requests: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn with_dates(dates: &[&str]) -> Self {
        Self {
            dates: dates.iter().map(|d| d.to_string()).collect(),
            ..Self::default()
        }
    }

    pub fn unavailable() -> Self {
        Self {
            catalog_unavailable: true,
            ..Self::default()
        }
    }

    pub fn delay(mut self, date: &str, millis: u64) -> Self {
        self.delays
            .insert(date.to_string(), Duration::from_millis(millis));
        self
    }

    pub fn fail(mut self, date: &str) -> Self {
        self.failing.insert(date.to_string());
        self
    }

    pub fn requests(&self) -> Vec<String> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RiskBackend for FakeBackend {
    async fn fetch_dates(&self) -> Result<Vec<String>, CatalogError> {
        if self.catalog_unavailable {
            return Err(CatalogError::Status { status: 503 });
        }
        Ok(self.dates.clone())
    }

    async fn fetch_snapshot(&self, date: &str) -> Result<Dataset, FetchError> {
        self.requests.lock().unwrap().push(date.to_string());
        if let Some(delay) = self.delays.get(date) {
            tokio::time::sleep(*delay).await;
        }
        if self.failing.contains(date) {
            return Err(FetchError::Status {
                date: date.to_string(),
                status: 500,
            });
        }
        Ok(fixture_dataset(date))
    }
}

/// Three polygons: two with actual cases, one predicted positive.
pub fn fixture_dataset(date: &str) -> Dataset {
    let square = |x: f64| Geometry::Polygon {
        coordinates: vec![vec![
            vec![x, 22.9],
            vec![x + 0.01, 22.9],
            vec![x + 0.01, 22.91],
            vec![x, 22.9],
        ]],
    };

    let mut first = RegionFeature::new("R1", date, square(120.20));
    first.name = Some("東區".to_string());
    first.actual_case = true;
    first.actual_cases = 1.0;
    first.predicted_percentage = 55.0;
    first.predicted_probability = 0.55;

    let mut second = RegionFeature::new("R2", date, square(120.21));
    second.actual_case = true;
    second.actual_cases = 1.0;
    second.predicted_percentage = 25.0;
    second.predicted_probability = 0.25;

    let mut third = RegionFeature::new("R3", date, square(120.22));
    third.predicted_binary = true;
    third.predicted_percentage = 10.0;
    third.predicted_probability = 0.1;

    Dataset {
        date: date.to_string(),
        features: vec![first, second, third],
    }
}
