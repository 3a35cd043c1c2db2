use crate::backend::RiskBackend;
use crate::errors::CatalogError;
use crate::models::DateSequence;
use chrono::NaiveDate;
use tracing::info;

/// Loads and validates the list of dates the timeline can show.
pub async fn load_dates(backend: &dyn RiskBackend) -> Result<DateSequence, CatalogError> {
    let raw = backend.fetch_dates().await?;

    let mut dates = Vec::with_capacity(raw.len());
    for value in raw {
        let trimmed = value.trim();
        let date = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .map_err(|_| CatalogError::InvalidDate { value: value.clone() })?;
        dates.push(date.format("%Y-%m-%d").to_string());
    }

    let sequence = DateSequence::new(dates);
    match (sequence.first(), sequence.last()) {
        (Some(first), Some(last)) => {
            info!("loaded {} dates ({first} to {last})", sequence.len())
        }
        _ => info!("date catalog is empty"),
    }
    Ok(sequence)
}
