//! Geographic bounds check for latitude/longitude columns.

use super::{absent_columns, percent, quote_list};
use crate::core::{scalar_count, Check, Dataset, Finding, TABLE_NAME};
use crate::prelude::*;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tracing::instrument;

/// An inclusive latitude/longitude bounding box.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RegionBounds {
    /// Human-readable region name
    pub name: &'static str,
    /// Southern edge
    pub min_latitude: f64,
    /// Northern edge
    pub max_latitude: f64,
    /// Western edge
    pub min_longitude: f64,
    /// Eastern edge
    pub max_longitude: f64,
}

impl RegionBounds {
    /// Bounding box around the Hawaiian islands.
    pub const HAWAII: RegionBounds = RegionBounds {
        name: "Hawaii",
        min_latitude: 18.0,
        max_latitude: 23.0,
        min_longitude: -161.0,
        max_longitude: -154.0,
    };

    /// Looks up the bounds for a region code.
    pub fn for_region(code: &str) -> Option<RegionBounds> {
        match code.to_ascii_uppercase().as_str() {
            "HI" => Some(Self::HAWAII),
            _ => None,
        }
    }

    /// Returns true if the point lies inside the box, edges included.
    pub fn contains(&self, latitude: f64, longitude: f64) -> bool {
        (self.min_latitude..=self.max_latitude).contains(&latitude)
            && (self.min_longitude..=self.max_longitude).contains(&longitude)
    }
}

fn default_latitude() -> String {
    "Latitude".to_string()
}

fn default_longitude() -> String {
    "Longitude".to_string()
}

fn default_region() -> String {
    "HI".to_string()
}

/// Checks that coordinates fall inside a region's bounding box.
///
/// A row is valid only when both coordinates parse and lie inside the box;
/// rows with a missing coordinate are also reported on their own.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CoordinateCheck {
    /// Latitude column name
    #[serde(default = "default_latitude")]
    pub latitude: String,
    /// Longitude column name
    #[serde(default = "default_longitude")]
    pub longitude: String,
    /// Region code, e.g. `HI`
    #[serde(default = "default_region")]
    pub region: String,
}

impl Default for CoordinateCheck {
    fn default() -> Self {
        Self {
            latitude: default_latitude(),
            longitude: default_longitude(),
            region: default_region(),
        }
    }
}

impl CoordinateCheck {
    /// Creates a check on the default `Latitude`/`Longitude` columns.
    pub fn new(region: impl Into<String>) -> Self {
        Self {
            region: region.into(),
            ..Self::default()
        }
    }
}

#[async_trait]
impl Check for CoordinateCheck {
    #[instrument(skip(self, dataset), fields(dataset = %dataset.name(), region = %self.region))]
    async fn evaluate(&self, dataset: &Dataset) -> Result<Vec<Finding>> {
        let required = [self.latitude.clone(), self.longitude.clone()];
        let absent = absent_columns(dataset, &required);
        if !absent.is_empty() {
            return Ok(vec![Finding::info(
                self.name(),
                format!(
                    "Coordinate check skipped: column(s) {} not present",
                    quote_list(absent)
                ),
            )]);
        }

        let Some(bounds) = RegionBounds::for_region(&self.region) else {
            return Ok(vec![Finding::warning(
                self.name(),
                format!("No coordinate bounds defined for region '{}'", self.region),
            )]);
        };

        let latitude = dataset.numeric_expr(&self.latitude)?;
        let longitude = dataset.numeric_expr(&self.longitude)?;
        let sql = format!(
            "SELECT COUNT(*) AS total_rows, \
             SUM(CASE WHEN lat IS NULL OR lon IS NULL THEN 1 ELSE 0 END) AS missing, \
             SUM(CASE WHEN lat >= {} AND lat <= {} AND lon >= {} AND lon <= {} \
                 THEN 1 ELSE 0 END) AS valid \
             FROM (SELECT {latitude} AS lat, {longitude} AS lon FROM {TABLE_NAME}) AS coords",
            bounds.min_latitude, bounds.max_latitude, bounds.min_longitude, bounds.max_longitude
        );
        let batches = dataset.query(&sql).await?;

        let total = scalar_count(&batches, "total_rows")?;
        let missing = scalar_count(&batches, "missing")?;
        let valid = scalar_count(&batches, "valid")?;
        let invalid = total.saturating_sub(valid);

        let mut findings = Vec::new();
        if invalid > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "{invalid} records with invalid {} coordinates ({:.1}%)",
                    bounds.name,
                    percent(invalid, total)
                ),
            ));
        }
        if missing > 0 {
            findings.push(Finding::warning(
                self.name(),
                format!(
                    "{missing} records with missing coordinates ({:.1}%)",
                    percent(missing, total)
                ),
            ));
        }
        findings.push(Finding::info(
            self.name(),
            format!("Valid coordinates: {valid} ({:.1}%)", percent(valid, total)),
        ));
        Ok(findings)
    }

    fn name(&self) -> &str {
        "coordinates"
    }
}
