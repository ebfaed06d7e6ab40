use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Which inflation-adjustment algorithm fills the `inflation-adjusted` slot.
#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum InflationAdjustment {
    /// Deflate the finished nominal sequence by `1 + i * rate`, keyed by position.
    #[default]
    #[serde(alias = "postHoc", alias = "post_hoc")]
    PostHoc,
    /// Run a second chain that divides each year by a running cumulative factor.
    Cumulative,
}

#[derive(Copy, Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Perspective {
    #[default]
    Raw,
    #[serde(alias = "inflationAdjusted", alias = "real")]
    InflationAdjusted,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stage {
    pub name: String,
    /// Percent per year, e.g. `7.0` for 7%.
    pub growth_rate: f64,
    /// Whole years; zero or negative projects nothing.
    pub years: i32,
    /// Positive contributes, negative withdraws.
    pub monthly_flow: f64,
    /// Percent per year applied to the annual flow before it is added.
    pub escalation_rate: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AnnualProjection {
    pub year: u32,
    pub stage: String,
    pub start_balance: f64,
    pub end_balance: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub annual_flow: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_growth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub inflation_factor: Option<f64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FullProjection {
    pub raw: Option<Vec<AnnualProjection>>,
    #[serde(rename = "inflation-adjusted")]
    pub inflation_adjusted: Option<Vec<AnnualProjection>>,
}

impl FullProjection {
    pub fn view(&self, perspective: Perspective) -> Option<&[AnnualProjection]> {
        match perspective {
            Perspective::Raw => self.raw.as_deref(),
            Perspective::InflationAdjusted => self.inflation_adjusted.as_deref(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("{field} must be a finite number, got {value}{}", stage_suffix(.stage))]
    NonFinite {
        field: &'static str,
        stage: Option<String>,
        value: f64,
    },
    #[error("{years} projected years exceed the limit of {limit}{}", stage_suffix(.stage))]
    TooManyYears {
        years: usize,
        limit: usize,
        stage: Option<String>,
    },
    #[error(
        "inflation rate {inflation_rate}% drives the deflator to {factor} by year {years}; it must stay positive"
    )]
    DeflatorNotPositive {
        inflation_rate: f64,
        years: usize,
        factor: f64,
    },
}

/// Longest run, in years, a single stage or a whole projection may cover.
pub const MAX_PROJECTION_YEARS: usize = 500;

fn stage_suffix(stage: &Option<String>) -> String {
    match stage {
        Some(name) => format!(" (stage \"{name}\")"),
        None => String::new(),
    }
}

pub(crate) fn ensure_finite(
    field: &'static str,
    value: f64,
    stage: Option<&str>,
) -> Result<(), ProjectionError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ProjectionError::NonFinite {
            field,
            stage: stage.map(str::to_string),
            value,
        })
    }
}

pub(crate) fn ensure_year_limit(years: usize, stage: Option<&str>) -> Result<(), ProjectionError> {
    if years <= MAX_PROJECTION_YEARS {
        Ok(())
    } else {
        Err(ProjectionError::TooManyYears {
            years,
            limit: MAX_PROJECTION_YEARS,
            stage: stage.map(str::to_string),
        })
    }
}

/// The last deflator `1 + (years - 1) * rate` applied over `years` years must be positive.
pub(crate) fn ensure_deflator_positive(
    years: usize,
    inflation_rate: f64,
) -> Result<(), ProjectionError> {
    if years == 0 {
        return Ok(());
    }
    let factor = 1.0 + (years - 1) as f64 * (inflation_rate / 100.0);
    if factor > 0.0 {
        Ok(())
    } else {
        Err(ProjectionError::DeflatorNotPositive {
            inflation_rate,
            years,
            factor,
        })
    }
}

impl Stage {
    pub(crate) fn validate(&self) -> Result<(), ProjectionError> {
        let name = Some(self.name.as_str());
        ensure_finite("growthRate", self.growth_rate, name)?;
        ensure_finite("monthlyFlow", self.monthly_flow, name)?;
        ensure_finite("escalationRate", self.escalation_rate, name)
    }

    /// Number of years the stage projects; negative durations behave like zero.
    pub fn duration(&self) -> u32 {
        self.years.max(0) as u32
    }
}
