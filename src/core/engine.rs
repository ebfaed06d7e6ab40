use log::{debug, trace};

use super::types::{
    AnnualProjection, FullProjection, InflationAdjustment, ProjectionError, Stage,
    ensure_deflator_positive, ensure_finite, ensure_year_limit,
};

/// Running deflator for the cumulative policy. Starts at 1.0 and grows by
/// `inflation_rate / 100` after every projected year, across stage boundaries.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CumulativeInflation {
    factor: f64,
    step: f64,
}

impl CumulativeInflation {
    pub fn new(inflation_rate: f64) -> Self {
        Self {
            factor: 1.0,
            step: inflation_rate / 100.0,
        }
    }

    pub fn factor(&self) -> f64 {
        self.factor
    }

    fn advance(&mut self) {
        self.factor += self.step;
    }
}

/// Projects one stage in nominal terms, numbering years from 1.
///
/// Each year the annual flow is escalated first (so year 1 already carries one
/// escalation step), then added to the balance, then the balance is grown.
/// `escalation_override` replaces the stage's own escalation rate when given.
pub fn project_stage(
    stage: &Stage,
    starting_balance: f64,
    escalation_override: Option<f64>,
) -> Result<Vec<AnnualProjection>, ProjectionError> {
    stage.validate()?;
    ensure_finite("startingBalance", starting_balance, Some(&stage.name))?;
    let escalation_rate = escalation_override.unwrap_or(stage.escalation_rate);
    ensure_finite("escalationOverride", escalation_rate, Some(&stage.name))?;
    ensure_year_limit(stage.duration() as usize, Some(&stage.name))?;

    Ok(nominal_years(stage, starting_balance, escalation_rate, 1))
}

/// Projects one stage with each year's balances divided by the running
/// cumulative inflation factor, numbering years from 1.
///
/// The loop compounds in nominal terms; only the recorded figures are deflated.
/// `inflation` is advanced once per year so it can be threaded through
/// consecutive stages.
pub fn project_stage_real(
    stage: &Stage,
    starting_balance: f64,
    inflation: &mut CumulativeInflation,
) -> Result<Vec<AnnualProjection>, ProjectionError> {
    stage.validate()?;
    ensure_finite("startingBalance", starting_balance, Some(&stage.name))?;
    ensure_finite("inflationRate", inflation.step * 100.0, Some(&stage.name))?;
    let duration = stage.duration();
    ensure_year_limit(duration as usize, Some(&stage.name))?;
    if duration > 0 {
        let last_factor = inflation.factor() + (duration - 1) as f64 * inflation.step;
        if last_factor <= 0.0 {
            return Err(ProjectionError::DeflatorNotPositive {
                inflation_rate: inflation.step * 100.0,
                years: duration as usize,
                factor: last_factor,
            });
        }
    }

    Ok(real_years(stage, starting_balance, inflation, 1))
}

/// Chains `stages` in order, seeding each stage with the previous stage's last
/// end balance, and fills both the raw and inflation-adjusted sequences.
pub fn assemble(
    stages: &[Stage],
    starting_balance: f64,
    inflation_rate: f64,
    adjustment: InflationAdjustment,
) -> Result<FullProjection, ProjectionError> {
    ensure_finite("startingBalance", starting_balance, None)?;
    ensure_finite("inflationRate", inflation_rate, None)?;
    for stage in stages {
        stage.validate()?;
        ensure_year_limit(stage.duration() as usize, Some(&stage.name))?;
    }
    let years = total_years(stages);
    ensure_year_limit(years, None)?;
    ensure_deflator_positive(years, inflation_rate)?;

    let (raw, inflation_adjusted) = match adjustment {
        InflationAdjustment::PostHoc => {
            let raw = chain_nominal(stages, starting_balance);
            let adjusted = deflate_post_hoc(&raw, inflation_rate);
            (raw, adjusted)
        }
        InflationAdjustment::Cumulative => {
            let raw = chain_real(stages, starting_balance, CumulativeInflation::new(0.0));
            let adjusted = chain_real(
                stages,
                starting_balance,
                CumulativeInflation::new(inflation_rate),
            );
            (raw, adjusted)
        }
    };

    debug!(
        "assembled {} stages into {} years ({adjustment:?}, inflation {inflation_rate}%)",
        stages.len(),
        raw.len()
    );

    Ok(FullProjection {
        raw: Some(raw),
        inflation_adjusted: Some(inflation_adjusted),
    })
}

fn total_years(stages: &[Stage]) -> usize {
    stages.iter().map(|s| s.duration() as usize).sum()
}

fn nominal_years(
    stage: &Stage,
    starting_balance: f64,
    escalation_rate: f64,
    first_year: u32,
) -> Vec<AnnualProjection> {
    let growth = 1.0 + stage.growth_rate / 100.0;
    let escalation = 1.0 + escalation_rate / 100.0;
    let duration = stage.duration();

    let mut years = Vec::with_capacity(duration as usize);
    let mut balance = starting_balance;
    let mut annual_flow = stage.monthly_flow * 12.0;

    for offset in 0..duration {
        let start_balance = balance;
        annual_flow *= escalation;
        balance += annual_flow;
        balance *= growth;

        years.push(AnnualProjection {
            year: first_year + offset,
            stage: stage.name.clone(),
            start_balance,
            end_balance: balance,
            annual_flow: Some(annual_flow),
            total_growth: Some(balance - start_balance - annual_flow),
            inflation_factor: None,
        });
    }

    years
}

fn real_years(
    stage: &Stage,
    starting_balance: f64,
    inflation: &mut CumulativeInflation,
    first_year: u32,
) -> Vec<AnnualProjection> {
    let growth = 1.0 + stage.growth_rate / 100.0;
    let escalation = 1.0 + stage.escalation_rate / 100.0;
    let duration = stage.duration();

    let mut years = Vec::with_capacity(duration as usize);
    let mut balance = starting_balance;
    let mut annual_flow = stage.monthly_flow * 12.0;

    for offset in 0..duration {
        let start_balance = balance;
        annual_flow *= escalation;
        balance += annual_flow;
        balance *= growth;

        let factor = inflation.factor();
        years.push(AnnualProjection {
            year: first_year + offset,
            stage: stage.name.clone(),
            start_balance: start_balance / factor,
            end_balance: balance / factor,
            annual_flow: None,
            total_growth: None,
            inflation_factor: Some(factor),
        });
        inflation.advance();
    }

    years
}

fn chain_nominal(stages: &[Stage], starting_balance: f64) -> Vec<AnnualProjection> {
    let mut all_years = Vec::with_capacity(total_years(stages));
    let mut balance = starting_balance;

    for stage in stages {
        let first_year = all_years.len() as u32 + 1;
        let projected = nominal_years(stage, balance, stage.escalation_rate, first_year);
        if let Some(last) = projected.last() {
            balance = last.end_balance;
        }
        trace!(
            "stage {:?}: {} nominal years, carrying {balance}",
            stage.name,
            projected.len()
        );
        all_years.extend(projected);
    }

    all_years
}

fn chain_real(
    stages: &[Stage],
    starting_balance: f64,
    mut inflation: CumulativeInflation,
) -> Vec<AnnualProjection> {
    let mut all_years = Vec::with_capacity(total_years(stages));
    let mut balance = starting_balance;

    for stage in stages {
        let first_year = all_years.len() as u32 + 1;
        let projected = real_years(stage, balance, &mut inflation, first_year);
        // Seeds from the recorded (already deflated) figure, not the nominal one.
        if let Some(last) = projected.last() {
            balance = last.end_balance;
        }
        trace!(
            "stage {:?}: {} real years, factor now {}",
            stage.name,
            projected.len(),
            inflation.factor()
        );
        all_years.extend(projected);
    }

    all_years
}

fn deflate_post_hoc(raw: &[AnnualProjection], inflation_rate: f64) -> Vec<AnnualProjection> {
    let rate = inflation_rate / 100.0;
    raw.iter()
        .enumerate()
        .map(|(index, year)| {
            let factor = 1.0 + index as f64 * rate;
            AnnualProjection {
                start_balance: year.start_balance / factor,
                end_balance: year.end_balance / factor,
                annual_flow: year.annual_flow.map(|v| v / factor),
                total_growth: year.total_growth.map(|v| v / factor),
                ..year.clone()
            }
        })
        .collect()
}
