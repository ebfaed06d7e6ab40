use serde::Serialize;

use super::types::AnnualProjection;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageSummary {
    pub stage: String,
    pub years: u32,
    pub final_balance: f64,
    pub total_flow: f64,
    pub total_growth: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalancePoint {
    pub age: i32,
    pub stage: String,
    pub balance: f64,
}

/// Per-stage totals in order of first appearance. Records without flow or
/// growth detail (cumulative policy) contribute zero to those totals.
pub fn stage_summaries(years: &[AnnualProjection]) -> Vec<StageSummary> {
    let mut summaries: Vec<StageSummary> = Vec::new();
    for year in years {
        let index = match summaries.iter().position(|s| s.stage == year.stage) {
            Some(index) => index,
            None => {
                summaries.push(StageSummary {
                    stage: year.stage.clone(),
                    years: 0,
                    final_balance: 0.0,
                    total_flow: 0.0,
                    total_growth: 0.0,
                });
                summaries.len() - 1
            }
        };
        let summary = &mut summaries[index];
        summary.years += 1;
        summary.final_balance = year.end_balance;
        summary.total_flow += year.annual_flow.unwrap_or(0.0);
        summary.total_growth += year.total_growth.unwrap_or(0.0);
    }
    summaries
}

pub fn find_summary<'a>(summaries: &'a [StageSummary], stage: &str) -> Option<&'a StageSummary> {
    summaries.iter().find(|s| s.stage == stage)
}

pub fn balance_series(years: &[AnnualProjection], age_today: i32) -> Vec<BalancePoint> {
    years
        .iter()
        .enumerate()
        .map(|(index, year)| BalancePoint {
            age: age_today + index as i32,
            stage: year.stage.clone(),
            balance: year.end_balance,
        })
        .collect()
}

/// Mean monthly flow across every year outside `accumulation_stage`.
pub fn average_monthly_withdrawal(years: &[AnnualProjection], accumulation_stage: &str) -> f64 {
    let (count, total) = years
        .iter()
        .filter(|y| y.stage != accumulation_stage)
        .fold((0usize, 0.0), |(count, total), y| {
            (count + 1, total + y.annual_flow.unwrap_or(0.0))
        });
    if count == 0 {
        0.0
    } else {
        total / count as f64 / 12.0
    }
}
