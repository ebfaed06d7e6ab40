use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use clap::{Parser, ValueEnum};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    BalancePoint, FullProjection, IndustryRanges, InflationAdjustment, NO_GO, PRE_RETIREMENT,
    Perspective, PhaseYears, ProjectionError, RetirementPlan, Stage, StageSummary, assemble,
    average_monthly_withdrawal, balance_series, find_summary, recommendations, stage_summaries,
};

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliAdjustment {
    PostHoc,
    Cumulative,
}

impl From<CliAdjustment> for InflationAdjustment {
    fn from(value: CliAdjustment) -> Self {
        match value {
            CliAdjustment::PostHoc => InflationAdjustment::PostHoc,
            CliAdjustment::Cumulative => InflationAdjustment::Cumulative,
        }
    }
}

impl From<InflationAdjustment> for CliAdjustment {
    fn from(value: InflationAdjustment) -> Self {
        match value {
            InflationAdjustment::PostHoc => CliAdjustment::PostHoc,
            InflationAdjustment::Cumulative => CliAdjustment::Cumulative,
        }
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
enum CliPerspective {
    Raw,
    InflationAdjusted,
}

impl From<CliPerspective> for Perspective {
    fn from(value: CliPerspective) -> Self {
        match value {
            CliPerspective::Raw => Perspective::Raw,
            CliPerspective::InflationAdjusted => Perspective::InflationAdjusted,
        }
    }
}

impl From<Perspective> for CliPerspective {
    fn from(value: Perspective) -> Self {
        match value {
            Perspective::Raw => CliPerspective::Raw,
            Perspective::InflationAdjusted => CliPerspective::InflationAdjusted,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ProjectPayload {
    age_today: Option<i32>,
    age_retirement: Option<i32>,
    life_expectancy: Option<i32>,
    annual_income: Option<f64>,
    income_replacement_go_go: Option<f64>,
    income_replacement_slow_go: Option<f64>,
    income_replacement_no_go: Option<f64>,
    current_balance: Option<f64>,
    annual_raises: Option<f64>,
    savings_rate: Option<f64>,
    growth_rate_pre_retirement: Option<f64>,
    growth_rate_intra_retirement: Option<f64>,
    annual_inflation: Option<f64>,
    go_go_end_age: Option<i32>,
    slow_go_end_age: Option<i32>,

    adjustment: Option<InflationAdjustment>,
    perspective: Option<Perspective>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssemblePayload {
    stages: Vec<Stage>,
    #[serde(default)]
    starting_balance: f64,
    #[serde(default)]
    inflation_rate: f64,
    #[serde(default)]
    adjustment: InflationAdjustment,
}

#[derive(Parser, Debug)]
#[command(
    name = "glidepath",
    about = "Multi-stage compound growth projection for retirement planning"
)]
struct Cli {
    #[arg(long, default_value_t = 25)]
    age_today: i32,
    #[arg(long, default_value_t = 60)]
    age_retirement: i32,
    #[arg(long, default_value_t = 90, help = "Age the plan funds through")]
    life_expectancy: i32,
    #[arg(long, default_value_t = 100_000.0)]
    annual_income: f64,
    #[arg(
        long,
        default_value_t = 125.0,
        help = "Go-Go spending as percent of income at retirement"
    )]
    income_replacement_go_go: f64,
    #[arg(
        long,
        default_value_t = 100.0,
        help = "Slow-Go spending as percent of income at retirement"
    )]
    income_replacement_slow_go: f64,
    #[arg(
        long,
        default_value_t = 75.0,
        help = "No-Go spending as percent of income at retirement"
    )]
    income_replacement_no_go: f64,
    #[arg(long, default_value_t = 10_000.0)]
    current_balance: f64,
    #[arg(long, default_value_t = 1.0, help = "Annual raise in percent")]
    annual_raises: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Percent of income contributed before retirement"
    )]
    savings_rate: f64,
    #[arg(long, default_value_t = 8.0, help = "Pre-retirement growth in percent")]
    growth_rate_pre_retirement: f64,
    #[arg(long, default_value_t = 4.0, help = "Intra-retirement growth in percent")]
    growth_rate_intra_retirement: f64,
    #[arg(long, default_value_t = 2.5, help = "Annual inflation in percent")]
    annual_inflation: f64,
    #[arg(long, help = "Age the Go-Go stage ends; requires --slow-go-end-age")]
    go_go_end_age: Option<i32>,
    #[arg(long, help = "Age the Slow-Go stage ends; requires --go-go-end-age")]
    slow_go_end_age: Option<i32>,
    #[arg(
        long,
        value_enum,
        default_value_t = CliAdjustment::PostHoc,
        help = "Inflation adjustment: post-hoc position deflation or cumulative per-year factor"
    )]
    adjustment: CliAdjustment,
    #[arg(
        long,
        value_enum,
        default_value_t = CliPerspective::Raw,
        help = "Which sequence the summaries and balance series are read from"
    )]
    perspective: CliPerspective,
}

#[derive(Debug)]
struct ApiRequest {
    plan: RetirementPlan,
    adjustment: InflationAdjustment,
    perspective: Perspective,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ProjectResponse {
    adjustment: InflationAdjustment,
    perspective: Perspective,
    phase_years: PhaseYears,
    stages: Vec<Stage>,
    projection: FullProjection,
    summaries: Vec<StageSummary>,
    balance_series: Vec<BalancePoint>,
    final_balance: f64,
    average_monthly_withdrawal: f64,
    recommendations: Vec<String>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

const MAX_AGE: i32 = 150;

fn build_plan(cli: &Cli) -> Result<RetirementPlan, String> {
    for (name, value) in [
        ("--annual-income", cli.annual_income),
        ("--income-replacement-go-go", cli.income_replacement_go_go),
        ("--income-replacement-slow-go", cli.income_replacement_slow_go),
        ("--income-replacement-no-go", cli.income_replacement_no_go),
        ("--current-balance", cli.current_balance),
        ("--annual-raises", cli.annual_raises),
        ("--savings-rate", cli.savings_rate),
        ("--growth-rate-pre-retirement", cli.growth_rate_pre_retirement),
        ("--growth-rate-intra-retirement", cli.growth_rate_intra_retirement),
        ("--annual-inflation", cli.annual_inflation),
    ] {
        if !value.is_finite() {
            return Err(format!("{name} must be a finite number"));
        }
    }

    if cli.age_today < 0 {
        return Err("--age-today must be >= 0".to_string());
    }

    if cli.age_retirement < cli.age_today {
        return Err("--age-retirement must be >= --age-today".to_string());
    }

    if cli.life_expectancy < cli.age_retirement {
        return Err("--life-expectancy must be >= --age-retirement".to_string());
    }

    if cli.life_expectancy > MAX_AGE {
        return Err(format!("--life-expectancy must be <= {MAX_AGE}"));
    }

    if cli.annual_income < 0.0 {
        return Err("--annual-income must be >= 0".to_string());
    }

    if !(0.0..=100.0).contains(&cli.savings_rate) {
        return Err("--savings-rate must be between 0 and 100".to_string());
    }

    for (name, rate) in [
        ("--income-replacement-go-go", cli.income_replacement_go_go),
        ("--income-replacement-slow-go", cli.income_replacement_slow_go),
        ("--income-replacement-no-go", cli.income_replacement_no_go),
    ] {
        if rate < 0.0 {
            return Err(format!("{name} must be >= 0"));
        }
    }

    for (name, rate) in [
        ("--growth-rate-pre-retirement", cli.growth_rate_pre_retirement),
        ("--growth-rate-intra-retirement", cli.growth_rate_intra_retirement),
        ("--annual-raises", cli.annual_raises),
    ] {
        if rate <= -100.0 {
            return Err(format!("{name} must be > -100"));
        }
    }

    let total_years = (cli.life_expectancy - cli.age_today) as usize;
    if total_years > 0 && 1.0 + (total_years - 1) as f64 * cli.annual_inflation / 100.0 <= 0.0 {
        return Err(format!(
            "--annual-inflation must keep the deflator positive over {total_years} years"
        ));
    }

    let boundary_override = match (cli.go_go_end_age, cli.slow_go_end_age) {
        (None, None) => None,
        (Some(first), Some(second)) => {
            if second < first {
                return Err("--slow-go-end-age must be >= --go-go-end-age".to_string());
            }
            Some([first, second])
        }
        _ => {
            return Err(
                "--go-go-end-age and --slow-go-end-age must be given together".to_string(),
            );
        }
    };

    Ok(RetirementPlan {
        age_today: cli.age_today,
        age_retirement: cli.age_retirement,
        life_expectancy: cli.life_expectancy,
        annual_income: cli.annual_income,
        income_replacement_go_go: cli.income_replacement_go_go,
        income_replacement_slow_go: cli.income_replacement_slow_go,
        income_replacement_no_go: cli.income_replacement_no_go,
        current_balance: cli.current_balance,
        annual_raises: cli.annual_raises,
        savings_rate: cli.savings_rate,
        growth_rate_pre_retirement: cli.growth_rate_pre_retirement,
        growth_rate_intra_retirement: cli.growth_rate_intra_retirement,
        annual_inflation: cli.annual_inflation,
        boundary_override,
    })
}

/// Parses the process arguments, projects the plan and renders the response as JSON.
pub fn run_cli() -> Result<String, String> {
    let cli = Cli::parse();
    let plan = build_plan(&cli)?;
    let response = build_project_response(&plan, cli.adjustment.into(), cli.perspective.into())
        .map_err(|e| e.to_string())?;
    serde_json::to_string_pretty(&response).map_err(|e| format!("Failed to render JSON: {e}"))
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/project",
            get(project_get_handler).post(project_post_handler),
        )
        .route("/api/assemble", post(assemble_handler))
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    info!("glidepath HTTP API listening on http://{addr}");
    info!("Local access: http://127.0.0.1:{port}/api/project");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn project_get_handler(Query(payload): Query<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

async fn project_post_handler(Json(payload): Json<ProjectPayload>) -> Response {
    project_handler_impl(payload)
}

fn project_handler_impl(payload: ProjectPayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    match build_project_response(&request.plan, request.adjustment, request.perspective) {
        Ok(response) => json_response(StatusCode::OK, response),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

async fn assemble_handler(Json(payload): Json<AssemblePayload>) -> Response {
    assemble_response(payload)
}

fn assemble_response(payload: AssemblePayload) -> Response {
    debug!(
        "assemble request: {} stages, {:?}",
        payload.stages.len(),
        payload.adjustment
    );
    match assemble(
        &payload.stages,
        payload.starting_balance,
        payload.inflation_rate,
        payload.adjustment,
    ) {
        Ok(projection) => json_response(StatusCode::OK, projection),
        Err(e) => error_response(StatusCode::BAD_REQUEST, &e.to_string()),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response.headers_mut().insert(
        header::CACHE_CONTROL,
        "no-store".parse().expect("valid header"),
    );
    response
}

fn error_response(status: StatusCode, msg: &str) -> Response {
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
        },
    )
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<ProjectPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

fn api_request_from_payload(payload: ProjectPayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.age_today {
        cli.age_today = v;
    }
    if let Some(v) = payload.age_retirement {
        cli.age_retirement = v;
    }
    if let Some(v) = payload.life_expectancy {
        cli.life_expectancy = v;
    }
    if let Some(v) = payload.annual_income {
        cli.annual_income = v;
    }
    if let Some(v) = payload.income_replacement_go_go {
        cli.income_replacement_go_go = v;
    }
    if let Some(v) = payload.income_replacement_slow_go {
        cli.income_replacement_slow_go = v;
    }
    if let Some(v) = payload.income_replacement_no_go {
        cli.income_replacement_no_go = v;
    }
    if let Some(v) = payload.current_balance {
        cli.current_balance = v;
    }
    if let Some(v) = payload.annual_raises {
        cli.annual_raises = v;
    }
    if let Some(v) = payload.savings_rate {
        cli.savings_rate = v;
    }
    if let Some(v) = payload.growth_rate_pre_retirement {
        cli.growth_rate_pre_retirement = v;
    }
    if let Some(v) = payload.growth_rate_intra_retirement {
        cli.growth_rate_intra_retirement = v;
    }
    if let Some(v) = payload.annual_inflation {
        cli.annual_inflation = v;
    }
    if let Some(v) = payload.go_go_end_age {
        cli.go_go_end_age = Some(v);
    }
    if let Some(v) = payload.slow_go_end_age {
        cli.slow_go_end_age = Some(v);
    }
    if let Some(v) = payload.adjustment {
        cli.adjustment = v.into();
    }
    if let Some(v) = payload.perspective {
        cli.perspective = v.into();
    }

    let plan = build_plan(&cli)?;
    Ok(ApiRequest {
        plan,
        adjustment: cli.adjustment.into(),
        perspective: cli.perspective.into(),
    })
}

fn default_cli_for_api() -> Cli {
    let plan = RetirementPlan::default();
    Cli {
        age_today: plan.age_today,
        age_retirement: plan.age_retirement,
        life_expectancy: plan.life_expectancy,
        annual_income: plan.annual_income,
        income_replacement_go_go: plan.income_replacement_go_go,
        income_replacement_slow_go: plan.income_replacement_slow_go,
        income_replacement_no_go: plan.income_replacement_no_go,
        current_balance: plan.current_balance,
        annual_raises: plan.annual_raises,
        savings_rate: plan.savings_rate,
        growth_rate_pre_retirement: plan.growth_rate_pre_retirement,
        growth_rate_intra_retirement: plan.growth_rate_intra_retirement,
        annual_inflation: plan.annual_inflation,
        go_go_end_age: None,
        slow_go_end_age: None,
        adjustment: CliAdjustment::PostHoc,
        perspective: CliPerspective::Raw,
    }
}

fn build_project_response(
    plan: &RetirementPlan,
    adjustment: InflationAdjustment,
    perspective: Perspective,
) -> Result<ProjectResponse, ProjectionError> {
    let projection = plan.project(adjustment)?;
    let years = projection.view(perspective).unwrap_or_default();

    let summaries = stage_summaries(years);
    let final_balance = find_summary(&summaries, NO_GO)
        .map(|s| s.final_balance)
        .unwrap_or(0.0);
    let series = balance_series(years, plan.age_today);
    let average_withdrawal = average_monthly_withdrawal(years, PRE_RETIREMENT);
    let recs = recommendations(plan, final_balance, &IndustryRanges::default());

    Ok(ProjectResponse {
        adjustment,
        perspective,
        phase_years: plan.phase_years(),
        stages: plan.stages(),
        summaries,
        balance_series: series,
        final_balance,
        average_monthly_withdrawal: average_withdrawal,
        recommendations: recs,
        projection,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-6;

    fn assert_approx(actual: f64, expected: f64) {
        assert!(
            (actual - expected).abs() <= EPS,
            "expected {expected}, got {actual}"
        );
    }

    fn sample_cli() -> Cli {
        default_cli_for_api()
    }

    #[test]
    fn default_cli_matches_clap_defaults() {
        let parsed = Cli::try_parse_from(["glidepath"]).expect("defaults parse");
        let plan_from_args = build_plan(&parsed).expect("valid defaults");
        let plan_from_api = build_plan(&sample_cli()).expect("valid defaults");
        assert_eq!(plan_from_args, plan_from_api);
        assert_eq!(plan_from_api, RetirementPlan::default());
        assert_eq!(parsed.adjustment, CliAdjustment::PostHoc);
        assert_eq!(parsed.perspective, CliPerspective::Raw);
    }

    #[test]
    fn cli_parses_policy_and_boundary_flags() {
        let parsed = Cli::try_parse_from([
            "glidepath",
            "--adjustment",
            "cumulative",
            "--perspective",
            "inflation-adjusted",
            "--go-go-end-age",
            "70",
            "--slow-go-end-age",
            "80",
        ])
        .expect("flags parse");
        assert_eq!(parsed.adjustment, CliAdjustment::Cumulative);
        assert_eq!(parsed.perspective, CliPerspective::InflationAdjusted);

        let plan = build_plan(&parsed).expect("valid plan");
        assert_eq!(plan.boundary_override, Some([70, 80]));
    }

    #[test]
    fn build_plan_rejects_retirement_before_today() {
        let mut cli = sample_cli();
        cli.age_today = 61;
        let err = build_plan(&cli).expect_err("must reject retirement in the past");
        assert!(err.contains("--age-retirement"));
    }

    #[test]
    fn build_plan_rejects_life_expectancy_before_retirement() {
        let mut cli = sample_cli();
        cli.life_expectancy = 59;
        let err = build_plan(&cli).expect_err("must reject short life expectancy");
        assert!(err.contains("--life-expectancy"));
    }

    #[test]
    fn build_plan_rejects_non_finite_rates() {
        let mut cli = sample_cli();
        cli.annual_inflation = f64::NAN;
        let err = build_plan(&cli).expect_err("must reject NaN inflation");
        assert!(err.contains("--annual-inflation"));
    }

    #[test]
    fn build_plan_rejects_invalid_savings_rate() {
        let mut cli = sample_cli();
        cli.savings_rate = 120.0;
        let err = build_plan(&cli).expect_err("must reject savings above 100%");
        assert!(err.contains("--savings-rate"));
    }

    #[test]
    fn build_plan_requires_both_boundaries() {
        let mut cli = sample_cli();
        cli.go_go_end_age = Some(70);
        let err = build_plan(&cli).expect_err("must require both boundaries");
        assert!(err.contains("--slow-go-end-age"));

        cli.slow_go_end_age = Some(65);
        let err = build_plan(&cli).expect_err("must reject reversed boundaries");
        assert!(err.contains("--slow-go-end-age must be >="));
    }

    #[test]
    fn api_request_from_json_parses_web_keys() {
        let json = r#"{
          "ageToday": 30,
          "ageRetirement": 62,
          "lifeExpectancy": 88,
          "annualIncome": 85000,
          "incomeReplacementGoGo": 110,
          "currentBalance": 25000,
          "annualRaises": 2,
          "savingsRate": 18,
          "growthRatePreRetirement": 7,
          "annualInflation": 3,
          "goGoEndAge": 72,
          "slowGoEndAge": 80,
          "adjustment": "cumulative",
          "perspective": "inflation-adjusted"
        }"#;
        let request = api_request_from_json(json).expect("json should parse");
        let plan = request.plan;

        assert_eq!(plan.age_today, 30);
        assert_eq!(plan.age_retirement, 62);
        assert_eq!(plan.life_expectancy, 88);
        assert_approx(plan.annual_income, 85_000.0);
        assert_approx(plan.income_replacement_go_go, 110.0);
        assert_approx(plan.income_replacement_slow_go, 100.0);
        assert_approx(plan.current_balance, 25_000.0);
        assert_approx(plan.annual_raises, 2.0);
        assert_approx(plan.savings_rate, 18.0);
        assert_approx(plan.growth_rate_pre_retirement, 7.0);
        assert_approx(plan.growth_rate_intra_retirement, 4.0);
        assert_approx(plan.annual_inflation, 3.0);
        assert_eq!(plan.boundary_override, Some([72, 80]));
        assert_eq!(request.adjustment, InflationAdjustment::Cumulative);
        assert_eq!(request.perspective, Perspective::InflationAdjusted);
    }

    #[test]
    fn build_plan_caps_life_expectancy() {
        let mut cli = sample_cli();
        cli.life_expectancy = MAX_AGE;
        assert!(build_plan(&cli).is_ok());

        let err = api_request_from_json(r#"{ "lifeExpectancy": 2000000000 }"#)
            .expect_err("absurd life expectancy must fail");
        assert!(err.contains("--life-expectancy must be <="));
    }

    #[test]
    fn build_plan_rejects_deflation_past_zero() {
        // 65 projected years at -5% would drive 1 + 64 * -0.05 below zero.
        let err = api_request_from_json(r#"{ "annualInflation": -5 }"#)
            .expect_err("deflator must stay positive");
        assert!(err.contains("--annual-inflation"));

        let mut cli = sample_cli();
        cli.annual_inflation = -1.0;
        let plan = build_plan(&cli).expect("mild deflation is fine");
        let projection = plan.project(InflationAdjustment::PostHoc).expect("projects");
        let adjusted = projection.inflation_adjusted.expect("adjusted filled");
        assert!(adjusted.iter().all(|y| y.end_balance.is_finite()));
    }

    #[test]
    fn assemble_rejects_oversized_stages_with_bad_request() {
        let json = r#"{
          "stages": [
            { "name": "Forever", "growthRate": 5, "years": 2147483647, "monthlyFlow": 100, "escalationRate": 0 }
          ]
        }"#;
        let payload = serde_json::from_str::<AssemblePayload>(json).expect("json should parse");
        let response = assemble_response(payload);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);

        let json = r#"{
          "stages": [
            { "name": "Save", "growthRate": 5, "years": 30, "monthlyFlow": 100, "escalationRate": 0 }
          ],
          "inflationRate": -10
        }"#;
        let payload = serde_json::from_str::<AssemblePayload>(json).expect("json should parse");
        let response = assemble_response(payload);
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_request_from_json_rejects_bad_policy_name() {
        let err = api_request_from_json(r#"{ "adjustment": "compound" }"#)
            .expect_err("unknown policy must fail");
        assert!(err.contains("Invalid API JSON payload"));
    }

    #[test]
    fn project_response_serialization_contains_expected_fields() {
        let plan = build_plan(&sample_cli()).expect("valid plan");
        let response =
            build_project_response(&plan, InflationAdjustment::PostHoc, Perspective::Raw)
                .expect("projection succeeds");
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"adjustment\":\"post-hoc\""));
        assert!(json.contains("\"perspective\":\"raw\""));
        assert!(json.contains("\"inflation-adjusted\""));
        assert!(json.contains("\"phaseYears\""));
        assert!(json.contains("\"balanceSeries\""));
        assert!(json.contains("\"averageMonthlyWithdrawal\""));
        assert!(json.contains("\"annualFlow\""));
        assert!(json.contains("\"totalGrowth\""));
        assert!(!json.contains("\"inflationFactor\""));
    }

    #[test]
    fn project_response_reads_the_selected_perspective() {
        let plan = build_plan(&sample_cli()).expect("valid plan");
        let raw = build_project_response(&plan, InflationAdjustment::PostHoc, Perspective::Raw)
            .expect("projection succeeds");
        let real = build_project_response(
            &plan,
            InflationAdjustment::PostHoc,
            Perspective::InflationAdjusted,
        )
        .expect("projection succeeds");

        assert_eq!(raw.balance_series.len(), 65);
        assert_eq!(raw.balance_series[0].age, 25);
        assert_approx(raw.summaries[0].final_balance, raw.balance_series[34].balance);
        assert!(real.summaries[0].final_balance < raw.summaries[0].final_balance);
        assert!(raw.average_monthly_withdrawal < 0.0);
    }

    #[test]
    fn cumulative_response_omits_flow_detail() {
        let plan = build_plan(&sample_cli()).expect("valid plan");
        let response =
            build_project_response(&plan, InflationAdjustment::Cumulative, Perspective::Raw)
                .expect("projection succeeds");
        let json = serde_json::to_string(&response).expect("response should serialize");

        assert!(json.contains("\"adjustment\":\"cumulative\""));
        assert!(json.contains("\"inflationFactor\""));
        assert!(!json.contains("\"annualFlow\""));
        assert_approx(response.average_monthly_withdrawal, 0.0);
    }

    #[test]
    fn assemble_payload_defaults_optional_fields() {
        let json = r#"{
          "stages": [
            { "name": "Grow", "growthRate": 10, "years": 2, "monthlyFlow": 100, "escalationRate": 0 }
          ],
          "startingBalance": 1000
        }"#;
        let payload = serde_json::from_str::<AssemblePayload>(json).expect("json should parse");
        assert_eq!(payload.adjustment, InflationAdjustment::PostHoc);
        assert_approx(payload.inflation_rate, 0.0);

        let projection = assemble(
            &payload.stages,
            payload.starting_balance,
            payload.inflation_rate,
            payload.adjustment,
        )
        .expect("valid stages");
        let raw = projection.raw.expect("raw filled");
        assert_approx(raw[1].end_balance, 3_982.0);
    }
}
