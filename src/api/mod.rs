pub mod normalize;
pub mod render;
pub mod snapshot;

use axum::{
    Router,
    extract::{Json, rejection::JsonRejection},
    http::{HeaderValue, StatusCode, header},
    response::{IntoResponse, Response},
    routing::post,
};
use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::PathBuf;
use tokio::net::TcpListener;

use crate::core::{
    Debt, DebtPayoff, PaymentPlan, PlanError, PlanLimits, Recommendation, ScheduleRow, Strategy,
    StrategyComparison, compare_strategies, compute_plan_with_limits, recommend_strategy,
};
use normalize::{FieldInput, RawDebt, normalize_debts, parse_amount, parse_debt_arg};
use snapshot::{PlanSnapshot, PlanSummary, load_snapshot, save_snapshot};

const MAX_HORIZON_MONTHS: u32 = 12_000;

#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum CliStrategy {
    #[value(alias = "snowball", alias = "smallest-balance-first")]
    Warrior,
    #[value(alias = "avalanche", alias = "highest-apr-first")]
    Rebel,
    #[value(alias = "interest-weighted-first")]
    Wizard,
}

impl From<CliStrategy> for Strategy {
    fn from(value: CliStrategy) -> Self {
        match value {
            CliStrategy::Warrior => Strategy::SmallestBalanceFirst,
            CliStrategy::Rebel => Strategy::HighestAprFirst,
            CliStrategy::Wizard => Strategy::InterestWeightedFirst,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    name = "payoff",
    about = "Credit card payoff planner (warrior, rebel and wizard strategies)",
    after_help = "Run `payoff serve [port]` to start the HTTP API instead."
)]
pub struct Cli {
    #[arg(
        long = "debt",
        value_name = "NAME:BALANCE:APR:MIN",
        help = "A debt as name, balance, APR in percent and minimum payment; repeatable"
    )]
    debts: Vec<String>,
    #[arg(long, help = "Total monthly budget for all debts")]
    budget: Option<String>,
    #[arg(long, value_enum, help = "Prioritization strategy; defaults to the recommended one")]
    strategy: Option<CliStrategy>,
    #[arg(long, conflicts_with = "recommend", help = "Compare all three strategies")]
    compare: bool,
    #[arg(long, help = "Recommend a strategy without simulating")]
    recommend: bool,
    #[arg(long, default_value_t = 24, help = "Schedule months to print")]
    months_shown: usize,
    #[arg(long, default_value_t = 1200, help = "Safety cap on simulated months")]
    max_months: u32,
    #[arg(long, help = "Print JSON instead of text")]
    json: bool,
    #[arg(long, value_name = "FILE", help = "Save inputs and summary after a successful plan")]
    save: Option<PathBuf>,
    #[arg(long, value_name = "FILE", help = "Load inputs from a saved snapshot")]
    load: Option<PathBuf>,
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum CliMode {
    Plan,
    Compare,
    Recommend,
}

#[derive(Debug)]
struct CliRequest {
    debts: Vec<Debt>,
    strategy: Option<Strategy>,
    budget: f64,
    limits: PlanLimits,
    mode: CliMode,
}

fn build_cli_request(cli: &Cli) -> Result<CliRequest, String> {
    let snapshot = match &cli.load {
        Some(path) => Some(
            load_snapshot(path).map_err(|e| format!("--load {}: {e}", path.display()))?,
        ),
        None => None,
    };

    let mut debts = cli
        .debts
        .iter()
        .enumerate()
        .map(|(index, arg)| parse_debt_arg(arg, index + 1))
        .collect::<Result<Vec<_>, _>>()?;
    if debts.is_empty() {
        if let Some(snapshot) = &snapshot {
            debts = snapshot.debts.clone();
        }
    }

    let mode = if cli.compare {
        CliMode::Compare
    } else if cli.recommend {
        CliMode::Recommend
    } else {
        CliMode::Plan
    };

    let budget = match (&cli.budget, &snapshot) {
        (Some(text), _) => parse_amount(text).map_err(|e| format!("--budget {e}"))?,
        (None, Some(snapshot)) => snapshot.monthly_budget,
        (None, None) if mode == CliMode::Recommend => 0.0,
        (None, None) => return Err("--budget is required".to_string()),
    };

    let strategy = cli
        .strategy
        .map(Strategy::from)
        .or_else(|| snapshot.as_ref().map(|snapshot| snapshot.strategy));

    Ok(CliRequest {
        debts,
        strategy,
        budget,
        limits: limits_with_max_months(cli.max_months)?,
        mode,
    })
}

fn limits_with_max_months(max_months: u32) -> Result<PlanLimits, String> {
    if !(1..=MAX_HORIZON_MONTHS).contains(&max_months) {
        return Err(format!(
            "max months must be between 1 and {MAX_HORIZON_MONTHS}"
        ));
    }
    Ok(PlanLimits {
        max_months,
        ..PlanLimits::default()
    })
}

/// Falls back to the advisor's pick, then to the interest-weighted order when
/// the advisor has nothing to go on (the engine reports that failure itself).
fn resolve_strategy(requested: Option<Strategy>, debts: &[Debt]) -> Strategy {
    requested.unwrap_or_else(|| {
        recommend_strategy(debts)
            .map(|rec| rec.strategy)
            .unwrap_or(Strategy::InterestWeightedFirst)
    })
}

/// Runs the command line planner and returns the process exit code.
pub fn run_cli(cli: Cli) -> i32 {
    let request = match build_cli_request(&cli) {
        Ok(request) => request,
        Err(msg) => {
            eprintln!("Error: {msg}");
            return 2;
        }
    };

    match request.mode {
        CliMode::Recommend => match recommend_strategy(&request.debts) {
            Ok(rec) if cli.json => print_json(&rec),
            Ok(rec) => {
                print!("{}", render::render_recommendation(&rec));
                0
            }
            Err(err) => plan_failure(&err),
        },
        CliMode::Compare => {
            match compare_strategies(&request.debts, request.budget, &request.limits) {
                Ok(comparison) if cli.json => print_json(&CompareResponse::from(&comparison)),
                Ok(comparison) => {
                    print!("{}", render::render_comparison(&comparison));
                    0
                }
                Err(err) => plan_failure(&err),
            }
        }
        CliMode::Plan => {
            let strategy = resolve_strategy(request.strategy, &request.debts);
            let plan = match compute_plan_with_limits(
                &request.debts,
                strategy,
                request.budget,
                &request.limits,
            ) {
                Ok(plan) => plan,
                Err(err) => return plan_failure(&err),
            };

            if let Some(path) = &cli.save {
                let snapshot = PlanSnapshot {
                    debts: request.debts.clone(),
                    strategy,
                    monthly_budget: request.budget,
                    summary: Some(PlanSummary::from(&plan)),
                };
                if let Err(e) = save_snapshot(path, &snapshot) {
                    eprintln!("Error: --save {}: {e}", path.display());
                    return 2;
                }
            }

            if cli.json {
                print_json(&PlanResponse::new(&plan, Some(cli.months_shown)))
            } else {
                print!("{}", render::render_plan(&plan, cli.months_shown));
                0
            }
        }
    }
}

fn plan_failure(err: &PlanError) -> i32 {
    tracing::debug!(kind = err.kind(), "plan failed");
    eprintln!("{}", render::render_error(err));
    1
}

fn print_json<T: Serialize>(value: &T) -> i32 {
    match serde_json::to_string_pretty(value) {
        Ok(json) => {
            println!("{json}");
            0
        }
        Err(e) => {
            eprintln!("Error: failed to serialize output: {e}");
            1
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct PlanPayload {
    debts: Vec<RawDebt>,
    strategy: Option<Strategy>,
    #[serde(alias = "monthlyBudget")]
    budget: Option<FieldInput>,
    max_months: Option<u32>,
    schedule_limit: Option<usize>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ComparePayload {
    debts: Vec<RawDebt>,
    #[serde(alias = "monthlyBudget")]
    budget: Option<FieldInput>,
    max_months: Option<u32>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RecommendPayload {
    debts: Vec<RawDebt>,
}

#[derive(Debug)]
struct ApiRequest {
    debts: Vec<Debt>,
    strategy: Strategy,
    budget: f64,
    limits: PlanLimits,
    schedule_limit: Option<usize>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanResponse<'a> {
    strategy_used: Strategy,
    months: u32,
    total_interest: f64,
    total_paid: f64,
    initial_balance: f64,
    payoffs: &'a [DebtPayoff],
    schedule_truncated: bool,
    schedule: &'a [ScheduleRow],
}

impl<'a> PlanResponse<'a> {
    fn new(plan: &'a PaymentPlan, schedule_limit: Option<usize>) -> Self {
        let shown = schedule_limit
            .unwrap_or(plan.schedule.len())
            .min(plan.schedule.len());
        Self {
            strategy_used: plan.strategy_used,
            months: plan.months,
            total_interest: plan.total_interest,
            total_paid: plan.total_paid,
            initial_balance: plan.initial_balance,
            payoffs: &plan.payoffs,
            schedule_truncated: shown < plan.schedule.len(),
            schedule: &plan.schedule[..shown],
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareEntry {
    strategy: Strategy,
    label: &'static str,
    months: Option<u32>,
    total_interest: Option<f64>,
    total_paid: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CompareResponse {
    best_strategy: Option<Strategy>,
    strategies: Vec<CompareEntry>,
}

impl From<&StrategyComparison> for CompareResponse {
    fn from(comparison: &StrategyComparison) -> Self {
        let strategies = comparison
            .outcomes
            .iter()
            .map(|outcome| {
                let plan = outcome.result.as_ref().ok();
                CompareEntry {
                    strategy: outcome.strategy,
                    label: outcome.strategy.label(),
                    months: plan.map(|plan| plan.months),
                    total_interest: plan.map(|plan| plan.total_interest),
                    total_paid: plan.map(|plan| plan.total_paid),
                    error: outcome.result.as_ref().err().map(ToString::to_string),
                }
            })
            .collect();
        Self {
            best_strategy: comparison.best().map(|plan| plan.strategy_used),
            strategies,
        }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    kind: Option<&'static str>,
}

fn budget_from_field(budget: Option<&FieldInput>) -> Result<f64, String> {
    let Some(budget) = budget else {
        return Err("budget is required".to_string());
    };
    budget.value().map_err(|e| format!("budget {e}"))
}

fn api_request_from_payload(payload: PlanPayload) -> Result<ApiRequest, String> {
    let debts = normalize_debts(&payload.debts)?;
    let budget = budget_from_field(payload.budget.as_ref())?;
    let limits = limits_with_max_months(
        payload
            .max_months
            .unwrap_or(PlanLimits::default().max_months),
    )?;
    let strategy = resolve_strategy(payload.strategy, &debts);

    Ok(ApiRequest {
        debts,
        strategy,
        budget,
        limits,
        schedule_limit: payload.schedule_limit,
    })
}

#[cfg(test)]
fn api_request_from_json(json: &str) -> Result<ApiRequest, String> {
    let payload = serde_json::from_str::<PlanPayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}

pub fn router() -> Router {
    Router::new()
        .route("/api/plan", post(plan_handler).fallback(method_not_allowed_handler))
        .route(
            "/api/compare",
            post(compare_handler).fallback(method_not_allowed_handler),
        )
        .route(
            "/api/recommend",
            post(recommend_handler).fallback(method_not_allowed_handler),
        )
        .fallback(not_found_handler)
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let listener = TcpListener::bind(addr).await?;
    tracing::info!(%addr, "payoff HTTP API listening");
    tracing::info!("local access: http://127.0.0.1:{port}/api/plan");

    axum::serve(listener, router()).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found", None)
}

async fn method_not_allowed_handler() -> Response {
    error_response(StatusCode::METHOD_NOT_ALLOWED, "Use POST with a JSON body", None)
}

fn rejection_response(rejection: JsonRejection) -> Response {
    error_response(StatusCode::BAD_REQUEST, &rejection.body_text(), None)
}

async fn plan_handler(payload: Result<Json<PlanPayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg, None),
    };

    match compute_plan_with_limits(
        &request.debts,
        request.strategy,
        request.budget,
        &request.limits,
    ) {
        Ok(plan) => {
            tracing::info!(
                strategy = %plan.strategy_used,
                months = plan.months,
                debts = request.debts.len(),
                "plan computed"
            );
            json_response(
                StatusCode::OK,
                PlanResponse::new(&plan, request.schedule_limit),
            )
        }
        Err(err) => plan_error_response(&err),
    }
}

async fn compare_handler(payload: Result<Json<ComparePayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let prepared = normalize_debts(&payload.debts).and_then(|debts| {
        let budget = budget_from_field(payload.budget.as_ref())?;
        let limits = limits_with_max_months(
            payload
                .max_months
                .unwrap_or(PlanLimits::default().max_months),
        )?;
        Ok((debts, budget, limits))
    });
    let (debts, budget, limits) = match prepared {
        Ok(prepared) => prepared,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg, None),
    };

    match compare_strategies(&debts, budget, &limits) {
        Ok(comparison) => json_response(StatusCode::OK, CompareResponse::from(&comparison)),
        Err(err) => plan_error_response(&err),
    }
}

async fn recommend_handler(payload: Result<Json<RecommendPayload>, JsonRejection>) -> Response {
    let Json(payload) = match payload {
        Ok(payload) => payload,
        Err(rejection) => return rejection_response(rejection),
    };
    let debts = match normalize_debts(&payload.debts) {
        Ok(debts) => debts,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg, None),
    };

    match recommend_strategy(&debts) {
        Ok(recommendation) => json_response::<Recommendation>(StatusCode::OK, recommendation),
        Err(err) => plan_error_response(&err),
    }
}

fn json_response<T: Serialize>(status: StatusCode, body: T) -> Response {
    let mut response = (status, Json(body)).into_response();
    response
        .headers_mut()
        .insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));
    response
}

fn error_response(status: StatusCode, msg: &str, kind: Option<&'static str>) -> Response {
    tracing::debug!(%status, msg, "request rejected");
    json_response(
        status,
        ErrorResponse {
            error: msg.to_string(),
            kind,
        },
    )
}

fn plan_error_response(err: &PlanError) -> Response {
    error_response(
        StatusCode::UNPROCESSABLE_ENTITY,
        &err.to_string(),
        Some(err.kind()),
    )
}
