use axum::{
    Router,
    extract::{Json, Query},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use tokio::net::TcpListener;

use crate::core::{
    ConfidenceLevel, DistributionRange, MarketScenario, RiskMetrics, SimulationError,
    SimulationParameters, SimulationSummary, run_simulation,
};

/// Simulator parameters as exposed to callers. Rates are percent-denominated
/// here and converted to fractions when the core parameters are built.
#[derive(Parser, Debug)]
#[command(
    name = "pensim",
    about = "Monte Carlo pension sustainability simulator with downside-risk analytics"
)]
struct Cli {
    #[arg(long, default_value_t = 15_000.0, help = "Baseline annual pension income")]
    base_pension: f64,
    #[arg(long, default_value_t = 10_000)]
    iterations: u32,
    #[arg(long, default_value_t = 25, help = "Planning horizon in years")]
    time_horizon_years: u32,
    #[arg(
        long,
        default_value_t = 95.0,
        help = "Confidence level in percent: 90, 95, or 99"
    )]
    confidence_level: f64,
    #[arg(long, default_value_t = 42)]
    seed: u64,

    #[arg(long, default_value_t = 2.5, help = "Expected annual inflation in percent")]
    inflation_mean: f64,
    #[arg(long, default_value_t = 1.0, help = "Inflation volatility in percent")]
    inflation_volatility: f64,
    #[arg(long, default_value_t = 0.0, help = "Inflation lower bound in percent")]
    inflation_min: f64,
    #[arg(long, default_value_t = 10.0, help = "Inflation upper bound in percent")]
    inflation_max: f64,

    #[arg(
        long,
        default_value_t = 7.0,
        help = "Expected annual investment return in percent"
    )]
    return_mean: f64,
    #[arg(
        long,
        default_value_t = 15.0,
        help = "Investment return volatility in percent"
    )]
    return_volatility: f64,
    #[arg(
        long,
        default_value_t = -30.0,
        help = "Investment return lower bound in percent"
    )]
    return_min: f64,
    #[arg(
        long,
        default_value_t = 40.0,
        help = "Investment return upper bound in percent"
    )]
    return_max: f64,

    #[arg(long, default_value_t = 2.0, help = "Expected annual GDP growth in percent")]
    gdp_mean: f64,
    #[arg(long, default_value_t = 1.5, help = "GDP growth volatility in percent")]
    gdp_volatility: f64,
    #[arg(long, default_value_t = -5.0, help = "GDP growth lower bound in percent")]
    gdp_min: f64,
    #[arg(long, default_value_t = 8.0, help = "GDP growth upper bound in percent")]
    gdp_max: f64,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct SimulatePayload {
    base_pension: Option<f64>,
    iterations: Option<u32>,
    time_horizon_years: Option<u32>,
    confidence_level: Option<f64>,
    seed: Option<u64>,

    inflation_mean: Option<f64>,
    inflation_vol: Option<f64>,
    inflation_min: Option<f64>,
    inflation_max: Option<f64>,

    return_mean: Option<f64>,
    return_vol: Option<f64>,
    return_min: Option<f64>,
    return_max: Option<f64>,

    gdp_mean: Option<f64>,
    gdp_vol: Option<f64>,
    gdp_min: Option<f64>,
    gdp_max: Option<f64>,

    include_scenarios: Option<bool>,
}

#[derive(Debug)]
struct ApiRequest {
    params: SimulationParameters,
    base_pension: f64,
    include_scenarios: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SimulateResponse {
    seed: u64,
    iterations: u32,
    time_horizon_years: u32,
    confidence_level: f64,
    base_pension: f64,
    summary: SimulationSummary,
    risk_metrics: RiskMetrics,
    recommendations: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    scenarios: Option<Vec<MarketScenario>>,
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

fn percent_range(
    label: &str,
    min: f64,
    max: f64,
    mean: f64,
    volatility: f64,
) -> Result<DistributionRange, String> {
    if volatility < 0.0 {
        return Err(format!("--{label}-volatility must be >= 0"));
    }
    if min > mean || mean > max {
        return Err(format!(
            "--{label}-min, --{label}-mean, and --{label}-max must be ordered"
        ));
    }
    Ok(DistributionRange {
        min: min / 100.0,
        max: max / 100.0,
        mean: mean / 100.0,
        std_dev: volatility / 100.0,
    })
}

fn build_request_parts(cli: &Cli) -> Result<(SimulationParameters, f64), String> {
    if cli.iterations == 0 {
        return Err("--iterations must be > 0".to_string());
    }

    if cli.time_horizon_years == 0 {
        return Err("--time-horizon-years must be > 0".to_string());
    }

    let Some(confidence_level) = ConfidenceLevel::from_value(cli.confidence_level / 100.0) else {
        return Err("--confidence-level must be 90, 95, or 99".to_string());
    };

    if !cli.base_pension.is_finite() || cli.base_pension < 0.0 {
        return Err("--base-pension must be >= 0".to_string());
    }

    let params = SimulationParameters {
        inflation: percent_range(
            "inflation",
            cli.inflation_min,
            cli.inflation_max,
            cli.inflation_mean,
            cli.inflation_volatility,
        )?,
        investment_return: percent_range(
            "return",
            cli.return_min,
            cli.return_max,
            cli.return_mean,
            cli.return_volatility,
        )?,
        gdp_growth: percent_range(
            "gdp",
            cli.gdp_min,
            cli.gdp_max,
            cli.gdp_mean,
            cli.gdp_volatility,
        )?,
        iterations: cli.iterations,
        time_horizon_years: cli.time_horizon_years,
        confidence_level,
        seed: cli.seed,
    };
    params.validate().map_err(|e| e.to_string())?;

    Ok((params, cli.base_pension))
}

fn default_cli_for_api() -> Cli {
    Cli::parse_from(["pensim"])
}

fn api_request_from_payload(payload: SimulatePayload) -> Result<ApiRequest, String> {
    let mut cli = default_cli_for_api();

    if let Some(v) = payload.base_pension {
        cli.base_pension = v;
    }
    if let Some(v) = payload.iterations {
        cli.iterations = v;
    }
    if let Some(v) = payload.time_horizon_years {
        cli.time_horizon_years = v;
    }
    if let Some(v) = payload.confidence_level {
        cli.confidence_level = v;
    }
    if let Some(v) = payload.seed {
        cli.seed = v;
    }

    if let Some(v) = payload.inflation_mean {
        cli.inflation_mean = v;
    }
    if let Some(v) = payload.inflation_vol {
        cli.inflation_volatility = v;
    }
    if let Some(v) = payload.inflation_min {
        cli.inflation_min = v;
    }
    if let Some(v) = payload.inflation_max {
        cli.inflation_max = v;
    }

    if let Some(v) = payload.return_mean {
        cli.return_mean = v;
    }
    if let Some(v) = payload.return_vol {
        cli.return_volatility = v;
    }
    if let Some(v) = payload.return_min {
        cli.return_min = v;
    }
    if let Some(v) = payload.return_max {
        cli.return_max = v;
    }

    if let Some(v) = payload.gdp_mean {
        cli.gdp_mean = v;
    }
    if let Some(v) = payload.gdp_vol {
        cli.gdp_volatility = v;
    }
    if let Some(v) = payload.gdp_min {
        cli.gdp_min = v;
    }
    if let Some(v) = payload.gdp_max {
        cli.gdp_max = v;
    }

    let (params, base_pension) = build_request_parts(&cli)?;
    Ok(ApiRequest {
        params,
        base_pension,
        include_scenarios: payload.include_scenarios.unwrap_or(false),
    })
}

pub async fn run_http_server(port: u16) -> std::io::Result<()> {
    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    let app = Router::new()
        .route(
            "/api/simulate",
            get(simulate_get_handler).post(simulate_post_handler),
        )
        .fallback(not_found_handler);

    let listener = TcpListener::bind(addr).await?;
    println!("pensim HTTP API listening on http://{addr}");
    println!("Local access: http://127.0.0.1:{port}/api/simulate");

    axum::serve(listener, app).await
}

async fn not_found_handler() -> Response {
    error_response(StatusCode::NOT_FOUND, "Not found")
}

async fn simulate_get_handler(Query(payload): Query<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_post_handler(Json(payload): Json<SimulatePayload>) -> Response {
    simulate_handler_impl(payload).await
}

async fn simulate_handler_impl(payload: SimulatePayload) -> Response {
    let request = match api_request_from_payload(payload) {
        Ok(request) => request,
        Err(msg) => return error_response(StatusCode::BAD_REQUEST, &msg),
    };

    let mut result = match run_simulation(&request.params, request.base_pension) {
        Ok(result) => result,
        Err(SimulationError::InvalidParameters(msg)) => {
            return error_response(StatusCode::BAD_REQUEST, &msg);
        }
        Err(e) => return error_response(StatusCode::INTERNAL_SERVER_ERROR, &e.to_string()),
    };

    let scenarios = if request.include_scenarios {
        Some(std::mem::take(&mut result.scenarios))
    } else {
        None
    };

    let response = SimulateResponse {
        seed: request.params.seed,
        iterations: request.params.iterations,
        time_horizon_years: request.params.time_horizon_years,
        confidence_level: request.params.confidence_level.value(),
        base_pension: request.base_pension,
        summary: result.summary,
        risk_metrics: result.risk_metrics,
        recommendations: result.recommendations,
        scenarios,
    };
    json_response(StatusCode::OK, response)
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
    let payload = serde_json::from_str::<SimulatePayload>(json)
        .map_err(|e| format!("Invalid API JSON payload: {e}"))?;
    api_request_from_payload(payload)
}
