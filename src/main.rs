use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use clap::{Args, Parser, Subcommand};
use intern_match::catalog::{self, Catalog};
use intern_match::config::AppConfig;
use intern_match::error::AppError;
use intern_match::matching::{
    matching_router, passes_hard_filter, score, CandidateFormData, GeminiRanker, IntakeGuard,
    InternshipMatch, MatchingService, MemoryStore, ANY_LOCATION,
};
use intern_match::telemetry;
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
}

#[derive(Parser, Debug)]
#[command(
    name = "Internship Match Orchestrator",
    about = "Serve and exercise the candidate-to-internship matching pipeline",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Rank the catalog for a candidate profile using only the rule-based
    /// scorer, without the external ranking service
    Match(MatchArgs),
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
    /// Internship catalog CSV; the built-in seed catalog is used when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MatchArgs {
    /// Comma-separated candidate skills
    #[arg(long, value_delimiter = ',', required = true)]
    skills: Vec<String>,
    /// Comma-separated sector interests
    #[arg(long, value_delimiter = ',')]
    sectors: Vec<String>,
    /// Comma-separated location preferences (defaults to "Any Location")
    #[arg(long, value_delimiter = ',')]
    locations: Vec<String>,
    /// Education tier: below-secondary, undergraduate, or postgraduate
    #[arg(long, default_value = "undergraduate")]
    education: String,
    /// Internship catalog CSV; the built-in seed catalog is used when omitted
    #[arg(long)]
    catalog: Option<PathBuf>,
    /// Maximum number of matches to print
    #[arg(long, default_value_t = 10)]
    limit: usize,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Match(args) => run_match(args),
    }
}

fn load_catalog(path: Option<PathBuf>) -> Result<Catalog, AppError> {
    match path {
        Some(path) => Ok(Catalog::from_path(path)?),
        None => Ok(catalog::seed()),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let catalog = Arc::new(load_catalog(args.catalog)?);
    info!(internships = catalog.len(), "internship catalog loaded");

    let store = Arc::new(MemoryStore::default());
    let ranker = Arc::new(GeminiRanker::new(&config.ranker)?);
    let service = Arc::new(MatchingService::new(catalog, store, ranker));

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
    };

    let ops = Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .with_state(state);

    let app = matching_router(service)
        .merge(ops)
        .layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "internship matching service ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn run_match(args: MatchArgs) -> Result<(), AppError> {
    let MatchArgs {
        skills,
        sectors,
        locations,
        education,
        catalog,
        limit,
    } = args;

    let catalog = load_catalog(catalog)?;

    let locations = if locations.is_empty() {
        vec![ANY_LOCATION.to_string()]
    } else {
        locations
    };

    let candidate = IntakeGuard.candidate_from_form(CandidateFormData {
        full_name: "CLI Candidate".to_string(),
        email: "cli@localhost.invalid".to_string(),
        education,
        skills,
        sectors,
        locations,
        language: None,
    })?;

    let mut matches: Vec<InternshipMatch> = catalog
        .internships()
        .iter()
        .filter(|internship| passes_hard_filter(&candidate, internship))
        .map(|internship| {
            let result = score(&candidate, internship);
            InternshipMatch {
                internship: internship.clone(),
                match_percentage: result.percentage,
                explanation: result.explanation,
            }
        })
        .collect();
    matches.sort_by(|a, b| b.match_percentage.cmp(&a.match_percentage));
    matches.truncate(limit);

    render_matches(&candidate.skills, &candidate.locations, &matches);
    Ok(())
}

fn render_matches(skills: &[String], locations: &[String], matches: &[InternshipMatch]) {
    println!("Rule-based matching demo");
    println!("Skills: {}", skills.join(", "));
    println!("Locations: {}", locations.join(", "));

    if matches.is_empty() {
        println!("\nNo eligible internships for this profile");
        return;
    }

    println!("\nMatches by rule-based score");
    for item in matches {
        println!(
            "- {}% | {} at {} ({})",
            item.match_percentage,
            item.internship.title,
            item.internship.company,
            item.internship.location
        );
        println!("  {}", item.explanation);
    }
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}
