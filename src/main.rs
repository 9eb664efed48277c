use anyhow::{bail, Context};
use clap::Parser;
use jiff::civil::Date;
use serde_json::json;
use tracing::info;

use route_planner::api::{ApiConfig, DeliveryApiClient};
use route_planner::model::OrderId;
use route_planner::resolver::ResolvedPath;
use route_planner::session::{DateRange, PlanningSession, SessionState};
use route_planner::traits::{MapSurface, Marker};

#[derive(Parser)]
#[clap(author, version, about = "Plan delivery routes for a date range", long_about = None)]
struct Cli {
    /// First delivery date (e.g., 2024-03-01)
    #[arg(long)]
    from: Date,

    /// Last delivery date (defaults to --from)
    #[arg(long)]
    to: Option<Date>,

    /// Orders to route (default: every valid candidate)
    #[arg(short, long = "select", value_name = "ORDER_ID")]
    select: Vec<String>,

    #[arg(short, long)]
    debug: bool,
}

/// Prints what a map would draw as JSON.
struct JsonSurface;

impl MapSurface for JsonSurface {
    fn render(&mut self, paths: &[ResolvedPath], markers: &[Marker]) {
        let document = json!({ "paths": paths, "markers": markers });
        match serde_json::to_string_pretty(&document) {
            Ok(text) => println!("{text}"),
            Err(err) => tracing::error!(error = %err, "failed to serialize map data"),
        }
    }
}

fn main() -> Result<(), anyhow::Error> {
    dotenvy::from_filename("./.env.local").ok();

    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    let range = DateRange::new(cli.from, cli.to.unwrap_or(cli.from))?;
    let config = ApiConfig::from_env()?;
    info!(base_url = %config.base_url, "using delivery service");
    let client = DeliveryApiClient::new(config).context("failed to build HTTP client")?;

    let mut session = PlanningSession::new();
    session.request_candidates(&client, range)?;
    if let Some(message) = session.error_message() {
        bail!("could not load candidates: {message}");
    }
    info!(
        candidates = session.candidates().len(),
        dropped = session.report().dropped_candidates,
        "loaded candidates"
    );

    let wanted: Vec<OrderId> = if cli.select.is_empty() {
        session
            .candidates()
            .iter()
            .map(|candidate| candidate.order_id().clone())
            .collect()
    } else {
        cli.select.iter().map(|id| OrderId::new(id.as_str())).collect()
    };
    for order_id in &wanted {
        session.toggle_selection(order_id)?;
    }

    session.generate_routes(&client)?;
    match session.state() {
        SessionState::RoutesReady => {}
        SessionState::Error { message } => bail!("could not generate routes: {message}"),
        _ => {
            info!("nothing selected, no routes generated");
            return Ok(());
        }
    }

    let report = session.report();
    info!(
        routes = session.routes().len(),
        dropped = report.dropped_routes,
        unmapped = report.unmapped_routes.len(),
        "routes generated"
    );

    session.render(&mut JsonSurface);
    Ok(())
}
