use std::collections::HashMap;
use std::time::{Duration, Instant};

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use facility_core::{evaluate_facility, FacilityContent, FacilityReport, ZoneKey};
use facility_world::{apply_overrides, load_content, load_snapshot, validate_content};
use tracing_subscriber::EnvFilter;

// ---------------------------------------------------------------------------
// CLI definition
// ---------------------------------------------------------------------------

#[derive(Parser)]
#[command(name = "facility_cli", about = "Data center facility evaluation CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate a snapshot once and print the facility report.
    Report {
        #[arg(long)]
        snapshot: String,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        /// Print the report as JSON instead of text.
        #[arg(long)]
        json: bool,
        /// Override a constant, e.g. `--set server_power_w=500`. Repeatable.
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
    /// Re-evaluate a snapshot every tick, as the game loop would.
    Run {
        #[arg(long)]
        snapshot: String,
        #[arg(long)]
        ticks: u64,
        #[arg(long, value_enum, default_value_t = Speed::Normal)]
        speed: Speed,
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long = "set", value_name = "KEY=VALUE")]
        overrides: Vec<String>,
    },
    /// Load and validate content, and optionally a snapshot against it.
    Validate {
        #[arg(long, default_value = "./content")]
        content_dir: String,
        #[arg(long)]
        snapshot: Option<String>,
    },
}

/// Game speed. Each step is one tick.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum Speed {
    Slow,
    Normal,
    Fast,
}

impl Speed {
    fn tick_budget(self) -> Duration {
        match self {
            Speed::Slow => Duration::from_millis(1000),
            Speed::Normal => Duration::from_millis(500),
            Speed::Fast => Duration::from_millis(250),
        }
    }
}

// ---------------------------------------------------------------------------
// Overrides
// ---------------------------------------------------------------------------

/// `key=value` where value is JSON; bare words fall back to a JSON string so
/// the type error comes from `apply_overrides` with the valid-key list.
fn parse_override(raw: &str) -> Result<(String, serde_json::Value)> {
    let Some((key, value)) = raw.split_once('=') else {
        bail!("override '{raw}' is not in KEY=VALUE form");
    };
    let value = serde_json::from_str(value)
        .unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

fn load_with_overrides(content_dir: &str, raw: &[String]) -> Result<FacilityContent> {
    let mut content = load_content(content_dir)?;
    if raw.is_empty() {
        return Ok(content);
    }
    let overrides = raw
        .iter()
        .map(|r| parse_override(r))
        .collect::<Result<HashMap<_, _>>>()?;
    apply_overrides(&mut content.constants, &overrides).context("applying --set overrides")?;
    validate_content(&content).context("validating overridden constants")?;
    tracing::info!(count = overrides.len(), "constant overrides applied");
    Ok(content)
}

// ---------------------------------------------------------------------------
// Commands
// ---------------------------------------------------------------------------

fn report(snapshot_path: &str, content_dir: &str, json: bool, raw: &[String]) -> Result<()> {
    let content = load_with_overrides(content_dir, raw)?;
    let snapshot = load_snapshot(snapshot_path, &content)?;
    let started = Instant::now();
    let report = evaluate_facility(&snapshot, &content);
    tracing::info!(elapsed_us = started.elapsed().as_micros(), "facility evaluated");

    if json {
        let text = serde_json::to_string_pretty(&report).context("serializing report")?;
        println!("{text}");
    } else {
        print_report(&report);
    }
    Ok(())
}

fn run(
    snapshot_path: &str,
    ticks: u64,
    speed: Speed,
    content_dir: &str,
    raw: &[String],
) -> Result<()> {
    let content = load_with_overrides(content_dir, raw)?;
    let snapshot = load_snapshot(snapshot_path, &content)?;
    let budget = speed.tick_budget();

    println!(
        "Starting evaluation loop: ticks={ticks} speed={speed:?} budget={}ms content_version={}",
        budget.as_millis(),
        content.content_version,
    );
    println!("{}", "-".repeat(80));

    let mut baseline: Option<FacilityReport> = None;
    let mut total = Duration::ZERO;
    let mut slowest = Duration::ZERO;
    for tick in 1..=ticks {
        let started = Instant::now();
        let report = evaluate_facility(&snapshot, &content);
        let elapsed = started.elapsed();
        total += elapsed;
        slowest = slowest.max(elapsed);
        if elapsed > budget {
            tracing::warn!(
                tick,
                elapsed_ms = elapsed.as_millis(),
                budget_ms = budget.as_millis(),
                "evaluation exceeded tick budget"
            );
        }
        if let Some(first) = &baseline {
            if *first != report {
                bail!("tick {tick}: report differs from tick 1 for an unchanged snapshot");
            }
        } else {
            baseline = Some(report);
        }
    }

    let mean = if ticks == 0 {
        Duration::ZERO
    } else {
        total / u32::try_from(ticks).unwrap_or(u32::MAX)
    };
    tracing::info!(
        ticks,
        mean_us = mean.as_micros(),
        slowest_us = slowest.as_micros(),
        budget_ms = budget.as_millis(),
        "evaluation loop finished"
    );
    println!("{}", "-".repeat(80));
    println!(
        "Done. {ticks} ticks, mean={:.3}ms slowest={:.3}ms, every report identical.",
        mean.as_secs_f64() * 1000.0,
        slowest.as_secs_f64() * 1000.0,
    );
    if let Some(report) = &baseline {
        print_report(report);
    }
    Ok(())
}

fn validate(content_dir: &str, snapshot_path: Option<&str>) -> Result<()> {
    let content = load_content(content_dir)?;
    println!(
        "Content OK: version={} cooling_units={} chillers={} pdus={} customers={} layouts={}",
        content.content_version,
        content.cooling_units.len(),
        content.chillers.len(),
        content.pdus.len(),
        content.customers.len(),
        content.suite_layouts.len(),
    );
    if let Some(path) = snapshot_path {
        let snapshot = load_snapshot(path, &content)?;
        println!(
            "Snapshot OK: tier={:?} cabinets={} cable_runs={}",
            snapshot.suite_tier,
            snapshot.cabinets.len(),
            snapshot.cable_runs.len(),
        );
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Text output
// ---------------------------------------------------------------------------

fn print_report(report: &FacilityReport) {
    let stats = &report.stats;
    println!(
        "power={:.0}W  cooling={:.0}W  avg_heat={:.0}C  pue={:.2}  mgmt_bonus={:.2}",
        stats.total_power_w, stats.cooling_power_w, stats.avg_heat, stats.pue, stats.mgmt_bonus,
    );

    let traffic = &report.traffic;
    println!(
        "traffic: flows={} bandwidth={:.1}/{:.1}Gbps redirected={}",
        traffic.total_flows,
        traffic.total_bandwidth_gbps,
        traffic.total_capacity_gbps,
        traffic.redirected_flows,
    );
    for (spine, utilization) in &traffic.spine_utilization {
        println!("  {:<16} {:>5.1}%", spine.0, utilization * 100.0);
    }

    println!("cabinets:");
    for cab in &report.cabinets {
        let isolated = if report.mixed_penalties.contains(&cab.cabinet_id) {
            "  isolated"
        } else {
            ""
        };
        println!(
            "  {:<16} cooling={:>5.2}  spacing={:>+5.1}C{isolated}",
            cab.cabinet_id.0, cab.cooling_rate, cab.spacing_heat,
        );
    }

    for link in &report.chiller_links {
        println!(
            "chiller link {}: connected={} bonus={:.2}",
            link.unit_id, link.connection.connected, link.connection.efficiency_bonus,
        );
    }

    for zone in &report.zones {
        let label = match zone.key {
            ZoneKey::Environment(env) => format!("env:{env:?}"),
            ZoneKey::Customer(customer) => format!("customer:{customer:?}"),
        };
        println!(
            "zone {label:<22} size={:<3} revenue=+{:.0}%",
            zone.size(),
            zone.bonus.revenue * 100.0,
        );
    }

    for row in &report.dedicated_rows {
        println!(
            "dedicated row {} ({:?}, {} cabinets) +{:.0}%",
            row.row,
            row.environment,
            row.cabinet_count,
            row.bonus * 100.0,
        );
    }

    println!("aisles: total_bonus={:.2}", report.aisles.total_bonus);
    for aisle in &report.aisles.aisles {
        println!(
            "  {:<12} {:?} paired={} contained={} bonus={:.2}",
            aisle.aisle_id.0, aisle.kind, aisle.paired, aisle.contained, aisle.bonus,
        );
    }

    for pdu in &report.pdus {
        let flag = if pdu.overloaded { "  OVERLOADED" } else { "" };
        println!(
            "pdu {:<10} {:.2}/{:.2}kW{flag}",
            pdu.pdu_id.0, pdu.load_kw, pdu.max_capacity_kw,
        );
    }
    println!("messy cables: {}", report.messy_cables);
}

// ---------------------------------------------------------------------------
// Entry point
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Report {
            snapshot,
            content_dir,
            json,
            overrides,
        } => report(&snapshot, &content_dir, json, &overrides)?,
        Commands::Run {
            snapshot,
            ticks,
            speed,
            content_dir,
            overrides,
        } => run(&snapshot, ticks, speed, &content_dir, &overrides)?,
        Commands::Validate {
            content_dir,
            snapshot,
        } => validate(&content_dir, snapshot.as_deref())?,
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn content_dir() -> &'static str {
        concat!(env!("CARGO_MANIFEST_DIR"), "/../../content")
    }

    #[test]
    fn overrides_are_revalidated() {
        let err = load_with_overrides(content_dir(), &["ambient_heat=-40".to_string()])
            .unwrap_err();
        let msg = format!("{err:#}");
        assert!(msg.contains("validating overridden constants"));
        assert!(msg.contains("ambient_heat"));
    }

    #[test]
    fn valid_overrides_are_applied() {
        let content =
            load_with_overrides(content_dir(), &["server_power_w=500".to_string()]).unwrap();
        assert!((content.constants.server_power_w - 500.0).abs() < 1e-9);
    }

    #[test]
    fn parse_override_reads_json_numbers() {
        let (key, value) = parse_override("server_power_w=500").unwrap();
        assert_eq!(key, "server_power_w");
        assert_eq!(value, serde_json::json!(500));
    }

    #[test]
    fn parse_override_keeps_bare_words_as_strings() {
        let (_, value) = parse_override("ambient_heat=warm").unwrap();
        assert_eq!(value, serde_json::json!("warm"));
    }

    #[test]
    fn parse_override_requires_equals() {
        assert!(parse_override("server_power_w").is_err());
    }

    #[test]
    fn faster_speeds_have_tighter_budgets() {
        assert!(Speed::Fast.tick_budget() < Speed::Normal.tick_budget());
        assert!(Speed::Normal.tick_budget() < Speed::Slow.tick_budget());
        assert_eq!(Speed::Fast.tick_budget(), Duration::from_millis(250));
    }

    #[test]
    fn cli_parses_report_with_overrides() {
        let cli = Cli::try_parse_from([
            "facility_cli",
            "report",
            "--snapshot",
            "demo.json",
            "--set",
            "server_power_w=500",
            "--set",
            "zone_min_size=4",
            "--json",
        ])
        .unwrap();
        match cli.command {
            Commands::Report {
                json, overrides, ..
            } => {
                assert!(json);
                assert_eq!(overrides.len(), 2);
            }
            _ => panic!("expected report"),
        }
    }
}
