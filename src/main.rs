//! Fund allocation command line
//!
//! Evaluates the configured strategy book and prints weights, risk and
//! today's rebalancing decisions.

use chrono::Local;
use clap::{Parser, Subcommand, ValueEnum};
use fund_allocator::{
    config::Config,
    engine::{self, Evaluation},
    executor, export,
    types::{round_half_up, Strategy},
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser)]
#[command(name = "fund-allocator")]
#[command(about = "Capital allocation and rebalancing for a multi-strategy fund")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path (searches default locations when omitted)
    #[arg(short, long)]
    config: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Evaluate the book and show today's decisions
    Evaluate {
        /// Print the full evaluation as JSON
        #[arg(long)]
        json: bool,
        /// Reset realized volatilities to design volatilities first
        #[arg(long)]
        reset_volatility: bool,
    },
    /// Apply suggested adjustments and list the resulting orders
    Apply {
        /// Write the updated strategy book as JSON
        #[arg(long)]
        save: Option<PathBuf>,
    },
    /// Export today's decisions
    Export {
        #[arg(short, long, value_enum, default_value_t = ExportFormat::Csv)]
        format: ExportFormat,
        /// Output file (stdout when omitted)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Replay synthetic portfolio volatility against the target
    Replay {
        /// Window length, 10 to 120 days
        #[arg(long)]
        days: Option<u32>,
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Compare allocations across Kelly blend factors
    Sweep {
        #[arg(long, default_value = "11")]
        steps: usize,
    },
    /// Cut the volatility target once and re-evaluate
    ReduceRisk,
}

#[derive(Clone, Copy, ValueEnum)]
enum ExportFormat {
    Csv,
    Json,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = match &cli.config {
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    match cli.command {
        Commands::Evaluate {
            json,
            reset_volatility,
        } => {
            let mut config = config;
            if reset_volatility {
                config
                    .strategies
                    .iter_mut()
                    .for_each(Strategy::reset_realized_volatility);
            }
            evaluate(&config, json)
        }
        Commands::Apply { save } => apply(config, save),
        Commands::Export { format, output } => export_decisions(&config, format, output),
        Commands::Replay { days, seed } => show_replay(config, days, seed),
        Commands::Sweep { steps } => sweep(&config, steps),
        Commands::ReduceRisk => reduce_risk(config),
    }
}

fn evaluate(config: &Config, json: bool) -> anyhow::Result<()> {
    let evaluation = engine::evaluate(&config.strategies, &config.portfolio, &config.rules)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&evaluation)?);
        return Ok(());
    }

    print_summary(config, &evaluation);
    println!();
    print_decisions(config, &evaluation);
    Ok(())
}

fn apply(mut config: Config, save: Option<PathBuf>) -> anyhow::Result<()> {
    let evaluation = engine::evaluate(&config.strategies, &config.portfolio, &config.rules)?;
    let orders = executor::apply_suggested(&mut config.strategies, &evaluation.decisions)?;

    if orders.is_empty() {
        println!("📭 No adjustments to apply");
    } else {
        println!("🧾 Orders ({}):", orders.len());
        println!("─────────────────────────────────────────────────────────────");
        for order in &orders {
            println!(
                "  {:<4} {:<20} {:>15}  → {:>15}",
                order.side.to_string(),
                order.strategy_code,
                order.amount.to_string(),
                order.new_notional.to_string()
            );
        }
    }

    if let Some(path) = save {
        std::fs::write(&path, serde_json::to_string_pretty(&config.strategies)?)?;
        println!("💾 Saved strategy book to {}", path.display());
    }
    Ok(())
}

fn export_decisions(
    config: &Config,
    format: ExportFormat,
    output: Option<PathBuf>,
) -> anyhow::Result<()> {
    let evaluation = engine::evaluate(&config.strategies, &config.portfolio, &config.rules)?;
    let rows = export::build_rows(&evaluation.decisions, Local::now().date_naive())?;
    let text = match format {
        ExportFormat::Csv => export::to_csv(&rows)?,
        ExportFormat::Json => export::to_json(&rows)?,
    };

    match output {
        Some(path) => {
            std::fs::write(&path, text)?;
            tracing::info!("Exported {} decisions to {}", rows.len(), path.display());
        }
        None => print!("{text}"),
    }
    Ok(())
}

fn show_replay(
    mut config: Config,
    days: Option<u32>,
    seed: Option<u64>,
) -> anyhow::Result<()> {
    if let Some(days) = days {
        config.replay.days = days;
    }
    if let Some(seed) = seed {
        config.replay.seed = seed;
    }
    let evaluation = engine::evaluate(&config.strategies, &config.portfolio, &config.rules)?;
    let points = engine::replay_portfolio(&evaluation, &config.portfolio, &config.replay)?;
    let adds = points.iter().filter(|p| p.marker > 0).count();
    let reduces = points.iter().filter(|p| p.marker < 0).count();

    println!(
        "📈 Portfolio volatility ({} days, {} add / {} reduce):",
        points.len(),
        adds,
        reduces
    );
    for p in &points {
        let mark = match p.marker {
            1 => "▲",
            -1 => "▼",
            _ => " ",
        };
        println!(
            "  day {:>3}  realized {:>6.2}%  target {:>6.2}%  {}",
            p.day,
            p.realized_volatility * 100.0,
            p.target_volatility * 100.0,
            mark
        );
    }
    Ok(())
}

fn sweep(config: &Config, steps: usize) -> anyhow::Result<()> {
    let results =
        engine::sweep_kelly_blend(&config.strategies, &config.portfolio, &config.rules, steps)?;

    println!("🔀 Kelly blend sweep:");
    println!("─────────────────────────────────────────────────────────────");
    for (alpha, evaluation) in &results {
        let weights: Vec<String> = evaluation
            .weights
            .weights
            .iter()
            .map(|w| format!("{:>5.1}%", w * 100.0))
            .collect();
        println!(
            "  α={:.2}  vol {:>5.2}%  +{:>12}  -{:>12}  [{}]",
            alpha,
            evaluation.attribution.portfolio_volatility * 100.0,
            fmt_money(evaluation.total_increase()),
            fmt_money(evaluation.total_decrease()),
            weights.join(" ")
        );
    }
    Ok(())
}

fn reduce_risk(mut config: Config) -> anyhow::Result<()> {
    let before = config.portfolio.volatility_target;
    config.portfolio.reduce_risk();
    println!(
        "🛡️  Volatility target {:.2}% → {:.2}%",
        before * 100.0,
        config.portfolio.volatility_target * 100.0
    );
    println!();
    evaluate(&config, false)
}

fn print_summary(config: &Config, evaluation: &Evaluation) {
    let allocation = &evaluation.allocation;
    let margin_multiple = if allocation.margin_buffer_multiple.is_finite() {
        format!("{:.2}x", allocation.margin_buffer_multiple)
    } else {
        "n/a".to_string()
    };
    let margin_status = if evaluation.margin_ok(&config.rules) {
        "OK"
    } else {
        "SHORT"
    };

    println!("╔══════════════════════════════════════════╗");
    println!("║          📊 Portfolio Allocation         ║");
    println!("╠══════════════════════════════════════════╣");
    println!("║ Total Capital:       {:>19} ║", fmt_money(config.portfolio.total_capital));
    println!("║ Deployable:          {:>19} ║", fmt_money(allocation.deployable_capital));
    println!("║ Cash Buffer:         {:>19} ║", fmt_money(allocation.cash_buffer));
    println!("║ ─────────────────────────────────────── ║");
    println!("║ Margin Required:     {:>19} ║", fmt_money(allocation.margin_required));
    println!("║ Margin Coverage:     {:>13} {:>5} ║", margin_multiple, margin_status);
    println!(
        "║ Portfolio Vol:       {:>18.2}% ║",
        evaluation.attribution.portfolio_volatility * 100.0
    );
    println!(
        "║ Vol Target:          {:>18.2}% ║",
        config.portfolio.volatility_target * 100.0
    );
    println!("║ ─────────────────────────────────────── ║");
    println!("║ Total Increase:      {:>19} ║", fmt_money(evaluation.total_increase()));
    println!("║ Total Decrease:      {:>19} ║", fmt_money(evaluation.total_decrease()));
    println!("╚══════════════════════════════════════════╝");
    if evaluation.weights.kelly_degenerate {
        println!("⚠️  Covariance is singular, Kelly leg is uniform");
    }
}

fn print_decisions(config: &Config, evaluation: &Evaluation) {
    if evaluation.decisions.is_empty() {
        println!("📭 No strategies configured");
        return;
    }

    println!("📋 Decisions ({}):", evaluation.decisions.len());
    println!("─────────────────────────────────────────────────────────────");
    for (i, decision) in evaluation.decisions.iter().enumerate() {
        println!(
            "  {:<20} {:<7} {:>6} w={:>5.1}% risk={:>5.1}%  Δ {:>12}  target {:>14}",
            decision.strategy_code,
            evaluation.health[i].to_string(),
            decision.action.to_string(),
            evaluation.weights.weights[i] * 100.0,
            evaluation.attribution.shares[i] * 100.0,
            fmt_money(decision.recommended_delta),
            fmt_money(decision.target_notional),
        );
        for reason in decision.primary_reasons(2) {
            println!("      · {reason}");
        }
    }
    if config.strategies.iter().any(|s| s.paused) {
        println!("⏸️  Paused strategies are excluded from weights");
    }
}

/// Whole currency units with thousands separators
fn fmt_money(amount: f64) -> String {
    let rounded = round_half_up(amount);
    let digits = format!("{:.0}", rounded.abs());
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    if rounded < 0.0 {
        format!("-{grouped}")
    } else {
        grouped
    }
}
