use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::info;

use crate::advisor::AdvisorClient;
use crate::analysis::{Action, MarketAnalyzer};
use crate::broker::GatewayClient;
use crate::config::Config;
use crate::dashboard::{AlertLevel, DashboardState};
use crate::data::{NewsClient, QuoteClient};

#[derive(Parser)]
#[command(
    name = "tapewatch",
    about = "Multi-source futures market monitor with manipulation-aware advisory scoring",
    version = "0.1.0"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the full analysis pipeline and print the advisory verdict
    Analyze {
        /// Emit the complete analysis as JSON instead of the summary view
        #[arg(short, long)]
        json: bool,
    },

    /// Fetch the current quote batch for the tracked instruments
    Quotes,

    /// Harvest and score the configured news feeds
    News {
        /// Maximum items to print
        #[arg(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Snapshot accounts and open positions from the brokerage gateway
    Account,

    /// Run the pipeline and ask the advisory model to assess it
    Advise {
        /// Also request an intraday signal for this symbol
        #[arg(short, long)]
        symbol: Option<String>,
    },

    /// Render a simulated dashboard session against live quotes
    Dashboard {
        /// Contracts to open per instrument
        #[arg(short, long, default_value_t = 1)]
        contracts: i64,
    },
}

/// Execute CLI command with the loaded configuration
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.command {
        Commands::Analyze { json } => {
            info!("Running full market analysis");
            analyze(&config, json).await?;
        }
        Commands::Quotes => {
            info!("Fetching quote batch");
            quotes(&config).await?;
        }
        Commands::News { limit } => {
            info!("Harvesting news feeds");
            news(&config, limit).await?;
        }
        Commands::Account => {
            info!("Fetching gateway snapshot");
            account(&config).await?;
        }
        Commands::Advise { symbol } => {
            info!("Running analysis with advisory assessment");
            advise(&config, symbol).await?;
        }
        Commands::Dashboard { contracts } => {
            info!("Rendering simulated dashboard session");
            dashboard(&config, contracts).await?;
        }
    }
    Ok(())
}

async fn analyze(config: &Config, json: bool) -> Result<()> {
    let analyzer = MarketAnalyzer::new(config.http.timeout_seconds);
    let analysis = analyzer.analyze().await;

    if json {
        println!("{}", serde_json::to_string_pretty(&analysis)?);
        return Ok(());
    }

    match analysis.market_summary.overall_sentiment() {
        Some(sentiment) => println!("Market summary: {:?}", sentiment),
        None => println!("Market summary: no data available"),
    }
    println!("Manipulation alerts: {}", analysis.manipulation_alerts.len());
    println!(
        "Recommendation: {:?} - {} (confidence: {})",
        analysis.recommendation.action,
        analysis.recommendation.reason,
        analysis
            .recommendation
            .confidence
            .map(|c| format!("{:.1}", c))
            .unwrap_or_else(|| "n/a".to_string())
    );

    Ok(())
}

async fn quotes(config: &Config) -> Result<()> {
    let client = QuoteClient::new(config.http.timeout_seconds);
    let batch = client.fetch_all().await;

    if !batch.has_data() {
        println!("No quote data available this cycle");
        return Ok(());
    }

    for (symbol, quote) in &batch.quotes {
        println!(
            "{:<4} {:>10.2} {:>+7.2} ({:>+6.2}%)  H {:.2}  L {:.2}",
            symbol, quote.price, quote.change, quote.change_percent, quote.high, quote.low
        );
    }

    Ok(())
}

async fn news(config: &Config, limit: usize) -> Result<()> {
    let client = NewsClient::new(config.http.timeout_seconds);
    let items = client.fetch_all().await;

    for item in items.iter().take(limit) {
        println!(
            "[reliability {:.1} | manipulation {:.2}] {}",
            item.reliability_score, item.manipulation_score, item.title
        );
    }

    Ok(())
}

async fn account(config: &Config) -> Result<()> {
    let mut client = GatewayClient::new(&config.gateway, config.http.timeout_seconds)?;
    let snapshot = client.snapshot().await?;

    println!("{}", serde_json::to_string_pretty(&snapshot)?);
    Ok(())
}

async fn dashboard(config: &Config, contracts: i64) -> Result<()> {
    let analyzer = MarketAnalyzer::new(config.http.timeout_seconds);
    let analysis = analyzer.analyze().await;

    let mut state = DashboardState::new(config.account_preset);

    // One simulated position per instrument with data, entered at the
    // current mark; the preset's size limit can reject the later ones
    for (symbol, quote) in &analysis.quotes.quotes {
        if let Err(e) = state.open_position(symbol, contracts, quote.price) {
            tracing::warn!("Skipping {}: {}", symbol, e);
        }
    }
    state.mark_to_market(&analysis.quotes);

    match analysis.recommendation.action {
        Action::Caution => state.push_alert(&analysis.recommendation.reason, AlertLevel::Critical),
        Action::Hold => state.push_alert(&analysis.recommendation.reason, AlertLevel::Warning),
        _ => state.push_alert(&analysis.recommendation.reason, AlertLevel::Info),
    }

    let metrics = state.live_metrics();
    println!("Account balance: {:>12.2}", metrics.current_balance);
    println!("Daily P&L:       {:>12.2}", metrics.daily_pnl);
    println!("Unrealized P&L:  {:>12.2}", metrics.unrealized_pnl);
    println!("Target progress: {:>11.1}%", metrics.profit_target_progress);
    println!("Daily loss used: {:>11.1}%", metrics.daily_loss_used);
    println!("Open positions:  {:>12}", metrics.position_count);

    for position in &state.positions {
        println!(
            "  {:<4} {:>+3} @ {:>10.2} -> {:>10.2}  P&L {:>10.2}",
            position.symbol,
            position.quantity,
            position.entry_price,
            position.current_price,
            position.unrealized_pnl
        );
    }

    for alert in &state.alerts {
        println!("[{:?}] {}", alert.level, alert.message);
    }

    Ok(())
}

async fn advise(config: &Config, symbol: Option<String>) -> Result<()> {
    let analyzer = MarketAnalyzer::new(config.http.timeout_seconds);
    let advisor = AdvisorClient::from_config(config)?;

    let analysis = analyzer.analyze().await;
    let assessment = advisor.assess_market(&analysis).await?;

    println!("Parse status: {:?}", assessment.parse_status);
    println!("{}", serde_json::to_string_pretty(&assessment.value)?);

    if let Some(symbol) = symbol {
        let signal = advisor.signal_for(&symbol, "5m").await?;
        println!("Signal for {} ({:?}):", symbol, signal.parse_status);
        println!("{}", serde_json::to_string_pretty(&signal.value)?);
    }

    Ok(())
}
