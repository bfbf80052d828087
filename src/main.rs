// 🃏 Poker Bankroll CLI - Record sessions, inspect results, move data in and out

use anyhow::{anyhow, bail, Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use clap::{Args, Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

use poker_bankroll::analytics::{self, bankroll_series, stats_by, Dimension, SessionFilter, Summary};
use poker_bankroll::entities::{
    GameType, Location, LocationImage, Session, TournamentDetails, TournamentSize, TournamentSpeed,
    Transaction, TransactionKind,
};
use poker_bankroll::interchange::{export_to_path, import_from_path};
use poker_bankroll::report::{
    format_currency, render_rows, render_series, render_summary, render_wellness,
};
use poker_bankroll::wellness::{self, WellnessReport};
use poker_bankroll::{Config, DataQualityEngine, DataStore};

#[derive(Parser)]
#[command(
    name = "poker-bankroll",
    about = "Track poker sessions and bankroll results",
    version
)]
struct Cli {
    /// Path to config file (default: <config dir>/poker-bankroll/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Record a played session
    AddSession(SessionArgs),

    /// Delete a session by id
    DeleteSession { id: String },

    /// List sessions, oldest first
    List {
        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Summary statistics, optionally grouped
    Stats {
        /// Group by: year, month, month_of_year, weekday, time_of_day,
        /// location, stakes, game, game_type, session_length, tag, mood
        #[arg(long)]
        by: Option<String>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Sleep, mindfulness and mood against results
    Wellness {
        /// CSV with date,hours columns (default: sleep.csv in the data dir)
        #[arg(long)]
        sleep: Option<PathBuf>,

        /// CSV with date,minutes columns (default: mindfulness.csv in the data dir)
        #[arg(long)]
        mindfulness: Option<PathBuf>,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Running bankroll balance over time
    Series {
        /// Named bankroll (default: everything)
        #[arg(long)]
        bankroll: Option<String>,
    },

    /// Import sessions from a CSV file
    Import { file: PathBuf },

    /// Export sessions to a CSV file
    Export {
        file: PathBuf,

        #[command(flatten)]
        filter: FilterArgs,
    },

    /// Manage locations
    Location {
        #[command(subcommand)]
        action: LocationAction,
    },

    /// Manage stakes
    Stakes {
        #[command(subcommand)]
        action: StakesAction,
    },

    /// Manage named bankrolls
    Bankroll {
        #[command(subcommand)]
        action: BankrollAction,
    },

    /// Manage deposits, withdrawals and expenses
    Transaction {
        #[command(subcommand)]
        action: TransactionAction,
    },

    /// Report data-quality issues in stored sessions
    Check,
}

#[derive(Args)]
struct SessionArgs {
    #[arg(long)]
    location: String,
    #[arg(long, default_value = "NL Texas Hold Em")]
    game: String,
    /// cash | tournament
    #[arg(long, default_value = "cash")]
    game_type: String,
    #[arg(long, default_value = "")]
    stakes: String,
    #[arg(long)]
    buy_in: f64,
    #[arg(long)]
    cash_out: f64,
    /// Defaults to cash out - buy in - expenses
    #[arg(long, allow_hyphen_values = true)]
    profit: Option<f64>,
    #[arg(long)]
    expenses: Option<f64>,
    /// "YYYY-MM-DD HH:MM"
    #[arg(long)]
    start: String,
    #[arg(long)]
    end: String,
    #[arg(long, default_value = "")]
    notes: String,
    /// Comma separated
    #[arg(long)]
    tags: Option<String>,
    #[arg(long)]
    mood: Option<u8>,
    #[arg(long)]
    hands: Option<u32>,
    /// Add to a named bankroll instead of the default one
    #[arg(long)]
    bankroll: Option<String>,

    // Tournament fields
    #[arg(long)]
    entrants: Option<u32>,
    #[arg(long)]
    finish: Option<u32>,
    #[arg(long, default_value_t = 0)]
    rebuys: u32,
    /// standard | turbo | hyper-turbo
    #[arg(long)]
    speed: Option<String>,
    /// small | medium | large
    #[arg(long)]
    size: Option<String>,
    #[arg(long, default_value_t = 1)]
    days: u32,
}

#[derive(Args)]
struct FilterArgs {
    /// Start date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    from: Option<String>,
    /// End date, inclusive (YYYY-MM-DD)
    #[arg(long)]
    to: Option<String>,
    #[arg(long)]
    year: Option<i32>,
    #[arg(long)]
    game_type: Option<String>,
    #[arg(long)]
    location: Option<String>,
    #[arg(long)]
    stakes: Option<String>,
    #[arg(long)]
    tag: Option<String>,
}

#[derive(Subcommand)]
enum LocationAction {
    Add {
        name: String,
        /// Path to an image for this location
        #[arg(long)]
        image: Option<PathBuf>,
    },
    Delete { name: String },
    List,
}

#[derive(Subcommand)]
enum StakesAction {
    Add { stakes: String },
    Delete { stakes: String },
    List,
}

#[derive(Subcommand)]
enum BankrollAction {
    Add { name: String },
    Delete { name: String },
    List,
}

#[derive(Subcommand)]
enum TransactionAction {
    Add {
        /// deposit | withdrawal | expense
        #[arg(long)]
        kind: String,
        #[arg(long)]
        amount: f64,
        /// YYYY-MM-DD
        #[arg(long)]
        date: String,
        #[arg(long, default_value = "")]
        notes: String,
        /// Comma separated
        #[arg(long)]
        tags: Option<String>,
        #[arg(long)]
        bankroll: Option<String>,
    },
    Delete { id: String },
    List,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up tracing.
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new(std::env::var("RUST_LOG").unwrap_or_else(|_| "warn".into()))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load(cli.config.as_deref()).context("Failed to load config")?;
    let mut store = DataStore::open_configured(&config)
        .with_context(|| format!("Failed to open data in {}", config.data_dir.display()))?;
    let symbol = config.currency_symbol.as_str();

    match cli.command {
        Commands::AddSession(args) => run_add_session(&mut store, args, symbol)?,
        Commands::DeleteSession { id } => {
            let session = store.delete_session(&id)?;
            println!("✓ Deleted session {} ({})", session.id, session.location);
        }
        Commands::List { filter } => run_list(&store, &filter.build()?, symbol),
        Commands::Stats { by, filter } => run_stats(&store, by.as_deref(), &filter.build()?, symbol)?,
        Commands::Wellness {
            sleep,
            mindfulness,
            filter,
        } => run_wellness(
            &store,
            &config.data_dir,
            sleep.as_deref(),
            mindfulness.as_deref(),
            &filter.build()?,
            symbol,
        )?,
        Commands::Series { bankroll } => run_series(&store, bankroll.as_deref(), symbol)?,
        Commands::Import { file } => run_import(&mut store, &file)?,
        Commands::Export { file, filter } => {
            let sessions = filter.build()?.apply(&store.all_sessions());
            let written = export_to_path(&file, &sessions)
                .with_context(|| format!("Failed to export to {}", file.display()))?;
            println!("✓ Exported {} sessions to {}", written, file.display());
        }
        Commands::Location { action } => run_location(&mut store, action)?,
        Commands::Stakes { action } => run_stakes(&mut store, action)?,
        Commands::Bankroll { action } => run_bankroll(&mut store, action, symbol)?,
        Commands::Transaction { action } => run_transaction(&mut store, action, symbol)?,
        Commands::Check => run_check(&store),
    }

    Ok(())
}

// ============================================================================
// ARGUMENT PARSING
// ============================================================================

fn parse_date_time(raw: &str) -> Result<NaiveDateTime> {
    ["%Y-%m-%d %H:%M", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw.trim(), fmt).ok())
        .ok_or_else(|| anyhow!("Invalid date/time '{}', expected YYYY-MM-DD HH:MM", raw))
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", raw))
}

fn parse_game_type(raw: &str) -> Result<GameType> {
    GameType::parse(raw).ok_or_else(|| anyhow!("Unknown game type '{}'", raw))
}

fn split_list(raw: Option<&str>) -> Vec<String> {
    raw.map(|s| {
        s.split(',')
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(String::from)
            .collect()
    })
    .unwrap_or_default()
}

impl FilterArgs {
    fn build(&self) -> Result<SessionFilter> {
        let mut filter = SessionFilter::new();
        if let Some(from) = &self.from {
            filter = filter.from_date(parse_date(from)?);
        }
        if let Some(to) = &self.to {
            filter = filter.to_date(parse_date(to)?);
        }
        if let Some(year) = self.year {
            filter = filter.year(year);
        }
        if let Some(game_type) = &self.game_type {
            filter = filter.game_type(parse_game_type(game_type)?);
        }
        if let Some(location) = &self.location {
            filter = filter.location(location);
        }
        if let Some(stakes) = &self.stakes {
            filter = filter.stakes(stakes);
        }
        if let Some(tag) = &self.tag {
            filter = filter.tag(tag);
        }
        Ok(filter)
    }
}

fn bankroll_id(store: &DataStore, name: &str) -> Result<String> {
    store
        .bankroll_by_name(name)
        .map(|b| b.id.clone())
        .ok_or_else(|| anyhow!("No bankroll named '{}'", name))
}

// ============================================================================
// COMMANDS
// ============================================================================

fn run_add_session(store: &mut DataStore, args: SessionArgs, symbol: &str) -> Result<()> {
    let game_type = parse_game_type(&args.game_type)?;
    let start = parse_date_time(&args.start)?;
    let end = parse_date_time(&args.end)?;
    let profit = args
        .profit
        .unwrap_or(args.cash_out - args.buy_in - args.expenses.unwrap_or(0.0));

    let mut session = Session::new(
        &args.location,
        &args.game,
        game_type,
        &args.stakes,
        args.buy_in,
        args.cash_out,
        profit,
        start,
        end,
    )
    .with_notes(&args.notes)
    .with_tags(split_list(args.tags.as_deref()));

    if let Some(expenses) = args.expenses {
        session = session.with_expenses(expenses);
    }
    if let Some(mood) = args.mood {
        if !(1..=5).contains(&mood) {
            bail!("Mood must be between 1 and 5");
        }
        session = session.with_mood(mood);
    }
    if let Some(hands) = args.hands {
        session = session.with_hands_played(hands);
    }
    if game_type == GameType::Tournament {
        let speed = match args.speed.as_deref() {
            Some(raw) => Some(
                TournamentSpeed::parse(raw).ok_or_else(|| anyhow!("Unknown speed '{}'", raw))?,
            ),
            None => None,
        };
        let size = match args.size.as_deref() {
            Some(raw) => {
                Some(TournamentSize::parse(raw).ok_or_else(|| anyhow!("Unknown size '{}'", raw))?)
            }
            None => None,
        };
        session = session.with_tournament(TournamentDetails {
            entrants: args.entrants,
            finish: args.finish,
            rebuy_count: args.rebuys,
            speed,
            size,
            is_multi_day: args.days > 1,
            days: args.days,
        });
    }

    let id = session.id.clone();
    let result = format_currency(session.profit, symbol);
    match args.bankroll.as_deref() {
        Some(name) => {
            let bankroll = bankroll_id(store, name)?;
            store.add_session_to_bankroll(&bankroll, session)?;
        }
        None => store.add_session(session)?,
    }

    println!("✓ Added session {} ({})", id, result);
    Ok(())
}

fn run_list(store: &DataStore, filter: &SessionFilter, symbol: &str) {
    let sessions = filter.apply(&store.all_sessions());
    if sessions.is_empty() {
        println!("No sessions.");
        return;
    }

    for session in &sessions {
        println!(
            "{}  {}  {:<18} {:<6} {:>12}  {:>5.1}h  {}",
            session.start_time.format("%Y-%m-%d %H:%M"),
            session.game_type.as_str(),
            session.location,
            session.stakes,
            format_currency(session.profit, symbol),
            session.hours(),
            session.id,
        );
    }
    println!("\n{} sessions, total {}", sessions.len(), format_currency(analytics::total_profit(&sessions), symbol));
}

fn run_stats(store: &DataStore, by: Option<&str>, filter: &SessionFilter, symbol: &str) -> Result<()> {
    let sessions = filter.apply(&store.all_sessions());

    match by {
        Some(raw) => {
            let dimension = Dimension::parse(raw).ok_or_else(|| {
                let known: Vec<&str> = Dimension::ALL.iter().map(|d| d.as_str()).collect();
                anyhow!("Unknown dimension '{}' (expected one of: {})", raw, known.join(", "))
            })?;
            println!("📊 Results by {}\n", dimension.as_str());
            println!("{}", render_rows(&stats_by(dimension, &sessions), symbol));
        }
        None => {
            println!("📊 Summary\n");
            println!("{}", render_summary(&Summary::from_sessions(&sessions), symbol));
        }
    }

    Ok(())
}

fn run_wellness(
    store: &DataStore,
    data_dir: &Path,
    sleep: Option<&Path>,
    mindfulness: Option<&Path>,
    filter: &SessionFilter,
    symbol: &str,
) -> Result<()> {
    let (mut sleep_records, mut mindfulness_records) = wellness::load_data_dir(data_dir)
        .with_context(|| format!("Failed to read wellness files in {}", data_dir.display()))?;
    if let Some(path) = sleep {
        sleep_records = wellness::load_sleep_from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }
    if let Some(path) = mindfulness {
        mindfulness_records = wellness::load_mindfulness_from_path(path)
            .with_context(|| format!("Failed to read {}", path.display()))?;
    }

    let sessions = filter.apply(&store.all_sessions());
    let report = WellnessReport::build(&sessions, &sleep_records, &mindfulness_records);

    println!("😴 Wellness ({} sessions)\n", sessions.len());
    println!("{}", render_wellness(&report, symbol));
    Ok(())
}

fn run_series(store: &DataStore, bankroll: Option<&str>, symbol: &str) -> Result<()> {
    let points = match bankroll {
        Some(name) => {
            let bankroll = store
                .bankroll_by_name(name)
                .ok_or_else(|| anyhow!("No bankroll named '{}'", name))?;
            bankroll_series(&bankroll.sessions, &bankroll.transactions)
        }
        None => bankroll_series(&store.all_sessions(), &store.all_transactions()),
    };

    if points.is_empty() {
        println!("No activity.");
    } else {
        println!("{}", render_series(&points, symbol));
    }
    Ok(())
}

fn run_import(store: &mut DataStore, file: &Path) -> Result<()> {
    println!("📂 Loading CSV...");
    let (format, sessions) =
        import_from_path(file).with_context(|| format!("Failed to import {}", file.display()))?;
    println!("✓ Parsed {} sessions ({} format)", sessions.len(), format.name());

    let outcome = store.merge_sessions(sessions)?;
    println!("✓ Added {} sessions", outcome.added);
    if outcome.duplicates > 0 {
        println!("✓ Skipped {} duplicates", outcome.duplicates);
    }
    Ok(())
}

fn run_location(store: &mut DataStore, action: LocationAction) -> Result<()> {
    match action {
        LocationAction::Add { name, image } => {
            let mut location = Location::new(&name);
            if let Some(path) = image {
                location = location.with_image(LocationImage::Imported(path));
            }
            store.add_location(location)?;
            println!("✓ Added location {}", name.trim());
        }
        LocationAction::Delete { name } => {
            let removed = store.delete_location(&name)?;
            println!("✓ Deleted location {}", removed.name);
        }
        LocationAction::List => {
            for location in store.locations() {
                println!("{}", location.name);
            }
        }
    }
    Ok(())
}

fn run_stakes(store: &mut DataStore, action: StakesAction) -> Result<()> {
    match action {
        StakesAction::Add { stakes } => {
            store.add_stakes(&stakes)?;
            println!("✓ Added stakes {}", stakes.trim());
        }
        StakesAction::Delete { stakes } => {
            store.delete_stakes(&stakes)?;
            println!("✓ Deleted stakes {}", stakes.trim());
        }
        StakesAction::List => {
            for stakes in store.stakes() {
                println!("{}", stakes);
            }
        }
    }
    Ok(())
}

fn run_bankroll(store: &mut DataStore, action: BankrollAction, symbol: &str) -> Result<()> {
    match action {
        BankrollAction::Add { name } => {
            let id = store.add_bankroll(&name)?;
            println!("✓ Created bankroll {} ({})", name.trim(), id);
        }
        BankrollAction::Delete { name } => {
            let id = bankroll_id(store, &name)?;
            let removed = store.delete_bankroll(&id)?;
            println!(
                "✓ Deleted bankroll {} ({} sessions, {} transactions)",
                removed.name,
                removed.sessions.len(),
                removed.transactions.len()
            );
        }
        BankrollAction::List => {
            let default_balance =
                analytics::bankroll_balance(store.sessions(), store.transactions());
            println!(
                "{:<24} {:>8} {:>14}",
                "(default)",
                store.sessions().len(),
                format_currency(default_balance, symbol)
            );
            for bankroll in store.bankrolls() {
                println!(
                    "{:<24} {:>8} {:>14}",
                    bankroll.name,
                    bankroll.sessions.len(),
                    format_currency(bankroll.balance(), symbol)
                );
            }
        }
    }
    Ok(())
}

fn run_transaction(store: &mut DataStore, action: TransactionAction, symbol: &str) -> Result<()> {
    match action {
        TransactionAction::Add {
            kind,
            amount,
            date,
            notes,
            tags,
            bankroll,
        } => {
            let kind = TransactionKind::parse(&kind)
                .ok_or_else(|| anyhow!("Unknown transaction kind '{}'", kind))?;
            let transaction = Transaction::new(kind, amount, parse_date(&date)?)
                .with_notes(&notes)
                .with_tags(split_list(tags.as_deref()));
            let id = transaction.id.clone();
            match bankroll.as_deref() {
                Some(name) => {
                    let bankroll = bankroll_id(store, name)?;
                    store.add_transaction_to_bankroll(&bankroll, transaction)?;
                }
                None => store.add_transaction(transaction)?,
            }
            println!("✓ Added {} {}", kind.as_str(), id);
        }
        TransactionAction::Delete { id } => {
            let removed = store.delete_transaction(&id)?;
            println!("✓ Deleted {} {}", removed.kind.as_str(), removed.id);
        }
        TransactionAction::List => {
            for t in store.all_transactions() {
                println!(
                    "{}  {:<10} {:>12}  {}  [{}]  {}",
                    t.date,
                    t.kind.as_str(),
                    format_currency(t.signed_amount(), symbol),
                    t.id,
                    t.tags.join(", "),
                    t.notes
                );
            }
        }
    }
    Ok(())
}

fn run_check(store: &DataStore) {
    let engine = DataQualityEngine::new();
    let reports = engine.check_all(&store.all_sessions());

    for report in reports.iter().filter(|r| !r.is_clean()) {
        println!("{}", report.summary());
        for issue in &report.issues {
            println!("   {:?} {}: {}", issue.severity, issue.rule_name, issue.issue);
            println!("      → {}", issue.recommendation);
        }
    }

    println!("\n{}", engine.batch_summary(&reports).summary());
}
