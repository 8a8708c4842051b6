use async_trait::async_trait;
use chrono::NaiveDate;
use factor_lens::{
    FactorSource, LabelMode, LensConfig, LensError, RegimePoint, RegimeSeries, RegimeSession,
    RegimeSource, Table, Timeframe, correlate, cumulative_returns, normalize_to_first,
};
use fnv::FnvHashMap;
use indexmap::IndexMap;
use smol_str::SmolStr;

/// Deterministic in-memory stand-in for the data-acquisition and
/// model-rebuild collaborators.
struct SyntheticSource {
    days: u32,
}

#[async_trait]
impl FactorSource for SyntheticSource {
    async fn fetch_factor_table(&self) -> Result<Table, LensError> {
        let dates = date_axis(self.days);
        let mut columns = IndexMap::new();
        columns.insert(
            SmolStr::new("btc_price"),
            (0..self.days)
                .map(|i| Some(16_500.0 + 120.0 * i as f64 + 900.0 * ((i % 7) as f64 - 3.0)))
                .collect(),
        );
        columns.insert(
            SmolStr::new("funding"),
            (0..self.days)
                .map(|i| Some(0.0001 * ((i % 5) as f64 - 2.0)))
                .collect(),
        );
        columns.insert(
            SmolStr::new("basis"),
            (0..self.days)
                .map(|i| if i % 11 == 0 { None } else { Some(0.002 * (i % 3) as f64) })
                .collect(),
        );
        Table::new(dates, columns)
    }
}

#[async_trait]
impl RegimeSource for SyntheticSource {
    async fn fetch_regime_series(&self, k: u32) -> Result<RegimeSeries, LensError> {
        let points = date_axis(self.days)
            .into_iter()
            .enumerate()
            .map(|(i, date)| {
                let label = (i as u32 / 20) % k;
                let mut probabilities = FnvHashMap::default();
                for regime in 0..k {
                    probabilities
                        .insert(regime, if regime == label { 1.0 } else { 0.0 });
                }
                RegimePoint {
                    date,
                    price: 16_500.0 + 120.0 * i as f64,
                    label,
                    smoothed: Some(label),
                    probabilities,
                }
            })
            .collect();
        RegimeSeries::new(k, points)
    }

    async fn rebuild_regime_model(&self, k: u32) -> Result<(), LensError> {
        tracing::info!(k, "synthetic model rebuild");
        Ok(())
    }
}

fn date_axis(days: u32) -> Vec<NaiveDate> {
    let start = NaiveDate::from_ymd_opt(2023, 1, 1).unwrap();
    (0..days)
        .map(|i| start + chrono::Duration::days(i as i64))
        .collect()
}

#[tokio::main]
async fn main() {
    // Initialise INFO Tracing log subscriber
    init_logging();

    let source = SyntheticSource { days: 120 };

    // Factor table: correlation matrix and cumulative returns
    let table = source.fetch_factor_table().await.unwrap();
    let recent = table.filter_by_timeframe(Timeframe::M3).unwrap();
    println!(
        "Factor table: {} rows total, {} in the last 3 months",
        table.len(),
        recent.len()
    );

    let factors = table.factor_columns();
    let matrix = correlate(&table, &factors).unwrap();
    println!("\nCorrelation matrix over {:?}:", matrix.factors);
    for row in &matrix.correlation_matrix {
        let cells: Vec<String> = row.iter().map(|v| format!("{v:+.3}")).collect();
        println!("  [{}]", cells.join(", "));
    }

    let funding = table.column("funding").unwrap();
    let growth = cumulative_returns(funding);
    println!(
        "\nFunding cumulative growth over {} days: {:.4}",
        table.len(),
        growth.last().unwrap()
    );

    let reference = table.column("btc_price").unwrap();
    let normalized = normalize_to_first(reference);
    println!(
        "Reference asset moved {:+.1}% over the window",
        (normalized.last().unwrap() - 1.0) * 100.0
    );

    // Regime session: load, rebuild for a new k, filter, segment
    let mut session = RegimeSession::new(LensConfig::default());
    session.load(&source).await.unwrap();
    println!(
        "\nLoaded regime series: k={}, {} rows",
        session.k(),
        session.base().len()
    );

    session.set_k(&source, 4).await.unwrap();
    session.set_mode(LabelMode::Smoothed);
    session.apply_date_range(
        Some(NaiveDate::from_ymd_opt(2023, 2, 1).unwrap()),
        Some(NaiveDate::from_ymd_opt(2023, 3, 31).unwrap()),
    );

    let snapshot = session.snapshot();
    println!(
        "Session now: k={}, mode={}, {} visible rows, rebuilding={}",
        snapshot.k,
        snapshot.mode,
        snapshot.filtered.len(),
        snapshot.is_rebuilding
    );

    println!("\nRegime bands in the visible window:");
    for segment in session.segments() {
        println!(
            "  {} -> {}  regime {}",
            segment.start, segment.end, segment.label
        );
    }
}

// Initialise an INFO `Subscriber` for `Tracing` logs
fn init_logging() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::filter::EnvFilter::builder()
                .with_default_directive(tracing_subscriber::filter::LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_ansi(cfg!(debug_assertions))
        .init()
}
