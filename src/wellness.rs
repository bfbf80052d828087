// 😴 Wellness Correlation - Sleep, mindfulness and mood against results
//
// Health data comes from CSV files the user exports from a health app or
// types in. Records are lined up with sessions by calendar date.

use chrono::NaiveDate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap, HashSet};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::{debug, info};

use crate::analytics::{GroupRow, GroupStats};
use crate::entities::Session;
use crate::error::ImportError;

/// Looked up in the data directory by `load_data_dir`
pub const SLEEP_FILE: &str = "sleep.csv";
pub const MINDFULNESS_FILE: &str = "mindfulness.csv";

// ============================================================================
// RECORDS
// ============================================================================

/// Sleep that ended on `date` (i.e. the night before that day)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SleepRecord {
    pub date: NaiveDate,
    pub hours: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MindfulnessRecord {
    pub date: NaiveDate,
    pub minutes: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SleepBucket {
    Under6,
    SixToEight,
    Over8,
}

impl SleepBucket {
    pub fn from_hours(hours: f64) -> Self {
        if hours < 6.0 {
            SleepBucket::Under6
        } else if hours <= 8.0 {
            SleepBucket::SixToEight
        } else {
            SleepBucket::Over8
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SleepBucket::Under6 => "< 6h",
            SleepBucket::SixToEight => "6-8h",
            SleepBucket::Over8 => "> 8h",
        }
    }
}

// ============================================================================
// LOADING
// ============================================================================

fn load_records<T, R>(reader: R) -> Result<Vec<T>, ImportError>
where
    T: DeserializeOwned,
    R: Read,
{
    let mut csv_reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .from_reader(reader);

    let records = csv_reader
        .deserialize()
        .collect::<Result<Vec<T>, csv::Error>>()?;
    Ok(records)
}

/// Read `date,hours` rows (dates as YYYY-MM-DD)
pub fn load_sleep<R: Read>(reader: R) -> Result<Vec<SleepRecord>, ImportError> {
    load_records(reader)
}

/// Read `date,minutes` rows (dates as YYYY-MM-DD)
pub fn load_mindfulness<R: Read>(reader: R) -> Result<Vec<MindfulnessRecord>, ImportError> {
    load_records(reader)
}

pub fn load_sleep_from_path(path: &Path) -> Result<Vec<SleepRecord>, ImportError> {
    load_sleep(File::open(path)?)
}

pub fn load_mindfulness_from_path(path: &Path) -> Result<Vec<MindfulnessRecord>, ImportError> {
    load_mindfulness(File::open(path)?)
}

/// Sleep and mindfulness files kept next to the session data.
/// A missing file reads as no records.
pub fn load_data_dir(dir: &Path) -> Result<(Vec<SleepRecord>, Vec<MindfulnessRecord>), ImportError> {
    let sleep_path = dir.join(SLEEP_FILE);
    let sleep = if sleep_path.exists() {
        load_sleep_from_path(&sleep_path)?
    } else {
        debug!(path = %sleep_path.display(), "no sleep file");
        Vec::new()
    };

    let mindfulness_path = dir.join(MINDFULNESS_FILE);
    let mindfulness = if mindfulness_path.exists() {
        load_mindfulness_from_path(&mindfulness_path)?
    } else {
        debug!(path = %mindfulness_path.display(), "no mindfulness file");
        Vec::new()
    };

    info!(sleep = sleep.len(), mindfulness = mindfulness.len(), "loaded wellness records");
    Ok((sleep, mindfulness))
}

// ============================================================================
// SLEEP
// ============================================================================

/// Total sleep per date; several records on one date are summed (naps)
fn sleep_by_date(sleep: &[SleepRecord]) -> HashMap<NaiveDate, f64> {
    let mut by_date: HashMap<NaiveDate, f64> = HashMap::new();
    for record in sleep {
        *by_date.entry(record.date).or_insert(0.0) += record.hours;
    }
    by_date
}

/// Sleep recorded for the session's start date
pub fn sleep_before(session: &Session, sleep: &[SleepRecord]) -> Option<f64> {
    sleep_by_date(sleep).get(&session.start_time.date()).copied()
}

/// (sleep hours, profit) for every session with a sleep record
pub fn sleep_pairs(sessions: &[Session], sleep: &[SleepRecord]) -> Vec<(f64, f64)> {
    let by_date = sleep_by_date(sleep);
    sessions
        .iter()
        .filter_map(|s| {
            by_date
                .get(&s.start_time.date())
                .map(|hours| (*hours, s.profit))
        })
        .collect()
}

pub fn by_sleep_bucket(sessions: &[Session], sleep: &[SleepRecord]) -> BTreeMap<SleepBucket, GroupStats> {
    let by_date = sleep_by_date(sleep);
    let mut groups: BTreeMap<SleepBucket, GroupStats> = BTreeMap::new();

    for session in sessions {
        if let Some(hours) = by_date.get(&session.start_time.date()) {
            groups
                .entry(SleepBucket::from_hours(*hours))
                .or_default()
                .add(session);
        }
    }

    groups
}

pub fn sleep_profit_correlation(sessions: &[Session], sleep: &[SleepRecord]) -> Option<f64> {
    pearson(&sleep_pairs(sessions, sleep))
}

// ============================================================================
// MINDFULNESS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MindfulnessSplit {
    pub with_practice: GroupStats,
    pub without_practice: GroupStats,
}

/// Sessions on days with any mindfulness minutes vs days without
pub fn mindfulness_split(sessions: &[Session], mindfulness: &[MindfulnessRecord]) -> MindfulnessSplit {
    let practiced: HashSet<NaiveDate> = mindfulness
        .iter()
        .filter(|m| m.minutes > 0.0)
        .map(|m| m.date)
        .collect();

    let mut split = MindfulnessSplit::default();
    for session in sessions {
        if practiced.contains(&session.start_time.date()) {
            split.with_practice.add(session);
        } else {
            split.without_practice.add(session);
        }
    }
    split
}

// ============================================================================
// MOOD
// ============================================================================

pub fn mood_profit_correlation(sessions: &[Session]) -> Option<f64> {
    let pairs: Vec<(f64, f64)> = sessions
        .iter()
        .filter_map(|s| s.mood.map(|m| (m as f64, s.profit)))
        .collect();
    pearson(&pairs)
}

// ============================================================================
// REPORT
// ============================================================================

/// Everything the wellness views show, in one serializable value
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct WellnessReport {
    pub mood_correlation: Option<f64>,
    pub sleep_correlation: Option<f64>,
    pub sleep_buckets: Vec<GroupRow>,
    /// None when no mindfulness records were supplied
    pub mindfulness: Option<MindfulnessSplit>,
}

impl WellnessReport {
    pub fn build(sessions: &[Session], sleep: &[SleepRecord], mindfulness: &[MindfulnessRecord]) -> Self {
        let sleep_buckets = by_sleep_bucket(sessions, sleep)
            .into_iter()
            .map(|(bucket, stats)| GroupRow {
                label: bucket.label().to_string(),
                stats,
            })
            .collect();

        WellnessReport {
            mood_correlation: mood_profit_correlation(sessions),
            sleep_correlation: sleep_profit_correlation(sessions, sleep),
            sleep_buckets,
            mindfulness: (!mindfulness.is_empty()).then(|| mindfulness_split(sessions, mindfulness)),
        }
    }
}

// ============================================================================
// PEARSON
// ============================================================================

/// Pearson correlation coefficient. None with fewer than two pairs or when
/// either side has zero variance.
pub fn pearson(pairs: &[(f64, f64)]) -> Option<f64> {
    if pairs.len() < 2 {
        return None;
    }

    let n = pairs.len() as f64;
    let mean_x = pairs.iter().map(|(x, _)| x).sum::<f64>() / n;
    let mean_y = pairs.iter().map(|(_, y)| y).sum::<f64>() / n;

    let mut covariance = 0.0;
    let mut var_x = 0.0;
    let mut var_y = 0.0;
    for (x, y) in pairs {
        let dx = x - mean_x;
        let dy = y - mean_y;
        covariance += dx * dy;
        var_x += dx * dx;
        var_y += dy * dy;
    }

    if var_x == 0.0 || var_y == 0.0 {
        return None;
    }

    Some(covariance / (var_x.sqrt() * var_y.sqrt()))
}
