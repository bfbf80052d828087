// 📊 Grouped Performance - One reduction, many keys
//
// Every "performance by X" view is the same fold: pick a key per session,
// accumulate profit/hours/wins per key. `group_by` is that fold; the
// `by_*` functions only choose the key.

use chrono::{Datelike, Timelike, Weekday};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::entities::{GameType, Session};

// ============================================================================
// GROUP STATS
// ============================================================================

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GroupStats {
    pub count: usize,
    pub total_profit: f64,
    pub total_hours: f64,
    pub wins: usize,
}

impl GroupStats {
    pub fn add(&mut self, session: &Session) {
        self.count += 1;
        self.total_profit += session.profit;
        self.total_hours += session.hours();
        if session.is_win() {
            self.wins += 1;
        }
    }

    pub fn from_sessions<'a, I>(sessions: I) -> Self
    where
        I: IntoIterator<Item = &'a Session>,
    {
        let mut stats = GroupStats::default();
        for session in sessions {
            stats.add(session);
        }
        stats
    }

    pub fn hourly_rate(&self) -> f64 {
        if self.total_hours > 0.0 {
            self.total_profit / self.total_hours
        } else {
            0.0
        }
    }

    pub fn avg_profit(&self) -> f64 {
        if self.count > 0 {
            self.total_profit / self.count as f64
        } else {
            0.0
        }
    }

    pub fn avg_duration_hours(&self) -> f64 {
        if self.count > 0 {
            self.total_hours / self.count as f64
        } else {
            0.0
        }
    }

    pub fn win_rate(&self) -> f64 {
        if self.count > 0 {
            self.wins as f64 / self.count as f64
        } else {
            0.0
        }
    }
}

/// Fold sessions into per-key stats. Empty input → empty map.
pub fn group_by<K, F>(sessions: &[Session], key: F) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&Session) -> K,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for session in sessions {
        groups.entry(key(session)).or_default().add(session);
    }
    groups
}

/// Like `group_by`, but a session may land under several keys (or none)
pub fn group_by_many<K, F>(sessions: &[Session], keys: F) -> BTreeMap<K, GroupStats>
where
    K: Ord,
    F: Fn(&Session) -> Vec<K>,
{
    let mut groups: BTreeMap<K, GroupStats> = BTreeMap::new();
    for session in sessions {
        for key in keys(session) {
            groups.entry(key).or_default().add(session);
        }
    }
    groups
}

// ============================================================================
// KEYS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct YearMonth {
    pub year: i32,
    pub month: u32,
}

impl fmt::Display for YearMonth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum DayOfWeek {
    Monday,
    Tuesday,
    Wednesday,
    Thursday,
    Friday,
    Saturday,
    Sunday,
}

impl From<Weekday> for DayOfWeek {
    fn from(day: Weekday) -> Self {
        match day {
            Weekday::Mon => DayOfWeek::Monday,
            Weekday::Tue => DayOfWeek::Tuesday,
            Weekday::Wed => DayOfWeek::Wednesday,
            Weekday::Thu => DayOfWeek::Thursday,
            Weekday::Fri => DayOfWeek::Friday,
            Weekday::Sat => DayOfWeek::Saturday,
            Weekday::Sun => DayOfWeek::Sunday,
        }
    }
}

/// Start-hour buckets
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum TimeOfDay {
    /// 05:00 - 11:59
    Morning,
    /// 12:00 - 16:59
    Afternoon,
    /// 17:00 - 20:59
    Evening,
    /// 21:00 - 04:59
    Night,
}

impl TimeOfDay {
    pub fn from_hour(hour: u32) -> Self {
        match hour {
            5..=11 => TimeOfDay::Morning,
            12..=16 => TimeOfDay::Afternoon,
            17..=20 => TimeOfDay::Evening,
            _ => TimeOfDay::Night,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SessionLength {
    UnderTwoHours,
    TwoToFourHours,
    FourToSixHours,
    SixHoursPlus,
}

impl SessionLength {
    pub fn from_hours(hours: f64) -> Self {
        if hours < 2.0 {
            SessionLength::UnderTwoHours
        } else if hours < 4.0 {
            SessionLength::TwoToFourHours
        } else if hours < 6.0 {
            SessionLength::FourToSixHours
        } else {
            SessionLength::SixHoursPlus
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SessionLength::UnderTwoHours => "< 2h",
            SessionLength::TwoToFourHours => "2-4h",
            SessionLength::FourToSixHours => "4-6h",
            SessionLength::SixHoursPlus => "6h+",
        }
    }
}

// ============================================================================
// KEYED VIEWS
// ============================================================================

pub fn by_year(sessions: &[Session]) -> BTreeMap<i32, GroupStats> {
    group_by(sessions, |s| s.start_time.year())
}

pub fn by_month(sessions: &[Session]) -> BTreeMap<YearMonth, GroupStats> {
    group_by(sessions, |s| YearMonth {
        year: s.start_time.year(),
        month: s.start_time.month(),
    })
}

/// Calendar month regardless of year (1 = January)
pub fn by_month_of_year(sessions: &[Session]) -> BTreeMap<u32, GroupStats> {
    group_by(sessions, |s| s.start_time.month())
}

pub fn by_weekday(sessions: &[Session]) -> BTreeMap<DayOfWeek, GroupStats> {
    group_by(sessions, |s| DayOfWeek::from(s.start_time.weekday()))
}

pub fn by_time_of_day(sessions: &[Session]) -> BTreeMap<TimeOfDay, GroupStats> {
    group_by(sessions, |s| TimeOfDay::from_hour(s.start_time.hour()))
}

pub fn by_location(sessions: &[Session]) -> BTreeMap<String, GroupStats> {
    group_by(sessions, |s| s.location.clone())
}

pub fn by_stakes(sessions: &[Session]) -> BTreeMap<String, GroupStats> {
    group_by(sessions, |s| s.stakes.clone())
}

pub fn by_game(sessions: &[Session]) -> BTreeMap<String, GroupStats> {
    group_by(sessions, |s| s.game.clone())
}

pub fn by_game_type(sessions: &[Session]) -> BTreeMap<GameType, GroupStats> {
    group_by(sessions, |s| s.game_type)
}

pub fn by_session_length(sessions: &[Session]) -> BTreeMap<SessionLength, GroupStats> {
    group_by(sessions, |s| SessionLength::from_hours(s.hours()))
}

/// Untagged sessions are left out
pub fn by_tag(sessions: &[Session]) -> BTreeMap<String, GroupStats> {
    group_by_many(sessions, |s| s.tags.clone())
}

/// Sessions without a mood are left out
pub fn by_mood(sessions: &[Session]) -> BTreeMap<u8, GroupStats> {
    group_by_many(sessions, |s| s.mood.into_iter().collect())
}

// ============================================================================
// DIMENSION (labelled rows for CLI / API)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Dimension {
    Year,
    Month,
    MonthOfYear,
    Weekday,
    TimeOfDay,
    Location,
    Stakes,
    Game,
    GameType,
    SessionLength,
    Tag,
    Mood,
}

impl Dimension {
    pub const ALL: [Dimension; 12] = [
        Dimension::Year,
        Dimension::Month,
        Dimension::MonthOfYear,
        Dimension::Weekday,
        Dimension::TimeOfDay,
        Dimension::Location,
        Dimension::Stakes,
        Dimension::Game,
        Dimension::GameType,
        Dimension::SessionLength,
        Dimension::Tag,
        Dimension::Mood,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Dimension::Year => "year",
            Dimension::Month => "month",
            Dimension::MonthOfYear => "month_of_year",
            Dimension::Weekday => "weekday",
            Dimension::TimeOfDay => "time_of_day",
            Dimension::Location => "location",
            Dimension::Stakes => "stakes",
            Dimension::Game => "game",
            Dimension::GameType => "game_type",
            Dimension::SessionLength => "session_length",
            Dimension::Tag => "tag",
            Dimension::Mood => "mood",
        }
    }

    pub fn parse(value: &str) -> Option<Dimension> {
        let normalized = value.trim().to_lowercase().replace('-', "_");
        Dimension::ALL
            .into_iter()
            .find(|d| d.as_str() == normalized)
    }
}

/// One labelled row of a grouped view
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GroupRow {
    pub label: String,
    pub stats: GroupStats,
}

fn rows<K, L>(groups: BTreeMap<K, GroupStats>, label: L) -> Vec<GroupRow>
where
    L: Fn(&K) -> String,
{
    groups
        .into_iter()
        .map(|(key, stats)| GroupRow {
            label: label(&key),
            stats,
        })
        .collect()
}

fn month_name(month: u32) -> String {
    const NAMES: [&str; 12] = [
        "January", "February", "March", "April", "May", "June", "July", "August", "September",
        "October", "November", "December",
    ];
    NAMES
        .get(month.saturating_sub(1) as usize)
        .map(|n| n.to_string())
        .unwrap_or_else(|| month.to_string())
}

/// Grouped view as labelled rows, in key order
pub fn stats_by(dimension: Dimension, sessions: &[Session]) -> Vec<GroupRow> {
    match dimension {
        Dimension::Year => rows(by_year(sessions), |y| y.to_string()),
        Dimension::Month => rows(by_month(sessions), |ym| ym.to_string()),
        Dimension::MonthOfYear => rows(by_month_of_year(sessions), |m| month_name(*m)),
        Dimension::Weekday => rows(by_weekday(sessions), |d| format!("{:?}", d)),
        Dimension::TimeOfDay => rows(by_time_of_day(sessions), |t| format!("{:?}", t)),
        Dimension::Location => rows(by_location(sessions), |l| l.clone()),
        Dimension::Stakes => rows(by_stakes(sessions), |s| s.clone()),
        Dimension::Game => rows(by_game(sessions), |g| g.clone()),
        Dimension::GameType => rows(by_game_type(sessions), |g| g.as_str().to_string()),
        Dimension::SessionLength => rows(by_session_length(sessions), |l| l.label().to_string()),
        Dimension::Tag => rows(by_tag(sessions), |t| t.clone()),
        Dimension::Mood => rows(by_mood(sessions), |m| m.to_string()),
    }
}
