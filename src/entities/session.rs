// 🃏 Session Entity - One played poker game and its financial outcome
//
// A session is immutable once created: it is appended to a bankroll and later
// deleted, never edited in place.
//
// Profit is STORED, not derived from buy-in/cash-out. The two may disagree;
// validation reports it, nothing here corrects it.

use chrono::{Duration, NaiveDateTime};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

// ============================================================================
// GAME TYPE
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum GameType {
    Cash,
    Tournament,
}

impl GameType {
    pub fn as_str(&self) -> &'static str {
        match self {
            GameType::Cash => "Cash",
            GameType::Tournament => "Tournament",
        }
    }

    pub fn parse(value: &str) -> Option<GameType> {
        match value.trim().to_lowercase().as_str() {
            "cash" | "cash game" => Some(GameType::Cash),
            "tournament" | "mtt" | "sng" => Some(GameType::Tournament),
            _ => None,
        }
    }
}

// ============================================================================
// TOURNAMENT DETAILS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentSpeed {
    Standard,
    Turbo,
    HyperTurbo,
}

impl TournamentSpeed {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentSpeed::Standard => "Standard",
            TournamentSpeed::Turbo => "Turbo",
            TournamentSpeed::HyperTurbo => "Hyper-Turbo",
        }
    }

    pub fn parse(value: &str) -> Option<TournamentSpeed> {
        match value.trim().to_lowercase().replace('-', "").as_str() {
            "standard" | "regular" => Some(TournamentSpeed::Standard),
            "turbo" => Some(TournamentSpeed::Turbo),
            "hyperturbo" | "hyper" => Some(TournamentSpeed::HyperTurbo),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TournamentSize {
    Small,
    Medium,
    Large,
}

impl TournamentSize {
    pub fn as_str(&self) -> &'static str {
        match self {
            TournamentSize::Small => "Small",
            TournamentSize::Medium => "Medium",
            TournamentSize::Large => "Large",
        }
    }

    pub fn parse(value: &str) -> Option<TournamentSize> {
        match value.trim().to_lowercase().as_str() {
            "small" => Some(TournamentSize::Small),
            "medium" => Some(TournamentSize::Medium),
            "large" => Some(TournamentSize::Large),
            _ => None,
        }
    }
}

/// Optional tournament fields. Cash sessions carry `None`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TournamentDetails {
    pub entrants: Option<u32>,
    pub finish: Option<u32>,
    #[serde(default)]
    pub rebuy_count: u32,
    pub speed: Option<TournamentSpeed>,
    pub size: Option<TournamentSize>,

    /// Multi-day markers
    #[serde(default)]
    pub is_multi_day: bool,
    #[serde(default = "default_days")]
    pub days: u32,
}

fn default_days() -> u32 {
    1
}

impl Default for TournamentDetails {
    fn default() -> Self {
        TournamentDetails {
            entrants: None,
            finish: None,
            rebuy_count: 0,
            speed: None,
            size: None,
            is_multi_day: false,
            days: 1,
        }
    }
}

// ============================================================================
// SESSION ENTITY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    /// Stable identity (UUID)
    pub id: String,

    /// Location name (reference into the location list)
    pub location: String,

    /// Game name, e.g. "NL Texas Hold Em"
    pub game: String,
    pub game_type: GameType,

    /// Stakes as entered, e.g. "1/2" or "2/5/10"
    pub stakes: String,

    // ========================================================================
    // MONEY
    // ========================================================================
    pub buy_in: f64,
    pub cash_out: f64,
    pub profit: f64,

    /// Tips, rake, travel, tournament fees
    #[serde(default)]
    pub expenses: Option<f64>,

    // ========================================================================
    // TIME (local wall clock)
    // ========================================================================
    pub start_time: NaiveDateTime,
    pub end_time: NaiveDateTime,

    // ========================================================================
    // EXTRAS
    // ========================================================================
    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub tags: Vec<String>,

    /// Self-reported mood, 1 (worst) to 5 (best)
    #[serde(default)]
    pub mood: Option<u8>,

    #[serde(default)]
    pub hands_played: Option<u32>,

    #[serde(default)]
    pub tournament: Option<TournamentDetails>,
}

impl Session {
    /// Create a session. Profit is supplied by the caller, never computed.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        location: &str,
        game: &str,
        game_type: GameType,
        stakes: &str,
        buy_in: f64,
        cash_out: f64,
        profit: f64,
        start_time: NaiveDateTime,
        end_time: NaiveDateTime,
    ) -> Self {
        Session {
            id: uuid::Uuid::new_v4().to_string(),
            location: location.to_string(),
            game: game.to_string(),
            game_type,
            stakes: stakes.to_string(),
            buy_in,
            cash_out,
            profit,
            expenses: None,
            start_time,
            end_time,
            notes: String::new(),
            tags: Vec::new(),
            mood: None,
            hands_played: None,
            tournament: None,
        }
    }

    /// Builder pattern: add expenses
    pub fn with_expenses(mut self, expenses: f64) -> Self {
        self.expenses = Some(expenses);
        self
    }

    /// Builder pattern: add notes
    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    /// Builder pattern: add tags
    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Builder pattern: add mood
    pub fn with_mood(mut self, mood: u8) -> Self {
        self.mood = Some(mood);
        self
    }

    /// Builder pattern: add hands played
    pub fn with_hands_played(mut self, hands: u32) -> Self {
        self.hands_played = Some(hands);
        self
    }

    /// Builder pattern: add tournament details
    pub fn with_tournament(mut self, details: TournamentDetails) -> Self {
        self.tournament = Some(details);
        self
    }

    pub fn is_tournament(&self) -> bool {
        self.game_type == GameType::Tournament
    }

    pub fn is_win(&self) -> bool {
        self.profit > 0.0
    }

    /// Session length; zero when end precedes start
    pub fn duration(&self) -> Duration {
        let raw = self.end_time - self.start_time;
        if raw < Duration::zero() {
            Duration::zero()
        } else {
            raw
        }
    }

    pub fn hours(&self) -> f64 {
        self.duration().num_seconds() as f64 / 3600.0
    }

    /// Profit per hour; zero for a zero-length session
    pub fn hourly_rate(&self) -> f64 {
        let hours = self.hours();
        if hours > 0.0 {
            self.profit / hours
        } else {
            0.0
        }
    }

    /// Expenses with the missing case treated as zero
    pub fn expenses_or_zero(&self) -> f64 {
        self.expenses.unwrap_or(0.0)
    }

    /// Buy-in plus expenses (rebuys and fees are recorded as expenses)
    pub fn total_cost(&self) -> f64 {
        self.buy_in + self.expenses_or_zero()
    }

    /// Profit as implied by cash flow, for comparison with the stored value
    pub fn cash_flow_profit(&self) -> f64 {
        self.cash_out - self.buy_in - self.expenses_or_zero()
    }

    /// Big blind parsed from stakes
    pub fn big_blind(&self) -> Option<f64> {
        parse_big_blind(&self.stakes)
    }

    /// Profit in big blinds
    pub fn bb_won(&self) -> Option<f64> {
        self.big_blind().map(|bb| self.profit / bb)
    }

    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags.iter().any(|t| t.eq_ignore_ascii_case(tag))
    }

    /// Fingerprint for duplicate detection on import.
    /// NOTE: This is for DEDUPLICATION, not IDENTITY (identity = id).
    pub fn fingerprint(&self) -> String {
        let mut hasher = Sha256::new();
        hasher.update(format!(
            "{}|{}|{}|{}",
            self.start_time.format("%Y-%m-%d %H:%M:%S"),
            self.profit,
            self.location.trim().to_lowercase(),
            self.stakes.trim()
        ));
        format!("{:x}", hasher.finalize())
    }
}

/// Parse the big blind out of a stakes string.
///
/// "1/2" → 2, "2/5/10" → 5 (third number is a straddle), "$5" → 5.
/// Returns None for anything non-numeric or non-positive.
pub fn parse_big_blind(stakes: &str) -> Option<f64> {
    let parts: Vec<&str> = stakes.split('/').map(|p| p.trim()).collect();

    let raw = match parts.len() {
        0 => return None,
        1 => parts[0],
        _ => parts[1],
    };

    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    match cleaned.parse::<f64>() {
        Ok(bb) if bb > 0.0 => Some(bb),
        _ => None,
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn at(day: u32, hour: u32, minute: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 3, day)
            .unwrap()
            .and_hms_opt(hour, minute, 0)
            .unwrap()
    }

    fn create_test_session(profit: f64, start: NaiveDateTime, end: NaiveDateTime) -> Session {
        Session::new(
            "Bellagio",
            "NL Texas Hold Em",
            GameType::Cash,
            "1/2",
            300.0,
            300.0 + profit,
            profit,
            start,
            end,
        )
    }

    #[test]
    fn test_session_creation() {
        let session = create_test_session(150.0, at(1, 19, 0), at(1, 23, 0));

        assert!(!session.id.is_empty());
        assert_eq!(session.location, "Bellagio");
        assert_eq!(session.game_type, GameType::Cash);
        assert!(session.is_win());
        assert!(!session.is_tournament());
        assert!(session.expenses.is_none());
    }

    #[test]
    fn test_duration_and_hourly_rate() {
        let session = create_test_session(200.0, at(1, 20, 0), at(1, 22, 30));

        assert_eq!(session.hours(), 2.5);
        assert_eq!(session.hourly_rate(), 80.0);
    }

    #[test]
    fn test_end_before_start_clamps_to_zero() {
        let session = create_test_session(100.0, at(2, 22, 0), at(2, 20, 0));

        assert_eq!(session.duration(), Duration::zero());
        assert_eq!(session.hours(), 0.0);
        assert_eq!(session.hourly_rate(), 0.0);
    }

    #[test]
    fn test_session_spanning_midnight() {
        let session = create_test_session(-60.0, at(1, 22, 0), at(2, 1, 0));

        assert_eq!(session.hours(), 3.0);
        assert_eq!(session.hourly_rate(), -20.0);
    }

    #[test]
    fn test_parse_big_blind() {
        assert_eq!(parse_big_blind("1/2"), Some(2.0));
        assert_eq!(parse_big_blind("2/5/10"), Some(5.0));
        assert_eq!(parse_big_blind("$1/$3"), Some(3.0));
        assert_eq!(parse_big_blind("0.25/0.50"), Some(0.5));
        assert_eq!(parse_big_blind("5"), Some(5.0));
        assert_eq!(parse_big_blind("NL"), None);
        assert_eq!(parse_big_blind(""), None);
        assert_eq!(parse_big_blind("1/0"), None);
    }

    #[test]
    fn test_bb_won() {
        let session = create_test_session(100.0, at(1, 19, 0), at(1, 21, 0));
        assert_eq!(session.bb_won(), Some(50.0));
    }

    #[test]
    fn test_cash_flow_profit_is_independent_of_stored_profit() {
        let mut session = create_test_session(100.0, at(1, 19, 0), at(1, 21, 0));
        session.profit = 250.0;

        assert_eq!(session.cash_flow_profit(), 100.0);
        assert_eq!(session.profit, 250.0);
    }

    #[test]
    fn test_tournament_cost_without_expenses() {
        let session = Session::new(
            "Aria",
            "NL Texas Hold Em",
            GameType::Tournament,
            "MTT",
            200.0,
            0.0,
            -200.0,
            at(3, 12, 0),
            at(3, 16, 0),
        )
        .with_tournament(TournamentDetails {
            entrants: Some(120),
            finish: Some(57),
            ..Default::default()
        });

        assert_eq!(session.total_cost(), 200.0);
        assert_eq!(session.tournament.as_ref().unwrap().days, 1);
    }

    #[test]
    fn test_parse_enums() {
        assert_eq!(GameType::parse("Cash Game"), Some(GameType::Cash));
        assert_eq!(GameType::parse("MTT"), Some(GameType::Tournament));
        assert_eq!(TournamentSpeed::parse("Hyper-Turbo"), Some(TournamentSpeed::HyperTurbo));
        assert_eq!(TournamentSize::parse("large"), Some(TournamentSize::Large));
        assert_eq!(GameType::parse("bingo"), None);
    }

    #[test]
    fn test_fingerprint_ignores_identity() {
        let a = create_test_session(75.0, at(4, 19, 0), at(4, 22, 0));
        let mut b = a.clone();
        b.id = uuid::Uuid::new_v4().to_string();
        b.location = "bellagio ".to_string();

        assert_ne!(a.id, b.id);
        assert_eq!(a.fingerprint(), b.fingerprint());
        assert_eq!(a.fingerprint().len(), 64);

        b.profit = 76.0;
        assert_ne!(a.fingerprint(), b.fingerprint());
    }

    #[test]
    fn test_has_tag_case_insensitive() {
        let session = create_test_session(10.0, at(1, 19, 0), at(1, 20, 0))
            .with_tags(vec!["Vacation".to_string()]);

        assert!(session.has_tag("vacation"));
        assert!(!session.has_tag("home game"));
    }
}
