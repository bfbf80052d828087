// 📈 Session Analytics - Derived metrics over session collections
//
// Everything here is a pure, single-pass reduction over an in-memory slice.
// Empty input is never an error: scalars come back as zero, optional
// ratios as None, series as empty vectors.

pub mod filter;
pub mod grouping;

pub use filter::SessionFilter;
pub use grouping::{
    by_game, by_game_type, by_location, by_month, by_month_of_year, by_mood, by_session_length,
    by_stakes, by_tag, by_time_of_day, by_weekday, by_year, group_by, group_by_many, stats_by,
    DayOfWeek, Dimension, GroupRow, GroupStats, SessionLength, TimeOfDay, YearMonth,
};

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::entities::{Session, Transaction};

// ============================================================================
// SCALAR STATISTICS
// ============================================================================

/// Sum of session profits, added in start-time order so the result matches
/// the last point of `cumulative_bankroll` exactly.
pub fn total_profit(sessions: &[Session]) -> f64 {
    chronological(sessions).iter().map(|s| s.profit).sum()
}

pub fn total_hours(sessions: &[Session]) -> f64 {
    sessions.iter().map(|s| s.hours()).sum()
}

/// Total profit over total hours played
pub fn hourly_rate(sessions: &[Session]) -> f64 {
    let hours = total_hours(sessions);
    if hours > 0.0 {
        total_profit(sessions) / hours
    } else {
        0.0
    }
}

pub fn average_profit(sessions: &[Session]) -> f64 {
    if sessions.is_empty() {
        0.0
    } else {
        total_profit(sessions) / sessions.len() as f64
    }
}

pub fn average_duration_hours(sessions: &[Session]) -> f64 {
    if sessions.is_empty() {
        0.0
    } else {
        total_hours(sessions) / sessions.len() as f64
    }
}

/// Fraction of sessions with positive profit (0.0 - 1.0)
pub fn win_rate(sessions: &[Session]) -> f64 {
    if sessions.is_empty() {
        return 0.0;
    }
    let wins = sessions.iter().filter(|s| s.is_win()).count();
    wins as f64 / sessions.len() as f64
}

/// Sample standard deviation. Fewer than two values → 0.
fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.sqrt()
}

/// Standard deviation of session profits
pub fn standard_deviation(sessions: &[Session]) -> f64 {
    let profits: Vec<f64> = sessions.iter().map(|s| s.profit).collect();
    sample_std_dev(&profits)
}

/// Standard deviation of per-session hourly rates (zero-length sessions skipped)
pub fn standard_deviation_per_hour(sessions: &[Session]) -> f64 {
    let rates: Vec<f64> = sessions
        .iter()
        .filter(|s| s.hours() > 0.0)
        .map(|s| s.hourly_rate())
        .collect();
    sample_std_dev(&rates)
}

/// Big blinds won per hour, over sessions whose stakes name a big blind
pub fn bb_per_hour(sessions: &[Session]) -> f64 {
    let (bb_total, hours) = sessions
        .iter()
        .filter(|s| !s.is_tournament())
        .filter_map(|s| s.bb_won().map(|bb| (bb, s.hours())))
        .fold((0.0, 0.0), |(bb_acc, h_acc), (bb, h)| (bb_acc + bb, h_acc + h));

    if hours > 0.0 {
        bb_total / hours
    } else {
        0.0
    }
}

/// Sessions ordered by start time (stable for equal starts)
pub fn chronological(sessions: &[Session]) -> Vec<&Session> {
    let mut ordered: Vec<&Session> = sessions.iter().collect();
    ordered.sort_by_key(|s| s.start_time);
    ordered
}

/// Running bankroll after each session, in start-time order.
/// The last element equals `total_profit`.
pub fn cumulative_bankroll(sessions: &[Session]) -> Vec<f64> {
    let mut running = 0.0;
    chronological(sessions)
        .into_iter()
        .map(|s| {
            running += s.profit;
            running
        })
        .collect()
}

/// Tournament profit over tournament cost (buy-ins plus expenses).
/// None when there is no cost to divide by.
pub fn tournament_roi(sessions: &[Session]) -> Option<f64> {
    let (profit, cost) = sessions
        .iter()
        .filter(|s| s.is_tournament())
        .fold((0.0, 0.0), |(p, c), s| (p + s.profit, c + s.total_cost()));

    if cost > 0.0 {
        Some(profit / cost)
    } else {
        None
    }
}

/// Fraction of tournaments that paid out
pub fn itm_rate(sessions: &[Session]) -> f64 {
    let tournaments: Vec<&Session> = sessions.iter().filter(|s| s.is_tournament()).collect();
    if tournaments.is_empty() {
        return 0.0;
    }
    let cashed = tournaments.iter().filter(|s| s.cash_out > 0.0).count();
    cashed as f64 / tournaments.len() as f64
}

pub fn best_session(sessions: &[Session]) -> Option<&Session> {
    sessions
        .iter()
        .max_by(|a, b| a.profit.total_cmp(&b.profit))
}

pub fn worst_session(sessions: &[Session]) -> Option<&Session> {
    sessions
        .iter()
        .min_by(|a, b| a.profit.total_cmp(&b.profit))
}

/// Longest run of consecutive winning sessions. Break-even sessions end a run.
pub fn longest_win_streak(sessions: &[Session]) -> usize {
    longest_streak(sessions, |s| s.profit > 0.0)
}

/// Longest run of consecutive losing sessions. Break-even sessions end a run.
pub fn longest_loss_streak(sessions: &[Session]) -> usize {
    longest_streak(sessions, |s| s.profit < 0.0)
}

fn longest_streak<F>(sessions: &[Session], predicate: F) -> usize
where
    F: Fn(&Session) -> bool,
{
    let mut longest = 0;
    let mut current = 0;
    for session in chronological(sessions) {
        if predicate(session) {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

// ============================================================================
// SUMMARY
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Summary {
    pub session_count: usize,
    pub total_profit: f64,
    pub total_hours: f64,
    pub hourly_rate: f64,
    pub average_profit: f64,
    pub average_duration_hours: f64,
    pub win_rate: f64,
    pub standard_deviation: f64,
    pub standard_deviation_per_hour: f64,
    pub bb_per_hour: f64,
    pub tournament_roi: Option<f64>,
    pub itm_rate: f64,
    pub best_profit: Option<f64>,
    pub worst_profit: Option<f64>,
    pub longest_win_streak: usize,
    pub longest_loss_streak: usize,
}

impl Summary {
    pub fn from_sessions(sessions: &[Session]) -> Self {
        Summary {
            session_count: sessions.len(),
            total_profit: total_profit(sessions),
            total_hours: total_hours(sessions),
            hourly_rate: hourly_rate(sessions),
            average_profit: average_profit(sessions),
            average_duration_hours: average_duration_hours(sessions),
            win_rate: win_rate(sessions),
            standard_deviation: standard_deviation(sessions),
            standard_deviation_per_hour: standard_deviation_per_hour(sessions),
            bb_per_hour: bb_per_hour(sessions),
            tournament_roi: tournament_roi(sessions),
            itm_rate: itm_rate(sessions),
            best_profit: best_session(sessions).map(|s| s.profit),
            worst_profit: worst_session(sessions).map(|s| s.profit),
            longest_win_streak: longest_win_streak(sessions),
            longest_loss_streak: longest_loss_streak(sessions),
        }
    }
}

// ============================================================================
// BANKROLL LEDGER SERIES
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalancePoint {
    pub at: NaiveDateTime,
    pub change: f64,
    pub balance: f64,
}

/// Balance from session results plus ledger movements
pub fn bankroll_balance(sessions: &[Session], transactions: &[Transaction]) -> f64 {
    total_profit(sessions) + transactions.iter().map(|t| t.signed_amount()).sum::<f64>()
}

/// Running balance across sessions (at their end time) and transactions
/// (at midnight of their date), merged in time order. Ties keep transactions
/// first.
pub fn bankroll_series(sessions: &[Session], transactions: &[Transaction]) -> Vec<BalancePoint> {
    let mut events: Vec<(NaiveDateTime, u8, f64)> = Vec::with_capacity(sessions.len() + transactions.len());

    for tx in transactions {
        let at = tx.date.and_time(chrono::NaiveTime::MIN);
        events.push((at, 0, tx.signed_amount()));
    }
    for session in sessions {
        events.push((session.end_time.max(session.start_time), 1, session.profit));
    }

    events.sort_by(|a, b| a.0.cmp(&b.0).then(a.1.cmp(&b.1)));

    let mut balance = 0.0;
    events
        .into_iter()
        .map(|(at, _, change)| {
            balance += change;
            BalancePoint { at, change, balance }
        })
        .collect()
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{GameType, TournamentDetails, TransactionKind};
    use chrono::NaiveDate;

    fn at(d: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 4, d)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn create_test_session(profit: f64, day: u32, hours: i64) -> Session {
        Session::new(
            "Aria",
            "NL Texas Hold Em",
            GameType::Cash,
            "1/2",
            300.0,
            300.0 + profit,
            profit,
            at(day, 18),
            at(day, 18) + chrono::Duration::hours(hours),
        )
    }

    fn create_test_tournament(buy_in: f64, cash_out: f64, expenses: Option<f64>, day: u32) -> Session {
        let fees = expenses.unwrap_or(0.0);
        let mut session = Session::new(
            "Aria",
            "NL Texas Hold Em",
            GameType::Tournament,
            "MTT",
            buy_in,
            cash_out,
            cash_out - buy_in - fees,
            at(day, 12),
            at(day, 17),
        )
        .with_tournament(TournamentDetails::default());
        session.expenses = expenses;
        session
    }

    #[test]
    fn test_empty_input_defaults() {
        let empty: Vec<Session> = Vec::new();

        assert_eq!(total_profit(&empty), 0.0);
        assert_eq!(hourly_rate(&empty), 0.0);
        assert_eq!(win_rate(&empty), 0.0);
        assert_eq!(standard_deviation(&empty), 0.0);
        assert_eq!(bb_per_hour(&empty), 0.0);
        assert!(cumulative_bankroll(&empty).is_empty());
        assert!(tournament_roi(&empty).is_none());
        assert!(best_session(&empty).is_none());
        assert_eq!(longest_win_streak(&empty), 0);

        let summary = Summary::from_sessions(&empty);
        assert_eq!(summary.session_count, 0);
        assert_eq!(summary.total_profit, 0.0);
    }

    #[test]
    fn test_cumulative_bankroll_last_equals_total() {
        let sessions = vec![
            create_test_session(120.0, 3, 4),
            create_test_session(-80.0, 1, 2),
            create_test_session(45.5, 2, 3),
            create_test_session(-10.25, 4, 1),
        ];

        let series = cumulative_bankroll(&sessions);

        assert_eq!(series, vec![-80.0, -34.5, 85.5, 75.25]);
        assert_eq!(*series.last().unwrap(), total_profit(&sessions));
    }

    #[test]
    fn test_total_profit_matches_series_for_unordered_input() {
        let sessions = vec![
            create_test_session(0.1, 3, 1),
            create_test_session(0.2, 1, 1),
            create_test_session(0.3, 2, 1),
        ];

        let series = cumulative_bankroll(&sessions);
        let summary = Summary::from_sessions(&sessions);

        assert_eq!(series.last(), Some(&total_profit(&sessions)));
        assert_eq!(summary.total_profit, *series.last().unwrap());
    }

    #[test]
    fn test_standard_deviation_single_session_is_zero() {
        let sessions = vec![create_test_session(500.0, 1, 3)];
        assert_eq!(standard_deviation(&sessions), 0.0);
        assert_eq!(standard_deviation_per_hour(&sessions), 0.0);
    }

    #[test]
    fn test_standard_deviation_sample() {
        // profits 2, 4, 4, 4, 5, 5, 7, 9 → mean 5, squared deviations sum 32, n-1 = 7
        let sessions: Vec<Session> = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]
            .iter()
            .enumerate()
            .map(|(i, p)| create_test_session(*p, i as u32 + 1, 2))
            .collect();

        let expected = (32.0_f64 / 7.0).sqrt();
        assert!((standard_deviation(&sessions) - expected).abs() < 1e-9);
    }

    #[test]
    fn test_hourly_and_win_rate() {
        let sessions = vec![
            create_test_session(200.0, 1, 4),
            create_test_session(-100.0, 2, 2),
            create_test_session(0.0, 3, 2),
        ];

        assert_eq!(total_hours(&sessions), 8.0);
        assert_eq!(hourly_rate(&sessions), 12.5);
        assert!((win_rate(&sessions) - 1.0 / 3.0).abs() < 1e-12);
        assert!((average_profit(&sessions) - 100.0 / 3.0).abs() < 1e-12);
        assert!((average_duration_hours(&sessions) - 8.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_bb_per_hour_skips_tournaments_and_unknown_stakes() {
        let mut unknown = create_test_session(500.0, 3, 5);
        unknown.stakes = "Mixed".to_string();

        let sessions = vec![
            create_test_session(100.0, 1, 2), // 50 bb over 2h
            create_test_session(-20.0, 2, 3), // -10 bb over 3h
            unknown,
            create_test_tournament(100.0, 400.0, Some(10.0), 4),
        ];

        assert_eq!(bb_per_hour(&sessions), 8.0);
    }

    #[test]
    fn test_tournament_roi_and_itm() {
        let sessions = vec![
            create_test_tournament(100.0, 0.0, Some(10.0), 1),
            create_test_tournament(100.0, 450.0, Some(10.0), 2),
            create_test_session(999.0, 3, 4),
        ];

        // profit: -110 + 340 = 230, cost: 220
        let roi = tournament_roi(&sessions).unwrap();
        assert!((roi - 230.0 / 220.0).abs() < 1e-12);
        assert_eq!(itm_rate(&sessions), 0.5);
    }

    #[test]
    fn test_tournament_roi_missing_expenses_does_not_panic() {
        let sessions = vec![create_test_tournament(50.0, 0.0, None, 1)];

        assert_eq!(tournament_roi(&sessions), Some(-1.0));
    }

    #[test]
    fn test_roi_without_tournaments_is_none() {
        let sessions = vec![create_test_session(100.0, 1, 2)];
        assert!(tournament_roi(&sessions).is_none());
        assert_eq!(itm_rate(&sessions), 0.0);
    }

    #[test]
    fn test_streaks_follow_start_order() {
        let sessions = vec![
            create_test_session(10.0, 5, 1),
            create_test_session(10.0, 1, 1),
            create_test_session(-10.0, 2, 1),
            create_test_session(-10.0, 3, 1),
            create_test_session(0.0, 4, 1),
            create_test_session(10.0, 6, 1),
            create_test_session(10.0, 7, 1),
        ];

        // order: W L L E W W W
        assert_eq!(longest_win_streak(&sessions), 3);
        assert_eq!(longest_loss_streak(&sessions), 2);
    }

    #[test]
    fn test_best_and_worst_session() {
        let sessions = vec![
            create_test_session(10.0, 1, 1),
            create_test_session(-300.0, 2, 1),
            create_test_session(750.0, 3, 1),
        ];

        assert_eq!(best_session(&sessions).unwrap().profit, 750.0);
        assert_eq!(worst_session(&sessions).unwrap().profit, -300.0);
    }

    #[test]
    fn test_bankroll_series_merges_transactions() {
        let sessions = vec![create_test_session(150.0, 2, 3), create_test_session(-50.0, 4, 2)];
        let transactions = vec![
            Transaction::new(TransactionKind::Deposit, 1000.0, NaiveDate::from_ymd_opt(2024, 4, 1).unwrap()),
            Transaction::new(TransactionKind::Withdrawal, 200.0, NaiveDate::from_ymd_opt(2024, 4, 3).unwrap()),
        ];

        let series = bankroll_series(&sessions, &transactions);
        let balances: Vec<f64> = series.iter().map(|p| p.balance).collect();

        assert_eq!(balances, vec![1000.0, 1150.0, 950.0, 900.0]);
        assert_eq!(*balances.last().unwrap(), bankroll_balance(&sessions, &transactions));
    }

    #[test]
    fn test_summary_from_sessions() {
        let sessions = vec![create_test_session(100.0, 1, 2), create_test_session(-40.0, 2, 2)];

        let summary = Summary::from_sessions(&sessions);

        assert_eq!(summary.session_count, 2);
        assert_eq!(summary.total_profit, 60.0);
        assert_eq!(summary.hourly_rate, 15.0);
        assert_eq!(summary.win_rate, 0.5);
        assert_eq!(summary.best_profit, Some(100.0));
        assert_eq!(summary.worst_profit, Some(-40.0));
        assert_eq!(summary.longest_win_streak, 1);
        assert!(summary.tournament_roi.is_none());
    }
}
