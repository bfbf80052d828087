// CSV export - fixed column order, every field quoted

use csv::{QuoteStyle, WriterBuilder};
use std::fs::File;
use std::io::Write;
use std::path::Path;
use tracing::info;

use super::DATE_TIME_FORMAT;
use crate::entities::Session;
use crate::error::ExportError;

/// Joins tags in the native `tags` column. Tags may contain commas.
pub const TAG_SEPARATOR: char = ';';

/// Column order of the native layout. Import depends on it.
pub const NATIVE_COLUMNS: [&str; 23] = [
    "id",
    "start_time",
    "end_time",
    "game_type",
    "game",
    "stakes",
    "location",
    "buy_in",
    "cash_out",
    "profit",
    "expenses",
    "hours",
    "mood",
    "hands_played",
    "entrants",
    "finish",
    "rebuy_count",
    "speed",
    "size",
    "is_multi_day",
    "days",
    "tags",
    "notes",
];

fn opt<T: ToString>(value: Option<T>) -> String {
    value.map(|v| v.to_string()).unwrap_or_default()
}

/// One session as a native row. Money uses `f64` display, which is the
/// shortest text that parses back to the same value.
fn to_row(session: &Session) -> Vec<String> {
    let tournament = session.tournament.as_ref();

    vec![
        session.id.clone(),
        session.start_time.format(DATE_TIME_FORMAT).to_string(),
        session.end_time.format(DATE_TIME_FORMAT).to_string(),
        session.game_type.as_str().to_string(),
        session.game.clone(),
        session.stakes.clone(),
        session.location.clone(),
        session.buy_in.to_string(),
        session.cash_out.to_string(),
        session.profit.to_string(),
        opt(session.expenses),
        format!("{:.2}", session.hours()),
        opt(session.mood),
        opt(session.hands_played),
        opt(tournament.and_then(|t| t.entrants)),
        opt(tournament.and_then(|t| t.finish)),
        opt(tournament.map(|t| t.rebuy_count)),
        opt(tournament.and_then(|t| t.speed).map(|s| s.as_str())),
        opt(tournament.and_then(|t| t.size).map(|s| s.as_str())),
        opt(tournament.map(|t| if t.is_multi_day { "Yes" } else { "No" })),
        opt(tournament.map(|t| t.days)),
        session.tags.join(TAG_SEPARATOR.to_string().as_str()),
        session.notes.clone(),
    ]
}

/// Write a header row plus one row per session. Returns rows written.
pub fn export_sessions<W: Write>(writer: W, sessions: &[Session]) -> Result<usize, ExportError> {
    if sessions.is_empty() {
        return Err(ExportError::NothingToExport);
    }

    let mut csv_writer = WriterBuilder::new()
        .quote_style(QuoteStyle::Always)
        .from_writer(writer);

    csv_writer.write_record(NATIVE_COLUMNS)?;
    for session in sessions {
        csv_writer.write_record(to_row(session))?;
    }
    csv_writer.flush()?;

    info!(sessions = sessions.len(), "exported sessions");
    Ok(sessions.len())
}

pub fn export_to_path(path: &Path, sessions: &[Session]) -> Result<usize, ExportError> {
    let file = File::create(path)?;
    export_sessions(file, sessions)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{GameType, TournamentDetails, TournamentSpeed};
    use crate::interchange::import_sessions;
    use chrono::NaiveDate;

    fn create_test_session(profit: f64) -> Session {
        let start = NaiveDate::from_ymd_opt(2024, 9, 14)
            .unwrap()
            .and_hms_opt(20, 15, 30)
            .unwrap();
        Session::new(
            "Commerce Casino",
            "NL Texas Hold Em",
            GameType::Cash,
            "2/5",
            500.0,
            500.0 + profit,
            profit,
            start,
            start + chrono::Duration::minutes(275),
        )
        .with_notes("Table broke, \"good\" game")
        .with_tags(vec!["Weekend".to_string(), "Live".to_string()])
        .with_mood(4)
    }

    #[test]
    fn test_export_quotes_every_field() {
        let mut buffer = Vec::new();
        let written = export_sessions(&mut buffer, &[create_test_session(312.75)]).unwrap();
        let text = String::from_utf8(buffer).unwrap();

        assert_eq!(written, 1);
        let mut lines = text.lines();
        assert!(lines.next().unwrap().starts_with("\"id\",\"start_time\""));
        let row = lines.next().unwrap();
        assert!(row.contains("\"2024-09-14 20:15:30\""));
        assert!(row.contains("\"312.75\""));
        assert!(row.contains("\"Weekend;Live\""));
        assert!(row.contains("\"Table broke, \"\"good\"\" game\""));
    }

    #[test]
    fn test_export_round_trips_profit_and_dates() {
        let tricky = create_test_session(0.1 + 0.2);
        let tournament = Session::new(
            "Aria",
            "NL Texas Hold Em",
            GameType::Tournament,
            "",
            1100.0,
            0.0,
            -1250.0,
            NaiveDate::from_ymd_opt(2024, 9, 20).unwrap().and_hms_opt(11, 0, 0).unwrap(),
            NaiveDate::from_ymd_opt(2024, 9, 21).unwrap().and_hms_opt(2, 30, 0).unwrap(),
        )
        .with_expenses(150.0)
        .with_tournament(TournamentDetails {
            entrants: Some(842),
            finish: Some(301),
            rebuy_count: 1,
            speed: Some(TournamentSpeed::Turbo),
            size: None,
            is_multi_day: true,
            days: 2,
        });
        let originals = vec![tricky, tournament];

        let mut buffer = Vec::new();
        export_sessions(&mut buffer, &originals).unwrap();
        let (_, imported) = import_sessions(buffer.as_slice()).unwrap();

        assert_eq!(imported.len(), 2);
        for (original, back) in originals.iter().zip(imported.iter()) {
            assert_eq!(back.profit, original.profit);
            assert_eq!(back.start_time, original.start_time);
            assert_eq!(back.end_time, original.end_time);
        }
        assert_eq!(imported, originals);
    }

    #[test]
    fn test_export_round_trips_punctuated_tags() {
        let session = create_test_session(-80.0).with_tags(vec![
            "Vegas, NV".to_string(),
            "Tilt (mild)".to_string(),
        ]);

        let mut buffer = Vec::new();
        export_sessions(&mut buffer, &[session.clone()]).unwrap();
        let (_, imported) = import_sessions(buffer.as_slice()).unwrap();

        assert_eq!(imported[0].tags, session.tags);
    }

    #[test]
    fn test_export_nothing() {
        let mut buffer = Vec::new();
        assert!(matches!(
            export_sessions(&mut buffer, &[]),
            Err(ExportError::NothingToExport)
        ));
    }
}
