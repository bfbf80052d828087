// Third-party tracker export - fixed 44-column layout
//
// Only the columns that map onto a session are read; the rest (currency,
// table size, position, focus...) are checked for presence and ignored.

use csv::StringRecord;

use super::{
    date_time, field, optional_money, optional_mood, optional_u32, required_money, split_tags,
    yes_no, CsvFormat, SessionImporter,
};
use crate::entities::{GameType, Session, TournamentDetails, TournamentSize, TournamentSpeed};
use crate::error::ImportError;

pub const THIRD_PARTY_COLUMNS: [&str; 44] = [
    "Start Date",
    "Start Time",
    "End Date",
    "End Time",
    "Session Type",
    "Variant",
    "Limit",
    "Small Blind",
    "Big Blind",
    "Straddle",
    "Ante",
    "Currency",
    "Location",
    "Location Type",
    "Buy-in",
    "Rebuys",
    "Add-ons",
    "Cash Out",
    "Net",
    "Tips",
    "Fees",
    "Food",
    "Travel",
    "Other Expenses",
    "Hours",
    "Break Minutes",
    "Hands",
    "Table Size",
    "Players",
    "Position",
    "Entrants",
    "Prize Pool",
    "Finish",
    "Bounty Winnings",
    "Tournament Speed",
    "Tournament Size",
    "Multi Day",
    "Day Count",
    "Mood",
    "Focus",
    "Energy",
    "Tags",
    "Notes",
    "Session ID",
];

const START_DATE: usize = 0;
const START_TIME: usize = 1;
const END_DATE: usize = 2;
const END_TIME: usize = 3;
const SESSION_TYPE: usize = 4;
const VARIANT: usize = 5;
const LIMIT: usize = 6;
const SMALL_BLIND: usize = 7;
const BIG_BLIND: usize = 8;
const STRADDLE: usize = 9;
const LOCATION: usize = 12;
const BUY_IN: usize = 14;
const CASH_OUT: usize = 17;
const NET: usize = 18;
const HANDS: usize = 26;
const ENTRANTS: usize = 30;
const FINISH: usize = 32;
const SPEED: usize = 34;
const SIZE: usize = 35;
const MULTI_DAY: usize = 36;
const DAY_COUNT: usize = 37;
const MOOD: usize = 38;
const TAGS: usize = 41;
const NOTES: usize = 42;

/// Rebuys, Add-ons, Tips, Fees, Food, Travel, Other Expenses
const EXPENSE_COLUMNS: [(usize, &str); 7] = [
    (15, "rebuys"),
    (16, "add_ons"),
    (19, "tips"),
    (20, "fees"),
    (21, "food"),
    (22, "travel"),
    (23, "other_expenses"),
];

const DATE_TIME_FORMATS: [&str; 4] = [
    "%m/%d/%Y %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%d %H:%M:%S",
];

pub struct ThirdPartyImporter;

impl ThirdPartyImporter {
    pub fn new() -> Self {
        ThirdPartyImporter
    }

    /// "1" + "2" + "" → "1/2"; "0.5" + "1" + "2" → "0.5/1/2"
    fn stakes(&self, line: usize, record: &StringRecord) -> Result<String, ImportError> {
        let mut parts = Vec::new();
        for (index, name) in [
            (SMALL_BLIND, "small_blind"),
            (BIG_BLIND, "big_blind"),
            (STRADDLE, "straddle"),
        ] {
            if let Some(amount) = optional_money(record, index, line, name)? {
                parts.push(amount.to_string());
            }
        }
        Ok(parts.join("/"))
    }

    fn game(&self, record: &StringRecord) -> String {
        [field(record, LIMIT), field(record, VARIANT)]
            .iter()
            .filter(|part| !part.is_empty())
            .copied()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Sum of the expense columns, `None` when all are blank
    fn expenses(&self, line: usize, record: &StringRecord) -> Result<Option<f64>, ImportError> {
        let mut total = None;
        for (index, name) in EXPENSE_COLUMNS {
            if let Some(amount) = optional_money(record, index, line, name)? {
                total = Some(total.unwrap_or(0.0) + amount);
            }
        }
        Ok(total)
    }

    fn tournament(&self, line: usize, record: &StringRecord) -> Result<TournamentDetails, ImportError> {
        Ok(TournamentDetails {
            entrants: optional_u32(record, ENTRANTS, line, "entrants")?,
            finish: optional_u32(record, FINISH, line, "finish")?,
            rebuy_count: 0,
            speed: TournamentSpeed::parse(field(record, SPEED)),
            size: TournamentSize::parse(field(record, SIZE)),
            is_multi_day: yes_no(field(record, MULTI_DAY)),
            days: optional_u32(record, DAY_COUNT, line, "day_count")?.unwrap_or(1),
        })
    }
}

impl Default for ThirdPartyImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionImporter for ThirdPartyImporter {
    fn format(&self) -> CsvFormat {
        CsvFormat::ThirdParty
    }

    fn expected_columns(&self) -> usize {
        THIRD_PARTY_COLUMNS.len()
    }

    fn parse_row(&self, line: usize, record: &StringRecord) -> Result<Session, ImportError> {
        let session_type = field(record, SESSION_TYPE);
        let game_type = GameType::parse(session_type).ok_or_else(|| ImportError::InvalidField {
            line,
            field: "session_type",
            value: session_type.to_string(),
        })?;

        let start = format!("{} {}", field(record, START_DATE), field(record, START_TIME));
        let end = format!("{} {}", field(record, END_DATE), field(record, END_TIME));

        let mut session = Session::new(
            field(record, LOCATION),
            &self.game(record),
            game_type,
            &self.stakes(line, record)?,
            required_money(record, BUY_IN, line, "buy_in")?,
            required_money(record, CASH_OUT, line, "cash_out")?,
            required_money(record, NET, line, "net")?,
            date_time(&start, &DATE_TIME_FORMATS, line, "start")?,
            date_time(&end, &DATE_TIME_FORMATS, line, "end")?,
        );

        session.expenses = self.expenses(line, record)?;
        session.hands_played = optional_u32(record, HANDS, line, "hands")?;
        session.mood = optional_mood(record, MOOD, line)?;
        session.tags = split_tags(field(record, TAGS), &[';', ',']);
        session.notes = field(record, NOTES).to_string();
        if game_type == GameType::Tournament {
            session.tournament = Some(self.tournament(line, record)?);
        }

        Ok(session)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::interchange::import_sessions;

    fn header() -> String {
        THIRD_PARTY_COLUMNS.join(",")
    }

    fn row(values: &[(usize, &str)]) -> String {
        let mut cells = vec![String::new(); THIRD_PARTY_COLUMNS.len()];
        for (index, value) in values {
            cells[*index] = value.to_string();
        }
        cells.join(",")
    }

    fn cash_row() -> String {
        row(&[
            (START_DATE, "03/15/2024"),
            (START_TIME, "19:30"),
            (END_DATE, "03/16/2024"),
            (END_TIME, "01:00"),
            (SESSION_TYPE, "Cash Game"),
            (VARIANT, "Hold Em"),
            (LIMIT, "NL"),
            (SMALL_BLIND, "1.00"),
            (BIG_BLIND, "3.00"),
            (LOCATION, "Wynn"),
            (BUY_IN, "300"),
            (CASH_OUT, "655"),
            (NET, "340"),
            (19, "15"),
            (HANDS, "160"),
            (MOOD, "4"),
            (TAGS, "Vegas;Trip"),
            (NOTES, "long session"),
        ])
    }

    #[test]
    fn test_parse_cash_row() {
        let csv = format!("{}\n{}\n", header(), cash_row());

        let (format, sessions) = import_sessions(csv.as_bytes()).unwrap();

        assert_eq!(format, CsvFormat::ThirdParty);
        let session = &sessions[0];
        assert_eq!(session.game, "NL Hold Em");
        assert_eq!(session.stakes, "1/3");
        assert_eq!(session.location, "Wynn");
        assert_eq!(session.profit, 340.0);
        assert_eq!(session.expenses, Some(15.0));
        assert_eq!(session.hours(), 5.5);
        assert_eq!(session.hands_played, Some(160));
        assert_eq!(session.mood, Some(4));
        assert_eq!(session.tags, vec!["Vegas", "Trip"]);
        assert!(session.tournament.is_none());
        assert!(!session.id.is_empty());
    }

    #[test]
    fn test_parse_tournament_row() {
        let csv = format!(
            "{}\n{}\n",
            header(),
            row(&[
                (START_DATE, "2024-06-01"),
                (START_TIME, "12:00"),
                (END_DATE, "2024-06-01"),
                (END_TIME, "20:15"),
                (SESSION_TYPE, "Tournament"),
                (VARIANT, "Hold Em"),
                (LIMIT, "NL"),
                (LOCATION, "Aria"),
                (BUY_IN, "$400"),
                (15, "$400"),
                (20, "40"),
                (CASH_OUT, "$2150.00"),
                (NET, "$1310.00"),
                (ENTRANTS, "212"),
                (FINISH, "9"),
                (SPEED, "Turbo"),
                (SIZE, "Medium"),
            ])
        );

        let (_, sessions) = import_sessions(csv.as_bytes()).unwrap();
        let session = &sessions[0];

        assert!(session.is_tournament());
        assert_eq!(session.stakes, "");
        assert_eq!(session.cash_out, 2150.0);
        assert_eq!(session.expenses, Some(440.0));
        let details = session.tournament.as_ref().unwrap();
        assert_eq!(details.entrants, Some(212));
        assert_eq!(details.finish, Some(9));
        assert_eq!(details.speed, Some(TournamentSpeed::Turbo));
        assert_eq!(details.size, Some(TournamentSize::Medium));
        assert_eq!(details.days, 1);
    }

    #[test]
    fn test_wrong_column_count_fails_whole_import() {
        let short = cash_row().rsplit_once(',').map(|(head, _)| head.to_string()).unwrap();
        let csv = format!("{}\n{}\n{}\n", header(), cash_row(), short);

        let err = import_sessions(csv.as_bytes()).unwrap_err();
        assert!(matches!(
            err,
            ImportError::ColumnCount { line: 3, expected: 44, found: 43 }
        ));
    }

    #[test]
    fn test_bad_number_names_line_and_field() {
        let bad = cash_row().replace(",655,", ",six fifty,");
        let csv = format!("{}\n{}\n", header(), bad);

        match import_sessions(csv.as_bytes()).unwrap_err() {
            ImportError::InvalidNumber { line, field, value } => {
                assert_eq!(line, 2);
                assert_eq!(field, "cash_out");
                assert_eq!(value, "six fifty");
            }
            other => panic!("unexpected error: {other}"),
        }
    }
}
