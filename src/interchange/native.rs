// Native CSV layout - reads back what `export_sessions` writes

use csv::StringRecord;

use super::{
    date_time, field, optional_money, optional_mood, optional_u32, required_money, split_tags,
    yes_no, CsvFormat, SessionImporter, DATE_TIME_FORMAT, NATIVE_COLUMNS, TAG_SEPARATOR,
};
use crate::entities::{GameType, Session, TournamentDetails, TournamentSize, TournamentSpeed};
use crate::error::ImportError;

// Column positions (see NATIVE_COLUMNS)
const ID: usize = 0;
const START: usize = 1;
const END: usize = 2;
const GAME_TYPE: usize = 3;
const GAME: usize = 4;
const STAKES: usize = 5;
const LOCATION: usize = 6;
const BUY_IN: usize = 7;
const CASH_OUT: usize = 8;
const PROFIT: usize = 9;
const EXPENSES: usize = 10;
const MOOD: usize = 12;
const HANDS: usize = 13;
const ENTRANTS: usize = 14;
const FINISH: usize = 15;
const REBUYS: usize = 16;
const SPEED: usize = 17;
const SIZE: usize = 18;
const MULTI_DAY: usize = 19;
const DAYS: usize = 20;
const TAGS: usize = 21;
const NOTES: usize = 22;

pub struct NativeImporter;

impl NativeImporter {
    pub fn new() -> Self {
        NativeImporter
    }

    fn tournament(&self, line: usize, record: &StringRecord) -> Result<Option<TournamentDetails>, ImportError> {
        if (ENTRANTS..=DAYS).all(|i| field(record, i).is_empty()) {
            return Ok(None);
        }

        let speed = match field(record, SPEED) {
            "" => None,
            raw => Some(TournamentSpeed::parse(raw).ok_or_else(|| ImportError::InvalidField {
                line,
                field: "speed",
                value: raw.to_string(),
            })?),
        };
        let size = match field(record, SIZE) {
            "" => None,
            raw => Some(TournamentSize::parse(raw).ok_or_else(|| ImportError::InvalidField {
                line,
                field: "size",
                value: raw.to_string(),
            })?),
        };

        Ok(Some(TournamentDetails {
            entrants: optional_u32(record, ENTRANTS, line, "entrants")?,
            finish: optional_u32(record, FINISH, line, "finish")?,
            rebuy_count: optional_u32(record, REBUYS, line, "rebuy_count")?.unwrap_or(0),
            speed,
            size,
            is_multi_day: yes_no(field(record, MULTI_DAY)),
            days: optional_u32(record, DAYS, line, "days")?.unwrap_or(1),
        }))
    }
}

impl Default for NativeImporter {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionImporter for NativeImporter {
    fn format(&self) -> CsvFormat {
        CsvFormat::Native
    }

    fn expected_columns(&self) -> usize {
        NATIVE_COLUMNS.len()
    }

    fn parse_row(&self, line: usize, record: &StringRecord) -> Result<Session, ImportError> {
        let game_type_raw = field(record, GAME_TYPE);
        let game_type = GameType::parse(game_type_raw).ok_or_else(|| ImportError::InvalidField {
            line,
            field: "game_type",
            value: game_type_raw.to_string(),
        })?;

        let start_time = date_time(field(record, START), &[DATE_TIME_FORMAT], line, "start_time")?;
        let end_time = date_time(field(record, END), &[DATE_TIME_FORMAT], line, "end_time")?;

        let mut session = Session::new(
            field(record, LOCATION),
            field(record, GAME),
            game_type,
            field(record, STAKES),
            required_money(record, BUY_IN, line, "buy_in")?,
            required_money(record, CASH_OUT, line, "cash_out")?,
            required_money(record, PROFIT, line, "profit")?,
            start_time,
            end_time,
        );

        // Keep the exported identity so a re-import is recognisable
        let id = field(record, ID);
        if !id.is_empty() {
            session.id = id.to_string();
        }

        session.expenses = optional_money(record, EXPENSES, line, "expenses")?;
        session.mood = optional_mood(record, MOOD, line)?;
        session.hands_played = optional_u32(record, HANDS, line, "hands_played")?;
        session.tournament = self.tournament(line, record)?;
        session.tags = split_tags(field(record, TAGS), &[TAG_SEPARATOR]);
        session.notes = record.get(NOTES).unwrap_or("").to_string();

        Ok(session)
    }
}
