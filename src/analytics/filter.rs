// Session filters - narrow a collection before aggregating it

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::entities::{GameType, Session};

/// All set criteria must match. An empty filter matches everything.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SessionFilter {
    /// Inclusive, compared against the start date
    pub from: Option<NaiveDate>,
    /// Inclusive, compared against the start date
    pub to: Option<NaiveDate>,
    pub year: Option<i32>,
    pub game_type: Option<GameType>,
    pub location: Option<String>,
    pub stakes: Option<String>,
    pub tag: Option<String>,
}

impl SessionFilter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_date(mut self, date: NaiveDate) -> Self {
        self.from = Some(date);
        self
    }

    pub fn to_date(mut self, date: NaiveDate) -> Self {
        self.to = Some(date);
        self
    }

    pub fn year(mut self, year: i32) -> Self {
        self.year = Some(year);
        self
    }

    pub fn game_type(mut self, game_type: GameType) -> Self {
        self.game_type = Some(game_type);
        self
    }

    pub fn location(mut self, location: &str) -> Self {
        self.location = Some(location.to_string());
        self
    }

    pub fn stakes(mut self, stakes: &str) -> Self {
        self.stakes = Some(stakes.to_string());
        self
    }

    pub fn tag(mut self, tag: &str) -> Self {
        self.tag = Some(tag.to_string());
        self
    }

    pub fn is_empty(&self) -> bool {
        *self == SessionFilter::default()
    }

    pub fn matches(&self, session: &Session) -> bool {
        let date = session.start_time.date();

        if self.from.is_some_and(|from| date < from) {
            return false;
        }
        if self.to.is_some_and(|to| date > to) {
            return false;
        }
        if self.year.is_some_and(|year| date.year() != year) {
            return false;
        }
        if self.game_type.is_some_and(|gt| session.game_type != gt) {
            return false;
        }
        if let Some(location) = &self.location {
            if !session.location.eq_ignore_ascii_case(location) {
                return false;
            }
        }
        if let Some(stakes) = &self.stakes {
            if session.stakes.trim() != stakes.trim() {
                return false;
            }
        }
        if let Some(tag) = &self.tag {
            if !session.has_tag(tag) {
                return false;
            }
        }

        true
    }

    pub fn apply(&self, sessions: &[Session]) -> Vec<Session> {
        sessions
            .iter()
            .filter(|s| self.matches(s))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_session(location: &str, game_type: GameType, y: i32, m: u32, d: u32) -> Session {
        let start = NaiveDate::from_ymd_opt(y, m, d)
            .unwrap()
            .and_hms_opt(19, 0, 0)
            .unwrap();
        Session::new(
            location,
            "NL Texas Hold Em",
            game_type,
            "1/2",
            100.0,
            150.0,
            50.0,
            start,
            start + chrono::Duration::hours(3),
        )
    }

    #[test]
    fn test_empty_filter_matches_all() {
        let sessions = vec![
            create_test_session("Aria", GameType::Cash, 2024, 1, 5),
            create_test_session("Wynn", GameType::Tournament, 2023, 6, 1),
        ];

        let filter = SessionFilter::new();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&sessions).len(), 2);
    }

    #[test]
    fn test_date_range_is_inclusive() {
        let sessions = vec![
            create_test_session("Aria", GameType::Cash, 2024, 1, 1),
            create_test_session("Aria", GameType::Cash, 2024, 1, 15),
            create_test_session("Aria", GameType::Cash, 2024, 1, 31),
            create_test_session("Aria", GameType::Cash, 2024, 2, 1),
        ];

        let filter = SessionFilter::new()
            .from_date(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap())
            .to_date(NaiveDate::from_ymd_opt(2024, 1, 31).unwrap());

        assert_eq!(filter.apply(&sessions).len(), 3);
    }

    #[test]
    fn test_combined_criteria() {
        let mut tagged = create_test_session("Aria", GameType::Cash, 2024, 3, 3);
        tagged.tags = vec!["Vacation".to_string()];

        let sessions = vec![
            tagged,
            create_test_session("aria", GameType::Cash, 2024, 3, 4),
            create_test_session("Aria", GameType::Tournament, 2024, 3, 5),
            create_test_session("Aria", GameType::Cash, 2023, 3, 3),
        ];

        let filter = SessionFilter::new()
            .year(2024)
            .game_type(GameType::Cash)
            .location("ARIA");
        assert_eq!(filter.apply(&sessions).len(), 2);

        let tagged_only = filter.tag("vacation");
        assert_eq!(tagged_only.apply(&sessions).len(), 1);
    }
}
