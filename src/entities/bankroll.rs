// 🏦 Bankroll Entity - A named pool of sessions and ledger transactions
//
// A user can keep several bankrolls side by side (e.g. "Live" and "Online").
// The store also keeps a default, unnamed bankroll at the top level.

use serde::{Deserialize, Serialize};

use super::session::Session;
use super::transaction::Transaction;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Bankroll {
    pub id: String,
    pub name: String,

    #[serde(default)]
    pub sessions: Vec<Session>,

    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Bankroll {
    pub fn new(name: &str) -> Self {
        Bankroll {
            id: uuid::Uuid::new_v4().to_string(),
            name: name.to_string(),
            sessions: Vec::new(),
            transactions: Vec::new(),
        }
    }

    pub fn session_profit(&self) -> f64 {
        self.sessions.iter().map(|s| s.profit).sum()
    }

    pub fn transaction_total(&self) -> f64 {
        self.transactions.iter().map(|t| t.signed_amount()).sum()
    }

    /// Session results plus ledger movements
    pub fn balance(&self) -> f64 {
        self.session_profit() + self.transaction_total()
    }

    pub fn is_empty(&self) -> bool {
        self.sessions.is_empty() && self.transactions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::session::GameType;
    use crate::entities::transaction::TransactionKind;
    use chrono::NaiveDate;

    #[test]
    fn test_bankroll_balance() {
        let start = NaiveDate::from_ymd_opt(2024, 1, 10)
            .unwrap()
            .and_hms_opt(18, 0, 0)
            .unwrap();
        let end = start + chrono::Duration::hours(4);

        let mut bankroll = Bankroll::new("Live");
        assert!(bankroll.is_empty());

        bankroll.sessions.push(Session::new(
            "Wynn", "NL Texas Hold Em", GameType::Cash, "2/5", 1000.0, 1450.0, 450.0, start, end,
        ));
        bankroll.transactions.push(Transaction::new(
            TransactionKind::Deposit,
            2000.0,
            start.date(),
        ));
        bankroll.transactions.push(Transaction::new(
            TransactionKind::Withdrawal,
            300.0,
            start.date(),
        ));

        assert_eq!(bankroll.session_profit(), 450.0);
        assert_eq!(bankroll.transaction_total(), 1700.0);
        assert_eq!(bankroll.balance(), 2150.0);
        assert!(!bankroll.is_empty());
    }
}
