// 💵 Transaction Entity - Bankroll ledger entries
//
// Deposits add money to a bankroll, withdrawals and expenses remove it.
// The amount is always stored as a positive magnitude; the kind decides the sign.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TransactionKind {
    Deposit,
    Withdrawal,
    Expense,
}

impl TransactionKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransactionKind::Deposit => "Deposit",
            TransactionKind::Withdrawal => "Withdrawal",
            TransactionKind::Expense => "Expense",
        }
    }

    pub fn parse(value: &str) -> Option<TransactionKind> {
        match value.trim().to_lowercase().as_str() {
            "deposit" => Some(TransactionKind::Deposit),
            "withdrawal" | "withdraw" => Some(TransactionKind::Withdrawal),
            "expense" => Some(TransactionKind::Expense),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: String,
    pub kind: TransactionKind,
    pub amount: f64,
    pub date: NaiveDate,

    #[serde(default)]
    pub notes: String,

    #[serde(default)]
    pub tags: Vec<String>,
}

impl Transaction {
    pub fn new(kind: TransactionKind, amount: f64, date: NaiveDate) -> Self {
        Transaction {
            id: uuid::Uuid::new_v4().to_string(),
            kind,
            amount: amount.abs(),
            date,
            notes: String::new(),
            tags: Vec::new(),
        }
    }

    pub fn with_notes(mut self, notes: &str) -> Self {
        self.notes = notes.to_string();
        self
    }

    pub fn with_tags(mut self, tags: Vec<String>) -> Self {
        self.tags = tags;
        self
    }

    /// Effect on the bankroll balance
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            TransactionKind::Deposit => self.amount,
            TransactionKind::Withdrawal | TransactionKind::Expense => -self.amount,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    #[test]
    fn test_signed_amount() {
        assert_eq!(Transaction::new(TransactionKind::Deposit, 500.0, day(1)).signed_amount(), 500.0);
        assert_eq!(Transaction::new(TransactionKind::Withdrawal, 200.0, day(2)).signed_amount(), -200.0);
        assert_eq!(Transaction::new(TransactionKind::Expense, 35.0, day(3)).signed_amount(), -35.0);
    }

    #[test]
    fn test_amount_stored_as_magnitude() {
        let tx = Transaction::new(TransactionKind::Withdrawal, -80.0, day(4));
        assert_eq!(tx.amount, 80.0);
        assert_eq!(tx.signed_amount(), -80.0);
    }

    #[test]
    fn test_parse_kind() {
        assert_eq!(TransactionKind::parse("Deposit"), Some(TransactionKind::Deposit));
        assert_eq!(TransactionKind::parse("withdraw"), Some(TransactionKind::Withdrawal));
        assert_eq!(TransactionKind::parse("refund"), None);
    }
}
