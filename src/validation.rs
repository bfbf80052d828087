// ✅ Session Data Quality - Report integrity problems, never fix them
//
// Stored sessions can be inconsistent: end before start, profit that does
// not match buy-in/cash-out, tournaments without expenses. Analytics copes
// with all of these (clamped durations, missing expenses = 0); this engine
// makes them visible.

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::entities::Session;

// ============================================================================
// VALIDATION RESULT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Severity {
    Critical, // Value is impossible (negative money, mood out of range)
    Warning,  // Value is suspicious and skews analytics
    Info,     // Value is fine but incomplete
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationResult {
    pub passed: bool,
    pub rule_name: String,
    pub field: String,
    pub message: String,
    pub severity: Severity,
}

impl ValidationResult {
    pub fn pass(rule_name: &str, field: &str, message: &str) -> Self {
        ValidationResult {
            passed: true,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity: Severity::Info,
        }
    }

    pub fn fail(rule_name: &str, field: &str, message: &str, severity: Severity) -> Self {
        ValidationResult {
            passed: false,
            rule_name: rule_name.to_string(),
            field: field.to_string(),
            message: message.to_string(),
            severity,
        }
    }
}

// ============================================================================
// QUALITY REPORT
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityIssue {
    pub severity: Severity,
    pub rule_name: String,
    pub field: String,
    pub issue: String,
    pub recommendation: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QualityReport {
    pub session_id: String,
    pub validations: Vec<ValidationResult>,
    pub issues: Vec<QualityIssue>,
    pub passed_count: usize,
    pub failed_count: usize,
}

impl QualityReport {
    pub fn is_clean(&self) -> bool {
        self.issues.is_empty()
    }

    pub fn has_critical_issues(&self) -> bool {
        self.issues.iter().any(|i| i.severity == Severity::Critical)
    }

    pub fn has_issue(&self, rule_name: &str) -> bool {
        self.issues.iter().any(|i| i.rule_name == rule_name)
    }

    pub fn summary(&self) -> String {
        format!(
            "Session {}: {} checks passed, {} issues ({} critical)",
            self.session_id,
            self.passed_count,
            self.issues.len(),
            self.issues
                .iter()
                .filter(|i| i.severity == Severity::Critical)
                .count()
        )
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BatchSummary {
    pub total_sessions: usize,
    pub clean_count: usize,
    pub warning_count: usize,
    pub critical_count: usize,
}

impl BatchSummary {
    pub fn summary(&self) -> String {
        format!(
            "{} sessions: {} clean, {} with warnings, {} critical",
            self.total_sessions, self.clean_count, self.warning_count, self.critical_count
        )
    }
}

// ============================================================================
// DATA QUALITY ENGINE
// ============================================================================

pub struct DataQualityEngine {
    /// Allowed gap between stored profit and cash-flow profit
    pub profit_tolerance: f64,
}

impl DataQualityEngine {
    pub fn new() -> Self {
        DataQualityEngine {
            profit_tolerance: 0.01,
        }
    }

    pub fn with_tolerance(profit_tolerance: f64) -> Self {
        DataQualityEngine { profit_tolerance }
    }

    /// Run every rule against one session
    pub fn check(&self, session: &Session) -> QualityReport {
        let checks = [
            (
                self.validate_time_order(session),
                "Correct the start or end time; duration is treated as zero",
            ),
            (
                self.validate_tournament_expenses(session),
                "Record tournament fees and rebuys as expenses (0 if none)",
            ),
            (
                self.validate_profit(session),
                "Check buy-in, cash-out and expenses against the recorded profit",
            ),
            (
                self.validate_location(session),
                "Pick a location so the session shows up in location stats",
            ),
            (
                self.validate_mood(session),
                "Mood must be between 1 and 5",
            ),
            (
                self.validate_money(session),
                "Buy-in, cash-out and expenses cannot be negative",
            ),
        ];

        let mut validations = Vec::with_capacity(checks.len());
        let mut issues = Vec::new();

        for (result, recommendation) in checks {
            if !result.passed {
                issues.push(QualityIssue {
                    severity: result.severity.clone(),
                    rule_name: result.rule_name.clone(),
                    field: result.field.clone(),
                    issue: result.message.clone(),
                    recommendation: recommendation.to_string(),
                });
            }
            validations.push(result);
        }

        let passed_count = validations.iter().filter(|v| v.passed).count();
        let failed_count = validations.len() - passed_count;

        QualityReport {
            session_id: session.id.clone(),
            validations,
            issues,
            passed_count,
            failed_count,
        }
    }

    pub fn check_all(&self, sessions: &[Session]) -> Vec<QualityReport> {
        let reports: Vec<QualityReport> = sessions.iter().map(|s| self.check(s)).collect();

        for report in reports.iter().filter(|r| r.has_critical_issues()) {
            warn!(session = %report.session_id, "session has critical data issues");
        }

        reports
    }

    pub fn batch_summary(&self, reports: &[QualityReport]) -> BatchSummary {
        let mut summary = BatchSummary {
            total_sessions: reports.len(),
            ..Default::default()
        };

        for report in reports {
            if report.is_clean() {
                summary.clean_count += 1;
            } else if report.has_critical_issues() {
                summary.critical_count += 1;
            } else {
                summary.warning_count += 1;
            }
        }

        summary
    }

    // ========================================================================
    // VALIDATION RULES
    // ========================================================================

    fn validate_time_order(&self, session: &Session) -> ValidationResult {
        if session.end_time < session.start_time {
            return ValidationResult::fail(
                "end_before_start",
                "end_time",
                &format!(
                    "End time {} is before start time {}",
                    session.end_time, session.start_time
                ),
                Severity::Warning,
            );
        }

        ValidationResult::pass("time_order", "end_time", "End time is after start time")
    }

    fn validate_tournament_expenses(&self, session: &Session) -> ValidationResult {
        if session.is_tournament() && session.expenses.is_none() {
            return ValidationResult::fail(
                "tournament_missing_expenses",
                "expenses",
                "Tournament has no expenses recorded",
                Severity::Warning,
            );
        }

        ValidationResult::pass("tournament_expenses", "expenses", "Expenses present or not required")
    }

    fn validate_profit(&self, session: &Session) -> ValidationResult {
        let implied = session.cash_flow_profit();
        let gap = (session.profit - implied).abs();

        if gap > self.profit_tolerance {
            return ValidationResult::fail(
                "profit_cash_flow_mismatch",
                "profit",
                &format!(
                    "Recorded profit {:.2} differs from cash-out minus buy-in and expenses ({:.2})",
                    session.profit, implied
                ),
                Severity::Warning,
            );
        }

        ValidationResult::pass("profit_consistent", "profit", "Profit matches cash flow")
    }

    fn validate_location(&self, session: &Session) -> ValidationResult {
        if session.location.trim().is_empty() {
            return ValidationResult::fail(
                "missing_location",
                "location",
                "No location recorded",
                Severity::Info,
            );
        }

        ValidationResult::pass("location_present", "location", "Location recorded")
    }

    fn validate_mood(&self, session: &Session) -> ValidationResult {
        match session.mood {
            Some(mood) if !(1..=5).contains(&mood) => ValidationResult::fail(
                "mood_out_of_range",
                "mood",
                &format!("Mood {} is outside 1-5", mood),
                Severity::Critical,
            ),
            _ => ValidationResult::pass("mood_valid", "mood", "Mood absent or within range"),
        }
    }

    fn validate_money(&self, session: &Session) -> ValidationResult {
        let negative: Vec<&str> = [
            ("buy_in", session.buy_in),
            ("cash_out", session.cash_out),
            ("expenses", session.expenses_or_zero()),
        ]
        .into_iter()
        .filter(|(_, value)| *value < 0.0)
        .map(|(field, _)| field)
        .collect();

        if !negative.is_empty() {
            return ValidationResult::fail(
                "negative_money",
                "money",
                &format!("Negative value in: {}", negative.join(", ")),
                Severity::Critical,
            );
        }

        ValidationResult::pass("money_non_negative", "money", "Money fields are non-negative")
    }
}

impl Default for DataQualityEngine {
    fn default() -> Self {
        Self::new()
    }
}

// ============================================================================
// TESTS
// ============================================================================
