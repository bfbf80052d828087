// 📋 Report - Currency formatting and plain-text tables for the CLI

use crate::analytics::{BalancePoint, GroupRow, Summary};
use crate::wellness::WellnessReport;

/// "-$1,234.50" style: sign first, then symbol, thousands separated
pub fn format_currency(amount: f64, symbol: &str) -> String {
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let fraction = cents % 100;

    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (i, digit) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }

    let sign = if amount < 0.0 && cents > 0 { "-" } else { "" };
    format!("{}{}{}.{:02}", sign, symbol, grouped, fraction)
}

/// Fraction → "62.5%"
pub fn format_percent(fraction: f64) -> String {
    format!("{:.1}%", fraction * 100.0)
}

pub fn render_summary(summary: &Summary, symbol: &str) -> String {
    let money = |amount: f64| format_currency(amount, symbol);
    let mut lines = vec![
        format!("Sessions:          {}", summary.session_count),
        format!("Total profit:      {}", money(summary.total_profit)),
        format!("Hours played:      {:.1}", summary.total_hours),
        format!("Hourly rate:       {}/hr", money(summary.hourly_rate)),
        format!("Average profit:    {}", money(summary.average_profit)),
        format!("Average length:    {:.1}h", summary.average_duration_hours),
        format!("Win rate:          {}", format_percent(summary.win_rate)),
        format!("Std deviation:     {}", money(summary.standard_deviation)),
        format!("Std dev / hour:    {}", money(summary.standard_deviation_per_hour)),
        format!("BB / hour:         {:.2}", summary.bb_per_hour),
    ];

    if let Some(roi) = summary.tournament_roi {
        lines.push(format!("Tournament ROI:    {}", format_percent(roi)));
        lines.push(format!("ITM rate:          {}", format_percent(summary.itm_rate)));
    }
    if let (Some(best), Some(worst)) = (summary.best_profit, summary.worst_profit) {
        lines.push(format!("Best session:      {}", money(best)));
        lines.push(format!("Worst session:     {}", money(worst)));
    }
    lines.push(format!(
        "Streaks:           {} wins / {} losses",
        summary.longest_win_streak, summary.longest_loss_streak
    ));

    lines.join("\n")
}

pub fn render_rows(rows: &[GroupRow], symbol: &str) -> String {
    if rows.is_empty() {
        return "No sessions.".to_string();
    }

    let width = rows
        .iter()
        .map(|r| r.label.chars().count())
        .max()
        .unwrap_or(0)
        .max(5);

    let mut out = vec![format!(
        "{:<width$}  {:>8}  {:>14}  {:>8}  {:>12}  {:>7}",
        "Group", "Sessions", "Profit", "Hours", "Hourly", "Win %",
    )];
    for row in rows {
        out.push(format!(
            "{:<width$}  {:>8}  {:>14}  {:>8.1}  {:>12}  {:>7}",
            row.label,
            row.stats.count,
            format_currency(row.stats.total_profit, symbol),
            row.stats.total_hours,
            format_currency(row.stats.hourly_rate(), symbol),
            format_percent(row.stats.win_rate()),
        ));
    }
    out.join("\n")
}

pub fn render_series(points: &[BalancePoint], symbol: &str) -> String {
    points
        .iter()
        .map(|p| {
            format!(
                "{}  {:>12}  {:>14}",
                p.at.format("%Y-%m-%d %H:%M"),
                format_currency(p.change, symbol),
                format_currency(p.balance, symbol)
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

fn render_correlation(r: Option<f64>) -> String {
    r.map(|r| format!("{:+.2}", r))
        .unwrap_or_else(|| "not enough data".to_string())
}

pub fn render_wellness(report: &WellnessReport, symbol: &str) -> String {
    let mut out = vec![
        format!("Mood vs profit:    {}", render_correlation(report.mood_correlation)),
        format!("Sleep vs profit:   {}", render_correlation(report.sleep_correlation)),
    ];

    if !report.sleep_buckets.is_empty() {
        out.push(String::new());
        out.push(render_rows(&report.sleep_buckets, symbol));
    }

    if let Some(split) = &report.mindfulness {
        let rows = vec![
            GroupRow {
                label: "Mindful".to_string(),
                stats: split.with_practice.clone(),
            },
            GroupRow {
                label: "No practice".to_string(),
                stats: split.without_practice.clone(),
            },
        ];
        out.push(String::new());
        out.push(render_rows(&rows, symbol));
    }

    out.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analytics::GroupStats;

    #[test]
    fn test_format_currency() {
        assert_eq!(format_currency(0.0, "$"), "$0.00");
        assert_eq!(format_currency(12.5, "$"), "$12.50");
        assert_eq!(format_currency(-1234.5, "$"), "-$1,234.50");
        assert_eq!(format_currency(1_000_000.0, "€"), "€1,000,000.00");
        assert_eq!(format_currency(999.999, "$"), "$1,000.00");
        assert_eq!(format_currency(-0.001, "$"), "$0.00");
    }

    #[test]
    fn test_format_percent() {
        assert_eq!(format_percent(0.625), "62.5%");
        assert_eq!(format_percent(0.0), "0.0%");
    }

    #[test]
    fn test_render_summary_hides_tournament_lines_without_tournaments() {
        let summary = Summary::from_sessions(&[]);
        let text = render_summary(&summary, "$");

        assert!(text.contains("Sessions:          0"));
        assert!(!text.contains("Tournament ROI"));
        assert!(!text.contains("Best session"));
    }

    #[test]
    fn test_render_wellness_without_data() {
        let text = render_wellness(&WellnessReport::default(), "$");

        assert!(text.contains("Mood vs profit:    not enough data"));
        assert!(!text.contains("Mindful"));
    }

    #[test]
    fn test_render_wellness_with_mindfulness() {
        let report = WellnessReport {
            mood_correlation: Some(0.5),
            mindfulness: Some(Default::default()),
            ..Default::default()
        };
        let text = render_wellness(&report, "$");

        assert!(text.contains("Mood vs profit:    +0.50"));
        assert!(text.contains("No practice"));
    }

    #[test]
    fn test_render_rows() {
        let rows = vec![GroupRow {
            label: "Bellagio".to_string(),
            stats: GroupStats {
                count: 2,
                total_profit: 1500.0,
                total_hours: 10.0,
                wins: 1,
            },
        }];

        let text = render_rows(&rows, "$");
        let mut lines = text.lines();

        assert!(lines.next().unwrap().starts_with("Group"));
        let row = lines.next().unwrap();
        assert!(row.starts_with("Bellagio"));
        assert!(row.contains("$1,500.00"));
        assert!(row.contains("$150.00"));
        assert!(row.contains("50.0%"));
        assert_eq!(render_rows(&[], "$"), "No sessions.");
    }
}
