use crate::core::{PaymentPlan, PlanError, Recommendation, StrategyComparison};

pub fn format_money(value: f64) -> String {
    let cents = (value.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();
    let mut grouped = String::with_capacity(whole.len() + whole.len() / 3);
    for (index, digit) in whole.chars().enumerate() {
        if index > 0 && (whole.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    let sign = if value < 0.0 && cents > 0 { "-" } else { "" };
    format!("{sign}${grouped}.{:02}", cents % 100)
}

pub fn format_duration(months: u32) -> String {
    let years = months / 12;
    let rest = months % 12;
    let unit = |n: u32, word: &str| {
        if n == 1 {
            format!("1 {word}")
        } else {
            format!("{n} {word}s")
        }
    };
    match (years, rest) {
        (0, rest) => unit(rest, "month"),
        (years, 0) => unit(years, "year"),
        (years, rest) => format!("{} {}", unit(years, "year"), unit(rest, "month")),
    }
}

fn finish(lines: Vec<String>) -> String {
    let mut out = lines.join("\n");
    out.push('\n');
    out
}

pub fn render_plan(plan: &PaymentPlan, months_shown: usize) -> String {
    let mut lines = vec![
        format!(
            "Strategy: {} ({})",
            plan.strategy_used,
            plan.strategy_used.description()
        ),
        format!(
            "Debt-free in {} months ({})",
            plan.months,
            format_duration(plan.months)
        ),
        format!("Starting balance: {}", format_money(plan.initial_balance)),
        format!("Total interest:   {}", format_money(plan.total_interest)),
        format!("Total paid:       {}", format_money(plan.total_paid)),
    ];

    if !plan.payoffs.is_empty() {
        lines.push(String::new());
        lines.push("Payoff order:".to_string());
        lines.extend(
            plan.payoffs
                .iter()
                .map(|payoff| format!("  month {:>4}  {}", payoff.month, payoff.name)),
        );
    }

    if months_shown > 0 {
        lines.push(String::new());
        lines.push(format!(
            "{:>5}  {:>12}  {:>12}  {:>12}  {:>14}",
            "Month", "Payment", "Interest", "Principal", "Balance"
        ));
        lines.extend(plan.schedule.iter().take(months_shown).map(|row| {
            format!(
                "{:>5}  {:>12}  {:>12}  {:>12}  {:>14}",
                row.month,
                format_money(row.payment),
                format_money(row.interest_paid),
                format_money(row.principal_paid),
                format_money(row.total_balance_end)
            )
        }));
        if plan.schedule.len() > months_shown {
            lines.push(format!(
                "(showing first {months_shown} of {} months)",
                plan.schedule.len()
            ));
        }
    }
    finish(lines)
}

pub fn render_comparison(comparison: &StrategyComparison) -> String {
    let mut lines = vec![format!(
        "{:<8}  {:<32}  {:>8}  {:>14}  {:>14}",
        "Strategy", "Priority", "Months", "Interest", "Total paid"
    )];
    for (index, outcome) in comparison.outcomes.iter().enumerate() {
        let label = outcome.strategy.label();
        let description = outcome.strategy.description();
        lines.push(match &outcome.result {
            Ok(plan) => {
                let marker = if comparison.best_index == Some(index) {
                    " *"
                } else {
                    ""
                };
                format!(
                    "{label:<8}  {description:<32}  {:>8}  {:>14}  {:>14}{marker}",
                    plan.months,
                    format_money(plan.total_interest),
                    format_money(plan.total_paid)
                )
            }
            Err(err) => format!("{label:<8}  {description:<32}  {err}"),
        });
    }
    if let Some(best) = comparison.best() {
        lines.push(String::new());
        lines.push(format!(
            "* lowest interest: {} ({})",
            best.strategy_used,
            format_money(best.total_interest)
        ));
    }
    finish(lines)
}

pub fn render_recommendation(recommendation: &Recommendation) -> String {
    let stats = &recommendation.stats;
    finish(vec![
        format!(
            "Recommended strategy: {} ({})",
            recommendation.strategy,
            recommendation.strategy.description()
        ),
        recommendation.reason.clone(),
        format!(
            "{} debts, {} total, APR {:.2}%-{:.2}% (weighted {:.2}%)",
            stats.count,
            format_money(stats.total_balance),
            stats.min_apr,
            stats.max_apr,
            stats.weighted_apr
        ),
    ])
}

pub fn render_error(err: &PlanError) -> String {
    format!("Error: {err}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{
        Debt, PlanLimits, Strategy, compare_strategies, compute_plan, recommend_strategy,
    };

    #[test]
    fn money_is_grouped_and_rounded_to_cents() {
        assert_eq!(format_money(0.0), "$0.00");
        assert_eq!(format_money(1_234_567.891), "$1,234,567.89");
        assert_eq!(format_money(999.999), "$1,000.00");
        assert_eq!(format_money(-42.5), "-$42.50");
    }

    #[test]
    fn durations_read_naturally() {
        assert_eq!(format_duration(1), "1 month");
        assert_eq!(format_duration(12), "1 year");
        assert_eq!(format_duration(22), "1 year 10 months");
        assert_eq!(format_duration(37), "3 years 1 month");
    }

    #[test]
    fn plan_text_truncates_the_schedule() {
        let debts = vec![Debt::new("a", 1_200.0, 0.0, 100.0).named("Visa")];
        let plan = compute_plan(&debts, Strategy::SmallestBalanceFirst, 100.0).expect("plan");
        let text = render_plan(&plan, 3);

        assert!(text.contains("Debt-free in 12 months (1 year)"));
        assert!(text.contains("month   12  Visa"));
        assert!(text.contains("(showing first 3 of 12 months)"));
        assert_eq!(text.matches("$100.00").count(), 6);
    }

    #[test]
    fn comparison_text_marks_the_best_plan() {
        let debts = vec![
            Debt::new("a", 4_000.0, 28.0, 120.0),
            Debt::new("b", 800.0, 6.0, 25.0),
        ];
        let comparison =
            compare_strategies(&debts, 400.0, &PlanLimits::default()).expect("valid inputs");
        let text = render_comparison(&comparison);
        assert!(text.contains("warrior"));
        assert!(text.contains("rebel"));
        assert!(text.contains("wizard"));
        assert!(text.contains("* lowest interest"));
    }

    #[test]
    fn plan_text_separates_sections_with_blank_lines() {
        let debts = vec![Debt::new("a", 300.0, 0.0, 100.0).named("Visa")];
        let plan = compute_plan(&debts, Strategy::HighestAprFirst, 100.0).expect("plan");
        let text = render_plan(&plan, 0);
        let lines: Vec<&str> = text.lines().collect();

        assert!(text.ends_with('\n'));
        assert_eq!(lines[0], "Strategy: rebel (highest APR first)");
        assert_eq!(lines[4], "Total paid:       $300.00");
        assert_eq!(lines[5], "");
        assert_eq!(lines[6], "Payoff order:");
        assert_eq!(lines[7], "  month    3  Visa");
        assert_eq!(lines.len(), 8);
    }

    #[test]
    fn recommendation_text_lists_reason_and_stats() {
        let debts = vec![
            Debt::new("a", 2_000.0, 10.0, 60.0),
            Debt::new("b", 3_000.0, 28.0, 90.0),
        ];
        let rec = recommend_strategy(&debts).expect("recommendation");
        let text = render_recommendation(&rec);
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines.len(), 3);
        assert!(lines[0].starts_with("Recommended strategy: rebel"));
        assert_eq!(lines[1], rec.reason);
        assert!(lines[2].starts_with("2 debts, $5,000.00 total, APR 10.00%-28.00%"));
    }
}
