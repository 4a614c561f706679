use crate::domain::model::{Expense, ExpenseType};
use crate::domain::views::{CategoryBreakdown, TypeTotals};
use rust_decimal::{Decimal, RoundingStrategy};

/// Grand total plus per-category sums. Every entry counts, whatever its
/// type, and category labels are used exactly as they arrive.
pub fn aggregate_expenses_by_category(expenses: &[Expense]) -> CategoryBreakdown {
    expenses
        .iter()
        .fold(CategoryBreakdown::default(), |mut acc, expense| {
            acc.total = accumulate(acc.total, expense.amount);
            let slot = acc
                .by_category
                .entry(expense.category.clone())
                .or_insert(Decimal::ZERO);
            *slot = accumulate(*slot, expense.amount);
            acc
        })
}

pub fn split_by_type(expenses: &[Expense]) -> TypeTotals {
    expenses
        .iter()
        .fold(TypeTotals::default(), |mut acc, expense| {
            match expense.kind {
                ExpenseType::Expense => acc.expense = accumulate(acc.expense, expense.amount),
                ExpenseType::Income => acc.income = accumulate(acc.income, expense.amount),
            }
            acc
        })
}

/// Sum that pins at `Decimal::MAX` / `Decimal::MIN` instead of overflowing.
pub(crate) fn accumulate(sum: Decimal, amount: Decimal) -> Decimal {
    sum.checked_add(amount).unwrap_or_else(|| {
        tracing::warn!("⚠️ Amount total out of range, capping ({} + {})", sum, amount);
        if amount.is_sign_negative() {
            Decimal::MIN
        } else {
            Decimal::MAX
        }
    })
}

/// Two-decimal presentation value. Totals themselves are never rounded.
pub fn round_for_display(amount: Decimal) -> Decimal {
    amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn expense(amount: Decimal, category: &str, kind: ExpenseType) -> Expense {
        Expense {
            id: format!("{}-{}", category, amount),
            amount,
            description: String::new(),
            category: category.to_string(),
            date: None,
            kind,
        }
    }

    #[test]
    fn test_category_totals() {
        let expenses = vec![
            expense(dec!(100), "Food", ExpenseType::Expense),
            expense(dec!(50), "Food", ExpenseType::Expense),
            expense(dec!(20), "Transport", ExpenseType::Expense),
        ];

        let breakdown = aggregate_expenses_by_category(&expenses);
        assert_eq!(breakdown.total, dec!(170));
        assert_eq!(breakdown.by_category.len(), 2);
        assert_eq!(breakdown.by_category["Food"], dec!(150));
        assert_eq!(breakdown.by_category["Transport"], dec!(20));
    }

    #[test]
    fn test_empty_input_is_zero() {
        let breakdown = aggregate_expenses_by_category(&[]);
        assert_eq!(breakdown.total, Decimal::ZERO);
        assert!(breakdown.by_category.is_empty());
        assert_eq!(split_by_type(&[]), TypeTotals::default());
    }

    #[test]
    fn test_category_sum_matches_total() {
        let expenses = vec![
            expense(dec!(0.1), "Food", ExpenseType::Expense),
            expense(dec!(0.2), "Food", ExpenseType::Expense),
            expense(dec!(19.99), "Bills", ExpenseType::Expense),
            expense(dec!(1000.005), "Salary", ExpenseType::Income),
            expense(dec!(3.333), "Misc", ExpenseType::Expense),
        ];

        let breakdown = aggregate_expenses_by_category(&expenses);
        let sum: Decimal = breakdown.by_category.values().copied().sum();
        assert_eq!(sum, breakdown.total);
        assert_eq!(breakdown.by_category["Food"], dec!(0.3));
    }

    #[test]
    fn test_labels_are_not_normalized() {
        let expenses = vec![
            expense(dec!(5), "food", ExpenseType::Expense),
            expense(dec!(7), "Food", ExpenseType::Expense),
        ];

        let breakdown = aggregate_expenses_by_category(&expenses);
        assert_eq!(breakdown.by_category["food"], dec!(5));
        assert_eq!(breakdown.by_category["Food"], dec!(7));
    }

    #[test]
    fn test_income_counts_towards_category_total() {
        let expenses = vec![
            expense(dec!(30), "Food", ExpenseType::Expense),
            expense(dec!(200), "Salary", ExpenseType::Income),
        ];

        assert_eq!(aggregate_expenses_by_category(&expenses).total, dec!(230));

        let totals = split_by_type(&expenses);
        assert_eq!(totals.expense, dec!(30));
        assert_eq!(totals.income, dec!(200));
        assert_eq!(totals.net(), dec!(170));
    }

    #[test]
    fn test_huge_amounts_saturate() {
        let huge = Decimal::from_str_exact("50000000000000000000000000000").unwrap();
        let expenses = vec![
            expense(huge, "Food", ExpenseType::Expense),
            expense(huge, "Food", ExpenseType::Expense),
            expense(huge, "Salary", ExpenseType::Income),
            expense(huge, "Salary", ExpenseType::Income),
        ];

        let breakdown = aggregate_expenses_by_category(&expenses);
        assert_eq!(breakdown.total, Decimal::MAX);
        assert_eq!(breakdown.by_category["Food"], Decimal::MAX);
        assert_eq!(breakdown.by_category["Salary"], Decimal::MAX);

        let totals = split_by_type(&expenses);
        assert_eq!(totals.expense, Decimal::MAX);
        assert_eq!(totals.income, Decimal::MAX);
        assert_eq!(totals.net(), Decimal::ZERO);
    }

    #[test]
    fn test_accumulate_negative_overflow() {
        assert_eq!(accumulate(Decimal::MIN, dec!(-1)), Decimal::MIN);
        assert_eq!(accumulate(dec!(1), dec!(2)), dec!(3));
    }

    #[test]
    fn test_round_for_display() {
        assert_eq!(round_for_display(dec!(3.335)), dec!(3.34));
        assert_eq!(round_for_display(dec!(3.334)), dec!(3.33));
        assert_eq!(round_for_display(dec!(170)), dec!(170));
    }

    #[test]
    fn test_repeatable() {
        let expenses = vec![
            expense(dec!(12.40), "Food", ExpenseType::Expense),
            expense(dec!(8), "Transport", ExpenseType::Income),
        ];
        assert_eq!(
            aggregate_expenses_by_category(&expenses),
            aggregate_expenses_by_category(&expenses)
        );
        assert_eq!(split_by_type(&expenses), split_by_type(&expenses));
    }
}
