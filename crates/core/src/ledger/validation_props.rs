//! Property-based tests for journal line validation rules.

use proptest::prelude::*;
use rust_decimal::Decimal;

use koperasi_shared::types::AccountId;

use super::types::{JournalLine, JournalTotals};
use super::validation::{BALANCE_TOLERANCE, LedgerValidationError, validate_lines};

/// Strategy for amounts from 0.02 to 1,000,000.00, safely above the tolerance.
fn positive_amount() -> impl Strategy<Value = Decimal> {
    (2i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn debit(amount: Decimal) -> JournalLine {
    JournalLine::debit(AccountId::new(), amount, "debit")
}

fn credit(amount: Decimal) -> JournalLine {
    JournalLine::credit(AccountId::new(), amount, "credit")
}

/// Strategy for a balanced line set: amounts split across debit lines, then
/// the same total split across credit lines.
fn balanced_lines() -> impl Strategy<Value = Vec<JournalLine>> {
    prop::collection::vec(positive_amount(), 1..6).prop_flat_map(|debits| {
        let total: Decimal = debits.iter().copied().sum();
        let count = debits.len();
        (Just(debits), 1usize..=count, Just(total))
    })
    .prop_map(|(debits, credit_count, total)| {
        let mut lines: Vec<JournalLine> = debits.into_iter().map(debit).collect();
        // Equal split in cents; the last credit line absorbs the remainder.
        let share = (total / Decimal::from(credit_count)).round_dp(2);
        let mut remaining = total;
        for i in 0..credit_count {
            let amount = if i + 1 == credit_count { remaining } else { share };
            remaining -= amount;
            lines.push(credit(amount));
        }
        lines
    })
    .prop_filter("every credit line must be positive", |lines| {
        lines.iter().all(|l| l.debit > Decimal::ZERO || l.credit > Decimal::ZERO)
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Balanced, two-sided, well-formed line sets always validate.
    #[test]
    fn prop_balanced_lines_validate(lines in balanced_lines()) {
        prop_assert!(validate_lines(&lines).is_ok());
        prop_assert!(JournalTotals::from_lines(&lines).is_balanced);
    }

    /// A difference within the tolerance is still balanced.
    #[test]
    fn prop_tolerance_absorbs_one_cent(amount in positive_amount()) {
        let lines = vec![debit(amount + BALANCE_TOLERANCE), credit(amount)];
        prop_assert!(validate_lines(&lines).is_ok());
    }

    /// A difference beyond the tolerance is unbalanced.
    #[test]
    fn prop_difference_beyond_tolerance_rejected(
        amount in positive_amount(),
        extra in positive_amount(),
    ) {
        let lines = vec![debit(amount + extra), credit(amount)];
        prop_assert_eq!(
            validate_lines(&lines),
            Err(LedgerValidationError::Unbalanced {
                debits: amount + extra,
                credits: amount,
            })
        );
    }

    /// Any single line cannot form an entry.
    #[test]
    fn prop_single_line_rejected(amount in positive_amount(), is_debit in any::<bool>()) {
        let line = if is_debit { debit(amount) } else { credit(amount) };
        prop_assert_eq!(
            validate_lines(&[line]),
            Err(LedgerValidationError::TooFewLines { count: 1 })
        );
    }

    /// A line with both sides set is rejected wherever it appears.
    #[test]
    fn prop_mixed_line_rejected(
        mut lines in balanced_lines(),
        amount in positive_amount(),
        position in any::<prop::sample::Index>(),
    ) {
        let index = position.index(lines.len());
        lines[index].debit = amount;
        lines[index].credit = amount;
        prop_assert_eq!(
            validate_lines(&lines),
            Err(LedgerValidationError::MixedSides { line: index })
        );
    }

    /// A line with neither side set is rejected wherever it appears.
    #[test]
    fn prop_empty_line_rejected(
        mut lines in balanced_lines(),
        position in any::<prop::sample::Index>(),
    ) {
        let index = position.index(lines.len());
        lines[index].debit = Decimal::ZERO;
        lines[index].credit = Decimal::ZERO;
        prop_assert_eq!(
            validate_lines(&lines),
            Err(LedgerValidationError::EmptyLine { line: index })
        );
    }

    /// All-debit or all-credit line sets are rejected.
    #[test]
    fn prop_one_sided_rejected(
        amounts in prop::collection::vec(positive_amount(), 2..6),
        is_debit in any::<bool>(),
    ) {
        let lines: Vec<JournalLine> = amounts
            .into_iter()
            .map(|a| if is_debit { debit(a) } else { credit(a) })
            .collect();
        prop_assert_eq!(validate_lines(&lines), Err(LedgerValidationError::OneSidedEntry));
    }

    /// Amounts finer than a cent are rejected before any total is taken.
    #[test]
    fn prop_sub_cent_amounts_rejected(
        cents in 1i64..100_000_000i64,
        extra in 1i64..10,
    ) {
        let amount = Decimal::new(cents * 10 + extra, 3);
        let lines = vec![debit(amount), credit(amount)];
        prop_assert_eq!(
            validate_lines(&lines),
            Err(LedgerValidationError::ExcessPrecision { line: 0 })
        );
    }
}
