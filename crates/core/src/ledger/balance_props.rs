//! Property-based tests for balance sign convention and running ledgers.

use chrono::NaiveDate;
use proptest::prelude::*;
use rust_decimal::Decimal;

use koperasi_shared::types::AccountId;

use super::balance::{AccountBalance, LedgerLine, NormalSide, running_ledger};

/// Strategy for non-negative amounts from 0.00 to 1,000,000.00.
fn amount() -> impl Strategy<Value = Decimal> {
    (0i64..100_000_000i64).prop_map(|cents| Decimal::new(cents, 2))
}

fn side() -> impl Strategy<Value = NormalSide> {
    prop_oneof![Just(NormalSide::Debit), Just(NormalSide::Credit)]
}

/// Strategy for a one-sided ledger line on one of the first ten days of January.
fn ledger_line() -> impl Strategy<Value = LedgerLine> {
    (1u32..=10, 1u32..=9999, amount(), any::<bool>()).prop_map(|(day, seq, value, is_debit)| {
        let date = NaiveDate::from_ymd_opt(2025, 1, day).unwrap();
        LedgerLine {
            date,
            journal_number: format!("JRN-{}-{seq:04}", date.format("%Y%m%d")),
            description: String::new(),
            note: None,
            debit: if is_debit { value } else { Decimal::ZERO },
            credit: if is_debit { Decimal::ZERO } else { value },
        }
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Debit-normal and credit-normal balances of the same totals are negations.
    #[test]
    fn prop_sides_are_mirror_images(debit in amount(), credit in amount()) {
        prop_assert_eq!(
            NormalSide::Debit.balance_change(debit, credit),
            -NormalSide::Credit.balance_change(debit, credit)
        );
    }

    /// Accumulating lines one by one equals the change of the summed totals.
    #[test]
    fn prop_balance_is_additive(
        side in side(),
        pairs in prop::collection::vec((amount(), amount()), 0..20),
    ) {
        let mut balance = AccountBalance::new(AccountId::new(), side);
        let mut expected = Decimal::ZERO;
        for (debit, credit) in &pairs {
            balance.add_line(*debit, *credit);
            expected += side.balance_change(*debit, *credit);
        }
        prop_assert_eq!(balance.balance(), expected);
    }

    /// The last running balance equals the opening plus the full-set balance.
    #[test]
    fn prop_running_ledger_ends_at_total(
        side in side(),
        opening in amount(),
        lines in prop::collection::vec(ledger_line(), 0..30),
    ) {
        let mut total = AccountBalance::new(AccountId::new(), side);
        for line in &lines {
            total.add_line(line.debit, line.credit);
        }

        let rows = running_ledger(side, opening, lines.clone());
        prop_assert_eq!(rows.len(), lines.len());
        let last = rows.last().map_or(opening, |r| r.running_balance);
        prop_assert_eq!(last, opening + total.balance());
    }

    /// Each row's balance is the previous row's balance plus its own change.
    #[test]
    fn prop_running_ledger_rows_chain(
        side in side(),
        lines in prop::collection::vec(ledger_line(), 1..30),
    ) {
        let rows = running_ledger(side, Decimal::ZERO, lines);
        let mut previous = Decimal::ZERO;
        for row in &rows {
            prop_assert_eq!(
                row.running_balance,
                previous + side.balance_change(row.debit, row.credit)
            );
            previous = row.running_balance;
        }
    }

    /// Rows come out ordered by date, then journal number.
    #[test]
    fn prop_running_ledger_is_ordered(lines in prop::collection::vec(ledger_line(), 0..30)) {
        let rows = running_ledger(NormalSide::Debit, Decimal::ZERO, lines);
        for pair in rows.windows(2) {
            prop_assert!(
                (pair[0].date, &pair[0].journal_number) <= (pair[1].date, &pair[1].journal_number)
            );
        }
    }
}
