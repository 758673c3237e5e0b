use crate::schema::LedgerLine;
use log::warn;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BalanceCheck {
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    /// `total_debit - total_credit`
    pub difference: Decimal,
    pub is_balanced: bool,
    pub warnings: Vec<String>,
}

/// Totals debits and credits and checks each line's accounting identity.
///
/// Nothing here fails: an unbalanced trial balance is reported through `warnings` because
/// correcting entries usually follow. The trial balance counts as balanced only while the
/// absolute difference stays strictly below `tolerance`, so a difference equal to the
/// tolerance is reported.
pub fn verify_trial_balance(lines: &[LedgerLine], tolerance: Decimal) -> BalanceCheck {
    let total_debit: Decimal = lines.iter().map(|l| l.debit_cy).sum();
    let total_credit: Decimal = lines.iter().map(|l| l.credit_cy).sum();
    let difference = total_debit - total_credit;
    let is_balanced = difference.abs() < tolerance;

    let mut warnings = Vec::new();

    if !is_balanced {
        let message = format!(
            "Trial balance does not balance: debits {} vs credits {} (difference {})",
            total_debit, total_credit, difference
        );
        warn!("{}", message);
        warnings.push(message);
    }

    for line in lines {
        let gap = line.identity_difference();
        if gap.abs() >= tolerance {
            let message = format!(
                "Ledger '{}': opening {} + debit {} - credit {} differs from closing {} by {}",
                line.ledger_name,
                line.opening_balance_cy,
                line.debit_cy,
                line.credit_cy,
                line.closing_balance_cy,
                gap
            );
            warn!("{}", message);
            warnings.push(message);
        }
    }

    BalanceCheck {
        total_debit,
        total_credit,
        difference,
        is_balanced,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::StatementType;

    fn line(name: &str, debit: Decimal, credit: Decimal) -> LedgerLine {
        LedgerLine {
            ledger_name: name.to_string(),
            opening_balance_cy: Decimal::ZERO,
            debit_cy: debit,
            credit_cy: credit,
            closing_balance_cy: debit - credit,
            closing_balance_py: Decimal::ZERO,
            statement_type: StatementType::BalanceSheet,
            major_head_id: "MH".into(),
            minor_head_id: "MN".into(),
            grouping_id: "G".into(),
        }
    }

    fn tolerance() -> Decimal {
        Decimal::new(1, 2)
    }

    #[test]
    fn test_balanced_trial_balance() {
        let lines = vec![
            line("Cash", Decimal::new(1_000, 0), Decimal::ZERO),
            line("Capital", Decimal::ZERO, Decimal::new(1_000, 0)),
        ];
        let check = verify_trial_balance(&lines, tolerance());
        assert!(check.is_balanced);
        assert!(check.warnings.is_empty());
        assert_eq!(check.difference, Decimal::ZERO);
    }

    #[test]
    fn test_difference_equal_to_tolerance_warns() {
        let lines = vec![
            line("Cash", Decimal::new(1_000_000, 0), Decimal::ZERO),
            line("Capital", Decimal::ZERO, Decimal::new(99_999_999, 2)),
        ];
        let check = verify_trial_balance(&lines, tolerance());
        assert!(!check.is_balanced);
        assert_eq!(check.difference, Decimal::new(1, 2));
        assert_eq!(check.warnings.len(), 1);
        assert!(check.warnings[0].contains("does not balance"));
    }

    #[test]
    fn test_difference_below_tolerance_is_accepted() {
        let lines = vec![
            line("Cash", Decimal::new(1_000_000, 0), Decimal::ZERO),
            line("Capital", Decimal::ZERO, Decimal::new(999_999_991, 3)),
        ];
        let check = verify_trial_balance(&lines, tolerance());
        assert!(check.is_balanced);
        assert_eq!(check.difference, Decimal::new(9, 3));
        assert!(check.warnings.is_empty());
    }

    #[test]
    fn test_identity_mismatch_is_reported() {
        let mut broken = line("Cash", Decimal::new(100, 0), Decimal::ZERO);
        broken.closing_balance_cy = Decimal::new(90, 0);
        let lines = vec![broken, line("Capital", Decimal::ZERO, Decimal::new(100, 0))];

        let check = verify_trial_balance(&lines, tolerance());
        assert!(check.is_balanced);
        assert_eq!(check.warnings.len(), 1);
        assert!(check.warnings[0].contains("Ledger 'Cash'"));
    }
}
