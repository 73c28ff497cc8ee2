//! Balance Transaction Model

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{AppError, AppResult, ErrorCode};

/// 交易类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionKind {
    /// Money paid into the account
    Deposit,
    /// Money paid out of the account
    Withdrawal,
    /// COD money collected by a courier
    Collection,
    /// Settlement handed to a shipper
    Settlement,
}

impl TransactionKind {
    /// Credits increase the balance, debits decrease it
    pub fn is_credit(&self) -> bool {
        matches!(self, Self::Deposit | Self::Collection)
    }
}

/// `balance_transactions` row
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BalanceTransaction {
    pub id: String,
    #[serde(default)]
    pub delegate_id: Option<String>,
    #[serde(default)]
    pub shipper_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(default)]
    pub note: Option<String>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

impl BalanceTransaction {
    /// Amount with the sign applied
    pub fn signed_amount(&self) -> Decimal {
        if self.kind.is_credit() {
            self.amount
        } else {
            -self.amount
        }
    }
}

/// Insert payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewBalanceTransaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delegate_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub shipper_id: Option<String>,
    #[serde(with = "rust_decimal::serde::float")]
    pub amount: Decimal,
    pub kind: TransactionKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

impl NewBalanceTransaction {
    pub fn validate(&self) -> AppResult<()> {
        if self.amount <= Decimal::ZERO {
            return Err(AppError::new(ErrorCode::BalanceInvalidAmount)
                .with_detail("amount", self.amount.to_string()));
        }
        if self.delegate_id.is_none() && self.shipper_id.is_none() {
            return Err(AppError::new(ErrorCode::BalanceMissingOwner));
        }
        Ok(())
    }
}

/// Running totals over a set of transactions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BalanceSummary {
    pub credit: Decimal,
    pub debit: Decimal,
    pub balance: Decimal,
}

impl BalanceSummary {
    pub fn from_transactions<'a>(txs: impl IntoIterator<Item = &'a BalanceTransaction>) -> Self {
        let mut summary = Self::default();
        for tx in txs {
            if tx.kind.is_credit() {
                summary.credit += tx.amount;
            } else {
                summary.debit += tx.amount;
            }
        }
        summary.balance = summary.credit - summary.debit;
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tx(kind: TransactionKind, amount: i64) -> BalanceTransaction {
        BalanceTransaction {
            id: format!("tx-{amount}"),
            delegate_id: Some("d-1".into()),
            shipper_id: None,
            amount: Decimal::from(amount),
            kind,
            note: None,
            created_at: None,
        }
    }

    #[test]
    fn test_summary() {
        let txs = vec![
            tx(TransactionKind::Collection, 50_000),
            tx(TransactionKind::Deposit, 10_000),
            tx(TransactionKind::Settlement, 35_000),
        ];
        let summary = BalanceSummary::from_transactions(&txs);
        assert_eq!(summary.credit, Decimal::from(60_000));
        assert_eq!(summary.debit, Decimal::from(35_000));
        assert_eq!(summary.balance, Decimal::from(25_000));
        assert_eq!(txs[2].signed_amount(), Decimal::from(-35_000));
    }

    #[test]
    fn test_validate_rejects_non_positive_amount() {
        let new_tx = NewBalanceTransaction {
            delegate_id: Some("d-1".into()),
            shipper_id: None,
            amount: Decimal::ZERO,
            kind: TransactionKind::Deposit,
            note: None,
        };
        let err = new_tx.validate().unwrap_err();
        assert_eq!(err.code, ErrorCode::BalanceInvalidAmount);
    }

    #[test]
    fn test_validate_requires_owner() {
        let new_tx = NewBalanceTransaction {
            delegate_id: None,
            shipper_id: None,
            amount: Decimal::from(100),
            kind: TransactionKind::Withdrawal,
            note: None,
        };
        assert_eq!(
            new_tx.validate().unwrap_err().code,
            ErrorCode::BalanceMissingOwner
        );
    }
}
