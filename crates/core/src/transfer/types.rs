//! Transfer request, command, snapshot and ledger record types.

use chrono::{DateTime, FixedOffset};
use remesa_shared::types::{AccountId, Money, MoneyError, TransactionId};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::error::TransferError;
use super::policy::TransferPolicy;

/// Amount as submitted by a caller: a JSON number or a numeric string.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountInput {
    /// JSON number.
    Number(serde_json::Number),
    /// Textual amount such as `"1000.50"`.
    Text(String),
}

impl AmountInput {
    /// Parses the amount and checks it against the policy bounds before the
    /// minor-unit precision, so any amount outside the bounds is reported as
    /// such however many digits it carries.
    fn to_money(&self, policy: &TransferPolicy) -> Result<Money, TransferError> {
        let parsed = match self {
            Self::Number(n) => Money::parse_decimal(&n.to_string()),
            Self::Text(s) => Money::parse_decimal(s),
        };
        let raw = match parsed {
            Ok(raw) => raw,
            Err(e) => {
                if let MoneyError::OutOfRange { saturated, .. } = &e {
                    policy.check_amount(Money::new(*saturated))?;
                }
                return Err(TransferError::InvalidAmount(e.to_string()));
            }
        };
        policy.check_amount(Money::new(raw))?;
        Money::from_decimal(raw).map_err(|e| TransferError::InvalidAmount(e.to_string()))
    }
}

impl From<i64> for AmountInput {
    fn from(value: i64) -> Self {
        Self::Number(value.into())
    }
}

impl From<&str> for AmountInput {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<Decimal> for AmountInput {
    fn from(value: Decimal) -> Self {
        Self::Text(value.to_string())
    }
}

/// Transfer request before validation.
///
/// `sender_account_id` is trusted: the caller derives it from the
/// authenticated identity. Everything else comes from the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransferRequest {
    /// Account to debit.
    pub sender_account_id: AccountId,
    /// Account to credit.
    #[serde(default)]
    pub recipient_account_id: Option<AccountId>,
    /// Amount to move.
    #[serde(default)]
    pub amount: Option<AmountInput>,
    /// Free-text concept recorded on the ledger entry.
    #[serde(default)]
    pub concept: Option<String>,
}

impl TransferRequest {
    /// Creates a fully populated request.
    #[must_use]
    pub fn new(
        sender_account_id: AccountId,
        recipient_account_id: AccountId,
        amount: impl Into<AmountInput>,
        concept: impl Into<String>,
    ) -> Self {
        Self {
            sender_account_id,
            recipient_account_id: Some(recipient_account_id),
            amount: Some(amount.into()),
            concept: Some(concept.into()),
        }
    }

    /// Checks presence of the recipient, that the amount is a finite
    /// number inside the policy bounds, then that it has at most two
    /// fractional digits.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::MissingRecipient`, `TransferError::InvalidAmount`
    /// or `TransferError::AmountOutOfRange`.
    pub fn parse(self, policy: &TransferPolicy) -> Result<TransferCommand, TransferError> {
        let recipient_account_id = self
            .recipient_account_id
            .ok_or(TransferError::MissingRecipient)?;
        let amount = self
            .amount
            .as_ref()
            .ok_or_else(|| TransferError::InvalidAmount("amount is required".to_string()))?
            .to_money(policy)?;

        Ok(TransferCommand {
            sender_account_id: self.sender_account_id,
            recipient_account_id,
            amount,
            concept: self.concept.unwrap_or_default(),
        })
    }
}

/// Parsed transfer ready for policy evaluation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TransferCommand {
    /// Account to debit.
    pub sender_account_id: AccountId,
    /// Account to credit.
    pub recipient_account_id: AccountId,
    /// Exact amount.
    pub amount: Money,
    /// Free-text concept.
    pub concept: String,
}

/// Account state read under lock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountState {
    /// Account ID.
    pub id: AccountId,
    /// Current balance.
    pub balance: Money,
    /// Whether the account may receive funds.
    pub active: bool,
}

/// Everything the policy needs to decide a transfer, read while the
/// account rows are locked.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferSnapshot {
    /// Sender account, if it exists.
    pub sender: Option<AccountState>,
    /// Recipient account, if it exists.
    pub recipient: Option<AccountState>,
    /// Amount the sender has sent today.
    pub sent_today: Money,
    /// Amount the recipient has received today.
    pub received_today: Money,
}

/// Status of a ledger entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    /// Funds moved.
    Completed,
}

impl TransactionStatus {
    /// Returns the stored representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

/// Immutable ledger entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionRecord {
    /// Ledger entry ID.
    pub id: TransactionId,
    /// Debited account.
    pub sender_account_id: AccountId,
    /// Credited account.
    pub recipient_account_id: AccountId,
    /// Amount moved.
    pub amount: Money,
    /// Free-text concept.
    pub concept: String,
    /// Entry status.
    pub status: TransactionStatus,
    /// Local wall-clock commit time.
    pub timestamp: DateTime<FixedOffset>,
}

/// Result of a committed transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransferReceipt {
    /// Ledger entry ID.
    pub transaction_id: TransactionId,
    /// Credited account.
    pub recipient_account_id: AccountId,
    /// Amount moved.
    pub amount: Money,
    /// Local wall-clock commit time.
    pub timestamp: DateTime<FixedOffset>,
}

impl From<&TransactionRecord> for TransferReceipt {
    fn from(record: &TransactionRecord) -> Self {
        Self {
            transaction_id: record.id,
            recipient_account_id: record.recipient_account_id,
            amount: record.amount,
            timestamp: record.timestamp,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn request(recipient: Option<i64>, amount: Option<AmountInput>) -> TransferRequest {
        TransferRequest {
            sender_account_id: AccountId::new(1),
            recipient_account_id: recipient.map(AccountId::new),
            amount,
            concept: None,
        }
    }

    #[test]
    fn test_parse_complete_request() {
        let command = TransferRequest::new(AccountId::new(1), AccountId::new(2), "1000.50", "rent")
            .parse(&TransferPolicy::default())
            .unwrap();

        assert_eq!(command.recipient_account_id, AccountId::new(2));
        assert_eq!(command.amount, Money::new(dec!(1000.5)));
        assert_eq!(command.concept, "rent");
    }

    #[test]
    fn test_missing_recipient_is_checked_before_amount() {
        let err = request(None, None).parse(&TransferPolicy::default()).unwrap_err();
        assert!(matches!(err, TransferError::MissingRecipient));
    }

    #[test]
    fn test_missing_amount_is_invalid() {
        let err = request(Some(2), None).parse(&TransferPolicy::default()).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAmount(_)));
    }

    #[test]
    fn test_non_numeric_amount_is_invalid() {
        let err = request(Some(2), Some("abc".into())).parse(&TransferPolicy::default()).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAmount(_)));
    }

    #[test]
    fn test_sub_cent_amount_is_invalid() {
        let err = request(Some(2), Some("500.001".into())).parse(&TransferPolicy::default()).unwrap_err();
        assert!(matches!(err, TransferError::InvalidAmount(_)));
    }

    #[rstest]
    #[case("10000.001")]
    #[case("499.999")]
    #[case("0.001")]
    #[case("-0.001")]
    #[case("1e30")]
    #[case("-1e30")]
    #[case("1e-40")]
    #[case("100000000000000000000000000000000")]
    fn test_out_of_range_amount_wins_over_precision(#[case] amount: &str) {
        let err = request(Some(2), Some(amount.into()))
            .parse(&TransferPolicy::default())
            .unwrap_err();
        assert!(matches!(err, TransferError::AmountOutOfRange { .. }), "{amount}: {err:?}");
        assert_eq!(err.error_code(), "LIMIT_EXCEEDED");
    }

    #[test]
    fn test_huge_json_number_is_out_of_range() {
        let request: TransferRequest = serde_json::from_value(serde_json::json!({
            "sender_account_id": 1,
            "recipient_account_id": 2,
            "amount": 1e30
        }))
        .unwrap();

        let err = request.parse(&TransferPolicy::default()).unwrap_err();
        assert_eq!(err.error_code(), "LIMIT_EXCEEDED");
    }

    #[test]
    fn test_bounds_use_the_given_policy() {
        let policy = TransferPolicy {
            max_transfer: Money::from_major(600),
            ..TransferPolicy::default()
        };
        let err = request(Some(2), Some("700".into())).parse(&policy).unwrap_err();
        assert!(matches!(err, TransferError::AmountOutOfRange { .. }));
    }

    #[test]
    fn test_missing_concept_defaults_to_empty() {
        let command = request(Some(2), Some(700_i64.into())).parse(&TransferPolicy::default()).unwrap();
        assert_eq!(command.concept, "");
    }

    #[test]
    fn test_deserialize_number_and_string_amounts() {
        let from_number: TransferRequest = serde_json::from_value(serde_json::json!({
            "sender_account_id": 1,
            "recipient_account_id": 2,
            "amount": 1000,
            "concept": "rent"
        }))
        .unwrap();
        let from_text: TransferRequest = serde_json::from_value(serde_json::json!({
            "sender_account_id": 1,
            "recipient_account_id": 2,
            "amount": "1000.00"
        }))
        .unwrap();

        assert_eq!(from_number.parse(&TransferPolicy::default()).unwrap().amount, Money::from_major(1000));
        assert_eq!(from_text.parse(&TransferPolicy::default()).unwrap().amount, Money::from_major(1000));
    }

    #[test]
    fn test_deserialize_fractional_json_number() {
        let request: TransferRequest = serde_json::from_value(serde_json::json!({
            "sender_account_id": 1,
            "recipient_account_id": 2,
            "amount": 750.25
        }))
        .unwrap();

        assert_eq!(request.parse(&TransferPolicy::default()).unwrap().amount, Money::new(dec!(750.25)));
    }

    #[test]
    fn test_receipt_from_record() {
        let record = TransactionRecord {
            id: TransactionId::new(9),
            sender_account_id: AccountId::new(1),
            recipient_account_id: AccountId::new(2),
            amount: Money::from_major(1000),
            concept: "rent".to_string(),
            status: TransactionStatus::Completed,
            timestamp: DateTime::parse_from_rfc3339("2026-10-16T09:00:00-06:00").unwrap(),
        };

        let receipt = TransferReceipt::from(&record);
        assert_eq!(receipt.transaction_id, TransactionId::new(9));
        assert_eq!(receipt.recipient_account_id, AccountId::new(2));
        assert_eq!(receipt.amount, Money::from_major(1000));
        assert_eq!(receipt.timestamp, record.timestamp);
    }
}
