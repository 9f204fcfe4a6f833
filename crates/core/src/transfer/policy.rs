//! Ordered precondition checks for a transfer.
//!
//! The policy is pure: every store implementation reads a
//! [`TransferSnapshot`] under lock and asks the policy for a verdict, so the
//! rejection order is identical regardless of persistence.

use remesa_shared::config::LimitsConfig;
use remesa_shared::types::Money;

use super::error::TransferError;
use super::types::{TransferCommand, TransferSnapshot};

/// Monetary limits applied to transfers. All bounds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferPolicy {
    /// Smallest single transfer.
    pub min_transfer: Money,
    /// Largest single transfer.
    pub max_transfer: Money,
    /// Per-account daily sent total.
    pub daily_sent_cap: Money,
    /// Per-account daily received total.
    pub daily_received_cap: Money,
    /// Recipient balance ceiling.
    pub balance_cap: Money,
}

impl Default for TransferPolicy {
    fn default() -> Self {
        Self::from(&LimitsConfig::default())
    }
}

impl From<&LimitsConfig> for TransferPolicy {
    fn from(limits: &LimitsConfig) -> Self {
        Self {
            min_transfer: Money::new(limits.min_transfer),
            max_transfer: Money::new(limits.max_transfer),
            daily_sent_cap: Money::new(limits.daily_sent_cap),
            daily_received_cap: Money::new(limits.daily_received_cap),
            balance_cap: Money::new(limits.balance_cap),
        }
    }
}

impl TransferPolicy {
    /// Checks the single-transfer bounds.
    ///
    /// # Errors
    ///
    /// Returns `TransferError::AmountOutOfRange` for amounts outside
    /// `[min_transfer, max_transfer]`, zero and negatives included.
    pub fn check_amount(&self, amount: Money) -> Result<(), TransferError> {
        if amount < self.min_transfer || amount > self.max_transfer {
            return Err(TransferError::AmountOutOfRange {
                amount,
                min: self.min_transfer,
                max: self.max_transfer,
            });
        }
        Ok(())
    }

    /// Evaluates a transfer against state read under lock.
    ///
    /// Checks run in a fixed order and the first failure wins: amount
    /// bounds, sender exists, recipient exists and is active, not a
    /// self-transfer, sufficient funds, daily sent and received caps,
    /// recipient balance ceiling. An inactive sender is accepted.
    ///
    /// # Errors
    ///
    /// Returns the first violated precondition.
    pub fn evaluate(
        &self,
        command: &TransferCommand,
        snapshot: &TransferSnapshot,
    ) -> Result<(), TransferError> {
        let amount = command.amount;
        self.check_amount(amount)?;

        let sender = snapshot
            .sender
            .ok_or(TransferError::SenderNotFound(command.sender_account_id))?;

        let recipient = snapshot
            .recipient
            .filter(|r| r.active)
            .ok_or(TransferError::RecipientNotFound(command.recipient_account_id))?;

        if sender.id == recipient.id {
            return Err(TransferError::SelfTransfer(sender.id));
        }

        if sender.balance < amount {
            return Err(TransferError::InsufficientFunds {
                balance: sender.balance,
                amount,
            });
        }

        if !within(snapshot.sent_today, amount, self.daily_sent_cap) {
            return Err(TransferError::DailySentCapExceeded {
                sent_today: snapshot.sent_today,
                amount,
                cap: self.daily_sent_cap,
            });
        }

        if !within(snapshot.received_today, amount, self.daily_received_cap) {
            return Err(TransferError::DailyReceivedCapExceeded {
                received_today: snapshot.received_today,
                amount,
                cap: self.daily_received_cap,
            });
        }

        if !within(recipient.balance, amount, self.balance_cap) {
            return Err(TransferError::BalanceCapExceeded {
                balance: recipient.balance,
                amount,
                cap: self.balance_cap,
            });
        }

        Ok(())
    }
}

/// `current + amount <= cap`, treating overflow as a violation.
fn within(current: Money, amount: Money, cap: Money) -> bool {
    current.checked_add(amount).is_some_and(|total| total <= cap)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transfer::types::AccountState;
    use remesa_shared::types::AccountId;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn account(id: i64, balance: i64, active: bool) -> AccountState {
        AccountState {
            id: AccountId::new(id),
            balance: Money::from_major(balance),
            active,
        }
    }

    fn command(sender: i64, recipient: i64, amount: i64) -> TransferCommand {
        TransferCommand {
            sender_account_id: AccountId::new(sender),
            recipient_account_id: AccountId::new(recipient),
            amount: Money::from_major(amount),
            concept: "rent".to_string(),
        }
    }

    fn snapshot(sender: Option<AccountState>, recipient: Option<AccountState>) -> TransferSnapshot {
        TransferSnapshot {
            sender,
            recipient,
            sent_today: Money::ZERO,
            received_today: Money::ZERO,
        }
    }

    #[rstest]
    #[case(dec!(499.99), false)]
    #[case(dec!(500), true)]
    #[case(dec!(10000), true)]
    #[case(dec!(10000.01), false)]
    #[case(dec!(0), false)]
    #[case(dec!(-600), false)]
    fn test_check_amount_bounds_are_inclusive(
        #[case] amount: rust_decimal::Decimal,
        #[case] accepted: bool,
    ) {
        let policy = TransferPolicy::default();
        assert_eq!(policy.check_amount(Money::new(amount)).is_ok(), accepted);
    }

    #[test]
    fn test_successful_evaluation() {
        let policy = TransferPolicy::default();
        let snap = snapshot(Some(account(1, 5000, true)), Some(account(2, 3000, true)));

        assert!(policy.evaluate(&command(1, 2, 1000), &snap).is_ok());
    }

    #[test]
    fn test_missing_sender() {
        let policy = TransferPolicy::default();
        let snap = snapshot(None, Some(account(2, 3000, true)));

        assert!(matches!(
            policy.evaluate(&command(1, 2, 1000), &snap),
            Err(TransferError::SenderNotFound(id)) if id == AccountId::new(1)
        ));
    }

    #[test]
    fn test_inactive_recipient_is_not_found() {
        let policy = TransferPolicy::default();
        let snap = snapshot(Some(account(1, 5000, true)), Some(account(2, 3000, false)));

        assert!(matches!(
            policy.evaluate(&command(1, 2, 1000), &snap),
            Err(TransferError::RecipientNotFound(_))
        ));
    }

    #[test]
    fn test_inactive_sender_may_send() {
        let policy = TransferPolicy::default();
        let snap = snapshot(Some(account(1, 5000, false)), Some(account(2, 3000, true)));

        assert!(policy.evaluate(&command(1, 2, 1000), &snap).is_ok());
    }

    #[test]
    fn test_self_transfer() {
        let policy = TransferPolicy::default();
        let same = account(1, 5000, true);
        let snap = snapshot(Some(same), Some(same));

        assert!(matches!(
            policy.evaluate(&command(1, 1, 1000), &snap),
            Err(TransferError::SelfTransfer(_))
        ));
    }

    #[test]
    fn test_insufficient_funds() {
        let policy = TransferPolicy::default();
        let snap = snapshot(Some(account(1, 999, true)), Some(account(2, 0, true)));

        assert!(matches!(
            policy.evaluate(&command(1, 2, 1000), &snap),
            Err(TransferError::InsufficientFunds { .. })
        ));
    }

    #[test]
    fn test_daily_sent_cap() {
        let policy = TransferPolicy::default();
        let mut snap = snapshot(Some(account(1, 20_000, true)), Some(account(2, 0, true)));
        snap.sent_today = Money::from_major(9600);

        assert!(matches!(
            policy.evaluate(&command(1, 2, 500), &snap),
            Err(TransferError::DailySentCapExceeded { .. })
        ));

        snap.sent_today = Money::from_major(9500);
        assert!(policy.evaluate(&command(1, 2, 500), &snap).is_ok());
    }

    #[test]
    fn test_daily_received_cap_uses_received_total() {
        let policy = TransferPolicy::default();
        let mut snap = snapshot(Some(account(1, 20_000, true)), Some(account(2, 0, true)));
        snap.received_today = Money::from_major(9600);

        assert!(matches!(
            policy.evaluate(&command(1, 2, 500), &snap),
            Err(TransferError::DailyReceivedCapExceeded { .. })
        ));
    }

    #[test]
    fn test_balance_cap() {
        let policy = TransferPolicy::default();
        let snap = snapshot(Some(account(1, 5000, true)), Some(account(2, 49_500, true)));

        assert!(matches!(
            policy.evaluate(&command(1, 2, 501), &snap),
            Err(TransferError::BalanceCapExceeded { .. })
        ));
        assert!(policy.evaluate(&command(1, 2, 500), &snap).is_ok());
    }

    #[test]
    fn test_policy_from_limits_config() {
        let limits = LimitsConfig {
            balance_cap: dec!(75000),
            ..LimitsConfig::default()
        };
        let policy = TransferPolicy::from(&limits);

        assert_eq!(policy.balance_cap, Money::from_major(75_000));
        assert_eq!(policy.min_transfer, Money::from_major(500));
    }
}
