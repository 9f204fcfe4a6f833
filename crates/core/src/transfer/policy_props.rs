//! Property-based tests for TransferPolicy.
//!
//! - Amount bounds are inclusive and checked before anything else
//! - The first violated precondition always wins
//! - Daily caps accept exactly when `total + amount <= cap`
//! - Parsing reports the bounds before the minor-unit precision

use proptest::prelude::*;
use remesa_shared::types::{AccountId, Money};
use rust_decimal::Decimal;

use super::error::TransferError;
use super::policy::TransferPolicy;
use super::types::{AccountState, AmountInput, TransferCommand, TransferRequest, TransferSnapshot};

/// Strategy to generate amounts with up to three fractional digits
/// (-100.000 to 50,000.000).
fn any_amount() -> impl Strategy<Value = Money> {
    (-100_000i64..50_000_000i64).prop_map(|mills| Money::new(Decimal::new(mills, 3)))
}

fn request_for(text: String) -> TransferRequest {
    TransferRequest {
        sender_account_id: AccountId::new(1),
        recipient_account_id: Some(AccountId::new(2)),
        amount: Some(AmountInput::Text(text)),
        concept: None,
    }
}

/// Strategy to generate amounts inside the single-transfer bounds.
fn valid_amount() -> impl Strategy<Value = Money> {
    (50_000i64..=1_000_000i64).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

/// Strategy to generate non-negative balances up to 60,000.00.
fn balance() -> impl Strategy<Value = Money> {
    (0i64..6_000_000i64).prop_map(|cents| Money::new(Decimal::new(cents, 2)))
}

fn command(sender: i64, recipient: i64, amount: Money) -> TransferCommand {
    TransferCommand {
        sender_account_id: AccountId::new(sender),
        recipient_account_id: AccountId::new(recipient),
        amount,
        concept: String::new(),
    }
}

fn roomy_snapshot() -> TransferSnapshot {
    TransferSnapshot {
        sender: Some(AccountState {
            id: AccountId::new(1),
            balance: Money::from_major(40_000),
            active: true,
        }),
        recipient: Some(AccountState {
            id: AccountId::new(2),
            balance: Money::ZERO,
            active: true,
        }),
        sent_today: Money::ZERO,
        received_today: Money::ZERO,
    }
}

/// Reference model: the code of the first failing check, in order.
#[allow(clippy::too_many_arguments, clippy::fn_params_excessive_bools)]
fn expected_code(
    policy: &TransferPolicy,
    amount: Money,
    sender_exists: bool,
    recipient_exists: bool,
    recipient_active: bool,
    same_account: bool,
    snapshot: &TransferSnapshot,
) -> Option<&'static str> {
    let sender_balance = snapshot.sender.map_or(Money::ZERO, |s| s.balance);
    let recipient_balance = snapshot.recipient.map_or(Money::ZERO, |r| r.balance);
    let sum = |a: Money, b: Money| a.checked_add(b).unwrap_or(Money::new(Decimal::MAX));

    if amount < policy.min_transfer || amount > policy.max_transfer {
        Some("LIMIT_EXCEEDED")
    } else if !sender_exists || !recipient_exists || !recipient_active {
        Some("NOT_FOUND")
    } else if same_account {
        Some("INVALID_REQUEST")
    } else if sender_balance < amount {
        Some("INSUFFICIENT_FUNDS")
    } else if sum(snapshot.sent_today, amount) > policy.daily_sent_cap
        || sum(snapshot.received_today, amount) > policy.daily_received_cap
    {
        Some("LIMIT_EXCEEDED")
    } else if sum(recipient_balance, amount) > policy.balance_cap {
        Some("BALANCE_CAP_EXCEEDED")
    } else {
        None
    }
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// Amounts outside [500, 10000] are rejected with LIMIT_EXCEEDED before any
    /// other check, even when no account exists.
    #[test]
    fn prop_out_of_range_amount_always_limit_exceeded(amount in any_amount()) {
        let policy = TransferPolicy::default();
        prop_assume!(amount < policy.min_transfer || amount > policy.max_transfer);

        let empty = TransferSnapshot {
            sender: None,
            recipient: None,
            sent_today: Money::ZERO,
            received_today: Money::ZERO,
        };
        let result = policy.evaluate(&command(1, 2, amount), &empty);
        let is_out_of_range = matches!(result, Err(TransferError::AmountOutOfRange { .. }));
        prop_assert!(is_out_of_range);
        prop_assert!(policy.check_amount(amount).is_err());
    }

    /// Any amount inside the bounds passes when accounts have room.
    #[test]
    fn prop_in_range_amount_accepted_with_room(amount in valid_amount()) {
        let policy = TransferPolicy::default();
        prop_assert!(policy.check_amount(amount).is_ok());
        prop_assert!(policy.evaluate(&command(1, 2, amount), &roomy_snapshot()).is_ok());
    }

    /// The verdict always matches the ordered reference model.
    #[test]
    fn prop_first_failing_check_wins(
        amount in any_amount(),
        sender_exists in any::<bool>(),
        recipient_exists in any::<bool>(),
        recipient_active in any::<bool>(),
        same_account in any::<bool>(),
        sender_balance in balance(),
        recipient_balance in balance(),
        sent_today in balance(),
        received_today in balance(),
    ) {
        let policy = TransferPolicy::default();
        let recipient_id = if same_account { 1 } else { 2 };

        let snapshot = TransferSnapshot {
            sender: sender_exists.then_some(AccountState {
                id: AccountId::new(1),
                balance: sender_balance,
                active: true,
            }),
            recipient: recipient_exists.then_some(AccountState {
                id: AccountId::new(recipient_id),
                balance: recipient_balance,
                active: recipient_active,
            }),
            sent_today,
            received_today,
        };

        let expected = expected_code(
            &policy,
            amount,
            sender_exists,
            recipient_exists,
            recipient_active,
            same_account,
            &snapshot,
        );
        let actual = policy
            .evaluate(&command(1, recipient_id, amount), &snapshot)
            .err()
            .map(|e| e.error_code());

        prop_assert_eq!(actual, expected);
    }

    /// The sent cap accepts exactly when sent_today + amount <= cap.
    #[test]
    fn prop_daily_sent_cap_is_exact(amount in valid_amount(), sent_today in balance()) {
        let policy = TransferPolicy::default();
        let mut snapshot = roomy_snapshot();
        snapshot.sent_today = sent_today;

        let total = sent_today.checked_add(amount).unwrap();
        let result = policy.evaluate(&command(1, 2, amount), &snapshot);

        if total <= policy.daily_sent_cap {
            prop_assert!(result.is_ok());
        } else {
            let is_sent_cap = matches!(result, Err(TransferError::DailySentCapExceeded { .. }));
            prop_assert!(is_sent_cap);
        }
    }

    /// An accepted transfer never pushes the recipient above the ceiling.
    #[test]
    fn prop_accepted_transfer_respects_balance_cap(
        amount in valid_amount(),
        recipient_balance in balance(),
    ) {
        let policy = TransferPolicy::default();
        let mut snapshot = roomy_snapshot();
        if let Some(recipient) = snapshot.recipient.as_mut() {
            recipient.balance = recipient_balance;
        }

        if policy.evaluate(&command(1, 2, amount), &snapshot).is_ok() {
            let after = recipient_balance.checked_add(amount).unwrap();
            prop_assert!(after <= policy.balance_cap);
        }
    }

    /// Out-of-bounds text is LIMIT_EXCEEDED whatever its precision; in-bounds
    /// text is rejected as INVALID_REQUEST only for a third fractional digit.
    #[test]
    fn prop_parse_checks_bounds_before_precision(amount in any_amount()) {
        let policy = TransferPolicy::default();
        let result = request_for(amount.amount().to_string()).parse(&policy);

        if policy.check_amount(amount).is_err() {
            let is_out_of_range = matches!(result, Err(TransferError::AmountOutOfRange { .. }));
            prop_assert!(is_out_of_range);
        } else if amount.amount().normalize().scale() > 2 {
            let is_invalid = matches!(result, Err(TransferError::InvalidAmount(_)));
            prop_assert!(is_invalid);
        } else {
            prop_assert_eq!(result.unwrap().amount, amount);
        }
    }

    /// Literals too large or too small for a decimal are still amounts
    /// outside the bounds.
    #[test]
    fn prop_unrepresentable_magnitudes_are_limit_exceeded(
        mantissa in 1u32..1000,
        exponent in 29i64..100_000,
        negative in any::<bool>(),
        tiny in any::<bool>(),
    ) {
        let sign = if negative { "-" } else { "" };
        let exponent = if tiny { -exponent } else { exponent };
        let result = request_for(format!("{sign}{mantissa}e{exponent}"))
            .parse(&TransferPolicy::default());

        prop_assert_eq!(result.unwrap_err().error_code(), "LIMIT_EXCEEDED");
    }
}
