//! Delivery receipts shared by the queue adapters.
//!
//! A receipt names one receive of one message as `<id>:<receive_count>`.
//! It settles the message only while the stored receive count still
//! matches, so a worker whose visibility lease lapsed cannot acknowledge or
//! release a message that another worker has since claimed.

use std::fmt::Display;
use std::str::FromStr;

use crate::domain::ports::{DeliveryReceipt, QueueReceiveError};

const SEPARATOR: char = ':';

/// Receipt for the `receive_count`-th receive of message `id`.
pub(crate) fn issue(id: impl Display, receive_count: u32) -> DeliveryReceipt {
    DeliveryReceipt::new(format!("{id}{SEPARATOR}{receive_count}"))
}

/// Split a receipt into the message id and the receive it was issued for.
pub(crate) fn parse<Id: FromStr>(receipt: &DeliveryReceipt) -> Result<(Id, u32), QueueReceiveError> {
    let invalid = || QueueReceiveError::receipt(receipt.as_str());
    let (id, count) = receipt.as_str().split_once(SEPARATOR).ok_or_else(invalid)?;
    let id = id.parse().map_err(|_| invalid())?;
    let count = count.parse().map_err(|_| invalid())?;
    Ok((id, count))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn issued_receipts_parse_back() {
        let receipt = issue(42_i64, 3);

        assert_eq!(receipt.as_str(), "42:3");
        assert_eq!(parse::<i64>(&receipt), Ok((42, 3)));
    }

    #[rstest]
    #[case::bare_id("42")]
    #[case::non_numeric_id("abc:1")]
    #[case::non_numeric_count("42:x")]
    #[case::negative_count("42:-1")]
    #[case::empty("")]
    fn malformed_receipts_are_rejected(#[case] raw: &str) {
        assert_eq!(
            parse::<i64>(&DeliveryReceipt::new(raw)),
            Err(QueueReceiveError::receipt(raw))
        );
    }
}
