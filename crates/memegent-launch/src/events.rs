//! Deployed-token extraction from launch receipts

use crate::abi::ILaunchpad::{self, ILaunchpadEvents};
use crate::wallet::LogEntry;
use alloy_primitives::Address;
use alloy_sol_types::SolEventInterface;

/// Decode launchpad events from a receipt, skipping logs that do not decode
pub fn decode_launchpad_events<'a>(
    logs: &'a [LogEntry],
    launchpad: Address,
) -> impl Iterator<Item = ILaunchpadEvents> + 'a {
    logs.iter()
        .filter(move |log| log.address == launchpad)
        .filter_map(|log| ILaunchpadEvents::decode_raw_log(&log.topics, &log.data, true).ok())
}

/// First `TokenLaunched` event emitted by the launchpad, if any
#[must_use]
pub fn find_token_launched(
    logs: &[LogEntry],
    launchpad: Address,
) -> Option<ILaunchpad::TokenLaunched> {
    decode_launchpad_events(logs, launchpad).find_map(|event| match event {
        ILaunchpadEvents::TokenLaunched(launched) => Some(launched),
        _ => None,
    })
}

/// Address of the token deployed by a launch transaction
#[must_use]
pub fn extract_launched_token(logs: &[LogEntry], launchpad: Address) -> Option<Address> {
    find_token_launched(logs, launchpad).map(|launched| launched.tokenAddress)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abi::IERC20;
    use alloy_primitives::{Bytes, B256, U256};
    use alloy_sol_types::SolEvent;

    const LAUNCHPAD: Address = Address::repeat_byte(0x1a);

    fn launched(token: Address) -> LogEntry {
        let event = ILaunchpad::TokenLaunched {
            tokenAddress: token,
            creator: Address::repeat_byte(0xc0),
            name: "Papi".into(),
            symbol: "PAPI".into(),
            initialSupply: U256::from(1u64),
        };
        LogEntry::new(LAUNCHPAD, &event.encode_log_data())
    }

    fn transfer(emitter: Address) -> LogEntry {
        let event = IERC20::Transfer {
            from: Address::ZERO,
            to: Address::repeat_byte(0x02),
            amount: U256::from(9u64),
        };
        LogEntry::new(emitter, &event.encode_log_data())
    }

    #[test]
    fn finds_token_among_other_logs() {
        let token = Address::repeat_byte(0x77);
        let logs = vec![transfer(token), transfer(LAUNCHPAD), launched(token)];
        assert_eq!(extract_launched_token(&logs, LAUNCHPAD), Some(token));
    }

    #[test]
    fn first_match_wins() {
        let first = Address::repeat_byte(0x01);
        let second = Address::repeat_byte(0x02);
        let logs = vec![launched(first), launched(second)];
        assert_eq!(extract_launched_token(&logs, LAUNCHPAD), Some(first));
    }

    #[test]
    fn garbage_logs_are_skipped() {
        let garbage = LogEntry {
            address: LAUNCHPAD,
            topics: vec![B256::repeat_byte(0xee)],
            data: Bytes::from_static(&[1, 2, 3]),
        };
        let truncated = LogEntry {
            data: Bytes::new(),
            ..launched(Address::repeat_byte(0x05))
        };
        assert_eq!(extract_launched_token(&[garbage, truncated], LAUNCHPAD), None);
    }

    #[test]
    fn other_emitters_are_ignored() {
        let mut log = launched(Address::repeat_byte(0x09));
        log.address = Address::repeat_byte(0xde);
        assert_eq!(extract_launched_token(&[log], LAUNCHPAD), None);
    }

    #[test]
    fn empty_receipt_yields_nothing() {
        assert_eq!(extract_launched_token(&[], LAUNCHPAD), None);
    }
}
