//! Amount validation and ether/wei conversion

use alloy_primitives::U256;
use alloy_primitives::utils::{Unit, parse_ether};

/// Which way the money moves; selects the wording of validation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Deposit,
    Withdrawal,
}

impl Direction {
    fn noun(self) -> &'static str {
        match self {
            Direction::Deposit => "deposit",
            Direction::Withdrawal => "withdrawal",
        }
    }

    fn title(self) -> &'static str {
        match self {
            Direction::Deposit => "Deposit",
            Direction::Withdrawal => "Withdrawal",
        }
    }
}

/// Rejected user input. The `Display` text is shown to the user as is.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InputError {
    #[error("Please enter a {} amount", .0.noun())]
    Empty(Direction),
    #[error("Please enter a valid {} amount", .0.noun())]
    Invalid(Direction),
    #[error("{} amount should be at least {} ETH", .0.title(), .1)]
    BelowMinimum(Direction, u64),
}

/// Checks a raw amount typed by the user and converts it to wei
///
/// The minimum is whole ether and is compared in wei, so the returned value
/// keeps every decimal the user typed (up to 18).
pub fn validate(direction: Direction, input: &str, minimum: u64) -> Result<U256, InputError> {
    let input = input.trim();
    if input.is_empty() {
        return Err(InputError::Empty(direction));
    }
    let (negative, magnitude) = match input.strip_prefix('-') {
        Some(magnitude) => (true, magnitude),
        None => (false, input),
    };
    if !magnitude.bytes().any(|b| b.is_ascii_digit()) {
        return Err(InputError::Invalid(direction));
    }
    let wei = parse_ether(magnitude).map_err(|_| InputError::Invalid(direction))?;
    // negative numbers are below any minimum, including 0
    if negative || wei < ether_to_wei(minimum) {
        return Err(InputError::BelowMinimum(direction, minimum));
    }
    Ok(wei)
}

/// Whole ether held in `wei`, fractional part dropped
pub fn whole_ether(wei: U256) -> U256 {
    wei / Unit::ETHER.wei()
}

/// Wei value of a whole-ether limit
pub fn ether_to_wei(ether: u64) -> U256 {
    U256::from(ether) * Unit::ETHER.wei()
}

/// Parses a minimum typed in a limit field; anything but a whole number is
/// ignored by the caller
pub fn parse_minimum(input: &str) -> Option<u64> {
    input.trim().parse().ok()
}
