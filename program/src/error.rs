use solana_program::{
    decode_error::DecodeError,
    msg,
    program_error::{PrintProgramError, ProgramError},
};
use std::convert::TryFrom;
use thiserror::Error;

/// Errors that may be returned by the lottery program
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum LotteryError {
    /// Paid amount is below the raffle's entrance fee
    #[error("Payment is below the entrance fee")]
    InsufficientPayment,

    /// Entries are closed while a winner is being selected
    #[error("Raffle is not open")]
    RaffleNotOpen,

    /// Eligibility check failed, winner selection cannot start
    #[error("Upkeep not needed")]
    UpkeepNotNeeded,

    /// Fulfillment does not match the pending randomness request
    #[error("Unknown or already consumed randomness request")]
    UnknownRequest,

    /// The prize could not be moved to the winner
    #[error("Payout to winner failed")]
    PayoutFailed,

    /// Invalid instruction data passed
    #[error("Invalid instruction")]
    InvalidInstruction,

    #[error("Account already initialized")]
    AlreadyInitialized,

    #[error("Account not initialized")]
    NotInitialized,

    /// Entrance fee, interval, capacity or oracle parameters out of range
    #[error("Invalid configuration value")]
    InvalidConfig,

    #[error("Raffle has reached its participant capacity")]
    RaffleFull,

    #[error("Only the randomness coordinator can fulfill requests")]
    OnlyCoordinatorCanFulfill,

    #[error("Only the config admin can perform this action")]
    NotAdmin,

    /// Account is not the raffle PDA it claims to be
    #[error("Invalid raffle account")]
    InvalidRaffleAccount,

    #[error("Arithmetic overflow")]
    Overflow,
}

impl From<LotteryError> for ProgramError {
    fn from(e: LotteryError) -> Self {
        ProgramError::Custom(e as u32)
    }
}

impl TryFrom<u32> for LotteryError {
    type Error = &'static str;

    fn try_from(code: u32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(LotteryError::InsufficientPayment),
            1 => Ok(LotteryError::RaffleNotOpen),
            2 => Ok(LotteryError::UpkeepNotNeeded),
            3 => Ok(LotteryError::UnknownRequest),
            4 => Ok(LotteryError::PayoutFailed),
            5 => Ok(LotteryError::InvalidInstruction),
            6 => Ok(LotteryError::AlreadyInitialized),
            7 => Ok(LotteryError::NotInitialized),
            8 => Ok(LotteryError::InvalidConfig),
            9 => Ok(LotteryError::RaffleFull),
            10 => Ok(LotteryError::OnlyCoordinatorCanFulfill),
            11 => Ok(LotteryError::NotAdmin),
            12 => Ok(LotteryError::InvalidRaffleAccount),
            13 => Ok(LotteryError::Overflow),
            _ => Err("Unknown lottery error code"),
        }
    }
}

impl<T> DecodeError<T> for LotteryError {
    fn type_of() -> &'static str {
        "Lottery Error"
    }
}

impl PrintProgramError for LotteryError {
    fn print<E>(&self) {
        msg!(&self.to_string());
    }
}

/// Logs a program error, decoding it when it is one of ours.
pub fn report(error: &ProgramError) {
    match error {
        ProgramError::Custom(code) => match LotteryError::try_from(*code) {
            Ok(lottery_error) => msg!(&lottery_error.to_string()),
            Err(_) => msg!("Custom program error: {}", code),
        },
        other => msg!("Program error: {}", other),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_decode_back_to_variants() {
        for error in [
            LotteryError::InsufficientPayment,
            LotteryError::UnknownRequest,
            LotteryError::PayoutFailed,
            LotteryError::Overflow,
        ] {
            match ProgramError::from(error) {
                ProgramError::Custom(code) => {
                    assert_eq!(LotteryError::try_from(code), Ok(error))
                }
                other => panic!("unexpected conversion: {:?}", other),
            }
        }
        assert!(LotteryError::try_from(99).is_err());
    }

    #[test]
    fn core_error_codes_are_stable() {
        assert_eq!(LotteryError::InsufficientPayment as u32, 0);
        assert_eq!(LotteryError::RaffleNotOpen as u32, 1);
        assert_eq!(LotteryError::UpkeepNotNeeded as u32, 2);
        assert_eq!(LotteryError::UnknownRequest as u32, 3);
        assert_eq!(LotteryError::PayoutFailed as u32, 4);
    }

    #[test]
    fn report_handles_every_error_shape() {
        report(&LotteryError::UnknownRequest.into());
        report(&ProgramError::Custom(99));
        report(&ProgramError::MissingRequiredSignature);
    }
}
