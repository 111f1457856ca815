// Randomness oracle client for the lottery program
use solana_program::{
    account_info::AccountInfo, entrypoint::ProgramResult, msg, program_error::ProgramError,
    pubkey::Pubkey,
};

use crate::{error::LotteryError, events::RaffleEvent, state::Raffle};

/// Block confirmations the coordinator waits before answering
pub const REQUEST_CONFIRMATIONS: u16 = 3;
/// Random words asked for per request
pub const NUM_WORDS: u32 = 1;

/// Parameters of one randomness request
#[derive(Clone, Debug, PartialEq)]
pub struct RandomnessRequest {
    pub raffle: Pubkey,
    /// Monotonic per-raffle sequence number, never reused
    pub sequence: u64,
    pub gas_lane: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
}

impl RandomnessRequest {
    pub fn for_raffle(raffle_key: &Pubkey, raffle: &Raffle) -> Result<Self, ProgramError> {
        let sequence = raffle
            .request_nonce
            .checked_add(1)
            .ok_or(LotteryError::Overflow)?;
        Ok(Self {
            raffle: *raffle_key,
            sequence,
            gas_lane: raffle.gas_lane,
            subscription_id: raffle.subscription_id,
            callback_gas_limit: raffle.callback_gas_limit,
        })
    }
}

/// Outbound half of the two-phase randomness protocol. The answer comes back
/// later as a separate `FulfillRandomWords` instruction.
pub trait RandomnessOracle {
    /// Submit a request and return its correlation id
    fn request_random_words(&mut self, request: &RandomnessRequest) -> Result<u64, ProgramError>;
}

/// Oracle client for an off-chain coordinator that watches program logs for
/// `RandomWordsRequested` and answers with a coordinator-signed fulfillment.
#[derive(Default)]
pub struct CoordinatorClient;

impl RandomnessOracle for CoordinatorClient {
    fn request_random_words(&mut self, request: &RandomnessRequest) -> Result<u64, ProgramError> {
        let request_id = request.sequence;
        RaffleEvent::RandomWordsRequested {
            request_id,
            raffle: request.raffle,
            gas_lane: request.gas_lane,
            subscription_id: request.subscription_id,
            request_confirmations: REQUEST_CONFIRMATIONS,
            callback_gas_limit: request.callback_gas_limit,
            num_words: NUM_WORDS,
        }
        .emit();
        Ok(request_id)
    }
}

/// Verify the fulfillment was signed by the raffle's coordinator
pub fn verify_coordinator(coordinator_info: &AccountInfo, expected: &Pubkey) -> ProgramResult {
    if !coordinator_info.is_signer {
        msg!("Coordinator must sign the fulfillment");
        return Err(ProgramError::MissingRequiredSignature);
    }
    if coordinator_info.key != expected {
        msg!(
            "Fulfillment from {} but raffle coordinator is {}",
            coordinator_info.key,
            expected
        );
        return Err(LotteryError::OnlyCoordinatorCanFulfill.into());
    }
    Ok(())
}

/// Map a random word onto a participant index
pub fn winner_index(random_word: u64, total_players: usize) -> usize {
    if total_players == 0 {
        return 0;
    }
    (random_word % total_players as u64) as usize
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn winner_index_is_word_mod_players() {
        assert_eq!(winner_index(42, 1), 0);
        assert_eq!(winner_index(7, 3), 1);
        assert_eq!(winner_index(u64::MAX, 10), 5);
        assert_eq!(winner_index(9, 0), 0);
    }

    #[test]
    fn coordinator_ids_follow_sequence() {
        let request = RandomnessRequest {
            raffle: Pubkey::new_unique(),
            sequence: 12,
            gas_lane: [1; 32],
            subscription_id: 3,
            callback_gas_limit: 100_000,
        };
        assert_eq!(CoordinatorClient.request_random_words(&request), Ok(12));
    }

    #[test]
    fn coordinator_must_match_and_sign() {
        let expected = Pubkey::new_unique();
        let owner = Pubkey::default();
        let mut lamports = 0;
        let mut data: Vec<u8> = vec![];

        let signer = AccountInfo::new(
            &expected, true, false, &mut lamports, &mut data, &owner, false, 0,
        );
        assert_eq!(verify_coordinator(&signer, &expected), Ok(()));

        let other = Pubkey::new_unique();
        assert_eq!(
            verify_coordinator(&signer, &other),
            Err(LotteryError::OnlyCoordinatorCanFulfill.into())
        );
    }

    #[test]
    fn unsigned_coordinator_is_rejected() {
        let expected = Pubkey::new_unique();
        let owner = Pubkey::default();
        let mut lamports = 0;
        let mut data: Vec<u8> = vec![];
        let unsigned = AccountInfo::new(
            &expected, false, false, &mut lamports, &mut data, &owner, false, 0,
        );
        assert_eq!(
            verify_coordinator(&unsigned, &expected),
            Err(ProgramError::MissingRequiredSignature)
        );
    }
}
