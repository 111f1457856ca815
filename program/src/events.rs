use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{log::sol_log_data, msg, pubkey::Pubkey};

/// Observable raffle events. Each is written to the transaction log as
/// borsh-encoded program data so indexers can decode it, plus a readable line.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub enum RaffleEvent {
    EntryAdmitted {
        participant: Pubkey,
        amount: u64,
    },
    /// Emitted by the oracle client when a request leaves for the coordinator
    RandomWordsRequested {
        request_id: u64,
        raffle: Pubkey,
        gas_lane: [u8; 32],
        subscription_id: u64,
        request_confirmations: u16,
        callback_gas_limit: u32,
        num_words: u32,
    },
    SelectionRequested {
        request_id: u64,
    },
    WinnerPicked {
        winner: Pubkey,
    },
}

impl RaffleEvent {
    pub fn emit(&self) {
        match self {
            RaffleEvent::EntryAdmitted { participant, amount } => {
                msg!("EntryAdmitted: participant={} amount={}", participant, amount)
            }
            RaffleEvent::RandomWordsRequested {
                request_id,
                raffle,
                num_words,
                ..
            } => msg!(
                "RandomWordsRequested: request_id={} raffle={} num_words={}",
                request_id,
                raffle,
                num_words
            ),
            RaffleEvent::SelectionRequested { request_id } => {
                msg!("SelectionRequested: request_id={}", request_id)
            }
            RaffleEvent::WinnerPicked { winner } => msg!("WinnerPicked: winner={}", winner),
        }

        match self.try_to_vec() {
            Ok(data) => sol_log_data(&[data.as_slice()]),
            Err(err) => msg!("Failed to encode event: {}", err),
        }
    }
}
