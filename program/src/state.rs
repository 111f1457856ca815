use arrayref::{array_mut_ref, array_ref, array_refs, mut_array_refs};
use borsh::{BorshDeserialize, BorshSerialize};
use solana_program::{
    clock::UnixTimestamp,
    entrypoint::ProgramResult,
    program_error::ProgramError,
    program_pack::{IsInitialized, Pack, Sealed},
    pubkey::Pubkey,
};

use crate::error::LotteryError;

/// Upper bound on participants per raffle. Raffle accounts are created through
/// a system program CPI, which caps the allocation at 10 KiB.
pub const MAX_PLAYERS: u32 = 300;

/// Whether a raffle admits entries
#[derive(BorshSerialize, BorshDeserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum RaffleState {
    /// Accepting entries
    Open,
    /// Randomness requested, waiting on the coordinator
    Calculating,
}

/// Raffle account data. The account itself is the prize vault.
#[derive(BorshSerialize, BorshDeserialize, Clone, Debug, PartialEq)]
pub struct Raffle {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Sequential index from the config account, used in PDA derivation
    pub raffle_index: u64,
    /// PDA bump seed
    pub bump: u8,
    /// Minimum lamports per entry, fixed at construction
    pub entrance_fee: u64,
    /// Seconds that must pass between round start and winner selection
    pub interval: u64,
    /// Start of the current round
    pub last_timestamp: UnixTimestamp,
    pub state: RaffleState,
    /// Lamports paid in by the current round's entrants
    pub collected_balance: u64,
    /// Winner of the last completed round
    pub recent_winner: Option<Pubkey>,
    /// Correlation id of the outstanding randomness request
    pub pending_request: Option<u64>,
    /// Number of randomness requests issued so far
    pub request_nonce: u64,
    /// Only signer allowed to deliver randomness
    pub coordinator: Pubkey,
    pub gas_lane: [u8; 32],
    pub subscription_id: u64,
    pub callback_gas_limit: u32,
    /// Participant capacity of this account
    pub max_players: u32,
    /// Entries in admission order, duplicates allowed
    pub players: Vec<Pubkey>,
}

impl Raffle {
    /// Serialized size with every optional field present and no players
    pub const FIXED_LEN: usize =
        1 + 8 + 1 + 8 + 8 + 8 + 1 + 8 + 33 + 9 + 8 + 32 + 32 + 8 + 4 + 4 + 4;

    /// Account size needed for `max_players` entries
    pub fn space(max_players: u32) -> usize {
        Self::FIXED_LEN + 32 * max_players as usize
    }

    pub fn load(data: &[u8]) -> Result<Self, ProgramError> {
        let raffle =
            Self::deserialize(&mut &data[..]).map_err(|_| ProgramError::InvalidAccountData)?;
        if !raffle.is_initialized {
            return Err(LotteryError::NotInitialized.into());
        }
        Ok(raffle)
    }

    pub fn store(&self, data: &mut [u8]) -> ProgramResult {
        let mut dst = data;
        self.serialize(&mut dst)
            .map_err(|_| ProgramError::AccountDataTooSmall)
    }

    pub fn is_open(&self) -> bool {
        self.state == RaffleState::Open
    }

    pub fn num_players(&self) -> usize {
        self.players.len()
    }

    pub fn player(&self, index: usize) -> Option<&Pubkey> {
        self.players.get(index)
    }

    pub fn has_pending_request(&self) -> bool {
        self.pending_request.is_some()
    }

    pub fn pending_request_id(&self) -> Option<u64> {
        self.pending_request
    }

    pub fn is_full(&self) -> bool {
        self.players.len() >= self.max_players as usize
    }
}

impl IsInitialized for Raffle {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

/// Program configuration account
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Config {
    /// Is the account initialized
    pub is_initialized: bool,
    /// Admin authority that can update oracle settings
    pub admin: Pubkey,
    /// Randomness coordinator copied into every new raffle
    pub coordinator: Pubkey,
    /// Key hash selecting the oracle's gas lane
    pub gas_lane: [u8; 32],
    /// Oracle billing subscription
    pub subscription_id: u64,
    /// Gas budget the oracle spends on the fulfillment callback
    pub callback_gas_limit: u32,
    /// Counter for sequential raffle indexes
    pub next_raffle_index: u64,
}

impl Sealed for Config {}

impl IsInitialized for Config {
    fn is_initialized(&self) -> bool {
        self.is_initialized
    }
}

impl Pack for Config {
    const LEN: usize = 1 + 32 + 32 + 32 + 8 + 4 + 8;

    fn unpack_from_slice(src: &[u8]) -> Result<Self, ProgramError> {
        let src = array_ref![src, 0, Config::LEN];
        let (
            is_initialized,
            admin,
            coordinator,
            gas_lane,
            subscription_id,
            callback_gas_limit,
            next_raffle_index,
        ) = array_refs![src, 1, 32, 32, 32, 8, 4, 8];

        let is_initialized = match is_initialized {
            [0] => false,
            [1] => true,
            _ => return Err(ProgramError::InvalidAccountData),
        };

        Ok(Config {
            is_initialized,
            admin: Pubkey::new_from_array(*admin),
            coordinator: Pubkey::new_from_array(*coordinator),
            gas_lane: *gas_lane,
            subscription_id: u64::from_le_bytes(*subscription_id),
            callback_gas_limit: u32::from_le_bytes(*callback_gas_limit),
            next_raffle_index: u64::from_le_bytes(*next_raffle_index),
        })
    }

    fn pack_into_slice(&self, dst: &mut [u8]) {
        let dst = array_mut_ref![dst, 0, Config::LEN];
        let (
            is_initialized_dst,
            admin_dst,
            coordinator_dst,
            gas_lane_dst,
            subscription_id_dst,
            callback_gas_limit_dst,
            next_raffle_index_dst,
        ) = mut_array_refs![dst, 1, 32, 32, 32, 8, 4, 8];

        is_initialized_dst[0] = self.is_initialized as u8;
        admin_dst.copy_from_slice(self.admin.as_ref());
        coordinator_dst.copy_from_slice(self.coordinator.as_ref());
        gas_lane_dst.copy_from_slice(&self.gas_lane);
        *subscription_id_dst = self.subscription_id.to_le_bytes();
        *callback_gas_limit_dst = self.callback_gas_limit.to_le_bytes();
        *next_raffle_index_dst = self.next_raffle_index.to_le_bytes();
    }
}
