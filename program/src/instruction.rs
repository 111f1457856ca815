use solana_program::{
    instruction::{AccountMeta, Instruction},
    program_error::ProgramError,
    pubkey::Pubkey,
    system_program,
};
use std::convert::TryInto;

use crate::error::LotteryError;

/// Upper bound on random words accepted in one fulfillment
pub const MAX_RANDOM_WORDS: usize = 16;

#[derive(Clone, Debug, PartialEq)]
pub enum LotteryInstruction {
    /// Initialize the program config
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The admin account, pays for the config account
    /// 1. `[writable]` The config account (PDA)
    /// 2. `[]` The randomness coordinator
    /// 3. `[]` The system program
    InitializeConfig {
        /// Key hash selecting the oracle gas lane
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
    },

    /// Replace the coordinator and oracle parameters used by new raffles (admin only)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The admin authority
    /// 1. `[writable]` The config account
    /// 2. `[]` The new randomness coordinator
    UpdateOracle {
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
    },

    /// Create a raffle at the config's next raffle index
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The creator, pays for the raffle account
    /// 1. `[writable]` The raffle account (PDA)
    /// 2. `[writable]` The config account
    /// 3. `[]` The system program
    InitializeRaffle {
        /// Minimum entry payment in lamports
        entrance_fee: u64,
        /// Seconds between round start and winner selection
        interval: u64,
        /// Participant capacity
        max_players: u32,
    },

    /// Enter the current round
    ///
    /// Accounts expected:
    /// 0. `[signer, writable]` The participant, pays `amount`
    /// 1. `[writable]` The raffle account
    /// 2. `[]` The system program
    EnterRaffle {
        /// Lamports paid, at least the entrance fee
        amount: u64,
    },

    /// Evaluate eligibility without side effects. The answer is published as
    /// one byte of return data.
    ///
    /// Accounts expected:
    /// 0. `[]` The raffle account
    CheckUpkeep,

    /// Close entries and request randomness (anyone may call)
    ///
    /// Accounts expected:
    /// 0. `[signer]` The keeper triggering the upkeep
    /// 1. `[writable]` The raffle account
    PerformUpkeep,

    /// Deliver randomness for the pending request and pay the winner
    ///
    /// Accounts expected:
    /// 0. `[signer]` The randomness coordinator
    /// 1. `[writable]` The raffle account
    /// 2. `[writable]` The winner, `players[random_words[0] % players.len()]`
    ///
    /// Packing keeps at most `MAX_RANDOM_WORDS` words.
    FulfillRandomWords {
        request_id: u64,
        random_words: Vec<u64>,
    },
}

impl LotteryInstruction {
    /// Unpacks a byte buffer into a LotteryInstruction
    pub fn unpack(input: &[u8]) -> Result<Self, ProgramError> {
        let (tag, rest) = input
            .split_first()
            .ok_or(LotteryError::InvalidInstruction)?;

        Ok(match tag {
            0 | 1 => {
                let (gas_lane, rest) = Self::unpack_bytes32(rest)?;
                let (subscription_id, rest) = Self::unpack_u64(rest)?;
                let (callback_gas_limit, _) = Self::unpack_u32(rest)?;
                if *tag == 0 {
                    Self::InitializeConfig {
                        gas_lane,
                        subscription_id,
                        callback_gas_limit,
                    }
                } else {
                    Self::UpdateOracle {
                        gas_lane,
                        subscription_id,
                        callback_gas_limit,
                    }
                }
            }
            2 => {
                let (entrance_fee, rest) = Self::unpack_u64(rest)?;
                let (interval, rest) = Self::unpack_u64(rest)?;
                let (max_players, _) = Self::unpack_u32(rest)?;
                Self::InitializeRaffle {
                    entrance_fee,
                    interval,
                    max_players,
                }
            }
            3 => {
                let (amount, _) = Self::unpack_u64(rest)?;
                Self::EnterRaffle { amount }
            }
            4 => Self::CheckUpkeep,
            5 => Self::PerformUpkeep,
            6 => {
                let (request_id, rest) = Self::unpack_u64(rest)?;
                let (&count, mut rest) = rest
                    .split_first()
                    .ok_or(LotteryError::InvalidInstruction)?;
                let count = count as usize;
                if count == 0 || count > MAX_RANDOM_WORDS {
                    return Err(LotteryError::InvalidInstruction.into());
                }
                let mut random_words = Vec::with_capacity(count);
                for _ in 0..count {
                    let (word, remaining) = Self::unpack_u64(rest)?;
                    random_words.push(word);
                    rest = remaining;
                }
                Self::FulfillRandomWords {
                    request_id,
                    random_words,
                }
            }
            _ => return Err(LotteryError::InvalidInstruction.into()),
        })
    }

    /// Packs a LotteryInstruction into a byte buffer
    pub fn pack(&self) -> Vec<u8> {
        let mut buf = Vec::new();
        match self {
            Self::InitializeConfig {
                gas_lane,
                subscription_id,
                callback_gas_limit,
            }
            | Self::UpdateOracle {
                gas_lane,
                subscription_id,
                callback_gas_limit,
            } => {
                buf.push(if matches!(self, Self::InitializeConfig { .. }) { 0 } else { 1 });
                buf.extend_from_slice(gas_lane);
                buf.extend_from_slice(&subscription_id.to_le_bytes());
                buf.extend_from_slice(&callback_gas_limit.to_le_bytes());
            }
            Self::InitializeRaffle {
                entrance_fee,
                interval,
                max_players,
            } => {
                buf.push(2);
                buf.extend_from_slice(&entrance_fee.to_le_bytes());
                buf.extend_from_slice(&interval.to_le_bytes());
                buf.extend_from_slice(&max_players.to_le_bytes());
            }
            Self::EnterRaffle { amount } => {
                buf.push(3);
                buf.extend_from_slice(&amount.to_le_bytes());
            }
            Self::CheckUpkeep => buf.push(4),
            Self::PerformUpkeep => buf.push(5),
            Self::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                buf.push(6);
                buf.extend_from_slice(&request_id.to_le_bytes());
                let count = random_words.len().min(MAX_RANDOM_WORDS);
                buf.push(count as u8);
                for word in &random_words[..count] {
                    buf.extend_from_slice(&word.to_le_bytes());
                }
            }
        }
        buf
    }

    fn unpack_u64(input: &[u8]) -> Result<(u64, &[u8]), ProgramError> {
        let value = input
            .get(..8)
            .and_then(|slice| slice.try_into().ok())
            .map(u64::from_le_bytes)
            .ok_or(LotteryError::InvalidInstruction)?;
        Ok((value, &input[8..]))
    }

    fn unpack_u32(input: &[u8]) -> Result<(u32, &[u8]), ProgramError> {
        let value = input
            .get(..4)
            .and_then(|slice| slice.try_into().ok())
            .map(u32::from_le_bytes)
            .ok_or(LotteryError::InvalidInstruction)?;
        Ok((value, &input[4..]))
    }

    fn unpack_bytes32(input: &[u8]) -> Result<([u8; 32], &[u8]), ProgramError> {
        let value: [u8; 32] = input
            .get(..32)
            .and_then(|slice| slice.try_into().ok())
            .ok_or(LotteryError::InvalidInstruction)?;
        Ok((value, &input[32..]))
    }
}

/// Create initialize_config instruction
pub fn initialize_config(
    program_id: &Pubkey,
    admin: &Pubkey,
    config_account: &Pubkey,
    coordinator: &Pubkey,
    gas_lane: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
) -> Instruction {
    let data = LotteryInstruction::InitializeConfig {
        gas_lane,
        subscription_id,
        callback_gas_limit,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*admin, true),
            AccountMeta::new(*config_account, false),
            AccountMeta::new_readonly(*coordinator, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Create update_oracle instruction
pub fn update_oracle(
    program_id: &Pubkey,
    admin: &Pubkey,
    config_account: &Pubkey,
    new_coordinator: &Pubkey,
    gas_lane: [u8; 32],
    subscription_id: u64,
    callback_gas_limit: u32,
) -> Instruction {
    let data = LotteryInstruction::UpdateOracle {
        gas_lane,
        subscription_id,
        callback_gas_limit,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*admin, true),
            AccountMeta::new(*config_account, false),
            AccountMeta::new_readonly(*new_coordinator, false),
        ],
        data,
    }
}

/// Create initialize_raffle instruction
pub fn initialize_raffle(
    program_id: &Pubkey,
    creator: &Pubkey,
    raffle_account: &Pubkey,
    config_account: &Pubkey,
    entrance_fee: u64,
    interval: u64,
    max_players: u32,
) -> Instruction {
    let data = LotteryInstruction::InitializeRaffle {
        entrance_fee,
        interval,
        max_players,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*creator, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new(*config_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data,
    }
}

/// Create enter_raffle instruction
pub fn enter_raffle(
    program_id: &Pubkey,
    player: &Pubkey,
    raffle_account: &Pubkey,
    amount: u64,
) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new(*player, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new_readonly(system_program::id(), false),
        ],
        data: LotteryInstruction::EnterRaffle { amount }.pack(),
    }
}

/// Create check_upkeep instruction
pub fn check_upkeep(program_id: &Pubkey, raffle_account: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![AccountMeta::new_readonly(*raffle_account, false)],
        data: LotteryInstruction::CheckUpkeep.pack(),
    }
}

/// Create perform_upkeep instruction
pub fn perform_upkeep(program_id: &Pubkey, keeper: &Pubkey, raffle_account: &Pubkey) -> Instruction {
    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*keeper, true),
            AccountMeta::new(*raffle_account, false),
        ],
        data: LotteryInstruction::PerformUpkeep.pack(),
    }
}

/// Create fulfill_random_words instruction
pub fn fulfill_random_words(
    program_id: &Pubkey,
    coordinator: &Pubkey,
    raffle_account: &Pubkey,
    winner: &Pubkey,
    request_id: u64,
    random_words: Vec<u64>,
) -> Instruction {
    let data = LotteryInstruction::FulfillRandomWords {
        request_id,
        random_words,
    }
    .pack();

    Instruction {
        program_id: *program_id,
        accounts: vec![
            AccountMeta::new_readonly(*coordinator, true),
            AccountMeta::new(*raffle_account, false),
            AccountMeta::new(*winner, false),
        ],
        data,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fulfillment_carries_every_word() {
        let instruction = LotteryInstruction::FulfillRandomWords {
            request_id: 9,
            random_words: vec![42, u64::MAX],
        };
        let packed = instruction.pack();
        assert_eq!(packed.len(), 1 + 8 + 1 + 16);
        assert_eq!(LotteryInstruction::unpack(&packed), Ok(instruction));
    }

    #[test]
    fn oversized_word_list_is_capped() {
        let random_words: Vec<u64> = (0..256).collect();
        let packed = LotteryInstruction::FulfillRandomWords {
            request_id: 9,
            random_words,
        }
        .pack();
        assert_eq!(packed[9] as usize, MAX_RANDOM_WORDS);
        assert_eq!(
            LotteryInstruction::unpack(&packed),
            Ok(LotteryInstruction::FulfillRandomWords {
                request_id: 9,
                random_words: (0..MAX_RANDOM_WORDS as u64).collect(),
            })
        );
    }

    #[test]
    fn fulfillment_without_words_is_rejected() {
        let mut data = vec![6];
        data.extend_from_slice(&9u64.to_le_bytes());
        data.push(0);
        assert_eq!(
            LotteryInstruction::unpack(&data),
            Err(LotteryError::InvalidInstruction.into())
        );
    }

    #[test]
    fn truncated_word_list_is_rejected() {
        let mut data = vec![6];
        data.extend_from_slice(&9u64.to_le_bytes());
        data.push(2);
        data.extend_from_slice(&1u64.to_le_bytes());
        assert_eq!(
            LotteryInstruction::unpack(&data),
            Err(LotteryError::InvalidInstruction.into())
        );
    }

    #[test]
    fn config_and_oracle_update_use_distinct_tags() {
        let config = LotteryInstruction::InitializeConfig {
            gas_lane: [3; 32],
            subscription_id: 1,
            callback_gas_limit: 2,
        };
        let update = LotteryInstruction::UpdateOracle {
            gas_lane: [3; 32],
            subscription_id: 1,
            callback_gas_limit: 2,
        };
        assert_eq!(config.pack()[0], 0);
        assert_eq!(update.pack()[0], 1);
        assert_eq!(LotteryInstruction::unpack(&update.pack()), Ok(update));
    }

    #[test]
    fn empty_and_unknown_tags_are_rejected() {
        assert_eq!(
            LotteryInstruction::unpack(&[]),
            Err(LotteryError::InvalidInstruction.into())
        );
        assert_eq!(
            LotteryInstruction::unpack(&[42]),
            Err(LotteryError::InvalidInstruction.into())
        );
    }
}
