// Lottery Program - Utility Functions
use solana_program::{program_error::ProgramError, pubkey::Pubkey};

pub const CONFIG_SEED: &[u8] = b"config";
pub const RAFFLE_SEED: &[u8] = b"raffle";

/// Find the program derived address for the config account
pub fn find_config_address(program_id: &Pubkey) -> (Pubkey, u8) {
    Pubkey::find_program_address(&[CONFIG_SEED], program_id)
}

/// Find a program derived address for a raffle
pub fn find_raffle_address(program_id: &Pubkey, raffle_index: u64) -> (Pubkey, u8) {
    let raffle_index_bytes = raffle_index.to_le_bytes();
    Pubkey::find_program_address(&[RAFFLE_SEED, &raffle_index_bytes], program_id)
}

/// Rebuild a raffle address from its stored bump
pub fn raffle_address(program_id: &Pubkey, raffle_index: u64, bump: u8) -> Result<Pubkey, ProgramError> {
    let raffle_index_bytes = raffle_index.to_le_bytes();
    Pubkey::create_program_address(&[RAFFLE_SEED, &raffle_index_bytes, &[bump]], program_id)
        .map_err(|_| ProgramError::InvalidSeeds)
}

/// Convert lamports to SOL (for display purposes)
pub fn lamports_to_sol(lamports: u64) -> f64 {
    lamports as f64 / 1_000_000_000.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stored_bump_rebuilds_raffle_address() {
        let program_id = Pubkey::new_unique();
        let (address, bump) = find_raffle_address(&program_id, 3);
        assert_eq!(raffle_address(&program_id, 3, bump), Ok(address));
        assert_ne!(find_raffle_address(&program_id, 4).0, address);
    }
}
