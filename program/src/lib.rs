// Lottery Program
// An interval-driven raffle: entrants pay a fixed fee, and once the interval
// has passed a coordinator-supplied random word picks the winner of the pot.

pub mod eligibility;
pub mod entrypoint;
pub mod error;
pub mod events;
pub mod instruction;
pub mod ledger;
pub mod machine;
pub mod processor;
pub mod state;
pub mod utils;
pub mod vrf;

use solana_program::{account_info::AccountInfo, entrypoint::ProgramResult, pubkey::Pubkey};

/// Instruction handler shared by the on-chain entrypoint and `solana-program-test`
pub fn process_instruction(
    program_id: &Pubkey,
    accounts: &[AccountInfo],
    instruction_data: &[u8],
) -> ProgramResult {
    if let Err(err) = processor::Processor::process(program_id, accounts, instruction_data) {
        error::report(&err);
        return Err(err);
    }
    Ok(())
}
