use solana_program::{account_info::AccountInfo, msg, program_error::ProgramError, pubkey::Pubkey};

use crate::error::LotteryError;

/// Moves the prize out of the vault. Failures are returned, never swallowed.
pub trait PayoutLedger {
    fn transfer(&mut self, to: &Pubkey, amount: u64) -> Result<(), ProgramError>;
}

/// Pays out of a program-owned vault account by moving lamports directly,
/// keeping `reserve` lamports behind so the vault stays rent exempt.
pub struct VaultLedger<'a, 'info> {
    vault: &'a AccountInfo<'info>,
    recipient: &'a AccountInfo<'info>,
    reserve: u64,
}

impl<'a, 'info> VaultLedger<'a, 'info> {
    pub fn new(vault: &'a AccountInfo<'info>, recipient: &'a AccountInfo<'info>, reserve: u64) -> Self {
        Self {
            vault,
            recipient,
            reserve,
        }
    }
}

impl<'a, 'info> PayoutLedger for VaultLedger<'a, 'info> {
    fn transfer(&mut self, to: &Pubkey, amount: u64) -> Result<(), ProgramError> {
        if self.recipient.key != to {
            msg!("Recipient account {} is not the winner {}", self.recipient.key, to);
            return Err(ProgramError::InvalidArgument);
        }
        if !self.recipient.is_writable {
            msg!("Winner account must be writable");
            return Err(ProgramError::InvalidArgument);
        }
        if self.recipient.key == self.vault.key {
            return Err(ProgramError::InvalidArgument);
        }

        let available = self.vault.lamports().saturating_sub(self.reserve);
        if available < amount {
            msg!(
                "Vault holds {} spendable lamports, prize is {}",
                available,
                amount
            );
            return Err(ProgramError::InsufficientFunds);
        }

        let vault_after = self
            .vault
            .lamports()
            .checked_sub(amount)
            .ok_or(LotteryError::Overflow)?;
        let recipient_after = self
            .recipient
            .lamports()
            .checked_add(amount)
            .ok_or(LotteryError::Overflow)?;

        **self.vault.try_borrow_mut_lamports()? = vault_after;
        **self.recipient.try_borrow_mut_lamports()? = recipient_after;
        Ok(())
    }
}
