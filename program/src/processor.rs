use solana_program::{
    account_info::{next_account_info, AccountInfo},
    entrypoint::ProgramResult,
    msg,
    program::{invoke, invoke_signed, set_return_data},
    program_error::ProgramError,
    program_pack::Pack,
    pubkey::Pubkey,
    system_instruction, system_program,
    sysvar::{clock::Clock, rent::Rent, Sysvar},
};

use crate::{
    eligibility,
    error::LotteryError,
    instruction::LotteryInstruction,
    ledger::VaultLedger,
    machine,
    state::{Config, Raffle, RaffleState, MAX_PLAYERS},
    utils::{self, CONFIG_SEED, RAFFLE_SEED},
    vrf::{self, CoordinatorClient},
};

pub struct Processor;

impl Processor {
    pub fn process(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        instruction_data: &[u8],
    ) -> ProgramResult {
        let instruction = LotteryInstruction::unpack(instruction_data)?;

        match instruction {
            LotteryInstruction::InitializeConfig {
                gas_lane,
                subscription_id,
                callback_gas_limit,
            } => {
                msg!("Instruction: Initialize Config");
                Self::process_initialize_config(
                    program_id,
                    accounts,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                )
            }
            LotteryInstruction::UpdateOracle {
                gas_lane,
                subscription_id,
                callback_gas_limit,
            } => {
                msg!("Instruction: Update Oracle");
                Self::process_update_oracle(
                    program_id,
                    accounts,
                    gas_lane,
                    subscription_id,
                    callback_gas_limit,
                )
            }
            LotteryInstruction::InitializeRaffle {
                entrance_fee,
                interval,
                max_players,
            } => {
                msg!("Instruction: Initialize Raffle");
                Self::process_initialize_raffle(
                    program_id,
                    accounts,
                    entrance_fee,
                    interval,
                    max_players,
                )
            }
            LotteryInstruction::EnterRaffle { amount } => {
                msg!("Instruction: Enter Raffle");
                Self::process_enter_raffle(program_id, accounts, amount)
            }
            LotteryInstruction::CheckUpkeep => {
                msg!("Instruction: Check Upkeep");
                Self::process_check_upkeep(program_id, accounts)
            }
            LotteryInstruction::PerformUpkeep => {
                msg!("Instruction: Perform Upkeep");
                Self::process_perform_upkeep(program_id, accounts)
            }
            LotteryInstruction::FulfillRandomWords {
                request_id,
                random_words,
            } => {
                msg!("Instruction: Fulfill Random Words");
                Self::process_fulfill_random_words(program_id, accounts, request_id, &random_words)
            }
        }
    }

    fn process_initialize_config(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !admin_info.is_signer {
            msg!("Admin must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if callback_gas_limit == 0 {
            msg!("Callback gas limit must be positive");
            return Err(LotteryError::InvalidConfig.into());
        }

        let (expected_config, bump_seed) = utils::find_config_address(program_id);
        if *config_info.key != expected_config {
            msg!("Invalid config account address");
            return Err(ProgramError::InvalidArgument);
        }

        if config_info.owner == program_id {
            msg!("Config account is already initialized");
            return Err(LotteryError::AlreadyInitialized.into());
        }

        let rent = Rent::get()?;
        invoke_signed(
            &system_instruction::create_account(
                admin_info.key,
                config_info.key,
                rent.minimum_balance(Config::LEN),
                Config::LEN as u64,
                program_id,
            ),
            &[
                admin_info.clone(),
                config_info.clone(),
                system_program_info.clone(),
            ],
            &[&[CONFIG_SEED, &[bump_seed]]],
        )?;

        let config = Config {
            is_initialized: true,
            admin: *admin_info.key,
            coordinator: *coordinator_info.key,
            gas_lane,
            subscription_id,
            callback_gas_limit,
            next_raffle_index: 0,
        };
        Config::pack(config, &mut config_info.data.borrow_mut())?;

        msg!(
            "Config initialized: Admin={}, Coordinator={}, Subscription={}",
            admin_info.key,
            coordinator_info.key,
            subscription_id
        );
        Ok(())
    }

    fn process_update_oracle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        gas_lane: [u8; 32],
        subscription_id: u64,
        callback_gas_limit: u32,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let admin_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let coordinator_info = next_account_info(account_info_iter)?;

        if !admin_info.is_signer {
            msg!("Admin must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if config_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }
        if callback_gas_limit == 0 {
            msg!("Callback gas limit must be positive");
            return Err(LotteryError::InvalidConfig.into());
        }

        let mut config = Config::unpack(&config_info.data.borrow())?;
        if config.admin != *admin_info.key {
            msg!("Only the admin can update oracle settings");
            return Err(LotteryError::NotAdmin.into());
        }

        config.coordinator = *coordinator_info.key;
        config.gas_lane = gas_lane;
        config.subscription_id = subscription_id;
        config.callback_gas_limit = callback_gas_limit;
        Config::pack(config, &mut config_info.data.borrow_mut())?;

        msg!("Oracle updated: Coordinator={}", coordinator_info.key);
        Ok(())
    }

    fn process_initialize_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        entrance_fee: u64,
        interval: u64,
        max_players: u32,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let creator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let config_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !creator_info.is_signer {
            msg!("Creator must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }
        if entrance_fee == 0 || interval == 0 || max_players == 0 || max_players > MAX_PLAYERS {
            msg!(
                "Invalid raffle parameters: fee={} interval={} max_players={} (limit {})",
                entrance_fee,
                interval,
                max_players,
                MAX_PLAYERS
            );
            return Err(LotteryError::InvalidConfig.into());
        }
        if config_info.owner != program_id {
            return Err(ProgramError::IncorrectProgramId);
        }
        if *system_program_info.key != system_program::id() {
            return Err(ProgramError::IncorrectProgramId);
        }

        let mut config = Config::unpack(&config_info.data.borrow())?;
        let raffle_index = config.next_raffle_index;
        let (expected_raffle, bump) = utils::find_raffle_address(program_id, raffle_index);
        if *raffle_info.key != expected_raffle {
            msg!(
                "Raffle account {} is not the PDA for index {}",
                raffle_info.key,
                raffle_index
            );
            return Err(LotteryError::InvalidRaffleAccount.into());
        }

        let space = Raffle::space(max_players);
        let rent = Rent::get()?;
        invoke_signed(
            &system_instruction::create_account(
                creator_info.key,
                raffle_info.key,
                rent.minimum_balance(space),
                space as u64,
                program_id,
            ),
            &[
                creator_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
            &[&[RAFFLE_SEED, &raffle_index.to_le_bytes(), &[bump]]],
        )?;

        let now = Clock::get()?.unix_timestamp;
        let raffle = Raffle {
            is_initialized: true,
            raffle_index,
            bump,
            entrance_fee,
            interval,
            last_timestamp: now,
            state: RaffleState::Open,
            collected_balance: 0,
            recent_winner: None,
            pending_request: None,
            request_nonce: 0,
            coordinator: config.coordinator,
            gas_lane: config.gas_lane,
            subscription_id: config.subscription_id,
            callback_gas_limit: config.callback_gas_limit,
            max_players,
            players: Vec::new(),
        };
        raffle.store(&mut raffle_info.data.borrow_mut())?;

        config.next_raffle_index = raffle_index
            .checked_add(1)
            .ok_or(LotteryError::Overflow)?;
        Config::pack(config, &mut config_info.data.borrow_mut())?;

        msg!(
            "Raffle {} initialized: Fee={} SOL, Interval={}s, Capacity={}",
            raffle_index,
            utils::lamports_to_sol(entrance_fee),
            interval,
            max_players
        );
        Ok(())
    }

    fn process_enter_raffle(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        amount: u64,
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let player_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let system_program_info = next_account_info(account_info_iter)?;

        if !player_info.is_signer {
            msg!("Player must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;
        let event = machine::admit_entry(&mut raffle, *player_info.key, amount)?;

        invoke(
            &system_instruction::transfer(player_info.key, raffle_info.key, amount),
            &[
                player_info.clone(),
                raffle_info.clone(),
                system_program_info.clone(),
            ],
        )?;

        raffle.store(&mut raffle_info.data.borrow_mut())?;
        event.emit();
        Ok(())
    }

    fn process_check_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let raffle_info = next_account_info(account_info_iter)?;

        let raffle = Self::load_raffle(program_id, raffle_info)?;
        let now = Clock::get()?.unix_timestamp;
        let eligibility = eligibility::evaluate(&raffle, now);
        let upkeep_needed = eligibility.upkeep_needed();

        msg!("Upkeep needed: {} ({:?})", upkeep_needed, eligibility);
        set_return_data(&[upkeep_needed as u8]);
        Ok(())
    }

    fn process_perform_upkeep(program_id: &Pubkey, accounts: &[AccountInfo]) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let keeper_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;

        if !keeper_info.is_signer {
            msg!("Keeper must sign the transaction");
            return Err(ProgramError::MissingRequiredSignature);
        }

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;
        let now = Clock::get()?.unix_timestamp;
        let mut oracle = CoordinatorClient;
        let event = machine::trigger_selection(&mut raffle, raffle_info.key, now, &mut oracle)?;

        raffle.store(&mut raffle_info.data.borrow_mut())?;
        event.emit();
        Ok(())
    }

    fn process_fulfill_random_words(
        program_id: &Pubkey,
        accounts: &[AccountInfo],
        request_id: u64,
        random_words: &[u64],
    ) -> ProgramResult {
        let account_info_iter = &mut accounts.iter();
        let coordinator_info = next_account_info(account_info_iter)?;
        let raffle_info = next_account_info(account_info_iter)?;
        let winner_info = next_account_info(account_info_iter)?;

        let mut raffle = Self::load_raffle(program_id, raffle_info)?;
        vrf::verify_coordinator(coordinator_info, &raffle.coordinator)?;

        let now = Clock::get()?.unix_timestamp;
        let reserve = Rent::get()?.minimum_balance(raffle_info.data_len());
        let mut ledger = VaultLedger::new(raffle_info, winner_info, reserve);
        let event = machine::on_randomness_fulfilled(
            &mut raffle,
            request_id,
            random_words,
            now,
            &mut ledger,
        )?;

        raffle.store(&mut raffle_info.data.borrow_mut())?;
        event.emit();
        Ok(())
    }

    /// Load a raffle, checking ownership and that the account is the PDA the
    /// stored index and bump describe.
    fn load_raffle(program_id: &Pubkey, raffle_info: &AccountInfo) -> Result<Raffle, ProgramError> {
        if raffle_info.owner != program_id {
            msg!("Raffle account must be owned by the program");
            return Err(ProgramError::IncorrectProgramId);
        }
        let raffle = Raffle::load(&raffle_info.data.borrow())?;
        if utils::raffle_address(program_id, raffle.raffle_index, raffle.bump)? != *raffle_info.key {
            msg!("Raffle account does not match its stored seeds");
            return Err(LotteryError::InvalidRaffleAccount.into());
        }
        Ok(raffle)
    }
}
