//! Raffle round state machine.
//!
//! Every transition runs against an in-memory [`Raffle`] and only mutates it
//! once all preconditions and outbound calls have succeeded, so a returned
//! error always leaves the raffle untouched. The processor persists the
//! raffle afterwards; the runtime's write lock on the raffle account keeps
//! transitions serialized.

use solana_program::{clock::UnixTimestamp, msg, program_error::ProgramError, pubkey::Pubkey};

use crate::{
    eligibility,
    error::LotteryError,
    events::RaffleEvent,
    ledger::PayoutLedger,
    state::{Raffle, RaffleState},
    vrf::{self, RandomnessOracle, RandomnessRequest},
};

/// Record an entry. Any payment at or above the entrance fee is accepted and
/// counted in full towards the prize.
pub fn admit_entry(
    raffle: &mut Raffle,
    participant: Pubkey,
    paid_amount: u64,
) -> Result<RaffleEvent, ProgramError> {
    if paid_amount < raffle.entrance_fee {
        msg!(
            "Paid {} lamports, entrance fee is {}",
            paid_amount,
            raffle.entrance_fee
        );
        return Err(LotteryError::InsufficientPayment.into());
    }
    if !raffle.is_open() {
        msg!("Raffle is calculating a winner, entries are closed");
        return Err(LotteryError::RaffleNotOpen.into());
    }
    if raffle.is_full() {
        msg!("Raffle already holds {} entries", raffle.max_players);
        return Err(LotteryError::RaffleFull.into());
    }

    let collected_balance = raffle
        .collected_balance
        .checked_add(paid_amount)
        .ok_or(LotteryError::Overflow)?;

    raffle.players.push(participant);
    raffle.collected_balance = collected_balance;

    Ok(RaffleEvent::EntryAdmitted {
        participant,
        amount: paid_amount,
    })
}

/// Close entries and ask the oracle for randomness. Eligibility is evaluated
/// here, in the same step as the transition.
pub fn trigger_selection<O: RandomnessOracle>(
    raffle: &mut Raffle,
    raffle_key: &Pubkey,
    now: UnixTimestamp,
    oracle: &mut O,
) -> Result<RaffleEvent, ProgramError> {
    let eligibility = eligibility::evaluate(raffle, now);
    if !eligibility.upkeep_needed() {
        msg!(
            "Upkeep not needed: balance={} players={} state={:?} time_passed={}",
            raffle.collected_balance,
            raffle.num_players(),
            raffle.state,
            eligibility.time_passed
        );
        return Err(LotteryError::UpkeepNotNeeded.into());
    }

    let request = RandomnessRequest::for_raffle(raffle_key, raffle)?;
    let request_id = oracle.request_random_words(&request)?;

    raffle.state = RaffleState::Calculating;
    raffle.request_nonce = request.sequence;
    raffle.pending_request = Some(request_id);

    Ok(RaffleEvent::SelectionRequested { request_id })
}

/// Apply a fulfillment: pick the winner, pay the whole balance, and open the
/// next round. Payout happens before any state changes; if it fails the
/// pending request stays valid for redelivery.
pub fn on_randomness_fulfilled<L: PayoutLedger>(
    raffle: &mut Raffle,
    request_id: u64,
    random_words: &[u64],
    now: UnixTimestamp,
    ledger: &mut L,
) -> Result<RaffleEvent, ProgramError> {
    if raffle.pending_request != Some(request_id) || raffle.state != RaffleState::Calculating {
        msg!(
            "Request {} does not match pending request {:?}",
            request_id,
            raffle.pending_request
        );
        return Err(LotteryError::UnknownRequest.into());
    }

    let random_word = *random_words
        .first()
        .ok_or(LotteryError::InvalidInstruction)?;
    if raffle.players.is_empty() {
        msg!("Calculating round has no participants");
        return Err(ProgramError::InvalidAccountData);
    }

    let index = vrf::winner_index(random_word, raffle.players.len());
    let winner = raffle.players[index];
    let prize = raffle.collected_balance;
    msg!("Winner index {} of {}, prize {}", index, raffle.players.len(), prize);

    ledger.transfer(&winner, prize).map_err(|err| {
        msg!("Payout of {} to {} failed: {}", prize, winner, err);
        LotteryError::PayoutFailed
    })?;

    raffle.recent_winner = Some(winner);
    raffle.state = RaffleState::Open;
    raffle.players.clear();
    raffle.last_timestamp = now;
    raffle.pending_request = None;
    raffle.collected_balance = 0;

    Ok(RaffleEvent::WinnerPicked { winner })
}
