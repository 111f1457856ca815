use solana_program::clock::UnixTimestamp;

use crate::state::Raffle;

/// Breakdown of the upkeep gates. Winner selection may start only when all
/// four hold at once.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Eligibility {
    pub time_passed: bool,
    pub is_open: bool,
    pub has_balance: bool,
    pub has_players: bool,
}

impl Eligibility {
    pub fn upkeep_needed(&self) -> bool {
        self.time_passed && self.is_open && self.has_balance && self.has_players
    }
}

pub fn evaluate(raffle: &Raffle, now: UnixTimestamp) -> Eligibility {
    let elapsed = now.saturating_sub(raffle.last_timestamp);
    Eligibility {
        time_passed: elapsed >= 0 && elapsed as u64 >= raffle.interval,
        is_open: raffle.is_open(),
        has_balance: raffle.collected_balance > 0,
        has_players: !raffle.players.is_empty(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::RaffleState;
    use solana_program::pubkey::Pubkey;

    const START: UnixTimestamp = 1_000;

    fn raffle() -> Raffle {
        Raffle {
            is_initialized: true,
            raffle_index: 0,
            bump: 255,
            entrance_fee: 5,
            interval: 60,
            last_timestamp: START,
            state: RaffleState::Open,
            collected_balance: 0,
            recent_winner: None,
            pending_request: None,
            request_nonce: 0,
            coordinator: Pubkey::new_unique(),
            gas_lane: [0; 32],
            subscription_id: 1,
            callback_gas_limit: 500_000,
            max_players: 8,
            players: vec![],
        }
    }

    fn with_entry(mut raffle: Raffle) -> Raffle {
        raffle.players.push(Pubkey::new_unique());
        raffle.collected_balance += raffle.entrance_fee;
        raffle
    }

    #[test]
    fn not_eligible_right_after_construction() {
        let raffle = with_entry(raffle());
        assert!(!evaluate(&raffle, START).upkeep_needed());
        assert!(!evaluate(&raffle, START + 59).upkeep_needed());
    }

    #[test]
    fn eligible_once_interval_elapsed_with_an_entrant() {
        let raffle = with_entry(raffle());
        assert!(evaluate(&raffle, START + 60).upkeep_needed());
        assert!(evaluate(&raffle, START + 61).upkeep_needed());
    }

    #[test]
    fn empty_raffle_never_eligible() {
        let raffle = raffle();
        for elapsed in [0, 60, 3_600, 86_400 * 365] {
            let eligibility = evaluate(&raffle, START + elapsed);
            assert!(!eligibility.has_players);
            assert!(!eligibility.upkeep_needed());
        }
    }

    #[test]
    fn each_gate_is_necessary() {
        let now = START + 120;

        let mut calculating = with_entry(raffle());
        calculating.state = RaffleState::Calculating;
        assert!(!evaluate(&calculating, now).upkeep_needed());

        let mut no_balance = with_entry(raffle());
        no_balance.collected_balance = 0;
        assert!(!evaluate(&no_balance, now).upkeep_needed());

        let mut no_players = with_entry(raffle());
        no_players.players.clear();
        assert!(!evaluate(&no_players, now).upkeep_needed());

        assert!(!evaluate(&with_entry(raffle()), START + 1).upkeep_needed());
    }

    #[test]
    fn clock_behind_round_start_is_not_elapsed() {
        let raffle = with_entry(raffle());
        assert!(!evaluate(&raffle, START - 500).time_passed);
    }
}
