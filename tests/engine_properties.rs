//! Property tests for the turn engine: sessions terminate with a complete
//! ranking for every supported table size, regardless of shuffle or variant,
//! and seeded runs replay identically. Card conservation is enforced inside
//! the engine after every deal and every move, so any drift fails these runs.

use cardtable_rs::engine::Phase;
use cardtable_rs::session::{GameSession, SessionConfig};
use cardtable_rs::strategy::Difficulty;
use proptest::prelude::*;

fn complete_ranking(ranking: &[usize], players: usize) {
    assert_eq!(ranking.len(), players);
    let mut seats = ranking.to_vec();
    seats.sort_unstable();
    assert_eq!(seats, (0..players).collect::<Vec<_>>(), "every seat ranked exactly once");
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    #[test]
    fn shedding_terminates_with_full_ranking(
        players in 3usize..=6,
        seed in any::<u64>(),
    ) {
        let mut s = GameSession::create(
            SessionConfig::shedding(players).with_seed(seed),
        ).unwrap();
        let ranking = s.run_to_completion().unwrap();
        complete_ranking(&ranking, players);
        prop_assert_eq!(s.phase(), Phase::Finished);
    }

    #[test]
    fn elimination_terminates_with_full_ranking(
        players in 3usize..=6,
        seed in any::<u64>(),
    ) {
        let mut s = GameSession::create(
            SessionConfig::elimination(players).with_seed(seed),
        ).unwrap();
        let ranking = s.run_to_completion().unwrap();
        complete_ranking(&ranking, players);
    }

    #[test]
    fn high_difficulty_sessions_also_terminate(
        players in 3usize..=6,
        seed in any::<u64>(),
    ) {
        let mut s = GameSession::create(
            SessionConfig::shedding(players)
                .with_difficulty(Difficulty::High)
                .with_seed(seed),
        ).unwrap();
        let ranking = s.run_to_completion().unwrap();
        complete_ranking(&ranking, players);
    }

    #[test]
    fn seeded_replays_agree(seed in any::<u64>()) {
        let run = |variant_seed: u64| {
            let mut s = GameSession::create(
                SessionConfig::elimination(4).with_seed(variant_seed),
            ).unwrap();
            s.run_to_completion().unwrap()
        };
        prop_assert_eq!(run(seed), run(seed));
    }
}
