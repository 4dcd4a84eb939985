use minesweeper_kb::*;
use proptest::prelude::*;
use rand::SeedableRng;
use rand::rngs::StdRng;

/// Plays a whole game by hand, calling `check` with the knowledge base
/// before and after every observation and with the saturation report.
fn play_observing(
    config: GameConfig,
    seed: u64,
    mut check: impl FnMut(&KnowledgeBase, &KnowledgeBase, Saturation),
) {
    let mut rng = StdRng::seed_from_u64(seed);
    let board = Board::new(&config, &mut rng).unwrap();
    let mut kb = KnowledgeBase::new();

    loop {
        let next = kb
            .safe_unplayed_cell()
            .or_else(|| kb.unconstrained_cell(board.cells(), &mut rng));
        let Some(cell) = next else { break };
        if board.is_mine(cell) {
            assert!(!kb.is_safe(&cell), "{cell} was proven safe but is a mine");
            break;
        }

        let before = kb.clone();
        let report = kb
            .observe(cell, board.nearby_mines(cell), board.neighbors(cell))
            .unwrap();
        check(&before, &kb, report);

        if kb.won(board.total_mines()) {
            assert!(board.won(kb.dangerous()));
            break;
        }
    }
}

fn config_strategy() -> impl Strategy<Value = GameConfig> {
    (2usize..10, 2usize..10)
        .prop_flat_map(|(w, h)| (Just(w), Just(h), 1usize..(w * h / 3).max(2)))
        .prop_map(|(width, height, mines)| GameConfig {
            width,
            height,
            mines,
        })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn proptest_counts_stay_within_bounds(config in config_strategy(), seed in any::<u64>()) {
        play_observing(config, seed, |_, kb, _| {
            for constraint in kb.constraints() {
                assert!(constraint.count() <= constraint.cells().len(), "{constraint}");
            }
            kb.check_invariants().unwrap();
        });
    }

    #[test]
    fn proptest_knowledge_only_grows(config in config_strategy(), seed in any::<u64>()) {
        play_observing(config, seed, |before, after, _| {
            assert!(before.dangerous().is_subset(after.dangerous()));
            assert!(before.safe().is_subset(after.safe()));
            assert!(before.played().is_subset(after.played()));
            assert!(after.safe().is_disjoint(after.dangerous()));
            assert!(before.constraints().len() <= after.constraints().len());
        });
    }

    #[test]
    fn proptest_saturation_terminates_with_progress(config in config_strategy(), seed in any::<u64>()) {
        let cells = config.cell_count();
        play_observing(config, seed, |before, after, report| {
            // Every pass but the last one marks or derives something.
            assert!(report.passes <= report.marked + report.derived + 1);
            assert!(report.marked <= cells);
            // The observation itself adds at most one constraint.
            assert!(after.constraints().len() - before.constraints().len() <= report.derived + 1);
        });
    }

    #[test]
    fn proptest_repeated_observation_changes_nothing(config in config_strategy(), seed in any::<u64>()) {
        let mut rng = StdRng::seed_from_u64(seed);
        let board = Board::new(&config, &mut rng).unwrap();
        let mut kb = KnowledgeBase::new();
        let Some(cell) = board.cells().find(|&p| !board.is_mine(p)) else {
            return Ok(());
        };

        kb.observe(cell, board.nearby_mines(cell), board.neighbors(cell)).unwrap();
        let before = kb.clone();
        let report = kb
            .observe(cell, board.nearby_mines(cell), board.neighbors(cell))
            .unwrap();
        prop_assert!(!report.changed());
        prop_assert_eq!(kb, before);
    }
}
