//! Тесты менеджера столов: параллельный прогон до победителя.

use holdem_evo_engine::domain::chips::Chips;
use holdem_evo_engine::domain::table::{ConfigError, Table, TableConfig};
use holdem_evo_engine::engine::decision::{CallingStation, DecisionMaker, EquityThreshold, ScriptedStrategy};
use holdem_evo_engine::engine::actions::Decision;
use holdem_evo_engine::engine::errors::EngineError;
use holdem_evo_engine::engine::table_manager::TableManager;

fn make_table(manager: &TableManager, players: usize, config: TableConfig) -> Table {
    let id = manager.ids().next_table_id();
    let mut table = Table::new(id, format!("stress {id}"), config).unwrap();
    for _ in 0..players {
        let pid = manager.ids().next_player_id();
        table.seat_player(pid, format!("bot-{pid}")).unwrap();
    }
    table
}

fn stations(n: usize) -> Vec<Box<dyn DecisionMaker>> {
    (0..n).map(|_| Box::new(CallingStation) as Box<dyn DecisionMaker>).collect()
}

#[test]
fn many_tables_conserve_chips() {
    let config = TableConfig {
        max_hands: 40,
        ..TableConfig::default()
    };
    let mut manager = TableManager::new();
    for seed in 0..8 {
        let table = make_table(&manager, 4, config.clone());
        manager.add_table(table, stations(4), seed).unwrap();
    }

    let outcomes = manager.run_all();

    assert_eq!(outcomes.len(), 8);
    for outcome in &outcomes {
        assert!(outcome.error.is_none(), "Ошибка на столе {}: {:?}", outcome.table_id, outcome.error);
        assert!(outcome.hands_played > 0 && outcome.hands_played <= 40);
        assert_eq!(outcome.total_chips(), Chips(20_000));
        assert_eq!(outcome.starting_chips(), Chips(20_000));
    }
}

/// Один игрок всегда идёт олл-ин, другой всегда коллирует:
/// первая же раздача решает стол (или делит банк).
#[test]
fn table_runs_until_single_funded_player() {
    let config = TableConfig {
        max_hands: 200,
        ..TableConfig::default()
    };
    let mut manager = TableManager::new();
    let table = make_table(&manager, 2, config);
    let strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(ScriptedStrategy::new([]).with_fallback(Decision::AllIn)),
        Box::new(ScriptedStrategy::new([]).with_fallback(Decision::AllIn)),
    ];
    manager.add_table(table, strategies, 11).unwrap();

    let outcome = manager.run_all().remove(0);

    assert!(outcome.error.is_none());
    assert_eq!(outcome.total_chips(), Chips(10_000));
    if let Some(winner) = outcome.winner() {
        assert_eq!(winner.stack, Chips(10_000));
        assert!(outcome.hands_played < 200);
    } else {
        // Только бесконечные делёжки доводят до лимита.
        assert_eq!(outcome.hands_played, 200);
    }
}

#[test]
fn same_seed_gives_same_outcome() {
    let config = TableConfig {
        max_hands: 25,
        equity_samples: 20,
        ..TableConfig::default()
    };
    let mut manager = TableManager::new();
    for _ in 0..2 {
        let table = make_table(&manager, 3, config.clone());
        let strategies: Vec<Box<dyn DecisionMaker>> = vec![
            Box::new(EquityThreshold::default()),
            Box::new(CallingStation),
            Box::new(EquityThreshold::default()),
        ];
        manager.add_table(table, strategies, 777).unwrap();
    }

    let outcomes = manager.run_all();

    let stacks = |i: usize| -> Vec<Chips> { outcomes[i].players.iter().map(|p| p.stack).collect() };
    assert_eq!(stacks(0), stacks(1));
    assert_eq!(outcomes[0].hands_played, outcomes[1].hands_played);
}

#[test]
fn add_table_checks_strategy_count() {
    let mut manager = TableManager::new();
    let table = make_table(&manager, 3, TableConfig::default());

    let err = manager.add_table(table, stations(2), 1).unwrap_err();

    assert_eq!(
        err,
        EngineError::StrategyCountMismatch {
            players: 3,
            strategies: 2
        }
    );
    assert!(manager.is_empty());
}

#[test]
fn add_table_rejects_empty_table() {
    let mut manager = TableManager::new();
    let table = make_table(&manager, 0, TableConfig::default());

    let err = manager.add_table(table, stations(0), 1).unwrap_err();

    assert_eq!(err, EngineError::Config(ConfigError::NoPlayers));
    assert!(manager.is_empty());
}

#[test]
fn reports_carry_player_statistics() {
    let config = TableConfig {
        max_hands: 10,
        ..TableConfig::default()
    };
    let mut manager = TableManager::new();
    let table = make_table(&manager, 3, config);
    let table_id = manager.add_table(table, stations(3), 5).unwrap();

    let outcome = manager.run_all().remove(0);

    assert_eq!(outcome.table_id, table_id);
    assert_eq!(manager.table(table_id).map(|t| t.hands_played), Some(outcome.hands_played));
    for report in &outcome.players {
        assert_eq!(report.starting_value, Chips(5000));
        assert!(report.rounds_survived as u64 <= outcome.hands_played);
        assert!(report.counters.total() > 0, "Колл-станция должна была действовать");
    }
}

#[test]
fn cancelled_manager_stops_with_error() {
    let mut manager = TableManager::new();
    let table = make_table(&manager, 2, TableConfig::default());
    manager.add_table(table, stations(2), 3).unwrap();
    manager.cancel_token().cancel();

    let outcome = manager.run_all().remove(0);

    assert_eq!(outcome.hands_played, 0);
    assert!(outcome.error.is_some());
    assert_eq!(outcome.total_chips(), Chips(10_000));
}
