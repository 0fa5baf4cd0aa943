//! Интеграционные тесты: целые раздачи через `play_hand`.
//!
//! Здесь проверяем:
//! - фолд на префлопе отдаёт блайнды без вскрытия;
//! - колл-станции доходят до шоудауна, фишки сохраняются;
//! - рейз заново открывает торговлю для блайндов;
//! - олл-ин хедз-ап докручивает борд;
//! - таймаут решения засчитывается как фолд;
//! - отмена раздачи восстанавливает стеки;
//! - сигналы, которые видит стратегия.

use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use holdem_evo_engine::domain::chips::Chips;
use holdem_evo_engine::domain::hand::Street;
use holdem_evo_engine::domain::table::{ConfigError, Table, TableConfig};
use holdem_evo_engine::engine::actions::{ActionCounters, Decision, FoldReason, ResolvedAction};
use holdem_evo_engine::engine::decision::{CallingStation, DecisionContext, DecisionMaker, ScriptedStrategy};
use holdem_evo_engine::engine::errors::EngineError;
use holdem_evo_engine::engine::game_loop::{play_hand, CancelToken, HandOutcome};
use holdem_evo_engine::engine::hand_history::{HandEventKind, HandHistory, NullObserver};
use holdem_evo_engine::infra::rng::DeterministicRng;

/// Утилита: стол с `n` игроками по 5000 (id 1..=n).
fn make_table(n: u64, config: TableConfig) -> Table {
    let mut table = Table::new(1, "integration", config).unwrap();
    for id in 1..=n {
        table.seat_player(id, format!("p{id}")).unwrap();
    }
    table
}

fn calling_stations(n: usize) -> Vec<Box<dyn DecisionMaker>> {
    (0..n).map(|_| Box::new(CallingStation) as Box<dyn DecisionMaker>).collect()
}

fn play(
    table: &mut Table,
    strategies: &mut [Box<dyn DecisionMaker>],
    seed: u64,
) -> Result<HandOutcome, EngineError> {
    let mut rng = DeterministicRng::from_seed(seed);
    play_hand(table, strategies, &mut rng, 1, &mut NullObserver, &CancelToken::new())
}

fn resolved_actions(outcome: &HandOutcome, seat: u8) -> Vec<ResolvedAction> {
    outcome
        .history
        .events
        .iter()
        .filter_map(|e| match &e.kind {
            HandEventKind::ActionTaken { seat: s, resolved, .. } if *s == seat => Some(*resolved),
            _ => None,
        })
        .collect()
}

// ===== UNCONTESTED =====

/// Хедз-ап: дилер на месте 0, малый блайнд место 1, большой место 0.
/// Малый блайнд сбрасывает, большой забирает 150.
#[test]
fn fold_preflop_awards_blinds_without_showdown() {
    let mut table = make_table(2, TableConfig::default());
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(ScriptedStrategy::new([Decision::Fold])),
    ];

    let outcome = play(&mut table, &mut strategies, 1).unwrap();

    assert!(outcome.summary.uncontested);
    assert_eq!(outcome.summary.street_reached, Street::Preflop);
    assert_eq!(outcome.summary.total_pot, Chips(150));
    assert_eq!(table.seats[0].stack_value(), Chips(5050));
    assert_eq!(table.seats[1].stack_value(), Chips(4950));
    assert_eq!(table.seats[1].counters.folds, 1);
    assert_eq!(table.dealer_button, Some(0));
    assert_eq!(table.hands_played, 1);
    assert!(table.seats.iter().all(|p| p.rounds_survived == 1));

    let net: i64 = outcome.summary.results.iter().map(|r| r.net()).sum();
    assert_eq!(net, 0);
    assert_eq!(outcome.history.paid_to(1), Chips(150));
    assert_eq!(outcome.history.actions().count(), 1);
}

/// Check при ставке засчитывается как фолд.
#[test]
fn illegal_check_is_recorded_as_fold() {
    let mut table = make_table(2, TableConfig::default());
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(ScriptedStrategy::new([Decision::Check])),
    ];

    let outcome = play(&mut table, &mut strategies, 2).unwrap();

    assert_eq!(
        resolved_actions(&outcome, 1),
        vec![ResolvedAction::Fold(FoldReason::IllegalCheck)]
    );
    assert_eq!(table.seats[0].stack_value(), Chips(5050));
}

// ===== SHOWDOWN =====

#[test]
fn calling_stations_reach_showdown_and_conserve_chips() {
    let mut table = make_table(3, TableConfig::default());
    let mut strategies = calling_stations(3);

    let outcome = play(&mut table, &mut strategies, 3).unwrap();

    assert!(!outcome.summary.uncontested);
    assert_eq!(outcome.summary.street_reached, Street::Showdown);
    assert_eq!(outcome.summary.board.len(), 5);
    assert_eq!(outcome.summary.total_pot, Chips(300));
    assert_eq!(table.chips_in_play(), Chips(15_000));
    assert!(outcome.summary.winners().count() >= 1);

    // Большой блайнд не получает отдельного хода на префлопе.
    assert_eq!(table.seats[2].counters.calls, 0);
    assert_eq!(table.seats[2].counters.checks, 3);
    assert_eq!(table.seats[0].counters.calls, 1);

    let shown = outcome
        .history
        .events
        .iter()
        .filter(|e| matches!(e.kind, HandEventKind::ShowdownReveal { .. }))
        .count();
    assert_eq!(shown, 3);
}

/// Место 0 повышает на 200 сверх колла: добавляет 300,
/// оба блайнда снова получают ход и уравнивают.
#[test]
fn raise_reopens_action_for_blinds() {
    let mut table = make_table(3, TableConfig::default());
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(ScriptedStrategy::new([Decision::Raise(Chips(200))])),
        Box::new(CallingStation),
        Box::new(CallingStation),
    ];

    let outcome = play(&mut table, &mut strategies, 4).unwrap();

    assert_eq!(
        resolved_actions(&outcome, 0)[0],
        ResolvedAction::Raise {
            added: Chips(300),
            raise_by: Chips(200),
            bluff: false
        }
    );
    assert_eq!(resolved_actions(&outcome, 1)[0], ResolvedAction::Call { added: Chips(250) });
    assert_eq!(resolved_actions(&outcome, 2)[0], ResolvedAction::Call { added: Chips(200) });
    assert_eq!(outcome.summary.total_pot, Chips(900));
    assert_eq!(table.chips_in_play(), Chips(15_000));
    assert_eq!(table.seats[0].counters.raises, 1);
}

#[test]
fn heads_up_all_in_runs_out_the_board() {
    let mut table = make_table(2, TableConfig::default());
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(ScriptedStrategy::new([Decision::AllIn])),
    ];

    let outcome = play(&mut table, &mut strategies, 5).unwrap();

    assert_eq!(outcome.summary.street_reached, Street::Showdown);
    assert_eq!(outcome.summary.board.len(), 5);
    assert_eq!(outcome.summary.total_pot, Chips(10_000));
    assert_eq!(table.chips_in_play(), Chips(10_000));
    assert_eq!(table.seats[0].counters.all_ins, 1, "Колл на весь стек становится олл-ином");
    assert_eq!(table.seats[1].counters.all_ins, 1);

    let stacks = (table.seats[0].stack_value().0, table.seats[1].stack_value().0);
    assert!(
        matches!(stacks, (10_000, 0) | (0, 10_000) | (5_000, 5_000)),
        "Неожиданные стеки {stacks:?}"
    );
}

#[test]
fn busted_player_does_not_survive_round() {
    let mut table = make_table(2, TableConfig::default());
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(ScriptedStrategy::new([Decision::AllIn])),
    ];

    play(&mut table, &mut strategies, 6).unwrap();

    for player in &table.seats {
        let expected = u32::from(player.is_funded());
        assert_eq!(player.rounds_survived, expected, "Игрок {}", player.id);
    }
}

// ===== TIMEOUT =====

struct SlowStrategy;

impl DecisionMaker for SlowStrategy {
    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Decision {
        thread::sleep(Duration::from_millis(30));
        Decision::Call
    }
}

#[test]
fn slow_decision_is_folded_as_timeout() {
    let config = TableConfig {
        decision_timeout_ms: Some(5),
        ..TableConfig::default()
    };
    let mut table = make_table(2, config);
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![Box::new(CallingStation), Box::new(SlowStrategy)];

    let outcome = play(&mut table, &mut strategies, 7).unwrap();

    assert_eq!(
        resolved_actions(&outcome, 1),
        vec![ResolvedAction::Fold(FoldReason::Timeout)]
    );
    assert_eq!(table.seats[1].counters.timeouts, 1);
    assert_eq!(table.seats[0].stack_value(), Chips(5050));
}

/// Лимит проверяется по факту: движок дожидается ответа, записывает
/// исходное решение и только потом превращает его в фолд.
#[test]
fn late_answer_is_awaited_then_folded() {
    let config = TableConfig {
        decision_timeout_ms: Some(5),
        ..TableConfig::default()
    };
    let mut table = make_table(2, config);
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![Box::new(CallingStation), Box::new(SlowStrategy)];

    let started = std::time::Instant::now();
    let outcome = play(&mut table, &mut strategies, 7).unwrap();

    assert!(started.elapsed() >= Duration::from_millis(30));
    let late: Vec<(Decision, ResolvedAction)> = outcome
        .history
        .actions()
        .filter(|a| a.seat == 1)
        .map(|a| (a.decision, a.resolved))
        .collect();
    assert_eq!(late, vec![(Decision::Call, ResolvedAction::Fold(FoldReason::Timeout))]);
}

// ===== CANCEL / ERRORS =====

#[test]
fn cancelled_hand_restores_stacks() {
    let mut table = make_table(3, TableConfig::default());
    let mut strategies = calling_stations(3);
    let mut history = HandHistory::new();
    let cancel = CancelToken::new();
    cancel.cancel();

    let mut rng = DeterministicRng::from_seed(8);
    let err = play_hand(&mut table, &mut strategies, &mut rng, 42, &mut history, &cancel).unwrap_err();

    assert_eq!(err, EngineError::HandAborted(42));
    assert!(table.seats.iter().all(|p| p.stack_value() == Chips(5000)));
    assert!(table.seats.iter().all(|p| p.hole_cards.is_empty() && p.bet.is_empty()));
    assert_eq!(table.dealer_button, None);
    assert_eq!(table.hands_played, 0);
    assert!(!table.hand_in_progress);
    assert!(matches!(
        history.events.last().map(|e| &e.kind),
        Some(HandEventKind::HandAborted { hand_id: 42, .. })
    ));
}

/// Стратегия делает колл и сразу отменяет раздачу.
struct CancelAfterCall {
    token: CancelToken,
}

impl DecisionMaker for CancelAfterCall {
    fn decide(&mut self, _ctx: &DecisionContext<'_>) -> Decision {
        self.token.cancel();
        Decision::Call
    }
}

#[test]
fn cancel_mid_hand_rolls_back_bets() {
    let mut table = make_table(2, TableConfig::default());
    let cancel = CancelToken::new();
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(CancelAfterCall { token: cancel.clone() }),
    ];

    let mut rng = DeterministicRng::from_seed(9);
    let result = play_hand(&mut table, &mut strategies, &mut rng, 5, &mut NullObserver, &cancel);

    assert!(matches!(result, Err(EngineError::HandAborted(5))));
    assert_eq!(table.chips_in_play(), Chips(10_000));
    assert!(table.seats.iter().all(|p| p.stack_value() == Chips(5000)));
}

/// Колл малого блайнда был сыгран, но раздача отменена: счётчики
/// возвращаются к значениям до раздачи.
#[test]
fn cancel_mid_hand_rolls_back_action_counters() {
    let mut table = make_table(2, TableConfig::default());
    table.seats[1].counters.raises = 3;
    let before: Vec<ActionCounters> = table.seats.iter().map(|p| p.counters).collect();

    let cancel = CancelToken::new();
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(CancelAfterCall { token: cancel.clone() }),
    ];
    let mut history = HandHistory::new();
    let mut rng = DeterministicRng::from_seed(9);
    let result = play_hand(&mut table, &mut strategies, &mut rng, 6, &mut history, &cancel);

    assert!(matches!(result, Err(EngineError::HandAborted(6))));
    // Действие действительно было записано до отмены.
    assert_eq!(history.actions().count(), 1);
    let after: Vec<ActionCounters> = table.seats.iter().map(|p| p.counters).collect();
    assert_eq!(after, before);
    assert_eq!(table.seats[1].counters.calls, 0);
    assert_eq!(table.seats[1].counters.raises, 3);
}

#[test]
fn strategy_count_must_match_seats() {
    let mut table = make_table(3, TableConfig::default());
    let mut strategies = calling_stations(2);

    let err = play(&mut table, &mut strategies, 1).unwrap_err();

    assert_eq!(
        err,
        EngineError::StrategyCountMismatch {
            players: 3,
            strategies: 2
        }
    );
}

#[test]
fn empty_table_is_a_config_error() {
    let mut table = make_table(0, TableConfig::default());
    let mut strategies = calling_stations(0);
    assert_eq!(
        play(&mut table, &mut strategies, 1).unwrap_err(),
        EngineError::Config(ConfigError::NoPlayers)
    );
}

#[test]
fn single_player_cannot_start_hand() {
    let mut table = make_table(1, TableConfig::default());
    let mut strategies = calling_stations(1);
    assert_eq!(play(&mut table, &mut strategies, 1).unwrap_err(), EngineError::NotEnoughPlayers);
}

#[test]
fn hand_in_progress_is_rejected() {
    let mut table = make_table(2, TableConfig::default());
    table.hand_in_progress = true;
    let mut strategies = calling_stations(2);
    assert_eq!(
        play(&mut table, &mut strategies, 1).unwrap_err(),
        EngineError::HandAlreadyInProgress
    );
}

// ===== DEALER / CONTEXT =====

#[test]
fn dealer_button_rotates_between_hands() {
    let mut table = make_table(2, TableConfig::default());
    let mut strategies = calling_stations(2);

    play(&mut table, &mut strategies, 10).unwrap();
    assert_eq!(table.dealer_button, Some(0));
    play(&mut table, &mut strategies, 11).unwrap();
    assert_eq!(table.dealer_button, Some(1));
    assert_eq!(table.hands_played, 2);
}

#[derive(Clone, Debug, PartialEq)]
struct SeenSignals {
    street: Street,
    call_amount: Chips,
    pot_total: Chips,
    pot_odds: f64,
    stack_ratio: f64,
    position: f64,
    can_check: bool,
    active_players: usize,
}

struct Recorder {
    seen: Arc<Mutex<Vec<SeenSignals>>>,
}

impl DecisionMaker for Recorder {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(SeenSignals {
                street: ctx.street,
                call_amount: ctx.call_amount,
                pot_total: ctx.pot_total,
                pot_odds: ctx.pot_odds,
                stack_ratio: ctx.stack_ratio,
                position: ctx.position,
                can_check: ctx.can_check,
                active_players: ctx.active_players,
            });
        }
        Decision::Fold
    }
}

/// Малый блайнд хедз-ап видит: доплатить 50, в банке 150, шансы 50/200.
#[test]
fn decision_context_carries_pot_signals() {
    let mut table = make_table(2, TableConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(Recorder { seen: Arc::clone(&seen) }),
    ];

    play(&mut table, &mut strategies, 12).unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    let s = &seen[0];
    assert_eq!(s.street, Street::Preflop);
    assert_eq!(s.call_amount, Chips(50));
    assert_eq!(s.pot_total, Chips(150));
    assert!((s.pot_odds - 0.25).abs() < 1e-9);
    assert!((s.stack_ratio - 4950.0 / 4900.0).abs() < 1e-9);
    assert!((s.position - 0.5).abs() < 1e-9);
    assert!(!s.can_check);
    assert_eq!(s.active_players, 2);
}

/// Запоминает, кого стратегия видит последним агрессором, и сбрасывает.
struct AggressorWatcher {
    seen: Arc<Mutex<Vec<Option<u8>>>>,
}

impl DecisionMaker for AggressorWatcher {
    fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
        if let Ok(mut seen) = self.seen.lock() {
            seen.push(ctx.last_aggressor);
        }
        Decision::Fold
    }
}

/// Место 0 повышает, блайнды видят его последним агрессором.
#[test]
fn decision_context_names_last_aggressor() {
    let mut table = make_table(3, TableConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(ScriptedStrategy::new([Decision::Raise(Chips(200))])),
        Box::new(AggressorWatcher { seen: Arc::clone(&seen) }),
        Box::new(AggressorWatcher { seen: Arc::clone(&seen) }),
    ];

    let outcome = play(&mut table, &mut strategies, 15).unwrap();

    assert!(outcome.summary.uncontested);
    assert_eq!(*seen.lock().unwrap(), vec![Some(0), Some(0)]);
}

#[test]
fn equity_is_offered_when_enabled() {
    struct NeedsEquity {
        got: Arc<Mutex<Option<bool>>>,
    }
    impl DecisionMaker for NeedsEquity {
        fn decide(&mut self, ctx: &DecisionContext<'_>) -> Decision {
            if let Ok(mut got) = self.got.lock() {
                *got = Some(ctx.equity.is_some());
            }
            Decision::Fold
        }
    }

    let config = TableConfig {
        equity_samples: 50,
        ..TableConfig::default()
    };
    let mut table = make_table(2, config);
    let got = Arc::new(Mutex::new(None));
    let mut strategies: Vec<Box<dyn DecisionMaker>> = vec![
        Box::new(CallingStation),
        Box::new(NeedsEquity { got: Arc::clone(&got) }),
    ];

    play(&mut table, &mut strategies, 13).unwrap();

    assert_eq!(*got.lock().unwrap(), Some(true));
}

#[test]
fn history_records_blinds_and_hole_cards() {
    let mut table = make_table(3, TableConfig::default());
    let mut strategies = calling_stations(3);

    let outcome = play(&mut table, &mut strategies, 14).unwrap();

    let blinds: Vec<(u8, Chips, bool)> = outcome
        .history
        .events
        .iter()
        .filter_map(|e| match e.kind {
            HandEventKind::BlindPosted { seat, amount, big, .. } => Some((seat, amount, big)),
            _ => None,
        })
        .collect();
    assert_eq!(blinds, vec![(1, Chips(50), false), (2, Chips(100), true)]);

    let dealt = outcome
        .history
        .events
        .iter()
        .filter(|e| matches!(e.kind, HandEventKind::HoleCardsDealt { .. }))
        .count();
    assert_eq!(dealt, 3);
    assert!(matches!(
        outcome.history.events.last().map(|e| &e.kind),
        Some(HandEventKind::HandFinished { uncontested: false, .. })
    ));
}
