use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::domain::chips::Chips;
use crate::domain::deck::Deck;
use crate::domain::hand::{HandSummary, PlayerHandResult, Street};
use crate::domain::ledger::ChipLedger;
use crate::domain::table::{ConfigError, Table};
use crate::domain::{HandId, PlayerId, SeatIndex, TableId};
use crate::engine::actions::{ActionCounters, Decision, FoldReason, ResolvedAction};
use crate::engine::betting::BettingState;
use crate::engine::decision::{DecisionContext, DecisionMaker};
use crate::engine::errors::EngineError;
use crate::engine::hand_history::{HandEventKind, HandHistory, HandObserver};
use crate::engine::positions::{collect_seats_after, next_dealer, relative_position};
use crate::engine::pot::{pots_total, Pot};
use crate::engine::showdown::{award_uncontested, run_showdown, Payout};
use crate::engine::side_pots::resolve_bets_into_pots;
use crate::engine::validation::{normalize_decision, BetPlan};
use crate::engine::RandomSource;
use crate::eval::{improvement_chance, monte_carlo_equity, rank_evaluations};

/// Флаг отмены раздачи. Проверяется перед каждым решением игрока.
#[derive(Clone, Debug, Default)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::SeqCst);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

/// Внутреннее состояние раздачи.
pub struct HandEngine {
    pub table_id: TableId,
    pub hand_id: HandId,
    pub dealer: SeatIndex,
    pub deck: Deck,
    pub betting: BettingState,
    /// Главный банк первым, затем сайд-поты.
    pub pots: Vec<Pot>,
    pub history: HandHistory,
    /// Стек на начало раздачи; None для не получивших карты.
    stacks_before: Vec<Option<Chips>>,
    chips_before: Chips,
    payouts: Vec<Payout>,
}

/// Итог сыгранной раздачи.
#[derive(Clone, Debug)]
pub struct HandOutcome {
    pub summary: HandSummary,
    pub history: HandHistory,
}

/// Сыграть одну раздачу целиком: префлоп, флоп, тёрн, ривер, шоудаун.
///
/// `strategies[i]` принимает решения за `table.seats[i]`.
/// При ошибке или отмене стеки восстанавливаются к началу раздачи.
pub fn play_hand<R: RandomSource>(
    table: &mut Table,
    strategies: &mut [Box<dyn DecisionMaker>],
    rng: &mut R,
    hand_id: HandId,
    observer: &mut dyn HandObserver,
    cancel: &CancelToken,
) -> Result<HandOutcome, EngineError> {
    if table.hand_in_progress {
        return Err(EngineError::HandAlreadyInProgress);
    }
    if table.seats.is_empty() {
        return Err(ConfigError::NoPlayers.into());
    }
    if strategies.len() != table.seats.len() {
        return Err(EngineError::StrategyCountMismatch {
            players: table.seats.len(),
            strategies: strategies.len(),
        });
    }
    if table.funded_count() < 2 {
        return Err(EngineError::NotEnoughPlayers);
    }

    // Отмена раздачи откатывает и фишки, и статистику действий.
    let snapshot: Vec<(ChipLedger, ChipLedger, ActionCounters)> = table
        .seats
        .iter()
        .map(|p| (p.stack.clone(), p.bet.clone(), p.counters))
        .collect();
    let button_before = table.dealer_button;

    let dealer = next_dealer(table).ok_or(EngineError::NotEnoughPlayers)?;
    table.dealer_button = Some(dealer);
    table.hand_in_progress = true;

    let engine = HandEngine {
        table_id: table.id,
        hand_id,
        dealer,
        deck: Deck::shuffled(&mut *rng),
        betting: BettingState::new(
            Street::Preflop,
            ChipLedger::empty(&table.config.chip_set),
            table.config.min_raise,
            Vec::new(),
        ),
        pots: Vec::new(),
        history: HandHistory::new(),
        stacks_before: vec![None; table.seats.len()],
        chips_before: table.chips_in_play(),
        payouts: Vec::new(),
    };

    let result = {
        let mut run = HandRun {
            table: &mut *table,
            strategies,
            rng,
            observer: &mut *observer,
            cancel,
            engine,
        };
        let result = run.play();
        if let Err(err) = &result {
            run.emit(HandEventKind::HandAborted {
                hand_id,
                reason: err.to_string(),
            });
        }
        result
    };

    match result {
        Ok(outcome) => {
            for player in table.seats.iter_mut() {
                if player.is_funded() {
                    player.rounds_survived += 1;
                }
            }
            table.hands_played += 1;
            table.hand_in_progress = false;
            tracing::debug!(
                table_id = table.id,
                hand_id,
                pot = outcome.summary.total_pot.0,
                uncontested = outcome.summary.uncontested,
                "раздача завершена"
            );
            Ok(outcome)
        }
        Err(err) => {
            for (player, (stack, bet, counters)) in table.seats.iter_mut().zip(snapshot) {
                player.stack = stack;
                player.bet = bet;
                player.counters = counters;
                player.reset();
            }
            table.community.clear();
            table.dealer_button = button_before;
            table.hand_in_progress = false;
            tracing::warn!(table_id = table.id, hand_id, error = %err, "раздача отменена, стеки восстановлены");
            Err(err)
        }
    }
}

/// Одна раздача в процессе: стол, стратегии и состояние движка вместе.
struct HandRun<'a, R: RandomSource> {
    table: &'a mut Table,
    strategies: &'a mut [Box<dyn DecisionMaker>],
    rng: &'a mut R,
    observer: &'a mut dyn HandObserver,
    cancel: &'a CancelToken,
    engine: HandEngine,
}

impl<R: RandomSource> HandRun<'_, R> {
    fn play(&mut self) -> Result<HandOutcome, EngineError> {
        self.begin()?;

        for street in [Street::Preflop, Street::Flop, Street::Turn, Street::River] {
            self.check_cancel()?;
            if street != Street::Preflop {
                self.deal_street(street)?;
            }
            self.evaluate_live_hands()?;
            self.betting_round(street)?;

            resolve_bets_into_pots(self.table, &mut self.engine.pots)?;
            let pots = self.engine.pots.iter().map(Pot::snapshot).collect();
            self.emit(HandEventKind::PotsResolved { street, pots });

            if self.live_count() == 1 {
                return self.finish_uncontested(street);
            }
        }

        self.finish_showdown()
    }

    fn emit(&mut self, kind: HandEventKind) {
        let event = self.engine.history.push(self.engine.hand_id, kind);
        self.observer.on_event(event);
    }

    fn check_cancel(&self) -> Result<(), EngineError> {
        if self.cancel.is_cancelled() {
            return Err(EngineError::HandAborted(self.engine.hand_id));
        }
        Ok(())
    }

    fn live_count(&self) -> usize {
        self.table.seats.iter().filter(|p| p.is_live()).count()
    }

    /// Сброс игроков, раздача карманных карт.
    fn begin(&mut self) -> Result<(), EngineError> {
        self.table.community.clear();
        for player in self.table.seats.iter_mut() {
            player.reset();
        }

        let dealer = self.engine.dealer;
        let participants = collect_seats_after(self.table, dealer, |p| p.is_funded());
        for &seat in &participants {
            self.engine.stacks_before[seat as usize] = Some(self.table.seats[seat as usize].stack_value());
        }

        let stacks = participants
            .iter()
            .map(|&s| {
                let p = &self.table.seats[s as usize];
                (p.id, p.stack_value())
            })
            .collect();
        self.emit(HandEventKind::HandStarted {
            table_id: self.engine.table_id,
            hand_id: self.engine.hand_id,
            dealer,
            stacks,
        });

        // По одной карте за круг, два круга.
        for _ in 0..2 {
            for &seat in &participants {
                let card = self.engine.deck.deal()?;
                self.table.seats[seat as usize].receive_card(card);
            }
        }
        for &seat in &participants {
            let player = &self.table.seats[seat as usize];
            let kind = HandEventKind::HoleCardsDealt {
                seat,
                player_id: player.id,
                cards: player.hole_cards.clone(),
            };
            self.emit(kind);
        }
        Ok(())
    }

    fn deal_street(&mut self, street: Street) -> Result<(), EngineError> {
        self.engine.deck.burn()?;
        let cards = self.engine.deck.deal_n(street.cards_to_deal())?;
        self.table.community.extend_from_slice(&cards);
        self.emit(HandEventKind::StreetDealt { street, cards });
        Ok(())
    }

    fn evaluate_live_hands(&mut self) -> Result<(), EngineError> {
        let rules = self.table.config.eval_rules;
        let table = &mut *self.table;
        for player in table.seats.iter_mut().filter(|p| p.is_live()) {
            player.evaluate_hand(&table.community, rules)?;
        }
        Ok(())
    }

    fn betting_round(&mut self, street: Street) -> Result<(), EngineError> {
        let queue = collect_seats_after(self.table, self.engine.dealer, |p| {
            p.is_live() && (p.is_funded() || !p.bet.is_empty())
        });
        for player in self.table.seats.iter_mut() {
            player.has_raised = false;
        }

        self.engine.betting = BettingState::new(
            street,
            ChipLedger::empty(&self.table.config.chip_set),
            self.table.config.min_raise,
            queue,
        );

        if street == Street::Preflop {
            self.post_blinds()?;
        }

        loop {
            self.check_cancel()?;
            if self.live_count() < 2 || !self.someone_can_act() {
                break;
            }
            let Some(seat) = self.engine.betting.next_actor() else {
                break;
            };
            let player = &self.table.seats[seat as usize];
            if !player.is_live() || !player.is_funded() {
                continue;
            }
            self.take_turn(seat, street)?;
        }
        Ok(())
    }

    /// Торговля продолжается, пока есть хотя бы двое с фишками
    /// или единственный с фишками ещё не ответил на ставку.
    fn someone_can_act(&self) -> bool {
        let level = self.engine.betting.call_level();
        let funded: Vec<_> = self
            .table
            .seats
            .iter()
            .filter(|p| p.is_live() && p.is_funded())
            .collect();
        match funded.len() {
            0 => false,
            1 => funded[0].bet_value() < level,
            _ => true,
        }
    }

    /// Первые двое в очереди ставят малый и большой блайнды,
    /// малый блайнд встаёт в конец очереди.
    fn post_blinds(&mut self) -> Result<(), EngineError> {
        let small = self.table.config.small_blind_ledger()?;
        let big = self.table.config.big_blind_ledger()?;

        let sb_seat = self
            .engine
            .betting
            .next_actor()
            .ok_or(EngineError::NotEnoughPlayers)?;
        let bb_seat = self
            .engine
            .betting
            .next_actor()
            .ok_or(EngineError::NotEnoughPlayers)?;

        self.post_blind(sb_seat, &small, false)?;
        self.post_blind(bb_seat, &big, true)?;

        self.engine.betting.requeue(sb_seat);
        self.engine.betting.amount_to_call = big;
        Ok(())
    }

    /// Короткий стек ставит блайнд олл-ином.
    fn post_blind(&mut self, seat: SeatIndex, blind: &ChipLedger, big: bool) -> Result<(), EngineError> {
        let player = &mut self.table.seats[seat as usize];
        let (amount, all_in) = if player.stack_value() <= blind.total_value() {
            (player.push_all_in()?, true)
        } else {
            player.place_bet(blind)?;
            (blind.total_value(), false)
        };
        let player_id = player.id;
        self.emit(HandEventKind::BlindPosted {
            seat,
            player_id,
            amount,
            big,
            all_in,
        });
        Ok(())
    }

    fn take_turn(&mut self, seat: SeatIndex, street: Street) -> Result<(), EngineError> {
        let (decision, elapsed) = self.ask(seat, street)?;

        let timed_out = self
            .table
            .config
            .decision_timeout()
            .is_some_and(|limit| elapsed > limit);

        let plan = if timed_out {
            tracing::warn!(
                hand_id = self.engine.hand_id,
                seat,
                elapsed_ms = elapsed.as_millis() as u64,
                "решение дольше лимита, засчитан фолд"
            );
            BetPlan::Fold(FoldReason::Timeout)
        } else {
            normalize_decision(
                decision,
                &self.table.seats[seat as usize],
                self.engine.betting.call_level(),
                self.engine.betting.min_raise,
            )
        };

        let resolved = self.apply_plan(seat, plan)?;

        let player = &mut self.table.seats[seat as usize];
        player.counters.record(&resolved);
        let kind = HandEventKind::ActionTaken {
            player_id: player.id,
            seat,
            street,
            decision,
            resolved,
            stack_after: player.stack_value(),
            bet_after: player.bet_value(),
        };
        self.emit(kind);
        Ok(())
    }

    /// Собрать контекст и спросить стратегию. Возвращает решение и время на него.
    fn ask(&mut self, seat: SeatIndex, street: Street) -> Result<(Decision, Duration), EngineError> {
        let table: &Table = &*self.table;
        let player = &table.seats[seat as usize];
        let betting = &self.engine.betting;

        let level = betting.call_level();
        let call_amount = level.saturating_sub(player.bet_value());
        let bets: Chips = table.seats.iter().map(|p| p.bet_value()).sum();
        let pot_total = pots_total(&self.engine.pots) + bets;
        let pot_odds = if call_amount.is_zero() {
            0.0
        } else {
            call_amount.0 as f64 / (pot_total.0 + call_amount.0) as f64
        };

        let others = table.seats.len().saturating_sub(1);
        let others_total: u64 = table
            .seats
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != seat as usize)
            .map(|(_, p)| p.stack_value().0)
            .sum();
        let average = if others == 0 { 0.0 } else { others_total as f64 / others as f64 };
        let own = player.stack_value().0 as f64;
        let stack_ratio = if average == 0.0 || own == 0.0 { 1.0 } else { own / average };

        let active_players = table.seats.iter().filter(|p| p.is_live()).count();
        let samples = table.config.equity_samples;
        let rules = table.config.eval_rules;
        let (equity, improvement) = if samples > 0 {
            let equity = monte_carlo_equity(
                &player.hole_cards,
                &table.community,
                active_players.saturating_sub(1),
                samples,
                rules,
                &mut *self.rng,
            )?;
            let improvement = improvement_chance(&player.hole_cards, &table.community, rules)?;
            (Some(equity), improvement)
        } else {
            (None, None)
        };

        let ctx = DecisionContext {
            player_id: player.id,
            seat,
            dealer: self.engine.dealer,
            street,
            hole_cards: &player.hole_cards,
            community: &table.community,
            stack: &player.stack,
            bet: &player.bet,
            amount_to_call: &betting.amount_to_call,
            call_amount,
            min_raise: betting.min_raise,
            pot_total,
            pot_odds,
            stack_ratio,
            position: relative_position(seat, table.seats.len()),
            can_check: call_amount.is_zero(),
            has_raised: player.has_raised,
            last_aggressor: betting.last_aggressor,
            active_players,
            hand: player.evaluation.as_ref(),
            equity,
            improvement_chance: improvement,
        };

        let started = Instant::now();
        let decision = self.strategies[seat as usize].decide(&ctx);
        Ok((decision, started.elapsed()))
    }

    fn apply_plan(&mut self, seat: SeatIndex, plan: BetPlan) -> Result<ResolvedAction, EngineError> {
        let level = self.engine.betting.call_level();
        let player = &mut self.table.seats[seat as usize];

        match plan {
            BetPlan::Fold(reason) => {
                player.folded = true;
                Ok(ResolvedAction::Fold(reason))
            }

            BetPlan::Check => Ok(ResolvedAction::Check),

            BetPlan::Call => {
                let needed = player.bet.difference_to(&self.engine.betting.amount_to_call);
                if needed.total_value() >= player.stack_value() || player.place_bet(&needed).is_err() {
                    return self.go_all_in(seat);
                }
                Ok(ResolvedAction::Call {
                    added: needed.total_value(),
                })
            }

            BetPlan::Raise { raise_by, bluff } => {
                let to_call = level.saturating_sub(player.bet_value());
                let wanted = ChipLedger::compose(&self.table.config.chip_set, to_call + raise_by);
                let player = &mut self.table.seats[seat as usize];
                if wanted.total_value() >= player.stack_value() || player.place_bet(&wanted).is_err() {
                    return self.go_all_in(seat);
                }
                let actual = player.bet_value().saturating_sub(level);
                self.open_action(seat, actual);
                Ok(ResolvedAction::Raise {
                    added: wanted.total_value(),
                    raise_by: actual,
                    bluff,
                })
            }

            BetPlan::AllIn => self.go_all_in(seat),
        }
    }

    /// Весь стек в ставку; если перекрыл уровень, это рейз.
    fn go_all_in(&mut self, seat: SeatIndex) -> Result<ResolvedAction, EngineError> {
        let level = self.engine.betting.call_level();
        let player = &mut self.table.seats[seat as usize];
        let added = player.push_all_in()?;
        let new_bet = player.bet_value();

        let raise_by = if new_bet > level {
            let raise_by = new_bet - level;
            self.open_action(seat, raise_by);
            raise_by
        } else {
            Chips::ZERO
        };
        Ok(ResolvedAction::AllIn { added, raise_by })
    }

    /// Новый уровень ставки: флаги рейза сбрасываются у всех, кроме рейзера,
    /// торговля заново открывается для всех живых с фишками после него.
    fn open_action(&mut self, seat: SeatIndex, raise_by: Chips) {
        for (i, player) in self.table.seats.iter_mut().enumerate() {
            player.has_raised = i == seat as usize;
        }
        let new_level = self.table.seats[seat as usize].bet.clone();
        let reopened = collect_seats_after(self.table, seat, |p| p.is_live() && p.is_funded())
            .into_iter()
            .filter(|&s| s != seat)
            .collect();
        self.engine.betting.on_raise(seat, new_level, raise_by, reopened);
    }

    fn finish_uncontested(&mut self, street: Street) -> Result<HandOutcome, EngineError> {
        let winner = self
            .table
            .seats
            .iter()
            .find(|p| p.is_live())
            .map(|p| p.id)
            .ok_or(EngineError::Internal("не осталось живых игроков"))?;

        let payouts = award_uncontested(self.table, &mut self.engine.pots, winner, self.engine.dealer)?;
        self.record_payouts(payouts);
        self.finish(street, true)
    }

    fn finish_showdown(&mut self) -> Result<HandOutcome, EngineError> {
        self.evaluate_live_hands()?;

        let reveal_order = collect_seats_after(self.table, self.engine.dealer, |p| p.is_live());
        let mut evaluated = Vec::with_capacity(reveal_order.len());
        for seat in reveal_order {
            let player = &self.table.seats[seat as usize];
            let evaluation = player
                .evaluation
                .clone()
                .ok_or(EngineError::Internal("рука игрока не оценена"))?;
            evaluated.push((player.id, evaluation.clone()));
            let kind = HandEventKind::ShowdownReveal {
                seat,
                player_id: player.id,
                hole_cards: player.hole_cards.clone(),
                evaluation,
            };
            self.emit(kind);
        }

        let standings = rank_evaluations(&evaluated);
        let payouts = run_showdown(self.table, &mut self.engine.pots, &standings, self.engine.dealer)?;
        self.record_payouts(payouts);
        self.finish(Street::Showdown, false)
    }

    fn record_payouts(&mut self, payouts: Vec<Payout>) {
        for payout in &payouts {
            self.emit(HandEventKind::PayoutMade {
                pot_index: payout.pot_index,
                seat: payout.seat,
                player_id: payout.player_id,
                amount: payout.amount,
            });
        }
        self.engine.payouts.extend(payouts);
    }

    /// Проверка баланса и сборка итога.
    fn finish(&mut self, street_reached: Street, uncontested: bool) -> Result<HandOutcome, EngineError> {
        let after = self.table.chips_in_play() + pots_total(&self.engine.pots);
        if after != self.engine.chips_before {
            return Err(EngineError::ConservationViolated {
                before: self.engine.chips_before,
                after,
            });
        }

        self.emit(HandEventKind::HandFinished {
            hand_id: self.engine.hand_id,
            table_id: self.engine.table_id,
            uncontested,
        });

        let summary = self.summary(street_reached, uncontested);
        Ok(HandOutcome {
            summary,
            history: self.engine.history.clone(),
        })
    }

    fn summary(&self, street_reached: Street, uncontested: bool) -> HandSummary {
        let won_by = |id: PlayerId| -> Chips {
            self.engine
                .payouts
                .iter()
                .filter(|p| p.player_id == id)
                .map(|p| p.amount)
                .sum()
        };

        let results = self
            .table
            .seats
            .iter()
            .enumerate()
            .filter_map(|(seat, player)| {
                let stack_before = self.engine.stacks_before[seat]?;
                Some(PlayerHandResult {
                    player_id: player.id,
                    seat: seat as SeatIndex,
                    evaluation: if uncontested || player.folded {
                        None
                    } else {
                        player.evaluation.clone()
                    },
                    stack_before,
                    stack_after: player.stack_value(),
                    won: won_by(player.id),
                    folded: player.folded,
                })
            })
            .collect();

        HandSummary {
            hand_id: self.engine.hand_id,
            table_id: self.engine.table_id,
            street_reached,
            board: self.table.community.clone(),
            total_pot: self.engine.payouts.iter().map(|p| p.amount).sum(),
            uncontested,
            results,
        }
    }
}
