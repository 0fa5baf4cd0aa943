use std::time::Instant;

use holdem_evo_engine::domain::chips::Chips;
use holdem_evo_engine::domain::table::{Table, TableConfig};
use holdem_evo_engine::engine::{CallingStation, DecisionMaker, EquityThreshold, TableManager};
use holdem_evo_engine::infra::{init_logging, load_table_config_json};

// Параметры нагрузки.
const NUM_TABLES: usize = 32;
const PLAYERS_PER_TABLE: usize = 6;
const EQUITY_SAMPLES: u32 = 64;

fn main() {
    init_logging();
    println!("holdem_stress_sim: стартуем стресс-тест движка…");

    // Конфиг можно передать первым аргументом (JSON), иначе стандартный с эквити.
    let config = match std::env::args().nth(1) {
        Some(path) => match load_table_config_json(&path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("[STRESS] Не удалось загрузить конфиг {path}: {e}");
                std::process::exit(1);
            }
        },
        None => TableConfig {
            equity_samples: EQUITY_SAMPLES,
            max_hands: 500,
            ..TableConfig::default()
        },
    };
    let players = PLAYERS_PER_TABLE.min(config.max_seats as usize);

    let mut manager = TableManager::new();

    // 1. Создаём столы и рассаживаем игроков; стратегии чередуются по местам.
    for t in 0..NUM_TABLES {
        let table_id = manager.ids().next_table_id();
        let mut table = match Table::new(table_id, format!("STRESS TABLE {}", t + 1), config.clone()) {
            Ok(table) => table,
            Err(e) => {
                eprintln!("[STRESS] Некорректный конфиг стола: {e}");
                std::process::exit(1);
            }
        };

        let mut strategies: Vec<Box<dyn DecisionMaker>> = Vec::with_capacity(players);
        for seat in 0..players {
            let pid = manager.ids().next_player_id();
            // Последнее место всегда колл-станция, остальные чередуют пороги.
            let strategy: Box<dyn DecisionMaker> = if seat == players - 1 {
                Box::new(CallingStation)
            } else if seat % 2 == 0 {
                Box::new(EquityThreshold::default())
            } else {
                Box::new(EquityThreshold {
                    call_threshold: 0.2,
                    raise_threshold: 0.55,
                    raise_multiple: 3,
                })
            };
            if let Err(e) = table.seat_player(pid, format!("bot-{pid}")) {
                eprintln!("[STRESS] Не удалось посадить игрока {pid}: {e}");
                std::process::exit(1);
            }
            strategies.push(strategy);
        }

        if let Err(e) = manager.add_table(table, strategies, table_id) {
            eprintln!("[STRESS] Стол {table_id} не добавлен: {e}");
            std::process::exit(1);
        }
    }

    println!(
        "[STRESS] Создано {} столов, по {} игроков, до {} рук на стол.",
        NUM_TABLES, players, config.max_hands
    );

    // 2. Гоним все столы параллельно.
    let started = Instant::now();
    let outcomes = manager.run_all();
    let elapsed = started.elapsed();

    // 3. Статистика и проверка сохранения фишек.
    let mut total_hands: u64 = 0;
    let mut finished_tables = 0usize;
    let mut violations = 0usize;
    let mut errors = 0usize;
    let mut longest_survivor: Option<(u64, u32)> = None;

    for outcome in &outcomes {
        total_hands += outcome.hands_played;
        if outcome.winner().is_some() {
            finished_tables += 1;
        }
        if outcome.total_chips() != outcome.starting_chips() {
            violations += 1;
            eprintln!(
                "[STRESS][table_id={}] фишки не сошлись: было {}, стало {}",
                outcome.table_id,
                outcome.starting_chips(),
                outcome.total_chips()
            );
        }
        if let Some(err) = &outcome.error {
            errors += 1;
            eprintln!("[STRESS][table_id={}] прогон остановлен: {err}", outcome.table_id);
        }
        for p in &outcome.players {
            if longest_survivor.map_or(true, |(_, best)| p.rounds_survived > best) {
                longest_survivor = Some((p.player_id, p.rounds_survived));
            }
        }
    }

    let total_chips: Chips = outcomes.iter().map(|o| o.total_chips()).sum();

    println!();
    println!("=========== STRESS TEST SUMMARY ===========");
    println!("Столов: {}, доиграно до победителя: {}", outcomes.len(), finished_tables);
    println!("Всего сыграно рук: {}", total_hands);
    println!("Фишек на всех столах: {}", total_chips);
    println!("Нарушений сохранения фишек: {}", violations);
    println!("Столов с ошибкой: {}", errors);
    if let Some((pid, rounds)) = longest_survivor {
        println!("Дольше всех продержался игрок {}: {} рук", pid, rounds);
    }
    println!("Время: {:.2?}", elapsed);
    println!("===========================================");
    println!("holdem_stress_sim: завершено.");
}
