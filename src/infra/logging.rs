use tracing_subscriber::EnvFilter;

use crate::domain::TableId;
use crate::engine::hand_history::{HandEvent, HandEventKind, HandObserver};

/// Подключить fmt-подписчик. Уровень берётся из `RUST_LOG`, по умолчанию `info`.
/// Повторный вызов ничего не делает.
pub fn init_logging() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}

/// Наблюдатель, который пишет события раздачи в tracing.
#[derive(Clone, Copy, Debug)]
pub struct TracingObserver {
    table_id: TableId,
}

impl TracingObserver {
    pub fn new(table_id: TableId) -> Self {
        Self { table_id }
    }
}

impl HandObserver for TracingObserver {
    fn on_event(&mut self, event: &HandEvent) {
        let table_id = self.table_id;
        let hand_id = event.hand_id;
        match &event.kind {
            HandEventKind::HandStarted { dealer, stacks, .. } => {
                tracing::debug!(table_id, hand_id, dealer, players = stacks.len(), "раздача началась");
            }
            HandEventKind::ActionTaken {
                seat,
                street,
                resolved,
                stack_after,
                ..
            } => {
                tracing::trace!(table_id, hand_id, seat, ?street, ?resolved, stack = stack_after.0, "ход");
            }
            HandEventKind::PayoutMade { seat, amount, pot_index, .. } => {
                tracing::debug!(table_id, hand_id, seat, pot_index, amount = amount.0, "выплата");
            }
            HandEventKind::HandAborted { reason, .. } => {
                tracing::warn!(table_id, hand_id, %reason, "раздача прервана");
            }
            _ => {}
        }
    }
}
