//! Тесты учёта фишек по номиналам.
//!
//! Здесь проверяем:
//! - размен trade_in (в том числе 3x50 -> 1x100 + 1x50);
//! - атомарность операций при ошибках;
//! - перевод между леджерами с разменом у источника;
//! - изъятие точной суммы и перевод в минимальный номинал.

use holdem_evo_engine::domain::chips::{ChipSet, ChipSetError, Chips};
use holdem_evo_engine::domain::ledger::{ChipLedger, LedgerError};

fn casino() -> ChipSet {
    ChipSet::casino()
}

fn ledger(counts: &[(u64, u64)]) -> ChipLedger {
    ChipLedger::from_counts(&casino(), counts).expect("номиналы из набора казино")
}

// ===== CHIP SET =====

#[test]
fn chip_set_rejects_denomination_not_multiple_of_smallest() {
    let err = ChipSet::new(&[50, 75]).unwrap_err();
    assert_eq!(
        err,
        ChipSetError::NotMultipleOfSmallest {
            denomination: 75,
            smallest: 50
        }
    );
}

#[test]
fn chip_set_rejects_empty_zero_and_duplicates() {
    assert_eq!(ChipSet::new(&[]).unwrap_err(), ChipSetError::Empty);
    assert_eq!(ChipSet::new(&[0, 5]).unwrap_err(), ChipSetError::ZeroDenomination);
    assert_eq!(ChipSet::new(&[5, 10, 5]).unwrap_err(), ChipSetError::Duplicate(5));
}

#[test]
fn chip_set_is_sorted_ascending() {
    let set = ChipSet::new(&[25, 1, 10, 50, 5]).unwrap();
    assert_eq!(set.ascending().collect::<Vec<_>>(), vec![1, 5, 10, 25, 50]);
    assert_eq!(set.smallest(), 1);
}

// ===== BASICS =====

#[test]
fn total_value_sums_every_denomination() {
    let l = ledger(&[(50, 20), (100, 10), (250, 4), (500, 2), (1000, 1)]);
    assert_eq!(l.total_value(), Chips(5000));
}

#[test]
fn add_unknown_denomination_is_rejected() {
    let mut l = ledger(&[(50, 1)]);
    assert_eq!(l.add(25, 1), Err(LedgerError::InvalidDenomination(25)));
    assert_eq!(l.total_value(), Chips(50));
}

#[test]
fn remove_more_than_held_is_rejected_and_keeps_ledger() {
    let mut l = ledger(&[(100, 2)]);
    let err = l.remove(100, 3).unwrap_err();
    assert_eq!(
        err,
        LedgerError::InsufficientChips {
            denomination: 100,
            held: 2,
            requested: 3
        }
    );
    assert_eq!(l.count(100), 2);
}

#[test]
fn compose_rounds_up_to_smallest_chip() {
    let l = ChipLedger::compose(&casino(), Chips(120));
    assert_eq!(l.count(100), 1);
    assert_eq!(l.count(50), 1);
    assert_eq!(l.total_value(), Chips(150));
}

#[test]
fn display_lists_non_zero_positions() {
    let l = ledger(&[(50, 3), (100, 1)]);
    assert_eq!(l.to_string(), "[50x3, 100x1] = $250");
}

// ===== TRADE IN =====

/// 3 белые по 50, нужна одна красная 100:
/// ожидаем 1x100 + 1x50, стоимость 150 сохраняется.
#[test]
fn trade_in_combines_lower_chips_into_target() {
    let mut l = ledger(&[(50, 3)]);

    l.trade_in(100, 1).unwrap();

    assert_eq!(l.count(100), 1);
    assert_eq!(l.count(50), 1);
    assert_eq!(l.total_value(), Chips(150));
}

#[test]
fn trade_in_breaks_higher_chip_first() {
    let mut l = ledger(&[(1000, 1)]);

    l.trade_in(250, 2).unwrap();

    assert!(l.count(250) >= 2, "Должно быть хотя бы две зелёные: {l}");
    assert_eq!(l.total_value(), Chips(1000));
}

#[test]
fn trade_in_caps_goal_by_total_value() {
    let mut l = ledger(&[(50, 3)]);

    // Просим 5 красных, а денег хватает только на одну.
    l.trade_in(100, 5).unwrap();

    assert_eq!(l.count(100), 1);
    assert_eq!(l.total_value(), Chips(150));
}

#[test]
fn trade_in_is_noop_when_enough_chips() {
    let mut l = ledger(&[(100, 2), (50, 1)]);
    let before = l.clone();
    l.trade_in(100, 2).unwrap();
    assert_eq!(l, before);
}

#[test]
fn trade_in_unknown_target_is_rejected() {
    let mut l = ledger(&[(50, 3)]);
    assert_eq!(l.trade_in(75, 1), Err(LedgerError::InvalidDenomination(75)));
    assert_eq!(l.count(50), 3);
}

// ===== DIFFERENCE / TRANSFER =====

#[test]
fn difference_to_covers_value_gap() {
    let current = ledger(&[(50, 1)]);
    let target = ledger(&[(250, 1)]);

    let diff = current.difference_to(&target);

    assert_eq!(diff.total_value(), Chips(200));
    assert_eq!(diff.count(100), 2);
}

#[test]
fn difference_to_is_empty_when_already_above() {
    let current = ledger(&[(500, 1)]);
    let target = ledger(&[(100, 1)]);
    assert!(current.difference_to(&target).is_empty());
}

#[test]
fn transfer_moves_exact_composition() {
    let mut source = ledger(&[(100, 3), (50, 2)]);
    let mut dest = ChipLedger::empty(&casino());

    dest.transfer(&mut source, &ledger(&[(100, 1), (50, 1)])).unwrap();

    assert_eq!(dest.total_value(), Chips(150));
    assert_eq!(source.total_value(), Chips(250));
    assert_eq!(source.count(100), 2);
    assert_eq!(source.count(50), 1);
}

#[test]
fn transfer_makes_change_from_source() {
    let mut source = ledger(&[(100, 1)]);
    let mut dest = ChipLedger::empty(&casino());

    dest.transfer(&mut source, &ledger(&[(50, 1)])).unwrap();

    assert_eq!(dest.count(50), 1);
    assert_eq!(source.count(50), 1);
    assert_eq!(source.count(100), 0);
}

#[test]
fn transfer_with_insufficient_funds_changes_nothing() {
    let mut source = ledger(&[(100, 1)]);
    let mut dest = ledger(&[(50, 1)]);
    let (source_before, dest_before) = (source.clone(), dest.clone());

    let err = dest.transfer(&mut source, &ledger(&[(250, 1)])).unwrap_err();

    assert_eq!(
        err,
        LedgerError::InsufficientFunds {
            available: Chips(100),
            requested: Chips(250)
        }
    );
    assert_eq!(source, source_before);
    assert_eq!(dest, dest_before);
}

#[test]
fn transfer_into_ledger_without_denomination_fails_atomically() {
    let small_set = ChipSet::new(&[100, 500]).unwrap();
    let mut dest = ChipLedger::empty(&small_set);
    let mut source = ledger(&[(50, 4)]);
    let source_before = source.clone();

    let err = dest.transfer(&mut source, &ledger(&[(50, 2)])).unwrap_err();

    assert_eq!(err, LedgerError::InvalidDenomination(50));
    assert_eq!(source, source_before);
    assert!(dest.is_empty());
}

// ===== WITHDRAW / SMALLEST =====

#[test]
fn withdraw_value_breaks_larger_chips() {
    let set = ChipSet::new(&[1, 5, 10, 25, 50]).unwrap();
    let mut l = ChipLedger::from_counts(&set, &[(50, 2)]).unwrap();

    let taken = l.withdraw_value(Chips(34)).unwrap();

    assert_eq!(taken.total_value(), Chips(34));
    assert_eq!(l.total_value(), Chips(66));
}

#[test]
fn withdraw_value_more_than_held_fails() {
    let mut l = ledger(&[(100, 1)]);
    let err = l.withdraw_value(Chips(150)).unwrap_err();
    assert!(matches!(err, LedgerError::InsufficientFunds { .. }));
    assert_eq!(l.count(100), 1);
}

#[test]
fn to_smallest_denomination_keeps_value() {
    let mut l = ledger(&[(100, 1), (250, 1)]);

    l.to_smallest_denomination().unwrap();

    assert_eq!(l.count(50), 7);
    assert_eq!(l.iter().count(), 1);
    assert_eq!(l.total_value(), Chips(350));
}

#[test]
fn drain_empties_and_returns_everything() {
    let mut l = ledger(&[(500, 1), (50, 2)]);
    let out = l.drain();
    assert!(l.is_empty());
    assert_eq!(out.total_value(), Chips(600));
    // Номиналы остаются известными.
    assert!(l.knows(500));
}
