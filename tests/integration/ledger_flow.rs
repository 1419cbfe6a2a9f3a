//! Several markets settled into one ledger, checking running stats,
//! streaks, titles and the JSON snapshot round trip.

use wagerbook::engine::validator::{RawMarket, RawWager};
use wagerbook::engine::SettlementEngine;
use wagerbook::ledger::titles::Title;
use wagerbook::ledger::PlayerLedger;
use wagerbook::storage::{JsonFileStore, LedgerStore};
use wagerbook::types::{MarketVariant, Outcome};

fn binary(wagers: &[(&str, &str, f64)]) -> RawMarket {
    RawMarket::new(
        MarketVariant::Binary,
        wagers
            .iter()
            .map(|(id, pick, amount)| RawWager::new(id, *pick, *amount))
            .collect(),
    )
    .with_default_fee(0.02)
}

fn holders(ledger: &PlayerLedger, title: Title) -> Vec<String> {
    ledger
        .titles()
        .holders(title)
        .iter()
        .map(|h| h.id.clone())
        .collect()
}

#[test]
fn test_streaks_across_markets() {
    let engine = SettlementEngine::default();
    let mut ledger = PlayerLedger::new();

    for outcome in ["yes", "yes", "no", "yes"] {
        engine
            .settle_raw_into(
                &binary(&[("alice", "yes", 10.0), ("bob", "no", 10.0)]),
                &Outcome::from(outcome),
                &mut ledger,
            )
            .unwrap();
    }

    let alice = ledger.get("alice").unwrap();
    assert_eq!(alice.bet_count, 4);
    assert_eq!(alice.total_wins, 3);
    assert_eq!(alice.total_losses, 1);
    assert_eq!(alice.win_streak, 1);

    let bob = ledger.get("bob").unwrap();
    assert_eq!(bob.total_wins, 1);
    assert_eq!(bob.win_streak, 0);
    assert_eq!(bob.greatest_loss, -10.0);
    assert!((bob.greatest_win - 9.6).abs() < 1e-9);

    assert_eq!(holders(&ledger, Title::King), vec!["alice"]);
    assert_eq!(holders(&ledger, Title::Jester), vec!["bob"]);
    assert_eq!(holders(&ledger, Title::Addict), vec!["alice", "bob"]);
    assert_eq!(holders(&ledger, Title::Coward), vec!["alice", "bob"]);
}

#[test]
fn test_tied_kings_and_lone_coward() {
    let engine = SettlementEngine::default();
    let mut ledger = PlayerLedger::new();

    engine
        .settle_raw_into(
            &binary(&[("a", "yes", 10.0), ("b", "yes", 10.0), ("c", "no", 10.0)]),
            &Outcome::from("yes"),
            &mut ledger,
        )
        .unwrap();
    engine
        .settle_raw_into(
            &binary(&[("a", "no", 10.0), ("b", "no", 10.0)]),
            &Outcome::from("no"),
            &mut ledger,
        )
        .unwrap();

    assert_eq!(holders(&ledger, Title::King), vec!["a", "b"]);
    assert_eq!(holders(&ledger, Title::Coward), vec!["c"]);
    assert_eq!(holders(&ledger, Title::Jester), vec!["c"]);
    assert_eq!(holders(&ledger, Title::Fool), vec!["c"]);
}

#[test]
fn test_mixed_variants_share_ledger() {
    let engine = SettlementEngine::default();
    let mut ledger = PlayerLedger::new();

    engine
        .settle_raw_into(
            &binary(&[("p1", "yes", 25.0), ("p2", "no", 35.0)]),
            &Outcome::from("no"),
            &mut ledger,
        )
        .unwrap();

    let proximity = RawMarket::new(
        MarketVariant::TargetProximity,
        vec![RawWager::new("p1", 11, 20), RawWager::new("p2", 30, 20)],
    )
    .with_default_fee(0.02)
    .with_decay_scale(3.0);
    let report = engine
        .settle_raw_into(&proximity, &Outcome::Target(12.0), &mut ledger)
        .unwrap();

    let p1 = ledger.get("p1").unwrap();
    assert_eq!(p1.bet_count, 2);
    assert_eq!(p1.total_losses, 1);
    assert_eq!(p1.total_wins, 1);
    assert_eq!(p1.win_streak, 1);
    let expected_pnl = -25.0 + report.result_for("p1").unwrap().pnl;
    assert!((p1.cumulative_pnl - expected_pnl).abs() < 1e-9);
}

#[test]
fn test_snapshot_round_trip_keeps_titles() {
    let engine = SettlementEngine::default();
    let mut ledger = PlayerLedger::new();
    engine
        .settle_raw_into(
            &binary(&[("a", "yes", 10.0), ("b", "no", 30.0)]),
            &Outcome::from("yes"),
            &mut ledger,
        )
        .unwrap();

    let mut path = std::env::temp_dir();
    path.push(format!("wagerbook_it_ledger_{}.json", uuid::Uuid::new_v4()));
    let store = JsonFileStore::new(path);
    store.save(&ledger).unwrap();

    let mut restored = store.load().unwrap().unwrap();
    assert_eq!(restored.players(), ledger.players());
    assert_eq!(restored.titles(), ledger.titles());

    // Keep settling on top of the restored ledger.
    engine
        .settle_raw_into(
            &binary(&[("a", "yes", 10.0), ("b", "no", 30.0)]),
            &Outcome::from("yes"),
            &mut restored,
        )
        .unwrap();
    assert_eq!(restored.get("a").unwrap().win_streak, 2);

    store.delete().unwrap();
}
