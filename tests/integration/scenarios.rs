//! Worked settlement scenarios for each market variant, fed through the
//! validator from JSON the way a REST layer would hand them over.

use serde_json::json;

use wagerbook::engine::validator::RawMarket;
use wagerbook::engine::SettlementEngine;
use wagerbook::ledger::PlayerLedger;
use wagerbook::types::{Outcome, PoolStatus, SettlementError, ValidationError};

fn raw(value: serde_json::Value) -> RawMarket {
    serde_json::from_value(value).unwrap()
}

fn close(a: f64, b: f64) -> bool {
    (a - b).abs() < 1e-9
}

#[test]
fn test_binary_scenario() {
    let market = raw(json!({
        "id": "binary-1",
        "variant": "binary",
        "default_fee": 0.02,
        "wagers": [
            {"bettor_id": "p1", "name": "Alice", "choice": "yes", "amount": 25},
            {"bettor_id": "p2", "name": "Bob",   "choice": "no",  "amount": 35},
            {"bettor_id": "p3", "name": "Cara",  "choice": "YES", "amount": 15},
            {"bettor_id": "p4", "name": "Dan",   "choice": "no",  "amount": 45}
        ]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::from("yes"))
        .unwrap();

    assert_eq!(report.total_pool, 120.0);
    assert_eq!(report.winning_pool, 40.0);

    let payoffs: Vec<f64> = report.results.iter().map(|r| r.payoff).collect();
    assert!(close(payoffs[0], 73.5));
    assert_eq!(payoffs[1], 0.0);
    assert!(close(payoffs[2], 44.1));
    assert_eq!(payoffs[3], 0.0);

    assert!(close(report.results[0].pnl, 48.5));
    assert!(close(report.results[2].pnl, 29.1));

    for r in &report.results {
        assert_eq!(r.pnl, r.payoff - r.amount);
    }
    assert!(close(report.total_payoff, 120.0 * 0.98));
}

#[test]
fn test_multi_option_scenario() {
    let market = raw(json!({
        "variant": "multi_option",
        "default_fee": 0.02,
        "wagers": [
            {"bettor_id": "p1", "choice": "A", "amount": 10},
            {"bettor_id": "p2", "choice": "B", "amount": 5},
            {"bettor_id": "p3", "choice": "C", "amount": 20},
            {"bettor_id": "p4", "choice": "B", "amount": 10},
            {"bettor_id": "p5", "choice": "A", "amount": 15}
        ]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::from("B"))
        .unwrap();

    assert_eq!(report.total_pool, 60.0);
    assert_eq!(report.winning_pool, 15.0);
    for r in &report.results {
        if r.bettor_id == "p2" || r.bettor_id == "p4" {
            assert!(close(r.payoff, r.amount * 3.92));
            assert!(r.did_win);
        } else {
            assert_eq!(r.payoff, 0.0);
            assert!(!r.did_win);
        }
    }
}

#[test]
fn test_target_proximity_scenario() {
    let market = raw(json!({
        "variant": "target_proximity",
        "default_fee": 0.02,
        "decay_scale": 3.0,
        "wagers": [
            {"bettor_id": "p1", "guess": 11, "amount": 20},
            {"bettor_id": "p2", "guess": 14, "amount": 20},
            {"bettor_id": "p3", "guess": 20, "amount": 20},
            {"bettor_id": "p4", "guess": 7,  "amount": 20}
        ]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::Target(12.0))
        .unwrap();

    let errors: Vec<f64> = report
        .results
        .iter()
        .map(|r| r.proximity.unwrap().error)
        .collect();
    assert_eq!(errors, vec![1.0, 2.0, 8.0, 5.0]);

    let proximities = [1.0f64, 2.0, 8.0, 5.0].map(|e| (-e / 3.0).exp());
    let weight_sum: f64 = proximities.iter().map(|q| 20.0 * q).sum();
    for (r, q) in report.results.iter().zip(proximities) {
        let detail = r.proximity.unwrap();
        assert!(close(detail.proximity, q));
        assert!(close(detail.effective_weight, 20.0 * q));
        assert!(close(r.payoff, 80.0 * 0.98 * (20.0 * q) / weight_sum));
    }
    assert!(close(report.total_payoff, 80.0 * 0.98));
}

#[test]
fn test_target_proximity_default_buy_in() {
    let market = raw(json!({
        "variant": "target_proximity",
        "default_fee": 0.02,
        "default_buy_in": 20,
        "wagers": [
            {"bettor_id": "p1", "guess": 11},
            {"bettor_id": "p2", "guess": "14"}
        ]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::from("12"))
        .unwrap();
    assert_eq!(report.total_pool, 40.0);
    assert!(close(report.total_payoff, 40.0 * 0.98));
}

#[test]
fn test_nobody_picked_outcome_house_keeps_pool() {
    let market = raw(json!({
        "variant": "multi_option",
        "default_fee": 0.02,
        "wagers": [
            {"bettor_id": "p1", "choice": "A", "amount": 10},
            {"bettor_id": "p2", "choice": "B", "amount": 30}
        ]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::from("C"))
        .unwrap();
    assert_eq!(report.status, PoolStatus::NoWinningStake);
    assert_eq!(report.total_payoff, 0.0);
    assert_eq!(report.house_take(), 40.0);
    assert!(report.results.iter().all(|r| r.payoff == 0.0 && r.pnl == -r.amount));
}

#[test]
fn test_far_guesses_underflow_to_zero() {
    let market = raw(json!({
        "variant": "target_proximity",
        "default_fee": 0.0,
        "decay_scale": 0.001,
        "wagers": [
            {"bettor_id": "p1", "guess": 1000, "amount": 5},
            {"bettor_id": "p2", "guess": -1000, "amount": 5}
        ]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::Target(0.0))
        .unwrap();
    assert_eq!(report.winning_pool, 0.0);
    assert_eq!(report.status, PoolStatus::NoWinningStake);
    assert!(report.results.iter().all(|r| r.payoff == 0.0));
}

#[test]
fn test_rejected_market_touches_nothing() {
    let market = raw(json!({
        "variant": "binary",
        "wagers": [
            {"bettor_id": "p1", "choice": "yes", "amount": 10, "fee": 0.02},
            {"bettor_id": "p2", "choice": "no", "amount": 10}
        ]
    }));

    let mut ledger = PlayerLedger::new();
    let err = SettlementEngine::default()
        .settle_raw_into(&market, &Outcome::from("yes"), &mut ledger)
        .unwrap_err();

    assert_eq!(
        err,
        SettlementError::Validation(ValidationError::MissingFee {
            bettor_id: "p2".into()
        })
    );
    assert!(ledger.is_empty());
}

#[test]
fn test_report_serializes_with_diagnostics() {
    let market = raw(json!({
        "variant": "target_proximity",
        "default_fee": 0.02,
        "wagers": [{"bettor_id": "p1", "guess": 11, "amount": 20}]
    }));

    let report = SettlementEngine::default()
        .settle_raw(&market, &Outcome::Target(12.0))
        .unwrap();
    let value = serde_json::to_value(&report).unwrap();
    let first = &value["results"][0];
    assert_eq!(first["proximity"]["error"], json!(1.0));
    assert!(first["proximity"]["effective_weight"].is_number());
    assert_eq!(value["variant"], json!("target_proximity"));
    assert_eq!(value["status"], json!("distributed"));
}
