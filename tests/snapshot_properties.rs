use ledgerchat::snapshot::{derive_snapshot, snapshot_from_json, MAX_RECENT_DAYS};
use serde_json::{json, Map, Value};

#[test]
fn malformed_sources_never_produce_a_snapshot() {
    let inputs = [
        "",
        "null",
        "true",
        "12",
        "\"text\"",
        "[]",
        "[{\"banks\": []}]",
        "{\"banks\": 5}",
        "{\"assets\": \"lots\"}",
        "{\"debts\": {\"amount\": 1}}",
        "{\"passiveCats\": [{\"items\": {\"amount\": 3}}]}",
        "{\"subscriptions\": true}",
        "{\"banks\": [null]}",
        "{\"passiveCats\": [null]}",
        "{truncated",
    ];

    for raw in inputs {
        assert!(snapshot_from_json(raw).is_none(), "expected no snapshot for {raw:?}");
    }
}

#[test]
fn odd_but_valid_sources_still_produce_a_snapshot() {
    let inputs = [
        json!({}),
        json!({"banks": null, "assets": false, "debts": 0, "passiveCats": ""}),
        json!({"isa": "not an object", "settings": 7}),
        json!({"days": [1, 2, 3]}),
        json!({"banks": [5, "x", {"amount": {"nested": 1}}]}),
    ];

    for source in inputs {
        let snapshot = derive_snapshot(Some(&source))
            .unwrap_or_else(|| panic!("expected a snapshot for {source}"));
        assert_eq!(snapshot.totals.bank, 0.0);
        assert!(snapshot.recent_day_pl.is_empty());
    }
}

#[test]
fn recent_days_are_bounded_sorted_and_non_zero() {
    let mut days = Map::new();
    for month in 1..=12 {
        for day in 1..=28 {
            let total = if day % 3 == 0 {
                json!(0)
            } else if day % 5 == 0 {
                json!("not a number")
            } else {
                json!(day as f64 - 14.5)
            };
            days.insert(format!("2023-{month:02}-{day:02}"), json!({"total": total}));
        }
    }

    let snapshot = derive_snapshot(Some(&json!({"days": Value::Object(days)}))).expect("snapshot");
    let recent = &snapshot.recent_day_pl;

    assert_eq!(recent.len(), MAX_RECENT_DAYS);
    assert!(recent.iter().all(|d| d.total != 0.0));
    assert!(recent.windows(2).all(|w| w[0].date > w[1].date));
    assert_eq!(recent[0].date, "2023-12-28");
}

#[test]
fn fewer_than_thirty_days_are_all_kept() {
    let source = json!({
        "days": {
            "2024-02-01": {"total": 10},
            "2024-02-03": {"total": -4},
            "2024-02-02": {"total": 0}
        }
    });
    let snapshot = derive_snapshot(Some(&source)).expect("snapshot");
    let dates: Vec<_> = snapshot.recent_day_pl.iter().map(|d| d.date.as_str()).collect();
    assert_eq!(dates, ["2024-02-03", "2024-02-01"]);
}

#[test]
fn full_tracker_export() {
    let raw = r#"{
        "currency": "GBP",
        "banks": [{"name": "Current", "amount": 1520.40}, {"name": "Savings", "amount": "3000"}],
        "assets": [{"name": "Car", "amount": 8000}],
        "debts": [{"name": "Card", "amount": 450.60}],
        "passiveCats": [
            {"name": "Dividends", "items": [{"name": "VWRL", "amount": 35}]},
            {"name": "Interest", "items": [{"name": "Savings", "amount": "12.5"}]}
        ],
        "subscriptions": [{"name": "Music", "amount": 10.99}],
        "isa": {"principal": 20000, "rate": 4.5},
        "settings": {"compoundISA": false, "includeIsaInNet": true, "startOnMonday": false},
        "days": {
            "2024-05-01": {"total": 12.3},
            "2024-05-02": {"total": -7}
        }
    }"#;

    let snapshot = snapshot_from_json(raw).expect("snapshot");
    assert!((snapshot.totals.bank - 4520.40).abs() < 1e-9);
    assert_eq!(snapshot.totals.asset, 8000.0);
    assert!((snapshot.totals.debt - 450.60).abs() < 1e-9);
    assert!((snapshot.totals.passive_monthly - 47.5).abs() < 1e-9);
    assert!((snapshot.totals.isa_monthly - 75.0).abs() < 1e-9);
    assert!((snapshot.totals.isa_yearly - 900.0).abs() < 1e-9);
    assert_eq!(snapshot.subscriptions.len(), 1);
    assert!(snapshot.settings.include_isa_in_net);
    assert_eq!(snapshot.recent_day_pl[0].date, "2024-05-02");
    assert_eq!(snapshot.recent_day_pl[0].total, -7.0);
}
