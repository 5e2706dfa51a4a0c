use serde_json::{Map, Value};
use tracing::debug;

use super::coerce::{is_truthy, to_number};
use super::models::{DayResult, FinanceSnapshot, IsaSummary, SnapshotSettings, SnapshotTotals};

/// Default currency when the tracker does not record one.
pub const DEFAULT_CURRENCY: &str = "GBP";

/// Maximum number of daily results carried in a snapshot.
pub const MAX_RECENT_DAYS: usize = 30;

#[derive(Debug, thiserror::Error)]
enum ShapeError {
    #[error("field `{0}` is not a list")]
    NotAList(&'static str),
    #[error("field `{0}` contains a null entry")]
    NullEntry(&'static str),
}

/// Derives a snapshot from an already-parsed tracker blob.
///
/// Returns `None` when the source is absent, is not a JSON object, or has a
/// shape that cannot be aggregated. Never panics.
pub fn derive_snapshot(source: Option<&Value>) -> Option<FinanceSnapshot> {
    let root = source?.as_object()?;
    match build(root) {
        Ok(snapshot) => Some(snapshot),
        Err(err) => {
            debug!(error = %err, "finance data has an unexpected shape; no snapshot");
            None
        }
    }
}

/// Parses raw tracker JSON and derives a snapshot from it.
pub fn snapshot_from_json(raw: &str) -> Option<FinanceSnapshot> {
    match serde_json::from_str::<Value>(raw) {
        Ok(value) => derive_snapshot(Some(&value)),
        Err(err) => {
            debug!(error = %err, "finance data is not valid JSON; no snapshot");
            None
        }
    }
}

fn build(root: &Map<String, Value>) -> Result<FinanceSnapshot, ShapeError> {
    let banks = collection(root, "banks")?;
    let assets = collection(root, "assets")?;
    let debts = collection(root, "debts")?;
    let passive_cats = collection(root, "passiveCats")?;
    let subscriptions = collection(root, "subscriptions")?;
    for (key, records) in [
        ("banks", &banks),
        ("assets", &assets),
        ("debts", &debts),
        ("passiveCats", &passive_cats),
    ] {
        non_null(records, key)?;
    }

    let passive_monthly = passive_cats.iter().try_fold(0.0, |acc, cat| {
        let items = match cat.get("items") {
            Some(Value::Array(items)) => sum_amounts(non_null(items, "passiveCats[].items")?),
            other if !is_truthy(other) => 0.0,
            _ => return Err(ShapeError::NotAList("passiveCats[].items")),
        };
        Ok(acc + items)
    })?;

    let isa = root.get("isa");
    let principal = to_number(isa.and_then(|i| i.get("principal")));
    let rate_pct = to_number(isa.and_then(|i| i.get("rate")));

    let settings = root.get("settings");
    let flag = |name: &str| is_truthy(settings.and_then(|s| s.get(name)));
    let projection = IsaProjection::new(principal, rate_pct, flag("compoundISA"));

    let currency = match root.get("currency") {
        Some(Value::String(s)) if !s.is_empty() => s.clone(),
        _ => DEFAULT_CURRENCY.to_string(),
    };

    let totals = SnapshotTotals {
        bank: sum_amounts(&banks),
        asset: sum_amounts(&assets),
        debt: sum_amounts(&debts),
        passive_monthly,
        isa_monthly: projection.monthly(),
        isa_yearly: projection.yearly(),
    };

    Ok(FinanceSnapshot {
        currency,
        banks,
        assets,
        debts,
        passive_cats,
        subscriptions,
        isa: IsaSummary {
            principal,
            rate: rate_pct,
        },
        settings: SnapshotSettings {
            include_isa_in_net: flag("includeIsaInNet"),
            start_on_monday: flag("startOnMonday"),
        },
        totals,
        recent_day_pl: recent_day_results(root.get("days")),
    })
}

/// Reads a list-valued field. Missing or falsy values are an empty list.
fn collection(root: &Map<String, Value>, key: &'static str) -> Result<Vec<Value>, ShapeError> {
    match root.get(key) {
        Some(Value::Array(items)) => Ok(items.clone()),
        other if !is_truthy(other) => Ok(Vec::new()),
        _ => Err(ShapeError::NotAList(key)),
    }
}

/// Records are read field by field, which a `null` record cannot be.
/// Other non-object records simply have no fields.
fn non_null<'v>(items: &'v [Value], key: &'static str) -> Result<&'v [Value], ShapeError> {
    if items.iter().any(Value::is_null) {
        return Err(ShapeError::NullEntry(key));
    }
    Ok(items)
}

/// Sums the coerced `amount` field of each record.
pub fn sum_amounts(records: &[Value]) -> f64 {
    records
        .iter()
        .map(|record| to_number(record.get("amount")))
        .sum()
}

/// ISA interest projection over a yearly percentage rate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IsaProjection {
    principal: f64,
    rate: f64,
    compound: bool,
}

impl IsaProjection {
    pub fn new(principal: f64, rate_pct: f64, compound: bool) -> Self {
        Self {
            principal,
            rate: rate_pct / 100.0,
            compound,
        }
    }

    /// Effective monthly rate: the twelfth root for compounding, a simple
    /// twelfth otherwise.
    pub fn monthly_rate(&self) -> f64 {
        if self.compound {
            (1.0 + self.rate).powf(1.0 / 12.0) - 1.0
        } else {
            self.rate / 12.0
        }
    }

    pub fn monthly(&self) -> f64 {
        self.principal * self.monthly_rate()
    }

    pub fn yearly(&self) -> f64 {
        let growth = if self.compound {
            (1.0 + self.monthly_rate()).powi(12) - 1.0
        } else {
            self.rate
        };
        self.principal * growth
    }
}

/// Most recent non-zero daily results, newest first.
///
/// Keys are compared as plain strings, which orders correctly only for
/// zero-padded ISO dates. Anything other than an object yields no results.
fn recent_day_results(days: Option<&Value>) -> Vec<DayResult> {
    let Some(days) = days.and_then(Value::as_object) else {
        if is_truthy(days) {
            debug!("`days` is not an object; skipping recent results");
        }
        return Vec::new();
    };

    let mut dates: Vec<&String> = days.keys().collect();
    dates.sort_by(|a, b| b.cmp(a));

    dates
        .into_iter()
        .filter_map(|date| {
            let total = to_number(days.get(date).and_then(|day| day.get("total")));
            (total != 0.0).then(|| DayResult {
                date: date.clone(),
                total,
            })
        })
        .take(MAX_RECENT_DAYS)
        .collect()
}
