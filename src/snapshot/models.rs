use serde::{Deserialize, Serialize};
use serde_json::Value;

/// ISA descriptor carried through to the snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct IsaSummary {
    pub principal: f64,
    /// Annual rate in percent units, as stored (12 means 12%).
    pub rate: f64,
}

/// Display flags copied from the tracker settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotSettings {
    pub include_isa_in_net: bool,
    pub start_on_monday: bool,
}

/// Aggregated totals computed from the source collections.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotTotals {
    pub bank: f64,
    pub asset: f64,
    pub debt: f64,
    pub passive_monthly: f64,
    pub isa_monthly: f64,
    pub isa_yearly: f64,
}

/// One day's profit/loss result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayResult {
    pub date: String,
    pub total: f64,
}

/// Compact summary of a user's finances, shared with the model only when
/// the user opts in.
///
/// The collections are opaque pass-through copies of the tracker data; only
/// `totals` and `recent_day_pl` are derived.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FinanceSnapshot {
    pub currency: String,
    pub banks: Vec<Value>,
    pub assets: Vec<Value>,
    pub debts: Vec<Value>,
    pub passive_cats: Vec<Value>,
    pub subscriptions: Vec<Value>,
    pub isa: IsaSummary,
    pub settings: SnapshotSettings,
    pub totals: SnapshotTotals,
    #[serde(rename = "recentDayPL")]
    pub recent_day_pl: Vec<DayResult>,
}
