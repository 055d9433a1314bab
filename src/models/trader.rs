//! Leaderboard snapshot entries, normalized at the input boundary.
//!
//! Source naming varies (`winRate` / `win_rate`, `followerCount` / `copiers`),
//! so entries are read field by field from the raw JSON rather than through a
//! derived deserializer. The raw object is kept so that reports can re-emit
//! the trader exactly as it arrived.

use serde::ser::Error as _;
use serde::{Serialize, Serializer};
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::error::{Result, ScoringError};

use super::metrics::TraderMetrics;

const NAME_KEYS: &[&str] = &["nickName", "nickname", "display_name"];
const ROI_KEYS: &[&str] = &["roi"];
const PNL_KEYS: &[&str] = &["pnl"];
const WIN_RATE_KEYS: &[&str] = &["winRate", "win_rate"];
const LEVERAGE_KEYS: &[&str] = &["avgLeverage", "avg_leverage"];
const FOLLOWER_KEYS: &[&str] = &["followerCount", "copiers", "follower_count"];
const RANK_KEYS: &[&str] = &["rank"];

/// One leaderboard entry: normalized metrics plus the original object.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardTrader {
    #[serde(skip)]
    metrics: TraderMetrics,

    #[serde(flatten)]
    raw: Map<String, Value>,
}

impl LeaderboardTrader {
    /// Normalize one raw entry. `index` identifies nameless entries in errors.
    pub fn from_value(index: usize, value: &Value) -> Result<Self> {
        let Some(obj) = value.as_object() else {
            return Err(ScoringError::MalformedTrader {
                trader: format!("#{index}"),
                field: "entry".to_string(),
                reason: format!("expected an object, got {}", kind(value)),
            });
        };

        let name = NAME_KEYS
            .iter()
            .find_map(|k| obj.get(*k).and_then(Value::as_str))
            .map(str::to_string)
            .unwrap_or_else(|| format!("#{index}"));

        let metrics = TraderMetrics {
            roi: number(obj, &name, ROI_KEYS)?,
            pnl: number(obj, &name, PNL_KEYS)?,
            win_rate: number(obj, &name, WIN_RATE_KEYS)?,
            avg_leverage: number(obj, &name, LEVERAGE_KEYS)?,
            followers: count(obj, &name, FOLLOWER_KEYS)?,
            rank: count(obj, &name, RANK_KEYS)?,
            ..TraderMetrics::new(name)
        };

        Ok(Self {
            metrics,
            raw: obj.clone(),
        })
    }

    pub fn metrics(&self) -> &TraderMetrics {
        &self.metrics
    }

    /// The entry as it appeared in the snapshot.
    pub fn raw(&self) -> &Map<String, Value> {
        &self.raw
    }
}

impl AsRef<TraderMetrics> for LeaderboardTrader {
    fn as_ref(&self) -> &TraderMetrics {
        &self.metrics
    }
}

impl From<TraderMetrics> for LeaderboardTrader {
    fn from(metrics: TraderMetrics) -> Self {
        let raw = match serde_json::to_value(&metrics) {
            Ok(Value::Object(map)) => map,
            _ => Map::new(),
        };
        Self { metrics, raw }
    }
}

/// A parsed leaderboard snapshot.
#[derive(Debug, Clone)]
pub struct LeaderboardSnapshot {
    /// Snapshot metadata, passed through unchanged into reports
    pub metadata: Value,

    /// Entries that normalized cleanly, in snapshot order
    pub traders: Vec<LeaderboardTrader>,

    /// Entries dropped for data-shape problems
    pub skipped: Vec<ScoringError>,
}

impl LeaderboardSnapshot {
    /// Parse a snapshot of the shape `{ metadata, data: { data: [...] } }`.
    ///
    /// A missing or non-array trader list fails the whole snapshot. A bad
    /// entry is logged and skipped; the rest of the batch continues.
    pub fn parse(snapshot: &Value) -> Result<Self> {
        let entries = snapshot
            .get("data")
            .and_then(|d| d.get("data"))
            .and_then(Value::as_array)
            .ok_or(ScoringError::MissingTraderList)?;

        let metadata = snapshot
            .get("metadata")
            .cloned()
            .unwrap_or_else(|| Value::Object(Map::new()));

        let mut traders = Vec::with_capacity(entries.len());
        let mut skipped = Vec::new();

        for (index, entry) in entries.iter().enumerate() {
            match LeaderboardTrader::from_value(index, entry) {
                Ok(trader) => traders.push(trader),
                Err(e) => {
                    warn!(error = %e, "Skipping malformed leaderboard entry");
                    skipped.push(e);
                }
            }
        }

        debug!(
            traders = traders.len(),
            skipped = skipped.len(),
            "Parsed leaderboard snapshot"
        );

        Ok(Self {
            metadata,
            traders,
            skipped,
        })
    }

    /// Build a snapshot from already-normalized metrics.
    pub fn from_metrics(metadata: Value, traders: Vec<TraderMetrics>) -> Self {
        Self {
            metadata,
            traders: traders.into_iter().map(LeaderboardTrader::from).collect(),
            skipped: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.traders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.traders.is_empty()
    }
}

/// Serialize `base` as one JSON object with every field of `overlay` written
/// over it. Keys of `base` that `overlay` also sets are replaced, never
/// repeated.
pub(crate) fn serialize_merged<S, B, O>(serializer: S, base: &B, overlay: &O) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
    B: Serialize + ?Sized,
    O: Serialize + ?Sized,
{
    let mut merged = object(base).map_err(S::Error::custom)?;
    merged.extend(object(overlay).map_err(S::Error::custom)?);
    merged.serialize(serializer)
}

fn object<T: Serialize + ?Sized>(value: &T) -> std::result::Result<Map<String, Value>, String> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(format!("expected an object, got {}", kind(&other))),
        Err(e) => Err(e.to_string()),
    }
}

/// A non-negative integer, or a float with no fractional part (`300.0`).
pub(crate) fn as_count(value: &Value) -> Option<u64> {
    if let Some(n) = value.as_u64() {
        return Some(n);
    }
    match value.as_f64() {
        Some(f) if f >= 0.0 && f.fract() == 0.0 && f <= u64::MAX as f64 => Some(f as u64),
        _ => None,
    }
}

/// First present, non-null value among `keys`, as a float.
fn number(obj: &Map<String, Value>, trader: &str, keys: &[&str]) -> Result<Option<f64>> {
    let Some((key, value)) = lookup(obj, keys) else {
        return Ok(None);
    };
    value
        .as_f64()
        .map(Some)
        .ok_or_else(|| malformed(trader, key, "a number", value))
}

/// First present, non-null value among `keys`, as a non-negative integer.
/// Integral floats (`300.0`) are accepted.
fn count(obj: &Map<String, Value>, trader: &str, keys: &[&str]) -> Result<Option<u64>> {
    let Some((key, value)) = lookup(obj, keys) else {
        return Ok(None);
    };
    as_count(value)
        .map(Some)
        .ok_or_else(|| malformed(trader, key, "a non-negative integer", value))
}

fn lookup<'a>(obj: &'a Map<String, Value>, keys: &[&'a str]) -> Option<(&'a str, &'a Value)> {
    keys.iter()
        .find_map(|k| obj.get(*k).filter(|v| !v.is_null()).map(|v| (*k, v)))
}

fn malformed(trader: &str, field: &str, expected: &str, got: &Value) -> ScoringError {
    ScoringError::MalformedTrader {
        trader: trader.to_string(),
        field: field.to_string(),
        reason: format!("expected {expected}, got {}", kind(got)),
    }
}

fn kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_camel_case_entry() {
        let entry = json!({
            "nickName": "Moon",
            "roi": 45.0,
            "pnl": 12000.5,
            "winRate": 65.0,
            "avgLeverage": 2.5,
            "followerCount": 300,
            "rank": 4,
            "encryptedUid": "abc"
        });
        let trader = LeaderboardTrader::from_value(0, &entry).unwrap();
        let m = trader.metrics();

        assert_eq!(m.display_name, "Moon");
        assert_eq!(m.roi, Some(45.0));
        assert_eq!(m.win_rate, Some(65.0));
        assert_eq!(m.avg_leverage, Some(2.5));
        assert_eq!(m.followers, Some(300));
        assert_eq!(m.rank, Some(4));
        assert_eq!(trader.raw()["encryptedUid"], "abc");
    }

    #[test]
    fn test_snake_case_aliases() {
        let entry = json!({ "nickName": "x", "win_rate": 58, "avg_leverage": 1.5, "copiers": 120.0 });
        let m = LeaderboardTrader::from_value(0, &entry).unwrap().metrics().clone();

        assert_eq!(m.win_rate, Some(58.0));
        assert_eq!(m.avg_leverage, Some(1.5));
        assert_eq!(m.followers, Some(120));
        assert_eq!(m.roi, None);
    }

    #[test]
    fn test_wrong_type_names_trader_and_field() {
        let entry = json!({ "nickName": "Bad", "roi": "lots" });
        let err = LeaderboardTrader::from_value(3, &entry).unwrap_err();

        match err {
            ScoringError::MalformedTrader { trader, field, .. } => {
                assert_eq!(trader, "Bad");
                assert_eq!(field, "roi");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_nameless_entry_uses_index() {
        let err = LeaderboardTrader::from_value(7, &json!({ "followerCount": -3 })).unwrap_err();
        assert!(err.to_string().contains("#7"));
    }

    #[test]
    fn test_snapshot_skips_bad_entries() {
        let snapshot = json!({
            "metadata": { "period": "MONTHLY" },
            "data": { "data": [
                { "nickName": "a", "roi": 30 },
                "not an object",
                { "nickName": "c", "winRate": [] },
                { "nickName": "d", "roi": 50 }
            ]}
        });
        let parsed = LeaderboardSnapshot::parse(&snapshot).unwrap();

        assert_eq!(parsed.len(), 2);
        assert_eq!(parsed.skipped.len(), 2);
        assert_eq!(parsed.metadata["period"], "MONTHLY");
        assert_eq!(parsed.traders[1].metrics().display_name, "d");
    }

    #[test]
    fn test_snapshot_without_trader_list() {
        let err = LeaderboardSnapshot::parse(&json!({ "metadata": {} })).unwrap_err();
        assert_eq!(err, ScoringError::MissingTraderList);
    }

    #[test]
    fn test_merged_overlay_replaces_keys() {
        #[derive(Serialize)]
        struct Overlay {
            profile: &'static str,
        }

        let trader = LeaderboardTrader::from_value(0, &json!({ "nickName": "Moon", "profile": "vip" })).unwrap();
        let mut out = Vec::new();
        serialize_merged(&mut serde_json::Serializer::new(&mut out), &trader, &Overlay { profile: "moderate" }).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert_eq!(text.matches("\"profile\"").count(), 1);
        assert_eq!(serde_json::from_str::<Value>(&text).unwrap()["profile"], "moderate");
    }

    #[test]
    fn test_as_count_accepts_integral_floats() {
        assert_eq!(as_count(&json!(120)), Some(120));
        assert_eq!(as_count(&json!(120.0)), Some(120));
        assert_eq!(as_count(&json!(120.5)), None);
        assert_eq!(as_count(&json!(-1)), None);
        assert_eq!(as_count(&json!("120")), None);
    }

    #[test]
    fn test_raw_entry_round_trips() {
        let entry = json!({ "nickName": "Moon", "roi": 45.0, "extra": { "k": 1 } });
        let trader = LeaderboardTrader::from_value(0, &entry).unwrap();
        assert_eq!(serde_json::to_value(&trader).unwrap(), entry);
    }
}
