//! The live match record and the partial updates merged into it.

use indexmap::IndexMap;
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::Value;
use thiserror::Error;
use utoipa::ToSchema;

/// Error raised when a patch cannot be merged into the record.
///
/// In practice this means a known field received a value of the wrong type,
/// e.g. `{"score": "five"}`.
#[derive(Debug, Error)]
#[error("cannot apply patch: {0}")]
pub struct MergeError(#[from] serde_json::Error);

/// Flat record describing the match currently on the board.
///
/// Known fields are typed; anything else the admin panel submits rides along
/// verbatim in [`MatchState::extra`] and survives round-trips through every
/// storage backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, ToSchema)]
pub struct MatchState {
    /// First team's display name.
    pub team1_name: String,
    /// First team's logo URL.
    pub team1_logo: String,
    /// Second team's display name.
    pub team2_name: String,
    /// Second team's logo URL.
    pub team2_logo: String,
    /// Runs scored by the batting side.
    pub score: u32,
    /// Wickets fallen.
    pub wickets: u32,
    /// Overs bowled. Admin panels tend to send whole overs as plain integers,
    /// so deserialization accepts any JSON number here.
    #[serde(deserialize_with = "lenient_f64")]
    pub overs: f64,
    /// Chase target, zero while the first innings is in progress.
    pub target: u32,
    /// Name of the first batter on the crease.
    pub bat1_name: String,
    /// Whether the first batter is on strike.
    pub bat1_active: bool,
    /// Name of the second batter on the crease.
    pub bat2_name: String,
    /// Whether the second batter is on strike.
    pub bat2_active: bool,
    /// Name of the current bowler.
    pub bowler_name: String,
    /// Free-form fields outside the known set.
    #[serde(flatten)]
    #[schema(value_type = Object)]
    pub extra: IndexMap<String, Value>,
}

impl MatchState {
    /// Hard-coded record used to seed an empty store.
    pub fn initial() -> Self {
        Self {
            team1_name: "India".to_owned(),
            team1_logo: "https://flagcdn.com/in.svg".to_owned(),
            team2_name: "Australia".to_owned(),
            team2_logo: "https://flagcdn.com/au.svg".to_owned(),
            score: 0,
            wickets: 0,
            overs: 0.0,
            target: 0,
            bat1_name: "Player 1".to_owned(),
            bat1_active: true,
            bat2_name: "Player 2".to_owned(),
            bat2_active: false,
            bowler_name: "Bowler".to_owned(),
            extra: IndexMap::new(),
        }
    }

    /// Shallow field-level merge: every key in `patch` overwrites the matching
    /// field, every field the patch does not mention is preserved.
    pub fn merged(&self, patch: &StatePatch) -> Result<Self, MergeError> {
        let mut base = serde_json::to_value(self)?;
        // A struct always serializes to a JSON object.
        if let Value::Object(fields) = &mut base {
            for (key, value) in patch.iter() {
                fields.insert(key.clone(), value.clone());
            }
        }
        Ok(serde_json::from_value(base)?)
    }
}

impl Default for MatchState {
    fn default() -> Self {
        Self::initial()
    }
}

/// Partial update submitted by the admin panel: a flat set of fields that
/// overwrite their stored counterparts.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, ToSchema)]
#[serde(transparent)]
#[schema(value_type = Object)]
pub struct StatePatch(IndexMap<String, Value>);

impl StatePatch {
    /// True when the patch carries no fields at all.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over the patched key/value pairs in submission order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }

    /// Drop the given keys from the patch.
    pub fn remove_keys(&mut self, keys: &[&str]) {
        for key in keys {
            self.0.shift_remove(*key);
        }
    }

    /// Check every known field against its expected type without writing anything.
    ///
    /// Backends that push patches to the database untouched (MongoDB `$set`)
    /// run this first so a half-typed patch can never be persisted.
    pub fn type_check(&self) -> Result<(), MergeError> {
        MatchState::initial().merged(self).map(|_| ())
    }
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    struct NumberVisitor;

    impl de::Visitor<'_> for NumberVisitor {
        type Value = f64;

        fn expecting(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            formatter.write_str("a number")
        }

        fn visit_f64<E: de::Error>(self, value: f64) -> Result<f64, E> {
            Ok(value)
        }

        fn visit_i64<E: de::Error>(self, value: i64) -> Result<f64, E> {
            Ok(value as f64)
        }

        fn visit_u64<E: de::Error>(self, value: u64) -> Result<f64, E> {
            Ok(value as f64)
        }
    }

    deserializer.deserialize_any(NumberVisitor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn patch(value: Value) -> StatePatch {
        serde_json::from_value(value).expect("patch literal")
    }

    #[test]
    fn merge_overwrites_only_supplied_fields() {
        let base = MatchState::initial();
        let merged = base.merged(&patch(json!({"score": 55}))).unwrap();
        assert_eq!(merged.score, 55);
        assert_eq!(merged.team1_name, base.team1_name);
        assert_eq!(merged.wickets, base.wickets);
        assert_eq!(merged.bat1_active, base.bat1_active);
    }

    #[test]
    fn disjoint_patches_accumulate_in_call_order() {
        let mut record = MatchState::initial();
        let updates = [
            json!({"score": 4, "wickets": 1}),
            json!({"overs": 3.4}),
            json!({"bowler_name": "A. Bowler"}),
        ];
        for update in updates {
            record = record.merged(&patch(update)).unwrap();
        }
        assert_eq!(record.score, 4);
        assert_eq!(record.wickets, 1);
        assert_eq!(record.overs, 3.4);
        assert_eq!(record.bowler_name, "A. Bowler");
        assert_eq!(record.target, 0);
    }

    #[test]
    fn later_values_win_for_the_same_key() {
        let record = MatchState::initial()
            .merged(&patch(json!({"score": 4})))
            .unwrap()
            .merged(&patch(json!({"score": 10})))
            .unwrap();
        assert_eq!(record.score, 10);
    }

    #[test]
    fn unknown_keys_are_kept_verbatim() {
        let merged = MatchState::initial()
            .merged(&patch(json!({"powerplay": true})))
            .unwrap();
        assert_eq!(merged.extra.get("powerplay"), Some(&json!(true)));

        let merged = merged.merged(&patch(json!({"score": 1}))).unwrap();
        assert_eq!(merged.extra.get("powerplay"), Some(&json!(true)));
    }

    #[test]
    fn wrong_type_for_known_field_is_rejected() {
        let base = MatchState::initial();
        assert!(base.merged(&patch(json!({"score": "five"}))).is_err());
        assert!(base.merged(&patch(json!({"score": -1}))).is_err());
        assert!(base.merged(&patch(json!({"bat1_active": "yes"}))).is_err());
    }

    #[test]
    fn type_check_matches_merge_outcome() {
        assert!(patch(json!({"score": "five"})).type_check().is_err());
        assert!(patch(json!({"score": 5, "note": "anything"})).type_check().is_ok());
    }

    #[test]
    fn whole_overs_may_arrive_as_integers() {
        let merged = MatchState::initial()
            .merged(&patch(json!({"overs": 12})))
            .unwrap();
        assert_eq!(merged.overs, 12.0);
    }

    #[test]
    fn record_serializes_flat() {
        let mut record = MatchState::initial();
        record.extra.insert("powerplay".to_owned(), json!(true));
        let value = serde_json::to_value(&record).unwrap();
        assert_eq!(value["team1_name"], json!("India"));
        assert_eq!(value["powerplay"], json!(true));
        assert!(value.get("extra").is_none());
    }

    #[test]
    fn reserved_keys_can_be_stripped() {
        let mut update = patch(json!({"_id": "x", "_rev": "1-abc", "score": 2}));
        update.remove_keys(&["_id", "_rev"]);
        assert_eq!(update.iter().count(), 1);
        assert!(!update.is_empty());
    }
}
