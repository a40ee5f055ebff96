use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::dao::models::{StatisticKey, StoredValue};

/// Identifier of the single document holding every statistic.
pub const STATISTICS_DOC_ID: &str = "statistics::aggregate";

/// The CouchDB document storing every statistic under its key name.
///
/// Unknown keys are kept untouched so documents written by other tools survive an update.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CouchStatisticsDocument {
    /// Always [`STATISTICS_DOC_ID`].
    #[serde(rename = "_id")]
    pub id: String,
    /// Revision CouchDB requires on update; absent before the first write.
    #[serde(rename = "_rev", skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    /// Stored values keyed by [`StatisticKey::as_str`].
    #[serde(default)]
    pub values: BTreeMap<String, StoredValue>,
}

impl CouchStatisticsDocument {
    /// Document used when none exists yet.
    pub fn empty() -> Self {
        Self {
            id: STATISTICS_DOC_ID.to_string(),
            rev: None,
            values: BTreeMap::new(),
        }
    }

    /// Value stored under `key`.
    pub fn value(&self, key: StatisticKey) -> Option<StoredValue> {
        self.values.get(key.as_str()).copied()
    }

    /// Overwrite the given entries, keeping the revision so CouchDB accepts the update.
    pub fn merge(&mut self, entries: Vec<(StatisticKey, StoredValue)>) {
        for (key, value) in entries {
            self.values.insert(key.as_str().to_string(), value);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn stored_document() -> CouchStatisticsDocument {
        serde_json::from_value(json!({
            "_id": STATISTICS_DOC_ID,
            "_rev": "3-9f2c",
            "values": {
                "gamesCount": { "integer": 4 },
                "totalQuestionsAsked": { "integer": 40 },
                "legacyStreak": { "integer": 2 }
            }
        }))
        .unwrap()
    }

    #[test]
    fn stored_document_maps_known_keys() {
        let doc = stored_document();

        assert_eq!(doc.rev.as_deref(), Some("3-9f2c"));
        assert_eq!(doc.value(StatisticKey::GamesCount), Some(StoredValue::Integer(4)));
        assert_eq!(
            doc.value(StatisticKey::TotalQuestionsAsked),
            Some(StoredValue::Integer(40))
        );
        assert_eq!(doc.value(StatisticKey::BestGameDate), None);
    }

    #[test]
    fn update_keeps_revision_and_foreign_keys() {
        let mut doc = stored_document();
        let played_at = std::time::UNIX_EPOCH + std::time::Duration::from_secs(1_700_000_000);
        doc.merge(vec![
            (StatisticKey::GamesCount, StoredValue::Integer(5)),
            (StatisticKey::BestGameDate, StoredValue::Timestamp(played_at)),
        ]);

        let body = serde_json::to_value(&doc).unwrap();
        assert_eq!(body["_id"], STATISTICS_DOC_ID);
        assert_eq!(body["_rev"], "3-9f2c");
        assert_eq!(body["values"]["gamesCount"]["integer"], 5);
        assert_eq!(body["values"]["totalQuestionsAsked"]["integer"], 40);
        assert_eq!(body["values"]["legacyStreak"]["integer"], 2);

        let reread: CouchStatisticsDocument = serde_json::from_value(body).unwrap();
        assert_eq!(
            reread.value(StatisticKey::BestGameDate),
            Some(StoredValue::Timestamp(played_at))
        );
    }

    #[test]
    fn first_write_has_no_revision() {
        let mut doc: CouchStatisticsDocument =
            serde_json::from_value(json!({ "_id": STATISTICS_DOC_ID })).unwrap();
        assert!(doc.values.is_empty());

        doc.merge(vec![(StatisticKey::GamesCount, StoredValue::Integer(1))]);
        let body = serde_json::to_value(&doc).unwrap();
        assert!(body.get("_rev").is_none());
        assert_eq!(body["values"]["gamesCount"]["integer"], 1);
    }
}
