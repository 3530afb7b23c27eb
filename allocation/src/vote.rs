use std::collections::BTreeMap;

use bounties_merkle_tree::Address;
use serde::{Deserialize, Serialize};

/// One governance vote as the Snapshot hub returns it. `choice` is a sparse
/// weighted-multi-choice vector: keys are 1-based choice indices, values are
/// positive weight points that need not sum to 100.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Vote {
    pub voter: Address,
    #[serde(with = "choice_map")]
    pub choice: BTreeMap<u32, f64>,
    pub vp: f64,
    pub created: i64,
}

impl Vote {
    /// Sum of all weight points across the voter's choices.
    pub fn choice_weight_sum(&self) -> f64 {
        self.choice.values().sum()
    }
}

/// A Snapshot proposal; `choices[i]` (0-based) corresponds to choice index
/// `i + 1`. Immutable once fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Proposal {
    pub id: String,
    pub created: i64,
    pub start: i64,
    pub end: i64,
    /// Block number the voting power snapshot was taken at
    #[serde(with = "snapshot_block")]
    pub snapshot: u64,
    pub choices: Vec<String>,
    pub space: String,
}

/// The hub serializes choice maps with string keys (`{"1": 100}`).
mod choice_map {
    use std::collections::BTreeMap;

    use serde::{de, ser::SerializeMap, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        choice: &BTreeMap<u32, f64>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(choice.len()))?;
        for (k, v) in choice {
            map.serialize_entry(&k.to_string(), v)?;
        }
        map.end()
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<u32, f64>, D::Error> {
        let raw = BTreeMap::<String, f64>::deserialize(deserializer)?;
        raw.into_iter()
            .map(|(k, v)| {
                k.parse::<u32>()
                    .map(|k| (k, v))
                    .map_err(|_| de::Error::custom(format!("invalid choice index: {k}")))
            })
            .collect()
    }
}

/// The hub reports the snapshot block as a string.
mod snapshot_block {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(block: &u64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&block.to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<u64, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Number(u64),
            Text(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Number(n) => Ok(n),
            Raw::Text(s) => s
                .parse()
                .map_err(|_| de::Error::custom(format!("invalid snapshot block: {s}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_vote_deserializes_hub_shape() {
        let json = r#"{
            "voter": "0xd533a949740bb3306d119cc777fa900ba034cd52",
            "choice": {"1": 50, "2": 50},
            "vp": 123.45,
            "created": 1700000000
        }"#;
        let vote: Vote = serde_json::from_str(json).unwrap();
        assert_eq!(vote.choice.len(), 2);
        assert_eq!(vote.choice[&1], 50.0);
        assert_eq!(vote.choice_weight_sum(), 100.0);
    }

    #[test]
    fn test_proposal_snapshot_block_as_string() {
        let json = r#"{
            "id": "0xabc",
            "created": 1,
            "start": 2,
            "end": 3,
            "snapshot": "19000000",
            "choices": ["a", "b"],
            "space": "sdcrv.eth"
        }"#;
        let proposal: Proposal = serde_json::from_str(json).unwrap();
        assert_eq!(proposal.snapshot, 19_000_000);
    }
}
