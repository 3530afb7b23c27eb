use indexmap::IndexMap;
use tracing::info;

use crate::error::AllocationError;

/// A bribe resolved to the proposal choice it rewards.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResolvedBribe {
    /// 1-based choice index within the proposal
    pub choice: u32,
    /// Reward to distribute across this gauge's voters, in human token units
    pub amount: f64,
}

/// Match each reported gauge (full address) against the proposal's gauge
/// choices (truncated addresses): the full address must contain the
/// truncated key as a substring, first match wins. Every reported gauge must
/// resolve, otherwise the whole round is wrong and we refuse to continue.
pub fn resolve_bribes(
    gauge_choices: &IndexMap<String, usize>,
    rewards: &[(String, f64)],
) -> Result<IndexMap<String, ResolvedBribe>, AllocationError> {
    let mut resolved: IndexMap<String, ResolvedBribe> = IndexMap::new();
    for (gauge, amount) in rewards {
        let gauge = gauge.to_lowercase();
        let matched = gauge_choices
            .iter()
            .find(|(truncated, _)| gauge.contains(truncated.to_lowercase().as_str()));
        if let Some((_, choice)) = matched {
            resolved.insert(
                gauge,
                ResolvedBribe {
                    choice: *choice as u32,
                    amount: *amount,
                },
            );
        }
    }

    if resolved.len() != rewards.len() {
        return Err(AllocationError::ResolutionError(format!(
            "matched {} of {} reported gauges to a proposal choice",
            resolved.len(),
            rewards.len()
        )));
    }
    info!("resolved {} bribed gauges", resolved.len());
    Ok(resolved)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn gauge_choices(entries: &[(&str, usize)]) -> IndexMap<String, usize> {
        entries
            .iter()
            .map(|(k, v)| (k.to_string(), *v))
            .collect()
    }

    #[test]
    fn test_resolves_by_containment() {
        let choices = gauge_choices(&[("0x26f7", 1), ("0x92d9", 2)]);
        let rewards = vec![
            ("0x26F7786de3E6D9Bd37Fcf47BE6F2bC455a21b74A".to_string(), 100.0),
            ("0x92d956C1F89a2c71efEEB4Bac45d02016bdD2408".to_string(), 50.0),
        ];

        let resolved = resolve_bribes(&choices, &rewards).unwrap();
        assert_eq!(resolved.len(), 2);
        let first = resolved["0x26f7786de3e6d9bd37fcf47be6f2bc455a21b74a"];
        assert_eq!(first.choice, 1);
        assert_eq!(first.amount, 100.0);
        assert_eq!(resolved["0x92d956c1f89a2c71efeeb4bac45d02016bdd2408"].choice, 2);
    }

    #[test]
    fn test_unmatched_gauge_is_an_error() {
        let choices = gauge_choices(&[("0x26f7", 1)]);
        let rewards = vec![
            ("0x26F7786de3E6D9Bd37Fcf47BE6F2bC455a21b74A".to_string(), 100.0),
            ("0xdeadbeefdeadbeefdeadbeefdeadbeefdeadbeef".to_string(), 50.0),
        ];

        let err = resolve_bribes(&choices, &rewards).unwrap_err();
        assert!(matches!(err, AllocationError::ResolutionError(_)));
    }

    #[test]
    fn test_first_match_wins() {
        // Two truncated keys both contained in the full address: the earlier
        // proposal choice takes it.
        let choices = gauge_choices(&[("0x26f7", 1), ("0x26f7786d", 2)]);
        let rewards = vec![(
            "0x26F7786de3E6D9Bd37Fcf47BE6F2bC455a21b74A".to_string(),
            10.0,
        )];

        let resolved = resolve_bribes(&choices, &rewards).unwrap();
        assert_eq!(resolved["0x26f7786de3e6d9bd37fcf47be6f2bc455a21b74a"].choice, 1);
    }
}
