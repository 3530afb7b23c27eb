use indexmap::IndexMap;

use crate::error::AllocationError;

/// Labels carrying these markers are bookkeeping rows in the proposal, not
/// gauges.
pub const EXCLUDED_LABELS: [&str; 3] = ["Current Weights", "Paste", "Total Percentage"];

/// How a space embeds a gauge address in its proposal choice labels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChoiceRule {
    /// `"Pool Name - 0x26F7…b74A"`: the address prefix sits between
    /// `" - 0x"` and an ellipsis (`…` or literal `...`).
    Truncated,
    /// pendle labels: `"Pool Name - 0x26F7786de3E6 - something"`, the address
    /// sits between `" - "` and the next `-`.
    Dashed,
}

/// What to do with a label that has the separator but no terminator. The
/// historical behavior is to skip such labels silently; `Fail` surfaces them
/// instead, since skipping may mask malformed proposal data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnmatchedChoicePolicy {
    #[default]
    Skip,
    Fail,
}

/// Map each choice label to `lowercased truncated gauge address -> 1-based
/// choice index`. A label without the separator is always an error; a label
/// without the terminator follows `policy` (Truncated rule only — the dashed
/// rule has no skip path).
pub fn gauge_choice_map(
    choices: &[String],
    rule: ChoiceRule,
    policy: UnmatchedChoicePolicy,
) -> Result<IndexMap<String, usize>, AllocationError> {
    let mut map = IndexMap::new();
    for (i, label) in choices.iter().enumerate() {
        if EXCLUDED_LABELS.iter().any(|marker| label.contains(marker)) {
            continue;
        }
        let address = match rule {
            ChoiceRule::Truncated => match truncated_address(label) {
                Ok(address) => address,
                Err(err) => match (err, policy) {
                    (LabelError::NoSeparator, _) => {
                        return Err(AllocationError::ParseError(label.clone()))
                    }
                    (LabelError::NoTerminator, UnmatchedChoicePolicy::Skip) => continue,
                    (LabelError::NoTerminator, UnmatchedChoicePolicy::Fail) => {
                        return Err(AllocationError::ParseError(label.clone()))
                    }
                },
            },
            ChoiceRule::Dashed => {
                dashed_address(label).map_err(|_| AllocationError::ParseError(label.clone()))?
            }
        };
        map.insert(address, i + 1);
    }
    Ok(map)
}

enum LabelError {
    NoSeparator,
    NoTerminator,
}

fn truncated_address(label: &str) -> Result<String, LabelError> {
    const SEPARATOR: &str = " - 0x";
    let start = label.find(SEPARATOR).ok_or(LabelError::NoSeparator)?;
    let rest = &label[start + SEPARATOR.len()..];
    let end = rest
        .find('…')
        .or_else(|| rest.find("..."))
        .ok_or(LabelError::NoTerminator)?;
    Ok(format!("0x{}", rest[..end].to_lowercase()))
}

fn dashed_address(label: &str) -> Result<String, LabelError> {
    const SEPARATOR: &str = " - ";
    let start = label.find(SEPARATOR).ok_or(LabelError::NoSeparator)?;
    let rest = &label[start + SEPARATOR.len()..];
    let end = rest.find('-').ok_or(LabelError::NoTerminator)?;
    Ok(rest[..end].trim().to_lowercase())
}
