use std::{fs::File, io::Read, path::Path, path::PathBuf, result};

use csv::StringRecord;
use serde::{Deserialize, Serialize};

use crate::error::MerkleTreeError;

pub type Result<T> = result::Result<T, MerkleTreeError>;

/// One row of the weekly bribe report: a gauge and the reward to distribute
/// across its voters. The report is semicolon-delimited and header casing
/// varies between exports, so headers are lowercased before deserializing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BribeCsvEntry {
    /// Protocol the gauge belongs to (curve, balancer, frax, ...)
    pub protocol: String,
    /// Full gauge address; proposal choice labels carry a truncated form
    #[serde(rename = "gauge address")]
    pub gauge_address: String,
    /// Reward to distribute, in human token units
    #[serde(rename = "reward sd value")]
    pub reward_sd_value: f64,
}

impl BribeCsvEntry {
    pub fn new_from_file(path: &Path) -> Result<Vec<Self>> {
        let file = File::open(path)?;
        Self::new_from_reader(file)
    }

    pub fn new_from_reader<R: Read>(reader: R) -> Result<Vec<Self>> {
        let mut rdr = csv::ReaderBuilder::new().delimiter(b';').from_reader(reader);

        let headers: StringRecord = rdr
            .headers()?
            .iter()
            .map(|h| h.trim().to_lowercase())
            .collect();
        rdr.set_headers(headers);

        let mut entries = Vec::new();
        for result in rdr.deserialize() {
            let record: BribeCsvEntry = result?;
            entries.push(record);
        }

        Ok(entries)
    }
}

/// Pick the most recent report in `dir` for `protocol`, by the YYYYMMDD date
/// embedded in the filename.
pub fn latest_report(dir: &Path, protocol: &str) -> Result<PathBuf> {
    let mut best: Option<(u32, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name,
            None => continue,
        };
        if !name.ends_with(".csv") || !name.to_lowercase().contains(&protocol.to_lowercase()) {
            continue;
        }
        let date = match embedded_date(name) {
            Some(date) => date,
            None => continue,
        };
        if best.as_ref().map(|(d, _)| date > *d).unwrap_or(true) {
            best = Some((date, path));
        }
    }
    best.map(|(_, path)| path).ok_or_else(|| {
        MerkleTreeError::MerkleValidationError(format!(
            "no dated {protocol} report found in {}",
            dir.display()
        ))
    })
}

/// First run of exactly 8 ASCII digits in the filename, read as YYYYMMDD.
fn embedded_date(name: &str) -> Option<u32> {
    let bytes = name.as_bytes();
    let mut start = 0;
    while start < bytes.len() {
        if bytes[start].is_ascii_digit() {
            let mut end = start;
            while end < bytes.len() && bytes[end].is_ascii_digit() {
                end += 1;
            }
            if end - start == 8 {
                return name[start..end].parse().ok();
            }
            start = end;
        } else {
            start += 1;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    const REPORT: &str = "Protocol;Gauge Address;Reward sd Value\n\
        curve;0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA11111111;100.5\n\
        curve;0xBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBBB22222222;50\n\
        balancer;0xCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCCC33333333;7.25\n";

    #[test]
    fn test_csv_parsing() {
        let entries = BribeCsvEntry::new_from_reader(REPORT.as_bytes()).unwrap();

        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].protocol, "curve");
        assert_eq!(
            entries[0].gauge_address,
            "0xAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAAA11111111"
        );
        assert_eq!(entries[0].reward_sd_value, 100.5);
        assert_eq!(entries[2].protocol, "balancer");
    }

    #[test]
    fn test_embedded_date() {
        assert_eq!(embedded_date("curve-20240516.csv"), Some(20240516));
        assert_eq!(embedded_date("report_v2_20231201_curve.csv"), Some(20231201));
        assert_eq!(embedded_date("curve-123.csv"), None);
    }

    #[test]
    fn test_latest_report_picks_newest_date() {
        let dir = std::env::temp_dir().join("bounties_csv_entry_test");
        std::fs::create_dir_all(&dir).unwrap();
        for name in ["curve-20240509.csv", "curve-20240516.csv", "frax-20240523.csv"] {
            std::fs::write(dir.join(name), REPORT).unwrap();
        }

        let path = latest_report(&dir, "curve").unwrap();
        assert_eq!(path.file_name().unwrap(), "curve-20240516.csv");
        assert!(latest_report(&dir, "pendle").is_err());
    }
}
