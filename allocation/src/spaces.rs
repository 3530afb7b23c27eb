use std::str::FromStr;

use bounties_merkle_tree::Address;

use crate::{
    error::AllocationError,
    gauge_choices::{ChoiceRule, UnmatchedChoicePolicy},
};

/// Everything static a distribution round needs to know about one space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpaceConfig {
    pub space: &'static str,
    pub symbol: &'static str,
    /// Row selector for the bribe report's protocol column
    pub protocol: &'static str,
    /// Reward token distributed through the tree
    pub token: &'static str,
    pub image: &'static str,
    pub chain_id: u64,
    /// Claim contract the root is pushed to
    pub merkle_contract: &'static str,
    /// Address that votes on behalf of the delegation pool
    pub delegation_address: &'static str,
    /// Annualization factor for the APR side metric. Biweekly rounds give
    /// 26; sdpendle distributes weekly per sub-pool and carries a x4
    /// correction on top.
    pub periods_per_year: f64,
    pub rule: ChoiceRule,
    pub policy: UnmatchedChoicePolicy,
}

const MULTI_MERKLE_STASH: &str = "0x03E34b085C52985F6a5D27243F20C84bDdc01Db4";
const DELEGATION: &str = "0x52ea58f4FC3CEd48fA18E909226c1f8A0EF887DC";

pub const SPACES: &[SpaceConfig] = &[
    SpaceConfig {
        space: "sdcrv.eth",
        symbol: "sdCRV",
        protocol: "curve",
        token: "0xD1b5651E55D4CeeD36251c61c50C889B36F6abB5",
        image: "https://assets.coingecko.com/coins/images/27756/small/scCRV-2.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "sdbal.eth",
        symbol: "sdBAL",
        protocol: "balancer",
        token: "0xF24d8651578a55b0C119B9910759a351A3458895",
        image: "https://assets.coingecko.com/coins/images/11683/small/Balancer.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "sdfxs.eth",
        symbol: "sdFXS",
        protocol: "frax",
        token: "0x402F878BDd1f5C66FbAF0d76CFC29D864BE79aA4",
        image: "https://assets.coingecko.com/coins/images/13423/small/Frax_Shares_icon.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "sdangle.eth",
        symbol: "sdANGLE",
        protocol: "angle",
        token: "0x752B4c6e92d96467fE9b9a2522EF07228E00F87c",
        image: "https://assets.coingecko.com/coins/images/19060/small/ANGLE_Token-light.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "sdpendle.eth",
        symbol: "sdPENDLE",
        protocol: "pendle",
        token: "0x5Ea630e00D6eE438d3deA1556A110359ACdc10A9",
        image: "https://assets.coingecko.com/coins/images/15069/small/Pendle_Logo_Normal-03.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 104.0,
        rule: ChoiceRule::Dashed,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "sdcake.eth",
        symbol: "sdCAKE",
        protocol: "cake",
        token: "0x6a1c1447F97B27dA23dc52802F5f1435b5aC821A",
        image: "https://assets.coingecko.com/coins/images/12632/small/pancakeswap-cake-logo_%281%29.png",
        chain_id: 56,
        merkle_contract: "0xC4F84f9732fa6E24b19C1ed4b2E0f137E4BdE52f",
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "sdfxn.eth",
        symbol: "sdFXN",
        protocol: "fxn",
        token: "0xe19d1c837B8A1C83A56cD9165b2c0256D39653aD",
        image: "https://assets.coingecko.com/coins/images/30889/small/fxn.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "cvx.eth",
        symbol: "vlCVX",
        protocol: "vlcvx",
        token: "0x4e3FBD56CD56c3e72c1403e103b45Db9da5B9D2B",
        image: "https://assets.coingecko.com/coins/images/15585/small/convex.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
    SpaceConfig {
        space: "aura.eth",
        symbol: "vlAURA",
        protocol: "vlaura",
        token: "0xC0c293ce456fF0ED870ADd98a0828Dd4d2903DBF",
        image: "https://assets.coingecko.com/coins/images/25942/small/logo.png",
        chain_id: 1,
        merkle_contract: MULTI_MERKLE_STASH,
        delegation_address: DELEGATION,
        periods_per_year: 26.0,
        rule: ChoiceRule::Truncated,
        policy: UnmatchedChoicePolicy::Skip,
    },
];

/// Look up a space's configuration and check it eagerly, before any
/// external fetch for that space happens.
pub fn space_config(space: &str) -> Result<&'static SpaceConfig, AllocationError> {
    let config = SPACES
        .iter()
        .find(|c| c.space == space)
        .ok_or_else(|| {
            AllocationError::MissingConfiguration(space.to_string(), "unknown space".to_string())
        })?;
    config.validate()?;
    Ok(config)
}

impl SpaceConfig {
    pub fn validate(&self) -> Result<(), AllocationError> {
        let missing = |field: &str| {
            AllocationError::MissingConfiguration(self.space.to_string(), field.to_string())
        };
        if self.symbol.is_empty() {
            return Err(missing("symbol"));
        }
        if self.protocol.is_empty() {
            return Err(missing("protocol"));
        }
        if self.image.is_empty() {
            return Err(missing("image"));
        }
        if self.periods_per_year <= 0.0 {
            return Err(missing("periods_per_year"));
        }
        for (field, value) in [
            ("token", self.token),
            ("merkle_contract", self.merkle_contract),
            ("delegation_address", self.delegation_address),
        ] {
            Address::from_str(value).map_err(|_| missing(field))?;
        }
        Ok(())
    }

    pub fn token_address(&self) -> Address {
        // validate() ran before any use
        Address::from_str(self.token).unwrap_or(Address::ZERO)
    }

    pub fn delegation(&self) -> Address {
        Address::from_str(self.delegation_address).unwrap_or(Address::ZERO)
    }

    pub fn merkle(&self) -> Address {
        Address::from_str(self.merkle_contract).unwrap_or(Address::ZERO)
    }
}
