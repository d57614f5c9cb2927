//! Supported chains. Eg. *Bitcoin*, *Litecoin (testnet4)*.
use std::collections::BTreeMap;
use std::fmt;

/// Block height.
pub type Height = u64;

/// A supported blockchain network.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Chain {
    /// Bitcoin.
    Bitcoin,
    /// Bitcoin test network (version 3).
    BitcoinTestnet3,
    /// Bitcoin Cash.
    BitcoinCash,
    /// Bitcoin Cash test network (version 3).
    BitcoinCashTestnet3,
    /// Litecoin.
    Litecoin,
    /// Litecoin test network (version 4).
    LitecoinTestnet4,
    /// PKT.
    Pkt,
    /// PKT test network.
    PktTestnet,
    /// Bitcoin SV.
    BitcoinSv,
    /// Bitcoin SV test network (version 3).
    BitcoinSvTestnet3,
    /// eCash.
    ECash,
    /// eCash test network (version 3).
    ECashTestnet3,
    /// Dash.
    Dash,
    /// Dash test network (version 3).
    DashTestnet3,
}

impl Chain {
    /// Every supported chain, in catalog order.
    pub const ALL: [Chain; 14] = [
        Chain::Bitcoin,
        Chain::BitcoinTestnet3,
        Chain::BitcoinCash,
        Chain::BitcoinCashTestnet3,
        Chain::Litecoin,
        Chain::LitecoinTestnet4,
        Chain::Pkt,
        Chain::PktTestnet,
        Chain::BitcoinSv,
        Chain::BitcoinSvTestnet3,
        Chain::ECash,
        Chain::ECashTestnet3,
        Chain::Dash,
        Chain::DashTestnet3,
    ];

    /// Iterate over every supported chain.
    pub fn all() -> impl Iterator<Item = Chain> + Clone {
        Self::ALL.iter().copied()
    }

    /// Canonical ticker symbol, eg. `"tnBTC"`.
    pub fn ticker(&self) -> &'static str {
        match self {
            Self::Bitcoin => "BTC",
            Self::BitcoinTestnet3 => "tnBTC",
            Self::BitcoinCash => "BCH",
            Self::BitcoinCashTestnet3 => "tnBCH",
            Self::Litecoin => "LTC",
            Self::LitecoinTestnet4 => "tnLTC",
            Self::Pkt => "PKT",
            Self::PktTestnet => "tnPKT",
            Self::BitcoinSv => "BSV",
            Self::BitcoinSvTestnet3 => "tnBSV",
            Self::ECash => "XEC",
            Self::ECashTestnet3 => "tnXEC",
            Self::Dash => "DASH",
            Self::DashTestnet3 => "tnDASH",
        }
    }

    /// Human-readable name, as shown to the operator.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bitcoin => "Bitcoin",
            Self::BitcoinTestnet3 => "Bitcoin (testnet3)",
            Self::BitcoinCash => "Bitcoin Cash",
            Self::BitcoinCashTestnet3 => "Bitcoin Cash (testnet3)",
            Self::Litecoin => "Litecoin",
            Self::LitecoinTestnet4 => "Litecoin (testnet4)",
            Self::Pkt => "PKT",
            Self::PktTestnet => "PKT (testnet)",
            Self::BitcoinSv => "Bitcoin SV",
            Self::BitcoinSvTestnet3 => "Bitcoin SV (testnet3)",
            Self::ECash => "eCash",
            Self::ECashTestnet3 => "eCash (testnet3)",
            Self::Dash => "Dash",
            Self::DashTestnet3 => "Dash (testnet3)",
        }
    }

    /// Whether this is a test network.
    pub fn is_testnet(&self) -> bool {
        self.ticker().starts_with("tn")
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Lookup table from lowercase ticker to chain.
///
/// ```
/// use metier_common::chain::{Catalog, Chain};
///
/// let catalog = Catalog::default();
///
/// assert_eq!(catalog.lookup("tnBTC"), Some(Chain::BitcoinTestnet3));
/// assert_eq!(catalog.lookup("doge"), None);
/// ```
#[derive(Debug, Clone)]
pub struct Catalog {
    tickers: BTreeMap<String, Chain>,
}

impl Catalog {
    /// Build a catalog from the given chains.
    pub fn new(chains: impl IntoIterator<Item = Chain>) -> Self {
        let tickers = chains
            .into_iter()
            .map(|chain| (chain.ticker().to_lowercase(), chain))
            .collect();

        Self { tickers }
    }

    /// Find the chain whose ticker matches `name`, ignoring case.
    pub fn lookup(&self, name: &str) -> Option<Chain> {
        self.tickers.get(&name.to_lowercase()).copied()
    }

    /// Iterate over the chains in the catalog, in chain order.
    pub fn chains(&self) -> impl Iterator<Item = Chain> + '_ {
        let mut chains = self.tickers.values().copied().collect::<Vec<_>>();
        chains.sort();
        chains.into_iter()
    }

    /// Number of chains in the catalog.
    pub fn len(&self) -> usize {
        self.tickers.len()
    }

    /// Whether the catalog is empty.
    pub fn is_empty(&self) -> bool {
        self.tickers.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new(Chain::all())
    }
}
