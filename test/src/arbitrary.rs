//! Generators for command-line option sequences.
use std::fmt;

use quickcheck::{Arbitrary, Gen};

use metier_common::chain::Chain;

/// Option names that are not chain tickers.
pub const GLOBAL: &[&str] = &[
    "all",
    "data_dir",
    "sync_server",
    "public_addr",
    "block_storage",
    "log",
    "doge",
];

/// Option values, covering seeds, the `off` keyword, ports and garbage.
pub const VALUES: &[&str] = &[
    "",
    "off",
    "off",
    "OFF",
    "1.2.3.4",
    "seed.example.com:8333",
    "9000",
    "65535",
    "-1",
    "abc",
];

/// A single `(name, value)` option, as found on the command line.
#[derive(Clone, PartialEq, Eq)]
pub struct Opt {
    pub name: String,
    pub value: String,
}

impl Opt {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }

    pub fn pair(&self) -> (&str, &str) {
        (self.name.as_str(), self.value.as_str())
    }
}

impl fmt::Debug for Opt {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "--{}={:?}", self.name, self.value)
    }
}

impl Arbitrary for Opt {
    fn arbitrary(g: &mut Gen) -> Self {
        // Chain options are the interesting ones, so pick them more often.
        let name = if bool::arbitrary(g) || bool::arbitrary(g) {
            let chain = g.choose(&Chain::ALL).copied().unwrap_or(Chain::Bitcoin);
            let ticker = chain.ticker();

            match u8::arbitrary(g) % 3 {
                0 => ticker.to_owned(),
                1 => ticker.to_lowercase(),
                _ => ticker.to_uppercase(),
            }
        } else {
            g.choose(GLOBAL).copied().unwrap_or("all").to_owned()
        };
        let value = g.choose(VALUES).copied().unwrap_or("").to_owned();

        Self { name, value }
    }
}

/// A sequence of options, in command-line order. Never contains `help`.
#[derive(Clone, Debug)]
pub struct Opts(pub Vec<Opt>);

impl Opts {
    pub fn pairs(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.0.iter().map(Opt::pair)
    }
}

impl Arbitrary for Opts {
    fn arbitrary(g: &mut Gen) -> Self {
        Self(Vec::<Opt>::arbitrary(g))
    }

    fn shrink(&self) -> Box<dyn Iterator<Item = Self>> {
        Box::new(self.0.shrink().map(Self))
    }
}
