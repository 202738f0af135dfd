use std::fmt;
use std::str::FromStr;

use clap::ValueEnum;
use serde::Deserialize;

/// Build mode selecting which bundler configuration, environment, and
/// cache partition an invocation uses.
///
/// Modes are mutually exclusive build targets: exactly one runs at a
/// time, and running one invalidates the on-disk run artifacts of the
/// others (see `cache::clean`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    Dev,
    Prod,
    Test,
}

impl Mode {
    /// All modes, in a fixed order. Used when reconciling cache
    /// partitions across modes.
    pub const ALL: [Mode; 3] = [Mode::Dev, Mode::Prod, Mode::Test];

    /// Stable name used for the mode's cache partition directory and in
    /// config section keys (`[mode.dev]` etc.).
    pub fn as_str(self) -> &'static str {
        match self {
            Mode::Dev => "dev",
            Mode::Prod => "prod",
            Mode::Test => "test",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "dev" => Ok(Mode::Dev),
            "prod" => Ok(Mode::Prod),
            "test" => Ok(Mode::Test),
            other => Err(format!(
                "invalid mode: {other} (expected \"dev\", \"prod\" or \"test\")"
            )),
        }
    }
}
