//! Build mode selection.
//!
//! The mode picks both the package-manager script that produces the build and
//! the environment file that is shipped alongside it.

use crate::error::{PackagerError, Result};
use std::fmt;
use std::str::FromStr;

/// Build and deployment profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Production build (`build:prod`, `.env.production`).
    #[default]
    Prod,
    /// Development build (`build:dev`, `.env.development`).
    Dev,
}

impl Mode {
    /// Parse a mode argument, rejecting anything other than `prod` or `dev`.
    ///
    /// # Errors
    ///
    /// Returns [`PackagerError::UnknownMode`] for unrecognised input.
    ///
    /// # Examples
    ///
    /// ```
    /// use ssr_packager::mode::Mode;
    ///
    /// assert_eq!(Mode::parse("dev")?, Mode::Dev);
    /// assert!(Mode::parse("staging").is_err());
    /// # Ok::<(), ssr_packager::error::PackagerError>(())
    /// ```
    pub fn parse(value: &str) -> Result<Self> {
        match value {
            "prod" => Ok(Self::Prod),
            "dev" => Ok(Self::Dev),
            other => Err(PackagerError::UnknownMode {
                mode: other.to_owned(),
            }),
        }
    }

    /// The textual form used in staging directory names.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Prod => "prod",
            Self::Dev => "dev",
        }
    }

    /// The package-manager script that builds this mode.
    #[must_use]
    pub const fn build_script(self) -> &'static str {
        match self {
            Self::Prod => "build:prod",
            Self::Dev => "build:dev",
        }
    }

    /// The environment file shipped with this mode.
    #[must_use]
    pub const fn env_file(self) -> &'static str {
        match self {
            Self::Prod => ".env.production",
            Self::Dev => ".env.development",
        }
    }
}

impl FromStr for Mode {
    type Err = PackagerError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
