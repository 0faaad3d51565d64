use crate::error::{Result, UpdateChangelogError};
use std::fmt;

/// Release version handed to the tool on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReleaseVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
}

/// The `MAJOR.MINOR` prefix shared by a series of patch releases
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MinorLine {
    pub major: u32,
    pub minor: u32,
}

impl ReleaseVersion {
    /// Create a new version
    pub fn new(major: u32, minor: u32, patch: u32) -> Self {
        ReleaseVersion {
            major,
            minor,
            patch,
        }
    }

    /// Parse a `MAJOR.MINOR.PATCH` string (e.g., "7.2.0" -> ReleaseVersion(7,2,0))
    ///
    /// Exactly three dot-separated integer components are required. Each
    /// component is converted like an integer literal, so surrounding
    /// whitespace and leading zeros are tolerated.
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split('.').collect();
        if parts.len() != 3 {
            return Err(UpdateChangelogError::version(format!(
                "invalid version: '{}' - expected MAJOR.MINOR.PATCH",
                input
            )));
        }

        let component = |name: &str, raw: &str| {
            raw.trim().parse::<u32>().map_err(|_| {
                UpdateChangelogError::version(format!(
                    "invalid {} component '{}' in version '{}'",
                    name, raw, input
                ))
            })
        };

        Ok(ReleaseVersion {
            major: component("major", parts[0])?,
            minor: component("minor", parts[1])?,
            patch: component("patch", parts[2])?,
        })
    }

    /// The minor line this version belongs to
    pub fn minor_line(&self) -> MinorLine {
        MinorLine {
            major: self.major,
            minor: self.minor,
        }
    }

    /// The minor line released just before this one (7.2.x -> 7.1)
    ///
    /// A `.0` minor has no predecessor inside the same major.
    pub fn previous_minor_line(&self) -> Result<MinorLine> {
        let minor = self.minor.checked_sub(1).ok_or_else(|| {
            UpdateChangelogError::version(format!(
                "version '{}' has no previous minor line in major {}",
                self, self.major
            ))
        })?;

        Ok(MinorLine {
            major: self.major,
            minor,
        })
    }
}

impl MinorLine {
    /// First release of the line, `MAJOR.MINOR.0`
    pub fn first_release(&self) -> ReleaseVersion {
        ReleaseVersion::new(self.major, self.minor, 0)
    }
}

impl fmt::Display for ReleaseVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl fmt::Display for MinorLine {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.major, self.minor)
    }
}
