//! Engine version detection and feature gating.

use std::fmt;
use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::IacResult;

fn version_regex() -> &'static Regex {
    static VERSION_RE: OnceLock<Regex> = OnceLock::new();
    VERSION_RE.get_or_init(|| {
        Regex::new(r"^(?P<major>\d+)\.(?P<minor>\d+)\.(?P<patch>\d+)$")
            .unwrap_or_else(|e| panic!("invalid version pattern: {}", e))
    })
}

/// Payload of `terraform version -json`.
#[derive(Debug, Clone, Deserialize)]
struct VersionPayload {
    terraform_version: String,
    terraform_outdated: bool,
    platform: String,
}

/// Detected engine version.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineVersion {
    pub major: u32,
    pub minor: u32,
    pub patch: u32,
    /// Version string as reported by the engine
    pub raw: String,
    /// Whether the engine reports a newer release is available
    pub outdated: bool,
    pub platform: String,
}

impl EngineVersion {
    /// Build from a raw version string; anything but `D.D.D` parses as `0.0.0`.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        let raw = raw.into();
        let (major, minor, patch) = Self::parse_components(&raw).unwrap_or((0, 0, 0));
        Self {
            major,
            minor,
            patch,
            raw,
            outdated: false,
            platform: String::new(),
        }
    }

    /// Decode the JSON printed by `terraform version -json`.
    pub fn from_json(payload: &str) -> IacResult<Self> {
        let payload: VersionPayload = serde_json::from_str(payload)?;
        Ok(Self {
            outdated: payload.terraform_outdated,
            platform: payload.platform,
            ..Self::from_raw(payload.terraform_version)
        })
    }

    fn parse_components(raw: &str) -> Option<(u32, u32, u32)> {
        let caps = version_regex().captures(raw)?;
        Some((
            caps["major"].parse().ok()?,
            caps["minor"].parse().ok()?,
            caps["patch"].parse().ok()?,
        ))
    }

    pub fn is_latest(&self) -> bool {
        !self.outdated
    }
}

impl fmt::Display for EngineVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.raw)
    }
}

/// A `major.minor` requirement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MinVersion {
    pub major: u32,
    pub minor: u32,
}

impl MinVersion {
    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

impl fmt::Display for MinVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.0", self.major, self.minor)
    }
}

/// Version-sensitive features.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    /// `plan -json`
    PlanJson,
    /// `plan -refresh-only`
    PlanRefreshOnly,
    /// `apply -json` with streamed events
    ApplyJson,
}

impl Feature {
    pub fn min_version(&self) -> MinVersion {
        match self {
            Feature::PlanJson => MinVersion::new(1, 0),
            Feature::PlanRefreshOnly => MinVersion::new(1, 1),
            Feature::ApplyJson => MinVersion::new(1, 0),
        }
    }

    pub fn flag(&self) -> &'static str {
        match self {
            Feature::PlanJson | Feature::ApplyJson => "-json",
            Feature::PlanRefreshOnly => "-refresh-only",
        }
    }
}

/// Answers capability questions against a detected version.
#[derive(Debug, Clone, Copy)]
pub struct VersionGate<'a> {
    version: &'a EngineVersion,
}

impl<'a> VersionGate<'a> {
    pub fn new(version: &'a EngineVersion) -> Self {
        Self { version }
    }

    /// Compare `(major, minor)` only; the patch level never matters.
    pub fn supports_min(&self, min: MinVersion) -> bool {
        (self.version.major, self.version.minor) >= (min.major, min.minor)
    }

    pub fn supports(&self, feature: Feature) -> bool {
        self.supports_min(feature.min_version())
    }

    /// Whether a requested feature may be used, warning when it may not.
    pub fn allow(&self, feature: Feature, requested: bool) -> bool {
        if !requested {
            return false;
        }
        if self.supports(feature) {
            return true;
        }
        warn!(
            "the option '{}' is supported since version {}, and your version is {}",
            feature.flag(),
            feature.min_version(),
            self.version.raw
        );
        false
    }
}
