//! Update center model and its deserializer from properties.
//!
//! The descriptor lists the supported platform versions and every plugin
//! with its releases:
//!
//! ```text
//! date=2010-11-03
//! sonar.versions=2.2,2.3,2.4
//! plugins=java,pmd
//! java.name=Java
//! java.versions=1.0,1.1
//! java.1.1.downloadUrl=http://dist/java-1.1.jar
//! java.1.1.requiredSonarVersions=2.3,2.4
//! ```

use std::cmp::Ordering;
use std::fmt::{self, Display, Formatter};

use serde::Serialize;

use crate::error::UCError;
use crate::io::Parser;
use crate::properties::Properties;
use crate::Result;

/// Dotted version such as `2.4` or `1.0-RC1`. Numeric segments compare as
/// numbers, anything else lexicographically.
#[derive(Clone, Debug, Eq, Serialize)]
#[serde(transparent)]
pub struct Version(String);

impl Version {
    pub fn new<T: Into<String>>(version: T) -> Self {
        Version(version.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    fn segments(&self) -> impl Iterator<Item = &str> {
        self.0.split(['.', '-'])
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let mut left = self.segments();
        let mut right = other.segments();
        loop {
            match (left.next(), right.next()) {
                (None, None) => return Ordering::Equal,
                // 1.0 == 1.0.0
                (Some(l), None) if l.chars().all(|c| c == '0') => continue,
                (None, Some(r)) if r.chars().all(|c| c == '0') => continue,
                (Some(_), None) => return Ordering::Greater,
                (None, Some(_)) => return Ordering::Less,
                (Some(l), Some(r)) => {
                    let ordering = match (l.parse::<u64>(), r.parse::<u64>()) {
                        (Ok(l), Ok(r)) => l.cmp(&r),
                        _ => l.cmp(r),
                    };
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
            }
        }
    }
}

impl Display for Version {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Release {
    pub version: Version,
    pub date: Option<String>,
    pub download_url: Option<String>,
    pub description: Option<String>,
    pub required_sonar_versions: Vec<Version>,
}

impl Release {
    pub fn supports(&self, sonar_version: &Version) -> bool {
        self.required_sonar_versions.contains(sonar_version)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Plugin {
    pub key: String,
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub license: Option<String>,
    pub organization: Option<String>,
    pub homepage: Option<String>,
    pub releases: Vec<Release>,
}

impl Plugin {
    /// Release with the highest version, if any.
    pub fn last_release(&self) -> Option<&Release> {
        self.releases.iter().max_by(|a, b| a.version.cmp(&b.version))
    }

    pub fn compatible_releases(&self, sonar_version: &Version) -> Vec<&Release> {
        self.releases
            .iter()
            .filter(|release| release.supports(sonar_version))
            .collect()
    }
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct UpdateCenter {
    pub date: Option<String>,
    pub sonar_versions: Vec<Version>,
    pub plugins: Vec<Plugin>,
}

impl UpdateCenter {
    pub fn plugin(&self, key: &str) -> Option<&Plugin> {
        self.plugins.iter().find(|plugin| plugin.key == key)
    }

    pub fn last_sonar_version(&self) -> Option<&Version> {
        self.sonar_versions.iter().max()
    }
}

/// Default [`Parser`] building an [`UpdateCenter`] out of the descriptor
/// properties.
#[derive(Clone, Copy, Debug, Default)]
pub struct UpdateCenterDeserializer;

impl UpdateCenterDeserializer {
    fn plugin(properties: &Properties, key: &str) -> Result<Plugin> {
        let optional = |suffix: &str| -> Option<String> {
            properties
                .get(&format!("{}.{}", key, suffix))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        let releases = properties
            .get_list(&format!("{}.versions", key))
            .into_iter()
            .map(|version| Self::release(properties, key, version))
            .collect();
        Ok(Plugin {
            key: key.to_string(),
            // Name defaults to the key, but a plugin listed without any of its
            // own entries is a broken descriptor.
            name: match optional("name") {
                Some(name) => name,
                None if properties.get(&format!("{}.versions", key)).is_some() => {
                    key.to_string()
                }
                None => {
                    return Err(UCError::FormatError(format!(
                        "Plugin {} is listed but has no name nor versions",
                        key
                    ))
                    .into())
                }
            },
            description: optional("description"),
            category: optional("category"),
            license: optional("license"),
            organization: optional("organization"),
            homepage: optional("homepageUrl"),
            releases,
        })
    }

    fn release(properties: &Properties, key: &str, version: String) -> Release {
        let optional = |suffix: &str| -> Option<String> {
            properties
                .get(&format!("{}.{}.{}", key, version, suffix))
                .filter(|value| !value.is_empty())
                .map(str::to_string)
        };
        Release {
            date: optional("date"),
            download_url: optional("downloadUrl"),
            description: optional("description"),
            required_sonar_versions: properties
                .get_list(&format!("{}.{}.requiredSonarVersions", key, version))
                .into_iter()
                .map(Version::new)
                .collect(),
            version: Version::new(version),
        }
    }
}

impl Parser for UpdateCenterDeserializer {
    type Model = UpdateCenter;

    fn parse(&self, properties: &Properties) -> Result<UpdateCenter> {
        if properties.get("plugins").is_none() && properties.get("sonar.versions").is_none() {
            return Err(UCError::FormatError(
                "Not an update center descriptor: missing plugins and sonar.versions".to_string(),
            )
            .into());
        }
        let plugins = properties
            .get_list("plugins")
            .iter()
            .map(|key| Self::plugin(properties, key))
            .collect::<Result<Vec<Plugin>>>()?;
        Ok(UpdateCenter {
            date: properties.get("date").map(str::to_string),
            sonar_versions: properties
                .get_list("sonar.versions")
                .into_iter()
                .map(Version::new)
                .collect(),
            plugins,
        })
    }
}
