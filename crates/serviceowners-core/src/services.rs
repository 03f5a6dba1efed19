//! Service metadata (`services.yaml`).
//!
//! The metadata file describes each service named in SERVICEOWNERS: who owns
//! it and how to reach them. Two layouts are accepted:
//!
//! ```yaml
//! services:
//!   api:
//!     owners: ["@acme/api-team"]
//!     contact: { slack: "#api" }
//! ```
//!
//! or the same mapping without the `services` wrapper.

use log::debug;
use serde::{Deserialize, Serialize};
use serde_yaml::Value;
use std::collections::BTreeMap;
use std::path::Path;
use thiserror::Error;

/// An error while loading service metadata.
#[derive(Debug, Error)]
pub enum ServicesError {
    /// The file exists but could not be read.
    #[error("failed to read services file {file}: {error}")]
    Io {
        file: String,
        #[source]
        error: std::io::Error,
    },

    /// The file is not valid YAML or a field has the wrong type.
    #[error("failed to parse services file {file}: {error}")]
    Yaml {
        file: String,
        #[source]
        error: serde_yaml::Error,
    },

    /// The YAML is well-formed but does not describe services.
    #[error("{file}: {message}")]
    Invalid { file: String, message: String },
}

impl ServicesError {
    fn invalid(file: &str, message: impl Into<String>) -> Self {
        Self::Invalid {
            file: file.to_string(),
            message: message.into(),
        }
    }

    fn yaml(file: &str, error: serde_yaml::Error) -> Self {
        Self::Yaml {
            file: file.to_string(),
            error,
        }
    }
}

/// A reference to an owner: a team, a user or an email address.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OwnerRef {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub team: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl OwnerRef {
    /// Interprets the string shorthand.
    ///
    /// `@org/team` is a team, `someone@example.com` is an email address and
    /// anything else is a user.
    pub fn from_shorthand(value: &str) -> Self {
        if value.starts_with('@') {
            Self {
                team: Some(value.to_string()),
                ..Self::default()
            }
        } else if value.contains('@') && value.contains('.') && !value.contains(' ') {
            Self {
                email: Some(value.to_string()),
                ..Self::default()
            }
        } else {
            Self {
                user: Some(value.to_string()),
                ..Self::default()
            }
        }
    }

    /// The most specific non-empty identifier: team, then user, then email.
    pub fn display(&self) -> &str {
        self.team
            .as_deref()
            .or(self.user.as_deref())
            .or(self.email.as_deref())
            .unwrap_or("")
    }
}

/// How to reach a service's owners.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contact {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub slack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl Contact {
    /// Returns true if a non-empty slack channel or email is set.
    pub fn is_reachable(&self) -> bool {
        non_empty(&self.slack).is_some() || non_empty(&self.email).is_some()
    }
}

/// Metadata for one service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Service {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub owners: Vec<OwnerRef>,
    pub contact: Contact,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub docs: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub runbook: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub oncall: Option<String>,
    pub dashboards: Vec<String>,
    pub tags: Vec<String>,
}

impl Service {
    /// Creates a service with no metadata.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Returns true if the service has owners or a reachable contact.
    pub fn has_contact(&self) -> bool {
        !self.owners.is_empty() || self.contact.is_reachable()
    }
}

/// Declared services, keyed by exact (case-sensitive) name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ServiceCatalog {
    services: BTreeMap<String, Service>,
}

impl ServiceCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces a service.
    pub fn insert(&mut self, service: Service) {
        self.services.insert(service.name.clone(), service);
    }

    pub fn get(&self, name: &str) -> Option<&Service> {
        self.services.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.services.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.services.len()
    }

    pub fn is_empty(&self) -> bool {
        self.services.is_empty()
    }

    /// Iterates services sorted by name.
    pub fn iter(&self) -> impl Iterator<Item = &Service> {
        self.services.values()
    }
}

impl FromIterator<Service> for ServiceCatalog {
    fn from_iter<T: IntoIterator<Item = Service>>(iter: T) -> Self {
        let mut catalog = Self::new();
        for service in iter {
            catalog.insert(service);
        }
        catalog
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawOwner {
    Shorthand(String),
    Full {
        #[serde(default)]
        team: Option<String>,
        #[serde(default)]
        user: Option<String>,
        #[serde(default)]
        email: Option<String>,
    },
}

#[derive(Default, Deserialize)]
struct RawService {
    #[serde(default)]
    description: Option<String>,
    #[serde(default)]
    owners: Option<Vec<RawOwner>>,
    #[serde(default)]
    contact: Option<Contact>,
    #[serde(default)]
    docs: Option<String>,
    #[serde(default)]
    runbook: Option<String>,
    #[serde(default)]
    oncall: Option<String>,
    #[serde(default)]
    dashboards: Option<Vec<String>>,
    #[serde(default)]
    tags: Option<Vec<String>>,
}

/// Parses service metadata from YAML text.
///
/// `source` names the input in error messages.
pub fn parse_services(text: &str, source: &str) -> Result<ServiceCatalog, ServicesError> {
    let document: Value =
        serde_yaml::from_str(text).map_err(|e| ServicesError::yaml(source, e))?;

    let root = match document {
        Value::Null => return Ok(ServiceCatalog::new()),
        Value::Mapping(map) => map,
        _ => return Err(ServicesError::invalid(source, "expected a mapping")),
    };

    let wrapped = match root.get("services") {
        Some(Value::Mapping(inner)) => Some(inner.clone()),
        _ => None,
    };
    let entries = wrapped.unwrap_or(root);

    let mut catalog = ServiceCatalog::new();
    for (key, raw) in entries {
        let name = match key {
            Value::String(name) if !name.trim().is_empty() => name,
            _ => {
                return Err(ServicesError::invalid(
                    source,
                    "service keys must be non-empty strings",
                ));
            }
        };

        let raw: RawService = match raw {
            Value::Null => RawService::default(),
            Value::Mapping(_) => {
                serde_yaml::from_value(raw).map_err(|e| ServicesError::yaml(source, e))?
            }
            _ => {
                return Err(ServicesError::invalid(
                    source,
                    format!("service '{}' must be a mapping", name),
                ));
            }
        };

        let service = build_service(name, raw, source)?;
        catalog.insert(service);
    }

    debug!("Loaded {} service(s) from {}", catalog.len(), source);
    Ok(catalog)
}

/// Loads service metadata from `path`.
///
/// A missing file yields an empty catalog.
pub fn load_services(path: &Path) -> Result<ServiceCatalog, ServicesError> {
    let file = path.display().to_string();
    let text = match std::fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            debug!("No services file at {}", file);
            return Ok(ServiceCatalog::new());
        }
        Err(error) => return Err(ServicesError::Io { file, error }),
    };
    parse_services(&text, &file)
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.trim().is_empty())
}

fn build_service(name: String, raw: RawService, source: &str) -> Result<Service, ServicesError> {
    let owners = raw
        .owners
        .unwrap_or_default()
        .into_iter()
        .map(|owner| match owner {
            RawOwner::Shorthand(value) => Ok(OwnerRef::from_shorthand(&value)),
            RawOwner::Full { team, user, email } => {
                let (team, user, email) = (
                    non_empty(&team).map(str::to_owned),
                    non_empty(&user).map(str::to_owned),
                    non_empty(&email).map(str::to_owned),
                );
                if team.is_none() && user.is_none() && email.is_none() {
                    Err(ServicesError::invalid(
                        source,
                        format!(
                            "service '{}': owners entry must include one of: team/user/email",
                            name
                        ),
                    ))
                } else {
                    Ok(OwnerRef { team, user, email })
                }
            }
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Service {
        description: raw.description,
        owners,
        contact: raw.contact.unwrap_or_default(),
        docs: raw.docs,
        runbook: raw.runbook,
        oncall: raw.oncall,
        dashboards: raw.dashboards.unwrap_or_default(),
        tags: raw.tags.unwrap_or_default(),
        name,
    })
}
