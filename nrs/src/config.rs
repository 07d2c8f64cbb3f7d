//!
//! Component configuration.
//!
//! A component is described by a TOML file.  Every key has a default, so
//! an empty file describes a component with no routes, and a program can
//! just as well build a [`ComponentConfig`] in code.
//!
//! ```toml
//! cid = "arm-controller"
//! c_type = "NRS.arm"
//! intelligent_port = 1
//!
//! [strictness]
//! unknown_namespace = "reject"
//!
//! [[routes]]
//! port = 1
//! bind = "127.0.0.1:7001"
//! peer = "127.0.0.1:7002"
//! ```
//!

use std::{collections::HashSet, net::SocketAddr, path::Path};

use nrs_core::PortId;
use nrs_pml::{DecoderPolicy, ElementPolicy, NamespacePolicy};
use nrs_variables::{ComponentInfo, Limits, TypeMismatchPolicy};
use serde::Deserialize;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The file could not be read
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for a component
    #[error("TOML parse error: {0}")]
    Parse(#[from] toml::de::Error),
    /// The values parse but do not make a usable component
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// How forgiving a component is with messages it does not fully
/// understand.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Strictness {
    /// Fields in an unrecognised namespace
    pub unknown_namespace: NamespacePolicy,
    /// Elements that are not a registered message type
    pub unknown_element: ElementPolicy,
    /// Messages whose type differs from the variable they are sent to
    pub type_mismatch: TypeMismatchPolicy,
}

impl Strictness {
    /// The part of the strictness the decoder applies
    pub fn decoder_policy(&self) -> DecoderPolicy {
        DecoderPolicy {
            unknown_namespace: self.unknown_namespace,
            unknown_element: self.unknown_element,
        }
    }
}

/// The transport a route uses.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// [`nrs_comms::TcpRoute`]
    #[default]
    Tcp,
}

/// One route of a component.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
pub struct RouteConfig {
    /// The port the route is attached to
    pub port: u32,
    /// The transport
    #[serde(default)]
    pub kind: RouteKind,
    /// The local address buffers are received on
    pub bind: SocketAddr,
    /// The address buffers are sent to
    #[serde(default)]
    pub peer: Option<SocketAddr>,
    /// The CID of the component at the far end, if known in advance
    #[serde(default)]
    pub cid: Option<String>,
}

/// Everything needed to build a [`crate::ProcessComponent`].
#[derive(Clone, Debug, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ComponentConfig {
    /// The component's CID
    pub cid: String,
    /// The component type
    pub c_type: String,
    /// The component version
    pub c_version: String,
    /// The VNID of the root node
    pub root_vnid: u32,
    /// The name of the root node
    pub root_name: String,
    /// How often the component polls its routes (in us)
    pub update_delay_us: u64,
    /// See [`Limits`]
    pub limits: Limits,
    /// Where intelligently routed messages without a route are sent
    pub intelligent_port: Option<u32>,
    /// See [`Strictness`]
    pub strictness: Strictness,
    /// Hold inbound messages in an interception stage
    pub intercept: bool,
    /// The default log filter
    pub log_level: String,
    /// The component's routes
    pub routes: Vec<RouteConfig>,
}

impl Default for ComponentConfig {
    fn default() -> Self {
        let info = ComponentInfo::default();
        Self {
            cid: info.cid,
            c_type: info.c_type,
            c_version: info.c_version,
            root_vnid: info.root_vnid,
            root_name: info.root_name,
            update_delay_us: 10_000,
            limits: info.limits,
            intelligent_port: None,
            strictness: Strictness::default(),
            intercept: false,
            log_level: "info".to_string(),
            routes: Vec::new(),
        }
    }
}

impl ComponentConfig {
    /// Parse and validate a configuration.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.cid.is_empty() {
            return Err(ConfigError::Invalid("cid is empty".into()));
        }
        if self.root_vnid == 0 || self.root_vnid > self.limits.max_vnid {
            return Err(ConfigError::Invalid(format!(
                "root_vnid {} is not between 1 and max_vnid {}",
                self.root_vnid, self.limits.max_vnid
            )));
        }

        let mut ports = HashSet::new();
        for (i, route) in self.routes.iter().enumerate() {
            if PortId::new(route.port).is_err() || route.port >= self.limits.max_port {
                return Err(ConfigError::Invalid(format!(
                    "route {} uses port {}, which is out of range",
                    i, route.port
                )));
            }
            if !ports.insert(route.port) {
                return Err(ConfigError::Invalid(format!(
                    "port {} has more than one route",
                    route.port
                )));
            }
        }

        if let Some(port) = self.intelligent_port {
            if !ports.contains(&port) {
                return Err(ConfigError::Invalid(format!(
                    "intelligent_port {port} has no route"
                )));
            }
        }

        Ok(())
    }

    /// The identity the dispatcher reports
    pub fn component_info(&self) -> ComponentInfo {
        ComponentInfo {
            cid: self.cid.clone(),
            c_type: self.c_type.clone(),
            c_version: self.c_version.clone(),
            root_vnid: self.root_vnid,
            root_name: self.root_name.clone(),
            limits: self.limits,
            csl: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    #[test]
    fn test_empty_file_is_default() {
        let config = ComponentConfig::from_toml_str("").unwrap();
        assert_eq!(config, ComponentConfig::default());
        assert_eq!(config.strictness, Strictness::default());
        assert_eq!(config.strictness.type_mismatch, TypeMismatchPolicy::Advisory);
        assert!(config.routes.is_empty());
    }

    #[test]
    fn test_full_file() {
        let config = ComponentConfig::from_toml_str(
            r#"
            cid = "arm-controller"
            c_type = "NRS.arm"
            root_vnid = 5
            update_delay_us = 2500
            intelligent_port = 1
            intercept = true

            [limits]
            max_link = 4

            [strictness]
            unknown_namespace = "reject"
            unknown_element = "ignore"
            type_mismatch = "reject"

            [[routes]]
            port = 1
            bind = "127.0.0.1:7001"
            peer = "127.0.0.1:7002"
            cid = "plotter"

            [[routes]]
            port = 2
            kind = "tcp"
            bind = "127.0.0.1:7003"
            "#,
        )
        .unwrap();

        assert_eq!(config.cid, "arm-controller");
        assert_eq!(config.root_vnid, 5);
        assert_eq!(config.update_delay_us, 2500);
        assert!(config.intercept);
        assert_eq!(config.limits.max_link, 4);
        assert_eq!(config.limits.max_log, Limits::default().max_log);
        assert_eq!(config.strictness.unknown_namespace, NamespacePolicy::Reject);
        assert_eq!(config.strictness.unknown_element, ElementPolicy::Ignore);
        assert_eq!(config.strictness.type_mismatch, TypeMismatchPolicy::Reject);
        assert_eq!(config.routes.len(), 2);
        assert_eq!(config.routes[0].cid.as_deref(), Some("plotter"));
        assert_eq!(config.routes[1].peer, None);
        assert_eq!(config.routes[1].kind, RouteKind::Tcp);

        let info = config.component_info();
        assert_eq!(info.cid, "arm-controller");
        assert_eq!(info.root_vnid, 5);
    }

    #[test]
    fn test_invalid_configurations() {
        for content in [
            "cid = \"\"",
            "root_vnid = 0",
            "intelligent_port = 3",
            "[[routes]]\nport = 64\nbind = \"127.0.0.1:0\"",
            "[[routes]]\nport = 1\nbind = \"127.0.0.1:0\"\n[[routes]]\nport = 1\nbind = \"127.0.0.1:0\"",
        ] {
            assert!(
                matches!(ComponentConfig::from_toml_str(content), Err(ConfigError::Invalid(_))),
                "{content}"
            );
        }

        assert!(matches!(
            ComponentConfig::from_toml_str("cid = 3"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "cid = \"from-file\"").unwrap();

        let config = ComponentConfig::from_file(file.path()).unwrap();
        assert_eq!(config.cid, "from-file");

        assert!(matches!(
            ComponentConfig::from_file(file.path().with_extension("missing")),
            Err(ConfigError::Io(_))
        ));
    }
}
