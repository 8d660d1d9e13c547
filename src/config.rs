//! Session configuration.
//!
//! [`ConnectionConfig`] collects everything an [`EtpConnection`] needs before
//! the first frame arrives: the local role, whether the peer must authorize
//! first, and the capabilities advertised during the handshake.
//!
//! [`EtpConnection`]: crate::connection::EtpConnection

use serde::{Deserialize, Serialize};

use crate::{
    client_info::{ANONYMOUS_LOGIN, ClientInfo, default_capabilities},
    connection::ConnectionRole,
    schema::datatypes::{DataValue, DataValueMap},
};

/// Settings for one ETP session.
///
/// # Examples
///
/// ```
/// use etpproto::{config::ConnectionConfig, connection::ConnectionRole};
///
/// let config = ConnectionConfig::default()
///     .auth_required(true)
///     .login("alice")
///     .capability("MaxWebSocketMessagePayloadSize", 4096_i64);
/// assert_eq!(config.role(), ConnectionRole::Server);
/// assert!(config.is_auth_required());
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    role: ConnectionRole,
    auth_required: bool,
    login: String,
    ip: String,
    endpoint_capabilities: DataValueMap,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            role: ConnectionRole::Server,
            auth_required: false,
            login: ANONYMOUS_LOGIN.to_owned(),
            ip: "0.0.0.0".to_owned(),
            endpoint_capabilities: default_capabilities(),
        }
    }
}

impl ConnectionConfig {
    /// Default configuration for the client side of a session.
    #[must_use]
    pub fn client() -> Self { Self::default().with_role(ConnectionRole::Client) }

    #[must_use]
    pub fn with_role(mut self, role: ConnectionRole) -> Self {
        self.role = role;
        self
    }

    /// Require a successful `Authorize` before any other message.
    ///
    /// Ignored for clients.
    #[must_use]
    pub fn auth_required(mut self, required: bool) -> Self {
        self.auth_required = required;
        self
    }

    #[must_use]
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = login.into();
        self
    }

    #[must_use]
    pub fn ip(mut self, ip: impl Into<String>) -> Self {
        self.ip = ip.into();
        self
    }

    /// Set one local endpoint capability.
    #[must_use]
    pub fn capability(mut self, name: impl Into<String>, value: impl Into<DataValue>) -> Self {
        self.endpoint_capabilities.insert(name.into(), value.into());
        self
    }

    /// Replace the whole local capability map.
    #[must_use]
    pub fn capabilities(mut self, capabilities: DataValueMap) -> Self {
        self.endpoint_capabilities = capabilities;
        self
    }

    #[must_use]
    pub const fn role(&self) -> ConnectionRole { self.role }

    /// Whether the session gates on authorization; always false for clients.
    #[must_use]
    pub const fn is_auth_required(&self) -> bool {
        self.auth_required && matches!(self.role, ConnectionRole::Server)
    }

    #[must_use]
    pub const fn endpoint_capabilities(&self) -> &DataValueMap { &self.endpoint_capabilities }

    /// Build the peer record a new session starts from.
    #[must_use]
    pub fn client_info(&self) -> ClientInfo {
        ClientInfo::with_capabilities(
            self.login.clone(),
            self.ip.clone(),
            self.endpoint_capabilities.clone(),
        )
    }
}
