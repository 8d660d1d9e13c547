//! Protocol id to handler table.
//!
//! The registry is assembled once through [`HandlerRegistry::builder`] and
//! then shared read-only between every session, typically as an
//! `Arc<HandlerRegistry>`.

use std::{collections::BTreeMap, fmt, sync::Arc};

use thiserror::Error;

use super::ProtocolHandler;
use crate::{
    connection::ConnectionRole,
    protocol::CommunicationProtocol,
    schema::datatypes::{SupportedProtocol, Version},
};

/// Errors raised while assembling a [`HandlerRegistry`].
#[derive(Debug, Error, PartialEq, Eq)]
#[non_exhaustive]
pub enum RegistryError {
    /// A handler for the protocol was already registered.
    #[error("protocol {0} was already registered")]
    DuplicateProtocol(CommunicationProtocol),
}

/// Frozen mapping from protocol to handler.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    handlers: BTreeMap<CommunicationProtocol, Arc<dyn ProtocolHandler>>,
}

impl HandlerRegistry {
    #[must_use]
    pub fn builder() -> HandlerRegistryBuilder { HandlerRegistryBuilder::default() }

    /// Handler registered for the protocol id found in a message header.
    #[must_use]
    pub fn get(&self, protocol: i32) -> Option<&Arc<dyn ProtocolHandler>> {
        let protocol = CommunicationProtocol::try_from(protocol).ok()?;
        self.handlers.get(&protocol)
    }

    #[must_use]
    pub fn contains(&self, protocol: CommunicationProtocol) -> bool { self.handlers.contains_key(&protocol) }

    /// Registered protocols, in id order.
    pub fn protocols(&self) -> impl Iterator<Item = CommunicationProtocol> + '_ { self.handlers.keys().copied() }

    /// Protocols advertised in `RequestSession`/`OpenSession`.
    ///
    /// Core is implied by every session and is not listed.
    #[must_use]
    pub fn supported_protocols(&self, role: ConnectionRole) -> Vec<SupportedProtocol> {
        self.protocols()
            .filter(|protocol| *protocol != CommunicationProtocol::Core)
            .map(|protocol| SupportedProtocol {
                protocol: protocol.id(),
                protocol_version: Version::ETP12,
                role: role.as_str().to_owned(),
                protocol_capabilities: BTreeMap::new(),
            })
            .collect()
    }
}

impl fmt::Debug for HandlerRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.handlers.keys()).finish()
    }
}

/// Builder for [`HandlerRegistry`].
#[derive(Default)]
pub struct HandlerRegistryBuilder {
    handlers: BTreeMap<CommunicationProtocol, Arc<dyn ProtocolHandler>>,
}

impl HandlerRegistryBuilder {
    /// Register `handler` for `protocol`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateProtocol`] if a handler for
    /// `protocol` has already been registered.
    pub fn register<H>(self, protocol: CommunicationProtocol, handler: H) -> Result<Self, RegistryError>
    where
        H: ProtocolHandler + 'static,
    {
        self.register_arc(protocol, Arc::new(handler))
    }

    /// Register an already shared handler.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateProtocol`] if a handler for
    /// `protocol` has already been registered.
    pub fn register_arc(
        mut self,
        protocol: CommunicationProtocol,
        handler: Arc<dyn ProtocolHandler>,
    ) -> Result<Self, RegistryError> {
        if self.handlers.contains_key(&protocol) {
            return Err(RegistryError::DuplicateProtocol(protocol));
        }
        self.handlers.insert(protocol, handler);
        Ok(self)
    }

    #[must_use]
    pub fn build(self) -> HandlerRegistry {
        HandlerRegistry {
            handlers: self.handlers,
        }
    }
}
