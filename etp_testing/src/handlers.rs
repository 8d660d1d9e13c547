//! Example protocol handlers used by the integration tests.
//!
//! They implement just enough behaviour to exercise the session: a Core
//! handler that opens sessions and checks Basic credentials, an in-memory
//! dataspace store, a discovery handler returning a configurable resource
//! list, and a data object store.

use std::{
    collections::BTreeMap,
    sync::{Arc, Mutex},
};

use async_trait::async_trait;
use base64::{Engine as _, engine::general_purpose::STANDARD};
use etpproto::{
    client_info::ClientInfo,
    error::EtpError,
    handler::{CoreHandler, DataspaceHandler, DiscoveryHandler, StoreHandler},
    message::{Message, MessageHeader},
    response::Response,
    schema::{
        core::{Authorize, AuthorizeResponse, OpenSession, Ping, Pong, RequestSession},
        dataspace::{
            DeleteDataspaces,
            DeleteDataspacesResponse,
            GetDataspaces,
            GetDataspacesResponse,
            PutDataspaces,
            PutDataspacesResponse,
        },
        datatypes::{DataObject, Dataspace, Resource, SupportedProtocol, Uuid},
        discovery::{GetResources, GetResourcesResponse},
        store::{GetDataObjects, GetDataObjectsResponse, PutDataObjects, PutDataObjectsResponse},
    },
};

/// Login accepted by [`ExampleCore`].
pub const USERNAME: &str = "usernameTest";
/// Password accepted by [`ExampleCore`].
pub const PASSWORD: &str = "passwordTest";

/// Build an HTTP Basic authorization value.
#[must_use]
pub fn basic_auth(username: &str, password: &str) -> String {
    format!("Basic {}", STANDARD.encode(format!("{username}:{password}")))
}

fn credentials_match(authorization: &str) -> bool {
    let Some((scheme, credentials)) = authorization.split_once(' ') else {
        return false;
    };
    if !scheme.eq_ignore_ascii_case("basic") {
        return false;
    }
    let Ok(decoded) = STANDARD.decode(credentials.trim()) else {
        return false;
    };
    let Ok(decoded) = String::from_utf8(decoded) else {
        return false;
    };
    decoded.split_once(':') == Some((USERNAME, PASSWORD))
}

/// Core handler answering `RequestSession`, `Authorize` and `Ping`, and
/// accepting `OpenSession` on the client side.
#[derive(Clone, Debug, Default)]
pub struct ExampleCore {
    /// Protocols listed in the `OpenSession` reply.
    pub supported_protocols: Vec<SupportedProtocol>,
}

#[async_trait]
impl CoreHandler for ExampleCore {
    async fn on_request_session(
        &self,
        message: RequestSession,
        _header: &MessageHeader,
        client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::reply(OpenSession {
            application_name: "etp_testing".to_owned(),
            application_version: "1.2".to_owned(),
            server_instance_id: Uuid::new_v4(),
            supported_protocols: self.supported_protocols.clone(),
            supported_formats: message.supported_formats,
            current_date_time: message.current_date_time,
            session_id: Uuid::new_v4(),
            endpoint_capabilities: client_info.endpoint_capabilities.clone(),
            ..OpenSession::default()
        }))
    }

    async fn on_open_session(
        &self,
        _message: OpenSession,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::Empty)
    }

    async fn on_authorize(
        &self,
        message: Authorize,
        _header: &MessageHeader,
        client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let success = credentials_match(&message.authorization);
        if success {
            client_info.authenticated = true;
            client_info.login = USERNAME.to_owned();
        }
        Ok(Response::reply(AuthorizeResponse {
            success,
            challenges: Vec::new(),
        }))
    }

    async fn on_ping(
        &self,
        message: Ping,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        Ok(Response::reply(Pong {
            current_date_time: message.current_date_time,
        }))
    }
}

/// In-memory dataspace store.
#[derive(Clone, Debug, Default)]
pub struct ExampleDataspace {
    dataspaces: Arc<Mutex<BTreeMap<String, Dataspace>>>,
}

impl ExampleDataspace {
    fn with_store<T>(&self, f: impl FnOnce(&mut BTreeMap<String, Dataspace>) -> T) -> Result<T, EtpError> {
        let mut store = self
            .dataspaces
            .lock()
            .map_err(|_| EtpError::Internal("dataspace store poisoned".to_owned()))?;
        Ok(f(&mut store))
    }
}

#[async_trait]
impl DataspaceHandler for ExampleDataspace {
    async fn on_get_dataspaces(
        &self,
        _message: GetDataspaces,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let dataspaces = self.with_store(|store| store.values().cloned().collect())?;
        Ok(Response::reply(GetDataspacesResponse { dataspaces }))
    }

    async fn on_put_dataspaces(
        &self,
        message: PutDataspaces,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let success = self.with_store(|store| {
            message
                .dataspaces
                .into_iter()
                .map(|(key, dataspace)| {
                    let uri = dataspace.uri.clone();
                    store.insert(uri.clone(), dataspace);
                    (key, uri)
                })
                .collect()
        })?;
        Ok(Response::reply(PutDataspacesResponse { success }))
    }

    async fn on_delete_dataspaces(
        &self,
        message: DeleteDataspaces,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let removed: BTreeMap<String, String> = self.with_store(|store| {
            message
                .uris
                .into_iter()
                .filter(|(_, uri)| store.remove(uri).is_some())
                .collect()
        })?;
        if removed.is_empty() {
            return Err(EtpError::NotFound);
        }
        Ok(Response::reply(DeleteDataspacesResponse { success: removed }))
    }
}

/// Discovery handler returning `count` generated resources.
#[derive(Clone, Copy, Debug, Default)]
pub struct ExampleDiscovery {
    pub count: usize,
}

/// Resource number `index` as generated by [`ExampleDiscovery`].
#[must_use]
pub fn resource(index: usize) -> Resource {
    Resource {
        uri: format!("eml:///dataspace('test')/resqml20.obj_Grid2dRepresentation({index:08})"),
        name: format!("grid {index}"),
        ..Resource::default()
    }
}

#[async_trait]
impl DiscoveryHandler for ExampleDiscovery {
    async fn on_get_resources(
        &self,
        _message: GetResources,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let resources = (0..self.count).map(resource).collect();
        Ok(Response::reply(GetResourcesResponse { resources }))
    }
}

/// Data object store keyed by URI.
#[derive(Clone, Debug, Default)]
pub struct ExampleStore {
    objects: Arc<Mutex<BTreeMap<String, DataObject>>>,
}

impl ExampleStore {
    /// Copy of the stored object under `uri`.
    #[must_use]
    pub fn get(&self, uri: &str) -> Option<DataObject> {
        self.objects.lock().ok().and_then(|objects| objects.get(uri).cloned())
    }

    /// Store `object` under its resource URI.
    pub fn insert(&self, object: DataObject) {
        if let Ok(mut objects) = self.objects.lock() {
            objects.insert(object.resource.uri.clone(), object);
        }
    }
}

#[async_trait]
impl StoreHandler for ExampleStore {
    async fn on_put_data_objects(
        &self,
        message: PutDataObjects,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let success = message
            .data_objects
            .into_iter()
            .map(|(key, object)| {
                self.insert(object);
                (key, Default::default())
            })
            .collect();
        Ok(Response::reply(PutDataObjectsResponse { success }))
    }

    async fn on_get_data_objects(
        &self,
        message: GetDataObjects,
        _header: &MessageHeader,
        _client_info: &mut ClientInfo,
    ) -> Result<Response, EtpError> {
        let mut data_objects = BTreeMap::new();
        for (key, uri) in message.uris {
            let object = self.get(&uri).ok_or(EtpError::NotFound)?;
            data_objects.insert(key, object);
        }
        Ok(Response::Single(Message::from_body(GetDataObjectsResponse { data_objects })))
    }
}
