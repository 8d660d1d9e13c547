//! Per-peer session information and capability negotiation.

use std::{
    cmp::Ordering as CmpOrdering,
    fmt,
    hash::{Hash, Hasher},
    num::NonZeroUsize,
    sync::atomic::{AtomicU64, Ordering},
};

use log::debug;

use crate::{
    capability::EndpointCapabilityKind,
    schema::datatypes::{DataValue, DataValueMap},
};

/// Generation counter for [`ClientInfo`] ids; never reset.
static NEXT_CLIENT_ID: AtomicU64 = AtomicU64::new(0);

/// Login used when none is configured.
pub const ANONYMOUS_LOGIN: &str = "anonymousUser";

/// Default local frame limits advertised before negotiation.
pub const DEFAULT_PAYLOAD_SIZE: i64 = 10_000;

/// Chunked exchanges assembled at once when `MaxConcurrentMultipart` is not
/// negotiated.
pub const DEFAULT_MAX_CONCURRENT_MULTIPART: usize = 64;

/// Local capability map used when none is configured.
#[must_use]
pub fn default_capabilities() -> DataValueMap {
    [
        EndpointCapabilityKind::MaxWebSocketFramePayloadSize,
        EndpointCapabilityKind::MaxWebSocketMessagePayloadSize,
    ]
    .into_iter()
    .map(|kind| (kind.name().to_owned(), DataValue::Long(DEFAULT_PAYLOAD_SIZE)))
    .collect()
}

/// What a session knows about its peer.
///
/// Identity is the generation id assigned at construction: clones compare
/// equal to the original, separately constructed values never do.
#[derive(Clone, Debug)]
pub struct ClientInfo {
    id: u64,
    pub login: String,
    pub ip: String,
    pub authenticated: bool,
    pub endpoint_capabilities: DataValueMap,
}

impl ClientInfo {
    #[must_use]
    pub fn new(login: impl Into<String>, ip: impl Into<String>) -> Self {
        Self::with_capabilities(login, ip, default_capabilities())
    }

    #[must_use]
    pub fn with_capabilities(
        login: impl Into<String>,
        ip: impl Into<String>,
        endpoint_capabilities: DataValueMap,
    ) -> Self {
        Self {
            id: NEXT_CLIENT_ID.fetch_add(1, Ordering::Relaxed),
            login: login.into(),
            ip: ip.into(),
            authenticated: false,
            endpoint_capabilities,
        }
    }

    /// Generation id of this peer record.
    #[must_use]
    pub const fn id(&self) -> u64 { self.id }

    #[must_use]
    pub fn capability(&self, name: &str) -> Option<&DataValue> { self.endpoint_capabilities.get(name) }

    #[must_use]
    pub fn capability_as_i64(&self, name: &str) -> Option<i64> {
        self.capability(name).and_then(DataValue::as_i64)
    }

    /// Largest frame the session may emit, from the negotiated
    /// `MaxWebSocketMessagePayloadSize`.
    ///
    /// Missing, non-integral or non-positive values mean unbounded.
    #[must_use]
    pub fn max_frame_size(&self) -> Option<NonZeroUsize> {
        self.capability_as_i64(EndpointCapabilityKind::MaxWebSocketMessagePayloadSize.name())
            .and_then(|size| usize::try_from(size).ok())
            .and_then(NonZeroUsize::new)
    }

    /// Number of inbound chunked exchanges the session assembles at once,
    /// from the negotiated `MaxConcurrentMultipart`.
    #[must_use]
    pub fn max_concurrent_multipart(&self) -> usize {
        self.capability_as_i64(EndpointCapabilityKind::MaxConcurrentMultipart.name())
            .and_then(|count| usize::try_from(count).ok())
            .filter(|&count| count > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENT_MULTIPART)
    }

    /// Merge the capabilities advertised by the peer into the local ones.
    ///
    /// For every remote entry the tighter (smaller) of the local and remote
    /// value wins, and values of known capabilities are clamped into their
    /// published bounds. Values that cannot be compared keep the remote
    /// value.
    pub fn negotiate(&mut self, remote: &DataValueMap) {
        for (name, offered) in remote {
            let mut value = offered.clone();
            if let Some(local) = self.endpoint_capabilities.get(name) {
                match offered.compare(local) {
                    Some(CmpOrdering::Greater) => value = local.clone(),
                    Some(_) => {}
                    None => debug!(
                        "{self}: capability {name} offered {offered:?} not comparable with \
                         {local:?}; keeping offer"
                    ),
                }
            }
            if let Ok(kind) = name.parse::<EndpointCapabilityKind>() {
                value = kind.clamp(value);
            }
            self.endpoint_capabilities.insert(name.clone(), value);
        }
        debug!(
            "{self}: negotiated capabilities {:?}",
            self.endpoint_capabilities
        );
    }
}

impl Default for ClientInfo {
    fn default() -> Self { Self::new(ANONYMOUS_LOGIN, "0.0.0.0") }
}

impl PartialEq for ClientInfo {
    fn eq(&self, other: &Self) -> bool { self.id == other.id }
}

impl Eq for ClientInfo {}

impl Hash for ClientInfo {
    fn hash<H: Hasher>(&self, state: &mut H) { self.id.hash(state); }
}

impl fmt::Display for ClientInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ClientInfo[{}] {}<{}>", self.id, self.ip, self.login)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use rstest::rstest;

    use super::{ClientInfo, DEFAULT_MAX_CONCURRENT_MULTIPART};
    use crate::schema::datatypes::{DataValue, DataValueMap};

    fn caps(entries: &[(&str, DataValue)]) -> DataValueMap {
        entries
            .iter()
            .map(|(name, value)| ((*name).to_owned(), value.clone()))
            .collect()
    }

    #[test]
    fn identity_is_the_generation_id() {
        let first = ClientInfo::default();
        let second = ClientInfo::default();
        let copy = first.clone();

        assert_ne!(first, second);
        assert_eq!(first, copy);
        assert!(second.id() > first.id());
        let set: HashSet<_> = [first, second, copy].into_iter().collect();
        assert_eq!(set.len(), 2);
    }

    #[test]
    fn display_shows_id_ip_and_login() {
        let info = ClientInfo::new("alice", "10.0.0.1");
        assert_eq!(
            info.to_string(),
            format!("ClientInfo[{}] 10.0.0.1<alice>", info.id())
        );
    }

    #[test]
    fn negotiation_against_open_session_offer() {
        let mut info = ClientInfo::default();
        info.negotiate(&caps(&[
            ("MaxWebSocketFramePayloadSize", DataValue::Long(666)),
            ("MaxWebSocketMessagePayloadSize", DataValue::Long(10_000_000)),
            ("SupportsAlternateRequestUris", DataValue::Boolean(true)),
        ]));

        assert_eq!(info.capability_as_i64("MaxWebSocketFramePayloadSize"), Some(666));
        assert_eq!(info.capability_as_i64("MaxWebSocketMessagePayloadSize"), Some(10_000));
        assert_eq!(
            info.capability("SupportsAlternateRequestUris"),
            Some(&DataValue::Boolean(true))
        );
    }

    #[test]
    fn negotiation_against_request_session_offer() {
        let mut info = ClientInfo::default();
        info.negotiate(&caps(&[
            ("MaxWebSocketFramePayloadSize", DataValue::Long(10_000_000)),
            ("MaxWebSocketMessagePayloadSize", DataValue::Int(42)),
            ("SupportsAlternateRequestUris", DataValue::Boolean(false)),
        ]));

        assert_eq!(info.capability_as_i64("MaxWebSocketFramePayloadSize"), Some(10_000));
        assert_eq!(info.capability_as_i64("MaxWebSocketMessagePayloadSize"), Some(42));
        assert_eq!(
            info.capability("SupportsAlternateRequestUris"),
            Some(&DataValue::Boolean(false))
        );
        assert_eq!(info.max_frame_size().map(|size| size.get()), Some(42));
    }

    #[test]
    fn unknown_names_merge_without_clamping() {
        let mut info = ClientInfo::with_capabilities(
            "bob",
            "::1",
            caps(&[("VendorLimit", DataValue::Long(5))]),
        );
        info.negotiate(&caps(&[
            ("VendorLimit", DataValue::Long(3)),
            ("VendorFlag", DataValue::from("on")),
        ]));
        assert_eq!(info.capability_as_i64("VendorLimit"), Some(3));
        assert_eq!(info.capability("VendorFlag"), Some(&DataValue::from("on")));
    }

    #[test]
    fn incomparable_values_keep_the_offer() {
        let mut info = ClientInfo::with_capabilities(
            "bob",
            "::1",
            caps(&[("MaxPartSize", DataValue::from("big"))]),
        );
        info.negotiate(&caps(&[("MaxPartSize", DataValue::Long(50))]));
        assert_eq!(info.capability_as_i64("MaxPartSize"), Some(100_000));
    }

    #[rstest]
    #[case(DataValue::Long(0))]
    #[case(DataValue::Long(-5))]
    #[case(DataValue::from("unbounded"))]
    fn non_positive_or_non_numeric_limits_are_unbounded(#[case] value: DataValue) {
        let info = ClientInfo::with_capabilities(
            "bob",
            "::1",
            caps(&[("MaxWebSocketMessagePayloadSize", value)]),
        );
        assert_eq!(info.max_frame_size(), None);
    }

    #[rstest]
    #[case(Some(DataValue::Long(3)), 3)]
    #[case(Some(DataValue::Long(0)), DEFAULT_MAX_CONCURRENT_MULTIPART)]
    #[case(None, DEFAULT_MAX_CONCURRENT_MULTIPART)]
    fn concurrent_multipart_falls_back_to_the_default(#[case] value: Option<DataValue>, #[case] expected: usize) {
        let entries: Vec<_> = value.into_iter().map(|v| ("MaxConcurrentMultipart", v)).collect();
        let info = ClientInfo::with_capabilities("bob", "::1", caps(&entries));
        assert_eq!(info.max_concurrent_multipart(), expected);
    }
}
