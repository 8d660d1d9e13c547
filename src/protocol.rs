//! Published ETP v1.2 protocol ids.

use std::fmt;

use crate::error::EtpError;

macro_rules! protocols {
    ($($(#[$meta:meta])* $name:ident = $id:literal),+ $(,)?) => {
        /// Every protocol published for ETP v1.2.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(i32)]
        pub enum CommunicationProtocol {
            $($(#[$meta])* $name = $id),+
        }

        impl CommunicationProtocol {
            pub const ALL: &'static [Self] = &[$(Self::$name),+];

            #[must_use]
            pub const fn id(self) -> i32 { self as i32 }

            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$name => stringify!($name)),+
                }
            }
        }

        impl TryFrom<i32> for CommunicationProtocol {
            type Error = EtpError;

            fn try_from(id: i32) -> Result<Self, Self::Error> {
                match id {
                    $($id => Ok(Self::$name),)+
                    other => Err(EtpError::UnsupportedProtocol(other)),
                }
            }
        }
    };
}

protocols! {
    /// Session lifecycle, authorization and errors.
    Core = 0,
    ChannelStreaming = 1,
    ChannelDataFrame = 2,
    /// Enumerates the contents of a store.
    Discovery = 3,
    /// CRUD operations on data objects.
    Store = 4,
    StoreNotification = 5,
    GrowingObject = 6,
    GrowingObjectNotification = 7,
    DataArray = 9,
    DiscoveryQuery = 13,
    StoreQuery = 14,
    GrowingObjectQuery = 16,
    Transaction = 18,
    ChannelSubscribe = 21,
    ChannelDataLoad = 22,
    Dataspace = 24,
    SupportedTypes = 25,
    /// Custom protocol, formerly protocol 8 in ETP v1.1.
    WitsmlSoap = 2000,
}

impl From<CommunicationProtocol> for i32 {
    fn from(protocol: CommunicationProtocol) -> Self { protocol.id() }
}

impl fmt::Display for CommunicationProtocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name(), self.id())
    }
}
