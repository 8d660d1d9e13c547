//! Endpoint capabilities negotiated during the session handshake.
//!
//! Each [`EndpointCapabilityKind`] carries the static default, bounds and
//! unit published for it. Bounds apply to numeric values only.

use std::{fmt, str::FromStr};

use thiserror::Error;

use crate::schema::datatypes::DataValue;

/// Capability name not defined by ETP v1.2.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
#[error("unknown endpoint capability `{0}`")]
pub struct UnknownCapability(pub String);

macro_rules! capability_kinds {
    ($($kind:ident { default: $default:expr, min: $min:expr, max: $max:expr, unit: $unit:expr }),+ $(,)?) => {
        /// Named, bounded parameters exchanged in `RequestSession` and
        /// `OpenSession`.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum EndpointCapabilityKind {
            $($kind),+
        }

        impl EndpointCapabilityKind {
            /// Every defined capability.
            pub const ALL: &'static [Self] = &[$(Self::$kind),+];

            /// Wire name of the capability.
            #[must_use]
            pub const fn name(self) -> &'static str {
                match self {
                    $(Self::$kind => stringify!($kind)),+
                }
            }

            /// Published default value, if any.
            #[must_use]
            pub fn default_value(self) -> Option<DataValue> {
                match self {
                    $(Self::$kind => $default),+
                }
            }

            /// Inclusive lower bound.
            #[must_use]
            pub const fn min(self) -> Option<i64> {
                match self {
                    $(Self::$kind => $min),+
                }
            }

            /// Inclusive upper bound.
            #[must_use]
            pub const fn max(self) -> Option<i64> {
                match self {
                    $(Self::$kind => $max),+
                }
            }

            #[must_use]
            pub const fn unit(self) -> Option<&'static str> {
                match self {
                    $(Self::$kind => $unit),+
                }
            }
        }

        impl FromStr for EndpointCapabilityKind {
            type Err = UnknownCapability;

            fn from_str(name: &str) -> Result<Self, Self::Err> {
                match name {
                    $(stringify!($kind) => Ok(Self::$kind),)+
                    other => Err(UnknownCapability(other.to_owned())),
                }
            }
        }
    };
}

const SECONDS: Option<&str> = Some("seconds, <count of seconds>");
const BYTES: Option<&str> = Some("bytes, <number of bytes>");

capability_kinds! {
    ActiveTimeoutPeriod { default: Some(DataValue::Long(3600)), min: Some(60), max: None, unit: SECONDS },
    AuthorizationDetails { default: None, min: None, max: None, unit: None },
    ChangePropagationPeriod { default: Some(DataValue::Long(5)), min: Some(1), max: Some(600), unit: SECONDS },
    ChangeRetentionPeriod { default: Some(DataValue::Long(86_400)), min: Some(86_400), max: None, unit: SECONDS },
    MaxConcurrentMultipart { default: None, min: Some(1), max: None, unit: Some("count, <count of messages>") },
    MaxDataObjectSize { default: None, min: Some(100_000), max: None, unit: Some("bytes") },
    MaxPartSize { default: None, min: Some(100_000), max: None, unit: BYTES },
    MaxSessionClientCount { default: None, min: Some(2), max: None, unit: Some("count, <count of sessions>") },
    MaxSessionGlobalCount { default: None, min: Some(2), max: None, unit: Some("count, <count of sessions>") },
    MaxWebSocketFramePayloadSize { default: None, min: None, max: None, unit: BYTES },
    MaxWebSocketMessagePayloadSize { default: None, min: None, max: None, unit: BYTES },
    MultipartMessageTimeoutPeriod { default: None, min: Some(60), max: None, unit: SECONDS },
    ResponseTimeoutPeriod { default: Some(DataValue::Long(300)), min: Some(60), max: None, unit: SECONDS },
    RequestSessionTimeoutPeriod { default: Some(DataValue::Long(45)), min: Some(5), max: None, unit: SECONDS },
    SessionEstablishmentTimeoutPeriod { default: Some(DataValue::Long(60)), min: Some(5), max: None, unit: SECONDS },
    SupportsAlternateRequestUris { default: Some(DataValue::Boolean(false)), min: None, max: None, unit: None },
    SupportsMessageHeaderExtensions { default: Some(DataValue::Boolean(false)), min: None, max: None, unit: None },
}

impl EndpointCapabilityKind {
    /// Clamp a numeric value into `[min, max]`.
    ///
    /// Integral values keep their variant; other kinds of value pass
    /// through unchanged.
    #[must_use]
    pub fn clamp(self, value: DataValue) -> DataValue {
        let lower = self.min().unwrap_or(i64::MIN);
        let upper = self.max().unwrap_or(i64::MAX);
        match value {
            DataValue::Int(v) => {
                let clamped = i64::from(v).clamp(lower, upper);
                i32::try_from(clamped).map_or(DataValue::Long(clamped), DataValue::Int)
            }
            DataValue::Long(v) => DataValue::Long(v.clamp(lower, upper)),
            DataValue::Double(v) => DataValue::Double(clamp_float(v, self.min(), self.max())),
            #[expect(clippy::cast_possible_truncation, reason = "bounds are small integers")]
            DataValue::Float(v) => DataValue::Float(
                clamp_float(f64::from(v), self.min(), self.max()) as f32,
            ),
            other => other,
        }
    }
}

#[expect(clippy::cast_precision_loss, reason = "bounds are small integers")]
fn clamp_float(value: f64, min: Option<i64>, max: Option<i64>) -> f64 {
    let value = min.map_or(value, |min| value.max(min as f64));
    max.map_or(value, |max| value.min(max as f64))
}

impl fmt::Display for EndpointCapabilityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(self.name()) }
}
