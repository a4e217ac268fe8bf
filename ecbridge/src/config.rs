//! Native engine availability.
//!
//! Whether curve operations should be routed to a [`CurveEngine`] is decided
//! once, from [`NativeConfig`], and then carried around as an immutable
//! [`NativeSupport`] value.

use std::sync::OnceLock;

use crate::{
    curve::{is_ec_curve_oid, is_ecdsa_curve_oid, is_xdh_curve_name},
    CurveEngine, Error, Gateway, Result,
};

/// Environment variable enabling the curve engine.
pub const ENABLE_NATIVE_ENV: &str = "ECBRIDGE_ENABLE_NATIVE";

/// Engine configuration.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NativeConfig {
    /// Route curve operations to the engine.
    pub enabled: bool,
}

impl NativeConfig {
    /// Read [`ENABLE_NATIVE_ENV`]: `true`, `1` or `yes` (any case) enable the
    /// engine, anything else or an unset variable leaves it disabled.
    pub fn from_env() -> Self {
        let value = std::env::var(ENABLE_NATIVE_ENV).ok();
        let config = Self::from_value(value.as_deref());
        tracing::debug!(enabled = config.enabled, "native curve engine configuration");
        config
    }

    fn from_value(value: Option<&str>) -> Self {
        let enabled = value.is_some_and(|v| {
            let v = v.trim();
            ["true", "1", "yes"].iter().any(|t| v.eq_ignore_ascii_case(t))
        });
        Self { enabled }
    }
}

/// Availability of the curve engine, fixed at construction.
#[derive(Clone, Debug, Default)]
pub struct NativeSupport {
    gateway: Option<Gateway>,
}

impl NativeSupport {
    /// Build from a configuration and the engine to use when enabled.
    pub fn new(config: NativeConfig, engine: impl CurveEngine + 'static) -> Self {
        Self {
            gateway: config.enabled.then(|| Gateway::new(engine)),
        }
    }

    /// Support with the engine switched off.
    pub fn disabled() -> Self {
        Self { gateway: None }
    }

    /// Process wide value: [`NativeConfig::from_env`] with the
    /// [`SoftEngine`](crate::SoftEngine), initialized on first use.
    pub fn process() -> &'static Self {
        static SUPPORT: OnceLock<NativeSupport> = OnceLock::new();
        SUPPORT.get_or_init(|| Self::new(NativeConfig::from_env(), crate::SoftEngine))
    }

    /// Is the engine available?
    pub fn is_available(&self) -> bool {
        self.gateway.is_some()
    }

    /// Gateway to the engine, or [`Error::Unavailable`].
    pub fn gateway(&self) -> Result<&Gateway> {
        self.gateway.as_ref().ok_or(Error::Unavailable)
    }

    /// Should EC key generation and ECDH for the curve with DER OID `oid`
    /// use the engine?
    pub fn use_native_ec(&self, oid: &[u8]) -> bool {
        self.is_available() && is_ec_curve_oid(oid)
    }

    /// Should signatures for the curve with DER OID `oid` use the engine?
    pub fn use_native_ecdsa(&self, oid: &[u8]) -> bool {
        self.is_available() && is_ecdsa_curve_oid(oid)
    }

    /// Should XDH over the curve named `name` use the engine?
    pub fn use_native_xdh(&self, name: &str) -> bool {
        self.is_available() && is_xdh_curve_name(name)
    }
}
