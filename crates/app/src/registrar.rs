//! Capability registrar — the plugin entry point.
//!
//! Translates a [`CapabilityKind`] into the capability object(s) and the single
//! registration call the host requires. Nothing here is retried or caught:
//! a host whose API does not match aborts plugin loading.

use std::sync::Arc;

use rusty_spotify_domain::error::BridgeError;
use rusty_spotify_domain::plugin::{ACCESSORY_DISPLAY_NAME, CapabilityKind};
use rusty_spotify_domain::service::ServiceType;

use crate::capability::{CapabilityContext, PlatformBinding};
use crate::constructor::BoundConstructor;
use crate::ports::host::{Host, PluginModule};

/// Registers one capability shape with a host.
#[derive(Debug, Clone)]
pub struct Registrar {
    kind: CapabilityKind,
    display_name: String,
    default_capability: Option<ServiceType>,
}

impl Registrar {
    #[must_use]
    pub fn new(kind: CapabilityKind) -> Self {
        Self {
            kind,
            display_name: ACCESSORY_DISPLAY_NAME.to_string(),
            default_capability: None,
        }
    }

    /// Display name of the capability object built at registration time.
    #[must_use]
    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Build a capability of `service_type` and bind it to the platform
    /// constructor alongside the factories. Ignored by accessory kinds.
    #[must_use]
    pub fn with_default_capability(mut self, service_type: ServiceType) -> Self {
        self.default_capability = Some(service_type);
        self
    }

    /// Build the capability, bind it to `module`'s constructor and register
    /// the result with `host` (always `dynamic = true`).
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::HostApi`] when the host lacks a service or
    /// characteristic type the capability needs; nothing is registered then.
    #[tracing::instrument(skip(self, host, module), fields(kind = %self.kind))]
    pub fn register<H, M>(&self, host: &mut H, module: Arc<M>) -> Result<(), BridgeError>
    where
        H: Host + ?Sized,
        M: PluginModule + ?Sized + 'static,
    {
        tracing::info!(version = host.version(), "homebridge API version");

        let identity = self.kind.identity();
        let capabilities = CapabilityContext::new(host.hap());

        match self.kind.service_type() {
            Some(service_type) => {
                let capability = capabilities.create(service_type, &self.display_name)?;
                let constructor = BoundConstructor::bind(
                    move |capability, args| module.construct_accessory(capability, args),
                    capability,
                );
                host.register_accessory(
                    identity.plugin_name,
                    identity.type_name,
                    constructor.into_constructor(),
                    true,
                );
            }
            None => {
                let default_capability = self
                    .default_capability
                    .map(|service_type| capabilities.create(service_type, &self.display_name))
                    .transpose()?;
                let binding = PlatformBinding {
                    host: host.accessory_registry(),
                    capabilities,
                    default_capability,
                };
                let constructor = BoundConstructor::bind(
                    move |binding, args| module.construct_platform(binding, args),
                    binding,
                );
                host.register_platform(
                    identity.plugin_name,
                    identity.type_name,
                    constructor.into_constructor(),
                    true,
                );
            }
        }

        tracing::debug!(identity = %identity, "plugin registered");
        Ok(())
    }
}

/// Register `kind` with `host`, binding `module`'s constructors.
///
/// # Errors
///
/// See [`Registrar::register`].
pub fn initialize<H, M>(
    host: &mut H,
    kind: CapabilityKind,
    module: Arc<M>,
) -> Result<(), BridgeError>
where
    H: Host + ?Sized,
    M: PluginModule + ?Sized + 'static,
{
    Registrar::new(kind).register(host, module)
}
