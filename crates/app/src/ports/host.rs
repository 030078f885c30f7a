//! Host port — the plugin-facing surface of the bridge framework, and the
//! plugin instances the host drives once registration is done.
//!
//! The host calls the lifecycle in this order:
//!
//! 1. the plugin entry point registers a constructor
//!    ([`Host::register_accessory`] / [`Host::register_platform`])
//! 2. for each configured instance the host invokes that constructor with
//!    [`HostArgs`]
//! 3. platforms receive restored cached accessories through
//!    [`PlatformPlugin::configure_accessory`], then
//!    [`PlatformPlugin::did_finish_launching`]
//! 4. [`PlatformPlugin::shutdown`] on graceful shutdown

use std::sync::Arc;

use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::error::BridgeError;
use rusty_spotify_domain::service::Service;

use crate::capability::PlatformBinding;
use crate::ports::hap::HapRegistry;

/// Trailing constructor arguments the host supplies at instantiation time.
#[derive(Debug, Clone)]
pub struct HostArgs {
    /// Logger scoped to this instance.
    pub log: tracing::Span,
    /// The instance's configuration block, as found in the host config.
    pub config: serde_json::Value,
}

impl HostArgs {
    #[must_use]
    pub fn new(log: tracing::Span, config: serde_json::Value) -> Self {
        Self { log, config }
    }
}

/// A single accessory instance created by an accessory constructor.
pub trait AccessoryPlugin: Send + Sync {
    /// Services the host should expose for this accessory.
    fn services(&self) -> Vec<Service>;
}

/// A platform instance managing any number of accessories.
pub trait PlatformPlugin: Send + Sync {
    /// Hand back an accessory the host restored from its cache.
    fn configure_accessory(&self, accessory: PlatformAccessory);

    /// The host finished restoring cached accessories; start working.
    fn did_finish_launching(&self);

    /// Stop background work. The default is a no-op.
    fn shutdown(&self) {}
}

/// A constructor as the host stores it: only the trailing arguments remain.
pub type Constructor<T> = Box<dyn Fn(HostArgs) -> Result<T, BridgeError> + Send + Sync>;

/// Constructor registered through [`Host::register_accessory`].
pub type AccessoryConstructor = Constructor<Box<dyn AccessoryPlugin>>;

/// Constructor registered through [`Host::register_platform`].
pub type PlatformConstructor = Constructor<Box<dyn PlatformPlugin>>;

/// Runtime publication of platform accessories.
pub trait AccessoryRegistry: Send + Sync {
    fn register_platform_accessories(
        &self,
        plugin_name: &str,
        platform_name: &str,
        accessories: Vec<PlatformAccessory>,
    );

    fn unregister_platform_accessories(
        &self,
        plugin_name: &str,
        platform_name: &str,
        accessories: Vec<PlatformAccessory>,
    );
}

/// The host's plugin entry object.
pub trait Host {
    /// API version the host reports.
    fn version(&self) -> &str;

    /// Service/characteristic type registry.
    fn hap(&self) -> Arc<dyn HapRegistry>;

    /// Handle platforms use to publish accessories at runtime.
    fn accessory_registry(&self) -> Arc<dyn AccessoryRegistry>;

    fn register_accessory(
        &mut self,
        plugin_name: &str,
        type_name: &str,
        constructor: AccessoryConstructor,
        dynamic: bool,
    );

    fn register_platform(
        &mut self,
        plugin_name: &str,
        type_name: &str,
        constructor: PlatformConstructor,
        dynamic: bool,
    );
}

/// The collaborator module whose constructors the registrar binds.
///
/// Leading arguments (`capability` / `binding`) are fixed at registration
/// time; `args` arrive when the host instantiates.
pub trait PluginModule: Send + Sync {
    /// Build an accessory around a pre-bound capability object.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the instance
    /// cannot be created.
    fn construct_accessory(
        &self,
        capability: Service,
        args: HostArgs,
    ) -> Result<Box<dyn AccessoryPlugin>, BridgeError>;

    /// Build a platform around a pre-bound host handle and capability factories.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid or the instance
    /// cannot be created.
    fn construct_platform(
        &self,
        binding: PlatformBinding,
        args: HostArgs,
    ) -> Result<Box<dyn PlatformPlugin>, BridgeError>;
}
