//! In-process host — registers plugins, instantiates them from configuration
//! and keeps the resulting accessories reachable.
//!
//! Nothing here performs IO. The daemon wires a [`LocalBridge`] to the
//! Spotify adapter and exposes the [`RunningBridge`] over HTTP.

mod hap;
mod registry;

use std::sync::Arc;

use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::characteristic::{Characteristic, CharacteristicType};
use rusty_spotify_domain::error::{BridgeError, NotFoundError, ValidationError};
use rusty_spotify_domain::id::AccessoryUuid;
use rusty_spotify_domain::service::ServiceType;

pub use self::hap::LocalHap;
pub use self::registry::{LocalAccessoryRegistry, PublishedAccessory};

use crate::ports::{
    AccessoryConstructor, AccessoryPlugin, AccessoryRegistry, HapRegistry, Host, HostArgs,
    PlatformConstructor, PlatformPlugin,
};

/// API version reported by [`LocalBridge::default`].
pub const DEFAULT_API_VERSION: &str = "2.7";

/// A constructor stored by the bridge, tagged by what it builds.
pub enum RegisteredConstructor {
    Accessory(AccessoryConstructor),
    Platform(PlatformConstructor),
}

impl RegisteredConstructor {
    fn kind(&self) -> EntryKind {
        match self {
            Self::Accessory(_) => EntryKind::Accessory,
            Self::Platform(_) => EntryKind::Platform,
        }
    }
}

/// One `register_accessory` / `register_platform` call.
pub struct Registration {
    pub plugin_name: String,
    pub type_name: String,
    pub dynamic: bool,
    pub constructor: RegisteredConstructor,
}

impl Registration {
    /// Whether `type_ref` names this registration, either as the bare type
    /// or qualified as `plugin.type`.
    fn answers_to(&self, type_ref: &str) -> bool {
        type_ref == self.type_name
            || type_ref
                .split_once('.')
                .is_some_and(|(plugin, ty)| plugin == self.plugin_name && ty == self.type_name)
    }
}

impl std::fmt::Debug for Registration {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registration")
            .field("plugin_name", &self.plugin_name)
            .field("type_name", &self.type_name)
            .field("dynamic", &self.dynamic)
            .field("kind", &self.constructor.kind())
            .finish()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryKind {
    Accessory,
    Platform,
}

impl EntryKind {
    fn key(self) -> &'static str {
        match self {
            Self::Accessory => "accessory",
            Self::Platform => "platform",
        }
    }
}

/// A configured plugin instance, as found in the host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct PluginEntry {
    pub kind: EntryKind,
    pub type_name: String,
    pub name: String,
    pub config: serde_json::Value,
}

impl PluginEntry {
    /// An accessory block; its type is read from the `accessory` key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] when the key is missing.
    pub fn accessory(config: serde_json::Value) -> Result<Self, BridgeError> {
        Self::parse(EntryKind::Accessory, config)
    }

    /// A platform block; its type is read from the `platform` key.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidConfig`] when the key is missing.
    pub fn platform(config: serde_json::Value) -> Result<Self, BridgeError> {
        Self::parse(EntryKind::Platform, config)
    }

    fn parse(kind: EntryKind, config: serde_json::Value) -> Result<Self, BridgeError> {
        let type_name = config
            .get(kind.key())
            .and_then(serde_json::Value::as_str)
            .filter(|ty| !ty.trim().is_empty())
            .ok_or_else(|| {
                ValidationError::InvalidConfig(format!("missing `{}` type", kind.key()))
            })?
            .to_string();
        let name = config
            .get("name")
            .and_then(serde_json::Value::as_str)
            .filter(|name| !name.trim().is_empty())
            .unwrap_or(&type_name)
            .to_string();
        Ok(Self {
            kind,
            type_name,
            name,
            config,
        })
    }
}

/// A host living in the same process as its plugins.
pub struct LocalBridge {
    version: String,
    hap: Arc<LocalHap>,
    registry: Arc<LocalAccessoryRegistry>,
    registrations: Vec<Registration>,
}

impl Default for LocalBridge {
    fn default() -> Self {
        Self::new(DEFAULT_API_VERSION)
    }
}

impl LocalBridge {
    #[must_use]
    pub fn new(version: impl Into<String>) -> Self {
        Self {
            version: version.into(),
            hap: Arc::new(LocalHap::default()),
            registry: Arc::new(LocalAccessoryRegistry::default()),
            registrations: Vec::new(),
        }
    }

    /// Replace the type registry.
    #[must_use]
    pub fn with_hap(mut self, hap: LocalHap) -> Self {
        self.hap = Arc::new(hap);
        self
    }

    #[must_use]
    pub fn registrations(&self) -> &[Registration] {
        &self.registrations
    }

    #[must_use]
    pub fn registry(&self) -> Arc<LocalAccessoryRegistry> {
        Arc::clone(&self.registry)
    }

    /// Seed the accessory cache, as if a previous run had published these.
    /// They are handed to the matching platform on [`launch`](Self::launch).
    pub fn restore(
        &self,
        plugin_name: &str,
        platform_name: &str,
        accessories: Vec<PlatformAccessory>,
    ) {
        self.registry
            .register_platform_accessories(plugin_name, platform_name, accessories);
    }

    fn register(&mut self, registration: Registration) {
        tracing::info!(
            plugin = %registration.plugin_name,
            type_name = %registration.type_name,
            kind = ?registration.constructor.kind(),
            dynamic = registration.dynamic,
            "registered plugin type"
        );
        if let Some(existing) = self.registrations.iter_mut().find(|r| {
            r.plugin_name == registration.plugin_name && r.type_name == registration.type_name
        }) {
            tracing::warn!(
                plugin = %registration.plugin_name,
                type_name = %registration.type_name,
                "type registered twice, replacing earlier registration"
            );
            *existing = registration;
        } else {
            self.registrations.push(registration);
        }
    }

    /// Instantiate every entry, then start the platforms.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] for an entry whose type was never
    /// registered, or whatever a constructor fails with.
    #[tracing::instrument(skip_all, fields(entries = entries.len()))]
    pub fn launch(self, entries: Vec<PluginEntry>) -> Result<RunningBridge, BridgeError> {
        let mut accessories = Vec::new();
        let mut accessory_plugins = Vec::new();
        let mut platforms = Vec::new();

        for entry in entries {
            let registration = self
                .registrations
                .iter()
                .find(|r| r.constructor.kind() == entry.kind && r.answers_to(&entry.type_name))
                .ok_or_else(|| NotFoundError {
                    entity: entry.kind.key(),
                    id: entry.type_name.clone(),
                })?;

            let log = tracing::info_span!(
                "plugin",
                type_name = %registration.type_name,
                name = %entry.name
            );
            let args = HostArgs::new(log, entry.config);

            match &registration.constructor {
                RegisteredConstructor::Accessory(constructor) => {
                    let plugin = constructor(args)?;
                    let uuid = self
                        .hap
                        .generate_uuid(&format!("{}:{}", registration.type_name, entry.name));
                    let accessory = self.hap.create_accessory(&entry.name, uuid)?;
                    for service in plugin.services() {
                        accessory.add_service(service);
                    }
                    tracing::info!(name = %entry.name, %uuid, "accessory ready");
                    accessories.push(accessory);
                    accessory_plugins.push(plugin);
                }
                RegisteredConstructor::Platform(constructor) => {
                    let platform = constructor(args)?;
                    for cached in self
                        .registry
                        .accessories_of(&registration.plugin_name, &registration.type_name)
                    {
                        platform.configure_accessory(cached);
                    }
                    tracing::info!(name = %entry.name, "platform ready");
                    platforms.push(platform);
                }
            }
        }

        for platform in &platforms {
            platform.did_finish_launching();
        }

        Ok(RunningBridge {
            accessories,
            _accessory_plugins: accessory_plugins,
            platforms,
            registry: self.registry,
        })
    }
}

impl Host for LocalBridge {
    fn version(&self) -> &str {
        &self.version
    }

    fn hap(&self) -> Arc<dyn HapRegistry> {
        self.hap.clone()
    }

    fn accessory_registry(&self) -> Arc<dyn AccessoryRegistry> {
        self.registry.clone()
    }

    fn register_accessory(
        &mut self,
        plugin_name: &str,
        type_name: &str,
        constructor: AccessoryConstructor,
        dynamic: bool,
    ) {
        self.register(Registration {
            plugin_name: plugin_name.to_string(),
            type_name: type_name.to_string(),
            dynamic,
            constructor: RegisteredConstructor::Accessory(constructor),
        });
    }

    fn register_platform(
        &mut self,
        plugin_name: &str,
        type_name: &str,
        constructor: PlatformConstructor,
        dynamic: bool,
    ) {
        self.register(Registration {
            plugin_name: plugin_name.to_string(),
            type_name: type_name.to_string(),
            dynamic,
            constructor: RegisteredConstructor::Platform(constructor),
        });
    }
}

/// The bridge after launch: live plugin instances and their accessories.
pub struct RunningBridge {
    accessories: Vec<PlatformAccessory>,
    _accessory_plugins: Vec<Box<dyn AccessoryPlugin>>,
    platforms: Vec<Box<dyn PlatformPlugin>>,
    registry: Arc<LocalAccessoryRegistry>,
}

impl RunningBridge {
    /// Accessory-plugin accessories followed by platform-published ones.
    #[must_use]
    pub fn accessories(&self) -> Vec<PlatformAccessory> {
        let mut all = self.accessories.clone();
        all.extend(self.registry.accessories());
        all
    }

    #[must_use]
    pub fn find_accessory(&self, uuid: AccessoryUuid) -> Option<PlatformAccessory> {
        self.accessories().into_iter().find(|a| a.uuid() == uuid)
    }

    /// Look up a characteristic by accessory, service and characteristic type.
    ///
    /// # Errors
    ///
    /// Returns [`BridgeError::NotFound`] naming the first missing level.
    pub fn find_characteristic(
        &self,
        uuid: AccessoryUuid,
        service_type: ServiceType,
        characteristic: CharacteristicType,
    ) -> Result<Characteristic, BridgeError> {
        let accessory = self.find_accessory(uuid).ok_or_else(|| NotFoundError {
            entity: "accessory",
            id: uuid.to_string(),
        })?;
        let service = accessory
            .get_service(service_type)
            .ok_or_else(|| NotFoundError {
                entity: "service",
                id: service_type.to_string(),
            })?;
        Ok(service.characteristic(characteristic)?)
    }

    /// Stop every platform's background work.
    pub fn shutdown(&self) {
        tracing::info!(platforms = self.platforms.len(), "shutting down platforms");
        for platform in &self.platforms {
            platform.shutdown();
        }
    }
}
