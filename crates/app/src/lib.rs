//! # rusty-spotify-app
//!
//! Application layer — the **capability registrar** and **port definitions** (traits).
//!
//! ## Responsibilities
//! - Define the **host ports** a bridge framework exposes to a plugin:
//!   - `HapRegistry` — service/characteristic type registry, UUID generator, accessory base
//!   - `Host` — registration entry points (`register_accessory`, `register_platform`)
//!   - `AccessoryRegistry` — publishing platform accessories at runtime
//! - Define the **plugin ports** the host drives (`AccessoryPlugin`, `PlatformPlugin`)
//!   and the collaborator module the registrar binds to (`PluginModule`)
//! - Define the **playback port** (`PlaybackApi`) the collaborator talks to
//! - Build capability objects and bind constructors (`CapabilityContext`, `BoundConstructor`)
//! - Register one capability shape per call (`Registrar`)
//! - Provide an **in-process host** (`bridge::LocalBridge`) that needs no IO
//!
//! ## Dependency rule
//! Depends on `rusty-spotify-domain` only.
//! Never imports adapter crates. Adapters depend on *this* crate, not the reverse.

pub mod bridge;
pub mod capability;
pub mod constructor;
pub mod ports;
pub mod registrar;
