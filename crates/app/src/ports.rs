//! Port definitions — traits that hosts, plugins and adapters implement.
//!
//! Ports are the boundaries between the registrar and the outside world.
//! They are defined here (in `app`) so that the local bridge, the Spotify
//! adapter and test stubs can all depend on them without creating circular
//! dependencies.

pub mod hap;
pub mod host;
pub mod playback;

pub use hap::HapRegistry;
pub use host::{
    AccessoryConstructor, AccessoryPlugin, AccessoryRegistry, Constructor, Host, HostArgs,
    PlatformConstructor, PlatformPlugin, PluginModule,
};
pub use playback::PlaybackApi;
