//! # rusty-spotify-domain
//!
//! Pure capability model for the rusty-spotify bridge plugin.
//!
//! ## Responsibilities
//! - Foundational types: accessory UUIDs, error conventions, timestamps
//! - Define **Characteristics** (typed readable/writable properties: On, Brightness, Volume, …)
//! - Define **Services** (capability objects: Switch, Lightbulb, Speaker)
//! - Define **Platform accessories** (the unit a platform publishes to the host)
//! - Define the **plugin identity** and the **capability kinds** a user may configure
//! - Define the **playback** records exchanged with the music service
//! - Contain all invariant enforcement (allowed characteristics, value ranges)
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `app`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `app` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod accessory;
pub mod characteristic;
pub mod playback;
pub mod plugin;
pub mod service;
