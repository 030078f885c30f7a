//! Accessories published by platforms at runtime.

use std::sync::{Mutex, MutexGuard, PoisonError};

use rusty_spotify_domain::accessory::PlatformAccessory;

use crate::ports::AccessoryRegistry;

/// An accessory together with the platform that published it.
#[derive(Debug, Clone)]
pub struct PublishedAccessory {
    pub plugin_name: String,
    pub platform_name: String,
    pub accessory: PlatformAccessory,
}

/// In-memory [`AccessoryRegistry`]; one entry per accessory UUID.
#[derive(Debug, Default)]
pub struct LocalAccessoryRegistry {
    published: Mutex<Vec<PublishedAccessory>>,
}

impl LocalAccessoryRegistry {
    fn lock(&self) -> MutexGuard<'_, Vec<PublishedAccessory>> {
        self.published.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Every published accessory, in publication order.
    #[must_use]
    pub fn accessories(&self) -> Vec<PlatformAccessory> {
        self.lock().iter().map(|p| p.accessory.clone()).collect()
    }

    #[must_use]
    pub fn published(&self) -> Vec<PublishedAccessory> {
        self.lock().clone()
    }

    /// Accessories published under `plugin_name`/`platform_name`.
    #[must_use]
    pub fn accessories_of(&self, plugin_name: &str, platform_name: &str) -> Vec<PlatformAccessory> {
        self.lock()
            .iter()
            .filter(|p| p.plugin_name == plugin_name && p.platform_name == platform_name)
            .map(|p| p.accessory.clone())
            .collect()
    }
}

impl AccessoryRegistry for LocalAccessoryRegistry {
    fn register_platform_accessories(
        &self,
        plugin_name: &str,
        platform_name: &str,
        accessories: Vec<PlatformAccessory>,
    ) {
        let mut published = self.lock();
        for accessory in accessories {
            tracing::debug!(
                plugin = plugin_name,
                platform = platform_name,
                uuid = %accessory.uuid(),
                name = accessory.display_name(),
                "publishing accessory"
            );
            let entry = PublishedAccessory {
                plugin_name: plugin_name.to_string(),
                platform_name: platform_name.to_string(),
                accessory,
            };
            match published
                .iter_mut()
                .find(|p| p.accessory.uuid() == entry.accessory.uuid())
            {
                Some(existing) => *existing = entry,
                None => published.push(entry),
            }
        }
    }

    fn unregister_platform_accessories(
        &self,
        plugin_name: &str,
        platform_name: &str,
        accessories: Vec<PlatformAccessory>,
    ) {
        let mut published = self.lock();
        let before = published.len();
        published.retain(|p| {
            p.plugin_name != plugin_name
                || p.platform_name != platform_name
                || !accessories.iter().any(|a| a.uuid() == p.accessory.uuid())
        });
        tracing::debug!(
            plugin = plugin_name,
            platform = platform_name,
            removed = before - published.len(),
            "unpublished accessories"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusty_spotify_domain::id::AccessoryUuid;

    fn accessory(name: &str) -> PlatformAccessory {
        PlatformAccessory::new(name, AccessoryUuid::generate(name)).unwrap()
    }

    #[test]
    fn should_record_published_accessories() {
        let registry = LocalAccessoryRegistry::default();
        registry.register_platform_accessories(
            "plugin",
            "Spotify",
            vec![accessory("Kitchen"), accessory("Bedroom")],
        );

        let published = registry.published();
        assert_eq!(published.len(), 2);
        assert_eq!(published[0].plugin_name, "plugin");
        assert_eq!(published[0].platform_name, "Spotify");
        assert_eq!(registry.accessories_of("plugin", "Spotify").len(), 2);
        assert!(registry.accessories_of("plugin", "Other").is_empty());
    }

    #[test]
    fn should_replace_accessory_with_same_uuid() {
        let registry = LocalAccessoryRegistry::default();
        let first = accessory("Kitchen");
        let second = PlatformAccessory::new("Kitchen again", first.uuid()).unwrap();

        registry.register_platform_accessories("plugin", "Spotify", vec![first]);
        registry.register_platform_accessories("plugin", "Spotify", vec![second]);

        let accessories = registry.accessories();
        assert_eq!(accessories.len(), 1);
        assert_eq!(accessories[0].display_name(), "Kitchen again");
    }

    #[test]
    fn should_remove_unregistered_accessories_by_uuid() {
        let registry = LocalAccessoryRegistry::default();
        let kitchen = accessory("Kitchen");
        registry.register_platform_accessories(
            "plugin",
            "Spotify",
            vec![kitchen.clone(), accessory("Bedroom")],
        );

        registry.unregister_platform_accessories("plugin", "Spotify", vec![kitchen]);

        let accessories = registry.accessories();
        assert_eq!(accessories.len(), 1);
        assert_eq!(accessories[0].display_name(), "Bedroom");
    }

    #[test]
    fn should_only_unregister_accessories_of_the_calling_platform() {
        let registry = LocalAccessoryRegistry::default();
        let kitchen = accessory("Kitchen");
        registry.register_platform_accessories("plugin", "Spotify", vec![kitchen.clone()]);

        registry.unregister_platform_accessories("plugin", "Other", vec![kitchen.clone()]);
        registry.unregister_platform_accessories("other-plugin", "Spotify", vec![kitchen]);

        assert_eq!(registry.accessories_of("plugin", "Spotify").len(), 1);
    }

    #[test]
    fn should_ignore_unregistering_unknown_accessory() {
        let registry = LocalAccessoryRegistry::default();
        registry.register_platform_accessories("plugin", "Spotify", vec![accessory("Kitchen")]);
        registry.unregister_platform_accessories("plugin", "Spotify", vec![accessory("Garage")]);
        assert_eq!(registry.accessories().len(), 1);
    }
}
