//! Spotify platform — one accessory per available Spotify Connect device.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use rusty_spotify_app::capability::PlatformBinding;
use rusty_spotify_app::ports::{PlaybackApi, PlatformPlugin};
use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::plugin::{PLATFORM_TYPE_NAME, PLUGIN_NAME};
use rusty_spotify_domain::service::ServiceType;
use tokio::task::JoinHandle;
use tracing::{Instrument, Span};

use crate::accessory::SpotifyAccessory;

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

struct PlatformState<P> {
    binding: PlatformBinding,
    api: Arc<P>,
    service_type: ServiceType,
    devices: Mutex<Vec<Arc<SpotifyAccessory<P>>>>,
    cached: Mutex<Vec<PlatformAccessory>>,
    log: Span,
}

impl<P> PlatformState<P>
where
    P: PlaybackApi + 'static,
{
    fn unregister(&self, accessories: Vec<PlatformAccessory>) {
        if accessories.is_empty() {
            return;
        }
        self.binding
            .host
            .unregister_platform_accessories(PLUGIN_NAME, PLATFORM_TYPE_NAME, accessories);
    }

    async fn refresh_devices(&self) {
        let cached = std::mem::take(&mut *lock(&self.cached));
        if !cached.is_empty() {
            tracing::info!(count = cached.len(), "removing cached accessories");
        }
        self.unregister(cached);

        let available = self.api.devices().await.unwrap_or_else(|err| {
            tracing::warn!(error = %err, "could not list Spotify devices");
            Vec::new()
        });

        let vanished: Vec<PlatformAccessory> = {
            let mut devices = lock(&self.devices);
            let mut vanished = Vec::new();
            devices.retain(|known| {
                let still_there = available
                    .iter()
                    .any(|d| d.id.is_some() && d.id.as_deref() == known.device_id());
                if !still_there {
                    tracing::info!(name = known.name(), "unregistering Spotify device");
                    vanished.extend(known.platform_accessory().cloned());
                }
                still_there
            });
            vanished
        };
        self.unregister(vanished);

        for device in &available {
            let Some(device_id) = device.id.as_deref() else {
                tracing::debug!(name = %device.name, "skipping device without id");
                continue;
            };
            let known = lock(&self.devices)
                .iter()
                .any(|d| d.device_id() == Some(device_id));
            if known {
                continue;
            }

            let accessory = match SpotifyAccessory::for_device(
                &self.binding.capabilities,
                self.service_type,
                device,
                Arc::clone(&self.api),
                self.log.clone(),
            ) {
                Ok(accessory) => accessory,
                Err(err) => {
                    tracing::warn!(
                        name = %device.name,
                        error = %err,
                        "could not create accessory"
                    );
                    continue;
                }
            };

            tracing::info!(name = %device.name, device_id, "registering Spotify device");
            self.binding.host.register_platform_accessories(
                PLUGIN_NAME,
                PLATFORM_TYPE_NAME,
                accessory.platform_accessory().cloned().into_iter().collect(),
            );
            lock(&self.devices).push(Arc::new(accessory));
        }

        let devices = lock(&self.devices).clone();
        for device in devices {
            device.refresh_state().await;
        }
    }
}

/// Platform plugin exposing every Spotify device as an accessory.
pub struct SpotifyPlatform<P> {
    state: Arc<PlatformState<P>>,
    refresh_rate: Duration,
    task: Mutex<Option<JoinHandle<()>>>,
}

impl<P> SpotifyPlatform<P>
where
    P: PlaybackApi + 'static,
{
    #[must_use]
    pub fn new(
        binding: PlatformBinding,
        api: Arc<P>,
        service_type: ServiceType,
        refresh_rate: Duration,
        log: Span,
    ) -> Self {
        Self {
            state: Arc::new(PlatformState {
                binding,
                api,
                service_type,
                devices: Mutex::new(Vec::new()),
                cached: Mutex::new(Vec::new()),
                log,
            }),
            refresh_rate,
            task: Mutex::new(None),
        }
    }

    /// Synchronise published accessories with the devices Spotify reports.
    ///
    /// Cached accessories restored by the host are dropped first; device
    /// list failures are treated as "no devices".
    pub async fn refresh_devices(&self) {
        let log = self.state.log.clone();
        self.state.refresh_devices().instrument(log).await;
    }

    /// Accessories currently managed, one per known device.
    #[must_use]
    pub fn accessories(&self) -> Vec<Arc<SpotifyAccessory<P>>> {
        lock(&self.state.devices).clone()
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        lock(&self.task).as_ref().is_some_and(|task| !task.is_finished())
    }
}

impl<P> PlatformPlugin for SpotifyPlatform<P>
where
    P: PlaybackApi + 'static,
{
    fn configure_accessory(&self, accessory: PlatformAccessory) {
        tracing::debug!(name = accessory.display_name(), "restored cached accessory");
        lock(&self.state.cached).push(accessory);
    }

    fn did_finish_launching(&self) {
        let Ok(runtime) = tokio::runtime::Handle::try_current() else {
            tracing::warn!("no async runtime available, device refresh disabled");
            return;
        };

        let state = Arc::clone(&self.state);
        let period = self.refresh_rate;
        let log = state.log.clone();
        let task = runtime.spawn(
            async move {
                tracing::info!(?period, "starting device refresh");
                let mut interval = tokio::time::interval(period);
                loop {
                    interval.tick().await;
                    state.refresh_devices().await;
                }
            }
            .instrument(log),
        );

        if let Some(previous) = lock(&self.task).replace(task) {
            previous.abort();
        }
    }

    fn shutdown(&self) {
        if let Some(task) = lock(&self.task).take() {
            tracing::info!("stopping device refresh");
            task.abort();
        }
    }
}

impl<P> Drop for SpotifyPlatform<P> {
    fn drop(&mut self) {
        if let Some(task) = lock(&self.task).take() {
            task.abort();
        }
    }
}
