//! Spotify accessory — wires playback control onto a capability object.

use std::sync::Arc;

use rusty_spotify_app::capability::CapabilityContext;
use rusty_spotify_app::ports::playback::FALLBACK_VOLUME;
use rusty_spotify_app::ports::{AccessoryPlugin, PlaybackApi};
use rusty_spotify_domain::accessory::PlatformAccessory;
use rusty_spotify_domain::characteristic::{
    Characteristic, CharacteristicType, CharacteristicValue,
};
use rusty_spotify_domain::error::BridgeError;
use rusty_spotify_domain::playback::SpotifyDevice;
use rusty_spotify_domain::service::{Service, ServiceType};
use tracing::{Instrument, Span};

/// One controllable Spotify target: a device, or whatever device is active.
pub struct SpotifyAccessory<P> {
    service: Service,
    api: Arc<P>,
    device_id: Option<String>,
    name: String,
    accessory: Option<PlatformAccessory>,
    log: Span,
}

impl<P> SpotifyAccessory<P>
where
    P: PlaybackApi + 'static,
{
    /// Wire handlers onto `service` for every characteristic it carries.
    ///
    /// # Errors
    ///
    /// Returns a validation error if `name` cannot be stored on the service.
    pub fn new(
        service: Service,
        name: impl Into<String>,
        device_id: Option<String>,
        api: Arc<P>,
        log: Span,
    ) -> Result<Self, BridgeError> {
        let accessory = Self {
            service,
            api,
            device_id,
            name: name.into(),
            accessory: None,
            log,
        };
        accessory.apply_characteristics()?;
        Ok(accessory)
    }

    /// An accessory for `device`, wrapped in a platform accessory the
    /// platform can publish.
    ///
    /// The accessory UUID derives from the device id, or from the device
    /// name for devices that report none.
    ///
    /// # Errors
    ///
    /// Returns a host API error when the capability cannot be built, or a
    /// validation error for a device without a usable name.
    pub fn for_device(
        capabilities: &CapabilityContext,
        service_type: ServiceType,
        device: &SpotifyDevice,
        api: Arc<P>,
        log: Span,
    ) -> Result<Self, BridgeError> {
        let service = capabilities.create(service_type, &device.name)?;
        let uuid = capabilities.generate_uuid(device.id.as_deref().unwrap_or(&device.name));
        let platform_accessory = capabilities.create_accessory(&device.name, uuid)?;
        platform_accessory.add_service(service.clone());

        let mut accessory = Self::new(service, &device.name, device.id.clone(), api, log)?;
        accessory.accessory = Some(platform_accessory);
        Ok(accessory)
    }

    #[must_use]
    pub fn device_id(&self) -> Option<&str> {
        self.device_id.as_deref()
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn service(&self) -> &Service {
        &self.service
    }

    /// The platform accessory holding the service, for platform-managed
    /// accessories.
    #[must_use]
    pub fn platform_accessory(&self) -> Option<&PlatformAccessory> {
        self.accessory.as_ref()
    }

    fn handles(&self) -> (Arc<P>, Option<String>, Span) {
        (Arc::clone(&self.api), self.device_id.clone(), self.log.clone())
    }

    fn apply_characteristics(&self) -> Result<(), BridgeError> {
        if let Some(on) = self.service.get_characteristic(CharacteristicType::On) {
            self.wire_play_state(&on, false);
        }
        if let Some(mute) = self.service.get_characteristic(CharacteristicType::Mute) {
            self.wire_play_state(&mute, true);
        }
        if let Some(volume) = self.service.volume_characteristic() {
            self.wire_volume(&volume);
        }
        if let Some(name) = self.service.get_characteristic(CharacteristicType::Name) {
            name.set_value(self.name.as_str())?;
        }
        Ok(())
    }

    /// `On` reports playback; `Mute` reports its inverse.
    fn wire_play_state(&self, characteristic: &Characteristic, inverted: bool) {
        let (api, device_id, log) = self.handles();
        characteristic.on_get(move || {
            let api = Arc::clone(&api);
            let device_id = device_id.clone();
            async move {
                let playing = api
                    .is_playing(device_id.as_deref())
                    .await
                    .unwrap_or_else(|err| {
                        tracing::warn!(error = %err, "could not read playback state");
                        false
                    });
                Ok(CharacteristicValue::Bool(playing != inverted))
            }
            .instrument(log.clone())
        });

        let (api, device_id, log) = self.handles();
        characteristic.on_set(move |value| {
            let api = Arc::clone(&api);
            let device_id = device_id.clone();
            let play = value.as_bool().unwrap_or_default() != inverted;
            async move {
                if play {
                    api.play(device_id.as_deref()).await
                } else {
                    api.pause().await
                }
            }
            .instrument(log.clone())
        });
    }

    fn wire_volume(&self, characteristic: &Characteristic) {
        let (api, device_id, log) = self.handles();
        characteristic.on_get(move || {
            let api = Arc::clone(&api);
            let device_id = device_id.clone();
            async move {
                let volume = api
                    .volume(device_id.as_deref())
                    .await
                    .unwrap_or_else(|err| {
                        tracing::warn!(error = %err, "could not read volume");
                        FALLBACK_VOLUME
                    });
                Ok(CharacteristicValue::from(volume))
            }
            .instrument(log.clone())
        });

        let (api, device_id, log) = self.handles();
        characteristic.on_set(move |value| {
            let api = Arc::clone(&api);
            let device_id = device_id.clone();
            let percent = value.as_percent().unwrap_or(FALLBACK_VOLUME);
            async move { api.set_volume(percent, device_id.as_deref()).await }
                .instrument(log.clone())
        });
    }

    /// Poll the current playback and update cached values without invoking
    /// any set handler.
    pub async fn refresh_state(&self) {
        async {
            match self.api.is_playing(self.device_id.as_deref()).await {
                Ok(playing) => {
                    store(self.service.get_characteristic(CharacteristicType::On), playing);
                    store(self.service.get_characteristic(CharacteristicType::Mute), !playing);
                }
                Err(err) => tracing::warn!(error = %err, "could not refresh playback state"),
            }

            if let Some(volume) = self.service.volume_characteristic() {
                match self.api.volume(self.device_id.as_deref()).await {
                    Ok(percent) => store(Some(volume), percent),
                    Err(err) => tracing::warn!(error = %err, "could not refresh volume"),
                }
            }
        }
        .instrument(self.log.clone())
        .await;
    }
}

fn store(characteristic: Option<Characteristic>, value: impl Into<CharacteristicValue>) {
    let Some(characteristic) = characteristic else {
        return;
    };
    if let Err(err) = characteristic.set_value(value) {
        tracing::warn!(error = %err, "discarding refreshed value");
    }
}

impl<P> AccessoryPlugin for SpotifyAccessory<P>
where
    P: PlaybackApi + 'static,
{
    fn services(&self) -> Vec<Service> {
        vec![self.service.clone()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    use rusty_spotify_app::bridge::LocalHap;
    use rusty_spotify_domain::error::ValidationError;
    use rusty_spotify_domain::playback::PlaybackState;

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        Play(Option<String>),
        Pause,
        SetVolume(u8, Option<String>),
    }

    #[derive(Default)]
    struct StubPlayback {
        state: Mutex<Option<PlaybackState>>,
        failing: bool,
        calls: Mutex<Vec<Call>>,
    }

    impl StubPlayback {
        fn playing_on(id: &str, volume: u8) -> Self {
            Self {
                state: Mutex::new(Some(PlaybackState {
                    is_playing: true,
                    device: SpotifyDevice {
                        id: Some(id.to_string()),
                        name: id.to_string(),
                        is_active: true,
                        volume_percent: Some(volume),
                    },
                })),
                ..Self::default()
            }
        }

        fn failing() -> Self {
            Self {
                failing: true,
                ..Self::default()
            }
        }

        fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }

        fn check(&self) -> Result<(), BridgeError> {
            if self.failing {
                Err(BridgeError::Plugin("spotify unreachable".into()))
            } else {
                Ok(())
            }
        }
    }

    impl PlaybackApi for StubPlayback {
        async fn play(&self, device_id: Option<&str>) -> Result<(), BridgeError> {
            self.check()?;
            self.calls
                .lock()
                .unwrap()
                .push(Call::Play(device_id.map(str::to_string)));
            Ok(())
        }

        async fn pause(&self) -> Result<(), BridgeError> {
            self.check()?;
            self.calls.lock().unwrap().push(Call::Pause);
            Ok(())
        }

        async fn playback_state(&self) -> Result<Option<PlaybackState>, BridgeError> {
            self.check()?;
            Ok(self.state.lock().unwrap().clone())
        }

        async fn set_volume(
            &self,
            percent: u8,
            device_id: Option<&str>,
        ) -> Result<(), BridgeError> {
            self.check()?;
            self.calls
                .lock()
                .unwrap()
                .push(Call::SetVolume(percent, device_id.map(str::to_string)));
            Ok(())
        }

        async fn devices(&self) -> Result<Vec<SpotifyDevice>, BridgeError> {
            self.check()?;
            Ok(self
                .state
                .lock()
                .unwrap()
                .iter()
                .map(|state| state.device.clone())
                .collect())
        }
    }

    fn capabilities() -> CapabilityContext {
        CapabilityContext::new(Arc::new(LocalHap::default()))
    }

    fn accessory(
        service_type: ServiceType,
        api: &Arc<StubPlayback>,
        device_id: Option<&str>,
    ) -> SpotifyAccessory<StubPlayback> {
        let service = capabilities().create(service_type, "SpotifyAccessory").unwrap();
        SpotifyAccessory::new(
            service,
            "Kitchen",
            device_id.map(str::to_string),
            Arc::clone(api),
            Span::none(),
        )
        .unwrap()
    }

    #[tokio::test]
    async fn should_read_on_from_playback_state() {
        let api = Arc::new(StubPlayback::playing_on("kitchen", 40));
        let light = accessory(ServiceType::Lightbulb, &api, Some("kitchen"));

        let on = light.service().characteristic(CharacteristicType::On).unwrap();
        assert_eq!(on.read().await.unwrap(), CharacteristicValue::Bool(true));

        let other = accessory(ServiceType::Lightbulb, &api, Some("bedroom"));
        let on = other.service().characteristic(CharacteristicType::On).unwrap();
        assert_eq!(on.read().await.unwrap(), CharacteristicValue::Bool(false));
    }

    #[tokio::test]
    async fn should_fall_back_when_api_fails() {
        let api = Arc::new(StubPlayback::failing());
        let light = accessory(ServiceType::Lightbulb, &api, None);

        let on = light.service().characteristic(CharacteristicType::On).unwrap();
        assert_eq!(on.read().await.unwrap(), CharacteristicValue::Bool(false));

        let brightness = light
            .service()
            .characteristic(CharacteristicType::Brightness)
            .unwrap();
        assert_eq!(brightness.read().await.unwrap(), CharacteristicValue::Int(100));
    }

    #[tokio::test]
    async fn should_play_and_pause_through_on() {
        let api = Arc::new(StubPlayback::default());
        let switch = accessory(ServiceType::Switch, &api, Some("kitchen"));
        let on = switch.service().characteristic(CharacteristicType::On).unwrap();

        on.write(CharacteristicValue::Bool(true)).await.unwrap();
        on.write(CharacteristicValue::Bool(false)).await.unwrap();

        assert_eq!(
            api.calls(),
            vec![Call::Play(Some("kitchen".to_string())), Call::Pause]
        );
        assert_eq!(on.value(), CharacteristicValue::Bool(false));
    }

    #[tokio::test]
    async fn should_propagate_set_errors_and_keep_cached_value() {
        let api = Arc::new(StubPlayback::failing());
        let switch = accessory(ServiceType::Switch, &api, None);
        let on = switch.service().characteristic(CharacteristicType::On).unwrap();

        assert!(on.write(CharacteristicValue::Bool(true)).await.is_err());
        assert_eq!(on.value(), CharacteristicValue::Bool(false));
    }

    #[tokio::test]
    async fn should_invert_play_state_for_mute() {
        let api = Arc::new(StubPlayback::playing_on("kitchen", 40));
        let speaker = accessory(ServiceType::Speaker, &api, None);
        let mute = speaker.service().characteristic(CharacteristicType::Mute).unwrap();

        assert_eq!(mute.read().await.unwrap(), CharacteristicValue::Bool(false));

        mute.write(CharacteristicValue::Bool(true)).await.unwrap();
        mute.write(CharacteristicValue::Bool(false)).await.unwrap();
        assert_eq!(api.calls(), vec![Call::Pause, Call::Play(None)]);
    }

    #[tokio::test]
    async fn should_map_volume_characteristic_to_volume() {
        let api = Arc::new(StubPlayback::playing_on("kitchen", 40));
        let speaker = accessory(ServiceType::Speaker, &api, None);
        let volume = speaker
            .service()
            .characteristic(CharacteristicType::Volume)
            .unwrap();

        assert_eq!(volume.read().await.unwrap(), CharacteristicValue::Int(40));
        volume.write(CharacteristicValue::Int(65)).await.unwrap();
        assert_eq!(api.calls(), vec![Call::SetVolume(65, None)]);
    }

    #[tokio::test]
    async fn should_set_volume_on_bound_device() {
        let api = Arc::new(StubPlayback::playing_on("kitchen", 40));
        let light = accessory(ServiceType::Lightbulb, &api, Some("bedroom"));
        let service = light.service();

        service
            .characteristic(CharacteristicType::On)
            .unwrap()
            .write(CharacteristicValue::Bool(true))
            .await
            .unwrap();
        service
            .characteristic(CharacteristicType::Brightness)
            .unwrap()
            .write(CharacteristicValue::Int(65))
            .await
            .unwrap();

        assert_eq!(
            api.calls(),
            vec![
                Call::Play(Some("bedroom".to_string())),
                Call::SetVolume(65, Some("bedroom".to_string())),
            ]
        );
    }

    #[tokio::test]
    async fn should_reject_out_of_range_volume_before_calling_api() {
        let api = Arc::new(StubPlayback::default());
        let light = accessory(ServiceType::Lightbulb, &api, None);
        let brightness = light
            .service()
            .characteristic(CharacteristicType::Brightness)
            .unwrap();

        let result = brightness.write(CharacteristicValue::Int(140)).await;
        assert!(matches!(
            result,
            Err(BridgeError::Validation(ValidationError::OutOfRange { .. }))
        ));
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn should_set_name_characteristic() {
        let api = Arc::new(StubPlayback::default());
        let light = accessory(ServiceType::Lightbulb, &api, None);
        let name = light.service().characteristic(CharacteristicType::Name).unwrap();
        assert_eq!(name.value(), CharacteristicValue::from("Kitchen"));
    }

    #[tokio::test]
    async fn should_refresh_cached_values_without_invoking_setters() {
        let api = Arc::new(StubPlayback::playing_on("kitchen", 30));
        let speaker = accessory(ServiceType::Speaker, &api, Some("kitchen"));

        speaker.refresh_state().await;

        let service = speaker.service();
        assert_eq!(
            service.characteristic(CharacteristicType::Mute).unwrap().value(),
            CharacteristicValue::Bool(false)
        );
        assert_eq!(
            service.characteristic(CharacteristicType::Volume).unwrap().value(),
            CharacteristicValue::Int(30)
        );
        assert!(api.calls().is_empty());
    }

    #[tokio::test]
    async fn should_wrap_device_in_platform_accessory() {
        let api = Arc::new(StubPlayback::default());
        let device = SpotifyDevice {
            id: Some("kitchen".to_string()),
            name: "Kitchen".to_string(),
            is_active: false,
            volume_percent: None,
        };

        let accessory = SpotifyAccessory::for_device(
            &capabilities(),
            ServiceType::Lightbulb,
            &device,
            Arc::clone(&api),
            Span::none(),
        )
        .unwrap();

        let platform_accessory = accessory.platform_accessory().unwrap();
        assert_eq!(
            platform_accessory.uuid(),
            rusty_spotify_domain::id::AccessoryUuid::generate("kitchen")
        );
        let service = platform_accessory.get_service(ServiceType::Lightbulb).unwrap();
        assert!(service.same_as(accessory.service()));
        assert_eq!(accessory.device_id(), Some("kitchen"));
        assert!(service
            .characteristic(CharacteristicType::Brightness)
            .unwrap()
            .has_get_handler());
    }
}
