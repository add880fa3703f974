//! Client-side cache of the device's WiFi state

use devlink_protocol::{DevicePayload, DeviceToLocalMessage, OwnedReadyMessage, OwnedWifiNetwork};
use std::collections::HashMap;

/// What [`WifiStateStore::apply`] did with a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    /// The store changed (or was confirmed) by the message
    Updated,
    /// Nothing to apply: an unhandled payload or event type, a network
    /// without a BSSID, or a removal of a network the store does not hold
    Ignored,
}

/// Initialized/scanning flags plus the networks the device reported, keyed by BSSID
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WifiStateStore {
    initialized: bool,
    scanning: bool,
    networks: HashMap<String, OwnedWifiNetwork>,
    device: Option<OwnedReadyMessage>,
    last_error: Option<String>,
}

impl WifiStateStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_scanning(&self) -> bool {
        self.scanning
    }

    pub fn set_initialized(&mut self, initialized: bool) {
        self.initialized = initialized;
    }

    pub fn set_scanning(&mut self, scanning: bool) {
        self.scanning = scanning;
    }

    /// Insert or replace a network by its BSSID
    ///
    /// Returns false, leaving the store unchanged, if the network has no BSSID.
    pub fn add_network(&mut self, network: OwnedWifiNetwork) -> bool {
        match network.bssid.clone() {
            Some(bssid) => {
                self.networks.insert(bssid, network);
                true
            }
            None => false,
        }
    }

    pub fn remove_network(&mut self, bssid: &str) -> Option<OwnedWifiNetwork> {
        self.networks.remove(bssid)
    }

    pub fn clear_networks(&mut self) {
        self.networks.clear();
    }

    pub fn network(&self, bssid: &str) -> Option<&OwnedWifiNetwork> {
        self.networks.get(bssid)
    }

    pub fn networks(&self) -> impl Iterator<Item = &OwnedWifiNetwork> {
        self.networks.values()
    }

    pub fn network_count(&self) -> usize {
        self.networks.len()
    }

    /// Last ReadyMessage received
    pub fn device(&self) -> Option<&OwnedReadyMessage> {
        self.device.as_ref()
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Apply a verified device message to the store
    pub fn apply(&mut self, msg: &DeviceToLocalMessage<'_>) -> Applied {
        match msg.payload() {
            DevicePayload::Ready(ready) => {
                self.device = Some(ready.unpack());
                self.initialized = true;
            }
            DevicePayload::ScanStatus(status) => {
                self.scanning = status.status().is_scanning();
            }
            DevicePayload::NetworkEvent(event) => {
                let (Some(event_type), Some(network)) = (event.event_type(), event.network())
                else {
                    return Applied::Ignored;
                };
                if event_type.is_removal() {
                    let removed = network.bssid().and_then(|bssid| self.networks.remove(bssid));
                    if removed.is_none() {
                        return Applied::Ignored;
                    }
                } else if !self.add_network(network.unpack()) {
                    return Applied::Ignored;
                }
            }
            DevicePayload::Error(error) => {
                self.last_error = Some(error.message().unwrap_or_default().to_string());
            }
            DevicePayload::None | DevicePayload::Unknown(_) => return Applied::Ignored,
        }
        Applied::Updated
    }
}
