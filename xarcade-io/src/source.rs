//! X-Arcade input source using evdev
//!
//! Opens the control panel's event node, grabs it exclusively so the desktop
//! does not also see the raw keys, and reads events in sync-delimited batches.

use crate::event::KeyEvent;
use crate::{DeviceError, RawInputSource};
use async_trait::async_trait;
use evdev::{Device, EventStream, EventType};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Stable udev path of the Tankstick's keyboard interface
pub const XARCADE_DEVICE_PATH: &str = "/dev/input/by-id/usb-XGaming_X-Arcade-event-kbd";

/// Substring expected in the kernel device name
pub const XARCADE_DEVICE_NAME: &str = "X-Arcade";

/// `SYN_REPORT` code within `EV_SYN`
const SYN_REPORT: u16 = 0;

/// Exclusively grabbed physical control panel
pub struct EvdevSource {
    path: PathBuf,
    /// Grabbed device before the first read
    device: Option<Device>,
    /// Async stream, created lazily on the first read so `open` works outside a runtime
    stream: Option<EventStream>,
    /// Events read since the last sync marker
    pending: Vec<KeyEvent>,
}

impl EvdevSource {
    /// Open and grab the device at `path`
    ///
    /// # Arguments
    /// * `path` - Event node, e.g. [`XARCADE_DEVICE_PATH`]
    /// * `name_filter` - If set, the kernel device name must contain this
    ///
    /// Returns [`DeviceError::NotFound`] when there is no such node or the name
    /// does not match, and [`DeviceError::Busy`] when another process already
    /// holds the grab.
    pub fn open(path: &Path, name_filter: Option<&str>) -> Result<Self, DeviceError> {
        if !path.exists() {
            return Err(DeviceError::NotFound(format!(
                "no input device at {}",
                path.display()
            )));
        }

        let mut device = Device::open(path).map_err(|source| DeviceError::Open {
            path: path.to_path_buf(),
            source,
        })?;

        let name = device.name().unwrap_or_default().to_string();
        if let Some(filter) = name_filter {
            if !name.contains(filter) {
                return Err(DeviceError::NotFound(format!(
                    "{} is \"{}\", expected a name containing \"{}\"",
                    path.display(),
                    name,
                    filter
                )));
            }
        }

        device
            .grab()
            .map_err(|e| DeviceError::from_grab(path.to_path_buf(), e))?;
        info!("Got exclusive access to {} ({})", path.display(), name);

        Ok(Self {
            path: path.to_path_buf(),
            device: Some(device),
            stream: None,
            pending: Vec::new(),
        })
    }
}

#[async_trait]
impl RawInputSource for EvdevSource {
    async fn read_batch(&mut self) -> Result<Vec<KeyEvent>, DeviceError> {
        if self.stream.is_none() {
            let device = self.device.take().ok_or(DeviceError::Released)?;
            self.stream = Some(device.into_event_stream().map_err(DeviceError::Read)?);
        }
        let stream = self.stream.as_mut().ok_or(DeviceError::Released)?;

        // `pending` lives on self so a cancelled read loses nothing
        loop {
            let ev = stream.next_event().await.map_err(|e| {
                if e.raw_os_error() == Some(libc::ENODEV) {
                    DeviceError::Disconnected
                } else {
                    DeviceError::Read(e)
                }
            })?;

            if ev.event_type() == EventType::SYNCHRONIZATION {
                if ev.code() == SYN_REPORT && !self.pending.is_empty() {
                    return Ok(std::mem::take(&mut self.pending));
                }
                continue;
            }
            self.pending.push(KeyEvent::from(&ev));
        }
    }

    fn release(&mut self) -> Result<(), DeviceError> {
        if let Some(mut device) = self.device.take() {
            device.ungrab().map_err(DeviceError::Read)?;
            debug!("Ungrabbed {}", self.path.display());
            return Ok(());
        }
        // Closing the fd drops the grab
        if self.stream.take().is_some() {
            debug!("Closed {}", self.path.display());
            return Ok(());
        }
        Err(DeviceError::Released)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_node_is_not_found() {
        let err = EvdevSource::open(Path::new("/dev/input/does-not-exist"), None)
            .err()
            .expect("open should fail");
        assert!(matches!(err, DeviceError::NotFound(_)));
    }

    #[test]
    #[ignore] // Requires an attached X-Arcade (run with: cargo test -- --ignored)
    fn test_grab_xarcade() {
        let source = EvdevSource::open(Path::new(XARCADE_DEVICE_PATH), Some(XARCADE_DEVICE_NAME));
        assert!(source.is_ok());
    }
}
