//! Camera interface and camera collections

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// An RGB image buffer of shape `(height, width, 3)`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Frame {
    /// Image height in pixels
    pub height: usize,
    /// Image width in pixels
    pub width: usize,
    /// Row-major RGB bytes, `height * width * 3` long
    pub data: Vec<u8>,
}

impl Frame {
    /// Number of color channels
    pub const CHANNELS: usize = 3;

    /// Wrap an RGB buffer, checking its length against the shape
    pub fn new(height: usize, width: usize, data: Vec<u8>) -> Result<Self> {
        let expected = height * width * Self::CHANNELS;
        if data.len() != expected {
            return Err(Error::Camera(format!(
                "frame of {}x{} needs {} bytes, got {}",
                height,
                width,
                expected,
                data.len()
            )));
        }
        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// A frame filled with a single byte value
    pub fn filled(height: usize, width: usize, value: u8) -> Self {
        Self {
            height,
            width,
            data: vec![value; height * width * Self::CHANNELS],
        }
    }

    /// Shape as `(height, width, channels)`
    pub fn shape(&self) -> (usize, usize, usize) {
        (self.height, self.width, Self::CHANNELS)
    }
}

/// Trait for a camera
pub trait Camera: Send {
    /// Open the camera
    fn connect(&mut self) -> Result<()>;

    /// Close the camera
    fn disconnect(&mut self) -> Result<()>;

    /// Check if the camera is open
    #[must_use]
    fn is_connected(&self) -> bool;

    /// Return the latest frame without waiting for a new one
    fn async_read(&mut self) -> Result<Frame>;
}

/// Ordered collection of named cameras
///
/// Operations fan out in insertion order and stop at the first error.
#[derive(Default)]
pub struct CameraSet {
    cameras: Vec<(String, Box<dyn Camera>)>,
}

impl CameraSet {
    /// Create an empty set
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a camera under `name`
    pub fn with(mut self, name: impl Into<String>, camera: impl Camera + 'static) -> Self {
        self.insert(name, Box::new(camera));
        self
    }

    /// Add or replace a camera under `name`
    pub fn insert(&mut self, name: impl Into<String>, camera: Box<dyn Camera>) {
        let name = name.into();
        match self.cameras.iter_mut().find(|(n, _)| *n == name) {
            Some(slot) => slot.1 = camera,
            None => self.cameras.push((name, camera)),
        }
    }

    /// Camera names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.cameras.iter().map(|(name, _)| name.as_str())
    }

    /// Number of cameras
    pub fn len(&self) -> usize {
        self.cameras.len()
    }

    /// Whether the set has no cameras
    pub fn is_empty(&self) -> bool {
        self.cameras.is_empty()
    }

    /// Connect every camera
    pub fn connect_all(&mut self) -> Result<()> {
        for (name, camera) in &mut self.cameras {
            tracing::debug!("Connecting camera {}", name);
            camera.connect()?;
        }
        Ok(())
    }

    /// Disconnect every camera
    pub fn disconnect_all(&mut self) -> Result<()> {
        for (name, camera) in &mut self.cameras {
            tracing::debug!("Disconnecting camera {}", name);
            camera.disconnect()?;
        }
        Ok(())
    }

    /// Check if every camera is connected (true for an empty set)
    pub fn all_connected(&self) -> bool {
        self.cameras.iter().all(|(_, camera)| camera.is_connected())
    }

    /// Read the latest frame of every camera, keyed by camera name
    pub fn read_frames(&mut self) -> Result<Vec<(String, Frame)>> {
        self.cameras
            .iter_mut()
            .map(|(name, camera)| Ok((name.clone(), camera.async_read()?)))
            .collect()
    }
}

impl std::fmt::Debug for CameraSet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list().entries(self.names()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hardware::DummyCamera;

    #[test]
    fn test_frame_shape() {
        let frame = Frame::filled(4, 6, 7);
        assert_eq!(frame.shape(), (4, 6, 3));
        assert_eq!(frame.data.len(), 72);
        assert!(Frame::new(2, 2, vec![0; 11]).is_err());
        assert!(Frame::new(2, 2, vec![0; 12]).is_ok());
    }

    #[test]
    fn test_camera_set_fan_out() {
        let front = DummyCamera::new(48, 64);
        let wrist = DummyCamera::new(24, 32);
        let mut set = CameraSet::new()
            .with("front", front.clone())
            .with("wrist", wrist.clone());

        assert_eq!(set.names().collect::<Vec<_>>(), vec!["front", "wrist"]);
        assert!(!set.all_connected());

        set.connect_all().unwrap();
        assert!(set.all_connected());

        let frames = set.read_frames().unwrap();
        assert_eq!(frames[0].0, "front");
        assert_eq!(frames[0].1.shape(), (48, 64, 3));
        assert_eq!(frames[1].1.shape(), (24, 32, 3));
        assert_eq!(front.reads(), 1);

        set.disconnect_all().unwrap();
        assert!(!wrist.is_connected());
    }

    #[test]
    fn test_insert_replaces_same_name() {
        let mut set = CameraSet::new().with("front", DummyCamera::new(2, 2));
        set.insert("front", Box::new(DummyCamera::new(4, 4)));
        assert_eq!(set.len(), 1);
    }
}
