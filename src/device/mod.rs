//! Local audio and camera devices used by the interactive session
//!
//! - `playback`: plays synthesized MP3 audio (`playback` feature, rodio)
//! - `camera`: grabs one frame as a leaf image (`camera` feature, nokhwa)
//!
//! Without the features the session keeps its file-based path: audio is only
//! saved and images are selected by path.

mod camera;
mod playback;

pub use camera::{default_camera, frame_to_image, FrameSource};
pub use playback::{default_player, AudioPlayer};

/// Device choices taken from the command line
#[derive(Debug, Clone, Copy, Default)]
pub struct DeviceOptions {
    /// Camera index passed to the capture backend
    pub camera_index: u32,
    /// Save voice output without playing it
    pub mute: bool,
}
