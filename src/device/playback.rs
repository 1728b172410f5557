use super::DeviceOptions;
use crate::error::{PlantAiError, Result};
use async_trait::async_trait;
use std::sync::Arc;

#[async_trait]
pub trait AudioPlayer: Send + Sync {
    /// Plays encoded audio and returns when playback has finished
    async fn play(&self, audio: &[u8]) -> Result<()>;
}

/// Speaker output through the default audio device
#[cfg(feature = "playback")]
pub struct RodioPlayer;

#[cfg(feature = "playback")]
#[async_trait]
impl AudioPlayer for RodioPlayer {
    async fn play(&self, audio: &[u8]) -> Result<()> {
        let bytes = audio.to_vec();
        // rodio blocks until the sink drains
        tokio::task::spawn_blocking(move || play_blocking(bytes))
            .await
            .map_err(|e| PlantAiError::Playback(e.to_string()))?
    }
}

#[cfg(feature = "playback")]
fn play_blocking(bytes: Vec<u8>) -> Result<()> {
    let (_stream, stream_handle) =
        rodio::OutputStream::try_default().map_err(|e| PlantAiError::Playback(e.to_string()))?;
    let sink = rodio::Sink::try_new(&stream_handle).map_err(|e| PlantAiError::Playback(e.to_string()))?;
    let source = rodio::Decoder::new(std::io::Cursor::new(bytes))
        .map_err(|e| PlantAiError::Playback(format!("cannot decode audio: {}", e)))?;

    sink.append(source);
    sink.sleep_until_end();
    Ok(())
}

/// Player for the session, `None` when audio is only saved
#[cfg(feature = "playback")]
pub fn default_player(options: DeviceOptions) -> Option<Arc<dyn AudioPlayer>> {
    if options.mute {
        return None;
    }
    Some(Arc::new(RodioPlayer))
}

/// Player for the session, `None` when audio is only saved
#[cfg(not(feature = "playback"))]
pub fn default_player(_options: DeviceOptions) -> Option<Arc<dyn AudioPlayer>> {
    log::debug!("built without the `playback` feature; voice output is saved only");
    None
}
