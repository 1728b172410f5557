//! Speech synthesis through the `edge-tts` command-line tool
//!
//! Audio is written to a temporary MP3, read back once, and the file is
//! removed when the temp path drops.

use crate::error::{PlantAiError, Result};
use async_trait::async_trait;
use tokio::process::Command;

#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Returns the complete audio byte sequence (MP3)
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>>;
}

pub struct EdgeTts {
    program: String,
    leading_args: Vec<String>,
}

impl EdgeTts {
    /// `command` may carry leading arguments, e.g. `python -m edge_tts`
    pub fn new(command: &str) -> Result<Self> {
        let mut words = command.split_whitespace().map(str::to_string);
        let program = words
            .next()
            .ok_or_else(|| PlantAiError::Config("tts_program is empty".into()))?;

        Ok(Self {
            program,
            leading_args: words.collect(),
        })
    }
}

#[async_trait]
impl SpeechSynthesizer for EdgeTts {
    async fn synthesize(&self, text: &str, voice: &str) -> Result<Vec<u8>> {
        if text.trim().is_empty() {
            return Err(PlantAiError::Synthesis("nothing to speak".into()));
        }

        let audio_path = tempfile::Builder::new()
            .prefix("plant-ai-")
            .suffix(".mp3")
            .tempfile()?
            .into_temp_path();

        log::debug!("{} --voice {} -> {}", self.program, voice, audio_path.display());

        let output = Command::new(&self.program)
            .args(&self.leading_args)
            .arg("--voice")
            .arg(voice)
            .arg("--text")
            .arg(text)
            .arg("--write-media")
            .arg(&audio_path)
            .output()
            .await
            .map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PlantAiError::Synthesis(format!(
                        "'{}' not found. Install it with `pip install edge-tts`",
                        self.program
                    ))
                } else {
                    PlantAiError::Synthesis(e.to_string())
                }
            })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PlantAiError::Synthesis(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                stderr.trim()
            )));
        }

        let audio = tokio::fs::read(&audio_path).await?;
        if audio.is_empty() {
            return Err(PlantAiError::Synthesis("no audio was produced".into()));
        }
        Ok(audio)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_with_leading_args() {
        let tts = EdgeTts::new("python -m edge_tts").unwrap();
        assert_eq!(tts.program, "python");
        assert_eq!(tts.leading_args, vec!["-m", "edge_tts"]);
        assert!(matches!(EdgeTts::new("  "), Err(PlantAiError::Config(_))));
    }

    #[tokio::test]
    async fn test_missing_program() {
        let tts = EdgeTts::new("plant-ai-no-such-tts-program").unwrap();
        let err = tts.synthesize("hello", "en-US-AriaNeural").await.unwrap_err();
        assert!(matches!(err, PlantAiError::Synthesis(_)));
    }

    #[tokio::test]
    async fn test_empty_text() {
        let tts = EdgeTts::new("edge-tts").unwrap();
        assert!(matches!(
            tts.synthesize("  ", "v").await,
            Err(PlantAiError::Synthesis(_))
        ));
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_audio_read_back_and_removed() {
        let dir = tempfile::tempdir().unwrap();
        let script = dir.path().join("fake-tts.sh");
        let log = dir.path().join("media-path.txt");
        std::fs::write(
            &script,
            format!(
                "while [ $# -gt 0 ]; do\n  if [ \"$1\" = \"--write-media\" ]; then printf 'ID3' > \"$2\"; echo \"$2\" > {}; fi\n  shift\ndone\n",
                log.display()
            ),
        )
        .unwrap();

        let tts = EdgeTts::new(&format!("sh {}", script.display())).unwrap();
        let audio = tts.synthesize("hello", "en-US-AriaNeural").await.unwrap();
        assert_eq!(audio, b"ID3");

        let media_path = std::fs::read_to_string(&log).unwrap();
        assert!(!std::path::Path::new(media_path.trim()).exists());
    }

    #[cfg(unix)]
    #[tokio::test]
    async fn test_failed_exit_status() {
        let tts = EdgeTts::new("sh -c exit_3_is_not_a_command").unwrap();
        assert!(matches!(
            tts.synthesize("hello", "v").await,
            Err(PlantAiError::Synthesis(_))
        ));
    }
}
