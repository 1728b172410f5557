//! Interactive analysis session
//!
//! A session owns the selected image and at most one analysis result.
//! - selecting a different image discards the previous result
//! - a new analysis overwrites the result
//! - ending the session drops it
//!
//! Leaf images come from a file path or, when a camera is attached, a live
//! frame. Voice output is always saved under the audio directory and played
//! when an audio player is attached.
//!
//! Every per-request error is turned into [`Feedback`]; only startup
//! configuration errors stop the program.

use crate::classifier::{ClassificationOutput, Classifier, LeafImage};
use crate::composer::{ComposedDisplay, ResultComposer};
use crate::device::{AudioPlayer, FrameSource};
use crate::error::{PlantAiError, Result};
use chrono::{DateTime, Local};
use dialoguer::{Input, Select};
use plant_disease_common::Language;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Classification output for the currently selected image
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub image_name: String,
    /// SHA-256 of the analyzed image
    pub fingerprint: String,
    pub classifier: String,
    pub output: ClassificationOutput,
    pub analyzed_at: DateTime<Local>,
}

/// User actions
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Path to a leaf image
    SelectImage(PathBuf),
    /// Live frame from the attached camera
    CaptureImage,
    Analyze,
    ShowResult,
    PlayVoice,
    SetDisplayLanguage(Language),
    SetVoiceLanguage(Language),
    End,
}

/// Voice output of one request
#[derive(Debug, Clone)]
pub struct VoiceOutput {
    /// Saved MP3
    pub path: PathBuf,
    /// True when the audio was played on the attached player
    pub played: bool,
    pub warnings: Vec<String>,
}

/// User-visible outcome of an action
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Feedback {
    Info(String),
    Success(String),
    Warning(String),
    Error(String),
    /// Result text to show as-is
    Text(String),
}

impl Feedback {
    pub fn print(&self) {
        match self {
            Feedback::Info(msg) => println!("- {}", msg),
            Feedback::Success(msg) => println!("✔ {}", msg),
            Feedback::Warning(msg) => println!("⚠ {}", msg),
            Feedback::Error(msg) => println!("✖ {}", msg),
            Feedback::Text(text) => println!("\n{}\n", text),
        }
    }
}

pub struct Session {
    classifier: Arc<dyn Classifier>,
    composer: Arc<ResultComposer>,
    display_language: Language,
    voice_language: Language,
    audio_dir: PathBuf,
    player: Option<Arc<dyn AudioPlayer>>,
    camera: Option<Arc<dyn FrameSource>>,
    image: Option<LeafImage>,
    result: Option<AnalysisResult>,
    ended: bool,
}

impl Session {
    pub fn new(classifier: Arc<dyn Classifier>, composer: Arc<ResultComposer>, audio_dir: PathBuf) -> Self {
        Self {
            classifier,
            composer,
            display_language: Language::English,
            voice_language: Language::English,
            audio_dir,
            player: None,
            camera: None,
            image: None,
            result: None,
            ended: false,
        }
    }

    pub fn with_languages(mut self, display: Language, voice: Language) -> Self {
        self.display_language = display;
        self.voice_language = voice;
        self
    }

    pub fn with_player(mut self, player: Option<Arc<dyn AudioPlayer>>) -> Self {
        self.player = player;
        self
    }

    pub fn with_camera(mut self, camera: Option<Arc<dyn FrameSource>>) -> Self {
        self.camera = camera;
        self
    }

    pub fn has_camera(&self) -> bool {
        self.camera.is_some()
    }

    pub fn display_language(&self) -> Language {
        self.display_language
    }

    pub fn voice_language(&self) -> Language {
        self.voice_language
    }

    pub fn image(&self) -> Option<&LeafImage> {
        self.image.as_ref()
    }

    pub fn result(&self) -> Option<&AnalysisResult> {
        self.result.as_ref()
    }

    pub fn is_ended(&self) -> bool {
        self.ended
    }

    /// Returns true when a result for a different image was discarded
    pub fn select_image(&mut self, path: &Path) -> Result<bool> {
        let image = LeafImage::from_path(path)?;
        Ok(self.set_image(image))
    }

    /// Takes one frame from the camera and selects it.
    ///
    /// Returns the captured file name and whether a result was discarded.
    pub async fn capture_image(&mut self) -> Result<(String, bool)> {
        let camera = self.camera.clone().ok_or_else(|| {
            PlantAiError::Camera("no camera available (build with the `camera` feature); select an image file instead".into())
        })?;

        let image = tokio::task::spawn_blocking(move || camera.capture())
            .await
            .map_err(|e| PlantAiError::Camera(e.to_string()))??;

        let file_name = image.file_name.clone();
        Ok((file_name, self.set_image(image)))
    }

    pub fn set_image(&mut self, image: LeafImage) -> bool {
        let fingerprint = image.fingerprint();
        let discarded = match &self.result {
            Some(result) if result.fingerprint != fingerprint => {
                self.result = None;
                true
            }
            _ => false,
        };

        log::debug!("selected {} ({})", image.file_name, &fingerprint[..12]);
        self.image = Some(image);
        discarded
    }

    /// Classifies the selected image; the new result replaces the old one
    pub async fn analyze(&mut self) -> Result<&AnalysisResult> {
        let image = self.image.as_ref().ok_or(PlantAiError::NoImageSelected)?;
        let output = self.classifier.classify(image).await?;

        let result = AnalysisResult {
            image_name: image.file_name.clone(),
            fingerprint: image.fingerprint(),
            classifier: self.classifier.name().to_string(),
            output,
            analyzed_at: Local::now(),
        };
        Ok(self.result.insert(result))
    }

    pub async fn display(&self) -> Result<ComposedDisplay> {
        let result = self.result.as_ref().ok_or(PlantAiError::NoAnalysis)?;
        self.composer
            .compose_display(&result.output, self.display_language)
            .await
    }

    /// Synthesizes speech, writes it to the audio directory and plays it.
    ///
    /// A playback failure is a warning; the saved file is still returned.
    pub async fn play_voice(&self) -> Result<VoiceOutput> {
        let result = self.result.as_ref().ok_or(PlantAiError::NoAnalysis)?;
        let speech = self
            .composer
            .compose_speech(&result.output, self.voice_language)
            .await?;

        std::fs::create_dir_all(&self.audio_dir)?;
        let path = self.audio_dir.join(audio_file_name(result, self.voice_language));
        std::fs::write(&path, &speech.audio)?;

        let mut warnings: Vec<String> = speech.warnings.iter().map(|w| w.to_string()).collect();
        let played = match &self.player {
            Some(player) => match player.play(&speech.audio).await {
                Ok(()) => true,
                Err(e) => {
                    log::warn!("{}", e);
                    warnings.push(e.to_string());
                    false
                }
            },
            None => false,
        };

        Ok(VoiceOutput { path, played, warnings })
    }

    pub async fn handle(&mut self, action: Action) -> Vec<Feedback> {
        if self.ended {
            return vec![Feedback::Error("Session has ended".into())];
        }

        match action {
            Action::SelectImage(path) => match self.select_image(&path) {
                Ok(discarded) => {
                    let mut feedback = vec![Feedback::Success(format!("Selected {}", path.display()))];
                    if discarded {
                        feedback.push(Feedback::Info("Previous result cleared".into()));
                    }
                    feedback
                }
                Err(e) => vec![error_feedback(e)],
            },
            Action::CaptureImage => match self.capture_image().await {
                Ok((file_name, discarded)) => {
                    let mut feedback = vec![Feedback::Success(format!("Captured {}", file_name))];
                    if discarded {
                        feedback.push(Feedback::Info("Previous result cleared".into()));
                    }
                    feedback
                }
                Err(e) => vec![error_feedback(e)],
            },
            Action::Analyze => {
                let summary = match self.analyze().await {
                    Ok(result) => format!("Analyzed {} ({})", result.image_name, result.classifier),
                    Err(e) => return vec![error_feedback(e)],
                };
                let mut feedback = vec![Feedback::Success(summary)];
                feedback.extend(self.display_feedback().await);
                feedback
            }
            Action::ShowResult => self.display_feedback().await,
            Action::PlayVoice => match self.play_voice().await {
                Ok(voice) => {
                    let mut feedback: Vec<Feedback> = voice.warnings.into_iter().map(Feedback::Warning).collect();
                    let message = if voice.played {
                        format!("Played voice (saved: {})", voice.path.display())
                    } else {
                        format!("Audio saved: {}", voice.path.display())
                    };
                    feedback.push(Feedback::Success(message));
                    feedback
                }
                Err(e) => vec![error_feedback(e)],
            },
            Action::SetDisplayLanguage(language) => {
                self.display_language = language;
                vec![Feedback::Info(format!("Display language: {}", language))]
            }
            Action::SetVoiceLanguage(language) => {
                self.voice_language = language;
                vec![Feedback::Info(format!(
                    "Voice language: {} ({})",
                    language,
                    self.composer.voices().voice_for(language)
                ))]
            }
            Action::End => {
                self.result = None;
                self.image = None;
                self.ended = true;
                vec![Feedback::Info("Session ended".into())]
            }
        }
    }

    async fn display_feedback(&self) -> Vec<Feedback> {
        match self.display().await {
            Ok(display) => {
                let mut feedback = vec![Feedback::Text(display.text)];
                feedback.extend(display.warnings.iter().map(|w| Feedback::Warning(w.to_string())));
                feedback
            }
            Err(e) => vec![error_feedback(e)],
        }
    }
}

fn error_feedback(err: PlantAiError) -> Feedback {
    match &err {
        PlantAiError::Common(e) if e.is_lookup_failure() => log::error!("lookup failure: {}", e),
        e if !e.is_request_scoped() => log::error!("{}", e),
        e => log::warn!("{}", e),
    }
    Feedback::Error(err.to_string())
}

fn audio_file_name(result: &AnalysisResult, language: Language) -> String {
    let stem = Path::new(&result.image_name)
        .file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "result".to_string());
    format!("{}-{}.mp3", stem, language.code())
}

/// Terminal front-end for a session
pub async fn run_interactive(mut session: Session) -> Result<()> {
    println!("🌿 plant-ai - interactive session");
    println!(
        "Display: {} / Voice: {}\n",
        session.display_language(),
        session.voice_language()
    );

    while !session.is_ended() {
        let action = prompt_action(&session)?;
        for feedback in session.handle(action).await {
            feedback.print();
        }
    }

    Ok(())
}

const MENU: &[&str] = &[
    "Select image",
    "Capture from camera",
    "Analyze",
    "Show result",
    "Play voice",
    "Display language",
    "Voice language",
    "Quit",
];

fn prompt_action(session: &Session) -> Result<Action> {
    let default = if session.image().is_none() {
        if session.has_camera() { 1 } else { 0 }
    } else if session.result().is_none() {
        2
    } else {
        4
    };

    let choice = Select::new()
        .with_prompt("Action")
        .items(MENU)
        .default(default)
        .interact()
        .map_err(|e| PlantAiError::CliExecution(e.to_string()))?;

    match choice {
        0 => {
            let path: String = Input::new()
                .with_prompt("Leaf image path (jpg/png)")
                .interact_text()
                .map_err(|e| PlantAiError::CliExecution(e.to_string()))?;
            Ok(Action::SelectImage(PathBuf::from(path.trim())))
        }
        1 => Ok(Action::CaptureImage),
        2 => Ok(Action::Analyze),
        3 => Ok(Action::ShowResult),
        4 => Ok(Action::PlayVoice),
        5 => Ok(Action::SetDisplayLanguage(prompt_language("Display language", session.display_language())?)),
        6 => Ok(Action::SetVoiceLanguage(prompt_language("Voice language", session.voice_language())?)),
        _ => Ok(Action::End),
    }
}

fn prompt_language(prompt: &str, current: Language) -> Result<Language> {
    let labels: Vec<&str> = Language::ALL.iter().map(|l| l.label()).collect();
    let default = Language::ALL.iter().position(|l| *l == current).unwrap_or(0);

    let choice = Select::new()
        .with_prompt(prompt)
        .items(&labels)
        .default(default)
        .interact()
        .map_err(|e| PlantAiError::CliExecution(e.to_string()))?;

    Ok(Language::ALL.get(choice).copied().unwrap_or(current))
}
