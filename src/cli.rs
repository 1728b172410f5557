use crate::classifier::ClassifierKind;
use crate::device::DeviceOptions;
use clap::{Args, Parser, Subcommand};
use plant_disease_common::Language;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "plant-ai")]
#[command(about = "Plant leaf disease analysis with translated display and voice output", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Debug-level logging (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

/// Files loaded once at startup; each falls back to the config file
#[derive(Args, Debug, Clone, Default)]
pub struct ResourceArgs {
    /// Disease metadata sheet (.xlsx or .csv, needs a Disease column)
    #[arg(long)]
    pub metadata: Option<PathBuf>,

    /// Class index file written by `plant-ai catalog`
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Trained model (ONNX)
    #[arg(long)]
    pub model: Option<PathBuf>,
}

/// Audio output and camera selection
#[derive(Args, Debug, Clone, Default)]
pub struct DeviceArgs {
    /// Camera index for live capture (needs the `camera` feature)
    #[arg(long, default_value_t = 0)]
    pub camera_index: u32,

    /// Save voice output without playing it
    #[arg(long)]
    pub mute: bool,
}

impl DeviceArgs {
    pub fn options(&self) -> DeviceOptions {
        DeviceOptions {
            camera_index: self.camera_index,
            mute: self.mute,
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Analyze one leaf image
    Analyze {
        /// Leaf image (jpg/jpeg/png)
        #[arg(required = true)]
        image: PathBuf,

        /// Classifier (local/gemini)
        #[arg(short, long, default_value = "gemini")]
        classifier: ClassifierKind,

        /// Display language (english/urdu/sindhi)
        #[arg(short, long, default_value = "english")]
        lang: Language,

        /// Voice language; speech is produced only when set
        #[arg(long)]
        voice: Option<Language>,

        /// Where to write the MP3 (default: audio_dir from config)
        #[arg(long)]
        audio_out: Option<PathBuf>,

        /// Save the analysis result and displayed text as JSON
        #[arg(long)]
        json: Option<PathBuf>,

        #[command(flatten)]
        resources: ResourceArgs,

        #[command(flatten)]
        devices: DeviceArgs,
    },

    /// Interactive session (select or capture image, analyze, play voice)
    Session {
        /// Classifier (local/gemini)
        #[arg(short, long, default_value = "gemini")]
        classifier: ClassifierKind,

        /// Display language (english/urdu/sindhi)
        #[arg(short, long, default_value = "english")]
        lang: Language,

        /// Voice language (english/urdu/sindhi)
        #[arg(long, default_value = "english")]
        voice: Language,

        #[command(flatten)]
        resources: ResourceArgs,

        #[command(flatten)]
        devices: DeviceArgs,
    },

    /// Build the class index file from dataset folders
    Catalog {
        /// Dataset directory with one folder per class
        #[arg(required_unless_present = "show")]
        dataset: Option<PathBuf>,

        /// Output JSON file
        #[arg(short, long, default_value = "class_indices.json")]
        output: PathBuf,

        /// Print an existing class index file instead
        #[arg(long, conflicts_with = "dataset")]
        show: Option<PathBuf>,
    },

    /// Check dataset folders against the metadata sheet
    Reconcile {
        /// Dataset directory with one folder per class
        #[arg(short, long)]
        dataset: PathBuf,

        /// Disease metadata sheet (.xlsx or .csv)
        #[arg(short, long)]
        metadata: PathBuf,

        /// Example names to print per list
        #[arg(short, long, default_value = "10")]
        examples: usize,

        /// Also write the report as an Excel workbook
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Send a test prompt to Gemini
    CheckApi,

    /// Configuration
    Config {
        /// Store the Gemini API key
        #[arg(long)]
        set_api_key: Option<String>,

        /// Show the current configuration
        #[arg(long)]
        show: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_analyze() {
        let cli = Cli::try_parse_from([
            "plant-ai", "analyze", "leaf.jpg", "--classifier", "local", "--lang", "urdu", "--voice", "sd",
            "--catalog", "class_indices.json",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { image, classifier, lang, voice, resources, .. } => {
                assert_eq!(image, PathBuf::from("leaf.jpg"));
                assert_eq!(classifier, ClassifierKind::Local);
                assert_eq!(lang, Language::Urdu);
                assert_eq!(voice, Some(Language::Sindhi));
                assert_eq!(resources.catalog, Some(PathBuf::from("class_indices.json")));
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_parse_session_devices() {
        let cli = Cli::try_parse_from(["plant-ai", "session", "--camera-index", "2", "--mute"]).unwrap();
        match cli.command {
            Commands::Session { devices, .. } => {
                let options = devices.options();
                assert_eq!(options.camera_index, 2);
                assert!(options.mute);
            }
            _ => panic!("expected session"),
        }
    }

    #[test]
    fn test_unknown_language_rejected() {
        assert!(Cli::try_parse_from(["plant-ai", "analyze", "leaf.jpg", "--lang", "klingon"]).is_err());
    }

    #[test]
    fn test_catalog_requires_dataset_or_show() {
        assert!(Cli::try_parse_from(["plant-ai", "catalog"]).is_err());
        assert!(Cli::try_parse_from(["plant-ai", "catalog", "--show", "class_indices.json"]).is_ok());
    }
}
