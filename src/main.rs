use anyhow::Context;
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use plant_disease_ai::{app, cli, config, export, reconcile, scanner, session};
use plant_disease_common::LabelCatalog;
use cli::{Cli, Commands};
use config::Config;
use std::time::Duration;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = Config::load().context("failed to load config")?;

    match cli.command {
        Commands::Analyze { image, classifier, lang, voice, audio_out, json, resources, devices } => {
            println!("🌿 plant-ai - analyze\n");

            println!("[1/3] Loading resources...");
            let mut session = app::build_session(
                classifier,
                &config,
                &resources,
                lang,
                voice.unwrap_or(lang),
                devices.options(),
            )?;
            session.select_image(&image)?;
            println!("✔ {} ready\n", classifier);

            println!("[2/3] Analyzing {}...", image.display());
            let spinner = start_spinner(&format!("waiting for the {} classifier", classifier));
            let analyzed = session.analyze().await;
            spinner.finish_and_clear();
            analyzed?;
            println!("✔ Analysis complete\n");

            println!("[3/3] Composing result ({})...", lang);
            let display = session.display().await?;
            println!("\n{}\n", display.text);
            for warning in &display.warnings {
                println!("⚠ {}", warning);
            }

            if voice.is_some() {
                let spinner = start_spinner("synthesizing speech");
                let spoken = session.play_voice().await;
                spinner.finish_and_clear();
                match spoken {
                    Ok(spoken) => {
                        for warning in &spoken.warnings {
                            println!("⚠ {}", warning);
                        }
                        let path = match &audio_out {
                            Some(target) => {
                                std::fs::rename(&spoken.path, target)
                                    .or_else(|_| std::fs::copy(&spoken.path, target).map(|_| ()))?;
                                target.clone()
                            }
                            None => spoken.path,
                        };
                        if spoken.played {
                            println!("✔ Voice played");
                        }
                        println!("✔ Audio saved: {}", path.display());
                    }
                    Err(e) => println!("⚠ {}", e),
                }
            }

            if let (Some(json_path), Some(result)) = (&json, session.result()) {
                export::save_analysis_json(result, &display, json_path)?;
                println!("✔ Result saved: {}", json_path.display());
            }

            println!("\n✅ Done");
        }

        Commands::Session { classifier, lang, voice, resources, devices } => {
            let session = app::build_session(classifier, &config, &resources, lang, voice, devices.options())?;
            session::run_interactive(session).await?;
        }

        Commands::Catalog { dataset, output, show } => {
            if let Some(path) = show {
                let catalog = LabelCatalog::load(&path)
                    .with_context(|| format!("failed to read {}", path.display()))?;
                println!("Class indices ({} classes):", catalog.len());
                for (index, label) in catalog.iter() {
                    println!("  {:>3}: {}", index, label);
                }
                return Ok(());
            }

            let dataset = dataset.context("dataset directory is required")?;
            println!("📂 plant-ai - class indices\n");
            let catalog = scanner::build_catalog(&dataset)?;
            catalog.save(&output)?;
            println!("✔ {} classes written to {}", catalog.len(), output.display());
        }

        Commands::Reconcile { dataset, metadata, examples, report } => {
            println!("🔍 plant-ai - dataset / metadata check\n");
            let outcome = reconcile::run_reconciliation(&dataset, &metadata)?;
            println!("{}", reconcile::format_report(&outcome.report, examples));

            if let Some(report_path) = report {
                export::generate_reconciliation_excel(
                    &outcome.report,
                    &outcome.folders,
                    outcome.metadata.records(),
                    &report_path,
                )?;
                println!("\n✔ Report saved: {}", report_path.display());
            }

            if outcome.report.is_consistent() {
                println!("\n✅ Every folder and metadata row has a match");
            }
        }

        Commands::CheckApi => {
            let api_key = config.get_api_key()?;
            let spinner = start_spinner(&format!("contacting {}", config.model));
            let reply = plant_disease_ai::classifier::check_connectivity(
                config.http_client()?,
                &api_key,
                &config.model,
            )
            .await;
            spinner.finish_and_clear();
            println!("✔ {} replied:\n{}", config.model, reply?);
        }

        Commands::Config { set_api_key, show } => {
            let mut config = config;

            if let Some(key) = set_api_key {
                config.set_api_key(key)?;
                println!("✔ API key saved");
            }

            if show {
                println!("Config ({}):", Config::config_path()?.display());
                println!("  Model: {}", config.model);
                println!("  API key: {}", if config.api_key.is_some() { "set" } else { "not set" });
                println!("  Timeout: {}s", config.timeout_seconds);
                println!("  Input size: {}px", config.input_size);
                println!("  Metadata: {}", display_path(&config.metadata_path));
                println!("  Catalog: {}", display_path(&config.catalog_path));
                println!("  Model file: {}", display_path(&config.model_path));
                println!("  Audio dir: {}", config.audio_dir.display());
                println!("  TTS program: {}", config.tts_program);
                for language in plant_disease_common::Language::ALL {
                    println!("  Voice ({}): {}", language, config.voices.voice_for(language));
                }
            }
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level)).init();
}

fn start_spinner(message: &str) -> ProgressBar {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner());
    spinner.set_message(message.to_string());
    spinner.enable_steady_tick(Duration::from_millis(100));
    spinner
}

fn display_path(path: &Option<std::path::PathBuf>) -> String {
    path.as_ref()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| "not set".to_string())
}
