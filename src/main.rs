use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use cpal::traits::{DeviceTrait, HostTrait};
use log::info;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use voidfilter_core::FilterConfig;

mod audio;
mod config;
mod wav;

use config::AppConfig;

#[derive(Parser)]
#[command(name = "voidfilter")]
#[command(about = "VoidFilter: RNNoise microphone filter with a voice gate", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List available audio devices
    List,
    /// Filter a live input into an output device (press Ctrl+C to stop)
    Run {
        #[arg(short, long)]
        input: Option<String>,
        #[arg(short, long)]
        output: Option<String>,
        #[command(flatten)]
        filter: FilterArgs,
    },
    /// Filter a mono 48kHz WAV file
    File {
        input: PathBuf,
        output: PathBuf,
        /// Samples per simulated device callback
        #[arg(short, long, default_value_t = 512)]
        block_size: usize,
        #[command(flatten)]
        filter: FilterArgs,
    },
}

#[derive(Args)]
struct FilterArgs {
    /// Voice probability that opens the gate (0.0-1.0)
    #[arg(long)]
    vad_threshold: Option<f32>,
    /// Frames (10ms each) the gate stays open after speech
    #[arg(long)]
    grace_frames: Option<u32>,
}

impl FilterArgs {
    fn apply(&self, mut config: FilterConfig) -> Result<FilterConfig> {
        if let Some(threshold) = self.vad_threshold {
            config.vad_threshold = threshold;
        }
        if let Some(frames) = self.grace_frames {
            config.grace_frames = frames;
        }
        config.validate()?;
        Ok(config)
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();
    let mut app_config = AppConfig::load();

    match cli.command {
        Commands::List => {
            list_devices()?;
        }
        Commands::Run {
            input,
            output,
            filter,
        } => {
            let filter_config = filter.apply(app_config.filter)?;
            let input = AppConfig::resolve_device(input, &app_config.last_input);
            let output = AppConfig::resolve_device(output, &app_config.last_output);

            let engine = audio::FilterEngine::start(&input, &output, filter_config)?;

            app_config.last_input = input;
            app_config.last_output = output;
            app_config.save();

            println!("VoidFilter active. Press Ctrl+C to stop.");

            // Graceful shutdown handling
            let running = Arc::new(AtomicBool::new(true));
            let r = running.clone();

            ctrlc::set_handler(move || {
                println!("\nShutting down gracefully...");
                r.store(false, Ordering::Relaxed);
            })?;

            while running.load(Ordering::Relaxed) {
                std::thread::sleep(std::time::Duration::from_millis(100));
            }

            info!(
                "Stopped after {} underruns, {} muted frames",
                engine.underruns(),
                engine.muted_frames()
            );
            println!("VoidFilter stopped.");
        }
        Commands::File {
            input,
            output,
            block_size,
            filter,
        } => {
            let filter_config = filter.apply(app_config.filter)?;
            let report = wav::filter_file(&input, &output, block_size, filter_config)?;
            println!(
                "Filtered {} samples ({} frames, {} muted, {} underruns) -> {}",
                report.samples,
                report.stats.frames,
                report.stats.muted_frames,
                report.stats.underruns,
                output.display()
            );
        }
    }

    Ok(())
}

fn list_devices() -> Result<()> {
    let host = cpal::default_host();
    println!("Audio Host: {}", host.id().name());
    println!("\nInput Devices:");
    for device in host.input_devices()? {
        println!("  - {}", device.name().unwrap_or("Unknown".to_string()));
    }
    println!("\nOutput Devices:");
    for device in host.output_devices()? {
        println!("  - {}", device.name().unwrap_or("Unknown".to_string()));
    }
    Ok(())
}
