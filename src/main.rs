use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use colored::Colorize;

use voltage_spikes::config::{load_config, save_config, Config};
use voltage_spikes::local::process_file::{process_dataset, process_file, write_detection_csv};
use voltage_spikes::local::simulate::run_simulation;
use voltage_spikes::Result;

#[derive(Parser, Debug)]
#[command(name = "voltage-spikes", version, about = "Adaptive peak detection for voltage recordings")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Detect peaks in a single recording
    Detect {
        /// Recording to analyse
        csv: PathBuf,
        /// YAML configuration file
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write the per-sample detection table here
        #[arg(short, long)]
        output: Option<PathBuf>,
        #[arg(long)]
        lag: Option<usize>,
        #[arg(long)]
        threshold: Option<f64>,
        #[arg(long)]
        influence: Option<f64>,
        /// The file has no metadata rows before the data
        #[arg(long)]
        no_metadata: bool,
    },
    /// Detect peaks in every recording of a labelled dataset
    Dataset {
        /// Folder holding one sub-folder per label
        root: PathBuf,
        #[arg(short, long)]
        config: Option<PathBuf>,
        /// Write per-recording tables and summary.csv here
        #[arg(short, long)]
        output_dir: Option<PathBuf>,
        /// Only load these label folders
        #[arg(short, long, num_args = 1..)]
        labels: Option<Vec<String>>,
    },
    /// Stream a synthetic signal through the detector
    Simulate {
        #[arg(short, long)]
        config: Option<PathBuf>,
        #[arg(short, long, default_value_t = 1000)]
        samples: usize,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
    /// Write the default configuration to a YAML file
    InitConfig { path: PathBuf },
}

fn config_from(path: Option<&PathBuf>) -> Result<Config> {
    match path {
        Some(path) => load_config(path),
        None => Ok(Config::default()),
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Detect {
            csv,
            config,
            output,
            lag,
            threshold,
            influence,
            no_metadata,
        } => {
            let mut config = config_from(config.as_ref())?;
            if let Some(lag) = lag {
                config.detector.lag = lag;
            }
            if let Some(threshold) = threshold {
                config.detector.threshold = threshold;
            }
            if let Some(influence) = influence {
                config.detector.influence = influence;
            }
            if no_metadata {
                config.loader.has_metadata = false;
            }
            config.validate()?;

            let report = process_file(&csv, &config)?;
            println!(
                "{} {} ({} samples, {} peaks)",
                "Processed".green(),
                csv.display(),
                report.signal.len(),
                report.peak_count()
            );
            for index in report.peak_indices() {
                println!("  peak at {} ({:.4})", index, report.signal[index]);
            }
            if let Some(output) = output {
                write_detection_csv(&output, &report.detection, &report.signal)?;
                println!("{} {}", "Wrote".green(), output.display());
            }
        }
        Command::Dataset {
            root,
            config,
            output_dir,
            labels,
        } => {
            let config = config_from(config.as_ref())?;
            let reports = process_dataset(
                &root,
                &config,
                labels.as_deref(),
                output_dir.as_deref(),
            )?;
            for report in &reports {
                println!(
                    "{:>8} {} {}",
                    report.label.cyan(),
                    report.source.display(),
                    format!("{} peaks", report.peak_count()).yellow()
                );
            }
            println!(
                "{} {} recordings",
                "Processed".green(),
                reports.len()
            );
        }
        Command::Simulate {
            config,
            samples,
            seed,
        } => {
            let config = config_from(config.as_ref())?;
            let stdout = std::io::stdout();
            let mut out = stdout.lock();
            let summary = run_simulation(&config, samples, seed, &mut out)?;
            println!(
                "{} injected {} spikes, detected {} peaks",
                "Done:".green(),
                summary.injected.len(),
                summary.detected.len()
            );
        }
        Command::InitConfig { path } => {
            save_config(&Config::default(), &path)?;
            println!("{} {}", "Wrote".green(), path.display());
        }
    }
    Ok(())
}

fn main() -> ExitCode {
    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {}", "error:".red().bold(), err);
            ExitCode::FAILURE
        }
    }
}
