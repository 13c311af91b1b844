//! petoi-learn CLI
//!
//! Command-line access to the block pipeline: train a classifier on a
//! sensor log, classify an image, capture a webcam frame, upload a
//! prediction.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand, ValueEnum};

use petoi_learn::model::{training_accuracy, Classifier};
use petoi_learn::sensor;
use petoi_learn::{blocks, paths};

#[derive(Parser, Debug)]
#[command(name = "petoi-learn", version, about = "Sensor classifier and webcam classification blocks")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Train a classifier on a sensor log from ~/sensor_data.
    Train {
        /// Log file name (with or without .csv).
        file: String,
        /// Label column name.
        #[arg(long, default_value = "label")]
        target: String,
        /// Which algorithm to fit.
        #[arg(long, value_enum, default_value_t = Algorithm::Tree)]
        algorithm: Algorithm,
        /// Hidden layer sizes for the neural network.
        #[arg(long, value_delimiter = ',', default_value = "100")]
        hidden: Vec<usize>,
        /// Training iterations for the neural network.
        #[arg(long, default_value_t = 200)]
        max_iter: usize,
    },
    /// Classify an image with a pretrained model.
    Classify {
        /// Image file to classify.
        image: PathBuf,
        /// Model name under ~/models, full path, or URL.
        #[arg(long)]
        model: String,
        /// Class names in model output order (defaults to the stock set).
        #[arg(long, value_delimiter = ',')]
        classes: Vec<String>,
    },
    /// Capture one webcam frame into ~/webcam_images.
    #[cfg(feature = "camera")]
    Capture {
        /// Camera device index.
        #[arg(long, default_value_t = 0)]
        device: u32,
    },
    /// Upload a prediction to the REST endpoint.
    Send {
        /// Image file to attach.
        image: PathBuf,
        /// Predicted label.
        label: String,
        /// Prediction confidence.
        confidence: f64,
        /// Endpoint URL (defaults to the configured endpoint).
        #[arg(long)]
        url: Option<String>,
    },
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Algorithm {
    Tree,
    #[cfg(feature = "ml")]
    Mlp,
}

fn main() -> ExitCode {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(Cli::parse()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> petoi_learn::Result<()> {
    match cli.command {
        Commands::Train {
            file,
            target,
            algorithm,
            hidden,
            max_iter,
        } => {
            let model = match algorithm {
                Algorithm::Tree => blocks::train_decision_tree(&file, &target)?,
                #[cfg(feature = "ml")]
                Algorithm::Mlp => blocks::train_neural_network(&file, &target, hidden, max_iter)?,
            };
            #[cfg(not(feature = "ml"))]
            let _ = (hidden, max_iter);

            let path = paths::sensor_data_path(&file)?;
            let dataset = sensor::load_with_target(&path, &target)?;
            let accuracy = training_accuracy(&model, &dataset)?;

            println!("classes: {}", model.classes().join(", "));
            if !model.feature_mask().dropped().is_empty() {
                println!("pruned columns: {}", model.feature_mask().dropped().join(", "));
            }
            println!("training accuracy: {:.1}%", accuracy * 100.0);
            Ok(())
        }
        Commands::Classify {
            image,
            model,
            classes,
        } => {
            let mut model = blocks::load_custom_model(&model)?;
            let class_list = if classes.is_empty() { None } else { Some(classes.as_slice()) };
            let label = blocks::predict_label_from_image(&mut model, &image, class_list)?;
            let confidence =
                blocks::predict_confidence_from_image(&mut model, &image, class_list)?;
            println!("{label} ({confidence:.4})");
            Ok(())
        }
        #[cfg(feature = "camera")]
        Commands::Capture { device } => {
            let path = blocks::capture_webcam_image(device)?;
            println!("{}", path.display());
            Ok(())
        }
        Commands::Send {
            image,
            label,
            confidence,
            url,
        } => {
            let outcome =
                blocks::send_prediction_data(&image, &label, confidence, url.as_deref(), None);
            println!("{}", outcome.to_json());
            Ok(())
        }
    }
}
