use clap::Parser;
use log::{error, info};
use mammotriage_core::cli::{load_config, load_image, Cli, OutputFormat};
use mammotriage_core::{AnnotationIndex, Result, TextReport, TriageOutcome, TriagePipeline};
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

fn main() {
    let cli = Cli::parse();

    // Setup logging
    setup_logging(cli.verbose);

    match run(&cli) {
        Ok(outcomes) => {
            output_outcomes(&cli.files, &outcomes, cli.format);
            if outcomes.iter().any(|o| !o.is_accepted()) {
                process::exit(2);
            }
        }
        Err(e) => {
            error!("{}", e);
            eprintln!("Error: {}", e);
            process::exit(1);
        }
    }
}

fn setup_logging(verbose: bool) {
    if verbose {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }
}

fn run(cli: &Cli) -> Result<Vec<TriageOutcome>> {
    let index = AnnotationIndex::from_csv_paths(
        cli.breast_annotations.as_deref(),
        cli.finding_annotations.as_deref(),
    )?;
    let config = load_config(cli.config.as_deref())?;
    let pipeline = TriagePipeline::new(Arc::new(index)).with_config(config)?;

    let images = cli
        .files
        .iter()
        .map(|path| load_image(path))
        .collect::<Result<Vec<_>>>()?;
    info!("Loaded {} image(s)", images.len());

    if cli.batch {
        let reports = pipeline.triage_batch(&images)?;
        Ok(reports.into_iter().map(TriageOutcome::Accepted).collect())
    } else {
        Ok(images.iter().map(|image| pipeline.triage(image)).collect())
    }
}

fn output_outcomes(files: &[PathBuf], outcomes: &[TriageOutcome], format: OutputFormat) {
    match format {
        OutputFormat::Text => {
            for (path, outcome) in files.iter().zip(outcomes) {
                println!("{}", TextReport::new(path, outcome));
            }
        }
        OutputFormat::Json => {
            #[cfg(feature = "json")]
            {
                match output_json(files, outcomes) {
                    Ok(json) => println!("{}", json),
                    Err(e) => {
                        error!("Failed to serialize to JSON: {}", e);
                        eprintln!("Error: Failed to serialize to JSON: {}", e);
                        process::exit(1);
                    }
                }
            }
            #[cfg(not(feature = "json"))]
            {
                eprintln!("Error: JSON output requires the 'json' feature");
                eprintln!("Rebuild with: cargo build --features json");
                process::exit(1);
            }
        }
    }
}

#[cfg(feature = "json")]
fn output_json(
    files: &[PathBuf],
    outcomes: &[TriageOutcome],
) -> std::result::Result<String, serde_json::Error> {
    use serde::Serialize;

    #[derive(Serialize)]
    struct OutcomeJson<'a> {
        file_path: String,
        #[serde(flatten)]
        outcome: &'a TriageOutcome,
    }

    let results: Vec<OutcomeJson> = files
        .iter()
        .zip(outcomes)
        .map(|(path, outcome)| OutcomeJson {
            file_path: path.display().to_string(),
            outcome,
        })
        .collect();

    serde_json::to_string_pretty(&results)
}
