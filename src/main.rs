use clap::{Parser, Subcommand};
use std::sync::Arc;
use tracing::{error, info};

use contact_scrubber::app::scrub_use_case::{drain_source, ScrubUseCase};
use contact_scrubber::config::Config;
use contact_scrubber::domain::ScrubReport;
use contact_scrubber::infra::hubspot::{HubSpotSink, HubSpotSource};
use contact_scrubber::infra::snapshot::{persist_raw_contacts, JsonSnapshotSink};
use contact_scrubber::logging;
use contact_scrubber::normalize::ContactNormalizer;
use contact_scrubber::reference::{load_city_country_table, load_dial_code_table};

#[derive(Parser)]
#[command(name = "contact-scrubber")]
#[command(about = "CRM contact extraction, cleanup and dedupe pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Pull every contact page from the CRM and snapshot the raw records
    Fetch,
    /// Run the full pipeline: fetch, normalize, deduplicate, upload
    Run {
        /// Export the canonical set to a JSON file instead of uploading
        #[arg(long)]
        dry_run: bool,
    },
}

fn print_report(report: &ScrubReport) {
    println!("\n📊 Scrub results:");
    println!("   Fetched: {}", report.fetched);
    println!("   Canonical: {}", report.canonical);
    println!("   Merged away: {}", report.merged_away);
    println!(
        "   Uploaded: {}/{}",
        report.upload.succeeded, report.upload.attempted
    );

    if report.upload.failed > 0 {
        println!("\n⚠️  {} uploads failed:", report.upload.failed);
        for sample in &report.upload.failure_samples {
            println!("   - {}", sample);
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load environment variables
    dotenv::dotenv().ok();

    // Initialize logging
    logging::init_logging();

    let cli = Cli::parse();
    let config = Config::load()?;
    let token = Config::api_token()?;

    // Reference tables are loaded once and shared read-only from here on
    let dial_codes = Arc::new(load_dial_code_table(&config.reference.dial_codes_path)?);
    let gazetteer = Arc::new(load_city_country_table(&config.reference.cities_path)?);

    let source = Arc::new(HubSpotSource::new(
        &config.hubspot.base_url,
        &token,
        config.hubspot.batch_size,
        config.hubspot.timeout_seconds,
    )?);

    match cli.command {
        Commands::Fetch => {
            println!("📥 Fetching contacts from the CRM...");
            let raw = drain_source(source.as_ref()).await?;
            let path = persist_raw_contacts(&raw, &config.output.snapshot_dir)?;
            println!("💾 Saved {} raw contacts to {}", raw.len(), path);
        }
        Commands::Run { dry_run } => {
            println!("🧹 Running contact scrub pipeline...");
            let normalizer = ContactNormalizer::new(dial_codes, gazetteer);

            let report = if dry_run {
                let sink = Arc::new(JsonSnapshotSink::new(config.output.snapshot_dir.clone()));
                let use_case = ScrubUseCase::new(source, sink.clone(), normalizer);
                let report = use_case.run().await?;
                let path = sink.write_file()?;
                println!("💾 Canonical contacts exported to {}", path);
                report
            } else {
                let sink = Arc::new(HubSpotSink::new(
                    &config.hubspot.base_url,
                    &token,
                    config.hubspot.timeout_seconds,
                )?);
                let use_case = ScrubUseCase::new(source, sink, normalizer);
                use_case.run().await?
            };

            print_report(&report);
            if report.upload.failed > 0 {
                error!("Scrub finished with {} upload failures", report.upload.failed);
            } else {
                info!("Scrub finished cleanly");
                println!("✅ Scrub completed successfully");
            }
        }
    }

    Ok(())
}
