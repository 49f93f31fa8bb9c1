use clap::Parser;
use miette::IntoDiagnostic;
use tracing_subscriber::EnvFilter;

use nft_collector::app::{App, CollectReport};
use nft_collector::config::{ConfigLoader, ResolvedConfig};
use nft_collector::content::HttpContentClient;
use nft_collector::domain::SourceKind;
use nft_collector::helius::HeliusClient;
use nft_collector::listing::ListingSource;
use nft_collector::output::{JsonOutput, TracingSink};
use nft_collector::pacing::FixedDelay;
use nft_collector::simplehash::SimpleHashClient;
use nft_collector::store::ArtifactStore;
use nft_collector::uri::UriResolver;

#[derive(Parser)]
#[command(name = "nft-collect")]
#[command(about = "Download metadata, original metadata and images for every NFT in a collection")]
#[command(version, author)]
struct Cli {
    /// Path to the JSON config (defaults to ./nft-collector.json).
    #[arg(long)]
    config: Option<String>,

    /// Print the run report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

/// Fatal errors are reported on stderr and the process still exits normally.
fn main() {
    if let Err(report) = run() {
        eprintln!("{report:?}");
    }
}

fn run() -> miette::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = ConfigLoader::resolve(cli.config.as_deref())?;

    tracing::info!(
        source = %config.source,
        collection = %config.collection,
        output = %config.output_dir,
        "starting to download NFT metadata and images"
    );

    let report = match config.source {
        SourceKind::SimpleHash => {
            let source = SimpleHashClient::new(
                &config.api_key,
                config.collection.clone(),
                config.batch_size,
                config.endpoint.as_deref(),
            )?;
            collect(&config, source, cli.json)?
        }
        SourceKind::Helius => {
            let source = HeliusClient::new(
                &config.api_key,
                config.collection.clone(),
                config.batch_size,
                config.endpoint.as_deref(),
            )?;
            collect(&config, source, cli.json)?
        }
    };

    if cli.json {
        JsonOutput::print_report(&report).into_diagnostic()?;
    } else {
        print_summary(&report);
    }
    Ok(())
}

fn collect<L: ListingSource>(
    config: &ResolvedConfig,
    source: L,
    json: bool,
) -> miette::Result<CollectReport> {
    let app = App::new(
        ArtifactStore::new(config.output_dir.clone()),
        UriResolver::new(&config.ipfs_gateway, &config.arweave_gateway),
        source,
        HttpContentClient::new()?,
        FixedDelay::from_millis(config.delay_ms),
    );
    let report = if json {
        app.collect(&JsonOutput)?
    } else {
        app.collect(&TracingSink)?
    };
    Ok(report)
}

fn print_summary(report: &CollectReport) {
    let green = "\x1b[32m";
    let yellow = "\x1b[33m";
    let cyan = "\x1b[36m";
    let red = "\x1b[31m";
    let reset = "\x1b[0m";

    println!("{cyan}Finished! Total NFTs processed: {}{reset}", report.processed);
    println!(
        "{green}✓ metadata: {}  original metadata: {}  images: {}{reset}",
        report.metadata_written, report.originals_written, report.images_written
    );
    if report.summary_written {
        println!(
            "{green}✓ Saved metadata collection to {}/metadata.json{reset}",
            report.output_dir
        );
    } else {
        println!("{red}✗ metadata.json was not written{reset}");
    }
    if report.failures.is_empty() {
        return;
    }
    println!("{yellow}⚠ {} step(s) failed:{reset}", report.failures.len());
    for failure in &report.failures {
        println!(
            "{yellow}  #{} {} [{}] {}{reset}",
            failure.index, failure.filename, failure.stage, failure.message
        );
    }
}
