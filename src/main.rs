//! Command-line interface for ingest-tester
//!
//! # Usage Examples
//!
//! ```bash
//! # Kafka, 10 plain JSON records
//! ingest-tester --api-url localhost:8080 kafka --topic ingest-test
//!
//! # Kinesis, 10 base64-wrapped gzip records
//! ingest-tester -c 10 -e Base64,Gzip kinesis \
//!   --stream-name ingest-test \
//!   --access-key-id AKIA... --secret-access-key ...
//!
//! # SQS, 3 plain records with a 30s ingestion deadline
//! ingest-tester -c 3 --ingest-timeout 30s sqs \
//!   --queue-url https://sqs.us-east-1.amazonaws.com/123/ingest-test \
//!   --access-key-id AKIA... --secret-access-key ...
//!
//! # Pulsar with defaults
//! ingest-tester pulsar
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use ingest_tester::transport::{KafkaOpts, KinesisOpts, PulsarOpts, SqsOpts};
use ingest_tester::{config, TestRun, Transform, Transport};

#[derive(Parser)]
#[command(name = "ingest-tester")]
#[command(about = "Integration test driver for streaming ingest sources")]
#[command(long_about = None)]
struct Cli {
    /// Target ingest API endpoint (host:port or full URL)
    #[arg(long, short = 'q', global = true, default_value = "localhost:8080")]
    api_url: String,

    /// Number of records to send
    #[arg(long, short = 'c', global = true, default_value = "10")]
    count: u64,

    /// Comma-separated record encodings (Gzip, Zlib, Base64); unknown names
    /// are ignored
    #[arg(long, short = 'e', global = true, default_value = "")]
    encodings: String,

    /// Maximum time to wait for ingestion before querying (e.g. "500ms",
    /// "10s"; "0" queries immediately)
    #[arg(long, global = true, default_value = "10s")]
    ingest_timeout: String,

    #[command(subcommand)]
    transport: TransportCommand,
}

/// Transport to publish records to and ingest from
#[derive(Subcommand)]
enum TransportCommand {
    /// Publish to a Kafka topic
    Kafka {
        #[command(flatten)]
        opts: KafkaOpts,
    },
    /// Publish to a Kinesis stream
    Kinesis {
        #[command(flatten)]
        opts: KinesisOpts,
    },
    /// Publish to an SQS queue
    Sqs {
        #[command(flatten)]
        opts: SqsOpts,
    },
    /// Publish to a Pulsar topic
    Pulsar {
        #[command(flatten)]
        opts: PulsarOpts,
    },
}

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let transforms = Transform::parse_csv(&cli.encodings);
    let ingest_timeout = config::parse_duration(&cli.ingest_timeout)
        .context("Invalid --ingest-timeout value")?;

    let transport = match cli.transport {
        TransportCommand::Kafka { opts } => Transport::Kafka(opts),
        TransportCommand::Kinesis { opts } => Transport::Kinesis(opts),
        TransportCommand::Sqs { opts } => Transport::Sqs(opts),
        TransportCommand::Pulsar { opts } => Transport::Pulsar(opts),
    };

    let run = TestRun::new(&cli.api_url, cli.count, transforms, transport)?;
    run.run(ingest_timeout).await?;

    Ok(())
}
