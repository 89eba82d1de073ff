//! ingest-tester library
//!
//! An integration-test driver for a graph-ingestion HTTP API. One run
//! registers an ingest recipe on the target system, publishes a batch of
//! encoded synthetic records to a message transport, and verifies via the
//! query API that every record arrived intact.
//!
//! # Supported Transports
//!
//! - Kafka topics (`rdkafka`)
//! - Kinesis streams (`aws-sdk-kinesis`)
//! - SQS queues (`aws-sdk-sqs`)
//! - Pulsar topics (`pulsar`)
//!
//! # Record Encodings
//!
//! Records can be wrapped in an ordered chain of Gzip, Zlib, and Base64
//! transforms; the same chain is declared to the target system as its
//! `recordDecoders` list so the test exercises its decoding path.

pub mod api;
pub mod config;
pub mod encoding;
pub mod harness;
pub mod record;
pub mod recipe;
pub mod transport;

pub use encoding::Transform;
pub use harness::{TestRun, VerificationReport};
pub use transport::Transport;
