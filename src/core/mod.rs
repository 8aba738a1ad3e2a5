pub mod config;
pub mod engine;
pub mod error;
pub mod fasta;
pub mod ingest;
pub mod io;
pub mod metrics;
pub mod model;
pub mod session;
pub mod table;
