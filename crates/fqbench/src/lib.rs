//! fqbench - benchmark harness for external FASTQ compression tools.
//!
//! The harness contains no compression logic of its own: codecs are
//! external binaries invoked through the [`codec::Executor`] seam. Its job
//! is sequencing, timing, sizing, and the backup/restore contract that
//! guarantees input files survive a run byte-for-byte.

pub mod bench;
pub mod cli;
pub mod codec;
pub mod config;
pub mod results;
