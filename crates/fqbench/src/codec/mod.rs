//! Codec adapters: named compress/decompress capabilities backed by
//! external binaries.

mod executor;
mod external;

pub use executor::{CodecError, Executor, SystemExecutor};
pub use external::{ArgStyle, ExternalCodec};

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Result};

/// Outcome of a single compress or decompress invocation.
#[derive(Debug, Clone)]
pub struct CodecRun {
    /// Wall time of the external process.
    pub elapsed: Duration,
    /// File the tool produced.
    pub output: PathBuf,
}

/// A compression utility under benchmark.
///
/// Adapter contract: `compress` and `decompress` clear their own output
/// path before invoking the tool (several tools refuse to overwrite), and
/// verify the tool actually produced the output it is documented to
/// produce. Whether the tool consumes its input varies per tool and is the
/// harness's problem: it re-seeds the working file from backup as needed
/// and removes surviving artifacts after each cycle.
pub trait CodecAdapter: std::fmt::Debug + Send + Sync {
    /// Tool name, used in results and CLI selection.
    fn name(&self) -> &str;

    /// Path `compress(input)` will produce.
    fn compressed_path(&self, input: &Path) -> PathBuf;

    /// Compress `input`, returning elapsed time and the output path.
    fn compress(&self, input: &Path, exec: &dyn Executor) -> Result<CodecRun, CodecError>;

    /// Decompress `input` (a file previously produced by `compress`).
    fn decompress(&self, input: &Path, exec: &dyn Executor) -> Result<CodecRun, CodecError>;
}

/// The default codec set, in benchmark order.
pub fn builtin_codecs() -> Vec<ExternalCodec> {
    vec![
        ExternalCodec::gzip(),
        ExternalCodec::bzip2(),
        ExternalCodec::fqz_comp(),
        ExternalCodec::quip(),
    ]
}

/// Names of all built-in codecs.
pub fn codec_names() -> Vec<&'static str> {
    vec!["gzip", "bzip2", "fqz_comp", "quip"]
}

/// Resolve an ordered list of codec names against the built-in registry.
pub fn resolve_codecs(names: &[String]) -> Result<Vec<Box<dyn CodecAdapter>>> {
    let mut codecs: Vec<Box<dyn CodecAdapter>> = Vec::with_capacity(names.len());
    for name in names {
        codecs.push(resolve_codec(name)?);
    }
    Ok(codecs)
}

/// Resolve a single codec name.
pub fn resolve_codec(name: &str) -> Result<Box<dyn CodecAdapter>> {
    let Some(codec) = builtin_codecs()
        .into_iter()
        .find(|c| c.name() == name)
    else {
        bail!(
            "unknown codec: {name}. Valid options: {}",
            codec_names().join(", ")
        );
    };
    Ok(Box::new(codec))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_preserves_order() {
        let codecs =
            resolve_codecs(&["bzip2".to_string(), "gzip".to_string()]).unwrap();
        let names: Vec<_> = codecs.iter().map(|c| c.name().to_string()).collect();
        assert_eq!(names, ["bzip2", "gzip"]);
    }

    #[test]
    fn resolve_rejects_unknown_name() {
        let err = resolve_codec("xz").unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("unknown codec: xz"), "message was: {msg}");
        assert!(msg.contains("gzip"), "message should list valid codecs");
    }
}
