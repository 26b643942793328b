//! Built-in adapter definitions for the benchmarked compression tools.
//!
//! Every tool we benchmark fits one of three command-line conventions, so a
//! single struct parameterized by [`ArgStyle`] covers the whole set.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use super::executor::{CodecError, Executor};
use super::{CodecAdapter, CodecRun};

/// Command-line convention of an external compression tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArgStyle {
    /// `tool FILE` / `tool -d FILE.EXT`; the tool replaces its input with
    /// the output (gzip, bzip2).
    InPlace,
    /// `tool IN OUT` / `tool -d IN OUT`; input is kept (fqz_comp).
    ExplicitOutput,
    /// `tool FILE` produces `FILE.EXT` next to the kept input;
    /// `tool -d FILE.EXT` recreates `FILE` (quip).
    Sidecar,
}

/// A codec adapter that shells out to an external binary.
#[derive(Debug, Clone)]
pub struct ExternalCodec {
    name: String,
    program: String,
    suffix: String,
    style: ArgStyle,
}

impl ExternalCodec {
    pub fn new(
        name: impl Into<String>,
        program: impl Into<String>,
        suffix: impl Into<String>,
        style: ArgStyle,
    ) -> Self {
        Self {
            name: name.into(),
            program: program.into(),
            suffix: suffix.into(),
            style,
        }
    }

    pub fn gzip() -> Self {
        Self::new("gzip", "gzip", "gz", ArgStyle::InPlace)
    }

    pub fn bzip2() -> Self {
        Self::new("bzip2", "bzip2", "bz2", ArgStyle::InPlace)
    }

    pub fn fqz_comp() -> Self {
        Self::new("fqz_comp", "fqz_comp", "fqz", ArgStyle::ExplicitOutput)
    }

    pub fn quip() -> Self {
        Self::new("quip", "quip", "qp", ArgStyle::Sidecar)
    }

    /// Path `decompress` will produce for a given compressed input, i.e.
    /// the input with this codec's suffix stripped.
    fn decompressed_path(&self, input: &Path) -> Result<PathBuf, CodecError> {
        let dotted = format!(".{}", self.suffix);
        let name = input.to_str().ok_or_else(|| {
            CodecError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!("non-UTF-8 path: {}", input.display()),
            ))
        })?;
        let stripped = name.strip_suffix(&dotted).ok_or_else(|| {
            CodecError::Io(std::io::Error::new(
                std::io::ErrorKind::InvalidInput,
                format!(
                    "{} input does not carry the .{} suffix: {name}",
                    self.name, self.suffix
                ),
            ))
        })?;
        Ok(PathBuf::from(stripped))
    }

    /// Remove a stale output file so tools that refuse to overwrite
    /// (gzip without -f, fqz_comp) start from a clean slate.
    fn clear_output(path: &Path) -> Result<(), CodecError> {
        match fs::remove_file(path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CodecError::Io(e)),
        }
    }

    fn expect_output(&self, elapsed: std::time::Duration, output: PathBuf) -> Result<CodecRun, CodecError> {
        if !output.exists() {
            return Err(CodecError::MissingOutput {
                tool: self.name.clone(),
                path: output,
            });
        }
        Ok(CodecRun { elapsed, output })
    }

    /// Argument vector for compressing `input` into `output`.
    fn compress_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        match self.style {
            ArgStyle::InPlace | ArgStyle::Sidecar => vec![input.into()],
            ArgStyle::ExplicitOutput => vec![input.into(), output.into()],
        }
    }

    /// Argument vector for decompressing `input` into `output`.
    fn decompress_args(&self, input: &Path, output: &Path) -> Vec<OsString> {
        match self.style {
            ArgStyle::InPlace | ArgStyle::Sidecar => vec!["-d".into(), input.into()],
            ArgStyle::ExplicitOutput => vec!["-d".into(), input.into(), output.into()],
        }
    }
}

impl CodecAdapter for ExternalCodec {
    fn name(&self) -> &str {
        &self.name
    }

    fn compressed_path(&self, input: &Path) -> PathBuf {
        let mut os = input.as_os_str().to_os_string();
        os.push(".");
        os.push(&self.suffix);
        PathBuf::from(os)
    }

    fn compress(&self, input: &Path, exec: &dyn Executor) -> Result<CodecRun, CodecError> {
        let output = self.compressed_path(input);
        Self::clear_output(&output)?;
        let args = self.compress_args(input, &output);
        let elapsed = exec.invoke(&self.program, &args)?;
        self.expect_output(elapsed, output)
    }

    fn decompress(&self, input: &Path, exec: &dyn Executor) -> Result<CodecRun, CodecError> {
        let output = self.decompressed_path(input)?;
        Self::clear_output(&output)?;
        let args = self.decompress_args(input, &output);
        let elapsed = exec.invoke(&self.program, &args)?;
        self.expect_output(elapsed, output)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::Duration;

    /// Executor that records invocations and creates the files a real tool
    /// would, per the codec's documented convention.
    struct RecordingExecutor {
        calls: Mutex<Vec<(String, Vec<OsString>)>>,
        create: PathBuf,
        remove: Option<PathBuf>,
    }

    impl RecordingExecutor {
        fn new(create: PathBuf, remove: Option<PathBuf>) -> Self {
            Self {
                calls: Mutex::new(Vec::new()),
                create,
                remove,
            }
        }
    }

    impl Executor for RecordingExecutor {
        fn invoke(&self, program: &str, args: &[OsString]) -> Result<Duration, CodecError> {
            self.calls
                .lock()
                .unwrap()
                .push((program.to_string(), args.to_vec()));
            fs::write(&self.create, b"artifact").unwrap();
            if let Some(ref p) = self.remove {
                let _ = fs::remove_file(p);
            }
            Ok(Duration::from_millis(5))
        }
    }

    #[test]
    fn compressed_path_appends_suffix() {
        let gzip = ExternalCodec::gzip();
        assert_eq!(
            gzip.compressed_path(Path::new("/data/reads.fastq")),
            PathBuf::from("/data/reads.fastq.gz")
        );
    }

    #[test]
    fn decompressed_path_strips_suffix() {
        let quip = ExternalCodec::quip();
        assert_eq!(
            quip.decompressed_path(Path::new("/data/reads.fastq.qp"))
                .unwrap(),
            PathBuf::from("/data/reads.fastq")
        );
    }

    #[test]
    fn decompress_rejects_input_without_suffix() {
        let gzip = ExternalCodec::gzip();
        let err = gzip
            .decompressed_path(Path::new("/data/reads.fastq"))
            .unwrap_err();
        assert!(matches!(err, CodecError::Io(_)));
    }

    #[test]
    fn in_place_compress_invokes_tool_on_input() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fastq");
        fs::write(&input, b"@r1\nACGT\n+\nIIII\n").unwrap();

        let gzip = ExternalCodec::gzip();
        let output = gzip.compressed_path(&input);
        let exec = RecordingExecutor::new(output.clone(), Some(input.clone()));

        let run = gzip.compress(&input, &exec).unwrap();
        assert_eq!(run.output, output);

        let calls = exec.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "gzip");
        assert_eq!(calls[0].1, vec![OsString::from(&input)]);
    }

    #[test]
    fn explicit_output_decompress_passes_both_paths() {
        let dir = tempfile::tempdir().unwrap();
        let compressed = dir.path().join("reads.fastq.fqz");
        fs::write(&compressed, b"blob").unwrap();

        let fqz = ExternalCodec::fqz_comp();
        let restored = dir.path().join("reads.fastq");
        let exec = RecordingExecutor::new(restored.clone(), None);

        let run = fqz.decompress(&compressed, &exec).unwrap();
        assert_eq!(run.output, restored);

        let calls = exec.calls.lock().unwrap();
        assert_eq!(
            calls[0].1,
            vec![
                OsString::from("-d"),
                OsString::from(&compressed),
                OsString::from(&restored)
            ]
        );
    }

    #[test]
    fn compress_clears_stale_output_first() {
        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fastq");
        fs::write(&input, b"data").unwrap();

        let quip = ExternalCodec::quip();
        let output = quip.compressed_path(&input);
        fs::write(&output, b"stale").unwrap();

        let exec = RecordingExecutor::new(output.clone(), None);
        let run = quip.compress(&input, &exec).unwrap();
        assert_eq!(fs::read(&run.output).unwrap(), b"artifact");
    }

    #[test]
    fn missing_output_is_an_error() {
        struct NoopExecutor;
        impl Executor for NoopExecutor {
            fn invoke(&self, _: &str, _: &[OsString]) -> Result<Duration, CodecError> {
                Ok(Duration::from_millis(1))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        let input = dir.path().join("reads.fastq");
        fs::write(&input, b"data").unwrap();

        let err = ExternalCodec::gzip()
            .compress(&input, &NoopExecutor)
            .unwrap_err();
        assert!(matches!(err, CodecError::MissingOutput { .. }));
    }
}
