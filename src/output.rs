use std::fs::File;
use std::io::{BufWriter, Stdout, Write};
use std::path::{Path, PathBuf};

use rust_htslib::bgzf;
use tempfile::TempPath;

use crate::config::DEFAULT_OUTPUT_NAME;
use crate::error::Result;

/// Where the finished table goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    Stdout,
    /// A `.gz` path is bgzip-compressed, anything else is plain text.
    Path(PathBuf),
}

impl Destination {
    /// An explicit path wins; an output directory alone means `<outdir>/variants.csv`; neither
    /// means stdout. A path of `-` is also stdout.
    pub fn new(output: Option<PathBuf>, outdir: Option<PathBuf>) -> Self {
        match (output, outdir) {
            (Some(path), _) if path.as_os_str() == "-" => Destination::Stdout,
            (Some(path), _) => Destination::Path(path),
            (None, Some(dir)) => Destination::Path(dir.join(DEFAULT_OUTPUT_NAME)),
            (None, None) => Destination::Stdout,
        }
    }

    /// Open the destination, creating missing parent directories. A file destination is written
    /// to a temporary file next to it and only renamed into place by [`Output::finish`].
    pub fn open(&self) -> Result<Output> {
        match self {
            Destination::Stdout => Ok(Output {
                writer: EitherWriter::Stdout(BufWriter::new(std::io::stdout())),
                staged: None,
            }),
            Destination::Path(path) => {
                let parent = match path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    Some(parent) => {
                        std::fs::create_dir_all(parent)?;
                        parent
                    }
                    None => Path::new("."),
                };
                let mut builder = tempfile::Builder::new();
                builder.prefix(".vcftable");
                #[cfg(unix)]
                {
                    use std::os::unix::fs::PermissionsExt;
                    builder.permissions(std::fs::Permissions::from_mode(0o644));
                }
                if is_compressed(path) {
                    let temp = builder.suffix(".gz").tempfile_in(parent)?.into_temp_path();
                    let writer = EitherWriter::Bgzf(bgzf::Writer::from_path(&temp)?);
                    Ok(Output {
                        writer,
                        staged: Some((temp, path.clone())),
                    })
                } else {
                    let (file, temp) = builder.tempfile_in(parent)?.into_parts();
                    Ok(Output {
                        writer: EitherWriter::File(BufWriter::new(file)),
                        staged: Some((temp, path.clone())),
                    })
                }
            }
        }
    }
}

/// An opened destination. Dropping it without [`Output::finish`] removes the temporary file, so a
/// failed write never leaves a partial table behind.
pub struct Output {
    writer: EitherWriter,
    staged: Option<(TempPath, PathBuf)>,
}

impl Output {
    /// Flush and close the writer, then move the temporary file to the destination path.
    pub fn finish(mut self) -> Result<()> {
        self.writer.flush()?;
        let Output { writer, staged } = self;
        // bgzf writes its EOF block on close
        drop(writer);
        if let Some((temp, path)) = staged {
            temp.persist(&path).map_err(|e| e.error)?;
        }
        Ok(())
    }
}

impl Write for Output {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.writer.write(buf)
    }

    fn flush(&mut self) -> std::io::Result<()> {
        self.writer.flush()
    }
}

fn is_compressed(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "gz")
}

/// `EitherWriter` encapsulates the different writers a table can be sent to.
pub enum EitherWriter {
    Bgzf(bgzf::Writer),
    File(BufWriter<File>),
    Stdout(BufWriter<Stdout>),
}

impl Write for EitherWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        match self {
            EitherWriter::Bgzf(w) => w.write(buf),
            EitherWriter::File(w) => w.write(buf),
            EitherWriter::Stdout(w) => w.write(buf),
        }
    }

    fn flush(&mut self) -> std::io::Result<()> {
        match self {
            EitherWriter::Bgzf(w) => w.flush(),
            EitherWriter::File(w) => w.flush(),
            EitherWriter::Stdout(w) => w.flush(),
        }
    }
}
