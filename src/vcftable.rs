use std::io::{BufRead, BufReader};
use std::path::Path;

use log::{debug, info};
use rayon::prelude::*;
use rust_htslib::bgzf;

use crate::config::Settings;
use crate::error::{Error, Result};
use crate::header::{HeaderText, Schema};
use crate::output::Destination;
use crate::record::{Record, RecordDecoder};
use crate::table::Table;

/// One data line and its 1-based line number in the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataLine {
    pub number: usize,
    pub text: String,
}

/// The input split into its header text and its data lines.
#[derive(Debug, Default)]
pub struct VcfText {
    pub header: HeaderText,
    pub data: Vec<DataLine>,
}

/// Open a plain or bgzipped VCF. `-` and `stdin` read standard input.
pub fn open_vcf(path: &str) -> Result<Box<dyn BufRead>> {
    let reader = match path {
        "-" | "stdin" => bgzf::Reader::from_stdin()?,
        _ => {
            if !Path::new(path).exists() {
                return Err(Error::FileNotFound(path.into()));
            }
            bgzf::Reader::from_path(path)?
        }
    };
    Ok(Box::new(BufReader::new(reader)))
}

/// Read the whole input once. `##` lines go to the header text, the `#CHROM` line is dropped,
/// everything else is a data line. A blank line is a data line too and fails to decode.
pub fn read_vcf<R: BufRead>(mut reader: R) -> Result<VcfText> {
    let mut text = VcfText::default();
    let mut line = String::new();
    let mut number = 0;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        number += 1;
        if HeaderText::is_meta_line(&line) {
            text.header.push_line(&line);
        } else if line.starts_with('#') {
            // #CHROM
        } else {
            text.data.push(DataLine {
                number,
                text: line.clone(),
            });
        }
    }
    Ok(text)
}

/// TableBuilder turns one annotated VCF into a [`Table`]: the header is read and both schemas are
/// extracted before any data line is decoded, then every data line is decoded against that schema
/// and the records are kept in file order.
#[derive(Debug, Clone, Default)]
pub struct TableBuilder {
    settings: Settings,
}

impl TableBuilder {
    pub fn new(settings: Settings) -> Self {
        TableBuilder { settings }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Read, decode and materialize the table for `vcf_path` without writing it.
    pub fn build(&self, vcf_path: &str) -> Result<Table> {
        let text = read_vcf(open_vcf(vcf_path)?)?;
        let table = self.build_from_text(&text)?;
        info!("decoded {} records from {}", table.len(), vcf_path);
        Ok(table)
    }

    pub fn build_from_text(&self, text: &VcfText) -> Result<Table> {
        let schema = Schema::from_header(&text.header, &self.settings);
        Ok(Table::new(self.decode(&schema, &text.data)?))
    }

    /// Build the table, then write it to `destination`. Nothing is written unless every line
    /// decoded, and a file destination only appears once the whole table is written.
    pub fn run(&self, vcf_path: &str, destination: &Destination) -> Result<Table> {
        let table = self.build(vcf_path)?;
        let mut output = destination.open()?;
        table.write(&mut output, self.settings.delimiter)?;
        output.finish()?;
        info!(
            "wrote {} rows and {} columns to {:?}",
            table.len(),
            table.columns().len(),
            destination
        );
        Ok(table)
    }

    // with several malformed lines, the one that comes first in the file is reported whatever the
    // thread count.
    fn decode(&self, schema: &Schema, lines: &[DataLine]) -> Result<Vec<Record>> {
        let decoder = RecordDecoder::new(schema);
        let decode = |line: &DataLine| decoder.decode(&line.text, line.number);
        if self.settings.threads <= 1 {
            return lines.iter().map(decode).collect();
        }

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.settings.threads)
            .build()?;
        debug!("decoding {} lines on {} threads", lines.len(), self.settings.threads);
        let results: Vec<Result<Record>> = pool.install(|| lines.par_iter().map(decode).collect());
        results.into_iter().collect()
    }
}
