use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use mimalloc::MiMalloc;

use vcftable::config::{DEFAULT_ANNOTATION_PREFIX, DEFAULT_INFO_PREFIX};
use vcftable::{Destination, Settings, TableBuilder};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser, Debug)]
#[command(version, about = "flatten a Mutect2 + SnpEff annotated VCF into a table")]
struct Args {
    /// VCF (plain or bgzipped) to flatten. Use "-" for stdin.
    vcf: String,

    /// Output table. A ".gz" suffix writes bgzip-compressed output. Default is stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Write the table to <OUTDIR>/variants.csv
    #[arg(long, conflicts_with = "output")]
    outdir: Option<PathBuf>,

    /// Number of threads used to decode variant lines.
    #[arg(short, long, default_value_t = 1)]
    threads: usize,

    /// Column delimiter of the output table. "\t" or "tab" for tab-separated output.
    #[arg(short, long, default_value = ",", value_parser = parse_delimiter)]
    delimiter: u8,

    /// Label prepended to columns named from the variant caller's INFO declarations.
    #[arg(long, default_value = DEFAULT_INFO_PREFIX)]
    info_prefix: String,

    /// Label prepended to columns named from the functional annotation fields.
    #[arg(long, default_value = DEFAULT_ANNOTATION_PREFIX)]
    annotation_prefix: String,

    /// Verbose logging.
    #[arg(long)]
    debug: bool,
}

fn parse_delimiter(s: &str) -> Result<u8, String> {
    match s {
        "\\t" | "tab" => Ok(b'\t'),
        _ if s.len() == 1 && s.is_ascii() => Ok(s.as_bytes()[0]),
        _ => Err(format!("expected a single ASCII character, got '{}'", s)),
    }
}

fn main() {
    #[cfg(unix)]
    unsafe {
        libc::signal(libc::SIGPIPE, libc::SIG_DFL);
    }

    let args = Args::parse();
    let level = if args.debug { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();

    if let Err(e) = run(args) {
        error!("{}", e);
        std::process::exit(1);
    }
}

fn run(args: Args) -> vcftable::Result<()> {
    let settings = Settings {
        info_prefix: args.info_prefix,
        annotation_prefix: args.annotation_prefix,
        threads: args.threads,
        delimiter: args.delimiter,
    };
    let destination = Destination::new(args.output, args.outdir);
    info!("flattening {} with {} thread(s)", args.vcf, settings.threads);

    TableBuilder::new(settings).run(&args.vcf, &destination)?;
    Ok(())
}
