use crate::caller::CallerConfig;
use crate::utils::Result;
use chrono::Datelike;
use clap::{ArgAction, ArgGroup, Parser, Subcommand};
use env_logger::fmt::Color;
use log::{Level, LevelFilter};
use once_cell::sync::Lazy;
use std::{
    io::Write,
    path::{Path, PathBuf},
};

pub static FULL_VERSION: Lazy<String> = Lazy::new(|| {
    format!(
        "{}-{}",
        env!("CARGO_PKG_VERSION"),
        env!("VERGEN_GIT_DESCRIBE")
    )
});

#[derive(Parser)]
#[command(name="minorcall",
          version=&**FULL_VERSION,
          about="Amino acid minority variant caller and codon haplotype phaser",
          long_about = None,
          disable_help_subcommand = true,
          after_help = format!("Copyright (C) 2016-{}     Minorcall developers
This program comes with ABSOLUTELY NO WARRANTY; it is intended for
Research Use Only and not for use in diagnostic procedures.", chrono::Utc::now().year()),
          help_template = "{name} {version}\n{about-section}\n{usage-heading}\n    {usage}\n\n{all-args}{after-help}",
          )]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[clap(short = 'v')]
    #[clap(long = "verbose")]
    #[clap(action = ArgAction::Count, help = "Specify multiple times to increase verbosity level (e.g., -vv for more verbosity)")]
    pub verbosity: u8,
}

#[derive(Subcommand)]
pub enum Command {
    #[clap(about = "Call amino acid variants and phase haplotypes")]
    Call(CallArgs),
    #[clap(about = "Target configuration validator")]
    Validate(ValidateArgs),
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("call")))]
#[command(arg_required_else_help(true))]
pub struct CallArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "Aligned reads (name, begin, bases per line; optionally gzipped)")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(required = true)]
    #[clap(short = 'o')]
    #[clap(long = "output-prefix")]
    #[clap(help = "Prefix for output files")]
    #[clap(value_name = "OUTPUT_PREFIX")]
    #[arg(value_parser = check_prefix_path)]
    pub output_prefix: String,

    #[clap(short = 'c')]
    #[clap(long = "targets")]
    #[clap(help = "JSON target configuration with genes, known minors and DRMs")]
    #[clap(value_name = "CONFIG")]
    #[arg(value_parser = check_file_exists)]
    pub targets_path: Option<PathBuf>,

    #[clap(short = 'g')]
    #[clap(long = "reference")]
    #[clap(help = "Indexed reference FASTA, overrides the configured reference sequence")]
    #[clap(value_name = "FASTA")]
    #[arg(value_parser = check_file_exists)]
    pub reference_path: Option<PathBuf>,

    #[clap(long = "contig")]
    #[clap(help = "Reference contig to use (defaults to the first one)")]
    #[clap(value_name = "CONTIG")]
    #[clap(requires = "reference_path")]
    pub contig: Option<String>,

    #[clap(short = 't')]
    #[clap(long = "threads")]
    #[clap(help = "Number of threads")]
    #[clap(value_name = "THREADS")]
    #[clap(default_value = "1")]
    #[arg(value_parser = threads_in_range)]
    pub num_threads: usize,

    #[clap(help_heading("Calling"))]
    #[clap(long = "substitution-rate")]
    #[clap(value_name = "RATE")]
    #[clap(help = "Per-base substitution error rate")]
    #[clap(default_value = "0.01")]
    #[arg(value_parser = ensure_unit_float)]
    pub substitution_rate: f64,

    #[clap(help_heading("Calling"))]
    #[clap(long = "deletion-rate")]
    #[clap(value_name = "RATE")]
    #[clap(help = "Per-base deletion error rate")]
    #[clap(default_value = "0.01")]
    #[arg(value_parser = ensure_unit_float)]
    pub deletion_rate: f64,

    #[clap(help_heading("Calling"))]
    #[clap(long = "alpha")]
    #[clap(value_name = "ALPHA")]
    #[clap(help = "Significance level for corrected p-values")]
    #[clap(default_value = "0.01")]
    #[arg(value_parser = ensure_unit_float)]
    pub alpha: f64,

    #[clap(help_heading("Calling"))]
    #[clap(long = "min-perc")]
    #[clap(value_name = "PERC")]
    #[clap(help = "Minimal variant frequency in percent of coverage")]
    #[clap(default_value = "0")]
    #[arg(value_parser = ensure_percent)]
    pub minimal_percent: f64,

    #[clap(help_heading("Calling"))]
    #[clap(long = "max-perc")]
    #[clap(value_name = "PERC")]
    #[clap(
        help = "Majority codons above this percentage that differ from the reference become alternate references"
    )]
    #[clap(default_value = "100")]
    #[arg(value_parser = ensure_percent)]
    pub maximal_percent: f64,

    #[clap(help_heading("Calling"))]
    #[clap(long = "drm-only")]
    #[clap(help = "Only report known drug resistance mutations")]
    pub drm_only: bool,

    #[clap(help_heading("Phasing"))]
    #[clap(long = "merge-outliers")]
    #[clap(help = "Soft-collapse filtered read groups onto reported haplotypes")]
    pub merge_outliers: bool,

    #[clap(help_heading("Phasing"))]
    #[clap(long = "min-haplotype-reads")]
    #[clap(value_name = "READS")]
    #[clap(help = "Minimum number of reads for a reported haplotype")]
    #[clap(default_value = "10")]
    pub min_haplotype_reads: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "msa-flank")]
    #[clap(value_name = "COLUMNS")]
    #[clap(help = "Alignment columns reported on each side of a call")]
    #[clap(default_value = "3")]
    pub msa_context_flank: usize,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "full-report")]
    #[clap(help = "Include filtered read groups and read names in the report")]
    pub full_report: bool,

    #[clap(help_heading("Advanced"))]
    #[clap(long = "debug")]
    #[clap(help = "Report every tested codon regardless of significance")]
    pub debug: bool,
}

impl CallArgs {
    pub fn caller_config(&self) -> CallerConfig {
        CallerConfig {
            alpha: self.alpha,
            minimal_percent: self.minimal_percent,
            maximal_percent: self.maximal_percent,
            min_haplotype_reads: self.min_haplotype_reads,
            msa_context_flank: self.msa_context_flank,
            drm_only: self.drm_only,
            merge_outliers: self.merge_outliers,
            debug: self.debug,
            verbose: self.full_report,
            ..Default::default()
        }
    }
}

#[derive(Parser, Debug)]
#[command(group(ArgGroup::new("validate")))]
#[command(arg_required_else_help(true))]
pub struct ValidateArgs {
    #[clap(required = true)]
    #[clap(short = 'r')]
    #[clap(long = "reads")]
    #[clap(help = "Aligned reads (name, begin, bases per line; optionally gzipped)")]
    #[clap(value_name = "READS")]
    #[arg(value_parser = check_file_exists)]
    pub reads_path: PathBuf,

    #[clap(short = 'c')]
    #[clap(long = "targets")]
    #[clap(help = "JSON target configuration with genes, known minors and DRMs")]
    #[clap(value_name = "CONFIG")]
    #[arg(value_parser = check_file_exists)]
    pub targets_path: Option<PathBuf>,
}

pub fn init_verbose(args: &Cli) {
    let filter_level: LevelFilter = match args.verbosity {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        _ => LevelFilter::Debug,
    };

    env_logger::Builder::from_default_env()
        .format(|buf, record| {
            let level = record.level();
            let mut style = buf.style();
            match record.level() {
                Level::Error => style.set_color(Color::Red),
                Level::Warn => style.set_color(Color::Yellow),
                Level::Info => style.set_color(Color::Green),
                Level::Debug => style.set_color(Color::Blue),
                Level::Trace => style.set_color(Color::Cyan),
            };

            writeln!(
                buf,
                "{} [{}] - {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S"),
                style.value(level),
                record.args()
            )
        })
        .filter_level(filter_level)
        .init();
}

fn check_prefix_path(s: &str) -> Result<String> {
    let path = Path::new(s);
    if let Some(parent_dir) = path.parent() {
        if !parent_dir.as_os_str().is_empty() && !parent_dir.exists() {
            return Err(format!("Path does not exist: {}", parent_dir.display()));
        }
    }
    Ok(s.to_string())
}

fn threads_in_range(s: &str) -> Result<usize> {
    let thread: usize = s
        .parse()
        .map_err(|_| format!("`{}` is not a valid thread number", s))?;
    if thread >= 1 {
        Ok(thread)
    } else {
        Err("Number of threads must be at least 1".into())
    }
}

fn check_file_exists(s: &str) -> Result<PathBuf> {
    let path = Path::new(s);
    if !path.exists() {
        Err(format!("File does not exist: {}", path.display()))
    } else {
        Ok(path.to_path_buf())
    }
}

fn ensure_unit_float(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=1.0).contains(&value) {
        Err(format!(
            "The value must be between 0.0 and 1.0, got: {}",
            value
        ))
    } else {
        Ok(value)
    }
}

fn ensure_percent(s: &str) -> Result<f64> {
    let value = s
        .parse::<f64>()
        .map_err(|e| format!("Could not parse float: {}", e))?;
    if !(0.0..=100.0).contains(&value) {
        Err(format!("The value must be between 0 and 100, got: {}", value))
    } else {
        Ok(value)
    }
}
