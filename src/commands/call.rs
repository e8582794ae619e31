use crate::caller::{ErrorEstimates, TargetConfig};
use crate::cli::CallArgs;
use crate::msa::MsaByRow;
use crate::utils::{create_writer, fetch_reference, write_json, Result};
use crate::workflow::{self, Analysis, Params};
use rayon::ThreadPoolBuilder;
use std::path::Path;

pub fn call(args: CallArgs) -> Result<()> {
    let config = args.caller_config();
    config.validate()?;
    let error = ErrorEstimates::new(args.substitution_rate, args.deletion_rate)?;

    let msa = MsaByRow::from_path(&args.reads_path)?;

    let targets = load_targets(args.targets_path.as_deref())?;
    let reference = match &args.reference_path {
        Some(path) => Some(fetch_reference(path, args.contig.as_deref())?),
        None => targets.reference_sequence.clone(),
    };
    if reference.is_none() {
        log::info!("No reference given, using majority codons as reference");
    }

    let pool = initialize_thread_pool(args.num_threads)?;
    let analysis = pool.install(|| {
        workflow::analyze(
            &msa,
            &Params {
                targets: &targets,
                reference: reference.as_deref(),
                error,
                config,
            },
        )
    });

    write_outputs(&args.output_prefix, &analysis)
}

fn load_targets(path: Option<&Path>) -> Result<TargetConfig> {
    match path {
        Some(path) => {
            let targets = TargetConfig::from_path(path)?;
            log::info!(
                "Loaded {} genes with {} expected minors",
                targets.genes.len(),
                targets.num_expected_minors()
            );
            Ok(targets)
        }
        None => {
            log::info!("No target configuration, calling over the whole alignment");
            Ok(TargetConfig::default())
        }
    }
}

fn write_outputs(prefix: &str, analysis: &Analysis) -> Result<()> {
    create_writer(prefix, "json", |path| {
        log::debug!("Writing report to {}", path);
        write_json(path, &analysis.report)
    })?;
    if let Some(summary) = &analysis.validation {
        create_writer(prefix, "validation.json", |path| {
            log::debug!("Writing validation summary to {}", path);
            write_json(path, summary)
        })?;
    }
    log::info!(
        "Reported {} haplotypes from {} tests",
        analysis.report.haplotypes.len(),
        analysis.num_tests
    );
    Ok(())
}

fn initialize_thread_pool(num_threads: usize) -> Result<rayon::ThreadPool> {
    ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .thread_name(|i| format!("minorcall-{}", i))
        .start_handler(|_thread_index| {
            log::trace!("Initialized thread {:?}", std::thread::current().id());
        })
        .build()
        .map_err(|e| format!("Failed to initialize thread pool: {}", e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::{Cli, Command};
    use clap::Parser;
    use std::fmt::Write as _;

    const TARGETS: &str = r#"{
        "genes": [
            {
                "name": "g1",
                "begin": 0,
                "end": 6,
                "minors": [ { "position": 1, "amino_acid": "N", "codon": "AAC" } ],
                "drms": [ { "name": "DRUG", "mutations": ["K1N"] } ]
            },
            { "name": "g2", "begin": 6, "end": 12 }
        ]
    }"#;

    fn reads_text() -> String {
        let groups = [
            (60, "AAAGGGTTTCCC"),
            (25, "AACGGGTTTCCG"),
            (15, "AAAGGCTTTCCC"),
            (3, "AAAGG-TTTCCC"),
            (2, "AAAGGGTTT   "),
        ];
        let mut text = String::from("# name\tbegin\tbases\n");
        let mut id = 0;
        for (copies, bases) in groups {
            for _ in 0..copies {
                writeln!(text, "read{}\t0\t{}", id, bases).unwrap();
                id += 1;
            }
        }
        text
    }

    fn run(dir: &Path, prefix: &str) -> serde_json::Value {
        let reads = dir.join("reads.txt");
        let targets = dir.join("targets.json");
        std::fs::write(&reads, reads_text()).unwrap();
        std::fs::write(&targets, TARGETS).unwrap();
        let prefix = dir.join(prefix);
        let cli = Cli::try_parse_from([
            "minorcall",
            "call",
            "--reads",
            reads.to_str().unwrap(),
            "--targets",
            targets.to_str().unwrap(),
            "--output-prefix",
            prefix.to_str().unwrap(),
            "--threads",
            "2",
        ])
        .unwrap();
        let Command::Call(args) = cli.command else {
            panic!("expected call subcommand");
        };
        call(args).unwrap();
        let text = std::fs::read_to_string(format!("{}.json", prefix.display())).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    #[test]
    fn call_writes_report_and_validation() {
        let dir = tempfile::tempdir().unwrap();
        let report = run(dir.path(), "sample");

        let gene = &report["genes"][0];
        assert_eq!(gene["gene_name"], "g1");
        let first = &gene["variant_positions"][0];
        assert_eq!(first["position"], 1);
        assert_eq!(first["ref_codon"], "AAA");
        assert_eq!(first["codons"][0]["codon"], "AAC");
        assert_eq!(first["codons"][0]["drm"], "DRUG");
        assert_eq!(report["haplotypes"][0]["name"], "A");
        assert_eq!(report["haplotype_read_counts"]["marginal_with_gaps"], 3);
        assert_eq!(report["haplotype_read_counts"]["marginal_partial_reads"], 2);

        let validation_path = dir.path().join("sample.validation.json");
        let validation: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(validation_path).unwrap()).unwrap();
        assert_eq!(validation["true_positive_rate"], 1.0);
    }

    #[test]
    fn repeated_calls_produce_identical_reports() {
        let dir = tempfile::tempdir().unwrap();
        let first = run(dir.path(), "first");
        let second = run(dir.path(), "second");
        assert_eq!(first, second);
    }

    #[test]
    fn missing_targets_default_to_whole_window() {
        let targets = load_targets(None).unwrap();
        assert!(targets.genes.is_empty());
        assert!(targets.reference_sequence.is_none());
    }
}
