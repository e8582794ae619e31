use crate::caller::{
    call_variants, CallerConfig, CodonTransitions, ErrorEstimates, TargetConfig,
    ValidationSummary,
};
use crate::msa::{MsaByColumn, MsaByRow};
use crate::phasing::{
    cluster_reads, collect_variant_sites, mark_haplotype_hits, soft_collapse,
};
use crate::report::{build_report, Report};

pub struct Params<'a> {
    pub targets: &'a TargetConfig,
    pub reference: Option<&'a str>,
    pub error: ErrorEstimates,
    pub config: CallerConfig,
}

#[derive(Debug, Clone)]
pub struct Analysis {
    pub report: Report,
    pub validation: Option<ValidationSummary>,
    pub num_tests: usize,
}

/// Calls variants, phases reads into haplotypes and assembles the report.
pub fn analyze(msa: &MsaByRow, params: &Params) -> Analysis {
    let columns = MsaByColumn::new(msa);
    let called = call_variants(
        msa,
        &columns,
        params.targets,
        params.reference,
        &params.error,
        &params.config,
    );
    let mut genes = called.genes;

    let sites = collect_variant_sites(&genes);
    let mut phasing = cluster_reads(&msa.rows, &sites, &params.config);
    if params.config.merge_outliers {
        let transitions = CodonTransitions::new(&params.error);
        soft_collapse(&mut phasing, &transitions);
    }
    mark_haplotype_hits(&mut genes, &sites, &phasing);

    let read_names: Vec<String> = msa.rows.iter().map(|r| r.name.clone()).collect();
    let report = build_report(&genes, &phasing, &read_names, &params.config);
    debug_assert_eq!(report.haplotype_read_counts.total(), msa.len());

    Analysis {
        report,
        validation: called.validation,
        num_tests: called.num_tests,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::{ExpectedMinor, TargetGene};
    use crate::msa::MsaRow;
    use rand::{rng, seq::SliceRandom};

    fn build_msa(groups: &[(usize, usize, &str)]) -> MsaByRow {
        let mut rows = Vec::new();
        for &(copies, begin, bases) in groups {
            for _ in 0..copies {
                rows.push(MsaRow::new(format!("read{}", rows.len()), begin, bases));
            }
        }
        MsaByRow::new(rows).unwrap()
    }

    fn two_gene_targets() -> TargetConfig {
        TargetConfig {
            genes: vec![TargetGene::new("g1", 0, 6), TargetGene::new("g2", 6, 12)],
            reference_sequence: None,
        }
    }

    fn sample_msa() -> MsaByRow {
        build_msa(&[
            (60, 0, "AAAGGGTTTCCC"),
            (25, 0, "AACGGGTTTCCG"),
            (15, 0, "AAAGGCTTTCCC"),
            (3, 0, "AAAGG-TTTCCC"),
            (2, 0, "AAAGGGTTT"),
            (1, 0, "AARGGGTTTCCC"),
        ])
    }

    fn params(targets: &TargetConfig, config: CallerConfig) -> Params<'_> {
        Params {
            targets,
            reference: None,
            error: ErrorEstimates::new(0.001, 0.001).unwrap(),
            config,
        }
    }

    #[test]
    fn pipeline_reports_variants_and_haplotypes() {
        let msa = sample_msa();
        let targets = two_gene_targets();
        let analysis = analyze(&msa, &params(&targets, CallerConfig::default()));
        let report = &analysis.report;

        assert_eq!(report.genes.len(), 2);
        let positions: Vec<usize> = report.genes[0]
            .variant_positions
            .iter()
            .map(|p| p.position)
            .collect();
        assert_eq!(positions, vec![1, 2]);

        let names: Vec<&str> = report.haplotypes.iter().map(|h| h.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "C"]);
        assert_eq!(report.haplotypes[0].codons, vec!["AAA", "GGG", "CCC"]);
        assert_eq!(report.haplotypes[0].size, 60);
        assert_eq!(report.haplotypes[1].codons, vec!["AAC", "GGG", "CCG"]);

        let aac = &report.genes[0].variant_positions[0].codons[0];
        assert_eq!(aac.codon, "AAC");
        assert_eq!(aac.haplotype_hits, vec![false, true, false]);

        let counts = report.haplotype_read_counts;
        assert_eq!(counts.healthy_reported, 100);
        assert_eq!(counts.marginal_with_gaps, 3);
        assert_eq!(counts.marginal_partial_reads, 2);
        assert_eq!(counts.marginal_with_heteroduplexes, 1);
        assert_eq!(counts.total(), msa.len());
    }

    #[test]
    fn merged_outliers_conserve_reads() {
        let msa = sample_msa();
        let targets = two_gene_targets();
        let config = CallerConfig {
            merge_outliers: true,
            ..Default::default()
        };
        let analysis = analyze(&msa, &params(&targets, config));
        let collapsed: f64 = analysis
            .report
            .haplotypes
            .iter()
            .filter_map(|h| h.soft_collapse)
            .sum();
        assert!((collapsed - msa.len() as f64).abs() < 1e-9);
    }

    #[test]
    fn repeated_runs_are_identical() {
        let msa = sample_msa();
        let mut targets = two_gene_targets();
        targets.genes[0].minors.push(ExpectedMinor {
            position: 1,
            amino_acid: 'N',
            codon: "AAC".to_string(),
        });
        let config = CallerConfig {
            merge_outliers: true,
            verbose: true,
            ..Default::default()
        };
        let first = serde_json::to_string(&analyze(&msa, &params(&targets, config.clone())).report)
            .unwrap();
        let second =
            serde_json::to_string(&analyze(&msa, &params(&targets, config)).report).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn read_order_does_not_change_calls_or_accounting() {
        let msa = sample_msa();
        let targets = two_gene_targets();
        let baseline = analyze(&msa, &params(&targets, CallerConfig::default()));

        let mut rows = msa.rows.clone();
        rows.shuffle(&mut rng());
        let shuffled = MsaByRow::new(rows).unwrap();
        let analysis = analyze(&shuffled, &params(&targets, CallerConfig::default()));

        assert_eq!(analysis.num_tests, baseline.num_tests);
        assert_eq!(
            analysis.report.haplotype_read_counts,
            baseline.report.haplotype_read_counts
        );
        let sizes = |a: &Analysis| a.report.haplotypes.iter().map(|h| h.size).collect::<Vec<_>>();
        assert_eq!(sizes(&analysis), sizes(&baseline));
        assert_eq!(
            serde_json::to_string(&analysis.report.genes).unwrap(),
            serde_json::to_string(&baseline.report.genes).unwrap()
        );
    }
}
