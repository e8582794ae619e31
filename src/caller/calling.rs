use super::{
    codon_table,
    config::CallerConfig,
    error_model::ErrorEstimates,
    scanner::{count_tests, resolve_reference, tabulate_gene, LocusTally},
    target::{TargetConfig, TargetGene},
    tester::{accept_call, corrected_p_value, CodonTest, PerformanceTally, ValidationSummary},
    variant::{MsaContextColumn, VariantCodon, VariantGene, VariantPosition},
};
use crate::msa::{MsaByColumn, MsaByRow};
use crate::utils::fraction;

/// Inputs shared by every locus of a calling pass.
pub struct CallContext<'a> {
    pub columns: &'a MsaByColumn,
    pub reference: Option<&'a str>,
    pub error: &'a ErrorEstimates,
    pub config: &'a CallerConfig,
    pub num_tests: usize,
    pub has_expected_minors: bool,
}

#[derive(Debug, Clone)]
pub struct CallResult {
    pub genes: Vec<VariantGene>,
    pub num_tests: usize,
    pub validation: Option<ValidationSummary>,
}

pub fn call_variants(
    msa: &MsaByRow,
    columns: &MsaByColumn,
    targets: &TargetConfig,
    reference: Option<&str>,
    error: &ErrorEstimates,
    config: &CallerConfig,
) -> CallResult {
    let genes = targets.genes_or_window(msa.begin, msa.end);

    // The correction factor must be complete before any locus is tested
    let tallies: Vec<Vec<LocusTally>> = genes.iter().map(|g| tabulate_gene(msa, g)).collect();
    let num_tests = count_tests(&tallies);
    log::info!("Number of tests for multiple testing correction: {}", num_tests);

    let num_expected_minors = targets.num_expected_minors();
    let ctx = CallContext {
        columns,
        reference,
        error,
        config,
        num_tests,
        has_expected_minors: num_expected_minors > 0,
    };

    let mut performance = PerformanceTally::default();
    let mut variant_genes = Vec::new();
    for (gene, gene_tallies) in genes.iter().zip(tallies.iter()) {
        let mut variant_gene = VariantGene::new(gene.name.clone());
        for tally in gene_tallies {
            if let Some(position) = call_locus(gene, tally, &ctx, &mut performance) {
                variant_gene.positions.insert(tally.codon_index, position);
            }
        }
        log::info!(
            "{}: {} variant positions",
            gene.name,
            variant_gene.positions.len()
        );
        if !variant_gene.positions.is_empty() {
            variant_genes.push(variant_gene);
        }
    }

    let validation = performance.summarize(num_tests, num_expected_minors);
    if let Some(summary) = &validation {
        log::info!(
            "Validation: TPR={:.4} FPR={:.6} tests={} FP={} accuracy={:.4}",
            summary.true_positive_rate,
            summary.false_positive_rate,
            summary.num_tests,
            summary.num_false_positives,
            summary.accuracy
        );
    }

    CallResult {
        genes: variant_genes,
        num_tests,
        validation,
    }
}

/// Tests every non-reference codon of a locus. `None` when the locus is
/// skipped or nothing was accepted.
pub fn call_locus(
    gene: &TargetGene,
    tally: &LocusTally,
    ctx: &CallContext,
    performance: &mut PerformanceTally,
) -> Option<VariantPosition> {
    let ref_call = resolve_reference(tally, ctx.reference, ctx.config.maximal_percent)?;
    let mut position = VariantPosition {
        abs_pos: tally.abs_pos,
        ref_codon: ref_call.codon,
        ref_aa: ref_call.aa,
        alt_ref: ref_call.alt_ref,
        coverage: tally.coverage,
        codons: Default::default(),
        msa: Vec::new(),
    };

    for (codon, &count) in &tally.codons {
        if position.is_reference(codon) {
            continue;
        }
        let Some(aa) = codon_table::translate_str(codon) else {
            continue;
        };
        let probability = ctx
            .error
            .codon_probability(position.ref_codon.as_bytes(), codon.as_bytes());
        let p_value = corrected_p_value(count, tally.coverage, probability, ctx.num_tests);
        let frequency = fraction(count, tally.coverage);
        let test = CodonTest {
            gene,
            codon_index: tally.codon_index,
            codon,
            ref_aa: position.ref_aa,
            aa,
            frequency,
            p_value,
        };
        performance.record(&test, ctx.config);
        if !accept_call(&test, ctx.config, ctx.has_expected_minors) {
            continue;
        }
        log::debug!(
            "{} {}{}{} ({}) freq={:.4} p={:.3e}",
            gene.name,
            position.ref_aa,
            tally.codon_index,
            aa,
            codon,
            frequency,
            p_value
        );
        position.codons.entry(aa).or_default().push(VariantCodon {
            codon: codon.clone(),
            count,
            frequency,
            p_value,
            known_drm: gene.find_drms(tally.codon_index, position.ref_aa, aa),
            haplotype_hits: Vec::new(),
        });
    }

    if position.codons.is_empty() {
        return None;
    }
    position.msa = msa_context(tally.abs_pos, ctx);
    Some(position)
}

/// Alignment columns `[-flank, 3 + flank)` around the codon that fall inside the MSA.
pub fn msa_context(abs_pos: usize, ctx: &CallContext) -> Vec<MsaContextColumn> {
    let flank = ctx.config.msa_context_flank as isize;
    (-flank..3 + flank)
        .filter_map(|rel_pos| {
            let abs = abs_pos.checked_add_signed(rel_pos)?;
            let counts = *ctx.columns.get(abs)?;
            let wt = match ctx.reference {
                Some(reference) => reference
                    .as_bytes()
                    .get(abs)
                    .map(|&b| b as char)
                    .unwrap_or('N'),
                None => counts.majority_base(),
            };
            Some(MsaContextColumn {
                rel_pos,
                abs_pos: abs,
                counts,
                wt,
            })
        })
        .collect()
}
