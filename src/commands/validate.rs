use crate::caller::{tabulate_gene, TargetConfig, TargetGene};
use crate::cli::ValidateArgs;
use crate::msa::MsaByRow;
use crate::utils::Result;

/// Placement of one gene relative to the alignment window.
#[derive(Debug, Clone, PartialEq)]
struct GeneCheck {
    name: String,
    num_codons: usize,
    mean_coverage: f64,
    inside: bool,
    overlaps: bool,
}

pub fn validate(args: ValidateArgs) -> Result<()> {
    let msa = MsaByRow::from_path(&args.reads_path)?;
    let targets = match &args.targets_path {
        Some(path) => TargetConfig::from_path(path)?,
        None => TargetConfig::default(),
    };
    validate_targets(&msa, &targets)
}

fn validate_targets(msa: &MsaByRow, targets: &TargetConfig) -> Result<()> {
    let genes = targets.genes_or_window(msa.begin, msa.end);
    let checks: Vec<GeneCheck> = genes.iter().map(|gene| check_gene(msa, gene)).collect();

    for check in &checks {
        if !check.overlaps {
            log::warn!("{}: outside of alignment window {}-{}", check.name, msa.begin, msa.end);
        } else if !check.inside {
            log::warn!(
                "{}: partially outside of alignment window {}-{}",
                check.name,
                msa.begin,
                msa.end
            );
        }
        log::info!(
            "{}: codons={}, mean coverage={:.2}",
            check.name,
            check.num_codons,
            check.mean_coverage
        );
    }

    let num_drms: usize = genes.iter().map(|g| g.drms.len()).sum();
    log::info!(
        "Expected minors={}, DRM signatures={}",
        targets.num_expected_minors(),
        num_drms
    );

    let fail_count = checks.iter().filter(|c| !c.inside).count();
    if checks.iter().all(|c| !c.overlaps) {
        return Err(format!(
            "No gene overlaps the alignment window {}-{}",
            msa.begin, msa.end
        ));
    }
    match fail_count {
        0 => log::info!("Validation successful. Genes pass={}", checks.len()),
        _ => log::info!(
            "Validation finished with warnings. Genes pass={}, outside window={}",
            checks.len() - fail_count,
            fail_count
        ),
    }
    Ok(())
}

fn check_gene(msa: &MsaByRow, gene: &TargetGene) -> GeneCheck {
    // codons outside the window contribute zero coverage
    let num_codons = gene.num_codons();
    let covered: usize = tabulate_gene(msa, gene).iter().map(|t| t.coverage).sum();
    let mean_coverage = if num_codons == 0 {
        0.0
    } else {
        covered as f64 / num_codons as f64
    };
    GeneCheck {
        name: gene.name.clone(),
        num_codons,
        mean_coverage,
        inside: gene.begin >= msa.begin && gene.end <= msa.end,
        overlaps: gene.begin < msa.end && gene.end > msa.begin,
    }
}
