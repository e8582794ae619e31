use super::{codon_table, target::TargetGene};
use crate::msa::{MsaByRow, GAP};
use crate::utils::fraction;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::collections::BTreeMap;

/// Codon counts of one locus.
#[derive(Debug, Clone, PartialEq)]
pub struct LocusTally {
    pub abs_pos: usize,
    pub codon_index: usize,
    pub codons: BTreeMap<String, usize>,
    pub coverage: usize,
}

/// Reference resolved for a locus.
#[derive(Debug, Clone, PartialEq)]
pub struct RefCall {
    pub codon: String,
    pub aa: char,
    pub alt_ref: Option<(String, char)>,
}

/// Codon starts of `gene` whose triplet lies inside the window `[begin, end)`.
pub fn codon_starts(gene: &TargetGene, begin: usize, end: usize) -> impl Iterator<Item = usize> {
    let first = match begin.checked_sub(gene.begin) {
        Some(skip) if skip % 3 != 0 => begin.saturating_add(3 - skip % 3),
        Some(_) => begin,
        None => gene.begin,
    };
    let last = gene.end.min(end);
    (first..last.saturating_sub(2)).step_by(3)
}

pub fn tabulate_locus(msa: &MsaByRow, abs_pos: usize, codon_index: usize) -> LocusTally {
    let mut codons = BTreeMap::new();
    for row in &msa.rows {
        let Some(codon) = row.codon_at(abs_pos) else {
            continue;
        };
        if codon.contains(&GAP) || !codon_table::is_valid_codon(codon) {
            continue;
        }
        // valid codons are ASCII
        let codon = String::from_utf8_lossy(codon).into_owned();
        *codons.entry(codon).or_insert(0) += 1;
    }
    let coverage = codons.values().sum();
    LocusTally {
        abs_pos,
        codon_index,
        codons,
        coverage,
    }
}

/// Tallies every codon start of `gene`, in order.
pub fn tabulate_gene(msa: &MsaByRow, gene: &TargetGene) -> Vec<LocusTally> {
    let starts: Vec<usize> = codon_starts(gene, msa.begin, msa.end).collect();
    let tallies: Vec<LocusTally> = starts
        .into_par_iter()
        .map(|abs_pos| {
            let codon_index = 1 + (abs_pos - gene.begin) / 3;
            tabulate_locus(msa, abs_pos, codon_index)
        })
        .collect();
    log::debug!("{}: tabulated {} codon positions", gene.name, tallies.len());
    tallies
}

/// Number of (gene, locus, distinct codon) combinations.
pub fn count_tests(tallies: &[Vec<LocusTally>]) -> usize {
    tallies
        .iter()
        .flat_map(|gene| gene.iter())
        .map(|locus| locus.codons.len())
        .sum()
}

/// Highest count wins; equal counts go to the lexicographically smallest codon.
pub fn majority_codon(codons: &BTreeMap<String, usize>) -> Option<(&str, usize)> {
    let mut best: Option<(&str, usize)> = None;
    for (codon, &count) in codons {
        if count > best.map_or(0, |(_, c)| c) {
            best = Some((codon.as_str(), count));
        }
    }
    best
}

pub fn resolve_reference(
    tally: &LocusTally,
    reference: Option<&str>,
    maximal_percent: f64,
) -> Option<RefCall> {
    let majority = majority_codon(&tally.codons);
    match reference {
        Some(reference) => {
            let codon = reference.get(tally.abs_pos..tally.abs_pos + 3)?;
            let aa = codon_table::translate_str(codon)?;
            let alt_ref = majority.and_then(|(major, count)| {
                let percent = 100.0 * fraction(count, tally.coverage);
                if major != codon && percent > maximal_percent {
                    codon_table::translate_str(major).map(|aa| (major.to_string(), aa))
                } else {
                    None
                }
            });
            Some(RefCall {
                codon: codon.to_string(),
                aa,
                alt_ref,
            })
        }
        None => {
            let (codon, _) = majority?;
            let aa = codon_table::translate_str(codon)?;
            Some(RefCall {
                codon: codon.to_string(),
                aa,
                alt_ref: None,
            })
        }
    }
}
