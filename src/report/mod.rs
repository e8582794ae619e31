//! Result document written after calling and phasing.

use crate::caller::{CallerConfig, MsaContextColumn, VariantCodon, VariantGene, VariantPosition};
use crate::phasing::{FlagSet, Haplotype, Phasing};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Report {
    pub genes: Vec<GeneReport>,
    pub haplotypes: Vec<HaplotypeReport>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub filtered_haplotypes: Vec<HaplotypeReport>,
    pub haplotype_read_counts: ReadCounts,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneReport {
    pub gene_name: String,
    pub variant_positions: Vec<PositionReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionReport {
    pub position: usize,
    pub ref_codon: String,
    pub ref_aa: char,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_ref_codon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alt_ref_aa: Option<char>,
    pub codons: Vec<CodonReport>,
    pub coverage: usize,
    pub msa_context: Vec<ColumnReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CodonReport {
    pub codon: String,
    pub aa: char,
    pub frequency: f64,
    pub p_value: f64,
    pub drm: String,
    pub haplotype_hits: Vec<bool>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnReport {
    pub rel_pos: isize,
    pub abs_pos: usize,
    #[serde(rename = "A")]
    pub a: usize,
    #[serde(rename = "C")]
    pub c: usize,
    #[serde(rename = "G")]
    pub g: usize,
    #[serde(rename = "T")]
    pub t: usize,
    #[serde(rename = "-")]
    pub gap: usize,
    #[serde(rename = "N")]
    pub n: usize,
    pub wt: char,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HaplotypeReport {
    #[serde(skip_serializing_if = "String::is_empty")]
    pub name: String,
    pub frequency: f64,
    pub size: usize,
    pub codons: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub soft_collapse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub flags: Option<FlagSet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub reads: Vec<String>,
}

/// Reads per outcome; every read group lands in exactly one counter.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadCounts {
    pub healthy_reported: usize,
    pub healthy_low_coverage: usize,
    pub all_damaged: usize,
    pub marginal_with_gaps: usize,
    pub marginal_with_heteroduplexes: usize,
    pub marginal_partial_reads: usize,
}

impl ReadCounts {
    pub fn from_phasing(phasing: &Phasing) -> Self {
        let mut counts = ReadCounts::default();
        for haplotype in phasing.generators.iter().chain(phasing.filtered.iter()) {
            let flags = &haplotype.flags;
            let counter = if flags.is_offtarget() {
                &mut counts.all_damaged
            } else if flags.has_gap() {
                &mut counts.marginal_with_gaps
            } else if flags.has_heteroduplex() {
                &mut counts.marginal_with_heteroduplexes
            } else if flags.is_partial() {
                &mut counts.marginal_partial_reads
            } else if flags.is_low_coverage() {
                &mut counts.healthy_low_coverage
            } else {
                &mut counts.healthy_reported
            };
            *counter += haplotype.size();
        }
        counts
    }

    pub fn total(&self) -> usize {
        self.healthy_reported
            + self.healthy_low_coverage
            + self.all_damaged
            + self.marginal_with_gaps
            + self.marginal_with_heteroduplexes
            + self.marginal_partial_reads
    }
}

fn column_report(column: &MsaContextColumn) -> ColumnReport {
    ColumnReport {
        rel_pos: column.rel_pos,
        abs_pos: column.abs_pos,
        a: column.counts.a,
        c: column.counts.c,
        g: column.counts.g,
        t: column.counts.t,
        gap: column.counts.gap,
        n: column.counts.n,
        wt: column.wt,
    }
}

fn codon_report(aa: char, codon: &VariantCodon) -> CodonReport {
    CodonReport {
        codon: codon.codon.clone(),
        aa,
        frequency: codon.frequency,
        p_value: codon.p_value,
        drm: codon.known_drm.clone(),
        haplotype_hits: codon.haplotype_hits.clone(),
    }
}

fn position_report(codon_index: usize, position: &VariantPosition) -> PositionReport {
    let codons = position
        .codons
        .iter()
        .flat_map(|(&aa, codons)| codons.iter().map(move |c| codon_report(aa, c)))
        .collect();
    PositionReport {
        position: codon_index,
        ref_codon: position.ref_codon.clone(),
        ref_aa: position.ref_aa,
        alt_ref_codon: position.alt_ref.as_ref().map(|(codon, _)| codon.clone()),
        alt_ref_aa: position.alt_ref.as_ref().map(|&(_, aa)| aa),
        codons,
        coverage: position.coverage,
        msa_context: position.msa.iter().map(column_report).collect(),
    }
}

fn haplotype_report(
    haplotype: &Haplotype,
    read_names: &[String],
    config: &CallerConfig,
    is_generator: bool,
) -> HaplotypeReport {
    let reads = if config.verbose {
        haplotype
            .read_ids
            .iter()
            .filter_map(|&id| read_names.get(id).cloned())
            .collect()
    } else {
        Vec::new()
    };
    HaplotypeReport {
        name: haplotype.name.clone(),
        frequency: haplotype.global_frequency,
        size: haplotype.size(),
        codons: haplotype.codons.clone(),
        soft_collapse: (is_generator && config.merge_outliers).then_some(haplotype.soft_collapse),
        flags: (!is_generator).then(|| haplotype.flags.clone()),
        reads,
    }
}

/// Assembles the result document. Genes without variant positions are left out;
/// filtered groups are listed only in verbose mode.
pub fn build_report(
    genes: &[VariantGene],
    phasing: &Phasing,
    read_names: &[String],
    config: &CallerConfig,
) -> Report {
    let genes = genes
        .iter()
        .filter(|gene| !gene.positions.is_empty())
        .map(|gene| GeneReport {
            gene_name: gene.name.clone(),
            variant_positions: gene
                .positions
                .iter()
                .map(|(&index, position)| position_report(index, position))
                .collect(),
        })
        .collect();

    let haplotypes = phasing
        .generators
        .iter()
        .map(|h| haplotype_report(h, read_names, config, true))
        .collect();

    let filtered_haplotypes = if config.verbose {
        phasing
            .filtered
            .iter()
            .map(|h| haplotype_report(h, read_names, config, false))
            .collect()
    } else {
        Vec::new()
    };

    Report {
        genes,
        haplotypes,
        filtered_haplotypes,
        haplotype_read_counts: ReadCounts::from_phasing(phasing),
    }
}
