use super::{
    flags::{FlagSet, HaplotypeFlag},
    haplotype::{Haplotype, UNCOVERED_CODON},
    naming::haplotype_name,
};
use crate::caller::{CallerConfig, VariantGene};
use crate::msa::{MsaRow, GAP};
use itertools::Itertools;
use std::collections::HashMap;

/// A variant position with at least one accepted codon, flattened across genes.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantSite {
    pub gene_index: usize,
    pub codon_index: usize,
    pub abs_pos: usize,
    pub ref_codon: String,
    pub alt_ref_codon: Option<String>,
    pub accepted: Vec<String>,
}

impl VariantSite {
    fn is_expected(&self, codon: &str) -> bool {
        self.ref_codon == codon
            || self.alt_ref_codon.as_deref() == Some(codon)
            || self.accepted.iter().any(|c| c == codon)
    }
}

/// Outcome of clustering: generators ranked and labeled, filtered groups in first-seen order.
#[derive(Debug, Clone, Default)]
pub struct Phasing {
    pub generators: Vec<Haplotype>,
    pub filtered: Vec<Haplotype>,
    pub num_reads: usize,
}

pub fn collect_variant_sites(genes: &[VariantGene]) -> Vec<VariantSite> {
    let mut sites = Vec::new();
    for (gene_index, gene) in genes.iter().enumerate() {
        for (&codon_index, position) in &gene.positions {
            let accepted: Vec<String> = position
                .variant_codons()
                .map(|vc| vc.codon.clone())
                .collect();
            if accepted.is_empty() {
                continue;
            }
            sites.push(VariantSite {
                gene_index,
                codon_index,
                abs_pos: position.abs_pos,
                ref_codon: position.ref_codon.clone(),
                alt_ref_codon: position.alt_ref.as_ref().map(|(codon, _)| codon.clone()),
                accepted,
            });
        }
    }
    sites
}

/// Codon a read shows at `site` and the flag it earns there, if any.
pub fn classify_codon(row: &MsaRow, site: &VariantSite) -> (String, Option<HaplotypeFlag>) {
    let Some(bases) = row.codon_at(site.abs_pos) else {
        return (UNCOVERED_CODON.to_string(), Some(HaplotypeFlag::Partial));
    };
    let codon = String::from_utf8_lossy(bases).into_owned();
    let flag = if bases.contains(&GAP) {
        Some(HaplotypeFlag::WithGap)
    } else if !bases.iter().all(|b| matches!(b, b'A' | b'C' | b'G' | b'T')) {
        Some(HaplotypeFlag::WithHeteroduplex)
    } else if !site.is_expected(&codon) {
        Some(HaplotypeFlag::OffTarget)
    } else {
        None
    };
    (codon, flag)
}

pub fn read_signature(row: &MsaRow, sites: &[VariantSite]) -> (Vec<String>, FlagSet) {
    let mut flags = FlagSet::default();
    let codons = sites
        .iter()
        .map(|site| {
            let (codon, flag) = classify_codon(row, site);
            if let Some(flag) = flag {
                flags.insert(flag);
            }
            codon
        })
        .collect();
    (codons, flags)
}

/// Groups every read by its codon vector and splits the groups into generators and filtered.
pub fn cluster_reads(rows: &[MsaRow], sites: &[VariantSite], config: &CallerConfig) -> Phasing {
    let mut buckets: Vec<Haplotype> = Vec::new();
    let mut lookup: HashMap<Vec<String>, usize> = HashMap::new();

    for (read_id, row) in rows.iter().enumerate() {
        let (codons, flags) = read_signature(row, sites);
        let bucket_index = match lookup.get(&codons) {
            Some(&index) => index,
            None => {
                buckets.push(Haplotype::new(codons.clone()));
                lookup.insert(codons, buckets.len() - 1);
                buckets.len() - 1
            }
        };
        let bucket = &mut buckets[bucket_index];
        bucket.read_ids.push(read_id);
        bucket.flags.extend(&flags);
    }

    for bucket in buckets.iter_mut() {
        if bucket.size() < config.min_haplotype_reads {
            bucket.flags.insert(HaplotypeFlag::LowCov);
        }
    }

    let (mut generators, filtered): (Vec<Haplotype>, Vec<Haplotype>) =
        buckets.into_iter().partition(|h| h.is_generator());

    // stable: equal sizes keep first-seen order
    generators.sort_by(|a, b| b.size().cmp(&a.size()));
    let generator_reads: usize = generators.iter().map(|h| h.size()).sum();
    for (index, generator) in generators.iter_mut().enumerate() {
        generator.name = haplotype_name(index, config.label_alphabet);
        generator.global_frequency = generator.size() as f64 / generator_reads as f64;
    }

    for group in &filtered {
        log::debug!(
            "Filtered group of {} reads [{}]: {}",
            group.size(),
            group.flags.iter().join(","),
            group.codons.join(" ")
        );
    }

    log::info!(
        "Phasing: {} reads, {} variant positions, {} haplotypes, {} filtered groups",
        rows.len(),
        sites.len(),
        generators.len(),
        filtered.len()
    );

    Phasing {
        generators,
        filtered,
        num_reads: rows.len(),
    }
}

/// Records, for every accepted codon, whether each generator carries it.
pub fn mark_haplotype_hits(genes: &mut [VariantGene], sites: &[VariantSite], phasing: &Phasing) {
    for (site_index, site) in sites.iter().enumerate() {
        let Some(position) = genes
            .get_mut(site.gene_index)
            .and_then(|gene| gene.positions.get_mut(&site.codon_index))
        else {
            continue;
        };
        for variant_codon in position.variant_codons_mut() {
            variant_codon.haplotype_hits = phasing
                .generators
                .iter()
                .map(|h| h.codons.get(site_index) == Some(&variant_codon.codon))
                .collect();
        }
    }
}
