use crate::msa::ColumnCounts;
use std::collections::BTreeMap;

/// Calls of one gene keyed by 1-based codon index.
#[derive(Debug, Clone, PartialEq)]
pub struct VariantGene {
    pub name: String,
    pub positions: BTreeMap<usize, VariantPosition>,
}

impl VariantGene {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            positions: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantPosition {
    pub abs_pos: usize,
    pub ref_codon: String,
    pub ref_aa: char,
    pub alt_ref: Option<(String, char)>,
    pub coverage: usize,
    pub codons: BTreeMap<char, Vec<VariantCodon>>,
    pub msa: Vec<MsaContextColumn>,
}

impl VariantPosition {
    pub fn is_reference(&self, codon: &str) -> bool {
        self.ref_codon == codon || self.alt_ref.as_ref().is_some_and(|(alt, _)| alt == codon)
    }

    pub fn variant_codons(&self) -> impl Iterator<Item = &VariantCodon> {
        self.codons.values().flatten()
    }

    pub fn variant_codons_mut(&mut self) -> impl Iterator<Item = &mut VariantCodon> {
        self.codons.values_mut().flatten()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct VariantCodon {
    pub codon: String,
    pub count: usize,
    pub frequency: f64,
    pub p_value: f64,
    pub known_drm: String,
    /// One flag per generator haplotype, in label order.
    pub haplotype_hits: Vec<bool>,
}

/// One column of the alignment around a call site.
#[derive(Debug, Clone, PartialEq)]
pub struct MsaContextColumn {
    pub rel_pos: isize,
    pub abs_pos: usize,
    pub counts: ColumnCounts,
    pub wt: char,
}
