use super::flags::FlagSet;

/// Codon placeholder for a variant position the read does not cover.
pub const UNCOVERED_CODON: &str = "   ";

/// Reads sharing one codon vector over all variant positions.
#[derive(Debug, Clone, PartialEq)]
pub struct Haplotype {
    pub codons: Vec<String>,
    /// Indices into the MSA rows.
    pub read_ids: Vec<usize>,
    pub flags: FlagSet,
    pub soft_collapse: f64,
    pub name: String,
    pub global_frequency: f64,
}

impl Haplotype {
    pub fn new(codons: Vec<String>) -> Self {
        Self {
            codons,
            read_ids: Vec::new(),
            flags: FlagSet::default(),
            soft_collapse: 0.0,
            name: String::new(),
            global_frequency: 0.0,
        }
    }

    pub fn size(&self) -> usize {
        self.read_ids.len()
    }

    pub fn is_generator(&self) -> bool {
        self.flags.is_clean()
    }
}
