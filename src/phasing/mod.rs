mod cluster;
mod flags;
mod haplotype;
mod naming;
mod reweight;

pub use cluster::{
    cluster_reads, collect_variant_sites, mark_haplotype_hits, read_signature, Phasing,
    VariantSite,
};
pub use flags::{FlagSet, HaplotypeFlag};
pub use haplotype::{Haplotype, UNCOVERED_CODON};
pub use naming::haplotype_name;
pub use reweight::{joint_transition, posterior, soft_collapse};
