mod calling;
pub mod codon_table;
mod config;
mod error_model;
mod scanner;
mod target;
mod tester;
mod variant;

pub use calling::{call_variants, CallResult};
pub use config::CallerConfig;
pub use error_model::{CodonTransitions, ErrorEstimates};
pub use scanner::{majority_codon, tabulate_gene, tabulate_locus, LocusTally};
pub use target::{DrmMutation, DrmSignature, ExpectedMinor, TargetConfig, TargetGene};
pub use tester::{fisher_exact, PerformanceTally, ValidationSummary};
pub use variant::{MsaContextColumn, VariantCodon, VariantGene, VariantPosition};
