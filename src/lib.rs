//! # minorcall
//! Amino acid minority variant caller and codon haplotype phaser for deep
//! targeted amplicon sequencing.
//!
//! Input is a set of reads already aligned against a common coordinate
//! system, one read per line as `name<TAB>begin<TAB>bases`. Every codon of
//! every configured gene is tested against a sequencing-error null model;
//! reads are then grouped by the codons they carry at the called sites.
//!
//! ```bash
//!  ./minorcall call --reads reads.txt.gz \
//!         --targets hiv.json \
//!         --output-prefix sample
//! ```

pub mod caller;
pub mod cli;
pub mod commands;
pub mod msa;
pub mod phasing;
pub mod report;
pub mod utils;
pub mod workflow;
