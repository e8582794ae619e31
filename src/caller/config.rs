use crate::msa::MAX_WINDOW_SPAN;
use crate::utils::Result;

/// Thresholds and switches shared by calling, phasing and reporting.
#[derive(Debug, Clone, PartialEq)]
pub struct CallerConfig {
    /// Significance level applied to Bonferroni-corrected p-values.
    pub alpha: f64,
    /// Calls below this percentage of coverage are suppressed.
    pub minimal_percent: f64,
    /// A majority codon above this percentage that disagrees with the
    /// reference becomes the alternate reference.
    pub maximal_percent: f64,
    /// A codon is at a variable site when its share of coverage is below this.
    pub variable_site_fraction: f64,
    pub min_haplotype_reads: usize,
    pub label_alphabet: usize,
    pub msa_context_flank: usize,
    pub drm_only: bool,
    pub merge_outliers: bool,
    pub debug: bool,
    pub verbose: bool,
}

impl Default for CallerConfig {
    fn default() -> Self {
        Self {
            alpha: 0.01,
            minimal_percent: 0.0,
            maximal_percent: 100.0,
            variable_site_fraction: 0.8,
            min_haplotype_reads: 10,
            label_alphabet: 26,
            msa_context_flank: 3,
            drm_only: false,
            merge_outliers: false,
            debug: false,
            verbose: false,
        }
    }
}

impl CallerConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.alpha) {
            return Err(format!("Alpha must be between 0.0 and 1.0, got: {}", self.alpha));
        }
        if !(0.0..=100.0).contains(&self.minimal_percent)
            || !(0.0..=100.0).contains(&self.maximal_percent)
        {
            return Err(format!(
                "Percent thresholds must be between 0 and 100, got: {} and {}",
                self.minimal_percent, self.maximal_percent
            ));
        }
        if self.minimal_percent > self.maximal_percent {
            return Err(format!(
                "Minimal percent {} exceeds maximal percent {}",
                self.minimal_percent, self.maximal_percent
            ));
        }
        if self.msa_context_flank > MAX_WINDOW_SPAN {
            return Err(format!(
                "MSA context flank must not exceed {} columns, got: {}",
                MAX_WINDOW_SPAN, self.msa_context_flank
            ));
        }
        if !(1..=26).contains(&self.label_alphabet) {
            return Err(format!(
                "Label alphabet must have between 1 and 26 letters, got: {}",
                self.label_alphabet
            ));
        }
        Ok(())
    }
}
