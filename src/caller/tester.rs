//! Significance testing of non-reference codons and the acceptance policy.

use super::{config::CallerConfig, target::TargetGene};
use serde::Serialize;
use statrs::distribution::{Discrete, Hypergeometric};

/// Two-sided Fisher's exact test of the 2x2 table `[[a, b], [c, d]]`.
pub fn fisher_exact(a: u64, b: u64, c: u64, d: u64) -> f64 {
    let n = a + b + c + d;
    let row1_sum = a + b;
    let col1_sum = a + c;

    // A zero marginal leaves a single possible table
    if n == 0 || row1_sum == 0 || col1_sum == 0 || row1_sum == n || col1_sum == n {
        return 1.0;
    }

    let dist = match Hypergeometric::new(n, row1_sum, col1_sum) {
        Ok(d) => d,
        Err(_) => return 1.0,
    };

    let p_observed = dist.pmf(a);
    let min_a = (row1_sum + col1_sum).saturating_sub(n);
    let max_a = row1_sum.min(col1_sum);

    // Relative tolerance guards against rounding in the pmf of equally likely tables
    let threshold = p_observed * (1.0 + 1e-7);
    let p_value: f64 = (min_a..=max_a)
        .map(|k| dist.pmf(k))
        .filter(|&p| p <= threshold)
        .sum();
    p_value.min(1.0)
}

/// Expected count of a codon under the error model, rounded and bounded by coverage.
pub fn expected_count(coverage: usize, probability: f64) -> usize {
    let expected = (coverage as f64 * probability).round();
    (expected.max(0.0) as usize).min(coverage)
}

/// Bonferroni-corrected p-value of `observed` against the error expectation.
pub fn corrected_p_value(
    observed: usize,
    coverage: usize,
    probability: f64,
    num_tests: usize,
) -> f64 {
    let expected = expected_count(coverage, probability);
    let observed = observed.min(coverage);
    let p = fisher_exact(
        observed as u64,
        (coverage - observed) as u64,
        expected as u64,
        (coverage - expected) as u64,
    );
    (p * num_tests as f64).min(1.0)
}

/// Everything the acceptance policy looks at for one tested codon.
#[derive(Debug, Clone)]
pub struct CodonTest<'a> {
    pub gene: &'a TargetGene,
    pub codon_index: usize,
    pub codon: &'a str,
    pub ref_aa: char,
    pub aa: char,
    pub frequency: f64,
    pub p_value: f64,
}

impl CodonTest<'_> {
    pub fn is_expected_minor(&self) -> bool {
        self.gene
            .is_expected_minor(self.codon_index, self.aa, self.codon)
    }

    pub fn is_variable(&self, config: &CallerConfig) -> bool {
        self.frequency < config.variable_site_fraction
    }

    pub fn is_significant(&self, config: &CallerConfig) -> bool {
        self.p_value < config.alpha
    }
}

pub fn accept_call(test: &CodonTest, config: &CallerConfig, has_expected_minors: bool) -> bool {
    if config.debug {
        return true;
    }
    if test.frequency * 100.0 < config.minimal_percent {
        return false;
    }
    if test.is_expected_minor() {
        return true;
    }
    if config.drm_only {
        let drms = test.gene.find_drms(test.codon_index, test.ref_aa, test.aa);
        return !drms.is_empty() && test.is_significant(config);
    }
    if has_expected_minors {
        return test.is_variable(config) && test.is_significant(config);
    }
    test.is_significant(config)
}

/// Outcomes of variable-site tests against the expected minors.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PerformanceTally {
    pub true_positives: usize,
    pub false_positives: usize,
    pub false_negatives: usize,
    pub true_negatives: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValidationSummary {
    pub true_positive_rate: f64,
    pub false_positive_rate: f64,
    pub num_tests: usize,
    pub num_false_positives: usize,
    pub accuracy: f64,
}

impl PerformanceTally {
    pub fn record(&mut self, test: &CodonTest, config: &CallerConfig) {
        if !test.is_variable(config) {
            return;
        }
        match (test.is_significant(config), test.is_expected_minor()) {
            (true, true) => self.true_positives += 1,
            (true, false) => self.false_positives += 1,
            (false, true) => self.false_negatives += 1,
            (false, false) => self.true_negatives += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.true_positives + self.false_positives + self.false_negatives + self.true_negatives
    }

    /// `None` unless minors are configured and every rate has a non-zero denominator.
    pub fn summarize(
        &self,
        num_tests: usize,
        num_expected_minors: usize,
    ) -> Option<ValidationSummary> {
        if num_expected_minors == 0 {
            return None;
        }
        if num_tests <= num_expected_minors || self.total() == 0 {
            log::warn!(
                "Validation skipped: {} tests, {} expected minors, {} variable-site tests",
                num_tests,
                num_expected_minors,
                self.total()
            );
            return None;
        }
        Some(ValidationSummary {
            true_positive_rate: self.true_positives as f64 / num_expected_minors as f64,
            false_positive_rate: self.false_positives as f64
                / (num_tests - num_expected_minors) as f64,
            num_tests,
            num_false_positives: self.false_positives,
            accuracy: (self.true_positives + self.true_negatives) as f64 / self.total() as f64,
        })
    }
}
