use crate::msa::GAP;
use crate::utils::Result;
use std::collections::HashMap;

/// Per-base sequencing error rates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ErrorEstimates {
    pub match_rate: f64,
    pub substitution_rate: f64,
    pub deletion_rate: f64,
}

impl ErrorEstimates {
    pub fn new(substitution_rate: f64, deletion_rate: f64) -> Result<Self> {
        for (name, rate) in [
            ("substitution", substitution_rate),
            ("deletion", deletion_rate),
        ] {
            if !(0.0..=1.0).contains(&rate) {
                return Err(format!(
                    "The {} rate must be between 0.0 and 1.0, got: {}",
                    name, rate
                ));
            }
        }
        let match_rate = 1.0 - substitution_rate - deletion_rate;
        if match_rate < 0.0 {
            return Err(format!(
                "Substitution ({}) and deletion ({}) rates must not sum above 1.0",
                substitution_rate, deletion_rate
            ));
        }
        Ok(Self {
            match_rate,
            substitution_rate,
            deletion_rate,
        })
    }

    /// Probability that `from` is read as `to`, base by base.
    pub fn codon_probability(&self, from: &[u8], to: &[u8]) -> f64 {
        from.iter()
            .zip(to.iter())
            .map(|(&a, &b)| {
                if a == GAP || b == GAP {
                    self.deletion_rate
                } else if a != b {
                    self.substitution_rate
                } else {
                    self.match_rate
                }
            })
            .product()
    }
}

/// Transition probabilities between every pair of codons over `ACGT-`.
/// Pairs involving padding or ambiguity codes are absent.
#[derive(Debug, Clone)]
pub struct CodonTransitions {
    table: HashMap<([u8; 3], [u8; 3]), f64>,
}

impl CodonTransitions {
    pub fn new(error: &ErrorEstimates) -> Self {
        const SYMBOLS: [u8; 5] = [b'A', b'C', b'G', b'T', GAP];
        let mut codons = Vec::with_capacity(SYMBOLS.len().pow(3));
        for a in SYMBOLS {
            for b in SYMBOLS {
                for c in SYMBOLS {
                    codons.push([a, b, c]);
                }
            }
        }
        let mut table = HashMap::with_capacity(codons.len() * codons.len());
        for from in &codons {
            for to in &codons {
                table.insert((*from, *to), error.codon_probability(from, to));
            }
        }
        Self { table }
    }

    /// `None` marks a non-informative pair.
    pub fn get(&self, from: &[u8], to: &[u8]) -> Option<f64> {
        let from: [u8; 3] = from.try_into().ok()?;
        let to: [u8; 3] = to.try_into().ok()?;
        self.table.get(&(from, to)).copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-12;

    #[test]
    fn match_rate_is_derived() {
        let error = ErrorEstimates::new(0.01, 0.02).unwrap();
        assert!((error.match_rate - 0.97).abs() < EPS);
    }

    #[test]
    fn invalid_rates_are_rejected() {
        assert!(ErrorEstimates::new(-0.1, 0.0).is_err());
        assert!(ErrorEstimates::new(0.6, 0.6).is_err());
        assert!(ErrorEstimates::new(0.0, 1.5).is_err());
    }

    #[test]
    fn codon_probability_multiplies_per_base_terms() {
        let error = ErrorEstimates::new(0.01, 0.02).unwrap();
        let same = error.codon_probability(b"AAA", b"AAA");
        assert!((same - 0.97f64.powi(3)).abs() < EPS);
        let one_sub = error.codon_probability(b"AAA", b"AAC");
        assert!((one_sub - 0.97 * 0.97 * 0.01).abs() < EPS);
        let with_gap = error.codon_probability(b"AAA", b"A-C");
        assert!((with_gap - 0.97 * 0.02 * 0.01).abs() < EPS);
    }

    #[test]
    fn transitions_cover_gapped_codons_only() {
        let error = ErrorEstimates::new(0.01, 0.02).unwrap();
        let transitions = CodonTransitions::new(&error);
        assert_eq!(
            transitions.get(b"AAA", b"AAC"),
            Some(error.codon_probability(b"AAA", b"AAC"))
        );
        assert!(transitions.get(b"AAA", b"--A").is_some());
        assert_eq!(transitions.get(b"AAA", b"ANA"), None);
        assert_eq!(transitions.get(b"AAA", b"   "), None);
    }
}
