use super::{cluster::Phasing, haplotype::Haplotype};
use crate::caller::CodonTransitions;

/// Probability of observing `observed` when the true codons are `origin`.
/// Non-informative codon pairs are skipped.
pub fn joint_transition(
    origin: &[String],
    observed: &[String],
    transitions: &CodonTransitions,
) -> f64 {
    if origin.len() != observed.len() {
        return 0.0;
    }
    origin
        .iter()
        .zip(observed)
        .filter_map(|(from, to)| transitions.get(from.as_bytes(), to.as_bytes()))
        .product()
}

/// Posterior origin weights of `filtered` over `generators`, summing to 1.
pub fn posterior(
    filtered: &Haplotype,
    generators: &[Haplotype],
    transitions: &CodonTransitions,
) -> Vec<f64> {
    let total_reads: usize = generators.iter().map(|g| g.size()).sum();
    if total_reads == 0 {
        return vec![0.0; generators.len()];
    }
    let priors: Vec<f64> = generators
        .iter()
        .map(|g| g.size() as f64 / total_reads as f64)
        .collect();
    let weights: Vec<f64> = generators
        .iter()
        .zip(&priors)
        .map(|(g, prior)| prior * joint_transition(&g.codons, &filtered.codons, transitions))
        .collect();
    let norm: f64 = weights.iter().sum();
    if norm > 0.0 && norm.is_finite() {
        weights.iter().map(|w| w / norm).collect()
    } else {
        priors
    }
}

/// Spreads each filtered group's size onto the generators' soft-collapse
/// accumulators. Group membership is left unchanged.
pub fn soft_collapse(phasing: &mut Phasing, transitions: &CodonTransitions) {
    if phasing.generators.is_empty() {
        log::debug!("Soft collapse skipped: no haplotypes to collapse onto");
        return;
    }
    for generator in phasing.generators.iter_mut() {
        generator.soft_collapse = generator.size() as f64;
    }
    for filtered in &phasing.filtered {
        let weights = posterior(filtered, &phasing.generators, transitions);
        let size = filtered.size() as f64;
        for (generator, weight) in phasing.generators.iter_mut().zip(weights) {
            generator.soft_collapse += weight * size;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::caller::ErrorEstimates;
    use crate::phasing::{flags::HaplotypeFlag, haplotype::UNCOVERED_CODON};

    const EPS: f64 = 1e-9;

    fn haplotype(codons: &[&str], size: usize) -> Haplotype {
        let mut h = Haplotype::new(codons.iter().map(|c| c.to_string()).collect());
        h.read_ids = (0..size).collect();
        h
    }

    fn transitions() -> CodonTransitions {
        CodonTransitions::new(&ErrorEstimates::new(0.01, 0.01).unwrap())
    }

    #[test]
    fn uninformative_codons_are_skipped() {
        let transitions = transitions();
        let origin = vec!["AAA".to_string(), "GGG".to_string()];
        let observed = vec!["AAC".to_string(), UNCOVERED_CODON.to_string()];
        let p = joint_transition(&origin, &observed, &transitions);
        assert!((p - 0.98 * 0.98 * 0.01).abs() < EPS);
        assert_eq!(joint_transition(&origin, &observed[..1], &transitions), 0.0);
    }

    #[test]
    fn posterior_prefers_closest_generator() {
        let transitions = transitions();
        let generators = vec![haplotype(&["AAA", "GGG"], 60), haplotype(&["AAC", "GGC"], 40)];
        let read = haplotype(&["AAC", "GGA"], 1);
        let weights = posterior(&read, &generators, &transitions);
        assert!((weights.iter().sum::<f64>() - 1.0).abs() < EPS);
        assert!(weights[1] > weights[0]);
    }

    #[test]
    fn soft_collapse_conserves_mass() {
        let transitions = transitions();
        let mut phasing = Phasing {
            generators: vec![
                haplotype(&["AAA", "GGG"], 50),
                haplotype(&["AAC", "GGC"], 30),
                haplotype(&["AAC", "GGG"], 20),
            ],
            filtered: vec![
                haplotype(&["AAT", "GGC"], 7),
                haplotype(&["A-C", "   "], 3),
                haplotype(&["ANA", "GGG"], 2),
            ],
            num_reads: 112,
        };
        phasing.filtered[0].flags.insert(HaplotypeFlag::OffTarget);

        for filtered in &phasing.filtered {
            let weights = posterior(filtered, &phasing.generators, &transitions);
            let contributed: f64 = weights.iter().map(|w| w * filtered.size() as f64).sum();
            assert!((contributed - filtered.size() as f64).abs() < EPS);
        }

        soft_collapse(&mut phasing, &transitions);
        let total: f64 = phasing.generators.iter().map(|g| g.soft_collapse).sum();
        assert!((total - 112.0).abs() < EPS);
        assert_eq!(phasing.generators[0].size(), 50);
        assert_eq!(phasing.filtered.len(), 3);
    }

    #[test]
    fn zero_likelihood_falls_back_to_priors() {
        let transitions = CodonTransitions::new(&ErrorEstimates::new(0.0, 0.0).unwrap());
        let generators = vec![haplotype(&["AAA"], 3), haplotype(&["CCC"], 1)];
        let read = haplotype(&["GGG"], 4);
        let weights = posterior(&read, &generators, &transitions);
        assert!((weights[0] - 0.75).abs() < EPS);
        assert!((weights[1] - 0.25).abs() < EPS);
    }
}
