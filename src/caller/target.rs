use super::codon_table;
use crate::utils::Result;
use itertools::Itertools;
use serde::Deserialize;
use std::{
    borrow::Cow,
    collections::HashSet,
    fs::File,
    io::{BufReader, Read as ioRead},
    path::Path,
    str::FromStr,
};

/// Genes to call plus the optional reference they are placed on.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetConfig {
    #[serde(default)]
    pub genes: Vec<TargetGene>,
    #[serde(default)]
    pub reference_sequence: Option<String>,
}

/// A gene over `[begin, end)` in 0-based absolute coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TargetGene {
    pub name: String,
    pub begin: usize,
    pub end: usize,
    #[serde(default)]
    pub minors: Vec<ExpectedMinor>,
    #[serde(default)]
    pub drms: Vec<DrmSignature>,
}

/// Known minor variant, `position` being the 1-based codon index in the gene.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ExpectedMinor {
    pub position: usize,
    pub amino_acid: char,
    pub codon: String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct DrmSignature {
    pub name: String,
    pub mutations: Vec<DrmMutation>,
}

/// Amino acid change in `V32I` notation. Several alternatives may follow the
/// position, e.g. `K103NS`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(try_from = "String")]
pub struct DrmMutation {
    pub ref_aa: char,
    pub position: usize,
    pub alt_aas: Vec<char>,
}

impl DrmMutation {
    pub fn matches(&self, position: usize, ref_aa: char, alt_aa: char) -> bool {
        self.position == position && self.ref_aa == ref_aa && self.alt_aas.contains(&alt_aa)
    }
}

fn is_amino_acid(c: char) -> bool {
    c.is_ascii_uppercase() || c == '*'
}

impl FromStr for DrmMutation {
    type Err = String;

    fn from_str(encoding: &str) -> Result<Self> {
        let error_message = || {
            format!(
                "Mutation must be in 'REF POSITION ALT' format like V32I: '{}'",
                encoding
            )
        };
        let mut chars = encoding.chars();
        let ref_aa = chars.next().filter(|&c| is_amino_acid(c)).ok_or_else(error_message)?;
        let rest = chars.as_str();
        let digits_end = rest
            .find(|c: char| !c.is_ascii_digit())
            .ok_or_else(error_message)?;
        let position: usize = rest[..digits_end].parse().map_err(|_| error_message())?;
        let alt_aas: Vec<char> = rest[digits_end..].chars().collect();
        if position == 0 || alt_aas.is_empty() || !alt_aas.iter().all(|&c| is_amino_acid(c)) {
            return Err(error_message());
        }
        Ok(Self {
            ref_aa,
            position,
            alt_aas,
        })
    }
}

impl TryFrom<String> for DrmMutation {
    type Error = String;

    fn try_from(encoding: String) -> Result<Self> {
        encoding.parse()
    }
}

impl TargetGene {
    pub fn new(name: impl Into<String>, begin: usize, end: usize) -> Self {
        Self {
            name: name.into(),
            begin,
            end,
            minors: Vec::new(),
            drms: Vec::new(),
        }
    }

    pub fn num_codons(&self) -> usize {
        self.end.saturating_sub(self.begin) / 3
    }

    pub fn is_expected_minor(&self, codon_index: usize, amino_acid: char, codon: &str) -> bool {
        self.minors.iter().any(|minor| {
            minor.position == codon_index && minor.amino_acid == amino_acid && minor.codon == codon
        })
    }

    /// Names of all signatures hit by `ref_aa` to `alt_aa` at `codon_index`, joined by ` + `.
    pub fn find_drms(&self, codon_index: usize, ref_aa: char, alt_aa: char) -> String {
        self.drms
            .iter()
            .filter(|drm| {
                drm.mutations
                    .iter()
                    .any(|m| m.matches(codon_index, ref_aa, alt_aa))
            })
            .map(|drm| drm.name.as_str())
            .join(" + ")
    }

    fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err("Gene name cannot be empty".to_string());
        }
        if self.end.saturating_sub(self.begin) < 3 {
            return Err(format!(
                "Gene {} must span at least one codon, got {}-{}",
                self.name, self.begin, self.end
            ));
        }
        for minor in &self.minors {
            let translated = codon_table::translate_str(&minor.codon).ok_or_else(|| {
                format!(
                    "Gene {}: expected minor codon '{}' is not a valid codon",
                    self.name, minor.codon
                )
            })?;
            if translated != minor.amino_acid {
                return Err(format!(
                    "Gene {}: expected minor codon {} encodes {}, not {}",
                    self.name, minor.codon, translated, minor.amino_acid
                ));
            }
            if minor.position == 0 || minor.position > self.num_codons() {
                return Err(format!(
                    "Gene {}: expected minor position {} outside of 1-{}",
                    self.name,
                    minor.position,
                    self.num_codons()
                ));
            }
        }
        Ok(())
    }
}

impl TargetConfig {
    pub fn from_path(path: &Path) -> Result<Self> {
        let file = File::open(path).map_err(|e| format!("File {}: {}", path.display(), e))?;
        Self::from_reader(BufReader::new(file))
            .map_err(|e| format!("Invalid target config {}: {}", path.display(), e))
    }

    pub fn from_reader<R: ioRead>(reader: R) -> Result<Self> {
        let mut config: TargetConfig = serde_json::from_reader(reader).map_err(|e| e.to_string())?;
        for gene in config.genes.iter_mut() {
            for minor in gene.minors.iter_mut() {
                minor.codon = minor.codon.to_uppercase();
            }
        }
        if let Some(reference) = config.reference_sequence.as_mut() {
            *reference = reference.to_uppercase();
        }
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        let mut names = HashSet::new();
        for gene in &self.genes {
            gene.validate()?;
            if !names.insert(gene.name.as_str()) {
                return Err(format!("Duplicate gene name: '{}'", gene.name));
            }
        }
        Ok(())
    }

    pub fn num_expected_minors(&self) -> usize {
        self.genes.iter().map(|g| g.minors.len()).sum()
    }

    /// Configured genes, or one gene spanning `[begin, end)` when none are configured.
    pub fn genes_or_window(&self, begin: usize, end: usize) -> Cow<'_, [TargetGene]> {
        if self.genes.is_empty() {
            Cow::Owned(vec![TargetGene::new("unknown", begin, end)])
        } else {
            Cow::Borrowed(&self.genes)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const CONFIG: &str = r#"{
        "genes": [
            {
                "name": "Protease",
                "begin": 2252,
                "end": 2549,
                "minors": [ { "position": 30, "amino_acid": "N", "codon": "aac" } ],
                "drms": [
                    { "name": "NFV", "mutations": ["D30N", "L90M"] },
                    { "name": "ATV/r", "mutations": ["L90M", "I84V"] }
                ]
            },
            { "name": "RT", "begin": 2549, "end": 3869 }
        ],
        "reference_sequence": "acgt"
    }"#;

    #[test]
    fn config_is_parsed_and_normalized() {
        let config = TargetConfig::from_reader(Cursor::new(CONFIG)).unwrap();
        assert_eq!(config.genes.len(), 2);
        assert_eq!(config.num_expected_minors(), 1);
        assert_eq!(config.reference_sequence.as_deref(), Some("ACGT"));
        let protease = &config.genes[0];
        assert!(protease.is_expected_minor(30, 'N', "AAC"));
        assert!(!protease.is_expected_minor(30, 'N', "AAT"));
        assert_eq!(protease.num_codons(), 99);
    }

    #[test]
    fn drm_labels_join_all_matching_signatures() {
        let config = TargetConfig::from_reader(Cursor::new(CONFIG)).unwrap();
        let protease = &config.genes[0];
        assert_eq!(protease.find_drms(90, 'L', 'M'), "NFV + ATV/r");
        assert_eq!(protease.find_drms(30, 'D', 'N'), "NFV");
        assert_eq!(protease.find_drms(30, 'D', 'D'), "");
        assert_eq!(protease.find_drms(84, 'I', 'V'), "ATV/r");
    }

    #[test]
    fn drm_requires_matching_reference_amino_acid() {
        let mut gene = TargetGene::new("g", 0, 30);
        gene.drms.push(DrmSignature {
            name: "X".to_string(),
            mutations: vec!["V1N".parse().unwrap()],
        });
        assert_eq!(gene.find_drms(1, 'V', 'N'), "X");
        assert_eq!(gene.find_drms(1, 'K', 'N'), "");
    }

    #[test]
    fn drm_notation_is_parsed() {
        let m: DrmMutation = "K103NS".parse().unwrap();
        assert_eq!(m.ref_aa, 'K');
        assert_eq!(m.position, 103);
        assert_eq!(m.alt_aas, vec!['N', 'S']);
        assert!(m.matches(103, 'K', 'S'));
        assert!(!m.matches(103, 'K', 'K'));
        assert!(!m.matches(103, 'R', 'N'));
        assert!("K103".parse::<DrmMutation>().is_err());
        assert!("103N".parse::<DrmMutation>().is_err());
        assert!("K0N".parse::<DrmMutation>().is_err());
        assert!("Kx3N".parse::<DrmMutation>().is_err());
    }

    #[test]
    fn invalid_configs_are_rejected() {
        let bad_minor = r#"{ "genes": [ { "name": "G", "begin": 0, "end": 30,
            "minors": [ { "position": 2, "amino_acid": "K", "codon": "AAC" } ] } ] }"#;
        let err = TargetConfig::from_reader(Cursor::new(bad_minor)).unwrap_err();
        assert_eq!(err, "Gene G: expected minor codon AAC encodes N, not K");

        let duplicate = r#"{ "genes": [ { "name": "G", "begin": 0, "end": 30 },
            { "name": "G", "begin": 30, "end": 60 } ] }"#;
        let err = TargetConfig::from_reader(Cursor::new(duplicate)).unwrap_err();
        assert_eq!(err, "Duplicate gene name: 'G'");

        let short = r#"{ "genes": [ { "name": "G", "begin": 10, "end": 12 } ] }"#;
        assert!(TargetConfig::from_reader(Cursor::new(short)).is_err());

        let far = r#"{ "genes": [ { "name": "G", "begin": 18446744073709551615, "end": 3 } ] }"#;
        let err = TargetConfig::from_reader(Cursor::new(far)).unwrap_err();
        assert!(err.starts_with("Gene G must span at least one codon"));

        let bad_drm = r#"{ "genes": [ { "name": "G", "begin": 0, "end": 30,
            "drms": [ { "name": "X", "mutations": ["90M"] } ] } ] }"#;
        assert!(TargetConfig::from_reader(Cursor::new(bad_drm)).is_err());
    }

    #[test]
    fn empty_config_falls_back_to_window() {
        let config = TargetConfig::default();
        let genes = config.genes_or_window(5, 35);
        assert_eq!(genes.len(), 1);
        assert_eq!(genes[0], TargetGene::new("unknown", 5, 35));
    }
}
