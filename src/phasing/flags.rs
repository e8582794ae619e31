use serde::Serialize;
use std::collections::BTreeSet;
use std::fmt;

/// Reason a read group is not reported as a haplotype.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub enum HaplotypeFlag {
    #[serde(rename = "OFFTARGET")]
    OffTarget,
    #[serde(rename = "LOW_COV")]
    LowCov,
    #[serde(rename = "WITH_GAP")]
    WithGap,
    #[serde(rename = "WITH_HETERODUPLEX")]
    WithHeteroduplex,
    #[serde(rename = "PARTIAL")]
    Partial,
}

impl fmt::Display for HaplotypeFlag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            HaplotypeFlag::OffTarget => "OFFTARGET",
            HaplotypeFlag::LowCov => "LOW_COV",
            HaplotypeFlag::WithGap => "WITH_GAP",
            HaplotypeFlag::WithHeteroduplex => "WITH_HETERODUPLEX",
            HaplotypeFlag::Partial => "PARTIAL",
        };
        write!(f, "{}", name)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct FlagSet(BTreeSet<HaplotypeFlag>);

impl FlagSet {
    pub fn insert(&mut self, flag: HaplotypeFlag) {
        self.0.insert(flag);
    }

    pub fn extend(&mut self, other: &FlagSet) {
        self.0.extend(other.0.iter().copied());
    }

    pub fn contains(&self, flag: HaplotypeFlag) -> bool {
        self.0.contains(&flag)
    }

    pub fn is_clean(&self) -> bool {
        self.0.is_empty()
    }

    pub fn is_offtarget(&self) -> bool {
        self.contains(HaplotypeFlag::OffTarget)
    }

    pub fn is_low_coverage(&self) -> bool {
        self.contains(HaplotypeFlag::LowCov)
    }

    pub fn has_gap(&self) -> bool {
        self.contains(HaplotypeFlag::WithGap)
    }

    pub fn has_heteroduplex(&self) -> bool {
        self.contains(HaplotypeFlag::WithHeteroduplex)
    }

    pub fn is_partial(&self) -> bool {
        self.contains(HaplotypeFlag::Partial)
    }

    pub fn iter(&self) -> impl Iterator<Item = HaplotypeFlag> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<HaplotypeFlag> for FlagSet {
    fn from_iter<I: IntoIterator<Item = HaplotypeFlag>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}
