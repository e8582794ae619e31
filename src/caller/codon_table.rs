use once_cell::sync::Lazy;
use std::collections::HashMap;

const BASES: [u8; 4] = [b'T', b'C', b'A', b'G'];
// Standard genetic code, codons enumerated in TCAG order
const AMINO_ACIDS: &[u8; 64] =
    b"FFLLSSSSYY**CC*WLLLLPPPPHHQQRRRRIIIMTTTTNNKKSSRRVVVVAAAADDEEGGGG";

static CODON_TABLE: Lazy<HashMap<[u8; 3], char>> = Lazy::new(|| {
    let mut table = HashMap::with_capacity(64);
    for (i, &first) in BASES.iter().enumerate() {
        for (j, &second) in BASES.iter().enumerate() {
            for (k, &third) in BASES.iter().enumerate() {
                let aa = AMINO_ACIDS[16 * i + 4 * j + k] as char;
                table.insert([first, second, third], aa);
            }
        }
    }
    table
});

/// One-letter amino acid (`*` for stop) of an uppercase ACGT triplet.
pub fn translate(codon: &[u8]) -> Option<char> {
    let key: [u8; 3] = codon.try_into().ok()?;
    CODON_TABLE.get(&key).copied()
}

pub fn translate_str(codon: &str) -> Option<char> {
    translate(codon.as_bytes())
}

pub fn is_valid_codon(codon: &[u8]) -> bool {
    translate(codon).is_some()
}
