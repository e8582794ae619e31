/// Label of the `index`-th generator: `A..Z` first, then a capital prefix
/// followed by a lowercase letter (`Aa`, `Ab`, ...). `alphabet` letters are used per digit.
pub fn haplotype_name(index: usize, alphabet: usize) -> String {
    if index < alphabet {
        return ((b'A' + index as u8) as char).to_string();
    }
    let rest = index - alphabet;
    let mut name = haplotype_name(rest / alphabet, alphabet);
    name.push((b'a' + (rest % alphabet) as u8) as char);
    name
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_thirty_labels() {
        let names: Vec<String> = (0..30).map(|i| haplotype_name(i, 26)).collect();
        assert_eq!(names[0], "A");
        assert_eq!(names[25], "Z");
        assert_eq!(&names[26..], &["Aa", "Ab", "Ac", "Ad"]);
    }

    #[test]
    fn prefix_advances_every_alphabet() {
        assert_eq!(haplotype_name(51, 26), "Az");
        assert_eq!(haplotype_name(52, 26), "Ba");
        assert_eq!(haplotype_name(701, 26), "Zz");
        assert_eq!(haplotype_name(702, 26), "Aaa");
    }

    #[test]
    fn smaller_alphabet() {
        let names: Vec<String> = (0..6).map(|i| haplotype_name(i, 2)).collect();
        assert_eq!(names, vec!["A", "B", "Aa", "Ab", "Ba", "Bb"]);
    }
}
