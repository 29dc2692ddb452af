use std::cmp::Ordering;
use std::collections::HashSet;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
enum ChromKey<'a> {
    Numbered(u64),
    Named(char),
    Other(&'a str),
}

fn chrom_key(label: &str) -> ChromKey<'_> {
    let Some(rest) = label.strip_prefix("chr") else {
        return ChromKey::Other(label);
    };

    let digits_end = rest
        .char_indices()
        .find(|(_, ch)| !ch.is_ascii_digit())
        .map(|(index, _)| index)
        .unwrap_or(rest.len());
    if digits_end > 0 {
        return rest[..digits_end]
            .parse::<u64>()
            .map(ChromKey::Numbered)
            .unwrap_or(ChromKey::Other(label));
    }

    match rest.chars().next() {
        Some(ch @ ('X' | 'Y' | 'M')) => ChromKey::Named(ch),
        _ => ChromKey::Other(label),
    }
}

pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    chrom_key(a).cmp(&chrom_key(b)).then_with(|| a.cmp(b))
}

pub fn natural_sort(labels: &mut [String]) {
    labels.sort_by(|a, b| natural_cmp(a, b));
}

pub fn canonical_order() -> Vec<String> {
    (1..=22)
        .map(|index| format!("chr{index}"))
        .chain(["chrX".to_owned(), "chrY".to_owned()])
        .collect()
}

pub fn canonical_present<'a>(present: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let present = present.into_iter().collect::<HashSet<_>>();
    canonical_order()
        .into_iter()
        .filter(|label| present.contains(label.as_str()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_sort_numerically_before_letters() {
        let mut labels = [
            "chr10",
            "chrX",
            "scaffold_7",
            "chr2",
            "chrM",
            "chr1",
            "chrY",
            "chr1_random",
        ]
        .map(str::to_owned)
        .to_vec();
        natural_sort(&mut labels);

        assert_eq!(
            labels,
            [
                "chr1",
                "chr1_random",
                "chr2",
                "chr10",
                "chrM",
                "chrX",
                "chrY",
                "scaffold_7"
            ]
        );
    }

    #[test]
    fn canonical_present_keeps_karyotype_order() {
        let present = canonical_present(["chrY", "chr3", "chrUn", "chr21", "chr3"]);
        assert_eq!(present, ["chr3", "chr21", "chrY"]);
        assert_eq!(canonical_order().len(), 24);
    }
}
