use std::collections::HashSet;

use crate::data::HitRecord;
use crate::util::format_scientific;

#[derive(Clone, Debug, PartialEq)]
pub struct HitSummary {
    pub total: usize,
    pub chromosomes: usize,
    pub motifs: usize,
    pub mean_length: f64,
    pub min_pvalue: f64,
    pub max_pvalue: f64,
}

impl HitSummary {
    pub fn lines(&self) -> [(&'static str, String); 6] {
        [
            ("Total records", self.total.to_string()),
            ("Unique chromosomes", self.chromosomes.to_string()),
            ("Unique motifs", self.motifs.to_string()),
            ("Average length", format!("{:.1}", self.mean_length)),
            ("Min p-value", format_scientific(self.min_pvalue)),
            ("Max p-value", format_scientific(self.max_pvalue)),
        ]
    }
}

pub fn distinct(rows: &[HitRecord], value: impl Fn(&HitRecord) -> &str) -> usize {
    rows.iter().map(value).collect::<HashSet<_>>().len()
}

pub fn summarize(rows: &[HitRecord]) -> Option<HitSummary> {
    if rows.is_empty() {
        return None;
    }

    let total_length = rows.iter().map(|row| row.length as f64).sum::<f64>();
    let (min_pvalue, max_pvalue) = rows.iter().fold(
        (f64::INFINITY, f64::NEG_INFINITY),
        |(low, high), row| (low.min(row.pvalue), high.max(row.pvalue)),
    );

    Some(HitSummary {
        total: rows.len(),
        chromosomes: distinct(rows, |row| row.chrom.as_str()),
        motifs: distinct(rows, |row| row.motif.as_str()),
        mean_length: total_length / rows.len() as f64,
        min_pvalue,
        max_pvalue,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(chrom: &str, motif: &str, pvalue: f64, length: i64) -> HitRecord {
        HitRecord {
            chrom: chrom.to_owned(),
            motif: motif.to_owned(),
            pvalue,
            length,
            ..HitRecord::default()
        }
    }

    #[test]
    fn summary_of_empty_rows_is_none() {
        assert_eq!(summarize(&[]), None);
    }

    #[test]
    fn summary_counts_and_formats() {
        let rows = [
            hit("chr1", "MA1", 1.08e-9, 21),
            hit("chr1", "MA2", 3.2e-5, 18),
            hit("chr7", "MA1", 4.0e-4, 20),
        ];
        let summary = summarize(&rows).unwrap();

        assert_eq!(summary.total, 3);
        assert_eq!(summary.chromosomes, 2);
        assert_eq!(summary.motifs, 2);
        let lines = summary.lines();
        assert_eq!(lines[3].1, "19.7");
        assert_eq!(lines[4].1, "1.08e-09");
        assert_eq!(lines[5].1, "4.00e-04");
    }
}
