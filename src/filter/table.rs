use std::collections::{BTreeMap, BTreeSet};

use crate::data::{HitField, HitRecord, natural_sort};

/// Column predicates for the hit tables. Each selected column keeps rows
/// whose value is in its set; an empty set does not filter. The numeric
/// thresholds are inclusive.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitFilter {
    selections: BTreeMap<HitField, BTreeSet<String>>,
    pub pvalue_max: Option<f64>,
    pub length_min: Option<i64>,
}

impl HitFilter {
    pub fn selection(&self, field: HitField) -> Option<&BTreeSet<String>> {
        self.selections
            .get(&field)
            .filter(|values| !values.is_empty())
    }

    pub fn is_selected(&self, field: HitField, value: &str) -> bool {
        self.selections
            .get(&field)
            .is_some_and(|values| values.contains(value))
    }

    pub fn toggle(&mut self, field: HitField, value: &str, selected: bool) {
        let values = self.selections.entry(field).or_default();
        if selected {
            values.insert(value.to_owned());
        } else {
            values.remove(value);
        }
        if values.is_empty() {
            self.selections.remove(&field);
        }
    }

    pub fn select_single(&mut self, field: HitField, value: Option<&str>) {
        match value {
            Some(value) => {
                self.selections
                    .insert(field, BTreeSet::from([value.to_owned()]));
            }
            None => {
                self.selections.remove(&field);
            }
        }
    }

    pub fn single(&self, field: HitField) -> Option<&str> {
        self.selection(field)
            .and_then(|values| values.iter().next())
            .map(String::as_str)
    }

    pub fn clear(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.selections.values().all(BTreeSet::is_empty)
            && self.pvalue_max.is_none()
            && self.length_min.is_none()
    }

    pub fn matches(&self, record: &HitRecord) -> bool {
        let categories_match = self.selections.iter().all(|(field, values)| {
            values.is_empty()
                || record
                    .category(*field)
                    .is_some_and(|value| values.contains(value))
        });

        categories_match
            && self.pvalue_max.is_none_or(|max| record.pvalue <= max)
            && self.length_min.is_none_or(|min| record.length >= min)
    }

    pub fn apply(&self, rows: &[HitRecord]) -> Vec<HitRecord> {
        rows.iter()
            .filter(|row| self.matches(row))
            .cloned()
            .collect()
    }
}

pub fn column_options(rows: &[HitRecord], field: HitField) -> Vec<String> {
    let distinct = rows
        .iter()
        .filter_map(|row| row.category(field))
        .filter(|value| !value.is_empty())
        .collect::<BTreeSet<_>>();

    let mut options = distinct.into_iter().map(str::to_owned).collect::<Vec<_>>();
    if field == HitField::Chrom {
        natural_sort(&mut options);
    }
    options
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(chrom: &str, motif: &str, family: &str, pvalue: f64, length: i64) -> HitRecord {
        HitRecord {
            chrom: chrom.to_owned(),
            start: 10,
            end: 30,
            motif: motif.to_owned(),
            family: family.to_owned(),
            pvalue,
            length,
            ..HitRecord::default()
        }
    }

    fn rows() -> Vec<HitRecord> {
        vec![
            hit("chr1", "MA1", "L1", 1e-9, 21),
            hit("chr10", "MA2", "Alu", 1e-5, 18),
            hit("chr2", "MA1", "Alu", 1e-3, 21),
            hit("chrX", "MA3", "", 0.2, 12),
        ]
    }

    #[test]
    fn empty_filter_keeps_everything() {
        let input = rows();
        let filter = HitFilter::default();
        assert!(filter.is_empty());
        assert_eq!(filter.apply(&input), input);
    }

    #[test]
    fn membership_predicates_intersect() {
        let input = rows();
        let mut filter = HitFilter::default();
        filter.toggle(HitField::Motif, "MA1", true);
        filter.toggle(HitField::Motif, "MA2", true);
        filter.toggle(HitField::Family, "Alu", true);

        let output = filter.apply(&input);
        assert_eq!(
            output.iter().map(|r| r.chrom.as_str()).collect::<Vec<_>>(),
            ["chr10", "chr2"]
        );

        filter.toggle(HitField::Family, "Alu", false);
        assert!(filter.selection(HitField::Family).is_none());
        assert_eq!(filter.apply(&input).len(), 3);
    }

    #[test]
    fn thresholds_are_inclusive() {
        let input = rows();
        let filter = HitFilter {
            pvalue_max: Some(1e-5),
            length_min: Some(18),
            ..HitFilter::default()
        };

        let output = filter.apply(&input);
        assert_eq!(
            output.iter().map(|r| r.chrom.as_str()).collect::<Vec<_>>(),
            ["chr1", "chr10"]
        );
    }

    #[test]
    fn single_selection_replaces_previous_value() {
        let mut filter = HitFilter::default();
        filter.select_single(HitField::Chrom, Some("chr1"));
        filter.select_single(HitField::Chrom, Some("chr2"));
        assert_eq!(filter.single(HitField::Chrom), Some("chr2"));

        filter.select_single(HitField::Chrom, None);
        assert_eq!(filter.single(HitField::Chrom), None);
        assert!(filter.is_empty());
    }

    #[test]
    fn options_are_distinct_sorted_and_non_empty() {
        let input = rows();
        assert_eq!(
            column_options(&input, HitField::Chrom),
            ["chr1", "chr2", "chr10", "chrX"]
        );
        assert_eq!(column_options(&input, HitField::Family), ["Alu", "L1"]);
        assert!(column_options(&input, HitField::Start).is_empty());
    }

    #[test]
    fn empty_input_propagates() {
        let mut filter = HitFilter::default();
        filter.toggle(HitField::Chrom, "chr1", true);
        assert!(filter.apply(&[]).is_empty());
    }
}
