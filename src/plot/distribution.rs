use std::collections::{BTreeMap, HashMap};

use crate::color::{Rgb, viridis};
use crate::data::{HitRecord, canonical_present, natural_cmp};
use crate::util::stable_pair;

const STRIP_JITTER: f64 = 0.3;
pub const EMPTY_CHART_NOTE: &str = "No data to display";

#[derive(Clone, Debug, PartialEq)]
pub struct Bar {
    pub label: String,
    pub count: usize,
    pub color: Rgb,
}

#[derive(Clone, Debug, PartialEq)]
pub struct CategoryCounts {
    pub title: &'static str,
    pub x_title: &'static str,
    pub y_title: &'static str,
    pub bars: Vec<Bar>,
}

impl CategoryCounts {
    pub fn by_chromosome(rows: &[HitRecord]) -> Self {
        let mut counts = BTreeMap::<&str, usize>::new();
        for row in rows {
            *counts.entry(row.chrom.as_str()).or_default() += 1;
        }

        let mut counts = counts.into_iter().collect::<Vec<_>>();
        counts.sort_by(|(a, _), (b, _)| natural_cmp(a, b));

        let min = counts.iter().map(|(_, count)| *count).min().unwrap_or(0);
        let max = counts.iter().map(|(_, count)| *count).max().unwrap_or(0);
        let span = (max - min) as f64;

        let bars = counts
            .into_iter()
            .map(|(label, count)| Bar {
                label: label.to_owned(),
                count,
                color: viridis(if span > 0.0 {
                    (count - min) as f64 / span
                } else {
                    1.0
                }),
            })
            .collect();

        Self {
            title: "Distribution of Hits by Chromosome",
            x_title: "Chromosome",
            y_title: "Number of Hits",
            bars,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    pub fn max_count(&self) -> usize {
        self.bars.iter().map(|bar| bar.count).max().unwrap_or(0)
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripPoint {
    pub category: usize,
    pub jitter: f64,
    pub midpoint: f64,
    pub label: String,
}

#[derive(Clone, Debug, PartialEq)]
pub struct StripPlot {
    pub title: &'static str,
    pub categories: Vec<String>,
    pub points: Vec<StripPoint>,
}

impl StripPlot {
    pub fn midpoints(rows: &[HitRecord]) -> Self {
        let categories = canonical_present(rows.iter().map(|row| row.chrom.as_str()));
        let band = categories
            .iter()
            .enumerate()
            .map(|(index, label)| (label.as_str(), index))
            .collect::<HashMap<_, _>>();

        let points = rows
            .iter()
            .enumerate()
            .filter_map(|(index, row)| {
                let category = *band.get(row.chrom.as_str())?;
                let (offset, _) = stable_pair(&format!(
                    "{index}:{}:{}:{}",
                    row.chrom, row.start, row.end
                ));
                Some(StripPoint {
                    category,
                    jitter: offset as f64 * STRIP_JITTER / 2.0,
                    midpoint: row.midpoint(),
                    label: format!("{} {}", row.chrom, row.motif),
                })
            })
            .collect();

        Self {
            title: "Distribution of Midpoints by Chromosome",
            categories,
            points,
        }
    }

    pub fn midpoint_range(&self) -> Option<(f64, f64)> {
        self.points.iter().fold(None, |range, point| {
            let (low, high) = range.unwrap_or((point.midpoint, point.midpoint));
            Some((low.min(point.midpoint), high.max(point.midpoint)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn hit(chrom: &str, start: i64, end: i64) -> HitRecord {
        HitRecord {
            chrom: chrom.to_owned(),
            start,
            end,
            motif: "MA1".to_owned(),
            ..HitRecord::default()
        }
    }

    #[test]
    fn bars_follow_natural_order_and_scale_colours() {
        let rows = [
            hit("chr10", 1, 2),
            hit("chr2", 1, 2),
            hit("chr10", 3, 4),
            hit("chrX", 1, 2),
            hit("chr10", 5, 6),
        ];
        let chart = CategoryCounts::by_chromosome(&rows);

        let labels = chart
            .bars
            .iter()
            .map(|bar| bar.label.as_str())
            .collect::<Vec<_>>();
        assert_eq!(labels, ["chr2", "chr10", "chrX"]);
        assert_eq!(chart.bars[1].count, 3);
        assert_eq!(chart.max_count(), 3);
        assert_eq!(chart.bars[0].color, viridis(0.0));
        assert_eq!(chart.bars[1].color, viridis(1.0));
    }

    #[test]
    fn empty_rows_give_empty_bar_chart() {
        let chart = CategoryCounts::by_chromosome(&[]);
        assert!(chart.is_empty());
        assert_eq!(chart.max_count(), 0);
    }

    #[test]
    fn strip_keeps_canonical_chromosomes_only() {
        let rows = [
            hit("chrY", 100, 200),
            hit("chr1_random", 10, 20),
            hit("chr3", 1_000, 1_020),
            hit("chrM", 5, 9),
        ];
        let plot = StripPlot::midpoints(&rows);

        assert_eq!(plot.categories, ["chr3", "chrY"]);
        assert_eq!(plot.points.len(), 2);
        assert_eq!(plot.points[0].category, 1);
        assert_eq!(plot.points[0].midpoint, 150.0);
        assert_eq!(plot.points[1].midpoint, 1_010.0);
        assert_eq!(plot.midpoint_range(), Some((150.0, 1_010.0)));
    }

    #[test]
    fn jitter_is_bounded_and_stable() {
        let rows = (0..20).map(|i| hit("chr1", i * 10 + 1, i * 10 + 5)).collect::<Vec<_>>();
        let first = StripPlot::midpoints(&rows);
        let second = StripPlot::midpoints(&rows);

        assert_eq!(first, second);
        for point in &first.points {
            assert!(point.jitter.abs() <= STRIP_JITTER / 2.0 + 1e-9);
        }
    }
}
