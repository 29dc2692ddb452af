use clap::ValueEnum;

use crate::data::{CorrelationRecord, ExpressionDirection};

/// Which correlation signs to keep. A zero coefficient only passes `Any`.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum SignFilter {
    #[default]
    Any,
    Positive,
    Negative,
}

impl SignFilter {
    pub const ALL: [Self; 3] = [Self::Any, Self::Positive, Self::Negative];

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "both",
            Self::Positive => "positive",
            Self::Negative => "negative",
        }
    }

    pub fn accepts(self, coef: f64) -> bool {
        match self {
            Self::Any => true,
            Self::Positive => coef > 0.0,
            Self::Negative => coef < 0.0,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum CategoryFilter {
    #[default]
    Any,
    UpRegulated,
    DownRegulated,
}

impl CategoryFilter {
    pub const ALL: [Self; 3] = [Self::Any, Self::UpRegulated, Self::DownRegulated];

    pub fn label(self) -> &'static str {
        match self {
            Self::Any => "both",
            Self::UpRegulated => "up-regulated",
            Self::DownRegulated => "down-regulated",
        }
    }

    pub fn accepts(self, direction: &ExpressionDirection) -> bool {
        match self {
            Self::Any => true,
            Self::UpRegulated => *direction == ExpressionDirection::UpRegulated,
            Self::DownRegulated => *direction == ExpressionDirection::DownRegulated,
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NetworkFilter {
    pub sign: SignFilter,
    pub category: CategoryFilter,
}

impl NetworkFilter {
    pub fn accepts(&self, record: &CorrelationRecord) -> bool {
        self.sign.accepts(record.coef) && self.category.accepts(&record.direction)
    }
}

pub fn filter_correlations(
    records: &[CorrelationRecord],
    filter: NetworkFilter,
) -> Vec<CorrelationRecord> {
    records
        .iter()
        .filter(|record| filter.accepts(record))
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records() -> Vec<CorrelationRecord> {
        vec![
            CorrelationRecord::new("TF1", "L1PA2", 0.8, "up-regulated"),
            CorrelationRecord::new("TF1", "AluSx", -0.3, "down-regulated"),
            CorrelationRecord::new("TF2", "HERVK", 0.0, "up-regulated"),
            CorrelationRecord::new("TF2", "MER11", 0.4, "unknown"),
        ]
    }

    #[test]
    fn any_any_returns_input_unchanged() {
        let input = records();
        assert_eq!(filter_correlations(&input, NetworkFilter::default()), input);
    }

    #[test]
    fn every_setting_yields_a_subset() {
        let input = records();
        for sign in SignFilter::ALL {
            for category in CategoryFilter::ALL {
                let output = filter_correlations(&input, NetworkFilter { sign, category });
                assert!(output.iter().all(|record| input.contains(record)));
                assert!(output.len() <= input.len());
            }
        }
    }

    #[test]
    fn zero_coefficient_only_passes_any() {
        let input = records();
        let positive = filter_correlations(
            &input,
            NetworkFilter {
                sign: SignFilter::Positive,
                ..NetworkFilter::default()
            },
        );
        let negative = filter_correlations(
            &input,
            NetworkFilter {
                sign: SignFilter::Negative,
                ..NetworkFilter::default()
            },
        );

        assert_eq!(
            positive.iter().map(|r| r.te.as_str()).collect::<Vec<_>>(),
            ["L1PA2", "MER11"]
        );
        assert_eq!(
            negative.iter().map(|r| r.te.as_str()).collect::<Vec<_>>(),
            ["AluSx"]
        );
    }

    #[test]
    fn category_filters_combine_with_sign() {
        let input = records();
        let output = filter_correlations(
            &input,
            NetworkFilter {
                sign: SignFilter::Positive,
                category: CategoryFilter::UpRegulated,
            },
        );
        assert_eq!(output, vec![input[0].clone()]);

        let down = filter_correlations(
            &input,
            NetworkFilter {
                sign: SignFilter::Positive,
                category: CategoryFilter::DownRegulated,
            },
        );
        assert!(down.is_empty());
    }

    #[test]
    fn clap_value_names_match_labels() {
        assert_eq!(
            CategoryFilter::from_str("up-regulated", false),
            Ok(CategoryFilter::UpRegulated)
        );
        assert_eq!(
            SignFilter::from_str("negative", false),
            Ok(SignFilter::Negative)
        );
    }
}
