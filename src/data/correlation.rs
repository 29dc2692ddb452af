use std::fs::File;
use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, warn};

use super::columns::ColumnIndex;

pub const GENE_COLUMN: &str = "KRAB-ZNF";
pub const TE_COLUMN: &str = "Gene";
pub const COEF_COLUMN: &str = "coef";
pub const EXP_COLUMN: &str = "exp";

const REQUIRED_COLUMNS: [&str; 4] = [GENE_COLUMN, TE_COLUMN, COEF_COLUMN, EXP_COLUMN];

#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum ExpressionDirection {
    UpRegulated,
    DownRegulated,
    Other(String),
}

impl ExpressionDirection {
    pub fn parse(raw: &str) -> Self {
        match raw.trim() {
            "up-regulated" => Self::UpRegulated,
            "down-regulated" => Self::DownRegulated,
            other => Self::Other(other.to_owned()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Self::UpRegulated => "up-regulated",
            Self::DownRegulated => "down-regulated",
            Self::Other(raw) => raw.as_str(),
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct CorrelationRecord {
    pub gene: String,
    pub te: String,
    pub coef: f64,
    pub direction: ExpressionDirection,
}

#[cfg(test)]
impl CorrelationRecord {
    pub fn new(gene: impl Into<String>, te: impl Into<String>, coef: f64, exp: &str) -> Self {
        Self {
            gene: gene.into(),
            te: te.into(),
            coef,
            direction: ExpressionDirection::parse(exp),
        }
    }
}

pub fn load_correlations(path: &Path) -> Result<Vec<CorrelationRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open correlation table {}", path.display()))?;
    read_correlations(file)
        .with_context(|| format!("failed to parse correlation table {}", path.display()))
}

pub fn read_correlations<R: Read>(reader: R) -> Result<Vec<CorrelationRecord>> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().context("missing header row")?.clone();
    let columns = ColumnIndex::from_headers(&headers);

    for missing in columns.missing(&REQUIRED_COLUMNS) {
        warn!("correlation table has no `{missing}` column; filling it with defaults");
    }

    let mut records = Vec::new();
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV row {}", row + 1))?;
        records.push(CorrelationRecord {
            gene: columns.text(&record, GENE_COLUMN),
            te: columns.text(&record, TE_COLUMN),
            coef: columns.number(&record, COEF_COLUMN),
            direction: ExpressionDirection::parse(&columns.text(&record, EXP_COLUMN)),
        });
    }

    debug!("read {} correlation records", records.len());
    Ok(records)
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const TABLE: &str = "\
,KRAB-ZNF,Gene,coef,exp
0,ZNF91,L1PA2,0.81,up-regulated
1,ZNF93,AluSx,-0.34,down-regulated
2,ZNF93,HERVK,oops,sideways
";

    #[test]
    fn reads_index_column_table() {
        let records = read_correlations(TABLE.as_bytes()).unwrap();

        assert_eq!(records.len(), 3);
        assert_eq!(
            records[0],
            CorrelationRecord::new("ZNF91", "L1PA2", 0.81, "up-regulated")
        );
        assert_eq!(records[1].direction, ExpressionDirection::DownRegulated);
        assert_eq!(records[2].coef, 0.0);
        assert_eq!(
            records[2].direction,
            ExpressionDirection::Other("sideways".to_owned())
        );
    }

    #[test]
    fn missing_columns_are_synthesized() {
        let records = read_correlations("KRAB-ZNF,Gene\nZNF91,L1PA2\n".as_bytes()).unwrap();

        assert_eq!(records.len(), 1);
        assert_eq!(records[0].coef, 0.0);
        assert_eq!(
            records[0].direction,
            ExpressionDirection::Other(String::new())
        );
    }

    #[test]
    fn loads_from_disk_and_reports_missing_files() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(TABLE.as_bytes()).unwrap();

        let records = load_correlations(file.path()).unwrap();
        assert_eq!(records.len(), 3);

        let missing = load_correlations(Path::new("/definitely/not/here.csv"));
        assert!(missing.is_err());
    }
}
