use std::fs::File;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use log::{debug, info, warn};

use super::columns::ColumnIndex;

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum HitField {
    Chrom,
    Start,
    End,
    Motif,
    Strand,
    Pvalue,
    Te,
    Family,
    Class,
    Length,
    Gene,
    Species,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum HitSchema {
    MotifFeatures,
    GenomicHits,
}

const MOTIF_FEATURE_FIELDS: [HitField; 10] = [
    HitField::Chrom,
    HitField::Start,
    HitField::End,
    HitField::Motif,
    HitField::Pvalue,
    HitField::Te,
    HitField::Family,
    HitField::Class,
    HitField::Species,
    HitField::Gene,
];

const GENOMIC_HIT_FIELDS: [HitField; 11] = [
    HitField::Chrom,
    HitField::Start,
    HitField::End,
    HitField::Motif,
    HitField::Strand,
    HitField::Pvalue,
    HitField::Family,
    HitField::Class,
    HitField::Length,
    HitField::Gene,
    HitField::Species,
];

const GENOMIC_HIT_ALIASES: [(&str, &str); 3] = [
    ("chromosome", "chr"),
    ("te_family", "tefamily"),
    ("classification", "class"),
];

impl HitSchema {
    pub fn fields(self) -> &'static [HitField] {
        match self {
            Self::MotifFeatures => &MOTIF_FEATURE_FIELDS,
            Self::GenomicHits => &GENOMIC_HIT_FIELDS,
        }
    }

    pub fn column_name(self, field: HitField) -> &'static str {
        match self {
            Self::MotifFeatures => match field {
                HitField::Chrom => "CHROM",
                HitField::Start => "START",
                HitField::End => "END",
                HitField::Motif => "MOTIF",
                HitField::Strand => "STRAND",
                HitField::Pvalue => "PVALUE",
                HitField::Te => "TE",
                HitField::Family => "FAMILY",
                HitField::Class => "CLASS",
                HitField::Length => "LENGTH",
                HitField::Gene => "GENE",
                HitField::Species => "SPECIES",
            },
            Self::GenomicHits => match field {
                HitField::Chrom => "chr",
                HitField::Start => "start",
                HitField::End => "end",
                HitField::Motif => "motif",
                HitField::Strand => "strand",
                HitField::Pvalue => "pvalue",
                HitField::Te => "te",
                HitField::Family => "tefamily",
                HitField::Class => "class",
                HitField::Length => "length",
                HitField::Gene => "gene",
                HitField::Species => "species",
            },
        }
    }

    pub fn display_name(self, field: HitField) -> &'static str {
        match (self, field) {
            (Self::MotifFeatures, HitField::Family) => "Family ID",
            (Self::MotifFeatures, HitField::Class) => "Class ID",
            (Self::MotifFeatures, _) => self.column_name(field),
            (Self::GenomicHits, HitField::Chrom) => "CHR",
            (Self::GenomicHits, HitField::Pvalue) => "P-VALUE",
            (Self::GenomicHits, HitField::Family) => "TE FAMILY",
            (Self::GenomicHits, _) => match field {
                HitField::Start => "START",
                HitField::End => "END",
                HitField::Motif => "MOTIF",
                HitField::Strand => "STRAND",
                HitField::Te => "TE",
                HitField::Class => "CLASS",
                HitField::Length => "LENGTH",
                HitField::Gene => "GENE",
                HitField::Species => "SPECIES",
                HitField::Chrom | HitField::Pvalue | HitField::Family => self.column_name(field),
            },
        }
    }

    fn aliases(self) -> &'static [(&'static str, &'static str)] {
        match self {
            Self::MotifFeatures => &[],
            Self::GenomicHits => &GENOMIC_HIT_ALIASES,
        }
    }

    fn has_index_column(self) -> bool {
        matches!(self, Self::MotifFeatures)
    }

    fn drops_incomplete_rows(self) -> bool {
        matches!(self, Self::GenomicHits)
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct HitRecord {
    pub chrom: String,
    pub start: i64,
    pub end: i64,
    pub motif: String,
    pub strand: String,
    pub pvalue: f64,
    pub te: String,
    pub family: String,
    pub class: String,
    pub length: i64,
    pub gene: String,
    pub species: String,
    pub extras: Vec<String>,
}

impl HitRecord {
    pub fn category(&self, field: HitField) -> Option<&str> {
        let value = match field {
            HitField::Chrom => &self.chrom,
            HitField::Motif => &self.motif,
            HitField::Strand => &self.strand,
            HitField::Te => &self.te,
            HitField::Family => &self.family,
            HitField::Class => &self.class,
            HitField::Gene => &self.gene,
            HitField::Species => &self.species,
            HitField::Start | HitField::End | HitField::Pvalue | HitField::Length => return None,
        };
        Some(value.as_str())
    }

    pub fn raw_value(&self, field: HitField) -> String {
        match field {
            HitField::Start => self.start.to_string(),
            HitField::End => self.end.to_string(),
            HitField::Pvalue => format!("{:e}", self.pvalue),
            HitField::Length => self.length.to_string(),
            _ => self.category(field).unwrap_or_default().to_owned(),
        }
    }

    pub fn midpoint(&self) -> f64 {
        (self.start as f64 + self.end as f64) / 2.0
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct HitTable {
    pub schema: HitSchema,
    pub extra_headers: Vec<String>,
    pub rows: Vec<HitRecord>,
}

impl HitTable {
    pub fn empty(schema: HitSchema) -> Self {
        Self {
            schema,
            extra_headers: Vec::new(),
            rows: Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

pub fn load_hits(path: &Path, schema: HitSchema) -> Result<HitTable> {
    let file =
        File::open(path).with_context(|| format!("failed to open hit table {}", path.display()))?;
    read_hits(file, schema).with_context(|| format!("failed to parse hit table {}", path.display()))
}

pub fn read_hits<R: Read>(reader: R, schema: HitSchema) -> Result<HitTable> {
    let mut reader = csv::ReaderBuilder::new().flexible(true).from_reader(reader);
    let headers = reader.headers().context("missing header row")?.clone();
    let columns = ColumnIndex::from_headers(&headers).with_aliases(schema.aliases());

    let required = schema
        .fields()
        .iter()
        .map(|field| schema.column_name(*field))
        .collect::<Vec<_>>();
    for missing in columns.missing(&required) {
        warn!("hit table has no `{missing}` column; filling it with defaults");
    }

    let known = |name: &str| {
        HitSchema::fields(schema)
            .iter()
            .any(|field| schema.column_name(*field) == name)
    };
    let extra_positions = columns
        .headers()
        .iter()
        .enumerate()
        .filter(|(index, name)| !(schema.has_index_column() && *index == 0) && !known(name))
        .map(|(index, _)| index)
        .collect::<Vec<_>>();
    let extra_headers = extra_positions
        .iter()
        .map(|index| columns.headers()[*index].clone())
        .collect::<Vec<_>>();

    let has = |field: HitField| columns.position(schema.column_name(field)).is_some();
    let text = |record: &csv::StringRecord, field: HitField| {
        if schema.fields().contains(&field) {
            columns.text(record, schema.column_name(field))
        } else {
            String::new()
        }
    };
    let integer = |record: &csv::StringRecord, field: HitField| {
        if has(field) {
            columns.integer(record, schema.column_name(field))
        } else {
            0
        }
    };

    let mut rows = Vec::new();
    let mut dropped = 0usize;
    for (row, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("malformed CSV row {}", row + 1))?;
        let hit = HitRecord {
            chrom: text(&record, HitField::Chrom),
            start: integer(&record, HitField::Start),
            end: integer(&record, HitField::End),
            motif: text(&record, HitField::Motif),
            strand: text(&record, HitField::Strand),
            pvalue: columns.number(&record, schema.column_name(HitField::Pvalue)),
            te: text(&record, HitField::Te),
            family: text(&record, HitField::Family),
            class: text(&record, HitField::Class),
            length: integer(&record, HitField::Length),
            gene: text(&record, HitField::Gene),
            species: text(&record, HitField::Species),
            extras: extra_positions
                .iter()
                .map(|index| record.get(*index).unwrap_or_default().trim().to_owned())
                .collect(),
        };

        if schema.drops_incomplete_rows()
            && (hit.chrom.is_empty() || hit.start <= 0 || hit.end <= 0)
        {
            dropped += 1;
            continue;
        }
        rows.push(hit);
    }

    if dropped > 0 {
        debug!("dropped {dropped} hits without chromosome or coordinates");
    }
    debug!("read {} hits", rows.len());

    Ok(HitTable {
        schema,
        extra_headers,
        rows,
    })
}

const SAMPLE_HITS: &str = "\
chr,start,end,motif,strand,pvalue,tefamily,class,length,gene,species
chr2,227070450,227070471,MA1987.1,-,1.08e-09,HAL1,L1,21,SAMPLE1,Human
chr4,179300015,179300036,MA1987.1,+,2.38e-09,L1PA8A,L1,21,SAMPLE2,Human
chr1,123456789,123456810,MA1988.2,+,3.45e-08,L1PA2,L1,21,SAMPLE3,Human
chr3,98765432,98765453,MA1989.3,-,1.23e-07,AluSx,SINE,18,SAMPLE4,Human
chr5,87654321,87654342,MA1987.1,+,5.67e-09,L1PA8A,L1,21,SAMPLE5,Human
";

pub fn sample_hits() -> HitTable {
    read_hits(SAMPLE_HITS.as_bytes(), HitSchema::GenomicHits)
        .unwrap_or_else(|_| HitTable::empty(HitSchema::GenomicHits))
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DataSource {
    Uploaded { name: String },
    AutoLoaded { path: PathBuf },
    Sample,
}

impl DataSource {
    pub fn describe(&self, rows: usize) -> String {
        match self {
            Self::Uploaded { name } => format!("Loaded {rows} records from uploaded file {name}"),
            Self::AutoLoaded { path } => {
                format!("Auto-loaded {} with {rows} records", path.display())
            }
            Self::Sample => "Using sample data (no input file found)".to_owned(),
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct Upload<'a> {
    pub name: &'a str,
    pub bytes: &'a [u8],
}

#[derive(Clone, Debug)]
pub struct LoadedHits {
    pub table: HitTable,
    pub source: DataSource,
    pub error: Option<String>,
}

/// Loads genomic hits from an upload, else from `default_path` if it exists,
/// else falls back to [`sample_hits`]. A failed read yields an empty table
/// plus the error message instead of an `Err`.
pub fn load_genomic_hits(upload: Option<Upload<'_>>, default_path: &Path) -> LoadedHits {
    let (source, result) = if let Some(upload) = upload {
        let result = read_hits(upload.bytes, HitSchema::GenomicHits)
            .with_context(|| format!("failed to parse uploaded file {}", upload.name));
        (
            DataSource::Uploaded {
                name: upload.name.to_owned(),
            },
            result,
        )
    } else if default_path.exists() {
        (
            DataSource::AutoLoaded {
                path: default_path.to_path_buf(),
            },
            load_hits(default_path, HitSchema::GenomicHits),
        )
    } else {
        info!(
            "{} not found; using sample genomic hits",
            default_path.display()
        );
        (DataSource::Sample, Ok(sample_hits()))
    };

    match result {
        Ok(table) => {
            info!("{}", source.describe(table.len()));
            LoadedHits {
                table,
                source,
                error: None,
            }
        }
        Err(error) => {
            warn!("{error:#}");
            LoadedHits {
                table: HitTable::empty(HitSchema::GenomicHits),
                source,
                error: Some(format!("Error loading data: {error:#}")),
            }
        }
    }
}

pub fn write_hits_csv<W: Write>(
    writer: W,
    schema: HitSchema,
    extra_headers: &[String],
    rows: &[HitRecord],
) -> Result<()> {
    let mut writer = csv::Writer::from_writer(writer);

    let mut header = schema
        .fields()
        .iter()
        .map(|field| schema.column_name(*field).to_owned())
        .collect::<Vec<_>>();
    header.extend(extra_headers.iter().cloned());
    writer.write_record(&header)?;

    for row in rows {
        let mut values = schema
            .fields()
            .iter()
            .map(|field| row.raw_value(*field))
            .collect::<Vec<_>>();
        values.extend(row.extras.iter().cloned());
        writer.write_record(&values)?;
    }

    writer.flush().context("failed to flush CSV output")?;
    Ok(())
}

pub fn export_hits(
    path: &Path,
    schema: HitSchema,
    extra_headers: &[String],
    rows: &[HitRecord],
) -> Result<()> {
    let file = File::create(path)
        .with_context(|| format!("failed to create export file {}", path.display()))?;
    write_hits_csv(file, schema, extra_headers, rows)
        .with_context(|| format!("failed to write export file {}", path.display()))?;
    info!("exported {} rows to {}", rows.len(), path.display());
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MOTIF_TABLE: &str = "\
,CHROM,START,END,MOTIF,PVALUE,TE,FAMILY,CLASS,SPECIES,GENE,SCORE
0,chr1,100,121,MA1987.1,1.2e-9,L1PA2,L1,LINE,Human,ZNF91,17.5
1,chr10,5000,5021,MA1988.2,bad,AluSx,Alu,SINE,Human,ZNF93,12.0
2,,0,0,MA1988.2,3e-5,AluSx,Alu,SINE,Human,ZNF93,9.1
";

    const GENOMIC_TABLE: &str = "\
chromosome , start,end,motif,strand,pvalue,te_family,classification,gene,species
chr2,227070450,227070471,MA1987.1,-,1.08e-09,HAL1,L1,ZNF1,Human
chr4,0,179300036,MA1987.1,+,2.38e-09,L1PA8A,L1,ZNF2,Human
,10,20,MA1987.1,+,2.38e-09,L1PA8A,L1,ZNF2,Human
chr5,87654321,87654342,MA1987.1,+,x,L1PA8A,L1,,Human
";

    #[test]
    fn motif_features_keep_every_row_and_extra_columns() {
        let table = read_hits(MOTIF_TABLE.as_bytes(), HitSchema::MotifFeatures).unwrap();

        assert_eq!(table.len(), 3);
        assert_eq!(table.extra_headers, ["SCORE"]);
        assert_eq!(table.rows[0].te, "L1PA2");
        assert_eq!(table.rows[0].extras, ["17.5"]);
        assert_eq!(table.rows[1].pvalue, 0.0);
        assert_eq!(table.rows[2].chrom, "");
        assert_eq!(table.rows[0].midpoint(), 110.5);
    }

    #[test]
    fn genomic_hits_apply_aliases_and_drop_incomplete_rows() {
        let table = read_hits(GENOMIC_TABLE.as_bytes(), HitSchema::GenomicHits).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].chrom, "chr2");
        assert_eq!(table.rows[0].family, "HAL1");
        assert_eq!(table.rows[0].class, "L1");
        assert_eq!(table.rows[0].length, 0);
        assert_eq!(table.rows[1].chrom, "chr5");
        assert_eq!(table.rows[1].pvalue, 0.0);
        assert_eq!(table.rows[1].gene, "");
        assert!(table.extra_headers.is_empty());
    }

    #[test]
    fn fallback_prefers_upload_then_path_then_sample() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(GENOMIC_TABLE.as_bytes()).unwrap();

        let uploaded = load_genomic_hits(
            Some(Upload {
                name: "dropped.csv",
                bytes: "chr,start,end\nchr9,5,9\n".as_bytes(),
            }),
            file.path(),
        );
        assert_eq!(
            uploaded.source,
            DataSource::Uploaded {
                name: "dropped.csv".to_owned()
            }
        );
        assert_eq!(uploaded.table.len(), 1);

        let auto = load_genomic_hits(None, file.path());
        assert!(matches!(auto.source, DataSource::AutoLoaded { .. }));
        assert_eq!(auto.table.len(), 2);
        assert!(auto.error.is_none());

        let sample = load_genomic_hits(None, Path::new("/no/such/my.csv"));
        assert_eq!(sample.source, DataSource::Sample);
        assert_eq!(sample.table, sample_hits());
        assert_eq!(sample.table.len(), 5);
    }

    #[test]
    fn unreadable_upload_yields_empty_table_and_message() {
        let loaded = load_genomic_hits(
            Some(Upload {
                name: "broken.csv",
                bytes: &[0xff, 0xfe, b'\n', 0xff],
            }),
            Path::new("/no/such/my.csv"),
        );

        assert!(loaded.table.is_empty());
        assert!(loaded.error.is_some());
    }

    #[test]
    fn export_writes_raw_values_without_index() {
        let table = sample_hits();
        let mut buffer = Vec::new();
        write_hits_csv(
            &mut buffer,
            table.schema,
            &table.extra_headers,
            &table.rows[..1],
        )
        .unwrap();

        let written = String::from_utf8(buffer).unwrap();
        let mut lines = written.lines();
        assert_eq!(
            lines.next(),
            Some("chr,start,end,motif,strand,pvalue,tefamily,class,length,gene,species")
        );
        assert_eq!(
            lines.next(),
            Some("chr2,227070450,227070471,MA1987.1,-,1.08e-9,HAL1,L1,21,SAMPLE1,Human")
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn exported_pvalues_use_exponent_form_and_read_back() {
        let table = sample_hits();
        let mut buffer = Vec::new();
        write_hits_csv(&mut buffer, table.schema, &table.extra_headers, &table.rows).unwrap();

        let written = String::from_utf8(buffer.clone()).unwrap();
        assert!(written.contains(",3.45e-8,"));
        assert!(!written.contains("0.0000"));

        let reread = read_hits(buffer.as_slice(), HitSchema::GenomicHits).unwrap();
        assert_eq!(reread.rows, table.rows);
    }
}
