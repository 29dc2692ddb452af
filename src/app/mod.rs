use std::collections::{BTreeMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use clap::ValueEnum;
use eframe::egui::{self, Context, Vec2};
use log::{info, warn};

use crate::data::{
    CorrelationRecord, HitField, HitRecord, HitSchema, HitTable, LoadedHits, Upload,
    load_correlations, load_genomic_hits, load_hits,
};
use crate::filter::{HitFilter, NetworkFilter, column_options};
use crate::network::{NetworkView, run_pipeline};
use crate::plot::{CategoryCounts, HitSummary, StripPlot, summarize};

mod graph;
mod render_utils;
mod ui;

pub const DEFAULT_EXPORT_FILE: &str = "genomic_data_filtered.csv";

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum Dashboard {
    #[default]
    Network,
    Motifs,
    Hits,
}

impl Dashboard {
    pub const ALL: [Self; 3] = [Self::Network, Self::Motifs, Self::Hits];

    pub fn title(self) -> &'static str {
        match self {
            Self::Network => "Correlation network",
            Self::Motifs => "Motif features",
            Self::Hits => "Genomic hits",
        }
    }
}

pub struct AppConfig {
    pub network_csv: PathBuf,
    pub motifs_csv: PathBuf,
    pub hits_csv: PathBuf,
    pub dashboard: Dashboard,
    pub network_filter: NetworkFilter,
}

pub struct AtlasApp {
    dashboard: Dashboard,
    network: NetworkModel,
    motifs: MotifModel,
    hits: HitsModel,
}

struct NetworkModel {
    source: PathBuf,
    records: Vec<CorrelationRecord>,
    load_error: Option<String>,
    filter: NetworkFilter,
    view: NetworkView,
    search: String,
    search_match_cache: Option<SearchMatchCache>,
    pan: Vec2,
    zoom: f32,
}

struct SearchMatchCache {
    query: String,
    matches: Arc<HashSet<usize>>,
}

struct MotifModel {
    source: PathBuf,
    table: HitTable,
    load_error: Option<String>,
    options: BTreeMap<HitField, Vec<String>>,
    pending: HitFilter,
    view: TableView,
}

struct TableView {
    rows: Vec<HitRecord>,
    filtered: bool,
    strip: StripPlot,
}

struct HitsModel {
    default_path: PathBuf,
    loaded: LoadedHits,
    options: BTreeMap<HitField, Vec<String>>,
    filter: HitFilter,
    pvalue_max: f64,
    length_min: i64,
    view: Option<HitsView>,
    export_path: String,
    export_status: Option<Result<String, String>>,
}

struct HitsView {
    filter: HitFilter,
    rows: Vec<HitRecord>,
    counts: CategoryCounts,
    summary: Option<HitSummary>,
}

const MOTIF_FILTER_FIELDS: [HitField; 7] = [
    HitField::Chrom,
    HitField::Motif,
    HitField::Te,
    HitField::Family,
    HitField::Class,
    HitField::Species,
    HitField::Gene,
];

const HIT_FILTER_FIELDS: [HitField; 7] = [
    HitField::Chrom,
    HitField::Motif,
    HitField::Strand,
    HitField::Class,
    HitField::Family,
    HitField::Gene,
    HitField::Species,
];

fn option_lists(rows: &[HitRecord], fields: &[HitField]) -> BTreeMap<HitField, Vec<String>> {
    fields
        .iter()
        .map(|field| (*field, column_options(rows, *field)))
        .collect()
}

impl AtlasApp {
    pub fn new(cc: &eframe::CreationContext<'_>, config: AppConfig) -> Self {
        cc.egui_ctx.set_visuals(egui::Visuals::light());

        Self {
            dashboard: config.dashboard,
            network: NetworkModel::load(config.network_csv, config.network_filter),
            motifs: MotifModel::load(config.motifs_csv),
            hits: HitsModel::load(config.hits_csv),
        }
    }

    fn receive_dropped_files(&mut self, ctx: &Context) {
        let dropped = ctx.input(|input| input.raw.dropped_files.clone());
        let Some(file) = dropped.into_iter().next() else {
            return;
        };

        let name = file
            .path
            .as_ref()
            .and_then(|path| path.file_name())
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| file.name.clone());

        let bytes = match (&file.bytes, &file.path) {
            (Some(bytes), _) => Ok(bytes.to_vec()),
            (None, Some(path)) => std::fs::read(path).map_err(|error| error.to_string()),
            (None, None) => Err("dropped file has no contents".to_owned()),
        };

        match bytes {
            Ok(bytes) => self.hits.load_upload(&name, &bytes),
            Err(error) => {
                warn!("failed to read dropped file {name}: {error}");
                self.hits.loaded.error = Some(format!("Error loading data: {error}"));
            }
        }
        self.dashboard = Dashboard::Hits;
    }
}

impl NetworkModel {
    fn load(source: PathBuf, filter: NetworkFilter) -> Self {
        let (records, load_error) = match load_correlations(&source) {
            Ok(records) => {
                info!(
                    "loaded {} correlations from {}",
                    records.len(),
                    source.display()
                );
                (records, None)
            }
            Err(error) => {
                warn!("{error:#}");
                (Vec::new(), Some(format!("Error loading data: {error:#}")))
            }
        };
        let view = run_pipeline(&records, filter);

        Self {
            source,
            records,
            load_error,
            filter,
            view,
            search: String::new(),
            search_match_cache: None,
            pan: Vec2::ZERO,
            zoom: 1.0,
        }
    }

    fn refresh(&mut self) {
        if self.view.filter == self.filter {
            return;
        }
        self.view = run_pipeline(&self.records, self.filter);
        self.search_match_cache = None;
    }
}

impl TableView {
    fn heading(&self) -> String {
        if self.filtered {
            format!("Filtered Results: {} rows", self.rows.len())
        } else {
            format!("Total Results: {} rows", self.rows.len())
        }
    }
}

impl MotifModel {
    fn load(source: PathBuf) -> Self {
        let (table, load_error) = match load_hits(&source, HitSchema::MotifFeatures) {
            Ok(table) => {
                info!(
                    "loaded {} motif features from {}",
                    table.len(),
                    source.display()
                );
                (table, None)
            }
            Err(error) => {
                warn!("{error:#}");
                (
                    HitTable::empty(HitSchema::MotifFeatures),
                    Some(format!("Error loading data: {error:#}")),
                )
            }
        };

        let options = option_lists(&table.rows, &MOTIF_FILTER_FIELDS);
        let view = TableView {
            strip: StripPlot::midpoints(&table.rows),
            rows: table.rows.clone(),
            filtered: false,
        };

        Self {
            source,
            table,
            load_error,
            options,
            pending: HitFilter::default(),
            view,
        }
    }

    fn apply_filters(&mut self) {
        let rows = self.pending.apply(&self.table.rows);
        self.view = TableView {
            strip: StripPlot::midpoints(&rows),
            rows,
            filtered: true,
        };
    }
}

impl HitsModel {
    fn load(default_path: PathBuf) -> Self {
        let loaded = load_genomic_hits(None, &default_path);
        Self::from_loaded(default_path, loaded)
    }

    fn from_loaded(default_path: PathBuf, loaded: LoadedHits) -> Self {
        Self {
            options: option_lists(&loaded.table.rows, &HIT_FILTER_FIELDS),
            default_path,
            loaded,
            filter: HitFilter::default(),
            pvalue_max: 0.0,
            length_min: 0,
            view: None,
            export_path: DEFAULT_EXPORT_FILE.to_owned(),
            export_status: None,
        }
    }

    fn load_upload(&mut self, name: &str, bytes: &[u8]) {
        let loaded = load_genomic_hits(Some(Upload { name, bytes }), &self.default_path);
        let export_path = std::mem::take(&mut self.export_path);
        *self = Self::from_loaded(std::mem::take(&mut self.default_path), loaded);
        self.export_path = export_path;
    }

    fn reset_filters(&mut self) {
        self.filter.clear();
        self.pvalue_max = 0.0;
        self.length_min = 0;
    }

    fn refresh_view(&mut self) {
        self.filter.pvalue_max = (self.pvalue_max > 0.0).then_some(self.pvalue_max);
        self.filter.length_min = (self.length_min > 0).then_some(self.length_min);

        let stale = self
            .view
            .as_ref()
            .is_none_or(|view| view.filter != self.filter);
        if !stale {
            return;
        }

        let rows = self.filter.apply(&self.loaded.table.rows);
        self.view = Some(HitsView {
            filter: self.filter.clone(),
            counts: CategoryCounts::by_chromosome(&rows),
            summary: summarize(&rows),
            rows,
        });
    }
}

impl eframe::App for AtlasApp {
    fn update(&mut self, ctx: &Context, _frame: &mut eframe::Frame) {
        self.receive_dropped_files(ctx);
        self.show(ctx);
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    const MOTIF_TABLE: &str = "\
,CHROM,START,END,MOTIF,PVALUE,TE,FAMILY,CLASS,SPECIES,GENE
0,chr1,100,120,MA1,1e-9,L1PA2,L1,LINE,Human,ZNF91
1,chr2,500,520,MA2,2e-9,AluSx,Alu,SINE,Human,ZNF93
";

    const HIT_TABLE: &str = "\
chr,start,end,motif,strand,pvalue,tefamily,class,length,gene,species
chr1,100,121,MA1,+,1e-9,L1PA2,L1,21,G1,Human
chr1,200,218,MA1,-,5e-9,AluSx,SINE,18,G2,Human
chr2,300,320,MA2,+,3e-5,L1PA2,L1,20,G3,Human
chr10,400,419,MA2,+,7e-4,HAL1,L1,19,G4,Human
";

    fn table_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    fn visible_rows(hits: &mut HitsModel) -> usize {
        hits.refresh_view();
        hits.view.as_ref().map_or(0, |view| view.rows.len())
    }

    #[test]
    fn motif_selections_take_effect_on_apply() {
        let file = table_file(MOTIF_TABLE);
        let mut motifs = MotifModel::load(file.path().to_path_buf());

        assert!(motifs.load_error.is_none());
        assert_eq!(motifs.view.heading(), "Total Results: 2 rows");

        motifs.pending.toggle(HitField::Motif, "MA2", true);
        assert!(!motifs.view.filtered);
        assert_eq!(motifs.view.rows.len(), 2);

        motifs.apply_filters();
        assert_eq!(motifs.view.heading(), "Filtered Results: 1 rows");
        assert_eq!(motifs.view.rows[0].motif, "MA2");
        assert_eq!(motifs.view.strip.categories, ["chr2"]);
    }

    #[test]
    fn motif_apply_replaces_the_cached_view() {
        let file = table_file(MOTIF_TABLE);
        let mut motifs = MotifModel::load(file.path().to_path_buf());

        motifs.pending.toggle(HitField::Chrom, "chr1", true);
        motifs.apply_filters();
        assert_eq!(motifs.view.rows.len(), 1);

        motifs.pending.clear();
        motifs.apply_filters();
        assert!(motifs.view.filtered);
        assert_eq!(motifs.view.heading(), "Filtered Results: 2 rows");
        assert_eq!(motifs.view.strip.categories, ["chr1", "chr2"]);
    }

    #[test]
    fn missing_motif_table_is_reported_not_fatal() {
        let motifs = MotifModel::load(PathBuf::from("/no/such/df_dashboard.csv"));

        assert!(
            motifs
                .load_error
                .as_deref()
                .is_some_and(|error| error.starts_with("Error loading data"))
        );
        assert!(motifs.view.rows.is_empty());
        assert_eq!(motifs.view.heading(), "Total Results: 0 rows");
    }

    #[test]
    fn zero_thresholds_do_not_filter() {
        let file = table_file(HIT_TABLE);
        let mut hits = HitsModel::load(file.path().to_path_buf());
        assert_eq!(visible_rows(&mut hits), 4);
        assert_eq!(hits.filter.pvalue_max, None);
        assert_eq!(hits.filter.length_min, None);

        hits.pvalue_max = 5e-9;
        assert_eq!(visible_rows(&mut hits), 2);

        hits.pvalue_max = 0.0;
        hits.length_min = 19;
        assert_eq!(visible_rows(&mut hits), 3);

        hits.length_min = 0;
        assert_eq!(visible_rows(&mut hits), 4);
        assert!(hits.filter.is_empty());
    }

    #[test]
    fn hit_view_follows_single_selections() {
        let file = table_file(HIT_TABLE);
        let mut hits = HitsModel::load(file.path().to_path_buf());

        hits.filter.select_single(HitField::Chrom, Some("chr1"));
        assert_eq!(visible_rows(&mut hits), 2);
        let view = hits.view.as_ref().unwrap();
        assert_eq!(view.counts.bars.len(), 1);
        assert_eq!(view.summary.as_ref().map(|summary| summary.total), Some(2));

        hits.reset_filters();
        assert_eq!(visible_rows(&mut hits), 4);
    }

    #[test]
    fn failed_upload_clears_table_and_keeps_export_path() {
        let mut hits = HitsModel::load(PathBuf::from("/no/such/my.csv"));
        assert_eq!(hits.loaded.table.len(), 5);

        hits.export_path = "x.csv".to_owned();
        hits.filter.select_single(HitField::Chrom, Some("chr2"));
        hits.load_upload("broken.csv", &[0xff, 0xfe, b'\n', 0xff]);

        assert!(hits.loaded.table.is_empty());
        assert!(
            hits.loaded
                .error
                .as_deref()
                .is_some_and(|error| error.starts_with("Error loading data"))
        );
        assert_eq!(hits.export_path, "x.csv");
        assert_eq!(hits.default_path, PathBuf::from("/no/such/my.csv"));
        assert!(hits.filter.is_empty());
        assert_eq!(visible_rows(&mut hits), 0);
    }

    #[test]
    fn upload_replaces_table_and_options() {
        let mut hits = HitsModel::load(PathBuf::from("/no/such/my.csv"));

        hits.load_upload("dropped.csv", HIT_TABLE.as_bytes());

        assert!(hits.loaded.error.is_none());
        assert_eq!(hits.loaded.table.len(), 4);
        assert_eq!(hits.options[&HitField::Chrom], ["chr1", "chr2", "chr10"]);
    }
}
