use super::index::{AnnotationIndex, Finding};
use super::parse::{first_finding_category, parse_bi_rads};
use crate::error::{Result, TriageError};
use crate::types::{parse_view_code, FindingCategory, Laterality, ViewPosition};
use log::{debug, info, warn};
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Row of the breast-level table; extra columns are ignored
#[derive(Debug, Deserialize)]
struct BreastRow {
    image_id: String,
    #[serde(default)]
    view_position: Option<String>,
    #[serde(default)]
    laterality: Option<String>,
    #[serde(default)]
    breast_birads: Option<String>,
    #[serde(default)]
    breast_density: Option<String>,
}

/// Row of the finding-level table; extra columns are ignored
#[derive(Debug, Deserialize)]
struct FindingRow {
    image_id: String,
    #[serde(default)]
    finding_categories: Option<String>,
    #[serde(default)]
    finding_birads: Option<String>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    xmin: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ymin: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    xmax: Option<f64>,
    #[serde(default, deserialize_with = "csv::invalid_option")]
    ymax: Option<f64>,
}

impl FindingRow {
    /// Box coordinates when all four are present and finite
    fn coordinates(&self) -> Option<[f64; 4]> {
        let coords = [self.xmin?, self.ymin?, self.xmax?, self.ymax?];
        if coords.iter().all(|v| v.is_finite()) {
            Some(coords)
        } else {
            None
        }
    }
}

/// Builds an [`AnnotationIndex`] from the reference dataset tables
///
/// Either table may be loaded on its own; rows of both tables are merged by
/// `image_id`.
#[derive(Debug, Default)]
pub struct AnnotationLoader {
    index: AnnotationIndex,
    skipped_rows: usize,
}

impl AnnotationLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Loads the breast-level table (view, laterality, BI-RADS, density)
    ///
    /// Empty view or laterality cells leave the record without a view.
    ///
    /// # Errors
    ///
    /// Returns [`TriageError::AnnotationError`] if a view or laterality cell
    /// holds text that is neither CC/MLO nor L/R.
    ///
    /// # Returns
    ///
    /// Number of rows merged into the index
    pub fn load_breast_levels<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut loaded = 0;

        for row in csv_reader.deserialize::<BreastRow>() {
            let row = row?;
            let image_id = row.image_id.trim();
            if image_id.is_empty() {
                self.skipped_rows += 1;
                continue;
            }

            let (view_position, laterality) = parse_view_columns(
                image_id,
                row.view_position.as_deref(),
                row.laterality.as_deref(),
            )?;
            if view_position.is_none() || laterality.is_none() {
                debug!("Incomplete view for image {}", image_id);
            }

            let record = self.index.entry(image_id);
            record.view_position = view_position;
            record.laterality = laterality;
            record.breast_bi_rads = row.breast_birads.as_deref().and_then(parse_bi_rads);
            record.breast_density = non_empty(row.breast_density);
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Loads the finding-level table
    ///
    /// Rows without four finite box coordinates (for example images with no
    /// finding) are skipped.
    ///
    /// # Returns
    ///
    /// Number of findings added to the index
    pub fn load_findings<R: Read>(&mut self, reader: R) -> Result<usize> {
        let mut csv_reader = csv::Reader::from_reader(reader);
        let mut loaded = 0;

        for row in csv_reader.deserialize::<FindingRow>() {
            let row = row?;
            let image_id = row.image_id.trim();
            let coords = match row.coordinates() {
                Some(coords) if !image_id.is_empty() => coords,
                _ => {
                    self.skipped_rows += 1;
                    continue;
                }
            };

            let label = row
                .finding_categories
                .as_deref()
                .and_then(first_finding_category)
                .unwrap_or_else(|| FindingCategory::Unknown.label().to_string());
            let bi_rads = row.finding_birads.as_deref().and_then(parse_bi_rads);

            self.index
                .entry(image_id)
                .findings
                .push(Finding::new(label, bi_rads, coords));
            loaded += 1;
        }

        Ok(loaded)
    }

    /// Loads the breast-level table from a CSV file
    pub fn load_breast_level_csv(&mut self, path: &Path) -> Result<usize> {
        self.load_breast_levels(File::open(path)?)
    }

    /// Loads the finding-level table from a CSV file
    pub fn load_finding_csv(&mut self, path: &Path) -> Result<usize> {
        self.load_findings(File::open(path)?)
    }

    /// Number of rows ignored so far
    pub fn skipped_rows(&self) -> usize {
        self.skipped_rows
    }

    pub fn finish(self) -> AnnotationIndex {
        info!(
            "Annotation index built: {} image(s), {} finding(s), {} row(s) skipped",
            self.index.len(),
            self.index.finding_count(),
            self.skipped_rows
        );
        self.index
    }
}

impl AnnotationIndex {
    /// Builds an index from the breast-level and finding-level CSV files
    ///
    /// # Arguments
    ///
    /// * `breast_levels` - Optional path to the breast-level table
    /// * `findings` - Optional path to the finding-level table
    ///
    /// # Returns
    ///
    /// The index, empty when neither path is given
    pub fn from_csv_paths(breast_levels: Option<&Path>, findings: Option<&Path>) -> Result<Self> {
        let mut loader = AnnotationLoader::new();
        if let Some(path) = breast_levels {
            let rows = loader.load_breast_level_csv(path)?;
            debug!("Loaded {} breast-level row(s) from {}", rows, path.display());
        }
        if let Some(path) = findings {
            let rows = loader.load_finding_csv(path)?;
            debug!("Loaded {} finding(s) from {}", rows, path.display());
        }
        if breast_levels.is_none() && findings.is_none() {
            warn!("No annotation tables given; every lookup will miss");
        }
        Ok(loader.finish())
    }
}

/// Interprets the view columns, which may hold separate values ("CC", "L")
/// or a combined code ("CC_L") in the view column
fn parse_view_columns(
    image_id: &str,
    view_position: Option<&str>,
    laterality: Option<&str>,
) -> Result<(Option<ViewPosition>, Option<Laterality>)> {
    let view_str = view_position.unwrap_or("").trim();
    if let Some((view, side)) = parse_view_code(view_str) {
        return Ok((Some(view), Some(side)));
    }

    let view = parse_cell(image_id, "view_position", view_str, ViewPosition::from_str)?;
    let side = parse_cell(
        image_id,
        "laterality",
        laterality.unwrap_or("").trim(),
        Laterality::from_str,
    )?;
    Ok((view, side))
}

/// Parses a non-empty cell; an empty cell is `None`
fn parse_cell<T>(
    image_id: &str,
    column: &str,
    value: &str,
    parse: impl Fn(&str) -> Option<T>,
) -> Result<Option<T>> {
    if value.is_empty() {
        return Ok(None);
    }
    parse(value).map(Some).ok_or_else(|| {
        TriageError::AnnotationError(format!(
            "image {}: unrecognised {} '{}'",
            image_id, column, value
        ))
    })
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
