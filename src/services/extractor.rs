// src/services/extractor.rs

//! Outage extraction from source pages.
//!
//! Each category names an [`StrategyKind`]; the matching strategy locates the
//! target district's rows and reads them into [`OutageRecord`]s through a
//! shared [`RowReader`]. Malformed rows and missing cells never fail
//! extraction: rows that are too short are skipped and missing fields read
//! as empty strings.

use scraper::node::Node;
use scraper::{ElementRef, Html, Selector};

use crate::error::{AppError, Result};
use crate::models::{
    ColumnLayout, EmergencyRules, ExtractConfig, OutageRecord, PlannedRules, StatusLabel,
    StrategyKind,
};
use crate::utils::clean_text;

/// A category-specific way of reading outage rows from a parsed page.
pub trait ExtractStrategy: Send + Sync {
    /// Records for `district` in document order; empty when none apply.
    fn extract(&self, document: &Html, district: &str) -> Vec<OutageRecord>;
}

/// Extractor for the configured district, holding both strategies.
pub struct Extractor {
    district: String,
    emergency: EmergencyStrategy,
    planned: PlannedStrategy,
}

impl Extractor {
    /// Compile all selectors for the given district.
    pub fn new(district: impl Into<String>, config: &ExtractConfig) -> Result<Self> {
        Ok(Self {
            district: clean_text(&district.into()),
            emergency: EmergencyStrategy::new(&config.emergency)?,
            planned: PlannedStrategy::new(&config.planned)?,
        })
    }

    pub fn district(&self) -> &str {
        &self.district
    }

    /// Parse `document` and extract the district's records with `strategy`.
    pub fn extract(&self, document: &str, strategy: StrategyKind) -> Result<Vec<OutageRecord>> {
        let html = parse_document(document)?;
        let records = self.strategy(strategy).extract(&html, &self.district);
        log::debug!(
            "Extracted {} {} record(s) for district '{}'",
            records.len(),
            strategy,
            self.district
        );
        Ok(records)
    }

    fn strategy(&self, kind: StrategyKind) -> &dyn ExtractStrategy {
        match kind {
            StrategyKind::Emergency => &self.emergency,
            StrategyKind::Planned => &self.planned,
        }
    }
}

/// Parse raw text as HTML.
///
/// The HTML parser recovers from any malformed markup, so the only document
/// rejected is one with no markup at all.
fn parse_document(document: &str) -> Result<Html> {
    if document.trim().is_empty() {
        return Err(AppError::document_parse("document is empty"));
    }
    if !document.contains('<') {
        return Err(AppError::document_parse("document contains no markup"));
    }
    Ok(Html::parse_document(document))
}

fn parse_selector(s: &str) -> Result<Selector> {
    Selector::parse(s).map_err(|e| AppError::selector(s, format!("{e:?}")))
}

/// Row-to-record helper shared by both strategies.
struct RowReader {
    row: Selector,
    cell: Selector,
    addresses: Selector,
    min_cells: usize,
    columns: ColumnLayout,
}

/// Cells of one candidate outage row.
struct RowCells<'a> {
    row: ElementRef<'a>,
    cells: Vec<ElementRef<'a>>,
}

impl<'a> RowCells<'a> {
    /// Cleaned text of the cell at `index`, or empty if absent.
    fn text(&self, index: usize) -> String {
        self.cells
            .get(index)
            .map(|cell| clean_text(&cell.text().collect::<String>()))
            .unwrap_or_default()
    }

    /// First non-blank text node of the cell at `index`.
    fn first_text(&self, index: usize) -> String {
        self.cells
            .get(index)
            .and_then(|cell| cell.text().map(clean_text).find(|t| !t.is_empty()))
            .unwrap_or_default()
    }
}

impl RowReader {
    fn new(
        row: &str,
        cell: &str,
        addresses: &str,
        min_cells: usize,
        columns: ColumnLayout,
    ) -> Result<Self> {
        Ok(Self {
            row: parse_selector(row)?,
            cell: parse_selector(cell)?,
            addresses: parse_selector(addresses)?,
            min_cells,
            columns,
        })
    }

    /// Rows under `scope` with at least `min_cells` direct cells.
    fn rows<'a>(&self, scope: ElementRef<'a>) -> Vec<RowCells<'a>> {
        scope
            .select(&self.row)
            .filter_map(|row| {
                let cells: Vec<ElementRef<'a>> = row
                    .children()
                    .filter_map(ElementRef::wrap)
                    .filter(|el| self.cell.matches(el))
                    .collect();
                if cells.len() < self.min_cells {
                    log::debug!("Skipping row with {} cell(s)", cells.len());
                    return None;
                }
                Some(RowCells { row, cells })
            })
            .collect()
    }

    /// Read the fields every strategy shares. `end` is the raw end cell text.
    fn read(&self, cells: &RowCells<'_>) -> (OutageRecord, String) {
        let record = OutageRecord {
            location: cells.first_text(self.columns.location),
            start: cells.text(self.columns.start),
            end: None,
            status: cells.text(self.columns.status),
            addresses: cells
                .row
                .select(&self.addresses)
                .next()
                .map(split_lines)
                .unwrap_or_default(),
        };
        (record, cells.text(self.columns.end))
    }
}

/// Split an element's content on `<br>` markers at any depth; trimmed,
/// blanks dropped.
fn split_lines(element: ElementRef<'_>) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();

    for node in element.descendants() {
        match node.value() {
            Node::Text(text) => current.push_str(text),
            Node::Element(el) if el.name() == "br" => lines.push(std::mem::take(&mut current)),
            _ => {}
        }
    }
    lines.push(current);

    lines
        .iter()
        .map(|line| clean_text(line))
        .filter(|line| !line.is_empty())
        .collect()
}

/// Emergency page: per-district sections, optional end time, mapped status.
pub struct EmergencyStrategy {
    section: Selector,
    section_title: Selector,
    reader: RowReader,
    status_labels: Vec<StatusLabel>,
}

impl EmergencyStrategy {
    pub fn new(rules: &EmergencyRules) -> Result<Self> {
        Ok(Self {
            section: parse_selector(&rules.section_selector)?,
            section_title: parse_selector(&rules.section_title_selector)?,
            reader: RowReader::new(
                &rules.row_selector,
                &rules.cell_selector,
                &rules.addresses_selector,
                rules.min_cells,
                rules.columns,
            )?,
            status_labels: rules.status_labels.clone(),
        })
    }

    fn find_section<'a>(&self, document: &'a Html, district: &str) -> Option<ElementRef<'a>> {
        document.select(&self.section).find(|section| {
            section
                .select(&self.section_title)
                .next()
                .map(|title| clean_text(&title.text().collect::<String>()))
                .is_some_and(|title| title.starts_with(district))
        })
    }

    fn display_status(&self, raw: String) -> String {
        self.status_labels
            .iter()
            .find(|mapping| mapping.raw.eq_ignore_ascii_case(&raw))
            .map(|mapping| mapping.label.clone())
            .unwrap_or(raw)
    }
}

impl ExtractStrategy for EmergencyStrategy {
    fn extract(&self, document: &Html, district: &str) -> Vec<OutageRecord> {
        let Some(section) = self.find_section(document, district) else {
            log::debug!("No emergency section for district '{district}'");
            return Vec::new();
        };

        self.reader
            .rows(section)
            .iter()
            .map(|cells| {
                let (mut record, end) = self.reader.read(cells);
                record.end = (!end.is_empty()).then_some(end);
                record.status = self.display_status(record.status);
                record
            })
            .collect()
    }
}

/// Planned page: pre-filtered results table, end time always shown.
pub struct PlannedStrategy {
    table: Selector,
    reader: RowReader,
}

impl PlannedStrategy {
    pub fn new(rules: &PlannedRules) -> Result<Self> {
        Ok(Self {
            table: parse_selector(&rules.table_selector)?,
            reader: RowReader::new(
                &rules.row_selector,
                &rules.cell_selector,
                &rules.addresses_selector,
                rules.min_cells,
                rules.columns,
            )?,
        })
    }
}

impl ExtractStrategy for PlannedStrategy {
    fn extract(&self, document: &Html, _district: &str) -> Vec<OutageRecord> {
        let Some(table) = document.select(&self.table).next() else {
            log::debug!("No planned results table");
            return Vec::new();
        };

        self.reader
            .rows(table)
            .iter()
            .map(|cells| {
                let (mut record, end) = self.reader.read(cells);
                record.end = Some(end);
                record
            })
            .collect()
    }
}
