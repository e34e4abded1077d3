//! WordprocessingML body walking.
//!
//! Only the direct children of `w:body` count: top-level paragraphs and
//! top-level tables. Paragraphs inside tables surface through cell text, and
//! anything wrapped in content controls or text boxes is not visited.

use docparse_core::{DocxBody, DocxTable};

use crate::DocxError;
use crate::xml::Element;

/// The WordprocessingML main namespace.
pub const W: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";

/// Word's own limit on table width. Spans beyond it are clamped.
const MAX_GRID_SPAN: usize = 63;

/// Cells contributed by each `w:tc` of a row, keyed by the grid column the
/// `w:tc` starts at. Starts are strictly increasing.
type RowCells = Vec<(usize, Vec<String>)>;

pub fn read_body(document: &Element) -> Result<DocxBody, DocxError> {
    let body = document.child(W, "body").ok_or(DocxError::NoBody)?;

    let paragraphs = body.children_named(W, "p").map(paragraph_text).collect();
    let tables = body
        .children_named(W, "tbl")
        .enumerate()
        .map(|(index, tbl)| read_table(index, tbl))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(DocxBody { paragraphs, tables })
}

/// Text of a paragraph: its runs, including runs inside hyperlinks.
pub fn paragraph_text(p: &Element) -> String {
    let mut text = String::new();
    for child in p.elements().filter(|e| e.namespace.as_deref() == Some(W)) {
        match child.name.as_str() {
            "r" => push_run_text(&mut text, child),
            "hyperlink" => {
                for run in child.children_named(W, "r") {
                    push_run_text(&mut text, run);
                }
            }
            _ => {}
        }
    }
    text
}

fn push_run_text(out: &mut String, run: &Element) {
    for item in run.elements().filter(|e| e.namespace.as_deref() == Some(W)) {
        match item.name.as_str() {
            "t" => out.push_str(&item.text()),
            "tab" | "ptab" => out.push('\t'),
            "br" => {
                // Page and column breaks carry no text.
                if matches!(item.attr(Some(W), "type"), None | Some("textWrapping")) {
                    out.push('\n');
                }
            }
            "cr" => out.push('\n'),
            "noBreakHyphen" => out.push('-'),
            _ => {}
        }
    }
}

/// Resolve rows top to bottom, so a vertical-merge continuation only ever
/// looks one row up.
fn read_table(index: usize, tbl: &Element) -> Result<DocxTable, DocxError> {
    let mut rows = Vec::new();
    let mut above: Option<RowCells> = None;
    for (row, tr) in tbl.children_named(W, "tr").enumerate() {
        let current = resolve_row(tr, above.as_ref()).map_err(|message| DocxError::Table {
            table: index,
            row,
            message,
        })?;
        rows.push(
            current
                .iter()
                .flat_map(|(_, cells)| cells.iter().cloned())
                .collect(),
        );
        above = Some(current);
    }
    Ok(DocxTable { rows })
}

/// A `w:tc` yields its text once per grid column it spans. A vertical-merge
/// continuation yields whatever the `w:tc` starting at the same grid column
/// in the row above yielded.
fn resolve_row(tr: &Element, above: Option<&RowCells>) -> Result<RowCells, String> {
    let mut offset = grid_before(tr);
    let mut cells = Vec::new();
    for tc in tr.children_named(W, "tc") {
        let contributed = if is_merge_continuation(tc) {
            let above =
                above.ok_or_else(|| "vertically merged cell has no row above".to_string())?;
            let i = above
                .binary_search_by_key(&offset, |(start, _)| *start)
                .map_err(|_| format!("no cell at grid offset {offset} in the row above"))?;
            above[i].1.clone()
        } else {
            vec![cell_text(tc); grid_span(tc)]
        };
        cells.push((offset, contributed));
        offset += grid_span(tc);
    }
    Ok(cells)
}

/// Cell text: its direct paragraphs joined by newlines.
fn cell_text(tc: &Element) -> String {
    tc.children_named(W, "p")
        .map(paragraph_text)
        .collect::<Vec<_>>()
        .join("\n")
}

fn property<'a>(e: &'a Element, pr: &str, name: &str) -> Option<&'a Element> {
    e.child(W, pr).and_then(|pr| pr.child(W, name))
}

fn int_val(e: Option<&Element>) -> Option<usize> {
    e.and_then(|e| e.attr(Some(W), "val"))
        .and_then(|v| v.trim().parse::<usize>().ok())
}

fn is_merge_continuation(tc: &Element) -> bool {
    property(tc, "tcPr", "vMerge").is_some_and(|vm| vm.attr(Some(W), "val") != Some("restart"))
}

fn grid_span(tc: &Element) -> usize {
    int_val(property(tc, "tcPr", "gridSpan"))
        .unwrap_or(1)
        .clamp(1, MAX_GRID_SPAN)
}

fn grid_before(tr: &Element) -> usize {
    int_val(property(tr, "trPr", "gridBefore"))
        .unwrap_or(0)
        .min(MAX_GRID_SPAN)
}
