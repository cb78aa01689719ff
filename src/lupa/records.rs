//! Record reconstruction from flattened report rows.
//!
//! The report widget renders disbursement lines into noisy table rows with no
//! stable schema. Reconstruction anchors on the "NIT-" token and reads the
//! remaining fields at fixed offsets from it.

use serde::{Deserialize, Serialize};

/// One flattened table row as extracted from the report HTML.
pub type RawRow = Vec<String>;

/// Marker identifying an institution cell within a row.
const ANCHOR: &str = "NIT-";

/// A row needs more cells than this to carry a disbursement line.
pub(crate) const MIN_ROW_CELLS: usize = 5;

/// One disbursement line, cleaned and value-normalized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisbursementRecord {
    #[serde(rename = "NIT_IPS")]
    pub nit_ips: String,
    #[serde(rename = "Nombre_IPS")]
    pub nombre_ips: String,
    #[serde(rename = "Fecha_Giro")]
    pub fecha_giro: String,
    #[serde(rename = "Valor")]
    pub valor: i64,
    #[serde(rename = "Concepto")]
    pub concepto: String,
    #[serde(rename = "Entidad")]
    pub entidad: String,
}

/// A reconstructed line whose value has not been normalized yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawRecord {
    pub nit_ips: String,
    pub nombre_ips: String,
    pub fecha_giro: String,
    pub valor: String,
    pub concepto: String,
    pub entidad: String,
}

/// Outcome of examining one cell position as a potential anchor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum AnchorOutcome {
    /// Anchor matched and the positional fields were accepted.
    Accepted(RawRecord),
    /// Anchor matched but a structural check failed; the scan moves on.
    Rejected(RejectReason),
    /// Cell does not contain the anchor marker.
    NoAnchor,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum RejectReason {
    /// No cell at the value offset.
    ValueMissing,
    /// Value candidate carries neither a currency symbol nor a digit.
    ValueGate,
    /// Anchor token has no name segment after the institution id.
    SplitArity,
}

/// Examines `cols[idx]` as an anchor and reads the record at its offsets:
/// +1 date, +2 value, +3 concept, +4 paying entity. The value cell is
/// structurally required; concept and entity default to "N/A".
///
/// The value gate rejects anchors whose candidate cell has neither `$` nor a
/// digit: "NIT-" also shows up in narrative text with no amount behind it.
pub(crate) fn scan_anchor(cols: &[String], idx: usize) -> AnchorOutcome {
    let cell = &cols[idx];
    if !cell.contains(ANCHOR) {
        return AnchorOutcome::NoAnchor;
    }

    let valor = match cols.get(idx + 2) {
        Some(v) => v,
        None => return AnchorOutcome::Rejected(RejectReason::ValueMissing),
    };
    if !valor.contains('$') && !valor.chars().any(|c| c.is_ascii_digit()) {
        return AnchorOutcome::Rejected(RejectReason::ValueGate);
    }

    // "NIT-<id>-<name>"; dashes inside the name survive the bounded split.
    let parts: Vec<&str> = cell.splitn(3, '-').collect();
    if parts.len() < 3 {
        return AnchorOutcome::Rejected(RejectReason::SplitArity);
    }

    AnchorOutcome::Accepted(RawRecord {
        nit_ips: parts[1].to_string(),
        nombre_ips: parts[2].to_string(),
        fecha_giro: cols[idx + 1].clone(),
        valor: valor.clone(),
        concepto: cols
            .get(idx + 3)
            .cloned()
            .unwrap_or_else(|| "N/A".to_string()),
        entidad: cols
            .get(idx + 4)
            .cloned()
            .unwrap_or_else(|| "N/A".to_string()),
    })
}

/// Strips currency and grouping punctuation and parses what remains.
/// Anything else left in the cell fails the parse and drops the record.
pub(crate) fn normalize_valor(raw: &str) -> Option<i64> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, '$' | '.' | ','))
        .collect();
    cleaned.parse::<i64>().ok()
}

fn finalize(raw: RawRecord) -> Option<DisbursementRecord> {
    let valor = normalize_valor(&raw.valor)?;
    Some(DisbursementRecord {
        nit_ips: raw.nit_ips,
        nombre_ips: raw.nombre_ips,
        fecha_giro: raw.fecha_giro,
        valor,
        concepto: raw.concepto,
        entidad: raw.entidad,
    })
}

/// Reconstructs the cleaned dataset from the accumulated raw corpus.
///
/// Row-local: each row is compacted (trimmed, empties dropped), scanned left
/// to right, and contributes at most one record from its first accepted
/// anchor. An empty corpus or zero anchor matches is an empty dataset, not an
/// error.
pub fn reconstruct(corpus: &[RawRow]) -> Vec<DisbursementRecord> {
    let mut raw_records = Vec::new();

    for row in corpus {
        let cols: Vec<String> = row
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
        if cols.len() <= MIN_ROW_CELLS {
            continue;
        }

        for idx in 0..cols.len() {
            match scan_anchor(&cols, idx) {
                AnchorOutcome::Accepted(raw) => {
                    raw_records.push(raw);
                    // One disbursement line per row.
                    break;
                }
                AnchorOutcome::Rejected(_) | AnchorOutcome::NoAnchor => {}
            }
        }
    }

    raw_records.into_iter().filter_map(finalize).collect()
}
