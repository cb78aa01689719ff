//! Consolidated CSV export and backup-directory side effects.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use chrono::Local;
use tracing::{error, info};

use crate::error::ScraperError;
use crate::lupa::{DisbursementRecord, RawRow};

/// Spreadsheet tools key the file encoding off this prefix.
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

const OUTPUT_STEM: &str = "ConsolidadoADRES";

/// Output file name for a run exported today.
pub fn output_name() -> String {
    format!("{}_{}.csv", OUTPUT_STEM, Local::now().format("%Y%m%d"))
}

/// Writes the cleaned dataset as BOM-prefixed UTF-8 CSV, one row per record,
/// headers from the record's column names.
pub fn write_records(path: &Path, records: &[DisbursementRecord]) -> Result<(), ScraperError> {
    let mut file = File::create(path)?;
    file.write_all(UTF8_BOM)?;

    let mut writer = csv::Writer::from_writer(file);
    for record in records {
        writer.serialize(record)?;
    }
    writer.flush()?;

    info!("Wrote {} records to {:?}", records.len(), path);
    Ok(())
}

/// Creates the backup directory ahead of the run.
pub fn ensure_backup_dir(dir: &Path) -> Result<(), ScraperError> {
    std::fs::create_dir_all(dir)?;
    Ok(())
}

/// Timestamped dump of the raw corpus into the backup directory. Best-effort:
/// failures are logged, never propagated.
pub fn dump_raw_corpus(dir: &Path, corpus: &[RawRow]) {
    let stamp = Local::now().format("%Y%m%d_%H%M%S");
    let path = dir.join(format!("extraccion_bruta_{}.json", stamp));

    match serde_json::to_string_pretty(corpus) {
        Ok(json) => {
            if let Err(e) = std::fs::write(&path, json) {
                error!("Failed to save raw corpus: {}", e);
            } else {
                info!("Saved raw corpus to {:?}", path);
            }
        }
        Err(e) => error!("Failed to serialize raw corpus: {}", e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> DisbursementRecord {
        DisbursementRecord {
            nit_ips: "802010614".to_string(),
            nombre_ips: "Hospital San Jose".to_string(),
            fecha_giro: "15/01/2025".to_string(),
            valor: 5_000_000,
            concepto: "Anticipo".to_string(),
            entidad: "ADRES".to_string(),
        }
    }

    #[test]
    fn test_output_name_shape() {
        let name = output_name();
        assert!(name.starts_with("ConsolidadoADRES_"));
        assert!(name.ends_with(".csv"));
    }

    #[test]
    fn test_write_records_bom_and_columns() {
        let path = std::env::temp_dir().join(format!("lupa_export_test_{}.csv", std::process::id()));

        write_records(&path, &[sample_record()]).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        assert_eq!(&bytes[..3], UTF8_BOM);

        let text = String::from_utf8(bytes[3..].to_vec()).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next(),
            Some("NIT_IPS,Nombre_IPS,Fecha_Giro,Valor,Concepto,Entidad")
        );
        assert_eq!(
            lines.next(),
            Some("802010614,Hospital San Jose,15/01/2025,5000000,Anticipo,ADRES")
        );
    }
}
