use std::path::Path;

use chrono::NaiveDate;
use tracing_subscriber::EnvFilter;

use lupa_al_giro::{export, LupaScraper, Scraper, ScraperConfig};

/// Query period (DD/MM/YYYY on the portal form).
const DATE_FROM: (i32, u32, u32) = (2025, 1, 1);
const DATE_TO: (i32, u32, u32) = (2026, 1, 31);

/// NITs to process, per the run book.
const NITS: &[&str] = &[
    "890303208", "816001182", "802010614", "890307200", "806007650", "807002424",
    "800194798", "890985122", "830011670", "860026123", "892099160", "811000620",
    "812005190", "800095628", "860514592", "800052534", "890941663", "890901475",
    "890501070", "800231604", "817004260", "800165262", "891409291", "800241602",
    "805007737", "890324177", "890901826", "860006560", "891408586", "890500893",
    "801000713", "890102768", "802020334", "17068260", "892300678", "806006237",
    "824000687", "802000608", "890107487", "890208788", "805027911", "24289833",
    "860037950", "811038014", "811045769", "900037353", "900047874", "16703018",
    "900098550", "830023202", "900112351", "900149596", "830110109", "900273686",
    "830512218", "900285194", "900330656", "900116494", "900335780", "900138858",
    "900368444", "900474727", "900236850", "900563107", "830500960", "830020599",
    "890300513", "66917463", "900580962", "900276658", "13487059", "900928616",
    "900699359", "900774610", "901196161", "901002107", "900099945", "890922113",
    "860007336", "860013570", "800149695", "890000381", "828002423", "901429936",
    "900067510", "900352592", "901300333", "900419563", "901212102", "901565478",
    "900073223", "830027158", "901308243", "900989962", "901731685", "891200235",
    "901256347", "900432887", "800130907", "900277244", "830129327", "890331949",
    "900293923", "811028445", "800005727", "900509068", "900413914", "830501223",
];

fn date(ymd: (i32, u32, u32)) -> NaiveDate {
    NaiveDate::from_ymd_opt(ymd.0, ymd.1, ymd.2).expect("valid query date")
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = ScraperConfig::new(date(DATE_FROM), date(DATE_TO));

    println!("============================================================");
    println!("  Lupa al Giro - extraccion de pagos ADRES");
    println!("============================================================");
    println!("Periodo: {} - {}", config.date_from_field(), config.date_to_field());
    println!("NITs a procesar: {}", NITS.len());
    println!(
        "Tiempo estimado: ~{} minutos",
        NITS.len() as u64 * config.render_wait.as_secs() / 60
    );
    println!();

    if let Err(e) = export::ensure_backup_dir(&config.backup_dir) {
        eprintln!("No se pudo crear el directorio de backups: {}", e);
        std::process::exit(1);
    }

    let nits: Vec<String> = NITS.iter().map(|n| n.to_string()).collect();
    let mut scraper = LupaScraper::new(config, nits);

    let records = match scraper.execute().await {
        Ok(records) => records,
        Err(e) => {
            eprintln!("Error fatal: {}", e);
            std::process::exit(1);
        }
    };

    if records.is_empty() {
        println!("No se encontraron datos que coincidan con el patron de NIT y valor.");
        return;
    }

    let output = export::output_name();
    if let Err(e) = export::write_records(Path::new(&output), &records) {
        eprintln!("Error al exportar: {}", e);
        std::process::exit(1);
    }

    println!("============================================================");
    println!("Proceso completado");
    println!("Registros validos: {}", records.len());
    println!("Archivo generado: {}", output);
    println!("============================================================");
}
