use feargreed::config::Config;
use feargreed::data::{analyze_csv, default_manifest_path, read_header, validate_header, EXPECTED_COLUMNS};
use serde_json::json;
use std::env;
use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

fn main() {
    let cfg = Config::from_env();
    let path = PathBuf::from(env::args().nth(1).unwrap_or_else(|| cfg.dataset.clone()));

    let now_ts = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);

    let header = match fs::read_to_string(&path) {
        Ok(text) => read_header(&text),
        Err(err) => {
            eprintln!("cannot read {}: {}", path.display(), err);
            std::process::exit(1);
        }
    };

    if let Err(msg) = validate_header(&header) {
        eprintln!("schema mismatch: {}", msg);
        eprintln!("expected columns: {:?}", EXPECTED_COLUMNS);
        std::process::exit(2);
    }

    let (manifest, report) = match analyze_csv(&path, cfg.data_ttl_secs, now_ts) {
        Ok(m) => m,
        Err(err) => {
            eprintln!("analysis failed: {}", err);
            if let Some(hint) = err.hint() {
                eprintln!("{}", hint);
            }
            std::process::exit(3);
        }
    };

    let out_path = default_manifest_path(&path);
    let payload = json!({
        "manifest": manifest,
        "report": report
    });
    let body = match serde_json::to_string_pretty(&payload) {
        Ok(b) => b,
        Err(err) => {
            eprintln!("failed to encode manifest: {}", err);
            std::process::exit(4);
        }
    };
    if let Err(err) = fs::write(&out_path, body) {
        eprintln!("failed to write {}: {}", out_path.display(), err);
        std::process::exit(4);
    }
    println!("wrote manifest {}", out_path.display());
}
