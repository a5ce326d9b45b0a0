//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `planpin_core` linkage.
//! - Keep output deterministic for quick local sanity checks.

fn main() {
    println!("planpin_core ping={}", planpin_core::ping());
    println!("planpin_core version={}", planpin_core::core_version());

    let log_dir = std::env::temp_dir().join("planpin-cli-logs");
    match planpin_core::init_logging(
        planpin_core::default_log_level(),
        &log_dir.to_string_lossy(),
    ) {
        Ok(()) => {
            if let Some((level, dir)) = planpin_core::logging_status() {
                println!("planpin_core log_level={level} log_dir={}", dir.display());
            }
        }
        Err(err) => println!("planpin_core log_error={err}"),
    }

    match planpin_core::open_db_in_memory() {
        Ok(_conn) => println!(
            "planpin_core schema_version={}",
            planpin_core::db::migrations::latest_version()
        ),
        Err(err) => println!("planpin_core db_error={err}"),
    }
}
