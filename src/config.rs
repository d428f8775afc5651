use serde::Deserialize;
use anyhow::Result;
use dotenvy::dotenv;

fn default_max_file_size() -> usize {
    // 10 MB in bytes
    10 * 1024 * 1024
}

/// Output filename convention for per-publisher reports.
///
/// `Simple` produces `{publisher}_Report.xlsx`; `Full` appends the source
/// filename stem and a generation timestamp.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NamingConvention {
    Simple,
    Full,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub max_file_size: usize,
    pub naming: NamingConvention,
}

pub fn load_config() -> Result<Config> {
    // Load .env file first
    dotenv().ok();

    let max_file_size = std::env::var("MAX_FILE_SIZE")
        .ok()
        .map(|v| v.parse())
        .transpose()
        .map_err(|e| anyhow::anyhow!("Invalid MAX_FILE_SIZE: {}", e))?
        .unwrap_or_else(default_max_file_size);

    let naming = match std::env::var("REPORT_NAMING").as_deref() {
        Ok("simple") => NamingConvention::Simple,
        Ok("full") | Err(_) => NamingConvention::Full,
        Ok(other) => {
            return Err(anyhow::anyhow!(
                "Invalid REPORT_NAMING '{}', expected 'simple' or 'full'",
                other
            ))
        }
    };

    Ok(Config {
        max_file_size,
        naming,
    })
}
