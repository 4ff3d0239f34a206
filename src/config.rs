use serde::Deserialize;

/// Runtime settings for the report service.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub port: u16,
    /// Largest decoded upload accepted, in bytes.
    pub max_upload_bytes: usize,
    /// Year applied when a request does not name one.
    pub default_year: i32,
    /// Value written into empty `Lead Source` cells.
    pub default_lead_source: String,
    pub table_page_size: usize,
    pub rate_limit_per_second: u64,
    pub rate_limit_burst: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            max_upload_bytes: 10 * 1024 * 1024,
            default_year: 2023,
            default_lead_source: "Facebook".to_string(),
            table_page_size: 10,
            rate_limit_per_second: 10,
            rate_limit_burst: 20,
        }
    }
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();

        let config = Self {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| defaults.port.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("PORT must be a valid number between 1-65535"))?,
            max_upload_bytes: std::env::var("MAX_UPLOAD_BYTES")
                .ok()
                .map(|raw| {
                    raw.parse::<usize>()
                        .map_err(|_| anyhow::anyhow!("MAX_UPLOAD_BYTES must be a byte count"))
                        .and_then(|bytes| {
                            if bytes == 0 {
                                anyhow::bail!("MAX_UPLOAD_BYTES must be greater than zero");
                            }
                            Ok(bytes)
                        })
                })
                .transpose()?
                .unwrap_or(defaults.max_upload_bytes),
            default_year: std::env::var("DEFAULT_YEAR")
                .ok()
                .map(|raw| {
                    raw.parse::<i32>()
                        .map_err(|_| anyhow::anyhow!("DEFAULT_YEAR must be a four digit year"))
                        .and_then(|year| {
                            if !(1900..=9999).contains(&year) {
                                anyhow::bail!("DEFAULT_YEAR must be between 1900 and 9999");
                            }
                            Ok(year)
                        })
                })
                .transpose()?
                .unwrap_or(defaults.default_year),
            default_lead_source: std::env::var("DEFAULT_LEAD_SOURCE")
                .ok()
                .map(|source| source.trim().to_string())
                .filter(|source| !source.is_empty())
                .unwrap_or(defaults.default_lead_source),
            table_page_size: std::env::var("TABLE_PAGE_SIZE")
                .ok()
                .map(|raw| {
                    raw.parse::<usize>()
                        .map_err(|_| anyhow::anyhow!("TABLE_PAGE_SIZE must be a number"))
                        .and_then(|size| {
                            if size == 0 {
                                anyhow::bail!("TABLE_PAGE_SIZE cannot be zero");
                            }
                            Ok(size)
                        })
                })
                .transpose()?
                .unwrap_or(defaults.table_page_size),
            rate_limit_per_second: std::env::var("RATE_LIMIT_PER_SECOND")
                .unwrap_or_else(|_| defaults.rate_limit_per_second.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_PER_SECOND must be a number"))?,
            rate_limit_burst: std::env::var("RATE_LIMIT_BURST")
                .unwrap_or_else(|_| defaults.rate_limit_burst.to_string())
                .parse()
                .map_err(|_| anyhow::anyhow!("RATE_LIMIT_BURST must be a number"))?,
        };

        tracing::debug!("Server Port: {}", config.port);
        tracing::debug!("Max upload: {} bytes", config.max_upload_bytes);
        tracing::debug!(
            "Defaults: year={}, lead source={}, page size={}",
            config.default_year,
            config.default_lead_source,
            config.table_page_size
        );

        Ok(config)
    }
}
