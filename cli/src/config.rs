use clap::ValueEnum;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable summaries
    Pretty,
    /// Raw response bodies
    Json,
}

/// Settings shared by every command, built once from the global flags.
#[derive(Debug, Clone)]
pub struct CliConfig {
    pub base_url: String,
    pub format: OutputFormat,
    pub verbose: bool,
}

impl CliConfig {
    pub fn new(base_url: &str, format: OutputFormat, verbose: bool) -> Self {
        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            format,
            verbose,
        }
    }

    pub fn is_pretty(&self) -> bool {
        self.format == OutputFormat::Pretty
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_url_drops_trailing_slash() {
        let config = CliConfig::new("http://localhost:8080/", OutputFormat::Json, true);
        assert_eq!(config.base_url, "http://localhost:8080");
        assert!(!config.is_pretty());
    }
}
