//! Command-line interface definitions for focus_extract.
//!
//! Options can be provided via command-line flags or environment variables.
//! Flags override the values of the YAML config file.

use clap::Parser;
use focus_extract::ExtractorConfig;

/// Fetch article URLs and print each as one JSON line on stdout.
///
/// # Examples
///
/// ```sh
/// # Print extracted articles
/// focus_extract https://example.com/post example.org/story
///
/// # Save sanitized records for a user
/// focus_extract -o ./saved --user-id alice --sanitize https://example.com/post
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Article URLs; a missing scheme defaults to https
    #[arg(required = true)]
    pub urls: Vec<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "FOCUS_EXTRACT_CONFIG")]
    pub config: Option<String>,

    /// Save each result as JSON under this directory
    #[arg(short, long)]
    pub output_dir: Option<String>,

    /// User the saved records are attributed to
    #[arg(long, env = "FOCUS_EXTRACT_USER_ID", default_value = "local")]
    pub user_id: String,

    /// Reduce saved content to printable ASCII
    #[arg(long)]
    pub sanitize: bool,

    /// Upper bound in seconds for each extraction, retries included
    #[arg(long, env = "FOCUS_EXTRACT_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Extractions running at the same time
    #[arg(long, default_value_t = 4)]
    pub concurrency: usize,
}

impl Cli {
    /// Apply flag overrides on top of a loaded configuration.
    pub fn apply(&self, mut config: ExtractorConfig) -> ExtractorConfig {
        if let Some(secs) = self.timeout {
            config.overall_timeout_secs = Some(secs);
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "focus_extract",
            "--output-dir",
            "./saved",
            "--user-id",
            "alice",
            "--sanitize",
            "https://example.com/a",
            "example.org/b",
        ]);

        assert_eq!(cli.urls, vec!["https://example.com/a", "example.org/b"]);
        assert_eq!(cli.output_dir.as_deref(), Some("./saved"));
        assert_eq!(cli.user_id, "alice");
        assert!(cli.sanitize);
        assert_eq!(cli.concurrency, 4);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from(["focus_extract", "-c", "/tmp/c.yaml", "-o", "/tmp/out", "x.com/p"]);

        assert_eq!(cli.config.as_deref(), Some("/tmp/c.yaml"));
        assert_eq!(cli.output_dir.as_deref(), Some("/tmp/out"));
    }

    #[test]
    fn test_cli_requires_a_url() {
        assert!(Cli::try_parse_from(["focus_extract"]).is_err());
    }

    #[test]
    fn test_timeout_flag_overrides_config() {
        let cli = Cli::parse_from(["focus_extract", "--timeout", "30", "x.com/p"]);
        let config = cli.apply(ExtractorConfig::default());
        assert_eq!(config.overall_timeout_secs, Some(30));

        let cli = Cli::parse_from(["focus_extract", "x.com/p"]);
        let config = ExtractorConfig {
            overall_timeout_secs: Some(9),
            ..ExtractorConfig::default()
        };
        assert_eq!(cli.apply(config).overall_timeout_secs, Some(9));
    }
}
