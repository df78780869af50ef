//! CLI argument definitions using clap derive macros.

use std::path::PathBuf;

use clap::Parser;

use cf_mirror_core::DEFAULT_PLAIN_ATTEMPTS;

/// Mirror the latest CurseForge files for a WoW add-on.
///
/// Downloads the newest archive for each supported game-version track and
/// writes the files into the output directory under track-suffixed names.
/// With an add-on id and API key configured the structured API is tried
/// first; otherwise the add-on page is scraped, with bounded retries and a
/// proxy fallback against bot defense.
#[derive(Parser, Debug)]
#[command(name = "cf-mirror")]
#[command(author, version, about)]
pub struct Args {
    /// Add-on URL name on the site (e.g. "deadly-boss-mods")
    #[arg(env = "ADDON_NAME")]
    pub addon: Option<String>,

    /// Numeric add-on id; 0 disables the structured-API path
    #[arg(long, env = "ADDON_ID", default_value_t = 0)]
    pub addon_id: u32,

    /// Structured-API key (enables the API path together with --addon-id)
    #[arg(long, env = "CF_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Fetch-proxy API key for the bot-defense fallback attempt
    #[arg(long, env = "PROXY_API_KEY", hide_env_values = true)]
    pub proxy_key: Option<String>,

    /// Directory downloaded files are written to
    #[arg(short, long, default_value = ".")]
    pub output_dir: PathBuf,

    /// Plain scrape attempts before the proxy fallback (1-100)
    #[arg(long, default_value_t = DEFAULT_PLAIN_ATTEMPTS, value_parser = clap::value_parser!(u32).range(1..=100))]
    pub max_attempts: u32,

    /// Increase output verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress non-error output
    #[arg(short, long)]
    pub quiet: bool,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        Args::try_parse_from(args)
    }

    #[test]
    fn test_cli_addon_positional() {
        let args = parse(&["cf-mirror", "deadly-boss-mods"]).unwrap();
        assert_eq!(args.addon.as_deref(), Some("deadly-boss-mods"));
        assert_eq!(args.addon_id, 0);
        assert!(!args.quiet);
        assert_eq!(args.verbose, 0);
        assert_eq!(args.max_attempts, 10);
        assert_eq!(args.output_dir, PathBuf::from("."));
    }

    #[test]
    fn test_cli_addon_id_flag() {
        let args = parse(&["cf-mirror", "foo", "--addon-id", "3358"]).unwrap();
        assert_eq!(args.addon_id, 3358);
    }

    #[test]
    fn test_cli_keys() {
        let args = parse(&[
            "cf-mirror",
            "foo",
            "--api-key",
            "api",
            "--proxy-key",
            "proxy",
        ])
        .unwrap();
        assert_eq!(args.api_key.as_deref(), Some("api"));
        assert_eq!(args.proxy_key.as_deref(), Some("proxy"));
    }

    #[test]
    fn test_cli_output_dir() {
        let args = parse(&["cf-mirror", "foo", "-o", "/tmp/mirror"]).unwrap();
        assert_eq!(args.output_dir, PathBuf::from("/tmp/mirror"));
    }

    #[test]
    fn test_cli_max_attempts_bounds() {
        let args = parse(&["cf-mirror", "foo", "--max-attempts", "1"]).unwrap();
        assert_eq!(args.max_attempts, 1);

        let result = parse(&["cf-mirror", "foo", "--max-attempts", "0"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::ValueValidation
        );

        let result = parse(&["cf-mirror", "foo", "--max-attempts", "101"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_cli_verbose_flag_increments_count() {
        let args = parse(&["cf-mirror", "foo", "-v"]).unwrap();
        assert_eq!(args.verbose, 1);

        let args = parse(&["cf-mirror", "foo", "-vv"]).unwrap();
        assert_eq!(args.verbose, 2);
    }

    #[test]
    fn test_cli_quiet_flag() {
        let args = parse(&["cf-mirror", "foo", "--quiet"]).unwrap();
        assert!(args.quiet);
    }

    #[test]
    fn test_cli_help_flag_shows_usage() {
        let result = parse(&["cf-mirror", "--help"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayHelp
        );
    }

    #[test]
    fn test_cli_version_flag_shows_version() {
        let result = parse(&["cf-mirror", "--version"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::DisplayVersion
        );
    }

    #[test]
    fn test_cli_invalid_flag_returns_error() {
        let result = parse(&["cf-mirror", "foo", "--invalid-flag"]);
        assert!(result.is_err());
        assert_eq!(
            result.unwrap_err().kind(),
            clap::error::ErrorKind::UnknownArgument
        );
    }
}
