use crate::utils;

pub const DEFAULT_EPHEMERIS: &str = "de421.bsp";
pub const DEFAULT_START_DATE: &str = "2020-01-01";
pub const DEFAULT_OUTPUT: &str = "planetary_positions.json";

/// Serialization format of the output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// Single JSON object keyed by date
    Json,
    /// One row per date, one column per body
    Csv,
}

/// Structure representing command-line arguments.
#[derive(Debug)]
pub struct Args {
    pub ephemeris: std::path::PathBuf,
    pub start: chrono::NaiveDate,
    pub end: chrono::NaiveDate,
    pub output: std::path::PathBuf,
    pub format: OutputFormat,
    pub threads: Option<usize>,
    pub check: bool,
}

/// Command-line arguments parser using Clap.
///
/// Every flag defaults to the values the generator has always used: the
/// DE421 kernel, 2020-01-01 through today, and `planetary_positions.json`.
impl Args {
    /// Parses command-line arguments using `clap`.
    ///
    /// # Returns
    /// * `Args` - Struct containing parsed arguments.
    ///
    /// # Errors
    /// * Exits with a usage message if arguments are invalid.
    pub fn parse() -> Self {
        Self::from_matches(&command().get_matches())
    }

    fn from_matches(matches: &clap::ArgMatches) -> Self {
        let today = chrono::Local::now().date_naive();
        Args {
            ephemeris: matches
                .get_one::<String>("ephemeris")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_EPHEMERIS)),
            start: matches
                .get_one::<chrono::NaiveDate>("start")
                .copied()
                .unwrap_or_else(default_start_date),
            end: matches.get_one::<chrono::NaiveDate>("end").copied().unwrap_or(today),
            output: matches
                .get_one::<String>("output")
                .map(std::path::PathBuf::from)
                .unwrap_or_else(|| std::path::PathBuf::from(DEFAULT_OUTPUT)),
            format: matches
                .get_one::<OutputFormat>("format")
                .copied()
                .unwrap_or(OutputFormat::Json),
            threads: matches.get_one::<usize>("threads").cloned(),
            check: matches.get_flag("check"),
        }
    }
}

fn default_start_date() -> chrono::NaiveDate {
    chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap_or_default()
}

fn command() -> clap::Command {
    clap::Command::new("planetary_positions")
        .version("0.1.0")
        .about("Compute daily ecliptic longitudes of the planets and the Moon")
        .arg(
            clap::Arg::new("ephemeris")
                .short('e')
                .long("ephemeris")
                .help("Path to the JPL SPK kernel")
                .default_value(DEFAULT_EPHEMERIS)
                .num_args(1),
        )
        .arg(
            clap::Arg::new("start")
            .short('s')
            .long("start")
            .help("First date, YYYY-MM-DD")
            .default_value(DEFAULT_START_DATE)
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_date_arg)),
        )
        .arg(
            clap::Arg::new("end")
            .short('E')
            .long("end")
            .help("Last date (inclusive), YYYY-MM-DD (default: today)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_date_arg)),
        )
        .arg(
            clap::Arg::new("output")
            .short('o')
            .long("output")
            .help("Path to the output file")
            .default_value(DEFAULT_OUTPUT)
            .num_args(1),
        )
        .arg(
            clap::Arg::new("format")
            .short('f')
            .long("format")
            .help("Output format")
            .default_value("json")
            .num_args(1)
            .value_parser(clap::builder::EnumValueParser::<OutputFormat>::new()),
        )
        .arg(
            clap::Arg::new("threads")
            .short('t')
            .long("threads")
            .help("Number of threads to use (default: all available)")
            .num_args(1)
            .value_parser(clap::builder::ValueParser::new(parse_usize_positive)),
        )
        .arg(
            clap::Arg::new("check")
            .short('c')
            .long("check")
            .help("After writing, read the output back, validate it and print the first 5 dates")
            .required(false)
            .action(clap::ArgAction::SetTrue),
        )
}

fn parse_date_arg(s: &str) -> Result<chrono::NaiveDate, String> {
    utils::parse_date(s).map_err(|e| e.to_string())
}

/// Validates that the number of threads is a positive integer.
///
/// # Arguments
/// * `s` - String representation of the number of threads.
///
/// # Returns
/// * `Result<usize>` - Validated number of threads.
fn parse_usize_positive(s: &str) -> Result<usize, String> {
    match s.parse::<usize>() {
        Ok(0) => Err("Must be a positive integer".to_string()),
        Ok(n) => Ok(n),
        Err(e) => Err(format!("Not a valid number: {}", e)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Args, clap::Error> {
        let argv = std::iter::once("planetary_positions").chain(args.iter().copied());
        command().try_get_matches_from(argv).map(|m| Args::from_matches(&m))
    }

    #[test]
    fn test_defaults() {
        let args = parse(&[]).unwrap();
        assert_eq!(args.ephemeris, std::path::PathBuf::from("de421.bsp"));
        assert_eq!(args.start, chrono::NaiveDate::from_ymd_opt(2020, 1, 1).unwrap());
        assert_eq!(args.end, chrono::Local::now().date_naive());
        assert_eq!(args.output, std::path::PathBuf::from("planetary_positions.json"));
        assert_eq!(args.format, OutputFormat::Json);
        assert_eq!(args.threads, None);
        assert!(!args.check);
    }

    #[test]
    fn test_explicit_values() {
        let args = parse(&[
            "-e", "kernels/de440s.bsp",
            "--start", "2021-03-01",
            "-E", "2021-03-05",
            "-o", "out/positions.csv",
            "--format", "csv",
            "-t", "2",
            "--check",
        ])
        .unwrap();
        assert_eq!(args.ephemeris, std::path::PathBuf::from("kernels/de440s.bsp"));
        assert_eq!(args.end, chrono::NaiveDate::from_ymd_opt(2021, 3, 5).unwrap());
        assert_eq!(args.format, OutputFormat::Csv);
        assert_eq!(args.threads, Some(2));
        assert!(args.check);
    }

    #[test]
    fn test_rejects_bad_values() {
        assert!(parse(&["--start", "2020-13-01"]).is_err());
        assert!(parse(&["--threads", "0"]).is_err());
        assert!(parse(&["--format", "xml"]).is_err());
    }
}
