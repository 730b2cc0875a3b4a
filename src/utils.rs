use crate::positions;

/// Format of date keys in the output document.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Configures a custom Rayon thread pool with specified size.
///
/// This function creates a new Rayon thread pool with the exact number of threads specified.
/// It's useful when you want to control the level of parallelism explicitly, separate from
/// the global Rayon pool.
///
/// # Arguments
/// * `num_threads` - Desired number of threads for the pool.
///
/// # Returns
/// * `Result<ThreadPool>` - Created thread pool or an error if creation fails.
pub fn configure_thread_pool(num_threads: usize) -> anyhow::Result<rayon::ThreadPool> {
    rayon::ThreadPoolBuilder::new()
        .num_threads(num_threads)
        .build()
        .map_err(|e| anyhow::anyhow!("Failed to build thread pool: {}", e))
}

/// Parses a `YYYY-MM-DD` string into a calendar date.
///
/// # Arguments
/// * `date_str` - A string slice such as "2020-01-01".
///
/// # Returns
/// * `anyhow::Result<chrono::NaiveDate>` - The parsed date, or an error naming the input.
pub fn parse_date(date_str: &str) -> anyhow::Result<chrono::NaiveDate> {
    chrono::NaiveDate::parse_from_str(date_str.trim(), DATE_FORMAT)
        .map_err(|e| anyhow::anyhow!("Invalid date {:?} (expected YYYY-MM-DD): {}", date_str, e))
}

/// Formats a date as an output document key.
pub fn date_key(date: chrono::NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// Prints the first `count` records of a position document.
///
/// # Arguments
/// * `document` - Document to print, in date order.
/// * `count` - The maximum number of records to print (e.g., first 5).
///
/// # Example Output
/// ```text
///  - 2020-01-01: mercury: 277.41, venus: 320.96, earth: 100.38, ..., moon: 338.12
/// ```
pub fn print_records(document: &positions::PositionDocument, count: usize) {
    for (date, record) in document.iter().take(count) {
        let fields = record
            .iter()
            .map(|(body, lon)| format!("{}: {:.2}", body, lon))
            .collect::<Vec<_>>()
            .join(", ");
        println!(" - {}: {}", date, fields);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_date() {
        let date = parse_date("2020-02-29").unwrap();
        assert_eq!(date_key(date), "2020-02-29");
        assert_eq!(parse_date(" 2021-01-05 ").unwrap(), chrono::NaiveDate::from_ymd_opt(2021, 1, 5).unwrap());
    }

    #[test]
    fn test_parse_date_rejects_invalid() {
        assert!(parse_date("2021-02-29").is_err());
        assert!(parse_date("01/02/2020").is_err());
        assert!(parse_date("").is_err());
    }

    #[test]
    fn test_date_key_is_zero_padded() {
        let date = chrono::NaiveDate::from_ymd_opt(987, 3, 4).unwrap();
        assert_eq!(date_key(date), "0987-03-04");
    }

    #[test]
    fn test_configure_thread_pool() {
        let pool = configure_thread_pool(2).unwrap();
        assert_eq!(pool.current_num_threads(), 2);
    }
}
