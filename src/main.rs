mod bodies;
mod cli;
mod dates;
mod ephemeris;
mod file_processing;
mod output;
mod positions;
mod progress;
mod read_output;
mod spk;
mod timescale;
mod utils;

/// Main entry point of the application.
///
/// This function orchestrates the entire workflow:
/// 1. Parses command-line arguments.
/// 2. Validates the ephemeris path and the date range.
/// 3. Determines the number of threads to use.
/// 4. Loads the SPK kernel and computes one position record per date.
/// 5. Writes the completed document to the output file.
/// 6. Optionally reads the output back and displays the first few dates.
///
/// # Returns
///
/// * `anyhow::Result<()>` - Success or an error if any step fails.
fn main() -> anyhow::Result<()> {
    let total_start = std::time::Instant::now();
    let args = cli::Args::parse();
    println!("Start computing positions...");

    let range = dates::DateRange::new(args.start, args.end);
    if range.is_empty() {
        return Err(anyhow::anyhow!(
            "End date {} is before start date {}",
            args.end,
            args.start
        ));
    }

    file_processing::check_path(&args.ephemeris)?;
    file_processing::ensure_parent_dir_exist(&args.output)?;

    let effective_threads = match args.threads {
        Some(n) if n > 0 => {
            let max_threads = num_cpus::get();
            if n > max_threads {
                println!("⚠️ Warning: Limiting thread count to {} (max available)", max_threads);
                max_threads
            } else { n }
        }
        Some(_) => return Err(anyhow::anyhow!("Number of threads must be a positive integer")),
        None => rayon::current_num_threads(),
    };
    println!("🚀 Using {} thread(s)", effective_threads);

    let kernel = spk::SpkKernel::open(&args.ephemeris)?;
    println!(
        "🔭 Loaded {} segments from {}",
        kernel.segments().len(),
        args.ephemeris.display()
    );
    println!(
        "📅 {} dates from {} to {}",
        range.len(),
        range.start(),
        range.end()
    );

    let document = if args.threads.is_some() {
        let local_pool = utils::configure_thread_pool(effective_threads)?;
        local_pool.install(|| progress::compute_with_progress(&kernel, &range))?
    } else {
        progress::compute_with_progress(&kernel, &range)?
    };

    let written = output::save_document(&document, &args.output, args.format)?;
    println!(
        "✅ Wrote {} dates ({} bytes) to {} in {:?} seconds",
        document.len(),
        written,
        args.output.display(),
        total_start.elapsed().as_secs_f64()
    );

    if args.check {
        println!("Start reading...");
        let start = std::time::Instant::now();
        read_output::check_output(&args.output, args.format, &range)?;
        println!(
            "✅ Reading file complete in {:?} seconds",
            start.elapsed().as_secs_f64()
        );
    }
    Ok(())
}
