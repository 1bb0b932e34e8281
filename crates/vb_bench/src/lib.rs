//! Query latency benchmarking.
//!
//! [`benchmark_queries`] runs a caller-supplied query function once per query,
//! strictly in order, and reports wall-clock statistics. The same standard
//! query set is used across databases so their numbers are comparable.

use std::fmt;
use std::io::{self, Write};
use std::time::Instant;

use tracing::debug;

/// Queries used when the caller does not supply any.
pub const STANDARD_TEST_QUERIES: [&str; 5] = [
    "outdoor hiking adventures",
    "cycling race performance",
    "travel destinations and tips",
    "fitness training techniques",
    "gear reviews and recommendations",
];

/// Spread below which a run is reported as consistent.
pub const CONSISTENCY_THRESHOLD_MS: f64 = 50.0;

const DISPLAY_QUERY_CHARS: usize = 40;

#[derive(Debug, Clone, Copy)]
pub struct BenchmarkOptions {
    /// Print one line per query and a summary.
    pub verbose: bool,
}

impl Default for BenchmarkOptions {
    fn default() -> Self {
        Self { verbose: true }
    }
}

/// Timings of one benchmark run.
#[derive(Debug, Clone, PartialEq)]
pub struct BenchmarkResult {
    /// Elapsed seconds per query, in query order.
    pub query_times: Vec<f64>,
    pub avg_ms: f64,
    pub min_ms: f64,
    pub max_ms: f64,
    pub total_queries: usize,
}

impl BenchmarkResult {
    pub fn from_times(query_times: Vec<f64>) -> Self {
        let total_queries = query_times.len();
        if total_queries == 0 {
            return Self {
                query_times,
                avg_ms: 0.0,
                min_ms: 0.0,
                max_ms: 0.0,
                total_queries,
            };
        }

        let min = query_times.iter().copied().fold(f64::INFINITY, f64::min);
        let max = query_times.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        // Summation rounding must not push the mean outside [min, max].
        let avg = (query_times.iter().sum::<f64>() / total_queries as f64).clamp(min, max);

        Self {
            query_times,
            avg_ms: avg * 1000.0,
            min_ms: min * 1000.0,
            max_ms: max * 1000.0,
            total_queries,
        }
    }

    pub fn is_consistent(&self) -> bool {
        self.max_ms - self.min_ms < CONSISTENCY_THRESHOLD_MS
    }
}

impl fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Performance Benchmark Results:")?;
        writeln!(f, "  - Queries tested: {}", self.total_queries)?;
        writeln!(f, "  - Average time: {:.1}ms", self.avg_ms)?;
        writeln!(f, "  - Min time: {:.1}ms", self.min_ms)?;
        writeln!(f, "  - Max time: {:.1}ms", self.max_ms)?;
        write!(
            f,
            "  - Consistency: {}",
            if self.is_consistent() { "Good" } else { "Variable" }
        )
    }
}

/// Time `query_fn` over `queries` (or [`STANDARD_TEST_QUERIES`]), printing
/// progress to stdout when `options.verbose` is set.
///
/// The first error returned by `query_fn` ends the run.
pub fn benchmark_queries<F, T, E>(
    query_fn: F,
    queries: Option<&[&str]>,
    options: BenchmarkOptions,
) -> Result<BenchmarkResult, E>
where
    F: FnMut(&str) -> Result<T, E>,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    run(query_fn, queries.unwrap_or(&STANDARD_TEST_QUERIES[..]), options, &mut out)
}

/// Like [`benchmark_queries`], writing progress to `out`.
pub fn run<F, T, E, W>(
    mut query_fn: F,
    queries: &[&str],
    options: BenchmarkOptions,
    out: &mut W,
) -> Result<BenchmarkResult, E>
where
    F: FnMut(&str) -> Result<T, E>,
    W: Write,
{
    let mut query_times = Vec::with_capacity(queries.len());

    // Progress output is best effort; a closed stdout must not fail the run.
    if options.verbose {
        let _ = writeln!(out, "Running performance benchmark...\n");
    }

    for &query in queries {
        let start = Instant::now();
        query_fn(query)?;
        let elapsed = start.elapsed().as_secs_f64();
        query_times.push(elapsed);

        debug!("Query '{}' took {:.3}s", query, elapsed);
        if options.verbose {
            let _ = writeln!(out, "'{}' -> {:.1}ms", display_query(query), elapsed * 1000.0);
        }
    }

    let result = BenchmarkResult::from_times(query_times);

    if options.verbose {
        let _ = writeln!(out, "\nPerformance Summary:");
        let _ = writeln!(out, "  - Average query time: {:.1}ms", result.avg_ms);
        let _ = writeln!(out, "  - Min query time: {:.1}ms", result.min_ms);
        let _ = writeln!(out, "  - Max query time: {:.1}ms", result.max_ms);
    }

    Ok(result)
}

fn display_query(query: &str) -> String {
    if query.chars().count() > DISPLAY_QUERY_CHARS {
        let head: String = query.chars().take(DISPLAY_QUERY_CHARS).collect();
        format!("{}...", head)
    } else {
        query.to_string()
    }
}
