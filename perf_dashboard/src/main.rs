use anyhow::Result;
use perf_dashboard::cli;

// Main entry point
fn main() -> Result<()> {
    cli::handle_calls()
}
