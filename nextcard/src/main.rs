//! Next Card headless driver.
//!
//! A line-oriented front end over `nextcard-core`: toggle categories, draw
//! cards, and keep category preferences between runs.
//!
//! ```bash
//! cargo run -p nextcard -- --seed 7 --avoid-repeats
//! ```

mod headless;

use headless::HeadlessOptions;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let options = match HeadlessOptions::from_args(&args) {
        Ok(options) => options,
        Err(e) => {
            eprintln!("Error: {e}");
            eprintln!("Run with --help for usage.");
            std::process::exit(2);
        }
    };

    if let Err(e) = headless::run_headless(options).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
    Ok(())
}

fn print_help() {
    println!("Next Card - push the button, start the conversation");
    println!();
    println!("USAGE:");
    println!("    nextcard [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --catalog <path>    Prompt catalog JSON (default: bundled catalog)");
    println!("    --data-dir <path>   Where category preferences are kept");
    println!("    --seed <n>          Seed the card draws for a reproducible run");
    println!("    --avoid-repeats     Never draw the same card twice in a row");
    println!("    -h, --help          Print this help");
    println!();
    println!("ENVIRONMENT:");
    println!("    NEXTCARD_CATALOG    Same as --catalog");
    println!("    NEXTCARD_DATA_DIR   Same as --data-dir");
    println!("    RUST_LOG            Log filter (default: warn)");
}
