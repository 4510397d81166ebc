fn main() {
    if let Err(e) = syncgen::cli::run_cli() {
        eprintln!("❌ Error: {e:#}");
        std::process::exit(1);
    }
}
