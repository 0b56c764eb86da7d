fn main() {
    if let Err(e) = easyhosts::cli::run() {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
}
