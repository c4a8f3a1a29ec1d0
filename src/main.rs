fn main() -> Result<(), Box<dyn std::error::Error>> {
    ripplescope::cli::run()
}
