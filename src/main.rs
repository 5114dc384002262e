fn main() {
    if let Err(err) = csv_obfuscate::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
