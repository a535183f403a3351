fn main() {
    if let Err(err) = brickset::run() {
        eprintln!("Error: {err}");
        std::process::exit(1);
    }
}
