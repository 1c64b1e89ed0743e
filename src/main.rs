fn main() {
    if let Err(e) = medxact_lib::run() {
        eprintln!("medxact: {e}");
        std::process::exit(1);
    }
}
