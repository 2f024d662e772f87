fn main() {
    if let Err(err) = copy_as_insert::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
