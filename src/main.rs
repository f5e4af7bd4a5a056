fn main() {
    if let Err(err) = flowlens::run() {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
