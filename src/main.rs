fn main() {
    if let Err(err) = control_diagram::run() {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
}
