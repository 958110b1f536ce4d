//! Entry point for the command-line interface.
#![forbid(unsafe_code)]

fn main() {
    if let Err(err) = ecotour_cli::run() {
        eprintln!("ecotour: {err}");
        std::process::exit(1);
    }
}
