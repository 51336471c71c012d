//! Version command

/// Run the version command.
pub fn run() {
    println!("flotilla {}", env!("CARGO_PKG_VERSION"));
}
