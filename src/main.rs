const USAGE: &str = "Usage: alle [--version | -V] [--help | -h]\n\
Configuration is read from ALLE_* environment variables.";

#[tokio::main]
async fn main() {
  // Minimal CLI: support --version/-V and --help/-h
  let mut args = std::env::args().skip(1);
  if let Some(arg) = args.next() {
    if arg == "--version" || arg == "-V" {
      println!("alle {}", env!("CARGO_PKG_VERSION"));
      return;
    }
    if arg == "--help" || arg == "-h" {
      eprintln!("{USAGE}");
      return;
    }
  }

  if let Err(e) = alle::app::run().await {
    eprintln!("error: {e}");
    std::process::exit(1);
  }
}
