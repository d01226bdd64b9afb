use clap::Parser;

fn main() {
    let cli = bilicopy_lib::cli::Cli::parse();
    std::process::exit(bilicopy_lib::run(cli))
}
