fn main() {
    ipa_results::init_tracing();
    std::process::exit(ipa_results::cli::run());
}
