use tdl::cli::{exit_code_for, format_error, run};

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().filter_or("TDL_LOG", "warn")).init();
    // Only fails on old Windows consoles; colors are cosmetic
    let _ = enable_ansi_support::enable_ansi_support();

    if let Err(e) = run() {
        eprintln!("{}", format_error(&e));
        std::process::exit(exit_code_for(&e));
    }
}
