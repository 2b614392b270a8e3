use std::process::ExitCode;

fn main() -> ExitCode {
    rfqdesk_cli::run()
}
