use std::process::ExitCode;

fn main() -> ExitCode {
    match covid_fr_series::app::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{err}");
            ExitCode::from(err.exit_code())
        }
    }
}
