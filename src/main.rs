use std::process::ExitCode;

use oldnew::ui::output;

fn main() -> ExitCode {
    match oldnew::cli::run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            output::error(err);
            ExitCode::FAILURE
        }
    }
}
