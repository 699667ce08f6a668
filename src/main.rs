use std::process::ExitCode;

use meshguard::{cli, MeshguardError};

fn main() -> ExitCode {
    match cli::run_cli() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            let code = e.downcast_ref::<MeshguardError>().map(MeshguardError::exit_code).unwrap_or(1);
            ExitCode::from(code)
        }
    }
}
