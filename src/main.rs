use std::process::ExitCode;

use scope_reparent::cli;
use scope_reparent::console::Terminal;

fn main() -> color_eyre::Result<ExitCode> {
    color_eyre::install()?;

    let mut console = Terminal::stdio();
    let status = cli::run(std::env::args_os(), &mut console);
    Ok(ExitCode::from(status))
}
