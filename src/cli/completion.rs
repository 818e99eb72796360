//! Shell completion scripts

use clap::Command;
use clap_complete::{generate, Shell};
use std::io::{self, Write};

/// Write the completion script for `shell` to `out`
pub fn write_completions(shell: Shell, command: &mut Command, out: &mut dyn Write) {
    let name = command.get_name().to_string();
    generate(shell, command, name, out);
}

/// Print the completion script for `shell` to stdout
pub fn print_completions(shell: Shell, command: &mut Command) {
    write_completions(shell, command, &mut io::stdout());
}
