// Output formatting — terminal display for the `check` subcommand.

pub mod terminal;
