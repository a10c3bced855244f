pub mod cli;
pub mod emit;
pub mod error;
pub mod load;
pub mod schema;

fn main() -> anyhow::Result<()> {
    let command_line_interface = cli::CommandLineInterface::load();
    command_line_interface.run()
}
