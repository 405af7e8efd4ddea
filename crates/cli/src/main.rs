use anyhow::Result;

fn main() -> Result<()> {
    mockgen_cli::main_entry()
}
