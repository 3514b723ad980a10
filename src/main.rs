use eyre::Result;
use seird::prelude::*;

fn main() -> Result<()> {
    let settings = match std::env::args().nth(1) {
        Some(path) => settings::read(path)?,
        None => Settings::default(),
    };
    run(settings)?;
    Ok(())
}
