use anyhow::Result;
use chess_opponent::console::ConsoleHandler;

fn main() -> Result<()> {
    let mut console = ConsoleHandler::new();
    console.run()
}
