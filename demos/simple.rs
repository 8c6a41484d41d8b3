//! A very simple demonstration of the use of Path-ORAM.

use path_oram::{Client, Server};
use rand::rngs::OsRng;
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

fn main() -> Result<(), path_oram::OramError> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("failed to initialize logger");

    let mut rng = OsRng;
    let mut server = Server::new(64)?;
    let mut client = Client::new(&mut server, &mut rng)?;

    client.store(&mut server, 0, b"TEST", &mut rng)?;
    let value = client.retrieve(&mut server, 0, &mut rng)?;
    println!("{:?}", value);
    Ok(())
}
