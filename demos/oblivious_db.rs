//! An example of using Path-ORAM to obliviously serve a small indexed
//! database of 4-byte records.

use path_oram::{Client, OramError, Server};
use rand::{rngs::OsRng, Rng};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};

const DB_SIZE: u64 = 64;
// A stand-in for the indexed database you want to obliviously serve.
const DATABASE: [[u8; 4]; DB_SIZE as usize] = [*b"...."; DB_SIZE as usize];

fn main() -> Result<(), OramError> {
    TermLogger::init(
        LevelFilter::Debug,
        Config::default(),
        TerminalMode::Mixed,
        ColorChoice::Auto,
    )
    .expect("failed to initialize logger");

    let mut rng = OsRng;
    let mut server = Server::new(DB_SIZE)?;
    let mut client = Client::new(&mut server, &mut rng)?;

    for (i, bytes) in DATABASE.iter().enumerate() {
        client.store(&mut server, i as u64, bytes, &mut rng)?;
    }

    let num_operations = 100;
    for _ in 0..num_operations {
        let random_index = rng.gen_range(0..DB_SIZE);
        let _ = client.retrieve(&mut server, random_index, &mut rng)?;
    }

    Ok(())
}
