use std::env;
use std::error::Error;

use qrterm::QRBuilder;

fn main() -> Result<(), Box<dyn Error>> {
    let data = env::args().nth(1).ok_or("usage: qrterm <data>")?;

    let qr = QRBuilder::new(data.as_bytes()).build()?;
    print!("{}", qr.render_terminal());

    Ok(())
}
