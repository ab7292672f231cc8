//! QR code generation from arbitrary byte strings.
//!
//! The encoding pipeline runs mode detection, version selection, bit stream
//! assembly, Reed-Solomon error correction, block interleaving, matrix
//! construction and mask selection, and hands back the finished module grid.
//!
//! ```no_run
//! let qr = qrterm::encode(b"EPFLLAUSANNE2016SWITZERLAND").unwrap();
//! print!("{}", qr.render_terminal());
//! ```

pub mod builder;
mod common;

pub use builder::{Module, QRBuilder, QR};
pub use common::codec::Mode;
pub use common::error::{QRError, QRResult};
pub use common::mask::MaskPattern;
pub use common::metadata::{Color, Version};

/// Builds a QR symbol with every setting derived from the input.
pub fn encode(data: &[u8]) -> QRResult<QR> {
    QRBuilder::new(data).build()
}
