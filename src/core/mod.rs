pub mod cancel;
pub mod error;

pub use cancel::{CancellableReader, CancellableWriter, CancellationToken};
pub use error::{ConvertError, Result};
