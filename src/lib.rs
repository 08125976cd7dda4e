pub mod wire_type;
pub mod reader;
pub mod error;
pub mod decoder;
pub mod config;
pub mod guard;


pub use wire_type::*;
pub use error::{ElementPosition, Error, Result};
pub use decoder::{
    skip, skip_with_depth, BinaryDecoder, ContainerKind, FieldHeader, ListHeader, MapHeader,
    Protocol, SetHeader, DEFAULT_MAX_SKIP_DEPTH,
};
pub use config::GuardConfig;
pub use guard::GuardedDecoder;



/// Checks that `buffer` holds exactly one well-formed value of wire type
/// `ty`, reading every container header through a `GuardedDecoder`.
///
/// When `config` leaves the budget unset the buffer length is used. A
/// negative budget stays disabled.
pub fn validate(buffer: &[u8], ty: TypeTag, config: &GuardConfig) -> Result<()> {
    let mut config = *config;
    if config.max_read_length.is_none() {
        config.max_read_length = GuardConfig::for_buffer(buffer.len()).max_read_length;
    }

    let mut decoder = config.decoder(buffer);
    skip(&mut decoder, ty.as_u8())?;

    let remaining = decoder.get_ref().remaining();
    if remaining > 0 {
        return Err(Error::TrailingData(remaining));
    }
    Ok(())
}
