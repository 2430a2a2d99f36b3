pub mod claims;
pub mod codec;
pub mod errors;

pub use claims::Claims;
pub use claims::Subject;
pub use codec::TokenCodec;
pub use codec::MIN_SECRET_LENGTH;
pub use errors::TokenError;
