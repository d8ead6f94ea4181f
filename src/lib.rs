//! radius-codec: a RADIUS (RFC 2865/2866/2869) packet codec.
//!
//! This crate parses RADIUS datagrams into structured packets, builds
//! outgoing packets with correct authenticators, validates the request and
//! Message-Authenticator integrity checks, and resolves attributes against a
//! FreeRADIUS-format dictionary. It owns none of the surrounding machinery —
//! no sockets, no retry/proxy policy, no authentication backends. The host
//! supplies transport, a shared secret, and (via the `tracing` ecosystem) a
//! subscriber to receive the warnings this crate emits for tolerated,
//! per-attribute parse issues.
//!
//! # Examples
//!
//! ```
//! use radius_codec::{AttributeValue, Dictionary, Packet, PacketCode, PacketCodec};
//!
//! let dictionary = Dictionary::from_str(
//!     "ATTRIBUTE\tUser-Name\t1\tstring\nATTRIBUTE\tNAS-Port\t5\tinteger\n",
//! );
//! let codec = PacketCodec::new(&dictionary);
//!
//! let mut request = Packet::new(PacketCode::AccessRequest, 1, b"secret".to_vec());
//! request.add_attribute("User-Name", AttributeValue::Text("nemo".to_string()));
//! request.add_attribute("NAS-Port", AttributeValue::Integer(3));
//!
//! let bytes = codec.serialize(&request).unwrap();
//! let parsed = codec.parse(&bytes, b"secret").unwrap();
//! assert_eq!(parsed.get_one("User-Name"), request.get_one("User-Name"));
//! ```

pub mod attribute;
pub mod codec;
pub mod crypto;
pub mod dictionary;
pub mod error;
pub mod packet;

pub use attribute::AttributeValue;
pub use codec::{read_datagram, PacketCodec};
pub use dictionary::{Dictionary, DictionaryAttribute, DictionaryVendorAttribute};
pub use error::{CodecError, Result};
pub use packet::{Packet, PacketCode};

/// Library version, taken from `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
