// attribute.rs - typed attribute values and the single-attribute codec (§4.3)
//
// A declared dictionary type string maps to exactly one AttributeValue
// variant. Decoding never panics on malformed input; an attribute whose
// bytes don't fit its declared type is the caller's problem to log and
// skip, not this module's to crash on.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::crypto;
use crate::error::{CodecError, Result};

/// The User-Password attribute code (RFC 2865 §5.2); its `octets` value is
/// hidden on the wire and must be unhidden/hidden specially.
pub const USER_PASSWORD_CODE: u8 = 2;

/// The Message-Authenticator attribute code (RFC 2869); its value is a
/// 16-byte placeholder at encode time, patched in after the rest of the
/// packet is known.
pub const MESSAGE_AUTHENTICATOR_CODE: u8 = 80;

/// A decoded RADIUS attribute value, tagged by the dictionary type that
/// produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    Text(String),
    Bytes(Vec<u8>),
    Ipv4(Ipv4Addr),
    Ipv6(Ipv6Addr),
    /// Seconds since the Unix epoch, decoded from a big-endian u32. Per the
    /// source this was distilled from, values beyond 2106 (u32 overflow)
    /// are not specially handled.
    Date(u32),
    Short(u16),
    /// Covers `integer`, `signed`, and `tagged-integer`: all three are
    /// treated as an unsigned 32-bit big-endian bit pattern, matching the
    /// original's lack of true signed semantics.
    Integer(u32),
    Integer64(u64),
}

/// Context needed to decode/encode the special-cased attributes (User-Password).
pub struct CryptoContext<'a> {
    pub secret: &'a [u8],
    pub authenticator: &'a [u8; 16],
}

/// Normalize a dictionary type string to a canonical form, accepting the
/// case/spelling variants FreeRADIUS dictionaries use.
fn canonical_type(type_name: &str) -> &str {
    match type_name {
        "string" | "String" | "tagged-string" => "string",
        "octet" | "octets" => "octets",
        "integer" | "signed" | "tagged-integer" => "integer",
        other => other,
    }
}

/// Decode a single attribute's raw value bytes given its declared type.
///
/// Returns `Ok(None)` for declared types this codec doesn't decode (per
/// §4.3's "any other" row and the §9 Open Question list); the caller is
/// expected to log that and move on rather than treat it as an error.
pub fn decode(
    type_name: &str,
    code: u8,
    value: &[u8],
    ctx: &CryptoContext,
) -> Option<AttributeValue> {
    if code == USER_PASSWORD_CODE {
        return match crypto::unhide_password(ctx.secret, ctx.authenticator, value) {
            // The raw decoded form is the padded byte string; trailing zero
            // bytes are trimmed only by a caller converting this to a UTF-8
            // string, never here.
            Some(unhidden) => Some(AttributeValue::Bytes(unhidden)),
            None => {
                tracing::warn!(
                    code,
                    len = value.len(),
                    "User-Password value length is not a nonzero multiple of 16, skipping"
                );
                None
            }
        };
    }

    match canonical_type(type_name) {
        "string" => Some(AttributeValue::Text(String::from_utf8_lossy(value).into_owned())),
        "octets" => Some(AttributeValue::Bytes(value.to_vec())),
        "ipaddr" => {
            if value.len() != 4 {
                tracing::warn!(code, len = value.len(), "ipaddr attribute has wrong length");
                return None;
            }
            Some(AttributeValue::Ipv4(Ipv4Addr::new(
                value[0], value[1], value[2], value[3],
            )))
        }
        "ipv6addr" => {
            if value.len() != 16 {
                tracing::warn!(code, len = value.len(), "ipv6addr attribute has wrong length");
                return None;
            }
            let mut octets = [0u8; 16];
            octets.copy_from_slice(value);
            Some(AttributeValue::Ipv6(Ipv6Addr::from(octets)))
        }
        "date" => {
            if value.len() != 4 {
                tracing::warn!(code, len = value.len(), "date attribute has wrong length");
                return None;
            }
            Some(AttributeValue::Date(u32::from_be_bytes([
                value[0], value[1], value[2], value[3],
            ])))
        }
        "short" => {
            if value.len() != 2 {
                tracing::warn!(code, len = value.len(), "short attribute has wrong length");
                return None;
            }
            Some(AttributeValue::Short(u16::from_be_bytes([value[0], value[1]])))
        }
        "integer" => {
            if value.len() != 4 {
                tracing::warn!(code, len = value.len(), "integer attribute has wrong length");
                return None;
            }
            Some(AttributeValue::Integer(u32::from_be_bytes([
                value[0], value[1], value[2], value[3],
            ])))
        }
        "integer64" => {
            if value.len() != 8 {
                tracing::warn!(code, len = value.len(), "integer64 attribute has wrong length");
                return None;
            }
            let mut bytes = [0u8; 8];
            bytes.copy_from_slice(value);
            Some(AttributeValue::Integer64(u64::from_be_bytes(bytes)))
        }
        other => {
            tracing::warn!(code, type_name = other, "no decoder for declared attribute type");
            None
        }
    }
}

/// Encode a typed value to its raw wire bytes, given the dictionary's
/// declared type for the attribute it belongs to. `name` is used only for
/// error messages.
pub fn encode(
    type_name: &str,
    code: u8,
    name: &str,
    value: &AttributeValue,
    ctx: &CryptoContext,
) -> Result<Vec<u8>> {
    if code == USER_PASSWORD_CODE {
        let AttributeValue::Bytes(cleartext) = value else {
            return Err(unsupported(name, value, "User-Password requires a byte value"));
        };
        return Ok(crypto::hide_password(ctx.secret, ctx.authenticator, cleartext));
    }
    if code == MESSAGE_AUTHENTICATOR_CODE {
        return Ok(vec![0u8; 16]);
    }

    match (canonical_type(type_name), value) {
        ("string", AttributeValue::Text(s)) => Ok(s.as_bytes().to_vec()),
        ("octets", AttributeValue::Bytes(b)) => Ok(b.clone()),
        ("ipaddr", AttributeValue::Ipv4(addr)) => Ok(addr.octets().to_vec()),
        ("ipv6addr", AttributeValue::Ipv6(addr)) => Ok(addr.octets().to_vec()),
        ("date", AttributeValue::Date(secs)) => Ok(secs.to_be_bytes().to_vec()),
        ("short", AttributeValue::Short(v)) => Ok(v.to_be_bytes().to_vec()),
        ("integer", AttributeValue::Integer(v)) => Ok(v.to_be_bytes().to_vec()),
        ("integer64", AttributeValue::Integer64(v)) => Ok(v.to_be_bytes().to_vec()),
        _ => Err(unsupported(
            name,
            value,
            &format!("value shape does not match declared type `{type_name}`"),
        )),
    }
}

fn unsupported(name: &str, value: &AttributeValue, reason: &str) -> CodecError {
    CodecError::UnsupportedAttributeType {
        name: name.to_string(),
        reason: format!("{reason} (value: {value:?})"),
    }
}
