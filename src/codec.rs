// codec.rs - wire-format parsing and serialization (§4.4)
//
// PacketCodec pairs a shared, read-only Dictionary with the pure
// parse/serialize algorithms. Packet-level failures (bad framing, bad
// authenticators, attributes that run past the packet end) abort the
// operation; per-attribute dictionary misses and undecodable values are
// logged and skipped, never raised as errors here.

use std::io::Read;

use crate::attribute::{self, CryptoContext, MESSAGE_AUTHENTICATOR_CODE};
use crate::crypto;
use crate::dictionary::Dictionary;
use crate::error::{CodecError, Result};
use crate::packet::{Packet, PacketCode};

const HEADER_LEN: usize = 20;
const MAX_PACKET_LEN: usize = 65535;

/// Pairs a shared dictionary with the parse/serialize algorithms. Cheap to
/// construct; hold one per dictionary and reuse it across every packet.
pub struct PacketCodec<'d> {
    dictionary: &'d Dictionary,
}

impl<'d> PacketCodec<'d> {
    pub fn new(dictionary: &'d Dictionary) -> Self {
        Self { dictionary }
    }

    /// Parse a complete datagram into a `Packet`.
    ///
    /// Framing errors, a failed Request Authenticator (Accounting-Request /
    /// Disconnect-Request), and a failed Message-Authenticator all abort
    /// parsing. Everything else — an attribute with no dictionary entry, a
    /// value that doesn't fit its declared type — is logged and the
    /// attribute is simply omitted from the resulting packet.
    pub fn parse(&self, data: &[u8], shared_secret: &[u8]) -> Result<Packet> {
        if data.len() < HEADER_LEN {
            return Err(CodecError::InvalidFraming(format!(
                "packet length {} is below the {HEADER_LEN}-byte minimum",
                data.len()
            )));
        }

        let declared_length = u16::from_be_bytes([data[2], data[3]]) as usize;
        if declared_length != data.len() {
            return Err(CodecError::InvalidFraming(format!(
                "declared length {declared_length} does not match buffer length {}",
                data.len()
            )));
        }

        let code = PacketCode::from_u8(data[0])
            .ok_or_else(|| CodecError::InvalidFraming(format!("unrecognized packet code {}", data[0])))?;
        let identifier = data[1];
        let mut authenticator = [0u8; 16];
        authenticator.copy_from_slice(&data[4..20]);

        if matches!(code, PacketCode::AccountingRequest | PacketCode::DisconnectRequest) {
            let mut scratch = data.to_vec();
            scratch[4..20].fill(0);
            let expected = crypto::request_authenticator(&scratch, shared_secret);
            if expected != authenticator {
                return Err(CodecError::InvalidRequestAuthenticator);
            }
        }

        let mut packet = Packet {
            code,
            identifier,
            authenticator,
            shared_secret: shared_secret.to_vec(),
            attributes: Vec::new(),
            request_authenticator: None,
        };

        let ctx = CryptoContext {
            secret: shared_secret,
            authenticator: &authenticator,
        };
        let mut message_authenticator_position: Option<usize> = None;

        let mut offset = HEADER_LEN;
        while offset < declared_length {
            if offset + 2 > declared_length {
                return Err(CodecError::MalformedAttribute { offset, length: 0 });
            }
            let attr_type = data[offset];
            let attr_len = data[offset + 1] as usize;
            if attr_len < 2 || offset + attr_len > declared_length {
                return Err(CodecError::MalformedAttribute {
                    offset,
                    length: attr_len,
                });
            }
            let value = &data[offset + 2..offset + attr_len];

            if attr_type == 26 {
                self.parse_vsa(&mut packet, value, &ctx);
            } else if let Some(attr) = self.dictionary.get_by_code(attr_type) {
                if attr_type == MESSAGE_AUTHENTICATOR_CODE {
                    if attr_len == 18 {
                        message_authenticator_position = Some(offset);
                    } else {
                        tracing::warn!(offset, attr_len, "Message-Authenticator has unexpected length, skipping HMAC check");
                    }
                }
                if let Some(decoded) = attribute::decode(&attr.type_name, attr_type, value, &ctx) {
                    packet.attributes.push((attr.name.clone(), decoded));
                }
            } else {
                tracing::warn!(code = attr_type, offset, "unknown attribute, skipping");
            }

            offset += attr_len;
        }

        if let Some(position) = message_authenticator_position {
            let received = &data[position + 2..position + 18];
            let mut scratch = data[..declared_length].to_vec();
            scratch[position + 2..position + 18].fill(0);
            let expected = crypto::message_authenticator(&scratch, shared_secret);
            if expected != received {
                return Err(CodecError::InvalidMessageAuthenticator);
            }
        }

        Ok(packet)
    }

    fn parse_vsa(&self, packet: &mut Packet, value: &[u8], ctx: &CryptoContext) {
        if value.len() < 6 {
            tracing::warn!(len = value.len(), "vendor-specific attribute header too short, skipping");
            return;
        }
        let vendor_id = u32::from_be_bytes([value[0], value[1], value[2], value[3]]);
        let vendor_code = value[4] as u32;
        let vsa_value = &value[6..];

        match self.dictionary.get_vendor(vendor_id, vendor_code) {
            None => {
                tracing::warn!(vendor_id, vendor_code, "unknown vendor attribute, skipping");
            }
            Some(attr) => {
                // Vendor attributes never carry the User-Password/Message-Authenticator
                // special cases, so pass a code that can't collide with either.
                if let Some(decoded) = attribute::decode(&attr.type_name, 0, vsa_value, ctx) {
                    packet.attributes.push((attr.name.clone(), decoded));
                }
            }
        }
    }

    /// Serialize `packet` against this codec's dictionary.
    ///
    /// Resolving an attribute name the dictionary doesn't know, or encoding
    /// a value whose shape doesn't match its declared type, aborts the
    /// whole operation: unlike parsing, there is no "skip it" option for a
    /// packet the caller explicitly asked to send.
    pub fn serialize(&self, packet: &Packet) -> Result<Vec<u8>> {
        let mut body = Vec::new();
        let mut message_authenticator_position: Option<usize> = None;

        let ctx = CryptoContext {
            secret: &packet.shared_secret,
            authenticator: &packet.authenticator,
        };

        for (name, value) in packet.attributes.iter() {
            if let Some(attr) = self.dictionary.get_by_name(name) {
                let encoded = attribute::encode(&attr.type_name, attr.code, name, value, &ctx)?;
                if encoded.len() + 2 > 255 {
                    return Err(CodecError::UnsupportedAttributeType {
                        name: name.clone(),
                        reason: format!("encoded value of {} bytes exceeds the 253-byte maximum", encoded.len()),
                    });
                }
                if attr.code == MESSAGE_AUTHENTICATOR_CODE {
                    message_authenticator_position = Some(HEADER_LEN + body.len());
                }
                body.push(attr.code);
                body.push((encoded.len() + 2) as u8);
                body.extend_from_slice(&encoded);
            } else if let Some(vsa) = self.dictionary.get_vendor_by_name(name) {
                let encoded = attribute::encode(&vsa.type_name, 0, name, value, &ctx)?;
                let vsa_length = 2 + encoded.len();
                let total_length = 8 + encoded.len();
                if total_length > 255 {
                    return Err(CodecError::UnsupportedAttributeType {
                        name: name.clone(),
                        reason: format!("encoded VSA of {total_length} bytes exceeds the 255-byte maximum"),
                    });
                }
                body.push(26);
                body.push(total_length as u8);
                body.extend_from_slice(&vsa.vendor_id.to_be_bytes());
                body.push(vsa.vendor_code as u8);
                body.push(vsa_length as u8);
                body.extend_from_slice(&encoded);
            } else {
                return Err(CodecError::UnknownAttribute(name.clone()));
            }
        }

        let total_len = HEADER_LEN + body.len();
        if total_len > MAX_PACKET_LEN {
            return Err(CodecError::UnsupportedAttributeType {
                name: "<packet>".to_string(),
                reason: format!("total packet length {total_len} exceeds {MAX_PACKET_LEN}"),
            });
        }

        let mut out = Vec::with_capacity(total_len);
        out.push(packet.code.as_u8());
        out.push(packet.identifier);
        out.extend_from_slice(&(total_len as u16).to_be_bytes());
        out.extend_from_slice(&packet.authenticator);
        out.extend_from_slice(&body);

        if packet.code.uses_request_authenticator() {
            let mut scratch = out.clone();
            scratch[4..20].fill(0);
            let authenticator = crypto::request_authenticator(&scratch, &packet.shared_secret);
            out[4..20].copy_from_slice(&authenticator);
        } else if let Some(request_authenticator) = packet.request_authenticator {
            out[4..20].copy_from_slice(&request_authenticator);
            let authenticator = crypto::response_authenticator(&out, &packet.shared_secret);
            out[4..20].copy_from_slice(&authenticator);
        }
        // Else: AccessRequest/StatusServer keep the random authenticator
        // generated at construction time.

        if let Some(position) = message_authenticator_position {
            out[position + 2..position + 18].fill(0);
            let hmac = crypto::message_authenticator(&out, &packet.shared_secret);
            out[position + 2..position + 18].copy_from_slice(&hmac);
        }

        Ok(out)
    }
}

/// Read one length-prefixed RADIUS datagram from a caller-supplied byte
/// stream (RFC 6613 TCP framing): read 4 header bytes, parse the big-endian
/// length from bytes `[2..4]`, then read the remaining `length - 4` bytes.
///
/// End-of-stream before a full 4-byte header is available yields an empty
/// `Vec` rather than an error (the caller is expected to treat that as "no
/// more datagrams"). A stream that ends partway through the body is a
/// framing error.
pub fn read_datagram<R: Read>(stream: &mut R) -> Result<Vec<u8>> {
    let mut header = [0u8; 4];
    let mut filled = 0usize;
    while filled < header.len() {
        let n = stream.read(&mut header[filled..])?;
        if n == 0 {
            return Ok(Vec::new());
        }
        filled += n;
    }

    let length = u16::from_be_bytes([header[2], header[3]]) as usize;
    if length < header.len() {
        return Err(CodecError::InvalidFraming(format!(
            "declared length {length} is shorter than the 4-byte header"
        )));
    }

    let mut buf = vec![0u8; length];
    buf[..4].copy_from_slice(&header);
    let mut filled = 4usize;
    while filled < length {
        let n = stream.read(&mut buf[filled..])?;
        if n == 0 {
            return Err(CodecError::InvalidFraming(format!(
                "stream ended after {filled} of {length} declared bytes"
            )));
        }
        filled += n;
    }

    Ok(buf)
}
