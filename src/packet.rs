// packet.rs - the in-memory RADIUS packet model (§3)
//
// A Packet owns its attribute values exclusively. The Dictionary it will be
// serialized/parsed against is supplied separately (by PacketCodec) and is
// never owned by the Packet itself.

use crate::attribute::AttributeValue;
use crate::crypto;

/// RADIUS packet codes (RFC 2865/2866/5176), carried in the header's first
/// octet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PacketCode {
    AccessRequest,
    AccessAccept,
    AccessReject,
    AccountingRequest,
    AccountingResponse,
    AccessChallenge,
    StatusServer,
    DisconnectRequest,
    DisconnectAck,
    DisconnectNak,
    CoaRequest,
    CoaAck,
    CoaNak,
}

impl PacketCode {
    pub fn from_u8(code: u8) -> Option<Self> {
        Some(match code {
            1 => Self::AccessRequest,
            2 => Self::AccessAccept,
            3 => Self::AccessReject,
            4 => Self::AccountingRequest,
            5 => Self::AccountingResponse,
            11 => Self::AccessChallenge,
            12 => Self::StatusServer,
            40 => Self::DisconnectRequest,
            41 => Self::DisconnectAck,
            42 => Self::DisconnectNak,
            43 => Self::CoaRequest,
            44 => Self::CoaAck,
            45 => Self::CoaNak,
            _ => return None,
        })
    }

    pub fn as_u8(self) -> u8 {
        match self {
            Self::AccessRequest => 1,
            Self::AccessAccept => 2,
            Self::AccessReject => 3,
            Self::AccountingRequest => 4,
            Self::AccountingResponse => 5,
            Self::AccessChallenge => 11,
            Self::StatusServer => 12,
            Self::DisconnectRequest => 40,
            Self::DisconnectAck => 41,
            Self::DisconnectNak => 42,
            Self::CoaRequest => 43,
            Self::CoaAck => 44,
            Self::CoaNak => 45,
        }
    }

    /// Packets whose authenticator on the wire is a Request Authenticator
    /// computed over the packet body, rather than a random value or a
    /// Response Authenticator tied to a request.
    pub fn uses_request_authenticator(self) -> bool {
        matches!(
            self,
            Self::AccountingRequest | Self::DisconnectRequest | Self::CoaRequest
        )
    }

    /// Packets whose authenticator is generated from a strong random
    /// source at construction time (Invariant 1), rather than computed at
    /// serialize time.
    pub fn uses_random_authenticator(self) -> bool {
        matches!(self, Self::AccessRequest | Self::StatusServer)
    }
}

/// A RADIUS packet: header fields plus an ordered multi-map of attribute
/// values. The same attribute name may appear more than once; insertion
/// order is preserved and is the order attributes are serialized in.
#[derive(Debug, Clone)]
pub struct Packet {
    pub(crate) code: PacketCode,
    pub(crate) identifier: u8,
    pub(crate) authenticator: [u8; 16],
    pub(crate) shared_secret: Vec<u8>,
    pub(crate) attributes: Vec<(String, AttributeValue)>,
    /// Present only on packets built via `create_response`: the
    /// authenticator of the request this packet answers, consumed when
    /// computing the Response Authenticator at serialize time.
    pub(crate) request_authenticator: Option<[u8; 16]>,
}

impl Packet {
    /// Build a new request packet. For `AccessRequest` and `StatusServer`
    /// the authenticator is generated here from a cryptographically strong
    /// random source with no zero bytes (Invariant 1); other codes start
    /// with a zeroed authenticator that `PacketCodec::serialize` overwrites
    /// when it computes the Request Authenticator.
    ///
    /// A `StatusServer` packet is seeded with a Message-Authenticator
    /// placeholder (Invariant 2): its real value is computed during
    /// serialization.
    pub fn new(code: PacketCode, identifier: u8, shared_secret: impl Into<Vec<u8>>) -> Self {
        let authenticator = if code.uses_random_authenticator() {
            crypto::random_authenticator()
        } else {
            [0u8; 16]
        };

        let mut packet = Self {
            code,
            identifier,
            authenticator,
            shared_secret: shared_secret.into(),
            attributes: Vec::new(),
            request_authenticator: None,
        };

        if code == PacketCode::StatusServer {
            packet
                .attributes
                .push(("Message-Authenticator".to_string(), AttributeValue::Bytes(vec![0u8; 16])));
        }

        packet
    }

    /// Build a response packet for `self`: inherits identifier, shared
    /// secret, and `self`'s authenticator as the retained request
    /// authenticator used to compute the Response Authenticator at
    /// serialize time.
    pub fn create_response(&self, code: PacketCode) -> Self {
        Self {
            code,
            identifier: self.identifier,
            authenticator: [0u8; 16],
            shared_secret: self.shared_secret.clone(),
            attributes: Vec::new(),
            request_authenticator: Some(self.authenticator),
        }
    }

    pub fn code(&self) -> PacketCode {
        self.code
    }

    pub fn identifier(&self) -> u8 {
        self.identifier
    }

    pub fn authenticator(&self) -> &[u8; 16] {
        &self.authenticator
    }

    pub fn shared_secret(&self) -> &[u8] {
        &self.shared_secret
    }

    pub fn request_authenticator(&self) -> Option<&[u8; 16]> {
        self.request_authenticator.as_ref()
    }

    /// Append a value for `name`. Does not overwrite any existing values
    /// for that name; RADIUS attributes may repeat.
    pub fn add_attribute(&mut self, name: impl Into<String>, value: AttributeValue) {
        self.attributes.push((name.into(), value));
    }

    /// All values currently set for `name`, in insertion order.
    pub fn get_all(&self, name: &str) -> Vec<&AttributeValue> {
        self.attributes
            .iter()
            .filter(|(n, _)| n == name)
            .map(|(_, v)| v)
            .collect()
    }

    /// The single value for `name`. Fails (returns `None`) both when no
    /// value is present and when more than one is, since a caller asking
    /// for "the" value has a different contract than one asking for "all"
    /// values.
    pub fn get_one(&self, name: &str) -> Option<&AttributeValue> {
        let mut matches = self.attributes.iter().filter(|(n, _)| n == name);
        let first = matches.next()?;
        if matches.next().is_some() {
            return None;
        }
        Some(&first.1)
    }

    /// Attributes in insertion/serialization order.
    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(n, v)| (n.as_str(), v))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn access_request_gets_nonzero_random_authenticator() {
        let p = Packet::new(PacketCode::AccessRequest, 1, b"secret".to_vec());
        assert!(!p.authenticator().contains(&0));
    }

    #[test]
    fn accounting_request_starts_zeroed() {
        let p = Packet::new(PacketCode::AccountingRequest, 1, b"secret".to_vec());
        assert_eq!(p.authenticator(), &[0u8; 16]);
    }

    #[test]
    fn status_server_has_message_authenticator_placeholder() {
        let p = Packet::new(PacketCode::StatusServer, 1, b"secret".to_vec());
        assert_eq!(
            p.get_one("Message-Authenticator"),
            Some(&AttributeValue::Bytes(vec![0u8; 16]))
        );
    }

    #[test]
    fn create_response_inherits_identifier_secret_and_authenticator() {
        let req = Packet::new(PacketCode::AccessRequest, 7, b"secret".to_vec());
        let resp = req.create_response(PacketCode::AccessAccept);
        assert_eq!(resp.identifier(), 7);
        assert_eq!(resp.shared_secret(), b"secret");
        assert_eq!(resp.request_authenticator(), Some(req.authenticator()));
    }

    #[test]
    fn get_one_fails_on_multiple_values() {
        let mut p = Packet::new(PacketCode::AccessRequest, 1, b"secret".to_vec());
        p.add_attribute("Filter-Id", AttributeValue::Text("a".into()));
        p.add_attribute("Filter-Id", AttributeValue::Text("b".into()));
        assert!(p.get_one("Filter-Id").is_none());
        assert_eq!(p.get_all("Filter-Id").len(), 2);
    }
}
