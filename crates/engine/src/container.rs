//! Self-describing container format.
//!
//! Layout (integers big-endian):
//!
//! ```text
//! [method: u8][version: u8]
//!   symmetric: [salt: 16][m_cost: u32][t_cost: u32][p_cost: u32][nonce: 24]
//!   hybrid:    [nonce: 24][wrapped_key_len: u16][wrapped_key]
//! [ciphertext_len: u64][ciphertext][tag: 16]
//! ```
//!
//! Everything before `ciphertext_len` is the header, which the schemes bind
//! into the AEAD tag as associated data.

use std::{fmt, str::FromStr};

use crate::{
    error::{EngineError, Result},
    kdf::{KdfParams, SALT_LEN},
    keypair::MAX_KEY_BITS,
    traits::{NONCE_LEN, Nonce, TAG_LEN, Tag},
};

/// Current (and only) container format version.
pub const FORMAT_VERSION: u8 = 0x01;

const SYMMETRIC_HEADER_LEN: usize = 2 + SALT_LEN + 12 + NONCE_LEN;
const HYBRID_FIXED_HEADER_LEN: usize = 2 + NONCE_LEN + 2;

/// Most bytes a container adds on top of its plaintext.
///
/// The worst case is a hybrid header wrapping the session key under the
/// largest supported modulus, plus the length field and the tag.
pub const MAX_CONTAINER_OVERHEAD: usize = {
    let hybrid = HYBRID_FIXED_HEADER_LEN + MAX_KEY_BITS / 8;
    let header = if hybrid > SYMMETRIC_HEADER_LEN {
        hybrid
    } else {
        SYMMETRIC_HEADER_LEN
    };
    header + 8 + TAG_LEN
};

/// Tag byte for password-based containers.
pub const TAG_SYMMETRIC: u8 = 0x01;
/// Tag byte for RSA-hybrid containers.
pub const TAG_HYBRID: u8 = 0x02;

/// Which scheme produced a container.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Method {
    /// Password → Argon2id → XChaCha20-Poly1305.
    Symmetric,
    /// Random session key wrapped with RSA-OAEP → XChaCha20-Poly1305.
    Hybrid,
}

impl Method {
    #[must_use]
    pub const fn tag(self) -> u8 {
        match self {
            Self::Symmetric => TAG_SYMMETRIC,
            Self::Hybrid => TAG_HYBRID,
        }
    }

    pub fn from_tag(tag: u8) -> Result<Self> {
        match tag {
            TAG_SYMMETRIC => Ok(Self::Symmetric),
            TAG_HYBRID => Ok(Self::Hybrid),
            other => Err(EngineError::UnsupportedMethod(other)),
        }
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Symmetric => "symmetric",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown method name.
#[derive(Debug, thiserror::Error)]
#[error("unknown encryption method: {0:?} (expected \"aes\" or \"hybrid\")")]
pub struct ParseMethodError(String);

impl FromStr for Method {
    type Err = ParseMethodError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "aes" | "symmetric" | "password" => Ok(Self::Symmetric),
            "hybrid" | "rsa" => Ok(Self::Hybrid),
            _ => Err(ParseMethodError(s.to_string())),
        }
    }
}

/// Fields whose presence is decided by the method tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MethodParams {
    Symmetric {
        salt: [u8; SALT_LEN],
        kdf: KdfParams,
    },
    Hybrid {
        /// Session key encrypted under the recipient's RSA public key.
        wrapped_key: Vec<u8>,
    },
}

/// A decoded container.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Container {
    pub params: MethodParams,
    pub nonce: Nonce,
    pub ciphertext: Vec<u8>,
    pub tag: Tag,
}

/// Non-secret summary of a container, for inspection and logging.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct ContainerInfo {
    pub method: Method,
    pub version: u8,
    pub header_len: usize,
    pub ciphertext_len: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub wrapped_key_len: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kdf: Option<KdfParams>,
}

impl Container {
    #[must_use]
    pub fn method(&self) -> Method {
        match self.params {
            MethodParams::Symmetric { .. } => Method::Symmetric,
            MethodParams::Hybrid { .. } => Method::Hybrid,
        }
    }

    /// Encoded header: every byte before `ciphertext_len`.
    pub fn header_bytes(&self) -> Result<Vec<u8>> {
        let mut out = Vec::with_capacity(self.header_len());
        out.push(self.method().tag());
        out.push(FORMAT_VERSION);
        match &self.params {
            MethodParams::Symmetric { salt, kdf } => {
                out.extend_from_slice(salt);
                out.extend_from_slice(&kdf.m_cost.to_be_bytes());
                out.extend_from_slice(&kdf.t_cost.to_be_bytes());
                out.extend_from_slice(&kdf.p_cost.to_be_bytes());
                out.extend_from_slice(&self.nonce);
            },
            MethodParams::Hybrid { wrapped_key } => {
                let len = u16::try_from(wrapped_key.len()).map_err(|_| {
                    EngineError::malformed(format!(
                        "wrapped key of {} bytes exceeds {}",
                        wrapped_key.len(),
                        u16::MAX
                    ))
                })?;
                out.extend_from_slice(&self.nonce);
                out.extend_from_slice(&len.to_be_bytes());
                out.extend_from_slice(wrapped_key);
            },
        }
        Ok(out)
    }

    /// Serialize to the wire format.
    pub fn encode(&self) -> Result<Vec<u8>> {
        let mut out = self.header_bytes()?;
        out.reserve(8 + self.ciphertext.len() + TAG_LEN);
        out.extend_from_slice(&(self.ciphertext.len() as u64).to_be_bytes());
        out.extend_from_slice(&self.ciphertext);
        out.extend_from_slice(&self.tag);
        Ok(out)
    }

    /// Parse the wire format, validating every length before use.
    pub fn decode(bytes: &[u8]) -> Result<Self> {
        if bytes.is_empty() {
            return Err(EngineError::malformed("empty buffer"));
        }
        let mut r = Reader::new(bytes);

        let method = Method::from_tag(r.u8("method tag")?)?;
        let version = r.u8("version")?;
        if version != FORMAT_VERSION {
            return Err(EngineError::UnsupportedVersion(version));
        }

        let (params, nonce) = match method {
            Method::Symmetric => {
                let salt = r.array::<SALT_LEN>("salt")?;
                let kdf = KdfParams {
                    m_cost: r.u32("kdf m_cost")?,
                    t_cost: r.u32("kdf t_cost")?,
                    p_cost: r.u32("kdf p_cost")?,
                };
                kdf.validate()
                    .map_err(|e| EngineError::malformed(e.to_string()))?;
                let nonce = r.array::<NONCE_LEN>("nonce")?;
                (MethodParams::Symmetric { salt, kdf }, nonce)
            },
            Method::Hybrid => {
                let nonce = r.array::<NONCE_LEN>("nonce")?;
                let len = usize::from(r.u16("wrapped key length")?);
                if len == 0 {
                    return Err(EngineError::malformed("empty wrapped key"));
                }
                let wrapped_key = r.take(len, "wrapped key")?.to_vec();
                (MethodParams::Hybrid { wrapped_key }, nonce)
            },
        };

        let ct_len = r.u64("ciphertext length")?;
        let ct_len = usize::try_from(ct_len)
            .map_err(|_| EngineError::malformed(format!("ciphertext length {ct_len} too large")))?;
        let ciphertext = r.take(ct_len, "ciphertext")?.to_vec();
        let tag = r.array::<TAG_LEN>("auth tag")?;

        if r.remaining() != 0 {
            return Err(EngineError::malformed(format!(
                "{} trailing bytes after auth tag",
                r.remaining()
            )));
        }

        Ok(Self {
            params,
            nonce,
            ciphertext,
            tag,
        })
    }

    #[must_use]
    pub fn info(&self) -> ContainerInfo {
        let (wrapped_key_len, kdf) = match &self.params {
            MethodParams::Symmetric { kdf, .. } => (None, Some(*kdf)),
            MethodParams::Hybrid { wrapped_key } => (Some(wrapped_key.len()), None),
        };
        ContainerInfo {
            method: self.method(),
            version: FORMAT_VERSION,
            header_len: self.header_len(),
            ciphertext_len: self.ciphertext.len(),
            wrapped_key_len,
            kdf,
        }
    }

    fn header_len(&self) -> usize {
        match &self.params {
            MethodParams::Symmetric { .. } => SYMMETRIC_HEADER_LEN,
            MethodParams::Hybrid { wrapped_key } => HYBRID_FIXED_HEADER_LEN + wrapped_key.len(),
        }
    }
}

/// Read only the method tag, without decoding the rest.
pub fn method_of(bytes: &[u8]) -> Result<Method> {
    let tag = bytes
        .first()
        .ok_or_else(|| EngineError::malformed("empty buffer"))?;
    Method::from_tag(*tag)
}

/// Bounds-checked cursor over container bytes.
struct Reader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> Reader<'a> {
    fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    fn remaining(&self) -> usize {
        self.buf.len() - self.pos
    }

    fn take(&mut self, n: usize, what: &str) -> Result<&'a [u8]> {
        if n > self.remaining() {
            return Err(EngineError::malformed(format!(
                "truncated {what}: need {n} bytes, {} left",
                self.remaining()
            )));
        }
        let slice = &self.buf[self.pos..self.pos + n];
        self.pos += n;
        Ok(slice)
    }

    fn array<const N: usize>(&mut self, what: &str) -> Result<[u8; N]> {
        let mut out = [0u8; N];
        out.copy_from_slice(self.take(N, what)?);
        Ok(out)
    }

    fn u8(&mut self, what: &str) -> Result<u8> {
        Ok(self.array::<1>(what)?[0])
    }

    fn u16(&mut self, what: &str) -> Result<u16> {
        Ok(u16::from_be_bytes(self.array(what)?))
    }

    fn u32(&mut self, what: &str) -> Result<u32> {
        Ok(u32::from_be_bytes(self.array(what)?))
    }

    fn u64(&mut self, what: &str) -> Result<u64> {
        Ok(u64::from_be_bytes(self.array(what)?))
    }
}
