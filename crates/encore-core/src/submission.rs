//! Decryption and parsing of the raw score submission payload.
//!
//! The client ships its play as AES-256-CBC ciphertext (zero padding),
//! keyed by a static secret concatenated with the client version string.
//! IV and ciphertext arrive base64-encoded. The plaintext is a single
//! colon-delimited record of exactly [`FIELD_COUNT`] fields.
//!
//! This module is the pure half of submission decoding: it produces a
//! [`SubmissionFields`] candidate or a structural [`DecodeError`].
//! Resolving the named player and map happens in the async pipeline.

use crate::accuracy::HitCounts;
use crate::grade::Grade;
use crate::mode::GameMode;
use crate::mods::Mods;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use cbc::cipher::block_padding::ZeroPadding;
use cbc::cipher::{BlockDecryptMut, KeyIvInit};
use std::str::FromStr;
use thiserror::Error;

type Aes256CbcDec = cbc::Decryptor<aes::Aes256>;

/// Static half of the payload key; the client version string completes it.
const KEY_PREFIX: &str = "osu!-scoreburgr---------";

/// Exact arity of the decrypted record.
pub const FIELD_COUNT: usize = 18;

const IV_LEN: usize = 16;
const CHECKSUM_LEN: usize = 32;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DecodeError {
    #[error("invalid base64 in submission: {0}")]
    Base64(#[from] base64::DecodeError),

    #[error("initialization vector must be {IV_LEN} bytes, got {0}")]
    BadIv(usize),

    #[error("ciphertext is not a whole number of cipher blocks")]
    BadCiphertext,

    #[error("decrypted payload is not valid text")]
    NotText,

    #[error("expected {FIELD_COUNT} fields, got {0}")]
    FieldCount(usize),

    #[error("map checksum must be {CHECKSUM_LEN} characters")]
    BadChecksum,

    #[error("field {index} ({name}) is not a non-negative integer")]
    NonNumeric { index: usize, name: &'static str },

    #[error("unknown grade {0:?}")]
    UnknownGrade(String),

    #[error("unknown mode id {0}")]
    UnknownMode(u8),
}

/// A structurally valid submission, not yet scored and with the player
/// and map still unresolved.
#[derive(Debug, Clone, PartialEq)]
pub struct SubmissionFields {
    pub map_md5: String,
    pub player_name: String,
    pub hits: HitCounts,
    pub score: i64,
    pub max_combo: u32,
    pub perfect: bool,
    /// Already folded through [`Grade::for_submission`]: a failed play
    /// is an F no matter what letter the client reported.
    pub grade: Grade,
    pub mods: Mods,
    pub passed: bool,
    pub mode: GameMode,
    /// Raw trailing field; input to the pluggable anti-cheat policy.
    pub flags_token: String,
}

/// Decrypt and parse a submission payload.
pub fn decode(
    data_b64: &str,
    iv_b64: &str,
    client_version: &str,
) -> Result<SubmissionFields, DecodeError> {
    let plaintext = decrypt(data_b64, iv_b64, client_version)?;
    parse_fields(&plaintext)
}

/// Decrypt the base64 ciphertext into the colon-delimited plaintext.
pub fn decrypt(
    data_b64: &str,
    iv_b64: &str,
    client_version: &str,
) -> Result<String, DecodeError> {
    let iv = BASE64.decode(iv_b64)?;
    let ciphertext = BASE64.decode(data_b64)?;

    if iv.len() != IV_LEN {
        return Err(DecodeError::BadIv(iv.len()));
    }

    let key = submission_key(client_version);
    let plain = Aes256CbcDec::new_from_slices(&key, &iv)
        .map_err(|_| DecodeError::BadIv(iv.len()))?
        .decrypt_padded_vec_mut::<ZeroPadding>(&ciphertext)
        .map_err(|_| DecodeError::BadCiphertext)?;

    String::from_utf8(plain).map_err(|_| DecodeError::NotText)
}

/// Key = secret prefix + client version, zero-padded/truncated to the
/// 256-bit key width.
pub(crate) fn submission_key(client_version: &str) -> [u8; 32] {
    let mut key = [0u8; 32];
    let src = format!("{KEY_PREFIX}{client_version}");
    let bytes = src.as_bytes();
    let n = bytes.len().min(key.len());
    key[..n].copy_from_slice(&bytes[..n]);
    key
}

/// Parse the decrypted record into a candidate submission.
pub fn parse_fields(plaintext: &str) -> Result<SubmissionFields, DecodeError> {
    let fields: Vec<&str> = plaintext.split(':').collect();
    if fields.len() != FIELD_COUNT {
        return Err(DecodeError::FieldCount(fields.len()));
    }

    let map_md5 = fields[0];
    if map_md5.len() != CHECKSUM_LEN {
        return Err(DecodeError::BadChecksum);
    }

    // Clients pad the name with trailing whitespace.
    let player_name = fields[1].trim_end();

    // Field 2 is the online score checksum; unused.

    let hits = HitCounts {
        n300: numeric(&fields, 3, "n300")?,
        n100: numeric(&fields, 4, "n100")?,
        n50: numeric(&fields, 5, "n50")?,
        ngeki: numeric(&fields, 6, "ngeki")?,
        nkatu: numeric(&fields, 7, "nkatu")?,
        nmiss: numeric(&fields, 8, "nmiss")?,
    };
    let score: i64 = numeric(&fields, 9, "score")?;
    let max_combo: u32 = numeric(&fields, 10, "max_combo")?;

    let perfect = fields[11] == "1";
    let mods = Mods::from_bits_truncate(numeric(&fields, 13, "mods")?);
    let passed = fields[14] == "True";

    let grade = if passed {
        Grade::from_client(fields[12])
            .ok_or_else(|| DecodeError::UnknownGrade(fields[12].to_string()))?
    } else {
        Grade::F
    };

    let mode_vn: u8 = numeric(&fields, 15, "mode")?;
    let mode =
        GameMode::from_params(mode_vn, mods).ok_or(DecodeError::UnknownMode(mode_vn))?;

    // Field 16 is the client-side timestamp; the server clock is
    // authoritative so it is ignored.

    Ok(SubmissionFields {
        map_md5: map_md5.to_string(),
        player_name: player_name.to_string(),
        hits,
        score,
        max_combo,
        perfect,
        grade,
        mods,
        passed,
        mode,
        flags_token: fields[17].to_string(),
    })
}

fn numeric<T>(fields: &[&str], index: usize, name: &'static str) -> Result<T, DecodeError>
where
    T: FromStr,
{
    let raw = fields[index];
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DecodeError::NonNumeric { index, name });
    }
    raw.parse().map_err(|_| DecodeError::NonNumeric { index, name })
}
