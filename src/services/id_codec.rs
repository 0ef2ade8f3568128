/*
 * Responsibility
 * - Public id <-> internal BIGINT id for posts and topics
 * - Handlers and extractors go through this type only, so the scheme can
 *   change in one place
 */
use sqids::Sqids;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum IdCodecError {
    #[error("SQIDS_MIN_LENGTH must be between 0 and 255, got {value}")]
    InvalidMinLength { value: usize },
    #[error("sqids error: {0}")]
    Sqids(#[from] sqids::Error),
    #[error("id must be non-negative, got {value}")]
    NegativeId { value: i64 },
    #[error("invalid public id format")]
    DecodeInvalidFormat,
    #[error("decoded id is out of range")]
    DecodeOutOfRange,
}

#[derive(Clone, Debug)]
pub struct IdCodec {
    sqids: Sqids,
}

impl IdCodec {
    pub fn new(min_length: usize, alphabet: &str) -> Result<Self, IdCodecError> {
        let min_length: u8 = min_length
            .try_into()
            .map_err(|_| IdCodecError::InvalidMinLength { value: min_length })?;

        let sqids = Sqids::builder()
            .min_length(min_length)
            .alphabet(alphabet.chars().collect())
            .build()?;

        Ok(Self { sqids })
    }

    pub fn encode(&self, id: i64) -> Result<String, IdCodecError> {
        let n = u64::try_from(id).map_err(|_| IdCodecError::NegativeId { value: id })?;
        Ok(self.sqids.encode(&[n])?)
    }

    /// Only canonical encodings of a single id are accepted.
    pub fn decode(&self, public_id: &str) -> Result<i64, IdCodecError> {
        let nums = self.sqids.decode(public_id);
        let [n] = nums.as_slice() else {
            return Err(IdCodecError::DecodeInvalidFormat);
        };

        let canonical = self.sqids.encode(&[*n])?;
        if canonical != public_id {
            return Err(IdCodecError::DecodeInvalidFormat);
        }

        i64::try_from(*n).map_err(|_| IdCodecError::DecodeOutOfRange)
    }
}
