use rawtx_script::ScriptError;

/// Error types for transaction operations.
#[derive(Debug, thiserror::Error)]
pub enum TransactionError {
    /// A caller-supplied value is unusable: wrong hash length, key material
    /// that does not belong together, amounts exceeding the balance, an
    /// unsupported sighash type or an out-of-range input index.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// A value or length does not fit the field that must carry it.
    #[error("encoding overflow: {0}")]
    EncodingOverflow(String),

    /// A freshly produced signature did not verify against its own digest.
    #[error("signature failed self-verification")]
    SignatureSelfVerificationFailed,

    /// The retry policy ran out of attempts without producing a low-S signature.
    #[error("no canonical signature after {attempts} attempts")]
    CanonicalRetryExhausted { attempts: u32 },

    /// Binary or hex data could not be parsed as a transaction.
    #[error("serialization error: {0}")]
    SerializationError(String),

    /// An underlying script error (forwarded from `rawtx-script`).
    #[error("script error: {0}")]
    Script(#[source] ScriptError),

    /// An underlying primitives error (forwarded from `rawtx-primitives`).
    #[error("primitives error: {0}")]
    Primitives(#[from] rawtx_primitives::PrimitivesError),
}

impl From<ScriptError> for TransactionError {
    fn from(e: ScriptError) -> Self {
        match e {
            ScriptError::InvalidHashLength(_) => TransactionError::InvalidInput(e.to_string()),
            ScriptError::PushTooLarge { .. } => TransactionError::EncodingOverflow(e.to_string()),
            other => TransactionError::Script(other),
        }
    }
}
