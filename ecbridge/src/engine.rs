//! Curve operation gateway.
//!
//! [`CurveEngine`] is the opaque capability that performs the actual curve
//! arithmetic. [`Gateway`] sits in front of it: it resolves the curve, checks
//! every buffer against the curve's declared widths and only then dispatches.
//! Engines may therefore assume fixed width inputs.

use core::fmt;
use std::sync::Arc;

use crate::{
    curve::{CurveDescriptor, CurveId},
    sm2::Mode,
    soft::SoftEngine,
    Error, Result,
};

/// Curve arithmetic backend.
///
/// All inputs have already been validated by [`Gateway`] to be exactly the
/// widths declared by the [`CurveDescriptor`]; implementations remain
/// responsible for rejecting values which are not valid keys (scalars out of
/// range, points not on the curve).
pub trait CurveEngine: Send + Sync {
    /// Generate a key pair, writing the fixed width private scalar and the
    /// encoded public key.
    fn generate_key_pair(
        &self,
        curve: &CurveDescriptor,
        seed: Option<&[u8]>,
        private_out: &mut [u8],
        public_out: &mut [u8],
    ) -> Result<()>;

    /// Compute the public key corresponding to `private`.
    fn compute_public_key(
        &self,
        curve: &CurveDescriptor,
        private: &[u8],
        public_out: &mut [u8],
    ) -> Result<()>;

    /// Diffie-Hellman: multiply `peer_public` by `private`, writing the
    /// shared x/u-coordinate.
    fn derive_key(
        &self,
        curve: &CurveDescriptor,
        private: &[u8],
        peer_public: &[u8],
        shared_out: &mut [u8],
    ) -> Result<()>;

    /// Sign a prehashed digest, writing `r || s`.
    fn sign_digest(
        &self,
        curve: &CurveDescriptor,
        seed: Option<&[u8]>,
        private: &[u8],
        digest: &[u8],
        signature_out: &mut [u8],
    ) -> Result<()>;

    /// Verify `r || s` over a prehashed digest.
    ///
    /// A well formed signature that does not match yields `Ok(false)`.
    fn verify_signed_digest(
        &self,
        curve: &CurveDescriptor,
        public: &[u8],
        digest: &[u8],
        signature: &[u8],
    ) -> Result<bool>;

    /// SM2 public key encryption.
    fn sm2_encrypt(&self, public: &[u8], plaintext: &[u8], mode: Mode) -> Result<Vec<u8>>;

    /// SM2 decryption. Every failure is reported as [`Error::BadPadding`].
    fn sm2_decrypt(&self, private: &[u8], ciphertext: &[u8], mode: Mode) -> Result<Vec<u8>>;

    /// SM2 key agreement, filling `shared_out` with key material.
    fn sm2_derive_key(&self, exchange: &Sm2KeyExchange<'_>, shared_out: &mut [u8]) -> Result<()>;
}

/// Inputs of one side of an SM2 key exchange, all in fixed width form.
#[derive(Clone, Copy)]
pub struct Sm2KeyExchange<'a> {
    /// Own identity.
    pub id: &'a [u8],
    /// Own static private key.
    pub private_key: &'a [u8],
    /// Own static public key.
    pub public_key: &'a [u8],
    /// Own ephemeral private key.
    pub ephemeral_private_key: &'a [u8],
    /// Peer identity.
    pub peer_id: &'a [u8],
    /// Peer static public key.
    pub peer_public_key: &'a [u8],
    /// Peer ephemeral public key.
    pub peer_ephemeral_public_key: &'a [u8],
    /// Whether this side initiated the exchange.
    pub initiator: bool,
}

impl fmt::Debug for Sm2KeyExchange<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Sm2KeyExchange")
            .field("initiator", &self.initiator)
            .finish_non_exhaustive()
    }
}

/// Validating front end of a [`CurveEngine`].
///
/// Checks run in a fixed order: curve first ([`Error::UnsupportedCurve`]),
/// then input lengths ([`Error::InvalidKey`]), then output buffers
/// ([`Error::BufferSize`]).
#[derive(Clone)]
pub struct Gateway {
    engine: Arc<dyn CurveEngine>,
}

impl Gateway {
    /// Wrap an engine.
    pub fn new(engine: impl CurveEngine + 'static) -> Self {
        Self {
            engine: Arc::new(engine),
        }
    }

    /// Wrap a shared engine.
    pub fn from_shared(engine: Arc<dyn CurveEngine>) -> Self {
        Self { engine }
    }

    /// Gateway over the pure Rust [`SoftEngine`].
    pub fn software() -> Self {
        Self::new(SoftEngine)
    }

    /// Generate a key pair on `curve`.
    pub fn generate_key_pair(
        &self,
        curve: CurveId,
        seed: Option<&[u8]>,
        private_out: &mut [u8],
        public_out: &mut [u8],
    ) -> Result<()> {
        let curve = curve.require()?;
        Error::check_output(curve.width, private_out)?;
        Error::check_output(curve.public_key_len(), public_out)?;

        tracing::debug!(curve = curve.name, seeded = seed.is_some(), "generate key pair");
        self.engine
            .generate_key_pair(curve, seed, private_out, public_out)
    }

    /// Compute the public key of a fixed width private key.
    pub fn compute_public_key(
        &self,
        curve: CurveId,
        private: &[u8],
        public_out: &mut [u8],
    ) -> Result<()> {
        let curve = curve.require()?;
        check_private(curve, private)?;
        Error::check_output(curve.public_key_len(), public_out)?;

        tracing::trace!(curve = curve.name, "compute public key");
        self.engine.compute_public_key(curve, private, public_out)
    }

    /// ECDH/XDH shared secret derivation.
    pub fn derive_key(
        &self,
        curve: CurveId,
        private: &[u8],
        peer_public: &[u8],
        shared_out: &mut [u8],
    ) -> Result<()> {
        let curve = curve.require()?;
        check_private(curve, private)?;
        check_public(curve, peer_public)?;
        Error::check_output(curve.width, shared_out)?;

        tracing::debug!(curve = curve.name, "derive key");
        self.engine
            .derive_key(curve, private, peer_public, shared_out)
            .inspect_err(|err| tracing::debug!(curve = curve.name, %err, "key derivation rejected"))
    }

    /// Sign a prehashed digest, writing `r || s`.
    ///
    /// Without a seed the nonce is derived deterministically (RFC 6979).
    pub fn sign_digest(
        &self,
        curve: CurveId,
        seed: Option<&[u8]>,
        private: &[u8],
        digest: &[u8],
        signature_out: &mut [u8],
    ) -> Result<()> {
        let curve = curve.require()?;
        curve.require_signature()?;
        check_private(curve, private)?;
        if digest.is_empty() {
            return Err(Error::InvalidParameter("empty digest"));
        }
        Error::check_output(curve.signature_len(), signature_out)?;

        tracing::debug!(curve = curve.name, seeded = seed.is_some(), "sign digest");
        self.engine
            .sign_digest(curve, seed, private, digest, signature_out)
            .inspect_err(|err| tracing::debug!(curve = curve.name, %err, "signing rejected"))
    }

    /// Verify `r || s` over a prehashed digest.
    pub fn verify_signed_digest(
        &self,
        curve: CurveId,
        public: &[u8],
        digest: &[u8],
        signature: &[u8],
    ) -> Result<bool> {
        let curve = curve.require()?;
        curve.require_signature()?;
        check_public(curve, public)?;
        if signature.len() != curve.signature_len() {
            return Err(Error::BadSignature("signature length does not match curve"));
        }

        tracing::debug!(curve = curve.name, "verify signed digest");
        self.engine
            .verify_signed_digest(curve, public, digest, signature)
            .inspect_err(|err| tracing::debug!(curve = curve.name, %err, "verification rejected"))
    }

    /// SM2 encryption with a fixed width public key.
    pub fn sm2_encrypt(&self, public: &[u8], plaintext: &[u8], mode: Mode) -> Result<Vec<u8>> {
        check_public(CurveId::SM2.require()?, public)?;

        tracing::trace!(len = plaintext.len(), ?mode, "sm2 encrypt");
        self.engine.sm2_encrypt(public, plaintext, mode)
    }

    /// SM2 decryption with a fixed width private key.
    pub fn sm2_decrypt(&self, private: &[u8], ciphertext: &[u8], mode: Mode) -> Result<Vec<u8>> {
        check_private(CurveId::SM2.require()?, private)?;

        tracing::trace!(len = ciphertext.len(), ?mode, "sm2 decrypt");
        self.engine.sm2_decrypt(private, ciphertext, mode)
    }

    /// SM2 key agreement.
    pub fn sm2_derive_key(&self, exchange: &Sm2KeyExchange<'_>, shared_out: &mut [u8]) -> Result<()> {
        let curve = CurveId::SM2.require()?;
        check_private(curve, exchange.private_key)?;
        check_private(curve, exchange.ephemeral_private_key)?;
        check_public(curve, exchange.public_key)?;
        check_public(curve, exchange.peer_public_key)?;
        check_public(curve, exchange.peer_ephemeral_public_key)?;
        if shared_out.is_empty() {
            return Err(Error::InvalidParameter("shared key length must be positive"));
        }

        tracing::debug!(
            initiator = exchange.initiator,
            len = shared_out.len(),
            "sm2 derive key"
        );
        self.engine
            .sm2_derive_key(exchange, shared_out)
            .inspect_err(|err| tracing::debug!(%err, "sm2 key agreement rejected"))
    }
}

impl Default for Gateway {
    fn default() -> Self {
        Self::software()
    }
}

impl fmt::Debug for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Gateway").finish_non_exhaustive()
    }
}

fn check_private(curve: &CurveDescriptor, private: &[u8]) -> Result<()> {
    if private.len() == curve.width {
        Ok(())
    } else {
        Err(Error::InvalidKey("private key length does not match curve"))
    }
}

fn check_public(curve: &CurveDescriptor, public: &[u8]) -> Result<()> {
    if public.len() == curve.public_key_len() {
        Ok(())
    } else {
        Err(Error::InvalidKey("public key length does not match curve"))
    }
}
