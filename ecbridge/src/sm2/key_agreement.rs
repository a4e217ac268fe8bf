//! SM2 key exchange protocol (GM/T 0003-2012 part 3).
//!
//! Each side runs one [`Sm2KeyAgreement`]:
//!
//! ```text
//! init(rA, params) -> do_phase(RB, true) -> generate_secret()
//! ```
//!
//! The session is single use: once the secret has been generated the peer's
//! ephemeral key is dropped and every further call fails.

use core::fmt;
use core::mem;

use zeroize::Zeroizing;

use super::{check_private_scalar, DEFAULT_ID, KDF_LEN_LIMIT, MAX_ID_LEN};
use crate::{
    curve::CurveId,
    engine::Sm2KeyExchange,
    keys::{EcPrivateKey, EcPublicKey},
    Error, Gateway, Result,
};

/// Static parameters of one side of the exchange.
#[derive(Clone, Debug)]
pub struct Sm2KeyAgreementParams {
    /// Own identity.
    pub id: Vec<u8>,
    /// Own static private key.
    pub private_key: EcPrivateKey,
    /// Own static public key.
    pub public_key: EcPublicKey,
    /// Peer identity.
    pub peer_id: Vec<u8>,
    /// Peer static public key.
    pub peer_public_key: EcPublicKey,
    /// Whether this side initiates the exchange.
    pub initiator: bool,
    /// Length in bytes of the key to derive.
    pub shared_key_len: usize,
}

impl Sm2KeyAgreementParams {
    /// Parameters using the default identity on both sides.
    pub fn new(
        private_key: EcPrivateKey,
        public_key: EcPublicKey,
        peer_public_key: EcPublicKey,
        initiator: bool,
        shared_key_len: usize,
    ) -> Self {
        Self {
            id: DEFAULT_ID.to_vec(),
            private_key,
            public_key,
            peer_id: DEFAULT_ID.to_vec(),
            peer_public_key,
            initiator,
            shared_key_len,
        }
    }

    /// Set both identities.
    pub fn with_ids(mut self, id: &[u8], peer_id: &[u8]) -> Self {
        self.id = id.to_vec();
        self.peer_id = peer_id.to_vec();
        self
    }
}

/// Normalized session inputs.
struct Session {
    id: Vec<u8>,
    private_key: Zeroizing<Vec<u8>>,
    public_key: Vec<u8>,
    ephemeral_private_key: Zeroizing<Vec<u8>>,
    peer_id: Vec<u8>,
    peer_public_key: Vec<u8>,
    initiator: bool,
    shared_key_len: usize,
}

enum State {
    Uninitialized,
    Initialized(Session),
    PhaseComplete {
        session: Session,
        peer_ephemeral_public_key: Vec<u8>,
    },
    SecretExtracted,
}

/// One side of an SM2 key exchange.
pub struct Sm2KeyAgreement {
    gateway: Gateway,
    state: State,
}

impl Sm2KeyAgreement {
    /// Create an uninitialized session.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: State::Uninitialized,
        }
    }

    /// Start a session with the ephemeral private key `ephemeral_private_key`,
    /// which must lie in `[1, n - 1]`. Re-initializing discards any previous
    /// session.
    pub fn init(
        &mut self,
        ephemeral_private_key: &EcPrivateKey,
        params: &Sm2KeyAgreementParams,
    ) -> Result<()> {
        let ephemeral_private_key = sm2_private_key(ephemeral_private_key)?;
        check_private_scalar(&ephemeral_private_key)?;

        if params.shared_key_len == 0 {
            return Err(Error::InvalidParameter("shared key length must be positive"));
        }
        if params.shared_key_len as u64 >= KDF_LEN_LIMIT {
            return Err(Error::InvalidParameter("shared key length too large"));
        }
        if params.id.len() > MAX_ID_LEN || params.peer_id.len() > MAX_ID_LEN {
            return Err(Error::InvalidParameter("identity too long"));
        }

        let private_key = sm2_private_key(&params.private_key)?;
        check_private_scalar(&private_key)?;

        let session = Session {
            id: params.id.clone(),
            private_key,
            public_key: sm2_public_key(&params.public_key)?,
            ephemeral_private_key,
            peer_id: params.peer_id.clone(),
            peer_public_key: sm2_public_key(&params.peer_public_key)?,
            initiator: params.initiator,
            shared_key_len: params.shared_key_len,
        };

        self.state = State::Initialized(session);
        Ok(())
    }

    /// Supply the peer's ephemeral public key. Only a single, final phase is
    /// supported.
    pub fn do_phase(&mut self, peer_ephemeral_public_key: &EcPublicKey, last_phase: bool) -> Result<()> {
        if !last_phase {
            return Err(Error::InvalidState("only a single phase is supported"));
        }

        match mem::replace(&mut self.state, State::Uninitialized) {
            State::Initialized(session) => match sm2_public_key(peer_ephemeral_public_key) {
                Ok(peer_ephemeral_public_key) => {
                    self.state = State::PhaseComplete {
                        session,
                        peer_ephemeral_public_key,
                    };
                    Ok(())
                }
                Err(err) => {
                    self.state = State::Initialized(session);
                    Err(err)
                }
            },
            state => {
                let err = match state {
                    State::PhaseComplete { .. } => "phase already executed",
                    State::SecretExtracted => "secret already generated",
                    _ => "key agreement not initialized",
                };
                self.state = state;
                tracing::debug!(err, "sm2 key agreement out of sequence");
                Err(Error::InvalidState(err))
            }
        }
    }

    /// Derive the shared key. Ends the session whether or not derivation
    /// succeeds.
    pub fn generate_secret(&mut self) -> Result<Vec<u8>> {
        let len = self.shared_key_len()?;
        let mut secret = vec![0u8; len];
        self.derive(&mut secret)?;
        Ok(secret)
    }

    /// Derive the shared key into `out[offset..]`, returning its length.
    ///
    /// Fails with [`Error::BufferSize`] without ending the session when the
    /// key does not fit.
    pub fn generate_secret_into(&mut self, out: &mut [u8], offset: usize) -> Result<usize> {
        let len = self.shared_key_len()?;
        let available = out.len().saturating_sub(offset);
        if available < len {
            return Err(Error::BufferSize {
                expected: len,
                actual: available,
            });
        }

        self.derive(&mut out[offset..offset + len])?;
        Ok(len)
    }

    /// Requested key length of a session ready to derive.
    fn shared_key_len(&self) -> Result<usize> {
        match &self.state {
            State::PhaseComplete { session, .. } => Ok(session.shared_key_len),
            State::SecretExtracted => Err(Error::InvalidState("secret already generated")),
            _ => Err(Error::InvalidState("key agreement phase not executed")),
        }
    }

    fn derive(&mut self, out: &mut [u8]) -> Result<()> {
        let State::PhaseComplete {
            session,
            peer_ephemeral_public_key,
        } = mem::replace(&mut self.state, State::SecretExtracted)
        else {
            return Err(Error::InvalidState("key agreement phase not executed"));
        };

        let exchange = Sm2KeyExchange {
            id: &session.id,
            private_key: &session.private_key,
            public_key: &session.public_key,
            ephemeral_private_key: &session.ephemeral_private_key,
            peer_id: &session.peer_id,
            peer_public_key: &session.peer_public_key,
            peer_ephemeral_public_key: &peer_ephemeral_public_key,
            initiator: session.initiator,
        };
        self.gateway.sm2_derive_key(&exchange, out)
    }
}

impl fmt::Debug for Sm2KeyAgreement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = match self.state {
            State::Uninitialized => "Uninitialized",
            State::Initialized(_) => "Initialized",
            State::PhaseComplete { .. } => "PhaseComplete",
            State::SecretExtracted => "SecretExtracted",
        };
        f.debug_struct("Sm2KeyAgreement")
            .field("state", &state)
            .finish_non_exhaustive()
    }
}

fn sm2_private_key(key: &EcPrivateKey) -> Result<Zeroizing<Vec<u8>>> {
    if key.curve() != CurveId::SM2 {
        return Err(Error::InvalidKey("key does not belong to the SM2 curve"));
    }
    key.to_native()
}

fn sm2_public_key(key: &EcPublicKey) -> Result<Vec<u8>> {
    if key.curve() != CurveId::SM2 {
        return Err(Error::InvalidKey("key does not belong to the SM2 curve"));
    }
    Ok(key.to_native()?.into_owned())
}
