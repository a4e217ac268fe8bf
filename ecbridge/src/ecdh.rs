//! Single phase ECDH and XDH key agreement.

use core::mem;

use zeroize::Zeroizing;

use crate::{
    curve::{CurveDescriptor, CurveId},
    keys::{EcPrivateKey, EcPublicKey},
    Error, Gateway, Result,
};

enum State {
    Uninitialized,
    Initialized {
        curve: &'static CurveDescriptor,
        private_key: Zeroizing<Vec<u8>>,
    },
    PhaseComplete {
        curve: &'static CurveDescriptor,
        private_key: Zeroizing<Vec<u8>>,
        peer_public_key: Vec<u8>,
    },
}

/// Diffie-Hellman over any curve in the registry. The shared secret is the
/// x-coordinate (Weierstrass) or u-coordinate (Montgomery) of the shared
/// point, exactly one curve width long.
pub struct EcdhKeyAgreement {
    gateway: Gateway,
    state: State,
}

impl EcdhKeyAgreement {
    /// Create an uninitialized agreement.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: State::Uninitialized,
        }
    }

    /// Start with `private_key`.
    pub fn init(&mut self, private_key: &EcPrivateKey) -> Result<()> {
        let curve = private_key.curve().require()?;
        self.state = State::Initialized {
            curve,
            private_key: private_key.to_native_for(curve)?,
        };
        Ok(())
    }

    /// Supply the peer's public key. Only a single, final phase is supported.
    pub fn do_phase(&mut self, peer_public_key: &EcPublicKey, last_phase: bool) -> Result<()> {
        if !last_phase {
            return Err(Error::InvalidState("only a single phase is supported"));
        }

        let State::Initialized { curve, .. } = &self.state else {
            return Err(Error::InvalidState("key agreement not initialized or phase repeated"));
        };
        if peer_public_key.curve() != curve.id {
            return Err(Error::InvalidKey("peer key belongs to a different curve"));
        }
        let peer_public_key = peer_public_key.to_native_for(curve)?.into_owned();

        if let State::Initialized { curve, private_key } =
            mem::replace(&mut self.state, State::Uninitialized)
        {
            self.state = State::PhaseComplete {
                curve,
                private_key,
                peer_public_key,
            };
        }
        Ok(())
    }

    /// Derive the shared secret and reset the agreement.
    pub fn generate_secret(&mut self) -> Result<Vec<u8>> {
        if !matches!(self.state, State::PhaseComplete { .. }) {
            return Err(Error::InvalidState("key agreement phase not executed"));
        }
        let State::PhaseComplete {
            curve,
            private_key,
            peer_public_key,
        } = mem::replace(&mut self.state, State::Uninitialized)
        else {
            return Err(Error::InvalidState("key agreement phase not executed"));
        };

        let mut secret = vec![0u8; curve.width];
        self.gateway
            .derive_key(curve.id, &private_key, &peer_public_key, &mut secret)?;
        Ok(secret)
    }

    /// Curve of the current session, if any.
    pub fn curve(&self) -> Option<CurveId> {
        match &self.state {
            State::Uninitialized => None,
            State::Initialized { curve, .. } | State::PhaseComplete { curve, .. } => Some(curve.id),
        }
    }
}
