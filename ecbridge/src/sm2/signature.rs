//! SM2 digital signature engine.
//!
//! Messages are buffered by [`Sm2Signature::update`]; [`Sm2Signature::sign`]
//! and [`Sm2Signature::verify`] compute `e = SM3(Z || M)` and hand the digest
//! to the gateway's signing primitive. Signatures are raw `r || s`.

use core::mem;

use sm3::{Digest, Sm3};
use zeroize::Zeroizing;

use super::{check_signing_scalar, hash_z, DEFAULT_ID, MAX_ID_LEN, POINT_LEN, WIDTH};
use crate::{
    curve::CurveId,
    keys::{EcPrivateKey, EcPublicKey},
    Error, Gateway, Result,
};

enum State {
    Uninitialized,
    Sign { private_key: Zeroizing<Vec<u8>> },
    Verify,
}

/// SM2 signature context.
pub struct Sm2Signature {
    gateway: Gateway,
    state: State,
    public_key: Option<Vec<u8>>,
    id: Option<Vec<u8>>,
    seed: Option<Vec<u8>>,
    message: Vec<u8>,
}

impl Sm2Signature {
    /// Create an uninitialized context.
    pub fn new(gateway: Gateway) -> Self {
        Self {
            gateway,
            state: State::Uninitialized,
            public_key: None,
            id: None,
            seed: None,
            message: Vec::new(),
        }
    }

    /// Hedge signing nonces with a seed. Without one, signing is
    /// deterministic.
    pub fn set_seed(&mut self, seed: Option<&[u8]>) {
        self.seed = seed.map(<[u8]>::to_vec);
    }

    /// Prepare for signing. The scalar must lie in `[1, n - 2]`.
    ///
    /// A public key and identity installed by
    /// [`Self::set_identity_parameters`] survive; without one the public key
    /// is derived from `private_key`.
    pub fn init_sign(&mut self, private_key: &EcPrivateKey) -> Result<()> {
        if private_key.curve() != CurveId::SM2 {
            return Err(Error::InvalidKey("key does not belong to the SM2 curve"));
        }
        let native = private_key.to_native()?;
        check_signing_scalar(&native)?;

        self.state = State::Sign {
            private_key: native,
        };
        self.message.clear();
        Ok(())
    }

    /// Prepare for verification against `public_key`.
    pub fn init_verify(&mut self, public_key: &EcPublicKey) -> Result<()> {
        let native = sm2_public_key(public_key)?;
        self.state = State::Verify;
        self.public_key = Some(native);
        self.message.clear();
        Ok(())
    }

    /// Install an explicit public key and identity for `Z`, keeping the
    /// current sign or verify mode and any private key.
    pub fn set_identity_parameters(&mut self, public_key: &EcPublicKey, id: &[u8]) -> Result<()> {
        if id.len() > MAX_ID_LEN {
            return Err(Error::InvalidParameter("identity too long"));
        }
        self.public_key = Some(sm2_public_key(public_key)?);
        self.id = Some(id.to_vec());
        Ok(())
    }

    /// Append message bytes.
    pub fn update(&mut self, data: &[u8]) -> Result<()> {
        match self.state {
            State::Uninitialized => Err(Error::InvalidState("signature not initialized")),
            _ => {
                self.message.extend_from_slice(data);
                Ok(())
            }
        }
    }

    /// Sign the buffered message.
    pub fn sign(&mut self) -> Result<Vec<u8>> {
        let message = mem::take(&mut self.message);
        let State::Sign { private_key } = &self.state else {
            return Err(Error::InvalidState("signature not initialized for signing"));
        };

        let public_key = match &self.public_key {
            Some(public_key) => public_key.clone(),
            None => {
                let mut public_key = vec![0u8; POINT_LEN];
                self.gateway
                    .compute_public_key(CurveId::SM2, private_key, &mut public_key)?;
                public_key
            }
        };

        let digest = self.message_digest(&public_key, &message)?;
        let mut signature = vec![0u8; 2 * WIDTH];
        self.gateway.sign_digest(
            CurveId::SM2,
            self.seed.as_deref(),
            private_key,
            &digest,
            &mut signature,
        )?;
        Ok(signature)
    }

    /// Verify `signature` over the buffered message.
    pub fn verify(&mut self, signature: &[u8]) -> Result<bool> {
        let message = mem::take(&mut self.message);
        let (State::Verify, Some(public_key)) = (&self.state, &self.public_key) else {
            return Err(Error::InvalidState("signature not initialized for verification"));
        };

        let digest = self.message_digest(public_key, &message)?;
        self.gateway
            .verify_signed_digest(CurveId::SM2, public_key, &digest, signature)
    }

    /// `e = SM3(Z || M)`
    fn message_digest(&self, public_key: &[u8], message: &[u8]) -> Result<[u8; 32]> {
        let id = self.id.as_deref().unwrap_or(DEFAULT_ID);
        let z = hash_z(id, public_key)?;
        Ok(Sm3::new().chain_update(z).chain_update(message).finalize().into())
    }
}

fn sm2_public_key(public_key: &EcPublicKey) -> Result<Vec<u8>> {
    if public_key.curve() != CurveId::SM2 {
        return Err(Error::InvalidKey("key does not belong to the SM2 curve"));
    }
    Ok(public_key.to_native()?.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sign_requires_private_key() {
        let mut signature = Sm2Signature::new(Gateway::software());
        assert!(matches!(signature.update(b"abc"), Err(Error::InvalidState(_))));
        assert!(matches!(signature.sign(), Err(Error::InvalidState(_))));
        assert!(matches!(signature.verify(&[0; 64]), Err(Error::InvalidState(_))));
    }

    #[test]
    fn signing_scalar_range() {
        let mut signature = Sm2Signature::new(Gateway::software());
        let zero = EcPrivateKey::new(CurveId::SM2, vec![0]);
        assert!(matches!(signature.init_sign(&zero), Err(Error::InvalidKey(_))));

        // n - 1 is a valid private key elsewhere but not for signing
        let n_minus_1 = EcPrivateKey::new(
            CurveId::SM2,
            hex_literal::hex!(
                "00FFFFFFFEFFFFFFFFFFFFFFFFFFFFFFFF7203DF6B21C6052B53BBF40939D54122"
            ),
        );
        assert!(matches!(signature.init_sign(&n_minus_1), Err(Error::InvalidKey(_))));
    }

    #[test]
    fn identity_too_long() {
        let mut signature = Sm2Signature::new(Gateway::software());
        let key = EcPublicKey::new(CurveId::SM2, vec![4; 65]);
        assert!(matches!(
            signature.set_identity_parameters(&key, &vec![0; MAX_ID_LEN + 1]),
            Err(Error::InvalidParameter(_))
        ));
    }
}
