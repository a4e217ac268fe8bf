//! SM2 public key encryption engine.

use zeroize::Zeroizing;

use super::Mode;
use crate::{
    curve::CurveId,
    keys::{EcPrivateKey, EcPublicKey},
    Error, Gateway, Result,
};

/// Key selecting the direction of an [`Sm2Cipher`].
#[derive(Clone, Debug)]
pub enum CipherKey {
    /// Encrypt to this public key.
    Public(EcPublicKey),
    /// Decrypt with this private key.
    Private(EcPrivateKey),
}

impl From<EcPublicKey> for CipherKey {
    fn from(key: EcPublicKey) -> Self {
        Self::Public(key)
    }
}

impl From<EcPrivateKey> for CipherKey {
    fn from(key: EcPrivateKey) -> Self {
        Self::Private(key)
    }
}

enum Direction {
    Encrypt { public_key: Vec<u8> },
    Decrypt { private_key: Zeroizing<Vec<u8>> },
}

/// SM2 encryption or decryption, depending on the key it was created with.
pub struct Sm2Cipher {
    gateway: Gateway,
    direction: Direction,
    mode: Mode,
}

impl Sm2Cipher {
    /// Create a cipher using the [`Mode::C1C3C2`] ciphertext layout.
    pub fn new(gateway: Gateway, key: impl Into<CipherKey>) -> Result<Self> {
        Self::with_mode(gateway, key, Mode::default())
    }

    /// Create a cipher with an explicit ciphertext layout.
    ///
    /// Keys are normalized to the fixed SM2 widths up front so malformed
    /// keys are rejected here rather than on first use.
    pub fn with_mode(gateway: Gateway, key: impl Into<CipherKey>, mode: Mode) -> Result<Self> {
        let direction = match key.into() {
            CipherKey::Public(key) => {
                check_curve(key.curve())?;
                Direction::Encrypt {
                    public_key: key.to_native()?.into_owned(),
                }
            }
            CipherKey::Private(key) => {
                check_curve(key.curve())?;
                Direction::Decrypt {
                    private_key: key.to_native()?,
                }
            }
        };

        Ok(Self {
            gateway,
            direction,
            mode,
        })
    }

    /// Ciphertext layout in use.
    pub fn mode(&self) -> Mode {
        self.mode
    }

    /// Is this cipher encrypting?
    pub fn is_encrypting(&self) -> bool {
        matches!(self.direction, Direction::Encrypt { .. })
    }

    /// Encrypt or decrypt `input[offset..offset + length]`.
    ///
    /// Out of bounds ranges, an empty ciphertext and any decryption failure
    /// are all reported as [`Error::BadPadding`]. Encrypting an empty message
    /// is allowed.
    pub fn process_block(&self, input: &[u8], offset: usize, length: usize) -> Result<Vec<u8>> {
        let block = offset
            .checked_add(length)
            .and_then(|end| input.get(offset..end))
            .ok_or(Error::BadPadding)?;

        match &self.direction {
            Direction::Encrypt { public_key } => {
                self.gateway.sm2_encrypt(public_key, block, self.mode)
            }
            Direction::Decrypt { .. } if block.is_empty() => Err(Error::BadPadding),
            Direction::Decrypt { private_key } => self
                .gateway
                .sm2_decrypt(private_key, block, self.mode)
                .map_err(|err| match err {
                    Error::InvalidKey(_) => err,
                    _ => Error::BadPadding,
                }),
        }
    }

    /// Process all of `input`.
    pub fn process(&self, input: &[u8]) -> Result<Vec<u8>> {
        self.process_block(input, 0, input.len())
    }
}

fn check_curve(curve: CurveId) -> Result<()> {
    if curve == CurveId::SM2 {
        Ok(())
    } else {
        Err(Error::InvalidKey("key does not belong to the SM2 curve"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn public_key() -> EcPublicKey {
        let mut point = vec![0x04];
        point.extend_from_slice(&[1; 64]);
        EcPublicKey::new(CurveId::SM2, point)
    }

    #[test]
    fn key_selects_direction() {
        let gateway = Gateway::software();
        let cipher = Sm2Cipher::new(gateway.clone(), public_key()).unwrap();
        assert!(cipher.is_encrypting());
        assert_eq!(cipher.mode(), Mode::C1C3C2);

        let private = EcPrivateKey::new(CurveId::SM2, vec![7; 32]);
        let cipher = Sm2Cipher::with_mode(gateway, private, Mode::C1C2C3).unwrap();
        assert!(!cipher.is_encrypting());
    }

    #[test]
    fn out_of_bounds_is_bad_padding() {
        let private = EcPrivateKey::new(CurveId::SM2, vec![7; 32]);
        let cipher = Sm2Cipher::new(Gateway::software(), private).unwrap();
        let input = [0u8; 16];

        assert_eq!(cipher.process_block(&input, 8, 9), Err(Error::BadPadding));
        assert_eq!(cipher.process_block(&input, usize::MAX, 2), Err(Error::BadPadding));
        assert_eq!(cipher.process_block(&input, 4, 0), Err(Error::BadPadding));
        assert_eq!(cipher.process_block(&input, 0, 16), Err(Error::BadPadding));
    }

    #[test]
    fn foreign_curve_key_is_rejected() {
        let key = EcPrivateKey::new(CurveId::P256, vec![7; 32]);
        assert!(matches!(
            Sm2Cipher::new(Gateway::software(), key),
            Err(Error::InvalidKey(_))
        ));
    }
}
