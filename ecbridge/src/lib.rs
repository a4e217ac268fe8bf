#![doc = include_str!("../README.md")]
#![doc(
    html_logo_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg",
    html_favicon_url = "https://raw.githubusercontent.com/RustCrypto/meta/master/logo.svg"
)]
#![forbid(unsafe_code)]
#![warn(
    clippy::mod_module_files,
    clippy::cast_lossless,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_precision_loss,
    clippy::cast_sign_loss,
    clippy::checked_conversions,
    clippy::implicit_saturating_sub,
    clippy::panic,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    missing_docs,
    rust_2018_idioms,
    unused_lifetimes,
    unused_qualifications
)]

pub mod config;
pub mod curve;
pub mod ecdh;
pub mod ecdsa;
pub mod engine;
pub mod keys;
pub mod normalize;
pub mod sm2;

mod error;
mod soft;

pub use crate::{
    config::{NativeConfig, NativeSupport},
    curve::{CurveDescriptor, CurveId, CurveKind},
    engine::{CurveEngine, Gateway, Sm2KeyExchange},
    error::{Error, Result},
    keys::{EcPrivateKey, EcPublicKey, KeyPair},
    soft::SoftEngine,
};
