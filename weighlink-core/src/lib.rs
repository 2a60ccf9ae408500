//! # weighlink-core
//!
//! Protocol layer for industrial weighing scales.
//!
//! This crate provides:
//! - Protocol descriptors for CAS, Mettler-Toledo SICS, Shtrih-M, Mertech
//!   and the Massa-K family (ASCII and binary)
//! - The Massa-K Protocol 100 frame codec and its CRC16
//! - An immutable registry resolving configuration ids to descriptors

pub mod checksum;
pub mod constants;
pub mod error;
pub mod frame;
pub mod protocol;
pub mod registry;
pub mod text;

pub use error::{Error, Result};
pub use frame::WeightFrame;
pub use protocol::{Payload, ProtocolDescriptor, ProtocolId};
pub use registry::get_protocol;
pub use weighlink_types::{Reading, Unit};
