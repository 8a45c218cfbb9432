//! Fragment storage and conversion.
//!
//! A [`Fragment`] is an opaque payload saved under an owner with a declared
//! media type. [`FragmentStore`] manages fragment metadata and payloads over a
//! pluggable [`storage::FragmentBackend`]; [`convert`] turns a payload into
//! one of the representations its type allows.

pub mod convert;
pub mod fragment;
pub mod media;
pub mod storage;

pub use convert::{ConvertError, Converted};
pub use fragment::{Fragment, FragmentError, FragmentStore, NewFragment};
pub use media::{MediaType, MediaTypeError, is_supported_type};
pub use storage::{FragmentListing, StorageError};
