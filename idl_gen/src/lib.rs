//! C++ Stub Generation
//!
//! Turns the interface model from `idl_types` into AllJoyn C++ client and
//! service sources. The signature grammar lives in [`signature`], composite
//! type discovery in [`registry`] and the emitters under [`codegen`]. The
//! crate performs no file I/O: every generator returns [`fragment::Fragment`]
//! trees or rendered [`codegen::GeneratedFile`]s.

pub mod codegen;
pub mod errors;
pub mod fragment;
pub mod registry;
pub mod signature;

pub use codegen::cpp::{CppCodeGenerator, CppCodeGeneratorOptions};
pub use codegen::GeneratedFile;
pub use errors::GenError;
pub use registry::Registry;
