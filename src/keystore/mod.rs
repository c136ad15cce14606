// hostvault: Keystore Module
//
// Master-key custody through a platform secure enclave. The custodian only
// ever sees opaque key handles; the backend owns all key material.

mod backend;
mod custodian;
mod software;

pub use backend::{
    BlockMode, EnclaveBackend, EnclaveError, KeyHandle, KeySpec, Padding, SealedPayload,
};
pub use custodian::KeyCustodian;
pub use software::{SoftwareEnclave, ENCLAVE_IV_LEN};
