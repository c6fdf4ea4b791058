//! RPC Error Types
//!
//! Maps application errors to JSON-RPC error codes.

use jsonrpsee::types::ErrorObjectOwned;
use netguard_core::error::AppError;

/// RPC Error Codes
pub mod code {
    pub const VALIDATION_ERROR: i32 = 4000;
    pub const CONFLICT: i32 = 4002;
    pub const INTERNAL_ERROR: i32 = 5000;
    pub const SYSTEM_ERROR: i32 = 5002;
}

/// Convert AppError to JSON-RPC ErrorObject
pub fn to_rpc_error(err: AppError) -> ErrorObjectOwned {
    let code = match &err {
        // A missing or blank adapter is a caller mistake
        AppError::Validation(_)
        | AppError::Config(_)
        | AppError::Domain(_)
        | AppError::Serialization(_) => code::VALIDATION_ERROR,
        AppError::Conflict(_) | AppError::InvalidState(_) => code::CONFLICT,
        AppError::Io(_) | AppError::Probe(_) | AppError::Adapter(_) => code::SYSTEM_ERROR,
        AppError::Internal(_) => code::INTERNAL_ERROR,
    };
    ErrorObjectOwned::owned(code, err.to_string(), None::<()>)
}

#[cfg(test)]
mod tests {
    use super::*;
    use netguard_core::domain::DomainError;

    #[test]
    fn test_error_codes() {
        assert_eq!(
            to_rpc_error(AppError::Config("Please select a network adapter".into())).code(),
            code::VALIDATION_ERROR
        );
        assert_eq!(
            to_rpc_error(AppError::Domain(DomainError::EmptyAdapterHandle)).code(),
            code::VALIDATION_ERROR
        );
        assert_eq!(
            to_rpc_error(AppError::Conflict("already running".into())).code(),
            code::CONFLICT
        );
        assert_eq!(
            to_rpc_error(AppError::Internal("boom".into())).code(),
            code::INTERNAL_ERROR
        );
        let io = std::io::Error::new(std::io::ErrorKind::Other, "disk");
        assert_eq!(to_rpc_error(AppError::Io(io)).code(), code::SYSTEM_ERROR);
    }

    #[test]
    fn test_message_is_preserved() {
        let err = to_rpc_error(AppError::Conflict("Monitoring already running".into()));
        assert_eq!(err.message(), "Conflict: Monitoring already running");
    }
}
