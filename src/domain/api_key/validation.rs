//! Validation of owner labels and permission names

use thiserror::Error;

/// Errors that can occur during API key input validation
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ApiKeyValidationError {
    #[error("Owner cannot be empty")]
    EmptyOwner,

    #[error("Owner exceeds maximum length of {0} characters")]
    OwnerTooLong(usize),

    #[error("Owner cannot contain control characters")]
    OwnerControlCharacter,

    #[error("Permission name cannot be empty")]
    EmptyPermission,

    #[error("Permission name exceeds maximum length of {0} characters")]
    PermissionTooLong(usize),

    #[error("Permission name must start and end with a letter or number")]
    InvalidPermissionBoundary,

    #[error("Permission name contains invalid character: '{0}'. Only alphanumeric characters, '.', '_', '-' and ':' are allowed")]
    InvalidPermissionCharacter(char),
}

const MAX_OWNER_LENGTH: usize = 128;
const MAX_PERMISSION_LENGTH: usize = 64;

/// Validate an owner label
pub fn validate_owner(owner: &str) -> Result<(), ApiKeyValidationError> {
    if owner.is_empty() {
        return Err(ApiKeyValidationError::EmptyOwner);
    }

    if owner.chars().count() > MAX_OWNER_LENGTH {
        return Err(ApiKeyValidationError::OwnerTooLong(MAX_OWNER_LENGTH));
    }

    if owner.chars().any(char::is_control) {
        return Err(ApiKeyValidationError::OwnerControlCharacter);
    }

    Ok(())
}

/// Validate a permission name
///
/// Rules:
/// - Cannot be empty
/// - Maximum 64 characters
/// - Only ASCII alphanumerics and `.`, `_`, `-`, `:`
/// - Must start and end with alphanumeric
pub fn validate_permission_name(name: &str) -> Result<(), ApiKeyValidationError> {
    if name.is_empty() {
        return Err(ApiKeyValidationError::EmptyPermission);
    }

    if name.len() > MAX_PERMISSION_LENGTH {
        return Err(ApiKeyValidationError::PermissionTooLong(MAX_PERMISSION_LENGTH));
    }

    for c in name.chars() {
        if !(c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | ':')) {
            return Err(ApiKeyValidationError::InvalidPermissionCharacter(c));
        }
    }

    let bytes = name.as_bytes();

    if !bytes[0].is_ascii_alphanumeric() || !bytes[bytes.len() - 1].is_ascii_alphanumeric() {
        return Err(ApiKeyValidationError::InvalidPermissionBoundary);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_permission_names() {
        assert!(validate_permission_name("admin").is_ok());
        assert!(validate_permission_name("task.create").is_ok());
        assert!(validate_permission_name("tasks:read").is_ok());
        assert!(validate_permission_name("a").is_ok());
    }

    #[test]
    fn test_invalid_permission_names() {
        assert_eq!(
            validate_permission_name(""),
            Err(ApiKeyValidationError::EmptyPermission)
        );
        assert_eq!(
            validate_permission_name("task create"),
            Err(ApiKeyValidationError::InvalidPermissionCharacter(' '))
        );
        assert_eq!(
            validate_permission_name("task."),
            Err(ApiKeyValidationError::InvalidPermissionBoundary)
        );
        assert_eq!(
            validate_permission_name(&"a".repeat(65)),
            Err(ApiKeyValidationError::PermissionTooLong(64))
        );
    }

    #[test]
    fn test_owner_rules() {
        assert!(validate_owner("alice").is_ok());
        assert!(validate_owner("Alice Smith <alice@example.com>").is_ok());
        assert_eq!(validate_owner(""), Err(ApiKeyValidationError::EmptyOwner));
        assert_eq!(
            validate_owner("bad\nowner"),
            Err(ApiKeyValidationError::OwnerControlCharacter)
        );
        assert_eq!(
            validate_owner(&"x".repeat(129)),
            Err(ApiKeyValidationError::OwnerTooLong(128))
        );
    }
}
