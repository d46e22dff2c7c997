//! Input validation utilities

use regex::Regex;
use std::sync::OnceLock;

/// Validate an event name
pub fn validate_event_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Event name is required".to_string());
    }

    if name.chars().count() > 255 {
        return Err("Event name must be at most 255 characters long".to_string());
    }

    Ok(())
}

pub fn validate_description(description: Option<&str>) -> Result<(), String> {
    match description {
        Some(text) if text.chars().count() > 1000 => {
            Err("Description must be at most 1000 characters long".to_string())
        }
        _ => Ok(()),
    }
}

/// Validate email
pub fn validate_email(email: &str) -> Result<(), String> {
    if email.is_empty() {
        return Err("Email is required".to_string());
    }

    if email.len() > 254 {
        return Err("Email must be at most 254 characters long".to_string());
    }

    static EMAIL_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = EMAIL_REGEX.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$")
            .expect("Failed to compile email regex")
    });

    if !regex.is_match(email) {
        return Err("Invalid email format".to_string());
    }

    Ok(())
}

/// Validate an event code: exactly 8 uppercase letters or digits
pub fn validate_event_code(code: &str) -> Result<(), String> {
    static CODE_REGEX: OnceLock<Regex> = OnceLock::new();
    let regex = CODE_REGEX
        .get_or_init(|| Regex::new(r"^[A-Z0-9]{8}$").expect("Failed to compile event code regex"));

    if !regex.is_match(code) {
        return Err("Event code must be 8 uppercase letters or digits".to_string());
    }

    Ok(())
}

/// Validate the display name a guest chose
pub fn validate_guest_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Guest name is required".to_string());
    }

    if name.chars().count() > 100 {
        return Err("Guest name must be at most 100 characters long".to_string());
    }

    Ok(())
}

pub fn validate_content_type(content_type: &str) -> Result<(), String> {
    if content_type.trim().is_empty() {
        return Err("Content type is required".to_string());
    }

    if content_type.len() > 50 {
        return Err("Content type must be at most 50 characters long".to_string());
    }

    Ok(())
}

pub fn validate_file_size(size: i64) -> Result<(), String> {
    if size < 1 {
        return Err("File size must be at least 1 byte".to_string());
    }

    Ok(())
}

pub fn validate_session_token(token: &str) -> Result<(), String> {
    if token.is_empty() {
        return Err("Session token is required".to_string());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_name_bounds() {
        assert!(validate_event_name("Test Wedding").is_ok());
        assert!(validate_event_name("").is_err());
        assert!(validate_event_name("   ").is_err());
        assert!(validate_event_name(&"a".repeat(255)).is_ok());
        assert!(validate_event_name(&"a".repeat(256)).is_err());
    }

    #[test]
    fn test_description_bounds() {
        assert!(validate_description(None).is_ok());
        assert!(validate_description(Some(&"d".repeat(1000))).is_ok());
        assert!(validate_description(Some(&"d".repeat(1001))).is_err());
    }

    #[test]
    fn test_email_format() {
        assert!(validate_email("owner@example.com").is_ok());
        assert!(validate_email("first.last+tag@sub.example.org").is_ok());
        assert!(validate_email("").is_err());
        assert!(validate_email("not-an-email").is_err());
        assert!(validate_email("owner@localhost").is_err());
    }

    #[test]
    fn test_event_code_format() {
        assert!(validate_event_code("ABCD1234").is_ok());
        assert!(validate_event_code("abcd1234").is_err());
        assert!(validate_event_code("ABC123").is_err());
        assert!(validate_event_code("ABCD12345").is_err());
        assert!(validate_event_code("ABCD-123").is_err());
    }

    #[test]
    fn test_guest_name_bounds() {
        assert!(validate_guest_name("Alice").is_ok());
        assert!(validate_guest_name("").is_err());
        assert!(validate_guest_name(&"x".repeat(100)).is_ok());
        assert!(validate_guest_name(&"x".repeat(101)).is_err());
    }

    #[test]
    fn test_content_type_and_size() {
        assert!(validate_content_type("image/png").is_ok());
        assert!(validate_content_type("").is_err());
        assert!(validate_content_type(&"i".repeat(51)).is_err());
        assert!(validate_file_size(1).is_ok());
        assert!(validate_file_size(0).is_err());
        assert!(validate_file_size(-5).is_err());
    }
}
