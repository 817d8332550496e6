//! Vision model name resolution.

/// Model used when nothing else is configured.
pub const DEFAULT_MODEL: &str = "gemini-2.5-flash-preview-04-17";

/// Short name aliases for supported vision models.
const ALIASES: &[(&str, &str)] = &[
    ("gemini-flash", DEFAULT_MODEL),
    ("gemini-flash-stable", "gemini-2.5-flash"),
    ("gemini-pro", "gemini-2.5-pro"),
];

/// Resolve a model name (alias or exact) to the full model identifier.
#[must_use]
pub fn resolve_model(name: &str) -> String {
    for &(alias, full) in ALIASES {
        if name == alias {
            return full.to_string();
        }
    }
    name.to_string()
}

/// Check that a resolved model name belongs to the Gemini family.
///
/// # Errors
///
/// Returns an error if the model name doesn't start with `gemini`.
pub fn validate_model(model: &str) -> Result<(), String> {
    if model.starts_with("gemini") {
        Ok(())
    } else {
        Err(format!("Unknown vision model '{model}'. Expected 'gemini-*'."))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_flash_alias() {
        assert_eq!(resolve_model("gemini-flash"), "gemini-2.5-flash-preview-04-17");
        assert_eq!(resolve_model("gemini-flash-stable"), "gemini-2.5-flash");
        assert_eq!(resolve_model("gemini-pro"), "gemini-2.5-pro");
    }

    #[test]
    fn resolve_exact_name_passthrough() {
        assert_eq!(resolve_model("gemini-2.0-flash"), "gemini-2.0-flash");
    }

    #[test]
    fn validate_gemini_family() {
        assert!(validate_model("gemini-2.5-pro").is_ok());
        assert!(validate_model("gpt-4o").is_err());
    }
}
