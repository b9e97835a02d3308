use glob::Pattern;

/// Represents an endpoint name pattern for filtering log records
#[derive(Debug, Clone, PartialEq)]
pub enum EndpointPattern {
    /// Exact endpoint name
    Exact(String),
    /// Glob pattern match (e.g., *Details)
    Glob(Pattern),
}

impl EndpointPattern {
    /// Parse an endpoint pattern string
    ///
    /// If the pattern contains '*' or '?', it's treated as a glob pattern.
    /// Otherwise it must equal the endpoint name exactly. Endpoint names are
    /// identifiers, so matching is case-sensitive.
    pub fn parse(pattern: &str) -> crate::Result<Self> {
        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(crate::Error::InvalidPattern(
                "Empty endpoint pattern".to_string(),
            ));
        }

        if pattern.contains('*') || pattern.contains('?') {
            let glob_pattern = Pattern::new(pattern).map_err(|e| {
                crate::Error::InvalidPattern(format!("Invalid glob pattern '{}': {}", pattern, e))
            })?;
            Ok(EndpointPattern::Glob(glob_pattern))
        } else {
            Ok(EndpointPattern::Exact(pattern.to_string()))
        }
    }

    pub fn matches(&self, api_name: &str) -> bool {
        match self {
            EndpointPattern::Exact(name) => api_name == name,
            EndpointPattern::Glob(pattern) => pattern.matches(api_name),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exact_match() {
        let pattern = EndpointPattern::parse("panDetails").unwrap();
        assert!(pattern.matches("panDetails"));
        assert!(!pattern.matches("pandetails"));
        assert!(!pattern.matches("panDetailsV2"));
    }

    #[test]
    fn test_glob_suffix() {
        let pattern = EndpointPattern::parse("*Details").unwrap();
        assert!(pattern.matches("mobileDetails"));
        assert!(pattern.matches("vehicleDetails"));
        assert!(!pattern.matches("idfcCreateLoanApplicationId"));
    }

    #[test]
    fn test_glob_prefix_and_question_mark() {
        let pattern = EndpointPattern::parse("idfc*").unwrap();
        assert!(pattern.matches("idfcCreateLoanApplicationId"));
        assert!(!pattern.matches("panDetails"));

        let pattern = EndpointPattern::parse("panDetails?").unwrap();
        assert!(pattern.matches("panDetails2"));
        assert!(!pattern.matches("panDetails"));
    }

    #[test]
    fn test_invalid_patterns() {
        assert!(EndpointPattern::parse("").is_err());
        assert!(EndpointPattern::parse("   ").is_err());
        assert!(EndpointPattern::parse("[*").is_err());
    }
}
