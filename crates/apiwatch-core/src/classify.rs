//! Record classification.
//!
//! Every log record maps to exactly one [`Status`] plus a reason. The
//! decision is a pure function of the endpoint name and the response:
//!
//! 1. A response that cannot be decoded into a JSON object is a
//!    `Failure` with reason `Parse Error`.
//! 2. `"status": false` is a `Failure`, reason taken from `message`.
//! 3. Endpoint-specific rules may declare the call `No Data`.
//! 4. Anything else is a `Success`.

use crate::payload::{Payload, is_blank, value_to_string};
use crate::record::{ClassifiedRecord, LogRecord, NO_REASON, RawResponse, Status};
use crate::{Error, Result};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;

pub const PARSE_ERROR_REASON: &str = "Parse Error";
pub const TECHNICAL_ERROR_REASON: &str = "Technical Error";

/// Outcome of classifying one response
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Classification {
    pub status: Status,
    pub reason: String,
}

impl Classification {
    pub fn success() -> Self {
        Self {
            status: Status::Success,
            reason: NO_REASON.to_string(),
        }
    }

    pub fn failure(reason: impl Into<String>) -> Self {
        Self {
            status: Status::Failure,
            reason: reason.into(),
        }
    }

    pub fn no_data(reason: impl Into<String>) -> Self {
        Self {
            status: Status::NoData,
            reason: reason.into(),
        }
    }
}

/// An endpoint-specific check for technically successful responses that
/// carry no business payload.
pub trait ResponseRule: Send + Sync {
    /// Returns the No Data reason when the rule matches
    fn no_data_reason(&self, payload: &Payload<'_>) -> Option<String>;
}

impl<F> ResponseRule for F
where
    F: Fn(&Payload<'_>) -> Option<String> + Send + Sync,
{
    fn no_data_reason(&self, payload: &Payload<'_>) -> Option<String> {
        self(payload)
    }
}

/// Declarative rule, loadable from configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum RuleSpec {
    /// Matches when the value at `path` is absent or blank
    BlankField { path: String, reason: String },
    /// Matches when the value at `path` equals `value`
    FieldEquals {
        path: String,
        value: Value,
        reason: String,
    },
}

impl RuleSpec {
    pub fn path(&self) -> &str {
        match self {
            RuleSpec::BlankField { path, .. } | RuleSpec::FieldEquals { path, .. } => path,
        }
    }

    pub fn reason(&self) -> &str {
        match self {
            RuleSpec::BlankField { reason, .. } | RuleSpec::FieldEquals { reason, .. } => reason,
        }
    }
}

impl ResponseRule for RuleSpec {
    fn no_data_reason(&self, payload: &Payload<'_>) -> Option<String> {
        let matched = match self {
            RuleSpec::BlankField { path, .. } => is_blank(payload.get(path)),
            RuleSpec::FieldEquals { path, value, .. } => payload.get(path) == Some(value),
        };
        matched.then(|| self.reason().to_string())
    }
}

/// A rule bound to the endpoint it applies to
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EndpointRule {
    #[serde(rename = "apiName")]
    pub api_name: String,
    #[serde(flatten)]
    pub rule: RuleSpec,
}

impl EndpointRule {
    pub fn new(api_name: impl Into<String>, rule: RuleSpec) -> Self {
        Self {
            api_name: api_name.into(),
            rule,
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.api_name.trim().is_empty() {
            return Err(Error::InvalidRule("rule is missing apiName".to_string()));
        }
        if self.rule.path().trim().is_empty() {
            return Err(Error::InvalidRule(format!(
                "rule for {} has an empty path",
                self.api_name
            )));
        }
        if self.rule.reason().trim().is_empty() {
            return Err(Error::InvalidRule(format!(
                "rule for {} has an empty reason",
                self.api_name
            )));
        }
        Ok(())
    }

    /// Load a JSON array of rules from disk
    pub fn from_file(path: &Path) -> Result<Vec<Self>> {
        tracing::debug!("Reading classification rules from: {}", path.display());

        let content = std::fs::read_to_string(path)?;
        let rules: Vec<EndpointRule> = serde_json::from_str(&content)?;
        for rule in &rules {
            rule.validate()?;
        }

        tracing::info!("Loaded {} classification rules", rules.len());
        Ok(rules)
    }
}

/// Rules shipped out of the box
pub fn default_rules() -> Vec<EndpointRule> {
    vec![
        EndpointRule::new(
            "mobileDetails",
            RuleSpec::BlankField {
                path: "data".to_string(),
                reason: "Customer Not Found".to_string(),
            },
        ),
        EndpointRule::new(
            "vehicleDetails",
            RuleSpec::FieldEquals {
                path: "data.data.message".to_string(),
                value: Value::String("No Record Found".to_string()),
                reason: "Vehicle Not Found".to_string(),
            },
        ),
    ]
}

lazy_static! {
    static ref DEFAULT_CLASSIFIER: Classifier = Classifier::with_default_rules();
}

/// Classify with the default rule set
pub fn classify(api_name: &str, response: &RawResponse) -> Classification {
    DEFAULT_CLASSIFIER.classify(api_name, response)
}

/// Endpoint rule registry plus the classification algorithm
pub struct Classifier {
    rules: BTreeMap<String, Vec<Box<dyn ResponseRule>>>,
}

impl Classifier {
    /// A classifier without endpoint-specific rules
    pub fn empty() -> Self {
        Self {
            rules: BTreeMap::new(),
        }
    }

    pub fn with_default_rules() -> Self {
        let mut classifier = Self::empty();
        classifier.register_all(default_rules());
        classifier
    }

    /// Register a rule for an endpoint. Rules run in registration order.
    pub fn register<R>(&mut self, api_name: impl Into<String>, rule: R) -> &mut Self
    where
        R: ResponseRule + 'static,
    {
        self.rules
            .entry(api_name.into())
            .or_default()
            .push(Box::new(rule));
        self
    }

    /// Register a closure as a rule
    pub fn register_fn<F>(&mut self, api_name: impl Into<String>, rule: F) -> &mut Self
    where
        F: Fn(&Payload<'_>) -> Option<String> + Send + Sync + 'static,
    {
        self.register(api_name, rule)
    }

    pub fn register_all(&mut self, rules: impl IntoIterator<Item = EndpointRule>) -> &mut Self {
        for EndpointRule { api_name, rule } in rules {
            self.register(api_name, rule);
        }
        self
    }

    /// Endpoints that have at least one rule
    pub fn endpoints(&self) -> impl Iterator<Item = &str> {
        self.rules.keys().map(String::as_str)
    }

    pub fn classify(&self, api_name: &str, response: &RawResponse) -> Classification {
        let payload = match Payload::parse(response) {
            Ok(payload) => payload,
            Err(failure) => {
                tracing::trace!("Unparseable {} response: {:?}", api_name, failure);
                return Classification::failure(PARSE_ERROR_REASON);
            }
        };

        if payload.get("status") == Some(&Value::Bool(false)) {
            let message = payload
                .get("message")
                .filter(|v| !v.is_null())
                .map(value_to_string)
                .unwrap_or_else(|| TECHNICAL_ERROR_REASON.to_string());
            return Classification::failure(message);
        }

        if let Some(rules) = self.rules.get(api_name) {
            for rule in rules {
                if let Some(reason) = rule.no_data_reason(&payload) {
                    return Classification::no_data(reason);
                }
            }
        }

        Classification::success()
    }

    pub fn classify_record(&self, record: &LogRecord) -> ClassifiedRecord {
        let Classification { status, reason } = self.classify(&record.api_name, &record.response);
        ClassifiedRecord {
            record: record.clone(),
            status,
            reason,
        }
    }

    pub fn classify_all(&self, records: &[LogRecord]) -> Vec<ClassifiedRecord> {
        tracing::debug!("Classifying {} log records", records.len());
        records.iter().map(|r| self.classify_record(r)).collect()
    }
}

impl Default for Classifier {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl fmt::Debug for Classifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.rules.iter().map(|(api, rules)| (api, rules.len())))
            .finish()
    }
}
