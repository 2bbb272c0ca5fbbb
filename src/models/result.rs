//! The `Result` record an inspection emits (spec §3).

use serde::{Deserialize, Serialize};

use super::severity::{Severity, WaiverAuth};

/// One finding. Inspections never construct these directly; they go
/// through `RunCtx::add_result` (see [`crate::models::run_ctx`]), which is
/// also where the severity watermark gets raised.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResultRecord {
    pub severity: Severity,
    pub waiver_auth: WaiverAuth,
    /// Name of the inspection that produced this result, from the closed
    /// registry set (spec §4.4).
    pub inspection: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub remedy: Option<String>,
    /// Structured verb/noun pair renderers can use instead of parsing
    /// `message` (e.g. verb="added", noun="file").
    #[serde(skip_serializing_if = "Option::is_none")]
    pub verb: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub noun: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub arch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
}

/// Builder-style constructor parameters, since `ResultRecord` has several
/// optional fields and most call sites only set two or three of them.
#[derive(Debug, Clone, Default)]
pub struct ResultParams {
    pub severity: Severity,
    pub waiver_auth: WaiverAuth,
    pub inspection: String,
    pub message: String,
    pub details: Option<String>,
    pub remedy: Option<String>,
    pub verb: Option<String>,
    pub noun: Option<String>,
    pub arch: Option<String>,
    pub file: Option<String>,
}

impl Default for Severity {
    fn default() -> Self {
        Severity::Ok
    }
}

impl Default for WaiverAuth {
    fn default() -> Self {
        WaiverAuth::NotWaivable
    }
}

impl From<ResultParams> for ResultRecord {
    fn from(p: ResultParams) -> Self {
        ResultRecord {
            severity: p.severity,
            waiver_auth: p.waiver_auth,
            inspection: p.inspection,
            message: p.message,
            details: p.details,
            remedy: p.remedy,
            verb: p.verb,
            noun: p.noun,
            arch: p.arch,
            file: p.file,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn params_default_to_ok_not_waivable() {
        let p = ResultParams {
            inspection: "license".into(),
            message: "looks fine".into(),
            ..Default::default()
        };
        let r: ResultRecord = p.into();
        assert_eq!(r.severity, Severity::Ok);
        assert_eq!(r.waiver_auth, WaiverAuth::NotWaivable);
        assert!(r.details.is_none());
    }

    #[test]
    fn json_omits_absent_optional_fields() {
        let r: ResultRecord = ResultParams {
            severity: Severity::Bad,
            waiver_auth: WaiverAuth::Security,
            inspection: "elf".into(),
            message: "missing RELRO".into(),
            ..Default::default()
        }
        .into();
        let json = serde_json::to_string(&r).unwrap();
        assert!(!json.contains("\"details\""));
        assert!(!json.contains("\"remedy\""));
        assert!(json.contains("\"severity\":\"bad\""));
    }
}
