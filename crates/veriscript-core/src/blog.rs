//! BlogData: the structured result of one successful generation.
//!
//! Field names follow the wire format (camelCase). Every field is required; serde rejects a
//! document with a missing field or an out-of-enum value, which is how schema conformance is
//! enforced on the parse side.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// SEO metadata for the English edition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SeoMeta {
    pub title: String,
    pub meta_description: String,
}

/// Fact-check outcome for a single claim. Closed set; free text is a contract violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum VerificationStatus {
    Verified,
    #[serde(rename = "Partially Verified", alias = "PartiallyVerified")]
    PartiallyVerified,
    Unverified,
}

impl VerificationStatus {
    pub const ALL: [VerificationStatus; 3] = [
        VerificationStatus::Verified,
        VerificationStatus::PartiallyVerified,
        VerificationStatus::Unverified,
    ];

    /// Wire value, as requested from the model and accepted back.
    pub fn as_str(self) -> &'static str {
        match self {
            VerificationStatus::Verified => "Verified",
            VerificationStatus::PartiallyVerified => "Partially Verified",
            VerificationStatus::Unverified => "Unverified",
        }
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationItem {
    pub claim: String,
    pub status: VerificationStatus,
    pub source_note: String,
}

/// Image prompt placement: the hero image or an in-article topic image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ImageKind {
    Feature,
    Topic,
}

impl ImageKind {
    pub const ALL: [ImageKind; 2] = [ImageKind::Feature, ImageKind::Topic];

    pub fn as_str(self) -> &'static str {
        match self {
            ImageKind::Feature => "Feature",
            ImageKind::Topic => "Topic",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImagePrompt {
    #[serde(rename = "type")]
    pub kind: ImageKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub context: Option<String>,
    pub prompt: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InternalLink {
    pub anchor_text: String,
    pub placement_context: String,
}

/// Aggregate generation result. Partial objects never exist: parsing is all-or-nothing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BlogData {
    pub seo: SeoMeta,
    pub table_of_contents: Vec<String>,
    /// English article, markdown-flavoured.
    pub blog_content: String,
    /// Urdu article, markdown-flavoured.
    pub urdu_content: String,
    pub verification_report: Vec<VerificationItem>,
    pub image_prompts: Vec<ImagePrompt>,
    pub internal_links: Vec<InternalLink>,
}

/// Claim counts per verification status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationSummary {
    pub verified: usize,
    pub partially_verified: usize,
    pub unverified: usize,
}

impl VerificationSummary {
    pub fn total(&self) -> usize {
        self.verified + self.partially_verified + self.unverified
    }
}

/// Which article body to show or export.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edition {
    #[default]
    English,
    Urdu,
}

impl Edition {
    pub fn as_str(self) -> &'static str {
        match self {
            Edition::English => "english",
            Edition::Urdu => "urdu",
        }
    }
}

impl FromStr for Edition {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "english" | "en" => Ok(Edition::English),
            "urdu" | "ur" => Ok(Edition::Urdu),
            other => Err(format!("unknown edition '{}'", other)),
        }
    }
}

impl BlogData {
    /// Parse a capability response body. Any shape violation is an error.
    pub fn from_json(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text)
    }

    pub fn verification_summary(&self) -> VerificationSummary {
        self.verification_report
            .iter()
            .fold(VerificationSummary::default(), |mut acc, item| {
                match item.status {
                    VerificationStatus::Verified => acc.verified += 1,
                    VerificationStatus::PartiallyVerified => acc.partially_verified += 1,
                    VerificationStatus::Unverified => acc.unverified += 1,
                }
                acc
            })
    }

    pub fn article(&self, edition: Edition) -> &str {
        match edition {
            Edition::English => &self.blog_content,
            Edition::Urdu => &self.urdu_content,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn sample() -> serde_json::Value {
        json!({
            "seo": { "title": "T", "metaDescription": "M" },
            "tableOfContents": ["X"],
            "blogContent": "body",
            "urduContent": "جسم",
            "verificationReport": [
                { "claim": "c", "status": "Verified", "sourceNote": "n" }
            ],
            "imagePrompts": [{ "type": "Feature", "prompt": "p" }],
            "internalLinks": []
        })
    }

    #[test]
    fn parses_and_reserializes_identically() {
        let doc = sample();
        let data = BlogData::from_json(&doc.to_string()).unwrap();
        assert_eq!(data.seo.title, "T");
        assert_eq!(data.image_prompts[0].kind, ImageKind::Feature);
        assert!(data.image_prompts[0].context.is_none());
        assert_eq!(serde_json::to_value(&data).unwrap(), doc);
    }

    #[test]
    fn partially_verified_accepts_both_spellings() {
        for spelling in ["Partially Verified", "PartiallyVerified"] {
            let mut doc = sample();
            doc["verificationReport"][0]["status"] = json!(spelling);
            let data = BlogData::from_json(&doc.to_string()).unwrap();
            assert_eq!(
                data.verification_report[0].status,
                VerificationStatus::PartiallyVerified
            );
        }
    }

    #[test]
    fn free_text_status_is_rejected() {
        let mut doc = sample();
        doc["verificationReport"][0]["status"] = json!("Probably true");
        assert!(BlogData::from_json(&doc.to_string()).is_err());
    }

    #[test]
    fn unknown_image_kind_is_rejected() {
        let mut doc = sample();
        doc["imagePrompts"][0]["type"] = json!("Banner");
        assert!(BlogData::from_json(&doc.to_string()).is_err());
    }

    #[test]
    fn each_top_level_field_is_required() {
        for field in [
            "seo",
            "tableOfContents",
            "blogContent",
            "urduContent",
            "verificationReport",
            "imagePrompts",
            "internalLinks",
        ] {
            let mut doc = sample();
            doc.as_object_mut().unwrap().remove(field);
            assert!(
                BlogData::from_json(&doc.to_string()).is_err(),
                "document without {} must not parse",
                field
            );
        }
    }

    #[test]
    fn summary_counts_each_status() {
        let mut doc = sample();
        doc["verificationReport"] = json!([
            { "claim": "a", "status": "Verified", "sourceNote": "" },
            { "claim": "b", "status": "Partially Verified", "sourceNote": "" },
            { "claim": "c", "status": "Partially Verified", "sourceNote": "" },
            { "claim": "d", "status": "Unverified", "sourceNote": "" }
        ]);
        let summary = BlogData::from_json(&doc.to_string())
            .unwrap()
            .verification_summary();
        assert_eq!(summary.verified, 1);
        assert_eq!(summary.partially_verified, 2);
        assert_eq!(summary.unverified, 1);
        assert_eq!(summary.total(), 4);
    }

    #[test]
    fn edition_parses_short_and_long_names() {
        assert_eq!("Urdu".parse::<Edition>().unwrap(), Edition::Urdu);
        assert_eq!("en".parse::<Edition>().unwrap(), Edition::English);
        assert!("french".parse::<Edition>().is_err());
    }
}
