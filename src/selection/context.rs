//! Plain-text rendering of a selection for a conversational assistant.
//!
//! The assistant receives the ranked regions as a short bulleted block
//! that it can quote back to the user. Names are shown in the reply
//! language first, with the other language in parentheses.

use std::fmt::Write as _;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::{RegionSelection, SelectionError};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Language {
    #[default]
    #[serde(rename = "ar")]
    Arabic,
    #[serde(rename = "en")]
    English,
}

impl FromStr for Language {
    type Err = SelectionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "ar" | "arabic" => Ok(Self::Arabic),
            "en" | "english" => Ok(Self::English),
            other => Err(SelectionError::InvalidRequest(format!(
                "unsupported language `{other}`"
            ))),
        }
    }
}

struct Labels {
    header: &'static str,
    family: &'static str,
    probability: &'static str,
}

impl Language {
    const fn labels(self) -> Labels {
        match self {
            Self::Arabic => Labels {
                header: "سياق عضلي مختصر:",
                family: "المنطقة",
                probability: "الاحتمال التقريبي",
            },
            Self::English => Labels {
                header: "Muscle context summary:",
                family: "Region",
                probability: "Approx. probability",
            },
        }
    }
}

/// Renders `regions` as a header line followed by one bullet per region.
///
/// Returns an empty string for an empty list.
#[must_use]
pub fn render_grounding_context(regions: &[RegionSelection], language: Language) -> String {
    if regions.is_empty() {
        return String::new();
    }

    let labels = language.labels();
    let mut out = String::from(labels.header);
    for region in regions {
        let (first, second) = match language {
            Language::Arabic => (region.name_secondary, region.name_primary),
            Language::English => (region.name_primary, region.name_secondary),
        };
        let percent = (region.probability * 100.0).round();
        let _ = write!(
            out,
            "\n- {first} ({second}) | {}: {} | {}: {percent}%",
            labels.family, region.family, labels.probability,
        );
    }
    out
}
