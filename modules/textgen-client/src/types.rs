use serde::{Deserialize, Serialize};

/// Target video format; drives duration math and prompt phrasing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VideoFormat {
    Short,
    Long,
}

impl VideoFormat {
    pub fn parse(s: &str) -> Self {
        match s.trim().to_lowercase().as_str() {
            "long" => VideoFormat::Long,
            _ => VideoFormat::Short,
        }
    }

    /// Total runtime budget in seconds.
    pub fn duration_secs(&self) -> u32 {
        match self {
            VideoFormat::Short => 60,
            VideoFormat::Long => 180,
        }
    }
}

impl Default for VideoFormat {
    fn default() -> Self {
        VideoFormat::Short
    }
}

// --- Gemini generateContent wire types (text only) ---

#[derive(Debug, Serialize)]
pub struct TextRequest {
    pub contents: Vec<RequestContent>,
}

#[derive(Debug, Serialize)]
pub struct RequestContent {
    pub parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
pub struct RequestPart {
    pub text: String,
}

#[derive(Debug, Deserialize)]
pub struct TextResponse {
    #[serde(default)]
    pub candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
pub struct Candidate {
    pub content: ResponseContent,
}

#[derive(Debug, Deserialize)]
pub struct ResponseContent {
    #[serde(default)]
    pub parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
pub struct ResponsePart {
    #[serde(default)]
    pub text: Option<String>,
}
