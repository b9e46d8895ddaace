//! Configuration types for transcript credit extraction.
//!
//! All extraction behaviour is controlled through [`ExtractionConfig`], built
//! via its [`ExtractionConfigBuilder`]. Every knob lives in one struct so a
//! run can be reproduced from its config alone.
//!
//! # Design choice: builder over constructor
//! Callers set only what they care about and rely on documented defaults for
//! the rest. Setters clamp to sane ranges; [`ExtractionConfigBuilder::build`]
//! rejects combinations that cannot work.

use crate::error::TranscriptError;
use crate::pipeline::ocr::TextRecognizer;
use crate::progress::{
    CancelToken, ExtractionProgressCallback, NoopProgressCallback, ProgressCallback,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;

/// Configuration for one extraction run.
///
/// # Example
/// ```rust
/// use transcript_credits::ExtractionConfig;
///
/// let config = ExtractionConfig::builder()
///     .snap_tolerance(2.0)
///     .ocr_scale(3.0)
///     .ocr_languages(["chi_tra", "eng"])
///     .build()
///     .unwrap();
/// assert_eq!(config.ocr_languages.len(), 2);
/// ```
#[derive(Clone)]
pub struct ExtractionConfig {
    /// Ruled-line table detection tolerances.
    pub table: TableSettings,

    /// Upscale factor applied when rasterising pages for OCR. Range: 1.0–6.0. Default: 2.0.
    ///
    /// Transcript fonts are small; at 1× many CJK glyphs are only a dozen
    /// pixels tall and recognition accuracy drops sharply.
    pub ocr_scale: f32,

    /// Recognition language packs, joined with `+` for Tesseract. Default: `chi_tra`, `eng`.
    pub ocr_languages: Vec<String>,

    /// Run the OCR fallback when no grades table is found. Default: true.
    pub ocr_enabled: bool,

    /// Accepted header keywords per column role.
    pub keywords: ColumnKeywords,

    /// Which keyword families a grades table must carry. Default: [`ClassifierProfile::Standard`].
    pub profile: ClassifierProfile,

    /// Directory or file of the pdfium shared library. If None, tries the
    /// working directory and then the system library path.
    pub pdfium_library_path: Option<PathBuf>,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Pre-constructed text recognizer. Takes precedence over the built-in
    /// Tesseract engine.
    pub recognizer: Option<Arc<dyn TextRecognizer>>,

    /// Optional per-page progress events.
    pub progress_callback: Option<ProgressCallback>,

    /// Stops the OCR fallback between pages when cancelled.
    pub cancel: CancelToken,
}

impl Default for ExtractionConfig {
    fn default() -> Self {
        Self {
            table: TableSettings::default(),
            ocr_scale: 2.0,
            ocr_languages: vec!["chi_tra".to_string(), "eng".to_string()],
            ocr_enabled: true,
            keywords: ColumnKeywords::default(),
            profile: ClassifierProfile::default(),
            pdfium_library_path: None,
            password: None,
            recognizer: None,
            progress_callback: None,
            cancel: CancelToken::default(),
        }
    }
}

impl fmt::Debug for ExtractionConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExtractionConfig")
            .field("table", &self.table)
            .field("ocr_scale", &self.ocr_scale)
            .field("ocr_languages", &self.ocr_languages)
            .field("ocr_enabled", &self.ocr_enabled)
            .field("keywords", &self.keywords)
            .field("profile", &self.profile)
            .field("pdfium_library_path", &self.pdfium_library_path)
            .field("recognizer", &self.recognizer.as_ref().map(|_| "<dyn TextRecognizer>"))
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn ExtractionProgressCallback>"),
            )
            .field("cancelled", &self.cancel.is_cancelled())
            .finish()
    }
}

impl ExtractionConfig {
    /// Create a new builder for `ExtractionConfig`.
    pub fn builder() -> ExtractionConfigBuilder {
        ExtractionConfigBuilder {
            config: Self::default(),
        }
    }

    /// The configured progress callback, or a no-op.
    pub(crate) fn progress(&self) -> &dyn ExtractionProgressCallback {
        static NOOP: NoopProgressCallback = NoopProgressCallback;
        match &self.progress_callback {
            Some(cb) => cb.as_ref(),
            None => &NOOP,
        }
    }

    /// Languages in the form Tesseract expects, e.g. `chi_tra+eng`.
    pub fn ocr_language_spec(&self) -> String {
        self.ocr_languages.join("+")
    }
}

/// Builder for [`ExtractionConfig`].
#[derive(Debug)]
pub struct ExtractionConfigBuilder {
    config: ExtractionConfig,
}

impl ExtractionConfigBuilder {
    pub fn table_settings(mut self, settings: TableSettings) -> Self {
        self.config.table = settings;
        self
    }

    pub fn snap_tolerance(mut self, v: f32) -> Self {
        self.config.table.snap_tolerance = v.max(0.0);
        self
    }

    pub fn join_tolerance(mut self, v: f32) -> Self {
        self.config.table.join_tolerance = v.max(0.0);
        self
    }

    pub fn edge_min_length(mut self, v: f32) -> Self {
        self.config.table.edge_min_length = v.max(0.0);
        self
    }

    pub fn text_tolerance(mut self, v: f32) -> Self {
        self.config.table.text_tolerance = v.max(0.0);
        self
    }

    pub fn intersection_tolerance(mut self, v: f32) -> Self {
        self.config.table.intersection_tolerance = v.max(0.0);
        self
    }

    pub fn ocr_scale(mut self, scale: f32) -> Self {
        self.config.ocr_scale = scale.clamp(1.0, 6.0);
        self
    }

    pub fn ocr_languages<I, S>(mut self, langs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.ocr_languages = langs
            .into_iter()
            .map(|l| {
                let l: String = l.into();
                l.trim().to_string()
            })
            .filter(|l| !l.is_empty())
            .collect();
        self
    }

    pub fn ocr_enabled(mut self, v: bool) -> Self {
        self.config.ocr_enabled = v;
        self
    }

    pub fn keywords(mut self, keywords: ColumnKeywords) -> Self {
        self.config.keywords = keywords;
        self
    }

    pub fn profile(mut self, profile: ClassifierProfile) -> Self {
        self.config.profile = profile;
        self
    }

    pub fn pdfium_library_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.pdfium_library_path = Some(path.into());
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn recognizer(mut self, recognizer: Arc<dyn TextRecognizer>) -> Self {
        self.config.recognizer = Some(recognizer);
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    pub fn cancel_token(mut self, token: CancelToken) -> Self {
        self.config.cancel = token;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ExtractionConfig, TranscriptError> {
        let c = &self.config;
        let t = &c.table;
        for (name, value) in [
            ("snap_tolerance", t.snap_tolerance),
            ("join_tolerance", t.join_tolerance),
            ("edge_min_length", t.edge_min_length),
            ("text_tolerance", t.text_tolerance),
            ("intersection_tolerance", t.intersection_tolerance),
        ] {
            if !value.is_finite() || value < 0.0 {
                return Err(TranscriptError::InvalidConfig(format!(
                    "{name} must be a finite value ≥ 0, got {value}"
                )));
            }
        }
        if !c.ocr_scale.is_finite() || !(1.0..=6.0).contains(&c.ocr_scale) {
            return Err(TranscriptError::InvalidConfig(format!(
                "OCR scale must be 1.0–6.0, got {}",
                c.ocr_scale
            )));
        }
        if c.ocr_enabled && c.ocr_languages.is_empty() {
            return Err(TranscriptError::InvalidConfig(
                "OCR is enabled but no recognition language is set".into(),
            ));
        }
        for role in ColumnRole::ALL {
            if c.profile.requires(role) && c.keywords.family(role).is_empty() {
                return Err(TranscriptError::InvalidConfig(format!(
                    "no keywords configured for required column role {role:?}"
                )));
            }
        }
        Ok(self.config)
    }
}

// ── Table detection ──────────────────────────────────────────────────────

/// Tolerances for the ruled-line detector, all in PDF points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TableSettings {
    /// Parallel edges closer than this are snapped onto one line. Default: 3.0.
    pub snap_tolerance: f32,
    /// Collinear edges with a gap up to this are joined. Default: 5.0.
    pub join_tolerance: f32,
    /// Edges shorter than this are ignored. Default: 3.0.
    pub edge_min_length: f32,
    /// Line and word grouping distance for cell text. Default: 2.0.
    pub text_tolerance: f32,
    /// Slack allowed when deciding that two edges cross. Default: 3.0.
    pub intersection_tolerance: f32,
}

impl Default for TableSettings {
    fn default() -> Self {
        Self {
            snap_tolerance: 3.0,
            join_tolerance: 5.0,
            edge_min_length: 3.0,
            text_tolerance: 2.0,
            intersection_tolerance: 3.0,
        }
    }
}

// ── Column roles ─────────────────────────────────────────────────────────

/// What a column of a grades table holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnRole {
    Credit,
    Subject,
    Grade,
    Year,
    Semester,
}

impl ColumnRole {
    pub const ALL: [ColumnRole; 5] = [
        ColumnRole::Credit,
        ColumnRole::Subject,
        ColumnRole::Grade,
        ColumnRole::Year,
        ColumnRole::Semester,
    ];
}

/// Accepted header keywords per column role.
///
/// Keywords are compared against column names with all whitespace removed
/// and lowercased. Order matters: earlier keywords win when resolving which
/// column fills a role.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnKeywords {
    pub credit: Vec<String>,
    pub subject: Vec<String>,
    pub grade: Vec<String>,
    pub year: Vec<String>,
    pub semester: Vec<String>,
}

fn words(list: &[&str]) -> Vec<String> {
    list.iter().map(|s| s.to_string()).collect()
}

impl Default for ColumnKeywords {
    fn default() -> Self {
        Self {
            credit: words(&["學分", "學分數", "credit", "credits"]),
            subject: words(&[
                "科目名稱",
                "課程名稱",
                "科目",
                "課程",
                "subject",
                "coursename",
                "course",
            ]),
            grade: words(&["gpa", "成績", "grade", "等第"]),
            year: words(&["學年", "year"]),
            semester: words(&["學期", "semester", "term"]),
        }
    }
}

impl ColumnKeywords {
    /// Keywords for one role.
    pub fn family(&self, role: ColumnRole) -> &[String] {
        match role {
            ColumnRole::Credit => &self.credit,
            ColumnRole::Subject => &self.subject,
            ColumnRole::Grade => &self.grade,
            ColumnRole::Year => &self.year,
            ColumnRole::Semester => &self.semester,
        }
    }

    /// Parse keyword overrides from JSON. Missing roles keep their defaults.
    pub fn from_json(json: &str) -> Result<Self, TranscriptError> {
        serde_json::from_str(json)
            .map_err(|e| TranscriptError::InvalidConfig(format!("invalid keyword JSON: {e}")))
    }
}

/// Which keyword families a table must carry to count as a grades table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ClassifierProfile {
    /// Credit, subject and grade columns. (default)
    #[default]
    Standard,
    /// Standard plus academic year and semester columns.
    Strict,
}

impl ClassifierProfile {
    pub fn requires(self, role: ColumnRole) -> bool {
        match role {
            ColumnRole::Credit | ColumnRole::Subject | ColumnRole::Grade => true,
            ColumnRole::Year | ColumnRole::Semester => self == ClassifierProfile::Strict,
        }
    }
}
