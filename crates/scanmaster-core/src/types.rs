// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// Core domain types for the ScanMaster document scanner.

use std::fmt;
use std::str::FromStr;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::ScanmasterError;

/// Unique identifier for a scanned page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageId(pub Uuid);

impl PageId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PageId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for PageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Unique identifier for a saved document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub Uuid);

impl DocumentId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for DocumentId {
    type Err = ScanmasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Uuid::parse_str(s.trim())
            .map(Self)
            .map_err(|e| ScanmasterError::InvalidParameter(format!("document id {s:?}: {e}")))
    }
}

// ---------------------------------------------------------------------------
// Encoded images
// ---------------------------------------------------------------------------

/// An encoded image buffer (JPEG, PNG, ...) together with its MIME type.
///
/// This is the transport and storage form of a raster image. It serialises as
/// a `data:<mime>;base64,<payload>` string so that persisted documents stay
/// readable by anything that understands data URLs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub struct EncodedImage {
    bytes: Vec<u8>,
    mime: String,
}

impl EncodedImage {
    pub fn new(bytes: Vec<u8>, mime: impl Into<String>) -> Self {
        Self {
            bytes,
            mime: mime.into(),
        }
    }

    /// Wrap JPEG bytes.
    pub fn jpeg(bytes: Vec<u8>) -> Self {
        Self::new(bytes, "image/jpeg")
    }

    /// Wrap raw bytes, sniffing the MIME type from the magic number.
    ///
    /// Bytes holding a `data:` URL are unpacked first. If the URL does not
    /// parse, the bytes are kept as they are and fail later at decode time.
    pub fn sniffed(bytes: Vec<u8>) -> Self {
        if has_data_url_prefix(&bytes) {
            if let Some(image) = std::str::from_utf8(&bytes)
                .ok()
                .and_then(|text| Self::from_data_url(text).ok())
            {
                return image;
            }
        }
        let mime = sniff_mime(&bytes);
        Self::new(bytes, mime)
    }

    pub fn bytes(&self) -> &[u8] {
        &self.bytes
    }

    pub fn mime(&self) -> &str {
        &self.mime
    }

    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Parse either a `data:<mime>;base64,` URL or a bare base64 payload.
    ///
    /// The prefix, when present, is stripped before decoding. Bare payloads get
    /// their MIME type from the decoded magic number.
    pub fn from_data_url(input: &str) -> Result<Self, ScanmasterError> {
        let input = input.trim();

        let (mime, payload) = match input.strip_prefix("data:") {
            Some(rest) => {
                let (header, payload) = rest.split_once(',').ok_or_else(|| {
                    ScanmasterError::Decode("data URL has no ',' separator".into())
                })?;
                let mut parts = header.split(';');
                let mime = parts.next().unwrap_or_default().trim().to_owned();
                if !parts.any(|p| p.trim().eq_ignore_ascii_case("base64")) {
                    return Err(ScanmasterError::Decode(
                        "only base64-encoded data URLs are supported".into(),
                    ));
                }
                (Some(mime), payload)
            }
            None => (None, input),
        };

        let cleaned: String = payload.chars().filter(|c| !c.is_ascii_whitespace()).collect();
        let bytes = STANDARD
            .decode(cleaned.as_bytes())
            .map_err(|e| ScanmasterError::Decode(format!("invalid base64 payload: {e}")))?;
        if bytes.is_empty() {
            return Err(ScanmasterError::Decode("empty image payload".into()));
        }

        let mime = match mime {
            Some(m) if !m.is_empty() => m,
            _ => sniff_mime(&bytes).to_owned(),
        };
        Ok(Self { bytes, mime })
    }

    /// Format as a `data:<mime>;base64,<payload>` URL.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.mime, STANDARD.encode(&self.bytes))
    }
}

impl fmt::Debug for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EncodedImage")
            .field("mime", &self.mime)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl From<EncodedImage> for String {
    fn from(image: EncodedImage) -> Self {
        image.to_data_url()
    }
}

impl TryFrom<String> for EncodedImage {
    type Error = ScanmasterError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::from_data_url(&value)
    }
}

/// Whether `bytes` start with a `data:` URL scheme, ignoring leading
/// whitespace.
pub fn has_data_url_prefix(bytes: &[u8]) -> bool {
    bytes.trim_ascii_start().starts_with(b"data:")
}

/// Guess an image MIME type from its leading bytes.
fn sniff_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, ..] => "image/jpeg",
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [b'G', b'I', b'F', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        // Camera captures are JPEG unless proven otherwise.
        _ => "image/jpeg",
    }
}

// ---------------------------------------------------------------------------
// Filters and rotation
// ---------------------------------------------------------------------------

/// The closed set of per-pixel filters offered by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum FilterKind {
    /// Identity.
    #[default]
    Original,
    /// Unweighted channel mean.
    Grayscale,
    /// Fixed-threshold high-contrast binarization.
    Magic,
    /// Multiplicative brightness boost.
    Lighten,
}

impl FilterKind {
    pub const ALL: [FilterKind; 4] = [
        FilterKind::Original,
        FilterKind::Grayscale,
        FilterKind::Magic,
        FilterKind::Lighten,
    ];

    /// Label shown on the filter picker.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Original => "Original",
            Self::Grayscale => "B&W",
            Self::Magic => "Magic",
            Self::Lighten => "Lighten",
        }
    }
}

impl fmt::Display for FilterKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for FilterKind {
    type Err = ScanmasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "original" | "none" => Ok(Self::Original),
            "grayscale" | "greyscale" | "b&w" | "bw" | "gray" | "grey" => Ok(Self::Grayscale),
            "magic" => Ok(Self::Magic),
            "lighten" => Ok(Self::Lighten),
            other => Err(ScanmasterError::InvalidParameter(format!(
                "unknown filter {other:?} (expected original, grayscale, magic or lighten)"
            ))),
        }
    }
}

/// A clockwise rotation by a whole number of quarter turns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Rotation {
    #[default]
    Deg0,
    Deg90,
    Deg180,
    Deg270,
}

impl Rotation {
    /// Build from a degree count. Any multiple of 90 is accepted (including
    /// negative ones, which are normalised mod 360); anything else is rejected.
    pub fn from_degrees(degrees: i32) -> Result<Self, ScanmasterError> {
        match degrees.rem_euclid(360) {
            0 => Ok(Self::Deg0),
            90 => Ok(Self::Deg90),
            180 => Ok(Self::Deg180),
            270 => Ok(Self::Deg270),
            _ => Err(ScanmasterError::InvalidParameter(format!(
                "rotation must be a multiple of 90 degrees, got {degrees}"
            ))),
        }
    }

    pub fn degrees(&self) -> u16 {
        match self {
            Self::Deg0 => 0,
            Self::Deg90 => 90,
            Self::Deg180 => 180,
            Self::Deg270 => 270,
        }
    }

    /// Compose two rotations (cumulative, mod 360).
    pub fn then(self, other: Rotation) -> Rotation {
        match (self.degrees() + other.degrees()) % 360 {
            90 => Self::Deg90,
            180 => Self::Deg180,
            270 => Self::Deg270,
            _ => Self::Deg0,
        }
    }

    /// Whether applying this rotation swaps width and height.
    pub fn swaps_dimensions(&self) -> bool {
        matches!(self, Self::Deg90 | Self::Deg270)
    }
}

// ---------------------------------------------------------------------------
// Pages and documents
// ---------------------------------------------------------------------------

/// One captured page inside the editor or a saved document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScannedPage {
    pub id: PageId,
    /// Unfiltered capture. Rotations are baked into it.
    pub original: EncodedImage,
    /// `filter` applied to `original`.
    pub processed: EncodedImage,
    pub filter: FilterKind,
    /// Total rotation applied since capture, mod 360.
    pub rotation: Rotation,
}

impl ScannedPage {
    /// A freshly captured page: no filter, no rotation.
    pub fn new(image: EncodedImage) -> Self {
        Self {
            id: PageId::new(),
            processed: image.clone(),
            original: image,
            filter: FilterKind::Original,
            rotation: Rotation::Deg0,
        }
    }
}

/// A saved multi-page document in the local library.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: DocumentId,
    pub title: String,
    pub created_at: DateTime<Utc>,
    pub pages: Vec<ScannedPage>,
    pub extracted_text: Option<String>,
    pub summary: Option<String>,
    pub tags: Vec<String>,
    pub is_synced: bool,
    /// Sum of the processed page payload sizes.
    pub size_bytes: u64,
}

impl DocumentRecord {
    pub fn new(pages: Vec<ScannedPage>) -> Self {
        let now = Utc::now();
        let mut record = Self {
            id: DocumentId::new(),
            title: format!("Scan {}", now.format("%Y-%m-%d")),
            created_at: now,
            pages,
            extracted_text: None,
            summary: None,
            tags: vec!["New".to_owned()],
            is_synced: false,
            size_bytes: 0,
        };
        record.refresh_size();
        record
    }

    /// The first page's processed image doubles as the library thumbnail.
    pub fn thumbnail(&self) -> Option<&EncodedImage> {
        self.pages.first().map(|p| &p.processed)
    }

    pub fn refresh_size(&mut self) {
        self.size_bytes = self.pages.iter().map(|p| p.processed.len() as u64).sum();
    }
}

// ---------------------------------------------------------------------------
// Plan and usage metering
// ---------------------------------------------------------------------------

/// Subscription tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum UserPlan {
    #[default]
    Free,
    Pro,
}

impl UserPlan {
    pub fn is_pro(&self) -> bool {
        matches!(self, Self::Pro)
    }

    /// Stored and displayed form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Free => "FREE",
            Self::Pro => "PRO",
        }
    }
}

impl fmt::Display for UserPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for UserPlan {
    type Err = ScanmasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(Self::Free),
            "pro" => Ok(Self::Pro),
            other => Err(ScanmasterError::InvalidParameter(format!("unknown plan {other:?}"))),
        }
    }
}

/// Remote features that are metered on the free plan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MeteredFeature {
    Ocr,
    Translation,
}

impl fmt::Display for MeteredFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ocr => f.write_str("OCR"),
            Self::Translation => f.write_str("translation"),
        }
    }
}

/// Daily allowances for free users.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeLimits {
    pub ocr_daily: u32,
    pub translate_daily: u32,
}

impl FreeLimits {
    pub fn limit_for(&self, feature: MeteredFeature) -> u32 {
        match feature {
            MeteredFeature::Ocr => self.ocr_daily,
            MeteredFeature::Translation => self.translate_daily,
        }
    }
}

impl Default for FreeLimits {
    fn default() -> Self {
        Self {
            ocr_daily: 5,
            translate_daily: 3,
        }
    }
}

/// Per-day usage counters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsageStats {
    pub ocr_count_today: u32,
    pub translation_count_today: u32,
    /// Day the counters were last zeroed.
    pub last_reset_date: NaiveDate,
}

impl UsageStats {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            ocr_count_today: 0,
            translation_count_today: 0,
            last_reset_date: today,
        }
    }

    /// Zero the counters if they belong to a different day. Returns whether a
    /// reset happened.
    pub fn roll_over(&mut self, today: NaiveDate) -> bool {
        if self.last_reset_date == today {
            return false;
        }
        *self = Self::new(today);
        true
    }

    pub fn count(&self, feature: MeteredFeature) -> u32 {
        match feature {
            MeteredFeature::Ocr => self.ocr_count_today,
            MeteredFeature::Translation => self.translation_count_today,
        }
    }

    pub fn increment(&mut self, feature: MeteredFeature) {
        match feature {
            MeteredFeature::Ocr => self.ocr_count_today += 1,
            MeteredFeature::Translation => self.translation_count_today += 1,
        }
    }
}

// ---------------------------------------------------------------------------
// Translation targets
// ---------------------------------------------------------------------------

/// Languages offered as translation targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum LanguageCode {
    #[default]
    En,
    Es,
    Fr,
    De,
    It,
    Pt,
    Zh,
    Ja,
    Ko,
    Hi,
    Ar,
    Ur,
    Ru,
}

impl LanguageCode {
    pub const ALL: [LanguageCode; 13] = [
        Self::En,
        Self::Es,
        Self::Fr,
        Self::De,
        Self::It,
        Self::Pt,
        Self::Zh,
        Self::Ja,
        Self::Ko,
        Self::Hi,
        Self::Ar,
        Self::Ur,
        Self::Ru,
    ];

    /// ISO 639-1 code.
    pub fn code(&self) -> &'static str {
        match self {
            Self::En => "en",
            Self::Es => "es",
            Self::Fr => "fr",
            Self::De => "de",
            Self::It => "it",
            Self::Pt => "pt",
            Self::Zh => "zh",
            Self::Ja => "ja",
            Self::Ko => "ko",
            Self::Hi => "hi",
            Self::Ar => "ar",
            Self::Ur => "ur",
            Self::Ru => "ru",
        }
    }

    /// English name, as handed to the translation backend.
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::En => "English",
            Self::Es => "Spanish",
            Self::Fr => "French",
            Self::De => "German",
            Self::It => "Italian",
            Self::Pt => "Portuguese",
            Self::Zh => "Chinese",
            Self::Ja => "Japanese",
            Self::Ko => "Korean",
            Self::Hi => "Hindi",
            Self::Ar => "Arabic",
            Self::Ur => "Urdu",
            Self::Ru => "Russian",
        }
    }
}

impl FromStr for LanguageCode {
    type Err = ScanmasterError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let needle = s.trim();
        Self::ALL
            .into_iter()
            .find(|lang| {
                lang.code().eq_ignore_ascii_case(needle)
                    || lang.display_name().eq_ignore_ascii_case(needle)
            })
            .ok_or_else(|| ScanmasterError::InvalidParameter(format!("unsupported language {s:?}")))
    }
}

// ---------------------------------------------------------------------------
// Export layout
// ---------------------------------------------------------------------------

/// Standard paper sizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaperSize {
    A4,
    A3,
    A5,
    Letter,
    Legal,
    Custom { width_mm: u32, height_mm: u32 },
}

impl PaperSize {
    /// Dimensions in millimetres (width, height).
    pub fn dimensions_mm(&self) -> (u32, u32) {
        match self {
            Self::A4 => (210, 297),
            Self::A3 => (297, 420),
            Self::A5 => (148, 210),
            Self::Letter => (216, 279),
            Self::Legal => (216, 356),
            Self::Custom {
                width_mm,
                height_mm,
            } => (*width_mm, *height_mm),
        }
    }
}

/// How exported pages are sized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum PageLayout {
    /// Page is as wide as the paper and exactly as tall as the image needs.
    #[default]
    FitWidth,
    /// Fixed paper-size pages, image at full width from the top.
    PaperSize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sniffed_unpacks_data_url_bytes() {
        let image = EncodedImage::sniffed(b"data:image/png;base64,AQID".to_vec());
        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.bytes(), &[1, 2, 3]);

        let raw = EncodedImage::sniffed(vec![0x89, b'P', b'N', b'G', 1]);
        assert_eq!(raw.mime(), "image/png");
        assert_eq!(raw.len(), 5);

        // Malformed URLs are kept verbatim.
        let broken = EncodedImage::sniffed(b"data:image/png,AQID".to_vec());
        assert_eq!(broken.bytes(), b"data:image/png,AQID");
    }

    #[test]
    fn data_url_prefix_is_stripped() {
        let image = EncodedImage::from_data_url("data:image/png;base64,AQID").expect("parse");
        assert_eq!(image.mime(), "image/png");
        assert_eq!(image.bytes(), &[1, 2, 3]);
    }

    #[test]
    fn bare_base64_is_sniffed() {
        let payload = STANDARD.encode([0xFF, 0xD8, 0xFF, 0xE0]);
        let image = EncodedImage::from_data_url(&payload).expect("parse");
        assert_eq!(image.mime(), "image/jpeg");

        let png = STANDARD.encode([0x89, b'P', b'N', b'G', 0x0D, 0x0A]);
        assert_eq!(EncodedImage::from_data_url(&png).expect("parse").mime(), "image/png");
    }

    #[test]
    fn non_base64_data_url_is_rejected() {
        let result = EncodedImage::from_data_url("data:text/plain,hello");
        assert!(matches!(result, Err(ScanmasterError::Decode(_))));
    }

    #[test]
    fn empty_payload_is_rejected() {
        assert!(EncodedImage::from_data_url("data:image/jpeg;base64,").is_err());
        assert!(EncodedImage::from_data_url("   ").is_err());
    }

    #[test]
    fn encoded_image_serialises_as_data_url() {
        let image = EncodedImage::new(vec![1, 2, 3], "image/png");
        let json = serde_json::to_string(&image).expect("serialize");
        assert_eq!(json, "\"data:image/png;base64,AQID\"");
        let back: EncodedImage = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, image);
    }

    #[test]
    fn rotation_accepts_only_quarter_turns() {
        assert_eq!(Rotation::from_degrees(90).expect("90"), Rotation::Deg90);
        assert_eq!(Rotation::from_degrees(-90).expect("-90"), Rotation::Deg270);
        assert_eq!(Rotation::from_degrees(720).expect("720"), Rotation::Deg0);
        assert!(Rotation::from_degrees(45).is_err());
    }

    #[test]
    fn rotation_composes_mod_360() {
        let total = [Rotation::Deg90; 4]
            .into_iter()
            .fold(Rotation::Deg0, Rotation::then);
        assert_eq!(total, Rotation::Deg0);
        assert_eq!(Rotation::Deg270.then(Rotation::Deg180), Rotation::Deg90);
        assert!(Rotation::Deg270.swaps_dimensions());
        assert!(!Rotation::Deg180.swaps_dimensions());
    }

    #[test]
    fn filter_parses_labels_and_names() {
        assert_eq!("B&W".parse::<FilterKind>().expect("b&w"), FilterKind::Grayscale);
        assert_eq!("magic".parse::<FilterKind>().expect("magic"), FilterKind::Magic);
        assert_eq!(" Lighten ".parse::<FilterKind>().expect("lighten"), FilterKind::Lighten);
        assert!("sepia".parse::<FilterKind>().is_err());
    }

    #[test]
    fn usage_rolls_over_on_new_day() {
        let day1 = NaiveDate::from_ymd_opt(2026, 3, 1).expect("date");
        let day2 = NaiveDate::from_ymd_opt(2026, 3, 2).expect("date");

        let mut stats = UsageStats::new(day1);
        stats.increment(MeteredFeature::Ocr);
        stats.increment(MeteredFeature::Translation);
        assert!(!stats.roll_over(day1));
        assert_eq!(stats.count(MeteredFeature::Ocr), 1);

        assert!(stats.roll_over(day2));
        assert_eq!(stats, UsageStats::new(day2));
    }

    #[test]
    fn language_parses_code_or_name() {
        assert_eq!("ur".parse::<LanguageCode>().expect("ur"), LanguageCode::Ur);
        assert_eq!("japanese".parse::<LanguageCode>().expect("ja"), LanguageCode::Ja);
        assert!("xx".parse::<LanguageCode>().is_err());
    }

    #[test]
    fn new_document_sums_page_sizes() {
        let pages = vec![
            ScannedPage::new(EncodedImage::jpeg(vec![0; 10])),
            ScannedPage::new(EncodedImage::jpeg(vec![0; 32])),
        ];
        let doc = DocumentRecord::new(pages);
        assert_eq!(doc.size_bytes, 42);
        assert_eq!(doc.tags, vec!["New".to_owned()]);
        assert!(doc.title.starts_with("Scan "));
        assert_eq!(doc.thumbnail().map(EncodedImage::len), Some(10));
    }
}
