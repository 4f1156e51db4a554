//! Document Encoding Constants
//!
//! Every number in the document is rendered into the same fixed width. That
//! is what lets the Measure pass count a numeric field without knowing its
//! value.

// ===== NUMBER RENDERING =====

/// Width of every rendered number (characters).
///
/// Right-aligned and space-padded. Nine characters hold `-99999.99` at two
/// decimals, comfortably beyond any raw-ADC-derived value.
pub const NUMBER_LENGTH: usize = 9;

/// Default fractional digits for numeric fields.
pub const DEFAULT_DECIMALS: u8 = 2;

/// Rendering used for NaN and infinities, padded to [`NUMBER_LENGTH`].
///
/// Keeps the document valid JSON without changing the field width.
pub const NON_FINITE_LITERAL: &str = "null";

// ===== DOCUMENT FIELD NAMES =====

/// Default key carrying the device identity.
pub const DEFAULT_ID_FIELD: &str = "greenhouse";

/// Key of the environment sensor array.
pub const ENVIRONMENTS_KEY: &str = "environments";

/// Key of the soil sensor array.
pub const SOILS_KEY: &str = "soils";

/// Key of the temperature-with-alert sensor array.
pub const TEMPS_KEY: &str = "temps";

/// Key of the alerts sub-document.
pub const ALERTS_KEY: &str = "alerts";

/// Key of the alert recipient inside the alerts sub-document.
pub const ALERT_RECIPIENT_KEY: &str = "to";

/// Key of the alert message array inside the alerts sub-document.
pub const ALERT_MESSAGES_KEY: &str = "messages";

/// Illuminance key, spelled the way the collecting server expects it.
pub const LUMINANCE_KEY: &str = "luminence";
