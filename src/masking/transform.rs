//! Per-value masking
//!
//! [`ValueTransformer`] applies one field's rule to one value at a time. Null
//! values pass through untouched. Every other value is rendered to its
//! canonical string first; `date_shift` and `number_randomize` additionally
//! need the value to parse, and return it unchanged when it does not.
//!
//! The string helpers ([`full_mask`], [`partial_mask`], ...) count characters,
//! not bytes.

use super::cipher::{EncryptionKey, FieldCipher, TokenEncoding};
use super::rule::MaskingRule;
use super::synthetic::FakeCategory;
use crate::domain::{Scalar, TransformError};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use rand::Rng;
use sha2::{Digest, Sha256};

const MASK_CHAR: char = '*';
const HASH_HEX_LEN: usize = 16;
const NOISE_RATIO: f64 = 0.1;

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d.%m.%Y"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// How a value was handled
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransformOutcome {
    /// The rule produced a new value
    Masked,
    /// Null input, passed through
    NullSkipped,
    /// The value did not parse as a date/number and was kept unchanged
    ParseFallback,
}

/// Result of transforming one value
#[derive(Debug, Clone, PartialEq)]
pub struct Transformed {
    pub value: Scalar,
    pub outcome: TransformOutcome,
}

impl Transformed {
    fn masked(value: impl Into<Scalar>) -> Self {
        Self {
            value: value.into(),
            outcome: TransformOutcome::Masked,
        }
    }

    fn unchanged(value: &Scalar, outcome: TransformOutcome) -> Self {
        Self {
            value: value.clone(),
            outcome,
        }
    }
}

/// Applies one field's rule to individual values
///
/// Encrypting rules build their cipher on the first non-null value and reuse
/// it for the rest of the column. Every encrypted value is pushed onto the
/// caller's reverse-entry buffer as `(masked, original)`.
pub struct ValueTransformer<'a> {
    rule: &'a MaskingRule,
    fake_category: FakeCategory,
    cipher: Option<FieldCipher>,
}

impl<'a> ValueTransformer<'a> {
    pub fn new(field: &str, rule: &'a MaskingRule) -> Self {
        Self {
            rule,
            fake_category: FakeCategory::for_field(field),
            cipher: None,
        }
    }

    /// Transform a single value
    ///
    /// # Errors
    ///
    /// Only the encrypting rules can fail: an unusable key or a cipher
    /// error returns [`TransformError::Cipher`]. Parse failures are not
    /// errors; they come back as [`TransformOutcome::ParseFallback`].
    pub fn transform<R: Rng + ?Sized>(
        &mut self,
        value: &Scalar,
        rng: &mut R,
        reverse: &mut Vec<(String, String)>,
    ) -> Result<Transformed, TransformError> {
        if value.is_null() {
            return Ok(Transformed::unchanged(value, TransformOutcome::NullSkipped));
        }

        let rule = self.rule;
        let transformed = match rule {
            MaskingRule::FullMask => Transformed::masked(full_mask(&value.to_string())),
            MaskingRule::PartialMask {
                keep_first,
                keep_last,
            } => Transformed::masked(partial_mask(&value.to_string(), *keep_first, *keep_last)),
            MaskingRule::Hash => Transformed::masked(hash_value(&value.to_string())),
            MaskingRule::EmailMask => Transformed::masked(email_mask(&value.to_string())),
            MaskingRule::PhoneMask => Transformed::masked(phone_mask(&value.to_string())),
            MaskingRule::SsnMask => Transformed::masked(ssn_mask(&value.to_string())),
            MaskingRule::FakeReplace => Transformed::masked(self.fake_category.generate(rng)),
            MaskingRule::DateShift { shift_days } => match shift_date(value, *shift_days) {
                Some(shifted) => Transformed::masked(shifted),
                None => Transformed::unchanged(value, TransformOutcome::ParseFallback),
            },
            MaskingRule::NumberRandomize => match randomize_number(value, rng) {
                Some(noisy) => Transformed::masked(noisy),
                None => Transformed::unchanged(value, TransformOutcome::ParseFallback),
            },
            MaskingRule::ReversibleEncrypt { key } => {
                Transformed::masked(self.encrypt(key, TokenEncoding::Envelope, value, reverse)?)
            }
            MaskingRule::FormatPreservingEncrypt { key } => {
                Transformed::masked(self.encrypt(key, TokenEncoding::Wrapped, value, reverse)?)
            }
        };

        Ok(transformed)
    }

    fn encrypt(
        &mut self,
        key: &EncryptionKey,
        encoding: TokenEncoding,
        value: &Scalar,
        reverse: &mut Vec<(String, String)>,
    ) -> Result<String, TransformError> {
        let cipher = match self.cipher.take() {
            Some(cipher) => cipher,
            None => FieldCipher::new(key)?,
        };

        let original = value.to_string();
        let sealed = cipher.seal(&original, encoding);
        self.cipher = Some(cipher);

        let token = sealed?;
        reverse.push((token.clone(), original));
        Ok(token)
    }
}

/// Replace every character with `*`
pub fn full_mask(s: &str) -> String {
    stars(s.chars().count())
}

/// Keep the first `keep_first` and last `keep_last` characters
///
/// If the string is not longer than `keep_first + keep_last`, every
/// character is masked.
///
/// ```
/// use tabmask::masking::transform::partial_mask;
///
/// assert_eq!(partial_mask("4111111111111111", 0, 4), "************1111");
/// assert_eq!(partial_mask("abc", 2, 1), "***");
/// ```
pub fn partial_mask(s: &str, keep_first: usize, keep_last: usize) -> String {
    let chars: Vec<char> = s.chars().collect();
    let len = chars.len();
    if len <= keep_first.saturating_add(keep_last) {
        return stars(len);
    }

    let mut masked = String::with_capacity(s.len());
    masked.extend(&chars[..keep_first]);
    masked.push_str(&stars(len - keep_first - keep_last));
    masked.extend(&chars[len - keep_last..]);
    masked
}

/// First 16 hex characters of the SHA-256 digest
pub fn hash_value(s: &str) -> String {
    let digest = Sha256::digest(s.as_bytes());
    let mut hex = format!("{digest:x}");
    hex.truncate(HASH_HEX_LEN);
    hex
}

/// Mask the local part of an email address
///
/// Local parts longer than two characters keep their first and last
/// character. Without an `@` the whole string is masked.
pub fn email_mask(s: &str) -> String {
    let Some((local, domain)) = s.split_once('@') else {
        return full_mask(s);
    };

    let chars: Vec<char> = local.chars().collect();
    let masked_local = if chars.len() > 2 {
        let mut m = String::with_capacity(local.len());
        m.push(chars[0]);
        m.push_str(&stars(chars.len() - 2));
        m.push(chars[chars.len() - 1]);
        m
    } else {
        stars(chars.len())
    };

    format!("{masked_local}@{domain}")
}

/// Keep the last four characters when the value holds at least four digits
pub fn phone_mask(s: &str) -> String {
    if digit_count(s) < 4 {
        return full_mask(s);
    }
    let chars: Vec<char> = s.chars().collect();
    let split = chars.len() - 4;
    let mut masked = stars(split);
    masked.extend(&chars[split..]);
    masked
}

/// `***-**-` followed by the last four digits
pub fn ssn_mask(s: &str) -> String {
    let digits: Vec<char> = s.chars().filter(char::is_ascii_digit).collect();
    if digits.len() < 4 {
        return full_mask(s);
    }
    let mut masked = String::from("***-**-");
    masked.extend(&digits[digits.len() - 4..]);
    masked
}

/// Shift a date value by `shift_days`, formatted as `YYYY-MM-DD`
///
/// Returns `None` when the value is not a date (or the shift overflows the
/// calendar).
pub fn shift_date(value: &Scalar, shift_days: i64) -> Option<String> {
    let date = match value {
        Scalar::Date(date) => *date,
        Scalar::Text(text) => parse_date(text)?,
        _ => return None,
    };
    let shifted = date.checked_add_signed(chrono::Duration::try_days(shift_days)?)?;
    Some(shifted.format("%Y-%m-%d").to_string())
}

/// Add uniform noise of up to ±10% and round to two decimals
///
/// Returns `None` when the value is not a finite number.
pub fn randomize_number<R: Rng + ?Sized>(value: &Scalar, rng: &mut R) -> Option<f64> {
    let num = match value {
        Scalar::Integer(i) => *i as f64,
        Scalar::Float(f) => *f,
        Scalar::Text(text) => text.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !num.is_finite() {
        return None;
    }

    let r: f64 = rng.gen();
    let noise = num * NOISE_RATIO * (2.0 * r - 1.0);
    let rounded = ((num + noise) * 100.0).round() / 100.0;
    rounded.is_finite().then_some(rounded)
}

fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(text, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
                .map(|dt| dt.date())
        })
        .or_else(|| {
            DateTime::parse_from_rfc3339(text)
                .ok()
                .map(|dt| dt.date_naive())
        })
}

fn digit_count(s: &str) -> usize {
    s.chars().filter(char::is_ascii_digit).count()
}

fn stars(n: usize) -> String {
    std::iter::repeat(MASK_CHAR).take(n).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CipherError;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_full_mask_counts_chars() {
        assert_eq!(full_mask("secret"), "******");
        assert_eq!(full_mask("naïve"), "*****");
        assert_eq!(full_mask(""), "");
    }

    #[test]
    fn test_partial_mask() {
        assert_eq!(partial_mask("Johnathan", 1, 2), "J******an");
        assert_eq!(partial_mask("abcd", 2, 2), "****");
        assert_eq!(partial_mask("abcdef", 0, 0), "******");
        assert_eq!(partial_mask("abcdef", 2, 0), "ab****");
    }

    #[test]
    fn test_email_mask() {
        assert_eq!(email_mask("ab@example.com"), "**@example.com");
        assert_eq!(email_mask("alice@example.com"), "a***e@example.com");
        assert_eq!(email_mask("not-an-email"), "************");
        assert_eq!(email_mask("a@b@c"), "*@b@c");
    }

    #[test]
    fn test_phone_and_ssn_mask() {
        assert_eq!(phone_mask("555-123-4567"), "********4567");
        assert_eq!(phone_mask("12-3"), "****");
        assert_eq!(ssn_mask("123-45-6789"), "***-**-6789");
        assert_eq!(ssn_mask("123456789"), "***-**-6789");
        assert_eq!(ssn_mask("n/a"), "***");
    }

    #[test]
    fn test_hash_value() {
        let h = hash_value("alice");
        assert_eq!(h.len(), 16);
        assert!(h.chars().all(|c| c.is_ascii_hexdigit()));
        assert_eq!(h, hash_value("alice"));
        assert_ne!(h, hash_value("bob"));
    }

    #[test]
    fn test_shift_date() {
        assert_eq!(
            shift_date(&Scalar::from("2024-01-30"), 5).as_deref(),
            Some("2024-02-04")
        );
        assert_eq!(
            shift_date(&Scalar::from("03/15/2020 "), -15).as_deref(),
            Some("2020-02-29")
        );
        assert_eq!(
            shift_date(&Scalar::from("2021-06-01T12:00:00Z"), 1).as_deref(),
            Some("2021-06-02")
        );
        let date = NaiveDate::from_ymd_opt(1999, 12, 31).unwrap();
        assert_eq!(
            shift_date(&Scalar::Date(date), 1).as_deref(),
            Some("2000-01-01")
        );
        assert_eq!(shift_date(&Scalar::from("yesterday"), 1), None);
        assert_eq!(shift_date(&Scalar::from(20240101_i64), 1), None);
    }

    #[test]
    fn test_randomize_number_bounds() {
        let mut rng = rng();
        for _ in 0..500 {
            let out = randomize_number(&Scalar::from(50_000_i64), &mut rng).unwrap();
            assert!((45_000.0..=55_000.0).contains(&out), "{out}");
        }
        assert_eq!(randomize_number(&Scalar::from(0.0), &mut rng), Some(0.0));
        assert_eq!(randomize_number(&Scalar::from("abc"), &mut rng), None);
        assert!(randomize_number(&Scalar::from(" 12.5 "), &mut rng).is_some());
        assert_eq!(randomize_number(&Scalar::from(f64::NAN), &mut rng), None);
    }

    #[test]
    fn test_null_passes_through_every_rule() {
        let key = EncryptionKey::generate();
        let rules = [
            MaskingRule::FullMask,
            MaskingRule::FakeReplace,
            MaskingRule::ReversibleEncrypt { key },
            MaskingRule::DateShift { shift_days: 3 },
        ];
        let mut reverse = Vec::new();
        for rule in &rules {
            let mut t = ValueTransformer::new("email", rule);
            let out = t.transform(&Scalar::Null, &mut rng(), &mut reverse).unwrap();
            assert_eq!(out.value, Scalar::Null);
            assert_eq!(out.outcome, TransformOutcome::NullSkipped);
        }
        assert!(reverse.is_empty());
    }

    #[test]
    fn test_parse_fallback_keeps_value() {
        let rule = MaskingRule::DateShift { shift_days: 10 };
        let mut t = ValueTransformer::new("dob", &rule);
        let out = t
            .transform(&Scalar::from("unknown"), &mut rng(), &mut Vec::new())
            .unwrap();
        assert_eq!(out.value, Scalar::from("unknown"));
        assert_eq!(out.outcome, TransformOutcome::ParseFallback);
    }

    #[test]
    fn test_encrypt_records_reverse_entry() {
        let key = EncryptionKey::generate();
        let rule = MaskingRule::FormatPreservingEncrypt { key: key.clone() };
        let mut t = ValueTransformer::new("ssn", &rule);
        let mut reverse = Vec::new();

        let out = t
            .transform(&Scalar::from("123-45-6789"), &mut rng(), &mut reverse)
            .unwrap();
        let Scalar::Text(token) = out.value else {
            panic!("expected text token");
        };
        assert_eq!(reverse, vec![(token.clone(), "123-45-6789".to_string())]);

        let cipher = FieldCipher::new(&key).unwrap();
        assert_eq!(
            cipher.open(&token, TokenEncoding::Wrapped).unwrap(),
            "123-45-6789"
        );
    }

    #[test]
    fn test_malformed_key_fails_on_first_value() {
        let rule = MaskingRule::ReversibleEncrypt {
            key: EncryptionKey::new("too-short"),
        };
        let mut t = ValueTransformer::new("ssn", &rule);
        let err = t
            .transform(&Scalar::from("x"), &mut rng(), &mut Vec::new())
            .unwrap_err();
        assert!(matches!(
            err,
            TransformError::Cipher(CipherError::InvalidKey(_))
        ));
    }

    #[test]
    fn test_fake_replace_uses_field_category() {
        let rule = MaskingRule::FakeReplace;
        let mut t = ValueTransformer::new("contact_email", &rule);
        let out = t
            .transform(&Scalar::from("real@corp.com"), &mut rng(), &mut Vec::new())
            .unwrap();
        let text = out.value.to_string();
        assert!(text.contains('@'));
        assert_ne!(text, "real@corp.com");
    }
}
