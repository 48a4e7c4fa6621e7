//! Numeric literal parsing

use crate::error::SyntaxError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NumberFormat {
    Hexadecimal, // $7F, 0x7F
    Binary,      // %1010, 0b1010
    Decimal,     // 10
}

impl NumberFormat {
    fn name(self) -> &'static str {
        match self {
            NumberFormat::Hexadecimal => "hexadecimal",
            NumberFormat::Binary => "binary",
            NumberFormat::Decimal => "decimal",
        }
    }
}

pub struct NumberParser;

impl NumberParser {
    /// Parse an address-style literal. Decimal unless prefixed.
    pub fn parse(s: &str) -> Result<u32, SyntaxError> {
        let trimmed = s.trim();
        let digits = Self::strip_prefix(trimmed);
        let radix = match Self::detect_format(trimmed) {
            NumberFormat::Hexadecimal => 16,
            NumberFormat::Binary => 2,
            NumberFormat::Decimal => 10,
        };
        Self::parse_radix(digits, radix).ok_or_else(|| SyntaxError::InvalidNumber {
            text: trimmed.to_string(),
            kind: Self::detect_format(trimmed).name(),
        })
    }

    /// Parse a binary data literal. The digits may be split into groups
    /// (`000 1010`); groups are concatenated before parsing.
    pub fn parse_binary_groups<'a, I>(groups: I) -> Result<u32, SyntaxError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let joined: String = groups.into_iter().collect();
        let digits = joined
            .strip_prefix("0b")
            .or_else(|| joined.strip_prefix("0B"))
            .or_else(|| joined.strip_prefix('%'))
            .unwrap_or(&joined);
        Self::parse_radix(digits, 2).ok_or_else(|| SyntaxError::InvalidNumber {
            text: joined.clone(),
            kind: NumberFormat::Binary.name(),
        })
    }

    /// Valid digits always parse; values past `u32::MAX` saturate so the
    /// field width check rejects them later.
    fn parse_radix(digits: &str, radix: u32) -> Option<u32> {
        // from_str_radix accepts a leading '+', literals don't
        if digits.is_empty() || !digits.chars().all(|c| c.is_digit(radix)) {
            return None;
        }
        Some(u32::from_str_radix(digits, radix).unwrap_or(u32::MAX))
    }

    fn strip_prefix(s: &str) -> &str {
        s.strip_prefix('$')
            .or_else(|| s.strip_prefix("0x"))
            .or_else(|| s.strip_prefix("0X"))
            .or_else(|| s.strip_prefix('%'))
            .or_else(|| s.strip_prefix("0b"))
            .or_else(|| s.strip_prefix("0B"))
            .unwrap_or(s)
    }

    /// Detect the format of a number string
    pub fn detect_format(s: &str) -> NumberFormat {
        let trimmed = s.trim();
        if trimmed.starts_with('$') || trimmed.starts_with("0x") || trimmed.starts_with("0X") {
            NumberFormat::Hexadecimal
        } else if trimmed.starts_with('%') || trimmed.starts_with("0b") || trimmed.starts_with("0B")
        {
            NumberFormat::Binary
        } else {
            NumberFormat::Decimal
        }
    }
}
