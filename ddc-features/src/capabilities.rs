//! Capabilities string parsing.
//!
//! A display describes itself with a parenthesized string such as
//!
//! ```text
//! (prot(monitor)type(lcd)SAMSUNGcmds(01 02 03 07 0C E3 F3)vcp(02 04 60( 12 0F 10) FD)mccs_ver(2.1))
//! ```
//!
//! Top-level `key(value)` pairs become [`Capabilities::info`]; a run of upper
//! case letters directly before a key, or standing alone, is the brand. The
//! `vcp` value lists supported codes, each optionally followed by a
//! parenthesized list of supported values.

use crate::table::{Feature, FeatureTable};
use std::collections::{BTreeMap, BTreeSet};

/// Parsed capabilities string.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Capabilities {
    raw: String,
    info: BTreeMap<String, String>,
    vcp: BTreeMap<u8, Option<Vec<u16>>>,
}

/// A supported feature with the values the display accepts for it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SupportedFeature {
    /// Resolved feature.
    pub feature: Feature,
    /// Supported values.
    pub values: BTreeSet<u16>,
}

impl SupportedFeature {
    /// Values to report once the current value is known.
    ///
    /// `hide_extras` features report only `current`; others report the
    /// supported values plus `current`.
    pub fn with_current(&self, current: u16) -> BTreeSet<u16> {
        if self.feature.hide_extras {
            return BTreeSet::from([current]);
        }
        let mut values = self.values.clone();
        values.insert(current);
        values
    }

    /// Supported values as `0xNN` keys with their names, `[unknown]` when unnamed.
    pub fn named_values(&self) -> BTreeMap<String, String> {
        self.values
            .iter()
            .map(|&value| {
                (
                    format!("0x{value:02X}"),
                    self.feature.name_for(value).unwrap_or("[unknown]").to_string(),
                )
            })
            .collect()
    }
}

impl Capabilities {
    /// Parse a capabilities string. Unrecognized fragments are skipped.
    pub fn parse(raw: &str) -> Self {
        let body = outer_body(raw.trim());
        let info = parse_info(body);
        let vcp = info.get("vcp").map(|list| parse_vcp_list(list)).unwrap_or_default();
        Self {
            raw: raw.to_string(),
            info,
            vcp,
        }
    }

    /// The string as read from the display.
    pub fn raw(&self) -> &str {
        &self.raw
    }

    /// All top-level tokens, including `brand` when present.
    pub fn info(&self) -> &BTreeMap<String, String> {
        &self.info
    }

    /// Value of one top-level token.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.info.get(key).map(String::as_str)
    }

    /// Brand token, e.g. `SAMSUNG`.
    pub fn brand(&self) -> Option<&str> {
        self.get("brand")
    }

    /// Model token.
    pub fn model(&self) -> Option<&str> {
        self.get("model")
    }

    /// Display type token, e.g. `lcd`.
    pub fn display_type(&self) -> Option<&str> {
        self.get("type")
    }

    /// MCCS version token.
    pub fn mccs_version(&self) -> Option<&str> {
        self.get("mccs_ver")
    }

    /// Declared VCP codes in ascending order.
    pub fn vcp_codes(&self) -> impl Iterator<Item = u8> + '_ {
        self.vcp.keys().copied()
    }

    /// Values declared for `code`: `None` if the code is not declared,
    /// `Some(None)` if it is declared without a value list.
    pub fn declared_values(&self, code: u8) -> Option<Option<&[u16]>> {
        self.vcp.get(&code).map(|values| values.as_deref())
    }

    /// Supported values per declared code.
    ///
    /// Codes without a value list, and codes resolved through a model
    /// override, report every registered value of the feature.
    pub fn supported_values(&self, table: &FeatureTable, model: Option<&str>) -> BTreeMap<u8, SupportedFeature> {
        self.vcp
            .iter()
            .map(|(&code, declared)| {
                let feature = table.for_code(code, model);
                let values = match declared {
                    Some(values) if feature.model.is_none() => values.iter().copied().collect(),
                    _ => feature.value_names.keys().copied().collect(),
                };
                (code, SupportedFeature { feature, values })
            })
            .collect()
    }
}

/// Strip one pair of enclosing parentheses, if the string has them.
fn outer_body(raw: &str) -> &str {
    if raw.starts_with('(') {
        if let Some(end) = matching_paren(raw, 0) {
            return &raw[1..end];
        }
        return &raw[1..];
    }
    raw
}

/// Index of the `)` closing the `(` at `open`.
fn matching_paren(text: &str, open: usize) -> Option<usize> {
    let mut depth = 0usize;
    for (i, c) in text[open..].char_indices() {
        match c {
            '(' => depth += 1,
            ')' => {
                depth -= 1;
                if depth == 0 {
                    return Some(open + i);
                }
            }
            _ => {}
        }
    }
    None
}

fn parse_info(body: &str) -> BTreeMap<String, String> {
    let mut info = BTreeMap::new();
    let bytes = body.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        let start = pos;
        while pos < bytes.len() && (bytes[pos].is_ascii_alphanumeric() || bytes[pos] == b'_') {
            pos += 1;
        }
        if start == pos {
            pos += 1;
            continue;
        }
        let ident = &body[start..pos];
        let brand_len = ident
            .bytes()
            .take_while(|b| b.is_ascii_uppercase())
            .count();

        if pos < bytes.len() && bytes[pos] == b'(' {
            let Some(end) = matching_paren(body, pos) else {
                tracing::debug!("Unbalanced capabilities token {:?}", &body[start..]);
                break;
            };
            let key = if brand_len == ident.len() {
                ident.to_ascii_lowercase()
            } else {
                if brand_len > 0 {
                    info.insert("brand".to_string(), ident[..brand_len].to_string());
                }
                ident[brand_len..].to_string()
            };
            info.insert(key, body[pos + 1..end].trim().to_string());
            pos = end + 1;
        } else if brand_len == ident.len() {
            info.insert("brand".to_string(), ident.to_string());
        } else {
            tracing::trace!("Skipping capabilities fragment {:?}", ident);
        }
    }
    info
}

fn parse_vcp_list(list: &str) -> BTreeMap<u8, Option<Vec<u16>>> {
    let mut codes = BTreeMap::new();
    let bytes = list.as_bytes();
    let mut pos = 0;

    while pos < bytes.len() {
        if !bytes[pos].is_ascii_hexdigit() {
            pos += 1;
            continue;
        }
        let start = pos;
        while pos < bytes.len() && bytes[pos].is_ascii_hexdigit() && pos - start < 2 {
            pos += 1;
        }
        let Ok(code) = u8::from_str_radix(&list[start..pos], 16) else {
            continue;
        };

        let mut lookahead = pos;
        while lookahead < bytes.len() && bytes[lookahead].is_ascii_whitespace() {
            lookahead += 1;
        }
        let mut values = None;
        if lookahead < bytes.len() && bytes[lookahead] == b'(' {
            match matching_paren(list, lookahead) {
                Some(end) => {
                    values = parse_value_list(&list[lookahead + 1..end]);
                    pos = end + 1;
                }
                None => {
                    values = parse_value_list(&list[lookahead + 1..]);
                    pos = bytes.len();
                }
            }
        }
        codes.insert(code, values);
    }
    codes
}

/// Whitespace separated hex values; runs of digits are split into pairs.
fn parse_value_list(list: &str) -> Option<Vec<u16>> {
    let values: Vec<u16> = list
        .split(|c: char| c.is_ascii_whitespace() || c == '(' || c == ')')
        .filter(|token| !token.is_empty())
        .flat_map(|token| {
            let pairs: Vec<&str> = if token.len() > 2 && token.len() % 2 == 0 {
                (0..token.len()).step_by(2).filter_map(|i| token.get(i..i + 2)).collect()
            } else {
                vec![token]
            };
            pairs.into_iter().filter_map(|p| u16::from_str_radix(p, 16).ok())
        })
        .collect();
    (!values.is_empty()).then_some(values)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::FeatureEntry;
    use pretty_assertions::assert_eq;

    const SAMSUNG: &str = "(prot(monitor)type(lcd)SAMSUNGcmds(01 02 03 07 0C E3 F3)vcp(02 04 05 08 10 12 14(05 08 0B 0C) 16 18 1A 52 60( 12 0F 10) AA(01 02 03 FF) AC AE B2 B6 C6 C8 C9 D6(01 04 05) DC(00 02 03 05 ) DF FD)mccs_ver(2.1)mswhql(1))";

    #[test]
    fn test_info_tokens() {
        let caps = Capabilities::parse(SAMSUNG);
        assert_eq!(caps.get("prot"), Some("monitor"));
        assert_eq!(caps.display_type(), Some("lcd"));
        assert_eq!(caps.brand(), Some("SAMSUNG"));
        assert_eq!(caps.get("cmds"), Some("01 02 03 07 0C E3 F3"));
        assert_eq!(caps.mccs_version(), Some("2.1"));
        assert_eq!(caps.get("mswhql"), Some("1"));
        assert_eq!(caps.model(), None);
    }

    #[test]
    fn test_vcp_codes_and_declared_values() {
        let caps = Capabilities::parse(SAMSUNG);
        let codes: Vec<u8> = caps.vcp_codes().collect();
        assert_eq!(
            codes,
            vec![
                0x02, 0x04, 0x05, 0x08, 0x10, 0x12, 0x14, 0x16, 0x18, 0x1A, 0x52, 0x60, 0xAA, 0xAC,
                0xAE, 0xB2, 0xB6, 0xC6, 0xC8, 0xC9, 0xD6, 0xDC, 0xDF, 0xFD
            ]
        );
        assert_eq!(caps.declared_values(0x60), Some(Some(&[0x12, 0x0F, 0x10][..])));
        assert_eq!(caps.declared_values(0xDC), Some(Some(&[0x00, 0x02, 0x03, 0x05][..])));
        assert_eq!(caps.declared_values(0x02), Some(None));
        assert_eq!(caps.declared_values(0x03), None);
    }

    #[test]
    fn test_supported_values_simple_string() {
        let table = FeatureTable::builtin();
        let caps = Capabilities::parse("(prot(monitor)type(lcd)vcp(02 04 60(01 02)) mccs_ver(2.1))");
        let supported = caps.supported_values(&table, None);

        assert_eq!(supported[&0x60].values, BTreeSet::from([0x01, 0x02]));
        assert_eq!(supported[&0x02].values, BTreeSet::from([0x01, 0x02, 0xFF]));
        assert!(supported[&0x04].values.is_empty());
        assert_eq!(supported[&0x04].feature.name, "unknown feature 0x04");
    }

    #[test]
    fn test_supported_values_with_model_override() {
        let table = FeatureTable::builtin();
        let caps = Capabilities::parse(SAMSUNG);
        let supported = caps.supported_values(&table, Some("CRG9_C49RG9xSS (DP)"));

        // Override replaces the declared list with its own values.
        assert_eq!(supported[&0x60].values, BTreeSet::from([0x06, 0x09]));
        assert_eq!(supported[&0xD6].values, BTreeSet::from([0x01, 0x04]));
        assert_eq!(supported[&0x14].values, BTreeSet::from([0x05, 0x08, 0x0B, 0x0C]));
    }

    #[test]
    fn test_hide_extras_reporting() {
        let mut table = FeatureTable::new();
        table
            .insert(0xB6, FeatureEntry::new("display technology type", [(0x03, "LCD")]).hide_extras())
            .unwrap();
        table
            .insert(0x14, FeatureEntry::new("color temperature", [(0x05, "6500 K")]))
            .unwrap();
        let caps = Capabilities::parse("(vcp(14(05 08) B6(01 02 03)))");
        let supported = caps.supported_values(&table, None);

        assert_eq!(supported[&0xB6].with_current(0x03), BTreeSet::from([0x03]));
        assert_eq!(supported[&0x14].with_current(0x0B), BTreeSet::from([0x05, 0x08, 0x0B]));
    }

    #[test]
    fn test_named_values() {
        let table = FeatureTable::builtin();
        let caps = Capabilities::parse("(vcp(60(0F 11 1B)))");
        let named = caps.supported_values(&table, None)[&0x60].named_values();
        assert_eq!(named["0x0F"], "DisplayPort-1");
        assert_eq!(named["0x11"], "HDMI-1");
        assert_eq!(named["0x1B"], "[unknown]");
    }

    #[test]
    fn test_unspaced_and_malformed_lists() {
        let caps = Capabilities::parse("(vcp(021012 60(0F11)) model(U2720Q)");
        let codes: Vec<u8> = caps.vcp_codes().collect();
        assert_eq!(codes, vec![0x02, 0x10, 0x12, 0x60]);
        assert_eq!(caps.declared_values(0x60), Some(Some(&[0x0F, 0x11][..])));

        let empty = Capabilities::parse("");
        assert!(empty.info().is_empty());
        assert_eq!(empty.vcp_codes().count(), 0);

        let unbalanced = Capabilities::parse("(prot(monitor)vcp(10 12");
        assert_eq!(unbalanced.get("prot"), Some("monitor"));
    }

    #[test]
    fn test_uppercase_key_is_lowercased() {
        let caps = Capabilities::parse("(prot(monitor)VCP(10 60(11)))");
        assert_eq!(caps.declared_values(0x60), Some(Some(&[0x11][..])));
    }
}
